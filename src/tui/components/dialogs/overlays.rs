//! Concrete overlays used by the dashboard
//!
//! Each overlay owns a [`DialogCoordinator`]. Opening and closing always goes
//! through it, so the shared stack stays the single source of truth for
//! which overlay is visible and which one receives keys.

use super::{DialogCoordinator, DialogStackHandle, GroupName};
use crate::api::JobSummary;
use crate::tui::{
    components::Component,
    styles::Theme,
    utils::layout::{centered_rect, contains},
    Frame,
};
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

/// An overlay registered with the dialog stack
pub trait Overlay: Component {
    fn coordinator(&self) -> &DialogCoordinator;

    /// Area covered during the last render
    fn area(&self) -> Rect;

    fn is_open(&self) -> bool {
        self.coordinator().is_open()
    }

    /// Close on a left click outside the overlay, if the stack allows it
    fn handle_outside_click(&self, event: &MouseEvent) -> bool {
        if event.kind != MouseEventKind::Down(MouseButton::Left) {
            return false;
        }
        if contains(self.area(), event.column, event.row) {
            return false;
        }
        self.coordinator().request_close()
    }
}

fn overlay_block<'a>(title: &'a str, active: bool, theme: &Theme) -> Block<'a> {
    let border_style = if active {
        theme.focused_border_style()
    } else {
        theme.border_style()
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
        .style(theme.base_style())
}

/// Modal listing the key bindings
pub struct HelpOverlay {
    coordinator: DialogCoordinator,
    lines: Vec<(String, String)>,
    area: Rect,
}

impl HelpOverlay {
    pub fn new(stack: DialogStackHandle, lines: Vec<(String, String)>) -> Self {
        Self {
            coordinator: DialogCoordinator::new(stack),
            lines,
            area: Rect::default(),
        }
    }

    pub fn toggle(&self) -> bool {
        self.coordinator.toggle()
    }

    /// Keys while the help is the active overlay. Everything is swallowed.
    pub fn handle_key(&self, event: &KeyEvent) -> bool {
        match event.code {
            KeyCode::Char('?') | KeyCode::Char('q') => {
                self.coordinator.request_close();
            }
            _ => {
                self.coordinator.handle_escape(event);
            }
        }
        true
    }
}

impl Component for HelpOverlay {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let height = self.lines.len() as u16 + 2;
        self.area = centered_rect(56, height, area);

        let lines: Vec<Line> = self
            .lines
            .iter()
            .map(|(keys, description)| {
                Line::from(vec![
                    Span::styled(format!("{:<14}", keys), theme.focused_border_style()),
                    Span::styled(description.clone(), theme.text_style()),
                ])
            })
            .collect();

        let block = overlay_block(" Help ", self.coordinator.is_top(), theme);
        frame.render_widget(Clear, self.area);
        frame.render_widget(Paragraph::new(lines).block(block), self.area);
    }
}

impl Overlay for HelpOverlay {
    fn coordinator(&self) -> &DialogCoordinator {
        &self.coordinator
    }

    fn area(&self) -> Rect {
        self.area
    }
}

/// Actions offered for a job row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    RunNow,
    ToggleEnabled,
    Delete,
}

impl RowAction {
    pub const ALL: [RowAction; 3] = [RowAction::RunNow, RowAction::ToggleEnabled, RowAction::Delete];

    fn label(&self, job: &JobSummary) -> &'static str {
        match self {
            RowAction::RunNow => "Run now",
            RowAction::ToggleEnabled if job.enabled => "Disable",
            RowAction::ToggleEnabled => "Enable",
            RowAction::Delete => "Delete…",
        }
    }
}

/// Result of a key press inside the row menu
#[derive(Debug, Clone, PartialEq)]
pub enum MenuOutcome {
    Ignored,
    Consumed,
    Chosen(RowAction, JobSummary),
}

/// Per-row dropdown. Row menus share a group, so opening one closes any other.
pub struct RowActionsMenu {
    coordinator: DialogCoordinator,
    job: Option<JobSummary>,
    state: ListState,
    area: Rect,
}

impl RowActionsMenu {
    pub fn new(stack: DialogStackHandle) -> Self {
        Self {
            coordinator: DialogCoordinator::grouped(stack, GroupName::row_actions()),
            job: None,
            state: ListState::default(),
            area: Rect::default(),
        }
    }

    pub fn open_for(&mut self, job: JobSummary) {
        self.job = Some(job);
        self.state.select(Some(0));
        self.coordinator.open();
    }

    pub fn job(&self) -> Option<&JobSummary> {
        self.job.as_ref()
    }

    pub fn request_close(&self) -> bool {
        self.coordinator.request_close()
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> MenuOutcome {
        if self.coordinator.handle_escape(event) {
            return MenuOutcome::Consumed;
        }

        let selected = self.state.selected().unwrap_or(0);
        match event.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.state.select(Some((selected + 1).min(RowAction::ALL.len() - 1)));
                MenuOutcome::Consumed
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.select(Some(selected.saturating_sub(1)));
                MenuOutcome::Consumed
            }
            KeyCode::Enter => match &self.job {
                Some(job) => MenuOutcome::Chosen(RowAction::ALL[selected], job.clone()),
                None => MenuOutcome::Consumed,
            },
            _ => MenuOutcome::Ignored,
        }
    }
}

impl Component for RowActionsMenu {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(job) = &self.job else {
            return;
        };
        self.area = centered_rect(28, RowAction::ALL.len() as u16 + 2, area);

        let items: Vec<ListItem> = RowAction::ALL
            .iter()
            .map(|action| ListItem::new(action.label(job)))
            .collect();
        let title = format!(" {} ", job.name);
        let list = List::new(items)
            .block(overlay_block(&title, self.coordinator.is_top(), theme))
            .highlight_style(theme.selection_style());

        frame.render_widget(Clear, self.area);
        frame.render_stateful_widget(list, self.area, &mut self.state);
    }
}

impl Overlay for RowActionsMenu {
    fn coordinator(&self) -> &DialogCoordinator {
        &self.coordinator
    }

    fn area(&self) -> Rect {
        self.area
    }
}

/// Yes/no confirmation stacked above whatever opened it
pub struct ConfirmDialog {
    coordinator: DialogCoordinator,
    message: String,
    pending: Option<(RowAction, JobSummary)>,
    area: Rect,
}

impl ConfirmDialog {
    pub fn new(stack: DialogStackHandle) -> Self {
        Self {
            coordinator: DialogCoordinator::new(stack),
            message: String::new(),
            pending: None,
            area: Rect::default(),
        }
    }

    pub fn ask(&mut self, message: impl Into<String>, action: RowAction, job: JobSummary) {
        self.message = message.into();
        self.pending = Some((action, job));
        self.coordinator.open();
    }

    /// Returns the confirmed action, if this key confirmed one
    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<(RowAction, JobSummary)> {
        match event.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if self.coordinator.request_close() {
                    return self.pending.take();
                }
                None
            }
            KeyCode::Char('n') => {
                if self.coordinator.request_close() {
                    self.pending = None;
                }
                None
            }
            _ => {
                if self.coordinator.handle_escape(event) {
                    self.pending = None;
                }
                None
            }
        }
    }
}

impl Component for ConfirmDialog {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.area = centered_rect(44, 5, area);
        let text = vec![
            Line::styled(self.message.clone(), theme.text_style()),
            Line::styled("[y] confirm   [n] cancel", theme.muted_style()),
        ];
        let paragraph = Paragraph::new(text)
            .block(overlay_block(" Confirm ", self.coordinator.is_top(), theme))
            .wrap(Wrap { trim: true });

        frame.render_widget(Clear, self.area);
        frame.render_widget(paragraph, self.area);
    }
}

impl Overlay for ConfirmDialog {
    fn coordinator(&self) -> &DialogCoordinator {
        &self.coordinator
    }

    fn area(&self) -> Rect {
        self.area
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::JobStatus;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn job(id: &str) -> JobSummary {
        JobSummary {
            id: id.to_string(),
            name: format!("job {}", id),
            schedule: "* * * * *".to_string(),
            enabled: true,
            last_status: JobStatus::Idle,
            next_run: None,
        }
    }

    #[test]
    fn test_nested_confirm_blocks_menu_escape() {
        let stack = DialogStackHandle::new();
        let mut menu = RowActionsMenu::new(stack.clone());
        let mut confirm = ConfirmDialog::new(stack.clone());

        menu.open_for(job("1"));
        confirm.ask("Delete?", RowAction::Delete, job("1"));

        // Escape reaches the confirm dialog first and closes only it
        assert_eq!(confirm.handle_key(&key(KeyCode::Esc)), None);
        assert!(!confirm.is_open());
        assert!(menu.is_open());
        assert!(menu.coordinator().is_top());
    }

    #[test]
    fn test_confirm_returns_pending_action() {
        let stack = DialogStackHandle::new();
        let mut confirm = ConfirmDialog::new(stack);
        confirm.ask("Delete?", RowAction::Delete, job("7"));

        let confirmed = confirm.handle_key(&key(KeyCode::Char('y')));
        assert_eq!(confirmed.map(|(action, job)| (action, job.id)), Some((RowAction::Delete, "7".to_string())));
        assert!(!confirm.is_open());
    }

    #[test]
    fn test_menu_navigation_and_choice() {
        let stack = DialogStackHandle::new();
        let mut menu = RowActionsMenu::new(stack);
        menu.open_for(job("3"));

        assert_eq!(menu.handle_key(&key(KeyCode::Down)), MenuOutcome::Consumed);
        assert_eq!(menu.handle_key(&key(KeyCode::Down)), MenuOutcome::Consumed);
        assert_eq!(menu.handle_key(&key(KeyCode::Down)), MenuOutcome::Consumed);
        assert_eq!(
            menu.handle_key(&key(KeyCode::Enter)),
            MenuOutcome::Chosen(RowAction::Delete, job("3"))
        );
        assert_eq!(menu.handle_key(&key(KeyCode::Char('x'))), MenuOutcome::Ignored);
    }

    #[test]
    fn test_opening_second_row_menu_closes_first() {
        let stack = DialogStackHandle::new();
        let mut first = RowActionsMenu::new(stack.clone());
        let mut second = RowActionsMenu::new(stack.clone());

        first.open_for(job("1"));
        second.open_for(job("2"));

        assert!(!first.is_open());
        assert!(second.is_open());
        assert_eq!(stack.read().len(), 1);
    }

    #[test]
    fn test_outside_click_closes_only_active_overlay() {
        let stack = DialogStackHandle::new();
        let help = HelpOverlay::new(stack.clone(), vec![("?".to_string(), "help".to_string())]);
        let modal = ConfirmDialog::new(stack.clone());
        help.toggle();
        modal.coordinator().open();

        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 79,
            row: 23,
            modifiers: KeyModifiers::NONE,
        };
        assert!(!help.handle_outside_click(&click));
        assert!(help.is_open());
        assert!(modal.handle_outside_click(&click));
        assert!(help.handle_outside_click(&click));
        assert!(!stack.has_dialogs());
    }
}
