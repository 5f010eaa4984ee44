//! Keyboard-navigable list that grows page by page.
//!
//! The list mirrors an externally supplied first page and appends further
//! pages fetched on demand, typically when the trailing sentinel row scrolls
//! into view. Exactly one item holds focus at a time.
//!
//! Each external replacement starts a new generation. Pages requested under an
//! older generation are dropped when they arrive, so a slow fetch can never
//! append stale rows to a list that has since been replaced.
//!
//! A failed fetch is not retried on its own. The list waits until the sentinel
//! row has left the viewport and comes back, or until it is replaced.

use super::LoadTicket;
use crate::tui::styles::Theme;
use crate::tui::Frame;
use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Block, List, ListItem, ListState},
};
use tracing::{debug, warn};

/// Number of rows moved by PageUp / PageDown
pub const PAGE_JUMP: usize = 5;

/// Source of additional pages for a [`PaginatedFocusList`]
#[async_trait]
pub trait PageLoader<T: Send + 'static>: Send + Sync {
    async fn load_page(&self, offset: usize, limit: usize) -> Result<Vec<T>>;
}

/// Behaviour switches for a [`PaginatedFocusList`]
#[derive(Debug, Clone)]
pub struct FocusListConfig {
    /// Items requested per page
    pub page_size: usize,
    /// Focus the first item once it appears
    pub auto_focus_first: bool,
    /// Also activate the first item when auto-focusing it
    pub auto_select_first: bool,
}

impl Default for FocusListConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            auto_focus_first: true,
            auto_select_first: false,
        }
    }
}

type SelectCallback<T> = Box<dyn FnMut(&T, usize) + Send + Sync>;

pub struct PaginatedFocusList<T> {
    items: Vec<T>,
    focused: Option<usize>,
    loading: bool,
    has_more: bool,
    /// Last fetch failed; cleared when the sentinel scrolls out or the list is replaced
    failed: bool,
    generation: u64,
    auto_focused: bool,
    config: FocusListConfig,
    state: ListState,
    /// Inner area of the last render, used for mouse hit testing
    viewport: Rect,
    on_select: Option<SelectCallback<T>>,
}

impl<T> PaginatedFocusList<T> {
    pub fn new(config: FocusListConfig) -> Self {
        Self {
            items: Vec::new(),
            focused: None,
            loading: false,
            has_more: true,
            failed: false,
            generation: 0,
            auto_focused: false,
            config,
            state: ListState::default(),
            viewport: Rect::default(),
            on_select: None,
        }
    }

    /// Set the callback invoked when an item is clicked or activated with Enter
    pub fn on_select<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&T, usize) + Send + Sync + 'static,
    {
        self.on_select = Some(Box::new(callback));
        self
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Whether the last page fetch failed and no new trigger has re-armed loading
    pub fn load_failed(&self) -> bool {
        self.failed
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the list with a freshly fetched first page
    ///
    /// Any page still in flight for the previous contents is invalidated.
    pub fn set_external_list(&mut self, items: Vec<T>) {
        self.generation += 1;
        self.loading = false;
        self.failed = false;
        self.has_more = items.len() >= self.config.page_size;
        self.items = items;
        debug!(
            generation = self.generation,
            len = self.items.len(),
            "List replaced"
        );

        self.clamp_focus();
        self.sync_auto_focus();
    }

    /// Whether the sentinel row is visible and another page should be fetched
    pub fn should_load_more(&self, viewport_end: usize) -> bool {
        !self.loading && !self.failed && self.has_more && viewport_end > self.items.len()
    }

    /// Exclusive index of the last row visible during the previous render
    pub fn viewport_end(&self) -> usize {
        self.state.offset() + self.viewport.height as usize
    }

    /// Mark a page fetch as started. Returns `None` while one is already running
    /// or when the server has nothing more.
    pub fn begin_load_more(&mut self) -> Option<LoadTicket> {
        if self.loading || !self.has_more {
            return None;
        }
        self.loading = true;
        let ticket = LoadTicket {
            generation: self.generation,
            offset: self.items.len(),
            limit: self.config.page_size,
        };
        debug!(?ticket, "Loading next page");
        Some(ticket)
    }

    /// Apply the outcome of a page fetch. Returns the number of appended items.
    pub fn finish_load_more(&mut self, ticket: LoadTicket, result: Result<Vec<T>>) -> usize {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Discarding page for a replaced list"
            );
            return 0;
        }
        self.loading = false;

        match result {
            Ok(page) => {
                self.failed = false;
                let count = page.len();
                if count < ticket.limit {
                    self.has_more = false;
                }
                self.items.extend(page);
                self.sync_auto_focus();
                count
            }
            Err(e) => {
                warn!(error = %e, offset = ticket.offset, "Failed to load more items");
                self.failed = true;
                0
            }
        }
    }

    /// Move focus to an item and keep it scrolled into view
    pub fn focus(&mut self, index: usize) {
        if index >= self.items.len() {
            return;
        }
        self.focused = Some(index);
        self.auto_focused = true;
        self.state.select(Some(index));
    }

    /// Focus an item and run the select callback for it
    pub fn select_item(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.focus(index);
        if let (Some(item), Some(callback)) = (self.items.get(index), self.on_select.as_mut()) {
            callback(item, index);
        }
        true
    }

    /// Handle roving-focus keys. Returns whether the key was consumed.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        if self.items.is_empty() {
            return false;
        }
        let index = self.focused.unwrap_or(0);

        if event.code == KeyCode::Enter {
            return self.select_item(index);
        }

        match navigate(event.code, index, self.items.len()) {
            Some(next) => {
                self.focus(next);
                true
            }
            None => false,
        }
    }

    /// Click to select, wheel to move focus
    pub fn handle_mouse(&mut self, event: &MouseEvent) -> bool {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => match self.row_at(event.column, event.row) {
                Some(index) => self.select_item(index),
                None => false,
            },
            MouseEventKind::ScrollDown => self.handle_key(&KeyEvent::from(KeyCode::Down)),
            MouseEventKind::ScrollUp => self.handle_key(&KeyEvent::from(KeyCode::Up)),
            _ => false,
        }
    }

    /// Update every item matching `predicate` in place
    pub fn update_where<P, F>(&mut self, predicate: P, mut update: F) -> usize
    where
        P: Fn(&T) -> bool,
        F: FnMut(&mut T),
    {
        let mut updated = 0;
        for item in self.items.iter_mut().filter(|item| predicate(item)) {
            update(item);
            updated += 1;
        }
        updated
    }

    /// Render the list plus a trailing sentinel row while more pages exist
    pub fn render<F>(&mut self, frame: &mut Frame, area: Rect, block: Block<'_>, theme: &Theme, render_item: F)
    where
        F: Fn(&T) -> Line<'static>,
    {
        self.viewport = block.inner(area);

        let mut rows: Vec<ListItem> = self
            .items
            .iter()
            .map(|item| ListItem::new(render_item(item)))
            .collect();

        if self.loading {
            rows.push(ListItem::new(Line::styled("Loading…", theme.muted_style())));
        } else if self.has_more {
            rows.push(ListItem::new(Line::styled("More…", theme.muted_style())));
        }

        // With the last item focused, scroll one further so the sentinel shows
        let height = self.viewport.height as usize;
        let sentinel = rows.len() > self.items.len();
        if sentinel && !self.items.is_empty() && self.focused == Some(self.items.len() - 1) && rows.len() > height {
            *self.state.offset_mut() = rows.len() - height;
        }

        let list = List::new(rows)
            .block(block)
            .style(theme.text_style())
            .highlight_style(theme.selection_style())
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, area, &mut self.state);

        // Scrolling the sentinel out of view re-arms loading after a failure
        if self.failed && self.viewport_end() <= self.items.len() {
            debug!("Sentinel left the viewport, loading re-armed");
            self.failed = false;
        }
    }

    fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.viewport;
        if column < area.x || column >= area.x + area.width || row < area.y || row >= area.y + area.height {
            return None;
        }
        let index = self.state.offset() + (row - area.y) as usize;
        (index < self.items.len()).then_some(index)
    }

    fn clamp_focus(&mut self) {
        self.focused = match self.focused {
            Some(_) if self.items.is_empty() => None,
            Some(index) => Some(index.min(self.items.len() - 1)),
            None => None,
        };
        self.state.select(self.focused);
    }

    fn sync_auto_focus(&mut self) {
        if !self.config.auto_focus_first || self.auto_focused || self.items.is_empty() {
            return;
        }
        if self.focused.is_some() {
            return;
        }
        if self.config.auto_select_first {
            self.select_item(0);
        } else {
            self.focus(0);
        }
    }
}

impl<T: Send + 'static> PaginatedFocusList<T> {
    /// Fetch and append the next page
    pub async fn load_more(&mut self, loader: &dyn PageLoader<T>) -> usize {
        let Some(ticket) = self.begin_load_more() else {
            return 0;
        };
        let result = loader.load_page(ticket.offset, ticket.limit).await;
        self.finish_load_more(ticket, result)
    }
}

/// Next focus index for a navigation key, saturating at both ends
pub fn navigate(code: KeyCode, index: usize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let last = len - 1;
    let index = index.min(last);

    let next = match code {
        KeyCode::Down => index.saturating_add(1).min(last),
        KeyCode::Up => index.saturating_sub(1),
        KeyCode::Home => 0,
        KeyCode::End => last,
        KeyCode::PageDown => index.saturating_add(PAGE_JUMP).min(last),
        KeyCode::PageUp => index.saturating_sub(PAGE_JUMP),
        _ => return None,
    };
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, widgets::Borders, Terminal};
    use std::sync::{Arc, Mutex};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn five() -> Vec<String> {
        (1..=5).map(|i| format!("x{}", i)).collect()
    }

    fn list_with(items: Vec<String>, page_size: usize) -> PaginatedFocusList<String> {
        let mut list = PaginatedFocusList::new(FocusListConfig {
            page_size,
            ..Default::default()
        });
        list.set_external_list(items);
        list
    }

    struct FixedLoader(Vec<String>);

    #[async_trait]
    impl PageLoader<String> for FixedLoader {
        async fn load_page(&self, _offset: usize, _limit: usize) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    struct FailingLoader;

    #[async_trait]
    impl PageLoader<String> for FailingLoader {
        async fn load_page(&self, offset: usize, _limit: usize) -> Result<Vec<String>> {
            Err(anyhow::anyhow!("backend unavailable at offset {}", offset))
        }
    }

    #[test]
    fn test_navigation_clamps() {
        let mut list = list_with(five(), 5);
        assert_eq!(list.focused(), Some(0));

        list.handle_key(&key(KeyCode::Up));
        assert_eq!(list.focused(), Some(0));

        list.focus(4);
        list.handle_key(&key(KeyCode::Down));
        assert_eq!(list.focused(), Some(4));

        list.focus(2);
        list.handle_key(&key(KeyCode::PageDown));
        assert_eq!(list.focused(), Some(4));

        list.handle_key(&key(KeyCode::PageUp));
        assert_eq!(list.focused(), Some(0));
    }

    #[test]
    fn test_navigate_helper() {
        assert_eq!(navigate(KeyCode::Home, 3, 5), Some(0));
        assert_eq!(navigate(KeyCode::End, 0, 5), Some(4));
        assert_eq!(navigate(KeyCode::Down, 1, 5), Some(2));
        assert_eq!(navigate(KeyCode::PageDown, 0, 20), Some(5));
        assert_eq!(navigate(KeyCode::Char('j'), 0, 5), None);
        assert_eq!(navigate(KeyCode::Down, 0, 0), None);
    }

    #[test]
    fn test_unhandled_keys_are_not_consumed() {
        let mut list = list_with(five(), 5);
        assert!(!list.handle_key(&key(KeyCode::Char('q'))));
        assert!(!list.handle_key(&key(KeyCode::Tab)));
        assert_eq!(list.focused(), Some(0));
    }

    #[test]
    fn test_enter_invokes_select_callback() {
        let selected = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&selected);
        let mut list = PaginatedFocusList::new(FocusListConfig::default())
            .on_select(move |item: &String, index| sink.lock().unwrap().push((item.clone(), index)));
        list.set_external_list(five());

        list.handle_key(&key(KeyCode::Down));
        list.handle_key(&key(KeyCode::Enter));

        assert_eq!(*selected.lock().unwrap(), vec![("x2".to_string(), 1)]);
    }

    #[test]
    fn test_auto_select_first_runs_once() {
        let selected = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&selected);
        let mut list = PaginatedFocusList::new(FocusListConfig {
            page_size: 5,
            auto_focus_first: true,
            auto_select_first: true,
        })
        .on_select(move |_: &String, _| *sink.lock().unwrap() += 1);

        list.set_external_list(Vec::new());
        assert_eq!(*selected.lock().unwrap(), 0);

        list.set_external_list(five());
        list.set_external_list(five());
        assert_eq!(*selected.lock().unwrap(), 1);
        assert_eq!(list.focused(), Some(0));
    }

    #[test]
    fn test_auto_focus_disabled() {
        let mut list = PaginatedFocusList::new(FocusListConfig {
            auto_focus_first: false,
            ..Default::default()
        });
        list.set_external_list(five());
        assert_eq!(list.focused(), None);
    }

    #[tokio::test]
    async fn test_load_more_appends() {
        let mut list = list_with(five(), 5);
        let loader = FixedLoader(vec!["x6".to_string(), "x7".to_string()]);

        let appended = list.load_more(&loader).await;

        assert_eq!(appended, 2);
        assert_eq!(list.items(), &["x1", "x2", "x3", "x4", "x5", "x6", "x7"]);
        assert!(!list.is_loading());
        // Short page means the server ran out
        assert!(!list.has_more());
    }

    #[tokio::test]
    async fn test_failed_load_more_is_noop() {
        let mut list = list_with(five(), 5);

        let appended = list.load_more(&FailingLoader).await;

        assert_eq!(appended, 0);
        assert_eq!(list.items(), five().as_slice());
        assert!(!list.is_loading());
        assert!(list.has_more());
    }

    #[tokio::test]
    async fn test_failed_load_more_does_not_retry_by_itself() {
        let mut list = list_with(five(), 5);
        assert!(list.should_load_more(6));

        list.load_more(&FailingLoader).await;

        assert!(list.load_failed());
        assert!(!list.should_load_more(6));
        assert!(!list.should_load_more(100));

        // A replacement list re-arms loading
        list.set_external_list(five());
        assert!(!list.load_failed());
        assert!(list.should_load_more(6));
    }

    #[tokio::test]
    async fn test_sentinel_leaving_viewport_rearms_loading() {
        let items: Vec<String> = (1..=20).map(|i| format!("x{}", i)).collect();
        let mut list = list_with(items, 20);
        let theme = Theme::default();
        let mut terminal = Terminal::new(TestBackend::new(20, 10)).unwrap();
        let mut draw = |list: &mut PaginatedFocusList<String>| {
            terminal
                .draw(|frame| {
                    let area = frame.size();
                    list.render(frame, area, Block::default().borders(Borders::ALL), &theme, |item| {
                        Line::from(item.clone())
                    });
                })
                .unwrap();
        };

        // Scroll to the end so the sentinel is visible, then fail a fetch
        list.focus(19);
        draw(&mut list);
        assert!(list.should_load_more(list.viewport_end()));
        list.load_more(&FailingLoader).await;
        draw(&mut list);
        assert!(!list.should_load_more(list.viewport_end()));

        // Back to the top: the sentinel is out of view
        list.focus(0);
        draw(&mut list);
        assert!(!list.load_failed());
        assert!(!list.should_load_more(list.viewport_end()));

        list.focus(19);
        draw(&mut list);
        assert!(list.should_load_more(list.viewport_end()));
    }

    #[test]
    fn test_stale_page_is_discarded() {
        let mut list = list_with(five(), 5);
        let ticket = list.begin_load_more().unwrap();
        assert!(list.is_loading());
        assert!(list.begin_load_more().is_none());

        list.set_external_list(vec!["filtered".to_string()]);
        let appended = list.finish_load_more(ticket, Ok(vec!["x6".to_string()]));

        assert_eq!(appended, 0);
        assert_eq!(list.items(), &["filtered"]);
        assert!(!list.is_loading());
    }

    #[test]
    fn test_stale_page_does_not_clear_newer_loading_flag() {
        let mut list = list_with(five(), 5);
        let stale = list.begin_load_more().unwrap();
        list.set_external_list(five());
        let current = list.begin_load_more().unwrap();

        list.finish_load_more(stale, Ok(Vec::new()));
        assert!(list.is_loading());

        list.finish_load_more(current, Ok(vec!["x6".to_string()]));
        assert!(!list.is_loading());
        assert_eq!(list.len(), 6);
    }

    #[test]
    fn test_replacement_clamps_focus() {
        let mut list = list_with(five(), 5);
        list.focus(4);
        list.set_external_list(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(list.focused(), Some(1));

        list.set_external_list(Vec::new());
        assert_eq!(list.focused(), None);
        assert!(!list.handle_key(&key(KeyCode::Down)));
    }

    #[test]
    fn test_should_load_more_when_sentinel_visible() {
        let mut list = list_with(five(), 5);
        assert!(list.has_more());
        assert!(!list.should_load_more(5));
        assert!(list.should_load_more(6));

        list.begin_load_more();
        assert!(!list.should_load_more(6));
    }

    #[test]
    fn test_update_where() {
        let mut list = list_with(five(), 5);
        let updated = list.update_where(|item| item.ends_with('3'), |item| item.push('!'));
        assert_eq!(updated, 1);
        assert_eq!(list.items()[2], "x3!");
    }

    #[test]
    fn test_render_shows_sentinel_and_enables_clicks() {
        let mut list = list_with(five(), 5);
        let theme = Theme::default();
        let backend = TestBackend::new(20, 10);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal
            .draw(|frame| {
                let area = frame.size();
                list.render(frame, area, Block::default().borders(Borders::ALL), &theme, |item| {
                    Line::from(item.clone())
                });
            })
            .unwrap();

        let buffer = terminal.backend().buffer().clone();
        let rendered: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(rendered.contains("x5"));
        assert!(rendered.contains("More"));
        assert!(list.should_load_more(list.viewport_end()));

        // Row 3 of the terminal is the third item inside the border
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 4,
            row: 3,
            modifiers: KeyModifiers::NONE,
        };
        assert!(list.handle_mouse(&click));
        assert_eq!(list.focused(), Some(2));
    }
}
