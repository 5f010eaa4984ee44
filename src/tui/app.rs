use crate::{
    api::JobsApi,
    app::TopicRegistry,
    config::Config,
    tui::{
        components::{
            dialogs::{DialogStackHandle, HelpOverlay, Overlay},
            Component,
        },
        events::Event,
        keys::KeyMap,
        pages::JobsPage,
        styles::Theme,
        Frame,
    },
};
use anyhow::Result;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::Paragraph;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// How long an action result stays in the status bar
const STATUS_TTL: Duration = Duration::from_secs(4);

/// Main application state and controller
pub struct App {
    /// Whether the application should quit
    pub should_quit: bool,

    /// Current application dimensions
    pub size: Rect,

    /// Key mappings for the application
    pub key_map: KeyMap,

    /// Current theme for styling
    pub theme: Theme,

    /// Status message to display
    pub status_message: Option<String>,

    /// Shared overlay stack for every dialog in the dashboard
    dialogs: DialogStackHandle,

    help: HelpOverlay,
    jobs: JobsPage,
    mouse_enabled: bool,

    /// Event sender for internal communication
    event_sender: mpsc::UnboundedSender<Event>,
}

impl App {
    /// Create the dashboard and request the first page of jobs
    pub fn new(
        api: Arc<dyn JobsApi>,
        registry: &TopicRegistry,
        config: &Config,
        event_sender: mpsc::UnboundedSender<Event>,
    ) -> Self {
        let key_map = KeyMap::default();
        let dialogs = DialogStackHandle::new();
        let help = HelpOverlay::new(dialogs.clone(), key_map.help_lines());
        let mut jobs = JobsPage::new(api, registry, dialogs.clone(), event_sender.clone(), config);
        jobs.refresh();

        Self {
            should_quit: false,
            size: Rect::default(),
            key_map,
            theme: Theme::default(),
            status_message: None,
            dialogs,
            help,
            jobs,
            mouse_enabled: config.mouse_enabled,
            event_sender,
        }
    }

    pub fn jobs(&self) -> &JobsPage {
        &self.jobs
    }

    /// Handle incoming events. Returns true once the app should exit.
    pub async fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Key(key_event) => self.handle_key(key_event).await?,

            Event::Mouse(mouse_event) => {
                if self.mouse_enabled {
                    self.handle_mouse(mouse_event).await?;
                }
            }

            Event::Resize(width, height) => {
                self.size = Rect::new(0, 0, width, height);
            }

            Event::Tick => self.jobs.tick().await?,

            Event::JobsRefreshed { request, result } => self.jobs.apply_refresh(request, result),

            Event::JobsPageLoaded { ticket, result } => self.jobs.apply_page(ticket, result),

            Event::JobActivated(index) => self.jobs.activate(index),

            Event::ActionFinished { message, refresh } => {
                self.show_status(message);
                if refresh {
                    self.jobs.refresh();
                }
            }

            Event::StatusMessage(message) => {
                self.status_message = Some(message);
            }

            Event::ClearStatus => {
                self.status_message = None;
            }
        }

        Ok(self.should_quit)
    }

    async fn handle_key(&mut self, event: KeyEvent) -> Result<()> {
        if self.key_map.force_quit.matches(&event) {
            self.should_quit = true;
            return Ok(());
        }

        // Help swallows every key while it is the active overlay
        if self.help.is_open() && self.help.coordinator().is_top() {
            self.help.handle_key(&event);
            return Ok(());
        }

        if !self.dialogs.has_dialogs() {
            if self.key_map.quit.matches(&event) {
                self.should_quit = true;
                return Ok(());
            }
            if self.key_map.help.matches(&event) {
                self.help.toggle();
                return Ok(());
            }
            if self.key_map.refresh.matches(&event) {
                self.jobs.refresh();
                return Ok(());
            }
            if self.key_map.filter.matches(&event) {
                self.jobs.toggle_filter();
                return Ok(());
            }
        }

        self.jobs.handle_key_event(event).await?;
        Ok(())
    }

    async fn handle_mouse(&mut self, event: MouseEvent) -> Result<()> {
        match self.dialogs.top() {
            Some(top) => {
                let mut overlays = self.jobs.overlays();
                overlays.push(&self.help);
                if let Some(overlay) = overlays.into_iter().find(|o| o.coordinator().id() == &top) {
                    if overlay.handle_outside_click(&event) {
                        debug!(dialog = %top, "Closed overlay by outside click");
                    }
                }
            }
            None => {
                self.jobs.handle_mouse_event(event).await?;
            }
        }
        Ok(())
    }

    /// Show a status message that clears itself after a while
    fn show_status(&mut self, message: String) {
        self.status_message = Some(message);
        let sender = self.event_sender.clone();
        tokio::spawn(async move {
            tokio::time::sleep(STATUS_TTL).await;
            let _ = sender.send(Event::ClearStatus);
        });
    }

    /// Render the application UI
    pub fn render(&mut self, frame: &mut Frame) {
        self.size = frame.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Job list
                Constraint::Length(1), // Status bar
            ])
            .split(self.size);

        self.jobs.render(frame, chunks[0], &self.theme);

        // Overlays draw bottom to top so the active one ends up above the rest
        let dialogs = self.dialogs.clone();
        let mut overlays = self.jobs.overlays_mut();
        overlays.push(&mut self.help);
        overlays.retain(|overlay| overlay.is_open());
        overlays.sort_by_key(|overlay| dialogs.position(overlay.coordinator().id()));
        for overlay in overlays {
            overlay.render(frame, chunks[0], &self.theme);
        }

        self.render_status_bar(frame, chunks[1]);
    }

    /// Render the status bar
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let status_text = match &self.status_message {
            Some(message) if !message.is_empty() => message.clone(),
            _ => {
                let list = self.jobs.list();
                let position = list
                    .focused()
                    .map(|index| format!("{}/{}", index + 1, list.len()))
                    .unwrap_or_else(|| format!("0/{}", list.len()));
                let more = if list.is_loading() {
                    " | loading"
                } else if list.has_more() {
                    " | more available"
                } else {
                    ""
                };
                format!("{}{} | ? help | q quit", position, more)
            }
        };

        let status_paragraph = Paragraph::new(status_text).style(self.theme.status_bar_style());
        frame.render_widget(status_paragraph, area);
    }
}
