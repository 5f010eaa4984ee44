//! Scheduled jobs page: the paginated job list plus its row menu and
//! confirmation dialog.

use crate::api::{JobQuery, JobStatus, JobSummary, JobsApi, JobsPageLoader};
use crate::app::{Subscription, Topic, TopicRegistry};
use crate::config::Config;
use crate::tui::{
    components::{
        dialogs::{ConfirmDialog, DialogStackHandle, MenuOutcome, Overlay, RowAction, RowActionsMenu},
        lists::{FocusListConfig, LoadTicket, PageLoader, PaginatedFocusList},
        Component,
    },
    events::Event,
    styles::Theme,
    utils::text::fit,
    Frame,
};
use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct JobsPage {
    list: PaginatedFocusList<JobSummary>,
    api: Arc<dyn JobsApi>,
    sender: mpsc::UnboundedSender<Event>,
    page_size: usize,
    enabled_only: bool,
    /// Filter the loaded rows were fetched with
    loaded_enabled_only: bool,

    /// Id of the newest first-page request; older responses are ignored
    refresh_request: u64,
    refreshing: bool,

    menu: RowActionsMenu,
    confirm: ConfirmDialog,
    updates: Subscription,
}

impl JobsPage {
    pub fn new(
        api: Arc<dyn JobsApi>,
        registry: &TopicRegistry,
        dialogs: DialogStackHandle,
        sender: mpsc::UnboundedSender<Event>,
        config: &Config,
    ) -> Self {
        let activate = sender.clone();
        let list = PaginatedFocusList::new(FocusListConfig {
            page_size: config.page_size,
            auto_focus_first: config.auto_focus_first,
            auto_select_first: config.auto_select_first,
        })
        .on_select(move |_: &JobSummary, index| {
            let _ = activate.send(Event::JobActivated(index));
        });

        Self {
            list,
            api,
            sender,
            page_size: config.page_size,
            enabled_only: false,
            loaded_enabled_only: false,
            refresh_request: 0,
            refreshing: false,
            menu: RowActionsMenu::new(dialogs.clone()),
            confirm: ConfirmDialog::new(dialogs),
            updates: registry.subscribe(Topic::JobStatus),
        }
    }

    pub fn list(&self) -> &PaginatedFocusList<JobSummary> {
        &self.list
    }

    pub fn enabled_only(&self) -> bool {
        self.enabled_only
    }

    /// Overlays owned by this page, in no particular order
    pub fn overlays(&self) -> Vec<&dyn Overlay> {
        vec![&self.menu as &dyn Overlay, &self.confirm]
    }

    pub fn overlays_mut(&mut self) -> Vec<&mut dyn Overlay> {
        vec![&mut self.menu as &mut dyn Overlay, &mut self.confirm]
    }

    /// Request the first page again
    pub fn refresh(&mut self) {
        self.refresh_request += 1;
        self.refreshing = true;

        let request = self.refresh_request;
        let query = JobQuery {
            offset: 0,
            limit: self.page_size,
            enabled_only: self.enabled_only,
        };
        let api = Arc::clone(&self.api);
        let sender = self.sender.clone();
        debug!(request, enabled_only = query.enabled_only, "Refreshing jobs");

        tokio::spawn(async move {
            let result = api.list_jobs(&query).await.map_err(|e| e.to_string());
            let _ = sender.send(Event::JobsRefreshed { request, result });
        });
    }

    pub fn toggle_filter(&mut self) {
        self.enabled_only = !self.enabled_only;
        info!(enabled_only = self.enabled_only, "Job filter changed");
        self.refresh();
    }

    pub fn apply_refresh(&mut self, request: u64, result: Result<Vec<JobSummary>, String>) {
        if request != self.refresh_request {
            debug!(request, current = self.refresh_request, "Ignoring superseded refresh");
            return;
        }
        self.refreshing = false;

        match result {
            Ok(jobs) => {
                self.loaded_enabled_only = self.enabled_only;
                self.list.set_external_list(jobs);
            }
            Err(e) => {
                // Keep the rows consistent with the filter they were loaded under
                if self.enabled_only != self.loaded_enabled_only {
                    info!(enabled_only = self.loaded_enabled_only, "Filter change reverted");
                    self.enabled_only = self.loaded_enabled_only;
                }
                warn!(error = %e, "Failed to load jobs");
                let _ = self
                    .sender
                    .send(Event::StatusMessage(format!("Failed to load jobs: {}", e)));
            }
        }
    }

    pub fn apply_page(&mut self, ticket: LoadTicket, result: Result<Vec<JobSummary>, String>) {
        self.list.finish_load_more(ticket, result.map_err(anyhow::Error::msg));
    }

    /// Open the row menu for the job at `index`
    pub fn activate(&mut self, index: usize) {
        if let Some(job) = self.list.items().get(index).cloned() {
            debug!(job = %job.id, "Opening row actions");
            self.menu.open_for(job);
        }
    }

    fn load_more_if_needed(&mut self) {
        if self.refreshing || !self.list.should_load_more(self.list.viewport_end()) {
            return;
        }
        let Some(ticket) = self.list.begin_load_more() else {
            return;
        };

        let loader = JobsPageLoader::new(Arc::clone(&self.api), self.loaded_enabled_only);
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let result = loader
                .load_page(ticket.offset, ticket.limit)
                .await
                .map_err(|e| e.to_string());
            let _ = sender.send(Event::JobsPageLoaded { ticket, result });
        });
    }

    fn choose(&mut self, action: RowAction, job: JobSummary) {
        match action {
            RowAction::Delete => {
                let message = format!("Delete job '{}'?", job.name);
                self.confirm.ask(message, action, job);
            }
            _ => {
                self.execute(action, job);
                self.menu.request_close();
            }
        }
    }

    fn execute(&mut self, action: RowAction, job: JobSummary) {
        if action == RowAction::RunNow {
            self.list.update_where(
                |item| item.id == job.id,
                |item| item.last_status = JobStatus::Running,
            );
        }

        let api = Arc::clone(&self.api);
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let (result, done) = match action {
                RowAction::RunNow => (api.run_job(&job.id).await, "Started"),
                RowAction::ToggleEnabled if job.enabled => {
                    (api.set_enabled(&job.id, false).await, "Disabled")
                }
                RowAction::ToggleEnabled => (api.set_enabled(&job.id, true).await, "Enabled"),
                RowAction::Delete => (api.delete_job(&job.id).await, "Deleted"),
            };

            let message = match result {
                Ok(()) => format!("{} {}", done, job.name),
                Err(e) => {
                    warn!(job = %job.id, error = %e, "Job action failed");
                    format!("{} failed: {}", job.name, e)
                }
            };
            let _ = sender.send(Event::ActionFinished {
                message,
                refresh: action != RowAction::RunNow,
            });
        });
    }

    fn apply_status_updates(&mut self) {
        while let Some(update) = self.updates.try_next() {
            self.list.update_where(
                |job| job.id == update.job_id,
                |job| job.last_status = update.status,
            );
        }
    }

    fn render_row(job: &JobSummary, theme: &Theme) -> Line<'static> {
        let base = if job.enabled {
            theme.text_style()
        } else {
            theme.disabled_style()
        };
        let next_run = job
            .next_run
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        Line::from(vec![
            Span::styled(fit(&job.name, 28), base),
            Span::raw(" "),
            Span::styled(fit(&job.schedule, 14), theme.muted_style()),
            Span::raw(" "),
            Span::styled(fit(job.last_status.label(), 8), theme.job_status_style(job.last_status)),
            Span::raw(" "),
            Span::styled(next_run, base),
        ])
    }
}

#[async_trait]
impl Component for JobsPage {
    async fn handle_key_event(&mut self, event: KeyEvent) -> Result<bool> {
        if self.confirm.is_open() {
            if let Some((action, job)) = self.confirm.handle_key(&event) {
                self.execute(action, job);
                self.menu.request_close();
            }
            return Ok(true);
        }

        if self.menu.is_open() {
            if let MenuOutcome::Chosen(action, job) = self.menu.handle_key(&event) {
                self.choose(action, job);
            }
            return Ok(true);
        }

        Ok(self.list.handle_key(&event))
    }

    async fn handle_mouse_event(&mut self, event: MouseEvent) -> Result<bool> {
        Ok(self.list.handle_mouse(&event))
    }

    async fn tick(&mut self) -> Result<()> {
        self.apply_status_updates();
        self.load_more_if_needed();
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let filter = if self.enabled_only { " · enabled only" } else { "" };
        let title = format!(" Jobs ({} loaded{}) ", self.list.len(), filter);
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(theme.border_style());

        self.list
            .render(frame, area, block, theme, |job| Self::render_row(job, theme));
    }
}
