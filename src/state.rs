use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::cards::{ManagerCard, build_manager_cards};
use crate::charts::{ChartRegistry, render_all};
use crate::detail::ManagerDetail;
use crate::fetch::validate_league_id;
use crate::overview::LeagueOverview;
use crate::payload::LeagueAnalytics;

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Cards,
    Charts,
    Trends,
    Managers,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Cards, Tab::Charts, Tab::Trends, Tab::Managers];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Cards => "Managers",
            Tab::Charts => "Charts",
            Tab::Trends => "Trends",
            Tab::Managers => "Season Trends",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Tab::Cards => Tab::Charts,
            Tab::Charts => Tab::Trends,
            Tab::Trends => Tab::Managers,
            Tab::Managers => Tab::Cards,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// idle → loading → ready | failed; a new request may start from any
/// state except loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPhase {
    Idle,
    Loading {
        request_id: u64,
        league_id: String,
        started: Instant,
    },
    Ready,
    Failed,
}

#[derive(Debug, Clone)]
pub struct ModalState {
    pub detail: ManagerDetail,
    pub scroll: u16,
}

#[derive(Debug, Clone)]
pub enum Delta {
    AnalysisLoaded {
        request_id: u64,
        data: Box<LeagueAnalytics>,
    },
    AnalysisFailed {
        request_id: u64,
        /// Banner text.
        message: String,
        /// Diagnostic detail for the console.
        error: String,
    },
    ExportFinished {
        path: String,
        managers: usize,
        weeks: usize,
        improvements: usize,
    },
    ExportFailed {
        path: String,
        error: String,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Analyze { request_id: u64, league_id: String },
    Export {
        path: PathBuf,
        data: Box<LeagueAnalytics>,
    },
}

#[derive(Debug)]
pub struct AppState {
    pub tab: Tab,
    pub input: String,
    pub input_mode: InputMode,
    pub phase: RequestPhase,
    pub error: Option<String>,
    pub results_visible: bool,
    pub data: Option<LeagueAnalytics>,
    pub league_id: Option<String>,
    pub overview: Option<LeagueOverview>,
    pub cards: Vec<ManagerCard>,
    pub charts: ChartRegistry,
    pub selected_card: usize,
    pub selected_section: usize,
    pub modal: Option<ModalState>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub updated_at: Option<String>,
    pub last_request_duration: Option<Duration>,
    pub source_label: &'static str,
    next_request_id: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            tab: Tab::Cards,
            input: String::new(),
            input_mode: InputMode::Normal,
            phase: RequestPhase::Idle,
            error: None,
            results_visible: false,
            data: None,
            league_id: None,
            overview: None,
            cards: Vec::new(),
            charts: ChartRegistry::new(),
            selected_card: 0,
            selected_section: 0,
            modal: None,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
            updated_at: None,
            last_request_duration: None,
            source_label: "http",
            next_request_id: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, RequestPhase::Loading { .. })
    }

    pub fn loading_league_id(&self) -> Option<&str> {
        match &self.phase {
            RequestPhase::Loading { league_id, .. } => Some(league_id),
            _ => None,
        }
    }

    pub fn is_pending(&self, request_id: u64) -> bool {
        matches!(self.phase, RequestPhase::Loading { request_id: id, .. } if id == request_id)
    }

    /// Validates the input and, if a request may start, moves to loading and
    /// returns the command for the provider. Returns `None` when nothing
    /// should be sent.
    pub fn begin_analysis(&mut self) -> Option<ProviderCommand> {
        let league_id = match validate_league_id(&self.input) {
            Ok(id) => id.to_string(),
            Err(err) => {
                self.error = Some(err.user_message().to_string());
                self.push_log("[WARN] League ID is empty");
                return None;
            }
        };
        if let Some(pending) = self.loading_league_id() {
            let msg = format!("[INFO] Analysis for {pending} still running; request ignored");
            self.push_log(msg);
            return None;
        }

        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.error = None;
        self.results_visible = false;
        self.modal = None;
        self.phase = RequestPhase::Loading {
            request_id,
            league_id: league_id.clone(),
            started: Instant::now(),
        };
        self.push_log(format!("[INFO] Analyzing league {league_id}"));
        Some(ProviderCommand::Analyze {
            request_id,
            league_id,
        })
    }

    /// Leaves the loading phase if `request_id` is the outstanding request.
    /// Returns false for stale or duplicate completions.
    fn finish_request(&mut self, request_id: u64, next: RequestPhase) -> bool {
        let RequestPhase::Loading {
            request_id: pending,
            league_id,
            started,
        } = &self.phase
        else {
            return false;
        };
        if *pending != request_id {
            return false;
        }
        self.last_request_duration = Some(started.elapsed());
        if next == RequestPhase::Ready {
            self.league_id = Some(league_id.clone());
        }
        self.phase = next;
        true
    }

    /// Replaces the payload wholesale and runs every render pass.
    pub fn display_results(&mut self, data: LeagueAnalytics) {
        self.overview = Some(LeagueOverview::from_payload(&data));
        self.cards = build_manager_cards(&data);
        render_all(&mut self.charts, &data);
        self.data = Some(data);
        self.selected_card = 0;
        self.selected_section = 0;
        self.modal = None;
        self.results_visible = true;
        self.updated_at = Some(chrono::Local::now().format("%H:%M:%S").to_string());

        let failures: Vec<String> = self
            .charts
            .failures()
            .into_iter()
            .map(|(canvas, err)| format!("[WARN] Chart {canvas:?}: {err}"))
            .collect();
        for msg in failures {
            self.push_log(msg);
        }
    }

    /// Drops the previous league's payload and everything derived from it.
    pub fn clear_results(&mut self) {
        self.results_visible = false;
        self.data = None;
        self.league_id = None;
        self.overview = None;
        self.cards.clear();
        self.charts.clear();
        self.modal = None;
        self.selected_card = 0;
        self.selected_section = 0;
    }

    pub fn open_detail(&mut self, user_id: &str) {
        if !self.results_visible {
            return;
        }
        let Some(data) = self.data.as_ref() else {
            return;
        };
        if let Some(detail) = ManagerDetail::for_manager(data, user_id) {
            self.modal = Some(ModalState { detail, scroll: 0 });
        }
    }

    pub fn open_selected_detail(&mut self) {
        let user_id = match self.tab {
            Tab::Managers => self.selected_section_user().map(str::to_string),
            _ => self.cards.get(self.selected_card).map(|c| c.user_id.clone()),
        };
        if let Some(user_id) = user_id {
            self.open_detail(&user_id);
        }
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    pub fn scroll_modal_down(&mut self, max_scroll: u16) {
        if let Some(modal) = self.modal.as_mut() {
            modal.scroll = (modal.scroll + 1).min(max_scroll);
        }
    }

    pub fn scroll_modal_up(&mut self) {
        if let Some(modal) = self.modal.as_mut() {
            modal.scroll = modal.scroll.saturating_sub(1);
        }
    }

    /// User-list indices of managers that have a season section.
    pub fn section_indices(&self) -> Vec<usize> {
        self.data
            .as_ref()
            .map(|data| data.analyzed_users().into_iter().map(|(idx, _, _)| idx).collect())
            .unwrap_or_default()
    }

    pub fn selected_section_user(&self) -> Option<&str> {
        let data = self.data.as_ref()?;
        let (_, user, _) = data.analyzed_users().into_iter().nth(self.selected_section)?;
        Some(user.user_id.as_str())
    }

    pub fn select_next(&mut self) {
        let total = self.selection_len();
        let selected = self.selection_mut();
        *selected = if total == 0 { 0 } else { (*selected + 1) % total };
    }

    pub fn select_prev(&mut self) {
        let total = self.selection_len();
        let selected = self.selection_mut();
        *selected = if total == 0 {
            0
        } else if *selected == 0 {
            total - 1
        } else {
            *selected - 1
        };
    }

    fn selection_len(&self) -> usize {
        match self.tab {
            Tab::Managers => self.section_indices().len(),
            _ => self.cards.len(),
        }
    }

    fn selection_mut(&mut self) -> &mut usize {
        match self.tab {
            Tab::Managers => &mut self.selected_section,
            _ => &mut self.selected_card,
        }
    }

    pub fn cycle_tab(&mut self) {
        self.tab = self.tab.next();
    }

    pub fn export_command(&mut self, export_dir: &Path) -> Option<ProviderCommand> {
        let data = self.data.as_ref().filter(|_| self.results_visible);
        let Some(data) = data else {
            self.push_log("[INFO] Nothing to export yet");
            return None;
        };
        let league = self
            .league_id
            .clone()
            .unwrap_or_else(|| "league".to_string());
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = export_dir.join(format!("ffa_{league}_{stamp}.xlsx"));
        Some(ProviderCommand::Export {
            path,
            data: Box::new(data.clone()),
        })
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::info!(target: "console", "{msg}");
        self.logs.push_back(msg);
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::AnalysisLoaded { request_id, data } => {
            if !state.is_pending(request_id) {
                state.push_log(format!("[INFO] Dropped stale analysis #{request_id}"));
                return;
            }
            let managers = data.manager_analytics.len();
            state.display_results(*data);
            state.finish_request(request_id, RequestPhase::Ready);
            state.push_log(format!("[INFO] Loaded analytics for {managers} managers"));
        }
        Delta::AnalysisFailed {
            request_id,
            message,
            error,
        } => {
            if !state.finish_request(request_id, RequestPhase::Failed) {
                state.push_log(format!("[INFO] Dropped stale failure #{request_id}"));
                return;
            }
            state.clear_results();
            state.error = Some(message);
            state.push_log(format!("[WARN] Analysis failed: {error}"));
        }
        Delta::ExportFinished {
            path,
            managers,
            weeks,
            improvements,
        } => {
            state.push_log(format!(
                "[INFO] Exported {managers} managers, {weeks} weeks, {improvements} improvements to {path}"
            ));
        }
        Delta::ExportFailed { path, error } => {
            state.push_log(format!("[WARN] Export to {path} failed: {error}"));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
