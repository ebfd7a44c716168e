use crate::logging::LogBuffer;
use anyhow::Context;
use console_api::{AdminBackend, ApiError, AuthFailure, DEFAULT_PAGE_LIMIT, LoginData};
use console_core::config::{AppConfig, RefreshInterval};
use console_core::credential::CredentialStore;
use console_core::diagnostics::{DiagnosticRecord, DiagnosticsLog, Outcome};
use console_core::model::{Notification, RedemptionRecord, Task, User};
use console_core::validate::{
    FieldError, FieldKind, FieldRule, FormField, validate_field, validate_form,
};
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::StreamExt;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};
use std::collections::{HashMap, HashSet};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use time::UtcOffset;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

const LOG_PANEL_HEIGHT: u16 = 7;
const TOAST_TTL: Duration = Duration::from_secs(5);
const REDRAW_INTERVAL: Duration = Duration::from_millis(200);

/// Everything the console needs from the outside world.
pub struct TuiContext {
    pub backend: Arc<dyn AdminBackend>,
    pub credentials: CredentialStore,
    pub config: AppConfig,
    pub config_path: PathBuf,
    pub diagnostics: Option<DiagnosticsLog>,
    pub log_buffer: LogBuffer,
    pub server_url: String,
    pub utc_offset: UtcOffset,
}

pub async fn run_tui(context: TuiContext) -> anyhow::Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    info!(server = %context.server_url, "Starting admin console");
    let result = run_app(&mut terminal, context).await;

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    if let Err(err) = &result {
        error!(error = %err, "Admin console exited with error");
    }
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    context: TuiContext,
) -> anyhow::Result<()> {
    let (mut app, mut events) = TuiApp::new(context);
    app.start();
    let mut input = EventStream::new();
    let mut redraw = tokio::time::interval(REDRAW_INTERVAL);
    debug!(
        redraw_ms = REDRAW_INTERVAL.as_millis() as u64,
        "Console event loop started"
    );

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        tokio::select! {
            maybe_event = input.next() => match maybe_event {
                Some(Ok(Event::Key(key))) => {
                    if app.handle_key(key)? {
                        return Ok(());
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err).context("read terminal event"),
                None => return Ok(()),
            },
            Some(event) = events.recv() => app.handle_event(event)?,
            _ = redraw.tick() => app.on_tick(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Screen {
    Login,
    Dashboard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum View {
    Users,
    Tasks,
    Notifications,
    UserDetail,
}

impl View {
    fn label(self) -> &'static str {
        match self {
            View::Users => "users",
            View::Tasks => "tasks",
            View::Notifications => "notifications",
            View::UserDetail => "user-detail",
        }
    }
}

/// Entries of the main navigation. `UserDetail` is reached by drill-down
/// only and has no entry of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NavItem {
    Users,
    Tasks,
    Notifications,
}

impl NavItem {
    const ALL: [NavItem; 3] = [NavItem::Users, NavItem::Tasks, NavItem::Notifications];

    fn for_view(view: View) -> Option<Self> {
        match view {
            View::Users => Some(NavItem::Users),
            View::Tasks => Some(NavItem::Tasks),
            View::Notifications => Some(NavItem::Notifications),
            View::UserDetail => None,
        }
    }

    fn title(self) -> &'static str {
        match self {
            NavItem::Users => "1 Users",
            NavItem::Tasks => "2 Tasks",
            NavItem::Notifications => "3 Notifications",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TasksMode {
    Live,
    History,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum LoadKind {
    Users,
    Records,
    Tasks,
    Completed,
    Notifications,
}

#[derive(Debug)]
enum Loaded {
    Users(Vec<User>),
    Records(Vec<RedemptionRecord>),
    Tasks(Vec<Task>),
    Completed(Vec<Task>),
    Notifications(Vec<Notification>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FormKind {
    AddUser,
    AddTask,
}

impl FormKind {
    fn title(self) -> &'static str {
        match self {
            FormKind::AddUser => "Add User",
            FormKind::AddTask => "Add Gift Code",
        }
    }

    fn view(self) -> View {
        match self {
            FormKind::AddUser => View::Users,
            FormKind::AddTask => View::Tasks,
        }
    }
}

/// Results delivered back to the event loop by spawned work.
#[derive(Debug)]
enum AppEvent {
    PollTick {
        handle: u64,
    },
    Loaded {
        generation: u64,
        seq: u64,
        kind: LoadKind,
        result: Result<Loaded, JobError>,
    },
    Mutated {
        session: u64,
        form: FormKind,
        result: Result<String, JobError>,
    },
    Deleted {
        session: u64,
        code: String,
        result: Result<String, JobError>,
    },
    LoggedIn(Result<LoginData, JobError>),
}

#[derive(Debug)]
enum JobError {
    Api(ApiError),
    Crashed(String),
}

impl JobError {
    fn auth_failure(&self) -> Option<AuthFailure> {
        match self {
            JobError::Api(ApiError::AuthExpired(reason)) => Some(*reason),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobError::Api(err) => write!(f, "{err}"),
            JobError::Crashed(reason) => write!(f, "job panicked: {reason}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Clone, Debug)]
struct Toast {
    kind: ToastKind,
    text: String,
    shown_at: Instant,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum PendingAction {
    Logout,
    DeleteTask { code: String },
}

/// A one-shot confirmation. Built fresh for every prompt and dropped once
/// answered, so an answer can only ever reach its own action.
#[derive(Clone, Debug)]
struct ConfirmDialog {
    title: String,
    message: String,
    action: PendingAction,
}

struct InputField {
    label: &'static str,
    value: String,
    mask: bool,
    rule: FieldRule,
    error: Option<FieldError>,
}

impl InputField {
    fn new(label: &'static str, rule: FieldRule) -> Self {
        Self {
            label,
            value: String::new(),
            mask: false,
            rule,
            error: None,
        }
    }

    fn with_mask(label: &'static str, rule: FieldRule) -> Self {
        Self {
            mask: true,
            ..Self::new(label, rule)
        }
    }

    fn display_value(&self) -> String {
        if self.mask {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

impl FormField for InputField {
    fn rule(&self) -> FieldRule {
        self.rule
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn set_error(&mut self, error: Option<FieldError>) {
        self.error = error;
    }
}

struct FormState {
    kind: FormKind,
    fields: Vec<InputField>,
    index: usize,
    message: Option<String>,
}

impl FormState {
    fn new(kind: FormKind) -> Self {
        let fields = match kind {
            FormKind::AddUser => vec![InputField::new(
                "FID",
                FieldRule::required(FieldKind::Text),
            )],
            FormKind::AddTask => vec![InputField::new(
                "Gift code",
                FieldRule::required(FieldKind::Text),
            )],
        };
        Self {
            kind,
            fields,
            index: 0,
            message: None,
        }
    }
}

struct TuiApp {
    backend: Arc<dyn AdminBackend>,
    credentials: CredentialStore,
    config: AppConfig,
    config_path: PathBuf,
    diagnostics: Option<DiagnosticsLog>,
    log_buffer: LogBuffer,
    server_url: String,
    utc_offset: UtcOffset,
    events: UnboundedSender<AppEvent>,
    jobs: Vec<JoinHandle<()>>,
    session: u64,
    screen: Screen,
    view: View,
    tasks_mode: TasksMode,
    detail_key: Option<String>,
    nav_highlight: Option<NavItem>,
    generation: u64,
    request_seq: u64,
    latest_requests: HashMap<LoadKind, u64>,
    poller: Poller,
    users: Dataset<User>,
    records: Dataset<RedemptionRecord>,
    tasks: Dataset<Task>,
    completed: Dataset<Task>,
    notifications: Dataset<Notification>,
    toasts: HashMap<View, Toast>,
    busy: usize,
    dialog: Option<ConfirmDialog>,
    deleting: HashSet<String>,
    form: Option<FormState>,
    login_fields: Vec<InputField>,
    login_index: usize,
    login_message: Option<String>,
    login_pending: bool,
}

mod app_core;
mod delete;
mod draw;
mod handle;
mod helpers;
mod jobs;
#[cfg(test)]
mod tests;

use helpers::*;
use jobs::Poller;
