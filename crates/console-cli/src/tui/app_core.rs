use super::*;

impl TuiApp {
    pub(in crate::tui) fn new(context: TuiContext) -> (Self, UnboundedReceiver<AppEvent>) {
        let (events, receiver) = unbounded_channel();
        let interval = context.config.refresh_interval();
        let app = Self {
            backend: context.backend,
            credentials: context.credentials,
            config: context.config,
            config_path: context.config_path,
            diagnostics: context.diagnostics,
            log_buffer: context.log_buffer,
            server_url: context.server_url,
            utc_offset: context.utc_offset,
            events,
            jobs: Vec::new(),
            session: 0,
            screen: Screen::Login,
            view: View::Users,
            tasks_mode: TasksMode::Live,
            detail_key: None,
            nav_highlight: None,
            generation: 0,
            request_seq: 0,
            latest_requests: HashMap::new(),
            poller: Poller::new(interval),
            users: Dataset::default(),
            records: Dataset::default(),
            tasks: Dataset::default(),
            completed: Dataset::default(),
            notifications: Dataset::default(),
            toasts: HashMap::new(),
            busy: 0,
            dialog: None,
            deleting: HashSet::new(),
            form: None,
            login_fields: login_fields(),
            login_index: 0,
            login_message: None,
            login_pending: false,
        };
        (app, receiver)
    }

    /// Opens the dashboard when a usable credential is stored, otherwise
    /// the login screen.
    pub(in crate::tui) fn start(&mut self) {
        if self
            .credentials
            .usable_at(time::OffsetDateTime::now_utc())
        {
            self.screen = Screen::Dashboard;
            self.navigate(View::Users);
        } else {
            info!("No usable credential; showing login");
            self.credentials.clear();
            self.screen = Screen::Login;
        }
    }

    /// The single entry point for view changes. Teardown of the poller
    /// always happens before the new view is set up.
    pub(in crate::tui) fn navigate(&mut self, view: View) {
        self.poller.cancel();
        self.nav_highlight = NavItem::for_view(view);
        self.view = view;
        if view != View::UserDetail {
            self.detail_key = None;
        }
        self.tasks_mode = TasksMode::Live;
        self.generation += 1;
        debug!(view = view.label(), generation = self.generation, "Navigated");

        match view {
            View::Users => self.dispatch_load(LoadKind::Users),
            View::UserDetail => {
                self.records.reset();
                self.dispatch_load(LoadKind::Records);
            }
            View::Tasks => {
                self.dispatch_load(LoadKind::Tasks);
                self.poller.start(&self.events);
            }
            View::Notifications => self.dispatch_load(LoadKind::Notifications),
        }
    }

    pub(in crate::tui) fn open_user_detail(&mut self, fid: String) {
        info!(fid = %fid, "Opening user detail");
        self.detail_key = Some(fid);
        self.navigate(View::UserDetail);
    }

    /// Completed-task sub-view of Tasks. Live polling stops while it is
    /// shown.
    pub(in crate::tui) fn show_history(&mut self) {
        self.poller.cancel();
        self.view = View::Tasks;
        self.nav_highlight = Some(NavItem::Tasks);
        self.tasks_mode = TasksMode::History;
        self.generation += 1;
        debug!(generation = self.generation, "Showing completed tasks");
        self.dispatch_load(LoadKind::Completed);
    }

    /// Re-runs the loader of whatever is on screen.
    pub(in crate::tui) fn reload_current(&mut self) {
        match (self.view, self.tasks_mode) {
            (View::Tasks, TasksMode::History) => self.show_history(),
            (View::UserDetail, _) => match self.detail_key.clone() {
                Some(fid) => self.open_user_detail(fid),
                None => self.navigate(View::Users),
            },
            (view, _) => self.navigate(view),
        }
    }

    pub(in crate::tui) fn change_interval(&mut self, interval: RefreshInterval) {
        if interval == self.poller.interval() {
            return;
        }
        self.config.set_refresh_interval(interval);
        if let Err(err) = self.config.save(&self.config_path) {
            warn!(error = %err, "Failed to persist refresh interval");
        }
        self.poller.set_interval(interval, &self.events);
        info!(
            interval_ms = interval.as_millis(),
            polling = self.poller.is_running(),
            "Refresh interval changed"
        );
        self.toast(
            View::Tasks,
            ToastKind::Info,
            format!("Refresh interval set to {interval}"),
        );
    }

    /// Handles a rejected credential. The transport has already cleared the
    /// store; this tears the session down and shows the login screen.
    pub(in crate::tui) fn deauthenticate(&mut self, reason: AuthFailure) {
        if self.screen == Screen::Login {
            debug!(reason = %reason, "Already on login screen");
            return;
        }
        warn!(reason = %reason, "Session expired; returning to login");
        self.end_session(Some("Session expired, please log in again".to_string()));
    }

    /// Operator-initiated logout.
    pub(in crate::tui) fn logout(&mut self) {
        info!("Logging out");
        self.credentials.clear();
        self.end_session(Some("Logged out".to_string()));
    }

    fn end_session(&mut self, notice: Option<String>) {
        self.poller.cancel();
        self.abort_jobs();
        self.session += 1;
        self.generation += 1;
        self.latest_requests.clear();
        self.dialog = None;
        self.form = None;
        self.deleting.clear();
        self.busy = 0;
        self.toasts.clear();
        self.nav_highlight = None;
        self.screen = Screen::Login;
        self.login_pending = false;
        self.login_index = 0;
        if let Some(password) = self.login_fields.get_mut(1) {
            password.value.clear();
        }
        self.login_message = notice;
    }

    pub(in crate::tui) fn toast(&mut self, view: View, kind: ToastKind, text: String) {
        self.toasts.insert(
            view,
            Toast {
                kind,
                text,
                shown_at: Instant::now(),
            },
        );
    }

    pub(in crate::tui) fn current_toast(&self) -> Option<&Toast> {
        self.toasts
            .get(&self.view)
            .filter(|toast| toast.shown_at.elapsed() < TOAST_TTL)
    }

    pub(in crate::tui) fn on_tick(&mut self) {
        self.toasts
            .retain(|_, toast| toast.shown_at.elapsed() < TOAST_TTL);
    }

    pub(in crate::tui) fn handle_event(&mut self, event: AppEvent) -> anyhow::Result<()> {
        match event {
            AppEvent::PollTick { handle } => self.on_poll_tick(handle),
            AppEvent::Loaded {
                generation,
                seq,
                kind,
                result,
            } => self.apply_loaded(generation, seq, kind, result),
            AppEvent::Mutated {
                session,
                form,
                result,
            } => {
                if self.is_current_session(session) {
                    self.finish_mutation(form, result);
                }
            }
            AppEvent::Deleted {
                session,
                code,
                result,
            } => {
                if self.is_current_session(session) {
                    self.finish_delete(code, result);
                }
            }
            AppEvent::LoggedIn(result) => self.finish_login(result),
        }
        Ok(())
    }

    /// Results of mutations started before the last logout or expiry are
    /// dropped; they must not touch the session that replaced theirs.
    fn is_current_session(&self, session: u64) -> bool {
        if session != self.session {
            debug!(session, current = self.session, "Dropping result from an ended session");
            return false;
        }
        true
    }

    fn on_poll_tick(&mut self, handle: u64) {
        if !self.poller.accepts(handle) {
            debug!(handle, "Ignoring tick from retired poller");
            return;
        }
        let live = self.screen == Screen::Dashboard
            && self.view == View::Tasks
            && self.tasks_mode == TasksMode::Live;
        if !live {
            debug!(handle, view = self.view.label(), "Ignoring tick outside live tasks");
            return;
        }
        self.dispatch_load(LoadKind::Tasks);
    }

    pub(in crate::tui) fn on_live_tasks(&self) -> bool {
        self.view == View::Tasks && self.tasks_mode == TasksMode::Live
    }
}

fn login_fields() -> Vec<InputField> {
    vec![
        InputField::new("Username", FieldRule::required(FieldKind::Text)),
        InputField::with_mask("Password", FieldRule::required(FieldKind::Text)),
    ]
}
