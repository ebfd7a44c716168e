use super::*;
use console_api::ApiFuture;
use console_core::credential::MemoryStore;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;

/// Scripted backend. Records every call and, like the real transport,
/// clears the credential store when it answers with an auth failure.
struct FakeBackend {
    credentials: CredentialStore,
    calls: Mutex<Vec<String>>,
    reject_auth: AtomicBool,
    users: Vec<User>,
    tasks: Vec<Task>,
    completed: Vec<Task>,
    delete_results: Mutex<VecDeque<Result<String, ApiError>>>,
    login_result: Mutex<Option<Result<LoginData, ApiError>>>,
    crash_notifications: bool,
}

impl FakeBackend {
    fn new(credentials: CredentialStore) -> Self {
        Self {
            credentials,
            calls: Mutex::new(Vec::new()),
            reject_auth: AtomicBool::new(false),
            users: vec![user("1001"), user("1002")],
            tasks: vec![task("LIVE1", false)],
            completed: vec![task("GIFT1", true), task("GIFT2", true)],
            delete_results: Mutex::new(VecDeque::new()),
            login_result: Mutex::new(None),
            crash_notifications: false,
        }
    }

    fn call(&self, name: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(name);
        if self.reject_auth.load(Ordering::SeqCst) {
            self.credentials.clear();
            return Err(ApiError::AuthExpired(AuthFailure::Unauthorized));
        }
        Ok(())
    }

    fn count(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.as_str() == name)
            .count()
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl AdminBackend for FakeBackend {
    fn login<'a>(&'a self, username: &'a str, _password: &'a str) -> ApiFuture<'a, LoginData> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(format!("login:{username}"));
            self.login_result.lock().unwrap().take().unwrap_or_else(|| {
                Ok(LoginData {
                    token: "tok-1".to_string(),
                    expires_at: None,
                })
            })
        })
    }

    fn list_users(&self) -> ApiFuture<'_, Vec<User>> {
        Box::pin(async move {
            self.call("list_users".to_string())?;
            Ok(self.users.clone())
        })
    }

    fn add_user<'a>(&'a self, fid: &'a str) -> ApiFuture<'a, String> {
        Box::pin(async move {
            self.call(format!("add_user:{fid}"))?;
            Ok("User added".to_string())
        })
    }

    fn user_records<'a>(&'a self, fid: &'a str) -> ApiFuture<'a, Vec<RedemptionRecord>> {
        Box::pin(async move {
            self.call(format!("user_records:{fid}"))?;
            Ok(Vec::new())
        })
    }

    fn list_tasks(&self) -> ApiFuture<'_, Vec<Task>> {
        Box::pin(async move {
            self.call("list_tasks".to_string())?;
            Ok(self.tasks.clone())
        })
    }

    fn add_task<'a>(&'a self, code: &'a str) -> ApiFuture<'a, String> {
        Box::pin(async move {
            self.call(format!("add_task:{code}"))?;
            Ok("Gift code task created".to_string())
        })
    }

    fn completed_tasks(&self, limit: u32) -> ApiFuture<'_, Vec<Task>> {
        Box::pin(async move {
            self.call(format!("completed_tasks:{limit}"))?;
            Ok(self.completed.clone())
        })
    }

    fn delete_task<'a>(&'a self, code: &'a str) -> ApiFuture<'a, String> {
        Box::pin(async move {
            self.call(format!("delete_task:{code}"))?;
            self.delete_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("Task deleted".to_string()))
        })
    }

    fn list_notifications(&self, limit: u32) -> ApiFuture<'_, Vec<Notification>> {
        Box::pin(async move {
            self.call(format!("list_notifications:{limit}"))?;
            if self.crash_notifications {
                panic!("notification decoder blew up");
            }
            Ok(Vec::new())
        })
    }
}

fn user(fid: &str) -> User {
    User {
        fid: fid.to_string(),
        nickname: format!("player-{fid}"),
        kid: 1,
        avatar_image: String::new(),
        created_at: None,
        updated_at: None,
    }
}

fn task(code: &str, all_done: bool) -> Task {
    Task {
        code: code.to_string(),
        all_done,
        retry_count: 0,
        last_error: None,
        created_at: None,
        updated_at: None,
        completed_at: None,
    }
}

struct Harness {
    app: TuiApp,
    events: UnboundedReceiver<AppEvent>,
    backend: Arc<FakeBackend>,
    credentials: CredentialStore,
    tmp: TempDir,
}

impl Harness {
    fn new() -> Self {
        Self::with_backend(|_| {})
    }

    fn with_backend(configure: impl FnOnce(&mut FakeBackend)) -> Self {
        let tmp = TempDir::new().unwrap();
        let credentials = CredentialStore::new(Arc::new(MemoryStore::new()));
        let mut fake = FakeBackend::new(credentials.clone());
        configure(&mut fake);
        let backend = Arc::new(fake);
        let context = TuiContext {
            backend: backend.clone(),
            credentials: credentials.clone(),
            config: AppConfig::default(),
            config_path: tmp.path().join("config.json"),
            diagnostics: Some(
                DiagnosticsLog::new_with_dir(tmp.path().join("diagnostics"), 1024 * 1024).unwrap(),
            ),
            log_buffer: LogBuffer::new(50),
            server_url: "http://localhost:8080".to_string(),
            utc_offset: UtcOffset::UTC,
        };
        let (app, events) = TuiApp::new(context);
        Self {
            app,
            events,
            backend,
            credentials,
            tmp,
        }
    }

    /// Starts with a stored token, which lands on the Users view.
    async fn signed_in() -> Self {
        let mut harness = Self::new();
        harness.credentials.save("tok-0", None).unwrap();
        harness.app.start();
        harness.pump().await;
        harness
    }

    /// Lets spawned jobs run and feeds their results back into the app.
    async fn pump(&mut self) {
        for _ in 0..8 {
            tokio::task::yield_now().await;
            while let Ok(event) = self.events.try_recv() {
                self.app.handle_event(event).unwrap();
            }
        }
    }

    async fn wait(&mut self, duration: Duration) {
        tokio::time::advance(duration).await;
        self.pump().await;
    }

    fn press(&mut self, code: KeyCode) -> bool {
        self.app
            .handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.press(KeyCode::Char(ch));
        }
    }

    fn toast_text(&self) -> Option<String> {
        self.app.current_toast().map(|toast| toast.text.clone())
    }
}

#[tokio::test(start_paused = true)]
async fn start_without_credential_shows_login() {
    let mut h = Harness::new();
    h.app.start();
    h.pump().await;
    assert_eq!(h.app.screen, Screen::Login);
    assert!(h.backend.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn expired_credential_is_cleared_on_start() {
    let mut h = Harness::new();
    h.credentials
        .save("tok-0", Some("2000-01-01T00:00:00Z"))
        .unwrap();
    h.app.start();
    h.pump().await;
    assert_eq!(h.app.screen, Screen::Login);
    assert_eq!(h.credentials.read().token, None);
}

#[tokio::test(start_paused = true)]
async fn stored_credential_opens_users() {
    let h = Harness::signed_in().await;
    assert_eq!(h.app.screen, Screen::Dashboard);
    assert_eq!(h.app.view, View::Users);
    assert_eq!(h.app.nav_highlight, Some(NavItem::Users));
    assert_eq!(h.app.users.rows.len(), 2);
    assert_eq!(h.backend.calls(), vec!["list_users".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn tasks_view_polls_until_left() {
    let mut h = Harness::signed_in().await;
    h.press(KeyCode::Char('2'));
    h.pump().await;
    assert!(h.app.poller.is_running());
    assert_eq!(h.backend.count("list_tasks"), 1);

    h.wait(Duration::from_secs(30)).await;
    assert_eq!(h.backend.count("list_tasks"), 2);
    h.wait(Duration::from_secs(30)).await;
    assert_eq!(h.backend.count("list_tasks"), 3);

    h.press(KeyCode::Char('3'));
    h.pump().await;
    assert!(!h.app.poller.is_running());
    h.wait(Duration::from_secs(120)).await;
    assert_eq!(h.backend.count("list_tasks"), 3);
}

#[tokio::test(start_paused = true)]
async fn revisiting_tasks_keeps_a_single_timer() {
    let mut h = Harness::signed_in().await;
    h.press(KeyCode::Char('2'));
    h.press(KeyCode::Char('1'));
    h.press(KeyCode::Char('2'));
    h.pump().await;
    assert_eq!(h.backend.count("list_tasks"), 2);

    h.wait(Duration::from_secs(30)).await;
    assert_eq!(h.backend.count("list_tasks"), 3);
}

#[tokio::test(start_paused = true)]
async fn tick_from_retired_poller_is_ignored() {
    let mut h = Harness::signed_in().await;
    h.press(KeyCode::Char('2'));
    h.pump().await;
    let before = h.backend.count("list_tasks");

    h.app
        .handle_event(AppEvent::PollTick { handle: 9999 })
        .unwrap();
    h.pump().await;
    assert_eq!(h.backend.count("list_tasks"), before);
}

#[tokio::test(start_paused = true)]
async fn history_pauses_polling() {
    let mut h = Harness::signed_in().await;
    h.press(KeyCode::Char('2'));
    h.press(KeyCode::Char('h'));
    h.pump().await;
    assert_eq!(h.app.tasks_mode, TasksMode::History);
    assert!(!h.app.poller.is_running());
    assert_eq!(h.backend.count("completed_tasks:100"), 1);
    assert_eq!(h.app.completed.rows.len(), 2);

    h.wait(Duration::from_secs(90)).await;
    assert_eq!(h.backend.count("list_tasks"), 1);

    h.press(KeyCode::Char('b'));
    h.pump().await;
    assert_eq!(h.app.tasks_mode, TasksMode::Live);
    assert!(h.app.poller.is_running());
}

fn diagnostics_text(h: &Harness) -> String {
    let dir = h.tmp.path().join("diagnostics");
    std::fs::read_dir(&dir)
        .unwrap()
        .map(|entry| std::fs::read_to_string(entry.unwrap().path()).unwrap())
        .collect()
}

async fn on_history() -> Harness {
    let mut h = Harness::signed_in().await;
    h.press(KeyCode::Char('2'));
    h.press(KeyCode::Char('h'));
    h.pump().await;
    h
}

#[tokio::test(start_paused = true)]
async fn cancelled_delete_sends_nothing() {
    let mut h = on_history().await;
    h.press(KeyCode::Char('d'));
    let dialog = h.app.dialog.clone().unwrap();
    assert_eq!(
        dialog.action,
        PendingAction::DeleteTask {
            code: "GIFT1".to_string()
        }
    );
    assert!(dialog.message.contains("Task ID: GIFT1"));

    h.press(KeyCode::Char('n'));
    h.pump().await;
    assert!(h.app.dialog.is_none());
    assert_eq!(h.app.delete_label("GIFT1"), "Delete");
    assert!(!h.backend.calls().iter().any(|c| c.starts_with("delete_task")));
    assert!(diagnostics_text(&h).contains("\"outcome\":\"cancelled\""));
}

#[tokio::test(start_paused = true)]
async fn confirmed_delete_refreshes_history() {
    let mut h = on_history().await;
    h.press(KeyCode::Down);
    h.press(KeyCode::Char('d'));
    h.press(KeyCode::Char('y'));
    assert_eq!(h.app.delete_label("GIFT2"), "Deleting...");
    assert_eq!(h.app.busy, 1);

    h.pump().await;
    assert_eq!(h.backend.count("delete_task:GIFT2"), 1);
    assert_eq!(h.app.delete_label("GIFT2"), "Delete");
    assert_eq!(h.app.busy, 0);
    assert_eq!(h.toast_text().as_deref(), Some("Task GIFT2 deleted"));
    assert_eq!(h.backend.count("completed_tasks:100"), 2);
}

#[tokio::test(start_paused = true)]
async fn missing_task_delete_reports_and_keeps_list() {
    let mut h = Harness::with_backend(|fake| {
        fake.delete_results
            .lock()
            .unwrap()
            .push_back(Err(ApiError::Status {
                status: 404,
                code: None,
                message: Some("Task not found".to_string()),
            }));
    });
    h.credentials.save("tok-0", None).unwrap();
    h.app.start();
    h.press(KeyCode::Char('2'));
    h.press(KeyCode::Char('h'));
    h.pump().await;

    h.press(KeyCode::Char('d'));
    h.press(KeyCode::Enter);
    h.pump().await;

    assert_eq!(
        h.toast_text().as_deref(),
        Some("Task does not exist or was already deleted")
    );
    assert_eq!(h.app.delete_label("GIFT1"), "Delete");
    assert_eq!(h.backend.count("completed_tasks:100"), 1);
    assert_eq!(h.app.screen, Screen::Dashboard);

    let written = diagnostics_text(&h);
    assert!(written.contains("task.delete"));
    assert!(written.contains("GIFT1"));
}

#[tokio::test(start_paused = true)]
async fn unreachable_server_during_delete_reenables_control() {
    let Ok(listener) = std::net::TcpListener::bind("127.0.0.1:0") else {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    };
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let refused = reqwest::Client::new()
        .get(format!("http://{addr}/"))
        .send()
        .await
        .unwrap_err();

    let mut h = Harness::with_backend(|fake| {
        fake.delete_results
            .lock()
            .unwrap()
            .push_back(Err(ApiError::Network(refused)));
    });
    h.credentials.save("tok-0", None).unwrap();
    h.app.start();
    h.press(KeyCode::Char('2'));
    h.press(KeyCode::Char('h'));
    h.pump().await;

    h.press(KeyCode::Char('d'));
    h.press(KeyCode::Char('y'));
    assert_eq!(h.app.delete_label("GIFT1"), "Deleting...");
    h.pump().await;

    assert_eq!(
        h.toast_text().as_deref(),
        Some("Connection failed, check the network and retry")
    );
    assert_eq!(h.app.delete_label("GIFT1"), "Delete");
    assert_eq!(h.app.busy, 0);
    assert_eq!(h.app.screen, Screen::Dashboard);
    assert_eq!(h.credentials.read().token.as_deref(), Some("tok-0"));

    let written = diagnostics_text(&h);
    assert!(written.contains("\"status_code\":0"));
    assert!(written.contains("GIFT1"));
}

#[tokio::test(start_paused = true)]
async fn result_from_ended_session_leaves_new_session_alone() {
    let mut h = on_history().await;
    let first_session = h.app.session;
    h.press(KeyCode::Down);
    h.press(KeyCode::Char('d'));
    h.press(KeyCode::Char('y'));
    assert_eq!(h.app.delete_label("GIFT2"), "Deleting...");

    h.press(KeyCode::Char('o'));
    h.press(KeyCode::Char('y'));
    assert_eq!(h.app.screen, Screen::Login);
    assert_eq!(h.app.delete_label("GIFT2"), "Delete");

    h.type_text("admin");
    h.press(KeyCode::Tab);
    h.type_text("secret");
    h.press(KeyCode::Enter);
    h.pump().await;
    assert_eq!(h.app.screen, Screen::Dashboard);
    assert_eq!(h.backend.count("delete_task:GIFT2"), 0);

    h.app
        .handle_event(AppEvent::Deleted {
            session: first_session,
            code: "GIFT2".to_string(),
            result: Err(JobError::Api(ApiError::AuthExpired(
                AuthFailure::Unauthorized,
            ))),
        })
        .unwrap();
    h.app
        .handle_event(AppEvent::Mutated {
            session: first_session,
            form: FormKind::AddTask,
            result: Err(JobError::Api(ApiError::AuthExpired(
                AuthFailure::Unauthorized,
            ))),
        })
        .unwrap();
    h.pump().await;

    assert_eq!(h.app.screen, Screen::Dashboard);
    assert_eq!(h.app.login_message, None);
    assert_eq!(h.credentials.read().token.as_deref(), Some("tok-1"));
}

#[tokio::test(start_paused = true)]
async fn auth_failure_during_delete_returns_to_login() {
    let mut h = on_history().await;
    h.backend.reject_auth.store(true, Ordering::SeqCst);
    h.press(KeyCode::Char('d'));
    h.press(KeyCode::Char('y'));
    h.pump().await;

    assert_eq!(h.backend.count("delete_task:GIFT1"), 1);
    assert_eq!(h.app.screen, Screen::Login);
    assert_eq!(h.credentials.read().token, None);
    assert_eq!(h.app.delete_label("GIFT1"), "Delete");
}

#[tokio::test(start_paused = true)]
async fn delete_is_ignored_while_in_flight() {
    let mut h = on_history().await;
    h.press(KeyCode::Char('d'));
    h.press(KeyCode::Char('y'));
    h.press(KeyCode::Char('d'));
    assert!(h.app.dialog.is_none());
    h.pump().await;
    assert_eq!(h.backend.count("delete_task:GIFT1"), 1);
}

#[tokio::test(start_paused = true)]
async fn auth_failure_returns_to_login() {
    let mut h = Harness::signed_in().await;
    h.backend.reject_auth.store(true, Ordering::SeqCst);
    h.press(KeyCode::Char('2'));
    h.pump().await;

    assert_eq!(h.app.screen, Screen::Login);
    assert!(!h.app.poller.is_running());
    assert_eq!(h.credentials.read().token, None);
    assert_eq!(
        h.app.login_message.as_deref(),
        Some("Session expired, please log in again")
    );

    h.wait(Duration::from_secs(60)).await;
    assert_eq!(h.backend.count("list_tasks"), 1);
}

#[tokio::test(start_paused = true)]
async fn blank_add_user_form_is_not_sent() {
    let mut h = Harness::signed_in().await;
    h.press(KeyCode::Char('a'));
    assert!(h.app.form.is_some());
    h.press(KeyCode::Enter);
    h.pump().await;

    let form = h.app.form.as_ref().unwrap();
    assert_eq!(form.fields[0].error, Some(FieldError::Required));
    assert_eq!(
        form.message.as_deref(),
        Some("Please fill in all required fields")
    );
    assert!(!h.backend.calls().iter().any(|c| c.starts_with("add_user")));
}

#[tokio::test(start_paused = true)]
async fn add_user_reloads_list() {
    let mut h = Harness::signed_in().await;
    h.press(KeyCode::Char('a'));
    h.type_text(" 1003 ");
    h.press(KeyCode::Enter);
    assert!(h.app.form.is_none());
    h.pump().await;

    assert_eq!(h.backend.count("add_user:1003"), 1);
    assert_eq!(h.backend.count("list_users"), 2);
    assert_eq!(h.toast_text().as_deref(), Some("User added"));
}

#[tokio::test(start_paused = true)]
async fn login_stores_token_and_opens_users() {
    let mut h = Harness::new();
    h.app.start();
    h.type_text("admin");
    h.press(KeyCode::Tab);
    h.type_text("secret");
    h.press(KeyCode::Enter);
    assert!(h.app.login_pending);
    h.pump().await;

    assert_eq!(h.app.screen, Screen::Dashboard);
    assert_eq!(h.credentials.read().token.as_deref(), Some("tok-1"));
    assert!(h.app.login_fields[1].value.is_empty());
    assert_eq!(h.backend.count("login:admin"), 1);
    assert_eq!(h.backend.count("list_users"), 1);
}

#[tokio::test(start_paused = true)]
async fn rejected_login_stays_on_login() {
    let mut h = Harness::with_backend(|fake| {
        *fake.login_result.lock().unwrap() = Some(Err(ApiError::Status {
            status: 401,
            code: Some("UNAUTHORIZED".to_string()),
            message: Some("Invalid username or password".to_string()),
        }));
    });
    h.app.start();
    h.type_text("admin");
    h.press(KeyCode::Tab);
    h.type_text("wrong");
    h.press(KeyCode::Enter);
    h.pump().await;

    assert_eq!(h.app.screen, Screen::Login);
    assert_eq!(
        h.app.login_message.as_deref(),
        Some("Login failed: Invalid username or password")
    );
    assert_eq!(h.credentials.read().token, None);
}

#[tokio::test(start_paused = true)]
async fn superseded_load_is_dropped() {
    let mut h = Harness::signed_in().await;
    h.press(KeyCode::Char('r'));
    h.press(KeyCode::Char('3'));
    h.app.users.rows.clear();
    h.pump().await;

    assert_eq!(h.app.view, View::Notifications);
    assert!(h.app.users.rows.is_empty());
    assert_eq!(h.backend.count("list_users"), 2);
}

#[tokio::test(start_paused = true)]
async fn interval_change_is_persisted_and_applied() {
    let mut h = Harness::signed_in().await;
    h.press(KeyCode::Char('2'));
    h.pump().await;
    h.press(KeyCode::Char('['));
    assert_eq!(h.app.poller.interval().as_millis(), 10_000);

    let saved = AppConfig::load(&h.tmp.path().join("config.json")).unwrap();
    assert_eq!(saved.refresh_interval_ms, 10_000);

    h.wait(Duration::from_secs(10)).await;
    assert_eq!(h.backend.count("list_tasks"), 2);
}

#[tokio::test(start_paused = true)]
async fn logout_requires_confirmation() {
    let mut h = Harness::signed_in().await;
    h.press(KeyCode::Char('o'));
    assert!(h.app.dialog.is_some());
    h.press(KeyCode::Esc);
    assert_eq!(h.app.screen, Screen::Dashboard);

    h.press(KeyCode::Char('o'));
    h.press(KeyCode::Char('y'));
    assert_eq!(h.app.screen, Screen::Login);
    assert_eq!(h.credentials.read().token, None);
}

#[tokio::test(start_paused = true)]
async fn crashed_load_marks_view_failed() {
    let mut h = Harness::with_backend(|fake| fake.crash_notifications = true);
    h.credentials.save("tok-0", None).unwrap();
    h.app.start();
    h.press(KeyCode::Char('3'));
    h.pump().await;

    assert!(h.app.notifications.failed);
    assert_eq!(
        h.app.notifications.empty_text("notifications"),
        "Load failed, please retry (r)"
    );
    assert_eq!(
        h.toast_text().as_deref(),
        Some("Load failed: An unexpected error occurred")
    );
}

#[tokio::test(start_paused = true)]
async fn user_detail_hides_nav_highlight() {
    let mut h = Harness::signed_in().await;
    h.press(KeyCode::Down);
    h.press(KeyCode::Enter);
    h.pump().await;

    assert_eq!(h.app.view, View::UserDetail);
    assert_eq!(h.app.nav_highlight, None);
    assert_eq!(h.backend.count("user_records:1002"), 1);

    h.press(KeyCode::Esc);
    assert_eq!(h.app.view, View::Users);
    assert_eq!(h.app.detail_key, None);
}

#[tokio::test(start_paused = true)]
async fn toasts_are_scoped_to_their_view() {
    let mut h = Harness::signed_in().await;
    h.app
        .toast(View::Tasks, ToastKind::Info, "only on tasks".to_string());
    assert_eq!(h.toast_text(), None);
    h.app.view = View::Tasks;
    assert_eq!(h.toast_text().as_deref(), Some("only on tasks"));

    h.wait(TOAST_TTL).await;
    assert_eq!(h.toast_text(), None);
}
