#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use rpunch::core::clock::ManualClock;
use rpunch::core::context::{AppContext, Settings};
use rpunch::core::session::Session;
use rpunch::core::sync::SyncWindows;
use rpunch::db::initialize::{init_db, open_db};
use rpunch::db::kv::{KvStore, SqliteKv};
use rpunch::db::pool::DbPool;
use rpunch::errors::{AppError, AppResult};
use rpunch::models::location::GeoFix;
use rpunch::models::notification::{Notification, NotificationKind};
use rpunch::models::remote::{AuthResponse, PunchSubmission, RemotePunch, UserProfile};
use rpunch::platform::api::{Credentials, PunchApi};
use rpunch::platform::connectivity::Connectivity;
use rpunch::platform::geocoder::Geocoder;
use rpunch::platform::location::LocationProvider;
use rpunch::platform::notifier::Notifier;
use std::cell::{Cell, RefCell};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

// ---------------------------
// CLI helpers
// ---------------------------

pub fn rp() -> Command {
    cargo_bin_cmd!("rpunch")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rpunch.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Fresh config directory holding a config file that points the API at a
/// closed local port, so connectivity checks fail fast.
pub fn setup_home(name: &str, db_path: &str) -> String {
    let mut dir: PathBuf = env::temp_dir();
    dir.push(format!("{}_rpunch_home", name));
    fs::remove_dir_all(&dir).ok();
    fs::create_dir_all(&dir).expect("create home");
    let yaml = format!(
        "database: '{}'\napi_base_url: 'http://127.0.0.1:9/api'\nconnect_timeout_ms: 300\n",
        db_path
    );
    fs::write(dir.join("rpunch.conf"), yaml).expect("write config");
    dir.to_string_lossy().to_string()
}

/// rpunch command bound to a config directory and database.
pub fn rp_in(home: &str, db_path: &str) -> Command {
    let mut cmd = rp();
    cmd.env("RPUNCH_HOME", home).args(["--db", db_path]);
    cmd
}

/// Store a session as `login` would, without talking to a server.
pub fn seed_session(db_path: &str, login: &str) {
    let kv = SqliteKv::new(open_db(db_path).expect("open db"));
    kv.set_many(&[
        ("token".to_string(), "test-token".to_string()),
        ("login".to_string(), login.to_string()),
        ("employeeId".to_string(), "42".to_string()),
    ])
    .expect("seed session");
}

// ---------------------------
// Library fakes
// ---------------------------

pub fn t(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid rfc3339")
        .with_timezone(&Utc)
}

/// Monday 2025-03-03 08:00:00 UTC
pub fn monday_8am() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, 8, 0, 0).unwrap()
}

#[derive(Default)]
pub struct FakeApi {
    pub submissions: RefCell<Vec<PunchSubmission>>,
    pub fail_submit: Cell<bool>,
    pub fail_sign_in: Cell<bool>,
    pub fail_profile: Cell<bool>,
    pub sign_outs: Cell<usize>,
    pub history: RefCell<Vec<RemotePunch>>,
}

impl PunchApi for FakeApi {
    fn sign_in(&self, credentials: &Credentials) -> AppResult<AuthResponse> {
        if self.fail_sign_in.get() {
            return Err(AppError::remote(Some(401), "bad credentials"));
        }
        Ok(AuthResponse {
            token: format!("token-{}", credentials.login),
        })
    }

    fn sign_out(&self, _token: &str) -> AppResult<()> {
        self.sign_outs.set(self.sign_outs.get() + 1);
        Ok(())
    }

    fn fetch_profile(&self, _token: &str, _login: &str) -> AppResult<UserProfile> {
        if self.fail_profile.get() {
            return Err(AppError::remote(Some(404), "no such user"));
        }
        Ok(UserProfile { employee_id: 42 })
    }

    fn submit_punches(&self, _token: &str, submission: &PunchSubmission) -> AppResult<()> {
        self.submissions.borrow_mut().push(submission.clone());
        if self.fail_submit.get() {
            return Err(AppError::remote(Some(503), "unavailable"));
        }
        Ok(())
    }

    fn fetch_history(&self, _token: &str, _employee_id: i64) -> AppResult<Vec<RemotePunch>> {
        Ok(self.history.borrow().clone())
    }
}

pub struct FakeConnectivity(pub Cell<bool>);

impl Connectivity for FakeConnectivity {
    fn is_connected(&self) -> bool {
        self.0.get()
    }
}

#[derive(Default)]
pub struct RecordingNotifier(pub RefCell<Vec<Notification>>);

impl RecordingNotifier {
    pub fn count(&self, kind: NotificationKind) -> usize {
        self.0.borrow().iter().filter(|n| n.kind == kind).count()
    }

    pub fn total(&self) -> usize {
        self.0.borrow().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.0.borrow_mut().push(notification.clone());
    }
}

pub struct FakeLocation {
    pub permission: Cell<bool>,
    pub services: Cell<bool>,
    pub fix: Cell<Option<GeoFix>>,
    /// Every check errors.
    pub broken: Cell<bool>,
}

impl Default for FakeLocation {
    fn default() -> Self {
        Self {
            permission: Cell::new(true),
            services: Cell::new(true),
            fix: Cell::new(Some(GeoFix::new(12.4964, 41.9028, 8.0))),
            broken: Cell::new(false),
        }
    }
}

impl LocationProvider for FakeLocation {
    fn permission_granted(&self) -> AppResult<bool> {
        if self.broken.get() {
            return Err(AppError::Location("sensor offline".into()));
        }
        Ok(self.permission.get())
    }

    fn services_enabled(&self) -> AppResult<bool> {
        if self.broken.get() {
            return Err(AppError::Location("sensor offline".into()));
        }
        Ok(self.services.get())
    }

    fn current_fix(&self) -> AppResult<GeoFix> {
        self.fix
            .get()
            .ok_or_else(|| AppError::Location("no fix".into()))
    }
}

pub struct FakeGeocoder {
    pub place: RefCell<Option<String>>,
}

impl Geocoder for FakeGeocoder {
    fn reverse(&self, _fix: &GeoFix) -> AppResult<String> {
        self.place
            .borrow()
            .clone()
            .ok_or_else(|| AppError::remote(None, "geocoder down"))
    }
}

pub fn default_settings() -> Settings {
    Settings {
        company_code: "ACME".to_string(),
        reason_code: "MANUAL".to_string(),
        windows: SyncWindows::new(vec![
            NaiveTime::from_hms_opt(9, 50, 0).unwrap(),
            NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        ]),
        liveness_interval: Duration::from_secs(10),
        location_interval: Duration::from_secs(120),
        sync_interval: Duration::from_secs(120),
        recovery_grace: chrono::Duration::seconds(300),
    }
}

/// In-memory store, fake collaborators and a manual clock.
pub struct Harness {
    pub ctx: AppContext,
    pub kv: Rc<SqliteKv>,
    pub clock: Rc<ManualClock>,
    pub api: Rc<FakeApi>,
    pub net: Rc<FakeConnectivity>,
    pub notes: Rc<RecordingNotifier>,
    pub location: Rc<FakeLocation>,
    pub geocoder: Rc<FakeGeocoder>,
}

impl Harness {
    pub fn new() -> Self {
        Self::starting_at(monday_8am())
    }

    pub fn starting_at(start: DateTime<Utc>) -> Self {
        let pool = DbPool::in_memory().expect("in-memory db");
        init_db(&pool.conn).expect("init db");
        let kv = Rc::new(SqliteKv::new(pool));
        let clock = Rc::new(ManualClock::new(start));
        let api = Rc::new(FakeApi::default());
        let net = Rc::new(FakeConnectivity(Cell::new(true)));
        let notes = Rc::new(RecordingNotifier::default());
        let location = Rc::new(FakeLocation::default());
        let geocoder = Rc::new(FakeGeocoder {
            place: RefCell::new(Some("Piazza Venezia, Roma".to_string())),
        });

        let ctx = AppContext {
            kv: kv.clone(),
            location: location.clone(),
            geocoder: geocoder.clone(),
            connectivity: net.clone(),
            api: api.clone(),
            notifier: notes.clone(),
            clock: clock.clone(),
            settings: default_settings(),
        };

        Self {
            ctx,
            kv,
            clock,
            api,
            net,
            notes,
            location,
            geocoder,
        }
    }

    pub fn session(&self, login: &str) -> Session {
        Session {
            login: login.to_string(),
            token: "tok".to_string(),
            employee_id: Some(42),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        self.clock.advance(chrono::Duration::seconds(secs));
    }
}
