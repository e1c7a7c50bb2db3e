//! Wiring of the collaborators shared by every command.

use crate::config::Config;
use crate::core::clock::{Clock, SystemClock};
use crate::core::monitor::EnvironmentMonitor;
use crate::core::session::{Session, SessionManager};
use crate::core::state_machine::PunchStateMachine;
use crate::core::store::PunchStore;
use crate::core::sync::{SyncReconciler, SyncWindows};
use crate::db::initialize::open_db;
use crate::db::kv::{KvStore, SqliteKv};
use crate::errors::AppResult;
use crate::platform::api::{HttpApiConfig, HttpPunchApi, PunchApi};
use crate::platform::connectivity::{Connectivity, TcpProbe};
use crate::platform::geocoder::{Geocoder, NominatimGeocoder};
use crate::platform::location::{LocationProvider, StoredLocation};
use crate::platform::notifier::{ConsoleNotifier, Notifier};
use std::rc::Rc;
use std::time::Duration;

/// Runtime knobs derived from [`Config`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub company_code: String,
    pub reason_code: String,
    pub windows: SyncWindows,
    pub liveness_interval: Duration,
    pub location_interval: Duration,
    pub sync_interval: Duration,
    pub recovery_grace: chrono::Duration,
}

impl Settings {
    pub fn from_config(cfg: &Config) -> AppResult<Self> {
        Ok(Self {
            company_code: cfg.company_code.clone(),
            reason_code: cfg.reason_code.clone(),
            windows: SyncWindows::new(cfg.checkpoint_times()?),
            liveness_interval: Duration::from_secs(cfg.liveness_interval_secs),
            location_interval: Duration::from_secs(cfg.location_interval_secs),
            sync_interval: Duration::from_secs(cfg.sync_interval_secs),
            recovery_grace: chrono::Duration::seconds(cfg.recovery_grace_secs as i64),
        })
    }
}

pub struct AppContext {
    pub kv: Rc<dyn KvStore>,
    pub location: Rc<dyn LocationProvider>,
    pub geocoder: Rc<dyn Geocoder>,
    pub connectivity: Rc<dyn Connectivity>,
    pub api: Rc<dyn PunchApi>,
    pub notifier: Rc<dyn Notifier>,
    pub clock: Rc<dyn Clock>,
    pub settings: Settings,
}

impl AppContext {
    /// Production wiring: sqlite store, HTTP API, Nominatim, system clock.
    /// `quiet` keeps notifications out of the terminal (audit log only).
    pub fn from_config(cfg: &Config, quiet: bool) -> AppResult<Self> {
        let pool = open_db(&cfg.database)?;
        let kv: Rc<dyn KvStore> = Rc::new(SqliteKv::new(pool));

        let notifier: Rc<dyn Notifier> = if quiet {
            Rc::new(ConsoleNotifier::quiet(kv.clone()))
        } else {
            Rc::new(ConsoleNotifier::new(kv.clone()))
        };

        Ok(Self {
            location: Rc::new(StoredLocation::new(kv.clone())),
            geocoder: Rc::new(NominatimGeocoder::new(
                &cfg.geocoder_url,
                &cfg.geocoder_user_agent,
                cfg.connect_timeout(),
                cfg.request_timeout(),
            )),
            connectivity: Rc::new(TcpProbe::for_url(&cfg.api_base_url, cfg.connect_timeout())),
            api: Rc::new(HttpPunchApi::new(HttpApiConfig {
                base_url: cfg.api_base_url.clone(),
                connect_timeout: cfg.connect_timeout(),
                request_timeout: cfg.request_timeout(),
            })),
            notifier,
            clock: Rc::new(SystemClock),
            settings: Settings::from_config(cfg)?,
            kv,
        })
    }

    pub fn store(&self, login: &str) -> PunchStore {
        PunchStore::new(self.kv.clone(), self.clock.clone(), login)
    }

    pub fn machine(&self, login: &str) -> Rc<PunchStateMachine> {
        Rc::new(PunchStateMachine::new(
            self.store(login),
            self.location.clone(),
            self.geocoder.clone(),
            self.notifier.clone(),
            self.clock.clone(),
        ))
    }

    pub fn monitor(&self, machine: Rc<PunchStateMachine>) -> EnvironmentMonitor {
        EnvironmentMonitor::new(
            machine,
            self.location.clone(),
            self.clock.clone(),
            self.settings.recovery_grace,
        )
    }

    pub fn reconciler(&self, session: &Session) -> SyncReconciler {
        SyncReconciler::new(
            self.store(&session.login),
            session.clone(),
            self.api.clone(),
            self.connectivity.clone(),
            self.notifier.clone(),
            self.clock.clone(),
            self.settings.windows.clone(),
            self.settings.reason_code.clone(),
        )
    }

    pub fn sessions(&self) -> SessionManager<'_> {
        SessionManager::new(self)
    }
}
