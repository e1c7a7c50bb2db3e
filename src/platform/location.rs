use crate::db::kv::KvStore;
use crate::errors::{AppError, AppResult};
use crate::models::location::GeoFix;
use std::rc::Rc;

pub trait LocationProvider {
    fn permission_granted(&self) -> AppResult<bool>;

    fn services_enabled(&self) -> AppResult<bool>;

    fn current_fix(&self) -> AppResult<GeoFix>;
}

pub const KEY_SERVICES: &str = "device_locationServices";
pub const KEY_PERMISSION: &str = "device_locationPermission";
pub const KEY_FIX: &str = "device_fix";

/// Device location state kept in the shared store.
///
/// A desktop host has no location service of its own; the `device`
/// subcommand writes these keys and every check re-reads them, so a running
/// daemon observes changes made from another shell.
pub struct StoredLocation {
    kv: Rc<dyn KvStore>,
}

impl StoredLocation {
    pub fn new(kv: Rc<dyn KvStore>) -> Self {
        Self { kv }
    }

    pub fn set_services_enabled(&self, enabled: bool) -> AppResult<()> {
        self.kv.set(KEY_SERVICES, if enabled { "on" } else { "off" })
    }

    pub fn set_permission(&self, granted: bool) -> AppResult<()> {
        self.kv
            .set(KEY_PERMISSION, if granted { "granted" } else { "denied" })
    }

    pub fn set_fix(&self, fix: &GeoFix) -> AppResult<()> {
        self.kv.set(KEY_FIX, &serde_json::to_string(fix)?)
    }
}

impl LocationProvider for StoredLocation {
    fn permission_granted(&self) -> AppResult<bool> {
        Ok(self.kv.get(KEY_PERMISSION)?.as_deref() != Some("denied"))
    }

    fn services_enabled(&self) -> AppResult<bool> {
        Ok(self.kv.get(KEY_SERVICES)?.as_deref() != Some("off"))
    }

    fn current_fix(&self) -> AppResult<GeoFix> {
        if !self.permission_granted()? {
            return Err(AppError::Location("permission to access location was denied".into()));
        }
        if !self.services_enabled()? {
            return Err(AppError::Location("location services are disabled".into()));
        }
        match self.kv.get(KEY_FIX)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Err(AppError::Location("no position fix available".into())),
        }
    }
}
