use crate::cli::parser::{Commands, DeviceAction};
use crate::config::Config;
use crate::db::initialize::open_db;
use crate::db::kv::{KvStore, SqliteKv};
use crate::errors::AppResult;
use crate::models::location::GeoFix;
use crate::platform::location::StoredLocation;
use crate::ui::messages;
use std::rc::Rc;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Device { action } = cmd else {
        return Ok(());
    };

    let kv = Rc::new(SqliteKv::new(open_db(&cfg.database)?));
    let location = StoredLocation::new(kv.clone());

    match action {
        DeviceAction::Show => {
            let keys = kv.keys_with_prefix("device_")?;
            if keys.is_empty() {
                messages::info("Device state not set: location on, permission granted, no fix.");
            }
            for key in keys {
                let value = kv.get(&key)?.unwrap_or_default();
                println!("{:<28} {}", key, value);
            }
        }
        DeviceAction::Location { state } => {
            let on = state == "on";
            location.set_services_enabled(on)?;
            kv.audit("device", "location", state);
            messages::success(format!("Location services {}", state));
        }
        DeviceAction::Permission { state } => {
            location.set_permission(state == "granted")?;
            kv.audit("device", "permission", state);
            messages::success(format!("Location permission {}", state));
        }
        DeviceAction::Fix {
            lat,
            lon,
            precision,
        } => {
            let fix = GeoFix::new(*lon, *lat, *precision);
            location.set_fix(&fix)?;
            messages::success(format!(
                "Position set to {:.6}, {:.6} (±{} m)",
                fix.latitude, fix.longitude, fix.precision
            ));
        }
    }
    Ok(())
}
