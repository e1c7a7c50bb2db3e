use serde::{Deserialize, Serialize};

/// Place label recorded when no reverse-geocoded name is available.
pub const UNKNOWN_PLACE: &str = "unknown";

/// A single position reading.
///
/// A punch without a reading carries `None` instead of a zeroed fix, so
/// "location unavailable" never looks like a punch at (0, 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    pub longitude: f64,
    pub latitude: f64,
    /// Horizontal accuracy in meters
    #[serde(default)]
    pub precision: f64,
}

impl GeoFix {
    pub fn new(longitude: f64, latitude: f64, precision: f64) -> Self {
        Self {
            longitude,
            latitude,
            precision,
        }
    }
}

/// Outcome of a location-availability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationStatus {
    Available,
    ServicesDisabled,
    PermissionDenied,
    /// The check itself failed; treated like an unavailable service.
    CheckFailed(String),
}

impl LocationStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, LocationStatus::Available)
    }

    pub fn describe(&self) -> String {
        match self {
            LocationStatus::Available => "location available".to_string(),
            LocationStatus::ServicesDisabled => "location services disabled".to_string(),
            LocationStatus::PermissionDenied => "location permission revoked".to_string(),
            LocationStatus::CheckFailed(e) => format!("location check failed: {e}"),
        }
    }
}
