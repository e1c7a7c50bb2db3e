use crate::errors::{AppError, AppResult};
use crate::models::location::GeoFix;
use serde::Deserialize;
use std::time::Duration;

pub trait Geocoder {
    /// Human readable place name for a position.
    fn reverse(&self, fix: &GeoFix) -> AppResult<String>;
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

/// Nominatim-compatible reverse geocoder.
pub struct NominatimGeocoder {
    base_url: String,
    user_agent: String,
    agent: ureq::Agent,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, user_agent: &str, connect: Duration, request: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(connect)
            .timeout_read(request)
            .timeout_write(request)
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
            agent,
        }
    }
}

impl Geocoder for NominatimGeocoder {
    fn reverse(&self, fix: &GeoFix) -> AppResult<String> {
        if !fix.latitude.is_finite() || !fix.longitude.is_finite() {
            return Err(AppError::Location("latitude or longitude is not a number".into()));
        }

        let url = format!("{}/reverse", self.base_url);
        let resp = self
            .agent
            .get(&url)
            .query("lat", &fix.latitude.to_string())
            .query("lon", &fix.longitude.to_string())
            .query("format", "json")
            .set("user-agent", &self.user_agent)
            .call()
            .map_err(|e| AppError::remote(None, format!("reverse geocoding failed: {e}")))?;

        let body: ReverseResponse = resp
            .into_json()
            .map_err(|e| AppError::remote(None, format!("invalid geocoder response: {e}")))?;

        body.display_name
            .ok_or_else(|| AppError::Location("address not found".into()))
    }
}
