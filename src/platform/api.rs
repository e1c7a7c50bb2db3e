//! Remote punch API client.

use crate::errors::{AppError, AppResult};
use crate::models::remote::{AuthResponse, PunchSubmission, RemotePunch, UserProfile};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub login: String,
    pub password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub company_code: String,
}

pub trait PunchApi {
    fn sign_in(&self, credentials: &Credentials) -> AppResult<AuthResponse>;

    fn sign_out(&self, token: &str) -> AppResult<()>;

    fn fetch_profile(&self, token: &str, login: &str) -> AppResult<UserProfile>;

    /// Deliver one batch. `Ok` means the server acknowledged every record.
    fn submit_punches(&self, token: &str, submission: &PunchSubmission) -> AppResult<()>;

    fn fetch_history(&self, token: &str, employee_id: i64) -> AppResult<Vec<RemotePunch>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpApiConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

pub struct HttpPunchApi {
    config: HttpApiConfig,
    agent: ureq::Agent,
}

impl HttpPunchApi {
    pub fn new(config: HttpApiConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(config.connect_timeout)
            .timeout_read(config.request_timeout)
            .timeout_write(config.request_timeout)
            .build();
        Self { config, agent }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, req: ureq::Request, token: &str) -> ureq::Request {
        req.set("authorization", &format!("Bearer {}", token))
    }
}

fn map_ureq_error(context: &str, err: ureq::Error) -> AppError {
    match err {
        ureq::Error::Status(code, resp) => {
            let detail = resp.into_string().unwrap_or_default();
            let detail = if detail.len() > 256 {
                detail.chars().take(256).collect::<String>()
            } else {
                detail
            };
            AppError::remote(Some(code), format!("{context}: {detail}"))
        }
        ureq::Error::Transport(t) => AppError::remote(None, format!("{context}: {t}")),
    }
}

impl PunchApi for HttpPunchApi {
    fn sign_in(&self, credentials: &Credentials) -> AppResult<AuthResponse> {
        let mut req = self.agent.post(&self.url("/auth/login"));
        if !credentials.company_code.is_empty() {
            req = req.set("x-company-code", &credentials.company_code);
        }
        let resp = req
            .send_json(credentials)
            .map_err(|e| map_ureq_error("sign-in failed", e))?;
        resp.into_json()
            .map_err(|e| AppError::remote(None, format!("invalid sign-in response: {e}")))
    }

    fn sign_out(&self, token: &str) -> AppResult<()> {
        let req = self.authorized(self.agent.post(&self.url("/auth/logout")), token);
        req.call()
            .map_err(|e| map_ureq_error("sign-out failed", e))?;
        Ok(())
    }

    fn fetch_profile(&self, token: &str, login: &str) -> AppResult<UserProfile> {
        let req = self.authorized(self.agent.get(&self.url(&format!("/users/{login}"))), token);
        let resp = req
            .call()
            .map_err(|e| map_ureq_error("profile fetch failed", e))?;
        resp.into_json()
            .map_err(|e| AppError::remote(None, format!("invalid profile response: {e}")))
    }

    fn submit_punches(&self, token: &str, submission: &PunchSubmission) -> AppResult<()> {
        let req = self
            .authorized(self.agent.post(&self.url("/punches")), token)
            .set("content-type", "application/json");
        let resp = req
            .send_json(submission)
            .map_err(|e| map_ureq_error("punch submission failed", e))?;
        if (200..=299).contains(&resp.status()) {
            Ok(())
        } else {
            Err(AppError::remote(
                Some(resp.status()),
                "punch submission was not acknowledged",
            ))
        }
    }

    fn fetch_history(&self, token: &str, employee_id: i64) -> AppResult<Vec<RemotePunch>> {
        let req = self
            .authorized(self.agent.get(&self.url("/punches")), token)
            .query("employeeId", &employee_id.to_string());
        let resp = req
            .call()
            .map_err(|e| map_ureq_error("history fetch failed", e))?;
        resp.into_json()
            .map_err(|e| AppError::remote(None, format!("invalid history response: {e}")))
    }
}
