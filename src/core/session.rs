//! Signed-in user context and its sign-in / sign-out lifecycle.

use crate::core::context::AppContext;
use crate::core::monitor::RecoveryOutcome;
use crate::core::state_machine::{ForcedReason, PunchOrigin, Transition};
use crate::errors::{AppError, AppResult};
use crate::models::punch::LogMarker;
use crate::platform::api::Credentials;

pub const KEY_TOKEN: &str = "token";
pub const KEY_LOGIN: &str = "login";
pub const KEY_EMPLOYEE_ID: &str = "employeeId";

/// Credentials of the signed-in user. The token is opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub login: String,
    pub token: String,
    pub employee_id: Option<i64>,
}

impl Session {
    pub fn employee_id(&self) -> AppResult<i64> {
        self.employee_id
            .ok_or_else(|| AppError::MissingEmployeeId(self.login.clone()))
    }
}

#[derive(Debug)]
pub struct SignIn {
    pub session: Session,
    pub recovery: RecoveryOutcome,
}

#[derive(Debug)]
pub struct SignOut {
    pub login: String,
    pub forced_out: bool,
}

pub struct SessionManager<'a> {
    ctx: &'a AppContext,
}

impl<'a> SessionManager<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    pub fn current(&self) -> AppResult<Session> {
        let kv = &self.ctx.kv;
        let token = kv.get(KEY_TOKEN)?.filter(|t| !t.is_empty());
        let login = kv.get(KEY_LOGIN)?.filter(|l| !l.is_empty());
        let (Some(token), Some(login)) = (token, login) else {
            return Err(AppError::NotSignedIn);
        };
        let employee_id = kv.get(KEY_EMPLOYEE_ID)?.and_then(|v| v.parse().ok());

        Ok(Session {
            login,
            token,
            employee_id,
        })
    }

    pub fn sign_in(&self, login: &str, password: &str) -> AppResult<SignIn> {
        let credentials = Credentials {
            login: login.to_string(),
            password: password.to_string(),
            company_code: self.ctx.settings.company_code.clone(),
        };
        let auth = self.ctx.api.sign_in(&credentials)?;

        let employee_id = match self.ctx.api.fetch_profile(&auth.token, login) {
            Ok(profile) => Some(profile.employee_id),
            Err(e) => {
                tracing::warn!(login, error = %e, "profile fetch failed, reports unavailable");
                None
            }
        };

        // An unclean previous session must be closed before the new marker
        // hides it.
        let machine = self.ctx.machine(login);
        let recovery = self.ctx.monitor(machine.clone()).recover()?;

        let mut entries = vec![
            (KEY_TOKEN.to_string(), auth.token.clone()),
            (KEY_LOGIN.to_string(), login.to_string()),
        ];
        if let Some(id) = employee_id {
            entries.push((KEY_EMPLOYEE_ID.to_string(), id.to_string()));
        }
        self.ctx.kv.set_many(&entries)?;
        if employee_id.is_none() {
            self.ctx.kv.remove(KEY_EMPLOYEE_ID)?;
        }

        let store = machine.store();
        store.set_log_marker(LogMarker::LoggedIn)?;
        store.audit("login", "signed in");
        tracing::info!(login, "signed in");

        Ok(SignIn {
            session: Session {
                login: login.to_string(),
                token: auth.token,
                employee_id,
            },
            recovery,
        })
    }

    pub fn sign_out(&self) -> AppResult<SignOut> {
        let session = self.current()?;
        let machine = self.ctx.machine(&session.login);

        let forced_out = if machine.state().is_punched_in {
            let t = machine.punch_out(PunchOrigin::Forced(ForcedReason::SignOut))?;
            matches!(t, Transition::Recorded(_))
        } else {
            false
        };

        let store = machine.store();
        store.stamp_liveness(self.ctx.clock.now())?;
        store.set_log_marker(LogMarker::LoggedOut)?;

        if let Err(e) = self.ctx.api.sign_out(&session.token) {
            tracing::warn!(login = %session.login, error = %e, "remote sign-out failed");
        }

        for key in [KEY_TOKEN, KEY_LOGIN, KEY_EMPLOYEE_ID] {
            self.ctx.kv.remove(key)?;
        }
        store.audit("logout", "signed out");
        tracing::info!(login = %session.login, "signed out");

        Ok(SignOut {
            login: session.login,
            forced_out,
        })
    }
}
