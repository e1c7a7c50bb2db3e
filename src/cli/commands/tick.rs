use crate::config::Config;
use crate::core::context::AppContext;
use crate::errors::{AppError, AppResult};

/// One background invocation. Internal failures are logged and the command
/// still succeeds, so the host scheduler keeps calling it.
pub fn handle(cfg: &Config) -> AppResult<()> {
    if let Err(e) = background_pass(cfg) {
        match e {
            AppError::NotSignedIn => tracing::info!("background pass skipped: not signed in"),
            other => tracing::error!(error = %other, "background pass failed"),
        }
    }
    Ok(())
}

fn background_pass(cfg: &Config) -> AppResult<()> {
    let ctx = AppContext::from_config(cfg, true)?;
    let session = ctx.sessions().current()?;
    let monitor = ctx.monitor(ctx.machine(&session.login));

    match monitor.location_tick() {
        Ok(check) => tracing::debug!(?check, "location check"),
        Err(e) => tracing::warn!(error = %e, "location check failed"),
    }

    let outcome = ctx.reconciler(&session).tick()?;
    tracing::debug!(?outcome, "sync check");
    Ok(())
}
