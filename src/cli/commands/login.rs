use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::context::AppContext;
use crate::core::monitor::RecoveryOutcome;
use crate::errors::AppResult;
use crate::ui::messages;
use crate::utils::time::format_punch_time;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Login { login, password } = cmd {
        let ctx = AppContext::from_config(cfg, false)?;
        let signed = ctx.sessions().sign_in(login, password)?;

        messages::success(format!("Signed in as {}", signed.session.login));
        if signed.session.employee_id.is_none() {
            messages::warning("Employee id unknown: weekly reports are unavailable.");
        }
        match signed.recovery {
            RecoveryOutcome::Recovered(record) => messages::warning(format!(
                "Previous session was not closed: punched OUT at {}",
                format_punch_time(&record.time, &ctx.clock.offset())
            )),
            RecoveryOutcome::Skipped(reason) => {
                messages::info(format!("Still punched IN from a previous session ({reason})."))
            }
            RecoveryOutcome::NotNeeded => {}
        }
    }
    Ok(())
}
