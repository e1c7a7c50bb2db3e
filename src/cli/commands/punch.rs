use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::context::AppContext;
use crate::core::state_machine::{IgnoredReason, PunchOrigin, Transition};
use crate::errors::{AppError, AppResult};
use crate::models::punch_type::PunchType;
use crate::ui::messages;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Punch { direction } = cmd {
        let kind = PunchType::from_str_loose(direction)
            .ok_or_else(|| AppError::InvalidPunchType(direction.clone()))?;

        let ctx = AppContext::from_config(cfg, false)?;
        let session = ctx.sessions().current()?;
        let machine = ctx.machine(&session.login);

        let transition = match kind {
            PunchType::In => machine.punch_in()?,
            PunchType::Out => machine.punch_out(PunchOrigin::Manual)?,
        };

        match transition {
            Transition::Recorded(record) => {
                if record.location.is_none() {
                    messages::warning("No location available: punch recorded without position.");
                }
            }
            Transition::Ignored(IgnoredReason::AlreadyIn) => {
                messages::warning("Already punched IN: nothing recorded.")
            }
            Transition::Ignored(IgnoredReason::AlreadyOut) => {
                messages::warning("Already punched OUT: nothing recorded.")
            }
            Transition::Ignored(IgnoredReason::Busy) => {
                messages::warning("Another punch is in progress.")
            }
        }
    }
    Ok(())
}
