use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::context::AppContext;
use crate::core::sync::SyncOutcome;
use crate::errors::AppResult;
use crate::ui::messages;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Sync { now } = cmd {
        let ctx = AppContext::from_config(cfg, false)?;
        let session = ctx.sessions().current()?;
        let reconciler = ctx.reconciler(&session);

        let outcome = if *now {
            reconciler.sync_now()?
        } else {
            reconciler.tick()?
        };

        match outcome {
            SyncOutcome::NotEligible => {
                messages::info("Sync window not open yet (use --now to force).")
            }
            SyncOutcome::Offline => messages::warning("Server unreachable: punches kept locally."),
            SyncOutcome::NothingToSend => messages::info("Nothing to synchronize."),
            // Submitted / Failed are reported through notifications.
            SyncOutcome::Submitted(_) | SyncOutcome::Failed(_) => {}
            SyncOutcome::Busy => messages::warning("A synchronization is already running."),
        }
    }
    Ok(())
}
