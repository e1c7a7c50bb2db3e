use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::context::AppContext;
use crate::core::monitor::{LocationCheck, RecoveryOutcome};
use crate::core::scheduler::{ScheduledTask, Scheduler};
use crate::errors::AppResult;
use crate::ui::messages;

/// Foreground daemon: recovery pass, then liveness / location / sync tasks.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Run { for_secs } = cmd else {
        return Ok(());
    };

    let ctx = AppContext::from_config(cfg, false)?;
    let session = ctx.sessions().current()?;
    let machine = ctx.machine(&session.login);
    let monitor = ctx.monitor(machine);
    let reconciler = ctx.reconciler(&session);

    if let RecoveryOutcome::Recovered(record) = monitor.recover()? {
        tracing::info!(time = %record.time, "unclean shutdown recovered");
    }

    let mut scheduler = Scheduler::new();
    scheduler.add(ScheduledTask::new(
        "liveness",
        ctx.settings.liveness_interval,
        |_| monitor.liveness_tick().map(|_| ()),
    ));
    scheduler.add(ScheduledTask::new(
        "location",
        ctx.settings.location_interval,
        |_| {
            if let LocationCheck::ForcedOut { status, .. } = monitor.location_tick()? {
                tracing::warn!(status = %status.describe(), "forced punch out");
            }
            Ok(())
        },
    ));
    scheduler.add(ScheduledTask::new(
        "sync",
        ctx.settings.sync_interval,
        |_| {
            let outcome = reconciler.tick()?;
            tracing::debug!(?outcome, "sync tick");
            Ok(())
        },
    ));

    let deadline = for_secs.map(|s| ctx.clock.now() + chrono::Duration::seconds(s as i64));
    messages::info(format!(
        "Watching {} (liveness {}s, location {}s, sync {}s)",
        session.login,
        ctx.settings.liveness_interval.as_secs(),
        ctx.settings.location_interval.as_secs(),
        ctx.settings.sync_interval.as_secs()
    ));
    scheduler.run_until(ctx.clock.as_ref(), deadline);

    messages::info("Stopped.");
    Ok(())
}
