use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::context::AppContext;
use crate::core::report::ReportLogic;
use crate::errors::{AppError, AppResult};
use crate::ui::messages;
use crate::utils::date::parse_date;
use crate::utils::path::expand_tilde;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Report { week, csv } = cmd {
        let ctx = AppContext::from_config(cfg, false)?;
        let session = ctx.sessions().current()?;
        let offset = ctx.clock.offset();

        let day = match week {
            Some(s) => parse_date(s).ok_or_else(|| AppError::InvalidDate(s.clone()))?,
            None => ctx.clock.local_now().date_naive(),
        };

        let report = ReportLogic::weekly(&ctx, &session, day)?;

        messages::header(format!(
            "Week of {} ({})",
            report.week_start.format("%Y-%m-%d"),
            session.login
        ));
        print!("{}", ReportLogic::render(&report, &offset));

        if let Some(path) = csv {
            let path = expand_tilde(path);
            ReportLogic::write_csv(&path, &report, &offset)?;
            messages::success(format!("Report written to {}", path.display()));
        }
    }
    Ok(())
}
