use crate::config::Config;
use crate::core::context::AppContext;
use crate::errors::AppResult;
use crate::utils::colors::{colorize_optional, colorize_punch};
use crate::utils::formatting::ellipsize;
use crate::utils::table::{Column, Table};
use crate::utils::time::format_punch_time;

pub fn handle(cfg: &Config) -> AppResult<()> {
    let ctx = AppContext::from_config(cfg, false)?;
    let session = ctx.sessions().current()?;
    let store = ctx.store(&session.login);
    let offset = ctx.clock.offset();
    let today = ctx.clock.local_now().date_naive();

    let state = store.state();
    match (state.is_punched_in, state.punch_time) {
        (true, Some(t)) => println!(
            "{} at {}",
            colorize_punch("Punched IN", true),
            format_punch_time(&t, &offset)
        ),
        (true, None) => println!("{}", colorize_punch("Punched IN", true)),
        (false, Some(t)) => println!(
            "{} since {}",
            colorize_punch("Punched OUT", false),
            format_punch_time(&t, &offset)
        ),
        (false, None) => println!("{}", colorize_punch("Punched OUT", false)),
    }

    let mut records: Vec<_> = store
        .today_records()
        .into_iter()
        .filter(|r| r.local_date(&offset) == today)
        .collect();
    records.reverse();

    if records.is_empty() {
        println!("\nNo punches today.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        Column::new("Type", 4),
        Column::new("Time", 19),
        Column::new("Place", 40),
    ]);
    for r in &records {
        table.add_row(vec![
            colorize_punch(r.kind.as_str(), r.kind.is_in()),
            format_punch_time(&r.time, &offset),
            colorize_optional(&ellipsize(&r.place_name, 40)),
        ]);
    }
    println!();
    print!("{}", table.render());

    let pending = store.pending().len();
    if pending > 0 {
        println!("\n{} punch(es) waiting to be synchronized.", pending);
    }
    Ok(())
}
