use crate::db::log::{LogRow, load_log};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RED, RESET, YELLOW};
use crate::utils::formatting::ellipsize;

const OP_WIDTH_MAX: usize = 60;

/// ANSI color for an audit operation
fn color_for_operation(op: &str) -> &'static str {
    match op {
        "punch" | "login" | "sync" => GREEN,
        "logout" => CYAN,
        "notify" | "recovery" => YELLOW,
        "sync_failed" | "quarantine" => RED,
        "migration_applied" | "init" => GREY,
        _ => RESET,
    }
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(pool: &DbPool, operation: Option<&str>) -> AppResult<()> {
        let entries = load_log(pool, operation)?;
        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let op_w = entries
            .iter()
            .map(|r| op_target(r).chars().count())
            .max()
            .unwrap_or(10)
            .min(OP_WIDTH_MAX);
        let id_w = entries
            .iter()
            .map(|r| r.id.to_string().len())
            .max()
            .unwrap_or(1);
        let date_w = entries
            .iter()
            .map(|r| display_date(&r.date).len())
            .max()
            .unwrap_or(10);

        println!("📜 Internal log:\n");

        for row in &entries {
            // Pad on the visible text, then color only the operation word.
            let visible = ellipsize(&op_target(row), OP_WIDTH_MAX);
            let padding = " ".repeat(op_w.saturating_sub(visible.chars().count()));
            let color = color_for_operation(&row.operation);
            let colored = match visible.split_once(' ') {
                Some((op, rest)) => format!("{color}{op}{RESET} {rest}"),
                None => format!("{color}{visible}{RESET}"),
            };

            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                row.id,
                display_date(&row.date),
                colored,
                padding,
                row.message,
                id_w = id_w,
                date_w = date_w
            );
        }

        Ok(())
    }
}

/// Single column "operation (target)"
fn op_target(row: &LogRow) -> String {
    if row.target.is_empty() {
        row.operation.clone()
    } else {
        format!("{} ({})", row.operation, row.target)
    }
}

fn display_date(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%FT%T%:z").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
