use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::initialize::open_db;
use crate::db::migrate::applied_versions;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, RED, RESET};
use std::fs;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Db {
        check,
        vacuum,
        info,
    } = cmd
    {
        let pool = open_db(&cfg.database)?;

        if *info {
            print_db_info(&pool, &cfg.database)?;
        }

        if *check {
            println!("{}▶ Running integrity check…{}", CYAN, RESET);

            let integrity: String = pool
                .conn
                .query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;

            if integrity == "ok" {
                println!("{}✔ Integrity check passed.{}\n", GREEN, RESET);
            } else {
                println!("{}✘ Integrity check failed:{} {}\n", RED, RESET, integrity);
            }
        }

        if *vacuum {
            println!("{}▶ Running VACUUM…{}", CYAN, RESET);
            pool.conn.execute_batch("VACUUM;")?;
            println!("{}✔ Vacuum completed.{}\n", GREEN, RESET);
        }
    }

    Ok(())
}

fn print_db_info(pool: &DbPool, path: &str) -> AppResult<()> {
    let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    let keys: i64 = pool
        .conn
        .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))?;
    let log_rows: i64 = pool
        .conn
        .query_row("SELECT COUNT(*) FROM log", [], |row| row.get(0))?;
    let users: i64 = pool.conn.query_row(
        "SELECT COUNT(*) FROM kv WHERE key LIKE '%\\_isPunchedIn' ESCAPE '\\'",
        [],
        |row| row.get(0),
    )?;

    println!("🗄️  Database : {}", path);
    println!("   Size      : {} bytes", size);
    println!("   Keys      : {}", keys);
    println!("   Users     : {}", users);
    println!("   Log rows  : {}", log_rows);
    println!("   Migrations:");
    for v in applied_versions(&pool.conn)? {
        println!("     - {}", v);
    }
    println!();
    Ok(())
}
