use clap::{Parser, Subcommand};

/// Command-line interface definition for rpunch
/// Punch in/out client with an offline buffer and opportunistic sync
#[derive(Parser)]
#[command(
    name = "rpunch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Punch in/out from the terminal: offline buffer, automatic punch-out and opportunistic sync",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Inspect the configuration file
    Config {
        #[arg(long = "print", help = "Print the effective configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,
    },

    /// Database maintenance (integrity check, vacuum, info)
    Db {
        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table (audit trail and notifications)
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,

        #[arg(long = "op", help = "Only rows of this operation (e.g. punch, notify, sync)")]
        operation: Option<String>,
    },

    /// Sign in to the punch server
    Login {
        /// User login
        login: String,

        #[arg(long = "password", help = "Account password")]
        password: String,
    },

    /// Sign out (punches OUT first when still punched in)
    Logout,

    /// Punch IN or OUT
    Punch {
        /// Direction: in | out
        direction: String,
    },

    /// Show current state and today's punches
    Today,

    /// Synchronize pending punches with the server
    Sync {
        #[arg(long = "now", help = "Ignore the sync windows and submit immediately")]
        now: bool,
    },

    /// Weekly work-hours report from the server history
    Report {
        #[arg(
            long = "week",
            help = "Any date of the week to report (YYYY-MM-DD, default: today)"
        )]
        week: Option<String>,

        #[arg(long = "csv", help = "Also write the report to this CSV file")]
        csv: Option<String>,
    },

    /// Simulate device location state for this host
    Device {
        #[command(subcommand)]
        action: DeviceAction,
    },

    /// Run the periodic checks in the foreground
    Run {
        #[arg(long = "for", help = "Stop after this many seconds")]
        for_secs: Option<u64>,
    },

    /// One background pass: location check and sync check
    Tick,
}

#[derive(Subcommand)]
pub enum DeviceAction {
    /// Show the stored device state
    Show,

    /// Turn location services on or off
    Location {
        #[arg(value_parser = ["on", "off"])]
        state: String,
    },

    /// Grant or revoke the location permission
    Permission {
        #[arg(value_parser = ["granted", "denied"])]
        state: String,
    },

    /// Store the current position fix
    Fix {
        #[arg(long = "lat", allow_hyphen_values = true)]
        lat: f64,

        #[arg(long = "lon", allow_hyphen_values = true)]
        lon: f64,

        #[arg(long = "precision", default_value_t = 10.0)]
        precision: f64,
    },
}
