//! rpunch main entrypoint.

use rpunch::run;

fn main() {
    if let Err(e) = run() {
        rpunch::ui::messages::error(format!("Error: {}", e));
        std::process::exit(1);
    }
}
