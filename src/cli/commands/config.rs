use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
    } = cmd
    {
        if *print_config {
            println!("📄 Current configuration ({}):\n", Config::config_file().display());
            println!("{}", serde_yaml::to_string(cfg)?);
        }

        if *check {
            cfg.validate()?;
            let missing = Config::missing_fields()?;
            if missing.is_empty() {
                messages::success("Configuration file is complete.");
            } else {
                messages::warning(format!(
                    "Missing fields (defaults in use): {}",
                    missing.join(", ")
                ));
            }
        }
    }

    Ok(())
}
