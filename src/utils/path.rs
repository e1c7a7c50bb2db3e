//! Home-relative paths (`~`, `~/...`) as typed in the config file or on the
//! command line.

use std::path::PathBuf;

pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = match path {
        "~" => Some(""),
        p => p.strip_prefix("~/"),
    };
    if let Some(rest) = rest
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
