use crate::config::Config;
use crate::core::context::AppContext;
use crate::errors::AppResult;
use crate::ui::messages;

pub fn handle(cfg: &Config) -> AppResult<()> {
    let ctx = AppContext::from_config(cfg, false)?;
    let out = ctx.sessions().sign_out()?;
    messages::success(format!("Signed out {}", out.login));
    Ok(())
}
