use anyhow::{Context, Result};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;

use crate::config::{DEFAULT_CONFIG_PATH, get_config, init_config_from};
use crate::system::init_logging;

/// 进程启动前的准备：`.env`、配置、日志
///
/// 返回的 guard 必须在进程结束前保持存活。
pub fn prepare(config_path: Option<&str>) -> Result<WorkerGuard> {
    dotenvy::dotenv().ok();

    let path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);
    init_config_from(path);

    let config = get_config();
    let guard = init_logging(&config.logging).context("Failed to initialize logging")?;

    debug!(config = path, backend_url = %redact_url(&config.database.database_url), "Startup complete");
    Ok(guard)
}

/// 隐藏 URL 中的密码
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let creds = &url[scheme_end + 3..at];
            match creds.find(':') {
                Some(colon) => format!(
                    "{}{}:***{}",
                    &url[..scheme_end + 3],
                    &creds[..colon],
                    &url[at..]
                ),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}
