// 应用程序主入口函数
use anyhow::{Context, Result};
use clap::Parser;

use checklist_lib::commands::{self, Cli};
use checklist_lib::logging::{init_logger, LoggerConfig};
use checklist_lib::utils::load_app_config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_app_config(cli.config.clone())
        .await
        .context("failed to load application config")?;

    let logger_config = LoggerConfig::from_app_config(&config, cli.verbose);
    if let Err(e) = init_logger(&logger_config) {
        eprintln!("日志系统初始化失败: {}", e);
    }
    log::debug!(
        "{} v{} ({})",
        config.app_settings.app_name,
        config.app_settings.app_version,
        config.app_settings.environment
    );

    if let Err(err) = commands::run(cli, config).await {
        if let Some(user_error) = commands::user_error(&err) {
            eprintln!("{}", user_error);
            std::process::exit(2);
        }
        return Err(err);
    }
    Ok(())
}
