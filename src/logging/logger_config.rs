//! 日志配置模块
//!
//! 基于 env_logger 初始化全局日志，统一输出格式 `[时间] [级别] 消息`

use chrono::Local;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use crate::utils::config::AppConfig;

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("无效的日志级别: {}", other)),
        }
    }
}

/// 日志输出目标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogTarget {
    Console,
    File { path: PathBuf },
    /// 控制台与文件输出均关闭
    Disabled,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// 日志级别
    pub level: LogLevel,
    /// 日志输出目标
    pub target: LogTarget,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            target: LogTarget::Console,
        }
    }
}

impl LoggerConfig {
    /// 由应用配置构建日志配置
    ///
    /// `verbose` 或调试模式下强制使用 Debug 级别；文件输出优先于控制台输出
    pub fn from_app_config(app: &AppConfig, verbose: bool) -> Self {
        let config = &app.logging_config;
        let level = if verbose || app.app_settings.debug_mode {
            LogLevel::Debug
        } else {
            config.log_level.parse().unwrap_or(LogLevel::Info)
        };

        let target = match (&config.log_file_path, config.file_output) {
            (Some(path), true) => LogTarget::File { path: path.clone() },
            _ if config.console_output => LogTarget::Console,
            _ => LogTarget::Disabled,
        };

        Self { level, target }
    }
}

/// 初始化全局日志
///
/// 只能成功调用一次；重复初始化返回错误，调用方可以忽略。
/// `RUST_LOG` 环境变量仍然可以覆盖配置中的级别。
pub fn init_logger(config: &LoggerConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if config.target == LogTarget::Disabled {
        log::set_max_level(LevelFilter::Off);
        return Ok(());
    }

    let mut builder = env_logger::Builder::new();
    builder.filter_level(config.level.into());
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] [{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.args()
        )
    });

    if let LogTarget::File { path } = &config.target {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    } else {
        builder.target(env_logger::Target::Stderr);
    }

    builder.try_init()?;
    log::debug!("日志系统初始化完成 - 级别: {:?}, 目标: {:?}", config.level, config.target);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing() {
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("trace".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LevelFilter::from(LogLevel::Debug), LevelFilter::Debug);
    }

    #[test]
    fn test_logger_config_from_app_config() {
        let mut app = AppConfig::default();
        let config = LoggerConfig::from_app_config(&app, false);
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.target, LogTarget::Console);

        app.logging_config.file_output = true;
        app.logging_config.log_level = "error".to_string();
        let config = LoggerConfig::from_app_config(&app, true);
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(
            config.target,
            LogTarget::File { path: PathBuf::from("logs/app.log") }
        );
    }

    #[test]
    fn test_debug_mode_and_console_switch() {
        let mut app = AppConfig::default();
        app.app_settings.debug_mode = true;
        app.logging_config.log_level = "warn".to_string();
        assert_eq!(LoggerConfig::from_app_config(&app, false).level, LogLevel::Debug);

        app.logging_config.console_output = false;
        assert_eq!(LoggerConfig::from_app_config(&app, false).target, LogTarget::Disabled);

        // 文件输出不受控制台开关影响
        app.logging_config.file_output = true;
        assert!(matches!(
            LoggerConfig::from_app_config(&app, false).target,
            LogTarget::File { .. }
        ));
    }
}
