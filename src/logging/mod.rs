//! # 日志记录模块 (Logging Module)
//!
//! ## 业务说明
//! 记录操作员对检查项、模板、机器的修改，配置缺失带来的警告，以及
//! 数据文件解析失败等问题，为现场服务报告的追溯提供依据
//!
//! ## 日志策略
//! - **用户操作**: 新增/修改/删除检查项、模板、机器，导出报告
//! - **配置警告**: 机器未配置检查项、引用了不存在的模板或检查项
//! - **文件解析失败**: 数据文件或提交文件无法解析

pub mod logger_config;

pub use logger_config::*;

/// 记录用户操作日志
#[macro_export]
macro_rules! log_user_operation {
    ($msg:expr) => {
        log::info!("[用户操作] {}", $msg);
    };
    ($msg:expr, $($arg:tt)*) => {
        log::info!("[用户操作] {}", format!($msg, $($arg)*));
    };
}

/// 记录用户配置操作警告
#[macro_export]
macro_rules! log_config_warning {
    ($msg:expr) => {
        log::warn!("[配置警告] {}", $msg);
    };
    ($msg:expr, $($arg:tt)*) => {
        log::warn!("[配置警告] {}", format!($msg, $($arg)*));
    };
}

/// 记录文件解析失败日志
#[macro_export]
macro_rules! log_file_parsing_failure {
    ($msg:expr) => {
        log::error!("[文件解析失败] {}", $msg);
    };
    ($msg:expr, $($arg:tt)*) => {
        log::error!("[文件解析失败] {}", format!($msg, $($arg)*));
    };
}
