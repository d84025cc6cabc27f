//! # 机器服务检查单 - 核心库
//!
//! 现场服务工程师按机器逐项检查：检查项定义（数值型带上下限，布尔型为确认项）
//! 组合为模板，机器按顺序套用模板并可覆盖数值限值。巡检提交经评估后汇总为
//! 合格 / 警告 / 不合格 报告，并导出为PDF或JSON。
//!
//! ## 模块划分
//! - [`models`]: 持久化结构与派生结构
//! - [`services`]: 领域规则（解析、评估、汇总、目录校验）、应用服务与JSON持久化
//! - [`utils`]: 错误类型、配置管理、时间工具
//! - [`logging`]: 日志初始化与分类日志宏
//! - [`commands`]: 命令行接口

pub mod models;
pub mod utils;
pub mod error;
pub mod logging;
pub mod services;
pub mod commands;

// 重新导出常用类型，方便使用
pub use models::*;
pub use utils::{AppError, AppResult, AppConfig};
pub use services::*;
