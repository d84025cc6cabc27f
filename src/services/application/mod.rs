/// 应用层服务模块
///
/// 应用层负责协调领域服务和基础设施服务，实现完整的业务流程
/// 提供面向命令行的高级API

/// 检查项目录服务 - 变更校验与整体持久化
pub mod catalog_service;
/// 巡检服务 - 空白表单、评估与报告汇总
pub mod inspection_service;
pub mod report_generation_service;

pub use catalog_service::CatalogService;
pub use inspection_service::{summary_text, InspectionService};

// 重新导出服务接口和实现
pub use report_generation_service::*;
