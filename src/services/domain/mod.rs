/// 领域服务层模块
/// 包含检查项配置与评估的核心业务规则，不涉及文件读写

/// 检查项目录 - 检查项、模板、机器的增删改与校验
pub mod checklist_catalog;

/// 有效检查项解析器 - 合并模板与机器覆盖
pub mod check_resolver;

/// 检查项评估器 - 合格 / 警告 / 不合格判定
pub mod check_evaluator;

/// 报告汇总器 - 机器结论与服务报告
pub mod report_aggregator;

// 重新导出常用类型
pub use checklist_catalog::{CascadeSummary, CheckDraft, ServiceCatalog, TemplateEntry};
pub use check_resolver::{log_resolution_issues, CheckResolver, Resolution, ResolutionIssue};
pub use check_evaluator::{numeric_verdict, DefaultCheckEvaluator, ICheckEvaluator, NumericVerdict, WARNING_PERCENT};
pub use report_aggregator::{aggregate, ReportAggregator};
