/// 基础设施层服务模块
/// 负责与外部系统的交互（数据文件读写）

/// 数据持久化相关模块
pub mod persistence;

// 重新导出常用接口和实现
pub use persistence::*;
