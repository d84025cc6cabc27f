/// 数据持久化相关模块

/// JSON文件持久化服务
pub mod json_persistence_service;


pub use json_persistence_service::JsonPersistenceService;
