/// 服务层基础trait定义
/// 提供各层服务的接口规范，支持依赖注入和测试

use async_trait::async_trait;
use crate::utils::error::AppResult;
use crate::models::structs::{ChecklistStore, MachineStore, TemplateStore};

/// 基础服务trait，所有服务都应实现
#[async_trait]
pub trait BaseService: Send + Sync {
    /// 服务名称
    fn service_name(&self) -> &'static str;

    /// 初始化服务
    async fn initialize(&mut self) -> AppResult<()>;

    /// 关闭服务
    async fn shutdown(&mut self) -> AppResult<()>;

    /// 健康检查
    async fn health_check(&self) -> AppResult<()>;
}

/// 检查项数据持久化服务trait
///
/// 三个存储各自整体读写：每次变更后重写对应的整个文件，
/// 文件不存在时按空存储加载。
#[async_trait]
pub trait ChecklistPersistenceService: BaseService {
    /// 加载检查项定义
    async fn load_checklist(&self) -> AppResult<ChecklistStore>;

    /// 保存检查项定义
    async fn save_checklist(&self, checklist: &ChecklistStore) -> AppResult<()>;

    /// 加载模板
    async fn load_templates(&self) -> AppResult<TemplateStore>;

    /// 保存模板
    async fn save_templates(&self, templates: &TemplateStore) -> AppResult<()>;

    /// 加载机器
    async fn load_machines(&self) -> AppResult<MachineStore>;

    /// 保存机器
    async fn save_machines(&self, machines: &MachineStore) -> AppResult<()>;
}
