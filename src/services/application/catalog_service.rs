/// 检查项目录服务
///
/// 在内存目录的副本上执行变更，校验通过后整体重写受影响的存储文件，
/// 写入成功后才替换内存中的目录。

use std::sync::Arc;

use crate::models::structs::{CheckDefinition, Machine, TemplateChecks};
use crate::services::domain::{CascadeSummary, CheckDraft, Resolution, ServiceCatalog, TemplateEntry};
use crate::services::traits::ChecklistPersistenceService;
use crate::utils::error::{AppError, AppResult};

/// 一次变更需要重写的存储
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StoreSet {
    checklist: bool,
    templates: bool,
    machines: bool,
}

impl StoreSet {
    const CHECKLIST: StoreSet = StoreSet { checklist: true, templates: false, machines: false };
    const TEMPLATES: StoreSet = StoreSet { checklist: false, templates: true, machines: false };
    const MACHINES: StoreSet = StoreSet { checklist: false, templates: false, machines: true };
    const ALL: StoreSet = StoreSet { checklist: true, templates: true, machines: true };
}

/// 检查项目录服务
pub struct CatalogService {
    persistence: Arc<dyn ChecklistPersistenceService>,
    catalog: ServiceCatalog,
}

impl CatalogService {
    /// 从持久化服务加载三个存储
    pub async fn load(persistence: Arc<dyn ChecklistPersistenceService>) -> AppResult<Self> {
        let catalog = ServiceCatalog::new(
            persistence.load_checklist().await?,
            persistence.load_templates().await?,
            persistence.load_machines().await?,
        );
        log::debug!(
            "已加载 {} 个检查项, {} 个模板, {} 台机器",
            catalog.checklist.len(),
            catalog.templates.len(),
            catalog.machines.len()
        );
        Ok(Self { persistence, catalog })
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    /// 解析指定机器的有效检查项
    pub fn resolve_machine(&self, name: &str) -> AppResult<Resolution> {
        let machine = self
            .catalog
            .machines
            .get(name)
            .ok_or_else(|| AppError::not_found_error("机器", name))?;
        Ok(self.catalog.resolver().resolve(machine))
    }

    async fn persist(&self, catalog: &ServiceCatalog, stores: StoreSet) -> AppResult<()> {
        if stores.checklist {
            self.persistence.save_checklist(&catalog.checklist).await?;
        }
        if stores.templates {
            self.persistence.save_templates(&catalog.templates).await?;
        }
        if stores.machines {
            self.persistence.save_machines(&catalog.machines).await?;
        }
        Ok(())
    }

    /// 在副本上执行变更并持久化，成功后提交
    async fn commit<T, F>(&mut self, stores: StoreSet, operation: F) -> AppResult<T>
    where
        F: FnOnce(&mut ServiceCatalog) -> AppResult<T>,
    {
        let mut next = self.catalog.clone();
        let output = operation(&mut next)?;
        self.persist(&next, stores).await?;
        self.catalog = next;
        Ok(output)
    }

    // ==================== 检查项 ====================

    pub async fn add_check(&mut self, draft: CheckDraft) -> AppResult<CheckDefinition> {
        let definition = self.commit(StoreSet::CHECKLIST, |c| c.add_check(draft)).await?;
        crate::log_user_operation!("新增检查项 '{}' ({})", definition.id, definition.kind);
        Ok(definition)
    }

    pub async fn update_check(&mut self, id: &str, draft: CheckDraft) -> AppResult<CheckDefinition> {
        let definition = self.commit(StoreSet::CHECKLIST, |c| c.update_check(id, draft)).await?;
        crate::log_user_operation!("更新检查项 '{}'", definition.id);
        Ok(definition)
    }

    pub async fn delete_check(&mut self, id: &str) -> AppResult<CascadeSummary> {
        let summary = self.commit(StoreSet::ALL, |c| c.delete_check(id)).await?;
        crate::log_user_operation!(
            "删除检查项 '{}'，同时移除了 {} 个模板条目和 {} 个机器覆盖",
            id,
            summary.templates.len(),
            summary.machines.len()
        );
        Ok(summary)
    }

    // ==================== 模板 ====================

    pub async fn save_template(&mut self, name: &str, entries: Vec<TemplateEntry>) -> AppResult<TemplateChecks> {
        let checks = self.commit(StoreSet::TEMPLATES, |c| c.save_template(name, entries)).await?;
        crate::log_user_operation!("保存模板 '{}'，包含 {} 个检查项", name.trim(), checks.len());
        Ok(checks)
    }

    pub async fn delete_template(&mut self, name: &str) -> AppResult<()> {
        self.commit(StoreSet::TEMPLATES, |c| c.delete_template(name)).await?;
        crate::log_user_operation!("删除模板 '{}'", name);

        let users = self.catalog.machines_using_template(name);
        if !users.is_empty() {
            crate::log_config_warning!("以下机器仍引用已删除的模板 '{}': {}", name, users.join(", "));
        }
        Ok(())
    }

    // ==================== 机器 ====================

    pub async fn save_machine(&mut self, name: &str, machine: Machine) -> AppResult<Machine> {
        let machine = self.commit(StoreSet::MACHINES, |c| c.save_machine(name, machine)).await?;
        crate::log_user_operation!(
            "保存机器 '{}'，模板: [{}]，覆盖 {} 项",
            name.trim(),
            machine.templates.join(", "),
            machine.overrides.len()
        );
        Ok(machine)
    }

    pub async fn delete_machine(&mut self, name: &str) -> AppResult<()> {
        self.commit(StoreSet::MACHINES, |c| c.delete_machine(name)).await?;
        crate::log_user_operation!("删除机器 '{}'", name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::structs::CheckLimits;
    use crate::services::infrastructure::JsonPersistenceService;
    use crate::services::traits::BaseService;
    use crate::utils::config::PersistenceConfig;
    use tempfile::TempDir;

    async fn create_service(temp_dir: &TempDir) -> (CatalogService, Arc<JsonPersistenceService>) {
        let mut persistence = JsonPersistenceService::new(PersistenceConfig {
            data_path: temp_dir.path().to_path_buf(),
            ..PersistenceConfig::default()
        });
        persistence.initialize().await.unwrap();
        let persistence = Arc::new(persistence);
        let service = CatalogService::load(persistence.clone()).await.unwrap();
        (service, persistence)
    }

    #[tokio::test]
    async fn test_mutations_are_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let (mut service, persistence) = create_service(&temp_dir).await;

        service.add_check(CheckDraft::numeric("A", "mm", 0.0, 100.0)).await.unwrap();
        service
            .save_template("T1", vec![TemplateEntry::with_limits("a", CheckLimits::new(0.0, 10.0))])
            .await
            .unwrap();
        service
            .save_machine("Press", Machine::with_templates(["T1"]).with_override("a", CheckLimits::new(1.0, 2.0)))
            .await
            .unwrap();

        let reloaded = CatalogService::load(persistence).await.unwrap();
        assert_eq!(reloaded.catalog(), service.catalog());
        assert_eq!(
            reloaded.resolve_machine("Press").unwrap().checks["a"],
            CheckLimits::new(1.0, 2.0)
        );
    }

    /// 删除检查项后三个文件都被重写
    #[tokio::test]
    async fn test_delete_check_rewrites_all_stores() {
        let temp_dir = TempDir::new().unwrap();
        let (mut service, persistence) = create_service(&temp_dir).await;

        service.add_check(CheckDraft::numeric("A", "mm", 0.0, 100.0)).await.unwrap();
        service.add_check(CheckDraft::boolean("Guard")).await.unwrap();
        service
            .save_template("T1", vec![TemplateEntry::new("a"), TemplateEntry::new("guard")])
            .await
            .unwrap();
        service
            .save_machine("Press", Machine::with_templates(["T1"]).with_override("a", CheckLimits::new(1.0, 2.0)))
            .await
            .unwrap();

        service.delete_check("a").await.unwrap();

        let templates = persistence.load_templates().await.unwrap();
        assert!(!templates["T1"].contains_key("a"));
        let machines = persistence.load_machines().await.unwrap();
        assert!(machines["Press"].overrides.is_empty());
        assert!(!persistence.load_checklist().await.unwrap().contains("a"));
    }

    /// 校验失败时内存与文件都保持不变
    #[tokio::test]
    async fn test_failed_validation_changes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let (mut service, persistence) = create_service(&temp_dir).await;

        service.add_check(CheckDraft::boolean("Guard")).await.unwrap();
        let before = service.catalog().clone();

        assert!(service.add_check(CheckDraft::boolean("Guard")).await.is_err());
        assert!(service.save_machine("Press", Machine::with_templates(["Nope"])).await.is_err());
        assert!(service.delete_template("Nope").await.is_err());

        assert_eq!(service.catalog(), &before);
        assert!(persistence.load_machines().await.unwrap().is_empty());
        assert!(!persistence.machines_path().exists());
    }

    #[tokio::test]
    async fn test_resolve_unknown_machine() {
        let temp_dir = TempDir::new().unwrap();
        let (service, _) = create_service(&temp_dir).await;
        let err = service.resolve_machine("Ghost").unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND_ERROR");
    }
}
