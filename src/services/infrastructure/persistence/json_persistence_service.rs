/// JSON文件持久化服务实现
/// 检查项、模板、机器三个存储各自对应一个JSON文件

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::models::structs::{ChecklistStore, MachineStore, TemplateStore};
use crate::services::traits::{BaseService, ChecklistPersistenceService};
use crate::utils::config::PersistenceConfig;
use crate::utils::error::{AppError, AppResult};

/// JSON文件持久化服务
#[derive(Debug)]
pub struct JsonPersistenceService {
    /// 配置信息
    config: PersistenceConfig,
    /// 是否已初始化
    is_active: AtomicBool,
}

impl JsonPersistenceService {
    /// 创建新的JSON持久化服务
    pub fn new(config: PersistenceConfig) -> Self {
        Self {
            config,
            is_active: AtomicBool::new(false),
        }
    }

    /// 数据目录
    pub fn data_dir(&self) -> &Path {
        &self.config.data_path
    }

    pub fn checklist_path(&self) -> PathBuf {
        self.config.data_path.join(&self.config.checklist_file)
    }

    pub fn templates_path(&self) -> PathBuf {
        self.config.data_path.join(&self.config.templates_file)
    }

    pub fn machines_path(&self) -> PathBuf {
        self.config.data_path.join(&self.config.machines_file)
    }

    /// 确保目录存在
    async fn ensure_directory_exists(&self, dir: &Path) -> AppResult<()> {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            tokio::fs::create_dir_all(dir).await
                .map_err(|e| AppError::io_error(format!("创建目录 {:?} 失败: {}", dir, e), e.kind().to_string()))?;
        }
        Ok(())
    }

    /// 将整个存储写入文件
    async fn save_to_file<T>(&self, file_path: &Path, data: &T) -> AppResult<()>
    where
        T: Serialize + Send + Sync,
    {
        self.ensure_directory_exists(&self.config.data_path).await?;

        let json_content = serde_json::to_string_pretty(data)
            .map_err(|e| AppError::json_error(format!("序列化数据到 {:?} 失败: {}", file_path, e)))?;

        tokio::fs::write(file_path, json_content).await
            .map_err(|e| AppError::io_error(format!("写入文件 {:?} 失败: {}", file_path, e), e.kind().to_string()))?;

        log::debug!("已写入 {:?}", file_path);
        Ok(())
    }

    /// 从文件加载整个存储，文件不存在时返回默认值
    async fn load_from_file<T>(&self, file_path: &Path) -> AppResult<T>
    where
        T: DeserializeOwned + Default + Send,
    {
        if !file_path.exists() {
            log::debug!("文件 {:?} 不存在，按空存储加载", file_path);
            return Ok(T::default());
        }

        let json_content = tokio::fs::read_to_string(file_path).await
            .map_err(|e| AppError::io_error(format!("读取文件 {:?} 失败: {}", file_path, e), e.kind().to_string()))?;

        serde_json::from_str(&json_content).map_err(|e| {
            crate::log_file_parsing_failure!("反序列化文件 {:?} 内容失败: {}", file_path, e);
            AppError::json_error(format!("反序列化文件 {:?} 内容失败: {}", file_path, e))
        })
    }
}

#[async_trait]
impl BaseService for JsonPersistenceService {
    fn service_name(&self) -> &'static str {
        "JsonPersistenceService"
    }

    async fn initialize(&mut self) -> AppResult<()> {
        self.ensure_directory_exists(&self.config.data_path).await?;
        self.is_active.store(true, Ordering::SeqCst);
        log::debug!("{} 已初始化，数据目录: {:?}", self.service_name(), self.config.data_path);
        Ok(())
    }

    async fn shutdown(&mut self) -> AppResult<()> {
        self.is_active.store(false, Ordering::SeqCst);
        log::debug!("{} 已关闭", self.service_name());
        Ok(())
    }

    async fn health_check(&self) -> AppResult<()> {
        if !self.is_active.load(Ordering::SeqCst) {
            return Err(AppError::service_health_check_error(
                self.service_name(),
                "服务未激活",
            ));
        }

        let dir = &self.config.data_path;
        if !dir.as_os_str().is_empty() && !dir.is_dir() {
            return Err(AppError::service_health_check_error(
                self.service_name(),
                format!("数据目录 {:?} 不可访问", dir),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ChecklistPersistenceService for JsonPersistenceService {
    async fn load_checklist(&self) -> AppResult<ChecklistStore> {
        self.load_from_file(&self.checklist_path()).await
    }

    async fn save_checklist(&self, checklist: &ChecklistStore) -> AppResult<()> {
        self.save_to_file(&self.checklist_path(), checklist).await
    }

    async fn load_templates(&self) -> AppResult<TemplateStore> {
        self.load_from_file(&self.templates_path()).await
    }

    async fn save_templates(&self, templates: &TemplateStore) -> AppResult<()> {
        self.save_to_file(&self.templates_path(), templates).await
    }

    async fn load_machines(&self) -> AppResult<MachineStore> {
        self.load_from_file(&self.machines_path()).await
    }

    async fn save_machines(&self, machines: &MachineStore) -> AppResult<()> {
        self.save_to_file(&self.machines_path(), machines).await
    }
}
