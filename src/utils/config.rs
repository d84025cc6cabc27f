use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::utils::error::{AppError, AppResult};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config/app_config.json";

/// 应用程序主配置结构
/// 包含应用程序运行所需的所有配置信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 应用程序基本设置
    pub app_settings: AppSettings,
    /// 日志配置
    pub logging_config: LoggingConfig,
    /// 数据存储配置
    pub persistence_config: PersistenceConfig,
    /// 报告导出配置
    #[serde(default)]
    pub report_config: ReportConfig,
}

/// 应用程序基本设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// 应用程序名称
    pub app_name: String,
    /// 应用程序版本
    pub app_version: String,
    /// 运行环境 (development, testing, production)
    pub environment: String,
    /// 是否启用调试模式
    pub debug_mode: bool,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别 (debug, info, warn, error)
    pub log_level: String,
    /// 日志文件路径
    pub log_file_path: Option<PathBuf>,
    /// 是否启用控制台输出
    pub console_output: bool,
    /// 是否启用文件输出
    pub file_output: bool,
}

/// 数据持久化配置
///
/// 三个存储各自对应一个独立的JSON文件，均位于 `data_path` 之下
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// 数据文件目录
    pub data_path: PathBuf,
    /// 检查项定义文件名
    pub checklist_file: String,
    /// 模板文件名
    pub templates_file: String,
    /// 机器文件名
    pub machines_file: String,
}

/// 报告导出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// PDF导出目录
    pub export_dir: PathBuf,
    /// 导出文件名前缀
    pub file_prefix: String,
    /// 报告标题
    pub report_title: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            app_name: "ServiceChecklist".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
            debug_mode: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file_path: Some(PathBuf::from("logs/app.log")),
            console_output: true,
            file_output: false,
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("."),
            checklist_file: "checklist.json".to_string(),
            templates_file: "templates.json".to_string(),
            machines_file: "machines.json".to_string(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("exports"),
            file_prefix: "service_report".to_string(),
            report_title: "SERVICE REPORT - SUMMARY".to_string(),
        }
    }
}

/// 配置管理器
/// 负责加载、保存和管理应用程序配置
pub struct ConfigManager {
    config: AppConfig,
    config_file_path: PathBuf,
}

impl ConfigManager {
    /// 创建新的配置管理器
    pub fn new(config_file_path: PathBuf) -> Self {
        Self {
            config: AppConfig::default(),
            config_file_path,
        }
    }

    /// 配置文件路径
    pub fn config_file_path(&self) -> &PathBuf {
        &self.config_file_path
    }

    /// 从文件加载配置
    pub async fn load_from_file(&mut self) -> AppResult<()> {
        if !self.config_file_path.exists() {
            // 如果配置文件不存在，创建默认配置文件
            self.save_to_file().await?;
            return Ok(());
        }

        let content = tokio::fs::read_to_string(&self.config_file_path)
            .await
            .map_err(|e| AppError::io_error(format!("读取配置文件失败: {}", e), e.kind().to_string()))?;

        self.config = serde_json::from_str(&content)
            .map_err(|e| AppError::configuration_error(format!("解析配置文件失败: {}", e)))?;

        Ok(())
    }

    /// 将配置保存到文件
    pub async fn save_to_file(&self) -> AppResult<()> {
        // 确保目录存在
        if let Some(parent) = self.config_file_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await
                    .map_err(|e| AppError::io_error(format!("创建配置目录失败: {}", e), e.kind().to_string()))?;
            }
        }

        let content = serde_json::to_string_pretty(&self.config)
            .map_err(|e| AppError::json_error(format!("序列化配置失败: {}", e)))?;

        tokio::fs::write(&self.config_file_path, content)
            .await
            .map_err(|e| AppError::io_error(format!("写入配置文件失败: {}", e), e.kind().to_string()))?;

        Ok(())
    }

    /// 从环境变量覆盖配置
    pub fn override_from_env(&mut self) {
        self.override_from(|key| std::env::var(key).ok());
    }

    /// 从任意键值来源覆盖配置
    ///
    /// `override_from_env` 的实现基础，测试中可以直接传入闭包而不必修改进程环境
    pub fn override_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(env) = lookup("APP_ENVIRONMENT") {
            self.config.app_settings.environment = env;
        }
        if let Some(debug) = lookup("DEBUG_MODE") {
            self.config.app_settings.debug_mode = debug.to_lowercase() == "true";
        }
        if let Some(log_level) = lookup("LOG_LEVEL") {
            self.config.logging_config.log_level = log_level.to_lowercase();
        }

        // 数据路径
        if let Some(data_path) = lookup("CHECKLIST_DATA_PATH") {
            self.config.persistence_config.data_path = PathBuf::from(data_path);
        }
        if let Some(export_dir) = lookup("CHECKLIST_EXPORT_DIR") {
            self.config.report_config.export_dir = PathBuf::from(export_dir);
        }
    }

    /// 获取配置的只读引用
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// 获取配置的可变引用
    pub fn get_config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    /// 取出配置
    pub fn into_config(self) -> AppConfig {
        self.config
    }

    /// 验证配置的有效性
    pub fn validate_config(&self) -> AppResult<()> {
        // 验证环境配置
        let valid_environments = ["development", "testing", "production"];
        if !valid_environments.contains(&self.config.app_settings.environment.as_str()) {
            return Err(AppError::configuration_error(format!(
                "无效的环境配置: {}，有效值: {:?}",
                self.config.app_settings.environment, valid_environments
            )));
        }

        // 验证日志级别
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.config.logging_config.log_level.as_str()) {
            return Err(AppError::configuration_error(format!(
                "无效的日志级别: {}，有效值: {:?}",
                self.config.logging_config.log_level, valid_log_levels
            )));
        }

        if self.config.logging_config.file_output && self.config.logging_config.log_file_path.is_none() {
            return Err(AppError::configuration_error("启用文件日志时必须指定日志文件路径"));
        }

        // 验证存储文件名
        let persistence = &self.config.persistence_config;
        let file_names = [
            &persistence.checklist_file,
            &persistence.templates_file,
            &persistence.machines_file,
        ];
        if file_names.iter().any(|name| name.trim().is_empty()) {
            return Err(AppError::configuration_error("存储文件名不能为空"));
        }
        if persistence.checklist_file == persistence.templates_file
            || persistence.checklist_file == persistence.machines_file
            || persistence.templates_file == persistence.machines_file
        {
            return Err(AppError::configuration_error("三个存储必须使用不同的文件"));
        }

        if self.config.report_config.file_prefix.trim().is_empty() {
            return Err(AppError::configuration_error("报告文件名前缀不能为空"));
        }

        Ok(())
    }

    /// 重置为默认配置
    pub fn reset_to_default(&mut self) {
        self.config = AppConfig::default();
    }
}

/// 加载应用配置
///
/// 读取（或创建）配置文件，应用环境变量覆盖并验证。
/// 返回的配置由调用方显式传递给各服务，不存在全局配置实例。
pub async fn load_app_config(config_path: Option<PathBuf>) -> AppResult<AppConfig> {
    let config_path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut config_manager = ConfigManager::new(config_path);

    // 从文件加载配置
    config_manager.load_from_file().await?;

    // 从环境变量覆盖配置
    config_manager.override_from_env();

    // 验证配置
    config_manager.validate_config()?;

    Ok(config_manager.into_config())
}
