use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 应用程序统一错误类型
/// 用于封装检查项配置、报告生成过程中可能出现的各种错误
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum AppError {
    /// 通用错误，包含错误消息
    #[error("通用错误: {message}")]
    Generic { message: String },

    /// 输入/输出错误
    #[error("IO错误: {message} (Kind: {kind})")]
    IoError { message: String, kind: String },

    /// 配置相关错误
    #[error("配置错误: {message}")]
    ConfigurationError { message: String },

    /// 验证错误（数据验证失败）
    ///
    /// **业务含义**: 操作员输入不完整或不合法，例如
    /// - 检查项缺少标题、模板或机器缺少名称
    /// - 数值检查项下限大于上限
    /// - 提交值类型与检查项类型不一致
    ///
    /// 验证失败时操作整体中止，内存中的存储不会发生任何变化
    #[error("验证错误: {message}")]
    ValidationError { message: String },

    /// 标识重复错误
    #[error("标识已存在: {resource_type} - {identifier}")]
    AlreadyExistsError {
        resource_type: String,
        identifier: String,
    },

    /// 资源未找到错误
    #[error("资源未找到: {resource_type} - {message}")]
    NotFoundError {
        resource_type: String,
        message: String,
    },

    /// 服务健康检查失败错误
    #[error("服务健康检查失败: {service_name}, 原因: {reason}")]
    ServiceHealthCheckError { service_name: String, reason: String },

    /// JSON序列化/反序列化错误
    #[error("JSON序列化/反序列化错误: {message}")]
    JsonError { message: String },

    /// PDF生成错误
    #[error("PDF生成错误: {message}")]
    PdfError { message: String },

    /// 报告生成错误
    #[error("报告生成错误: {message}")]
    ReportGenerationError { message: String },
}

impl AppError {
    /// 创建通用错误
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// 创建IO错误
    pub fn io_error(message: impl Into<String>, kind_str: impl Into<String>) -> Self {
        Self::IoError {
            message: message.into(),
            kind: kind_str.into(),
        }
    }

    /// 创建配置错误
    pub fn configuration_error(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// 创建验证错误
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    /// 创建标识重复错误
    pub fn already_exists_error(
        resource_type: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self::AlreadyExistsError {
            resource_type: resource_type.into(),
            identifier: identifier.into(),
        }
    }

    /// 创建资源未找到错误
    pub fn not_found_error(resource_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFoundError {
            resource_type: resource_type.into(),
            message: message.into(),
        }
    }

    /// 创建服务健康检查失败错误
    pub fn service_health_check_error(
        service_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ServiceHealthCheckError {
            service_name: service_name.into(),
            reason: reason.into(),
        }
    }

    /// 创建JSON序列化错误
    pub fn json_error(message: impl Into<String>) -> Self {
        Self::JsonError {
            message: message.into(),
        }
    }

    /// 创建PDF生成错误
    pub fn pdf_error(message: impl Into<String>) -> Self {
        Self::PdfError {
            message: message.into(),
        }
    }

    /// 创建报告生成错误
    pub fn report_generation_error(message: impl Into<String>) -> Self {
        Self::ReportGenerationError {
            message: message.into(),
        }
    }

    /// 是否属于操作员可修正的输入错误
    ///
    /// 命令行入口据此决定是只提示一行信息，还是按系统故障输出完整错误链
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AppError::ValidationError { .. }
                | AppError::AlreadyExistsError { .. }
                | AppError::NotFoundError { .. }
        )
    }

    /// 获取错误的简短描述
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Generic { .. } => "GENERIC",
            AppError::IoError { .. } => "IO_ERROR",
            AppError::ConfigurationError { .. } => "CONFIGURATION_ERROR",
            AppError::ValidationError { .. } => "VALIDATION_ERROR",
            AppError::AlreadyExistsError { .. } => "ALREADY_EXISTS_ERROR",
            AppError::NotFoundError { .. } => "NOT_FOUND_ERROR",
            AppError::ServiceHealthCheckError { .. } => "SERVICE_HEALTH_CHECK_ERROR",
            AppError::JsonError { .. } => "JSON_ERROR",
            AppError::PdfError { .. } => "PDF_ERROR",
            AppError::ReportGenerationError { .. } => "REPORT_GENERATION_ERROR",
        }
    }
}

/// 标准 I/O 错误到 AppError 的转换
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError { message: err.to_string(), kind: format!("{:?}", err.kind()) }
    }
}

/// serde_json 错误到 AppError 的转换
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::JsonError { message: err.to_string() }
    }
}

/// printpdf 错误到 AppError 的转换
impl From<printpdf::Error> for AppError {
    fn from(err: printpdf::Error) -> Self {
        AppError::PdfError { message: format!("printpdf error: {}", err) }
    }
}

/// 字符串错误到 AppError 的转换（通用错误）
impl From<String> for AppError {
    fn from(err_msg: String) -> Self {
        Self::Generic { message: err_msg }
    }
}

/// &str 错误到 AppError 的转换（通用错误）
impl From<&str> for AppError {
    fn from(err_msg: &str) -> Self {
        Self::Generic { message: err_msg.to_string() }
    }
}

/// 应用程序结果类型别名
/// 简化错误处理的类型定义
pub type AppResult<T> = Result<T, AppError>;
