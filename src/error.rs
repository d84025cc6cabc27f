/// 错误处理模块
///
/// 本模块是应用程序错误处理的统一入口点，
/// 重新导出 utils::error 中的所有错误类型，其他模块可以通过
/// `use crate::error::*` 使用。
///
/// ```rust
/// use checklist_lib::error::{AppError, AppResult};
///
/// fn require_title(title: &str) -> AppResult<()> {
///     if title.trim().is_empty() {
///         return Err(AppError::validation_error("检查项必须填写标题"));
///     }
///     Ok(())
/// }
///
/// assert!(require_title("").is_err());
/// ```

pub use crate::utils::error::*;
