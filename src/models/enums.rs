//! # 模型枚举类型模块
//!
//! ## 业务作用
//! - **检查项类型**: 数值型（带单位和上下限）与布尔型（确认项）
//! - **检查结论**: 合格 / 警告 / 不合格，及其在报告中的优先级
//!
//! 所有枚举都支持JSON序列化，并提供与字符串的双向转换

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// 检查项类型
///
/// JSON中以小写字符串 `"numeric"` / `"boolean"` 存储
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    /// 数值型检查项，测量值需落在上下限之间
    Numeric,
    /// 布尔型检查项，操作员确认即合格
    Boolean,
}

impl Default for CheckKind {
    fn default() -> Self {
        Self::Numeric
    }
}

impl Display for CheckKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CheckKind::Numeric => "numeric",
            CheckKind::Boolean => "boolean",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for CheckKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "numeric" => Ok(CheckKind::Numeric),
            "boolean" => Ok(CheckKind::Boolean),
            _ => Err(format!("未知的检查项类型: {}", s)),
        }
    }
}

/// 检查结论
///
/// 变体按严重程度递增排列，`Ord` 的比较结果即报告中的优先级：
/// FAIL > WARNING > PASS
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    /// 合格
    Pass,
    /// 合格但接近限值
    Warning,
    /// 不合格
    Fail,
}

impl Default for CheckStatus {
    fn default() -> Self {
        Self::Pass
    }
}

impl CheckStatus {
    /// 由合格/警告标志推导结论，不合格时忽略警告标志
    pub fn from_flags(passed: bool, warning: bool) -> Self {
        match (passed, warning) {
            (false, _) => CheckStatus::Fail,
            (true, true) => CheckStatus::Warning,
            (true, false) => CheckStatus::Pass,
        }
    }

    /// 报告中使用的文字标签
    pub fn label(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Warning => "WARNING",
            CheckStatus::Fail => "FAIL",
        }
    }

    /// 报告配色（RGB，0.0 - 1.0）：绿 / 橙 / 红
    pub fn rgb(&self) -> (f32, f32, f32) {
        match self {
            CheckStatus::Pass => (0.0, 0.5, 0.0),
            CheckStatus::Warning => (1.0, 0.55, 0.0),
            CheckStatus::Fail => (0.85, 0.0, 0.0),
        }
    }

    /// 终端摘要使用的标记
    pub fn marker(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "[ OK ]",
            CheckStatus::Warning => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        }
    }
}

impl Display for CheckStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for CheckStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PASS" => Ok(CheckStatus::Pass),
            "WARNING" => Ok(CheckStatus::Warning),
            "FAIL" => Ok(CheckStatus::Fail),
            _ => Err(format!("未知的检查结论: {}", s)),
        }
    }
}
