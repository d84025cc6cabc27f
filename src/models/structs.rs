//! # 核心数据结构
//!
//! 持久化结构（检查项定义、模板、机器）与派生结构（有效检查项、
//! 评估结果、机器报告条目、服务报告）。持久化结构的JSON形态与
//! `checklist.json` / `templates.json` / `machines.json` 保持一致。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use crate::models::enums::{CheckKind, CheckStatus};
use crate::utils::time_utils;

/// 由标题推导检查项ID：小写，空格替换为下划线
///
/// ```rust
/// use checklist_lib::models::derive_check_id;
/// assert_eq!(derive_check_id("Oil Level"), "oil_level");
/// ```
pub fn derive_check_id(title: &str) -> String {
    title.trim().to_lowercase().replace(' ', "_")
}

/// 检查项定义
///
/// 数值型检查项带单位和默认上下限；布尔型检查项这三个字段为空，
/// 序列化时省略。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckDefinition {
    /// 唯一、稳定的检查项ID
    pub id: String,
    /// 显示标题
    pub title: String,
    /// 检查项类型
    #[serde(rename = "type")]
    pub kind: CheckKind,
    /// 单位（仅数值型）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// 默认下限（仅数值型）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// 默认上限（仅数值型）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl CheckDefinition {
    /// 创建数值型检查项，ID由标题推导
    pub fn numeric(title: impl Into<String>, unit: impl Into<String>, min: f64, max: f64) -> Self {
        let title = title.into();
        Self {
            id: derive_check_id(&title),
            title,
            kind: CheckKind::Numeric,
            unit: Some(unit.into()),
            min: Some(min),
            max: Some(max),
        }
    }

    /// 创建布尔型检查项，ID由标题推导
    pub fn boolean(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            id: derive_check_id(&title),
            title,
            kind: CheckKind::Boolean,
            unit: None,
            min: None,
            max: None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == CheckKind::Numeric
    }

    /// 检查项自身的默认限值
    pub fn default_limits(&self) -> CheckLimits {
        match self.kind {
            CheckKind::Numeric => CheckLimits { min: self.min, max: self.max },
            CheckKind::Boolean => CheckLimits::empty(),
        }
    }

    /// 单位，未设置时为空字符串
    pub fn unit_label(&self) -> &str {
        self.unit.as_deref().unwrap_or("")
    }
}

/// 检查项限值
///
/// 数值型检查项为 `{min, max}`；布尔型检查项为空记录 `{}`，
/// 在模板中出现即表示“包含该检查项”。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl CheckLimits {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min: Some(min), max: Some(max) }
    }

    /// 空记录（布尔型检查项）
    pub fn empty() -> Self {
        Self { min: None, max: None }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// 按字段覆盖：`other` 中存在的字段替换当前值，缺失的字段保留
    pub fn merge_from(&mut self, other: &CheckLimits) {
        if other.min.is_some() {
            self.min = other.min;
        }
        if other.max.is_some() {
            self.max = other.max;
        }
    }

    /// 缺失的字段用 `fallback` 补齐
    pub fn or(self, fallback: CheckLimits) -> Self {
        Self {
            min: self.min.or(fallback.min),
            max: self.max.or(fallback.max),
        }
    }

    /// 上下限是否满足 min <= max（任一缺失时视为满足）
    pub fn is_ordered(&self) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        }
    }
}

impl Display for CheckLimits {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (self.min, self.max) {
            (None, None) => write!(f, "-"),
            (min, max) => write!(
                f,
                "{} .. {}",
                min.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string()),
                max.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string())
            ),
        }
    }
}

/// 模板内容：检查项ID -> 限值覆盖记录。未出现的检查项不属于该模板
pub type TemplateChecks = BTreeMap<String, CheckLimits>;

/// 模板存储：模板名称 -> 模板内容
pub type TemplateStore = BTreeMap<String, TemplateChecks>;

/// 机器存储：机器名称 -> 机器配置
pub type MachineStore = BTreeMap<String, Machine>;

/// 检查项存储：保持文件中的顺序，ID唯一
///
/// 手工编辑的文件中重复的ID合并为一项：保留首次出现的位置，取最后一次的内容。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CheckDefinition>", into = "Vec<CheckDefinition>")]
pub struct ChecklistStore {
    checks: Vec<CheckDefinition>,
}

impl From<Vec<CheckDefinition>> for ChecklistStore {
    fn from(checks: Vec<CheckDefinition>) -> Self {
        let mut store = Self { checks: Vec::with_capacity(checks.len()) };
        for check in checks {
            match store.checks.iter_mut().find(|c| c.id == check.id) {
                Some(slot) => {
                    crate::log_config_warning!("检查项ID '{}' 重复，保留最后一次定义", check.id);
                    *slot = check;
                }
                None => store.checks.push(check),
            }
        }
        store
    }
}

impl From<ChecklistStore> for Vec<CheckDefinition> {
    fn from(store: ChecklistStore) -> Self {
        store.checks
    }
}

impl ChecklistStore {
    pub fn new(checks: Vec<CheckDefinition>) -> Self {
        Self::from(checks)
    }

    pub fn get(&self, id: &str) -> Option<&CheckDefinition> {
        self.checks.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CheckDefinition> {
        self.checks.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.checks.iter().map(|c| c.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// 追加新检查项（调用方负责唯一性检查）
    pub fn push(&mut self, check: CheckDefinition) {
        self.checks.push(check);
    }

    /// 原位替换同ID的检查项，返回是否找到
    pub fn replace(&mut self, check: CheckDefinition) -> bool {
        match self.checks.iter_mut().find(|c| c.id == check.id) {
            Some(slot) => {
                *slot = check;
                true
            }
            None => false,
        }
    }

    /// 移除检查项，返回被移除的定义
    pub fn remove(&mut self, id: &str) -> Option<CheckDefinition> {
        let index = self.checks.iter().position(|c| c.id == id)?;
        Some(self.checks.remove(index))
    }
}

/// 机器配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    /// 按顺序应用的模板名称
    #[serde(default)]
    pub templates: Vec<String>,
    /// 机器级数值限值覆盖，优先于模板限值
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, CheckLimits>,
}

impl Machine {
    pub fn with_templates<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            templates: templates.into_iter().map(Into::into).collect(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_override(mut self, check_id: impl Into<String>, limits: CheckLimits) -> Self {
        self.overrides.insert(check_id.into(), limits);
        self
    }
}

/// 有效检查项（派生，不持久化）
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveCheck {
    pub definition: CheckDefinition,
    pub limits: CheckLimits,
}

// ==================== 提交与报告 ====================

/// 报告抬头信息（自由文本）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportHeader {
    /// 服务日期，ISO格式
    #[serde(default = "crate::utils::time_utils::today_iso")]
    pub service_date: String,
    /// 服务工程师
    #[serde(default)]
    pub engineer: String,
    /// 工单号
    #[serde(default)]
    pub job_id: String,
    /// 客户 / 现场
    #[serde(default)]
    pub customer: String,
}

impl Default for ReportHeader {
    fn default() -> Self {
        Self {
            service_date: time_utils::today_iso(),
            engineer: String::new(),
            job_id: String::new(),
            customer: String::new(),
        }
    }
}

impl ReportHeader {
    /// 按报告中的显示顺序返回 (标签, 值)
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("Service Date", self.service_date.as_str()),
            ("Engineer", self.engineer.as_str()),
            ("Job Id", self.job_id.as_str()),
            ("Customer", self.customer.as_str()),
        ]
    }
}

/// 提交值：数值型检查项为JSON数字，布尔型检查项为JSON布尔值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmittedValue {
    Boolean(bool),
    Numeric(f64),
}

impl SubmittedValue {
    /// 表单默认值：数值 0.0，布尔 未勾选
    pub fn default_for(kind: CheckKind) -> Self {
        match kind {
            CheckKind::Numeric => SubmittedValue::Numeric(0.0),
            CheckKind::Boolean => SubmittedValue::Boolean(false),
        }
    }
}

impl Display for SubmittedValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmittedValue::Boolean(v) => write!(f, "{}", if *v { "OK" } else { "NOT OK" }),
            SubmittedValue::Numeric(v) => write!(f, "{}", v),
        }
    }
}

/// 单个检查项的提交内容
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckSubmission {
    /// 提交值，缺失时按表单默认值处理
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<SubmittedValue>,
    /// 备注
    #[serde(default)]
    pub note: String,
}

impl CheckSubmission {
    pub fn numeric(value: f64) -> Self {
        Self { value: Some(SubmittedValue::Numeric(value)), note: String::new() }
    }

    pub fn boolean(value: bool) -> Self {
        Self { value: Some(SubmittedValue::Boolean(value)), note: String::new() }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

/// 服务提交：机器名称 -> 检查项ID -> 提交内容
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceSubmission {
    #[serde(default)]
    pub header: ReportHeader,
    #[serde(default)]
    pub machines: BTreeMap<String, BTreeMap<String, CheckSubmission>>,
}

impl ServiceSubmission {
    /// 查找某台机器某个检查项的提交内容
    pub fn entry(&self, machine: &str, check_id: &str) -> Option<&CheckSubmission> {
        self.machines.get(machine).and_then(|checks| checks.get(check_id))
    }

    /// 记录某台机器某个检查项的提交内容
    pub fn set(&mut self, machine: impl Into<String>, check_id: impl Into<String>, submission: CheckSubmission) {
        self.machines
            .entry(machine.into())
            .or_default()
            .insert(check_id.into(), submission);
    }
}

/// 单个检查项的评估结果（派生，瞬时）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub check_id: String,
    pub title: String,
    pub kind: CheckKind,
    /// 是否在限值之内 / 是否确认
    #[serde(rename = "pass")]
    pub passed: bool,
    /// 是否落入警告带（仅数值型）
    pub warning: bool,
    pub value: SubmittedValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub note: String,
}

impl EvaluationResult {
    pub fn status(&self) -> CheckStatus {
        CheckStatus::from_flags(self.passed, self.warning)
    }

    /// 数值详情，例如 `7.5 (min 0/max 10)`；布尔型检查项为空
    pub fn details(&self) -> String {
        match (self.value, self.min, self.max) {
            (SubmittedValue::Numeric(value), Some(min), Some(max)) => {
                format!("{} (min {}/max {})", value, min, max)
            }
            _ => String::new(),
        }
    }
}

/// 单台机器的报告条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineReportEntry {
    pub machine: String,
    pub status: CheckStatus,
    pub results: Vec<EvaluationResult>,
}

/// 服务报告，供PDF/JSON渲染使用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceReport {
    pub header: ReportHeader,
    pub generated_at: DateTime<Utc>,
    pub machines: Vec<MachineReportEntry>,
    /// 未解析出任何检查项的机器，不出现在报告行中
    #[serde(default)]
    pub unconfigured_machines: Vec<String>,
}

impl ServiceReport {
    /// 整体结论：所有机器中最严重的结论；没有机器时为 None
    pub fn overall_status(&self) -> Option<CheckStatus> {
        self.machines.iter().map(|m| m.status).max()
    }

    /// 指定结论的机器数量
    pub fn count_with_status(&self, status: CheckStatus) -> usize {
        self.machines.iter().filter(|m| m.status == status).count()
    }

    pub fn machine(&self, name: &str) -> Option<&MachineReportEntry> {
        self.machines.iter().find(|m| m.machine == name)
    }
}
