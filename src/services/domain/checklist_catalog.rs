//! # 检查项目录
//!
//! 持有检查项、模板、机器三个存储，并实现它们的增删改校验规则：
//!
//! - 检查项ID由标题推导，重复ID被拒绝
//! - 删除检查项时级联移除模板条目与机器覆盖
//! - 模板与机器只能引用已存在的检查项 / 模板
//! - 删除模板不级联，仍引用它的机器在解析时忽略该模板
//!
//! 所有方法都先完成校验再修改，校验失败时目录保持不变。
//! 持久化由应用层负责。

use crate::models::enums::CheckKind;
use crate::models::structs::{
    derive_check_id, CheckDefinition, CheckLimits, ChecklistStore, Machine, MachineStore, TemplateChecks,
    TemplateStore,
};
use crate::services::domain::check_resolver::CheckResolver;
use crate::utils::error::{AppError, AppResult};

/// 新建数值型检查项时的默认下限
pub const DEFAULT_NUMERIC_MIN: f64 = 0.0;
/// 新建数值型检查项时的默认上限
pub const DEFAULT_NUMERIC_MAX: f64 = 100.0;

/// 检查项草稿（新建或更新）
#[derive(Debug, Clone, PartialEq)]
pub struct CheckDraft {
    pub title: String,
    pub kind: CheckKind,
    pub unit: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl CheckDraft {
    pub fn numeric(title: impl Into<String>, unit: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            title: title.into(),
            kind: CheckKind::Numeric,
            unit: Some(unit.into()),
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn boolean(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: CheckKind::Boolean,
            unit: None,
            min: None,
            max: None,
        }
    }

    /// 校验并生成指定ID的检查项定义
    fn into_definition(self, id: String) -> AppResult<CheckDefinition> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::validation_error("检查项标题不能为空"));
        }

        let definition = match self.kind {
            CheckKind::Boolean => CheckDefinition {
                id,
                title,
                kind: CheckKind::Boolean,
                unit: None,
                min: None,
                max: None,
            },
            CheckKind::Numeric => {
                let min = self.min.unwrap_or(DEFAULT_NUMERIC_MIN);
                let max = self.max.unwrap_or(DEFAULT_NUMERIC_MAX);
                if min > max {
                    return Err(AppError::validation_error(format!(
                        "检查项 '{}' 的下限 {} 大于上限 {}",
                        title, min, max
                    )));
                }
                CheckDefinition {
                    id,
                    title,
                    kind: CheckKind::Numeric,
                    unit: Some(self.unit.unwrap_or_default().trim().to_string()),
                    min: Some(min),
                    max: Some(max),
                }
            }
        };

        Ok(definition)
    }
}

/// 模板条目：检查项ID与可选的限值
///
/// 数值型检查项未给出限值时使用检查项定义的默认限值。
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateEntry {
    pub check_id: String,
    pub limits: Option<CheckLimits>,
}

impl TemplateEntry {
    pub fn new(check_id: impl Into<String>) -> Self {
        Self { check_id: check_id.into(), limits: None }
    }

    pub fn with_limits(check_id: impl Into<String>, limits: CheckLimits) -> Self {
        Self { check_id: check_id.into(), limits: Some(limits) }
    }
}

/// 级联删除的影响范围
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeSummary {
    /// 被移除条目的模板
    pub templates: Vec<String>,
    /// 被移除覆盖的机器
    pub machines: Vec<String>,
}

/// 检查项目录
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceCatalog {
    pub checklist: ChecklistStore,
    pub templates: TemplateStore,
    pub machines: MachineStore,
}

fn require_name(kind: &str, name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation_error(format!("{}名称不能为空", kind)));
    }
    Ok(name.to_string())
}

impl ServiceCatalog {
    pub fn new(checklist: ChecklistStore, templates: TemplateStore, machines: MachineStore) -> Self {
        Self { checklist, templates, machines }
    }

    /// 三个存储是否都已配置
    pub fn is_configured(&self) -> bool {
        !self.checklist.is_empty() && !self.templates.is_empty() && !self.machines.is_empty()
    }

    pub fn resolver(&self) -> CheckResolver<'_> {
        CheckResolver::new(&self.checklist, &self.templates)
    }

    // ==================== 检查项 ====================

    /// 新建检查项，ID由标题推导
    pub fn add_check(&mut self, draft: CheckDraft) -> AppResult<CheckDefinition> {
        let id = derive_check_id(&draft.title);
        if self.checklist.contains(&id) {
            return Err(AppError::already_exists_error("检查项", id));
        }

        let definition = draft.into_definition(id)?;
        self.checklist.push(definition.clone());
        Ok(definition)
    }

    /// 原位更新检查项，ID保持不变
    pub fn update_check(&mut self, id: &str, draft: CheckDraft) -> AppResult<CheckDefinition> {
        if !self.checklist.contains(id) {
            return Err(AppError::not_found_error("检查项", id));
        }

        let definition = draft.into_definition(id.to_string())?;
        self.checklist.replace(definition.clone());
        Ok(definition)
    }

    /// 删除检查项，并从所有模板和机器覆盖中移除
    pub fn delete_check(&mut self, id: &str) -> AppResult<CascadeSummary> {
        if self.checklist.remove(id).is_none() {
            return Err(AppError::not_found_error("检查项", id));
        }

        let mut summary = CascadeSummary::default();
        for (name, checks) in self.templates.iter_mut() {
            if checks.remove(id).is_some() {
                summary.templates.push(name.clone());
            }
        }
        for (name, machine) in self.machines.iter_mut() {
            if machine.overrides.remove(id).is_some() {
                summary.machines.push(name.clone());
            }
        }
        Ok(summary)
    }

    // ==================== 模板 ====================

    /// 新建或替换模板
    pub fn save_template(&mut self, name: &str, entries: Vec<TemplateEntry>) -> AppResult<TemplateChecks> {
        let name = require_name("模板", name)?;

        let mut checks = TemplateChecks::new();
        for entry in entries {
            let definition = self
                .checklist
                .get(&entry.check_id)
                .ok_or_else(|| AppError::not_found_error("检查项", entry.check_id.clone()))?;

            let limits = match definition.kind {
                CheckKind::Boolean => CheckLimits::empty(),
                CheckKind::Numeric => {
                    let limits = entry
                        .limits
                        .unwrap_or_default()
                        .or(definition.default_limits());
                    if !limits.is_ordered() {
                        return Err(AppError::validation_error(format!(
                            "模板 '{}' 中检查项 '{}' 的下限大于上限",
                            name, definition.id
                        )));
                    }
                    limits
                }
            };
            checks.insert(definition.id.clone(), limits);
        }

        self.templates.insert(name, checks.clone());
        Ok(checks)
    }

    /// 删除模板，不修改引用它的机器
    pub fn delete_template(&mut self, name: &str) -> AppResult<TemplateChecks> {
        self.templates
            .remove(name)
            .ok_or_else(|| AppError::not_found_error("模板", name))
    }

    /// 仍引用指定模板的机器
    pub fn machines_using_template(&self, name: &str) -> Vec<String> {
        self.machines
            .iter()
            .filter(|(_, machine)| machine.templates.iter().any(|t| t == name))
            .map(|(machine_name, _)| machine_name.clone())
            .collect()
    }

    // ==================== 机器 ====================

    /// 新建或替换机器配置
    pub fn save_machine(&mut self, name: &str, machine: Machine) -> AppResult<Machine> {
        let name = require_name("机器", name)?;

        if let Some(missing) = machine.templates.iter().find(|t| !self.templates.contains_key(*t)) {
            return Err(AppError::not_found_error("模板", missing.clone()));
        }

        for (check_id, limits) in &machine.overrides {
            let definition = self
                .checklist
                .get(check_id)
                .ok_or_else(|| AppError::not_found_error("检查项", check_id.clone()))?;
            if !definition.is_numeric() {
                return Err(AppError::validation_error(format!(
                    "检查项 '{}' 不是数值型，不能设置覆盖",
                    check_id
                )));
            }
            if limits.is_empty() || !limits.is_ordered() {
                return Err(AppError::validation_error(format!(
                    "机器 '{}' 对检查项 '{}' 的覆盖限值无效: {}",
                    name, check_id, limits
                )));
            }
        }

        // 单边覆盖与模板或定义中的另一侧合并后仍须满足 min <= max
        let resolution = self.resolver().resolve(&machine);
        for check_id in machine.overrides.keys() {
            let Some(definition) = self.checklist.get(check_id) else {
                continue;
            };
            let effective = resolution
                .checks
                .get(check_id)
                .copied()
                .unwrap_or_default()
                .or(definition.default_limits());
            if !effective.is_ordered() {
                return Err(AppError::validation_error(format!(
                    "机器 '{}' 对检查项 '{}' 的覆盖产生无效的有效限值: {}",
                    name, check_id, effective
                )));
            }
        }

        self.machines.insert(name, machine.clone());
        Ok(machine)
    }

    pub fn delete_machine(&mut self, name: &str) -> AppResult<Machine> {
        self.machines
            .remove(name)
            .ok_or_else(|| AppError::not_found_error("机器", name))
    }
}
