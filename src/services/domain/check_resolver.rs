//! 有效检查项解析器
//!
//! 按机器配置合并模板与机器级覆盖：
//! 1. 按 `templates` 声明顺序依次复制各模板的条目，同一检查项后者覆盖前者；
//! 2. 再逐字段应用机器 `overrides`，无论条目来自哪个模板。
//!
//! 不存在的模板或检查项不会导致错误，而是被过滤掉并记录为
//! [`ResolutionIssue`]，由调用方决定如何提示。

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use crate::models::enums::CheckKind;
use crate::models::structs::{ChecklistStore, CheckLimits, EffectiveCheck, Machine, TemplateStore};

/// 解析过程中被忽略的悬空引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionIssue {
    /// 机器引用了不存在的模板
    UnknownTemplate { template: String },
    /// 模板引用了不存在的检查项
    UnknownTemplateCheck { template: String, check_id: String },
    /// 机器覆盖引用了不存在的检查项
    UnknownOverrideCheck { check_id: String },
    /// 机器覆盖指向布尔型检查项（覆盖只适用于数值型检查项）
    OverrideOnBooleanCheck { check_id: String },
}

impl Display for ResolutionIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionIssue::UnknownTemplate { template } => {
                write!(f, "模板 '{}' 不存在，已忽略", template)
            }
            ResolutionIssue::UnknownTemplateCheck { template, check_id } => {
                write!(f, "模板 '{}' 引用的检查项 '{}' 不存在，已忽略", template, check_id)
            }
            ResolutionIssue::UnknownOverrideCheck { check_id } => {
                write!(f, "覆盖引用的检查项 '{}' 不存在，已忽略", check_id)
            }
            ResolutionIssue::OverrideOnBooleanCheck { check_id } => {
                write!(f, "检查项 '{}' 为布尔型，覆盖已忽略", check_id)
            }
        }
    }
}

/// 解析结果：有效限值映射与被忽略的引用
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub checks: BTreeMap<String, CheckLimits>,
    pub issues: Vec<ResolutionIssue>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

/// 有效检查项解析器
///
/// 每次调用都重新计算，不做缓存。
#[derive(Debug, Clone, Copy)]
pub struct CheckResolver<'a> {
    checklist: &'a ChecklistStore,
    templates: &'a TemplateStore,
}

impl<'a> CheckResolver<'a> {
    pub fn new(checklist: &'a ChecklistStore, templates: &'a TemplateStore) -> Self {
        Self { checklist, templates }
    }

    /// 计算机器的有效检查项限值
    pub fn resolve(&self, machine: &Machine) -> Resolution {
        let mut resolution = Resolution::default();

        for template_name in &machine.templates {
            let Some(template) = self.templates.get(template_name) else {
                resolution.issues.push(ResolutionIssue::UnknownTemplate {
                    template: template_name.clone(),
                });
                continue;
            };

            for (check_id, limits) in template {
                if !self.checklist.contains(check_id) {
                    resolution.issues.push(ResolutionIssue::UnknownTemplateCheck {
                        template: template_name.clone(),
                        check_id: check_id.clone(),
                    });
                    continue;
                }
                resolution.checks.insert(check_id.clone(), *limits);
            }
        }

        for (check_id, limits) in &machine.overrides {
            match self.checklist.get(check_id) {
                None => resolution.issues.push(ResolutionIssue::UnknownOverrideCheck {
                    check_id: check_id.clone(),
                }),
                Some(definition) if definition.kind == CheckKind::Boolean => {
                    resolution.issues.push(ResolutionIssue::OverrideOnBooleanCheck {
                        check_id: check_id.clone(),
                    })
                }
                Some(_) => resolution
                    .checks
                    .entry(check_id.clone())
                    .or_default()
                    .merge_from(limits),
            }
        }

        resolution
    }

    /// 按检查项文件顺序返回有效检查项（含定义）
    pub fn effective_checks(&self, machine: &Machine) -> (Vec<EffectiveCheck>, Vec<ResolutionIssue>) {
        let Resolution { checks, issues } = self.resolve(machine);

        let effective = self
            .checklist
            .iter()
            .filter_map(|definition| {
                checks.get(&definition.id).map(|limits| EffectiveCheck {
                    definition: definition.clone(),
                    limits: *limits,
                })
            })
            .collect();

        (effective, issues)
    }
}

/// 以配置警告的形式记录解析问题
pub fn log_resolution_issues(machine_name: &str, issues: &[ResolutionIssue]) {
    for issue in issues {
        crate::log_config_warning!("机器 '{}': {}", machine_name, issue);
    }
}
