/// 巡检服务
///
/// 生成空白提交表单，依据提交内容对每台机器的有效检查项逐一评估，
/// 并汇总为服务报告。

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::models::structs::{
    CheckSubmission, ReportHeader, ServiceReport, ServiceSubmission, SubmittedValue,
};
use crate::services::domain::{
    log_resolution_issues, DefaultCheckEvaluator, ICheckEvaluator, ReportAggregator, ServiceCatalog,
};
use crate::utils::error::{AppError, AppResult};

/// 巡检服务
pub struct InspectionService {
    evaluator: Arc<dyn ICheckEvaluator>,
}

impl Default for InspectionService {
    fn default() -> Self {
        Self::new(Arc::new(DefaultCheckEvaluator))
    }
}

impl InspectionService {
    pub fn new(evaluator: Arc<dyn ICheckEvaluator>) -> Self {
        Self { evaluator }
    }

    /// 生成空白提交：每台已配置机器的每个有效检查项都填入表单默认值
    pub fn blank_submission(&self, catalog: &ServiceCatalog, header: ReportHeader) -> ServiceSubmission {
        let resolver = catalog.resolver();
        let mut submission = ServiceSubmission {
            header,
            machines: BTreeMap::new(),
        };

        for (name, machine) in &catalog.machines {
            let (effective, _) = resolver.effective_checks(machine);
            for check in effective {
                submission.set(
                    name.clone(),
                    check.definition.id.clone(),
                    CheckSubmission {
                        value: Some(SubmittedValue::default_for(check.definition.kind)),
                        note: String::new(),
                    },
                );
            }
        }

        submission
    }

    /// 三个存储都必须非空
    fn ensure_configured(catalog: &ServiceCatalog) -> AppResult<()> {
        if catalog.checklist.is_empty() {
            return Err(AppError::validation_error("尚未定义任何检查项，请先配置检查项"));
        }
        if catalog.templates.is_empty() {
            return Err(AppError::validation_error("尚未定义任何模板，请先配置模板"));
        }
        if catalog.machines.is_empty() {
            return Err(AppError::validation_error("尚未定义任何机器，请先配置机器"));
        }
        Ok(())
    }

    /// 评估提交内容并生成服务报告
    ///
    /// 缺失的提交值按表单默认值处理；未知机器或检查项的提交条目被忽略。
    pub fn build_report(&self, catalog: &ServiceCatalog, submission: &ServiceSubmission) -> AppResult<ServiceReport> {
        Self::ensure_configured(catalog)?;

        for name in submission.machines.keys() {
            if !catalog.machines.contains_key(name) {
                log::warn!("提交中的机器 '{}' 不存在，已忽略", name);
            }
        }

        let resolver = catalog.resolver();
        let mut aggregator = ReportAggregator::new();

        for (name, machine) in &catalog.machines {
            let (effective, issues) = resolver.effective_checks(machine);
            log_resolution_issues(name, &issues);

            if let Some(entries) = submission.machines.get(name) {
                for check_id in entries.keys() {
                    if !effective.iter().any(|c| &c.definition.id == check_id) {
                        log::warn!("机器 '{}' 的提交项 '{}' 不在有效检查项中，已忽略", name, check_id);
                    }
                }
            }

            let mut results = Vec::with_capacity(effective.len());
            for check in &effective {
                let entry = submission.entry(name, &check.definition.id);
                let value = entry
                    .and_then(|e| e.value)
                    .unwrap_or_else(|| SubmittedValue::default_for(check.definition.kind));
                let note = entry.map(|e| e.note.as_str()).unwrap_or("");

                let result = self
                    .evaluator
                    .evaluate(&check.definition, &check.limits, value, note)
                    .map_err(|e| match e {
                        AppError::ValidationError { message } => {
                            AppError::validation_error(format!("机器 '{}': {}", name, message))
                        }
                        other => other,
                    })?;
                results.push(result);
            }

            aggregator.add_machine(name, results);
        }

        let report = aggregator.finish(submission.header.clone());
        log::info!(
            "服务报告已生成: {} 台机器, FAIL {} / WARNING {} / PASS {}",
            report.machines.len(),
            report.count_with_status(crate::models::CheckStatus::Fail),
            report.count_with_status(crate::models::CheckStatus::Warning),
            report.count_with_status(crate::models::CheckStatus::Pass)
        );
        Ok(report)
    }
}

/// 终端摘要：每台机器一行结论，其下逐项列出检查结论
pub fn summary_text(report: &ServiceReport) -> String {
    let mut out = String::new();

    for (label, value) in report.header.fields() {
        let _ = writeln!(out, "{}: {}", label, value);
    }
    let _ = writeln!(out);

    if report.machines.is_empty() {
        let _ = writeln!(out, "No machines with checks to display.");
    }

    for entry in &report.machines {
        let _ = writeln!(out, "{} {} - {}", entry.status.marker(), entry.machine, entry.status);
        for result in &entry.results {
            let _ = write!(out, "    {} {}", result.status().marker(), result.title);
            let details = result.details();
            if !details.is_empty() {
                let _ = write!(out, "  {}", details);
                if let Some(unit) = result.unit.as_deref().filter(|u| !u.is_empty()) {
                    let _ = write!(out, " {}", unit);
                }
            }
            if !result.note.is_empty() {
                let _ = write!(out, "  ({})", result.note);
            }
            let _ = writeln!(out);
        }
    }

    if !report.unconfigured_machines.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Not configured: {}", report.unconfigured_machines.join(", "));
    }

    if let Some(overall) = report.overall_status() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Overall: {}", overall);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::CheckStatus;
    use crate::models::structs::{CheckLimits, Machine};
    use crate::services::domain::{CheckDraft, TemplateEntry};

    fn catalog() -> ServiceCatalog {
        let mut catalog = ServiceCatalog::default();
        catalog.add_check(CheckDraft::numeric("Oil Level", "%", 0.0, 100.0)).unwrap();
        catalog.add_check(CheckDraft::boolean("Guard Fitted")).unwrap();
        catalog
            .save_template(
                "Daily",
                vec![
                    TemplateEntry::with_limits("oil_level", CheckLimits::new(20.0, 80.0)),
                    TemplateEntry::new("guard_fitted"),
                ],
            )
            .unwrap();
        catalog.save_machine("Press 1", Machine::with_templates(["Daily"])).unwrap();
        catalog.save_machine("Spare", Machine::default()).unwrap();
        catalog
    }

    #[test]
    fn test_blank_submission_uses_form_defaults() {
        let service = InspectionService::default();
        let submission = service.blank_submission(&catalog(), ReportHeader::default());

        assert_eq!(submission.machines.len(), 1);
        assert_eq!(
            submission.entry("Press 1", "oil_level").unwrap().value,
            Some(SubmittedValue::Numeric(0.0))
        );
        assert_eq!(
            submission.entry("Press 1", "guard_fitted").unwrap().value,
            Some(SubmittedValue::Boolean(false))
        );
    }

    #[test]
    fn test_build_report() {
        let service = InspectionService::default();
        let mut submission = ServiceSubmission::default();
        submission.set("Press 1", "oil_level", CheckSubmission::numeric(50.0).with_note("topped up"));
        submission.set("Press 1", "guard_fitted", CheckSubmission::boolean(true));
        submission.set("Ghost", "oil_level", CheckSubmission::numeric(1.0));

        let report = service.build_report(&catalog(), &submission).unwrap();
        assert_eq!(report.machines.len(), 1);
        assert_eq!(report.unconfigured_machines, vec!["Spare".to_string()]);

        let press = report.machine("Press 1").unwrap();
        assert_eq!(press.status, CheckStatus::Pass);
        assert_eq!(press.results[0].check_id, "oil_level");
        assert_eq!(press.results[0].note, "topped up");
        assert_eq!(press.results[0].min, Some(20.0));
    }

    /// 缺失的提交值按默认值评估：数值0低于下限，布尔未确认
    #[test]
    fn test_missing_values_take_form_defaults() {
        let service = InspectionService::default();
        let report = service.build_report(&catalog(), &ServiceSubmission::default()).unwrap();

        let press = report.machine("Press 1").unwrap();
        assert_eq!(press.status, CheckStatus::Fail);
        assert!(press.results.iter().all(|r| !r.passed));
    }

    #[test]
    fn test_empty_stores_are_rejected() {
        let service = InspectionService::default();
        let mut catalog = catalog();
        catalog.machines.clear();

        let err = service.build_report(&catalog, &ServiceSubmission::default()).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(service.build_report(&ServiceCatalog::default(), &ServiceSubmission::default()).is_err());
    }

    #[test]
    fn test_type_mismatch_aborts_report() {
        let service = InspectionService::default();
        let mut submission = ServiceSubmission::default();
        submission.set("Press 1", "guard_fitted", CheckSubmission::numeric(1.0));

        let err = service.build_report(&catalog(), &submission).unwrap_err();
        assert!(err.to_string().contains("Press 1"));
    }

    #[test]
    fn test_summary_text() {
        let service = InspectionService::default();
        let mut submission = ServiceSubmission::default();
        submission.set("Press 1", "oil_level", CheckSubmission::numeric(78.0));
        submission.set("Press 1", "guard_fitted", CheckSubmission::boolean(true));

        let report = service.build_report(&catalog(), &submission).unwrap();
        let text = summary_text(&report);

        assert!(text.contains("[WARN] Press 1 - WARNING"));
        assert!(text.contains("[WARN] Oil Level  78 (min 20/max 80) %"));
        assert!(text.contains("[ OK ] Guard Fitted"));
        assert!(text.contains("Not configured: Spare"));
        assert!(text.contains("Overall: WARNING"));
    }
}
