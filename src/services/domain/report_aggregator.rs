/// 报告汇总器
///
/// 将单台机器的检查项评估结果合并为机器结论（FAIL > WARNING > PASS），
/// 并收集未配置任何检查项的机器。

use chrono::Utc;

use crate::models::enums::CheckStatus;
use crate::models::structs::{EvaluationResult, MachineReportEntry, ReportHeader, ServiceReport};

/// 汇总单台机器的评估结果
///
/// 没有任何结果时结论为 PASS；调用方应先排除未配置的机器。
pub fn aggregate(machine_name: &str, results: Vec<EvaluationResult>) -> MachineReportEntry {
    let status = results
        .iter()
        .map(EvaluationResult::status)
        .max()
        .unwrap_or(CheckStatus::Pass);

    MachineReportEntry {
        machine: machine_name.to_string(),
        status,
        results,
    }
}

/// 逐台机器构建服务报告
#[derive(Debug, Default)]
pub struct ReportAggregator {
    entries: Vec<MachineReportEntry>,
    unconfigured: Vec<String>,
}

impl ReportAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一台机器；没有结果的机器记为未配置，不出现在报告行中
    pub fn add_machine(&mut self, machine_name: &str, results: Vec<EvaluationResult>) {
        if results.is_empty() {
            crate::log_config_warning!("机器 '{}' 未解析出任何检查项，已从报告中排除", machine_name);
            self.unconfigured.push(machine_name.to_string());
            return;
        }
        self.entries.push(aggregate(machine_name, results));
    }

    pub fn finish(self, header: ReportHeader) -> ServiceReport {
        ServiceReport {
            header,
            generated_at: Utc::now(),
            machines: self.entries,
            unconfigured_machines: self.unconfigured,
        }
    }
}
