/// 检查项评估器
///
/// 将单个检查项的提交值与有效限值比较，得出 合格 / 警告 / 不合格。

use crate::models::enums::CheckKind;
use crate::models::structs::{CheckDefinition, CheckLimits, EvaluationResult, SubmittedValue};
use crate::utils::error::{AppError, AppResult};

/// 警告带宽度：上下限各向内收缩量程的 10%
pub const WARNING_PERCENT: f64 = 0.10;

/// 数值型检查项的判定结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericVerdict {
    pub passed: bool,
    pub warning: bool,
    pub warn_low: f64,
    pub warn_high: f64,
}

/// 按上下限判定数值
///
/// 量程为零（min == max）时警告带退化为上下限本身，
/// 唯一合格的值同时也是警告。
pub fn numeric_verdict(min: f64, max: f64, value: f64) -> NumericVerdict {
    let passed = min <= value && value <= max;
    let span = max - min;
    let warn_low = min + span * WARNING_PERCENT;
    let warn_high = max - span * WARNING_PERCENT;
    let warning = passed && (value <= warn_low || value >= warn_high);

    NumericVerdict { passed, warning, warn_low, warn_high }
}

/// 检查项评估器接口
pub trait ICheckEvaluator: Send + Sync {
    /// 评估单个检查项
    ///
    /// `limits` 为解析后的有效限值，缺失的上下限回退到检查项定义。
    fn evaluate(
        &self,
        definition: &CheckDefinition,
        limits: &CheckLimits,
        value: SubmittedValue,
        note: &str,
    ) -> AppResult<EvaluationResult>;
}

/// 默认评估器实现
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCheckEvaluator;

impl ICheckEvaluator for DefaultCheckEvaluator {
    fn evaluate(
        &self,
        definition: &CheckDefinition,
        limits: &CheckLimits,
        value: SubmittedValue,
        note: &str,
    ) -> AppResult<EvaluationResult> {
        let mut result = EvaluationResult {
            check_id: definition.id.clone(),
            title: definition.title.clone(),
            kind: definition.kind,
            passed: false,
            warning: false,
            value,
            min: None,
            max: None,
            unit: None,
            note: note.to_string(),
        };

        match (definition.kind, value) {
            (CheckKind::Boolean, SubmittedValue::Boolean(confirmed)) => {
                result.passed = confirmed;
            }
            (CheckKind::Numeric, SubmittedValue::Numeric(measured)) => {
                let effective = limits.or(definition.default_limits());
                let (Some(min), Some(max)) = (effective.min, effective.max) else {
                    return Err(AppError::validation_error(format!(
                        "检查项 '{}' 缺少有效的上下限",
                        definition.id
                    )));
                };
                if min > max {
                    return Err(AppError::validation_error(format!(
                        "检查项 '{}' 的有效下限 {} 大于上限 {}",
                        definition.id, min, max
                    )));
                }

                let verdict = numeric_verdict(min, max, measured);
                result.passed = verdict.passed;
                result.warning = verdict.warning;
                result.min = Some(min);
                result.max = Some(max);
                result.unit = definition.unit.clone();
            }
            (kind, value) => {
                return Err(AppError::validation_error(format!(
                    "检查项 '{}' 为{}型，提交值 {} 类型不匹配",
                    definition.id, kind, value
                )));
            }
        }

        Ok(result)
    }
}
