// ==========================================
// 废料分析系统 - 记录筛选
// ==========================================
// 规则:
// - 日期区间: 闭区间
// - 班次: 查询值规范化后精确匹配
// - 操作员/原因: 不区分大小写的子串匹配
// - 机台: 精确匹配
// - "All" / 空白 = 不限制
// ==========================================

use crate::domain::record::ScrapRecord;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::importer_trait::DataCleaner as _;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 通用谓词筛选
pub fn filter_records<P>(records: &[ScrapRecord], predicate: P) -> Vec<ScrapRecord>
where
    P: Fn(&ScrapRecord) -> bool,
{
    records.iter().filter(|r| predicate(r)).cloned().collect()
}

pub fn filter_by_date_range(
    records: &[ScrapRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<ScrapRecord> {
    filter_records(records, |r| r.date >= start && r.date <= end)
}

pub fn filter_by_shift(records: &[ScrapRecord], shift: &str) -> Vec<ScrapRecord> {
    let wanted = normalize_shift_query(shift);
    filter_records(records, |r| r.shift == wanted)
}

pub fn filter_by_operator(records: &[ScrapRecord], operator: &str) -> Vec<ScrapRecord> {
    let needle = operator.trim().to_lowercase();
    filter_records(records, |r| r.operator.to_lowercase().contains(&needle))
}

pub fn filter_by_cause(records: &[ScrapRecord], cause: &str) -> Vec<ScrapRecord> {
    let needle = cause.trim().to_lowercase();
    filter_records(records, |r| {
        r.cause
            .as_deref()
            .map(|c| c.to_lowercase().contains(&needle))
            .unwrap_or(false)
    })
}

pub fn filter_by_machine(records: &[ScrapRecord], machine: &str) -> Vec<ScrapRecord> {
    let wanted = machine.trim();
    filter_records(records, |r| r.machine == wanted)
}

fn normalize_shift_query(shift: &str) -> String {
    // 查询值与记录使用同一套规范化,默认值不会被用到 (空白已被调用方排除)
    DataCleaner.normalize_shift(Some(shift), "")
}

/// 是否为"不限制"取值
fn is_unconstrained(value: &Option<String>) -> bool {
    match value.as_deref().map(str::trim) {
        None => true,
        Some(v) => v.is_empty() || v.eq_ignore_ascii_case("all"),
    }
}

// ==========================================
// ScrapFilter - 组合筛选条件
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub shift: Option<String>,
    pub operator: Option<String>,
    pub cause: Option<String>,
    pub machine: Option<String>,
}

impl ScrapFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn shift(mut self, shift: &str) -> Self {
        self.shift = Some(shift.to_string());
        self
    }

    pub fn operator(mut self, operator: &str) -> Self {
        self.operator = Some(operator.to_string());
        self
    }

    pub fn cause(mut self, cause: &str) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    pub fn machine(mut self, machine: &str) -> Self {
        self.machine = Some(machine.to_string());
        self
    }

    /// 同样的非日期条件,换一个日期区间 (环比用)
    pub fn with_range(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..self.clone()
        }
    }

    /// 依次应用所有已设置的条件
    pub fn apply(&self, records: &[ScrapRecord]) -> Vec<ScrapRecord> {
        let shift = (!is_unconstrained(&self.shift))
            .then(|| self.shift.as_deref().map(normalize_shift_query))
            .flatten();
        let operator = (!is_unconstrained(&self.operator))
            .then(|| self.operator.as_deref().map(|v| v.trim().to_lowercase()))
            .flatten();
        let cause = (!is_unconstrained(&self.cause))
            .then(|| self.cause.as_deref().map(|v| v.trim().to_lowercase()))
            .flatten();
        let machine = (!is_unconstrained(&self.machine))
            .then(|| self.machine.as_deref().map(|v| v.trim().to_string()))
            .flatten();

        filter_records(records, |r| {
            if self.start.is_some_and(|s| r.date < s) || self.end.is_some_and(|e| r.date > e) {
                return false;
            }
            if shift.as_ref().is_some_and(|s| &r.shift != s) {
                return false;
            }
            if operator
                .as_ref()
                .is_some_and(|op| !r.operator.to_lowercase().contains(op.as_str()))
            {
                return false;
            }
            if let Some(c) = &cause {
                let hit = r
                    .cause
                    .as_deref()
                    .is_some_and(|rc| rc.to_lowercase().contains(c.as_str()));
                if !hit {
                    return false;
                }
            }
            !machine.as_ref().is_some_and(|m| &r.machine != m)
        })
    }
}
