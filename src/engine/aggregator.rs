// ==========================================
// 废料分析系统 - 聚合器
// ==========================================
// 职责: 按日期 / 任意分类键汇总废料数量
// 输入: ScrapRecord 列表
// 输出: DailySeries / GroupAggregate
// ==========================================
// 红线: 纯函数,每次调用返回新集合
// ==========================================

use crate::domain::record::ScrapRecord;
use crate::domain::series::{DailyPoint, DailySeries, GroupAggregate, GroupEntry};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// 按键汇总,保持首次出现顺序后做稳定降序排序
///
/// key_fn 返回 None 的记录不参与汇总
pub(crate) fn sum_by_key<K, F>(records: &[ScrapRecord], key_fn: F) -> Vec<(K, f64)>
where
    K: Eq + Hash + Clone,
    F: Fn(&ScrapRecord) -> Option<K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut sums: Vec<(K, f64)> = Vec::new();

    for record in records {
        let Some(key) = key_fn(record) else {
            continue;
        };
        match index.get(&key) {
            Some(&pos) => sums[pos].1 += record.quantity,
            None => {
                index.insert(key.clone(), sums.len());
                sums.push((key, record.quantity));
            }
        }
    }

    sums.sort_by(|a, b| b.1.total_cmp(&a.1));
    sums
}

/// 空白文本视为无键
fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ==========================================
// Aggregator - 聚合器
// ==========================================
pub struct Aggregator;

impl Aggregator {
    pub fn new() -> Self {
        Self
    }

    /// 按日期汇总,日期升序; 无记录的日期不补零
    pub fn daily_series(&self, records: &[ScrapRecord]) -> DailySeries {
        let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for record in records {
            *by_date.entry(record.date).or_insert(0.0) += record.quantity;
        }

        let points = by_date
            .into_iter()
            .map(|(date, quantity)| DailyPoint { date, quantity })
            .collect();

        DailySeries::from_sorted(points)
    }

    /// 按任意键汇总,降序; 并列按首次出现顺序
    pub fn group_sum<F>(&self, records: &[ScrapRecord], key_fn: F) -> GroupAggregate
    where
        F: Fn(&ScrapRecord) -> Option<String>,
    {
        let entries = sum_by_key(records, key_fn)
            .into_iter()
            .map(|(key, quantity)| GroupEntry { key, quantity })
            .collect();

        GroupAggregate::from_first_seen(entries)
    }

    // ==========================================
    // 常用分组
    // ==========================================

    /// 按原因 (空原因不参与)
    pub fn by_cause(&self, records: &[ScrapRecord]) -> GroupAggregate {
        self.group_sum(records, |r| r.cause.as_deref().and_then(non_blank))
    }

    pub fn by_machine(&self, records: &[ScrapRecord]) -> GroupAggregate {
        self.group_sum(records, |r| Some(r.machine.clone()))
    }

    /// 按操作员 (空操作员不参与)
    pub fn by_operator(&self, records: &[ScrapRecord]) -> GroupAggregate {
        self.group_sum(records, |r| non_blank(&r.operator))
    }

    pub fn by_shift(&self, records: &[ScrapRecord]) -> GroupAggregate {
        self.group_sum(records, |r| Some(r.shift.clone()))
    }

    /// 按 (机台, 班次) 组合汇总,降序
    pub fn by_machine_shift(&self, records: &[ScrapRecord]) -> Vec<((String, String), f64)> {
        sum_by_key(records, |r| Some((r.machine.clone(), r.shift.clone())))
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, day).unwrap()
    }

    fn sample() -> Vec<ScrapRecord> {
        vec![
            ScrapRecord::new(d(1), 100.0, "A", "A").with_cause("Overheat"),
            ScrapRecord::new(d(1), 50.0, "B", "B"),
            ScrapRecord::new(d(2), 80.0, "A", "A").with_cause("Misalignment"),
        ]
    }

    #[test]
    fn test_daily_series_scenario() {
        let series = Aggregator::new().daily_series(&sample());
        assert_eq!(series.dates(), vec![d(1), d(2)]);
        assert_eq!(series.values(), vec![150.0, 80.0]);
    }

    #[test]
    fn test_daily_series_unsorted_input_with_gaps() {
        let records = vec![
            ScrapRecord::new(d(9), 1.0, "A", "A"),
            ScrapRecord::new(d(3), 2.0, "A", "A"),
            ScrapRecord::new(d(9), 4.0, "A", "A"),
        ];
        let series = Aggregator::new().daily_series(&records);
        assert_eq!(series.dates(), vec![d(3), d(9)]);
        assert_eq!(series.values(), vec![2.0, 5.0]);
    }

    #[test]
    fn test_daily_series_empty() {
        assert!(Aggregator::new().daily_series(&[]).is_empty());
    }

    #[test]
    fn test_group_sum_by_machine_scenario() {
        let agg = Aggregator::new().by_machine(&sample());
        assert_eq!(agg.keys(), vec!["A", "B"]);
        assert_eq!(agg.get("A"), Some(180.0));
        assert_eq!(agg.get("B"), Some(50.0));
    }

    #[test]
    fn test_by_cause_excludes_blank() {
        let agg = Aggregator::new().by_cause(&sample());
        assert_eq!(agg.keys(), vec!["Overheat", "Misalignment"]);
        assert_eq!(agg.total(), 180.0);
    }

    #[test]
    fn test_group_sum_tie_keeps_first_seen() {
        let records = vec![
            ScrapRecord::new(d(1), 10.0, "Z", "A"),
            ScrapRecord::new(d(1), 10.0, "Y", "A"),
            ScrapRecord::new(d(1), 10.0, "X", "A"),
        ];
        let agg = Aggregator::new().by_machine(&records);
        assert_eq!(agg.keys(), vec!["Z", "Y", "X"]);
    }

    #[test]
    fn test_by_machine_shift() {
        let groups = Aggregator::new().by_machine_shift(&sample());
        assert_eq!(groups[0], (("A".to_string(), "A".to_string()), 180.0));
        assert_eq!(groups[1], (("B".to_string(), "B".to_string()), 50.0));
    }

    #[test]
    fn test_by_operator_skips_blank() {
        let records = vec![
            ScrapRecord::new(d(1), 10.0, "M", "A").with_operator("Kim"),
            ScrapRecord::new(d(1), 99.0, "M", "A"),
        ];
        let agg = Aggregator::new().by_operator(&records);
        assert_eq!(agg.keys(), vec!["Kim"]);
    }
}
