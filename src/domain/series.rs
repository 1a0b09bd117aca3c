// ==========================================
// 废料分析系统 - 时间序列与分组汇总
// ==========================================
// DailySeries: 按日期升序的 (日期, 汇总数量),不补零
// GroupAggregate: 按汇总量降序的 (键, 汇总数量),并列时保持首次出现顺序
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// DailySeries - 日序列
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    points: Vec<DailyPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub quantity: f64,
}

impl DailySeries {
    /// 由已排序、日期唯一的点构造 (由聚合器保证)
    pub(crate) fn from_sorted(points: Vec<DailyPoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        Self { points }
    }

    pub fn points(&self) -> &[DailyPoint] {
        &self.points
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.quantity).collect()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 日均 (仅统计有记录的日期)
    pub fn mean(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points.iter().map(|p| p.quantity).sum::<f64>() / self.points.len() as f64
    }
}

// ==========================================
// GroupAggregate - 分组汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupAggregate {
    entries: Vec<GroupEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub key: String,
    pub quantity: f64,
}

impl GroupAggregate {
    /// 由首次出现顺序的条目构造,内部做稳定降序排序
    pub(crate) fn from_first_seen(mut entries: Vec<GroupEntry>) -> Self {
        // sort_by 为稳定排序,并列键保持首次出现顺序
        entries.sort_by(|a, b| b.quantity.total_cmp(&a.quantity));
        Self { entries }
    }

    pub fn entries(&self) -> &[GroupEntry] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.quantity)
    }

    /// 汇总量最大的条目
    pub fn top(&self) -> Option<&GroupEntry> {
        self.entries.first()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.quantity).sum()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_aggregate_stable_tie_break() {
        let agg = GroupAggregate::from_first_seen(vec![
            GroupEntry { key: "B".to_string(), quantity: 10.0 },
            GroupEntry { key: "A".to_string(), quantity: 20.0 },
            GroupEntry { key: "C".to_string(), quantity: 10.0 },
        ]);

        assert_eq!(agg.keys(), vec!["A", "B", "C"]);
        assert_eq!(agg.get("C"), Some(10.0));
        assert_eq!(agg.get("Z"), None);
        assert_eq!(agg.total(), 40.0);
        assert_eq!(agg.top().map(|e| e.key.as_str()), Some("A"));
    }

    #[test]
    fn test_daily_series_mean() {
        let d1 = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 10, 3).unwrap();
        let series = DailySeries::from_sorted(vec![
            DailyPoint { date: d1, quantity: 10.0 },
            DailyPoint { date: d2, quantity: 30.0 },
        ]);
        assert_eq!(series.mean(), 20.0);
        assert_eq!(series.last_date(), Some(d2));
        assert_eq!(DailySeries::default().mean(), 0.0);
    }
}
