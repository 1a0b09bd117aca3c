// ==========================================
// 废料分析系统 - 风险分级引擎
// ==========================================
// 职责: 数量 → 风险等级; 最新一日 (机台, 班次) 风险表; 预测期风险
// 输入: ScrapRecord 列表 / ForecastResult + 阈值
// 输出: RiskRow / HorizonRisk
// ==========================================
// 红线: 阈值来自配置,引擎本身无状态
// ==========================================

use crate::domain::forecast::ForecastResult;
use crate::domain::record::ScrapRecord;
use crate::domain::risk::{HorizonRisk, RiskRow};
use crate::domain::types::RiskLevel;
use crate::engine::aggregator::{sum_by_key, Aggregator};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 默认风险表行数
pub const DEFAULT_RISK_ROW_LIMIT: usize = 10;

/// 数量分级
///
/// ≥ high → High; ≥ low → Medium; 其余 Low (含 NaN)
pub fn classify(quantity: f64, low: f64, high: f64) -> RiskLevel {
    if quantity >= high {
        RiskLevel::High
    } else if quantity >= low {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

// ==========================================
// RiskThresholds - 风险阈值
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub low: f64,
    pub high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low: 2500.0,
            high: 4000.0,
        }
    }
}

impl RiskThresholds {
    pub fn classify(&self, quantity: f64) -> RiskLevel {
        classify(quantity, self.low, self.high)
    }
}

// ==========================================
// RiskClassifier - 风险分级引擎
// ==========================================
pub struct RiskClassifier {
    thresholds: RiskThresholds,
}

impl RiskClassifier {
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> RiskThresholds {
        self.thresholds
    }

    /// 最新一日的 (机台, 班次) 风险表
    ///
    /// # 参数
    /// - `records`: 已筛选记录
    /// - `limit`: 最多返回行数
    ///
    /// # 返回
    /// 按数量降序、排名从 1 开始的风险行; 无记录时为空
    pub fn build_risk_rows(&self, records: &[ScrapRecord], limit: usize) -> Vec<RiskRow> {
        let Some(latest) = records.iter().map(|r| r.date).max() else {
            return Vec::new();
        };

        let day: Vec<ScrapRecord> = records
            .iter()
            .filter(|r| r.date == latest)
            .cloned()
            .collect();

        let groups = Aggregator::new().by_machine_shift(&day);

        let rows: Vec<RiskRow> = groups
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(idx, ((machine, shift), quantity))| {
                let top_cause = dominant_cause(&day, &machine, &shift);
                RiskRow {
                    rank: idx + 1,
                    risk_level: self.thresholds.classify(quantity),
                    machine,
                    shift,
                    quantity,
                    top_cause,
                }
            })
            .collect();

        tracing::debug!(date = %latest, rows = rows.len(), "风险表生成完成");
        rows
    }

    /// 预测期逐日风险 (点预测 + 区间上界)
    ///
    /// dates 与预测长度不一致时按较短者截断
    pub fn classify_horizon(
        &self,
        forecast: &ForecastResult,
        dates: &[NaiveDate],
    ) -> Vec<HorizonRisk> {
        dates
            .iter()
            .zip(forecast.horizon_fit.iter().zip(&forecast.horizon_upper))
            .map(|(&date, (&predicted, &upper))| HorizonRisk {
                date,
                predicted,
                upper,
                risk_level: self.thresholds.classify(predicted),
                worst_case_level: self.thresholds.classify(upper),
            })
            .collect()
    }
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self::new(RiskThresholds::default())
    }
}

/// 组内数量最大的原因
fn dominant_cause(day: &[ScrapRecord], machine: &str, shift: &str) -> Option<String> {
    sum_by_key(day, |r| {
        if r.machine != machine || r.shift != shift {
            return None;
        }
        r.cause
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    })
    .into_iter()
    .next()
    .map(|(cause, _)| cause)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, day).unwrap()
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(4000.0, 2500.0, 4000.0), RiskLevel::High);
        assert_eq!(classify(2500.0, 2500.0, 4000.0), RiskLevel::Medium);
        assert_eq!(classify(2499.0, 2500.0, 4000.0), RiskLevel::Low);
        assert_eq!(classify(f64::NAN, 2500.0, 4000.0), RiskLevel::Low);
    }

    #[test]
    fn test_risk_rows_latest_day_only() {
        let records = vec![
            ScrapRecord::new(d(1), 9000.0, "Old", "A"),
            ScrapRecord::new(d(2), 3000.0, "M1", "A").with_cause("Overheat"),
            ScrapRecord::new(d(2), 1500.0, "M1", "A").with_cause("Tooling"),
            ScrapRecord::new(d(2), 200.0, "M2", "B"),
        ];
        let rows = RiskClassifier::default().build_risk_rows(&records, 10);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].key(), "M1/A");
        assert_eq!(rows[0].quantity, 4500.0);
        assert_eq!(rows[0].risk_level, RiskLevel::High);
        assert_eq!(rows[0].top_cause.as_deref(), Some("Overheat"));
        assert_eq!(rows[1].risk_level, RiskLevel::Low);
        assert_eq!(rows[1].top_cause, None);
    }

    #[test]
    fn test_risk_rows_limit_and_empty() {
        let records: Vec<ScrapRecord> = (0..15)
            .map(|i| ScrapRecord::new(d(3), i as f64, &format!("M{}", i), "A"))
            .collect();
        let classifier = RiskClassifier::default();
        assert_eq!(classifier.build_risk_rows(&records, 10).len(), 10);
        assert!(classifier.build_risk_rows(&[], 10).is_empty());
    }

    #[test]
    fn test_classify_horizon() {
        let forecast = ForecastResult {
            horizon_fit: vec![2600.0, 1000.0],
            horizon_lower: vec![2000.0, 500.0],
            horizon_upper: vec![4100.0, 1200.0],
            ..ForecastResult::default()
        };
        let risks = RiskClassifier::default().classify_horizon(&forecast, &[d(4), d(5)]);
        assert_eq!(risks[0].risk_level, RiskLevel::Medium);
        assert_eq!(risks[0].worst_case_level, RiskLevel::High);
        assert_eq!(risks[1].risk_level, RiskLevel::Low);
    }
}
