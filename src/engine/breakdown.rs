// ==========================================
// 废料分析系统 - 分解占比 / 要点提示
// ==========================================
// 职责:
// - 原因占比 (小占比合并为 Other)
// - 班次占比
// - 文本要点 (最高班次 / 机台 / 操作员 / 原因 / 废料率)
// ==========================================

use crate::domain::record::ScrapRecord;
use crate::domain::report::{CauseShare, KpiSummary, ShiftShare};
use crate::engine::aggregator::Aggregator;

/// 合并后的小占比原因名称
pub const OTHER_CAUSE: &str = "Other";

/// 默认合并阈值
pub const DEFAULT_MIN_SHARE: f64 = 0.05;

pub struct BreakdownEngine {
    aggregator: Aggregator,
}

impl BreakdownEngine {
    pub fn new() -> Self {
        Self {
            aggregator: Aggregator::new(),
        }
    }

    /// 原因占比
    ///
    /// # 参数
    /// - `min_share`: 低于该占比 (0~1) 的原因合并为 Other
    ///
    /// # 返回
    /// 主要原因降序在前, Other 在末尾; 总量 ≤ 0 时为空
    pub fn cause_share(&self, records: &[ScrapRecord], min_share: f64) -> Vec<CauseShare> {
        let by_cause = self.aggregator.by_cause(records);
        let total = by_cause.total();
        if total <= 0.0 {
            return Vec::new();
        }

        let mut shares = Vec::new();
        let mut other = 0.0;
        for entry in by_cause.entries() {
            let share = entry.quantity / total;
            if share >= min_share {
                shares.push(CauseShare {
                    cause: entry.key.clone(),
                    quantity: entry.quantity,
                    share,
                });
            } else {
                other += entry.quantity;
            }
        }

        if other > 0.0 {
            shares.push(CauseShare {
                cause: OTHER_CAUSE.to_string(),
                quantity: other,
                share: other / total,
            });
        }
        shares
    }

    /// 班次占比 (%), 按占比升序
    pub fn shift_share(&self, records: &[ScrapRecord]) -> Vec<ShiftShare> {
        if records.is_empty() {
            return Vec::new();
        }
        let total: f64 = records.iter().map(|r| r.quantity).sum::<f64>().max(1.0);

        let mut shares: Vec<ShiftShare> = self
            .aggregator
            .by_shift(records)
            .entries()
            .iter()
            .map(|e| ShiftShare {
                shift: e.key.clone(),
                percent: e.quantity * 100.0 / total,
            })
            .collect();

        shares.sort_by(|a, b| a.percent.total_cmp(&b.percent));
        shares
    }

    /// 文本要点
    pub fn insights(&self, records: &[ScrapRecord], kpis: &KpiSummary) -> Vec<String> {
        let mut lines = Vec::new();
        if records.is_empty() {
            return lines;
        }

        let groups = [
            ("Highest Shift", self.aggregator.by_shift(records)),
            ("Top Machine", self.aggregator.by_machine(records)),
            ("Top Operator", self.aggregator.by_operator(records)),
            ("Leading Cause", self.aggregator.by_cause(records)),
        ];
        for (label, agg) in groups {
            if let Some(top) = agg.top() {
                lines.push(format!("{}: {} ({:.0})", label, top.key, top.quantity));
            }
        }

        if let Some(rate) = kpis.scrap_rate {
            lines.push(format!("Scrap %: {:.2}%", rate));
        }
        lines
    }
}

impl Default for BreakdownEngine {
    fn default() -> Self {
        Self::new()
    }
}
