// ==========================================
// 废料分析系统 - 周期 KPI
// ==========================================
// 输入: 已筛选的单周期记录
// 输出: KpiSummary (空输入 → 零值 / None)
// ==========================================

use crate::domain::record::ScrapRecord;
use crate::domain::report::KpiSummary;
use crate::engine::aggregator::Aggregator;

pub struct KpiEngine {
    aggregator: Aggregator,
}

impl KpiEngine {
    pub fn new() -> Self {
        Self {
            aggregator: Aggregator::new(),
        }
    }

    /// 计算周期 KPI
    ///
    /// - 废料率 = 废料总量 / 总产量 × 100 (总产量 > 0 时)
    /// - 成品量 = 总产量 - 废料总量 (存在产量数据时)
    pub fn compute_kpis(&self, records: &[ScrapRecord]) -> KpiSummary {
        if records.is_empty() {
            return KpiSummary::default();
        }

        let total_scrap: f64 = records.iter().map(|r| r.quantity).sum();
        let daily = self.aggregator.daily_series(records);

        let produced: Vec<f64> = records.iter().filter_map(|r| r.produced_total).collect();
        let total_produced = if produced.is_empty() {
            None
        } else {
            Some(produced.iter().sum::<f64>())
        };

        let scrap_rate = total_produced
            .filter(|p| *p > 0.0)
            .map(|p| total_scrap / p * 100.0);

        let by_machine = self.aggregator.by_machine(records);
        let top_machine = by_machine.top();

        KpiSummary {
            total_scrap,
            entries: records.len(),
            avg_per_day: daily.mean(),
            top_cause: self
                .aggregator
                .by_cause(records)
                .top()
                .map(|e| e.key.clone()),
            scrap_rate,
            total_produced,
            finished_qty: total_produced.map(|p| p - total_scrap),
            top_machine: top_machine.map(|e| e.key.clone()),
            top_machine_qty: top_machine.map(|e| e.quantity),
        }
    }
}

impl Default for KpiEngine {
    fn default() -> Self {
        Self::new()
    }
}
