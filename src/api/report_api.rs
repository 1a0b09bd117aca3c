// ==========================================
// 废料分析系统 - 周期报表 API
// ==========================================
// 职责: 区间 + 班次/操作员/原因筛选 → 本期与上期 KPI、环比、Top-N、分解
// ==========================================
// 红线:
// - 上期使用同样的非日期筛选条件
// - start > end / top_n = 0 视为调用方输入错误
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::AnalyticsConfig;
use crate::domain::record::ScrapRecord;
use crate::domain::report::{DeltaResult, KpiSummary, ShiftShare, TopNEntry};
use crate::domain::series::{DailySeries, GroupEntry};
use crate::engine::{
    delta, previous_period, top_n, Aggregator, BreakdownEngine, KpiEngine, ScrapFilter,
};
use crate::perf::PerfGuard;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// 请求 / 响应
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub shift: Option<String>,
    pub operator: Option<String>,
    pub cause: Option<String>,
    /// 覆盖配置中的 Top-N 行数
    #[serde(default)]
    pub top_n: Option<usize>,
}

impl ReportQuery {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            shift: None,
            operator: None,
            cause: None,
            top_n: None,
        }
    }

    fn to_filter(&self) -> ScrapFilter {
        ScrapFilter {
            start: Some(self.start),
            end: Some(self.end),
            shift: self.shift.clone(),
            operator: self.operator.clone(),
            cause: self.cause.clone(),
            machine: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub previous_start: NaiveDate,
    pub previous_end: NaiveDate,

    pub kpis: KpiSummary,
    pub previous_kpis: KpiSummary,
    /// 废料率环比 (越低越好)
    pub scrap_rate_delta: DeltaResult,
    /// 废料总量环比
    pub total_scrap_delta: DeltaResult,

    pub top_machines: Vec<TopNEntry>,
    pub top_operators: Vec<TopNEntry>,
    pub shift_share: Vec<ShiftShare>,
    pub top_causes: Vec<GroupEntry>,
    pub top_machines_by_total: Vec<GroupEntry>,
    pub daily: DailySeries,
    pub insights: Vec<String>,

    /// 明细 (按日期升序)
    pub records: Vec<ScrapRecord>,
}

// ==========================================
// ReportApi
// ==========================================
pub struct ReportApi {
    config: AnalyticsConfig,
}

impl ReportApi {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    /// 生成周期报表
    ///
    /// # 参数
    /// - records: 全部已加载记录 (本期与上期均从中筛选)
    /// - query: 区间与筛选条件
    ///
    /// # 返回
    /// - Ok(ReportSummary)
    /// - Err(ApiError::InvalidInput): start > end 或 top_n = 0
    pub fn build_report(
        &self,
        records: &[ScrapRecord],
        query: &ReportQuery,
    ) -> ApiResult<ReportSummary> {
        let _perf = PerfGuard::new("report_build");

        if query.start > query.end {
            return Err(ApiError::InvalidInput(format!(
                "开始日期 {} 晚于结束日期 {}",
                query.start, query.end
            )));
        }
        let n = query.top_n.unwrap_or(self.config.report_top_n);
        if n == 0 {
            return Err(ApiError::InvalidInput("top_n 必须大于 0".to_string()));
        }

        let filter = query.to_filter();
        let mut current = filter.apply(records);
        current.sort_by_key(|r| r.date);

        let (previous_start, previous_end) = previous_period(query.start, query.end);
        let previous = filter.with_range(previous_start, previous_end).apply(records);

        tracing::info!(
            start = %query.start,
            end = %query.end,
            current = current.len(),
            previous = previous.len(),
            "生成周期报表"
        );

        let kpi_engine = KpiEngine::new();
        let kpis = kpi_engine.compute_kpis(&current);
        let previous_kpis = kpi_engine.compute_kpis(&previous);

        let scrap_rate_delta = delta(kpis.scrap_rate, previous_kpis.scrap_rate, true);
        let total_scrap_delta = delta(
            (!current.is_empty()).then_some(kpis.total_scrap),
            (!previous.is_empty()).then_some(previous_kpis.total_scrap),
            false,
        );

        let aggregator = Aggregator::new();
        let top_machines = top_n(
            &aggregator.by_machine(&current),
            &aggregator.by_machine(&previous),
            n,
        );
        let top_operators = top_n(
            &aggregator.by_operator(&current),
            &aggregator.by_operator(&previous),
            n,
        );

        let limit = self.config.top_causes_limit;
        let top_causes = aggregator
            .by_cause(&current)
            .entries()
            .iter()
            .take(limit)
            .cloned()
            .collect();
        let top_machines_by_total = aggregator
            .by_machine(&current)
            .entries()
            .iter()
            .take(limit)
            .cloned()
            .collect();

        let breakdown = BreakdownEngine::new();
        let shift_share = breakdown.shift_share(&current);
        let insights = breakdown.insights(&current, &kpis);
        let daily = aggregator.daily_series(&current);

        Ok(ReportSummary {
            start: query.start,
            end: query.end,
            previous_start,
            previous_end,
            kpis,
            previous_kpis,
            scrap_rate_delta,
            total_scrap_delta,
            top_machines,
            top_operators,
            shift_share,
            top_causes,
            top_machines_by_total,
            daily,
            insights,
            records: current,
        })
    }
}
