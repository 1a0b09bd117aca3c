// ==========================================
// 废料分析系统 - 预测看板 API
// ==========================================
// 职责: 机台 / 日期预设 / 班次筛选 → 日序列 + 预测 + 风险 + 原因占比
// 流程:
// 1. 筛选 (All = 不限制)
// 2. 空结果 → 空视图
// 3. 日序列 → 预测 → 预测期日期 / 风险
// 4. 最新一日 (机台, 班次) 风险表 + 原因饼图
// ==========================================

use crate::api::error::ApiResult;
use crate::config::AnalyticsConfig;
use crate::domain::forecast::ForecastResult;
use crate::domain::record::ScrapRecord;
use crate::domain::report::CauseShare;
use crate::domain::risk::{HorizonRisk, RiskRow};
use crate::domain::series::DailySeries;
use crate::domain::types::DatePreset;
use crate::engine::{
    forecast_with_seed, future_dates, Aggregator, BreakdownEngine, RiskClassifier, ScrapFilter,
};
use crate::perf::PerfGuard;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// 无单位数据时的展示单位
pub const FALLBACK_UNIT: &str = "units";

// ==========================================
// 请求 / 响应
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionsQuery {
    pub machine: Option<String>, // None / "All" = 全部机台
    pub preset: DatePreset,
    pub shift: Option<String>, // None / "All" = 全部班次
    pub today: NaiveDate,      // 日期预设基准
    #[serde(default)]
    pub seed: Option<u64>, // 预测随机种子 (None = 系统熵)
}

impl PredictionsQuery {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            machine: None,
            preset: DatePreset::All,
            shift: None,
            today,
            seed: None,
        }
    }

    fn to_filter(&self) -> ScrapFilter {
        let mut filter = ScrapFilter::new();
        if let Some((start, end)) = self.preset.resolve(self.today) {
            filter.start = Some(start);
            filter.end = end;
        }
        filter.machine = self.machine.clone();
        filter.shift = self.shift.clone();
        filter
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionsView {
    pub record_count: usize,
    pub series: DailySeries,
    pub forecast: ForecastResult,
    pub future_dates: Vec<NaiveDate>,
    pub horizon_risk: Vec<HorizonRisk>,
    pub risk_rows: Vec<RiskRow>,
    pub cause_share: Vec<CauseShare>,
    pub unit: String,
}

impl PredictionsView {
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}

// ==========================================
// PredictionsApi
// ==========================================
pub struct PredictionsApi {
    config: AnalyticsConfig,
}

impl PredictionsApi {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// 生成预测看板视图
    ///
    /// # 参数
    /// - records: 全部已加载记录
    /// - query: 筛选条件
    ///
    /// # 返回
    /// 筛选结果为空时返回空视图 (record_count = 0)
    pub fn build_view(
        &self,
        records: &[ScrapRecord],
        query: &PredictionsQuery,
    ) -> ApiResult<PredictionsView> {
        let _perf = PerfGuard::new("predictions_build_view");

        let filtered = query.to_filter().apply(records);
        tracing::info!(
            machine = ?query.machine,
            preset = %query.preset,
            shift = ?query.shift,
            total = records.len(),
            matched = filtered.len(),
            "生成预测视图"
        );

        if filtered.is_empty() {
            return Ok(PredictionsView {
                unit: FALLBACK_UNIT.to_string(),
                ..PredictionsView::default()
            });
        }

        let series = Aggregator::new().daily_series(&filtered);
        let forecast = forecast_with_seed(&series.values(), self.config.forecast, query.seed);

        let future = series
            .last_date()
            .map(|last| future_dates(last, forecast.horizon()))
            .unwrap_or_default();

        let classifier = RiskClassifier::new(self.config.risk);
        let horizon_risk = classifier.classify_horizon(&forecast, &future);
        let risk_rows = classifier.build_risk_rows(&filtered, self.config.risk_row_limit);

        let cause_share = BreakdownEngine::new().cause_share(&filtered, self.config.other_share);

        Ok(PredictionsView {
            record_count: filtered.len(),
            series,
            forecast,
            future_dates: future,
            horizon_risk,
            risk_rows,
            cause_share,
            unit: dominant_unit(&filtered),
        })
    }

    /// 机台下拉选项 ("All" + 排序去重)
    pub fn machine_options(&self, records: &[ScrapRecord]) -> Vec<String> {
        with_all(records.iter().map(|r| r.machine.clone()))
    }

    /// 班次下拉选项 ("All" + 排序去重)
    pub fn shift_options(&self, records: &[ScrapRecord]) -> Vec<String> {
        with_all(records.iter().map(|r| r.shift.to_uppercase()))
    }
}

fn with_all(values: impl Iterator<Item = String>) -> Vec<String> {
    let unique: BTreeSet<String> = values.filter(|v| !v.trim().is_empty()).collect();
    std::iter::once("All".to_string()).chain(unique).collect()
}

/// 出现次数最多的单位; 并列取字典序最小
fn dominant_unit(records: &[ScrapRecord]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        let unit = record.unit.trim();
        if !unit.is_empty() {
            *counts.entry(unit).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .max_by(|(a_unit, a_count), (b_unit, b_count)| {
            a_count.cmp(b_count).then_with(|| b_unit.cmp(a_unit))
        })
        .map(|(unit, _)| unit.to_string())
        .unwrap_or_else(|| FALLBACK_UNIT.to_string())
}
