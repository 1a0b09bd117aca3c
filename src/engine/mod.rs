// ==========================================
// 废料分析系统 - 引擎层
// ==========================================
// 职责: 汇总 / 筛选 / 预测 / 分级 / 对比 / 排名 / KPI
// 红线: 引擎无状态,不做 I/O,随机源由调用方注入
// ==========================================

pub mod aggregator;
pub mod breakdown;
pub mod comparator;
pub mod filter;
pub mod forecaster;
pub mod kpi;
pub mod ranker;
pub mod risk;

// 重导出核心引擎
pub use aggregator::Aggregator;
pub use breakdown::{BreakdownEngine, DEFAULT_MIN_SHARE, OTHER_CAUSE};
pub use comparator::{delta, previous_period};
pub use filter::{
    filter_by_cause, filter_by_date_range, filter_by_machine, filter_by_operator,
    filter_by_shift, filter_records, ScrapFilter,
};
pub use forecaster::{
    forecast_with_seed, future_dates, ForecastParams, TrendForecaster, MAX_HORIZON_DAYS,
    MAX_SIMULATIONS, MIN_SIMULATIONS,
};
pub use kpi::KpiEngine;
pub use ranker::top_n;
pub use risk::{classify, RiskClassifier, RiskThresholds, DEFAULT_RISK_ROW_LIMIT};
