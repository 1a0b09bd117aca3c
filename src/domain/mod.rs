// ==========================================
// 废料分析系统 - 领域模型层
// ==========================================
// 职责: 定义记录、序列、预测结果、报表对象
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod forecast;
pub mod record;
pub mod report;
pub mod risk;
pub mod series;
pub mod types;

// 重导出核心类型
pub use forecast::{ForecastResult, LinearTrend};
pub use record::{RawRow, ScrapRecord, UNKNOWN_MACHINE};
pub use report::{CauseShare, DeltaKind, DeltaResult, KpiSummary, ShiftShare, TopNEntry, NO_DATA};
pub use risk::{HorizonRisk, RiskRow};
pub use series::{DailyPoint, DailySeries, GroupAggregate, GroupEntry};
pub use types::{Arrow, DatePreset, Direction, RiskLevel};
