// ==========================================
// 废料分析系统 - API 层
// ==========================================
// 职责: 面向看板 / 报表的组合接口
// ==========================================

pub mod error;
pub mod import_api;
pub mod predictions_api;
pub mod report_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, LoadResponse};
pub use predictions_api::{PredictionsApi, PredictionsQuery, PredictionsView, FALLBACK_UNIT};
pub use report_api::{ReportApi, ReportQuery, ReportSummary};
