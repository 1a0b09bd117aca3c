// ==========================================
// 废料分析系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite / CSV / Excel
// 系统定位: 决策支持 (KPI / 环比 / 排名 / 预测 / 风险分级)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 分析算法
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 分析参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 性能统计
pub mod perf;

// API 层 - 看板 / 报表接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Arrow, DatePreset, Direction, RiskLevel};

// 领域实体
pub use domain::{
    DailySeries, DeltaResult, ForecastResult, GroupAggregate, HorizonRisk, KpiSummary, RiskRow,
    ScrapRecord, TopNEntry,
};

// 引擎
pub use engine::{
    Aggregator, BreakdownEngine, ForecastParams, KpiEngine, RiskClassifier, RiskThresholds,
    ScrapFilter, TrendForecaster,
};

// API
pub use api::{ImportApi, PredictionsApi, ReportApi};

// 配置
pub use config::{AnalyticsConfig, ConfigManager};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "废料分析系统";
