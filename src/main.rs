// ==========================================
// 废料分析系统 - 命令行入口
// ==========================================
// 用法: scrap-analytics [source] [start] [end]
// - source: .db / .sqlite / .csv / .xlsx (默认: 默认数据库路径)
// - start / end: YYYY-MM-DD (默认: 最新记录日期往前 30 天)
// 输出: 预测视图 + 周期报表 (JSON, stdout)
// ==========================================

use anyhow::{bail, Context, Result};
use chrono::{Duration, Local, NaiveDate};
use scrap_analytics::api::{ImportApi, PredictionsApi, PredictionsQuery, ReportApi, ReportQuery};
use scrap_analytics::config::{AnalyticsConfig, ConfigManager};
use scrap_analytics::db::get_default_db_path;
use scrap_analytics::logging;
use serde_json::json;
use std::path::{Path, PathBuf};

/// 默认报表窗口天数
const DEFAULT_WINDOW_DAYS: i64 = 30;

fn parse_date_arg(value: &str, name: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("{} 日期格式错误 (应为 YYYY-MM-DD): {}", name, value))
}

/// SQLite 数据源同时作为配置库; 其他数据源使用默认配置
fn load_config(source: &Path) -> Result<AnalyticsConfig> {
    let is_db = matches!(
        source
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref(),
        Some("db" | "sqlite" | "sqlite3")
    );
    if !is_db || !source.exists() {
        return Ok(AnalyticsConfig::default());
    }
    let config = ConfigManager::new(source)?.load_analytics_config()?;
    Ok(config)
}

fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() > 3 {
        bail!("用法: scrap-analytics [source] [start] [end]");
    }

    let source = args
        .first()
        .map(PathBuf::from)
        .unwrap_or_else(get_default_db_path);

    tracing::info!("==================================================");
    tracing::info!("{} v{}", scrap_analytics::APP_NAME, scrap_analytics::VERSION);
    tracing::info!("数据源: {}", source.display());
    tracing::info!("==================================================");

    let config = load_config(&source)?;
    let loaded = ImportApi::new(&config)
        .load_path(&source)
        .with_context(|| format!("无法加载数据源 {}", source.display()))?;

    let today = Local::now().date_naive();
    let end = match args.get(2) {
        Some(raw) => parse_date_arg(raw, "end")?,
        None => loaded
            .records
            .iter()
            .map(|r| r.date)
            .max()
            .unwrap_or(today),
    };
    let start = match args.get(1) {
        Some(raw) => parse_date_arg(raw, "start")?,
        None => end - Duration::days(DEFAULT_WINDOW_DAYS - 1),
    };

    let view = PredictionsApi::new(config.clone())
        .build_view(&loaded.records, &PredictionsQuery::new(today))?;
    let report =
        ReportApi::new(config).build_report(&loaded.records, &ReportQuery::new(start, end))?;

    let output = json!({
        "source": loaded.source,
        "row_count": loaded.row_count,
        "record_count": loaded.records.len(),
        "dropped_rows": loaded.dropped_rows,
        "issues": loaded.issues,
        "predictions": view,
        "report": report,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
