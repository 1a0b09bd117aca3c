// ==========================================
// 废料分析系统 - 数据加载 API
// ==========================================
// 职责: 打开数据源 → 规范化 → 返回记录与校验问题
// ==========================================

use crate::api::error::ApiResult;
use crate::config::AnalyticsConfig;
use crate::domain::record::ScrapRecord;
use crate::importer::error::ValidationError;
use crate::importer::{open_source, RecordNormalizer, RecordSource};
use crate::perf::PerfGuard;
use serde::Serialize;
use std::path::Path;

/// 加载结果
#[derive(Debug, Clone, Serialize)]
pub struct LoadResponse {
    /// 数据源描述
    pub source: String,
    /// 原始行数
    pub row_count: usize,
    /// 有效记录
    pub records: Vec<ScrapRecord>,
    /// 被丢弃的行数
    pub dropped_rows: usize,
    /// 校验问题 (含被修正的字段)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

/// 数据加载API
pub struct ImportApi {
    normalizer: RecordNormalizer,
}

impl ImportApi {
    pub fn new(config: &AnalyticsConfig) -> Self {
        Self {
            normalizer: RecordNormalizer::new(config.normalizer_options()),
        }
    }

    /// 按扩展名打开文件数据源并加载
    ///
    /// # 参数
    /// - path: .csv / .xlsx / .xls / .db / .sqlite 路径
    ///
    /// # 返回
    /// - Ok(LoadResponse): 规范化后的记录
    /// - Err(ApiError::Schema): 数据源无法读取
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> ApiResult<LoadResponse> {
        let source = open_source(path.as_ref())?;
        self.load(source.as_ref())
    }

    /// 从任意数据源加载
    pub fn load(&self, source: &dyn RecordSource) -> ApiResult<LoadResponse> {
        let _perf = PerfGuard::new("load_records");

        let rows = source.read_rows()?;
        let outcome = self.normalizer.normalize(&rows);
        let dropped_rows = outcome.dropped_rows();

        tracing::info!(
            source = %source.describe(),
            rows = rows.len(),
            records = outcome.records.len(),
            dropped_rows,
            issues = outcome.issues.len(),
            "数据加载完成"
        );

        Ok(LoadResponse {
            source: source.describe(),
            row_count: rows.len(),
            records: outcome.records,
            dropped_rows,
            issues: outcome.issues.iter().map(ValidationError::to_string).collect(),
        })
    }
}
