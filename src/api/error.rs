// ==========================================
// 废料分析系统 - API层错误类型
// ==========================================
// 职责: 汇总导入/配置错误,区分调用方输入错误
// ==========================================

use crate::config::ConfigError;
use crate::importer::error::SchemaError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("数据源错误: {0}")]
    Schema(#[from] SchemaError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
