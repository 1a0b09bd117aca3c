// ==========================================
// 废料分析系统 - 导入模块错误类型
// ==========================================
// SchemaError: 数据源整体不可读 (致命,上抛给调用方)
// ValidationError: 单行数据问题 (丢弃或降级,不致命)
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 数据源错误类型
#[derive(Error, Debug)]
pub enum SchemaError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv/.db/.sqlite）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 数据库错误 =====
    #[error("数据库读取失败: {0}")]
    DatabaseError(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for SchemaError {
    fn from(err: std::io::Error) -> Self {
        SchemaError::FileReadError(err.to_string())
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for SchemaError {
    fn from(err: rusqlite::Error) -> Self {
        SchemaError::DatabaseError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for SchemaError {
    fn from(err: csv::Error) -> Self {
        SchemaError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for SchemaError {
    fn from(err: calamine::Error) -> Self {
        SchemaError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type SchemaResult<T> = Result<T, SchemaError>;

/// 单行校验问题
///
/// 行号从 1 开始 (不含表头)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("日期缺失 (行 {row})，已丢弃")]
    MissingDate { row: usize },

    #[error("日期格式错误 (行 {row}): {value}，已丢弃")]
    InvalidDate { row: usize, value: String },

    #[error("数量无法解析 (行 {row}): {value}，已按 0 处理")]
    InvalidQuantity { row: usize, value: String },

    #[error("数量为负 (行 {row}): {value}，已按 0 处理")]
    NegativeQuantity { row: usize, value: f64 },

    #[error("总产量无法解析 (行 {row}): {value}，已忽略")]
    InvalidProducedTotal { row: usize, value: String },
}

impl ValidationError {
    pub fn row(&self) -> usize {
        match self {
            ValidationError::MissingDate { row }
            | ValidationError::InvalidDate { row, .. }
            | ValidationError::InvalidQuantity { row, .. }
            | ValidationError::NegativeQuantity { row, .. }
            | ValidationError::InvalidProducedTotal { row, .. } => *row,
        }
    }

    /// 该问题是否导致整行被丢弃
    pub fn drops_row(&self) -> bool {
        matches!(
            self,
            ValidationError::MissingDate { .. } | ValidationError::InvalidDate { .. }
        )
    }
}
