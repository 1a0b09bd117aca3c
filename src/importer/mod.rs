// ==========================================
// 废料分析系统 - 导入层
// ==========================================
// 职责: 外部数据读取 + 规范化为 ScrapRecord
// 支持: Excel, CSV, SQLite, 内存行
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod error;
pub mod file_parser;
pub mod importer_trait;
pub mod normalizer;
pub mod sqlite_source;

// 重导出核心类型
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use error::{SchemaError, SchemaResult, ValidationError};
pub use file_parser::{open_source, CsvRecordSource, ExcelRecordSource};
pub use normalizer::{NormalizeOutcome, NormalizerOptions, RecordNormalizer};
pub use sqlite_source::SqliteRecordSource;

// 重导出 Trait 接口
pub use importer_trait::{DataCleaner, RecordSource};
