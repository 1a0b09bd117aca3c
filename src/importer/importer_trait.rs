// ==========================================
// 废料分析系统 - 导入 Trait
// ==========================================
// 职责: 定义数据源与清洗接口（不包含实现）
// ==========================================

use crate::domain::record::RawRow;
use crate::importer::error::SchemaResult;
use chrono::NaiveDate;

// ==========================================
// RecordSource Trait
// ==========================================
// 用途: 读取原始行记录（阶段 0）
// 实现者: CsvRecordSource, ExcelRecordSource, SqliteRecordSource, Vec<RawRow>
pub trait RecordSource: Send + Sync {
    /// 读取全部原始行
    ///
    /// # 返回
    /// - Ok(Vec<RawRow>): 行记录列表（列名 -> 单元格文本）
    /// - Err(SchemaError): 数据源整体不可读
    fn read_rows(&self) -> SchemaResult<Vec<RawRow>>;

    /// 数据源描述（日志用）
    fn describe(&self) -> String;
}

// 内存数据源
impl RecordSource for Vec<RawRow> {
    fn read_rows(&self) -> SchemaResult<Vec<RawRow>> {
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        format!("memory({} rows)", self.len())
    }
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 数据清洗接口（阶段 1）
// 实现者: DataCleanerImpl
pub trait DataCleaner: Send + Sync {
    /// 文本清洗（TRIM + 可选 UPPER）
    fn clean_text(&self, value: &str, uppercase: bool) -> String;

    /// NULL 标准化（空白 -> None）
    fn normalize_null(&self, value: Option<&str>) -> Option<String>;

    /// 日期解析（多格式兼容,时间部分截断）
    fn parse_date(&self, value: &str) -> Option<NaiveDate>;

    /// 数值解析（NaN/无穷视为失败）
    fn parse_number(&self, value: &str) -> Option<f64>;

    /// 班次标准化（TRIM + UPPER + 去除 "SHIFT " 前缀）
    fn normalize_shift(&self, value: Option<&str>, default_shift: &str) -> String;
}
