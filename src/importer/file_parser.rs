// ==========================================
// 废料分析系统 - 文件数据源实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv) / SQLite (.db/.sqlite)
// 列名统一 TRIM + 小写
// ==========================================

use crate::domain::record::RawRow;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{SchemaError, SchemaResult};
use crate::importer::importer_trait::{DataCleaner as _, RecordSource};
use crate::importer::sqlite_source::SqliteRecordSource;
use calamine::{open_workbook_auto, Reader};
use chrono::{Duration, NaiveDate};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::{Path, PathBuf};

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

fn check_exists(path: &Path) -> SchemaResult<()> {
    if !path.exists() {
        return Err(SchemaError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

// ==========================================
// CSV 数据源
// ==========================================
pub struct CsvRecordSource {
    path: PathBuf,
}

impl CsvRecordSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl RecordSource for CsvRecordSource {
    fn read_rows(&self) -> SchemaResult<Vec<RawRow>> {
        let path = self.path.as_path();

        // 检查文件存在
        check_exists(path)?;

        // 检查扩展名 (无扩展名时放行)
        if let Some(ext) = path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(SchemaError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row_map = RawRow::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            rows.push(row_map);
        }

        Ok(rows)
    }

    fn describe(&self) -> String {
        format!("csv({})", self.path.display())
    }
}

// ==========================================
// Excel 数据源 (读取第一个工作表)
// ==========================================
pub struct ExcelRecordSource {
    path: PathBuf,
}

impl ExcelRecordSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl RecordSource for ExcelRecordSource {
    fn read_rows(&self) -> SchemaResult<Vec<RawRow>> {
        let path = self.path.as_path();
        check_exists(path)?;

        let mut workbook = open_workbook_auto(path)?;

        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| SchemaError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut sheet_rows = range.rows();
        let header_row = match sheet_rows.next() {
            Some(r) => r,
            None => return Ok(Vec::new()),
        };
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| normalize_header(&cell.to_string()))
            .collect();

        let mut rows = Vec::new();
        for data_row in sheet_rows {
            let mut row_map = RawRow::new();

            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    let mut value = cell.to_string().trim().to_string();
                    if header == "date" {
                        value = excel_date_text(value);
                    }
                    row_map.insert(header.clone(), value);
                }
            }

            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            rows.push(row_map);
        }

        Ok(rows)
    }

    fn describe(&self) -> String {
        format!("excel({})", self.path.display())
    }
}

/// 最大日期序列号 (9999-12-31)
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// 日期单元格文本: 可识别的文本日期原样保留,否则按序列号换算
fn excel_date_text(value: String) -> String {
    if DataCleaner.parse_date(&value).is_some() {
        return value;
    }
    match excel_serial_to_date(&value) {
        Some(date) => date.to_string(),
        None => value,
    }
}

/// Excel 日期序列号 -> 日期 (1900 日期系统)
fn excel_serial_to_date(value: &str) -> Option<NaiveDate> {
    let serial = value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0 && *v <= MAX_EXCEL_SERIAL)?;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

// ==========================================
// 通用数据源（根据扩展名自动选择）
// ==========================================
pub fn open_source<P: AsRef<Path>>(path: P) -> SchemaResult<Box<dyn RecordSource>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => Ok(Box::new(CsvRecordSource::new(path))),
        "xlsx" | "xls" => Ok(Box::new(ExcelRecordSource::new(path))),
        "db" | "sqlite" | "sqlite3" => Ok(Box::new(SqliteRecordSource::new(path))),
        _ => Err(SchemaError::UnsupportedFormat(ext)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_csv_source_valid_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "Date, Quantity ,machine_name").unwrap();
        writeln!(temp_file, "2025-10-01,2.5,Press A").unwrap();
        writeln!(temp_file, "2025-10-02,3.0,Press B").unwrap();

        let source = CsvRecordSource::new(temp_file.path());
        let rows = source.read_rows().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("date"), Some(&"2025-10-01".to_string()));
        assert_eq!(rows[0].get("quantity"), Some(&"2.5".to_string()));
        assert_eq!(rows[1].get("machine_name"), Some(&"Press B".to_string()));
    }

    #[test]
    fn test_csv_source_file_not_found() {
        let source = CsvRecordSource::new("non_existent.csv");
        let result = source.read_rows();
        assert!(matches!(result, Err(SchemaError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_source_skip_empty_rows() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "date,quantity").unwrap();
        writeln!(temp_file, "2025-10-01,2.5").unwrap();
        writeln!(temp_file, ",").unwrap(); // 空行
        writeln!(temp_file, "2025-10-02,3.0").unwrap();

        let source = CsvRecordSource::new(temp_file.path());
        let rows = source.read_rows().unwrap();

        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_excel_serial_to_date() {
        // 45931 = 2025-10-01
        assert_eq!(
            excel_serial_to_date("45931"),
            NaiveDate::from_ymd_opt(2025, 10, 1)
        );
        assert_eq!(excel_serial_to_date("2025-10-01"), None);
        assert_eq!(excel_serial_to_date("20251001"), None);
    }

    #[test]
    fn test_excel_date_text_keeps_text_dates() {
        // 8 位数字文本日期不能按序列号换算
        assert_eq!(excel_date_text("20251001".to_string()), "20251001");
        assert_eq!(excel_date_text("2025/10/01".to_string()), "2025/10/01");
        assert_eq!(excel_date_text("45931".to_string()), "2025-10-01");
        assert_eq!(excel_date_text("45931.75".to_string()), "2025-10-01");
        assert_eq!(excel_date_text("n/a".to_string()), "n/a");
    }

    #[test]
    fn test_open_source_dispatch() {
        assert!(open_source("data.csv").is_ok());
        assert!(open_source("data.xlsx").is_ok());
        assert!(open_source("data.db").is_ok());
        assert!(matches!(
            open_source("data.pdf"),
            Err(SchemaError::UnsupportedFormat(_))
        ));
    }
}
