// ==========================================
// 废料分析系统 - SQLite 数据源
// ==========================================
// 职责: 读取 scrap_logs 表 (容忍列缺失)
// 说明:
// - 表不存在视为"无数据",返回空集合
// - NULL 单元格读为空串 (列存在但值缺失)
// ==========================================

use crate::db::open_sqlite_readonly;
use crate::domain::record::RawRow;
use crate::importer::error::{SchemaError, SchemaResult};
use crate::importer::importer_trait::RecordSource;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// 默认表名
pub const DEFAULT_TABLE: &str = "scrap_logs";

pub struct SqliteRecordSource {
    db_path: PathBuf,
    table: String,
}

impl SqliteRecordSource {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            table: DEFAULT_TABLE.to_string(),
        }
    }

    /// 指定表名 (仅允许字母/数字/下划线)
    pub fn with_table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    fn validate_table_name(&self) -> SchemaResult<()> {
        let ok = !self.table.is_empty()
            && self
                .table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if ok {
            Ok(())
        } else {
            Err(SchemaError::DatabaseError(format!(
                "非法表名: {}",
                self.table
            )))
        }
    }

    /// 读取表的列名 (PRAGMA table_info)
    pub fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(columns)
    }

    fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
        let exists = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1 LIMIT 1",
                [table],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(exists)
    }
}

fn value_to_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).trim().to_string(),
        ValueRef::Blob(_) => String::new(),
    }
}

impl RecordSource for SqliteRecordSource {
    fn read_rows(&self) -> SchemaResult<Vec<RawRow>> {
        self.validate_table_name()?;

        if !self.db_path.exists() {
            return Err(SchemaError::FileNotFound(self.db_path.display().to_string()));
        }

        let conn = open_sqlite_readonly(&self.db_path)?;

        if !Self::table_exists(&conn, &self.table)? {
            tracing::warn!(table = %self.table, "数据表不存在,按无数据处理");
            return Ok(Vec::new());
        }

        let columns: Vec<String> = Self::table_columns(&conn, &self.table)?
            .into_iter()
            .map(|c| c.trim().to_lowercase())
            .collect();

        let mut stmt = conn.prepare(&format!("SELECT * FROM {}", self.table))?;
        let mut rows_iter = stmt.query([])?;

        let mut rows = Vec::new();
        while let Some(row) = rows_iter.next()? {
            let mut row_map = RawRow::new();
            for (idx, name) in columns.iter().enumerate() {
                let value = value_to_text(row.get_ref(idx)?);
                row_map.insert(name.clone(), value);
            }
            rows.push(row_map);
        }

        tracing::debug!(table = %self.table, columns = ?columns, rows = rows.len(), "读取 SQLite 数据");
        Ok(rows)
    }

    fn describe(&self) -> String {
        format!("sqlite({}:{})", self.db_path.display(), self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn seed_db(sql: &str) -> NamedTempFile {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = Connection::open(temp_file.path()).unwrap();
        conn.execute_batch(sql).unwrap();
        temp_file
    }

    #[test]
    fn test_reads_legacy_schema() {
        let db = seed_db(
            r#"
            CREATE TABLE scrap_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                machine TEXT NOT NULL,
                scrap_weight REAL NOT NULL,
                reason TEXT
            );
            INSERT INTO scrap_logs (date, machine, scrap_weight, reason)
            VALUES ('2025-09-30', 'Press A', 120.5, 'Misalignment'),
                   ('2025-10-01', 'Press B', 95.2, NULL);
            "#,
        );

        let rows = SqliteRecordSource::new(db.path()).read_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("scrap_weight"), Some(&"120.5".to_string()));
        assert_eq!(rows[1].get("reason"), Some(&String::new()));
        assert!(rows[0].get("quantity").is_none());
    }

    #[test]
    fn test_missing_table_is_empty() {
        let db = seed_db("CREATE TABLE other (x INTEGER);");
        let rows = SqliteRecordSource::new(db.path()).read_rows().unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_missing_file_is_schema_error() {
        let result = SqliteRecordSource::new("/definitely/not/here.db").read_rows();
        assert!(matches!(result, Err(SchemaError::FileNotFound(_))));
    }

    #[test]
    fn test_rejects_bad_table_name() {
        let db = seed_db("CREATE TABLE scrap_logs (date TEXT);");
        let result = SqliteRecordSource::new(db.path())
            .with_table("scrap_logs; DROP TABLE x")
            .read_rows();
        assert!(matches!(result, Err(SchemaError::DatabaseError(_))));
    }
}
