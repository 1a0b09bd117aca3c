// ==========================================
// 废料分析系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少与录入端并发时的偶发 busy 错误
// ==========================================

use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SCRAP_ANALYTICS_DB_PATH";

/// 配置 SQLite 连接的统一 PRAGMA
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection<P: AsRef<Path>>(db_path: P) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 以只读方式打开 (分析引擎从不写入废料记录)
pub fn open_sqlite_readonly<P: AsRef<Path>>(db_path: P) -> rusqlite::Result<Connection> {
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(conn)
}

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 SCRAP_ANALYTICS_DB_PATH (非空时)
/// - 用户数据目录/scrap-analytics/scrap_sense.db
/// - 兜底: ./scrap_sense.db
pub fn get_default_db_path() -> PathBuf {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    match dirs::data_dir() {
        Some(data_dir) => data_dir.join("scrap-analytics").join("scrap_sense.db"),
        None => PathBuf::from("./scrap_sense.db"),
    }
}
