// ==========================================
// 废料分析系统 - 配置管理器
// ==========================================
// 职责: 从 config_kv 表读取全局配置并覆写默认分析参数
// 存储: config_kv 表 (scope_id + key + value)
// ==========================================
// 说明:
// - 表不存在 / 键不存在 → 使用默认值
// - 值无法解析 → 记录警告并使用默认值
// - 覆写完成后统一校验取值范围
// ==========================================

use crate::config::analytics_config::{AnalyticsConfig, ConfigError, ConfigResult};
use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

/// 全局作用域
pub const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Mutex<Connection>,
}

impl ConfigManager {
    /// 打开配置库
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new<P: AsRef<Path>>(db_path: P) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// 从已有连接创建 (会再次应用统一 PRAGMA, 幂等)
    pub fn from_connection(conn: Connection) -> ConfigResult<Self> {
        configure_sqlite_connection(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> ConfigResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    fn table_exists(conn: &Connection) -> rusqlite::Result<bool> {
        Ok(conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type='table' AND name='config_kv' LIMIT 1",
                [],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false))
    }

    /// 创建 config_kv 表 (已存在时不做任何事)
    pub fn ensure_schema(&self) -> ConfigResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS config_kv (
                scope_id TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (scope_id, key)
            );",
        )?;
        Ok(())
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 表或键不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.lock()?;
        if !Self::table_exists(&conn)? {
            return Ok(None);
        }

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 配置 (UPSERT)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3",
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    /// 全部 global 配置的快照 (JSON)
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.lock()?;
        let mut config_map: BTreeMap<String, String> = BTreeMap::new();

        if Self::table_exists(&conn)? {
            let mut stmt = conn
                .prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
            let rows = stmt.query_map([GLOBAL_SCOPE], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (key, value) = row?;
                config_map.insert(key, value);
            }
        }

        Ok(serde_json::to_string(&config_map)?)
    }

    /// 读取并解析单个键; 解析失败记录警告并回退默认值
    fn parsed_or<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr + Copy,
    {
        let Some(raw) = self.get_global_config_value(key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
                Ok(default)
            }
        }
    }

    fn text_or(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    /// 以默认参数为基础,按 config_kv 覆写后校验
    pub fn load_analytics_config(&self) -> ConfigResult<AnalyticsConfig> {
        let defaults = AnalyticsConfig::default();
        let mut config = defaults.clone();

        config.risk.low = self.parsed_or(config_keys::RISK_THRESHOLD_LOW, defaults.risk.low)?;
        config.risk.high = self.parsed_or(config_keys::RISK_THRESHOLD_HIGH, defaults.risk.high)?;

        config.forecast.horizon =
            self.parsed_or(config_keys::FORECAST_HORIZON_DAYS, defaults.forecast.horizon)?;
        config.forecast.ci_low =
            self.parsed_or(config_keys::FORECAST_CI_LOW, defaults.forecast.ci_low)?;
        config.forecast.ci_high =
            self.parsed_or(config_keys::FORECAST_CI_HIGH, defaults.forecast.ci_high)?;
        config.forecast.simulations =
            self.parsed_or(config_keys::FORECAST_SIMULATIONS, defaults.forecast.simulations)?;

        config.report_top_n = self.parsed_or(config_keys::REPORT_TOP_N, defaults.report_top_n)?;
        config.risk_row_limit =
            self.parsed_or(config_keys::RISK_ROW_LIMIT, defaults.risk_row_limit)?;
        config.top_causes_limit =
            self.parsed_or(config_keys::TOP_CAUSES_LIMIT, defaults.top_causes_limit)?;
        config.other_share = self.parsed_or(config_keys::OTHER_SHARE, defaults.other_share)?;

        config.default_shift = self.text_or(config_keys::DEFAULT_SHIFT, &defaults.default_shift)?;
        config.default_unit = self.text_or(config_keys::DEFAULT_UNIT, &defaults.default_unit)?;

        config.validate()?;
        tracing::debug!(?config, "分析配置已从 config_kv 加载");
        Ok(config)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 风险阈值
    pub const RISK_THRESHOLD_LOW: &str = "risk_threshold_low";
    pub const RISK_THRESHOLD_HIGH: &str = "risk_threshold_high";

    // 预测
    pub const FORECAST_HORIZON_DAYS: &str = "forecast_horizon_days";
    pub const FORECAST_CI_LOW: &str = "forecast_ci_low";
    pub const FORECAST_CI_HIGH: &str = "forecast_ci_high";
    pub const FORECAST_SIMULATIONS: &str = "forecast_simulations";

    // 报表
    pub const REPORT_TOP_N: &str = "report_top_n";
    pub const RISK_ROW_LIMIT: &str = "risk_row_limit";
    pub const TOP_CAUSES_LIMIT: &str = "top_causes_limit";
    pub const OTHER_SHARE: &str = "cause_other_share";

    // 规范化默认值
    pub const DEFAULT_SHIFT: &str = "default_shift";
    pub const DEFAULT_UNIT: &str = "default_unit";
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn manager() -> (NamedTempFile, ConfigManager) {
        let temp_file = NamedTempFile::new().unwrap();
        let manager = ConfigManager::new(temp_file.path()).unwrap();
        (temp_file, manager)
    }

    #[test]
    fn test_missing_table_uses_defaults() {
        let (_file, manager) = manager();
        assert_eq!(manager.get_global_config_value("x").unwrap(), None);
        assert_eq!(
            manager.load_analytics_config().unwrap(),
            AnalyticsConfig::default()
        );
        assert_eq!(manager.get_config_snapshot().unwrap(), "{}");
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let (_file, manager) = manager();
        manager.ensure_schema().unwrap();
        manager
            .set_global_config_value(config_keys::RISK_THRESHOLD_HIGH, "5000")
            .unwrap();
        manager
            .set_global_config_value(config_keys::REPORT_TOP_N, "five")
            .unwrap();
        manager
            .set_global_config_value(config_keys::DEFAULT_UNIT, "kg")
            .unwrap();

        let config = manager.load_analytics_config().unwrap();
        assert_eq!(config.risk.high, 5000.0);
        assert_eq!(config.report_top_n, 3);
        assert_eq!(config.default_unit, "kg");
    }

    #[test]
    fn test_invalid_override_rejected() {
        let (_file, manager) = manager();
        manager.ensure_schema().unwrap();
        manager
            .set_global_config_value(config_keys::RISK_THRESHOLD_LOW, "9000")
            .unwrap();
        assert!(matches!(
            manager.load_analytics_config(),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
