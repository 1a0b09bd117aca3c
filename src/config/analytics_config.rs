// ==========================================
// 废料分析系统 - 分析参数配置
// ==========================================
// 职责: 风险阈值 / 预测参数 / 报表行数 / 默认值
// 来源: Default / JSON 文件 / config_kv 表 (见 ConfigManager)
// ==========================================

use crate::engine::forecaster::{
    ForecastParams, MAX_HORIZON_DAYS, MAX_SIMULATIONS, MIN_SIMULATIONS,
};
use crate::engine::risk::RiskThresholds;
use crate::importer::normalizer::NormalizerOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// ==========================================
// ConfigError - 配置错误
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("配置值非法: {key}: {reason}")]
    Invalid { key: String, reason: String },

    #[error("配置库访问失败: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("锁获取失败: {0}")]
    LockError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// AnalyticsConfig - 分析参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub risk: RiskThresholds,
    pub forecast: ForecastParams,
    pub report_top_n: usize,      // 报表 Top-N 行数
    pub risk_row_limit: usize,    // 风险表行数
    pub top_causes_limit: usize,  // 报表原因柱状图条数
    pub other_share: f64,         // 原因饼图合并阈值 (0~1)
    pub default_shift: String,
    pub default_unit: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        let normalizer = NormalizerOptions::default();
        Self {
            risk: RiskThresholds::default(),
            forecast: ForecastParams::default(),
            report_top_n: 3,
            risk_row_limit: 10,
            top_causes_limit: 12,
            other_share: 0.05,
            default_shift: normalizer.default_shift,
            default_unit: normalizer.default_unit,
        }
    }
}

impl AnalyticsConfig {
    /// 从 JSON 文本加载 (缺省字段取默认值) 并校验
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载并校验
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), "分析配置已加载");
        Ok(config)
    }

    /// 校验取值范围
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |key: &str, reason: String| ConfigError::Invalid {
            key: key.to_string(),
            reason,
        };

        if !self.risk.low.is_finite() || !self.risk.high.is_finite() {
            return Err(invalid("risk", "阈值必须为有限数".to_string()));
        }
        if self.risk.low > self.risk.high {
            return Err(invalid(
                "risk",
                format!("low({}) > high({})", self.risk.low, self.risk.high),
            ));
        }
        for (key, p) in [
            ("forecast.ci_low", self.forecast.ci_low),
            ("forecast.ci_high", self.forecast.ci_high),
        ] {
            if !(0.0..=100.0).contains(&p) {
                return Err(invalid(key, format!("百分位 {} 超出 [0,100]", p)));
            }
        }
        if !(1..=MAX_HORIZON_DAYS).contains(&self.forecast.horizon) {
            return Err(invalid(
                "forecast.horizon",
                format!(
                    "预测天数 {} 超出 [1,{}]",
                    self.forecast.horizon, MAX_HORIZON_DAYS
                ),
            ));
        }
        if !(MIN_SIMULATIONS..=MAX_SIMULATIONS).contains(&self.forecast.simulations) {
            return Err(invalid(
                "forecast.simulations",
                format!(
                    "模拟次数 {} 超出 [{},{}]",
                    self.forecast.simulations, MIN_SIMULATIONS, MAX_SIMULATIONS
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.other_share) {
            return Err(invalid(
                "other_share",
                format!("占比 {} 超出 [0,1]", self.other_share),
            ));
        }
        if self.report_top_n == 0 {
            return Err(invalid("report_top_n", "必须大于 0".to_string()));
        }
        Ok(())
    }

    pub fn normalizer_options(&self) -> NormalizerOptions {
        NormalizerOptions {
            default_shift: self.default_shift.clone(),
            default_unit: self.default_unit.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.risk.low, 2500.0);
        assert_eq!(config.risk.high, 4000.0);
        assert_eq!(config.forecast.horizon, 7);
        assert_eq!(config.report_top_n, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            AnalyticsConfig::from_json_str(r#"{"risk": {"low": 100, "high": 200}}"#).unwrap();
        assert_eq!(config.risk.high, 200.0);
        assert_eq!(config.risk_row_limit, 10);
        assert_eq!(config.default_unit, "lbs");
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let result = AnalyticsConfig::from_json_str(r#"{"risk": {"low": 500, "high": 100}}"#);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_forecast_bounds_rejected() {
        let mut config = AnalyticsConfig::default();
        config.forecast.horizon = usize::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref key, .. }) if key == "forecast.horizon"
        ));

        config.forecast.horizon = 0;
        assert!(config.validate().is_err());

        config.forecast.horizon = MAX_HORIZON_DAYS;
        assert!(config.validate().is_ok());

        config.forecast.simulations = MAX_SIMULATIONS + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref key, .. }) if key == "forecast.simulations"
        ));

        let result = AnalyticsConfig::from_json_str(r#"{"forecast": {"simulations": 10}}"#);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"report_top_n": 5}}"#).unwrap();
        let config = AnalyticsConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.report_top_n, 5);

        let missing = AnalyticsConfig::from_json_file("/no/such/config.json");
        assert!(matches!(missing, Err(ConfigError::FileRead { .. })));
    }
}
