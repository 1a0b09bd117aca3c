// ==========================================
// 废料分析系统 - 配置层
// ==========================================
// 职责: 分析参数默认值 / JSON 文件 / config_kv 覆写
// ==========================================

pub mod analytics_config;
pub mod config_manager;

// 重导出核心配置类型
pub use analytics_config::{AnalyticsConfig, ConfigError, ConfigResult};
pub use config_manager::{config_keys, ConfigManager, GLOBAL_SCOPE};
