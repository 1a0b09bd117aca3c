// ==========================================
// 废料分析系统 - 领域类型定义
// ==========================================
// 职责: 风险等级 / 变化方向 / 日期预设等枚举
// 红线: 等级制,不是评分制
// ==========================================

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 风险等级 (Risk Level)
// ==========================================
// 顺序: Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,    // 正常
    Medium, // 关注
    High,   // 危险
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

// ==========================================
// 变化方向 (Direction)
// ==========================================
// 用于展示层的颜色分类 (up/down/neutral)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
            Direction::Neutral => write!(f, "neutral"),
        }
    }
}

// ==========================================
// 箭头 (Arrow)
// ==========================================
// 始终反映原始差值的符号,与颜色分类无关
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrow {
    Up,   // ▲
    Down, // ▼
    Flat, // →
}

impl Arrow {
    /// 箭头字形
    pub fn glyph(&self) -> &'static str {
        match self {
            Arrow::Up => "▲",
            Arrow::Down => "▼",
            Arrow::Flat => "→",
        }
    }
}

impl fmt::Display for Arrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

// ==========================================
// 日期预设 (Date Preset)
// ==========================================
// 看板的时间窗口快捷选项,以调用方传入的 today 为基准
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatePreset {
    Today,
    ThisWeek,
    ThisMonth,
    Last30Days,
    All,
}

impl DatePreset {
    /// 解析为 (start, end); end 为 None 表示不设上限 (含未来日期)
    ///
    /// 仅 Today 同时限定上下界; All 返回 None
    pub fn resolve(&self, today: NaiveDate) -> Option<(NaiveDate, Option<NaiveDate>)> {
        match self {
            DatePreset::Today => Some((today, Some(today))),
            DatePreset::ThisWeek => {
                let offset = today.weekday().num_days_from_monday() as i64;
                Some((today - Duration::days(offset), None))
            }
            DatePreset::ThisMonth => {
                let first = today.with_day(1).unwrap_or(today);
                Some((first, None))
            }
            DatePreset::Last30Days => Some((today - Duration::days(30), None)),
            DatePreset::All => None,
        }
    }

    /// 从界面标签解析 ("Today" / "This Week" / ...)
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "today" => Some(DatePreset::Today),
            "this week" | "this_week" => Some(DatePreset::ThisWeek),
            "this month" | "this_month" => Some(DatePreset::ThisMonth),
            "last 30 days" | "last_30_days" => Some(DatePreset::Last30Days),
            "all" | "" => Some(DatePreset::All),
            _ => None,
        }
    }
}

impl fmt::Display for DatePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatePreset::Today => write!(f, "Today"),
            DatePreset::ThisWeek => write!(f, "This Week"),
            DatePreset::ThisMonth => write!(f, "This Month"),
            DatePreset::Last30Days => write!(f, "Last 30 Days"),
            DatePreset::All => write!(f, "All"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_risk_level_order() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert_eq!(RiskLevel::High.to_string(), "High");
    }

    #[test]
    fn test_preset_this_week_starts_monday() {
        // 2025-10-09 是周四
        let (start, end) = DatePreset::ThisWeek.resolve(d(2025, 10, 9)).unwrap();
        assert_eq!(start, d(2025, 10, 6));
        assert_eq!(end, None);
    }

    #[test]
    fn test_preset_this_month_and_last_30() {
        let (start, _) = DatePreset::ThisMonth.resolve(d(2025, 10, 9)).unwrap();
        assert_eq!(start, d(2025, 10, 1));

        let (start, end) = DatePreset::Last30Days.resolve(d(2025, 10, 31)).unwrap();
        assert_eq!(start, d(2025, 10, 1));
        assert_eq!(end, None);

        assert_eq!(
            DatePreset::Today.resolve(d(2025, 10, 9)),
            Some((d(2025, 10, 9), Some(d(2025, 10, 9))))
        );
        assert_eq!(DatePreset::All.resolve(d(2025, 10, 9)), None);
    }

    #[test]
    fn test_preset_from_label() {
        assert_eq!(DatePreset::from_label("Last 30 Days"), Some(DatePreset::Last30Days));
        assert_eq!(DatePreset::from_label(" this week "), Some(DatePreset::ThisWeek));
        assert_eq!(DatePreset::from_label("yesterday"), None);
    }
}
