// ==========================================
// 废料分析系统 - 对比与报表对象
// ==========================================
// 职责: 环比变化 / Top-N 行 / KPI 汇总 / 分解占比
// 红线: 派生对象,不落库
// ==========================================

use crate::domain::types::{Arrow, Direction};
use serde::{Deserialize, Serialize};

/// "无对比数据" 占位符
pub const NO_DATA: &str = "—";

// ==========================================
// DeltaResult - 环比变化
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeltaKind {
    Change,      // 正常百分比变化
    New,         // 上期为 0,本期新出现
    Unavailable, // 无法比较
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaResult {
    pub kind: DeltaKind,
    /// 格式化幅度: "50.0%" / "new" / "—"
    pub magnitude: String,
    /// 绝对百分比
    pub percent: Option<f64>,
    /// 仅 Change 时存在
    pub arrow: Option<Arrow>,
    pub direction: Direction,
    /// 指标越低越好 (如废料率); direction 仍按原始符号给出
    #[serde(default)]
    pub inverted: bool,
}

impl DeltaResult {
    /// 无对比数据占位
    pub fn unavailable() -> Self {
        Self {
            kind: DeltaKind::Unavailable,
            magnitude: NO_DATA.to_string(),
            percent: None,
            arrow: None,
            direction: Direction::Neutral,
            inverted: false,
        }
    }

    /// 新出现的条目
    pub fn new_entry() -> Self {
        Self {
            kind: DeltaKind::New,
            magnitude: "new".to_string(),
            percent: None,
            arrow: None,
            direction: Direction::Up,
            inverted: false,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.kind == DeltaKind::Unavailable
    }

    /// 展示文本: "▼ 50.0%" / "new" / "—"
    pub fn label(&self) -> String {
        match self.arrow {
            Some(arrow) => format!("{} {}", arrow.glyph(), self.magnitude),
            None => self.magnitude.clone(),
        }
    }
}

// ==========================================
// TopNEntry - 排名行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopNEntry {
    pub key: Option<String>,     // 占位行为 None
    pub quantity: Option<f64>,   // 占位行为 None
    pub delta: DeltaResult,
}

impl TopNEntry {
    pub fn placeholder() -> Self {
        Self {
            key: None,
            quantity: None,
            delta: DeltaResult::unavailable(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.key.is_none()
    }
}

// ==========================================
// KpiSummary - 周期 KPI
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total_scrap: f64,
    pub entries: usize,
    pub avg_per_day: f64,
    pub top_cause: Option<String>,
    pub scrap_rate: Option<f64>,       // 废料率 (%)
    pub total_produced: Option<f64>,
    pub finished_qty: Option<f64>,     // 总产量 - 废料
    pub top_machine: Option<String>,
    pub top_machine_qty: Option<f64>,
}

// ==========================================
// 分解占比
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CauseShare {
    pub cause: String,
    pub quantity: f64,
    pub share: f64, // 0~1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftShare {
    pub shift: String,
    pub percent: f64, // 0~100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_labels() {
        assert_eq!(DeltaResult::unavailable().label(), "—");
        assert_eq!(DeltaResult::new_entry().label(), "new");

        let delta = DeltaResult {
            kind: DeltaKind::Change,
            magnitude: "50.0%".to_string(),
            percent: Some(50.0),
            arrow: Some(Arrow::Down),
            direction: Direction::Down,
            inverted: false,
        };
        assert_eq!(delta.label(), "▼ 50.0%");
    }

    #[test]
    fn test_placeholder_entry() {
        let entry = TopNEntry::placeholder();
        assert!(entry.is_placeholder());
        assert!(entry.delta.is_unavailable());
    }
}
