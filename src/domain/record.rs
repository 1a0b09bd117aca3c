// ==========================================
// 废料分析系统 - 废料记录实体
// ==========================================
// 职责: 规范化后的废料事件记录
// 红线: 规范化后不可变, quantity >= 0
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 原始行记录 (列名 -> 单元格文本)
///
/// 缺失列与空白单元格都视为"缺失"
pub type RawRow = HashMap<String, String>;

/// 机台兜底键
pub const UNKNOWN_MACHINE: &str = "Unknown";

// ==========================================
// ScrapRecord - 废料记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapRecord {
    pub date: NaiveDate,                // 发生日期
    pub quantity: f64,                  // 废料数量 (>= 0)
    pub cause: Option<String>,          // 原因 (空白为 None,不参与原因分解)
    pub machine: String,                // 机台键
    pub operator: String,               // 操作员 (可能为空串)
    pub shift: String,                  // 班次代码 (已规范化)
    pub produced_total: Option<f64>,    // 总产量 (可选)
    pub unit: String,                   // 计量单位
    #[serde(default)]
    pub comments: Option<String>,       // 备注
}

impl ScrapRecord {
    /// 快速构造 (测试/内存数据用)
    pub fn new(date: NaiveDate, quantity: f64, machine: &str, shift: &str) -> Self {
        Self {
            date,
            quantity,
            cause: None,
            machine: machine.to_string(),
            operator: String::new(),
            shift: shift.to_string(),
            produced_total: None,
            unit: "lbs".to_string(),
            comments: None,
        }
    }

    pub fn with_cause(mut self, cause: &str) -> Self {
        let trimmed = cause.trim();
        self.cause = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    pub fn with_operator(mut self, operator: &str) -> Self {
        self.operator = operator.to_string();
        self
    }

    pub fn with_produced_total(mut self, produced_total: f64) -> Self {
        self.produced_total = Some(produced_total);
        self
    }

    /// 废料率 (%)
    ///
    /// produced_total 缺失或 <= 0 时无定义
    pub fn scrap_percent(&self) -> Option<f64> {
        match self.produced_total {
            Some(total) if total > 0.0 => Some(self.quantity / total * 100.0),
            _ => None,
        }
    }
}
