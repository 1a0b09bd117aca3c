// ==========================================
// 废料分析系统 - 风险行实体
// ==========================================
// 职责: 风险表格行 / 预测期风险点
// 生命周期: 每次筛选变化重新计算
// ==========================================

use crate::domain::types::RiskLevel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// RiskRow - 风险表格行 (机台 + 班次)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRow {
    pub rank: usize,                 // 排名 (从 1 开始)
    pub machine: String,             // 机台键
    pub shift: String,               // 班次
    pub quantity: f64,               // 汇总数量
    pub risk_level: RiskLevel,       // 风险等级
    pub top_cause: Option<String>,   // 该组主要原因
}

impl RiskRow {
    /// 行键 (机台 + 班次)
    pub fn key(&self) -> String {
        format!("{}/{}", self.machine, self.shift)
    }
}

// ==========================================
// HorizonRisk - 预测期单日风险
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonRisk {
    pub date: NaiveDate,
    pub predicted: f64,
    pub upper: f64,
    pub risk_level: RiskLevel,       // 按点预测分级
    pub worst_case_level: RiskLevel, // 按区间上界分级
}
