// ==========================================
// 废料分析系统 - 预测结果
// ==========================================
// 生命周期: 每次查询重新计算,不缓存,不落库
// ==========================================

use serde::{Deserialize, Serialize};

/// 线性趋势 y = slope * t + intercept
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    pub fn at(&self, t: f64) -> f64 {
        self.slope * t + self.intercept
    }
}

// ==========================================
// ForecastResult - 预测结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    // ===== 样本内 (长度 = 序列长度) =====
    pub in_sample_fit: Vec<f64>,
    pub in_sample_lower: Vec<f64>,
    pub in_sample_upper: Vec<f64>,

    // ===== 样本外 (长度 = horizon) =====
    pub horizon_fit: Vec<f64>,
    pub horizon_lower: Vec<f64>,
    pub horizon_upper: Vec<f64>,

    /// 参与抽样的残差 (已补齐到最少 5 个)
    pub residuals: Vec<f64>,

    /// 拟合趋势; 空序列/常数序列为 None
    pub trend: Option<LinearTrend>,
}

impl ForecastResult {
    pub fn horizon(&self) -> usize {
        self.horizon_fit.len()
    }

    /// 样本外区间宽度之和 (诊断用)
    pub fn horizon_band_width(&self) -> f64 {
        self.horizon_upper
            .iter()
            .zip(&self.horizon_lower)
            .map(|(u, l)| u - l)
            .sum()
    }
}
