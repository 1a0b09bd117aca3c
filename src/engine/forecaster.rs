// ==========================================
// 废料分析系统 - 趋势 + 残差自助法预测
// ==========================================
// 职责: 线性趋势拟合 + 残差重抽样得到逐点置信区间
// 输入: 按日汇总的数值序列
// 输出: ForecastResult (样本内拟合 / 样本外预测 / 上下界)
// ==========================================
// 红线:
// - 从不失败: 空序列 / 常数序列走退化分支
// - 随机源由调用方注入,不使用全局 RNG
// ==========================================

use crate::domain::forecast::{ForecastResult, LinearTrend};
use crate::perf::PerfGuard;
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// 最少模拟次数
pub const MIN_SIMULATIONS: usize = 500;

/// 最多模拟次数
pub const MAX_SIMULATIONS: usize = 100_000;

/// 最长预测天数
pub const MAX_HORIZON_DAYS: usize = 365;

/// 残差最少个数 (不足时以残差均值补齐)
const MIN_RESIDUALS: usize = 5;

// allclose 容差
const ALLCLOSE_ATOL: f64 = 1e-8;
const ALLCLOSE_RTOL: f64 = 1e-5;

// ==========================================
// ForecastParams - 预测参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastParams {
    pub horizon: usize,     // 预测天数
    pub ci_low: f64,        // 下界百分位
    pub ci_high: f64,       // 上界百分位
    pub simulations: usize, // 自助法模拟次数
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            horizon: 7,
            ci_low: 10.0,
            ci_high: 90.0,
            simulations: 800,
        }
    }
}

impl ForecastParams {
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// 规范化: 百分位裁剪到 [0,100] 且低 ≤ 高; 预测天数与模拟次数裁剪到允许范围
    pub fn normalized(&self) -> Self {
        let clamp = |p: f64| if p.is_finite() { p.clamp(0.0, 100.0) } else { 50.0 };
        let mut low = clamp(self.ci_low);
        let mut high = clamp(self.ci_high);
        if low > high {
            std::mem::swap(&mut low, &mut high);
        }
        Self {
            horizon: self.horizon.min(MAX_HORIZON_DAYS),
            ci_low: low,
            ci_high: high,
            simulations: self.simulations.clamp(MIN_SIMULATIONS, MAX_SIMULATIONS),
        }
    }
}

// ==========================================
// TrendForecaster - 预测器
// ==========================================
pub struct TrendForecaster {
    params: ForecastParams,
}

impl TrendForecaster {
    pub fn new(params: ForecastParams) -> Self {
        Self {
            params: params.normalized(),
        }
    }

    pub fn params(&self) -> &ForecastParams {
        &self.params
    }

    /// 拟合并预测
    ///
    /// # 参数
    /// - `y`: 序列值 (NaN / ∞ 会被丢弃)
    /// - `rng`: 随机源
    ///
    /// # 返回
    /// ForecastResult; 样本内长度 = 有效点数, 样本外长度 = horizon
    pub fn fit_predict<R: Rng + ?Sized>(&self, y: &[f64], rng: &mut R) -> ForecastResult {
        let _perf = PerfGuard::new("forecast_fit_predict");
        let horizon = self.params.horizon;

        let y: Vec<f64> = y.iter().copied().filter(|v| v.is_finite()).collect();

        // ===== 空序列 =====
        if y.is_empty() {
            tracing::debug!(horizon, "空序列,返回零预测");
            return ForecastResult {
                horizon_fit: vec![0.0; horizon],
                horizon_lower: vec![0.0; horizon],
                horizon_upper: vec![0.0; horizon],
                residuals: vec![0.0],
                ..ForecastResult::default()
            };
        }

        // ===== 单点 / 常数序列 =====
        if y.len() == 1 || all_close_to_first(&y) {
            let mean = y.iter().sum::<f64>() / y.len() as f64;
            tracing::debug!(points = y.len(), mean, "常数序列,零宽区间");
            let in_sample = vec![mean; y.len()];
            let out = vec![mean; horizon];
            return ForecastResult {
                in_sample_fit: in_sample.clone(),
                in_sample_lower: in_sample.clone(),
                in_sample_upper: in_sample,
                horizon_fit: out.clone(),
                horizon_lower: out.clone(),
                horizon_upper: out,
                residuals: vec![0.0],
                trend: None,
            };
        }

        // ===== 线性趋势 + 残差 =====
        let n = y.len();
        let trend = fit_linear(&y);
        let fitted: Vec<f64> = (0..n).map(|t| trend.at(t as f64)).collect();
        let mut residuals: Vec<f64> = y.iter().zip(&fitted).map(|(v, f)| v - f).collect();
        if residuals.len() < MIN_RESIDUALS {
            let mean = residuals.iter().sum::<f64>() / residuals.len() as f64;
            residuals.resize(MIN_RESIDUALS, mean);
        }

        let (in_lower, in_upper) = self.bootstrap_band(&fitted, &residuals, rng);

        let future: Vec<f64> = (n..n.saturating_add(horizon))
            .map(|t| trend.at(t as f64))
            .collect();
        let (out_lower, out_upper) = self.bootstrap_band(&future, &residuals, rng);

        tracing::debug!(
            points = n,
            horizon,
            slope = trend.slope,
            intercept = trend.intercept,
            simulations = self.params.simulations,
            "预测完成"
        );

        ForecastResult {
            in_sample_fit: fitted,
            in_sample_lower: in_lower,
            in_sample_upper: in_upper,
            horizon_fit: future,
            horizon_lower: out_lower,
            horizon_upper: out_upper,
            residuals,
            trend: Some(trend),
        }
    }

    /// 逐点自助法区间: 每个点独立抽 S 次残差
    fn bootstrap_band<R: Rng + ?Sized>(
        &self,
        base: &[f64],
        residuals: &[f64],
        rng: &mut R,
    ) -> (Vec<f64>, Vec<f64>) {
        let sims = self.params.simulations;
        let mut lower = Vec::with_capacity(base.len());
        let mut upper = Vec::with_capacity(base.len());
        let mut draws = vec![0.0; sims];

        for &center in base {
            for slot in draws.iter_mut() {
                *slot = center + residuals[rng.gen_range(0..residuals.len())];
            }
            draws.sort_by(f64::total_cmp);
            lower.push(percentile_sorted(&draws, self.params.ci_low));
            upper.push(percentile_sorted(&draws, self.params.ci_high));
        }

        (lower, upper)
    }
}

impl Default for TrendForecaster {
    fn default() -> Self {
        Self::new(ForecastParams::default())
    }
}

// ==========================================
// 便捷入口
// ==========================================

/// 使用种子 (None = 系统熵) 构造本次调用专用的 StdRng 并预测
pub fn forecast_with_seed(y: &[f64], params: ForecastParams, seed: Option<u64>) -> ForecastResult {
    let seed = seed.unwrap_or_else(|| rand::thread_rng().next_u64());
    let mut rng = StdRng::seed_from_u64(seed);
    TrendForecaster::new(params).fit_predict(y, &mut rng)
}

/// 预测期日期: 最后日期的次日起,逐日
pub fn future_dates(last: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon as i64)
        .map(|offset| last + Duration::days(offset))
        .collect()
}

// ==========================================
// 数值工具
// ==========================================

/// 最小二乘直线拟合, t = 0..n-1 (n ≥ 2)
fn fit_linear(y: &[f64]) -> LinearTrend {
    let n = y.len() as f64;
    let t_mean = (n - 1.0) / 2.0;
    let y_mean = y.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (t, v) in y.iter().enumerate() {
        let dt = t as f64 - t_mean;
        sxy += dt * (v - y_mean);
        sxx += dt * dt;
    }

    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    LinearTrend {
        slope,
        intercept: y_mean - slope * t_mean,
    }
}

fn all_close_to_first(y: &[f64]) -> bool {
    let first = y[0];
    y.iter()
        .all(|v| (v - first).abs() <= ALLCLOSE_ATOL + ALLCLOSE_RTOL * first.abs())
}

/// 线性插值百分位 (输入已升序)
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        len => {
            let h = (len - 1) as f64 * p / 100.0;
            let lo = h.floor() as usize;
            let hi = (lo + 1).min(len - 1);
            sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
        }
    }
}
