// ==========================================
// 预测器集成测试
// ==========================================
// 测试目标: 退化分支 / 长度约束 / 种子可复现 / 区间合理性
// ==========================================

use rand::rngs::StdRng;
use rand::SeedableRng;
use scrap_analytics::engine::{
    forecast_with_seed, ForecastParams, TrendForecaster, MAX_HORIZON_DAYS,
};

fn assert_all_eq(values: &[f64], expected: f64) {
    for v in values {
        assert!((v - expected).abs() < 1e-9, "{} != {}", v, expected);
    }
}

#[test]
fn test_constant_series_zero_width_band() {
    println!("\n=== 测试：常数序列 ===");

    let mut rng = StdRng::seed_from_u64(1);
    let result = TrendForecaster::default().fit_predict(&[5.0, 5.0, 5.0, 5.0], &mut rng);

    assert_eq!(result.in_sample_fit.len(), 4);
    assert_eq!(result.horizon(), 7);
    for band in [
        &result.in_sample_fit,
        &result.in_sample_lower,
        &result.in_sample_upper,
        &result.horizon_fit,
        &result.horizon_lower,
        &result.horizon_upper,
    ] {
        assert_all_eq(band, 5.0);
    }
    assert_eq!(result.residuals, vec![0.0]);
    assert!(result.trend.is_none());
}

#[test]
fn test_single_point_series() {
    let result = forecast_with_seed(&[42.0], ForecastParams::default().with_horizon(3), Some(9));
    assert_eq!(result.in_sample_fit, vec![42.0]);
    assert_eq!(result.horizon_upper, vec![42.0; 3]);
}

#[test]
fn test_empty_series_returns_zero_horizon() {
    println!("\n=== 测试：空序列 ===");

    let result = forecast_with_seed(&[], ForecastParams::default(), Some(3));
    assert!(result.in_sample_fit.is_empty());
    assert!(result.in_sample_lower.is_empty());
    assert_eq!(result.horizon_fit, vec![0.0; 7]);
    assert_eq!(result.horizon_lower, vec![0.0; 7]);
    assert_eq!(result.horizon_upper, vec![0.0; 7]);
    assert_eq!(result.residuals, vec![0.0]);
}

#[test]
fn test_non_finite_values_discarded() {
    let result = forecast_with_seed(
        &[f64::NAN, 3.0, f64::INFINITY, 3.0],
        ForecastParams::default(),
        Some(5),
    );
    assert_eq!(result.in_sample_fit, vec![3.0, 3.0]);
}

#[test]
fn test_linear_trend_extended_into_horizon() {
    println!("\n=== 测试：线性趋势外推 ===");

    // y = 10 + 2t, 交替 ±1 噪声
    let y: Vec<f64> = (0..20)
        .map(|t| 10.0 + 2.0 * t as f64 + if t % 2 == 0 { 1.0 } else { -1.0 })
        .collect();
    let result = forecast_with_seed(&y, ForecastParams::default(), Some(11));

    let trend = result.trend.expect("trend");
    assert!((trend.slope - 2.0).abs() < 0.1);
    assert_eq!(result.in_sample_fit.len(), 20);
    assert_eq!(result.residuals.len(), 20);
    assert_eq!(result.horizon(), 7);

    for (i, fit) in result.horizon_fit.iter().enumerate() {
        assert!((fit - trend.at((20 + i) as f64)).abs() < 1e-9);
    }
    for i in 0..result.horizon() {
        assert!(result.horizon_lower[i] <= result.horizon_upper[i]);
        // 残差仅为 ±1 左右, 区间应贴近趋势线
        assert!(result.horizon_upper[i] - result.horizon_fit[i] <= 1.5);
        assert!(result.horizon_fit[i] - result.horizon_lower[i] <= 1.5);
    }

    println!("✓ slope={:.3}", trend.slope);
}

#[test]
fn test_seeded_forecast_is_reproducible() {
    let y = [3.0, 9.0, 4.0, 12.0, 7.0, 15.0];
    let a = forecast_with_seed(&y, ForecastParams::default(), Some(2025));
    let b = forecast_with_seed(&y, ForecastParams::default(), Some(2025));
    assert_eq!(a, b);
}

#[test]
fn test_horizon_zero_and_low_simulations() {
    let params = ForecastParams {
        horizon: 0,
        ci_low: 10.0,
        ci_high: 90.0,
        simulations: 1,
    };
    let forecaster = TrendForecaster::new(params);
    assert_eq!(forecaster.params().simulations, 500);

    let mut rng = StdRng::seed_from_u64(4);
    let result = forecaster.fit_predict(&[1.0, 5.0, 2.0, 8.0], &mut rng);
    assert!(result.horizon_fit.is_empty());
    assert!(result.horizon_upper.is_empty());
    assert_eq!(result.in_sample_upper.len(), 4);
}

#[test]
fn test_oversized_horizon_is_clamped() {
    println!("\n=== 测试：超大预测天数 ===");

    let params = ForecastParams::default().with_horizon(usize::MAX);
    let result = forecast_with_seed(&[1.0, 4.0, 2.0], params, Some(1));

    assert_eq!(result.horizon(), MAX_HORIZON_DAYS);
    assert_eq!(result.horizon_upper.len(), MAX_HORIZON_DAYS);
    assert_eq!(result.in_sample_fit.len(), 3);
}
