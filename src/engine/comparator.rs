// ==========================================
// 废料分析系统 - 环比对比
// ==========================================
// 职责: 本期 vs 上期百分比变化; 上期区间推导
// ==========================================

use crate::domain::report::{DeltaKind, DeltaResult};
use crate::domain::types::{Arrow, Direction};
use chrono::{Duration, NaiveDate};

/// 百分比变化
///
/// # 参数
/// - `current`: 本期值
/// - `previous`: 上期值
/// - `inverted`: 越低越好的指标 (方向仍按原始符号)
///
/// # 返回
/// - 上期缺失/为 0 或本期缺失 → 无对比占位 ("—")
/// - 否则 "{:.1}%" 绝对幅度 + 箭头 + 方向
pub fn delta(current: Option<f64>, previous: Option<f64>, inverted: bool) -> DeltaResult {
    let (cur, prev) = match (current, previous) {
        (Some(cur), Some(prev)) if prev != 0.0 && cur.is_finite() && prev.is_finite() => {
            (cur, prev)
        }
        _ => return DeltaResult::unavailable(),
    };

    let diff = cur - prev;
    let pct = diff / prev * 100.0;

    let (arrow, direction) = if pct > 0.0 {
        (Arrow::Up, Direction::Up)
    } else if pct < 0.0 {
        (Arrow::Down, Direction::Down)
    } else {
        (Arrow::Flat, Direction::Neutral)
    };

    DeltaResult {
        kind: DeltaKind::Change,
        magnitude: format!("{:.1}%", pct.abs()),
        percent: Some(pct.abs()),
        arrow: Some(arrow),
        direction,
        inverted,
    }
}

/// 上期区间: 与本期等长,截止于本期开始前一日
///
/// start > end 时按单日处理
pub fn previous_period(start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
    let days = (end - start).num_days().max(0) + 1;
    let prev_end = start - Duration::days(1);
    let prev_start = prev_end - Duration::days(days - 1);
    (prev_start, prev_end)
}
