// ==========================================
// 废料分析系统 - Top-N 排名
// ==========================================
// 职责: 本期前 N 名 + 与上期对比; 不足 N 名补占位行
// ==========================================

use crate::domain::report::{DeltaResult, TopNEntry};
use crate::domain::series::GroupAggregate;
use crate::engine::comparator::delta;

/// 本期前 N 名
///
/// # 参数
/// - `current`: 本期汇总 (已降序)
/// - `previous`: 上期汇总
/// - `n`: 行数
///
/// # 返回
/// 恰好 n 行; 上期为 0 而本期非 0 时标记为 "new"
pub fn top_n(current: &GroupAggregate, previous: &GroupAggregate, n: usize) -> Vec<TopNEntry> {
    let mut rows: Vec<TopNEntry> = current
        .entries()
        .iter()
        .take(n)
        .map(|entry| {
            let prev = previous.get(&entry.key).unwrap_or(0.0);
            let delta = if prev == 0.0 && entry.quantity != 0.0 {
                DeltaResult::new_entry()
            } else {
                delta(Some(entry.quantity), Some(prev), false)
            };
            TopNEntry {
                key: Some(entry.key.clone()),
                quantity: Some(entry.quantity),
                delta,
            }
        })
        .collect();

    rows.resize_with(n, TopNEntry::placeholder);
    rows
}
