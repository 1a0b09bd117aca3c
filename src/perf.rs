// ==========================================
// 性能统计
// ==========================================
// 每个 Guard 在 drop 时输出一条 target = "perf" 的日志
// 嵌套 Guard 记录深度,便于区分外层操作与内层步骤
// ==========================================

use std::cell::Cell;
use std::time::Instant;

/// 慢操作阈值环境变量 (毫秒, 达到后以 warn 输出)
pub const SLOW_OP_ENV: &str = "SCRAP_ANALYTICS_SLOW_OP_MS";

thread_local! {
    static PERF_DEPTH: Cell<u32> = const { Cell::new(0) };
}

fn slow_threshold_ms() -> u64 {
    std::env::var(SLOW_OP_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(if cfg!(debug_assertions) { 500 } else { 2_000 })
}

/// 性能统计 Guard：记录 elapsed_ms + 嵌套深度
///
/// 使用方式：
/// ```ignore
/// let _perf = scrap_analytics::perf::PerfGuard::new("report_build");
/// // do work...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    depth: u32,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        let depth = PERF_DEPTH.with(|d| {
            let depth = d.get();
            d.set(depth.saturating_add(1));
            depth
        });
        Self {
            op,
            start: Instant::now(),
            depth,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();

        if elapsed_ms >= slow_threshold_ms() {
            tracing::warn!(target: "perf", op = self.op, elapsed_ms, depth = self.depth, "slow op");
        } else {
            tracing::info!(target: "perf", op = self.op, elapsed_ms, depth = self.depth, "done");
        }

        PERF_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}
