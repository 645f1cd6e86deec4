//! Process-wide pseudo-random helpers for jitter and fingerprint rotation.
//!
//! Seeded from the clock on first use and stepped with a linear congruential
//! generator. Good enough to avoid lockstep timing; not for anything secret.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

static STATE: OnceLock<AtomicU64> = OnceLock::new();

fn state() -> &'static AtomicU64 {
    STATE.get_or_init(|| {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x9E37_79B9_7F4A_7C15);
        AtomicU64::new(seed)
    })
}

/// Next value of the shared LCG (Knuth MMIX constants).
pub fn next_u64() -> u64 {
    const A: u64 = 6364136223846793005;
    const C: u64 = 1442695040888963407;
    let counter = state();
    loop {
        let current = counter.load(Ordering::Relaxed);
        let next = current.wrapping_mul(A).wrapping_add(C);
        if counter
            .compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            // High bits of an LCG are the well-mixed ones.
            return next >> 16;
        }
    }
}

/// Index in `0..len`. Returns 0 for an empty range.
pub fn index(len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (next_u64() % len as u64) as usize
}

/// Uniformly jittered duration in `[min, max]`. Swapped bounds are tolerated.
pub fn duration_between(min: Duration, max: Duration) -> Duration {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let span = (hi - lo).as_millis() as u64;
    if span == 0 {
        return lo;
    }
    lo + Duration::from_millis(next_u64() % (span + 1))
}
