//! Shared delta-based rate computation used by every platform's CPU provider.
//!
//! CPU usage is not a value the kernel hands back directly: each reading is
//! a snapshot of cumulative tick counters since boot, and "percent busy"
//! only has meaning between two such snapshots. This tracker keeps the
//! previous snapshot per CPU index (`-1` for the aggregate) and returns the
//! percentage between it and a newly-supplied one, or zero when there is no
//! previous snapshot yet to difference against.

use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Clone, Copy, Default)]
struct Snapshot {
    total: u64,
    busy: u64,
}

/// Tracks cumulative (total, busy) tick pairs per CPU index and converts
/// successive samples into a percentage.
pub struct RateTracker {
    previous: Mutex<HashMap<i32, Snapshot>>,
}

impl RateTracker {
    /// A tracker with no prior samples.
    pub fn new() -> Self {
        Self {
            previous: Mutex::new(HashMap::new()),
        }
    }

    /// Record a new `(total, busy)` snapshot for `index` and return the
    /// percentage busy since the previous call for that same index.
    ///
    /// The first call for any given `index` always returns `0.0`, since
    /// there is nothing yet to difference against. A counter that appears
    /// to have gone backwards (e.g. after a kernel counter wrap) yields a
    /// delta clamped to zero rather than a negative or wrapped percentage.
    pub fn percent(&self, index: i32, total: u64, busy: u64) -> f64 {
        let mut previous = self.previous.lock().unwrap_or_else(|e| e.into_inner());
        let prev = previous.insert(index, Snapshot { total, busy });

        let Some(prev) = prev else {
            return 0.0;
        };

        let total_delta = total.saturating_sub(prev.total);
        let busy_delta = busy.saturating_sub(prev.busy);
        log::debug!("cpu[{index}] delta: total={total_delta} busy={busy_delta}");

        if total_delta == 0 {
            return 0.0;
        }

        (busy_delta as f64 / total_delta as f64 * 100.0).clamp(0.0, 100.0)
    }
}

impl Default for RateTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_is_always_zero() {
        let tracker = RateTracker::new();
        assert_eq!(tracker.percent(-1, 1000, 500), 0.0);
    }

    #[test]
    fn second_sample_reports_the_delta() {
        let tracker = RateTracker::new();
        tracker.percent(-1, 1000, 500);
        let pct = tracker.percent(-1, 2000, 1000);
        assert!((pct - 50.0).abs() < 0.01);
    }

    #[test]
    fn counter_rewind_clamps_to_zero_instead_of_going_negative() {
        let tracker = RateTracker::new();
        tracker.percent(0, 1000, 900);
        let pct = tracker.percent(0, 500, 100);
        assert_eq!(pct, 0.0);
    }

    #[test]
    fn per_core_indices_are_tracked_independently() {
        let tracker = RateTracker::new();
        tracker.percent(0, 1000, 500);
        tracker.percent(1, 1000, 100);
        let core0 = tracker.percent(0, 2000, 1500);
        let core1 = tracker.percent(1, 2000, 200);
        assert!((core0 - 100.0).abs() < 0.01);
        assert!((core1 - 10.0).abs() < 0.01);
    }

    #[test]
    fn zero_total_delta_does_not_divide_by_zero() {
        let tracker = RateTracker::new();
        tracker.percent(-1, 1000, 500);
        let pct = tracker.percent(-1, 1000, 500);
        assert_eq!(pct, 0.0);
    }
}
