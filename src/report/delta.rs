//! Per-key counter delta computation with reset recovery.

use std::collections::HashMap;

/// Turns monotonically increasing raw counters into per-interval deltas.
///
/// Keeps the last raw value observed per series across the whole run (chunk
/// boundaries included). Owned by the renderer; a fresh engine per report
/// keeps independent runs from contaminating each other. Must be fed each
/// key in strictly increasing offset order.
#[derive(Debug, Default)]
pub struct DeltaEngine {
    last: HashMap<String, u64>,
}

impl DeltaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interval delta for `key` given its new raw sample.
    ///
    /// First sight of a key initializes the baseline to the sample itself,
    /// so the first delta is always zero. A sample of zero, or one below
    /// the stored baseline, is a counter reset (restart or rollover): the
    /// baseline is forced to zero and the full sample surfaces as a
    /// one-time spike. Note the quirk this implies: a legitimate zero
    /// reading counts as a reset even without a preceding decrease.
    pub fn delta(&mut self, key: &str, raw: u64) -> u64 {
        let last = self.last.entry(key.to_string()).or_insert(raw);
        if raw == 0 || raw < *last {
            *last = 0;
        }
        let delta = raw - *last;
        *last = raw;
        delta
    }
}
