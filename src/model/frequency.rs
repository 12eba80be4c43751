//! Frequency Record - one distinct stimulus frequency within a sweep

use serde::{Deserialize, Serialize};

/// Frequency Record represents one distinct value of a frequency sweep.
///
/// Frequencies are owned by their sweep, not deduplicated globally: two
/// sweeps that differ only by floating-point noise get distinct rows, so
/// channels sampled with different generators can never collide. Within a
/// sweep, values are deduplicated by exact bit equality — no tolerance
/// matching is performed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrequencyRecord {
    sweep_id: u64,
    position: usize,
    value: f64,
}

impl FrequencyRecord {
    /// Create a new frequency record.
    #[must_use]
    pub const fn new(sweep_id: u64, position: usize, value: f64) -> Self {
        Self {
            sweep_id,
            position,
            value,
        }
    }

    /// Get the owning sweep's identifier.
    #[must_use]
    pub const fn sweep_id(&self) -> u64 {
        self.sweep_id
    }

    /// Get the 0-based position within the sweep ordering.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the stimulus frequency in Hz.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }
}
