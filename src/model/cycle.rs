//! Cycle Record - one sweep pass at an elapsed timepoint

use serde::{Deserialize, Serialize};

/// Cycle Record represents one complete pass over the frequency sweep.
///
/// Cycles are 1-indexed within their channel. The `timepoint` comes from
/// the external timepoints file, matched positionally (line `cycle_index - 1`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleRecord {
    channel_id: u64,
    cycle_index: u32,
    timepoint: f64,
}

impl CycleRecord {
    /// Create a new cycle record.
    #[must_use]
    pub const fn new(channel_id: u64, cycle_index: u32, timepoint: f64) -> Self {
        Self {
            channel_id,
            cycle_index,
            timepoint,
        }
    }

    /// Get the owning channel's id.
    #[must_use]
    pub const fn channel_id(&self) -> u64 {
        self.channel_id
    }

    /// Get the 1-based cycle index.
    #[must_use]
    pub const fn cycle_index(&self) -> u32 {
        self.cycle_index
    }

    /// Get the elapsed timepoint for this cycle.
    #[must_use]
    pub const fn timepoint(&self) -> f64 {
        self.timepoint
    }
}
