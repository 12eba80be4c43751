//! Channel Record - one ingested instrument file pair

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Channel Record represents one ingested `(experiment, channel)` file pair.
///
/// The `file_name` is derived as `{experiment}-{channel}` and must be unique
/// across the store. A channel is immutable after ingestion; reprocessing
/// only ever touches the derived table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelRecord {
    experiment_name: String,
    channel_name: String,
    file_name: String,
    total_cycles: u32,
    sweep_id: u64,
    ingested_at: DateTime<Utc>,
}

impl ChannelRecord {
    /// Create a new channel record with the current ingestion timestamp.
    ///
    /// # Arguments
    ///
    /// * `experiment_name` - Experiment label from the upload naming convention
    /// * `channel_name` - Channel label from the dump file name
    /// * `total_cycles` - Number of cycles in the ingested dump
    /// * `sweep_id` - Identifier of the frequency sweep the channel was sampled with
    #[must_use]
    pub fn new(
        experiment_name: impl Into<String>,
        channel_name: impl Into<String>,
        total_cycles: u32,
        sweep_id: u64,
    ) -> Self {
        let experiment_name = experiment_name.into();
        let channel_name = channel_name.into();
        let file_name = format!("{experiment_name}-{channel_name}");
        Self {
            experiment_name,
            channel_name,
            file_name,
            total_cycles,
            sweep_id,
            ingested_at: Utc::now(),
        }
    }

    /// Get the experiment label.
    #[must_use]
    pub fn experiment_name(&self) -> &str {
        &self.experiment_name
    }

    /// Get the channel label.
    #[must_use]
    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    /// Get the derived unique file name (`{experiment}-{channel}`).
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Get the number of cycles the channel was ingested with.
    #[must_use]
    pub const fn total_cycles(&self) -> u32 {
        self.total_cycles
    }

    /// Get the identifier of the sweep this channel belongs to.
    #[must_use]
    pub const fn sweep_id(&self) -> u64 {
        self.sweep_id
    }

    /// Get the ingestion timestamp.
    #[must_use]
    pub const fn ingested_at(&self) -> DateTime<Utc> {
        self.ingested_at
    }
}
