//! Error types for teer-db
//!
//! Every failure names the entity involved (channel, cycle, sweep position)
//! so a batch caller can report which file pair or channel went wrong.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// teer-db error types
#[derive(Error, Debug)]
pub enum Error {
    /// The raw instrument document lacks an expected top-level section
    #[error("missing '{section}' section in instrument document")]
    MissingSection {
        /// Name of the absent section
        section: String,
    },

    /// A cycle's demodulator data is absent or does not match the sweep
    #[error("malformed cycle {cycle_index}: {reason}")]
    MalformedCycle {
        /// 1-based cycle index within the document
        cycle_index: usize,
        /// What was wrong with the cycle
        reason: String,
    },

    /// Timepoints file and raw document disagree on the cycle count
    #[error(
        "channel '{channel}': {timepoints} timepoints for {cycles} cycles\n\
         The timepoints file must contain exactly one line per cycle."
    )]
    TimepointCountMismatch {
        /// Channel whose ingestion failed
        channel: String,
        /// Number of timepoints read from the text file
        timepoints: usize,
        /// Number of cycles found in the raw document
        cycles: usize,
    },

    /// A `(experiment, channel)` pair was ingested twice
    #[error("duplicate channel '{experiment}-{channel}': {reason}")]
    DuplicateChannel {
        /// Experiment label of the offending pair
        experiment: String,
        /// Channel label of the offending pair
        channel: String,
        /// Whether the conflict is a cycle-count mismatch or a re-ingestion
        reason: String,
    },

    /// A channel re-arrived with a sweep different from the one on record
    #[error("channel '{experiment}-{channel}': frequency sweep differs from the stored sweep")]
    FrequencyMismatch {
        /// Experiment label of the offending pair
        experiment: String,
        /// Channel label of the offending pair
        channel: String,
    },

    /// Current reading has `x == 0` and `y == 0`, impedance is undefined
    #[error(
        "degenerate measurement in channel '{channel}' cycle {cycle_index} at {frequency} Hz: \
         current x and y are both zero"
    )]
    DegenerateMeasurement {
        /// Channel being processed
        channel: String,
        /// 1-based cycle index
        cycle_index: u32,
        /// Stimulus frequency of the degenerate sample
        frequency: f64,
    },

    /// A timepoints line could not be parsed as a float
    #[error("invalid timepoint on line {line}: '{content}'")]
    InvalidTimepoint {
        /// 1-based line number in the timepoints file
        line: usize,
        /// The offending line content
        content: String,
    },

    /// An instrument dump has no matching timepoints file
    #[error("no timepoints file for dump '{dump}' (expected '{expected}')")]
    MissingTimepointFile {
        /// The instrument dump file name
        dump: String,
        /// The timepoints file name that was looked for
        expected: String,
    },

    /// A store lookup referenced a channel id that does not exist
    #[error("unknown channel id {channel_id}")]
    UnknownChannel {
        /// The id that failed to resolve
        channel_id: u64,
    },

    /// A raw measurement expected by the processor is absent from the store
    #[error(
        "channel '{channel}' cycle {cycle_index}: no {kind} measurement at sweep position {position}"
    )]
    MissingMeasurement {
        /// Channel being processed
        channel: String,
        /// 1-based cycle index
        cycle_index: u32,
        /// "current" or "voltage"
        kind: &'static str,
        /// 0-based position within the sweep
        position: usize,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error while decoding a raw instrument document
    #[error("document decode error: {0}")]
    Json(#[from] serde_json::Error),
}
