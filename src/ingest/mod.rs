//! Measurement Normalizer
//!
//! Maps extractor output plus the external labels and timepoints into the
//! canonical entity set and commits it to the store, one channel at a time.
//! The timepoint for cycle `i` (1-based) is line `i - 1` of the timepoints
//! file; a count mismatch fails ingestion rather than truncating or padding.
//!
//! Batch ingestion treats each file pair as an independent failure unit: a
//! bad pair is reported with its labels and error while the remaining pairs
//! continue.

mod pairing;
mod timepoints;

pub use pairing::{channel_name_of, pair_files, FilePair};
pub use timepoints::{load_timepoints, read_timepoints};

use std::fs::File;
use std::io::BufReader;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::extract::Extraction;
use crate::store::{ChannelBatch, MeasurementStore, StagedCycle};

/// Assemble a channel batch from extracted data and external timepoints.
///
/// Pure: nothing is written until the batch is committed.
///
/// # Errors
///
/// Returns [`Error::TimepointCountMismatch`] when the timepoints file and
/// the raw document disagree on the cycle count.
pub fn normalize(
    extraction: Extraction,
    experiment_name: &str,
    channel_name: &str,
    timepoints: &[f64],
) -> Result<ChannelBatch> {
    if timepoints.len() != extraction.cycles.len() {
        return Err(Error::TimepointCountMismatch {
            channel: format!("{experiment_name}-{channel_name}"),
            timepoints: timepoints.len(),
            cycles: extraction.cycles.len(),
        });
    }

    let cycles = extraction
        .cycles
        .into_iter()
        .zip(timepoints)
        .map(|(cycle, &timepoint)| StagedCycle {
            timepoint,
            current: cycle.current,
            voltage: cycle.voltage,
        })
        .collect();

    Ok(ChannelBatch {
        experiment_name: experiment_name.to_owned(),
        channel_name: channel_name.to_owned(),
        sweep: extraction.frequencies,
        cycles,
    })
}

/// Normalize and commit one channel.
///
/// # Errors
///
/// Propagates normalization errors plus the store's commit errors
/// ([`Error::DuplicateChannel`], [`Error::FrequencyMismatch`],
/// [`Error::MalformedCycle`]).
pub fn ingest_channel(
    store: &mut MeasurementStore,
    extraction: Extraction,
    experiment_name: &str,
    channel_name: &str,
    timepoints: &[f64],
) -> Result<u64> {
    let batch = normalize(extraction, experiment_name, channel_name, timepoints)?;
    store.commit_channel(batch)
}

/// Ingest one file pair from disk.
///
/// # Errors
///
/// IO and decode failures on either file, plus all [`ingest_channel`]
/// failure modes.
pub fn ingest_pair(store: &mut MeasurementStore, pair: &FilePair) -> Result<u64> {
    let dump = File::open(&pair.dump)?;
    let extraction = Extraction::from_reader(BufReader::new(dump))?;
    let timepoints = load_timepoints(&pair.timepoints)?;
    let channel_id = ingest_channel(
        store,
        extraction,
        &pair.experiment_name,
        &pair.channel_name,
        &timepoints,
    )?;
    info!(
        experiment = %pair.experiment_name,
        channel = %pair.channel_name,
        "ingested file pair"
    );
    Ok(channel_id)
}

/// Outcome of one file pair within a batch.
#[derive(Debug)]
pub struct PairOutcome {
    /// The pair this outcome belongs to
    pub pair: FilePair,
    /// The committed channel id, or why ingestion failed
    pub result: Result<u64>,
}

/// Ingest a batch of file pairs, isolating failures per pair.
///
/// Never aborts early: every pair gets an outcome, and callers can report
/// exactly which pairs failed and why.
pub fn ingest_batch(store: &mut MeasurementStore, pairs: Vec<FilePair>) -> Vec<PairOutcome> {
    pairs
        .into_iter()
        .map(|pair| {
            let result = ingest_pair(store, &pair);
            if let Err(err) = &result {
                warn!(
                    experiment = %pair.experiment_name,
                    channel = %pair.channel_name,
                    error = %err,
                    "file pair failed, continuing batch"
                );
            }
            PairOutcome { pair, result }
        })
        .collect()
}
