//! Measurement Store - in-memory relational storage for the pipeline
//!
//! Tables mirror the relational schema: Channels, Cycles, Frequencies (owned
//! per sweep), raw measurements and the derived processed table. Lookups by
//! id are O(1); ordered reads sort by `cycle_index` and sweep position.
//!
//! ## Atomicity
//!
//! Raw ingestion for one channel is all-or-nothing: the normalizer builds a
//! [`ChannelBatch`] off-line and hands it to [`MeasurementStore::commit_channel`],
//! which validates everything before touching any table. A partially
//! ingested channel can therefore never become visible to the processor.
//!
//! ## Upsert semantics
//!
//! * Channel - insert-or-ignore keyed by `(experiment, channel)`; a conflict
//!   on `total_cycles` or on the sweep is an error, and re-ingestion of an
//!   already populated channel is refused outright (raw rows are the audit
//!   record, so neither silent duplication nor delete-and-reinsert is
//!   acceptable).
//! * Frequency - insert-or-ignore per `(sweep, value)`, exact float match.
//! * Cycle / RawMeasurement / ProcessedRecord - plain inserts; the processed
//!   set for a channel is only ever replaced wholesale.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

use tracing::info;

use crate::error::{Error, Result};
use crate::model::{
    ChannelRecord, CycleRecord, FrequencyRecord, LockinSample, MeasurementKind, ProcessedRecord,
    RawMeasurement,
};

/// One cycle staged for ingestion: a timepoint plus the two demodulator
/// record lists, one entry per sweep position.
#[derive(Debug, Clone)]
pub struct StagedCycle {
    /// Timepoint from the external timepoints file
    pub timepoint: f64,
    /// Current-demodulator records in sweep order
    pub current: Vec<LockinSample>,
    /// Voltage-demodulator records in sweep order
    pub voltage: Vec<LockinSample>,
}

/// Everything one channel contributes to the store, assembled before any
/// table is touched.
#[derive(Debug, Clone)]
pub struct ChannelBatch {
    /// Experiment label
    pub experiment_name: String,
    /// Channel label
    pub channel_name: String,
    /// The frequency sweep the channel was sampled with
    pub sweep: Vec<f64>,
    /// Cycles in `cycle_index` order (index 0 becomes cycle 1)
    pub cycles: Vec<StagedCycle>,
}

/// In-memory relational store for raw and derived measurement data.
#[derive(Debug, Default)]
pub struct MeasurementStore {
    channels: BTreeMap<u64, ChannelRecord>,
    cycles: BTreeMap<u64, CycleRecord>,
    frequencies: BTreeMap<u64, FrequencyRecord>,
    /// sweep fingerprint -> frequency ids in sweep order
    sweeps: HashMap<u64, Vec<u64>>,
    measurements: Vec<RawMeasurement>,
    processed: Vec<ProcessedRecord>,
    next_id: u64,
}

impl MeasurementStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the store holds no rows at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() && self.measurements.is_empty() && self.processed.is_empty()
    }

    /// Number of channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of cycles across all channels.
    #[must_use]
    pub fn cycle_count(&self) -> usize {
        self.cycles.len()
    }

    /// Number of raw measurement rows across all channels and kinds.
    #[must_use]
    pub fn measurement_count(&self) -> usize {
        self.measurements.len()
    }

    /// Number of processed rows.
    #[must_use]
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Fingerprint a sweep by the exact bit patterns of its values.
    ///
    /// Bit-exact hashing keeps sweeps from the same generator together while
    /// sweeps differing by float noise stay apart.
    #[must_use]
    pub fn sweep_fingerprint(sweep: &[f64]) -> u64 {
        let mut hasher = DefaultHasher::new();
        for value in sweep {
            value.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Commit one channel's batch atomically.
    ///
    /// Validates the whole batch, then inserts the channel row, its sweep's
    /// frequency rows (insert-or-ignore), all cycles and all raw
    /// measurements. On error, no table is modified.
    ///
    /// # Errors
    ///
    /// * [`Error::DuplicateChannel`] - `(experiment, channel)` already stored
    ///   with a different `total_cycles`, or already has raw rows
    /// * [`Error::FrequencyMismatch`] - the pair exists with another sweep
    /// * [`Error::MalformedCycle`] - a staged cycle's record lists differ in
    ///   length from the sweep
    pub fn commit_channel(&mut self, batch: ChannelBatch) -> Result<u64> {
        let sweep_id = Self::sweep_fingerprint(&batch.sweep);
        let n = batch.sweep.len();

        for (idx, cycle) in batch.cycles.iter().enumerate() {
            if cycle.current.len() != n || cycle.voltage.len() != n {
                return Err(Error::MalformedCycle {
                    cycle_index: idx + 1,
                    reason: format!(
                        "staged {}+{} records for a {n}-frequency sweep",
                        cycle.current.len(),
                        cycle.voltage.len()
                    ),
                });
            }
        }

        #[allow(clippy::cast_possible_truncation)]
        let total_cycles = batch.cycles.len() as u32;

        if let Some((_, existing)) = self.find_channel(&batch.experiment_name, &batch.channel_name)
        {
            if existing.sweep_id() != sweep_id {
                return Err(Error::FrequencyMismatch {
                    experiment: batch.experiment_name,
                    channel: batch.channel_name,
                });
            }
            let reason = if existing.total_cycles() == total_cycles {
                "channel already ingested; re-ingestion is rejected to keep raw rows unique"
            } else {
                "conflicting total_cycles for an existing channel"
            };
            // insert-or-ignore: the stored row, including total_cycles,
            // stays untouched either way
            return Err(Error::DuplicateChannel {
                experiment: batch.experiment_name,
                channel: batch.channel_name,
                reason: reason.into(),
            });
        }

        // validation done; from here every insert succeeds
        let frequency_ids = self.intern_sweep(sweep_id, &batch.sweep);

        let channel = ChannelRecord::new(
            batch.experiment_name.as_str(),
            batch.channel_name.as_str(),
            total_cycles,
            sweep_id,
        );
        let channel_id = self.allocate_id();
        self.channels.insert(channel_id, channel);

        for (idx, staged) in batch.cycles.into_iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let cycle_index = (idx + 1) as u32;
            let cycle_id = self.allocate_id();
            self.cycles.insert(
                cycle_id,
                CycleRecord::new(channel_id, cycle_index, staged.timepoint),
            );

            for (pos, sample) in staged.current.iter().enumerate() {
                self.measurements.push(RawMeasurement::from_sample(
                    cycle_id,
                    frequency_ids[pos],
                    MeasurementKind::Current,
                    sample,
                ));
            }
            for (pos, sample) in staged.voltage.iter().enumerate() {
                self.measurements.push(RawMeasurement::from_sample(
                    cycle_id,
                    frequency_ids[pos],
                    MeasurementKind::Voltage,
                    sample,
                ));
            }
        }

        info!(
            experiment = %batch.experiment_name,
            channel = %batch.channel_name,
            cycles = total_cycles,
            frequencies = n,
            "committed channel"
        );
        Ok(channel_id)
    }

    /// Insert-or-ignore the sweep's frequency rows, returning ids in sweep order.
    fn intern_sweep(&mut self, sweep_id: u64, sweep: &[f64]) -> Vec<u64> {
        if let Some(ids) = self.sweeps.get(&sweep_id) {
            return ids.clone();
        }
        let mut ids = Vec::with_capacity(sweep.len());
        for (position, &value) in sweep.iter().enumerate() {
            // exact-equality dedup within the sweep
            let existing = self
                .frequencies
                .iter()
                .find(|(_, f)| f.sweep_id() == sweep_id && f.value().to_bits() == value.to_bits())
                .map(|(id, _)| *id);
            let id = existing.unwrap_or_else(|| {
                let id = self.allocate_id();
                self.frequencies
                    .insert(id, FrequencyRecord::new(sweep_id, position, value));
                id
            });
            ids.push(id);
        }
        self.sweeps.insert(sweep_id, ids.clone());
        ids
    }

    /// Get a channel by id.
    #[must_use]
    pub fn channel(&self, channel_id: u64) -> Option<&ChannelRecord> {
        self.channels.get(&channel_id)
    }

    /// All channel ids in insertion order.
    #[must_use]
    pub fn channel_ids(&self) -> Vec<u64> {
        self.channels.keys().copied().collect()
    }

    /// Look up a channel by its `(experiment, channel)` identity.
    #[must_use]
    pub fn find_channel(&self, experiment: &str, channel: &str) -> Option<(u64, &ChannelRecord)> {
        self.channels
            .iter()
            .find(|(_, c)| c.experiment_name() == experiment && c.channel_name() == channel)
            .map(|(id, c)| (*id, c))
    }

    /// A channel's cycles ordered by `cycle_index`.
    #[must_use]
    pub fn cycles_for_channel(&self, channel_id: u64) -> Vec<(u64, &CycleRecord)> {
        let mut cycles: Vec<(u64, &CycleRecord)> = self
            .cycles
            .iter()
            .filter(|(_, c)| c.channel_id() == channel_id)
            .map(|(id, c)| (*id, c))
            .collect();
        cycles.sort_by_key(|(_, c)| c.cycle_index());
        cycles
    }

    /// A sweep's frequency ids in sweep order.
    #[must_use]
    pub fn sweep_frequency_ids(&self, sweep_id: u64) -> Vec<u64> {
        self.sweeps.get(&sweep_id).cloned().unwrap_or_default()
    }

    /// Get a frequency row by id.
    #[must_use]
    pub fn frequency(&self, frequency_id: u64) -> Option<&FrequencyRecord> {
        self.frequencies.get(&frequency_id)
    }

    /// Number of distinct frequency rows.
    #[must_use]
    pub fn frequency_count(&self) -> usize {
        self.frequencies.len()
    }

    /// The raw measurement for an exact `(cycle, frequency, kind)` key.
    #[must_use]
    pub fn measurement(
        &self,
        cycle_id: u64,
        frequency_id: u64,
        kind: MeasurementKind,
    ) -> Option<&RawMeasurement> {
        self.measurements.iter().find(|m| {
            m.cycle_id == cycle_id && m.frequency_id == frequency_id && m.kind == kind
        })
    }

    /// All raw measurements of one kind for a cycle, in sweep order.
    #[must_use]
    pub fn measurements_for_cycle(
        &self,
        cycle_id: u64,
        kind: MeasurementKind,
    ) -> Vec<&RawMeasurement> {
        let mut rows: Vec<&RawMeasurement> = self
            .measurements
            .iter()
            .filter(|m| m.cycle_id == cycle_id && m.kind == kind)
            .collect();
        rows.sort_by_key(|m| {
            self.frequencies
                .get(&m.frequency_id)
                .map_or(usize::MAX, FrequencyRecord::position)
        });
        rows
    }

    /// Replace a channel's derived rows wholesale.
    ///
    /// Removes any previous processed rows for the channel before appending
    /// the new set, so reprocessing can never leave a mixed generation.
    pub fn replace_processed(&mut self, channel_id: u64, rows: Vec<ProcessedRecord>) {
        if let Some(channel) = self.channels.get(&channel_id) {
            let experiment = channel.experiment_name().to_owned();
            let name = channel.channel_name().to_owned();
            self.processed
                .retain(|p| !(p.experiment_name == experiment && p.channel_name == name));
        }
        self.processed.extend(rows);
    }

    /// Processed rows filtered the way the visualization consumer queries
    /// them: by experiment, channel and frequency, any of which may be open.
    #[must_use]
    pub fn processed_rows(
        &self,
        experiment: Option<&str>,
        channel: Option<&str>,
        frequency: Option<f64>,
    ) -> Vec<&ProcessedRecord> {
        self.processed
            .iter()
            .filter(|p| experiment.map_or(true, |e| p.experiment_name == e))
            .filter(|p| channel.map_or(true, |c| p.channel_name == c))
            .filter(|p| frequency.map_or(true, |f| p.frequency.to_bits() == f.to_bits()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AuxTelemetry;

    fn sample(x: f64, y: f64, frequency: f64) -> LockinSample {
        LockinSample {
            frequency,
            x,
            y,
            r: x.hypot(y),
            phase: y.atan2(x),
            aux: AuxTelemetry::default(),
        }
    }

    fn batch(experiment: &str, channel: &str, timepoints: &[f64]) -> ChannelBatch {
        let sweep = vec![10.0, 100.0];
        let cycles = timepoints
            .iter()
            .map(|&t| StagedCycle {
                timepoint: t,
                current: sweep.iter().map(|&f| sample(1.0, 2.0, f)).collect(),
                voltage: sweep.iter().map(|&f| sample(3.0, 4.0, f)).collect(),
            })
            .collect();
        ChannelBatch {
            experiment_name: experiment.into(),
            channel_name: channel.into(),
            sweep,
            cycles,
        }
    }

    #[test]
    fn test_store_default() {
        let store = MeasurementStore::new();
        assert!(store.is_empty());
        assert_eq!(store.channel_count(), 0);
        assert_eq!(store.measurement_count(), 0);
    }

    #[test]
    fn test_commit_channel_populates_tables() {
        let mut store = MeasurementStore::new();
        let id = store
            .commit_channel(batch("exp", "A1", &[0.0, 60.0]))
            .expect("commit failed");

        assert_eq!(store.channel_count(), 1);
        assert_eq!(store.cycle_count(), 2);
        assert_eq!(store.frequency_count(), 2);
        // 2 cycles x 2 frequencies x 2 kinds
        assert_eq!(store.measurement_count(), 8);

        let cycles = store.cycles_for_channel(id);
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].1.cycle_index(), 1);
        assert!((cycles[1].1.timepoint() - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reingestion_rejected_channel_row_untouched() {
        let mut store = MeasurementStore::new();
        store
            .commit_channel(batch("exp", "A1", &[0.0, 60.0]))
            .expect("commit failed");

        let err = store
            .commit_channel(batch("exp", "A1", &[0.0, 60.0]))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateChannel { .. }));

        // insert-or-ignore: total_cycles unchanged, no rows duplicated
        let (_, channel) = store.find_channel("exp", "A1").expect("channel missing");
        assert_eq!(channel.total_cycles(), 2);
        assert_eq!(store.cycle_count(), 2);
        assert_eq!(store.measurement_count(), 8);
    }

    #[test]
    fn test_conflicting_cycle_count_is_duplicate_channel() {
        let mut store = MeasurementStore::new();
        store
            .commit_channel(batch("exp", "A1", &[0.0, 60.0]))
            .expect("commit failed");
        let err = store
            .commit_channel(batch("exp", "A1", &[0.0, 60.0, 120.0]))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateChannel { .. }));
    }

    #[test]
    fn test_sweep_mismatch_detected() {
        let mut store = MeasurementStore::new();
        store
            .commit_channel(batch("exp", "A1", &[0.0]))
            .expect("commit failed");

        let mut conflicting = batch("exp", "A1", &[0.0]);
        conflicting.sweep[1] += 1e-9; // float noise
        for cycle in &mut conflicting.cycles {
            cycle.current[1].frequency = conflicting.sweep[1];
            cycle.voltage[1].frequency = conflicting.sweep[1];
        }
        let err = store.commit_channel(conflicting).unwrap_err();
        assert!(matches!(err, Error::FrequencyMismatch { .. }));
    }

    #[test]
    fn test_sweeps_shared_between_channels() {
        let mut store = MeasurementStore::new();
        store
            .commit_channel(batch("exp", "A1", &[0.0]))
            .expect("commit failed");
        store
            .commit_channel(batch("exp", "B2", &[0.0]))
            .expect("commit failed");
        // identical sweeps share frequency rows
        assert_eq!(store.frequency_count(), 2);
    }

    #[test]
    fn test_noisy_sweep_gets_own_rows() {
        let mut store = MeasurementStore::new();
        store
            .commit_channel(batch("exp", "A1", &[0.0]))
            .expect("commit failed");

        let mut noisy = batch("exp", "B2", &[0.0]);
        noisy.sweep[0] += 1e-12;
        store.commit_channel(noisy).expect("commit failed");
        // sweeps differing by float noise do not collide
        assert_eq!(store.frequency_count(), 4);
    }

    #[test]
    fn test_commit_is_atomic_on_malformed_cycle() {
        let mut store = MeasurementStore::new();
        let mut bad = batch("exp", "A1", &[0.0, 60.0]);
        bad.cycles[1].voltage.pop();
        let err = store.commit_channel(bad).unwrap_err();
        assert!(matches!(err, Error::MalformedCycle { cycle_index: 2, .. }));
        // nothing committed, not even cycle 1
        assert!(store.is_empty());
        assert_eq!(store.frequency_count(), 0);
    }

    #[test]
    fn test_replace_processed_is_wholesale() {
        let mut store = MeasurementStore::new();
        let id = store
            .commit_channel(batch("exp", "A1", &[0.0]))
            .expect("commit failed");

        let row = |imp: f64| ProcessedRecord {
            channel_name: "A1".into(),
            experiment_name: "exp".into(),
            cycle_index: 1,
            timepoint: 0.0,
            frequency: 10.0,
            imp_2wire: imp,
            imp_4wire: imp,
            phase_2wire: 0.0,
            phase_4wire: 0.0,
            current_x: 1.0,
            current_y: 2.0,
            voltage_r: 5.0,
            phase_voltage_4wire: 0.0,
            phase_current: 0.0,
        };

        store.replace_processed(id, vec![row(1.0), row(2.0)]);
        assert_eq!(store.processed_count(), 2);
        store.replace_processed(id, vec![row(3.0)]);
        assert_eq!(store.processed_count(), 1);
        assert!((store.processed_rows(None, None, None)[0].imp_2wire - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_processed_rows_filters() {
        let mut store = MeasurementStore::new();
        let id = store
            .commit_channel(batch("exp", "A1", &[0.0]))
            .expect("commit failed");
        let mut row = ProcessedRecord {
            channel_name: "A1".into(),
            experiment_name: "exp".into(),
            cycle_index: 1,
            timepoint: 0.0,
            frequency: 10.0,
            imp_2wire: 1.0,
            imp_4wire: 1.0,
            phase_2wire: 0.0,
            phase_4wire: 0.0,
            current_x: 1.0,
            current_y: 2.0,
            voltage_r: 5.0,
            phase_voltage_4wire: 0.0,
            phase_current: 0.0,
        };
        let first = row.clone();
        row.frequency = 100.0;
        store.replace_processed(id, vec![first, row]);

        assert_eq!(store.processed_rows(Some("exp"), None, None).len(), 2);
        assert_eq!(store.processed_rows(None, Some("A1"), Some(10.0)).len(), 1);
        assert!(store.processed_rows(Some("other"), None, None).is_empty());
    }
}
