//! Impedance Processor
//!
//! Derives 2-wire/4-wire impedance magnitude and phase for every
//! `(channel, cycle, frequency)` triple from the committed raw rows:
//!
//! ```text
//! phase_current = current_raw_phase + π                       (rad)
//! phase_4wire   = unwrap([voltage_phase - phase_current]) * 180/π
//! phase_2wire   = 0                                           (placeholder)
//! imp_2wire     = |amplitude/√2 * Rtia / (x + i·y)|
//! imp_4wire     = |voltage_r * Rtia / (x + i·y)|
//! ```
//!
//! Current and voltage rows are joined on their `(cycle, frequency)` key,
//! never on table position. A current reading with `x == 0 && y == 0` fails
//! the channel instead of storing an infinity; already committed raw rows
//! stay untouched, since raw ingestion and derivation are separate recovery
//! units. One channel's failure never aborts the others.

use std::f64::consts::{PI, TAU};

use num_complex::Complex64;
use tracing::{info, warn};

use crate::config::ProcessingConfig;
use crate::error::{Error, Result};
use crate::model::{MeasurementKind, ProcessedRecord};
use crate::store::MeasurementStore;

/// Phase unwrap over a sequence, matching `numpy.unwrap`: successive
/// differences outside (-π, π] are shifted by multiples of 2π.
///
/// The derivation feeds this a one-element sequence per triple, on which
/// unwrapping is a no-op. True unwrapping would need the phase series across
/// the sweep or across cycles; the single-element call reproduces the
/// upstream behavior and is pinned by tests so any correction is deliberate.
fn unwrap_phase(phases: &[f64]) -> Vec<f64> {
    let mut unwrapped = Vec::with_capacity(phases.len());
    let Some(&first) = phases.first() else {
        return unwrapped;
    };
    unwrapped.push(first);
    for window in phases.windows(2) {
        let mut delta = window[1] - window[0];
        while delta > PI {
            delta -= TAU;
        }
        while delta <= -PI {
            delta += TAU;
        }
        let prev = *unwrapped.last().unwrap_or(&first);
        unwrapped.push(prev + delta);
    }
    unwrapped
}

/// Outcome of one channel's derivation pass.
#[derive(Debug)]
pub struct ChannelOutcome {
    /// The channel the pass ran for
    pub channel_id: u64,
    /// Number of rows derived, or why the pass failed
    pub result: Result<usize>,
}

/// Derives the processed table from committed raw measurements.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImpedanceProcessor {
    config: ProcessingConfig,
}

impl ImpedanceProcessor {
    /// Create a processor with the given constants.
    #[must_use]
    pub const fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// The constants this processor derives with.
    #[must_use]
    pub const fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Recompute one channel's derived rows, replacing any previous set.
    ///
    /// # Errors
    ///
    /// * [`Error::UnknownChannel`] - no such channel id
    /// * [`Error::MissingMeasurement`] - a `(cycle, frequency, kind)` row the
    ///   sweep promises is absent
    /// * [`Error::DegenerateMeasurement`] - a current reading with
    ///   `x == 0 && y == 0`
    pub fn process_channel(
        &self,
        store: &mut MeasurementStore,
        channel_id: u64,
    ) -> Result<usize> {
        let channel = store
            .channel(channel_id)
            .ok_or(Error::UnknownChannel { channel_id })?;
        let experiment_name = channel.experiment_name().to_owned();
        let channel_name = channel.channel_name().to_owned();
        let file_name = channel.file_name().to_owned();
        let frequency_ids = store.sweep_frequency_ids(channel.sweep_id());

        let mut rows = Vec::new();
        for (cycle_id, cycle) in store.cycles_for_channel(channel_id) {
            let cycle_index = cycle.cycle_index();
            let timepoint = cycle.timepoint();

            for (position, &frequency_id) in frequency_ids.iter().enumerate() {
                let frequency = store
                    .frequency(frequency_id)
                    .map_or(f64::NAN, |f| f.value());
                let current = store
                    .measurement(cycle_id, frequency_id, MeasurementKind::Current)
                    .ok_or_else(|| Error::MissingMeasurement {
                        channel: file_name.clone(),
                        cycle_index,
                        kind: MeasurementKind::Current.label(),
                        position,
                    })?;
                let voltage = store
                    .measurement(cycle_id, frequency_id, MeasurementKind::Voltage)
                    .ok_or_else(|| Error::MissingMeasurement {
                        channel: file_name.clone(),
                        cycle_index,
                        kind: MeasurementKind::Voltage.label(),
                        position,
                    })?;

                rows.push(self.derive(
                    &experiment_name,
                    &channel_name,
                    &file_name,
                    cycle_index,
                    timepoint,
                    frequency,
                    current.x,
                    current.y,
                    current.phase,
                    voltage.r,
                    voltage.phase,
                )?);
            }
        }

        let derived = rows.len();
        store.replace_processed(channel_id, rows);
        info!(channel = %file_name, rows = derived, "derived processed rows");
        Ok(derived)
    }

    /// Run the derivation for every channel, isolating failures.
    ///
    /// Channels are processed in id order; a failed channel is reported in
    /// its outcome and the pass continues. The minimum recovery unit is one
    /// channel's full reprocessing.
    pub fn process_all(&self, store: &mut MeasurementStore) -> Vec<ChannelOutcome> {
        store
            .channel_ids()
            .into_iter()
            .map(|channel_id| {
                let result = self.process_channel(store, channel_id);
                if let Err(err) = &result {
                    warn!(channel_id, error = %err, "channel derivation failed, continuing");
                }
                ChannelOutcome { channel_id, result }
            })
            .collect()
    }

    /// Compute one processed row.
    #[allow(clippy::too_many_arguments)]
    fn derive(
        &self,
        experiment_name: &str,
        channel_name: &str,
        file_name: &str,
        cycle_index: u32,
        timepoint: f64,
        frequency: f64,
        current_x: f64,
        current_y: f64,
        current_raw_phase: f64,
        voltage_r: f64,
        voltage_phase: f64,
    ) -> Result<ProcessedRecord> {
        if current_x == 0.0 && current_y == 0.0 {
            return Err(Error::DegenerateMeasurement {
                channel: file_name.to_owned(),
                cycle_index,
                frequency,
            });
        }

        // sign convention: the TIA inverts, so current phase is shifted by π
        let phase_current = current_raw_phase + PI;
        let phase_4wire = unwrap_phase(&[voltage_phase - phase_current])[0].to_degrees();

        let denominator = Complex64::new(current_x, current_y);
        let rtia = self.config.rtia();
        let stimulus = self.config.amplitude() / 2.0_f64.sqrt();
        let imp_2wire = (Complex64::new(stimulus * rtia, 0.0) / denominator).norm();
        let imp_4wire = (Complex64::new(voltage_r * rtia, 0.0) / denominator).norm();

        Ok(ProcessedRecord {
            channel_name: channel_name.to_owned(),
            experiment_name: experiment_name.to_owned(),
            cycle_index,
            timepoint,
            frequency,
            imp_2wire,
            imp_4wire,
            phase_2wire: 0.0,
            phase_4wire,
            current_x,
            current_y,
            voltage_r,
            phase_voltage_4wire: voltage_phase,
            phase_current,
        })
    }
}
