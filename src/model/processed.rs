//! Processed Record - derived impedance and phase metrics

use serde::{Deserialize, Serialize};

/// Processed Record holds the derived metrics for one
/// `(channel, cycle, frequency)` triple.
///
/// The raw inputs used in the derivation (`current_x`, `current_y`,
/// `voltage_r`, the two phases) are kept alongside the results for
/// traceability. Rows are never mutated: recomputation replaces a channel's
/// whole derived set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    /// Channel label, for consumer-side filtering
    pub channel_name: String,
    /// Experiment label, for consumer-side filtering
    pub experiment_name: String,
    /// 1-based cycle index (x-axis ordering for the consumer)
    pub cycle_index: u32,
    /// Elapsed timepoint of the cycle
    pub timepoint: f64,
    /// Stimulus frequency in Hz
    pub frequency: f64,
    /// 2-wire impedance magnitude in ohms
    pub imp_2wire: f64,
    /// 4-wire impedance magnitude in ohms
    pub imp_4wire: f64,
    /// 2-wire phase in degrees (fixed 0.0: no 2-wire phase measurement exists)
    pub phase_2wire: f64,
    /// 4-wire phase in degrees
    pub phase_4wire: f64,
    /// Current-channel in-phase reading used in the derivation
    pub current_x: f64,
    /// Current-channel quadrature reading used in the derivation
    pub current_y: f64,
    /// Voltage-channel magnitude used in the derivation
    pub voltage_r: f64,
    /// Voltage-channel raw phase in radians
    pub phase_voltage_4wire: f64,
    /// Current phase after the +π sign convention, in radians
    pub phase_current: f64,
}
