//! Raw lock-in measurements and their auxiliary telemetry

use serde::{Deserialize, Serialize};

/// Which demodulator a raw measurement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementKind {
    /// Demodulator 0: current through the sample (via the TIA)
    Current,
    /// Demodulator 1: voltage across the sample
    Voltage,
}

impl MeasurementKind {
    /// Lowercase label used in logs and error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Voltage => "voltage",
        }
    }
}

/// Auxiliary per-sample instrument telemetry.
///
/// Opaque pass-through block: stored for audit and debugging, never consumed
/// by the impedance derivation. Field names follow the instrument's own
/// naming verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct AuxTelemetry {
    pub auxin0: f64,
    pub auxin0pwr: f64,
    pub auxin0stddev: f64,
    pub auxin1: f64,
    pub auxin1pwr: f64,
    pub auxin1stddev: f64,
    pub bandwidth: f64,
    pub frequencypwr: f64,
    pub frequencystddev: f64,
    pub grid: f64,
    pub phasepwr: f64,
    pub phasestddev: f64,
    pub rpwr: f64,
    pub rstddev: f64,
    pub settling: f64,
    pub tc: f64,
    pub tcmeas: f64,
    pub xpwr: f64,
    pub xstddev: f64,
    pub ypwr: f64,
    pub ystddev: f64,
    pub count: f64,
    pub nexttimestamp: f64,
    pub settimestamp: f64,
}

/// One lock-in reading at a single stimulus frequency, as extracted from the
/// raw document before any identity is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockinSample {
    /// Stimulus frequency in Hz
    pub frequency: f64,
    /// In-phase component
    pub x: f64,
    /// Quadrature component
    pub y: f64,
    /// Magnitude
    pub r: f64,
    /// Phase in radians
    pub phase: f64,
    /// Pass-through diagnostics
    #[serde(flatten)]
    pub aux: AuxTelemetry,
}

/// One stored raw measurement row.
///
/// Tagged with its `(cycle_id, frequency_id)` composite key at normalization
/// time. The processor joins current and voltage rows on that key, so a
/// reordered table can never silently pair mismatched readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMeasurement {
    /// Owning cycle's id
    pub cycle_id: u64,
    /// Referenced frequency's id
    pub frequency_id: u64,
    /// Demodulator the reading came from
    pub kind: MeasurementKind,
    /// In-phase component
    pub x: f64,
    /// Quadrature component
    pub y: f64,
    /// Magnitude
    pub r: f64,
    /// Phase in radians
    pub phase: f64,
    /// Pass-through diagnostics
    #[serde(flatten)]
    pub aux: AuxTelemetry,
}

impl RawMeasurement {
    /// Build a stored row from an extracted sample and its composite key.
    #[must_use]
    pub fn from_sample(
        cycle_id: u64,
        frequency_id: u64,
        kind: MeasurementKind,
        sample: &LockinSample,
    ) -> Self {
        Self {
            cycle_id,
            frequency_id,
            kind,
            x: sample.x,
            y: sample.y,
            r: sample.r,
            phase: sample.phase,
            aux: sample.aux.clone(),
        }
    }
}
