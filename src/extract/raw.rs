//! Serde model of the raw instrument dump
//!
//! Mirrors the nested structure the instrument writes:
//!
//! ```text
//! { "results": {
//!     "frequencies": [..],
//!     "cc": <declared cycle count>,
//!     "all": [ { "timePoint": t,
//!                "<device>": { "demods": [ {"sample": {..}}, {"sample": {..}} ] } }, .. ]
//! } }
//! ```
//!
//! The instrument's encoder collapses singleton arrays to scalars, so every
//! numeric column is decoded through [`Samples`], which accepts either
//! encoding and yields the same sequence deterministically.

use std::collections::BTreeMap;

use serde::Deserialize;

/// A numeric column that may arrive as a bare scalar or an array.
///
/// A scalar is treated as a one-element sequence; a singleton array and a
/// scalar are indistinguishable after decoding.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Samples {
    /// Squeezed single-value encoding
    Scalar(f64),
    /// Ordinary array encoding, one entry per sweep position
    Array(Vec<f64>),
}

impl Samples {
    /// Number of values in the column.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Array(values) => values.len(),
        }
    }

    /// Whether the column holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at sweep position `i`, if present.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<f64> {
        match self {
            Self::Scalar(value) => (i == 0).then_some(*value),
            Self::Array(values) => values.get(i).copied(),
        }
    }

    /// The column as an owned vector, regardless of encoding.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        match self {
            Self::Scalar(value) => vec![*value],
            Self::Array(values) => values.clone(),
        }
    }
}

impl Default for Samples {
    fn default() -> Self {
        Self::Array(Vec::new())
    }
}

/// A list that may arrive squeezed to a single element.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// Squeezed single-element encoding
    One(T),
    /// Ordinary array encoding
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Convert into an owned vector, regardless of encoding.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

/// Top-level instrument dump.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDocument {
    /// The results section; absence fails extraction
    pub results: Option<ResultsSection>,
}

/// The `results` section of a dump.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultsSection {
    /// Ordered frequency sweep shared by all cycles
    #[serde(default)]
    pub frequencies: Samples,
    /// Cycle count as declared by the instrument (`cc`)
    #[serde(default)]
    pub cc: Option<f64>,
    /// Per-cycle data blocks
    pub all: OneOrMany<CycleSection>,
}

/// One cycle's block within `results.all`.
///
/// Every key other than `timePoint` is a device section; the fixed layout
/// has exactly one device carrying two demodulators.
#[derive(Debug, Clone, Deserialize)]
pub struct CycleSection {
    /// Instrument-embedded timepoint marker (distinct from the timepoints file)
    #[serde(rename = "timePoint")]
    pub time_point: f64,
    /// Device sections keyed by device name (e.g. `dev1495`)
    #[serde(flatten)]
    pub devices: BTreeMap<String, DeviceSection>,
}

/// A device's block within a cycle.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceSection {
    /// Demodulator blocks: index 0 is current, index 1 is voltage
    #[serde(default)]
    pub demods: Vec<DemodSection>,
}

/// One demodulator's block.
#[derive(Debug, Clone, Deserialize)]
pub struct DemodSection {
    /// The per-frequency sample columns
    pub sample: SampleBlock,
}

/// Per-frequency sample columns of one demodulator.
///
/// Column names follow the instrument verbatim. A missing column decodes as
/// an empty sequence and is caught by the length check during extraction.
#[derive(Debug, Clone, Default, Deserialize)]
#[allow(missing_docs)]
pub struct SampleBlock {
    #[serde(default)]
    pub x: Samples,
    #[serde(default)]
    pub y: Samples,
    #[serde(default)]
    pub r: Samples,
    #[serde(default)]
    pub phase: Samples,
    #[serde(default)]
    pub auxin0: Samples,
    #[serde(default)]
    pub auxin0pwr: Samples,
    #[serde(default)]
    pub auxin0stddev: Samples,
    #[serde(default)]
    pub auxin1: Samples,
    #[serde(default)]
    pub auxin1pwr: Samples,
    #[serde(default)]
    pub auxin1stddev: Samples,
    #[serde(default)]
    pub bandwidth: Samples,
    #[serde(default)]
    pub frequencypwr: Samples,
    #[serde(default)]
    pub frequencystddev: Samples,
    #[serde(default)]
    pub grid: Samples,
    #[serde(default)]
    pub phasepwr: Samples,
    #[serde(default)]
    pub phasestddev: Samples,
    #[serde(default)]
    pub rpwr: Samples,
    #[serde(default)]
    pub rstddev: Samples,
    #[serde(default)]
    pub settling: Samples,
    #[serde(default)]
    pub tc: Samples,
    #[serde(default)]
    pub tcmeas: Samples,
    #[serde(default)]
    pub xpwr: Samples,
    #[serde(default)]
    pub xstddev: Samples,
    #[serde(default)]
    pub ypwr: Samples,
    #[serde(default)]
    pub ystddev: Samples,
    #[serde(default)]
    pub count: Samples,
    #[serde(default)]
    pub nexttimestamp: Samples,
    #[serde(default)]
    pub settimestamp: Samples,
}

impl SampleBlock {
    /// All columns with their instrument names, in schema order.
    #[must_use]
    pub fn columns(&self) -> [(&'static str, &Samples); 28] {
        [
            ("x", &self.x),
            ("y", &self.y),
            ("r", &self.r),
            ("phase", &self.phase),
            ("auxin0", &self.auxin0),
            ("auxin0pwr", &self.auxin0pwr),
            ("auxin0stddev", &self.auxin0stddev),
            ("auxin1", &self.auxin1),
            ("auxin1pwr", &self.auxin1pwr),
            ("auxin1stddev", &self.auxin1stddev),
            ("bandwidth", &self.bandwidth),
            ("frequencypwr", &self.frequencypwr),
            ("frequencystddev", &self.frequencystddev),
            ("grid", &self.grid),
            ("phasepwr", &self.phasepwr),
            ("phasestddev", &self.phasestddev),
            ("rpwr", &self.rpwr),
            ("rstddev", &self.rstddev),
            ("settling", &self.settling),
            ("tc", &self.tc),
            ("tcmeas", &self.tcmeas),
            ("xpwr", &self.xpwr),
            ("xstddev", &self.xstddev),
            ("ypwr", &self.ypwr),
            ("ystddev", &self.ystddev),
            ("count", &self.count),
            ("nexttimestamp", &self.nexttimestamp),
            ("settimestamp", &self.settimestamp),
        ]
    }
}
