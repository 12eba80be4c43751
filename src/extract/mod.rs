//! Frequency/Cycle Extractor
//!
//! Flattens the nested instrument dump into the ordered frequency sweep and
//! per-cycle, per-frequency lock-in records. Pure transformation: nothing is
//! written anywhere, and numeric values pass through without reinterpretation.
//!
//! The positional contract starts here: each demodulator column must have
//! exactly one entry per sweep position, and the i-th entry of the current
//! and voltage lists belongs to the i-th frequency. Violations fail with
//! [`Error::MalformedCycle`] instead of producing short lists.

mod raw;

pub use raw::{
    CycleSection, DemodSection, DeviceSection, OneOrMany, RawDocument, ResultsSection, SampleBlock,
    Samples,
};

use std::io::Read;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{AuxTelemetry, LockinSample};

/// One cycle's flattened data.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleRaw {
    /// Instrument-embedded timepoint marker (not the timepoints-file value)
    pub timepoint_marker: f64,
    /// Current-demodulator records, one per sweep position
    pub current: Vec<LockinSample>,
    /// Voltage-demodulator records, one per sweep position
    pub voltage: Vec<LockinSample>,
}

/// Flattened instrument dump: the sweep plus all cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Ordered frequency sweep shared by every cycle
    pub frequencies: Vec<f64>,
    /// Cycles in document order
    pub cycles: Vec<CycleRaw>,
}

impl Extraction {
    /// Decode and flatten a dump from a reader.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] when the document cannot be decoded,
    /// [`Error::MissingSection`] or [`Error::MalformedCycle`] when it can but
    /// violates the expected shape.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let doc: RawDocument = serde_json::from_reader(reader)?;
        extract(doc)
    }

    /// Decode and flatten a dump from a JSON string.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Extraction::from_reader`].
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: RawDocument = serde_json::from_str(json)?;
        extract(doc)
    }
}

/// Flatten a decoded instrument document.
///
/// # Errors
///
/// * [`Error::MissingSection`] - no `results` section
/// * [`Error::MalformedCycle`] - a cycle lacks its device or demodulator
///   sections, or a sample column's length differs from the sweep
pub fn extract(doc: RawDocument) -> Result<Extraction> {
    let results = doc.results.ok_or_else(|| Error::MissingSection {
        section: "results".into(),
    })?;

    let frequencies = results.frequencies.to_vec();
    let cycle_sections = results.all.into_vec();

    if let Some(declared) = results.cc {
        // The instrument's own cycle count is advisory; the authoritative
        // count is the timepoints file, checked at normalization.
        #[allow(clippy::cast_precision_loss)]
        if declared != cycle_sections.len() as f64 {
            warn!(
                declared = declared,
                found = cycle_sections.len(),
                "declared cycle count differs from cycle blocks present"
            );
        }
    }

    let mut cycles = Vec::with_capacity(cycle_sections.len());
    for (idx, section) in cycle_sections.into_iter().enumerate() {
        let cycle_index = idx + 1;
        cycles.push(flatten_cycle(cycle_index, section, &frequencies)?);
    }

    debug!(
        frequencies = frequencies.len(),
        cycles = cycles.len(),
        "extracted instrument dump"
    );

    Ok(Extraction {
        frequencies,
        cycles,
    })
}

fn flatten_cycle(
    cycle_index: usize,
    section: CycleSection,
    frequencies: &[f64],
) -> Result<CycleRaw> {
    let (device_name, device) =
        section
            .devices
            .into_iter()
            .next()
            .ok_or_else(|| Error::MalformedCycle {
                cycle_index,
                reason: "no device section".into(),
            })?;

    if device.demods.len() < 2 {
        return Err(Error::MalformedCycle {
            cycle_index,
            reason: format!(
                "device '{device_name}' has {} demodulator sections, expected 2",
                device.demods.len()
            ),
        });
    }

    let mut demods = device.demods.into_iter();
    let current_block = demods.next().map(|d| d.sample).unwrap_or_default();
    let voltage_block = demods.next().map(|d| d.sample).unwrap_or_default();

    Ok(CycleRaw {
        timepoint_marker: section.time_point,
        current: flatten_sample(cycle_index, "current", &current_block, frequencies)?,
        voltage: flatten_sample(cycle_index, "voltage", &voltage_block, frequencies)?,
    })
}

/// Turn a demodulator's column block into one record per sweep position.
fn flatten_sample(
    cycle_index: usize,
    demod: &str,
    block: &SampleBlock,
    frequencies: &[f64],
) -> Result<Vec<LockinSample>> {
    let n = frequencies.len();
    for (name, column) in block.columns() {
        if column.len() != n {
            return Err(Error::MalformedCycle {
                cycle_index,
                reason: format!(
                    "{demod} column '{name}' has {} entries for {n} frequencies",
                    column.len()
                ),
            });
        }
    }

    let at = |samples: &Samples, i: usize| samples.get(i).unwrap_or_default();

    Ok((0..n)
        .map(|i| LockinSample {
            frequency: frequencies[i],
            x: at(&block.x, i),
            y: at(&block.y, i),
            r: at(&block.r, i),
            phase: at(&block.phase, i),
            aux: AuxTelemetry {
                auxin0: at(&block.auxin0, i),
                auxin0pwr: at(&block.auxin0pwr, i),
                auxin0stddev: at(&block.auxin0stddev, i),
                auxin1: at(&block.auxin1, i),
                auxin1pwr: at(&block.auxin1pwr, i),
                auxin1stddev: at(&block.auxin1stddev, i),
                bandwidth: at(&block.bandwidth, i),
                frequencypwr: at(&block.frequencypwr, i),
                frequencystddev: at(&block.frequencystddev, i),
                grid: at(&block.grid, i),
                phasepwr: at(&block.phasepwr, i),
                phasestddev: at(&block.phasestddev, i),
                rpwr: at(&block.rpwr, i),
                rstddev: at(&block.rstddev, i),
                settling: at(&block.settling, i),
                tc: at(&block.tc, i),
                tcmeas: at(&block.tcmeas, i),
                xpwr: at(&block.xpwr, i),
                xstddev: at(&block.xstddev, i),
                ypwr: at(&block.ypwr, i),
                ystddev: at(&block.ystddev, i),
                count: at(&block.count, i),
                nexttimestamp: at(&block.nexttimestamp, i),
                settimestamp: at(&block.settimestamp, i),
            },
        })
        .collect())
}
