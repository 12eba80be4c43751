//! Canonical measurement schema
//!
//! Relational entity set the normalizer produces and the processor consumes:
//!
//! ```text
//! ChannelRecord (1) ──< CycleRecord (N)
//!       │                    │
//!       │                    └──< RawMeasurement (N per kind) >── FrequencyRecord
//!       └──< ProcessedRecord (N) [derived, replaced wholesale]
//! ```
//!
//! `ChannelRecord`, `CycleRecord` and `FrequencyRecord` are identity-bearing
//! rows owned by the store. `RawMeasurement` carries the instrument's full
//! per-sample telemetry; everything beyond `x`/`y`/`r`/`phase` is opaque
//! pass-through kept for audit. `ProcessedRecord` is the derived view read
//! by the visualization consumer.

mod channel;
mod cycle;
mod frequency;
mod measurement;
mod processed;

pub use channel::ChannelRecord;
pub use cycle::CycleRecord;
pub use frequency::FrequencyRecord;
pub use measurement::{AuxTelemetry, LockinSample, MeasurementKind, RawMeasurement};
pub use processed::ProcessedRecord;
