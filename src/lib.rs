//! # teer-db: lock-in measurement ingestion and impedance derivation
//!
//! teer-db turns raw lock-in-amplifier dumps from an impedance-spectroscopy
//! instrument into a relational measurement model and derives per-cycle,
//! per-frequency impedance and phase metrics for visualization.
//!
//! ## Pipeline
//!
//! ```text
//! raw dump + timepoints ──> extract ──> ingest (normalize + commit) ──> store
//!                                                                        │
//!                               visualization consumer <── process ──────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use teer_db::extract::Extraction;
//! use teer_db::ingest;
//! use teer_db::process::ImpedanceProcessor;
//! use teer_db::store::MeasurementStore;
//!
//! # fn run(dump_json: &str) -> teer_db::Result<()> {
//! let extraction = Extraction::from_json(dump_json)?;
//! let mut store = MeasurementStore::new();
//! ingest::ingest_channel(&mut store, extraction, "exp24", "A3", &[0.0, 60.0])?;
//!
//! let processor = ImpedanceProcessor::default();
//! for outcome in processor.process_all(&mut store) {
//!     outcome.result?;
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod model;
pub mod process;
pub mod store;

pub use config::ProcessingConfig;
pub use error::{Error, Result};
