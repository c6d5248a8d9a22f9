//! molecule-rs: group barcoded linked-read alignments into molecules.
//!
//! Alignments sorted by barcode (`BX`) then position are consumed in a single pass.
//! Runs of alignments sharing a barcode and reference are split wherever the gap
//! between consecutive reads exceeds a maximum distance; each piece with enough
//! reads and span becomes a [`Molecule`].
//!
//! # Library usage
//!
//! ```no_run
//! use molecule_rs::{MoleculeConfig, MoleculeEngine, api::CollectingSink};
//! use noodles::sam::alignment::RecordBuf;
//!
//! // let reference_names: Vec<String> = /* from the BAM header */;
//! // let records: Vec<RecordBuf> = /* sorted by BX, then position */;
//! //
//! // let config = MoleculeConfig::default();
//! // let mut engine = MoleculeEngine::new(&config, reference_names, true);
//! // let mut sink = CollectingSink::<RecordBuf>::default();
//! // for record in records {
//! //     engine.push(record, &mut sink)?;
//! // }
//! // engine.finish(&mut sink)?;
//! ```

// Internal modules — not part of the public API.
pub(crate) mod filter;
pub(crate) mod median;
pub(crate) mod segment;
pub(crate) mod types;

// Public modules — stable API surface.
pub mod alignment;
pub mod api;
pub mod config;
pub mod engine;
pub mod molecule;

// Flat re-exports for the most commonly used public types.
pub use alignment::AlignmentRecord;
pub use api::{find_molecules, LinkedAlignment, Segmentation};
pub use config::{FilterConfig, MoleculeConfig, SegmentConfig};
pub use engine::{MoleculeEngine, MoleculeSink, Stats};
pub use molecule::{Molecule, MoleculeWriter, OutputFormat};
