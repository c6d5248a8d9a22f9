//! Public library API for grouping linked-read alignments into molecules.
//!
//! # Example
//!
//! ```
//! use molecule_rs::{find_molecules, LinkedAlignment, MoleculeConfig};
//!
//! let reads = vec![
//!     LinkedAlignment::mapped("AAACGG-1", 0, 100, 250),
//!     LinkedAlignment::mapped("AAACGG-1", 0, 200, 350),
//!     LinkedAlignment::mapped("AAACGG-1", 0, 260_000, 260_150),
//! ];
//! let mut config = MoleculeConfig::default();
//! config.segment.min_reads = 1;
//! config.segment.min_size = 0;
//!
//! let out = find_molecules(reads, &["chr1".to_string()], &config, false).unwrap();
//! assert_eq!(out.molecules.len(), 2);
//! ```

use crate::alignment::AlignmentRecord;
use crate::config::MoleculeConfig;
use crate::engine::{MoleculeEngine, MoleculeSink, Stats};
use crate::molecule::Molecule;
use crate::types::{MoleculeId, Pos, RefId};
use anyhow::Result;

/// An alignment held as plain data, for callers that do not read BAM through noodles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedAlignment {
    /// Index into the reference names passed alongside the alignments.
    pub reference_id: Option<RefId>,
    /// 0-based leftmost aligned position.
    pub position: Pos,
    /// 0-based exclusive alignment end.
    pub end: Pos,
    pub is_reverse: bool,
    pub is_unmapped: bool,
    pub is_supplementary: bool,
    /// 255 when unavailable.
    pub mapping_quality: u8,
    pub alignment_score: Option<i64>,
    pub mismatches: Option<i64>,
    pub barcode: Option<Vec<u8>>,
    pub query_length: usize,
    /// Set when the engine forwards this alignment with annotation enabled.
    pub molecule_id: Option<MoleculeId>,
}

impl LinkedAlignment {
    /// A forward-strand, MAPQ 60 alignment covering `[start, end)` with no `AS`/`NM` tags.
    pub fn mapped(barcode: &str, reference_id: RefId, start: Pos, end: Pos) -> Self {
        Self {
            reference_id: Some(reference_id),
            position: start,
            end,
            is_reverse: false,
            is_unmapped: false,
            is_supplementary: false,
            mapping_quality: 60,
            alignment_score: None,
            mismatches: None,
            barcode: Some(barcode.as_bytes().to_vec()),
            query_length: usize::try_from(end - start).unwrap_or(0),
            molecule_id: None,
        }
    }
}

impl AlignmentRecord for LinkedAlignment {
    fn is_unmapped(&self) -> bool {
        self.is_unmapped
    }

    fn is_supplementary(&self) -> bool {
        self.is_supplementary
    }

    fn is_reverse(&self) -> bool {
        self.is_reverse
    }

    fn reference_id(&self) -> Option<RefId> {
        self.reference_id
    }

    fn position(&self) -> Pos {
        self.position
    }

    fn alignment_end(&self) -> Pos {
        self.end
    }

    fn mapping_quality(&self) -> u8 {
        self.mapping_quality
    }

    fn alignment_score(&self) -> Option<i64> {
        self.alignment_score
    }

    fn mismatches(&self) -> Option<i64> {
        self.mismatches
    }

    fn barcode(&self) -> Option<&[u8]> {
        self.barcode.as_deref()
    }

    fn query_length(&self) -> usize {
        self.query_length
    }

    fn set_molecule_id(&mut self, id: MoleculeId) {
        self.molecule_id = Some(id);
    }
}

/// Sink that keeps everything in memory.
#[derive(Debug)]
pub struct CollectingSink<R> {
    pub molecules: Vec<Molecule>,
    pub alignments: Vec<R>,
}

impl<R> Default for CollectingSink<R> {
    fn default() -> Self {
        Self {
            molecules: Vec::new(),
            alignments: Vec::new(),
        }
    }
}

impl<R: AlignmentRecord> MoleculeSink for CollectingSink<R> {
    type Record = R;

    fn write_molecule(&mut self, molecule: &Molecule) -> Result<()> {
        self.molecules.push(molecule.clone());
        Ok(())
    }

    fn write_alignment(&mut self, record: R) -> Result<()> {
        self.alignments.push(record);
        Ok(())
    }
}

/// Everything produced by one pass of [`find_molecules`].
#[derive(Debug)]
pub struct Segmentation<R = LinkedAlignment> {
    pub molecules: Vec<Molecule>,
    /// Forwarded alignments in input order; empty unless annotation was requested.
    pub alignments: Vec<R>,
    pub stats: Stats,
}

/// Run the molecule engine over an in-memory, barcode-then-position sorted sequence.
///
/// `reference_names` is indexed by each alignment's reference id.
pub fn find_molecules<I, R>(
    records: I,
    reference_names: &[String],
    config: &MoleculeConfig,
    annotate: bool,
) -> Result<Segmentation<R>>
where
    I: IntoIterator<Item = R>,
    R: AlignmentRecord,
{
    let mut engine = MoleculeEngine::new(config, reference_names.to_vec(), annotate);
    let mut sink = CollectingSink::<R>::default();
    for record in records {
        engine.push(record, &mut sink)?;
    }
    engine.finish(&mut sink)?;
    Ok(Segmentation {
        molecules: sink.molecules,
        alignments: sink.alignments,
        stats: engine.into_stats(),
    })
}
