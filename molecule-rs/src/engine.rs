//! Single-pass molecule engine.
//!
//! Alignments arrive sorted by barcode, then position. Consecutive accepted alignments
//! that share a barcode and reference form a run; each run is split into segments at
//! gaps wider than the maximum distance, and segments that pass the read-count and size thresholds are
//! emitted as [`Molecule`]s with sequential ids.
//!
//! When annotation is enabled every alignment that survives the quality filter is
//! forwarded to the sink in input order, tagged with the id the engine will give the
//! next emitted molecule. Reads of an emitted segment carry that molecule's id; reads of
//! a dropped segment share the id of the next molecule emitted, which may belong to a
//! later run. Alignments without a barcode are forwarded untagged.

use crate::alignment::AlignmentRecord;
use crate::config::MoleculeConfig;
use crate::filter::{self, Rejection, Verdict};
use crate::molecule::Molecule;
use crate::segment::{self, ClosedSegment, SegmentState};
use crate::types::{MoleculeId, RefId};
use anyhow::{Context, Result};

/// Destination for everything the engine produces.
pub trait MoleculeSink {
    type Record: AlignmentRecord;

    fn write_molecule(&mut self, molecule: &Molecule) -> Result<()>;
    fn write_alignment(&mut self, record: Self::Record) -> Result<()>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stats {
    pub total_records: u64,
    pub unmapped_or_supplementary: u64,
    pub low_mapq: u64,
    pub too_many_mismatches: u64,
    pub low_alignment_score: u64,
    pub unbarcoded: u64,
    pub accepted: u64,
    pub runs: u64,
    pub segments: u64,
    pub molecules: u64,
    pub dropped_segments: u64,
    pub unsorted_positions: u64,
    pub unsorted_barcodes: u64,
}

impl Stats {
    fn reject(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::UnmappedOrSupplementary => self.unmapped_or_supplementary += 1,
            Rejection::LowMapq => self.low_mapq += 1,
            Rejection::TooManyMismatches => self.too_many_mismatches += 1,
            Rejection::LowAlignmentScore => self.low_alignment_score += 1,
        }
    }
}

#[derive(Debug)]
struct Run {
    barcode: Vec<u8>,
    reference_id: RefId,
    segment: SegmentState,
}

impl Run {
    fn is_same(&self, barcode: &[u8], reference_id: RefId) -> bool {
        self.reference_id == reference_id && self.barcode == barcode
    }
}

pub struct MoleculeEngine<'a> {
    config: &'a MoleculeConfig,
    reference_names: Vec<String>,
    annotate: bool,
    run: Option<Run>,
    next_id: MoleculeId,
    stats: Stats,
}

impl<'a> MoleculeEngine<'a> {
    /// `reference_names` is indexed by reference id. With `annotate` unset, alignments
    /// are never handed to the sink.
    pub fn new(config: &'a MoleculeConfig, reference_names: Vec<String>, annotate: bool) -> Self {
        Self {
            config,
            reference_names,
            annotate,
            run: None,
            next_id: 0,
            stats: Stats::default(),
        }
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn into_stats(self) -> Stats {
        self.stats
    }

    /// Id the next emitted molecule will receive.
    pub fn next_id(&self) -> MoleculeId {
        self.next_id
    }

    /// Consume one alignment.
    pub fn push<S: MoleculeSink>(&mut self, mut record: S::Record, sink: &mut S) -> Result<()> {
        self.stats.total_records += 1;
        let (barcode, reference_id) = match filter::check(&record, &self.config.filter) {
            Verdict::Accept {
                barcode,
                reference_id,
            } => (barcode, reference_id),
            Verdict::Unbarcoded => {
                self.stats.unbarcoded += 1;
                if self.annotate {
                    sink.write_alignment(record)?;
                }
                return Ok(());
            }
            Verdict::Reject(rejection) => {
                self.stats.reject(rejection);
                return Ok(());
            }
        };
        self.stats.accepted += 1;

        let run = match self.run.take() {
            Some(mut run) if run.is_same(barcode, reference_id) => {
                if record.position() < run.segment.prev_pos() {
                    self.stats.unsorted_positions += 1;
                    if self.stats.unsorted_positions == 1 {
                        tracing::warn!(
                            barcode = %String::from_utf8_lossy(barcode),
                            position = record.position(),
                            "alignments are not sorted by position within a barcode"
                        );
                    }
                }
                let max_dist = self.config.segment.max_dist;
                let (next, closed) = segment::step(run.segment, &record, max_dist);
                run.segment = next;
                if let Some(closed) = closed {
                    self.finish_segment(&run.barcode, run.reference_id, closed, sink)?;
                }
                run
            }
            previous => {
                if let Some(previous) = previous {
                    if previous.barcode.as_slice() > barcode {
                        self.stats.unsorted_barcodes += 1;
                        if self.stats.unsorted_barcodes == 1 {
                            tracing::warn!(
                                previous = %String::from_utf8_lossy(&previous.barcode),
                                barcode = %String::from_utf8_lossy(barcode),
                                "alignments are not sorted by barcode"
                            );
                        }
                    }
                    self.close_run(previous, sink)?;
                }
                self.stats.runs += 1;
                Run {
                    barcode: barcode.to_vec(),
                    reference_id,
                    segment: SegmentState::open(&record),
                }
            }
        };
        self.run = Some(run);

        if self.annotate {
            record.set_molecule_id(self.next_id);
            sink.write_alignment(record)?;
        }
        Ok(())
    }

    /// Flush the open run at end of input.
    pub fn finish<S: MoleculeSink>(&mut self, sink: &mut S) -> Result<()> {
        if let Some(run) = self.run.take() {
            self.close_run(run, sink)?;
        }
        Ok(())
    }

    fn close_run<S: MoleculeSink>(&mut self, run: Run, sink: &mut S) -> Result<()> {
        let Run {
            barcode,
            reference_id,
            segment,
        } = run;
        self.finish_segment(&barcode, reference_id, segment.close(), sink)
    }

    /// Emit `closed` if it passes the thresholds. Ids advance only on emission.
    fn finish_segment<S: MoleculeSink>(
        &mut self,
        barcode: &[u8],
        reference_id: RefId,
        closed: ClosedSegment,
        sink: &mut S,
    ) -> Result<()> {
        self.stats.segments += 1;
        let thresholds = &self.config.segment;
        if closed.reads < thresholds.min_reads
            || closed.end <= closed.start
            || closed.size() < thresholds.min_size
        {
            self.stats.dropped_segments += 1;
            return Ok(());
        }

        let reference_name = self
            .reference_names
            .get(reference_id)
            .with_context(|| format!("reference id {reference_id} is not in the header"))?
            .clone();
        let molecule = Molecule {
            reference_name,
            start: closed.start,
            end: closed.end,
            barcode: String::from_utf8_lossy(barcode).into_owned(),
            id: self.next_id,
            reads: closed.reads,
            mapq_median: closed.mapq_median,
            as_median: closed.as_median,
            nm_median: closed.nm_median,
        };
        tracing::trace!(
            id = molecule.id,
            reference = %molecule.reference_name,
            start = molecule.start,
            end = molecule.end,
            reads = molecule.reads,
            "molecule"
        );
        sink.write_molecule(&molecule)?;
        self.stats.molecules += 1;
        self.next_id = self
            .next_id
            .checked_add(1)
            .context("molecule id counter overflowed")?;
        Ok(())
    }
}
