//! Gap-based splitting of one barcode/reference run into molecule segments.
//!
//! A run is consumed one read at a time. A read whose distance to the previous read
//! exceeds `max_dist` closes the open segment and opens a new one. Reads are counted
//! by strand-specific inter-arrival time, so a read at the same position as the
//! previous read of its strand joins the segment without adding to its read count.

use crate::alignment::{AlignmentRecord, Strand};
use crate::median::MedianAccumulator;
use crate::types::Pos;

/// State of the segment currently being extended.
#[derive(Debug, Clone)]
pub struct SegmentState {
    start: Pos,
    end: Pos,
    prev_pos: Pos,
    prev_forward: Option<Pos>,
    prev_reverse: Option<Pos>,
    reads: u32,
    mapq: MedianAccumulator,
    scores: MedianAccumulator,
    mismatches: MedianAccumulator,
}

/// A finished segment, before the read-count and size thresholds are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedSegment {
    pub start: Pos,
    pub end: Pos,
    pub reads: u32,
    pub mapq_median: f64,
    pub as_median: Option<f64>,
    pub nm_median: Option<f64>,
}

impl ClosedSegment {
    pub fn size(&self) -> Pos {
        self.end - self.start
    }
}

impl SegmentState {
    /// Open a segment at `read`. The opening read counts as the segment's first read.
    pub fn open<R: AlignmentRecord>(read: &R) -> Self {
        let pos = read.position();
        let (prev_forward, prev_reverse) = match read.strand() {
            Strand::Forward => (Some(pos), None),
            Strand::Reverse => (None, Some(pos)),
        };
        let mut mapq = MedianAccumulator::new();
        mapq.push(i64::from(read.mapping_quality()));
        Self {
            start: pos,
            end: read.alignment_end(),
            prev_pos: pos,
            prev_forward,
            prev_reverse,
            reads: 1,
            mapq,
            scores: MedianAccumulator::seeded(read.alignment_score()),
            mismatches: MedianAccumulator::seeded(read.mismatches()),
        }
    }

    /// Position of the last read consumed, on either strand.
    pub fn prev_pos(&self) -> Pos {
        self.prev_pos
    }

    /// Gap from the previous read is strictly larger than `max_dist`.
    pub fn is_boundary<R: AlignmentRecord>(&self, read: &R, max_dist: Pos) -> bool {
        read.position() - self.prev_pos > max_dist
    }

    fn extend<R: AlignmentRecord>(&mut self, read: &R) {
        let pos = read.position();
        self.mapq.push(i64::from(read.mapping_quality()));
        self.scores.push_opt(read.alignment_score());
        self.mismatches.push_opt(read.mismatches());

        let prev_strand_pos = match read.strand() {
            Strand::Forward => &mut self.prev_forward,
            Strand::Reverse => &mut self.prev_reverse,
        };
        match prev_strand_pos.replace(pos) {
            None => self.reads += 1,
            Some(prev) if pos - prev > 0 => self.reads += 1,
            Some(_) => {}
        }
        self.prev_pos = pos;
        self.end = read.alignment_end();
    }

    /// Finalize the segment, ending it at the last consumed read.
    pub fn close(self) -> ClosedSegment {
        ClosedSegment {
            start: self.start,
            end: self.end,
            reads: self.reads,
            // Every segment holds at least the read that opened it.
            mapq_median: self.mapq.median().unwrap_or_default(),
            as_median: self.scores.median(),
            nm_median: self.mismatches.median(),
        }
    }
}

/// Consume one read of the current run.
///
/// Returns the state to continue with and, when `read` crosses a boundary, the segment
/// it closed. A boundary read is not counted twice: it only opens the new segment.
pub fn step<R: AlignmentRecord>(
    mut state: SegmentState,
    read: &R,
    max_dist: Pos,
) -> (SegmentState, Option<ClosedSegment>) {
    if state.is_boundary(read, max_dist) {
        return (SegmentState::open(read), Some(state.close()));
    }
    state.extend(read);
    (state, None)
}
