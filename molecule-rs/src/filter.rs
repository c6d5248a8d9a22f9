use crate::alignment::AlignmentRecord;
use crate::config::FilterConfig;
use crate::types::RefId;

/// Why an alignment was dropped before reaching the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    UnmappedOrSupplementary,
    LowMapq,
    TooManyMismatches,
    LowAlignmentScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict<'r> {
    /// Eligible for run membership.
    Accept { barcode: &'r [u8], reference_id: RefId },
    /// Passed the quality checks but carries no barcode.
    Unbarcoded,
    Reject(Rejection),
}

/// Classify one alignment. Checks run in order and the first failing one wins.
pub fn check<'r, R: AlignmentRecord>(record: &'r R, config: &FilterConfig) -> Verdict<'r> {
    let reference_id = match record.reference_id() {
        Some(id) if !record.is_unmapped() && !record.is_supplementary() => id,
        _ => return Verdict::Reject(Rejection::UnmappedOrSupplementary),
    };
    if record.mapping_quality() < config.min_mapq {
        return Verdict::Reject(Rejection::LowMapq);
    }
    if record
        .mismatches()
        .is_some_and(|nm| nm >= config.max_mismatches)
    {
        return Verdict::Reject(Rejection::TooManyMismatches);
    }
    if record
        .alignment_score()
        .is_some_and(|score| (score as f64) < config.min_as_ratio * record.query_length() as f64)
    {
        return Verdict::Reject(Rejection::LowAlignmentScore);
    }
    match record.barcode() {
        Some(barcode) => Verdict::Accept {
            barcode,
            reference_id,
        },
        None => Verdict::Unbarcoded,
    }
}
