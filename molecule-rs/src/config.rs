use crate::types::Pos;
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Prefix of the parameter-file line that carries the computed maximum distance.
pub const PARAM_DIST_PREFIX: &str = "read_p";

/// Thresholds applied to each alignment before it may join a molecule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    pub min_mapq: u8,
    /// Alignments with `NM >= max_mismatches` are rejected.
    pub max_mismatches: i64,
    /// Alignments with `AS < min_as_ratio * query_length` are rejected.
    pub min_as_ratio: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_mapq: 0,
            max_mismatches: 5,
            min_as_ratio: 0.65,
        }
    }
}

/// Parameters of the gap-based molecule segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentConfig {
    /// A same-barcode gap strictly larger than this starts a new molecule.
    pub max_dist: Pos,
    pub min_reads: u32,
    pub min_size: Pos,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            max_dist: 50_000,
            min_reads: 4,
            min_size: 2000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoleculeConfig {
    pub filter: FilterConfig,
    pub segment: SegmentConfig,
}

/// Read the maximum molecule gap from a tab-separated parameter file.
///
/// The value is taken from the first line whose first field starts with
/// [`PARAM_DIST_PREFIX`]; its second field must be an integer.
pub fn read_param_dist(path: &Path) -> Result<Pos> {
    let file = File::open(path)
        .with_context(|| format!("parameter file '{}' cannot be read", path.display()))?;
    for line in BufReader::new(file).lines() {
        let line = line
            .with_context(|| format!("parameter file '{}' cannot be read", path.display()))?;
        let mut fields = line.trim().split('\t');
        let Some(key) = fields.next() else { continue };
        if !key.starts_with(PARAM_DIST_PREFIX) {
            continue;
        }
        let value = fields.next().with_context(|| {
            format!("parameter '{key}' in '{}' has no value", path.display())
        })?;
        return value.trim().parse::<Pos>().with_context(|| {
            format!(
                "parameter '{key}' in '{}' is not an integer: '{value}'",
                path.display()
            )
        });
    }
    bail!(
        "calculated max_dist parameter not found in parameter file '{}'",
        path.display()
    )
}
