use crate::types::{MoleculeId, Pos};
use std::io::{self, Write};

/// Header line of the detail (TSV) molecule table.
pub const TSV_HEADER: &str =
    "Rname\tStart\tEnd\tSize\tBX\tMI\tReads\tMapq_median\tAS_median\tNM_median";

/// Marker printed for a median with no samples.
pub const UNAVAILABLE: &str = "NA";

/// One inferred DNA molecule: a same-barcode interval on a single reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    pub reference_name: String,
    /// 0-based, inclusive.
    pub start: Pos,
    /// 0-based, exclusive: the alignment end of the last read in the molecule.
    pub end: Pos,
    pub barcode: String,
    pub id: MoleculeId,
    pub reads: u32,
    pub mapq_median: f64,
    pub as_median: Option<f64>,
    pub nm_median: Option<f64>,
}

impl Molecule {
    pub fn size(&self) -> Pos {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `rname start end barcode reads`
    #[default]
    Bed,
    /// Every field plus size, id and medians, preceded by [`TSV_HEADER`].
    Tsv,
}

impl OutputFormat {
    pub fn header(self) -> Option<&'static str> {
        match self {
            OutputFormat::Bed => None,
            OutputFormat::Tsv => Some(TSV_HEADER),
        }
    }

    pub fn format(self, molecule: &Molecule) -> String {
        match self {
            OutputFormat::Bed => format_bed(molecule),
            OutputFormat::Tsv => format_tsv(molecule),
        }
    }
}

pub fn format_bed(m: &Molecule) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        m.reference_name, m.start, m.end, m.barcode, m.reads
    )
}

pub fn format_tsv(m: &Molecule) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        m.reference_name,
        m.start,
        m.end,
        m.size(),
        m.barcode,
        m.id,
        m.reads,
        m.mapq_median,
        format_median(m.as_median),
        format_median(m.nm_median)
    )
}

/// Whole medians print without a fraction, so `35.0` is written as `35`.
pub fn format_median(median: Option<f64>) -> String {
    match median {
        Some(value) => value.to_string(),
        None => UNAVAILABLE.to_string(),
    }
}

/// Writes molecules in one format, emitting the header before the first line.
pub struct MoleculeWriter<W: Write> {
    inner: W,
    format: OutputFormat,
}

impl<W: Write> MoleculeWriter<W> {
    pub fn new(mut inner: W, format: OutputFormat) -> io::Result<Self> {
        if let Some(header) = format.header() {
            writeln!(inner, "{header}")?;
        }
        Ok(Self { inner, format })
    }

    pub fn write(&mut self, molecule: &Molecule) -> io::Result<()> {
        writeln!(self.inner, "{}", self.format.format(molecule))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
