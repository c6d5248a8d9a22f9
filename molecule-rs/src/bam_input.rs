use anyhow::{Context, Result};
use noodles::{bam, sam};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

pub struct BamInput<R> {
    pub header: sam::Header,
    /// Reference sequence names indexed by reference id.
    pub reference_names: Vec<String>,
    pub reader: bam::io::Reader<R>,
}

/// Open a BAM file, or standard input when `path` is `-`, and read its header.
pub fn open_bam(path: &Path) -> Result<BamInput<impl Read>> {
    let inner: Box<dyn Read> = if path == Path::new("-") {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(path)
            .with_context(|| format!("failed to open BAM {}", path.display()))?;
        Box::new(file)
    };
    let mut reader = bam::io::Reader::new(inner);
    let header = reader
        .read_header()
        .with_context(|| format!("failed to read BAM header from {}", path.display()))?;
    let reference_names = header
        .reference_sequences()
        .keys()
        .map(|name| name.to_string())
        .collect();
    Ok(BamInput {
        header,
        reference_names,
        reader,
    })
}
