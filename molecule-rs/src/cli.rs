use anyhow::Result;
use clap::Parser;
use molecule_rs::config::{self, FilterConfig, MoleculeConfig, SegmentConfig};
use molecule_rs::OutputFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "molecule-rs",
    about = "Group linked reads into molecules. \
             Reads a BAM file sorted by BX tag and then by position and writes a BED or TSV table.",
    version
)]
pub struct Args {
    /// Input BAM sorted by BX tag then position, - for stdin
    #[arg(value_name = "BAM")]
    pub in_bam: PathBuf,

    /// Output molecule table [stdout]
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output BAM file with MI tags (optional)
    #[arg(short = 'w', long = "out-bam", value_name = "FILE")]
    pub out_bam: Option<PathBuf>,

    /// Output in BED format [default]
    #[arg(long, conflicts_with = "tsv")]
    pub bed: bool,

    /// Output in TSV format
    #[arg(long)]
    pub tsv: bool,

    /// Maximum distance between reads in the same molecule
    #[arg(short = 'd', long = "dist", value_name = "N", default_value_t = 50_000)]
    pub max_dist: i64,

    /// Minimum number of reads per molecule (duplicates are filtered out)
    #[arg(short = 'm', long = "reads", value_name = "N", default_value_t = 4)]
    pub min_reads: u32,

    /// Minimum mapping quality
    #[arg(short = 'q', long = "mapq", value_name = "N", default_value_t = 0)]
    pub min_mapq: u8,

    /// Minimum ratio of alignment score (AS) over read length
    #[arg(short = 'a', long = "as-ratio", value_name = "N", default_value_t = 0.65)]
    pub min_as_ratio: f64,

    /// Maximum number of mismatches (NM)
    #[arg(short = 'n', long = "nm", value_name = "N", default_value_t = 5)]
    pub max_nm: i64,

    /// Minimum molecule size
    #[arg(short = 's', long = "size", value_name = "N", default_value_t = 2000)]
    pub min_size: i64,

    /// Parameter file providing the calculated maximum distance (overrides --dist)
    #[arg(short = 'p', long = "params", value_name = "FILE")]
    pub param_file: Option<PathBuf>,

    /// Set logging level to WARN
    #[arg(long)]
    pub quiet: bool,
}

impl Args {
    pub fn output_format(&self) -> OutputFormat {
        if self.tsv {
            OutputFormat::Tsv
        } else {
            OutputFormat::Bed
        }
    }

    /// Resolve the engine configuration, reading the parameter file if one was given.
    pub fn molecule_config(&self) -> Result<MoleculeConfig> {
        let max_dist = match &self.param_file {
            Some(path) => {
                let dist = config::read_param_dist(path)?;
                tracing::info!(path = %path.display(), max_dist = dist, "max_dist read from parameter file");
                dist
            }
            None => self.max_dist,
        };
        Ok(MoleculeConfig {
            filter: FilterConfig {
                min_mapq: self.min_mapq,
                max_mismatches: self.max_nm,
                min_as_ratio: self.min_as_ratio,
            },
            segment: SegmentConfig {
                max_dist,
                min_reads: self.min_reads,
                min_size: self.min_size,
            },
        })
    }
}
