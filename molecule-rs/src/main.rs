mod bam_input;
mod cli;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use mimalloc::MiMalloc;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    // Initialize tracing subscriber
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            if args.quiet {
                EnvFilter::new("warn")
            } else {
                EnvFilter::new("info")
            }
        });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = args.molecule_config()?;
    tracing::info!(
        max_dist = config.segment.max_dist,
        min_reads = config.segment.min_reads,
        min_size = config.segment.min_size,
        min_mapq = config.filter.min_mapq,
        max_nm = config.filter.max_mismatches,
        min_as_ratio = config.filter.min_as_ratio,
        "molecule-rs: configuration"
    );

    let mut bam = bam_input::open_bam(&args.in_bam)?;
    let stats = pipeline::run(&args, &config, &mut bam)?;
    tracing::info!(
        total_records = stats.total_records,
        accepted = stats.accepted,
        unmapped_or_supplementary = stats.unmapped_or_supplementary,
        low_mapq = stats.low_mapq,
        too_many_mismatches = stats.too_many_mismatches,
        low_alignment_score = stats.low_alignment_score,
        unbarcoded = stats.unbarcoded,
        runs = stats.runs,
        segments = stats.segments,
        molecules = stats.molecules,
        dropped_segments = stats.dropped_segments,
        "molecule-rs: processing complete"
    );
    if stats.unsorted_positions > 0 || stats.unsorted_barcodes > 0 {
        tracing::warn!(
            unsorted_positions = stats.unsorted_positions,
            unsorted_barcodes = stats.unsorted_barcodes,
            "input is not sorted by barcode then position; molecules may be fragmented"
        );
    }
    Ok(())
}
