use crate::bam_input::BamInput;
use crate::cli::Args;
use anyhow::{Context, Result};
use molecule_rs::{Molecule, MoleculeConfig, MoleculeEngine, MoleculeSink, MoleculeWriter, Stats};
use noodles::{bam, sam};
use sam::alignment::io::Write as _;
use sam::alignment::RecordBuf;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};

const PROGRESS_INTERVAL: u64 = 10_000_000;

/// Molecule table plus the optional annotated BAM.
struct OutputSink<'h> {
    molecules: MoleculeWriter<Box<dyn Write>>,
    annotated: Option<Box<dyn sam::alignment::io::Write>>,
    header: &'h sam::Header,
}

impl MoleculeSink for OutputSink<'_> {
    type Record = RecordBuf;

    fn write_molecule(&mut self, molecule: &Molecule) -> Result<()> {
        self.molecules
            .write(molecule)
            .context("failed to write molecule")
    }

    fn write_alignment(&mut self, record: RecordBuf) -> Result<()> {
        if let Some(writer) = self.annotated.as_mut() {
            writer
                .write_alignment_record(self.header, &record)
                .context("failed to write annotated alignment")?;
        }
        Ok(())
    }
}

pub fn run<R: Read>(
    args: &Args,
    config: &MoleculeConfig,
    bam: &mut BamInput<R>,
) -> Result<Stats> {
    let out: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let molecules = MoleculeWriter::new(out, args.output_format())?;

    let annotated: Option<Box<dyn sam::alignment::io::Write>> = match &args.out_bam {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = bam::io::Writer::new(file);
            writer.write_alignment_header(&bam.header)?;
            Some(Box::new(writer))
        }
        None => None,
    };

    let mut engine = MoleculeEngine::new(config, bam.reference_names.clone(), annotated.is_some());
    let mut sink = OutputSink {
        molecules,
        annotated,
        header: &bam.header,
    };

    for result in bam.reader.record_bufs(&bam.header) {
        let record = result.context("failed to read BAM record")?;
        engine.push(record, &mut sink)?;
        let seen = engine.stats().total_records;
        if seen % PROGRESS_INTERVAL == 0 {
            tracing::debug!(
                records = seen,
                molecules = engine.stats().molecules,
                "progress"
            );
        }
    }
    engine.finish(&mut sink)?;

    sink.molecules.flush()?;
    if let Some(writer) = sink.annotated.as_mut() {
        writer.finish(&bam.header)?;
    }

    Ok(engine.into_stats())
}
