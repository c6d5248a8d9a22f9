/// End-to-end tests running the molecule-rs binary on small BAMs written with noodles.
///
/// Inputs and outputs live in the system temp directory and are removed afterwards.
use noodles::core::Position;
use noodles::{bam, sam};
use sam::alignment::io::Write as _;
use sam::alignment::record::cigar::{op::Kind, Op};
use sam::alignment::record::data::field::Tag;
use sam::alignment::record::{Flags, MappingQuality};
use sam::alignment::record_buf::data::field::Value;
use sam::alignment::record_buf::{RecordBuf, Sequence};
use sam::header::record::value::{map::ReferenceSequence, Map};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::Write as _;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

// ── helpers ──────────────────────────────────────────────────────────────────

const READ_LEN: usize = 100;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("molecule_rs_it_{}_{name}", std::process::id()))
}

fn header() -> sam::Header {
    let length = NonZeroUsize::try_from(1_000_000).expect("nonzero length");
    sam::Header::builder()
        .add_reference_sequence("chr1", Map::<ReferenceSequence>::new(length))
        .build()
}

/// 100M alignment at 0-based `pos` with AS=95, NM=1, MAPQ 60.
fn record(barcode: Option<&str>, pos: usize) -> RecordBuf {
    let mut data: Vec<(Tag, Value)> = vec![
        (Tag::ALIGNMENT_SCORE, Value::from(95)),
        (Tag::EDIT_DISTANCE, Value::from(1)),
    ];
    if let Some(bx) = barcode {
        data.push((Tag::new(b'B', b'X'), Value::from(bx)));
    }
    RecordBuf::builder()
        .set_flags(Flags::empty())
        .set_reference_sequence_id(0)
        .set_alignment_start(Position::try_from(pos + 1).expect("1-based position"))
        .set_mapping_quality(MappingQuality::new(60).expect("valid mapq"))
        .set_cigar([Op::new(Kind::Match, READ_LEN)].into_iter().collect())
        .set_sequence(Sequence::from(vec![b'A'; READ_LEN]))
        .set_data(data.into_iter().collect())
        .build()
}

fn write_bam(path: &Path, records: &[RecordBuf]) {
    let header = header();
    let mut writer = bam::io::Writer::new(File::create(path).expect("create BAM"));
    writer.write_alignment_header(&header).expect("write header");
    for rec in records {
        writer
            .write_alignment_record(&header, rec)
            .expect("write record");
    }
    writer.finish(&header).expect("finish BAM");
}

fn read_bam(path: &Path) -> Vec<RecordBuf> {
    let mut reader = bam::io::reader::Builder
        .build_from_path(path)
        .expect("open BAM");
    let header = reader.read_header().expect("read header");
    reader
        .record_bufs(&header)
        .collect::<Result<Vec<_>, _>>()
        .expect("read records")
}

fn molecule_id(record: &RecordBuf) -> Option<i64> {
    match record.data().get(&Tag::new(b'M', b'I'))? {
        Value::Int8(n) => Some(i64::from(*n)),
        Value::UInt8(n) => Some(i64::from(*n)),
        Value::Int16(n) => Some(i64::from(*n)),
        Value::UInt16(n) => Some(i64::from(*n)),
        Value::Int32(n) => Some(i64::from(*n)),
        Value::UInt32(n) => Some(i64::from(*n)),
        _ => None,
    }
}

fn run_binary(args: &[&OsStr]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_molecule-rs"))
        .args(args)
        .arg("--quiet")
        .output()
        .expect("failed to spawn molecule-rs")
}

// ── tests ─────────────────────────────────────────────────────────────────────

/// TSV table on stdout plus an annotated BAM with MI tags.
#[test]
fn tsv_output_and_annotated_bam() {
    let input = temp_path("tsv_in.bam");
    let annotated = temp_path("tsv_out.bam");
    write_bam(
        &input,
        &[
            record(None, 500),
            record(Some("AAAC-1"), 1000),
            record(Some("AAAC-1"), 1500),
            record(Some("AAAC-1"), 2500),
            record(Some("AAAC-1"), 3500),
            record(Some("AAAG-1"), 1000),
        ],
    );

    let output = run_binary(&[
        input.as_os_str(),
        OsStr::new("--tsv"),
        OsStr::new("-w"),
        annotated.as_os_str(),
    ]);
    assert!(output.status.success(), "molecule-rs failed: {output:?}");

    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Rname\tStart\tEnd\tSize\tBX\tMI\tReads\tMapq_median\tAS_median\tNM_median",
            "chr1\t1000\t3600\t2600\tAAAC-1\t0\t4\t60\t95\t1",
        ]
    );

    let records = read_bam(&annotated);
    let ids: Vec<Option<i64>> = records.iter().map(molecule_id).collect();
    assert_eq!(ids, vec![None, Some(0), Some(0), Some(0), Some(0), Some(1)]);

    let _ = fs::remove_file(&input);
    let _ = fs::remove_file(&annotated);
}

/// BED output to a file, with the maximum distance taken from a parameter file.
#[test]
fn bed_output_with_param_file() {
    let input = temp_path("bed_in.bam");
    let params = temp_path("bed_params.tsv");
    let table = temp_path("bed_out.bed");
    let positions = [1000, 1500, 2500, 3500, 20_000, 21_000, 22_000, 23_000];
    let records: Vec<RecordBuf> = positions
        .iter()
        .map(|&pos| record(Some("AAAC-1"), pos))
        .collect();
    write_bam(&input, &records);
    fs::write(&params, "molecule_size\t30000\nread_pair_dist\t10000\n").expect("write params");

    let output = run_binary(&[
        input.as_os_str(),
        OsStr::new("-p"),
        params.as_os_str(),
        OsStr::new("-o"),
        table.as_os_str(),
    ]);
    assert!(output.status.success(), "molecule-rs failed: {output:?}");

    let bed = fs::read_to_string(&table).expect("read BED");
    assert_eq!(
        bed,
        "chr1\t1000\t3600\tAAAC-1\t4\nchr1\t20000\t23100\tAAAC-1\t4\n"
    );

    // Without the parameter file the default distance keeps both groups together.
    let output = run_binary(&[input.as_os_str()]);
    assert!(output.status.success(), "molecule-rs failed: {output:?}");
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert_eq!(stdout, "chr1\t1000\t23100\tAAAC-1\t8\n");

    let _ = fs::remove_file(&input);
    let _ = fs::remove_file(&params);
    let _ = fs::remove_file(&table);
}

/// `-` reads the BAM from standard input.
#[test]
fn reads_bam_from_stdin() {
    let input = temp_path("stdin_in.bam");
    write_bam(
        &input,
        &[
            record(Some("AAAC-1"), 1000),
            record(Some("AAAC-1"), 1500),
            record(Some("AAAC-1"), 2500),
            record(Some("AAAC-1"), 3500),
        ],
    );
    let bytes = fs::read(&input).expect("read BAM bytes");

    let mut child = Command::new(env!("CARGO_BIN_EXE_molecule-rs"))
        .args(["-", "--quiet"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn molecule-rs");
    child
        .stdin
        .take()
        .expect("piped stdin")
        .write_all(&bytes)
        .expect("write BAM to stdin");
    let output = child.wait_with_output().expect("wait for molecule-rs");
    assert!(output.status.success(), "molecule-rs failed: {output:?}");

    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert_eq!(stdout, "chr1\t1000\t3600\tAAAC-1\t4\n");

    let _ = fs::remove_file(&input);
}

/// A parameter file without the distance line is a fatal configuration error.
#[test]
fn param_file_without_distance_fails() {
    let input = temp_path("bad_in.bam");
    let params = temp_path("bad_params.tsv");
    write_bam(&input, &[record(Some("AAAC-1"), 1000)]);
    fs::write(&params, "molecule_size\t30000\n").expect("write params");

    let output = run_binary(&[input.as_os_str(), OsStr::new("-p"), params.as_os_str()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("max_dist parameter not found"),
        "unexpected stderr: {stderr}"
    );

    let _ = fs::remove_file(&input);
    let _ = fs::remove_file(&params);
}
