use std::fs::File;
use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::tempdir;

use rucoolbox::{CoolboxError, IntervalIndex, LoopInterval};

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut f = File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn load_and_query_single_loop() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "loops.bedpe", "chr1\t100\t200\tchr1\t500\t600\t255,0,0\n");

    let index = IntervalIndex::load(&path).unwrap();
    let hits: Vec<&LoopInterval> = index.query("chr1", 50, 300).collect();

    assert_eq!(hits.len(), 1);
    assert_eq!(
        hits[0],
        &LoopInterval {
            chrom1: "chr1".into(),
            start1: 100,
            end1: 200,
            chrom2: "chr1".into(),
            start2: 500,
            end2: 600,
            color: "#ff0000".into(),
        }
    );
}

#[test]
fn header_row_skipped() {
    let dir = tempdir().unwrap();
    let path = write_file(
        &dir,
        "loops.txt",
        "chr1\tx1\tx2\tchr2\ty1\ty2\nchr1\t100\t200\tchr1\t500\t600\n",
    );
    let index = IntervalIndex::load(&path).unwrap();
    assert_eq!(index.len(), 1);
}

#[test]
fn inter_chromosomal_excluded() {
    let dir = tempdir().unwrap();
    let path = write_file(
        &dir,
        "loops.txt",
        "chr1\t1\t2\tchr2\t3\t4\nchr3\t10\t20\tchr3\t30\t40\n",
    );
    let index = IntervalIndex::load(&path).unwrap();
    assert_eq!(index.chromosomes(), vec!["chr3"]);
    assert_eq!(index.query("chr1", 0, 100).count(), 0);
    assert_eq!(index.query("chr2", 0, 100).count(), 0);
}

#[test]
fn ensembl_names_are_found() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "loops.txt", "chr1\t100\t200\tchr1\t500\t600\n");
    let index = IntervalIndex::load(&path).unwrap();
    assert_eq!(index.query("1", 0, 1000).count(), 1);
}

#[test]
fn gzipped_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("loops.bedpe.gz");
    let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    enc.write_all(b"chr2\t100\t200\tchr2\t300\t400\t0,255,0\nchr2\t150\t250\tchr2\t350\t450\n")
        .unwrap();
    enc.finish().unwrap();

    let index = IntervalIndex::load(&path).unwrap();
    let colors: Vec<&str> = index
        .query("chr2", 0, 1000)
        .map(|l| l.color.as_str())
        .collect();
    assert_eq!(colors, vec!["#00ff00", "#2255ff"]);
}

#[test]
fn parse_error_aborts_load() {
    let dir = tempdir().unwrap();
    let path = write_file(
        &dir,
        "loops.txt",
        "chr1\t100\t200\tchr1\t500\t600\nchr1\t100\tabc\tchr1\t500\t600\n",
    );
    match IntervalIndex::load(&path) {
        Err(CoolboxError::Parse { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected parse error, got {:?}", other.map(|i| i.len())),
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = IntervalIndex::load(dir.path().join("nope.txt")).unwrap_err();
    assert!(matches!(err, CoolboxError::Io(_)));
}

#[test]
fn shared_across_threads() {
    let index = std::sync::Arc::new(
        IntervalIndex::from_reader(std::io::Cursor::new(
            b"chr1\t100\t200\tchr1\t500\t600\n".to_vec(),
        ))
        .unwrap(),
    );
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let index = index.clone();
            std::thread::spawn(move || index.query("chr1", 0, 1000).count())
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), 1);
    }
}
