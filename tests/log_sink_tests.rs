use chrono::{Local, TimeZone};
use volwatch::kernel::sample::VolumeSample;
use volwatch::kernel::sink::{CsvLogSink, LogSink, SinkError};

fn at(h: u32, m: u32, s: u32) -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(2024, 5, 1, h, m, s).single().unwrap()
}

#[test]
fn test_creates_file_and_flushes_each_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.csv");
    assert!(!path.exists());

    let mut sink = CsvLogSink::open(&path).unwrap();
    sink.append(&VolumeSample::new(at(9, 5, 7), 35)).unwrap();

    // Readable before the sink is dropped.
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "2024-05-01 09:05:07,35\n");
}

#[test]
fn test_reopen_appends_after_existing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.csv");
    std::fs::write(&path, "2024-04-30 23:59:59,10\n").unwrap();

    {
        let mut sink = CsvLogSink::open(&path).unwrap();
        sink.append(&VolumeSample::new(at(0, 0, 10), 11)).unwrap();
    }
    {
        let mut sink = CsvLogSink::open(&path).unwrap();
        sink.append(&VolumeSample::new(at(0, 0, 20), 12)).unwrap();
    }

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "2024-04-30 23:59:59,10\n2024-05-01 00:00:10,11\n2024-05-01 00:00:20,12\n"
    );
}

#[test]
fn test_open_failure_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("log.csv");

    match CsvLogSink::open(&path) {
        Err(SinkError::Open { path: p, .. }) => assert_eq!(p, path),
        Err(other) => panic!("expected open error, got {}", other),
        Ok(_) => panic!("opening under a missing directory should fail"),
    }
}

#[test]
fn test_sample_record_format() {
    let sample = VolumeSample::new(at(13, 4, 5), 7);
    assert_eq!(sample.formatted_timestamp(), "2024-05-01 13:04:05");
    assert_eq!(sample.record(), ["2024-05-01 13:04:05".to_string(), "7".to_string()]);
}
