// Crates.io
use chrono::NaiveDate;

// Local Imports
use crate::data::*;
use crate::scan::{GdsScanner, GdsStats};
use crate::write::GdsWriter;

/// Specified creation date for test cases
fn test_dates() -> GdsDateTimes {
    let test_date: GdsDateTime = NaiveDate::from_ymd_opt(1970, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 1)
        .unwrap()
        .into();
    GdsDateTimes {
        modified: test_date.clone(),
        accessed: test_date.clone(),
    }
}
#[test]
fn floats() {
    // Test conversions between normal-human and GDSII floating-point formats
    let f = GdsFloat64::encode(0.0);
    assert_eq!(f, 0);
    let d = GdsFloat64::decode(f);
    assert_eq!(d, 0.0);
    let f = GdsFloat64::encode(1.0);
    let d = GdsFloat64::decode(f);
    assert_eq!(d, 1.0);
    let f = GdsFloat64::encode(1e-11);
    let d = GdsFloat64::decode(f);
    assert_eq!(d, 1e-11);
    let f = GdsFloat64::encode(-0.69);
    let d = GdsFloat64::decode(f);
    assert_eq!(d, -0.69);
    let f = GdsFloat64::encode(-33.33e-33);
    let d = GdsFloat64::decode(f);
    assert_eq!(d, -33.33e-33);
}
#[test]
fn units_encoding() {
    // The default user-unit scale, 1e-3, has a well-known excess-64 encoding,
    // checkable against any GDSII file with nm/µm units.
    assert_eq!(GdsFloat64::encode(1e-3), 0x3E41_8937_4BC6_A7F0);
    // The meter-per-db-unit value round-trips exactly
    let units = GdsUnits::default();
    assert_eq!(GdsFloat64::decode(GdsFloat64::encode(units.1)), 1e-9);
}
#[test]
fn date_block() {
    // The 12-field i16 block carries calendar fields, years referenced to 1900
    let dates = test_dates();
    assert_eq!(dates.encode(), [70, 1, 1, 0, 0, 1, 70, 1, 1, 0, 0, 1]);
}
#[test]
fn db_units() {
    assert_eq!(to_dbu(12.345), 12345);
    assert_eq!(to_dbu(-6.0), -6000);
    // Half-unit values round to nearest
    assert_eq!(to_dbu(0.0005), 1);
    // Out-of-range values saturate at the i32 bounds
    assert_eq!(to_dbu(3.0e6), i32::MAX);
    assert_eq!(to_dbu(-3.0e6), i32::MIN);
}
#[test]
fn string_padding() -> GdsResult<()> {
    // Odd-length strings pick up one zero pad byte
    let mut bytes = Vec::new();
    let mut wr = GdsWriter::new(&mut bytes);
    wr.write_record(&GdsRecord::LibName("BRISK_LIB".into()))?;
    drop(wr);
    assert_eq!(bytes.len(), 4 + 10);
    assert_eq!(bytes[0..2], [0x00, 0x0E]); // Total length, including the pad
    assert_eq!(*bytes.last().unwrap(), 0x00);

    // Even-length strings are written as-is
    let mut bytes = Vec::new();
    let mut wr = GdsWriter::new(&mut bytes);
    wr.write_record(&GdsRecord::StructName("MAIN".into()))?;
    drop(wr);
    assert_eq!(bytes.len(), 4 + 4);
    assert_eq!(&bytes[4..], b"MAIN");
    Ok(())
}
#[test]
fn record_too_long() {
    // Record length (>16K) generates an error
    let mut bytes = Vec::new();
    let mut wr = GdsWriter::new(&mut bytes);
    match wr.write_record(&GdsRecord::Xy(vec![0; 20_000])) {
        Err(GdsError::RecordLen(_)) => (),
        Ok(_) | Err(_) => panic!("should generate a [GdsError::RecordLen] error"),
    }
}
#[test]
fn it_frames_a_library() -> GdsResult<()> {
    // Write a small library and walk it back, record for record
    let dates = test_dates();
    let mut bytes = Vec::new();
    let mut wr = GdsWriter::new(&mut bytes);
    wr.write_header("BRISK_LIB", &GdsUnits::default(), &dates)?;
    wr.start_structure("MAIN", &dates)?;
    wr.write_path(&[(0.0, 0.0), (10.0, 0.0)], 0.5, GdsLayerSpec::new(1, 0))?;
    wr.write_text("straight_0", (10.0, 10.0), GdsLayerSpec::new(63, 0))?;
    wr.end_structure()?;
    wr.end_library()?;
    drop(wr);

    let records = GdsScanner::scan(&bytes)?;
    assert_eq!(
        records,
        vec![
            GdsRecord::Header { version: 6 },
            GdsRecord::BgnLib {
                dates: dates.encode()
            },
            GdsRecord::LibName("BRISK_LIB".into()),
            GdsRecord::Units(1e-3, 1e-9),
            GdsRecord::BgnStruct {
                dates: dates.encode()
            },
            GdsRecord::StructName("MAIN".into()),
            GdsRecord::Path,
            GdsRecord::Layer(1),
            GdsRecord::DataType(0),
            GdsRecord::Width(500),
            GdsRecord::Xy(vec![0, 0, 10_000, 0]),
            GdsRecord::EndElement,
            GdsRecord::Text,
            GdsRecord::Layer(63),
            GdsRecord::DataType(0),
            GdsRecord::Xy(vec![10_000, 10_000]),
            GdsRecord::String("straight_0".into()),
            GdsRecord::EndElement,
            GdsRecord::EndStruct,
            GdsRecord::EndLib,
        ]
    );

    // The header walk covers the same ground, body-lengths included
    let headers = GdsScanner::headers(&bytes)?;
    assert_eq!(headers.len(), records.len());
    let total: usize = headers.iter().map(|h| usize::from(h.len) + 4).sum();
    assert_eq!(total, bytes.len());

    // And the stats tally up
    assert_eq!(
        GdsScanner::stats(&bytes)?,
        GdsStats {
            libraries: 1,
            structs: 1,
            paths: 1,
            text_elems: 1,
            records: 20,
        }
    );
    Ok(())
}
#[test]
fn scanner_rejects_trailing_bytes() -> GdsResult<()> {
    let mut bytes = Vec::new();
    let mut wr = GdsWriter::new(&mut bytes);
    wr.write_header("LIB", &GdsUnits::default(), &test_dates())?;
    wr.end_library()?;
    drop(wr);
    bytes.extend_from_slice(&[0xDE, 0xAD]);
    match GdsScanner::scan(&bytes) {
        Err(GdsError::Str(_)) => Ok(()),
        Ok(_) | Err(_) => Err(GdsError::Str(
            "trailing bytes should fail the scan".into(),
        )),
    }
}
#[test]
fn scanner_rejects_truncation() -> GdsResult<()> {
    let mut bytes = Vec::new();
    let mut wr = GdsWriter::new(&mut bytes);
    wr.write_header("LIB", &GdsUnits::default(), &test_dates())?;
    wr.end_library()?;
    drop(wr);
    // Chop mid-record: the UNITS body loses its final byte
    bytes.truncate(bytes.len() - 5);
    match GdsScanner::scan(&bytes) {
        Err(_) => Ok(()),
        Ok(_) => Err(GdsError::Str("truncated stream should fail".into())),
    }
}
#[test]
fn scanner_rejects_bad_lengths() {
    // Length below the four header bytes
    match GdsScanner::scan(&[0x00, 0x02, 0x00, 0x02]) {
        Err(GdsError::RecordLen(2)) => (),
        _ => panic!("short record length should fail"),
    }
    // Odd length
    match GdsScanner::scan(&[0x00, 0x05, 0x00, 0x02, 0x06]) {
        Err(GdsError::RecordLen(5)) => (),
        _ => panic!("odd record length should fail"),
    }
    // Unknown record-type byte
    match GdsScanner::scan(&[0x00, 0x04, 0x3F, 0x00]) {
        Err(GdsError::InvalidRecordType(0x3F)) => (),
        _ => panic!("unknown record type should fail"),
    }
    // Unknown data-type byte
    match GdsScanner::scan(&[0x00, 0x04, 0x00, 0x09]) {
        Err(GdsError::InvalidDataType(0x09)) => (),
        _ => panic!("unknown data type should fail"),
    }
}
#[test]
fn record_serde() {
    // Records serialize for debugging and golden-data use
    let record = GdsRecord::Xy(vec![0, 0, 10_000, 0]);
    let json = serde_json::to_string(&record).unwrap();
    let back: GdsRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(record, back);
}
#[test]
fn it_writes_files() -> GdsResult<()> {
    // Check [GdsWriter::open] writes through a file destination
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("empty.gds");
    let mut wr = GdsWriter::open(&path)?;
    wr.write_header("BRISK_LIB", &GdsUnits::default(), &test_dates())?;
    wr.end_library()?;
    drop(wr);
    let bytes = std::fs::read(&path)?;
    let stats = GdsScanner::stats(&bytes)?;
    assert_eq!(stats.libraries, 1);
    assert_eq!(stats.records, 5);
    Ok(())
}
