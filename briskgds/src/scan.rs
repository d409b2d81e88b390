//!
//! # BriskGds Stream Scanning & Verification
//!
//! Walks a complete in-memory GDSII stream record-by-record,
//! checking the framing invariants every record must satisfy:
//! a total-length of at least the four header bytes, an even byte-count,
//! a known record-type and data-type, and a fully present body.
//! The walk ends at `ENDLIB`, after which no bytes may remain.
//!

// Std-Lib Imports
use std::io::{Cursor, Read};

// Crates.io
use byteorder::{BigEndian, ReadBytesExt};
use num_traits::FromPrimitive;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Local Imports
use crate::data::*;

/// # Gds Summary Stats
///
/// Summary statistics for a scanned GDSII stream:
/// total numbers of records, and of each element-type the Brisk exporter emits.
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct GdsStats {
    pub libraries: usize,
    pub structs: usize,
    pub paths: usize,
    pub text_elems: usize,
    pub records: usize,
}

/// # GdsScanner
///
/// Verification walker over an in-memory GDSII stream.
/// Reads one [GdsRecordHeader] at a time from a byte-slice,
/// optionally decoding each record's content along the way.
pub struct GdsScanner<'b> {
    /// Stream being read
    file: Cursor<&'b [u8]>,
    /// Total stream length, for body-presence checks
    len: u64,
}
impl<'b> GdsScanner<'b> {
    /// Create a new [GdsScanner] over `bytes`
    pub fn new(bytes: &'b [u8]) -> Self {
        Self {
            file: Cursor::new(bytes),
            len: bytes.len() as u64,
        }
    }
    /// Walk and decode every record in `bytes`, through `ENDLIB`.
    /// Returns the decoded [GdsRecord]s, or the first framing or decoding error hit.
    pub fn scan(bytes: &'b [u8]) -> GdsResult<Vec<GdsRecord>> {
        let mut me = Self::new(bytes);
        let mut records = Vec::new();
        loop {
            let record = me.read_record()?;
            let done = record == GdsRecord::EndLib;
            records.push(record);
            if done {
                break;
            }
        }
        me.check_end()?;
        Ok(records)
    }
    /// Walk every record-header in `bytes`, skipping over record bodies.
    pub fn headers(bytes: &'b [u8]) -> GdsResult<Vec<GdsRecordHeader>> {
        let mut me = Self::new(bytes);
        let mut headers = Vec::new();
        loop {
            let header = me.read_record_header()?;
            me.skip(&header)?;
            let done = header.rtype == GdsRecordType::EndLib;
            headers.push(header);
            if done {
                break;
            }
        }
        me.check_end()?;
        Ok(headers)
    }
    /// Scan `bytes` and collect summary statistics
    pub fn stats(bytes: &'b [u8]) -> GdsResult<GdsStats> {
        let headers = Self::headers(bytes)?;
        let mut stats = GdsStats::default();
        stats.records = headers.len();
        for header in headers.iter() {
            match header.rtype {
                GdsRecordType::Header => stats.libraries += 1,
                GdsRecordType::BgnStruct => stats.structs += 1,
                GdsRecordType::Path => stats.paths += 1,
                GdsRecordType::Text => stats.text_elems += 1,
                _ => (),
            }
        }
        Ok(stats)
    }
    /// Read the next record-header from our stream.
    /// Returns a [GdsRecordHeader] if successful.
    fn read_record_header(&mut self) -> GdsResult<GdsRecordHeader> {
        // Read the 16-bit record-size. (In bytes, including the four header bytes.)
        let len = match self.file.read_u16::<BigEndian>() {
            Err(_) => return Err(GdsError::Str("Truncated record header".into())),
            Ok(num) if num < 4 => return Err(GdsError::RecordLen(num.into())), // Invalid (too short) length; throw Error.
            Ok(num) if num % 2 != 0 => return Err(GdsError::RecordLen(num.into())), // Invalid (odd) length; throw Error.
            Ok(num) => num, // The normal case
        };
        let len = len - 4; // Strip out the four header-bytes
                           // Read and decode its RecordType
        let record_type = self.file.read_u8()?;
        let record_type: GdsRecordType =
            FromPrimitive::from_u8(record_type).ok_or(GdsError::InvalidRecordType(record_type))?;
        // Read and decode its DataType
        let data_type = self.file.read_u8()?;
        let data_type =
            FromPrimitive::from_u8(data_type).ok_or(GdsError::InvalidDataType(data_type))?;
        // Check the stream actually holds the record's body
        if self.file.position() + u64::from(len) > self.len {
            return Err(GdsError::Str("Truncated record body".into()));
        }
        Ok(GdsRecordHeader {
            rtype: record_type,
            dtype: data_type,
            len,
        })
    }
    /// Read the next binary-encoded [GdsRecord].
    fn read_record(&mut self) -> GdsResult<GdsRecord> {
        // Read the record header (types and length)
        let header = self.read_record_header()?;
        // And read the content
        self.read_record_content(&header)
    }
    fn read_record_content(&mut self, header: &GdsRecordHeader) -> GdsResult<GdsRecord> {
        // Based on that header-data, decode to a [GdsRecord]
        use GdsDataType::{NoData, Str, F64, I16, I32};
        let len = header.len;
        let record: GdsRecord = match (header.rtype, header.dtype, len) {
            // Library-Level Records
            (GdsRecordType::Header, I16, 2) => GdsRecord::Header {
                version: self.read_i16(len)?[0],
            },
            (GdsRecordType::BgnLib, I16, 24) => GdsRecord::BgnLib {
                dates: self.read_dates(len)?,
            },
            (GdsRecordType::LibName, Str, _) => GdsRecord::LibName(self.read_str(len)?),
            (GdsRecordType::Units, F64, 16) => {
                let v = self.read_f64(len)?;
                GdsRecord::Units(v[0], v[1])
            }
            (GdsRecordType::EndLib, NoData, 0) => GdsRecord::EndLib,

            // Structure (Cell) Level Records
            (GdsRecordType::BgnStruct, I16, 24) => GdsRecord::BgnStruct {
                dates: self.read_dates(len)?,
            },
            (GdsRecordType::StructName, Str, _) => GdsRecord::StructName(self.read_str(len)?),
            (GdsRecordType::EndStruct, NoData, 0) => GdsRecord::EndStruct,

            // Element-Level Records
            (GdsRecordType::Path, NoData, 0) => GdsRecord::Path,
            (GdsRecordType::Text, NoData, 0) => GdsRecord::Text,
            (GdsRecordType::Layer, I16, 2) => GdsRecord::Layer(self.read_i16(len)?[0]),
            (GdsRecordType::DataType, I16, 2) => GdsRecord::DataType(self.read_i16(len)?[0]),
            (GdsRecordType::Width, I32, 4) => GdsRecord::Width(self.read_i32(len)?[0]),
            (GdsRecordType::Xy, I32, _) => GdsRecord::Xy(self.read_i32(len)?),
            (GdsRecordType::EndElement, NoData, 0) => GdsRecord::EndElement,
            (GdsRecordType::String, Str, _) => GdsRecord::String(self.read_str(len)?),

            // Failing to meet any of these clauses means this is an invalid record
            _ => return Err(GdsError::RecordDecode(header.rtype, header.dtype, len)),
        };
        Ok(record)
    }
    /// Skip over the body of the record described by `header`
    fn skip(&mut self, header: &GdsRecordHeader) -> GdsResult<()> {
        self.file.set_position(self.file.position() + u64::from(header.len));
        Ok(())
    }
    /// Require the stream to hold no bytes beyond the final `ENDLIB`
    fn check_end(&mut self) -> GdsResult<()> {
        if self.file.position() != self.len {
            return Err(GdsError::Str(format!(
                "{} trailing bytes after ENDLIB",
                self.len - self.file.position()
            )));
        }
        Ok(())
    }
    /// Read `len` bytes and convert to `String`
    fn read_str(&mut self, len: u16) -> GdsResult<String> {
        // ASCII Decode. First load into a bytes-vector.
        let mut data = self.read_bytes(len)?;
        // Strip optional end-of-string chars
        if data.last() == Some(&0x00) {
            data.pop();
        }
        // And convert to string
        let s: String = std::str::from_utf8(&data)?.into();
        Ok(s)
    }
    /// Read `len` bytes
    fn read_bytes(&mut self, len: u16) -> Result<Vec<u8>, std::io::Error> {
        let mut rv: Vec<u8> = vec![0; len.into()];
        self.file.read_exact(&mut rv)?;
        Ok(rv)
    }
    /// Read `len/2` i16s from `len` bytes
    fn read_i16(&mut self, len: u16) -> Result<Vec<i16>, std::io::Error> {
        let mut rv: Vec<i16> = vec![0; usize::from(len) / 2];
        self.file.read_i16_into::<BigEndian>(&mut rv)?;
        Ok(rv)
    }
    /// Read `len/4` i32s from `len` bytes
    fn read_i32(&mut self, len: u16) -> Result<Vec<i32>, std::io::Error> {
        let mut rv: Vec<i32> = vec![0; usize::from(len) / 4];
        self.file.read_i32_into::<BigEndian>(&mut rv)?;
        Ok(rv)
    }
    /// Read `len/8` f64s from `len` bytes, decoding GDS's float-format along the way
    fn read_f64(&mut self, len: u16) -> GdsResult<Vec<f64>> {
        let mut u64s = vec![0; usize::from(len) / 8];
        self.file.read_u64_into::<BigEndian>(&mut u64s)?;
        let rv = u64s.into_iter().map(GdsFloat64::decode).collect();
        Ok(rv)
    }
    /// Read the twelve-i16 `BGNLIB`/`BGNSTR` date block
    fn read_dates(&mut self, len: u16) -> GdsResult<[i16; 12]> {
        let d = self.read_i16(len)?;
        d.try_into()
            .map_err(|_| GdsError::Str("Invalid length date block".into()))
    }
}
