//!
//! # BriskGds Byte-Encoding and Writing
//!

// Std-Lib Imports
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// Crates.io
use byteorder::{BigEndian, WriteBytesExt};

// Local imports
use crate::data::*;

/// # Gds Writing Helper
///
/// Streams [GdsRecord]s in binary form onto a [Write] destination,
/// and layers the library/structure/element conventions of a Brisk
/// export on top of them. All framing passes through [GdsWriter::write_record].
pub struct GdsWriter<'wr> {
    /// Write Destination
    dest: Box<dyn Write + 'wr>,
}
impl<'wr> GdsWriter<'wr> {
    /// Create a new [GdsWriter] with destination file `fname`
    pub fn open(fname: impl AsRef<Path>) -> GdsResult<Self> {
        let file = BufWriter::new(File::create(fname)?);
        Ok(Self::new(file))
    }
    /// Create a new [GdsWriter] to destination `dest`
    pub fn new(dest: impl Write + 'wr) -> Self {
        Self {
            dest: Box::new(dest),
        }
    }
    /// Write the library preamble:
    /// `HEADER` with the stream-format version, `BGNLIB` with modification dates,
    /// `LIBNAME`, and the two-real `UNITS` record.
    pub fn write_header(
        &mut self,
        libname: &str,
        units: &GdsUnits,
        dates: &GdsDateTimes,
    ) -> GdsResult<()> {
        self.write_records(&[
            &GdsRecord::Header {
                version: GDS_VERSION,
            },
            &GdsRecord::BgnLib {
                dates: dates.encode(),
            },
            &GdsRecord::LibName(libname.to_string()),
            &GdsRecord::Units(units.0, units.1),
        ])
    }
    /// Open a structure (cell) definition: `BGNSTR` then `STRNAME`
    pub fn start_structure(&mut self, name: &str, dates: &GdsDateTimes) -> GdsResult<()> {
        self.write_records(&[
            &GdsRecord::BgnStruct {
                dates: dates.encode(),
            },
            &GdsRecord::StructName(name.to_string()),
        ])
    }
    /// Write one `PATH` element.
    /// `points` and `width` are in micrometers and are converted to database units here.
    pub fn write_path(
        &mut self,
        points: &[(f64, f64)],
        width: f64,
        layer: GdsLayerSpec,
    ) -> GdsResult<()> {
        self.write_records(&[
            &GdsRecord::Path,
            &GdsRecord::Layer(layer.layer),
            &GdsRecord::DataType(layer.xtype),
            &GdsRecord::Width(to_dbu(width)),
            &GdsRecord::Xy(Self::flatten(points)),
            &GdsRecord::EndElement,
        ])
    }
    /// Write one `TEXT` element at micrometer-denoted `position`
    pub fn write_text(
        &mut self,
        text: &str,
        position: (f64, f64),
        layer: GdsLayerSpec,
    ) -> GdsResult<()> {
        self.write_records(&[
            &GdsRecord::Text,
            &GdsRecord::Layer(layer.layer),
            &GdsRecord::DataType(layer.xtype),
            &GdsRecord::Xy(Self::flatten(&[position])),
            &GdsRecord::String(text.to_string()),
            &GdsRecord::EndElement,
        ])
    }
    /// Close the current structure definition
    pub fn end_structure(&mut self) -> GdsResult<()> {
        self.write_record(&GdsRecord::EndStruct)
    }
    /// Close the library
    pub fn end_library(&mut self) -> GdsResult<()> {
        self.write_record(&GdsRecord::EndLib)
    }
    /// Convert micrometer-valued points to a flattened database-unit coordinate vector
    fn flatten(points: &[(f64, f64)]) -> Vec<i32> {
        let mut xy = Vec::with_capacity(points.len() * 2);
        for (x, y) in points.iter() {
            xy.push(to_dbu(*x));
            xy.push(to_dbu(*y));
        }
        xy
    }
    /// Helper to write a sequence of [GdsRecord] references
    fn write_records(&mut self, records: &[&GdsRecord]) -> GdsResult<()> {
        for r in records {
            self.write_record(r)?;
        }
        Ok(())
    }
    /// Encode `record` into bytes and write onto `dest`.
    /// The sole framing authority: every record this crate ever emits passes through here.
    pub fn write_record(&mut self, record: &GdsRecord) -> GdsResult<()> {
        // This is split in two parts - header and data -
        // largely to ease handling the variety of datatypes

        // A quick closure for GDS's "even-lengths-only allowed" strings
        let gds_strlen = |s: &str| -> usize { s.len() + s.len() % 2 };
        // First grab the header info: RecordType, DataType, and length
        use GdsDataType::{NoData, Str, F64, I16, I32};
        let (rtype, dtype, len) = match record {
            // Library-Level Records
            GdsRecord::Header { .. } => (GdsRecordType::Header, I16, 2),
            GdsRecord::BgnLib { .. } => (GdsRecordType::BgnLib, I16, 24),
            GdsRecord::LibName(s) => (GdsRecordType::LibName, Str, gds_strlen(s)),
            GdsRecord::Units(_, _) => (GdsRecordType::Units, F64, 16),
            GdsRecord::EndLib => (GdsRecordType::EndLib, NoData, 0),

            // Structure (Cell) Level Records
            GdsRecord::BgnStruct { .. } => (GdsRecordType::BgnStruct, I16, 24),
            GdsRecord::StructName(s) => (GdsRecordType::StructName, Str, gds_strlen(s)),
            GdsRecord::EndStruct => (GdsRecordType::EndStruct, NoData, 0),

            // Element-Level Records
            GdsRecord::Path => (GdsRecordType::Path, NoData, 0),
            GdsRecord::Text => (GdsRecordType::Text, NoData, 0),
            GdsRecord::Layer(_) => (GdsRecordType::Layer, I16, 2),
            GdsRecord::DataType(_) => (GdsRecordType::DataType, I16, 2),
            GdsRecord::Width(_) => (GdsRecordType::Width, I32, 4),
            GdsRecord::Xy(d) => (GdsRecordType::Xy, I32, 4 * d.len()),
            GdsRecord::EndElement => (GdsRecordType::EndElement, NoData, 0),
            GdsRecord::String(s) => (GdsRecordType::String, Str, gds_strlen(s)),
        };
        // Send those header-bytes to the writer.
        // Include the four header bytes in total-length.
        match u16::try_from(len + 4) {
            Ok(val) => self.dest.write_u16::<BigEndian>(val)?,
            Err(_) => return Err(GdsError::RecordLen(len)),
        };
        self.dest.write_u8(rtype as u8)?;
        self.dest.write_u8(dtype as u8)?;

        // Now write the data portion
        // This section is generally organized by DataType
        match record {
            // NoData
            GdsRecord::EndLib
            | GdsRecord::EndStruct
            | GdsRecord::Path
            | GdsRecord::Text
            | GdsRecord::EndElement => (),

            // Single I16s
            GdsRecord::Header { version: d }
            | GdsRecord::Layer(d)
            | GdsRecord::DataType(d) => self.dest.write_i16::<BigEndian>(*d)?,

            // Single I32s
            GdsRecord::Width(d) => self.dest.write_i32::<BigEndian>(*d)?,

            // "Structs"
            GdsRecord::Units(d0, d1) => {
                self.dest.write_u64::<BigEndian>(GdsFloat64::encode(*d0))?;
                self.dest.write_u64::<BigEndian>(GdsFloat64::encode(*d1))?;
            }
            // Vectors
            GdsRecord::BgnLib { dates: d } | GdsRecord::BgnStruct { dates: d } => {
                for val in d.iter() {
                    self.dest.write_i16::<BigEndian>(*val)?;
                }
            }
            GdsRecord::Xy(d) => {
                for val in d.iter() {
                    self.dest.write_i32::<BigEndian>(*val)?;
                }
            }
            // Strings
            GdsRecord::LibName(s) | GdsRecord::StructName(s) | GdsRecord::String(s) => {
                for b in s.as_bytes() {
                    self.dest.write_u8(*b)?;
                }
                if s.len() % 2 != 0 {
                    // Pad odd-length strings with a zero-valued byte
                    self.dest.write_u8(0x00)?;
                }
            }
        };
        Ok(())
    }
}
