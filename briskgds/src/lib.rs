//!
//! # BriskGds GDSII Stream Writer
//!
//! GDSII is the IC and photonics industries' de facto standard for storing and sharing layout data.
//! BriskGds is the stream-format layer of the Brisk photonic toolkit:
//! it emits GDSII's length-prefixed, type-tagged binary records,
//! and verifies streams of them after the fact.
//!
//! Layout data moves through BriskGds in two forms:
//!
//! * [GdsRecord]s, an enumeration with one variant per supported record-type.
//!   Each record holds its payload in relatively "raw" form, other than assuring correct data-types.
//! * Raw bytes, as detailed in the GDSII spec: a 16-bit big-endian total-length field,
//!   one record-type byte, one data-type byte, then the payload.
//!   These bytes are never stored by BriskGds, only generated and consumed
//!   on their way into and out of [Write](std::io::Write) destinations and byte-slices.
//!
//! [GdsWriter] turns records into bytes; [GdsScanner] walks bytes back into
//! records, headers, or summary statistics. BriskGds deliberately supports only
//! the subset of GDSII's record vocabulary that the Brisk circuit exporter emits;
//! anything else in a scanned stream is an error.
//!

pub mod data;
pub use data::*;

pub mod write;
pub use write::GdsWriter;

pub mod scan;
pub use scan::{GdsScanner, GdsStats};

#[cfg(test)]
mod tests;
