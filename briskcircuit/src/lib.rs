//!
//! # Brisk Circuit Model & GDSII Export
//!
//! The circuit-model layer of the Brisk photonic toolkit.
//! A [CircuitDesign] holds a set of placed [Component]s and the point-to-point
//! [Connection]s between their ports, all denoted in micrometers.
//! Designs are produced by an interactive editor, serialized to and from
//! JSON (and friends) via [serde], and exported to fabrication-ready GDSII
//! streams through [GdsExporter], backed by the [briskgds] format layer.
//!
//! Conversion to GDSII is supported via the [CircuitDesign::to_gds] and
//! [CircuitDesign::save_gds] methods. Import from GDSII is not supported.
//!

// Internal modules & re-exports
pub mod data;
pub use data::*;

pub mod gds;
pub use gds::{
    layers, shape_geometry, GdsExporter, ShapeGeometry, ShapePath, CONNECTION_WIDTH, LIB_NAME,
    TOP_STRUCT_NAME,
};

pub mod ser;
pub use ser::{SerdeFile, SerializationFormat};

pub mod validate;
pub use validate::CircuitValidator;
