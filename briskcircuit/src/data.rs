//!
//! # Brisk Circuit Data Model
//!

// Std-Lib Imports
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

// Crates.io
use serde::{Deserialize, Serialize};

// Workspace Imports
use briskgds::{GdsResult, GdsWriter};

// Local Imports
use crate::gds::GdsExporter;
use crate::ser::SerdeFile;

/// # Design-Space Point
/// Coordinate in (x, y) layout space, denoted in micrometers.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}
impl Point {
    /// Create a new [Point]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

///
/// # Component Kind Enumeration
///
/// The closed set of shape kinds the GDSII exporter knows how to draw,
/// plus an explicit [ComponentKind::Other] fallback carrying the raw kind-string.
/// The richer designer palette (bends, couplers, MMIs, rings, modulators,
/// grating couplers, y-splitters) and any future kinds land in `Other`,
/// where skipping them during export is a deliberate, visible branch.
///
/// Kind-strings round-trip through [serde] in their designer-palette form,
/// e.g. `"straight"` and `"beamSplitter"`.
///
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum ComponentKind {
    Straight,
    BeamSplitter,
    PhaseShifter,
    Detector,
    Source,
    Other(String),
}
impl ComponentKind {
    /// Get the kind's designer-palette name
    pub fn name(&self) -> &str {
        match self {
            Self::Straight => "straight",
            Self::BeamSplitter => "beamSplitter",
            Self::PhaseShifter => "phaseShifter",
            Self::Detector => "detector",
            Self::Source => "source",
            Self::Other(s) => s,
        }
    }
}
impl From<String> for ComponentKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "straight" => Self::Straight,
            "beamSplitter" => Self::BeamSplitter,
            "phaseShifter" => Self::PhaseShifter,
            "detector" => Self::Detector,
            "source" => Self::Source,
            _ => Self::Other(s),
        }
    }
}
impl From<&str> for ComponentKind {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}
impl From<ComponentKind> for String {
    fn from(kind: ComponentKind) -> Self {
        kind.name().to_string()
    }
}
impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
impl Default for ComponentKind {
    fn default() -> Self {
        Self::Straight
    }
}

/// # Component Parameter Value
/// Numeric for dimensions and layer assignments,
/// text for the designer's symbolic settings (`cross_section`, `polarization`).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

/// # Component Parameters
///
/// An open, string-keyed parameter mapping.
/// Which keys are read, and their defaults, depend on the component's kind;
/// unrecognized keys are preserved across serialization and ignored by drawing.
#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Params(pub HashMap<String, ParamValue>);
impl Params {
    /// Get numeric parameter `key`, if present and numeric
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.0.get(key) {
            Some(ParamValue::Number(v)) => Some(*v),
            _ => None,
        }
    }
    /// Get numeric parameter `key`, or `default` if absent or non-numeric
    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        self.number(key).unwrap_or(default)
    }
    /// Get text parameter `key`, if present and textual
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(ParamValue::Text(s)) => Some(s),
            _ => None,
        }
    }
    /// Set numeric parameter `key`
    pub fn set_number(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), ParamValue::Number(value));
    }
    /// Set text parameter `key`
    pub fn set_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), ParamValue::Text(value.into()));
    }
}

///
/// # Placed Circuit Component
///
/// One element of a circuit: a shape kind, a placement, and its parameters.
/// Positions are in micrometers; `rotation` is in degrees, applied before translation.
///
/// The `ports` map holds caller-declared attachment points as *offsets from the
/// component origin*, as the editor supplies them. During export each shape
/// routine computes its own, absolute port positions; the declared offsets are
/// the fallback for ports the routine does not produce.
///
#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq)]
pub struct Component {
    /// Unique Identifier
    pub id: String,
    /// Shape Kind
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    /// X Position (µm)
    pub x: f64,
    /// Y Position (µm)
    pub y: f64,
    /// Orientation, degrees counter-clockwise
    #[serde(default)]
    pub rotation: f64,
    /// Shape Parameters
    #[serde(default)]
    pub params: Params,
    /// Declared ports: name to offset-from-origin
    #[serde(default)]
    pub ports: HashMap<String, Point>,
}
impl Component {
    /// Create a new [Component] of `kind` at (`x`, `y`), with default parameters
    pub fn new(id: impl Into<String>, kind: impl Into<ComponentKind>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            x,
            y,
            ..Default::default()
        }
    }
}
/// # Port Reference
/// One endpoint of a [Connection]: a component's index in the design's
/// component list, and the name of one of its ports.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PortRef {
    /// Index into the design's component list
    pub component: usize,
    /// Port Name
    pub port: String,
}
impl PortRef {
    /// Create a new [PortRef]
    pub fn new(component: usize, port: impl Into<String>) -> Self {
        Self {
            component,
            port: port.into(),
        }
    }
}

/// # Connection
/// A directed edge between two component ports.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Connection {
    pub source: PortRef,
    pub target: PortRef,
}

/// # Design Metadata
/// Carried through validation and serialization;
/// has no representation in the exported GDSII stream.
#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq)]
pub struct DesignMetadata {
    /// Design Name
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation timestamp
    pub created: String,
    /// Last-modification timestamp
    pub modified: String,
    /// Semantic version
    pub version: String,
}

///
/// # Circuit Design
///
/// The top-level unit of validation, serialization, and export:
/// a component list, the connections between their ports, and design metadata.
/// Connections refer to components by index into `components`.
///
#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq)]
pub struct CircuitDesign {
    /// Placed Components
    pub components: Vec<Component>,
    /// Port-to-Port Connections
    pub connections: Vec<Connection>,
    /// Design Metadata
    pub metadata: DesignMetadata,
}
impl CircuitDesign {
    /// Export to an in-memory GDSII stream
    pub fn to_gds(&self) -> GdsResult<Vec<u8>> {
        GdsExporter::new(&self.components, &self.connections).export()
    }
    /// Export as a GDSII stream to file `fname`
    pub fn save_gds(&self, fname: impl AsRef<Path>) -> GdsResult<()> {
        let mut wr = GdsWriter::open(fname)?;
        GdsExporter::new(&self.components, &self.connections).export_into(&mut wr)
    }
}
// Enable [CircuitDesign] serialization to file, in each of the supported formats.
impl SerdeFile for CircuitDesign {}
