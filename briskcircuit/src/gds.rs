//!
//! # Circuit to GDSII Export Module
//!
//! Translates a circuit's components and connections into one GDSII library
//! holding one flat top-level structure. Each component kind reduces to one or
//! more `PATH` elements; connections become straight waveguide paths between
//! resolved port positions; every component gets a `TEXT` label.
//!

// Std-Lib Imports
use std::collections::HashMap;

// Workspace Imports
use briskgds::{GdsDateTimes, GdsLayerSpec, GdsResult, GdsUnits, GdsWriter};

// Local Imports
use crate::data::{Component, ComponentKind, Connection, Point, PortRef};

/// Library name written into every exported stream's `LIBNAME` record
pub const LIB_NAME: &str = "BRISK_LIB";
/// Name of the sole, flat top-level structure
pub const TOP_STRUCT_NAME: &str = "MAIN";
/// Width of connection waveguides, in micrometers
pub const CONNECTION_WIDTH: f64 = 0.5;

/// Default waveguide width (µm), applied when a component omits `width`
const DEFAULT_WIDTH: f64 = 0.5;
/// Default path length (µm), applied when a component omits `length`
const DEFAULT_LENGTH: f64 = 10.0;
/// Beam-splitter output divergence from the propagation axis, in degrees
const SPLIT_ANGLE: f64 = 30.0;
/// Segment count for circular source outlines
const CIRCLE_SEGMENTS: usize = 32;
/// Label placement offset from the component origin, both axes (µm)
const LABEL_OFFSET: f64 = 10.0;

/// # Layer Assignment Table
///
/// Fixed (layer, datatype) pairs, one per logical material/function.
/// Consumers of Brisk-exported streams rely on these exact numbers.
pub mod layers {
    use briskgds::GdsLayerSpec;

    pub const WAVEGUIDE: GdsLayerSpec = GdsLayerSpec::new(1, 0);
    pub const BEAM_SPLITTER: GdsLayerSpec = GdsLayerSpec::new(2, 0);
    pub const PHASE_SHIFTER: GdsLayerSpec = GdsLayerSpec::new(3, 0);
    pub const DETECTOR: GdsLayerSpec = GdsLayerSpec::new(4, 0);
    pub const SOURCE: GdsLayerSpec = GdsLayerSpec::new(5, 0);
    pub const METAL: GdsLayerSpec = GdsLayerSpec::new(6, 0);
    pub const TEXT: GdsLayerSpec = GdsLayerSpec::new(63, 0);
}

/// One path element of a component's geometry, in micrometers
#[derive(Debug, Clone, PartialEq)]
pub struct ShapePath {
    pub points: Vec<Point>,
    pub width: f64,
    pub layer: GdsLayerSpec,
}

/// # Shape Geometry
///
/// The purely-computed drawing of one component:
/// the paths to emit, and its ports in *absolute* design coordinates.
/// Unsupported kinds produce the empty default.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ShapeGeometry {
    pub paths: Vec<ShapePath>,
    pub ports: HashMap<String, Point>,
}

/// Waveguide-path parameters, with the designer palette's defaults
struct PathParams {
    width: f64,
    length: f64,
}
impl PathParams {
    fn of(component: &Component) -> Self {
        Self {
            width: component.params.number_or("width", DEFAULT_WIDTH),
            length: component.params.number_or("length", DEFAULT_LENGTH),
        }
    }
}

/// Compute the geometry of `component`.
/// A pure function: same component in, same paths and ports out.
pub fn shape_geometry(component: &Component) -> ShapeGeometry {
    match &component.kind {
        ComponentKind::Straight => straight(component),
        ComponentKind::BeamSplitter => beam_splitter(component),
        ComponentKind::PhaseShifter => phase_shifter(component),
        ComponentKind::Detector => detector(component),
        ComponentKind::Source => source(component),
        // Unsupported kinds draw nothing, deliberately
        ComponentKind::Other(_) => ShapeGeometry::default(),
    }
}

/// Straight waveguide: one path from the origin along the rotation axis.
/// Ports `o1` (start) and `o2` (end).
fn straight(component: &Component) -> ShapeGeometry {
    let p = PathParams::of(component);
    let theta = component.rotation.to_radians();
    let start = Point::new(component.x, component.y);
    let end = Point::new(
        component.x + p.length * theta.cos(),
        component.y + p.length * theta.sin(),
    );
    ShapeGeometry {
        paths: vec![ShapePath {
            points: vec![start, end],
            width: p.width,
            layer: layers::WAVEGUIDE,
        }],
        ports: HashMap::from([("o1".to_string(), start), ("o2".to_string(), end)]),
    }
}

/// Beam splitter: an input path to the shape midpoint,
/// then two half-length output paths diverging at ±[SPLIT_ANGLE].
/// Ports `o1` (input), `o2` (upper output), `o3` (lower output).
fn beam_splitter(component: &Component) -> ShapeGeometry {
    let p = PathParams::of(component);
    let theta = component.rotation.to_radians();
    let start = Point::new(component.x, component.y);
    let mid = Point::new(
        component.x + (p.length / 2.0) * theta.cos(),
        component.y + (p.length / 2.0) * theta.sin(),
    );
    let upper_theta = (component.rotation + SPLIT_ANGLE).to_radians();
    let lower_theta = (component.rotation - SPLIT_ANGLE).to_radians();
    let upper = Point::new(
        mid.x + (p.length / 2.0) * upper_theta.cos(),
        mid.y + (p.length / 2.0) * upper_theta.sin(),
    );
    let lower = Point::new(
        mid.x + (p.length / 2.0) * lower_theta.cos(),
        mid.y + (p.length / 2.0) * lower_theta.sin(),
    );
    let path = |points: Vec<Point>| ShapePath {
        points,
        width: p.width,
        layer: layers::BEAM_SPLITTER,
    };
    ShapeGeometry {
        paths: vec![
            path(vec![start, mid]),
            path(vec![mid, upper]),
            path(vec![mid, lower]),
        ],
        ports: HashMap::from([
            ("o1".to_string(), start),
            ("o2".to_string(), upper),
            ("o3".to_string(), lower),
        ]),
    }
}

/// Phase shifter: a straight waveguide plus a 1.5x-wide electrode path
/// over the same two points on the metal layer.
/// One logical component, two physically stacked layers.
fn phase_shifter(component: &Component) -> ShapeGeometry {
    let p = PathParams::of(component);
    let mut geometry = straight(component);
    let waveguide = &geometry.paths[0];
    let electrode = ShapePath {
        points: waveguide.points.clone(),
        width: p.width * 1.5,
        layer: layers::METAL,
    };
    geometry.paths.push(electrode);
    geometry
}

/// Detector: a closed square outline of side `width`, centered at the origin,
/// drawn as a single thin path. Port `o1` at the left edge midpoint.
fn detector(component: &Component) -> ShapeGeometry {
    let size = component.params.number_or("width", DEFAULT_WIDTH);
    let half = size / 2.0;
    let (x, y) = (component.x, component.y);
    let points = vec![
        Point::new(x - half, y - half),
        Point::new(x + half, y - half),
        Point::new(x + half, y + half),
        Point::new(x - half, y + half),
        Point::new(x - half, y - half),
    ];
    ShapeGeometry {
        paths: vec![ShapePath {
            points,
            width: size / 10.0,
            layer: layers::DETECTOR,
        }],
        ports: HashMap::from([("o1".to_string(), Point::new(x - half, y))]),
    }
}

/// Source: a circular outline of radius `width / 2`, approximated by a closed
/// [CIRCLE_SEGMENTS]-segment polygon, drawn as a single thin path.
/// Port `o1` on the rightmost rim point.
fn source(component: &Component) -> ShapeGeometry {
    let width = component.params.number_or("width", DEFAULT_WIDTH);
    let radius = width / 2.0;
    let (x, y) = (component.x, component.y);
    let mut points = Vec::with_capacity(CIRCLE_SEGMENTS + 1);
    for i in 0..=CIRCLE_SEGMENTS {
        let angle = (i as f64 / CIRCLE_SEGMENTS as f64) * 2.0 * std::f64::consts::PI;
        points.push(Point::new(
            x + radius * angle.cos(),
            y + radius * angle.sin(),
        ));
    }
    ShapeGeometry {
        paths: vec![ShapePath {
            points,
            width: width / 10.0,
            layer: layers::SOURCE,
        }],
        ports: HashMap::from([("o1".to_string(), Point::new(x + radius, y))]),
    }
}

///
/// # Circuit to GDSII Exporter
///
/// Deterministic, one-shot translation from a validated circuit to a complete
/// GDSII stream. Construct per export call; no state survives [GdsExporter::export].
///
/// The geometry phase is best-effort and non-throwing: unsupported component
/// kinds draw nothing, and connections whose endpoints cannot be resolved are
/// skipped with a logged diagnostic. The only failures surfaced are
/// writer-level ones (record overflow, io).
///
#[derive(Debug)]
pub struct GdsExporter<'a> {
    components: &'a [Component],
    connections: &'a [Connection],
}
impl<'a> GdsExporter<'a> {
    /// Create a new [GdsExporter] over `components` and `connections`
    pub fn new(components: &'a [Component], connections: &'a [Connection]) -> Self {
        Self {
            components,
            connections,
        }
    }
    /// Export to an in-memory byte buffer
    pub fn export(&self) -> GdsResult<Vec<u8>> {
        let mut bytes = Vec::new();
        let mut wr = GdsWriter::new(&mut bytes);
        self.export_into(&mut wr)?;
        drop(wr);
        Ok(bytes)
    }
    /// Export through writer `wr`
    pub fn export_into(&self, wr: &mut GdsWriter) -> GdsResult<()> {
        let dates = GdsDateTimes::default();
        wr.write_header(LIB_NAME, &GdsUnits::default(), &dates)?;
        wr.start_structure(TOP_STRUCT_NAME, &dates)?;

        // Component pass: draw each shape, collecting its resolved ports
        // for the connection pass.
        let mut resolved = Vec::with_capacity(self.components.len());
        for component in self.components.iter() {
            let geometry = shape_geometry(component);
            for path in geometry.paths.iter() {
                wr.write_path(&flatten(&path.points), path.width, path.layer)?;
            }
            resolved.push(geometry.ports);
        }

        // Connection pass: one straight waveguide path per resolvable connection
        for (index, connection) in self.connections.iter().enumerate() {
            let source = self.resolve_port(&resolved, &connection.source);
            let target = self.resolve_port(&resolved, &connection.target);
            match (source, target) {
                (Some(src), Some(tgt)) => wr.write_path(
                    &[(src.x, src.y), (tgt.x, tgt.y)],
                    CONNECTION_WIDTH,
                    layers::WAVEGUIDE,
                )?,
                _ => log::warn!(
                    "Skipping connection {}: unresolved endpoint ({}:{} -> {}:{})",
                    index,
                    connection.source.component,
                    connection.source.port,
                    connection.target.component,
                    connection.target.port,
                ),
            }
        }

        // Label pass: one text element per component, supported or not
        for (index, component) in self.components.iter().enumerate() {
            wr.write_text(
                &format!("{}_{}", component.kind, index),
                (component.x + LABEL_OFFSET, component.y + LABEL_OFFSET),
                layers::TEXT,
            )?;
        }

        wr.end_structure()?;
        wr.end_library()
    }
    /// Resolve `port_ref` to an absolute position.
    /// Prefers the port positions computed by the component's shape routine;
    /// falls back to the component's declared offset-from-origin ports.
    /// Returns `None` for out-of-range component indices and unknown port names.
    fn resolve_port(
        &self,
        resolved: &[HashMap<String, Point>],
        port_ref: &PortRef,
    ) -> Option<Point> {
        if let Some(point) = resolved.get(port_ref.component)?.get(&port_ref.port) {
            return Some(*point);
        }
        let component = self.components.get(port_ref.component)?;
        let offset = component.ports.get(&port_ref.port)?;
        Some(Point::new(component.x + offset.x, component.y + offset.y))
    }
}

/// Convert a point-slice to the coordinate-pair form the writer consumes
fn flatten(points: &[Point]) -> Vec<(f64, f64)> {
    points.iter().map(|p| (p.x, p.y)).collect()
}
