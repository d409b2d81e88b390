//!
//! # Circuit Validation Module
//!
//! Structural and parametric checks run *before* export, by the caller's
//! choice. The exporter itself stays best-effort; this is the typed front
//! door for rejecting bad designs.
//!

// Std-Lib Imports
use std::collections::HashSet;

// Local Imports
use crate::data::{CircuitDesign, Component, Connection};
use crate::gds::shape_geometry;

/// Per-parameter valid ranges, in micrometers: (key, exclusive minimum, inclusive maximum).
/// Checked only where the parameter is present; absence is not an error.
const PARAM_BOUNDS: [(&str, f64, f64); 4] = [
    ("width", 0.0, 5.0),
    ("length", 0.0, 1000.0),
    ("radius", 5.0, 100.0),
    ("gap", 0.1, 2.0),
];

/// # Circuit Validator
///
/// Collects every finding in a design rather than stopping at the first.
/// Hard errors and `Warning:`-prefixed advisories share the returned list;
/// an empty list means the design is fit for export.
pub struct CircuitValidator;
impl CircuitValidator {
    /// Validate `design`: per-component parameters and placement,
    /// per-connection endpoint resolvability, and circuit-level rules.
    pub fn validate(design: &CircuitDesign) -> Vec<String> {
        let mut errors = Vec::new();
        for component in design.components.iter() {
            Self::validate_component(component, &mut errors);
        }
        for connection in design.connections.iter() {
            Self::validate_connection(connection, &design.components, &mut errors);
        }
        Self::validate_circuit_rules(design, &mut errors);
        errors
    }
    /// Check one component's parameter ranges and placement
    fn validate_component(component: &Component, errors: &mut Vec<String>) {
        for (key, min, max) in PARAM_BOUNDS.iter() {
            if let Some(value) = component.params.number(key) {
                if value <= *min || value > *max {
                    errors.push(format!(
                        "Component {}: {} must be between {} and {} µm",
                        component.id, key, min, max
                    ));
                }
            }
        }
        if !component.x.is_finite() || !component.y.is_finite() {
            errors.push(format!("Component {}: invalid position", component.id));
        }
    }
    /// Check both of a connection's endpoints:
    /// the component index must be in range, and the named port must either be
    /// produced by the component's shape routine or declared on the component.
    fn validate_connection(
        connection: &Connection,
        components: &[Component],
        errors: &mut Vec<String>,
    ) {
        for (end, port_ref) in [("source", &connection.source), ("target", &connection.target)] {
            match components.get(port_ref.component) {
                None => errors.push(format!(
                    "Connection error: {} component {} not found",
                    end, port_ref.component
                )),
                Some(component) => {
                    let resolvable = shape_geometry(component).ports.contains_key(&port_ref.port)
                        || component.ports.contains_key(&port_ref.port);
                    if !resolvable {
                        errors.push(format!(
                            "Connection error: {} port {} not found on component {}",
                            end, port_ref.port, component.id
                        ));
                    }
                }
            }
        }
    }
    /// Circuit-level advisories: isolated components and feedback loops
    fn validate_circuit_rules(design: &CircuitDesign, errors: &mut Vec<String>) {
        let mut connected = HashSet::new();
        for connection in design.connections.iter() {
            connected.insert(connection.source.component);
            connected.insert(connection.target.component);
        }
        for (index, component) in design.components.iter().enumerate() {
            if !connected.contains(&index) {
                errors.push(format!(
                    "Warning: Component {} ({}) is isolated",
                    component.id, component.kind
                ));
            }
        }
        if Self::has_feedback_loop(design) {
            errors.push("Warning: Circuit contains feedback loops".to_string());
        }
    }
    /// Cycle detection over the directed connection graph
    fn has_feedback_loop(design: &CircuitDesign) -> bool {
        fn dfs(
            node: usize,
            connections: &[Connection],
            visited: &mut HashSet<usize>,
            stack: &mut HashSet<usize>,
        ) -> bool {
            if stack.contains(&node) {
                return true;
            }
            if !visited.insert(node) {
                return false;
            }
            stack.insert(node);
            for connection in connections.iter().filter(|c| c.source.component == node) {
                if dfs(connection.target.component, connections, visited, stack) {
                    return true;
                }
            }
            stack.remove(&node);
            false
        }
        let mut visited = HashSet::new();
        let mut stack = HashSet::new();
        for index in 0..design.components.len() {
            if dfs(index, &design.connections, &mut visited, &mut stack) {
                return true;
            }
        }
        false
    }
}
