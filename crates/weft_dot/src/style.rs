//! Visual styling for diagram output.

use weft_ir::{Design, NodeClass, TypeId, TypeKind};

/// Styling knobs for the graph writer.
#[derive(Debug, Clone)]
pub struct Style {
    /// Fill colors per node class, as graphviz color names.
    pub port_color: &'static str,
    /// Fill color for signals.
    pub signal_color: &'static str,
    /// Fill color for parameters.
    pub parameter_color: &'static str,
    /// Fill color for expressions.
    pub expression_color: &'static str,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            port_color: "lightsteelblue",
            signal_color: "honeydew",
            parameter_color: "lemonchiffon",
            expression_color: "lavender",
        }
    }
}

impl Style {
    /// The attribute list for a node of the given class.
    pub fn node_attrs(&self, class: NodeClass) -> String {
        match class {
            NodeClass::Port => format!("shape=box, style=filled, fillcolor={}", self.port_color),
            NodeClass::Signal => format!(
                "shape=diamond, style=filled, fillcolor={}",
                self.signal_color
            ),
            NodeClass::Parameter => format!(
                "shape=note, style=filled, fillcolor={}",
                self.parameter_color
            ),
            NodeClass::Expression => format!(
                "shape=oval, style=filled, fillcolor={}",
                self.expression_color
            ),
            NodeClass::Literal => "shape=plaintext".to_string(),
        }
    }

    /// The attribute list for an edge, styled by the source node class
    /// and the wire's type: stream edges draw heavier, clock and reset
    /// edges dotted and grayed.
    pub fn edge_attrs(&self, design: &Design, src_class: NodeClass, ty: TypeId) -> String {
        let mut attrs: Vec<String> = Vec::new();
        match design.types[ty].kind {
            TypeKind::Stream { .. } => attrs.push("penwidth=3".to_string()),
            TypeKind::Clock { .. } | TypeKind::Reset { .. } => {
                attrs.push("style=dotted, color=gray50".to_string())
            }
            _ => {}
        }
        if src_class == NodeClass::Parameter {
            attrs.push("style=dashed, arrowhead=open".to_string());
        }
        attrs.join(", ")
    }
}
