//! Diagram backend: renders component trees as graphviz digraphs.
//!
//! Each component becomes a cluster, with its parameters, ports and
//! signals grouped into nested layout clusters and its instances
//! rendered recursively. Edges are styled by source-node class and wire
//! type, deduplicated by identity, and skip literal endpoints.

#![warn(missing_docs)]

pub mod style;

use std::collections::BTreeSet;
use std::io::Write;
use weft_common::{Error, Result};
use weft_ir::{flatten, Design, EdgeId, GraphId, NodeClass, NodeId, TypeKind};

pub use style::Style;

/// Rendering options.
#[derive(Debug, Clone)]
pub struct Config {
    /// Expand record and stream wires into nested table labels.
    pub expand_types: bool,
    /// Include parameter nodes and their value edges.
    pub show_parameters: bool,
    /// Visual styling.
    pub style: Style,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            expand_types: false,
            show_parameters: true,
            style: Style::default(),
        }
    }
}

/// Writes component trees as graphviz digraphs.
#[derive(Debug, Default)]
pub struct Grapher {
    config: Config,
}

impl Grapher {
    /// A grapher with the given options.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Renders one component tree as a digraph.
    pub fn digraph(&self, design: &Design, component: GraphId) -> Result<String> {
        let mut out = String::new();
        out.push_str("digraph {\n");
        out.push_str("  rankdir=LR;\n");
        out.push_str("  splines=ortho;\n");
        let mut seen = BTreeSet::new();
        self.subgraph(design, component, 1, &mut out)?;
        self.edges(design, component, &mut seen, &mut out)?;
        out.push_str("}\n");
        Ok(out)
    }

    /// Renders a component tree and writes it to a sink in one shot.
    pub fn write<W: Write>(&self, design: &Design, component: GraphId, sink: &mut W) -> Result<()> {
        log::info!(
            "rendering diagram for component {}",
            design.graphs[component].name
        );
        let text = self.digraph(design, component)?;
        sink.write_all(text.as_bytes())
            .map_err(|e| Error::internal(format!("failed to write diagram: {e}")))
    }

    fn subgraph(
        &self,
        design: &Design,
        graph: GraphId,
        depth: usize,
        out: &mut String,
    ) -> Result<()> {
        let pad = "  ".repeat(depth);
        let name = &design.graphs[graph].name;
        out.push_str(&format!("{pad}subgraph cluster_{} {{\n", ident(name)));
        out.push_str(&format!("{pad}  label=\"{name}\";\n"));

        let groups: [(&str, NodeClass); 3] = [
            ("params", NodeClass::Parameter),
            ("ports", NodeClass::Port),
            ("signals", NodeClass::Signal),
        ];
        for (cluster, class) in groups {
            if class == NodeClass::Parameter && !self.config.show_parameters {
                continue;
            }
            let nodes = design.nodes_of_class(graph, class);
            let arrays = design.arrays_of_class(graph, class);
            if nodes.is_empty() && arrays.is_empty() {
                continue;
            }
            out.push_str(&format!(
                "{pad}  subgraph cluster_{}_{cluster} {{\n",
                ident(name)
            ));
            out.push_str(&format!("{pad}    style=invis;\n"));
            for node in nodes {
                self.node_def(design, node, depth + 2, out);
            }
            for array in arrays {
                for &element in design.arrays[array].nodes() {
                    self.node_def(design, element, depth + 2, out);
                }
            }
            out.push_str(&format!("{pad}  }}\n"));
        }
        for child in design.children(graph) {
            self.subgraph(design, child, depth + 1, out)?;
        }
        out.push_str(&format!("{pad}}}\n"));
        Ok(())
    }

    fn node_def(&self, design: &Design, node: NodeId, depth: usize, out: &mut String) {
        let pad = "  ".repeat(depth);
        let class = design.nodes[node].class();
        let label = self.node_label(design, node);
        out.push_str(&format!(
            "{pad}{} [label=\"{label}\", {}];\n",
            node_ident(node),
            self.config.style.node_attrs(class)
        ));
    }

    fn node_label(&self, design: &Design, node: NodeId) -> String {
        let mut label = design.nodes[node].name.clone();
        if let Some(array) = design.nodes[node].array() {
            if let Some(index) = design.arrays[array].index_of(node) {
                label = format!("{}[{}]", design.arrays[array].name, index);
            }
        }
        if self.config.expand_types {
            if let Some(table) = type_table(design, design.nodes[node].ty) {
                label = format!("{label}|{table}");
            }
        }
        label
    }

    fn edges(
        &self,
        design: &Design,
        graph: GraphId,
        seen: &mut BTreeSet<EdgeId>,
        out: &mut String,
    ) -> Result<()> {
        for edge in design.all_edges(graph) {
            if !seen.insert(edge) {
                continue;
            }
            let (Some(src), Some(dst)) = (design.edges[edge].src(), design.edges[edge].dst())
            else {
                continue;
            };
            if design.nodes[src].class() == NodeClass::Literal
                || design.nodes[dst].class() == NodeClass::Literal
            {
                continue;
            }
            if !self.config.show_parameters
                && (design.nodes[src].class() == NodeClass::Parameter
                    || design.nodes[dst].class() == NodeClass::Parameter)
            {
                continue;
            }
            let mut attrs = self.config.style.edge_attrs(
                design,
                design.nodes[src].class(),
                design.nodes[src].ty,
            );
            if let Some(label) = index_label(design, src, dst) {
                if !attrs.is_empty() {
                    attrs.push_str(", ");
                }
                attrs.push_str(&format!("label=\"{label}\""));
            }
            if attrs.is_empty() {
                out.push_str(&format!(
                    "  {} -> {};\n",
                    node_ident(src),
                    node_ident(dst)
                ));
            } else {
                out.push_str(&format!(
                    "  {} -> {} [{attrs}];\n",
                    node_ident(src),
                    node_ident(dst)
                ));
            }
        }
        Ok(())
    }
}

fn ident(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn node_ident(node: NodeId) -> String {
    format!("n{}", node.index())
}

/// The array indices an edge touches, rendered `[i]` or `[i->j]`.
fn index_label(design: &Design, src: NodeId, dst: NodeId) -> Option<String> {
    let idx = |n: NodeId| {
        design.nodes[n]
            .array()
            .and_then(|a| design.arrays[a].index_of(n))
    };
    match (idx(src), idx(dst)) {
        (Some(a), Some(b)) => Some(format!("[{a}->{b}]")),
        (Some(a), None) | (None, Some(a)) => Some(format!("[{a}]")),
        (None, None) => None,
    }
}

/// A nested `{...}` table describing a composite type's leaf structure,
/// or `None` for non-composite types.
fn type_table(design: &Design, ty: weft_ir::TypeId) -> Option<String> {
    if !design.types[ty].is_nested() {
        return None;
    }
    let flat = flatten(design, ty).ok()?;
    let mut parts = Vec::new();
    for ft in flat.iter().skip(1) {
        if design.types[ft.ty].is_nested() {
            continue;
        }
        let name = ft.name("", "_");
        let tag = match design.types[ft.ty].kind {
            TypeKind::Stream { .. } | TypeKind::Record { .. } => continue,
            _ => design.types[ft.ty].kind_tag(),
        };
        if name.is_empty() {
            parts.push(tag.to_string());
        } else {
            parts.push(format!("{name}:{tag}"));
        }
    }
    Some(format!("{{{}}}", parts.join("|")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_ir::{Dir, Field};

    #[test]
    fn digraph_clusters_nodes_by_class() {
        let mut d = Design::new();
        let bit = d.bit_type();
        let comp = d.component("top");
        let p = d.port("clk_in", bit, Dir::In);
        let s = d.signal("state", bit);
        d.add_node_object(comp, p).unwrap();
        d.add_node_object(comp, s).unwrap();
        d.connect(s, p).unwrap();

        let text = Grapher::default().digraph(&d, comp).unwrap();
        assert!(text.starts_with("digraph {"));
        assert!(text.contains("subgraph cluster_top {"));
        assert!(text.contains("cluster_top_ports"));
        assert!(text.contains("cluster_top_signals"));
        assert!(text.contains("label=\"clk_in\""));
        assert!(text.contains(&format!("{} -> {}", node_ident(p), node_ident(s))));
    }

    #[test]
    fn literal_edges_are_skipped() {
        let mut d = Design::new();
        let comp = d.component("top");
        let p = d.parameter("P", d.integer_type(), None);
        d.add_node_object(comp, p).unwrap();
        let five = d.int_literal(5);
        d.connect(p, five).unwrap();

        let text = Grapher::default().digraph(&d, comp).unwrap();
        assert!(!text.contains("->"));
    }

    #[test]
    fn each_edge_renders_once() {
        let mut d = Design::new();
        let bit = d.bit_type();
        let comp = d.component("top");
        let a = d.signal("a", bit);
        let b = d.signal("b", bit);
        d.add_node_object(comp, a).unwrap();
        d.add_node_object(comp, b).unwrap();
        d.connect(a, b).unwrap();

        let text = Grapher::default().digraph(&d, comp).unwrap();
        let arrow = format!("{} -> {}", node_ident(b), node_ident(a));
        assert_eq!(text.matches(&arrow).count(), 1);
    }

    #[test]
    fn array_elements_carry_index_labels() {
        let mut d = Design::new();
        let bit = d.bit_type();
        let comp = d.component("top");
        let base = d.signal("y", bit);
        let zero = d.int_literal(0);
        let arr = d.node_array("y", base, zero);
        d.add_array_object(comp, arr).unwrap();
        let e0 = d.array_append(arr).unwrap();
        let s = d.signal("s", bit);
        d.add_node_object(comp, s).unwrap();
        d.connect(s, e0).unwrap();

        let text = Grapher::default().digraph(&d, comp).unwrap();
        assert!(text.contains("label=\"y[0]\""));
        assert!(text.contains("label=\"[0]\""));
    }

    #[test]
    fn expanded_labels_show_leaf_structure() {
        let mut d = Design::new();
        let v8 = d.vec_type(8);
        let bit = d.bit_type();
        let rec = d.record("r", vec![Field::new("x", v8), Field::new("y", bit)]);
        let comp = d.component("top");
        let p = d.port("io", rec, Dir::In);
        d.add_node_object(comp, p).unwrap();

        let config = Config {
            expand_types: true,
            ..Config::default()
        };
        let text = Grapher::new(config).digraph(&d, comp).unwrap();
        assert!(text.contains("io|{x:Vec|y:Bit}"));
    }

    #[test]
    fn instances_render_as_nested_clusters() {
        let mut d = Design::new();
        let bit = d.bit_type();
        let worker = d.component("worker");
        let q = d.port("q", bit, Dir::Out);
        d.add_node_object(worker, q).unwrap();
        let top = d.component("top");
        let w0 = d.instance("w0", worker).unwrap();
        d.add_child(top, w0).unwrap();

        let text = Grapher::default().digraph(&d, top).unwrap();
        assert!(text.contains("subgraph cluster_w0 {"));
        assert!(text.contains("label=\"w0\";"));
    }
}
