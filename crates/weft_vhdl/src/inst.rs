//! Component instantiation statements.

use crate::assign::lower_connection;
use crate::block::{Block, Line};
use weft_common::{Error, Result};
use weft_ir::{Design, Dir, GraphId, NodeClass, NodeId};

/// The nodes a port of an instance is wired to: its driver for an `in`
/// port, its complete readers for an `out` port.
fn connected_nodes(design: &Design, port: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    if let Some(edge) = design.nodes[port].input() {
        if let Some(src) = design.edges[edge].src() {
            out.push(src);
        }
    }
    for &edge in design.nodes[port].outputs() {
        if let Some(dst) = design.edges[edge].dst() {
            out.push(dst);
        }
    }
    out
}

/// The `inst : component generic map (...) port map (...);` statement
/// for one instance. Ports with no complete edge are left unmapped.
pub fn instantiation(design: &mut Design, inst: GraphId) -> Result<Block> {
    let component = design.component_of(inst).ok_or_else(|| {
        Error::internal(format!(
            "graph {} is not an instance",
            design.graphs[inst].name
        ))
    })?;
    let mut block = Block::new();
    block.add_text(format!(
        "{} : {}",
        design.graphs[inst].name, design.graphs[component].name
    ));

    let mut generics = Block::indented(2);
    for param in design.nodes_of_class(inst, NodeClass::Parameter) {
        if let Some(value) = design.param_value(param) {
            let value = design.minimize(value)?;
            let mut line = Line::new();
            line.add(format!("{} ", design.nodes[param].name));
            line.add(format!("=> {},", design.node_text(value)));
            generics.add(line);
        }
    }
    if !generics.is_empty() {
        trim_comma(&mut generics);
        block.add_text("  generic map (");
        block.extend(generics);
        block.add_text("  )");
    }

    let mut ports = Block::indented(2);
    let mut targets: Vec<NodeId> = design.nodes_of_class(inst, NodeClass::Port);
    for array in design.arrays_of_class(inst, NodeClass::Port) {
        targets.extend(design.arrays[array].nodes().iter().copied());
    }
    for port in targets {
        for other in connected_nodes(design, port) {
            for wire in lower_connection(design, port, other)? {
                let mut line = Line::new();
                line.add(format!("{} ", wire.a));
                line.add(format!("=> {},", wire.b));
                ports.add(line);
            }
        }
    }
    if !ports.is_empty() {
        trim_comma(&mut ports);
        block.add_text("  port map (");
        block.extend(ports);
        block.add_text("  )");
    }
    block.append_last(";");
    Ok(block)
}

fn trim_comma(block: &mut Block) {
    let rendered = block.render();
    let mut out = Block::new();
    let lines: Vec<&str> = rendered.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        if i + 1 == lines.len() {
            out.add_text(line.trim_end_matches(',').trim_end().to_string());
        } else {
            out.add_text(line.to_string());
        }
    }
    *block = out;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instantiation_binds_generics_and_ports() {
        let mut d = Design::new();
        let bit = d.bit_type();
        let comp = d.component("worker");
        let eight = d.int_literal(8);
        let width = d.parameter("WIDTH", d.integer_type(), Some(eight));
        d.add_node_object(comp, width).unwrap();
        let q = d.port("q", bit, Dir::Out);
        d.add_node_object(comp, q).unwrap();

        let top = d.component("top");
        let inst = d.instance("worker0", comp).unwrap();
        d.add_child(top, inst).unwrap();
        let sink = d.signal("sink", bit);
        d.add_node_object(top, sink).unwrap();
        let iq = d.graph_port(inst, "q").unwrap();
        d.connect(sink, iq).unwrap();
        let iw = d.graph_parameter(inst, "WIDTH").unwrap();
        let four = d.int_literal(4);
        d.connect(iw, four).unwrap();

        let text = instantiation(&mut d, inst).unwrap().render();
        assert_eq!(
            text,
            "worker0 : worker\n  generic map (\n    WIDTH => 4\n  )\n  port map (\n    q => sink\n  );\n"
        );
    }

    #[test]
    fn array_ports_map_formal_slices() {
        let mut d = Design::new();
        let v8 = d.vec_type(8);
        let comp = d.component("worker");
        let base = d.port("x", v8, Dir::In);
        let zero = d.int_literal(0);
        let arr = d.node_array("x", base, zero);
        d.add_array_object(comp, arr).unwrap();
        d.array_append(arr).unwrap();
        d.array_append(arr).unwrap();

        let top = d.component("top");
        let inst = d.instance("worker0", comp).unwrap();
        d.add_child(top, inst).unwrap();
        let iarr = d.graph_array(inst, NodeClass::Port, "x").unwrap();
        let elems: Vec<_> = d.arrays[iarr].nodes().to_vec();
        let s0 = d.signal("s0", v8);
        let s1 = d.signal("s1", v8);
        d.add_node_object(top, s0).unwrap();
        d.add_node_object(top, s1).unwrap();
        d.connect(elems[0], s0).unwrap();
        d.connect(elems[1], s1).unwrap();

        let text = instantiation(&mut d, inst).unwrap().render();
        assert_eq!(
            text,
            "worker0 : worker\n  port map (\n    x(7 downto 0)  => s0,\n    x(15 downto 8) => s1\n  );\n"
        );
    }
}
