//! Whole-design-unit assembly: entity plus architecture.

use crate::assign::assignment_lines;
use crate::block::{Block, MultiBlock};
use crate::decl::{component_decl, constant_lines, entity_decl, signal_lines};
use crate::inst::instantiation;
use crate::types::{META_LIBRARY, META_PRIMITIVE};
use weft_common::Result;
use weft_ir::{Design, GraphId, NodeClass};

/// Whether a component is tagged as a pre-existing library primitive.
pub fn is_primitive(design: &Design, component: GraphId) -> bool {
    design.graphs[component].meta.contains_key(META_PRIMITIVE)
}

fn indent_into(target: &mut Block, source: Block, levels: usize) {
    let pad = "  ".repeat(levels);
    for line in source.render().lines() {
        if line.is_empty() {
            target.add_text("");
        } else {
            target.add_text(format!("{pad}{line}"));
        }
    }
}

/// Library clauses: the ieee defaults plus one per distinct library a
/// primitive child component names in its metadata.
pub fn library_clauses(design: &Design, component: GraphId) -> Block {
    let mut block = Block::new();
    block.add_text("library ieee;");
    block.add_text("use ieee.std_logic_1164.all;");
    block.add_text("use ieee.numeric_std.all;");
    let mut seen: Vec<String> = Vec::new();
    for child in design.unique_children(component) {
        if let Some(lib) = design.graphs[child].meta.get(META_LIBRARY) {
            if !seen.contains(lib) {
                seen.push(lib.clone());
            }
        }
    }
    for lib in seen {
        block.add_text(format!("library {lib};"));
        block.add_text(format!("use {lib}.all;"));
    }
    block
}

/// The architecture body of a component: nested component declarations
/// (primitives skipped), constants, signals, then instantiations and
/// assignment statements.
pub fn architecture(design: &mut Design, component: GraphId) -> Result<Block> {
    let name = design.graphs[component].name.clone();
    let mut block = Block::new();
    block.add_text(format!("architecture Implementation of {name} is"));

    for child in design.unique_children(component) {
        if is_primitive(design, child) {
            log::debug!(
                "skipping declaration of primitive component {}",
                design.graphs[child].name
            );
            continue;
        }
        let decl = component_decl(design, child)?;
        indent_into(&mut block, decl, 1);
    }
    let constants = constant_lines(design, component)?;
    indent_into(&mut block, constants, 1);
    let signals = signal_lines(design, component)?;
    indent_into(&mut block, signals, 1);

    block.add_text("begin");
    for child in design.children(component) {
        let stmt = instantiation(design, child)?;
        indent_into(&mut block, stmt, 1);
    }
    for target in assignment_targets(design, component) {
        let lines = assignment_lines(design, target)?;
        indent_into(&mut block, lines, 1);
    }
    block.add_text("end architecture;");
    Ok(block)
}

/// Nodes whose drivers become assignment statements: the component's
/// own signals, ports, and array elements, excluding those driven by
/// an instance port, which the instantiation's port map already wires.
fn assignment_targets(design: &Design, component: GraphId) -> Vec<weft_ir::NodeId> {
    let mut nodes = Vec::new();
    for class in [NodeClass::Signal, NodeClass::Port] {
        nodes.extend(design.nodes_of_class(component, class));
        for array in design.arrays_of_class(component, class) {
            nodes.extend(design.arrays[array].nodes().iter().copied());
        }
    }
    nodes.retain(|&node| {
        let Some(edge) = design.nodes[node].input() else {
            return false;
        };
        let Some(src) = design.edges[edge].src() else {
            return false;
        };
        let src_owner = design.nodes[src].parent().or_else(|| {
            design.nodes[src]
                .array()
                .and_then(|a| design.arrays[a].parent())
        });
        match src_owner {
            Some(owner) => design.graphs[owner].is_component(),
            None => true,
        }
    });
    nodes
}

/// One complete VHDL design unit for a component: library clauses,
/// entity declaration, architecture.
pub fn design_unit(design: &mut Design, component: GraphId) -> Result<String> {
    let mut out = MultiBlock::new();
    let mut header = library_clauses(design, component);
    header.add_text("");
    out.add(header);
    let mut entity = entity_decl(design, component)?;
    entity.add_text("");
    out.add(entity);
    out.add(architecture(design, component)?);
    Ok(out.render())
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_ir::Dir;

    #[test]
    fn design_unit_contains_all_sections() {
        let mut d = Design::new();
        let bit = d.bit_type();
        let worker = d.component("worker");
        let q = d.port("q", bit, Dir::Out);
        d.add_node_object(worker, q).unwrap();

        let top = d.component("top");
        let result = d.port("result", bit, Dir::Out);
        d.add_node_object(top, result).unwrap();
        let w0 = d.instance("w0", worker).unwrap();
        d.add_child(top, w0).unwrap();
        let s = d.signal("buffered", bit);
        d.add_node_object(top, s).unwrap();
        let wq = d.graph_port(w0, "q").unwrap();
        d.connect(s, wq).unwrap();
        d.connect(result, s).unwrap();

        let text = design_unit(&mut d, top).unwrap();
        assert!(text.starts_with("library ieee;\n"));
        assert!(text.contains("entity top is"));
        assert!(text.contains("port (\n    result : out std_logic\n  );"));
        assert!(text.contains("architecture Implementation of top is"));
        assert!(text.contains("  component worker is"));
        assert!(text.contains("  signal buffered : std_logic;"));
        assert!(text.contains("  w0 : worker"));
        assert!(text.contains("q => buffered"));
        assert!(text.contains("  result <= buffered;"));
        assert!(text.ends_with("end architecture;\n"));
        // The signal is wired by the port map, not by an assignment.
        assert!(!text.contains("buffered <= q"));
    }

    #[test]
    fn primitive_children_are_not_redeclared() {
        let mut d = Design::new();
        let bit = d.bit_type();
        let prim = d.component("ram_block");
        d.graphs[prim]
            .meta
            .insert(META_PRIMITIVE.to_string(), "true".to_string());
        d.graphs[prim]
            .meta
            .insert(META_LIBRARY.to_string(), "vendor_lib".to_string());
        let q = d.port("q", bit, Dir::Out);
        d.add_node_object(prim, q).unwrap();

        let top = d.component("top");
        let r0 = d.instance("r0", prim).unwrap();
        d.add_child(top, r0).unwrap();

        let text = design_unit(&mut d, top).unwrap();
        assert!(!text.contains("component ram_block"));
        assert!(text.contains("library vendor_lib;"));
        assert!(text.contains("r0 : ram_block"));
    }
}
