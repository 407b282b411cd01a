//! Entity, component, generic, port and signal declarations.

use crate::block::{Block, Line};
use crate::types::{declared_width, physical_leaves, wire_type};
use weft_common::Result;
use weft_ir::{Design, Dir, GraphId, NodeClass, NodeKind, TypeKind};

fn generic_type(design: &Design, ty: weft_ir::TypeId) -> &'static str {
    match design.types[ty].kind {
        TypeKind::Natural => "natural",
        TypeKind::Str => "string",
        TypeKind::Boolean => "boolean",
        _ => "integer",
    }
}

/// One line per parameter, in declaration order:
/// `NAME : integer := default`.
pub fn generic_lines(design: &Design, graph: GraphId) -> Block {
    let mut block = Block::new();
    for param in design.nodes_of_class(graph, NodeClass::Parameter) {
        let mut line = Line::new();
        line.add(format!("{} ", design.nodes[param].name));
        line.add(format!(": {}", generic_type(design, design.nodes[param].ty)));
        if let Some(value) = design.param_value(param) {
            line.append(&format!(" := {}", design.node_text(value)));
        }
        line.append(";");
        block.add(line);
    }
    trim_trailing_semicolon(&mut block);
    block
}

/// One line per physical leaf of every port and port array, in
/// declaration order. Inverted leaves flip the port direction, and an
/// array leaf is declared `size` times as wide as one element.
pub fn port_lines(design: &mut Design, graph: GraphId) -> Result<Block> {
    let mut block = Block::new();
    for port in design.nodes_of_class(graph, NodeClass::Port) {
        let name = design.nodes[port].name.clone();
        let ty = design.nodes[port].ty;
        let dir = design.nodes[port].dir();
        leaf_lines(design, &mut block, &name, ty, dir, None)?;
    }
    for array in design.arrays_of_class(graph, NodeClass::Port) {
        let name = design.arrays[array].name.clone();
        let base = design.arrays[array].base();
        let size = design.arrays[array].size();
        let ty = design.nodes[base].ty;
        let dir = design.nodes[base].dir();
        leaf_lines(design, &mut block, &name, ty, dir, Some(size))?;
    }
    trim_trailing_semicolon(&mut block);
    Ok(block)
}

fn leaf_lines(
    design: &mut Design,
    block: &mut Block,
    root: &str,
    ty: weft_ir::TypeId,
    dir: Dir,
    array_size: Option<weft_ir::NodeId>,
) -> Result<()> {
    for leaf in physical_leaves(design, ty)? {
        let leaf_dir = if leaf.invert { dir.reverse() } else { dir };
        let width = scaled_width(design, declared_width(design, &leaf), array_size)?;
        let mut line = Line::new();
        line.add(format!("{} ", leaf.name(root, "_")));
        line.add(format!(": {} ", leaf_dir.as_str()));
        line.add(wire_type(design, width)?);
        line.append(";");
        block.add(line);
    }
    Ok(())
}

fn scaled_width(
    design: &mut Design,
    width: Option<weft_ir::NodeId>,
    array_size: Option<weft_ir::NodeId>,
) -> Result<Option<weft_ir::NodeId>> {
    let Some(size) = array_size else {
        return Ok(width);
    };
    // An array of scalars still declares a vector, one bit per element.
    let unit = match width {
        Some(w) => w,
        None => design.one(),
    };
    let scaled = design.mul_nodes(unit, size);
    Ok(Some(design.minimize(scaled)?))
}

/// One line per signal and signal-array leaf:
/// `signal name : std_logic...;`.
pub fn signal_lines(design: &mut Design, graph: GraphId) -> Result<Block> {
    let mut block = Block::new();
    let mut targets: Vec<(String, weft_ir::TypeId, Option<weft_ir::NodeId>)> = Vec::new();
    for signal in design.nodes_of_class(graph, NodeClass::Signal) {
        targets.push((design.nodes[signal].name.clone(), design.nodes[signal].ty, None));
    }
    for array in design.arrays_of_class(graph, NodeClass::Signal) {
        let base = design.arrays[array].base();
        targets.push((
            design.arrays[array].name.clone(),
            design.nodes[base].ty,
            Some(design.arrays[array].size()),
        ));
    }
    for (name, ty, size) in targets {
        for leaf in physical_leaves(design, ty)? {
            let width = scaled_width(design, declared_width(design, &leaf), size)?;
            let mut line = Line::new();
            line.add(format!("signal {} ", leaf.name(&name, "_")));
            line.add(format!(": {};", wire_type(design, width)?));
            block.add(line);
        }
    }
    Ok(block)
}

/// Constant declarations for unowned literal-driven parameters.
pub fn constant_lines(design: &mut Design, graph: GraphId) -> Result<Block> {
    let mut block = Block::new();
    for node in design.implicit_nodes(graph) {
        if design.nodes[node].class() != NodeClass::Expression
            && design.nodes[node].class() != NodeClass::Literal
        {
            let mut line = Line::new();
            line.add(format!("constant {} ", design.nodes[node].name));
            line.add(format!(
                ": {} := {};",
                generic_type(design, design.nodes[node].ty),
                design
                    .param_value(node)
                    .map(|v| design.node_text(v))
                    .unwrap_or_else(|| "0".to_string())
            ));
            block.add(line);
        }
    }
    Ok(block)
}

fn interface_block(design: &mut Design, graph: GraphId) -> Result<Block> {
    let mut block = Block::new();
    let generics = generic_lines(design, graph);
    if !generics.is_empty() {
        block.add_text("generic (");
        block.extend(reindent(generics));
        block.add_text(");");
    }
    let ports = port_lines(design, graph)?;
    if !ports.is_empty() {
        block.add_text("port (");
        block.extend(reindent(ports));
        block.add_text(");");
    }
    Ok(block)
}

// Blocks keep their own indent when rendered standalone; when folded
// into an outer block the lines must carry the deeper indent themselves.
fn reindent(block: Block) -> Block {
    let mut out = Block::new();
    for line in block.render().lines() {
        out.add_text(format!("  {line}"));
    }
    out
}

/// The `component ... end component;` declaration of a component.
pub fn component_decl(design: &mut Design, graph: GraphId) -> Result<Block> {
    let mut block = Block::new();
    block.add_text(format!("component {} is", design.graphs[graph].name));
    block.extend(reindent(interface_block(design, graph)?));
    block.add_text("end component;");
    Ok(block)
}

/// The `entity ... end entity;` declaration of a component.
pub fn entity_decl(design: &mut Design, graph: GraphId) -> Result<Block> {
    let mut block = Block::new();
    block.add_text(format!("entity {} is", design.graphs[graph].name));
    block.extend(reindent(interface_block(design, graph)?));
    block.add_text("end entity;");
    Ok(block)
}

fn trim_trailing_semicolon(block: &mut Block) {
    if block.is_empty() {
        return;
    }
    let rendered = block.render();
    let mut out = Block::new();
    let lines: Vec<&str> = rendered.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        if i + 1 == lines.len() {
            out.add_text(line.trim_end_matches(';').trim_end().to_string());
        } else {
            out.add_text(line.to_string());
        }
    }
    *block = out;
}
