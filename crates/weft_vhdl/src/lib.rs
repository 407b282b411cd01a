//! VHDL backend: lowers finished component graphs to design-unit text.
//!
//! The entry point is [`generate`], which fixes up port-to-port edges,
//! then writes one design unit (library clauses, entity, architecture)
//! per requested component to a caller-supplied sink.

#![warn(missing_docs)]

pub mod arch;
pub mod assign;
pub mod block;
pub mod decl;
pub mod inst;
pub mod resolve;
pub mod types;

use std::io::Write;
use weft_common::{Error, Result};
use weft_ir::{Design, GraphId};

pub use arch::{architecture, design_unit, is_primitive, library_clauses};
pub use assign::{assignment_lines, lower_connection, MappedWire};
pub use block::{Block, Line, MultiBlock};
pub use decl::{component_decl, entity_decl, generic_lines, port_lines, signal_lines};
pub use inst::instantiation;
pub use resolve::resolve_port_to_port;
pub use types::{filter_for_vhdl, physical_leaves, META_LIBRARY, META_PACKAGE, META_PRIMITIVE};

/// Generates the design units for the given components, in order, and
/// writes them to `sink` in one shot. Primitive components are skipped,
/// since their declarations exist elsewhere.
pub fn generate<W: Write>(
    design: &mut Design,
    components: &[GraphId],
    sink: &mut W,
) -> Result<()> {
    let mut units = vec![file_header()];
    for &component in components {
        if is_primitive(design, component) {
            log::debug!(
                "skipping generation of primitive component {}",
                design.graphs[component].name
            );
            continue;
        }
        log::info!(
            "generating design unit for component {}",
            design.graphs[component].name
        );
        resolve_port_to_port(design, component)?;
        units.push(design_unit(design, component)?);
    }
    sink.write_all(units.join("\n").as_bytes())
        .map_err(|e| Error::internal(format!("failed to write generated design: {e}")))?;
    Ok(())
}

/// The comment banner at the top of every generated file.
fn file_header() -> String {
    [
        "-- This file was generated. Manual edits will be lost on the",
        "-- next generator run.",
        "",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_ir::Dir;

    #[test]
    fn generate_writes_one_unit_per_component() {
        let mut d = Design::new();
        let bit = d.bit_type();
        let a = d.component("alpha");
        let pa = d.port("x", bit, Dir::In);
        d.add_node_object(a, pa).unwrap();
        let b = d.component("beta");
        let pb = d.port("y", bit, Dir::Out);
        d.add_node_object(b, pb).unwrap();

        let mut sink = Vec::new();
        generate(&mut d, &[a, b], &mut sink).unwrap();
        let text = String::from_utf8(sink).unwrap();
        assert!(text.starts_with("-- This file was generated."));
        assert!(text.contains("entity alpha is"));
        assert!(text.contains("entity beta is"));
    }

    #[test]
    fn generate_resolves_port_to_port_edges() {
        let mut d = Design::new();
        let bit = d.bit_type();
        let producer = d.component("producer");
        let q = d.port("q", bit, Dir::Out);
        d.add_node_object(producer, q).unwrap();
        let consumer = d.component("consumer");
        let ain = d.port("a", bit, Dir::In);
        d.add_node_object(consumer, ain).unwrap();

        let top = d.component("top");
        let p0 = d.instance("p0", producer).unwrap();
        let c0 = d.instance("c0", consumer).unwrap();
        d.add_child(top, p0).unwrap();
        d.add_child(top, c0).unwrap();
        let pq = d.graph_port(p0, "q").unwrap();
        let ca = d.graph_port(c0, "a").unwrap();
        d.connect(ca, pq).unwrap();

        let mut sink = Vec::new();
        generate(&mut d, &[top], &mut sink).unwrap();
        let text = String::from_utf8(sink).unwrap();
        assert!(text.contains("signal p0_q : std_logic;"));
        assert!(text.contains("q => p0_q"));
        assert!(text.contains("a => p0_q"));
    }
}
