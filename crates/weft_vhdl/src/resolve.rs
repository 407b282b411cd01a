//! Pre-emission graph fixups.
//!
//! VHDL cannot associate the formal port of one instance directly with
//! the formal port of another, so every instance-port to instance-port
//! edge gets a signal spliced into it in the enclosing component before
//! emission.

use weft_common::Result;
use weft_ir::{Design, GraphId, NodeClass, NodeId};

fn instance_of_port(design: &Design, node: NodeId) -> Option<GraphId> {
    if design.nodes[node].class() != NodeClass::Port {
        return None;
    }
    let parent = design.nodes[node].parent().or_else(|| {
        design.nodes[node]
            .array()
            .and_then(|a| design.arrays[a].parent())
    })?;
    (!design.graphs[parent].is_component()).then_some(parent)
}

/// Splices a signal into every edge that runs between the ports of two
/// instances inside `component`. The signal lands on the component and
/// is named after the source instance and port.
pub fn resolve_port_to_port(design: &mut Design, component: GraphId) -> Result<()> {
    let candidates: Vec<_> = design
        .all_edges(component)
        .into_iter()
        .filter_map(|edge| {
            let src = design.edges[edge].src()?;
            let dst = design.edges[edge].dst()?;
            let src_inst = instance_of_port(design, src)?;
            instance_of_port(design, dst)?;
            Some((edge, src_inst))
        })
        .collect();
    for (edge, src_inst) in candidates {
        let prefix = format!("{}_", design.graphs[src_inst].name);
        let signal = design.insert_signal(edge, &prefix, Some(component))?;
        log::debug!(
            "inserted signal {} between instance ports",
            design.nodes[signal].name
        );
    }
    Ok(())
}
