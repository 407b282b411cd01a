//! VHDL views of flattened types.
//!
//! The flattener yields every visited type, including abstract ones.
//! VHDL only declares physical wires, so the list is filtered: records
//! disappear (their leaves stand alone) and each stream entry
//! materializes as a forward `valid` and a back-flowing `ready` bit.

use weft_common::Result;
use weft_ir::{flatten, Design, FlatType, NamePart, NodeId, TypeId, TypeKind};

/// Metadata key marking a component as a pre-existing library primitive
/// whose declaration must not be synthesized.
pub const META_PRIMITIVE: &str = "primitive";
/// Metadata key naming the library a primitive component lives in.
pub const META_LIBRARY: &str = "library";
/// Metadata key naming the package a primitive component lives in.
pub const META_PACKAGE: &str = "package";

/// Filters a flattened list down to what VHDL declares: physical
/// entries pass through, stream entries become `valid` plus an inverted
/// `ready` bit, and other abstract entries are dropped.
pub fn filter_for_vhdl(design: &Design, flat: &[FlatType]) -> Vec<FlatType> {
    let mut out = Vec::new();
    for ft in flat {
        match design.types[ft.ty].kind {
            TypeKind::Stream { .. } => {
                let mut valid = ft.clone();
                valid.ty = design.bit_type();
                valid.name_parts.push(NamePart::new("valid"));
                let mut ready = ft.clone();
                ready.ty = design.bit_type();
                ready.name_parts.push(NamePart::new("ready"));
                ready.invert = !ready.invert;
                out.push(valid);
                out.push(ready);
            }
            _ if design.types[ft.ty].is_physical() => out.push(ft.clone()),
            _ => {}
        }
    }
    out
}

/// Flattens a type and filters it for VHDL in one step.
pub fn physical_leaves(design: &Design, ty: TypeId) -> Result<Vec<FlatType>> {
    let flat = flatten(design, ty)?;
    Ok(filter_for_vhdl(design, &flat))
}

/// Renders the VHDL object type for a wire of the given width node:
/// `std_logic` when no width applies, otherwise a descending
/// `std_logic_vector`.
pub fn wire_type(design: &mut Design, width: Option<NodeId>) -> Result<String> {
    match width {
        None => Ok("std_logic".to_string()),
        Some(width) => {
            let one = design.one();
            let high = design.sub_nodes(width, one);
            let high = design.minimize(high)?;
            Ok(format!(
                "std_logic_vector({} downto 0)",
                design.node_text(high)
            ))
        }
    }
}

/// The width node VHDL declares for a flattened entry: `None` renders
/// as a plain `std_logic`, so single-wire kinds stay scalar.
pub fn declared_width(design: &Design, ft: &FlatType) -> Option<NodeId> {
    match design.types[ft.ty].kind {
        TypeKind::Vector { width } => width,
        _ => None,
    }
}
