//! Assignment statements and the shared range arithmetic.
//!
//! Both the architecture body and the instantiation port maps walk the
//! mapping pairs of a connection and, per contributor, compute the bit
//! range each side exposes. Offsets are built as expression nodes, so
//! parametric widths stay parametric in the output, and are minimized
//! right before rendering.

use crate::block::Block;
use weft_common::{Error, Result};
use weft_ir::{Design, FlatType, MappingPair, NodeId, TypeKind};

/// One lowered wire correspondence between two nodes: rendered texts
/// for both sides, and whether the wire flows against the connection
/// (a stream's `ready`).
#[derive(Debug, Clone)]
pub struct MappedWire {
    /// The A-side (destination) text, name plus optional range.
    pub a: String,
    /// The B-side (source) text, name plus optional range.
    pub b: String,
    /// Whether this wire flows from A to B instead.
    pub reversed: bool,
}

/// The name a node goes by in generated text: its array's name when it
/// is an array element, else its own.
pub fn wire_name(design: &Design, node: NodeId) -> String {
    match design.nodes[node].array() {
        Some(array) => design.arrays[array].name.clone(),
        None => design.nodes[node].name.clone(),
    }
}

fn array_index(design: &Design, node: NodeId) -> Option<i64> {
    let array = design.nodes[node].array()?;
    design.arrays[array].index_of(node).map(|i| i as i64)
}

fn is_bit_like(design: &Design, ft: &FlatType) -> bool {
    matches!(
        design.types[ft.ty].kind,
        TypeKind::Bit | TypeKind::Clock { .. } | TypeKind::Reset { .. }
    )
}

fn is_vector(design: &Design, ft: &FlatType) -> bool {
    matches!(design.types[ft.ty].kind, TypeKind::Vector { .. })
}

fn is_stream(design: &Design, ft: &FlatType) -> bool {
    matches!(design.types[ft.ty].kind, TypeKind::Stream { .. })
}

fn leaf_width(design: &Design, ft: &FlatType) -> NodeId {
    design.type_width(ft.ty).unwrap_or_else(|| design.one())
}

/// Renders `name(high downto low)`, or `name(low)` for a single bit,
/// or the bare name when no slice applies.
fn sliced_text(
    design: &mut Design,
    name: &str,
    sliced: bool,
    offset: NodeId,
    width: NodeId,
) -> Result<String> {
    if !sliced {
        return Ok(name.to_string());
    }
    let low = design.minimize(offset)?;
    if design.nodes[width].int_value() == Some(1) {
        return Ok(format!("{}({})", name, design.node_text(low)));
    }
    let one = design.one();
    let high = design.add_nodes(offset, width);
    let high = design.sub_nodes(high, one);
    let high = design.minimize(high)?;
    Ok(format!(
        "{}({} downto {})",
        name,
        design.node_text(high),
        design.node_text(low)
    ))
}

/// Lowers one mapping pair between two nodes into wire correspondences.
///
/// Slicing policy, per side and contributor:
/// - the single side of a one-to-many pair is sliced, contributors
///   stacking in registration order;
/// - an array element is sliced at `index * width` within its array's
///   widened wire;
/// - in a one-to-one pair between a Vector and a single-wire kind, the
///   Vector side is sliced;
/// - everything else renders as the bare wire name.
///
/// Record entries vanish (their leaves arrive as separate pairs), and a
/// stream-to-stream entry lowers to a `valid` wire plus a reversed
/// `ready` wire.
pub fn lower_pair(
    design: &mut Design,
    pair: &MappingPair,
    dst: NodeId,
    src: NodeId,
) -> Result<Vec<MappedWire>> {
    let na = pair.num_a();
    let nb = pair.num_b();
    let dst_name = wire_name(design, dst);
    let src_name = wire_name(design, src);
    let dst_index = array_index(design, dst);
    let src_index = array_index(design, src);

    // Base offsets for the stacked (single-entry) side of a
    // one-to-many pair: the array element index times the pair width.
    let one = design.one();
    let mut acc_a = {
        let total = pair.width_a(design, one);
        scaled_offset(design, dst_index, total)?
    };
    let mut acc_b = {
        let total = pair.width_b(design, one);
        scaled_offset(design, src_index, total)?
    };

    let mut wires = Vec::new();
    for i in 0..na.max(nb) {
        let fa = pair.a[i.min(na - 1)].flat.clone();
        let fb = pair.b[i.min(nb - 1)].flat.clone();
        if is_stream(design, &fa) && is_stream(design, &fb) {
            let a_base = fa.name(&dst_name, "_");
            let b_base = fb.name(&src_name, "_");
            wires.push(MappedWire {
                a: format!("{a_base}_valid"),
                b: format!("{b_base}_valid"),
                reversed: false,
            });
            wires.push(MappedWire {
                a: format!("{a_base}_ready"),
                b: format!("{b_base}_ready"),
                reversed: true,
            });
            continue;
        }
        if !design.types[fa.ty].is_physical() || !design.types[fb.ty].is_physical() {
            continue;
        }
        let wa = leaf_width(design, &fa);
        let wb = leaf_width(design, &fb);
        let one_to_one = na == 1 && nb == 1;

        let (a_text, consumed_a) = if nb > 1 {
            // Stacked side: contributor i covers wb bits of the one wire.
            let text = sliced_text(design, &fa.name(&dst_name, "_"), true, acc_a, wb)?;
            (text, Some(wb))
        } else {
            let sliced = dst_index.is_some()
                || (one_to_one && is_vector(design, &fa) && is_bit_like(design, &fb));
            let off = scaled_offset(design, dst_index, wa)?;
            let text = sliced_text(design, &fa.name(&dst_name, "_"), sliced, off, wa)?;
            (text, None)
        };
        let (b_text, consumed_b) = if na > 1 {
            let text = sliced_text(design, &fb.name(&src_name, "_"), true, acc_b, wa)?;
            (text, Some(wa))
        } else {
            let sliced = src_index.is_some()
                || (one_to_one && is_vector(design, &fb) && is_bit_like(design, &fa));
            let off = scaled_offset(design, src_index, wb)?;
            let text = sliced_text(design, &fb.name(&src_name, "_"), sliced, off, wb)?;
            (text, None)
        };
        if let Some(w) = consumed_a {
            acc_a = design.add_nodes(acc_a, w);
        }
        if let Some(w) = consumed_b {
            acc_b = design.add_nodes(acc_b, w);
        }
        wires.push(MappedWire {
            a: a_text,
            b: b_text,
            reversed: false,
        });
    }
    Ok(wires)
}

fn scaled_offset(design: &mut Design, index: Option<i64>, width: NodeId) -> Result<NodeId> {
    let Some(index) = index else {
        return Ok(design.int_literal(0));
    };
    let idx = design.int_literal(index);
    let off = design.mul_nodes(idx, width);
    design.minimize(off)
}

/// Lowers every mapping pair of a connection from `src` into `dst`.
pub fn lower_connection(
    design: &mut Design,
    dst: NodeId,
    src: NodeId,
) -> Result<Vec<MappedWire>> {
    let dst_ty = design.nodes[dst].ty;
    let src_ty = design.nodes[src].ty;
    let Some(mapper) = design.resolve_mapper(dst_ty, src_ty)? else {
        return Err(Error::NoTypeMapping {
            dst: design.nodes[dst].name.clone(),
            dst_type: design.type_label(dst_ty),
            src: design.nodes[src].name.clone(),
            src_type: design.type_label(src_ty),
        });
    };
    let mut wires = Vec::new();
    for pair in mapper.unique_mapping_pairs() {
        wires.extend(lower_pair(design, &pair, dst, src)?);
    }
    Ok(wires)
}

/// The assignment statements driving one node, one per mapped wire.
/// A node without a complete input edge contributes nothing.
pub fn assignment_lines(design: &mut Design, dst: NodeId) -> Result<Block> {
    let mut block = Block::new();
    let Some(edge) = design.nodes[dst].input() else {
        return Ok(block);
    };
    let Some(src) = design.edges[edge].src() else {
        return Ok(block);
    };
    for wire in lower_connection(design, dst, src)? {
        if wire.reversed {
            block.add_text(format!("{} <= {};", wire.b, wire.a));
        } else {
            block.add_text(format!("{} <= {};", wire.a, wire.b));
        }
    }
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_ir::{Dir, Field, TypeMapper};

    #[test]
    fn bit_to_bit_assigns_bare_names() {
        let mut d = Design::new();
        let bit = d.bit_type();
        let a = d.signal("a", bit);
        let b = d.signal("b", bit);
        d.connect(a, b).unwrap();
        let text = assignment_lines(&mut d, a).unwrap().render();
        assert_eq!(text, "a <= b;\n");
    }

    #[test]
    fn record_arrays_slice_by_element() {
        let mut d = Design::new();
        let v8 = d.vec_type(8);
        let bit = d.bit_type();
        let rec = d.record("r", vec![Field::new("x", v8), Field::new("y", bit)]);
        let zero = d.int_literal(0);

        let a_base = d.signal("a", rec);
        let arr_a = d.node_array("a", a_base, zero);
        let b_base = d.signal("b", rec);
        let arr_b = d.node_array("b", b_base, zero);
        let mut lines = String::new();
        for _ in 0..2 {
            let ae = d.array_append(arr_a).unwrap();
            let be = d.array_append(arr_b).unwrap();
            d.connect(ae, be).unwrap();
            lines.push_str(&assignment_lines(&mut d, ae).unwrap().render());
        }
        assert_eq!(
            lines,
            "a_x(7 downto 0) <= b_x(7 downto 0);\n\
             a_y(0) <= b_y(0);\n\
             a_x(15 downto 8) <= b_x(15 downto 8);\n\
             a_y(1) <= b_y(1);\n"
        );
    }

    #[test]
    fn bit_and_single_vector_slice_the_vector_side() {
        let mut d = Design::new();
        let bit = d.bit_type();
        let v1 = d.vec_type(1);
        let mut to_vec = TypeMapper::new(&d, bit, v1).unwrap();
        to_vec.add(&d, 0, 0).unwrap();
        d.attach_mapper(bit, to_vec).unwrap();

        let a = d.signal("a", bit);
        let b = d.signal("b", v1);
        d.connect(a, b).unwrap();
        assert_eq!(assignment_lines(&mut d, a).unwrap().render(), "a <= b(0);\n");

        let c = d.signal("c", v1);
        let e = d.signal("d", bit);
        d.connect(c, e).unwrap();
        assert_eq!(assignment_lines(&mut d, c).unwrap().render(), "c(0) <= d;\n");
    }

    #[test]
    fn concatenation_stacks_contributors_in_order() {
        let mut d = Design::new();
        let v8 = d.vec_type(8);
        let bit = d.bit_type();
        let v9 = d.vec_type(9);
        let wide = d.record("wide", vec![Field::new("all", v9)]);
        let split = d.record(
            "split",
            vec![Field::new("lo", v8), Field::new("hi", bit)],
        );
        let mut m = TypeMapper::new(&d, wide, split).unwrap();
        m.add(&d, 1, 1).unwrap();
        m.add(&d, 1, 2).unwrap();
        d.attach_mapper(wide, m).unwrap();

        let a = d.signal("a", split);
        let b = d.signal("b", wide);
        d.connect(a, b).unwrap();
        let text = assignment_lines(&mut d, a).unwrap().render();
        assert_eq!(
            text,
            "a_lo <= b_all(7 downto 0);\na_hi <= b_all(8);\n"
        );
    }

    #[test]
    fn streams_assign_valid_and_reversed_ready() {
        let mut d = Design::new();
        let v8 = d.vec_type(8);
        let s = d.stream("s", v8);
        let a = d.signal("a", s);
        let b = d.signal("b", s);
        d.connect(a, b).unwrap();
        let text = assignment_lines(&mut d, a).unwrap().render();
        assert_eq!(
            text,
            "a_valid <= b_valid;\nb_ready <= a_ready;\na <= b;\n"
        );
    }

    #[test]
    fn parametric_widths_stay_parametric() {
        let mut d = Design::new();
        let w = d.parameter("W", d.integer_type(), None);
        let vw = d.vector("vw", Some(w));
        let rec = d.record("r", vec![Field::new("data", vw)]);
        let zero = d.int_literal(0);
        let a_base = d.signal("a", rec);
        let arr = d.node_array("a", a_base, zero);
        let e0 = d.array_append(arr).unwrap();
        let e1 = d.array_append(arr).unwrap();
        let b0 = d.signal("b0", rec);
        let b1 = d.signal("b1", rec);
        d.connect(e0, b0).unwrap();
        d.connect(e1, b1).unwrap();
        let t0 = assignment_lines(&mut d, e0).unwrap().render();
        let t1 = assignment_lines(&mut d, e1).unwrap().render();
        assert_eq!(t0, "a_data(W-1 downto 0) <= b0_data;\n");
        assert_eq!(t1, "a_data(W+W-1 downto W) <= b1_data;\n");
    }
}
