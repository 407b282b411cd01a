//! Type flattening.
//!
//! Flattening walks a type tree in pre-order and produces one [`FlatType`]
//! per visited type, including the root and every intermediate record or
//! stream. Mapper matrices index into these lists, so the traversal order
//! is part of the contract: parent first, then children in declaration
//! order.

use crate::design::Design;
use crate::ids::TypeId;
use crate::types::TypeKind;
use serde::{Deserialize, Serialize};
use weft_common::{Error, Result};

/// One segment of a flattened name, with a flag controlling whether a
/// separator follows it when the full name is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamePart {
    /// The segment text (may be empty for anonymous stream elements).
    pub part: String,
    /// Whether a separator follows this segment.
    pub sep: bool,
}

impl NamePart {
    /// Creates a name part followed by a separator.
    pub fn new(part: impl Into<String>) -> Self {
        Self {
            part: part.into(),
            sep: true,
        }
    }
}

/// One entry of a flattened type: the visited type, its nesting depth,
/// the name path from the root, and its accumulated inversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatType {
    /// The type at this position of the tree.
    pub ty: TypeId,
    /// Depth below the flattening root (the root itself is 0).
    pub nesting_level: usize,
    /// Name segments from the root down to this entry.
    pub name_parts: Vec<NamePart>,
    /// Whether inversion flags along the path flipped the direction an
    /// odd number of times.
    pub invert: bool,
}

impl FlatType {
    /// Renders the full name of this entry below some root name, joining
    /// segments with `sep` where their flag asks for one. Empty segments
    /// and an empty root are skipped.
    pub fn name(&self, root: &str, sep: &str) -> String {
        let mut out = String::new();
        let mut pending_sep = false;
        if !root.is_empty() {
            out.push_str(root);
            pending_sep = true;
        }
        for part in &self.name_parts {
            if part.part.is_empty() {
                continue;
            }
            if pending_sep {
                out.push_str(sep);
            }
            out.push_str(&part.part);
            pending_sep = part.sep;
        }
        out
    }
}

/// Flattens a type into its pre-order list of entries.
///
/// Fails if a Stream along the way has no element type.
pub fn flatten(design: &Design, root: TypeId) -> Result<Vec<FlatType>> {
    let mut list = Vec::new();
    flatten_into(design, &mut list, root, None, false)?;
    Ok(list)
}

fn flatten_into(
    design: &Design,
    list: &mut Vec<FlatType>,
    ty: TypeId,
    parent: Option<(usize, Vec<NamePart>, Option<NamePart>)>,
    invert: bool,
) -> Result<()> {
    let (nesting_level, name_parts) = match parent {
        Some((level, parts, name)) => {
            let mut parts = parts;
            if let Some(name) = name {
                parts.push(name);
            }
            (level, parts)
        }
        None => (0, Vec::new()),
    };
    list.push(FlatType {
        ty,
        nesting_level,
        name_parts: name_parts.clone(),
        invert,
    });
    match &design.types[ty].kind {
        TypeKind::Record { fields } => {
            for field in fields {
                flatten_into(
                    design,
                    list,
                    field.ty,
                    Some((
                        nesting_level + 1,
                        name_parts.clone(),
                        Some(NamePart {
                            part: field.name.clone(),
                            sep: field.sep,
                        }),
                    )),
                    invert ^ field.invert,
                )?;
            }
        }
        TypeKind::Stream {
            element,
            element_name,
            ..
        } => {
            let Some(elem) = *element else {
                return Err(Error::EmptyStreamElement {
                    stream: design.types[ty].name.clone(),
                });
            };
            flatten_into(
                design,
                list,
                elem,
                Some((
                    nesting_level + 1,
                    name_parts.clone(),
                    Some(NamePart::new(element_name.clone())),
                )),
                invert,
            )?;
        }
        _ => {}
    }
    Ok(())
}

/// Renders a flattened list as an indented multi-line dump, one entry per
/// line, for logs and mapper diagnostics.
pub fn list_to_string(design: &Design, flat: &[FlatType]) -> String {
    let mut out = String::new();
    for (i, ft) in flat.iter().enumerate() {
        out.push_str(&format!(
            "{:3}: {}{} ({})\n",
            i,
            "  ".repeat(ft.nesting_level),
            ft.name("", "_"),
            design.type_label(ft.ty),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::Design;
    use crate::types::Field;

    #[test]
    fn primitive_flattens_to_itself() {
        let d = Design::new();
        let flat = flatten(&d, d.bit_type()).unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].ty, d.bit_type());
        assert_eq!(flat[0].nesting_level, 0);
        assert!(flat[0].name_parts.is_empty());
        assert!(!flat[0].invert);
    }

    #[test]
    fn record_flattens_in_declaration_order() {
        let mut d = Design::new();
        let v8 = d.vec_type(8);
        let bit = d.bit_type();
        let rec = d.record("r", vec![Field::new("x", v8), Field::new("y", bit)]);
        let flat = flatten(&d, rec).unwrap();
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[0].ty, rec);
        assert_eq!(flat[1].ty, v8);
        assert_eq!(flat[1].nesting_level, 1);
        assert_eq!(flat[1].name("", "_"), "x");
        assert_eq!(flat[2].ty, bit);
        assert_eq!(flat[2].name("", "_"), "y");
    }

    #[test]
    fn nested_record_paths_join_with_separator() {
        let mut d = Design::new();
        let bit = d.bit_type();
        let inner = d.record("inner", vec![Field::new("q", bit)]);
        let outer = d.record("outer", vec![Field::new("a", inner), Field::new("b", bit)]);
        let flat = flatten(&d, outer).unwrap();
        assert_eq!(flat.len(), 4);
        assert_eq!(flat[2].name("port", "_"), "port_a_q");
        assert_eq!(flat[2].nesting_level, 2);
        assert_eq!(flat[3].name("port", "_"), "port_b");
    }

    #[test]
    fn stream_includes_its_own_entry() {
        let mut d = Design::new();
        let v8 = d.vec_type(8);
        let s = d.stream("s", v8);
        let flat = flatten(&d, s).unwrap();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].ty, s);
        assert_eq!(flat[1].ty, v8);
        assert_eq!(flat[1].nesting_level, 1);
    }

    #[test]
    fn unset_stream_element_is_fatal() {
        let mut d = Design::new();
        let s = d.empty_stream("s");
        assert!(matches!(
            flatten(&d, s),
            Err(weft_common::Error::EmptyStreamElement { .. })
        ));
    }

    #[test]
    fn invert_flags_accumulate_by_xor() {
        let mut d = Design::new();
        let bit = d.bit_type();
        let inner = d.record("inner", vec![Field::inverted("r", bit)]);
        let outer = d.record(
            "outer",
            vec![Field::new("fwd", inner), Field::inverted("rev", inner)],
        );
        let flat = flatten(&d, outer).unwrap();
        // outer, fwd, fwd.r, rev, rev.r
        assert_eq!(flat.len(), 5);
        assert!(!flat[1].invert);
        assert!(flat[2].invert);
        assert!(flat[3].invert);
        assert!(!flat[4].invert, "double inversion cancels");
    }

    #[test]
    fn flatten_is_deterministic() {
        let mut d = Design::new();
        let v8 = d.vec_type(8);
        let bit = d.bit_type();
        let rec = d.record("r", vec![Field::new("x", v8), Field::new("y", bit)]);
        let a = flatten(&d, rec).unwrap();
        let b = flatten(&d, rec).unwrap();
        let names_a: Vec<String> = a.iter().map(|f| f.name("p", "_")).collect();
        let names_b: Vec<String> = b.iter().map(|f| f.name("p", "_")).collect();
        assert_eq!(names_a, names_b);
    }

    #[test]
    fn no_sep_field_glues_names() {
        let mut d = Design::new();
        let bit = d.bit_type();
        let inner = d.record("inner", vec![Field::new("q", bit)]);
        let outer = d.record("outer", vec![Field::new("el", inner).no_sep()]);
        let flat = flatten(&d, outer).unwrap();
        assert_eq!(flat[2].name("port", "_"), "port_elq");
    }
}
