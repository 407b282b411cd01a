//! The closed universe of hardware types.
//!
//! A [`Type`] is either *physical* (clock, reset, bit, vector) and directly
//! synthesizable, or *abstract* (string, boolean, record, stream) and must
//! be flattened to physical leaves before synthesis. Types are owned by the
//! [`Design`](crate::design::Design) and referenced by [`TypeId`].

use crate::design::Design;
use crate::ids::{DomainId, MapperId, NodeId, TypeId};
use crate::mapper::TypeMapper;
use serde::{Deserialize, Serialize};
use weft_common::{Error, Meta, Result};

/// A named clock domain. Clock and Reset types are structurally equal only
/// when they belong to the same domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockDomain {
    /// The domain name (e.g. "acc", "bus").
    pub name: String,
}

/// One named field of a Record type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    /// The field name.
    pub name: String,
    /// The field type.
    pub ty: TypeId,
    /// Whether this field flows against the record's direction.
    pub invert: bool,
    /// Whether a separator is placed after this field's name part when
    /// flattened names are rendered.
    pub sep: bool,
}

impl Field {
    /// Creates a regular field with a separator and no inversion.
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            invert: false,
            sep: true,
        }
    }

    /// Creates a field that flows against the record's direction.
    pub fn inverted(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            invert: true,
            sep: true,
        }
    }

    /// Drops the separator after this field's name part.
    pub fn no_sep(mut self) -> Self {
        self.sep = false;
        self
    }
}

/// The kind of a type, as a closed variant set.
///
/// Adding a variant here forces every consumer (the flattener and both
/// backends) to be updated at compile time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeKind {
    /// A clock wire in some clock domain.
    Clock {
        /// The domain this clock belongs to.
        domain: DomainId,
    },
    /// A reset wire in some clock domain.
    Reset {
        /// The domain this reset belongs to.
        domain: DomainId,
    },
    /// A single wire.
    Bit,
    /// A bundle of wires. The width is a node so it may be parametric.
    Vector {
        /// The width node (literal, parameter or expression), if known.
        width: Option<NodeId>,
    },
    /// An integer, used for parameters and widths.
    Integer,
    /// A non-negative integer.
    Natural,
    /// A string, used for metadata-like parameters.
    Str,
    /// A boolean.
    Boolean,
    /// An ordered collection of named fields.
    Record {
        /// The fields, in declaration order.
        fields: Vec<Field>,
    },
    /// A handshake-controlled sequence of an element type.
    Stream {
        /// The transported element type. Unset elements are a fatal
        /// error at flattening time.
        element: Option<TypeId>,
        /// The name of the element within the stream (may be empty).
        element_name: String,
        /// Elements transported per cycle.
        elements_per_cycle: u32,
    },
}

/// A hardware type: a name, a kind, metadata and its registered mappers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Type {
    /// The type name.
    pub name: String,
    /// The kind of this type.
    pub kind: TypeKind,
    /// Free-form metadata.
    pub meta: Meta,
    /// Mappers registered on this type (this type is the A side).
    pub(crate) mappers: Vec<MapperId>,
}

impl Type {
    /// Whether this type is directly synthesizable.
    pub fn is_physical(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Clock { .. } | TypeKind::Reset { .. } | TypeKind::Bit | TypeKind::Vector { .. }
        )
    }

    /// Whether this type must be flattened away before synthesis.
    pub fn is_abstract(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Str | TypeKind::Boolean | TypeKind::Record { .. } | TypeKind::Stream { .. }
        )
    }

    /// Whether this type nests other types.
    pub fn is_nested(&self) -> bool {
        matches!(self.kind, TypeKind::Record { .. } | TypeKind::Stream { .. })
    }

    /// A short tag for the kind, used in labels and dumps.
    pub fn kind_tag(&self) -> &'static str {
        match self.kind {
            TypeKind::Clock { .. } => "Clk",
            TypeKind::Reset { .. } => "Rst",
            TypeKind::Bit => "Bit",
            TypeKind::Vector { .. } => "Vec",
            TypeKind::Integer => "Int",
            TypeKind::Natural => "Nat",
            TypeKind::Str => "Str",
            TypeKind::Boolean => "Bool",
            TypeKind::Record { .. } => "Rec",
            TypeKind::Stream { .. } => "Stm",
        }
    }

    /// Renders `name:Kind` for error messages and dumps.
    pub fn label(&self) -> String {
        format!("{}:{}", self.name, self.kind_tag())
    }
}

impl Design {
    /// Structural equality between two types, per kind:
    ///
    /// - Clock/Reset are equal iff they share a clock domain.
    /// - Vectors are equal iff both have a width.
    /// - Records are equal iff they have the same field count and
    ///   pairwise-equal field types.
    /// - Streams are equal iff their element types are equal.
    /// - Other kinds are equal iff their kinds match.
    pub fn type_eq(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        match (&self.types[a].kind, &self.types[b].kind) {
            (TypeKind::Clock { domain: da }, TypeKind::Clock { domain: db }) => da == db,
            (TypeKind::Reset { domain: da }, TypeKind::Reset { domain: db }) => da == db,
            (TypeKind::Bit, TypeKind::Bit) => true,
            (TypeKind::Vector { width: wa }, TypeKind::Vector { width: wb }) => {
                wa.is_some() && wb.is_some()
            }
            (TypeKind::Integer, TypeKind::Integer) => true,
            (TypeKind::Natural, TypeKind::Natural) => true,
            (TypeKind::Str, TypeKind::Str) => true,
            (TypeKind::Boolean, TypeKind::Boolean) => true,
            (TypeKind::Record { fields: fa }, TypeKind::Record { fields: fb }) => {
                fa.len() == fb.len() && {
                    let pairs: Vec<(TypeId, TypeId)> =
                        fa.iter().zip(fb.iter()).map(|(x, y)| (x.ty, y.ty)).collect();
                    pairs.iter().all(|&(x, y)| self.type_eq(x, y))
                }
            }
            (TypeKind::Stream { element: ea, .. }, TypeKind::Stream { element: eb, .. }) => {
                match (ea, eb) {
                    (Some(x), Some(y)) => self.type_eq(*x, *y),
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Returns the width node of a type: the literal one for single-wire
    /// kinds, the width node for Vectors, `None` otherwise.
    pub fn type_width(&self, ty: TypeId) -> Option<NodeId> {
        match self.types[ty].kind {
            TypeKind::Clock { .. } | TypeKind::Reset { .. } | TypeKind::Bit => Some(self.one()),
            TypeKind::Vector { width } => width,
            _ => None,
        }
    }

    /// Collects the width nodes a type pulls onto any graph that declares
    /// an object of it, recursing through records and streams.
    pub fn type_parameters(&self, ty: TypeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_type_parameters(ty, &mut out);
        out
    }

    fn collect_type_parameters(&self, ty: TypeId, out: &mut Vec<NodeId>) {
        match &self.types[ty].kind {
            TypeKind::Vector { width: Some(w) } => {
                if !out.contains(w) {
                    out.push(*w);
                }
            }
            TypeKind::Record { fields } => {
                let field_types: Vec<TypeId> = fields.iter().map(|f| f.ty).collect();
                for ft in field_types {
                    self.collect_type_parameters(ft, out);
                }
            }
            TypeKind::Stream {
                element: Some(elem),
                ..
            } => {
                self.collect_type_parameters(*elem, out);
            }
            _ => {}
        }
    }

    /// Renders `name:Kind` for a type.
    pub fn type_label(&self, ty: TypeId) -> String {
        self.types[ty].label()
    }

    /// Registers a mapper on its A-side type and cross-registers the
    /// derived inverse on the B side if none exists there yet.
    pub fn attach_mapper(&mut self, owner: TypeId, mapper: TypeMapper) -> Result<MapperId> {
        if mapper.a() != owner {
            return Err(Error::MapperMismatch {
                mapper: mapper.name().to_string(),
                ty: self.type_label(owner),
            });
        }
        let (a, b) = (mapper.a(), mapper.b());
        if self.explicit_mapper(a, b).is_some() {
            return Err(Error::MapperExists {
                a: self.type_label(a),
                b: self.type_label(b),
            });
        }
        let inverse = mapper.inverse();
        let id = self.mappers.alloc(mapper);
        self.types[a].mappers.push(id);
        if self.explicit_mapper(b, a).is_none() {
            let inv_id = self.mappers.alloc(inverse);
            self.types[b].mappers.push(inv_id);
        }
        Ok(id)
    }

    /// Finds an explicitly registered mapper converting `from` into `to`.
    pub fn explicit_mapper(&self, from: TypeId, to: TypeId) -> Option<&TypeMapper> {
        self.types[from]
            .mappers
            .iter()
            .map(|&mid| &self.mappers[mid])
            .find(|m| m.maps(from, to))
    }

    /// Resolves a mapper converting `from` into `to`:
    ///
    /// 1. an explicitly registered mapper, if any;
    /// 2. the identity mapper if `from` and `to` are the same type object;
    /// 3. a synthesized 1:1 mapper if the types are structurally equal;
    /// 4. `None` otherwise: the connection has no known type mapping.
    pub fn resolve_mapper(&self, from: TypeId, to: TypeId) -> Result<Option<TypeMapper>> {
        if let Some(m) = self.explicit_mapper(from, to) {
            return Ok(Some(m.clone()));
        }
        if from == to {
            return Ok(Some(TypeMapper::identity(self, from)?));
        }
        if self.type_eq(from, to) {
            return Ok(Some(TypeMapper::implicit(self, from, to)?));
        }
        Ok(None)
    }

    /// Unregisters every mapper of `ty` that converts to `other`.
    pub fn remove_mappers_to(&mut self, ty: TypeId, other: TypeId) {
        let keep: Vec<MapperId> = self.types[ty]
            .mappers
            .iter()
            .copied()
            .filter(|&mid| !self.mappers[mid].maps(ty, other))
            .collect();
        self.types[ty].mappers = keep;
    }

    /// Replaces a Stream's element type.
    ///
    /// Every mapper referencing the stream becomes stale and is
    /// unregistered on both sides; resolution will no longer find them.
    pub fn set_stream_element(&mut self, stream: TypeId, element: TypeId) -> Result<()> {
        let mapper_ids = self.types[stream].mappers.clone();
        for mid in mapper_ids {
            let other = self.mappers[mid].other_side(stream);
            self.remove_mappers_to(other, stream);
        }
        self.types[stream].mappers.clear();
        match &mut self.types[stream].kind {
            TypeKind::Stream { element: slot, .. } => {
                *slot = Some(element);
                Ok(())
            }
            _ => Err(Error::WrongNodeKind {
                node: self.types[stream].name.clone(),
                expected: "stream type".to_string(),
            }),
        }
    }
}
