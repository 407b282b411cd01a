//! The design context.
//!
//! A [`Design`] owns every type, node, edge, graph, array, mapper and
//! clock domain in play, in append-only arenas. Everything else refers
//! to those entities by ID, so cross-references stay cheap to copy and
//! serialize.

use crate::arena::Arena;
use crate::array::NodeArray;
use crate::edge::Edge;
use crate::graph::Graph;
use crate::ids::{DomainId, GraphId, NodeId, TypeId};
use crate::mapper::TypeMapper;
use crate::node::{Dir, LitValue, Node, NodeKind};
use crate::types::{ClockDomain, Field, Type, TypeKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use weft_common::Meta;

/// Owns all entities of a design under construction.
#[derive(Debug, Serialize, Deserialize)]
pub struct Design {
    /// All types.
    pub types: Arena<TypeId, Type>,
    /// All nodes.
    pub nodes: Arena<NodeId, Node>,
    /// All edges, including tombstones.
    pub edges: Arena<crate::ids::EdgeId, Edge>,
    /// All graphs.
    pub graphs: Arena<GraphId, Graph>,
    /// All node arrays.
    pub arrays: Arena<crate::ids::ArrayId, NodeArray>,
    /// All type mappers.
    pub mappers: Arena<crate::ids::MapperId, TypeMapper>,
    /// All clock domains.
    pub domains: Arena<DomainId, ClockDomain>,
    int_pool: BTreeMap<i64, NodeId>,
    bit: TypeId,
    integer: TypeId,
    natural: TypeId,
    string: TypeId,
    boolean: TypeId,
    one: NodeId,
}

impl Design {
    /// Creates an empty design with the primitive types interned.
    pub fn new() -> Self {
        let mut types = Arena::new();
        let bit = types.alloc(Self::primitive("bit", TypeKind::Bit));
        let integer = types.alloc(Self::primitive("integer", TypeKind::Integer));
        let natural = types.alloc(Self::primitive("natural", TypeKind::Natural));
        let string = types.alloc(Self::primitive("string", TypeKind::Str));
        let boolean = types.alloc(Self::primitive("boolean", TypeKind::Boolean));
        let mut nodes = Arena::new();
        let mut int_pool = BTreeMap::new();
        let one = nodes.alloc(Node::new("1", NodeKind::Literal(LitValue::Int(1)), integer));
        int_pool.insert(1, one);
        Self {
            types,
            nodes,
            edges: Arena::new(),
            graphs: Arena::new(),
            arrays: Arena::new(),
            mappers: Arena::new(),
            domains: Arena::new(),
            int_pool,
            bit,
            integer,
            natural,
            string,
            boolean,
            one,
        }
    }

    fn primitive(name: impl Into<String>, kind: TypeKind) -> Type {
        Type {
            name: name.into(),
            kind,
            meta: Meta::new(),
            mappers: Vec::new(),
        }
    }

    /// The interned Bit type.
    pub fn bit_type(&self) -> TypeId {
        self.bit
    }

    /// The interned Integer type.
    pub fn integer_type(&self) -> TypeId {
        self.integer
    }

    /// The interned Natural type.
    pub fn natural_type(&self) -> TypeId {
        self.natural
    }

    /// The interned String type.
    pub fn string_type(&self) -> TypeId {
        self.string
    }

    /// The interned Boolean type.
    pub fn boolean_type(&self) -> TypeId {
        self.boolean
    }

    /// The interned integer literal one.
    pub fn one(&self) -> NodeId {
        self.one
    }

    /// The node for an integer literal, interned by value: asking for
    /// the same value twice yields the same node.
    pub fn int_literal(&mut self, value: i64) -> NodeId {
        if let Some(&node) = self.int_pool.get(&value) {
            return node;
        }
        let node = self.nodes.alloc(Node::new(
            value.to_string(),
            NodeKind::Literal(LitValue::Int(value)),
            self.integer,
        ));
        self.int_pool.insert(value, node);
        node
    }

    /// A string literal node. Not interned.
    pub fn str_literal(&mut self, value: impl Into<String>) -> NodeId {
        let value = value.into();
        self.nodes.alloc(Node::new(
            value.clone(),
            NodeKind::Literal(LitValue::Str(value)),
            self.string,
        ))
    }

    /// A boolean literal node. Not interned.
    pub fn bool_literal(&mut self, value: bool) -> NodeId {
        self.nodes.alloc(Node::new(
            value.to_string(),
            NodeKind::Literal(LitValue::Bool(value)),
            self.boolean,
        ))
    }

    /// Registers a clock domain.
    pub fn clock_domain(&mut self, name: impl Into<String>) -> DomainId {
        self.domains.alloc(ClockDomain { name: name.into() })
    }

    /// A clock type in a domain.
    pub fn clock(&mut self, name: impl Into<String>, domain: DomainId) -> TypeId {
        self.types
            .alloc(Self::primitive(name, TypeKind::Clock { domain }))
    }

    /// A reset type in a domain.
    pub fn reset(&mut self, name: impl Into<String>, domain: DomainId) -> TypeId {
        self.types
            .alloc(Self::primitive(name, TypeKind::Reset { domain }))
    }

    /// A vector type with an optional width node.
    pub fn vector(&mut self, name: impl Into<String>, width: Option<NodeId>) -> TypeId {
        self.types
            .alloc(Self::primitive(name, TypeKind::Vector { width }))
    }

    /// A vector type of a fixed width, named `vec_{width}`.
    pub fn vec_type(&mut self, width: i64) -> TypeId {
        let w = self.int_literal(width);
        self.vector(format!("vec_{width}"), Some(w))
    }

    /// A record type from its fields.
    pub fn record(&mut self, name: impl Into<String>, fields: Vec<Field>) -> TypeId {
        self.types
            .alloc(Self::primitive(name, TypeKind::Record { fields }))
    }

    /// A stream of an element type, one element per cycle, with an
    /// anonymous element name.
    pub fn stream(&mut self, name: impl Into<String>, element: TypeId) -> TypeId {
        self.stream_with(name, Some(element), "", 1)
    }

    /// A stream with every knob exposed.
    pub fn stream_with(
        &mut self,
        name: impl Into<String>,
        element: Option<TypeId>,
        element_name: impl Into<String>,
        elements_per_cycle: u32,
    ) -> TypeId {
        self.types.alloc(Self::primitive(
            name,
            TypeKind::Stream {
                element,
                element_name: element_name.into(),
                elements_per_cycle,
            },
        ))
    }

    /// A stream whose element type is not set yet. Flattening it is an
    /// error until [`Design::set_stream_element`] is called.
    pub fn empty_stream(&mut self, name: impl Into<String>) -> TypeId {
        self.stream_with(name, None, "", 1)
    }

    /// A signal node.
    pub fn signal(&mut self, name: impl Into<String>, ty: TypeId) -> NodeId {
        self.nodes.alloc(Node::new(name, NodeKind::Signal, ty))
    }

    /// A port node.
    pub fn port(&mut self, name: impl Into<String>, ty: TypeId, dir: Dir) -> NodeId {
        self.nodes.alloc(Node::new(name, NodeKind::Port { dir }, ty))
    }

    /// A parameter node with an optional default.
    pub fn parameter(
        &mut self,
        name: impl Into<String>,
        ty: TypeId,
        default: Option<NodeId>,
    ) -> NodeId {
        self.nodes
            .alloc(Node::new(name, NodeKind::Parameter { default }, ty))
    }
}

impl Default for Design {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_literals_are_interned() {
        let mut d = Design::new();
        let a = d.int_literal(42);
        let b = d.int_literal(42);
        let c = d.int_literal(43);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(d.int_literal(1), d.one());
    }

    #[test]
    fn primitive_types_are_preinterned() {
        let d = Design::new();
        assert_eq!(d.types[d.bit_type()].name, "bit");
        assert_eq!(d.types[d.integer_type()].name, "integer");
        assert!(d.types[d.bit_type()].is_physical());
    }

    #[test]
    fn serde_roundtrip_preserves_the_graph() {
        let mut d = Design::new();
        let bit = d.bit_type();
        let comp = d.component("top");
        let a = d.signal("a", bit);
        let b = d.signal("b", bit);
        d.add_node_object(comp, a).unwrap();
        d.add_node_object(comp, b).unwrap();
        d.connect(a, b).unwrap();

        let json = serde_json::to_string(&d).unwrap();
        let back: Design = serde_json::from_str(&json).unwrap();
        assert_eq!(back.nodes.len(), d.nodes.len());
        assert_eq!(back.all_edges(comp), d.all_edges(comp));
        assert_eq!(back.nodes[a].name, "a");
    }
}
