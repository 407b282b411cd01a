//! The weft intermediate representation for generated hardware designs.
//!
//! This crate defines the construction-time IR: a [`Design`] owning
//! types, nodes, edges and graphs in arenas, plus type flattening and
//! structural type mapping. Backends consume a finished [`Design`] and
//! never mutate graph topology, only read it (the VHDL backend allocates
//! helper expression nodes while emitting).

#![warn(missing_docs)]

pub mod arena;
pub mod array;
pub mod design;
pub mod edge;
pub mod expr;
pub mod flatten;
pub mod graph;
pub mod ids;
pub mod mapper;
pub mod node;
pub mod types;

pub use arena::{Arena, Key};
pub use array::NodeArray;
pub use design::Design;
pub use edge::Edge;
pub use flatten::{flatten, list_to_string, FlatType, NamePart};
pub use graph::{Graph, GraphKind, ObjectId};
pub use ids::{ArrayId, DomainId, EdgeId, GraphId, MapperId, NodeId, TypeId};
pub use mapper::{MapSide, MappingMatrix, MappingPair, TypeMapper};
pub use node::{BinOp, Dir, LitValue, Node, NodeClass, NodeKind};
pub use types::{ClockDomain, Field, Type, TypeKind};
