//! Opaque ID newtypes for all graph entities.
//!
//! Each ID is a `u32` wrapper that is `Copy`, `Hash` and serde-capable.
//! IDs are minted by [`Arena::alloc`](crate::arena::Arena::alloc) and stay
//! valid for the lifetime of the owning [`Design`](crate::design::Design).

use crate::arena::Key;
use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw index.
            pub fn new(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw index.
            pub fn index(self) -> u32 {
                self.0
            }
        }

        impl Key for $name {
            fn from_index(index: u32) -> Self {
                Self(index)
            }

            fn index(self) -> u32 {
                self.0
            }
        }
    };
}

entity_id!(
    /// ID of a [`Type`](crate::types::Type) in the design.
    TypeId
);

entity_id!(
    /// ID of a [`Node`](crate::node::Node) in the design.
    NodeId
);

entity_id!(
    /// ID of an [`Edge`](crate::edge::Edge) in the design.
    EdgeId
);

entity_id!(
    /// ID of a [`Graph`](crate::graph::Graph) (component or instance).
    GraphId
);

entity_id!(
    /// ID of a [`TypeMapper`](crate::mapper::TypeMapper).
    MapperId
);

entity_id!(
    /// ID of a [`NodeArray`](crate::array::NodeArray).
    ArrayId
);

entity_id!(
    /// ID of a [`ClockDomain`](crate::types::ClockDomain).
    DomainId
);
