//! Node arrays: dynamically sized groups of same-typed nodes.
//!
//! An array owns a base node acting as a prototype, a size node that
//! tracks the element count, and the elements themselves. Appending
//! copies the base and increments the size node.

use crate::design::Design;
use crate::ids::{ArrayId, GraphId, NodeId};
use crate::node::{Node, NodeClass, NodeKind};
use serde::{Deserialize, Serialize};
use weft_common::{Error, Result};

/// A sized group of nodes sharing one prototype and one size node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeArray {
    /// The array name.
    pub name: String,
    /// The class of the base node; every element shares it.
    pub class: NodeClass,
    /// The prototype node.
    pub(crate) base: NodeId,
    /// The node holding the element count.
    pub(crate) size: NodeId,
    /// The elements, in append order.
    pub(crate) nodes: Vec<NodeId>,
    /// The graph that owns this array, if any.
    pub(crate) parent: Option<GraphId>,
}

impl NodeArray {
    /// The prototype node.
    pub fn base(&self) -> NodeId {
        self.base
    }

    /// The node holding the element count.
    pub fn size(&self) -> NodeId {
        self.size
    }

    /// The elements, in append order.
    pub fn nodes(&self) -> &[NodeId] {
        self.nodes.as_slice()
    }

    /// The number of elements.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The graph owning this array.
    pub fn parent(&self) -> Option<GraphId> {
        self.parent
    }

    /// The position of an element within the array.
    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.nodes.iter().position(|&n| n == node)
    }
}

impl Design {
    /// Creates an empty array from a prototype node and a size node.
    /// The size node should evaluate to zero at creation.
    pub fn node_array(&mut self, name: impl Into<String>, base: NodeId, size: NodeId) -> ArrayId {
        let class = self.nodes[base].class();
        self.arrays.alloc(NodeArray {
            name: name.into(),
            class,
            base,
            size,
            nodes: Vec::new(),
            parent: None,
        })
    }

    /// Appends a fresh copy of the base node and increments the size
    /// node, returning the new element.
    pub fn array_append(&mut self, array: ArrayId) -> Result<NodeId> {
        let base = self.arrays[array].base;
        let index = self.arrays[array].nodes.len();
        let parent = self.arrays[array].parent;
        let element = self.copy_node(base);
        self.nodes[element].name = format!("{}{}", self.nodes[base].name, index);
        self.nodes[element].parent = parent;
        self.nodes[element].array = Some(array);
        self.arrays[array].nodes.push(element);
        self.increment_size(array)?;
        Ok(element)
    }

    /// Adds one to an array's size node:
    ///
    /// - an integer literal is replaced by the literal one larger;
    /// - a parameter gets its current value plus one connected to it;
    /// - any other node is wrapped in a `+ 1` expression.
    fn increment_size(&mut self, array: ArrayId) -> Result<()> {
        let size = self.arrays[array].size;
        match self.nodes[size].kind.clone() {
            NodeKind::Literal(_) => {
                let value = self.nodes[size].int_value().ok_or_else(|| {
                    Error::WrongNodeKind {
                        node: self.nodes[size].name.clone(),
                        expected: "integer literal".to_string(),
                    }
                })?;
                let next = self.int_literal(value + 1);
                self.arrays[array].size = next;
            }
            NodeKind::Parameter { default } => {
                let current = match self.nodes[size].input {
                    Some(edge) => self.edges[edge].src,
                    None => default,
                };
                let current = current.ok_or_else(|| {
                    Error::internal(format!(
                        "array size parameter {} has no value to increment",
                        self.nodes[size].name
                    ))
                })?;
                let next = self.add_int(current, 1);
                self.connect(size, next)?;
            }
            _ => {
                let next = self.add_int(size, 1);
                self.arrays[array].size = next;
            }
        }
        Ok(())
    }

    /// Copies a node: same name, kind and type, no edges, no owner.
    /// Expression operands and parameter defaults stay shared.
    pub fn copy_node(&mut self, node: NodeId) -> NodeId {
        let copy = Node::new(
            self.nodes[node].name.clone(),
            self.nodes[node].kind.clone(),
            self.nodes[node].ty,
        );
        self.nodes.alloc(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Dir;

    #[test]
    fn append_copies_the_base_and_counts_up() {
        let mut d = Design::new();
        let v8 = d.vec_type(8);
        let base = d.port("x", v8, Dir::In);
        let zero = d.int_literal(0);
        let arr = d.node_array("x", base, zero);
        let e0 = d.array_append(arr).unwrap();
        let e1 = d.array_append(arr).unwrap();
        assert_eq!(d.arrays[arr].len(), 2);
        assert_eq!(d.nodes[e0].name, "x0");
        assert_eq!(d.nodes[e1].name, "x1");
        assert_eq!(d.nodes[e0].array(), Some(arr));
        assert_eq!(d.arrays[arr].index_of(e1), Some(1));
        // Literal size nodes are replaced, not mutated.
        let size = d.arrays[arr].size();
        assert_eq!(d.nodes[size].int_value(), Some(2));
        assert_eq!(d.nodes[zero].int_value(), Some(0));
    }

    #[test]
    fn parameter_size_gets_driven_with_its_increment() {
        let mut d = Design::new();
        let bit = d.bit_type();
        let zero = d.int_literal(0);
        let count = d.parameter("COUNT", d.integer_type(), Some(zero));
        let base = d.port("y", bit, Dir::Out);
        let arr = d.node_array("y", base, count);
        d.array_append(arr).unwrap();
        d.array_append(arr).unwrap();
        // The parameter itself stays the size node.
        assert_eq!(d.arrays[arr].size(), count);
        let driver = d.nodes[count].input().unwrap();
        let value = d.edges[driver].src().unwrap();
        assert_eq!(d.nodes[value].int_value(), Some(2));
    }

    #[test]
    fn elements_share_their_arrays_parent() {
        let mut d = Design::new();
        let bit = d.bit_type();
        let comp = d.component("top");
        let base = d.port("y", bit, Dir::Out);
        let zero = d.int_literal(0);
        let arr = d.node_array("y", base, zero);
        d.add_array_object(comp, arr).unwrap();
        let e0 = d.array_append(arr).unwrap();
        assert_eq!(d.nodes[e0].parent(), Some(comp));
    }
}
