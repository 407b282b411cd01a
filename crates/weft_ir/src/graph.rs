//! Components and instances.
//!
//! A Component declares an interface and a body; an Instance is a
//! placement of a component inside another component. Both are graphs
//! owning an ordered list of objects (nodes and node arrays), and the
//! object order is preserved into generated sources.

use crate::design::Design;
use crate::ids::{ArrayId, GraphId, NodeId};
use crate::node::{Dir, NodeClass, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use weft_common::{Error, Meta, Result};

/// Whether a graph is a component or an instance of one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GraphKind {
    /// A component definition with its instantiated children.
    Component {
        /// Child instances, in placement order.
        children: Vec<GraphId>,
    },
    /// An instantiation of a component.
    Instance {
        /// The instantiated component.
        component: GraphId,
    },
}

/// A reference to a graph-owned object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectId {
    /// A single node.
    Node(NodeId),
    /// A node array.
    Array(ArrayId),
}

/// A component or instance graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// The graph name.
    pub name: String,
    /// Component or instance.
    pub kind: GraphKind,
    /// Owned objects, in declaration order.
    pub(crate) objects: Vec<ObjectId>,
    /// The enclosing component, for instances.
    pub(crate) parent: Option<GraphId>,
    /// Free-form metadata, forwarded to the backends.
    pub meta: Meta,
}

impl Graph {
    /// Whether this graph is a component.
    pub fn is_component(&self) -> bool {
        matches!(self.kind, GraphKind::Component { .. })
    }

    /// The owned objects, in declaration order.
    pub fn objects(&self) -> &[ObjectId] {
        self.objects.as_slice()
    }

    /// The enclosing graph.
    pub fn parent(&self) -> Option<GraphId> {
        self.parent
    }
}

impl Design {
    /// Creates an empty component.
    pub fn component(&mut self, name: impl Into<String>) -> GraphId {
        self.graphs.alloc(Graph {
            name: name.into(),
            kind: GraphKind::Component {
                children: Vec::new(),
            },
            objects: Vec::new(),
            parent: None,
            meta: Meta::new(),
        })
    }

    /// Creates a component and adds the given objects in order.
    pub fn component_with(
        &mut self,
        name: impl Into<String>,
        objects: Vec<ObjectId>,
    ) -> Result<GraphId> {
        let graph = self.component(name);
        for obj in objects {
            self.add_object(graph, obj)?;
        }
        Ok(graph)
    }

    /// Adds an object to a graph.
    ///
    /// Re-adding an object a graph already owns is a logged no-op. On a
    /// component, adding an object also pulls in what it implies: width
    /// nodes of its type, and for parameters their bound value, or a
    /// connection to their default. Instances reject signals.
    pub fn add_object(&mut self, graph: GraphId, object: ObjectId) -> Result<()> {
        match object {
            ObjectId::Node(node) => self.add_node_object(graph, node),
            ObjectId::Array(array) => self.add_array_object(graph, array),
        }
    }

    /// Adds a single node to a graph. See [`Design::add_object`].
    pub fn add_node_object(&mut self, graph: GraphId, node: NodeId) -> Result<()> {
        if self.graphs[graph].objects.contains(&ObjectId::Node(node)) {
            log::debug!(
                "node {} already exists on graph {}, skipping",
                self.nodes[node].name,
                self.graphs[graph].name
            );
            return Ok(());
        }
        let is_instance = !self.graphs[graph].is_component();
        if is_instance && self.nodes[node].class() == NodeClass::Signal {
            return Err(Error::SignalOnInstance {
                signal: self.nodes[node].name.clone(),
                instance: self.graphs[graph].name.clone(),
            });
        }
        self.graphs[graph].objects.push(ObjectId::Node(node));
        self.nodes[node].parent = Some(graph);
        if is_instance {
            return Ok(());
        }
        let implied = self.type_parameters(self.nodes[node].ty);
        for p in implied {
            self.add_node_object(graph, p)?;
        }
        if let NodeKind::Parameter { default } = self.nodes[node].kind {
            match self.param_value(node) {
                Some(value) => self.add_node_object(graph, value)?,
                None => {
                    if let Some(default) = default {
                        self.connect(node, default)?;
                        self.add_node_object(graph, default)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Adds a node array to a graph. Base and elements take the graph
    /// as their parent, and the size node is pulled in as well.
    pub fn add_array_object(&mut self, graph: GraphId, array: ArrayId) -> Result<()> {
        if self.graphs[graph].objects.contains(&ObjectId::Array(array)) {
            log::debug!(
                "array {} already exists on graph {}, skipping",
                self.arrays[array].name,
                self.graphs[graph].name
            );
            return Ok(());
        }
        let is_instance = !self.graphs[graph].is_component();
        if is_instance && self.arrays[array].class == NodeClass::Signal {
            return Err(Error::SignalOnInstance {
                signal: self.arrays[array].name.clone(),
                instance: self.graphs[graph].name.clone(),
            });
        }
        self.graphs[graph].objects.push(ObjectId::Array(array));
        self.arrays[array].parent = Some(graph);
        let base = self.arrays[array].base;
        self.nodes[base].parent = Some(graph);
        let elements = self.arrays[array].nodes.clone();
        for element in elements {
            self.nodes[element].parent = Some(graph);
        }
        if is_instance {
            return Ok(());
        }
        let size = self.arrays[array].size;
        self.add_node_object(graph, size)?;
        let implied = self.type_parameters(self.nodes[base].ty);
        for p in implied {
            self.add_node_object(graph, p)?;
        }
        Ok(())
    }

    /// Registers an instance as a child of a component.
    pub fn add_child(&mut self, parent: GraphId, child: GraphId) -> Result<()> {
        if self.graphs[child].is_component() {
            return Err(Error::InvalidChild {
                component: self.graphs[parent].name.clone(),
                child: self.graphs[child].name.clone(),
            });
        }
        let GraphKind::Component { ref mut children } = self.graphs[parent].kind else {
            return Err(Error::InvalidChild {
                component: self.graphs[parent].name.clone(),
                child: self.graphs[child].name.clone(),
            });
        };
        children.push(child);
        self.graphs[child].parent = Some(parent);
        Ok(())
    }

    /// Instantiates a component: ports, port arrays, parameters and
    /// literals are deep-copied onto a fresh instance graph. Signals
    /// stay behind in the component body.
    ///
    /// A node serving several roles (say, a parameter that is also an
    /// array size) is copied once; the copied array's size slot and its
    /// elements all reference that one copy.
    pub fn instance(&mut self, name: impl Into<String>, component: GraphId) -> Result<GraphId> {
        let name = name.into();
        if !self.graphs[component].is_component() {
            return Err(Error::internal(format!(
                "cannot instantiate non-component graph {}",
                self.graphs[component].name
            )));
        }
        let inst = self.graphs.alloc(Graph {
            name,
            kind: GraphKind::Instance { component },
            objects: Vec::new(),
            parent: None,
            meta: self.graphs[component].meta.clone(),
        });
        let mut copies: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        let objects = self.graphs[component].objects.clone();
        for object in objects {
            match object {
                ObjectId::Node(node) => match self.nodes[node].class() {
                    NodeClass::Port | NodeClass::Parameter | NodeClass::Literal => {
                        let copy = self.copy_of(node, &mut copies);
                        self.add_node_object(inst, copy)?;
                    }
                    NodeClass::Signal | NodeClass::Expression => {}
                },
                ObjectId::Array(array) => {
                    if self.arrays[array].class == NodeClass::Signal {
                        continue;
                    }
                    let copy = self.copy_array(array, &mut copies);
                    self.add_array_object(inst, copy)?;
                }
            }
        }
        Ok(inst)
    }

    fn copy_of(&mut self, node: NodeId, copies: &mut BTreeMap<NodeId, NodeId>) -> NodeId {
        if let Some(&existing) = copies.get(&node) {
            return existing;
        }
        let copy = self.copy_node(node);
        copies.insert(node, copy);
        copy
    }

    fn copy_array(&mut self, array: ArrayId, copies: &mut BTreeMap<NodeId, NodeId>) -> ArrayId {
        let base = self.arrays[array].base;
        let size = self.arrays[array].size;
        let count = self.arrays[array].nodes.len();
        let name = self.arrays[array].name.clone();
        let base_copy = self.copy_of(base, copies);
        let size_copy = self.copy_of(size, copies);
        let array_copy = self.node_array(name, base_copy, size_copy);
        for index in 0..count {
            let element = self.copy_node(base_copy);
            self.nodes[element].name = format!("{}{}", self.nodes[base_copy].name, index);
            self.nodes[element].array = Some(array_copy);
            self.arrays[array_copy].nodes.push(element);
        }
        array_copy
    }

    /// The nodes a graph owns directly, in declaration order.
    pub fn graph_nodes(&self, graph: GraphId) -> Vec<NodeId> {
        self.graphs[graph]
            .objects
            .iter()
            .filter_map(|obj| match obj {
                ObjectId::Node(n) => Some(*n),
                ObjectId::Array(_) => None,
            })
            .collect()
    }

    /// The arrays a graph owns, in declaration order.
    pub fn graph_arrays(&self, graph: GraphId) -> Vec<ArrayId> {
        self.graphs[graph]
            .objects
            .iter()
            .filter_map(|obj| match obj {
                ObjectId::Array(a) => Some(*a),
                ObjectId::Node(_) => None,
            })
            .collect()
    }

    /// The graph's nodes of one class, in declaration order.
    pub fn nodes_of_class(&self, graph: GraphId, class: NodeClass) -> Vec<NodeId> {
        self.graph_nodes(graph)
            .into_iter()
            .filter(|&n| self.nodes[n].class() == class)
            .collect()
    }

    /// The graph's arrays of one class, in declaration order.
    pub fn arrays_of_class(&self, graph: GraphId, class: NodeClass) -> Vec<ArrayId> {
        self.graph_arrays(graph)
            .into_iter()
            .filter(|&a| self.arrays[a].class == class)
            .collect()
    }

    /// Looks up a node by class and name on a graph.
    pub fn graph_node(&self, graph: GraphId, class: NodeClass, name: &str) -> Result<NodeId> {
        self.nodes_of_class(graph, class)
            .into_iter()
            .find(|&n| self.nodes[n].name == name)
            .ok_or_else(|| Error::NodeNotFound {
                kind: class.as_str().to_string(),
                name: name.to_string(),
                graph: self.graphs[graph].name.clone(),
            })
    }

    /// Looks up a port by name on a graph.
    pub fn graph_port(&self, graph: GraphId, name: &str) -> Result<NodeId> {
        self.graph_node(graph, NodeClass::Port, name)
    }

    /// Looks up a parameter by name on a graph.
    pub fn graph_parameter(&self, graph: GraphId, name: &str) -> Result<NodeId> {
        self.graph_node(graph, NodeClass::Parameter, name)
    }

    /// Looks up a node array by class and name on a graph.
    pub fn graph_array(&self, graph: GraphId, class: NodeClass, name: &str) -> Result<ArrayId> {
        self.arrays_of_class(graph, class)
            .into_iter()
            .find(|&a| self.arrays[a].name == name)
            .ok_or_else(|| Error::ArrayNotFound {
                kind: class.as_str().to_string(),
                name: name.to_string(),
                graph: self.graphs[graph].name.clone(),
            })
    }

    /// A parameter's bound value (the source of its driving edge), if
    /// one is connected, falling back to its default.
    pub fn param_value(&self, node: NodeId) -> Option<NodeId> {
        if let Some(edge) = self.nodes[node].input {
            if let Some(src) = self.edges[edge].src {
                return Some(src);
            }
        }
        match self.nodes[node].kind {
            NodeKind::Parameter { default } => default,
            _ => None,
        }
    }

    /// The child instances of a component, in placement order.
    pub fn children(&self, graph: GraphId) -> Vec<GraphId> {
        match self.graphs[graph].kind {
            GraphKind::Component { ref children } => children.clone(),
            GraphKind::Instance { .. } => Vec::new(),
        }
    }

    /// The component an instance instantiates.
    pub fn component_of(&self, instance: GraphId) -> Option<GraphId> {
        match self.graphs[instance].kind {
            GraphKind::Instance { component } => Some(component),
            GraphKind::Component { .. } => None,
        }
    }

    /// The distinct components instantiated by a component's children,
    /// in first-use order.
    pub fn unique_children(&self, graph: GraphId) -> Vec<GraphId> {
        let mut out = Vec::new();
        for child in self.children(graph) {
            if let Some(comp) = self.component_of(child) {
                if !out.contains(&comp) {
                    out.push(comp);
                }
            }
        }
        out
    }

    /// Nodes feeding this graph's objects that no graph owns. These are
    /// typically shared literals and free-standing width expressions;
    /// backends declare them as constants where needed.
    pub fn implicit_nodes(&self, graph: GraphId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for edge in self.all_edges(graph) {
            if let Some(src) = self.edges[edge].src {
                if self.nodes[src].parent.is_none()
                    && self.nodes[src].array.is_none()
                    && !out.contains(&src)
                {
                    out.push(src);
                }
            }
        }
        out
    }
}
