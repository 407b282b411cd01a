//! Edges and the connection rules.
//!
//! An edge points from a source node to a destination node. Both ends
//! are optional: detaching clears an end in place and leaves the edge
//! behind as a tombstone, which every traversal skips. Edges are never
//! removed from the arena.

use crate::design::Design;
use crate::ids::{EdgeId, GraphId, NodeId};
use crate::node::{Dir, Node, NodeClass, NodeKind};
use serde::{Deserialize, Serialize};
use weft_common::{Error, Result};

/// A directed connection between two nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// The edge name, `{src}_to_{dst}` at creation time.
    pub name: String,
    /// The driving node, if still attached.
    pub(crate) src: Option<NodeId>,
    /// The driven node, if still attached.
    pub(crate) dst: Option<NodeId>,
}

impl Edge {
    /// Whether both ends are attached.
    pub fn is_complete(&self) -> bool {
        self.src.is_some() && self.dst.is_some()
    }

    /// The driving node, if still attached.
    pub fn src(&self) -> Option<NodeId> {
        self.src
    }

    /// The driven node, if still attached.
    pub fn dst(&self) -> Option<NodeId> {
        self.dst
    }
}

impl Design {
    /// Connects `src` to `dst`, returning the new edge.
    ///
    /// The connection is validated before anything is mutated, so a
    /// failed connect leaves the graph unchanged:
    ///
    /// - a type mapping between the two types must resolve;
    /// - literals and expressions may not be driven;
    /// - an instance port of mode `out` and a component port of mode
    ///   `in` may not be driven;
    /// - an instance port of mode `in` and a component port of mode
    ///   `out` may not act as a source.
    ///
    /// If `dst` already has a driver, that edge's destination end is
    /// detached first; the single-driver rule always holds afterwards.
    pub fn connect(&mut self, dst: NodeId, src: NodeId) -> Result<EdgeId> {
        let src_ty = self.nodes[src].ty;
        let dst_ty = self.nodes[dst].ty;
        if self.resolve_mapper(src_ty, dst_ty)?.is_none() {
            return Err(Error::NoTypeMapping {
                dst: self.nodes[dst].name.clone(),
                dst_type: self.type_label(dst_ty),
                src: self.nodes[src].name.clone(),
                src_type: self.type_label(src_ty),
            });
        }
        match self.nodes[dst].class() {
            NodeClass::Literal => {
                return Err(Error::CannotDrive {
                    kind: "literal".to_string(),
                    node: self.nodes[dst].name.clone(),
                });
            }
            NodeClass::Expression => {
                return Err(Error::CannotDrive {
                    kind: "expression".to_string(),
                    node: self.nodes[dst].name.clone(),
                });
            }
            _ => {}
        }
        self.check_sink_side(dst)?;
        self.check_source_side(src)?;

        if let Some(old) = self.nodes[dst].input.take() {
            // The stale edge stays registered on its source as a
            // tombstone with a cleared destination.
            self.edges[old].dst = None;
        }
        let name = format!("{}_to_{}", self.nodes[src].name, self.nodes[dst].name);
        let edge = self.edges.alloc(Edge {
            name,
            src: Some(src),
            dst: Some(dst),
        });
        self.nodes[src].outputs.push(edge);
        self.nodes[dst].input = Some(edge);
        Ok(edge)
    }

    fn port_context(&self, node: NodeId) -> Option<&'static str> {
        let parent = self.nodes[node].parent.or_else(|| {
            self.nodes[node]
                .array
                .and_then(|aid| self.arrays[aid].parent)
        })?;
        Some(match self.graphs[parent].kind {
            crate::graph::GraphKind::Component { .. } => "component",
            crate::graph::GraphKind::Instance { .. } => "instance",
        })
    }

    fn check_sink_side(&self, dst: NodeId) -> Result<()> {
        let NodeKind::Port { dir } = self.nodes[dst].kind else {
            return Ok(());
        };
        match (self.port_context(dst), dir) {
            (Some("instance"), Dir::Out) | (Some("component"), Dir::In) => {
                Err(Error::DirectionViolation {
                    context: self.port_context(dst).unwrap_or("unowned").to_string(),
                    port: self.nodes[dst].name.clone(),
                    dir: dir.as_str().to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    fn check_source_side(&self, src: NodeId) -> Result<()> {
        let NodeKind::Port { dir } = self.nodes[src].kind else {
            return Ok(());
        };
        match (self.port_context(src), dir) {
            (Some("instance"), Dir::In) | (Some("component"), Dir::Out) => {
                Err(Error::SourceViolation {
                    context: self.port_context(src).unwrap_or("unowned").to_string(),
                    port: self.nodes[src].name.clone(),
                    dir: dir.as_str().to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Detaches both ends of an edge, leaving it as a tombstone.
    pub fn remove_edge(&mut self, edge: EdgeId) {
        if let Some(src) = self.edges[edge].src.take() {
            self.nodes[src].outputs.retain(|&e| e != edge);
        }
        if let Some(dst) = self.edges[edge].dst.take() {
            if self.nodes[dst].input == Some(edge) {
                self.nodes[dst].input = None;
            }
        }
    }

    /// Splices a fresh signal into a complete edge: the edge is removed
    /// and replaced by `src -> signal -> dst`. The signal's name is the
    /// source name behind `prefix`, and it is added to `owner` when one
    /// is given.
    pub fn insert_signal(
        &mut self,
        edge: EdgeId,
        prefix: &str,
        owner: Option<GraphId>,
    ) -> Result<NodeId> {
        let (Some(src), Some(dst)) = (self.edges[edge].src, self.edges[edge].dst) else {
            return Err(Error::IncompleteEdge {
                edge: self.edges[edge].name.clone(),
            });
        };
        let ty = self.nodes[src].ty;
        let name = format!("{}{}", prefix, self.nodes[src].name);
        let signal = self.nodes.alloc(Node::new(name, NodeKind::Signal, ty));
        if let Some(graph) = owner {
            self.add_node_object(graph, signal)?;
        }
        self.remove_edge(edge);
        self.connect(signal, src)?;
        self.connect(dst, signal)?;
        Ok(signal)
    }

    /// Every edge reachable from a graph's nodes and arrays, visiting
    /// instances recursively, in a deterministic order and without
    /// duplicates. Tombstoned edges are skipped.
    pub fn all_edges(&self, graph: GraphId) -> Vec<EdgeId> {
        let mut out = Vec::new();
        self.collect_edges(graph, &mut out);
        out
    }

    fn collect_edges(&self, graph: GraphId, out: &mut Vec<EdgeId>) {
        for node in self.graph_nodes(graph) {
            self.collect_node_edges(node, out);
        }
        for array in self.graph_arrays(graph) {
            for &node in self.arrays[array].nodes() {
                self.collect_node_edges(node, out);
            }
        }
        if let crate::graph::GraphKind::Component { ref children } = self.graphs[graph].kind {
            for &child in children {
                self.collect_edges(child, out);
            }
        }
    }

    fn collect_node_edges(&self, node: NodeId, out: &mut Vec<EdgeId>) {
        let mut push = |e: EdgeId| {
            if self.edges[e].is_complete() && !out.contains(&e) {
                out.push(e);
            }
        };
        if let Some(e) = self.nodes[node].input {
            push(e);
        }
        for &e in &self.nodes[node].outputs {
            push(e);
        }
    }
}
