//! Graph nodes: literals, expressions, signals, ports and parameters.

use crate::ids::{ArrayId, EdgeId, GraphId, NodeId, TypeId};
use serde::{Deserialize, Serialize};

/// Port direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dir {
    /// Into the graph that owns the port.
    In,
    /// Out of the graph that owns the port.
    Out,
    /// Directionless.
    None,
}

impl Dir {
    /// The opposite direction. `None` stays `None`.
    pub fn reverse(self) -> Self {
        match self {
            Dir::In => Dir::Out,
            Dir::Out => Dir::In,
            Dir::None => Dir::None,
        }
    }

    /// Lower-case text for diagnostics and port declarations.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::In => "in",
            Dir::Out => "out",
            Dir::None => "none",
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LitValue {
    /// An integer literal.
    Int(i64),
    /// A string literal.
    Str(String),
    /// A boolean literal.
    Bool(bool),
}

impl LitValue {
    /// Renders the value the way it appears in generated sources.
    pub fn render(&self) -> String {
        match self {
            LitValue::Int(v) => v.to_string(),
            LitValue::Str(v) => v.clone(),
            LitValue::Bool(v) => v.to_string(),
        }
    }
}

/// A binary operator in a width or size expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
}

impl BinOp {
    /// The operator symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        }
    }

    /// Binding strength, used to parenthesize rendered expressions.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div => 2,
        }
    }
}

/// What a node is, as a closed variant set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A constant. Source-only: literals may never be driven.
    Literal(LitValue),
    /// A binary expression over two other nodes. Source-only.
    Expression {
        /// The operator.
        op: BinOp,
        /// Left operand.
        lhs: NodeId,
        /// Right operand.
        rhs: NodeId,
    },
    /// An intermediate wire inside a component body.
    Signal,
    /// A directed connection point on a graph boundary.
    Port {
        /// The port direction, from the owning graph's point of view.
        dir: Dir,
    },
    /// A compile-time configurable value.
    Parameter {
        /// The value used when nothing is bound to the parameter.
        default: Option<NodeId>,
    },
}

/// The kind of a node without its payload, for queries and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeClass {
    /// Literal nodes.
    Literal,
    /// Expression nodes.
    Expression,
    /// Signal nodes.
    Signal,
    /// Port nodes.
    Port,
    /// Parameter nodes.
    Parameter,
}

impl NodeClass {
    /// The class name, used in lookup errors.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeClass::Literal => "Literal",
            NodeClass::Expression => "Expression",
            NodeClass::Signal => "Signal",
            NodeClass::Port => "Port",
            NodeClass::Parameter => "Parameter",
        }
    }
}

/// A node of the design graph.
///
/// Edge slots enforce the single-driver rule: a node has at most one
/// input edge, and any number of output edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// The node name.
    pub name: String,
    /// What the node is.
    pub kind: NodeKind,
    /// The node's type.
    pub ty: TypeId,
    /// The edge driving this node, if any.
    pub(crate) input: Option<EdgeId>,
    /// The edges this node drives.
    pub(crate) outputs: Vec<EdgeId>,
    /// The graph that owns this node, if any.
    pub(crate) parent: Option<GraphId>,
    /// The array this node is an element of, if any.
    pub(crate) array: Option<ArrayId>,
}

impl Node {
    /// Creates an unowned, unconnected node.
    pub fn new(name: impl Into<String>, kind: NodeKind, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            kind,
            ty,
            input: None,
            outputs: Vec::new(),
            parent: None,
            array: None,
        }
    }

    /// The class of this node.
    pub fn class(&self) -> NodeClass {
        match self.kind {
            NodeKind::Literal(_) => NodeClass::Literal,
            NodeKind::Expression { .. } => NodeClass::Expression,
            NodeKind::Signal => NodeClass::Signal,
            NodeKind::Port { .. } => NodeClass::Port,
            NodeKind::Parameter { .. } => NodeClass::Parameter,
        }
    }

    /// The port direction, or `Dir::None` for non-port nodes.
    pub fn dir(&self) -> Dir {
        match self.kind {
            NodeKind::Port { dir } => dir,
            _ => Dir::None,
        }
    }

    /// The edge driving this node.
    pub fn input(&self) -> Option<EdgeId> {
        self.input
    }

    /// The edges this node drives.
    pub fn outputs(&self) -> &[EdgeId] {
        self.outputs.as_slice()
    }

    /// The graph owning this node.
    pub fn parent(&self) -> Option<GraphId> {
        self.parent
    }

    /// The array this node is an element of.
    pub fn array(&self) -> Option<ArrayId> {
        self.array
    }

    /// The integer value, if this is an integer literal.
    pub fn int_value(&self) -> Option<i64> {
        match &self.kind {
            NodeKind::Literal(LitValue::Int(v)) => Some(*v),
            _ => None,
        }
    }
}
