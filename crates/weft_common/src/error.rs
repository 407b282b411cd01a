//! Error types for graph construction and generation.
//!
//! Every error here is unrecoverable at the point of detection: it aborts
//! the current generation request and identifies the offending node, type
//! or graph by name. The core never retries; callers report and stop.

/// The standard result type for all fallible weft operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or lowering a design graph.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A node lookup by name and kind found nothing on the graph.
    #[error("{kind} node {name} does not exist on graph {graph}")]
    NodeNotFound {
        /// The node kind that was requested.
        kind: String,
        /// The name that was looked up.
        name: String,
        /// The graph that was searched.
        graph: String,
    },

    /// A node array lookup by name and kind found nothing on the graph.
    #[error("{kind} array {name} does not exist on graph {graph}")]
    ArrayNotFound {
        /// The node kind of the requested array.
        kind: String,
        /// The name that was looked up.
        name: String,
        /// The graph that was searched.
        graph: String,
    },

    /// A non-Instance graph was added as a child of a Component.
    #[error("component {component} may only have instance children, {child} is not an instance")]
    InvalidChild {
        /// The component that rejected the child.
        component: String,
        /// The offending child graph.
        child: String,
    },

    /// A Signal node was added to an Instance graph.
    #[error("cannot add signal {signal} to instance {instance}")]
    SignalOnInstance {
        /// The rejected signal.
        signal: String,
        /// The instance it was added to.
        instance: String,
    },

    /// A mapping matrix access was outside the matrix dimensions.
    #[error("mapping matrix index ({row}, {col}) exceeds dimensions {height}x{width}")]
    IndexOutOfBounds {
        /// The requested row.
        row: usize,
        /// The requested column.
        col: usize,
        /// The matrix height.
        height: usize,
        /// The matrix width.
        width: usize,
    },

    /// No type mapping could be resolved between two connected nodes.
    #[error(
        "no known type mapping available for connection between node \
         {dst} ({dst_type}) and node {src} ({src_type})"
    )]
    NoTypeMapping {
        /// The destination node.
        dst: String,
        /// The destination node's type.
        dst_type: String,
        /// The source node.
        src: String,
        /// The source node's type.
        src_type: String,
    },

    /// A Stream type was flattened while its element type is unset.
    #[error("stream type {stream} has no element type")]
    EmptyStreamElement {
        /// The offending stream type.
        stream: String,
    },

    /// A duplicate or contradictory mapping registration.
    #[error("inconsistent mapping between {a} and {b}: {reason}")]
    InconsistentMapping {
        /// The mapper's A-side type.
        a: String,
        /// The mapper's B-side type.
        b: String,
        /// What went wrong.
        reason: String,
    },

    /// A second mapper was attached for an already-mapped type pair.
    #[error("mapper already exists to convert from {a} to {b}")]
    MapperExists {
        /// The mapper's A-side type.
        a: String,
        /// The mapper's B-side type.
        b: String,
    },

    /// A mapper was attached to a type it does not convert from.
    #[error("mapper {mapper} does not convert from type {ty}")]
    MapperMismatch {
        /// The mapper name.
        mapper: String,
        /// The type the mapper was attached to.
        ty: String,
    },

    /// Division by zero during expression simplification or folding.
    #[error("division by zero in expression {expr}")]
    DivisionByZero {
        /// The offending expression, rendered as text.
        expr: String,
    },

    /// A connection drove a port from the disallowed side.
    #[error("cannot drive {context} port {port} of mode {dir}")]
    DirectionViolation {
        /// Whether the port sits on an instance or a component.
        context: String,
        /// The offending port.
        port: String,
        /// The port's direction.
        dir: String,
    },

    /// A connection sourced a port from the disallowed side.
    #[error("cannot source from {context} port {port} of mode {dir}")]
    SourceViolation {
        /// Whether the port sits on an instance or a component.
        context: String,
        /// The offending port.
        port: String,
        /// The port's direction.
        dir: String,
    },

    /// A source-only node (Literal or Expression) was used as a destination.
    #[error("cannot drive {kind} node {node}")]
    CannotDrive {
        /// The node kind (literal or expression).
        kind: String,
        /// The offending node.
        node: String,
    },

    /// An operation required a complete edge but found a dangling one.
    #[error("edge {edge} is not complete")]
    IncompleteEdge {
        /// The offending edge.
        edge: String,
    },

    /// A node of an unexpected kind reached an operation.
    #[error("node {node} is not a {expected} node")]
    WrongNodeKind {
        /// The offending node.
        node: String,
        /// The kind the operation required.
        expected: String,
    },

    /// Internal invariant violation indicating a bug in weft itself.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the violated invariant.
        message: String,
    },
}

impl Error {
    /// Creates an internal-invariant error with the given message.
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_not_found_display() {
        let err = Error::NodeNotFound {
            kind: "Port".to_string(),
            name: "clk".to_string(),
            graph: "top".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Port node clk"));
        assert!(msg.contains("graph top"));
    }

    #[test]
    fn no_type_mapping_names_both_sides() {
        let err = Error::NoTypeMapping {
            dst: "a".to_string(),
            dst_type: "bit".to_string(),
            src: "b".to_string(),
            src_type: "vec8".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("node a (bit)"));
        assert!(msg.contains("node b (vec8)"));
    }

    #[test]
    fn direction_violation_display() {
        let err = Error::DirectionViolation {
            context: "instance".to_string(),
            port: "data_out".to_string(),
            dir: "out".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot drive instance port data_out of mode out"
        );
    }

    #[test]
    fn index_out_of_bounds_display() {
        let err = Error::IndexOutOfBounds {
            row: 3,
            col: 0,
            height: 2,
            width: 1,
        };
        assert!(err.to_string().contains("(3, 0)"));
        assert!(err.to_string().contains("2x1"));
    }

    #[test]
    fn internal_constructor() {
        let err = Error::internal("bad state");
        assert_eq!(err.to_string(), "internal error: bad state");
    }
}
