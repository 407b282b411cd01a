//! Width and size expressions.
//!
//! Expressions are ordinary nodes, so widths may reference parameters
//! and survive into generated sources as text. [`Design::minimize`]
//! rewrites an expression tree into a simpler equivalent; it never
//! mutates existing nodes, it allocates new ones.

use crate::design::Design;
use crate::ids::NodeId;
use crate::node::{BinOp, LitValue, NodeKind};
use weft_common::{Error, Result};

impl Design {
    /// Allocates an expression node over two operands. The node is typed
    /// integer and named after its operator.
    pub fn expression(&mut self, op: BinOp, lhs: NodeId, rhs: NodeId) -> NodeId {
        let ty = self.integer_type();
        self.nodes.alloc(crate::node::Node::new(
            op.symbol(),
            NodeKind::Expression { op, lhs, rhs },
            ty,
        ))
    }

    /// `lhs + rhs` as a node.
    pub fn add_nodes(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.expression(BinOp::Add, lhs, rhs)
    }

    /// `lhs - rhs` as a node.
    pub fn sub_nodes(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.expression(BinOp::Sub, lhs, rhs)
    }

    /// `lhs * rhs` as a node.
    pub fn mul_nodes(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.expression(BinOp::Mul, lhs, rhs)
    }

    /// `lhs / rhs` as a node.
    pub fn div_nodes(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.expression(BinOp::Div, lhs, rhs)
    }

    /// `lhs + value`, folding immediately when `lhs` is itself an
    /// integer literal.
    pub fn add_int(&mut self, lhs: NodeId, value: i64) -> NodeId {
        if let Some(v) = self.nodes[lhs].int_value() {
            return self.int_literal(v + value);
        }
        let rhs = self.int_literal(value);
        self.add_nodes(lhs, rhs)
    }

    /// Rewrites an expression into a simpler equivalent node.
    ///
    /// Applied bottom-up to each operator:
    ///
    /// - `x + 0`, `0 + x`, `x - 0` reduce to `x`;
    /// - `x * 0` and `0 * x` reduce to `0`, `x * 1` and `1 * x` to `x`;
    /// - `0 / x` reduces to `0`, `x / 1` to `x`, and `x / 0` is fatal;
    /// - two integer literals of the same type fold into one.
    ///
    /// Non-expression nodes are returned unchanged, so the rewrite is
    /// idempotent up to structural equality.
    pub fn minimize(&mut self, node: NodeId) -> Result<NodeId> {
        let NodeKind::Expression { op, lhs, rhs } = self.nodes[node].kind else {
            return Ok(node);
        };
        let l = self.minimize(lhs)?;
        let r = self.minimize(rhs)?;
        let lv = self.nodes[l].int_value();
        let rv = self.nodes[r].int_value();
        match op {
            BinOp::Add => {
                if lv == Some(0) {
                    return Ok(r);
                }
                if rv == Some(0) {
                    return Ok(l);
                }
            }
            BinOp::Sub => {
                if rv == Some(0) {
                    return Ok(l);
                }
            }
            BinOp::Mul => {
                if lv == Some(0) || rv == Some(0) {
                    return Ok(self.int_literal(0));
                }
                if lv == Some(1) {
                    return Ok(r);
                }
                if rv == Some(1) {
                    return Ok(l);
                }
            }
            BinOp::Div => {
                if rv == Some(0) {
                    return Err(Error::DivisionByZero {
                        expr: self.node_text(node),
                    });
                }
                if lv == Some(0) {
                    return Ok(self.int_literal(0));
                }
                if rv == Some(1) {
                    return Ok(l);
                }
            }
        }
        if let (Some(a), Some(b)) = (lv, rv) {
            if self.nodes[l].ty == self.nodes[r].ty {
                let v = match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                };
                return Ok(self.int_literal(v));
            }
        }
        if l == lhs && r == rhs {
            return Ok(node);
        }
        Ok(self.expression(op, l, r))
    }

    /// Renders a node as source text: literal values, node names, or the
    /// infix form of an expression, parenthesizing operands only where
    /// precedence demands it.
    pub fn node_text(&self, node: NodeId) -> String {
        match &self.nodes[node].kind {
            NodeKind::Literal(v) => v.render(),
            NodeKind::Expression { op, lhs, rhs } => {
                let l = self.operand_text(*lhs, *op, false);
                let r = self.operand_text(*rhs, *op, true);
                format!("{}{}{}", l, op.symbol(), r)
            }
            _ => self.nodes[node].name.clone(),
        }
    }

    fn operand_text(&self, operand: NodeId, parent: BinOp, right: bool) -> String {
        let text = self.node_text(operand);
        if let NodeKind::Expression { op, .. } = self.nodes[operand].kind {
            let needs_parens = op.precedence() < parent.precedence()
                || (right && op.precedence() == parent.precedence()
                    && matches!(parent, BinOp::Sub | BinOp::Div));
            if needs_parens {
                return format!("({text})");
            }
        }
        text
    }
}

/// Whether a node can act as an integer literal with the given value.
pub fn is_int_literal(design: &Design, node: NodeId, value: i64) -> bool {
    design.nodes[node].kind == NodeKind::Literal(LitValue::Int(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::Design;
    use crate::node::Dir;

    #[test]
    fn zero_plus_literal_folds() {
        let mut d = Design::new();
        let zero = d.int_literal(0);
        let five = d.int_literal(5);
        let e = d.add_nodes(zero, five);
        let m = d.minimize(e).unwrap();
        assert_eq!(m, five);
        assert_eq!(d.node_text(m), "5");
    }

    #[test]
    fn identities_eliminate_operands() {
        let mut d = Design::new();
        let w = d.parameter("W", d.integer_type(), None);
        let zero = d.int_literal(0);
        let one = d.int_literal(1);

        let e = d.sub_nodes(w, zero);
        assert_eq!(d.minimize(e).unwrap(), w);

        let e = d.mul_nodes(w, one);
        assert_eq!(d.minimize(e).unwrap(), w);

        let e = d.mul_nodes(w, zero);
        let m = d.minimize(e).unwrap();
        assert!(is_int_literal(&d, m, 0));

        let e = d.div_nodes(zero, w);
        let m = d.minimize(e).unwrap();
        assert!(is_int_literal(&d, m, 0));

        let e = d.div_nodes(w, one);
        assert_eq!(d.minimize(e).unwrap(), w);
    }

    #[test]
    fn division_by_zero_is_fatal() {
        let mut d = Design::new();
        let w = d.parameter("W", d.integer_type(), None);
        let zero = d.int_literal(0);
        let e = d.div_nodes(w, zero);
        assert!(matches!(
            d.minimize(e),
            Err(weft_common::Error::DivisionByZero { .. })
        ));
    }

    #[test]
    fn literal_folding_collapses_trees() {
        let mut d = Design::new();
        let two = d.int_literal(2);
        let three = d.int_literal(3);
        let four = d.int_literal(4);
        let sum = d.add_nodes(two, three);
        let prod = d.mul_nodes(sum, four);
        let m = d.minimize(prod).unwrap();
        assert!(is_int_literal(&d, m, 20));
    }

    #[test]
    fn minimize_is_idempotent() {
        let mut d = Design::new();
        let w = d.parameter("W", d.integer_type(), None);
        let e = d.add_int(w, 0);
        let once = d.minimize(e).unwrap();
        let twice = d.minimize(once).unwrap();
        assert_eq!(d.node_text(once), d.node_text(twice));
        assert_eq!(once, twice);
    }

    #[test]
    fn parametric_expressions_keep_their_text() {
        let mut d = Design::new();
        let w = d.parameter("WIDTH", d.integer_type(), None);
        let one = d.int_literal(1);
        let e = d.sub_nodes(w, one);
        assert_eq!(d.node_text(e), "WIDTH-1");
    }

    #[test]
    fn rendering_parenthesizes_by_precedence() {
        let mut d = Design::new();
        let a = d.parameter("A", d.integer_type(), None);
        let b = d.parameter("B", d.integer_type(), None);
        let c = d.parameter("C", d.integer_type(), None);
        let sum = d.add_nodes(a, b);
        let prod = d.mul_nodes(sum, c);
        assert_eq!(d.node_text(prod), "(A+B)*C");
        let diff = d.sub_nodes(a, sum);
        assert_eq!(d.node_text(diff), "A-(A+B)");
    }

    #[test]
    fn ports_render_as_their_name() {
        let mut d = Design::new();
        let bit = d.bit_type();
        let p = d.port("valid", bit, Dir::In);
        assert_eq!(d.node_text(p), "valid");
    }

    #[test]
    fn add_int_folds_onto_literals() {
        let mut d = Design::new();
        let three = d.int_literal(3);
        let n = d.add_int(three, 2);
        assert!(is_int_literal(&d, n, 5));
        // Interned: equal literal values share a node.
        assert_eq!(n, d.int_literal(5));
    }
}
