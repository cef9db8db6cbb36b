//! XPath expression compiler.
//!
//! Lowers the parsed AST into a flat stack program. Two predicate shapes
//! dominate element queries — `[@attr='value']` and a literal position
//! `[n]` — so they compile to dedicated ops instead of a nested program.

use super::parser::{self, Axis, BinaryOp, Expr, NodeTest, Step};

/// Compiled form of one XPath query, valid for a single evaluation and
/// never cached across calls.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    pub ops: Vec<Op>,
}

/// Compiled operation
#[derive(Debug, Clone)]
pub enum Op {
    /// Push the document node onto the stack
    Root,
    /// Push the context node onto the stack
    Context,
    /// Navigate to parent (..)
    Parent,
    /// Navigate along axis with node test
    Navigate(Axis, CompiledNodeTest),
    /// Apply predicate filter
    Predicate(Box<CompiledQuery>),
    /// Fast path: [@attr = 'value']
    PredicateAttrEq(String, String),
    /// Fast path: [n] with a positive integer literal
    PredicatePosition(usize),
    /// Union two node sets
    Union,
    /// Push literal number
    Number(f64),
    /// Push literal string
    String(String),
    /// Call function (name, arg count)
    Call(String, usize),
    /// Binary operation
    Binary(BinaryOp),
    /// Negate
    Negate,
}

/// Compiled node test
#[derive(Debug, Clone)]
pub enum CompiledNodeTest {
    Any,
    Name(String),
    Node,
    Text,
    Comment,
}

impl CompiledQuery {
    /// Compile a parsed expression
    pub fn compile(expr: &Expr) -> Self {
        let mut ops = Vec::new();
        Self::compile_expr(expr, &mut ops);
        CompiledQuery { ops }
    }

    fn compile_expr(expr: &Expr, ops: &mut Vec<Op>) {
        match expr {
            Expr::Root => {
                ops.push(Op::Root);
            }
            Expr::Context => {
                ops.push(Op::Context);
            }
            Expr::Parent => {
                ops.push(Op::Parent);
            }
            Expr::Number(n) => {
                ops.push(Op::Number(*n));
            }
            Expr::String(s) => {
                ops.push(Op::String(s.clone()));
            }
            Expr::Negate(inner) => {
                Self::compile_expr(inner, ops);
                ops.push(Op::Negate);
            }
            Expr::Binary(left, op, right) => {
                Self::compile_expr(left, ops);
                Self::compile_expr(right, ops);
                ops.push(Op::Binary(*op));
            }
            Expr::Union(left, right) => {
                Self::compile_expr(left, ops);
                Self::compile_expr(right, ops);
                ops.push(Op::Union);
            }
            Expr::Path(base, step) => {
                Self::compile_expr(base, ops);
                Self::compile_step(step, ops);
            }
            Expr::Filter(base, pred) => {
                Self::compile_expr(base, ops);
                ops.push(Self::compile_predicate(pred));
            }
            Expr::Step(step) => {
                ops.push(Op::Context);
                Self::compile_step(step, ops);
            }
            Expr::Function(name, args) => {
                for arg in args {
                    Self::compile_expr(arg, ops);
                }
                ops.push(Op::Call(name.clone(), args.len()));
            }
        }
    }

    fn compile_step(step: &Step, ops: &mut Vec<Op>) {
        let node_test = match &step.node_test {
            NodeTest::Any => CompiledNodeTest::Any,
            NodeTest::Name(n) => CompiledNodeTest::Name(n.clone()),
            NodeTest::Node => CompiledNodeTest::Node,
            NodeTest::Text => CompiledNodeTest::Text,
            NodeTest::Comment => CompiledNodeTest::Comment,
        };

        ops.push(Op::Navigate(step.axis, node_test));

        for pred in &step.predicates {
            ops.push(Self::compile_predicate(pred));
        }
    }

    /// Compile one predicate, using a fast-path op where the shape allows.
    fn compile_predicate(pred: &Expr) -> Op {
        if let Some(op) = Self::try_attr_eq(pred) {
            return op;
        }
        if let Some(op) = Self::try_position(pred) {
            return op;
        }
        Op::Predicate(Box::new(CompiledQuery::compile(pred)))
    }

    /// Match `[@attr = 'value']` (either operand order).
    fn try_attr_eq(pred: &Expr) -> Option<Op> {
        let Expr::Binary(left, BinaryOp::Eq, right) = pred else {
            return None;
        };

        let (step_expr, literal) = match (left.as_ref(), right.as_ref()) {
            (step @ Expr::Step(_), Expr::String(s)) => (step, s),
            (Expr::String(s), step @ Expr::Step(_)) => (step, s),
            _ => return None,
        };

        let Expr::Step(step) = step_expr else {
            return None;
        };
        if step.axis != Axis::Attribute || !step.predicates.is_empty() {
            return None;
        }
        let NodeTest::Name(attr) = &step.node_test else {
            return None;
        };

        Some(Op::PredicateAttrEq(attr.clone(), literal.clone()))
    }

    /// Match `[n]` with a positive integer literal.
    fn try_position(pred: &Expr) -> Option<Op> {
        let Expr::Number(n) = pred else {
            return None;
        };
        if *n >= 1.0 && n.fract() == 0.0 && *n < usize::MAX as f64 {
            Some(Op::PredicatePosition(*n as usize))
        } else {
            None
        }
    }
}

/// Compile an XPath expression string
pub fn compile(xpath: &str) -> Result<CompiledQuery, String> {
    let expr = parser::parse(xpath)?;
    Ok(CompiledQuery::compile(&expr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_simple() {
        let compiled = compile("/Window").unwrap();
        assert!(matches!(compiled.ops[0], Op::Root));
        assert!(matches!(compiled.ops[1], Op::Navigate(Axis::Child, _)));
    }

    #[test]
    fn test_compile_attr_eq_fast_path() {
        let compiled = compile("//Button[@name='OK']").unwrap();
        assert!(compiled
            .ops
            .iter()
            .any(|op| matches!(op, Op::PredicateAttrEq(attr, value) if attr == "name" && value == "OK")));
    }

    #[test]
    fn test_compile_position_fast_path() {
        let compiled = compile("//Cell[2]").unwrap();
        assert!(compiled
            .ops
            .iter()
            .any(|op| matches!(op, Op::PredicatePosition(2))));
    }

    #[test]
    fn test_general_predicate_stays_general() {
        let compiled = compile("//Cell[position() > 1]").unwrap();
        assert!(compiled.ops.iter().any(|op| matches!(op, Op::Predicate(_))));
    }

    #[test]
    fn test_compile_rejects_bad_syntax() {
        assert!(compile("///bad[[ ").is_err());
    }
}
