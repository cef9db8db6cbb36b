//! XPath evaluation engine.
//!
//! Executes a compiled stack program against the serialized document.
//! The evaluation context is the root element, so relative queries start
//! there while absolute ones re-anchor at the document node.

use std::collections::HashSet;

use super::axes::{matches_node_test, navigate};
use super::compiler::{CompiledNodeTest, CompiledQuery, Op};
use super::functions;
use super::parser::{Axis, BinaryOp};
use super::value::XPathValue;
use crate::dom::{NodeId, XmlDocument};

/// Evaluation context for one (sub-)expression.
struct EvalContext<'a> {
    doc: &'a XmlDocument,
    context_node: NodeId,
    context_position: usize,
    context_size: usize,
}

/// Evaluate a compiled query against a document.
#[must_use = "XPath evaluation result should be used"]
pub fn evaluate(doc: &XmlDocument, compiled: &CompiledQuery) -> Result<XPathValue, String> {
    let context = EvalContext {
        doc,
        context_node: doc.root_element_id().unwrap_or(doc.document_node_id()),
        context_position: 1,
        context_size: 1,
    };
    evaluate_ops(compiled, &context)
}

fn evaluate_ops(expr: &CompiledQuery, ctx: &EvalContext<'_>) -> Result<XPathValue, String> {
    let mut stack: Vec<XPathValue> = Vec::new();

    for op in &expr.ops {
        match op {
            Op::Root => {
                stack.push(XPathValue::single_node(ctx.doc.document_node_id()));
            }

            Op::Context => {
                stack.push(XPathValue::single_node(ctx.context_node));
            }

            Op::Parent => {
                let current = stack
                    .pop()
                    .unwrap_or(XPathValue::single_node(ctx.context_node));
                if let XPathValue::NodeSet(nodes) = current {
                    let mut seen = HashSet::with_capacity(nodes.len());
                    let mut parents = Vec::with_capacity(nodes.len());
                    for node in nodes {
                        if let Some(parent) = ctx.doc.parent_of(node) {
                            if seen.insert(parent) {
                                parents.push(parent);
                            }
                        }
                    }
                    parents.sort_unstable(); // Document order
                    stack.push(XPathValue::NodeSet(parents));
                } else {
                    stack.push(XPathValue::empty_nodeset());
                }
            }

            Op::Navigate(axis, node_test) => {
                let current = stack
                    .pop()
                    .unwrap_or(XPathValue::single_node(ctx.context_node));
                if let XPathValue::NodeSet(nodes) = current {
                    if *axis == Axis::Attribute {
                        stack.push(select_attributes(ctx.doc, &nodes, node_test));
                    } else {
                        // NodeIds are assigned in document order, so a plain
                        // sort restores document order after deduplication.
                        let mut seen = HashSet::with_capacity(nodes.len());
                        let mut result = Vec::with_capacity(nodes.len());
                        for node in nodes {
                            for candidate in navigate(ctx.doc, node, *axis) {
                                if matches_node_test(ctx.doc, candidate, node_test)
                                    && seen.insert(candidate)
                                {
                                    result.push(candidate);
                                }
                            }
                        }
                        result.sort_unstable();
                        stack.push(XPathValue::NodeSet(result));
                    }
                } else {
                    stack.push(XPathValue::empty_nodeset());
                }
            }

            Op::Predicate(pred_expr) => {
                let current = stack.pop().unwrap_or_default();
                if let XPathValue::NodeSet(nodes) = current {
                    let size = nodes.len();
                    let mut filtered = Vec::new();

                    for (i, &node) in nodes.iter().enumerate() {
                        let pred_ctx = EvalContext {
                            doc: ctx.doc,
                            context_node: node,
                            context_position: i + 1,
                            context_size: size,
                        };

                        let pred_result = evaluate_ops(pred_expr, &pred_ctx)?;

                        // A bare number predicate selects by position.
                        let include = match pred_result {
                            XPathValue::Number(n) => (i + 1) as f64 == n,
                            _ => pred_result.to_boolean(),
                        };

                        if include {
                            filtered.push(node);
                        }
                    }

                    stack.push(XPathValue::NodeSet(filtered));
                } else {
                    stack.push(XPathValue::empty_nodeset());
                }
            }

            // Fast path: [@attr = 'value'] without a sub-program.
            Op::PredicateAttrEq(attr_name, value) => {
                let current = stack.pop().unwrap_or_default();
                if let XPathValue::NodeSet(nodes) = current {
                    let mut filtered = Vec::new();
                    for &node in &nodes {
                        if ctx.doc.get_attribute(node, attr_name) == Some(value.as_str()) {
                            filtered.push(node);
                        }
                    }
                    stack.push(XPathValue::NodeSet(filtered));
                } else {
                    stack.push(XPathValue::empty_nodeset());
                }
            }

            // Fast path: [n] position predicate.
            Op::PredicatePosition(pos) => {
                let current = stack.pop().unwrap_or_default();
                if let XPathValue::NodeSet(nodes) = current {
                    if *pos > 0 && *pos <= nodes.len() {
                        stack.push(XPathValue::NodeSet(vec![nodes[*pos - 1]]));
                    } else {
                        stack.push(XPathValue::empty_nodeset());
                    }
                } else {
                    stack.push(XPathValue::empty_nodeset());
                }
            }

            Op::Union => {
                let right = stack.pop().unwrap_or_default();
                let left = stack.pop().unwrap_or_default();

                match (left, right) {
                    (XPathValue::NodeSet(l), XPathValue::NodeSet(r)) => {
                        let mut seen: HashSet<NodeId> = l.iter().copied().collect();
                        let mut result = l;
                        result.reserve(r.len());
                        for node in r {
                            if seen.insert(node) {
                                result.push(node);
                            }
                        }
                        result.sort_unstable(); // Document order
                        stack.push(XPathValue::NodeSet(result));
                    }
                    _ => {
                        return Err("union requires two node-sets".to_string());
                    }
                }
            }

            Op::Number(n) => {
                stack.push(XPathValue::Number(*n));
            }

            Op::String(s) => {
                stack.push(XPathValue::String(s.clone()));
            }

            Op::Negate => {
                let val = stack.pop().unwrap_or(XPathValue::Number(0.0));
                stack.push(XPathValue::Number(-val.to_number()));
            }

            Op::Binary(op) => {
                let right = stack.pop().unwrap_or(XPathValue::Number(0.0));
                let left = stack.pop().unwrap_or(XPathValue::Number(0.0));

                let result = match op {
                    BinaryOp::Or => XPathValue::Boolean(left.to_boolean() || right.to_boolean()),
                    BinaryOp::And => XPathValue::Boolean(left.to_boolean() && right.to_boolean()),
                    BinaryOp::Eq => compare_values(&left, &right, |a, b| a == b),
                    BinaryOp::NotEq => compare_values(&left, &right, |a, b| a != b),
                    BinaryOp::Lt => compare_numbers(&left, &right, |a, b| a < b),
                    BinaryOp::LtEq => compare_numbers(&left, &right, |a, b| a <= b),
                    BinaryOp::Gt => compare_numbers(&left, &right, |a, b| a > b),
                    BinaryOp::GtEq => compare_numbers(&left, &right, |a, b| a >= b),
                    BinaryOp::Add => XPathValue::Number(left.to_number() + right.to_number()),
                    BinaryOp::Sub => XPathValue::Number(left.to_number() - right.to_number()),
                    BinaryOp::Mul => XPathValue::Number(left.to_number() * right.to_number()),
                    BinaryOp::Div => XPathValue::Number(left.to_number() / right.to_number()),
                    BinaryOp::Mod => XPathValue::Number(left.to_number() % right.to_number()),
                };

                stack.push(result);
            }

            Op::Call(name, arg_count) => {
                let mut args = Vec::with_capacity(*arg_count);
                for _ in 0..*arg_count {
                    args.push(stack.pop().unwrap_or(XPathValue::String(String::new())));
                }
                args.reverse();

                let result = functions::call(
                    name,
                    args,
                    ctx.doc,
                    ctx.context_node,
                    ctx.context_position,
                    ctx.context_size,
                )?;

                stack.push(result);
            }
        }
    }

    Ok(stack.pop().unwrap_or_default())
}

/// Resolve the attribute axis: attribute values are plain strings in this
/// document model, not nodes.
fn select_attributes(
    doc: &XmlDocument,
    nodes: &[NodeId],
    node_test: &CompiledNodeTest,
) -> XPathValue {
    let mut values: Vec<String> = Vec::new();
    for &node in nodes {
        match node_test {
            CompiledNodeTest::Any | CompiledNodeTest::Node => {
                for attr in doc.attributes(node) {
                    values.push(attr.value.clone());
                }
            }
            CompiledNodeTest::Name(name) => {
                if let Some(value) = doc.get_attribute(node, name) {
                    values.push(value.to_string());
                }
            }
            CompiledNodeTest::Text | CompiledNodeTest::Comment => {}
        }
    }

    if values.is_empty() {
        XPathValue::StringList(Vec::new())
    } else if values.len() == 1 {
        XPathValue::String(values.pop().unwrap_or_default())
    } else {
        XPathValue::StringList(values)
    }
}

/// XPath equality: set-valued operands compare existentially.
fn compare_values<F>(left: &XPathValue, right: &XPathValue, cmp: F) -> XPathValue
where
    F: Fn(&str, &str) -> bool,
{
    match (left, right) {
        (XPathValue::StringList(ls), XPathValue::StringList(rs)) => {
            for l in ls {
                for r in rs {
                    if cmp(l, r) {
                        return XPathValue::Boolean(true);
                    }
                }
            }
            XPathValue::Boolean(false)
        }
        (XPathValue::StringList(values), other) | (other, XPathValue::StringList(values)) => {
            let other_str = other.to_string_value();
            for v in values {
                if cmp(v, &other_str) {
                    return XPathValue::Boolean(true);
                }
            }
            XPathValue::Boolean(false)
        }
        (XPathValue::Boolean(_), _) | (_, XPathValue::Boolean(_)) => XPathValue::Boolean(cmp(
            &left.to_boolean().to_string(),
            &right.to_boolean().to_string(),
        )),
        (XPathValue::Number(_), _) | (_, XPathValue::Number(_)) => XPathValue::Boolean(cmp(
            &left.to_number().to_string(),
            &right.to_number().to_string(),
        )),
        _ => XPathValue::Boolean(cmp(&left.to_string_value(), &right.to_string_value())),
    }
}

/// Compare two values as numbers
fn compare_numbers<F>(left: &XPathValue, right: &XPathValue, cmp: F) -> XPathValue
where
    F: Fn(f64, f64) -> bool,
{
    XPathValue::Boolean(cmp(left.to_number(), right.to_number()))
}

#[cfg(test)]
mod tests {
    use super::super::compiler::compile;
    use super::*;

    /// document -> Window -> (Button[OK], Button[Cancel], Cell -> Button[Go])
    fn sample_doc() -> XmlDocument {
        let mut doc = XmlDocument::new();
        let window = doc.push_element(0, "Window".to_string()).unwrap();
        let ok = doc.push_element(window, "Button".to_string()).unwrap();
        doc.push_attr(ok, "name", "OK".to_string());
        let cancel = doc.push_element(window, "Button".to_string()).unwrap();
        doc.push_attr(cancel, "name", "Cancel".to_string());
        let cell = doc.push_element(window, "Cell".to_string()).unwrap();
        let go = doc.push_element(cell, "Button".to_string()).unwrap();
        doc.push_attr(go, "name", "Go".to_string());
        doc
    }

    fn eval(doc: &XmlDocument, query: &str) -> XPathValue {
        evaluate(doc, &compile(query).unwrap()).unwrap()
    }

    fn nodeset(doc: &XmlDocument, query: &str) -> Vec<NodeId> {
        match eval(doc, query) {
            XPathValue::NodeSet(nodes) => nodes,
            other => panic!("expected node-set, got {:?}", other),
        }
    }

    #[test]
    fn test_absolute_path() {
        let doc = sample_doc();
        assert_eq!(nodeset(&doc, "/Window").len(), 1);
        assert_eq!(nodeset(&doc, "/Window/Button").len(), 2);
    }

    #[test]
    fn test_descendant_search() {
        let doc = sample_doc();
        assert_eq!(nodeset(&doc, "//Button").len(), 3);
    }

    #[test]
    fn test_wildcard_returns_all_elements_in_document_order() {
        let doc = sample_doc();
        let all = nodeset(&doc, "//*");
        assert_eq!(all, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_attribute_predicate() {
        let doc = sample_doc();
        let matched = nodeset(&doc, "//Button[@name='OK']");
        assert_eq!(matched.len(), 1);
        assert_eq!(doc.get_attribute(matched[0], "name"), Some("OK"));
    }

    #[test]
    fn test_position_predicate() {
        let doc = sample_doc();
        let matched = nodeset(&doc, "/Window/Button[2]");
        assert_eq!(matched.len(), 1);
        assert_eq!(doc.get_attribute(matched[0], "name"), Some("Cancel"));
    }

    #[test]
    fn test_position_function_predicate() {
        let doc = sample_doc();
        let matched = nodeset(&doc, "/Window/Button[position() = 2]");
        assert_eq!(matched.len(), 1);
        assert_eq!(doc.get_attribute(matched[0], "name"), Some("Cancel"));
    }

    #[test]
    fn test_contains_on_attribute() {
        let doc = sample_doc();
        let matched = nodeset(&doc, "//Button[contains(@name, 'an')]");
        assert_eq!(matched.len(), 1);
        assert_eq!(doc.get_attribute(matched[0], "name"), Some("Cancel"));
    }

    #[test]
    fn test_union_in_document_order() {
        let doc = sample_doc();
        let matched = nodeset(&doc, "//Cell | //Button[@name='OK']");
        assert_eq!(matched, vec![2, 4]);
    }

    #[test]
    fn test_parent_step() {
        let doc = sample_doc();
        let matched = nodeset(&doc, "//Button[@name='Go']/..");
        assert_eq!(matched.len(), 1);
        assert_eq!(doc.node_name(matched[0]), Some("Cell"));
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let doc = sample_doc();
        assert!(nodeset(&doc, "//NoSuchType").is_empty());
    }

    #[test]
    fn test_count_function() {
        let doc = sample_doc();
        assert_eq!(eval(&doc, "count(//Button)").to_number(), 3.0);
    }

    #[test]
    fn test_relative_query_starts_at_root_element() {
        let doc = sample_doc();
        // Context node is the Window element, so its children match.
        assert_eq!(nodeset(&doc, "Button").len(), 2);
    }

    #[test]
    fn test_union_of_value_and_nodeset_is_eval_error() {
        let doc = sample_doc();
        let compiled = compile("//Button | count(//Button)").unwrap();
        assert!(evaluate(&doc, &compiled).is_err());
    }

    #[test]
    fn test_text_node_test_matches_nothing() {
        let doc = sample_doc();
        assert!(nodeset(&doc, "//text()").is_empty());
    }
}
