//! XPath axis navigation over the serialized document.
//!
//! Implements the element axes: child, parent, self, descendant,
//! descendant-or-self, ancestor, ancestor-or-self, following,
//! following-sibling, preceding, preceding-sibling. The attribute axis is
//! handled directly by the evaluator (attributes are values, not nodes,
//! in this document model).

use super::compiler::CompiledNodeTest;
use super::parser::Axis;
use crate::dom::{NodeId, NodeKind, XmlDocument};

/// Navigate along an axis from a context node.
pub fn navigate(doc: &XmlDocument, context: NodeId, axis: Axis) -> Vec<NodeId> {
    match axis {
        Axis::Child => doc.children_vec(context),
        Axis::Descendant => doc.descendants_vec(context),
        Axis::DescendantOrSelf => descendant_or_self_axis(doc, context),
        Axis::Parent => parent_axis(doc, context),
        Axis::Ancestor => ancestor_axis(doc, context),
        Axis::AncestorOrSelf => ancestor_or_self_axis(doc, context),
        Axis::FollowingSibling => following_sibling_axis(doc, context),
        Axis::PrecedingSibling => preceding_sibling_axis(doc, context),
        Axis::Following => following_axis(doc, context),
        Axis::Preceding => preceding_axis(doc, context),
        Axis::Self_ => vec![context],
        // Resolved by the evaluator before navigation is reached.
        Axis::Attribute => Vec::new(),
    }
}

fn descendant_or_self_axis(doc: &XmlDocument, context: NodeId) -> Vec<NodeId> {
    let descendants = doc.descendants_vec(context);
    let mut result = Vec::with_capacity(1 + descendants.len());
    result.push(context);
    result.extend(descendants);
    result
}

fn parent_axis(doc: &XmlDocument, context: NodeId) -> Vec<NodeId> {
    match doc.parent_of(context) {
        Some(parent) => vec![parent],
        None => Vec::new(),
    }
}

fn ancestor_axis(doc: &XmlDocument, context: NodeId) -> Vec<NodeId> {
    let mut result = Vec::new();
    let mut current = context;

    while let Some(parent) = doc.parent_of(current) {
        result.push(parent);
        current = parent;
    }

    result
}

fn ancestor_or_self_axis(doc: &XmlDocument, context: NodeId) -> Vec<NodeId> {
    let mut result = vec![context];
    result.extend(ancestor_axis(doc, context));
    result
}

fn following_sibling_axis(doc: &XmlDocument, context: NodeId) -> Vec<NodeId> {
    let mut result = Vec::new();

    let mut sibling = doc.next_sibling_of(context);
    while let Some(sib) = sibling {
        result.push(sib);
        sibling = doc.next_sibling_of(sib);
    }

    result
}

/// Preceding siblings in reverse document order, per XPath axis direction.
fn preceding_sibling_axis(doc: &XmlDocument, context: NodeId) -> Vec<NodeId> {
    let mut result = Vec::new();

    let mut sibling = doc.prev_sibling_of(context);
    while let Some(sib) = sibling {
        result.push(sib);
        sibling = doc.prev_sibling_of(sib);
    }

    result
}

/// Everything after the context node in document order, minus descendants:
/// following siblings and their subtrees, repeated for each ancestor.
fn following_axis(doc: &XmlDocument, context: NodeId) -> Vec<NodeId> {
    let mut result = Vec::new();

    let mut anchor = Some(context);
    while let Some(node) = anchor {
        let mut sibling = doc.next_sibling_of(node);
        while let Some(sib) = sibling {
            result.push(sib);
            result.extend(doc.descendants_vec(sib));
            sibling = doc.next_sibling_of(sib);
        }
        anchor = doc.parent_of(node);
    }

    result
}

/// Everything before the context node in document order, minus ancestors,
/// returned in reverse document order per the axis direction.
fn preceding_axis(doc: &XmlDocument, context: NodeId) -> Vec<NodeId> {
    let ancestors: std::collections::HashSet<NodeId> =
        ancestor_axis(doc, context).into_iter().collect();

    let mut result = Vec::new();
    for node in doc.descendants_vec(doc.document_node_id()) {
        if node == context {
            break;
        }
        if !ancestors.contains(&node) {
            result.push(node);
        }
    }

    result.reverse();
    result
}

/// Check if a node matches a compiled node test.
pub fn matches_node_test(
    doc: &XmlDocument,
    node_id: NodeId,
    node_test: &CompiledNodeTest,
) -> bool {
    let kind = doc.node_kind_of(node_id);

    match node_test {
        CompiledNodeTest::Any => kind == NodeKind::Element,
        CompiledNodeTest::Name(name) => {
            kind == NodeKind::Element && doc.node_name(node_id) == Some(name.as_str())
        }
        CompiledNodeTest::Node => true,
        // The serialized document never contains these node kinds.
        CompiledNodeTest::Text | CompiledNodeTest::Comment => false,
    }
}
