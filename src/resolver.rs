//! Query resolution against live element trees.
//!
//! One call = one snapshot: serialize the tree, compile the query,
//! evaluate it, then map every matched node back to the live element it
//! was generated from. Nothing is cached between calls; the next call
//! re-reads the tree.

use log::debug;

use crate::dom::{NodeKind, XmlDocument};
use crate::element::UiElement;
use crate::error::Error;
use crate::serializer::{serialize, BackRefIndex, BACKREF_ATTRIBUTE};
use crate::xpath::{self, XPathValue};

/// Match a query against a live element tree.
///
/// Returns the matched live elements in document order. An empty vector
/// is a successful outcome: the query ran and nothing matched. Errors
/// distinguish a bad query ([`Error::InvalidXPathQuery`]), a tree that
/// could not be read ([`Error::SerializationFailure`]), an evaluation
/// fault ([`Error::QueryEvaluationFailure`]), and a broken internal
/// mapping ([`Error::InternalConsistencyError`]).
pub fn matches_with_root_element<'a>(
    root: &'a dyn UiElement,
    query: &str,
) -> Result<Vec<&'a dyn UiElement>, Error> {
    let compiled = xpath::compile(query).map_err(Error::InvalidXPathQuery)?;

    let (doc, index) = serialize(root)?;

    let value = xpath::evaluate(&doc, &compiled).map_err(Error::QueryEvaluationFailure)?;

    let nodes = match value {
        XPathValue::NodeSet(nodes) => nodes,
        other => {
            return Err(Error::InvalidXPathQuery(format!(
                "query must select elements, got {}",
                other.type_name()
            )))
        }
    };

    let matched = resolve_nodes(&doc, &index, &nodes)?;
    debug!("query {:?} matched {} element(s)", query, matched.len());
    Ok(matched)
}

/// Map matched document nodes back to live elements via their
/// back-reference keys.
///
/// Every node in `nodes` must be an element with a well-formed key that
/// the index knows; the serializer guarantees this, so any violation is
/// an internal consistency error rather than something to skip over.
pub(crate) fn resolve_nodes<'a>(
    doc: &XmlDocument,
    index: &BackRefIndex<'a>,
    nodes: &[crate::dom::NodeId],
) -> Result<Vec<&'a dyn UiElement>, Error> {
    let mut matched = Vec::with_capacity(nodes.len());

    for &node in nodes {
        if doc.node_kind_of(node) != NodeKind::Element {
            return Err(Error::InvalidXPathQuery(
                "query selected a non-element node".to_string(),
            ));
        }

        let raw = doc.get_attribute(node, BACKREF_ATTRIBUTE).ok_or_else(|| {
            Error::InternalConsistencyError(format!(
                "matched node {} has no back-reference attribute",
                node
            ))
        })?;

        let key: usize = raw.parse().map_err(|_| {
            Error::InternalConsistencyError(format!(
                "matched node {} has malformed back-reference {:?}",
                node, raw
            ))
        })?;

        let element = index.get(key).ok_or_else(|| {
            Error::InternalConsistencyError(format!(
                "back-reference {} is not in the index (len {})",
                key,
                index.len()
            ))
        })?;

        matched.push(element);
    }

    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::fixture::TestElement;

    fn sample_tree() -> TestElement {
        TestElement::new("Window")
            .child(TestElement::new("Button").name("OK"))
            .child(
                TestElement::new("Cell")
                    .child(TestElement::new("Button").name("Go"))
                    .child(TestElement::new("Text").label("hello")),
            )
    }

    fn names_of(elements: &[&dyn UiElement]) -> Vec<String> {
        elements
            .iter()
            .map(|e| e.attributes().unwrap().identifier)
            .collect()
    }

    #[test]
    fn test_match_by_attribute() {
        let tree = sample_tree();
        let matched = matches_with_root_element(&tree, "//Button[@name='OK']").unwrap();
        assert_eq!(names_of(&matched), vec!["OK"]);
    }

    #[test]
    fn test_match_all_in_document_order() {
        let tree = sample_tree();
        let matched = matches_with_root_element(&tree, "//Button").unwrap();
        assert_eq!(names_of(&matched), vec!["OK", "Go"]);
    }

    #[test]
    fn test_no_match_is_ok_and_empty() {
        let tree = sample_tree();
        let matched = matches_with_root_element(&tree, "//Slider").unwrap();
        assert!(matched.is_empty());
    }

    #[test]
    fn test_malformed_query_is_invalid() {
        let tree = sample_tree();
        let result = matches_with_root_element(&tree, "///bad[[");
        assert!(matches!(result, Err(Error::InvalidXPathQuery(_))));
    }

    #[test]
    fn test_scalar_result_is_invalid() {
        let tree = sample_tree();
        let result = matches_with_root_element(&tree, "count(//*)");
        assert!(matches!(result, Err(Error::InvalidXPathQuery(_))));
    }

    #[test]
    fn test_document_node_result_is_invalid() {
        let tree = sample_tree();
        let result = matches_with_root_element(&tree, "/");
        assert!(matches!(result, Err(Error::InvalidXPathQuery(_))));
    }

    #[test]
    fn test_stale_tree_is_serialization_failure() {
        let tree = TestElement::new("Window").child(TestElement::new("Button").stale());
        let result = matches_with_root_element(&tree, "//Button");
        assert!(matches!(result, Err(Error::SerializationFailure(_))));
    }

    #[test]
    fn test_repeat_matching_is_idempotent() {
        let tree = sample_tree();
        let first = matches_with_root_element(&tree, "//Button").unwrap();
        let second = matches_with_root_element(&tree, "//Button").unwrap();
        assert_eq!(names_of(&first), names_of(&second));
    }

    #[test]
    fn test_unindexed_backref_is_internal_consistency_error() {
        // Hand-built document whose key the index has never seen.
        let tree = TestElement::new("Window");
        let (_, index) = serialize(&tree).unwrap();

        let mut doc = XmlDocument::new();
        let node = doc.push_element(0, "Button".to_string()).unwrap();
        doc.push_attr(node, BACKREF_ATTRIBUTE, "99".to_string());

        let result = resolve_nodes(&doc, &index, &[node]);
        assert!(matches!(result, Err(Error::InternalConsistencyError(_))));
    }

    #[test]
    fn test_missing_backref_is_internal_consistency_error() {
        let tree = TestElement::new("Window");
        let (_, index) = serialize(&tree).unwrap();

        let mut doc = XmlDocument::new();
        let node = doc.push_element(0, "Button".to_string()).unwrap();

        let result = resolve_nodes(&doc, &index, &[node]);
        assert!(matches!(result, Err(Error::InternalConsistencyError(_))));
    }
}
