//! Live tree serialization.
//!
//! Walks a live element tree depth-first and produces the XML document
//! queries run against, together with the back-reference index that maps
//! matched nodes to the live elements they were generated from.
//!
//! The traversal reads each element exactly once; it is the point-in-time
//! snapshot of the UI. Any read failure aborts the whole serialization —
//! a partial document would silently skew positional predicates.

use log::{debug, warn};

use crate::dom::{NodeId, XmlDocument};
use crate::element::UiElement;
use crate::error::Error;
use crate::xpath::value::format_number;

/// Attribute carrying the back-reference key. Not meant for human
/// consumption; queries should match on the visible attributes.
pub const BACKREF_ATTRIBUTE: &str = "_ref";

/// Fallback tag for elements whose role string sanitizes to nothing.
const FALLBACK_TAG: &str = "Any";

/// Maps back-reference keys to the live elements they were assigned to.
///
/// Keys are dense (0..N-1, assigned in traversal order), so the index is
/// a plain vector of non-owning borrows. It is valid only as long as the
/// live tree passed to [`serialize`] — the borrow checker enforces that
/// it never outlives one query call.
pub struct BackRefIndex<'a> {
    elements: Vec<&'a dyn UiElement>,
}

impl<'a> BackRefIndex<'a> {
    fn new() -> Self {
        BackRefIndex {
            elements: Vec::new(),
        }
    }

    /// Record an element and return the key assigned to it.
    fn insert(&mut self, element: &'a dyn UiElement) -> usize {
        self.elements.push(element);
        self.elements.len() - 1
    }

    /// Look up the element a key was assigned to.
    pub fn get(&self, key: usize) -> Option<&'a dyn UiElement> {
        self.elements.get(key).copied()
    }

    /// Number of indexed elements; equals the document's element count.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Serialize a live element tree to an XML document plus its index.
///
/// Document order equals depth-first pre-order of the live tree, with
/// children in the order the tree reports them. Every element node gets
/// a [`BACKREF_ATTRIBUTE`] whose value is its index entry; the synthetic
/// document node gets none.
pub fn serialize(root: &dyn UiElement) -> Result<(XmlDocument, BackRefIndex<'_>), Error> {
    let mut doc = XmlDocument::new();
    let mut index = BackRefIndex::new();
    let mut key_buf = itoa::Buffer::new();

    // Explicit stack; UI trees can nest deeply. Children are pushed in
    // reverse so the first child pops first, preserving pre-order.
    let mut stack: Vec<(&dyn UiElement, NodeId)> = vec![(root, doc.document_node_id())];

    while let Some((element, parent)) = stack.pop() {
        let attrs = element
            .attributes()
            .map_err(|e| Error::SerializationFailure(e.to_string()))?;

        let node = doc
            .push_element(parent, sanitize_tag(&attrs.element_type))
            .map_err(Error::SerializationFailure)?;

        doc.push_attr(node, "type", attrs.element_type);
        doc.push_attr(node, "name", attrs.identifier);
        doc.push_attr(node, "label", attrs.label);
        doc.push_attr(node, "value", attrs.value);
        doc.push_attr(node, "enabled", bool_token(attrs.enabled));
        doc.push_attr(node, "visible", bool_token(attrs.visible));
        doc.push_attr(node, "focused", bool_token(attrs.focused));
        doc.push_attr(node, "x", format_number(attrs.frame.x));
        doc.push_attr(node, "y", format_number(attrs.frame.y));
        doc.push_attr(node, "width", format_number(attrs.frame.width));
        doc.push_attr(node, "height", format_number(attrs.frame.height));

        let key = index.insert(element);
        doc.push_attr(node, BACKREF_ATTRIBUTE, key_buf.format(key).to_string());

        let children = element
            .children()
            .map_err(|e| Error::SerializationFailure(e.to_string()))?;
        for child in children.into_iter().rev() {
            stack.push((child, node));
        }
    }

    debug!(
        "serialized element tree: {} elements indexed",
        index.len()
    );

    Ok((doc, index))
}

/// Diagnostic entry point: the canonical XML form of a live tree.
///
/// Returns `None` instead of an error on failure; this path exists for
/// inspection and debugging, not control flow.
pub fn xml_string_with_root_element(root: &dyn UiElement) -> Option<String> {
    match serialize(root) {
        Ok((doc, _)) => Some(doc.to_xml_string()),
        Err(e) => {
            warn!("element tree could not be rendered to XML: {}", e);
            None
        }
    }
}

/// Map a role string onto a valid XML element name.
///
/// Disallowed characters become `_`; a role that yields nothing usable
/// maps to the fixed fallback tag so the document always parses.
fn sanitize_tag(role: &str) -> String {
    if role.is_empty() {
        return FALLBACK_TAG.to_string();
    }

    let mut tag = String::with_capacity(role.len());
    for (i, c) in role.chars().enumerate() {
        let valid = if i == 0 {
            c.is_ascii_alphabetic() || c == '_'
        } else {
            c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'
        };
        tag.push(if valid { c } else { '_' });
    }
    tag
}

fn bool_token(b: bool) -> String {
    if b { "true" } else { "false" }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::fixture::TestElement;

    fn sample_tree() -> TestElement {
        TestElement::new("Window")
            .child(TestElement::new("Button").name("OK").frame(10.0, 20.0, 30.0, 40.0))
            .child(
                TestElement::new("Cell")
                    .child(TestElement::new("Button").name("Go"))
                    .child(TestElement::new("Text").label("hello")),
            )
    }

    #[test]
    fn test_document_order_matches_preorder_traversal() {
        let tree = sample_tree();
        let (doc, index) = serialize(&tree).unwrap();

        assert_eq!(doc.element_count(), 5);
        assert_eq!(index.len(), 5);

        // Pre-order: Window, Button(OK), Cell, Button(Go), Text.
        let order: Vec<_> = doc
            .descendants_vec(doc.document_node_id())
            .into_iter()
            .map(|id| doc.node_name(id).unwrap().to_string())
            .collect();
        assert_eq!(order, vec!["Window", "Button", "Cell", "Button", "Text"]);
    }

    #[test]
    fn test_backref_keys_are_dense_and_in_traversal_order() {
        let tree = sample_tree();
        let (doc, index) = serialize(&tree).unwrap();

        let nodes = doc.descendants_vec(doc.document_node_id());
        for (expected_key, id) in nodes.iter().enumerate() {
            let raw = doc.get_attribute(*id, BACKREF_ATTRIBUTE).unwrap();
            assert_eq!(raw.parse::<usize>().unwrap(), expected_key);
        }
        assert!(index.get(index.len()).is_none());
    }

    #[test]
    fn test_attribute_fidelity() {
        let tree = TestElement::new("Button")
            .name("OK")
            .frame(10.0, 20.0, 30.0, 40.0)
            .enabled(false);
        let (doc, _) = serialize(&tree).unwrap();
        let node = doc.root_element_id().unwrap();

        assert_eq!(doc.get_attribute(node, "x"), Some("10"));
        assert_eq!(doc.get_attribute(node, "y"), Some("20"));
        assert_eq!(doc.get_attribute(node, "width"), Some("30"));
        assert_eq!(doc.get_attribute(node, "height"), Some("40"));
        assert_eq!(doc.get_attribute(node, "enabled"), Some("false"));
        assert_eq!(doc.get_attribute(node, "visible"), Some("true"));
        assert_eq!(doc.get_attribute(node, "name"), Some("OK"));
    }

    #[test]
    fn test_stale_element_aborts_whole_serialization() {
        let tree = TestElement::new("Window")
            .child(TestElement::new("Button"))
            .child(TestElement::new("Button").stale());

        let result = serialize(&tree);
        assert!(matches!(result, Err(Error::SerializationFailure(_))));
    }

    #[test]
    fn test_sanitize_tag() {
        assert_eq!(sanitize_tag("Button"), "Button");
        assert_eq!(sanitize_tag("My Role"), "My_Role");
        assert_eq!(sanitize_tag("9lives"), "_lives");
        assert_eq!(sanitize_tag(""), "Any");
    }

    #[test]
    fn test_raw_type_preserved_as_attribute() {
        let tree = TestElement::new("My Role");
        let (doc, _) = serialize(&tree).unwrap();
        let node = doc.root_element_id().unwrap();
        assert_eq!(doc.node_name(node), Some("My_Role"));
        assert_eq!(doc.get_attribute(node, "type"), Some("My Role"));
    }

    #[test]
    fn test_xml_string_has_declaration() {
        let tree = sample_tree();
        let xml = xml_string_with_root_element(&tree).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<Window"));
        assert!(xml.contains("name=\"OK\""));
    }

    #[test]
    fn test_xml_string_is_none_on_failure() {
        let tree = TestElement::new("Window").stale();
        assert!(xml_string_with_root_element(&tree).is_none());
    }
}
