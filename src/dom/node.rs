//! Arena node representation.
//!
//! Uses NodeId (u32) indices for compact, cache-friendly traversal. The
//! document produced from an accessibility tree only ever contains the
//! synthetic document root and element nodes; there is no text, comment
//! or processing-instruction content to model.

use smallvec::SmallVec;

/// Compact node identifier (index into the document arena).
pub type NodeId = u32;

/// Every element carries the same bounded attribute set (type, name,
/// label, value, three state flags, four geometry fields, back-reference),
/// so the inline capacity covers the common case without spilling.
pub const ATTRS_INLINE: usize = 12;

/// Type of node in the serialized document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Synthetic structural root; carries no back-reference.
    Document,
    /// One live element.
    Element,
}

/// A name/value attribute on an element node.
///
/// Names come from the fixed serialization schema, so they are static.
#[derive(Debug, Clone)]
pub struct XmlAttribute {
    pub name: &'static str,
    pub value: String,
}

impl XmlAttribute {
    pub fn new(name: &'static str, value: String) -> Self {
        XmlAttribute { name, value }
    }
}

/// An XML node in the arena.
#[derive(Debug, Clone)]
pub struct XmlNode {
    /// Type of this node.
    pub kind: NodeKind,
    /// Sanitized tag name (empty for the document node).
    pub tag: String,
    /// Parent node (None for the document root).
    pub parent: Option<NodeId>,
    /// First child node.
    pub first_child: Option<NodeId>,
    /// Last child node.
    pub last_child: Option<NodeId>,
    /// Previous sibling.
    pub prev_sibling: Option<NodeId>,
    /// Next sibling.
    pub next_sibling: Option<NodeId>,
    /// Attributes in serialization order.
    pub attrs: SmallVec<[XmlAttribute; ATTRS_INLINE]>,
    /// Depth in the document tree (document node is 0).
    pub depth: u16,
}

impl XmlNode {
    /// Create the document root node.
    pub fn document() -> Self {
        XmlNode {
            kind: NodeKind::Document,
            tag: String::new(),
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            attrs: SmallVec::new(),
            depth: 0,
        }
    }

    /// Create an element node.
    pub fn element(tag: String, parent: NodeId, depth: u16) -> Self {
        XmlNode {
            kind: NodeKind::Element,
            tag,
            parent: Some(parent),
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            attrs: SmallVec::new(),
            depth,
        }
    }

    /// Check if this is an element node.
    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Check if this node has children.
    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_node() {
        let doc = XmlNode::document();
        assert_eq!(doc.kind, NodeKind::Document);
        assert!(doc.parent.is_none());
        assert_eq!(doc.depth, 0);
    }

    #[test]
    fn test_element_node() {
        let elem = XmlNode::element("Button".to_string(), 0, 1);
        assert_eq!(elem.kind, NodeKind::Element);
        assert_eq!(elem.parent, Some(0));
        assert_eq!(elem.tag, "Button");
        assert!(elem.is_element());
        assert!(!elem.has_children());
    }
}
