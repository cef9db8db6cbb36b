//! Arena-based XML document built from a live element tree.
//!
//! Unlike a parser-backed DOM, this document is constructed directly by
//! the serializer: nodes are appended in depth-first pre-order, so NodeId
//! assignment order equals document order. XPath evaluation relies on
//! that property when sorting node-sets.

use super::node::{NodeId, NodeKind, XmlAttribute, XmlNode};

/// In-memory XML document scoped to a single serialize/match call.
///
/// Node 0 is always the synthetic document root; the first element pushed
/// under it is the serialized tree's root element.
#[derive(Debug)]
pub struct XmlDocument {
    nodes: Vec<XmlNode>,
}

impl XmlDocument {
    /// Create an empty document containing only the document node.
    pub fn new() -> Self {
        XmlDocument {
            nodes: vec![XmlNode::document()],
        }
    }

    /// Create an empty document with capacity for `elements` element nodes.
    pub fn with_capacity(elements: usize) -> Self {
        let mut nodes = Vec::with_capacity(elements.saturating_add(1));
        nodes.push(XmlNode::document());
        XmlDocument { nodes }
    }

    /// The synthetic document root.
    #[inline]
    pub fn document_node_id(&self) -> NodeId {
        0
    }

    /// The root element, if any element has been pushed.
    pub fn root_element_id(&self) -> Option<NodeId> {
        self.nodes[0].first_child
    }

    /// Total node count, document node included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // The document node always exists; "empty" means no elements.
        self.nodes.len() == 1
    }

    /// Number of element nodes.
    pub fn element_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Append an element under `parent`, linking it as the last child.
    ///
    /// Fails if the arena exhausts the NodeId space, which counts as an
    /// XML construction failure at the serializer level.
    pub fn push_element(&mut self, parent: NodeId, tag: String) -> Result<NodeId, String> {
        if self.nodes.len() >= NodeId::MAX as usize {
            return Err("document node capacity exhausted".to_string());
        }
        let id = self.nodes.len() as NodeId;
        let depth = match self.nodes.get(parent as usize) {
            Some(p) => p.depth.saturating_add(1),
            None => return Err(format!("parent node {} does not exist", parent)),
        };

        self.nodes.push(XmlNode::element(tag, parent, depth));

        let prev_last = self.nodes[parent as usize].last_child;
        match prev_last {
            Some(prev) => {
                self.nodes[prev as usize].next_sibling = Some(id);
                self.nodes[id as usize].prev_sibling = Some(prev);
            }
            None => {
                self.nodes[parent as usize].first_child = Some(id);
            }
        }
        self.nodes[parent as usize].last_child = Some(id);

        Ok(id)
    }

    /// Add an attribute to an element node.
    pub fn push_attr(&mut self, id: NodeId, name: &'static str, value: String) {
        if let Some(node) = self.nodes.get_mut(id as usize) {
            node.attrs.push(XmlAttribute::new(name, value));
        }
    }

    /// Get a node by ID.
    pub fn get_node(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id as usize)
    }

    /// Node kind, defaulting to Document for out-of-range IDs.
    pub fn node_kind_of(&self, id: NodeId) -> NodeKind {
        self.get_node(id).map(|n| n.kind).unwrap_or(NodeKind::Document)
    }

    /// Tag name of an element node.
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        if node.is_element() {
            Some(node.tag.as_str())
        } else {
            None
        }
    }

    /// Parent of a node.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.parent
    }

    /// Next sibling of a node.
    pub fn next_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.next_sibling
    }

    /// Previous sibling of a node.
    pub fn prev_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.prev_sibling
    }

    /// Attributes of a node, in serialization order.
    pub fn attributes(&self, id: NodeId) -> &[XmlAttribute] {
        self.get_node(id).map(|n| n.attrs.as_slice()).unwrap_or(&[])
    }

    /// Attribute value by name.
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Children of a node, in document order.
    pub fn children_vec(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut child = self.get_node(id).and_then(|n| n.first_child);
        while let Some(cid) = child {
            result.push(cid);
            child = self.next_sibling_of(cid);
        }
        result
    }

    /// All descendants of a node, in document order.
    pub fn descendants_vec(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = Vec::new();

        // Seed with children in reverse so the first child pops first.
        let children = self.children_vec(id);
        stack.extend(children.into_iter().rev());

        while let Some(current) = stack.pop() {
            result.push(current);
            let mut child = self.get_node(current).and_then(|n| n.last_child);
            while let Some(cid) = child {
                stack.push(cid);
                child = self.prev_sibling_of(cid);
            }
        }

        result
    }

    /// Render the document to its textual form with an XML declaration.
    ///
    /// Iterative with an explicit stack so deeply nested trees cannot
    /// overflow the call stack.
    pub fn to_xml_string(&self) -> String {
        enum Entry {
            Open(NodeId),
            Close(NodeId),
        }

        let mut buf = String::with_capacity(128 * self.nodes.len());
        buf.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

        let mut stack: Vec<Entry> = Vec::with_capacity(64);
        if let Some(root) = self.root_element_id() {
            stack.push(Entry::Open(root));
        }

        while let Some(entry) = stack.pop() {
            match entry {
                Entry::Close(id) => {
                    if let Some(name) = self.node_name(id) {
                        buf.push_str("</");
                        buf.push_str(name);
                        buf.push('>');
                    }
                }
                Entry::Open(id) => {
                    let node = match self.get_node(id) {
                        Some(n) if n.is_element() => n,
                        _ => continue,
                    };

                    buf.push('<');
                    buf.push_str(&node.tag);
                    for attr in &node.attrs {
                        buf.push(' ');
                        buf.push_str(attr.name);
                        buf.push_str("=\"");
                        escape_xml_into(&attr.value, &mut buf);
                        buf.push('"');
                    }

                    if node.first_child.is_none() {
                        buf.push_str("/>");
                    } else {
                        buf.push('>');
                        stack.push(Entry::Close(id));
                        // Children in reverse via last_child->prev_sibling,
                        // so they serialize in document order.
                        let mut child = node.last_child;
                        while let Some(cid) = child {
                            stack.push(Entry::Open(cid));
                            child = self.prev_sibling_of(cid);
                        }
                    }
                }
            }
        }

        buf
    }
}

impl Default for XmlDocument {
    fn default() -> Self {
        XmlDocument::new()
    }
}

/// Escape XML special characters into a buffer.
fn escape_xml_into(s: &str, buf: &mut String) {
    for c in s.chars() {
        match c {
            '&' => buf.push_str("&amp;"),
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            '"' => buf.push_str("&quot;"),
            '\'' => buf.push_str("&apos;"),
            _ => buf.push(c),
        }
    }
}
