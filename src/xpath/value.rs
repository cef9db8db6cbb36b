//! XPath value types.
//!
//! XPath 1.0 has four data types: node-set, boolean, number, and string.
//! A fifth variant carries multiple attribute values, which this engine
//! models as strings rather than attribute nodes.

use crate::dom::NodeId;

/// Result of evaluating an XPath expression.
#[derive(Debug, Clone)]
#[must_use]
pub enum XPathValue {
    /// A set of nodes (document order, no duplicates).
    NodeSet(Vec<NodeId>),
    /// Boolean value.
    Boolean(bool),
    /// Floating-point number.
    Number(f64),
    /// String value.
    String(String),
    /// Attribute values selected by the attribute axis.
    StringList(Vec<String>),
}

impl XPathValue {
    /// Create an empty node set.
    pub fn empty_nodeset() -> Self {
        XPathValue::NodeSet(Vec::new())
    }

    /// Create a node set with a single node.
    pub fn single_node(id: NodeId) -> Self {
        XPathValue::NodeSet(vec![id])
    }

    /// Convert to boolean (XPath boolean() semantics).
    pub fn to_boolean(&self) -> bool {
        match self {
            XPathValue::NodeSet(nodes) => !nodes.is_empty(),
            XPathValue::Boolean(b) => *b,
            XPathValue::Number(n) => *n != 0.0 && !n.is_nan(),
            XPathValue::String(s) => !s.is_empty(),
            XPathValue::StringList(list) => !list.is_empty(),
        }
    }

    /// Convert to number (XPath number() semantics).
    pub fn to_number(&self) -> f64 {
        match self {
            // Elements in the serialized document have no text content,
            // so a node-set never converts to a meaningful number.
            XPathValue::NodeSet(_) => f64::NAN,
            XPathValue::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            XPathValue::Number(n) => *n,
            XPathValue::String(s) => s.trim().parse().unwrap_or(f64::NAN),
            XPathValue::StringList(list) => match list.first() {
                Some(s) => s.trim().parse().unwrap_or(f64::NAN),
                None => f64::NAN,
            },
        }
    }

    /// Convert to string (XPath string() semantics).
    ///
    /// The string-value of an element in this document model is empty:
    /// accessibility data lives in attributes, not text nodes.
    pub fn to_string_value(&self) -> String {
        match self {
            XPathValue::NodeSet(_) => String::new(),
            XPathValue::Boolean(b) => if *b { "true" } else { "false" }.to_string(),
            XPathValue::Number(n) => format_number(*n),
            XPathValue::String(s) => s.clone(),
            XPathValue::StringList(list) => list.first().cloned().unwrap_or_default(),
        }
    }

    /// Short type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            XPathValue::NodeSet(_) => "node-set",
            XPathValue::Boolean(_) => "boolean",
            XPathValue::Number(_) => "number",
            XPathValue::String(_) => "string",
            XPathValue::StringList(_) => "attribute-value list",
        }
    }

    /// Check if this is a node set.
    pub fn is_nodeset(&self) -> bool {
        matches!(self, XPathValue::NodeSet(_))
    }

    /// Get as node set, or None.
    pub fn as_nodeset(&self) -> Option<&Vec<NodeId>> {
        match self {
            XPathValue::NodeSet(nodes) => Some(nodes),
            _ => None,
        }
    }
}

impl Default for XPathValue {
    fn default() -> Self {
        XPathValue::NodeSet(Vec::new())
    }
}

/// Canonical XPath number formatting: no locale, integral values without
/// a decimal point. Also used by the serializer for geometry attributes
/// so serialized numbers compare cleanly inside predicates.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_conversion() {
        assert!(XPathValue::NodeSet(vec![1]).to_boolean());
        assert!(!XPathValue::NodeSet(vec![]).to_boolean());
        assert!(XPathValue::Number(1.0).to_boolean());
        assert!(!XPathValue::Number(0.0).to_boolean());
        assert!(XPathValue::String("x".to_string()).to_boolean());
        assert!(!XPathValue::String(String::new()).to_boolean());
    }

    #[test]
    fn test_number_conversion() {
        assert_eq!(XPathValue::Boolean(true).to_number(), 1.0);
        assert_eq!(XPathValue::String("42".to_string()).to_number(), 42.0);
        assert!(XPathValue::String("abc".to_string()).to_number().is_nan());
        assert_eq!(
            XPathValue::StringList(vec!["10".to_string()]).to_number(),
            10.0
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(3.25), "3.25");
        assert_eq!(format_number(-10.0), "-10");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_string_conversion() {
        assert_eq!(XPathValue::Boolean(false).to_string_value(), "false");
        assert_eq!(XPathValue::Number(42.0).to_string_value(), "42");
        assert_eq!(
            XPathValue::StringList(vec!["OK".to_string(), "Cancel".to_string()])
                .to_string_value(),
            "OK"
        );
    }
}
