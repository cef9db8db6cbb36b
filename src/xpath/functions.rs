//! XPath 1.0 core function library.
//!
//! The subset useful for element matching:
//!
//! Node set: position(), last(), count(), name(), local-name()
//! String: string(), concat(), starts-with(), contains(), substring(),
//!         substring-before(), substring-after(), string-length(),
//!         normalize-space(), translate()
//! Boolean: boolean(), not(), true(), false()
//! Number: number(), floor(), ceiling(), round()
//!
//! Elements in the serialized document carry data in attributes rather
//! than text, so the string-value of a node is always empty; string
//! functions are mostly applied to `@attr` selections.

use super::value::XPathValue;
use crate::dom::{NodeId, XmlDocument};

/// Evaluate a function call.
pub fn call(
    name: &str,
    args: Vec<XPathValue>,
    doc: &XmlDocument,
    context: NodeId,
    position: usize,
    size: usize,
) -> Result<XPathValue, String> {
    match name {
        // Node set functions
        "position" => Ok(XPathValue::Number(position as f64)),
        "last" => Ok(XPathValue::Number(size as f64)),
        "count" => fn_count(args),
        "name" | "local-name" => fn_name(args, doc, context),

        // String functions
        "string" => fn_string(args),
        "concat" => fn_concat(args),
        "starts-with" => fn_starts_with(args),
        "contains" => fn_contains(args),
        "substring" => fn_substring(args),
        "substring-before" => fn_substring_before(args),
        "substring-after" => fn_substring_after(args),
        "string-length" => fn_string_length(args),
        "normalize-space" => fn_normalize_space(args),
        "translate" => fn_translate(args),

        // Boolean functions
        "boolean" => fn_boolean(args),
        "not" => fn_not(args),
        "true" => Ok(XPathValue::Boolean(true)),
        "false" => Ok(XPathValue::Boolean(false)),

        // Number functions
        "number" => fn_number(args),
        "floor" => fn_floor(args),
        "ceiling" => fn_ceiling(args),
        "round" => fn_round(args),

        _ => Err(format!("unknown function: {}", name)),
    }
}

fn fn_count(args: Vec<XPathValue>) -> Result<XPathValue, String> {
    if args.len() != 1 {
        return Err("count() requires exactly 1 argument".to_string());
    }
    match &args[0] {
        XPathValue::NodeSet(nodes) => Ok(XPathValue::Number(nodes.len() as f64)),
        XPathValue::StringList(values) => Ok(XPathValue::Number(values.len() as f64)),
        _ => Err("count() argument must be a node-set".to_string()),
    }
}

/// name()/local-name(): tag of the context node or of the first node in
/// the argument node-set. Identical here since tags carry no prefix.
fn fn_name(
    args: Vec<XPathValue>,
    doc: &XmlDocument,
    context: NodeId,
) -> Result<XPathValue, String> {
    let node = if args.is_empty() {
        context
    } else {
        match &args[0] {
            XPathValue::NodeSet(nodes) if !nodes.is_empty() => nodes[0],
            XPathValue::NodeSet(_) => return Ok(XPathValue::String(String::new())),
            _ => return Err("name() argument must be a node-set".to_string()),
        }
    };

    let name = doc.node_name(node).unwrap_or("");
    Ok(XPathValue::String(name.to_string()))
}

fn fn_string(args: Vec<XPathValue>) -> Result<XPathValue, String> {
    let value = args
        .into_iter()
        .next()
        .map(|v| v.to_string_value())
        .unwrap_or_default();
    Ok(XPathValue::String(value))
}

fn fn_concat(args: Vec<XPathValue>) -> Result<XPathValue, String> {
    if args.len() < 2 {
        return Err("concat() requires at least 2 arguments".to_string());
    }
    let mut result = String::new();
    for arg in &args {
        result.push_str(&arg.to_string_value());
    }
    Ok(XPathValue::String(result))
}

fn fn_starts_with(args: Vec<XPathValue>) -> Result<XPathValue, String> {
    if args.len() != 2 {
        return Err("starts-with() requires exactly 2 arguments".to_string());
    }
    let haystack = args[0].to_string_value();
    let prefix = args[1].to_string_value();
    Ok(XPathValue::Boolean(haystack.starts_with(&prefix)))
}

fn fn_contains(args: Vec<XPathValue>) -> Result<XPathValue, String> {
    if args.len() != 2 {
        return Err("contains() requires exactly 2 arguments".to_string());
    }
    let haystack = args[0].to_string_value();
    let needle = args[1].to_string_value();
    Ok(XPathValue::Boolean(haystack.contains(&needle)))
}

/// substring(s, start[, len]) with XPath's 1-based, rounded semantics.
fn fn_substring(args: Vec<XPathValue>) -> Result<XPathValue, String> {
    if args.len() < 2 || args.len() > 3 {
        return Err("substring() requires 2 or 3 arguments".to_string());
    }
    let s = args[0].to_string_value();
    let start = args[1].to_number();
    if start.is_nan() {
        return Ok(XPathValue::String(String::new()));
    }

    let chars: Vec<char> = s.chars().collect();
    let start_round = start.round();
    let end_round = match args.get(2) {
        Some(len) => {
            let len = len.to_number();
            if len.is_nan() {
                return Ok(XPathValue::String(String::new()));
            }
            start_round + len.round()
        }
        None => f64::INFINITY,
    };

    let result: String = chars
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            let pos = (*i + 1) as f64;
            pos >= start_round && pos < end_round
        })
        .map(|(_, c)| *c)
        .collect();

    Ok(XPathValue::String(result))
}

fn fn_substring_before(args: Vec<XPathValue>) -> Result<XPathValue, String> {
    if args.len() != 2 {
        return Err("substring-before() requires exactly 2 arguments".to_string());
    }
    let s = args[0].to_string_value();
    let sep = args[1].to_string_value();
    let result = s.find(&sep).map(|i| s[..i].to_string()).unwrap_or_default();
    Ok(XPathValue::String(result))
}

fn fn_substring_after(args: Vec<XPathValue>) -> Result<XPathValue, String> {
    if args.len() != 2 {
        return Err("substring-after() requires exactly 2 arguments".to_string());
    }
    let s = args[0].to_string_value();
    let sep = args[1].to_string_value();
    let result = s
        .find(&sep)
        .map(|i| s[i + sep.len()..].to_string())
        .unwrap_or_default();
    Ok(XPathValue::String(result))
}

fn fn_string_length(args: Vec<XPathValue>) -> Result<XPathValue, String> {
    if args.len() != 1 {
        return Err("string-length() requires exactly 1 argument".to_string());
    }
    let s = args[0].to_string_value();
    Ok(XPathValue::Number(s.chars().count() as f64))
}

fn fn_normalize_space(args: Vec<XPathValue>) -> Result<XPathValue, String> {
    if args.len() != 1 {
        return Err("normalize-space() requires exactly 1 argument".to_string());
    }
    let s = args[0].to_string_value();
    let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
    Ok(XPathValue::String(normalized))
}

/// translate(s, from, to): replace chars of `from` with the positional
/// counterpart in `to`; chars without a counterpart are removed.
fn fn_translate(args: Vec<XPathValue>) -> Result<XPathValue, String> {
    if args.len() != 3 {
        return Err("translate() requires exactly 3 arguments".to_string());
    }
    let s = args[0].to_string_value();
    let from: Vec<char> = args[1].to_string_value().chars().collect();
    let to: Vec<char> = args[2].to_string_value().chars().collect();

    let result: String = s
        .chars()
        .filter_map(|c| match from.iter().position(|&f| f == c) {
            Some(i) => to.get(i).copied(),
            None => Some(c),
        })
        .collect();

    Ok(XPathValue::String(result))
}

fn fn_boolean(args: Vec<XPathValue>) -> Result<XPathValue, String> {
    if args.len() != 1 {
        return Err("boolean() requires exactly 1 argument".to_string());
    }
    Ok(XPathValue::Boolean(args[0].to_boolean()))
}

fn fn_not(args: Vec<XPathValue>) -> Result<XPathValue, String> {
    if args.len() != 1 {
        return Err("not() requires exactly 1 argument".to_string());
    }
    Ok(XPathValue::Boolean(!args[0].to_boolean()))
}

fn fn_number(args: Vec<XPathValue>) -> Result<XPathValue, String> {
    if args.len() != 1 {
        return Err("number() requires exactly 1 argument".to_string());
    }
    Ok(XPathValue::Number(args[0].to_number()))
}

fn fn_floor(args: Vec<XPathValue>) -> Result<XPathValue, String> {
    if args.len() != 1 {
        return Err("floor() requires exactly 1 argument".to_string());
    }
    Ok(XPathValue::Number(args[0].to_number().floor()))
}

fn fn_ceiling(args: Vec<XPathValue>) -> Result<XPathValue, String> {
    if args.len() != 1 {
        return Err("ceiling() requires exactly 1 argument".to_string());
    }
    Ok(XPathValue::Number(args[0].to_number().ceil()))
}

fn fn_round(args: Vec<XPathValue>) -> Result<XPathValue, String> {
    if args.len() != 1 {
        return Err("round() requires exactly 1 argument".to_string());
    }
    Ok(XPathValue::Number(args[0].to_number().round()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_doc() -> XmlDocument {
        XmlDocument::new()
    }

    fn call0(name: &str, args: Vec<XPathValue>) -> Result<XPathValue, String> {
        call(name, args, &empty_doc(), 0, 1, 1)
    }

    #[test]
    fn test_concat() {
        let result = call0(
            "concat",
            vec![
                XPathValue::String("OK".to_string()),
                XPathValue::String(" button".to_string()),
            ],
        )
        .unwrap();
        assert_eq!(result.to_string_value(), "OK button");
    }

    #[test]
    fn test_contains() {
        let result = call0(
            "contains",
            vec![
                XPathValue::String("Login button".to_string()),
                XPathValue::String("Login".to_string()),
            ],
        )
        .unwrap();
        assert!(result.to_boolean());
    }

    #[test]
    fn test_substring() {
        let result = call0(
            "substring",
            vec![
                XPathValue::String("12345".to_string()),
                XPathValue::Number(2.0),
                XPathValue::Number(3.0),
            ],
        )
        .unwrap();
        assert_eq!(result.to_string_value(), "234");
    }

    #[test]
    fn test_normalize_space() {
        let result = call0(
            "normalize-space",
            vec![XPathValue::String("  a   b \t c ".to_string())],
        )
        .unwrap();
        assert_eq!(result.to_string_value(), "a b c");
    }

    #[test]
    fn test_translate() {
        let result = call0(
            "translate",
            vec![
                XPathValue::String("bare".to_string()),
                XPathValue::String("abr".to_string()),
                XPathValue::String("AB".to_string()),
            ],
        )
        .unwrap();
        // 'a'->'A', 'b'->'B', 'r' removed.
        assert_eq!(result.to_string_value(), "BAe");
    }

    #[test]
    fn test_count_rejects_non_nodeset() {
        assert!(call0("count", vec![XPathValue::Number(1.0)]).is_err());
    }

    #[test]
    fn test_unknown_function_is_error() {
        assert!(call0("no-such-function", vec![]).is_err());
    }

    #[test]
    fn test_name_of_context_node() {
        let mut doc = XmlDocument::new();
        let a = doc.push_element(0, "Window".to_string()).unwrap();
        let result = call("name", vec![], &doc, a, 1, 1).unwrap();
        assert_eq!(result.to_string_value(), "Window");
    }
}
