//! DOM module - arena-based XML document.
//!
//! An efficient DOM representation using:
//! - Arena allocation for nodes
//! - NodeId (u32) indices for cache-friendly traversal
//! - Sibling links so child iteration needs no per-node Vec
//!
//! The document is built by the serializer, never parsed from text, and
//! lives only for the duration of one serialize/match call.

pub mod document;
pub mod node;

pub use document::XmlDocument;
pub use node::{NodeId, NodeKind, XmlAttribute, XmlNode};
