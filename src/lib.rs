//! XPath element matching over live accessibility trees.
//!
//! UI-test frameworks expose the screen as a tree of elements; tests
//! locate elements with XPath. This crate bridges the two: it serializes
//! a live tree to an XML document (with a back-reference index), runs an
//! XPath 1.0 query against it, and maps the matched nodes back to the
//! live elements they came from.
//!
//! ```no_run
//! use uixpath::{matches_with_root_element, UiElement};
//!
//! fn find_ok_button(root: &dyn UiElement) {
//!     let matched = matches_with_root_element(root, "//Button[@name='OK']").unwrap();
//!     for element in matched {
//!         let attrs = element.attributes().unwrap();
//!         println!("{} at {:?}", attrs.identifier, attrs.frame);
//!     }
//! }
//! ```
//!
//! Every call takes a fresh snapshot; no document or compiled query
//! survives across calls, so a mutated UI never serves stale matches.

pub mod dom;
pub mod element;
pub mod error;
pub mod resolver;
pub mod serializer;
pub mod xpath;

pub use element::{ElementAttributes, Rect, StaleElement, UiElement};
pub use error::Error;
pub use resolver::matches_with_root_element;
pub use serializer::{serialize, xml_string_with_root_element, BackRefIndex, BACKREF_ATTRIBUTE};
