//! Live element contract.
//!
//! The surrounding automation framework owns the accessibility tree; this
//! crate only borrows it for the duration of one call. `UiElement` is the
//! capability set that framework must provide: a point-in-time attribute
//! snapshot and ordered child enumeration.

use thiserror::Error;

/// Frame geometry of an element in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect { x, y, width, height }
    }
}

/// Snapshot of one element's queryable attributes.
///
/// `element_type` is the role string (e.g. "Button", "Window") and becomes
/// the XML tag name after sanitization. `identifier` is the accessibility
/// identifier exposed to tests as the `name` attribute.
#[derive(Debug, Clone, Default)]
pub struct ElementAttributes {
    pub element_type: String,
    pub identifier: String,
    pub label: String,
    pub value: String,
    pub frame: Rect,
    pub enabled: bool,
    pub visible: bool,
    pub focused: bool,
}

/// An element became unreadable mid-traversal (e.g. the UI under test
/// dismissed it). Serialization reports this as a whole-operation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("element no longer readable: {reason}")]
pub struct StaleElement {
    reason: String,
}

impl StaleElement {
    pub fn new(reason: impl Into<String>) -> Self {
        StaleElement { reason: reason.into() }
    }
}

/// A node in the externally-owned, currently-rendered accessibility tree.
///
/// Both operations take a fresh read from the live UI. Callers must not
/// mutate the tree while a serialize/match call is in flight; the crate
/// does not lock it, so a concurrent mutation yields a torn snapshot.
pub trait UiElement: std::fmt::Debug {
    /// Read the element's attribute snapshot.
    fn attributes(&self) -> Result<ElementAttributes, StaleElement>;

    /// Enumerate direct children in rendering order. Order is significant:
    /// it becomes document order, which drives XPath positional semantics.
    fn children(&self) -> Result<Vec<&dyn UiElement>, StaleElement>;
}

#[cfg(test)]
pub(crate) mod fixture {
    //! A concrete in-memory tree for unit tests.

    use super::*;

    #[derive(Debug)]
    pub struct TestElement {
        pub attrs: ElementAttributes,
        pub kids: Vec<TestElement>,
        /// Simulate the element disappearing mid-traversal.
        pub stale: bool,
    }

    impl TestElement {
        pub fn new(element_type: &str) -> Self {
            TestElement {
                attrs: ElementAttributes {
                    element_type: element_type.to_string(),
                    enabled: true,
                    visible: true,
                    ..ElementAttributes::default()
                },
                kids: Vec::new(),
                stale: false,
            }
        }

        pub fn name(mut self, identifier: &str) -> Self {
            self.attrs.identifier = identifier.to_string();
            self
        }

        pub fn label(mut self, label: &str) -> Self {
            self.attrs.label = label.to_string();
            self
        }

        pub fn frame(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
            self.attrs.frame = Rect::new(x, y, width, height);
            self
        }

        pub fn enabled(mut self, enabled: bool) -> Self {
            self.attrs.enabled = enabled;
            self
        }

        pub fn child(mut self, child: TestElement) -> Self {
            self.kids.push(child);
            self
        }

        pub fn stale(mut self) -> Self {
            self.stale = true;
            self
        }
    }

    impl UiElement for TestElement {
        fn attributes(&self) -> Result<ElementAttributes, StaleElement> {
            if self.stale {
                return Err(StaleElement::new("element was invalidated"));
            }
            Ok(self.attrs.clone())
        }

        fn children(&self) -> Result<Vec<&dyn UiElement>, StaleElement> {
            Ok(self.kids.iter().map(|c| c as &dyn UiElement).collect())
        }
    }
}
