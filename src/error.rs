//! Error taxonomy for the query subsystem.
//!
//! Callers need to tell a test-authoring mistake (a query that does not
//! compile) apart from a framework fault, so each failure class gets its
//! own variant instead of a single stringly-typed error.

use thiserror::Error;

/// Errors surfaced by serialization and query resolution.
///
/// No operation retries: every error is terminal for the call that
/// produced it, and no partial result is ever returned alongside one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The query string failed to compile, or the query is syntactically
    /// valid but cannot produce an element node-set (this API is
    /// element-match-only). A caller-input error.
    #[error("invalid xpath query: {0}")]
    InvalidXPathQuery(String),

    /// The compiled query failed during evaluation.
    #[error("xpath evaluation failed: {0}")]
    QueryEvaluationFailure(String),

    /// The live tree could not be read, or XML construction failed.
    /// The whole operation is aborted; nothing usable remains.
    #[error("element tree serialization failed: {0}")]
    SerializationFailure(String),

    /// A matched node's back-reference key was missing, malformed, or not
    /// present in the index. This signals a serializer/resolver bug and is
    /// never silently skipped.
    #[error("internal consistency error: {0}")]
    InternalConsistencyError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_query_problem() {
        let err = Error::InvalidXPathQuery("unexpected token".to_string());
        assert_eq!(err.to_string(), "invalid xpath query: unexpected token");
    }

    #[test]
    fn test_variants_are_distinguishable() {
        let invalid = Error::InvalidXPathQuery("x".into());
        let eval = Error::QueryEvaluationFailure("x".into());
        assert_ne!(invalid, eval);
    }
}
