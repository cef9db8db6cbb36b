//! XPath 1.0 subset engine.
//!
//! Pipeline: lexer -> parser -> compiler -> eval. Compiled queries are
//! scoped to one evaluation; there is no cross-call query cache.

pub mod axes;
pub mod compiler;
pub mod eval;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod value;

pub use compiler::{compile, CompiledQuery};
pub use eval::evaluate;
pub use value::XPathValue;
