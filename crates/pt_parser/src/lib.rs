//! Python frontend for py2ts.
//!
//! Wraps the off-the-shelf `rustpython-parser` crate and exposes exactly
//! what the transformer consumes: the module body as a statement list,
//! plus the original source text. The tree is read-only downstream; this
//! crate is the only place that knows how it was produced.

pub mod parse;

pub use parse::{parse_python, ParseResult};

// Re-export the AST so downstream crates name one parser release.
pub use rustpython_parser::ast;
