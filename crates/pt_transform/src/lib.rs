//! Tree-to-text transform that lowers a parsed Python module to TypeScript.
//!
//! Organization:
//! - `context` — per-run state: scope frames, runtime-symbol set, import
//!   bindings, hoisted imports, indentation
//! - `expr` / `stmt` — the recursive dispatchers, one arm per node kind
//! - `class` — class-shape classification and the five emission strategies
//! - `types` — Python type hints to TypeScript type text
//! - `docstring` — docstrings to `/** ... */` doc comments
//! - `names` — static method/module/exception name tables
//!
//! The transform is total over the supported subset: any construct without
//! a faithful target spelling fails the whole run with a positioned error
//! rather than emitting an approximation.

pub mod class;
pub mod context;
pub mod docstring;
pub mod expr;
pub mod names;
pub mod stmt;
pub mod types;

use anyhow::Result;
use pt_parser::ast;
use tracing::debug;

use crate::context::TransformContext;
pub use crate::context::{TransformOptions, TransformResult};
use crate::docstring::doc_comment;
use crate::names::NameMap;
use crate::stmt::{split_docstring, transform_body};

/// Reusable transform configuration: the name tables plus the options that
/// parameterize emission. One instance serves any number of modules.
pub struct Transformer {
    names: NameMap,
    options: TransformOptions,
}

impl Transformer {
    pub fn new(options: TransformOptions) -> Self {
        Self {
            names: NameMap::new(),
            options,
        }
    }

    /// Transform one module body. The result text excludes import lines;
    /// the caller assembles them from the symbol set and hoisted imports.
    pub fn transform(&self, body: &[ast::Stmt]) -> Result<TransformResult> {
        debug!(statements = body.len(), "transforming module");
        let mut ctx = TransformContext::new(&self.names, &self.options);

        let (doc, rest) = split_docstring(body);
        let mut text = String::new();
        if let Some(doc) = doc {
            text.push_str(&doc_comment(doc, ""));
        }
        text.push_str(&transform_body(rest, &mut ctx)?);

        let result = ctx.finish(text);
        debug!(
            runtime_symbols = result.runtime_symbols.len(),
            hoisted_imports = result.hoisted_imports.len(),
            "transform complete"
        );
        Ok(result)
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new(TransformOptions::default())
    }
}

/// Parse-and-transform convenience for callers holding raw source.
pub fn transform_module(source: &str, filename: &str) -> Result<TransformResult> {
    let parsed = pt_parser::parse_python(source, filename)?;
    Transformer::default().transform(&parsed.body)
}
