use anyhow::Result;
use rustpython_parser::{ast, Mode};

/// Result of parsing a Python source file.
#[derive(Debug)]
pub struct ParseResult {
    /// Top-level statements of the module.
    pub body: Vec<ast::Stmt>,
    /// The source text the module was parsed from.
    pub source: String,
}

/// Parse a Python source string into a module body.
///
/// Errors carry the parser's own location rendering (line/column), prefixed
/// with the filename so the CLI can show them as-is.
pub fn parse_python(source: &str, filename: &str) -> Result<ParseResult> {
    let parsed = rustpython_parser::parse(source, Mode::Module, filename)
        .map_err(|e| anyhow::anyhow!("{filename}: {e}"))?;

    let body = match parsed {
        ast::Mod::Module(module) => module.body,
        // Mode::Module only ever yields Mod::Module.
        _ => anyhow::bail!("{filename}: parser returned a non-module tree"),
    };

    Ok(ParseResult {
        body,
        source: source.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_simple_module() {
        let result = parse_python("x = 1\n", "test.py").unwrap();
        assert_eq!(result.body.len(), 1);
        assert!(matches!(result.body[0], ast::Stmt::Assign(_)));
    }

    #[test]
    fn syntax_error_names_the_file() {
        let err = parse_python("def f(:\n", "broken.py").unwrap_err();
        assert!(err.to_string().starts_with("broken.py:"));
    }
}
