//! Final assembly of a transformed module.
//!
//! The transform produces body text plus two side tables: the set of
//! runtime symbols the text calls and any imports hoisted out of nested
//! scopes. This crate turns the symbol set into import declarations
//! against the runtime package and stitches the whole file together.
//!
//! Symbol spellings drive the grouping:
//! - `floorDiv` — bare helper, named import from the runtime root
//! - `math.floor` — namespaced: the namespace object imports from the root
//!   and the call site keeps the dotted spelling
//! - `json/dumps` — module member, named import from a runtime submodule

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use pt_transform::TransformResult;
use tracing::debug;

/// Render the complete TypeScript module: synthesized runtime imports,
/// hoisted user imports, then the body.
pub fn emit_module(result: &TransformResult, runtime_module: &str) -> String {
    let mut root_imports: BTreeSet<&str> = BTreeSet::new();
    let mut module_imports: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for symbol in &result.runtime_symbols {
        if let Some((ns, _)) = symbol.split_once('.') {
            root_imports.insert(ns);
        } else if let Some((module, member)) = symbol.split_once('/') {
            module_imports.entry(module).or_default().insert(member);
        } else {
            root_imports.insert(symbol);
        }
    }

    let mut header = String::new();
    if !root_imports.is_empty() {
        let names: Vec<&str> = root_imports.into_iter().collect();
        header.push_str(&format!(
            "import {{ {} }} from \"{runtime_module}\";\n",
            names.join(", ")
        ));
    }
    for (module, members) in &module_imports {
        let names: Vec<&str> = members.iter().copied().collect();
        header.push_str(&format!(
            "import {{ {} }} from \"{runtime_module}/{module}\";\n",
            names.join(", ")
        ));
    }

    // Hoisted imports keep discovery order; duplicates collapse.
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for line in &result.hoisted_imports {
        if seen.insert(line.as_str()) {
            header.push_str(line);
            header.push('\n');
        }
    }

    debug!(header_lines = header.lines().count(), "assembled imports");

    if header.is_empty() {
        result.text.clone()
    } else if result.text.is_empty() {
        header
    } else {
        format!("{header}\n{}", result.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pt_transform::transform_module;

    const RT: &str = "@py2ts/runtime";

    fn emit(source: &str) -> String {
        let result = transform_module(source, "gen.py").unwrap();
        emit_module(&result, RT)
    }

    #[test]
    fn bare_helpers_import_from_the_runtime_root() {
        let out = emit("n = len(xs)\nq = a // b\n");
        assert_eq!(
            out,
            "import { floorDiv, len } from \"@py2ts/runtime\";\n\nlet n = len(xs);\nlet q = floorDiv(a, b);\n"
        );
    }

    #[test]
    fn namespaced_symbols_import_the_namespace_object() {
        let out = emit("import math\nx = math.floor(y)\n");
        assert_eq!(
            out,
            "import { math } from \"@py2ts/runtime\";\n\nlet x = math.floor(y);\n"
        );
    }

    #[test]
    fn module_members_import_from_a_runtime_submodule() {
        let out = emit("import json\ns = json.dumps(data)\n");
        assert_eq!(
            out,
            "import { dumps } from \"@py2ts/runtime/json\";\n\nlet s = dumps(data);\n"
        );
    }

    #[test]
    fn hoisted_imports_follow_runtime_imports() {
        let out = emit("def f():\n    import helpers\n    return helpers.go()\n");
        assert_eq!(
            out,
            "import * as helpers from \"helpers\";\n\nfunction f() {\n  // import hoisted to module top\n  return helpers.go();\n}\n"
        );
    }

    #[test]
    fn no_imports_means_no_leading_blank_line() {
        assert_eq!(emit("x = 1\n"), "let x = 1;\n");
    }
}
