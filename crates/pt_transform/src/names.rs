//! Name mapping between Python and TypeScript spellings.
//!
//! Three distinct lookups live here:
//!
//! - the method rename table (`startswith` → `startsWith`), pure data,
//!   consulted for attribute calls;
//! - the standard-library module classification, which decides whether an
//!   import binds a runtime namespace, a runtime sub-module, or is a
//!   marker with no runtime footprint at all (`typing`, `abc`, ...);
//! - the built-in exception name set, used by `raise` lowering.
//!
//! Structural renames (`__init__` → `constructor`) are *not* table-driven;
//! they live with the class emitter.

use std::collections::HashMap;

/// Immutable source-spelling → target-spelling table for standard-library
/// members whose names change across the language boundary. Built once and
/// injected by reference into every transform context.
pub struct NameMap {
    methods: HashMap<&'static str, &'static str>,
}

impl NameMap {
    pub fn new() -> Self {
        let methods = HashMap::from([
            // str
            ("startswith", "startsWith"),
            ("endswith", "endsWith"),
            ("upper", "toUpperCase"),
            ("lower", "toLowerCase"),
            ("strip", "trim"),
            ("lstrip", "trimStart"),
            ("rstrip", "trimEnd"),
            ("find", "indexOf"),
            ("rfind", "lastIndexOf"),
            ("index", "indexOf"),
            ("replace", "replaceAll"),
            ("casefold", "toLowerCase"),
            ("rindex", "lastIndexOf"),
            // list
            ("append", "push"),
            ("copy", "slice"),
            // set
            ("discard", "delete"),
        ]);
        Self { methods }
    }

    /// Target spelling for a renamed method, if the table knows it.
    pub fn method(&self, py_name: &str) -> Option<&'static str> {
        self.methods.get(py_name).copied()
    }
}

impl Default for NameMap {
    fn default() -> Self {
        Self::new()
    }
}

/// How a recognized standard-library module is addressed in the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdlibModule {
    /// Keeps its dotted spelling in output (`math.floor(x)`); the symbol
    /// set records `"math.floor"`.
    Namespaced(&'static str),
    /// Addressed by its own import path; members are emitted bare and the
    /// symbol set records `"json/dumps"`.
    Path(&'static str),
    /// Type-level or marker module with no runtime counterpart; its
    /// imports vanish from the output.
    Marker,
}

/// Classify a Python import path. `None` means a user module: the import
/// is emitted as-is.
pub fn stdlib_module(path: &str) -> Option<StdlibModule> {
    match path {
        "math" => Some(StdlibModule::Namespaced("math")),
        "random" => Some(StdlibModule::Namespaced("random")),
        "itertools" => Some(StdlibModule::Path("itertools")),
        "functools" => Some(StdlibModule::Path("functools")),
        "collections" => Some(StdlibModule::Path("collections")),
        "datetime" => Some(StdlibModule::Path("datetime")),
        "re" => Some(StdlibModule::Path("re")),
        "json" => Some(StdlibModule::Path("json")),
        "os" | "os.path" => Some(StdlibModule::Path("os")),
        "pathlib" => Some(StdlibModule::Path("pathlib")),
        "subprocess" => Some(StdlibModule::Path("subprocess")),
        "urllib" | "urllib.parse" => Some(StdlibModule::Path("urllib")),
        "uuid" => Some(StdlibModule::Path("uuid")),
        "hashlib" => Some(StdlibModule::Path("hashlib")),
        "typing" | "abc" | "dataclasses" | "enum" | "__future__" => Some(StdlibModule::Marker),
        _ => None,
    }
}

/// Built-in exception names whose `raise` lowers to a generic `Error`.
pub fn is_builtin_exception(name: &str) -> bool {
    matches!(
        name,
        "Exception"
            | "BaseException"
            | "ValueError"
            | "TypeError"
            | "KeyError"
            | "IndexError"
            | "AttributeError"
            | "RuntimeError"
            | "NotImplementedError"
            | "StopIteration"
            | "ZeroDivisionError"
            | "ArithmeticError"
            | "OSError"
            | "IOError"
            | "FileNotFoundError"
            | "AssertionError"
            | "LookupError"
            | "NameError"
            | "OverflowError"
            | "PermissionError"
            | "TimeoutError"
            | "UnicodeError"
    )
}
