//! Per-call transform state.
//!
//! One `TransformContext` is created per translation call, threaded as a
//! mutable borrow through every visit, and consumed when the call returns.
//! It owns everything the dispatchers may write: the runtime-symbol set,
//! the hoisted-import sequence, the lexical scope stack, the enclosing
//! function flags, and the indentation counter. The only shared state is
//! the read-only [`NameMap`](crate::names::NameMap), injected by reference.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::names::NameMap;

/// Options for a translation call. Pure configuration; identical options
/// and input always produce byte-identical output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformOptions {
    /// Import path of the runtime standard-library emulation.
    pub runtime_module: String,
    /// Spaces per indentation level in the emitted text.
    pub indent_width: usize,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            runtime_module: "@py2ts/runtime".to_string(),
            indent_width: 2,
        }
    }
}

/// Output of one translation call. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    /// Emitted TypeScript for the module body (no import lines).
    pub text: String,
    /// Canonical identifiers of every runtime call surface the text uses:
    /// bare helpers unqualified, namespaced members as `ns.member`,
    /// path-addressed members as `module/member`.
    pub runtime_symbols: BTreeSet<String>,
    /// Import statements discovered in nested scopes, in first-discovery
    /// order, lowered but not yet placed.
    pub hoisted_imports: Vec<String>,
}

/// What a name bound by a recognized standard-library import resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeBinding {
    /// `import math` — attribute calls keep the dotted spelling.
    Namespace(&'static str),
    /// `from math import floor` — the call re-qualifies as `math.floor`.
    NamespaceMember(&'static str, String),
    /// `import json` — attribute calls emit the bare member.
    PathModule(&'static str),
    /// `from itertools import chain` — calls emit the bare member.
    PathMember(&'static str, String),
}

/// Flags describing the nearest enclosing function during emission.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuncFlags {
    pub is_generator: bool,
    pub is_async: bool,
    /// True inside a method body: `self`/`cls` read as `this`.
    pub is_method: bool,
}

struct ScopeFrame {
    declared: HashSet<String>,
}

/// Mutable state for one translation call.
pub struct TransformContext<'a> {
    pub names: &'a NameMap,
    pub options: &'a TransformOptions,
    runtime_symbols: BTreeSet<String>,
    hoisted_imports: Vec<String>,
    scopes: Vec<ScopeFrame>,
    funcs: Vec<FuncFlags>,
    catch_params: Vec<String>,
    bindings: HashMap<String, RuntimeBinding>,
    callables: HashMap<String, bool>,
    depth: usize,
    temp_counter: usize,
}

impl<'a> TransformContext<'a> {
    pub fn new(names: &'a NameMap, options: &'a TransformOptions) -> Self {
        Self {
            names,
            options,
            runtime_symbols: BTreeSet::new(),
            hoisted_imports: Vec::new(),
            scopes: vec![ScopeFrame {
                declared: HashSet::new(),
            }],
            funcs: Vec::new(),
            catch_params: Vec::new(),
            bindings: HashMap::new(),
            callables: HashMap::new(),
            depth: 0,
            temp_counter: 0,
        }
    }

    /// Consume the context, yielding the immutable result around the
    /// already-emitted text.
    pub fn finish(self, text: String) -> TransformResult {
        TransformResult {
            text,
            runtime_symbols: self.runtime_symbols,
            hoisted_imports: self.hoisted_imports,
        }
    }

    // --- runtime call surface -------------------------------------------

    /// Mark a bare runtime helper used and return its emitted spelling.
    pub fn runtime(&mut self, helper: &str) -> String {
        self.runtime_symbols.insert(helper.to_string());
        helper.to_string()
    }

    /// Mark a namespaced member (`math.floor`) used; emitted dotted.
    pub fn runtime_namespaced(&mut self, ns: &str, member: &str) -> String {
        self.runtime_symbols.insert(format!("{ns}.{member}"));
        format!("{ns}.{member}")
    }

    /// Mark a path-addressed member (`json/dumps`) used; emitted bare.
    pub fn runtime_module_member(&mut self, module: &str, member: &str) -> String {
        self.runtime_symbols.insert(format!("{module}/{member}"));
        member.to_string()
    }

    // --- stdlib import bindings -----------------------------------------

    pub fn bind(&mut self, local: &str, binding: RuntimeBinding) {
        self.bindings.insert(local.to_string(), binding);
    }

    pub fn binding(&self, local: &str) -> Option<&RuntimeBinding> {
        self.bindings.get(local)
    }

    // --- known callables ------------------------------------------------

    /// Record whether a translated function declares keyword-capable
    /// parameters, so its call sites know if a trailing options object
    /// has somewhere to land.
    pub fn register_callable(&mut self, name: &str, takes_options: bool) {
        self.callables.insert(name.to_string(), takes_options);
    }

    pub fn callable_takes_options(&self, name: &str) -> Option<bool> {
        self.callables.get(name).copied()
    }

    // --- hoisted imports ------------------------------------------------

    /// Record an import lowered inside a nested scope; the generator will
    /// place it before all other statements, in discovery order.
    pub fn hoist_import(&mut self, text: String) {
        self.hoisted_imports.push(text);
    }

    pub fn at_module_level(&self) -> bool {
        self.funcs.is_empty() && self.depth == 0
    }

    // --- lexical scopes -------------------------------------------------

    pub fn push_scope(&mut self) {
        self.scopes.push(ScopeFrame {
            declared: HashSet::new(),
        });
    }

    pub fn pop_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "popped the module scope");
        self.scopes.pop();
    }

    /// Record a declaration in the innermost frame. Returns false when the
    /// name was already declared there (re-declaration must be elided).
    pub fn declare(&mut self, name: &str) -> bool {
        self.scopes
            .last_mut()
            .map(|frame| frame.declared.insert(name.to_string()))
            .unwrap_or(false)
    }

    /// Whether any enclosing frame, innermost to outermost, declares the
    /// name already.
    pub fn is_declared(&self, name: &str) -> bool {
        self.scopes
            .iter()
            .rev()
            .any(|frame| frame.declared.contains(name))
    }

    /// A fresh synthesized name, collision-free against the scope stack.
    pub fn fresh(&mut self, prefix: &str) -> String {
        loop {
            self.temp_counter += 1;
            let candidate = format!("_{prefix}{}", self.temp_counter);
            if !self.is_declared(&candidate) {
                return candidate;
            }
        }
    }

    // --- enclosing function flags ---------------------------------------

    pub fn push_func(&mut self, flags: FuncFlags) {
        self.funcs.push(flags);
    }

    pub fn pop_func(&mut self) {
        self.funcs.pop();
    }

    pub fn func_flags(&self) -> FuncFlags {
        self.funcs.last().copied().unwrap_or_default()
    }

    // --- catch parameters (for bare `raise`) ----------------------------

    pub fn push_catch(&mut self, name: String) {
        self.catch_params.push(name);
    }

    pub fn pop_catch(&mut self) {
        self.catch_params.pop();
    }

    pub fn current_catch(&self) -> Option<&str> {
        self.catch_params.last().map(String::as_str)
    }

    // --- layout ---------------------------------------------------------

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.depth > 0, "dedent below zero");
        self.depth -= 1;
    }

    /// Leading whitespace for the current nesting depth.
    pub fn pad(&self) -> String {
        " ".repeat(self.depth * self.options.indent_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_parts() -> (NameMap, TransformOptions) {
        (NameMap::new(), TransformOptions::default())
    }

    #[test]
    fn declarations_respect_nesting() {
        let (names, opts) = ctx_parts();
        let mut ctx = TransformContext::new(&names, &opts);
        assert!(ctx.declare("x"));
        assert!(!ctx.declare("x"));
        ctx.push_scope();
        assert!(ctx.is_declared("x"));
        assert!(ctx.declare("y"));
        ctx.pop_scope();
        assert!(!ctx.is_declared("y"));
    }

    #[test]
    fn runtime_symbols_are_canonical() {
        let (names, opts) = ctx_parts();
        let mut ctx = TransformContext::new(&names, &opts);
        assert_eq!(ctx.runtime("floorDiv"), "floorDiv");
        assert_eq!(ctx.runtime_namespaced("math", "floor"), "math.floor");
        assert_eq!(ctx.runtime_module_member("json", "dumps"), "dumps");
        let result = ctx.finish(String::new());
        let symbols: Vec<_> = result.runtime_symbols.iter().cloned().collect();
        assert_eq!(symbols, ["floorDiv", "json/dumps", "math.floor"]);
    }

    #[test]
    fn fresh_names_avoid_declared_ones() {
        let (names, opts) = ctx_parts();
        let mut ctx = TransformContext::new(&names, &opts);
        ctx.declare("_cm1");
        assert_eq!(ctx.fresh("cm"), "_cm2");
    }

    #[test]
    fn pad_tracks_depth() {
        let (names, opts) = ctx_parts();
        let mut ctx = TransformContext::new(&names, &opts);
        assert_eq!(ctx.pad(), "");
        ctx.indent();
        assert_eq!(ctx.pad(), "  ");
        ctx.dedent();
        assert_eq!(ctx.pad(), "");
    }
}
