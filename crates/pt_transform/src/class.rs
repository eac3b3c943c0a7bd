//! Class lowering.
//!
//! A class declaration is classified once, from its base list and decorator
//! list, into one of five emission strategies:
//!
//! - plain class
//! - abstract class (marker base, decorated methods become abstract members)
//! - data holder (typed fields become constructor parameters + assignments,
//!   optionally frozen)
//! - structural interface (signatures only)
//! - enumeration (desugared to a type alias or a frozen object)
//!
//! The classifier is total: any base/decorator combination lands on exactly
//! one tag, and unrecognized member forms inside a strategy are
//! translation-fatal rather than skipped.

use anyhow::{bail, Result};
use pt_parser::ast;

use crate::context::{FuncFlags, TransformContext};
use crate::docstring::doc_comment;
use crate::expr::{string_literal, transform_expr};
use crate::names::is_builtin_exception;
use crate::stmt::{block_has_yield, function_params, return_annotation, split_docstring, transform_body};
use crate::types::ts_type;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ClassShape {
    Plain,
    Abstract,
    Data { frozen: bool },
    Interface,
    Enum,
}

pub fn transform_class(s: &ast::StmtClassDef, ctx: &mut TransformContext) -> Result<String> {
    if !s.type_params.is_empty() {
        bail!("generic class parameter lists are not supported");
    }
    let name = s.name.as_str();
    ctx.declare(name);

    let shape = classify(s);
    let (doc, body) = split_docstring(&s.body);

    let mut out = String::new();
    if let Some(doc) = doc {
        out.push_str(&doc_comment(doc, &ctx.pad()));
    }

    match shape {
        ClassShape::Enum => out.push_str(&emit_enum(name, body, ctx)?),
        ClassShape::Interface => out.push_str(&emit_interface(name, body, ctx)?),
        ClassShape::Data { frozen } => out.push_str(&emit_data(s, name, body, frozen, ctx)?),
        ClassShape::Abstract => out.push_str(&emit_class(s, name, body, true, ctx)?),
        ClassShape::Plain => out.push_str(&emit_class(s, name, body, false, ctx)?),
    }

    // Non-marker decorators reassign the class identifier, innermost first.
    let wrappers: Vec<&ast::Expr> = s
        .decorator_list
        .iter()
        .filter(|d| !is_marker_class_decorator(d))
        .collect();
    if !wrappers.is_empty() {
        if matches!(shape, ClassShape::Enum | ClassShape::Interface) {
            bail!("decorators on type-only classes have no value to wrap");
        }
        let mut wrapped = name.to_string();
        for deco in wrappers.iter().rev() {
            let deco = transform_expr(deco, ctx)?;
            wrapped = format!("{deco}({wrapped})");
        }
        out.push_str(&format!("{}{name} = {wrapped};\n", ctx.pad()));
    }

    Ok(out)
}

// --- classification ------------------------------------------------------

fn classify(s: &ast::StmtClassDef) -> ClassShape {
    // A recognized special base wins over a data-class decorator.
    for base in &s.bases {
        if let Some(id) = base_name(base) {
            match id {
                "Enum" | "IntEnum" | "StrEnum" | "Flag" | "IntFlag" => return ClassShape::Enum,
                "Protocol" => return ClassShape::Interface,
                "ABC" => return ClassShape::Abstract,
                "TypedDict" | "NamedTuple" => return ClassShape::Data { frozen: true },
                _ => {}
            }
        }
    }
    for keyword in &s.keywords {
        if keyword.arg.as_ref().is_some_and(|a| a.as_str() == "metaclass") {
            if let Some("ABCMeta") = base_name(&keyword.value) {
                return ClassShape::Abstract;
            }
        }
    }
    for deco in &s.decorator_list {
        if let Some(frozen) = dataclass_decorator(deco) {
            return ClassShape::Data { frozen };
        }
    }
    ClassShape::Plain
}

/// The trailing identifier of a base expression: handles `Enum`,
/// `enum.Enum`, and `Protocol[T]` spellings alike.
fn base_name(base: &ast::Expr) -> Option<&str> {
    match base {
        ast::Expr::Name(n) => Some(n.id.as_str()),
        ast::Expr::Attribute(a) => Some(a.attr.as_str()),
        ast::Expr::Subscript(s) => base_name(&s.value),
        _ => None,
    }
}

/// `@dataclass` or `@dataclass(...)`; the payload is the frozen flag.
fn dataclass_decorator(deco: &ast::Expr) -> Option<bool> {
    match deco {
        ast::Expr::Name(n) if n.id.as_str() == "dataclass" => Some(false),
        ast::Expr::Call(call) => {
            if base_name(&call.func)? != "dataclass" {
                return None;
            }
            let frozen = call.keywords.iter().any(|k| {
                k.arg.as_ref().is_some_and(|a| a.as_str() == "frozen")
                    && matches!(
                        &k.value,
                        ast::Expr::Constant(c) if matches!(c.value, ast::Constant::Bool(true))
                    )
            });
            Some(frozen)
        }
        _ => None,
    }
}

fn is_marker_class_decorator(deco: &ast::Expr) -> bool {
    dataclass_decorator(deco).is_some()
        || matches!(
            deco,
            ast::Expr::Name(n) if matches!(n.id.as_str(), "final" | "runtime_checkable")
        )
}

/// Bases that classify the shape but never become an extends clause.
fn is_marker_base(base: &ast::Expr) -> bool {
    match base_name(base) {
        Some(
            "object" | "ABC" | "Protocol" | "Generic" | "Enum" | "IntEnum" | "StrEnum" | "Flag"
            | "IntFlag" | "TypedDict" | "NamedTuple",
        ) => true,
        _ => false,
    }
}

/// The single extends target, if any. Built-in exception bases all map to
/// the target's one error type.
fn extends_clause(s: &ast::StmtClassDef, ctx: &mut TransformContext) -> Result<String> {
    let real: Vec<&ast::Expr> = s.bases.iter().filter(|b| !is_marker_base(b)).collect();
    match real.as_slice() {
        [] => Ok(String::new()),
        [base] => {
            if let Some(id) = base_name(base) {
                if is_builtin_exception(id) {
                    return Ok(" extends Error".to_string());
                }
            }
            Ok(format!(" extends {}", transform_expr(base, ctx)?))
        }
        _ => bail!("multiple base classes are not supported"),
    }
}

// --- enumerations --------------------------------------------------------

enum MemberValue {
    Auto,
    Int(i64),
    Str(String),
    Other(String),
}

/// Total over member values: sequential ints or all-auto become a name
/// union, all strings a value union, anything else a frozen object with a
/// derived value union; an empty enumeration is uninhabited.
fn emit_enum(name: &str, body: &[ast::Stmt], ctx: &mut TransformContext) -> Result<String> {
    let mut members: Vec<(String, MemberValue)> = Vec::new();
    for stmt in body {
        match stmt {
            ast::Stmt::Assign(a) => {
                let [ast::Expr::Name(target)] = a.targets.as_slice() else {
                    bail!("enumeration members must be single names");
                };
                members.push((target.id.as_str().to_string(), member_value(&a.value, ctx)?));
            }
            ast::Stmt::Pass(_) => {}
            other => bail!("unsupported enumeration member: {other:?}"),
        }
    }

    let pad = ctx.pad();
    if members.is_empty() {
        return Ok(format!("{pad}type {name} = never;\n"));
    }

    let all_auto = members.iter().all(|(_, v)| matches!(v, MemberValue::Auto));
    let sequential_ints = {
        let ints: Vec<i64> = members
            .iter()
            .filter_map(|(_, v)| match v {
                MemberValue::Int(i) => Some(*i),
                _ => None,
            })
            .collect();
        ints.len() == members.len() && ints.windows(2).all(|w| w[1] == w[0] + 1)
    };
    if all_auto || sequential_ints {
        let union = members
            .iter()
            .map(|(n, _)| string_literal(n))
            .collect::<Vec<_>>()
            .join(" | ");
        return Ok(format!("{pad}type {name} = {union};\n"));
    }

    let all_strings = members
        .iter()
        .all(|(_, v)| matches!(v, MemberValue::Str(_)));
    if all_strings {
        let union = members
            .iter()
            .map(|(_, v)| match v {
                MemberValue::Str(s) => string_literal(s),
                _ => unreachable!(),
            })
            .collect::<Vec<_>>()
            .join(" | ");
        return Ok(format!("{pad}type {name} = {union};\n"));
    }

    // Non-sequential or mixed values keep a runtime object.
    let mut out = format!("{pad}const {name} = {{\n");
    ctx.indent();
    for (member, value) in &members {
        let value = match value {
            MemberValue::Int(i) => i.to_string(),
            MemberValue::Str(s) => string_literal(s),
            MemberValue::Other(text) => text.clone(),
            MemberValue::Auto => bail!("auto() cannot mix with explicit enumeration values"),
        };
        out.push_str(&format!("{}{member}: {value},\n", ctx.pad()));
    }
    ctx.dedent();
    out.push_str(&format!(
        "{pad}}} as const;\n{pad}type {name} = typeof {name}[keyof typeof {name}];\n"
    ));
    Ok(out)
}

fn member_value(value: &ast::Expr, ctx: &mut TransformContext) -> Result<MemberValue> {
    match value {
        ast::Expr::Call(call)
            if matches!(&*call.func, ast::Expr::Name(n) if n.id.as_str() == "auto")
                && call.args.is_empty() =>
        {
            Ok(MemberValue::Auto)
        }
        ast::Expr::Constant(c) => match &c.value {
            ast::Constant::Int(i) => match i.to_string().parse::<i64>() {
                Ok(i) => Ok(MemberValue::Int(i)),
                Err(_) => Ok(MemberValue::Other(i.to_string())),
            },
            ast::Constant::Str(s) => Ok(MemberValue::Str(s.to_string())),
            _ => Ok(MemberValue::Other(transform_expr(value, ctx)?)),
        },
        other => Ok(MemberValue::Other(transform_expr(other, ctx)?)),
    }
}

// --- structural interfaces -----------------------------------------------

fn emit_interface(name: &str, body: &[ast::Stmt], ctx: &mut TransformContext) -> Result<String> {
    let pad = ctx.pad();
    let mut out = format!("{pad}interface {name} {{\n");
    ctx.indent();

    for stmt in body {
        match stmt {
            ast::Stmt::AnnAssign(a) => {
                let ast::Expr::Name(field) = &*a.target else {
                    bail!("interface fields must be plain names");
                };
                let ty = ts_type(&a.annotation)?;
                out.push_str(&format!("{}{}: {ty};\n", ctx.pad(), field.id.as_str()));
            }
            ast::Stmt::FunctionDef(f) => {
                out.push_str(&interface_method(
                    f.name.as_str(),
                    &f.args,
                    f.returns.as_deref(),
                    &f.decorator_list,
                    false,
                    ctx,
                )?);
            }
            ast::Stmt::AsyncFunctionDef(f) => {
                out.push_str(&interface_method(
                    f.name.as_str(),
                    &f.args,
                    f.returns.as_deref(),
                    &f.decorator_list,
                    true,
                    ctx,
                )?);
            }
            ast::Stmt::Pass(_) => {}
            other => bail!("unsupported interface member: {other:?}"),
        }
    }

    ctx.dedent();
    out.push_str(&format!("{pad}}}\n"));
    Ok(out)
}

fn interface_method(
    name: &str,
    args: &ast::Arguments,
    returns: Option<&ast::Expr>,
    decorator_list: &[ast::Expr],
    is_async: bool,
    ctx: &mut TransformContext,
) -> Result<String> {
    // A property signature collapses to a readonly field.
    if decorator_list
        .iter()
        .any(|d| matches!(d, ast::Expr::Name(n) if n.id.as_str() == "property"))
    {
        let ty = match returns {
            Some(r) => ts_type(r)?,
            None => "any".to_string(),
        };
        return Ok(format!("{}readonly {name}: {ty};\n", ctx.pad()));
    }

    ctx.push_scope();
    ctx.push_func(FuncFlags {
        is_generator: false,
        is_async,
        is_method: true,
    });
    let params = function_params(args, true, ctx)?;
    ctx.pop_func();
    ctx.pop_scope();
    let ret = return_annotation(returns, is_async)?;
    Ok(format!("{}{name}({params}){ret};\n", ctx.pad()))
}

// --- data holders --------------------------------------------------------

struct Field {
    name: String,
    ty: String,
    default: Option<String>,
}

/// Typed fields become constructor parameters and assignments; a frozen
/// holder locks the instance after construction.
fn emit_data(
    s: &ast::StmtClassDef,
    name: &str,
    body: &[ast::Stmt],
    frozen: bool,
    ctx: &mut TransformContext,
) -> Result<String> {
    let extends = extends_clause(s, ctx)?;
    let pad = ctx.pad();
    let mut out = format!("{pad}class {name}{extends} {{\n");
    ctx.indent();

    let mut fields: Vec<Field> = Vec::new();
    let mut methods = String::new();
    let mut explicit_init = false;

    for stmt in body {
        match stmt {
            ast::Stmt::AnnAssign(a) => {
                let ast::Expr::Name(field) = &*a.target else {
                    bail!("data-holder fields must be plain names");
                };
                let default = match &a.value {
                    Some(value) => Some(transform_expr(value, ctx)?),
                    None => None,
                };
                fields.push(Field {
                    name: field.id.as_str().to_string(),
                    ty: ts_type(&a.annotation)?,
                    default,
                });
            }
            ast::Stmt::FunctionDef(f) => {
                if f.name.as_str() == "__init__" {
                    explicit_init = true;
                }
                methods.push_str(&class_method(&MethodSource::from_sync(f), false, ctx)?);
            }
            ast::Stmt::AsyncFunctionDef(f) => {
                methods.push_str(&class_method(&MethodSource::from_async(f), false, ctx)?);
            }
            ast::Stmt::Pass(_) => {}
            other => bail!("unsupported data-holder member: {other:?}"),
        }
    }

    let member_pad = ctx.pad();
    for field in &fields {
        let keyword = if frozen { "readonly " } else { "" };
        out.push_str(&format!(
            "{member_pad}{keyword}{}: {};\n",
            field.name, field.ty
        ));
    }

    if !explicit_init {
        let params = fields
            .iter()
            .map(|f| match &f.default {
                Some(default) => format!("{}: {} = {default}", f.name, f.ty),
                None => format!("{}: {}", f.name, f.ty),
            })
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("{member_pad}constructor({params}) {{\n"));
        ctx.indent();
        for field in &fields {
            out.push_str(&format!("{}this.{} = {};\n", ctx.pad(), field.name, field.name));
        }
        if frozen {
            out.push_str(&format!("{}Object.freeze(this);\n", ctx.pad()));
        }
        ctx.dedent();
        out.push_str(&format!("{member_pad}}}\n"));
    }

    out.push_str(&methods);
    ctx.dedent();
    out.push_str(&format!("{pad}}}\n"));
    Ok(out)
}

// --- plain and abstract classes ------------------------------------------

fn emit_class(
    s: &ast::StmtClassDef,
    name: &str,
    body: &[ast::Stmt],
    is_abstract: bool,
    ctx: &mut TransformContext,
) -> Result<String> {
    let extends = extends_clause(s, ctx)?;
    let pad = ctx.pad();
    let keyword = if is_abstract { "abstract class" } else { "class" };
    let mut out = format!("{pad}{keyword} {name}{extends} {{\n");
    ctx.indent();

    for stmt in body {
        match stmt {
            ast::Stmt::AnnAssign(a) => {
                let ast::Expr::Name(field) = &*a.target else {
                    bail!("class fields must be plain names");
                };
                let ty = ts_type(&a.annotation)?;
                match &a.value {
                    Some(value) => {
                        let value = transform_expr(value, ctx)?;
                        out.push_str(&format!(
                            "{}{}: {ty} = {value};\n",
                            ctx.pad(),
                            field.id.as_str()
                        ));
                    }
                    None => {
                        out.push_str(&format!("{}{}: {ty};\n", ctx.pad(), field.id.as_str()));
                    }
                }
            }
            // Class-level plain assignments are shared attributes.
            ast::Stmt::Assign(a) => {
                let [ast::Expr::Name(target)] = a.targets.as_slice() else {
                    bail!("class attributes must be single names");
                };
                let value = transform_expr(&a.value, ctx)?;
                out.push_str(&format!(
                    "{}static {} = {value};\n",
                    ctx.pad(),
                    target.id.as_str()
                ));
            }
            ast::Stmt::FunctionDef(f) => {
                out.push_str(&class_method(&MethodSource::from_sync(f), is_abstract, ctx)?);
            }
            ast::Stmt::AsyncFunctionDef(f) => {
                out.push_str(&class_method(&MethodSource::from_async(f), is_abstract, ctx)?);
            }
            ast::Stmt::Pass(_) => {}
            other => bail!("unsupported class member: {other:?}"),
        }
    }

    ctx.dedent();
    out.push_str(&format!("{pad}}}\n"));
    Ok(out)
}

// --- methods -------------------------------------------------------------

struct MethodSource<'a> {
    name: &'a str,
    args: &'a ast::Arguments,
    body: &'a [ast::Stmt],
    decorator_list: &'a [ast::Expr],
    returns: Option<&'a ast::Expr>,
    is_async: bool,
}

impl<'a> MethodSource<'a> {
    fn from_sync(f: &'a ast::StmtFunctionDef) -> Self {
        Self {
            name: f.name.as_str(),
            args: &f.args,
            body: &f.body,
            decorator_list: &f.decorator_list,
            returns: f.returns.as_deref(),
            is_async: false,
        }
    }

    fn from_async(f: &'a ast::StmtAsyncFunctionDef) -> Self {
        Self {
            name: f.name.as_str(),
            args: &f.args,
            body: &f.body,
            decorator_list: &f.decorator_list,
            returns: f.returns.as_deref(),
            is_async: true,
        }
    }
}

fn class_method(
    f: &MethodSource,
    class_is_abstract: bool,
    ctx: &mut TransformContext,
) -> Result<String> {
    let mut is_static = false;
    let mut is_class_method = false;
    let mut is_getter = false;
    let mut is_setter = false;
    let mut is_abstract = false;
    for deco in f.decorator_list {
        match deco {
            ast::Expr::Name(n) => match n.id.as_str() {
                "staticmethod" => is_static = true,
                "classmethod" => is_class_method = true,
                "property" => is_getter = true,
                "abstractmethod" => is_abstract = true,
                "override" => {}
                other => bail!("unsupported method decorator: {other}"),
            },
            // `@name.setter` pairs with the getter of the same name.
            ast::Expr::Attribute(a)
                if a.attr.as_str() == "setter"
                    && matches!(&*a.value, ast::Expr::Name(n) if n.id.as_str() == f.name) =>
            {
                is_setter = true;
            }
            other => bail!("unsupported method decorator: {other:?}"),
        }
    }
    if is_abstract && !class_is_abstract {
        bail!("abstract method outside an abstract class");
    }

    let skip_receiver = !is_static;
    let is_generator = block_has_yield(f.body);
    let (doc, body) = split_docstring(f.body);

    let mut out = String::new();
    if let Some(doc) = doc {
        out.push_str(&doc_comment(doc, &ctx.pad()));
    }

    ctx.push_scope();
    ctx.push_func(FuncFlags {
        is_generator,
        is_async: f.is_async,
        // Static methods have no receiver; `cls` in classmethods still
        // reads as `this`, which resolves to the class object.
        is_method: !is_static || is_class_method,
    });
    let params = function_params(f.args, skip_receiver, ctx)?;

    let pad = ctx.pad();
    let result = (|| -> Result<String> {
        if is_abstract {
            let ret = return_annotation(f.returns, f.is_async)?;
            if is_getter {
                let ty = match f.returns {
                    Some(r) => ts_type(r)?,
                    None => "any".to_string(),
                };
                return Ok(format!("{pad}abstract get {}(): {ty};\n", f.name));
            }
            return Ok(format!("{pad}abstract {}({params}){ret};\n", f.name));
        }

        let (display_name, ret) = if f.name == "__init__" {
            ("constructor".to_string(), String::new())
        } else {
            let display = match f.name {
                "__str__" => "toString",
                other => other,
            };
            let mut prefix = String::new();
            if is_static || is_class_method {
                prefix.push_str("static ");
            }
            if f.is_async {
                prefix.push_str("async ");
            }
            if is_getter {
                prefix.push_str("get ");
            } else if is_setter {
                prefix.push_str("set ");
            } else if is_generator {
                prefix.push('*');
            }
            let ret = if is_setter {
                String::new()
            } else {
                return_annotation(f.returns, f.is_async)?
            };
            (format!("{prefix}{display}"), ret)
        };

        ctx.indent();
        let inner = transform_body(body, ctx)?;
        ctx.dedent();
        Ok(format!(
            "{pad}{display_name}({params}){ret} {{\n{inner}{pad}}}\n"
        ))
    })();
    ctx.pop_func();
    ctx.pop_scope();

    out.push_str(&result?);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TransformOptions;
    use crate::names::NameMap;
    use pt_parser::parse_python;

    fn ts(source: &str) -> String {
        let parsed = parse_python(source, "class.py").unwrap();
        let names = NameMap::new();
        let options = TransformOptions::default();
        let mut ctx = TransformContext::new(&names, &options);
        transform_body(&parsed.body, &mut ctx).unwrap()
    }

    #[test]
    fn sequential_enum_becomes_a_name_union() {
        let out = ts("class Color(Enum):\n    RED = 1\n    GREEN = 2\n");
        assert_eq!(out, "type Color = \"RED\" | \"GREEN\";\n");
    }

    #[test]
    fn auto_enum_becomes_a_name_union() {
        let out = ts("class Color(Enum):\n    RED = auto()\n    GREEN = auto()\n");
        assert_eq!(out, "type Color = \"RED\" | \"GREEN\";\n");
    }

    #[test]
    fn string_enum_becomes_a_value_union() {
        let out = ts("class Mode(Enum):\n    READ = \"r\"\n    WRITE = \"w\"\n");
        assert_eq!(out, "type Mode = \"r\" | \"w\";\n");
    }

    #[test]
    fn non_sequential_enum_becomes_a_frozen_object() {
        let out = ts("class Status(Enum):\n    OK = 200\n    NOT_FOUND = 404\n");
        assert_eq!(
            out,
            "const Status = {\n  OK: 200,\n  NOT_FOUND: 404,\n} as const;\ntype Status = typeof Status[keyof typeof Status];\n"
        );
    }

    #[test]
    fn empty_enum_is_uninhabited() {
        assert_eq!(ts("class Nothing(Enum):\n    pass\n"), "type Nothing = never;\n");
    }

    #[test]
    fn dataclass_fields_become_constructor_parameters() {
        let out = ts("@dataclass\nclass Point:\n    x: int\n    y: int = 0\n");
        assert_eq!(
            out,
            "class Point {\n  x: number;\n  y: number;\n  constructor(x: number, y: number = 0) {\n    this.x = x;\n    this.y = y;\n  }\n}\n"
        );
    }

    #[test]
    fn frozen_dataclass_locks_the_instance() {
        let out = ts("@dataclass(frozen=True)\nclass Point:\n    x: int\n");
        assert_eq!(
            out,
            "class Point {\n  readonly x: number;\n  constructor(x: number) {\n    this.x = x;\n    Object.freeze(this);\n  }\n}\n"
        );
    }

    #[test]
    fn protocol_becomes_an_interface() {
        let out = ts("class Reader(Protocol):\n    def read(self, n: int) -> str:\n        ...\n");
        assert_eq!(out, "interface Reader {\n  read(n: number): string;\n}\n");
    }

    #[test]
    fn abstract_base_marks_class_and_methods() {
        let out = ts(
            "class Shape(ABC):\n    @abstractmethod\n    def area(self) -> float:\n        ...\n    def name(self) -> str:\n        return \"shape\"\n",
        );
        assert_eq!(
            out,
            "abstract class Shape {\n  abstract area(): number;\n  name(): string {\n    return \"shape\";\n  }\n}\n"
        );
    }

    #[test]
    fn init_becomes_constructor_with_super_call() {
        let out = ts(
            "class AppError(Exception):\n    def __init__(self, msg: str):\n        super().__init__(msg)\n        self.msg = msg\n",
        );
        assert_eq!(
            out,
            "class AppError extends Error {\n  constructor(msg: string) {\n    super(msg);\n    this.msg = msg;\n  }\n}\n"
        );
    }

    #[test]
    fn property_pair_becomes_accessors() {
        let out = ts(
            "class Box:\n    @property\n    def size(self) -> int:\n        return self._size\n    @size.setter\n    def size(self, value: int):\n        self._size = value\n",
        );
        assert_eq!(
            out,
            "class Box {\n  get size(): number {\n    return this._size;\n  }\n  set size(value: number) {\n    this._size = value;\n  }\n}\n"
        );
    }

    #[test]
    fn static_and_class_methods_are_static() {
        let out = ts(
            "class Util:\n    @staticmethod\n    def add(a: int, b: int) -> int:\n        return a + b\n    @classmethod\n    def make(cls):\n        return cls()\n",
        );
        assert_eq!(
            out,
            "class Util {\n  static add(a: number, b: number): number {\n    return a + b;\n  }\n  static make() {\n    return this();\n  }\n}\n"
        );
    }

    #[test]
    fn str_dunder_becomes_to_string() {
        let out = ts("class P:\n    def __str__(self) -> str:\n        return \"p\"\n");
        assert_eq!(out, "class P {\n  toString(): string {\n    return \"p\";\n  }\n}\n");
    }

    #[test]
    fn class_decorators_wrap_the_identifier() {
        let out = ts("@register\nclass Plugin:\n    pass\n");
        assert_eq!(out, "class Plugin {\n}\nPlugin = register(Plugin);\n");
    }

    #[test]
    fn class_docstring_becomes_a_doc_comment() {
        let out = ts("class P:\n    \"A point.\"\n    x: int = 0\n");
        assert_eq!(out, "/**\n * A point.\n */\nclass P {\n  x: number = 0;\n}\n");
    }

    #[test]
    fn class_attribute_is_static() {
        let out = ts("class Counter:\n    total = 0\n");
        assert_eq!(out, "class Counter {\n  static total = 0;\n}\n");
    }

    #[test]
    fn generator_method_gets_a_star() {
        let out = ts("class S:\n    def items(self):\n        yield 1\n");
        assert_eq!(out, "class S {\n  *items() {\n    yield 1;\n  }\n}\n");
    }

    #[test]
    fn multiple_bases_are_fatal() {
        let parsed = parse_python("class C(A, B):\n    pass\n", "t.py").unwrap();
        let names = NameMap::new();
        let options = TransformOptions::default();
        let mut ctx = TransformContext::new(&names, &options);
        let err = transform_body(&parsed.body, &mut ctx).unwrap_err().to_string();
        assert!(err.contains("multiple base classes"), "got: {err}");
    }
}
