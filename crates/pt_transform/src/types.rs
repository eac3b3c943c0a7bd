//! Type-hint → TypeScript type mapping.
//!
//! Hints are erased at the value level; this module only renders their
//! type-position spelling. Container generics map to TS generics/arrays,
//! `Optional`/`Union` to union types, and `Callable[[A, B], R]` to an
//! anonymous function signature with synthesized parameter names.

use anyhow::{bail, Result};
use pt_parser::ast;

/// Render an annotation expression as a TypeScript type.
pub fn ts_type(expr: &ast::Expr) -> Result<String> {
    match expr {
        ast::Expr::Name(name) => Ok(named_type(name.id.as_str()).to_string()),
        ast::Expr::Constant(c) => match &c.value {
            ast::Constant::None => Ok("null".to_string()),
            // Forward reference: the annotation is a quoted type name.
            ast::Constant::Str(s) => Ok(s.clone()),
            ast::Constant::Ellipsis => Ok("...".to_string()),
            other => bail!("unsupported constant in type hint: {other:?}"),
        },
        ast::Expr::Attribute(attr) => {
            // Dotted hints like `typing.Optional` reduce to the member.
            Ok(named_type(attr.attr.as_str()).to_string())
        }
        ast::Expr::BinOp(bin) if matches!(bin.op, ast::Operator::BitOr) => {
            let left = ts_type(&bin.left)?;
            let right = ts_type(&bin.right)?;
            Ok(format!("{left} | {right}"))
        }
        ast::Expr::Subscript(sub) => generic_type(sub),
        ast::Expr::Tuple(tuple) => {
            let parts = tuple
                .elts
                .iter()
                .map(ts_type)
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("[{}]", parts.join(", ")))
        }
        ast::Expr::List(list) => {
            // Callable parameter lists arrive as list expressions.
            let parts = list.elts.iter().map(ts_type).collect::<Result<Vec<_>>>()?;
            Ok(format!("[{}]", parts.join(", ")))
        }
        other => bail!("unsupported type hint expression: {other:?}"),
    }
}

fn generic_type(sub: &ast::ExprSubscript) -> Result<String> {
    let base = match &*sub.value {
        ast::Expr::Name(name) => name.id.as_str().to_string(),
        ast::Expr::Attribute(attr) => attr.attr.as_str().to_string(),
        other => bail!("unsupported generic base in type hint: {other:?}"),
    };

    let args: Vec<&ast::Expr> = match &*sub.slice {
        ast::Expr::Tuple(tuple) => tuple.elts.iter().collect(),
        single => vec![single],
    };

    if args.is_empty() {
        bail!("{base} hint expects at least one type argument");
    }

    match base.as_str() {
        "list" | "List" | "Sequence" | "MutableSequence" => {
            let inner = ts_type(args[0])?;
            Ok(format!("{}[]", wrap_array_item(&inner)))
        }
        "dict" | "Dict" | "Mapping" | "MutableMapping" => {
            if args.len() != 2 {
                bail!("dict hint expects two type arguments");
            }
            Ok(format!("Record<{}, {}>", ts_type(args[0])?, ts_type(args[1])?))
        }
        "set" | "Set" | "frozenset" | "FrozenSet" => {
            Ok(format!("Set<{}>", ts_type(args[0])?))
        }
        "tuple" | "Tuple" => {
            // `tuple[X, ...]` is a homogeneous sequence.
            if args.len() == 2 && matches!(args[1], ast::Expr::Constant(c) if matches!(c.value, ast::Constant::Ellipsis))
            {
                let inner = ts_type(args[0])?;
                return Ok(format!("{}[]", wrap_array_item(&inner)));
            }
            let parts = args.into_iter().map(ts_type).collect::<Result<Vec<_>>>()?;
            Ok(format!("[{}]", parts.join(", ")))
        }
        "Optional" => Ok(format!("{} | null", ts_type(args[0])?)),
        "Union" => {
            let parts = args.into_iter().map(ts_type).collect::<Result<Vec<_>>>()?;
            Ok(parts.join(" | "))
        }
        "Callable" => {
            if args.len() != 2 {
                bail!("Callable hint expects [params, return]");
            }
            let params: Vec<String> = match args[0] {
                ast::Expr::List(list) => list
                    .elts
                    .iter()
                    .enumerate()
                    .map(|(i, p)| Ok(format!("arg{i}: {}", ts_type(p)?)))
                    .collect::<Result<Vec<_>>>()?,
                ast::Expr::Constant(c) if matches!(c.value, ast::Constant::Ellipsis) => {
                    vec!["...args: any[]".to_string()]
                }
                other => bail!("unsupported Callable parameter list: {other:?}"),
            };
            Ok(format!("({}) => {}", params.join(", "), ts_type(args[1])?))
        }
        "Iterable" | "Iterator" | "Generator" => {
            Ok(format!("Iterable<{}>", ts_type(args[0])?))
        }
        "Awaitable" | "Coroutine" => {
            // Coroutine[Y, S, R] resolves to its result type.
            Ok(format!("Promise<{}>", ts_type(args[args.len() - 1])?))
        }
        _ => {
            let parts = args.into_iter().map(ts_type).collect::<Result<Vec<_>>>()?;
            Ok(format!("{base}<{}>", parts.join(", ")))
        }
    }
}

/// Union items need parentheses before `[]`.
fn wrap_array_item(inner: &str) -> String {
    if inner.contains('|') || inner.contains("=>") {
        format!("({inner})")
    } else {
        inner.to_string()
    }
}

fn named_type(name: &str) -> &str {
    match name {
        "int" | "float" | "complex" => "number",
        "str" => "string",
        "bool" => "boolean",
        "bytes" | "bytearray" => "Uint8Array",
        "None" => "null",
        "Any" | "object" => "any",
        "Self" => "this",
        other => other,
    }
}
