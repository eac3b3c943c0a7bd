//! Expression dispatcher.
//!
//! One arm per expression kind. Operators whose semantics coincide reuse
//! the native TypeScript operator; the divergent ones (floor division,
//! sign-following modulo, exponentiation, negative indexing, slicing,
//! membership) lower to runtime helper calls and mark the helper used.

use anyhow::{bail, Result};
use pt_parser::ast::{self, Ranged};

use crate::context::{RuntimeBinding, TransformContext};

/// Transform one expression subtree into TypeScript text.
pub fn transform_expr(expr: &ast::Expr, ctx: &mut TransformContext) -> Result<String> {
    match expr {
        ast::Expr::BoolOp(e) => bool_op(e, ctx),
        ast::Expr::NamedExpr(e) => named_expr(e, ctx),
        ast::Expr::BinOp(e) => bin_op(e, ctx),
        ast::Expr::UnaryOp(e) => unary_op(e, ctx),
        ast::Expr::Lambda(e) => lambda(e, ctx),
        ast::Expr::IfExp(e) => {
            let test = transform_expr(&e.test, ctx)?;
            let body = transform_expr(&e.body, ctx)?;
            let orelse = transform_expr(&e.orelse, ctx)?;
            Ok(format!("({test} ? {body} : {orelse})"))
        }
        ast::Expr::Dict(e) => dict_literal(e, ctx),
        ast::Expr::Set(e) => {
            let items = element_list(&e.elts, ctx)?;
            Ok(format!("new Set([{items}])"))
        }
        ast::Expr::ListComp(e) => comprehension_chain(&e.generators, 0, &e.elt, None, ctx),
        ast::Expr::SetComp(e) => {
            let chain = comprehension_chain(&e.generators, 0, &e.elt, None, ctx)?;
            Ok(format!("new Set({chain})"))
        }
        ast::Expr::DictComp(e) => {
            let chain = comprehension_chain(&e.generators, 0, &e.value, Some(&e.key), ctx)?;
            Ok(format!("Object.fromEntries({chain})"))
        }
        ast::Expr::GeneratorExp(e) => comprehension_chain(&e.generators, 0, &e.elt, None, ctx),
        ast::Expr::Await(e) => {
            let value = operand(&e.value, ctx)?;
            Ok(format!("await {value}"))
        }
        ast::Expr::Yield(e) => match &e.value {
            Some(value) => {
                let value = transform_expr(value, ctx)?;
                Ok(format!("yield {value}"))
            }
            None => Ok("yield".to_string()),
        },
        ast::Expr::YieldFrom(e) => {
            let value = operand(&e.value, ctx)?;
            Ok(format!("yield* {value}"))
        }
        ast::Expr::Compare(e) => compare(e, ctx),
        ast::Expr::Call(e) => call(e, ctx),
        ast::Expr::FormattedValue(e) => {
            // Standalone formatted value: render the wrapped call directly.
            formatted_value(e, ctx)
        }
        ast::Expr::JoinedStr(e) => fstring(&e.values, ctx),
        ast::Expr::Constant(e) => constant(&e.value),
        ast::Expr::Attribute(e) => attribute(e, ctx),
        ast::Expr::Subscript(e) => subscript(e, ctx),
        ast::Expr::Starred(e) => bail!(
            "starred expression outside call/literal context at offset {}",
            u32::from(e.range().start())
        ),
        ast::Expr::Name(e) => name(e.id.as_str(), ctx),
        ast::Expr::List(e) => {
            let items = element_list(&e.elts, ctx)?;
            Ok(format!("[{items}]"))
        }
        ast::Expr::Tuple(e) => {
            let items = element_list(&e.elts, ctx)?;
            Ok(format!("[{items}]"))
        }
        ast::Expr::Slice(e) => bail!(
            "bare slice outside subscript at offset {}",
            u32::from(e.range().start())
        ),
    }
}

/// Transform an expression destined for an operand position, adding
/// parentheses when its kind could bind differently once inlined.
pub fn operand(expr: &ast::Expr, ctx: &mut TransformContext) -> Result<String> {
    let text = transform_expr(expr, ctx)?;
    let needs_parens = matches!(
        expr,
        ast::Expr::BoolOp(_)
            | ast::Expr::BinOp(_)
            | ast::Expr::UnaryOp(_)
            | ast::Expr::Compare(_)
            | ast::Expr::Lambda(_)
            | ast::Expr::Await(_)
            | ast::Expr::Yield(_)
            | ast::Expr::YieldFrom(_)
    );
    if needs_parens {
        Ok(format!("({text})"))
    } else {
        Ok(text)
    }
}

fn name(id: &str, ctx: &mut TransformContext) -> Result<String> {
    if (id == "self" || id == "cls") && ctx.func_flags().is_method {
        return Ok("this".to_string());
    }
    // A bound import member used as a plain value resolves exactly like a
    // call target, so the symbol set stays accurate. A local declaration
    // shadows the binding.
    if ctx.is_declared(id) {
        return Ok(id.to_string());
    }
    match ctx.binding(id).cloned() {
        Some(RuntimeBinding::NamespaceMember(ns, member)) => {
            Ok(ctx.runtime_namespaced(ns, &member))
        }
        Some(RuntimeBinding::PathMember(module, member)) => {
            Ok(ctx.runtime_module_member(module, &member))
        }
        Some(RuntimeBinding::Namespace(ns)) => Ok(ctx.runtime(ns)),
        Some(RuntimeBinding::PathModule(module)) => {
            bail!("module object `{module}` cannot be used as a value")
        }
        None => Ok(id.to_string()),
    }
}

fn bool_op(e: &ast::ExprBoolOp, ctx: &mut TransformContext) -> Result<String> {
    let joiner = match e.op {
        ast::BoolOp::And => " && ",
        ast::BoolOp::Or => " || ",
    };
    let parts = e
        .values
        .iter()
        .map(|v| operand(v, ctx))
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join(joiner))
}

fn named_expr(e: &ast::ExprNamedExpr, ctx: &mut TransformContext) -> Result<String> {
    let ast::Expr::Name(target) = &*e.target else {
        bail!("walrus target must be a plain name");
    };
    // The binding participates in the scope like any other assignment.
    if !ctx.is_declared(target.id.as_str()) {
        ctx.declare(target.id.as_str());
    }
    let value = transform_expr(&e.value, ctx)?;
    Ok(format!("({} = {value})", target.id.as_str()))
}

fn bin_op(e: &ast::ExprBinOp, ctx: &mut TransformContext) -> Result<String> {
    let native = match e.op {
        ast::Operator::Add => Some("+"),
        ast::Operator::Sub => Some("-"),
        ast::Operator::Mult => Some("*"),
        ast::Operator::Div => Some("/"),
        ast::Operator::LShift => Some("<<"),
        ast::Operator::RShift => Some(">>"),
        ast::Operator::BitOr => Some("|"),
        ast::Operator::BitXor => Some("^"),
        ast::Operator::BitAnd => Some("&"),
        ast::Operator::FloorDiv | ast::Operator::Mod | ast::Operator::Pow => None,
        ast::Operator::MatMult => bail!(
            "matrix multiplication has no target equivalent (offset {})",
            u32::from(e.range().start())
        ),
    };

    match native {
        Some(op) => {
            let left = operand(&e.left, ctx)?;
            let right = operand(&e.right, ctx)?;
            Ok(format!("{left} {op} {right}"))
        }
        None => {
            let helper = divergent_op_helper(e.op, ctx);
            let left = transform_expr(&e.left, ctx)?;
            let right = transform_expr(&e.right, ctx)?;
            Ok(format!("{helper}({left}, {right})"))
        }
    }
}

/// Helper name for an operator whose source semantics diverge from the
/// native target operator.
pub(crate) fn divergent_op_helper(op: ast::Operator, ctx: &mut TransformContext) -> String {
    match op {
        ast::Operator::FloorDiv => ctx.runtime("floorDiv"),
        ast::Operator::Mod => ctx.runtime("mod"),
        ast::Operator::Pow => ctx.runtime("pow"),
        _ => unreachable!("only divergent operators lower to helpers"),
    }
}

fn unary_op(e: &ast::ExprUnaryOp, ctx: &mut TransformContext) -> Result<String> {
    let value = operand(&e.operand, ctx)?;
    let text = match e.op {
        ast::UnaryOp::USub => format!("-{value}"),
        ast::UnaryOp::UAdd => format!("+{value}"),
        ast::UnaryOp::Not => format!("!{value}"),
        ast::UnaryOp::Invert => format!("~{value}"),
    };
    Ok(text)
}

fn lambda(e: &ast::ExprLambda, ctx: &mut TransformContext) -> Result<String> {
    if !e.args.kwonlyargs.is_empty() || e.args.kwarg.is_some() {
        bail!(
            "lambda keyword parameters have no target equivalent at offset {}",
            u32::from(e.range().start())
        );
    }
    ctx.push_scope();
    let mut params = Vec::new();
    for arg in e.args.posonlyargs.iter().chain(e.args.args.iter()) {
        let param_name = arg.def.arg.as_str();
        ctx.declare(param_name);
        match &arg.default {
            Some(default) => {
                let default = transform_expr(default, ctx)?;
                params.push(format!("{param_name} = {default}"));
            }
            None => params.push(param_name.to_string()),
        }
    }
    if let Some(vararg) = &e.args.vararg {
        let rest = vararg.arg.as_str();
        ctx.declare(rest);
        params.push(format!("...{rest}"));
    }
    let body = transform_expr(&e.body, ctx)?;
    ctx.pop_scope();
    Ok(format!("({}) => {body}", params.join(", ")))
}

fn compare(e: &ast::ExprCompare, ctx: &mut TransformContext) -> Result<String> {
    if e.ops.len() > 1 {
        // A chain re-evaluates its interior operands once per pairwise
        // comparison, so only effect-free interiors are accepted.
        for middle in &e.comparators[..e.comparators.len() - 1] {
            if !is_effect_free(middle) {
                bail!(
                    "chained comparison with an effectful interior operand at offset {}",
                    u32::from(e.range().start())
                );
            }
        }
    }

    let mut pairs = Vec::new();
    let mut left: &ast::Expr = &e.left;
    for (op, right) in e.ops.iter().zip(e.comparators.iter()) {
        pairs.push(compare_pair(left, *op, right, ctx)?);
        left = right;
    }
    Ok(pairs.join(" && "))
}

fn compare_pair(
    left: &ast::Expr,
    op: ast::CmpOp,
    right: &ast::Expr,
    ctx: &mut TransformContext,
) -> Result<String> {
    let native = match op {
        ast::CmpOp::Eq | ast::CmpOp::Is => "===",
        ast::CmpOp::NotEq | ast::CmpOp::IsNot => "!==",
        ast::CmpOp::Lt => "<",
        ast::CmpOp::LtE => "<=",
        ast::CmpOp::Gt => ">",
        ast::CmpOp::GtE => ">=",
        ast::CmpOp::In | ast::CmpOp::NotIn => {
            // Membership has no native equivalent across container kinds.
            // The helper takes the container first, so the emitted call
            // evaluates the container before the item, the reverse of the
            // source operand order.
            let helper = ctx.runtime("contains");
            let container = transform_expr(right, ctx)?;
            let item = transform_expr(left, ctx)?;
            let bang = if matches!(op, ast::CmpOp::NotIn) { "!" } else { "" };
            return Ok(format!("{bang}{helper}({container}, {item})"));
        }
    };
    let left = operand(left, ctx)?;
    let right = operand(right, ctx)?;
    Ok(format!("{left} {native} {right}"))
}

fn is_effect_free(expr: &ast::Expr) -> bool {
    match expr {
        ast::Expr::Name(_) | ast::Expr::Constant(_) => true,
        ast::Expr::Attribute(a) => is_effect_free(&a.value),
        _ => false,
    }
}

// --- literals ------------------------------------------------------------

pub(crate) fn constant(value: &ast::Constant) -> Result<String> {
    match value {
        ast::Constant::None => Ok("null".to_string()),
        ast::Constant::Bool(true) => Ok("true".to_string()),
        ast::Constant::Bool(false) => Ok("false".to_string()),
        ast::Constant::Int(i) => Ok(i.to_string()),
        ast::Constant::Float(f) => Ok(float_literal(*f)),
        ast::Constant::Str(s) => Ok(string_literal(s)),
        ast::Constant::Tuple(items) => {
            let parts = items.iter().map(constant).collect::<Result<Vec<_>>>()?;
            Ok(format!("[{}]", parts.join(", ")))
        }
        ast::Constant::Bytes(_) => bail!("bytes literals are not supported"),
        ast::Constant::Complex { .. } => bail!("complex literals are not supported"),
        ast::Constant::Ellipsis => bail!("ellipsis has no target equivalent"),
    }
}

fn float_literal(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

/// Double-quoted string literal with escapes.
pub(crate) fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    push_escaped(&mut out, s, '"');
    out.push('"');
    out
}

fn push_escaped(out: &mut String, s: &str, quote: char) {
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{{{:x}}}", c as u32));
            }
            c => out.push(c),
        }
    }
}

fn dict_literal(e: &ast::ExprDict, ctx: &mut TransformContext) -> Result<String> {
    let mut parts = Vec::new();
    for (key, value) in e.keys.iter().zip(e.values.iter()) {
        match key {
            // `**other` merges into the literal as a spread.
            None => {
                let spread = transform_expr(value, ctx)?;
                parts.push(format!("...{spread}"));
            }
            Some(ast::Expr::Constant(c)) if matches!(c.value, ast::Constant::Str(_)) => {
                let ast::Constant::Str(s) = &c.value else { unreachable!() };
                let value = transform_expr(value, ctx)?;
                parts.push(format!("{}: {value}", string_literal(s)));
            }
            Some(key) => {
                let key = transform_expr(key, ctx)?;
                let value = transform_expr(value, ctx)?;
                parts.push(format!("[{key}]: {value}"));
            }
        }
    }
    if parts.is_empty() {
        Ok("{}".to_string())
    } else {
        Ok(format!("{{ {} }}", parts.join(", ")))
    }
}

fn element_list(elts: &[ast::Expr], ctx: &mut TransformContext) -> Result<String> {
    let parts = elts
        .iter()
        .map(|e| match e {
            ast::Expr::Starred(starred) => {
                let value = transform_expr(&starred.value, ctx)?;
                Ok(format!("...{value}"))
            }
            other => transform_expr(other, ctx),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join(", "))
}

// --- string interpolation ------------------------------------------------

fn fstring(values: &[ast::Expr], ctx: &mut TransformContext) -> Result<String> {
    let mut out = String::from("`");
    for value in values {
        match value {
            ast::Expr::Constant(c) => {
                let ast::Constant::Str(s) = &c.value else {
                    bail!("non-string literal segment in f-string");
                };
                push_template_escaped(&mut out, s);
            }
            ast::Expr::FormattedValue(fv) => {
                let rendered = formatted_value(fv, ctx)?;
                out.push_str("${");
                out.push_str(&rendered);
                out.push('}');
            }
            other => bail!("unexpected f-string segment: {other:?}"),
        }
    }
    out.push('`');
    Ok(out)
}

fn push_template_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '$' => out.push_str("\\$"),
            c => out.push(c),
        }
    }
}

/// Render one interpolation slot. A conversion flag or format spec wraps
/// the expression in the matching runtime formatting call; a bare slot
/// interpolates directly.
fn formatted_value(e: &ast::ExprFormattedValue, ctx: &mut TransformContext) -> Result<String> {
    let mut text = transform_expr(&e.value, ctx)?;

    match e.conversion {
        ast::ConversionFlag::Repr => {
            let helper = ctx.runtime("repr");
            text = format!("{helper}({text})");
        }
        ast::ConversionFlag::Str => {
            let helper = ctx.runtime("str");
            text = format!("{helper}({text})");
        }
        ast::ConversionFlag::Ascii => {
            let helper = ctx.runtime("ascii");
            text = format!("{helper}({text})");
        }
        ast::ConversionFlag::None => {}
    }

    if let Some(spec) = &e.format_spec {
        let spec_text = format_spec(spec, ctx)?;
        let helper = ctx.runtime("format");
        text = format!("{helper}({text}, {spec_text})");
    }
    Ok(text)
}

/// A format spec is itself a joined string; a fully literal one renders as
/// a plain string literal, a dynamic one as a nested template.
fn format_spec(spec: &ast::Expr, ctx: &mut TransformContext) -> Result<String> {
    let ast::Expr::JoinedStr(joined) = spec else {
        return transform_expr(spec, ctx);
    };
    let all_literal = joined
        .values
        .iter()
        .all(|v| matches!(v, ast::Expr::Constant(c) if matches!(c.value, ast::Constant::Str(_))));
    if all_literal {
        let mut text = String::new();
        for value in &joined.values {
            let ast::Expr::Constant(c) = value else { unreachable!() };
            let ast::Constant::Str(s) = &c.value else { unreachable!() };
            text.push_str(s);
        }
        Ok(string_literal(&text))
    } else {
        fstring(&joined.values, ctx)
    }
}

// --- attribute / subscript ----------------------------------------------

fn attribute(e: &ast::ExprAttribute, ctx: &mut TransformContext) -> Result<String> {
    if let ast::Expr::Name(base) = &*e.value {
        match ctx.binding(base.id.as_str()).cloned() {
            Some(RuntimeBinding::Namespace(ns)) => {
                return Ok(ctx.runtime_namespaced(ns, e.attr.as_str()));
            }
            Some(RuntimeBinding::PathModule(module)) => {
                return Ok(ctx.runtime_module_member(module, e.attr.as_str()));
            }
            _ => {}
        }
    }
    let value = operand(&e.value, ctx)?;
    Ok(format!("{value}.{}", e.attr.as_str()))
}

fn subscript(e: &ast::ExprSubscript, ctx: &mut TransformContext) -> Result<String> {
    let value = operand(&e.value, ctx)?;
    match &*e.slice {
        ast::Expr::Slice(slice) => {
            let helper = ctx.runtime("slice");
            let lower = opt_bound(&slice.lower, ctx)?;
            let upper = opt_bound(&slice.upper, ctx)?;
            match &slice.step {
                Some(step) => {
                    let step = transform_expr(step, ctx)?;
                    Ok(format!("{helper}({value}, {lower}, {upper}, {step})"))
                }
                None => Ok(format!("{helper}({value}, {lower}, {upper})")),
            }
        }
        index => match native_index(index) {
            Some(_) => {
                let index = transform_expr(index, ctx)?;
                Ok(format!("{value}[{index}]"))
            }
            None => {
                // Negative or computed indices go through the helper,
                // which knows the source indexing rules.
                let helper = ctx.runtime("at");
                let index = transform_expr(index, ctx)?;
                Ok(format!("{helper}({value}, {index})"))
            }
        },
    }
}

pub(crate) fn opt_bound(
    bound: &Option<Box<ast::Expr>>,
    ctx: &mut TransformContext,
) -> Result<String> {
    match bound {
        Some(expr) => transform_expr(expr, ctx),
        None => Ok("null".to_string()),
    }
}

/// A subscript copies to native indexing only for literal keys that index
/// identically in both languages: non-negative integers and strings.
pub(crate) fn native_index(index: &ast::Expr) -> Option<()> {
    match index {
        ast::Expr::Constant(c) => match &c.value {
            ast::Constant::Int(_) | ast::Constant::Str(_) => Some(()),
            _ => None,
        },
        _ => None,
    }
}

// --- calls ---------------------------------------------------------------

/// Built-in callables lowered to bare runtime helpers.
const RUNTIME_BUILTINS: &[&str] = &[
    "abs", "ascii", "bool", "dict", "divmod", "enumerate", "float", "format", "hash", "int",
    "isinstance", "iter", "len", "list", "max", "min", "open", "pow", "range", "repr", "reversed",
    "round", "set", "sorted", "str", "sum", "tuple", "zip",
];

fn call(e: &ast::ExprCall, ctx: &mut TransformContext) -> Result<String> {
    // `super().__init__(...)` / `super().m(...)` have structural targets.
    if let ast::Expr::Attribute(attr) = &*e.func {
        if is_bare_super_call(&attr.value) {
            let args = call_args(&e.args, &e.keywords, false, ctx)?;
            if attr.attr.as_str() == "__init__" {
                return Ok(format!("super({args})"));
            }
            return Ok(format!("super.{}({args})", attr.attr.as_str()));
        }
        return method_call(e, attr, ctx);
    }

    if let ast::Expr::Name(func) = &*e.func {
        let id = func.id.as_str();

        if id == "print" && !ctx.is_declared(id) {
            let args = call_args(&e.args, &e.keywords, false, ctx)?;
            return Ok(format!("console.log({args})"));
        }

        match ctx.binding(id).cloned() {
            Some(RuntimeBinding::NamespaceMember(ns, member)) => {
                let callee = ctx.runtime_namespaced(ns, &member);
                let args = call_args(&e.args, &e.keywords, true, ctx)?;
                return Ok(format!("{callee}({args})"));
            }
            Some(RuntimeBinding::PathMember(module, member)) => {
                let callee = ctx.runtime_module_member(module, &member);
                let args = call_args(&e.args, &e.keywords, true, ctx)?;
                return Ok(format!("{callee}({args})"));
            }
            _ => {}
        }

        if RUNTIME_BUILTINS.contains(&id) && !ctx.is_declared(id) {
            let callee = ctx.runtime(id);
            let args = call_args(&e.args, &e.keywords, true, ctx)?;
            return Ok(format!("{callee}({args})"));
        }
    }

    // Keyword arguments only land correctly on callees known to take a
    // trailing options object.
    let keywords_ok = match &*e.func {
        ast::Expr::Name(f) => ctx.callable_takes_options(f.id.as_str()).unwrap_or(false),
        _ => false,
    };
    let func = operand(&e.func, ctx)?;
    let args = call_args(&e.args, &e.keywords, keywords_ok, ctx)?;
    Ok(format!("{func}({args})"))
}

fn is_bare_super_call(expr: &ast::Expr) -> bool {
    match expr {
        ast::Expr::Call(call) => {
            matches!(&*call.func, ast::Expr::Name(n) if n.id.as_str() == "super")
                && call.args.is_empty()
        }
        _ => false,
    }
}

fn method_call(
    e: &ast::ExprCall,
    attr: &ast::ExprAttribute,
    ctx: &mut TransformContext,
) -> Result<String> {
    // Module-qualified calls resolve through the import bindings first.
    if let ast::Expr::Name(base) = &*attr.value {
        match ctx.binding(base.id.as_str()).cloned() {
            Some(RuntimeBinding::Namespace(ns)) => {
                let callee = ctx.runtime_namespaced(ns, attr.attr.as_str());
                let args = call_args(&e.args, &e.keywords, true, ctx)?;
                return Ok(format!("{callee}({args})"));
            }
            Some(RuntimeBinding::PathModule(module)) => {
                let callee = ctx.runtime_module_member(module, attr.attr.as_str());
                let args = call_args(&e.args, &e.keywords, true, ctx)?;
                return Ok(format!("{callee}({args})"));
            }
            _ => {}
        }
    }

    let obj = operand(&attr.value, ctx)?;
    let method = attr.attr.as_str();

    // Structural lowerings where the receiver/argument roles swap or the
    // target spells the operation on a different object.
    if e.keywords.is_empty() {
        match method {
            "items" if e.args.is_empty() => return Ok(format!("Object.entries({obj})")),
            "keys" if e.args.is_empty() => return Ok(format!("Object.keys({obj})")),
            "values" if e.args.is_empty() => return Ok(format!("Object.values({obj})")),
            "join" if e.args.len() == 1 => {
                // The separator evaluates before the sequence here, the
                // reverse of the source order.
                let seq = operand(&e.args[0], ctx)?;
                return Ok(format!("{seq}.join({obj})"));
            }
            "extend" if e.args.len() == 1 => {
                let other = transform_expr(&e.args[0], ctx)?;
                return Ok(format!("{obj}.push(...{other})"));
            }
            _ => {}
        }
    }

    let method = ctx.names.method(method).unwrap_or(method);
    let args = call_args(&e.args, &e.keywords, false, ctx)?;
    Ok(format!("{obj}.{method}({args})"))
}

/// Positional arguments in order; keyword arguments bundle into a trailing
/// options object, `**spread` included as an object spread. Bundling is
/// only sound when the callee is known to take such an object, so
/// `keywords_ok` gates it; keywords aimed anywhere else are fatal.
pub(crate) fn call_args(
    args: &[ast::Expr],
    keywords: &[ast::Keyword],
    keywords_ok: bool,
    ctx: &mut TransformContext,
) -> Result<String> {
    let mut parts = Vec::new();
    for arg in args {
        match arg {
            ast::Expr::Starred(starred) => {
                let value = transform_expr(&starred.value, ctx)?;
                parts.push(format!("...{value}"));
            }
            other => parts.push(transform_expr(other, ctx)?),
        }
    }

    if !keywords.is_empty() {
        if !keywords_ok {
            bail!(
                "keyword arguments need a callee with keyword-capable parameters (offset {})",
                u32::from(keywords[0].range().start())
            );
        }
        let mut props = Vec::new();
        for keyword in keywords {
            let value = transform_expr(&keyword.value, ctx)?;
            match &keyword.arg {
                Some(arg) => props.push(format!("{}: {value}", arg.as_str())),
                None => props.push(format!("...{value}")),
            }
        }
        parts.push(format!("{{ {} }}", props.join(", ")));
    }

    Ok(parts.join(", "))
}

// --- comprehensions ------------------------------------------------------

/// Desugar a comprehension clause list into `.filter`/`.map`/`.flatMap`
/// chains over runtime-coerced arrays.
fn comprehension_chain(
    generators: &[ast::Comprehension],
    index: usize,
    elt: &ast::Expr,
    dict_key: Option<&ast::Expr>,
    ctx: &mut TransformContext,
) -> Result<String> {
    let generator = &generators[index];
    if generator.is_async {
        bail!("async comprehensions are not supported");
    }

    let list_helper = ctx.runtime("list");
    // The iterable evaluates in the enclosing scope, before the clause
    // binds its target.
    let iterable = transform_expr(&generator.iter, ctx)?;

    ctx.push_scope();
    let pattern = binding_pattern(&generator.target, ctx)?;

    let mut chain = format!("{list_helper}({iterable})");
    for condition in &generator.ifs {
        let condition = transform_expr(condition, ctx)?;
        chain.push_str(&format!(".filter(({pattern}) => {condition})"));
    }

    let last = index + 1 == generators.len();
    if last {
        let body = match dict_key {
            Some(key) => {
                let key = transform_expr(key, ctx)?;
                let value = transform_expr(elt, ctx)?;
                format!("[{key}, {value}]")
            }
            None => transform_expr(elt, ctx)?,
        };
        chain.push_str(&format!(".map(({pattern}) => {body})"));
    } else {
        let inner = comprehension_chain(generators, index + 1, elt, dict_key, ctx)?;
        chain.push_str(&format!(".flatMap(({pattern}) => {inner})"));
    }

    ctx.pop_scope();
    Ok(chain)
}

/// Render a binding target (name, possibly nested tuples, rest capture)
/// as a destructuring pattern, declaring every bound name.
pub(crate) fn binding_pattern(target: &ast::Expr, ctx: &mut TransformContext) -> Result<String> {
    match target {
        ast::Expr::Name(n) => {
            ctx.declare(n.id.as_str());
            Ok(n.id.as_str().to_string())
        }
        ast::Expr::Tuple(t) => {
            let parts = t
                .elts
                .iter()
                .map(|e| binding_pattern(e, ctx))
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("[{}]", parts.join(", ")))
        }
        ast::Expr::List(l) => {
            let parts = l
                .elts
                .iter()
                .map(|e| binding_pattern(e, ctx))
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("[{}]", parts.join(", ")))
        }
        ast::Expr::Starred(s) => {
            let inner = binding_pattern(&s.value, ctx)?;
            Ok(format!("...{inner}"))
        }
        other => bail!("unsupported binding target: {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TransformOptions;
    use crate::names::NameMap;
    use pt_parser::parse_python;

    fn ts(source: &str) -> String {
        let parsed = parse_python(source, "expr.py").unwrap();
        let names = NameMap::new();
        let options = TransformOptions::default();
        let mut ctx = TransformContext::new(&names, &options);
        let ast::Stmt::Expr(stmt) = &parsed.body[0] else {
            panic!("expected an expression statement");
        };
        transform_expr(&stmt.value, &mut ctx).unwrap()
    }

    fn ts_symbols(source: &str) -> (String, Vec<String>) {
        let parsed = parse_python(source, "expr.py").unwrap();
        let names = NameMap::new();
        let options = TransformOptions::default();
        let mut ctx = TransformContext::new(&names, &options);
        let ast::Stmt::Expr(stmt) = &parsed.body[0] else {
            panic!("expected an expression statement");
        };
        let text = transform_expr(&stmt.value, &mut ctx).unwrap();
        let result = ctx.finish(String::new());
        (text, result.runtime_symbols.into_iter().collect())
    }

    #[test]
    fn coinciding_operators_stay_native() {
        assert_eq!(ts("a + b * c"), "a + (b * c)");
        assert_eq!(ts("a < b"), "a < b");
    }

    #[test]
    fn divergent_operators_lower_to_helpers() {
        let (text, symbols) = ts_symbols("a // b");
        assert_eq!(text, "floorDiv(a, b)");
        assert_eq!(symbols, ["floorDiv"]);
        assert_eq!(ts("a % b"), "mod(a, b)");
        assert_eq!(ts("a ** b"), "pow(a, b)");
    }

    #[test]
    fn negative_index_never_emits_native_subscript() {
        let (text, symbols) = ts_symbols("arr[-1]");
        assert_eq!(text, "at(arr, -1)");
        assert_eq!(symbols, ["at"]);
    }

    #[test]
    fn literal_indices_copy_directly() {
        assert_eq!(ts("arr[0]"), "arr[0]");
        assert_eq!(ts("d[\"key\"]"), "d[\"key\"]");
    }

    #[test]
    fn slices_lower_to_the_helper() {
        assert_eq!(ts("a[1:3]"), "slice(a, 1, 3)");
        assert_eq!(ts("a[::-1]"), "slice(a, null, null, -1)");
        assert_eq!(ts("a[2:]"), "slice(a, 2, null)");
    }

    #[test]
    fn equality_maps_to_strict_operators() {
        assert_eq!(ts("a == b"), "a === b");
        assert_eq!(ts("a != b"), "a !== b");
        assert_eq!(ts("a is None"), "a === null");
        assert_eq!(ts("a is not None"), "a !== null");
    }

    #[test]
    fn membership_uses_the_runtime() {
        assert_eq!(ts("x in xs"), "contains(xs, x)");
        assert_eq!(ts("x not in xs"), "!contains(xs, x)");
    }

    #[test]
    fn chained_comparison_with_simple_interior() {
        assert_eq!(ts("a < b < c"), "a < b && b < c");
    }

    #[test]
    fn chained_comparison_with_effectful_interior_is_fatal() {
        let parsed = parse_python("a < f() < c\n", "expr.py").unwrap();
        let names = NameMap::new();
        let options = TransformOptions::default();
        let mut ctx = TransformContext::new(&names, &options);
        let ast::Stmt::Expr(stmt) = &parsed.body[0] else {
            panic!();
        };
        assert!(transform_expr(&stmt.value, &mut ctx).is_err());
    }

    #[test]
    fn fstring_becomes_a_template_literal() {
        assert_eq!(ts("f\"hi {name}!\""), "`hi ${name}!`");
    }

    #[test]
    fn fstring_conversions_and_specs_wrap_in_helpers() {
        assert_eq!(ts("f\"{x!r}\""), "`${repr(x)}`");
        assert_eq!(ts("f\"{x:>8}\""), "`${format(x, \">8\")}`");
    }

    #[test]
    fn comprehension_desugars_to_map() {
        assert_eq!(ts("[x * 2 for x in xs]"), "list(xs).map((x) => x * 2)");
    }

    #[test]
    fn filtered_comprehension_prepends_filter() {
        assert_eq!(
            ts("[x for x in xs if x > 0]"),
            "list(xs).filter((x) => x > 0).map((x) => x)"
        );
    }

    #[test]
    fn nested_comprehension_flattens() {
        assert_eq!(
            ts("[x + y for x in xs for y in ys]"),
            "list(xs).flatMap((x) => list(ys).map((y) => x + y))"
        );
    }

    #[test]
    fn dict_comprehension_builds_entries() {
        assert_eq!(
            ts("{k: v for k, v in pairs}"),
            "Object.fromEntries(list(pairs).map(([k, v]) => [k, v]))"
        );
    }

    fn ts_err(source: &str) -> String {
        let parsed = parse_python(source, "expr.py").unwrap();
        let names = NameMap::new();
        let options = TransformOptions::default();
        let mut ctx = TransformContext::new(&names, &options);
        let ast::Stmt::Expr(stmt) = &parsed.body[0] else {
            panic!("expected an expression statement");
        };
        transform_expr(&stmt.value, &mut ctx)
            .unwrap_err()
            .to_string()
    }

    #[test]
    fn keyword_arguments_bundle_for_runtime_callees() {
        let (text, symbols) = ts_symbols("sorted(xs, key=f)");
        assert_eq!(text, "sorted(xs, { key: f })");
        assert_eq!(symbols, ["sorted"]);
    }

    #[test]
    fn keyword_arguments_to_an_unknown_callee_are_fatal() {
        let err = ts_err("f(1, retries=3)");
        assert!(err.contains("keyword arguments"), "got: {err}");
        let err = ts_err("f(**opts)");
        assert!(err.contains("keyword arguments"), "got: {err}");
    }

    #[test]
    fn method_keywords_are_fatal() {
        let err = ts_err("xs.sort(key=f)");
        assert!(err.contains("keyword arguments"), "got: {err}");
    }

    #[test]
    fn renamed_methods_use_the_table() {
        assert_eq!(ts("s.startswith(\"a\")"), "s.startsWith(\"a\")");
        assert_eq!(ts("xs.append(1)"), "xs.push(1)");
    }

    #[test]
    fn join_swaps_receiver_and_argument() {
        assert_eq!(ts("\", \".join(names)"), "names.join(\", \")");
    }

    #[test]
    fn builtins_lower_to_runtime_helpers() {
        let (text, symbols) = ts_symbols("len(xs)");
        assert_eq!(text, "len(xs)");
        assert_eq!(symbols, ["len"]);
    }

    #[test]
    fn ternary_parenthesizes() {
        assert_eq!(ts("a if c else b"), "(c ? a : b)");
    }

    #[test]
    fn lambda_becomes_an_arrow() {
        assert_eq!(ts("lambda a, b=1: a + b"), "(a, b = 1) => a + b");
    }

    #[test]
    fn lambda_vararg_becomes_a_rest_parameter() {
        assert_eq!(ts("lambda *a: a"), "(...a) => a");
    }

    #[test]
    fn lambda_keyword_parameters_are_fatal() {
        let err = ts_err("lambda **k: k");
        assert!(err.contains("lambda keyword parameters"), "got: {err}");
        let err = ts_err("lambda *, x=1: x");
        assert!(err.contains("lambda keyword parameters"), "got: {err}");
    }

    #[test]
    fn dict_literal_with_spread() {
        assert_eq!(ts("{\"a\": 1, **rest}"), "{ \"a\": 1, ...rest }");
    }
}
