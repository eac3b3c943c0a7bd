//! Statement dispatcher.
//!
//! One visit arm per statement kind; each returns the emitted text for its
//! subtree (indentation included) and records side effects on the shared
//! context. Unrecognized or uncovered constructs are translation-fatal —
//! nothing is ever silently dropped.

use anyhow::{bail, Result};
use pt_parser::ast::{self, Ranged};

use crate::class::transform_class;
use crate::context::{FuncFlags, RuntimeBinding, TransformContext};
use crate::docstring::doc_comment;
use crate::expr::{
    binding_pattern, call_args, divergent_op_helper, native_index, opt_bound, operand,
    transform_expr,
};
use crate::names::{is_builtin_exception, stdlib_module, StdlibModule};
use crate::types::ts_type;

/// Transform one statement into TypeScript text. The result carries its
/// own leading indentation and trailing newline; no-op statements return
/// an empty string.
pub fn transform_stmt(stmt: &ast::Stmt, ctx: &mut TransformContext) -> Result<String> {
    match stmt {
        ast::Stmt::FunctionDef(s) => function_def(
            s.name.as_str(),
            &s.args,
            &s.body,
            &s.decorator_list,
            s.returns.as_deref(),
            false,
            ctx,
        ),
        ast::Stmt::AsyncFunctionDef(s) => function_def(
            s.name.as_str(),
            &s.args,
            &s.body,
            &s.decorator_list,
            s.returns.as_deref(),
            true,
            ctx,
        ),
        ast::Stmt::ClassDef(s) => transform_class(s, ctx),
        ast::Stmt::Return(s) => match &s.value {
            Some(value) => {
                let value = transform_expr(value, ctx)?;
                Ok(format!("{}return {value};\n", ctx.pad()))
            }
            None => Ok(format!("{}return;\n", ctx.pad())),
        },
        ast::Stmt::Delete(s) => delete(s, ctx),
        ast::Stmt::TypeAlias(s) => {
            let ast::Expr::Name(name) = &*s.name else {
                bail!("type alias target must be a plain name");
            };
            let value = ts_type(&s.value)?;
            ctx.declare(name.id.as_str());
            Ok(format!("{}type {} = {value};\n", ctx.pad(), name.id.as_str()))
        }
        ast::Stmt::Assign(s) => assign(s, ctx),
        ast::Stmt::AugAssign(s) => aug_assign(s, ctx),
        ast::Stmt::AnnAssign(s) => ann_assign(s, ctx),
        ast::Stmt::For(s) => for_loop(&s.target, &s.iter, &s.body, &s.orelse, false, ctx),
        ast::Stmt::AsyncFor(s) => for_loop(&s.target, &s.iter, &s.body, &s.orelse, true, ctx),
        ast::Stmt::While(s) => {
            if !s.orelse.is_empty() {
                bail!("while/else has no target equivalent");
            }
            let test = transform_expr(&s.test, ctx)?;
            let body = indented_body(&s.body, ctx)?;
            let pad = ctx.pad();
            Ok(format!("{pad}while ({test}) {{\n{body}{pad}}}\n"))
        }
        ast::Stmt::If(s) => if_chain(s, ctx, true),
        ast::Stmt::With(s) => with_block(&s.items, &s.body, false, ctx),
        ast::Stmt::AsyncWith(s) => with_block(&s.items, &s.body, true, ctx),
        ast::Stmt::Match(s) => match_stmt(s, ctx),
        ast::Stmt::Raise(s) => raise(s, ctx),
        ast::Stmt::Try(s) => try_stmt(s, ctx),
        ast::Stmt::TryStar(s) => bail!(
            "except* groups are not supported (offset {})",
            u32::from(s.range().start())
        ),
        ast::Stmt::Assert(s) => {
            let helper = ctx.runtime("assert");
            let test = transform_expr(&s.test, ctx)?;
            match &s.msg {
                Some(msg) => {
                    let msg = transform_expr(msg, ctx)?;
                    Ok(format!("{}{helper}({test}, {msg});\n", ctx.pad()))
                }
                None => Ok(format!("{}{helper}({test});\n", ctx.pad())),
            }
        }
        ast::Stmt::Import(s) => import(s, ctx),
        ast::Stmt::ImportFrom(s) => import_from(s, ctx),
        // The outer binding is reused; later assignments must not
        // re-declare.
        ast::Stmt::Global(s) => {
            for name in &s.names {
                ctx.declare(name.as_str());
            }
            Ok(String::new())
        }
        ast::Stmt::Nonlocal(s) => {
            for name in &s.names {
                ctx.declare(name.as_str());
            }
            Ok(String::new())
        }
        ast::Stmt::Expr(s) => {
            // A bare string statement is a stray docstring: a no-op.
            if matches!(&*s.value, ast::Expr::Constant(c) if matches!(c.value, ast::Constant::Str(_)))
            {
                return Ok(String::new());
            }
            let value = transform_expr(&s.value, ctx)?;
            Ok(format!("{}{value};\n", ctx.pad()))
        }
        ast::Stmt::Pass(_) => Ok(String::new()),
        ast::Stmt::Break(_) => Ok(format!("{}break;\n", ctx.pad())),
        ast::Stmt::Continue(_) => Ok(format!("{}continue;\n", ctx.pad())),
    }
}

/// Transform a statement sequence at the current depth.
pub fn transform_body(body: &[ast::Stmt], ctx: &mut TransformContext) -> Result<String> {
    let mut out = String::new();
    for stmt in body {
        out.push_str(&transform_stmt(stmt, ctx)?);
    }
    Ok(out)
}

/// Transform a block body one level deeper than the surrounding statement.
fn indented_body(body: &[ast::Stmt], ctx: &mut TransformContext) -> Result<String> {
    ctx.indent();
    let text = transform_body(body, ctx);
    ctx.dedent();
    text
}

// --- functions -----------------------------------------------------------

/// Marker decorators consumed structurally rather than applied as calls.
fn is_marker_decorator(deco: &ast::Expr) -> bool {
    matches!(
        deco,
        ast::Expr::Name(n) if matches!(
            n.id.as_str(),
            "staticmethod" | "classmethod" | "abstractmethod" | "property" | "override"
        )
    )
}

fn function_def(
    name: &str,
    args: &ast::Arguments,
    body: &[ast::Stmt],
    decorator_list: &[ast::Expr],
    returns: Option<&ast::Expr>,
    is_async: bool,
    ctx: &mut TransformContext,
) -> Result<String> {
    ctx.declare(name);
    ctx.register_callable(
        name,
        !args.kwonlyargs.is_empty() || args.kwarg.is_some(),
    );

    let is_generator = block_has_yield(body);
    let (doc, body) = split_docstring(body);

    let mut out = String::new();
    if let Some(doc) = doc {
        out.push_str(&doc_comment(doc, &ctx.pad()));
    }

    ctx.push_scope();
    ctx.push_func(FuncFlags {
        is_generator,
        is_async,
        is_method: false,
    });
    let params = function_params(args, false, ctx)?;
    let ret = return_annotation(returns, is_async)?;
    let inner = indented_body(body, ctx)?;
    ctx.pop_func();
    ctx.pop_scope();

    let pad = ctx.pad();
    let star = if is_generator { "*" } else { "" };
    let prefix = if is_async { "async " } else { "" };
    out.push_str(&format!(
        "{pad}{prefix}function{star} {name}({params}){ret} {{\n{inner}{pad}}}\n"
    ));

    // Decorators reassign the declared identifier, innermost first.
    let wrappers: Vec<&ast::Expr> = decorator_list
        .iter()
        .filter(|d| !is_marker_decorator(d))
        .collect();
    if !wrappers.is_empty() {
        let mut wrapped = name.to_string();
        for deco in wrappers.iter().rev() {
            let deco = transform_expr(deco, ctx)?;
            wrapped = format!("{deco}({wrapped})");
        }
        out.push_str(&format!("{pad}{name} = {wrapped};\n"));
    }

    Ok(out)
}

/// Render a parameter list, declaring every parameter in the current
/// scope. `skip_self` drops the leading receiver parameter of methods.
pub(crate) fn function_params(
    args: &ast::Arguments,
    skip_self: bool,
    ctx: &mut TransformContext,
) -> Result<String> {
    if !args.kwonlyargs.is_empty() && args.vararg.is_some() {
        bail!("keyword-only parameters after *args are not supported");
    }
    if !args.kwonlyargs.is_empty() && args.kwarg.is_some() {
        bail!("keyword-only parameters alongside **kwargs are not supported");
    }
    if args.vararg.is_some() && args.kwarg.is_some() {
        bail!("*args and **kwargs cannot share the trailing position");
    }

    let mut params = Vec::new();
    let positional = args.posonlyargs.iter().chain(args.args.iter());
    for (i, arg) in positional.enumerate() {
        if skip_self && i == 0 {
            continue;
        }
        let name = arg.def.arg.as_str();
        ctx.declare(name);
        let mut param = name.to_string();
        if let Some(annotation) = &arg.def.annotation {
            param.push_str(&format!(": {}", ts_type(annotation)?));
        }
        if let Some(default) = &arg.default {
            param.push_str(&format!(" = {}", transform_expr(default, ctx)?));
        }
        params.push(param);
    }

    if let Some(vararg) = &args.vararg {
        let name = vararg.arg.as_str();
        ctx.declare(name);
        let element = match &vararg.annotation {
            Some(annotation) => ts_type(annotation)?,
            None => "any".to_string(),
        };
        params.push(format!("...{name}: {element}[]"));
    }

    // Keyword-only parameters destructure out of a trailing options
    // object, the shape keyword call sites bundle into.
    if !args.kwonlyargs.is_empty() {
        let mut pattern = Vec::new();
        let mut fields = Vec::new();
        let mut all_defaulted = true;
        for arg in &args.kwonlyargs {
            let name = arg.def.arg.as_str();
            ctx.declare(name);
            let ty = match &arg.def.annotation {
                Some(annotation) => ts_type(annotation)?,
                None => "any".to_string(),
            };
            match &arg.default {
                Some(default) => {
                    pattern.push(format!("{name} = {}", transform_expr(default, ctx)?));
                    fields.push(format!("{name}?: {ty}"));
                }
                None => {
                    all_defaulted = false;
                    pattern.push(name.to_string());
                    fields.push(format!("{name}: {ty}"));
                }
            }
        }
        let tail = if all_defaulted { " = {}" } else { "" };
        params.push(format!(
            "{{ {} }}: {{ {} }}{tail}",
            pattern.join(", "),
            fields.join(", ")
        ));
    }

    if let Some(kwarg) = &args.kwarg {
        let name = kwarg.arg.as_str();
        ctx.declare(name);
        params.push(format!("{name}: Record<string, any> = {{}}"));
    }

    Ok(params.join(", "))
}

pub(crate) fn return_annotation(returns: Option<&ast::Expr>, is_async: bool) -> Result<String> {
    let Some(returns) = returns else {
        return Ok(String::new());
    };
    let mut mapped = match returns {
        ast::Expr::Constant(c) if matches!(c.value, ast::Constant::None) => "void".to_string(),
        other => ts_type(other)?,
    };
    if is_async && !mapped.starts_with("Promise<") {
        mapped = format!("Promise<{mapped}>");
    }
    Ok(format!(": {mapped}"))
}

/// Split off the sole leading string-literal statement, if any.
pub(crate) fn split_docstring(body: &[ast::Stmt]) -> (Option<&str>, &[ast::Stmt]) {
    if let Some(ast::Stmt::Expr(first)) = body.first() {
        if let ast::Expr::Constant(c) = &*first.value {
            if let ast::Constant::Str(text) = &c.value {
                return (Some(text.as_str()), &body[1..]);
            }
        }
    }
    (None, body)
}

/// Whether a yield/await-free function body turns out to be a generator:
/// a yield anywhere directly inside, not crossing a nested function.
pub(crate) fn block_has_yield(body: &[ast::Stmt]) -> bool {
    body.iter().any(stmt_has_yield)
}

fn stmt_has_yield(stmt: &ast::Stmt) -> bool {
    match stmt {
        // Nested functions own their yields.
        ast::Stmt::FunctionDef(_) | ast::Stmt::AsyncFunctionDef(_) | ast::Stmt::ClassDef(_) => {
            false
        }
        ast::Stmt::Expr(s) => expr_has_yield(&s.value),
        ast::Stmt::Return(s) => s.value.as_deref().is_some_and(expr_has_yield),
        ast::Stmt::Assign(s) => expr_has_yield(&s.value),
        ast::Stmt::AugAssign(s) => expr_has_yield(&s.value),
        ast::Stmt::AnnAssign(s) => s.value.as_deref().is_some_and(expr_has_yield),
        ast::Stmt::If(s) => {
            expr_has_yield(&s.test) || block_stmts_have_yield(&s.body) || block_stmts_have_yield(&s.orelse)
        }
        ast::Stmt::While(s) => {
            expr_has_yield(&s.test)
                || block_stmts_have_yield(&s.body)
                || block_stmts_have_yield(&s.orelse)
        }
        ast::Stmt::For(s) => {
            expr_has_yield(&s.iter)
                || block_stmts_have_yield(&s.body)
                || block_stmts_have_yield(&s.orelse)
        }
        ast::Stmt::AsyncFor(s) => {
            expr_has_yield(&s.iter)
                || block_stmts_have_yield(&s.body)
                || block_stmts_have_yield(&s.orelse)
        }
        ast::Stmt::With(s) => {
            s.items.iter().any(|i| expr_has_yield(&i.context_expr))
                || block_stmts_have_yield(&s.body)
        }
        ast::Stmt::AsyncWith(s) => {
            s.items.iter().any(|i| expr_has_yield(&i.context_expr))
                || block_stmts_have_yield(&s.body)
        }
        ast::Stmt::Raise(s) => {
            s.exc.as_deref().is_some_and(expr_has_yield)
                || s.cause.as_deref().is_some_and(expr_has_yield)
        }
        ast::Stmt::Assert(s) => {
            expr_has_yield(&s.test) || s.msg.as_deref().is_some_and(expr_has_yield)
        }
        ast::Stmt::Delete(s) => s.targets.iter().any(expr_has_yield),
        ast::Stmt::Try(s) => {
            block_stmts_have_yield(&s.body)
                || block_stmts_have_yield(&s.orelse)
                || block_stmts_have_yield(&s.finalbody)
                || s.handlers.iter().any(|h| {
                    let ast::ExceptHandler::ExceptHandler(h) = h;
                    block_stmts_have_yield(&h.body)
                })
        }
        ast::Stmt::Match(s) => {
            expr_has_yield(&s.subject) || s.cases.iter().any(|c| block_stmts_have_yield(&c.body))
        }
        _ => false,
    }
}

fn block_stmts_have_yield(body: &[ast::Stmt]) -> bool {
    body.iter().any(stmt_has_yield)
}

fn expr_has_yield(expr: &ast::Expr) -> bool {
    match expr {
        ast::Expr::Yield(_) | ast::Expr::YieldFrom(_) => true,
        ast::Expr::BoolOp(e) => e.values.iter().any(expr_has_yield),
        ast::Expr::BinOp(e) => expr_has_yield(&e.left) || expr_has_yield(&e.right),
        ast::Expr::UnaryOp(e) => expr_has_yield(&e.operand),
        ast::Expr::IfExp(e) => {
            expr_has_yield(&e.test) || expr_has_yield(&e.body) || expr_has_yield(&e.orelse)
        }
        ast::Expr::Compare(e) => {
            expr_has_yield(&e.left) || e.comparators.iter().any(expr_has_yield)
        }
        ast::Expr::Call(e) => {
            expr_has_yield(&e.func)
                || e.args.iter().any(expr_has_yield)
                || e.keywords.iter().any(|k| expr_has_yield(&k.value))
        }
        ast::Expr::NamedExpr(e) => expr_has_yield(&e.value),
        ast::Expr::Await(e) => expr_has_yield(&e.value),
        ast::Expr::Starred(e) => expr_has_yield(&e.value),
        ast::Expr::Attribute(e) => expr_has_yield(&e.value),
        ast::Expr::Subscript(e) => expr_has_yield(&e.value) || expr_has_yield(&e.slice),
        ast::Expr::Tuple(e) => e.elts.iter().any(expr_has_yield),
        ast::Expr::List(e) => e.elts.iter().any(expr_has_yield),
        ast::Expr::Set(e) => e.elts.iter().any(expr_has_yield),
        ast::Expr::Dict(e) => {
            e.values.iter().any(expr_has_yield)
                || e.keys.iter().flatten().any(expr_has_yield)
        }
        ast::Expr::JoinedStr(e) => e.values.iter().any(expr_has_yield),
        ast::Expr::FormattedValue(e) => expr_has_yield(&e.value),
        _ => false,
    }
}

// --- assignment ----------------------------------------------------------

fn assign(s: &ast::StmtAssign, ctx: &mut TransformContext) -> Result<String> {
    let value = transform_expr(&s.value, ctx)?;

    if s.targets.len() > 1 {
        // `a = b = expr` evaluates the value once; later targets copy the
        // first, which must therefore be a plain name.
        let ast::Expr::Name(first) = &s.targets[0] else {
            bail!("multiple assignment requires a leading name target");
        };
        let mut out = assign_target(&s.targets[0], &value, ctx)?;
        for target in &s.targets[1..] {
            out.push_str(&assign_target(target, first.id.as_str(), ctx)?);
        }
        return Ok(out);
    }

    assign_target(&s.targets[0], &value, ctx)
}

fn assign_target(target: &ast::Expr, value: &str, ctx: &mut TransformContext) -> Result<String> {
    let pad = ctx.pad();
    match target {
        ast::Expr::Name(n) => {
            let id = n.id.as_str();
            if (id == "self" || id == "cls") && ctx.func_flags().is_method {
                bail!("cannot rebind the method receiver");
            }
            if ctx.is_declared(id) {
                Ok(format!("{pad}{id} = {value};\n"))
            } else {
                ctx.declare(id);
                Ok(format!("{pad}let {id} = {value};\n"))
            }
        }
        ast::Expr::Tuple(_) | ast::Expr::List(_) => {
            let names = target_names(target)?;
            let fresh: Vec<&str> = names
                .iter()
                .copied()
                .filter(|n| !ctx.is_declared(n))
                .collect();
            let all_fresh = fresh.len() == names.len();
            let mut out = String::new();
            if !all_fresh {
                // Mixed old/new names: pre-declare the new ones so the
                // destructuring stays a bare assignment.
                for name in &fresh {
                    ctx.declare(name);
                    out.push_str(&format!("{pad}let {name};\n"));
                }
            }
            let pattern = binding_pattern(target, ctx)?;
            if all_fresh {
                out.push_str(&format!("{pad}let {pattern} = {value};\n"));
            } else {
                out.push_str(&format!("{pad}{pattern} = {value};\n"));
            }
            Ok(out)
        }
        ast::Expr::Attribute(a) => {
            let object = operand(&a.value, ctx)?;
            Ok(format!("{pad}{object}.{} = {value};\n", a.attr.as_str()))
        }
        ast::Expr::Subscript(sub) => subscript_store(sub, value, ctx),
        other => bail!("unsupported assignment target: {other:?}"),
    }
}

fn subscript_store(
    sub: &ast::ExprSubscript,
    value: &str,
    ctx: &mut TransformContext,
) -> Result<String> {
    let pad = ctx.pad();
    let object = operand(&sub.value, ctx)?;
    match &*sub.slice {
        ast::Expr::Slice(slice) => {
            // Length mismatches surface at runtime, matching the source
            // language's late-bound behavior.
            let helper = ctx.runtime("setSlice");
            let lower = opt_bound(&slice.lower, ctx)?;
            let upper = opt_bound(&slice.upper, ctx)?;
            let step = opt_bound(&slice.step, ctx)?;
            Ok(format!(
                "{pad}{helper}({object}, {lower}, {upper}, {step}, {value});\n"
            ))
        }
        index => {
            if native_index(index).is_some() {
                let index = transform_expr(index, ctx)?;
                Ok(format!("{pad}{object}[{index}] = {value};\n"))
            } else {
                let helper = ctx.runtime("setAt");
                let index = transform_expr(index, ctx)?;
                Ok(format!("{pad}{helper}({object}, {index}, {value});\n"))
            }
        }
    }
}

/// All names bound by a destructuring target, in source order.
fn target_names(target: &ast::Expr) -> Result<Vec<&str>> {
    fn walk<'a>(expr: &'a ast::Expr, out: &mut Vec<&'a str>) -> Result<()> {
        match expr {
            ast::Expr::Name(n) => out.push(n.id.as_str()),
            ast::Expr::Tuple(t) => {
                for e in &t.elts {
                    walk(e, out)?;
                }
            }
            ast::Expr::List(l) => {
                for e in &l.elts {
                    walk(e, out)?;
                }
            }
            ast::Expr::Starred(s) => walk(&s.value, out)?,
            other => bail!("unsupported destructuring element: {other:?}"),
        }
        Ok(())
    }
    let mut out = Vec::new();
    walk(target, &mut out)?;
    Ok(out)
}

fn aug_assign(s: &ast::StmtAugAssign, ctx: &mut TransformContext) -> Result<String> {
    let target = match &*s.target {
        ast::Expr::Name(_) | ast::Expr::Attribute(_) => transform_expr(&s.target, ctx)?,
        ast::Expr::Subscript(sub) if native_index(&sub.slice).is_some() => {
            transform_expr(&s.target, ctx)?
        }
        other => bail!("unsupported augmented-assignment target: {other:?}"),
    };
    let value = transform_expr(&s.value, ctx)?;
    let pad = ctx.pad();

    let native = match s.op {
        ast::Operator::Add => Some("+="),
        ast::Operator::Sub => Some("-="),
        ast::Operator::Mult => Some("*="),
        ast::Operator::Div => Some("/="),
        ast::Operator::LShift => Some("<<="),
        ast::Operator::RShift => Some(">>="),
        ast::Operator::BitOr => Some("|="),
        ast::Operator::BitXor => Some("^="),
        ast::Operator::BitAnd => Some("&="),
        ast::Operator::FloorDiv | ast::Operator::Mod | ast::Operator::Pow => None,
        ast::Operator::MatMult => bail!("matrix multiplication has no target equivalent"),
    };

    match native {
        Some(op) => Ok(format!("{pad}{target} {op} {value};\n")),
        None => {
            let helper = divergent_op_helper(s.op, ctx);
            Ok(format!("{pad}{target} = {helper}({target}, {value});\n"))
        }
    }
}

fn ann_assign(s: &ast::StmtAnnAssign, ctx: &mut TransformContext) -> Result<String> {
    let pad = ctx.pad();
    match &*s.target {
        ast::Expr::Name(n) => {
            let id = n.id.as_str();
            let value = match &s.value {
                Some(value) => Some(transform_expr(value, ctx)?),
                None => None,
            };
            if ctx.is_declared(id) {
                // The annotation was spent on the declaration.
                match value {
                    Some(value) => Ok(format!("{pad}{id} = {value};\n")),
                    None => Ok(String::new()),
                }
            } else {
                ctx.declare(id);
                let ty = ts_type(&s.annotation)?;
                match value {
                    Some(value) => Ok(format!("{pad}let {id}: {ty} = {value};\n")),
                    None => Ok(format!("{pad}let {id}: {ty};\n")),
                }
            }
        }
        ast::Expr::Attribute(a) => {
            let object = operand(&a.value, ctx)?;
            match &s.value {
                Some(value) => {
                    let value = transform_expr(value, ctx)?;
                    Ok(format!("{pad}{object}.{} = {value};\n", a.attr.as_str()))
                }
                None => Ok(String::new()),
            }
        }
        other => bail!("unsupported annotated-assignment target: {other:?}"),
    }
}

fn delete(s: &ast::StmtDelete, ctx: &mut TransformContext) -> Result<String> {
    let mut out = String::new();
    for target in &s.targets {
        match target {
            ast::Expr::Subscript(sub) if native_index(&sub.slice).is_some() => {
                let object = operand(&sub.value, ctx)?;
                let index = transform_expr(&sub.slice, ctx)?;
                out.push_str(&format!("{}delete {object}[{index}];\n", ctx.pad()));
            }
            ast::Expr::Attribute(a) => {
                let object = operand(&a.value, ctx)?;
                out.push_str(&format!(
                    "{}delete {object}.{};\n",
                    ctx.pad(),
                    a.attr.as_str()
                ));
            }
            other => bail!("unsupported delete target: {other:?}"),
        }
    }
    Ok(out)
}

// --- control flow --------------------------------------------------------

fn if_chain(s: &ast::StmtIf, ctx: &mut TransformContext, head: bool) -> Result<String> {
    let test = transform_expr(&s.test, ctx)?;
    let body = indented_body(&s.body, ctx)?;
    let pad = ctx.pad();
    let lead = if head { pad.as_str() } else { "" };

    let mut out = format!("{lead}if ({test}) {{\n{body}{pad}}}");

    if !s.orelse.is_empty() {
        // A lone nested `if` is an elif arm; anything else is a plain else.
        if let [ast::Stmt::If(elif)] = s.orelse.as_slice() {
            let chained = if_chain(elif, ctx, false)?;
            out.push_str(&format!(" else {chained}"));
        } else {
            let orelse = indented_body(&s.orelse, ctx)?;
            out.push_str(&format!(" else {{\n{orelse}{pad}}}"));
        }
    }

    if head {
        out.push('\n');
    }
    Ok(out)
}

/// Classify the iterable to pick the loop idiom; anything unrecognized
/// goes through the universal iteration helper.
fn for_loop(
    target: &ast::Expr,
    iter: &ast::Expr,
    body: &[ast::Stmt],
    orelse: &[ast::Stmt],
    is_async: bool,
    ctx: &mut TransformContext,
) -> Result<String> {
    if !orelse.is_empty() {
        bail!("for/else has no target equivalent");
    }
    let pad = ctx.pad();

    if !is_async {
        if let Some(text) = range_loop(target, iter, body, ctx)? {
            return Ok(text);
        }
    }

    let head = loop_iterable(iter, is_async, ctx)?;
    ctx.push_scope();
    let pattern = binding_pattern(target, ctx)?;
    let inner = indented_body(body, ctx)?;
    ctx.pop_scope();
    let awaited = if is_async { "await " } else { "" };
    Ok(format!(
        "{pad}for {awaited}(const {pattern} of {head}) {{\n{inner}{pad}}}\n"
    ))
}

fn loop_iterable(iter: &ast::Expr, is_async: bool, ctx: &mut TransformContext) -> Result<String> {
    if let ast::Expr::Call(call) = iter {
        // Index pairing and parallel iteration keep their helper shape.
        if let ast::Expr::Name(func) = &*call.func {
            let id = func.id.as_str();
            if (id == "enumerate" || id == "zip") && !ctx.is_declared(id) {
                let helper = ctx.runtime(id);
                let args = call_args(&call.args, &call.keywords, true, ctx)?;
                return Ok(format!("{helper}({args})"));
            }
        }
        // Dict pairing iterates entries directly.
        if let ast::Expr::Attribute(attr) = &*call.func {
            if attr.attr.as_str() == "items" && call.args.is_empty() && call.keywords.is_empty() {
                let object = operand(&attr.value, ctx)?;
                return Ok(format!("Object.entries({object})"));
            }
        }
    }

    if is_async {
        // The target's async iteration protocol accepts async iterables
        // natively.
        return transform_expr(iter, ctx);
    }
    let helper = ctx.runtime("iter");
    let value = transform_expr(iter, ctx)?;
    Ok(format!("{helper}({value})"))
}

/// `for x in range(...)` with a statically known direction becomes a
/// counting loop; dynamic steps fall back to the range helper.
fn range_loop(
    target: &ast::Expr,
    iter: &ast::Expr,
    body: &[ast::Stmt],
    ctx: &mut TransformContext,
) -> Result<Option<String>> {
    let ast::Expr::Name(var) = target else {
        return Ok(None);
    };
    let ast::Expr::Call(call) = iter else {
        return Ok(None);
    };
    let ast::Expr::Name(func) = &*call.func else {
        return Ok(None);
    };
    if func.id.as_str() != "range" || ctx.is_declared("range") || !call.keywords.is_empty() {
        return Ok(None);
    }

    let (start_expr, stop_expr, step) = match call.args.as_slice() {
        [stop] => (None, stop, None),
        [start, stop] => (Some(start), stop, None),
        [start, stop, step] => {
            let Some(literal) = int_step(step) else {
                // Dynamic step: direction unknown until runtime.
                return Ok(None);
            };
            (Some(start), stop, Some(literal))
        }
        _ => return Ok(None),
    };

    let name = var.id.as_str();
    let pad = ctx.pad();
    let mut out = String::new();

    // `range()` evaluates its bounds once, but the loop condition re-reads
    // the stop every iteration; anything that could change between
    // iterations is captured before the loop.
    let start = match start_expr {
        None => "0".to_string(),
        Some(expr) => range_bound(expr, body, "start", &mut out, &pad, ctx)?,
    };
    let stop = range_bound(stop_expr, body, "stop", &mut out, &pad, ctx)?;

    // Rebinding the loop variable in the body must not disturb the
    // iteration, so the count then runs on a hidden counter.
    let rebinds = block_assigns(body, name);
    let counter = if rebinds {
        let temp = ctx.fresh("i");
        ctx.declare(&temp);
        temp
    } else {
        name.to_string()
    };

    let (cmp, update) = match step {
        None => ("<", format!("{counter} += 1")),
        Some(step) if step > 0 => ("<", format!("{counter} += {step}")),
        Some(step) => (">", format!("{counter} -= {}", -step)),
    };

    ctx.push_scope();
    ctx.declare(name);
    let mut inner = String::new();
    if rebinds {
        ctx.indent();
        inner.push_str(&format!("{}let {name} = {counter};\n", ctx.pad()));
        ctx.dedent();
    }
    inner.push_str(&indented_body(body, ctx)?);
    ctx.pop_scope();
    out.push_str(&format!(
        "{pad}for (let {counter} = {start}; {counter} {cmp} {stop}; {update}) {{\n{inner}{pad}}}\n"
    ));
    Ok(Some(out))
}

/// Render one `range()` bound, capturing it in a `const` temporary unless
/// it is an integer literal or a name the body never rebinds.
fn range_bound(
    expr: &ast::Expr,
    body: &[ast::Stmt],
    prefix: &str,
    out: &mut String,
    pad: &str,
    ctx: &mut TransformContext,
) -> Result<String> {
    if literal_bound(expr) {
        return transform_expr(expr, ctx);
    }
    if let ast::Expr::Name(n) = expr {
        if !block_assigns(body, n.id.as_str()) {
            return transform_expr(expr, ctx);
        }
    }
    let text = transform_expr(expr, ctx)?;
    let temp = ctx.fresh(prefix);
    ctx.declare(&temp);
    out.push_str(&format!("{pad}const {temp} = {text};\n"));
    Ok(temp)
}

fn literal_bound(expr: &ast::Expr) -> bool {
    match expr {
        ast::Expr::Constant(c) => matches!(c.value, ast::Constant::Int(_)),
        ast::Expr::UnaryOp(u) if matches!(u.op, ast::UnaryOp::USub) => literal_bound(&u.operand),
        _ => false,
    }
}

/// Whether any statement in the block rebinds `name`; nested functions
/// own their bindings and are skipped.
fn block_assigns(body: &[ast::Stmt], name: &str) -> bool {
    body.iter().any(|stmt| stmt_assigns(stmt, name))
}

fn stmt_assigns(stmt: &ast::Stmt, name: &str) -> bool {
    match stmt {
        ast::Stmt::FunctionDef(_) | ast::Stmt::AsyncFunctionDef(_) | ast::Stmt::ClassDef(_) => {
            false
        }
        ast::Stmt::Assign(s) => s.targets.iter().any(|t| target_binds(t, name)),
        ast::Stmt::AugAssign(s) => target_binds(&s.target, name),
        ast::Stmt::AnnAssign(s) => target_binds(&s.target, name),
        ast::Stmt::If(s) => block_assigns(&s.body, name) || block_assigns(&s.orelse, name),
        ast::Stmt::While(s) => block_assigns(&s.body, name) || block_assigns(&s.orelse, name),
        ast::Stmt::For(s) => {
            target_binds(&s.target, name)
                || block_assigns(&s.body, name)
                || block_assigns(&s.orelse, name)
        }
        ast::Stmt::AsyncFor(s) => {
            target_binds(&s.target, name)
                || block_assigns(&s.body, name)
                || block_assigns(&s.orelse, name)
        }
        ast::Stmt::With(s) => {
            s.items
                .iter()
                .any(|i| i.optional_vars.as_deref().is_some_and(|v| target_binds(v, name)))
                || block_assigns(&s.body, name)
        }
        ast::Stmt::AsyncWith(s) => {
            s.items
                .iter()
                .any(|i| i.optional_vars.as_deref().is_some_and(|v| target_binds(v, name)))
                || block_assigns(&s.body, name)
        }
        ast::Stmt::Try(s) => {
            block_assigns(&s.body, name)
                || block_assigns(&s.orelse, name)
                || block_assigns(&s.finalbody, name)
                || s.handlers.iter().any(|h| {
                    let ast::ExceptHandler::ExceptHandler(h) = h;
                    block_assigns(&h.body, name)
                })
        }
        ast::Stmt::Match(s) => s.cases.iter().any(|c| block_assigns(&c.body, name)),
        _ => false,
    }
}

fn target_binds(target: &ast::Expr, name: &str) -> bool {
    match target {
        ast::Expr::Name(n) => n.id.as_str() == name,
        ast::Expr::Tuple(t) => t.elts.iter().any(|e| target_binds(e, name)),
        ast::Expr::List(l) => l.elts.iter().any(|e| target_binds(e, name)),
        ast::Expr::Starred(s) => target_binds(&s.value, name),
        _ => false,
    }
}

/// A literal (possibly negated) nonzero integer step.
fn int_step(expr: &ast::Expr) -> Option<i64> {
    match expr {
        ast::Expr::Constant(c) => match &c.value {
            ast::Constant::Int(i) => i.to_string().parse::<i64>().ok().filter(|&v| v != 0),
            _ => None,
        },
        ast::Expr::UnaryOp(u) if matches!(u.op, ast::UnaryOp::USub) => {
            int_step(&u.operand).map(|v| -v)
        }
        _ => None,
    }
}

// --- with ----------------------------------------------------------------

/// `with expr as x: body` lowers to acquire/try/finally with the runtime
/// disposal helper; multiple managers nest left-to-right.
fn with_block(
    items: &[ast::WithItem],
    body: &[ast::Stmt],
    is_async: bool,
    ctx: &mut TransformContext,
) -> Result<String> {
    let item = &items[0];
    let value = transform_expr(&item.context_expr, ctx)?;
    let name = match &item.optional_vars {
        Some(vars) => match &**vars {
            ast::Expr::Name(n) => {
                ctx.declare(n.id.as_str());
                n.id.as_str().to_string()
            }
            other => bail!("unsupported context-manager target: {other:?}"),
        },
        None => {
            let fresh = ctx.fresh("cm");
            ctx.declare(&fresh);
            fresh
        }
    };

    let pad = ctx.pad();
    let mut out = format!("{pad}const {name} = {value};\n{pad}try {{\n");

    ctx.indent();
    if items.len() > 1 {
        out.push_str(&with_block(&items[1..], body, is_async, ctx)?);
    } else {
        out.push_str(&transform_body(body, ctx)?);
    }
    let helper = ctx.runtime("dispose");
    let awaited = if is_async { "await " } else { "" };
    let inner_pad = ctx.pad();
    ctx.dedent();

    out.push_str(&format!(
        "{pad}}} finally {{\n{inner_pad}{awaited}{helper}({name});\n{pad}}}\n"
    ));
    Ok(out)
}

// --- match ---------------------------------------------------------------

/// Literal/wildcard matching lowers structurally to a switch.
fn match_stmt(s: &ast::StmtMatch, ctx: &mut TransformContext) -> Result<String> {
    let subject = transform_expr(&s.subject, ctx)?;
    let pad = ctx.pad();
    let mut out = format!("{pad}switch ({subject}) {{\n");

    ctx.indent();
    for case in &s.cases {
        if case.guard.is_some() {
            bail!("match guards are not supported");
        }
        let case_pad = ctx.pad();
        let labels = case_labels(&case.pattern, ctx)?;
        let is_default = labels.is_empty();
        if is_default {
            out.push_str(&format!("{case_pad}default: {{\n"));
        } else {
            for label in &labels {
                out.push_str(&format!("{case_pad}case {label}:\n"));
            }
            // Re-open as a block so case-local declarations stay scoped.
            out.pop();
            out.push_str(" {\n");
        }

        let terminal = matches!(
            case.body.last(),
            Some(
                ast::Stmt::Return(_)
                    | ast::Stmt::Raise(_)
                    | ast::Stmt::Break(_)
                    | ast::Stmt::Continue(_)
            )
        );
        ctx.indent();
        out.push_str(&transform_body(&case.body, ctx)?);
        if !is_default && !terminal {
            out.push_str(&format!("{}break;\n", ctx.pad()));
        }
        ctx.dedent();
        out.push_str(&format!("{case_pad}}}\n"));
    }
    ctx.dedent();

    out.push_str(&format!("{pad}}}\n"));
    Ok(out)
}

/// Labels for one case; an empty list means the wildcard/default arm.
fn case_labels(pattern: &ast::Pattern, ctx: &mut TransformContext) -> Result<Vec<String>> {
    match pattern {
        ast::Pattern::MatchValue(p) => Ok(vec![transform_expr(&p.value, ctx)?]),
        ast::Pattern::MatchSingleton(p) => Ok(vec![crate::expr::constant(&p.value)?]),
        ast::Pattern::MatchAs(p) if p.pattern.is_none() && p.name.is_none() => Ok(Vec::new()),
        ast::Pattern::MatchOr(p) => {
            let mut labels = Vec::new();
            for sub in &p.patterns {
                labels.extend(case_labels(sub, ctx)?);
            }
            Ok(labels)
        }
        other => bail!("unsupported match pattern: {other:?}"),
    }
}

// --- exceptions ----------------------------------------------------------

fn raise(s: &ast::StmtRaise, ctx: &mut TransformContext) -> Result<String> {
    let pad = ctx.pad();
    let Some(exc) = &s.exc else {
        // Bare raise rethrows the nearest catch parameter.
        let Some(param) = ctx.current_catch() else {
            bail!("bare raise outside an except block");
        };
        return Ok(format!("{pad}throw {param};\n"));
    };

    let text = match &**exc {
        ast::Expr::Call(call) => {
            if let ast::Expr::Name(func) = &*call.func {
                if is_builtin_exception(func.id.as_str()) {
                    return Ok(format!(
                        "{pad}throw new Error({});\n",
                        error_message(&call.args, ctx)?
                    ));
                }
            }
            let callee = operand(&call.func, ctx)?;
            let args = call_args(&call.args, &call.keywords, false, ctx)?;
            format!("new {callee}({args})")
        }
        ast::Expr::Name(n) if is_builtin_exception(n.id.as_str()) => {
            format!("new Error({})", crate::expr::string_literal(n.id.as_str()))
        }
        ast::Expr::Name(n) => format!("new {}()", n.id.as_str()),
        other => transform_expr(other, ctx)?,
    };
    Ok(format!("{pad}throw {text};\n"))
}

/// Built-in exception arguments collapse into the generic error message.
fn error_message(args: &[ast::Expr], ctx: &mut TransformContext) -> Result<String> {
    match args {
        [] => Ok(String::new()),
        [single] => transform_expr(single, ctx),
        many => {
            let parts = many
                .iter()
                .map(|a| transform_expr(a, ctx))
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("String([{}])", parts.join(", ")))
        }
    }
}

fn try_stmt(s: &ast::StmtTry, ctx: &mut TransformContext) -> Result<String> {
    if !s.orelse.is_empty() {
        bail!("try/else has no target equivalent");
    }
    if s.handlers.len() > 1 {
        bail!("multiple except clauses are not supported");
    }

    let pad = ctx.pad();
    let body = indented_body(&s.body, ctx)?;
    let mut out = format!("{pad}try {{\n{body}{pad}}}");

    if let Some(ast::ExceptHandler::ExceptHandler(handler)) = s.handlers.first() {
        // The exception filter is dropped; only the binding survives.
        let param = match &handler.name {
            Some(name) => Some(name.as_str().to_string()),
            None if body_rethrows(&handler.body) => Some("_err".to_string()),
            None => None,
        };
        match &param {
            Some(param) => {
                ctx.push_catch(param.clone());
                let handler_body = indented_body(&handler.body, ctx)?;
                ctx.pop_catch();
                out.push_str(&format!(" catch ({param}) {{\n{handler_body}{pad}}}"));
            }
            None => {
                let handler_body = indented_body(&handler.body, ctx)?;
                out.push_str(&format!(" catch {{\n{handler_body}{pad}}}"));
            }
        }
    }

    if !s.finalbody.is_empty() {
        let final_body = indented_body(&s.finalbody, ctx)?;
        out.push_str(&format!(" finally {{\n{final_body}{pad}}}"));
    }

    out.push('\n');
    Ok(out)
}

/// Whether an except body contains a bare `raise` (needing the synthesized
/// catch parameter), without crossing a nested try.
fn body_rethrows(body: &[ast::Stmt]) -> bool {
    body.iter().any(|stmt| match stmt {
        ast::Stmt::Raise(r) => r.exc.is_none(),
        ast::Stmt::If(s) => body_rethrows(&s.body) || body_rethrows(&s.orelse),
        ast::Stmt::For(s) => body_rethrows(&s.body),
        ast::Stmt::While(s) => body_rethrows(&s.body),
        ast::Stmt::With(s) => body_rethrows(&s.body),
        _ => false,
    })
}

// --- imports -------------------------------------------------------------

fn import(s: &ast::StmtImport, ctx: &mut TransformContext) -> Result<String> {
    let mut out = String::new();
    for alias in &s.names {
        let path = alias.name.as_str();
        match stdlib_module(path) {
            Some(StdlibModule::Marker) => continue,
            Some(StdlibModule::Namespaced(ns)) => {
                let local = alias.asname.as_ref().map(|a| a.as_str()).unwrap_or(ns);
                ctx.bind(local, RuntimeBinding::Namespace(ns));
                continue;
            }
            Some(StdlibModule::Path(module)) => {
                let local = local_module_name(alias);
                ctx.bind(local, RuntimeBinding::PathModule(module));
                continue;
            }
            None => {}
        }

        let local = local_module_name(alias);
        ctx.declare(local);
        let js_path = path.replace('.', "/");
        out.push_str(&emit_or_hoist(
            format!("import * as {local} from \"{js_path}\";"),
            ctx,
        ));
    }
    Ok(out)
}

fn local_module_name(alias: &ast::Alias) -> &str {
    match &alias.asname {
        Some(asname) => asname.as_str(),
        // A dotted import binds through its last segment here.
        None => alias
            .name
            .as_str()
            .rsplit('.')
            .next()
            .unwrap_or(alias.name.as_str()),
    }
}

fn import_from(s: &ast::StmtImportFrom, ctx: &mut TransformContext) -> Result<String> {
    let level = s.level.as_ref().map(|l| l.to_u32()).unwrap_or(0);
    let module = s.module.as_ref().map(|m| m.as_str());

    // Absolute imports of recognized standard-library modules bind runtime
    // members; the import itself vanishes.
    if level == 0 {
        if let Some(kind) = module.and_then(stdlib_module) {
            for alias in &s.names {
                let member = alias.name.as_str();
                let local = alias.asname.as_ref().map(|a| a.as_str()).unwrap_or(member);
                match kind {
                    StdlibModule::Marker => {}
                    StdlibModule::Namespaced(ns) => {
                        if member == "*" {
                            ctx.bind(ns, RuntimeBinding::Namespace(ns));
                        } else {
                            ctx.bind(
                                local,
                                RuntimeBinding::NamespaceMember(ns, member.to_string()),
                            );
                        }
                    }
                    StdlibModule::Path(m) => {
                        if member == "*" {
                            ctx.bind(m, RuntimeBinding::PathModule(m));
                        } else {
                            ctx.bind(local, RuntimeBinding::PathMember(m, member.to_string()));
                        }
                    }
                }
            }
            return Ok(String::new());
        }
    }

    // The target module system has no dotted relative spelling; dot count
    // resolves to a path prefix.
    let prefix = match level {
        0 => String::new(),
        1 => "./".to_string(),
        n => "../".repeat(n as usize - 1),
    };

    let mut out = String::new();
    match module {
        Some(module) => {
            let js_path = format!("{prefix}{}", module.replace('.', "/"));
            if s.names.len() == 1 && s.names[0].name.as_str() == "*" {
                // No runtime wildcard re-export: alias the namespace by the
                // last path segment.
                let local = module.rsplit('.').next().unwrap_or(module);
                ctx.declare(local);
                out.push_str(&emit_or_hoist(
                    format!("import * as {local} from \"{js_path}\";"),
                    ctx,
                ));
            } else {
                let mut specs = Vec::new();
                for alias in &s.names {
                    let name = alias.name.as_str();
                    match &alias.asname {
                        Some(asname) => {
                            ctx.declare(asname.as_str());
                            specs.push(format!("{name} as {}", asname.as_str()));
                        }
                        None => {
                            ctx.declare(name);
                            specs.push(name.to_string());
                        }
                    }
                }
                out.push_str(&emit_or_hoist(
                    format!("import {{ {} }} from \"{js_path}\";", specs.join(", ")),
                    ctx,
                ));
            }
        }
        None => {
            // `from . import sibling` pulls whole modules.
            for alias in &s.names {
                let local = local_module_name(alias);
                ctx.declare(local);
                out.push_str(&emit_or_hoist(
                    format!("import * as {local} from \"{prefix}{}\";", alias.name.as_str()),
                    ctx,
                ));
            }
        }
    }
    Ok(out)
}

/// Top-level imports emit in place; nested ones hoist to the top of the
/// output unit, leaving a no-op marker at the original site.
fn emit_or_hoist(line: String, ctx: &mut TransformContext) -> String {
    if ctx.at_module_level() {
        format!("{line}\n")
    } else {
        ctx.hoist_import(line);
        format!("{}// import hoisted to module top\n", ctx.pad())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TransformOptions;
    use crate::names::NameMap;
    use pt_parser::parse_python;

    fn ts(source: &str) -> String {
        let parsed = parse_python(source, "stmt.py").unwrap();
        let names = NameMap::new();
        let options = TransformOptions::default();
        let mut ctx = TransformContext::new(&names, &options);
        transform_body(&parsed.body, &mut ctx).unwrap()
    }

    fn ts_err(source: &str) -> String {
        let parsed = parse_python(source, "stmt.py").unwrap();
        let names = NameMap::new();
        let options = TransformOptions::default();
        let mut ctx = TransformContext::new(&names, &options);
        transform_body(&parsed.body, &mut ctx).unwrap_err().to_string()
    }

    #[test]
    fn first_assignment_declares_later_ones_do_not() {
        assert_eq!(ts("x = 1\nx = 2\n"), "let x = 1;\nx = 2;\n");
    }

    #[test]
    fn swap_is_a_single_destructuring() {
        let out = ts("a = 1\nb = 2\na, b = b, a\n");
        assert_eq!(out, "let a = 1;\nlet b = 2;\n[a, b] = [b, a];\n");
    }

    #[test]
    fn fresh_tuple_target_declares_in_one_pattern() {
        assert_eq!(ts("a, b = pair()\n"), "let [a, b] = pair();\n");
    }

    #[test]
    fn mixed_tuple_target_predeclares_new_names() {
        let out = ts("a = 1\na, b = pair()\n");
        assert_eq!(out, "let a = 1;\nlet b;\n[a, b] = pair();\n");
    }

    #[test]
    fn augmented_assignment_through_divergent_operator() {
        let out = ts("x = 7\nx //= 2\n");
        assert_eq!(out, "let x = 7;\nx = floorDiv(x, 2);\n");
    }

    #[test]
    fn range_loop_is_a_counting_loop() {
        let out = ts("for i in range(3):\n    print(i)\n");
        assert_eq!(
            out,
            "for (let i = 0; i < 3; i += 1) {\n  console.log(i);\n}\n"
        );
    }

    #[test]
    fn negative_range_step_counts_down() {
        let out = ts("for i in range(10, 0, -2):\n    print(i)\n");
        assert_eq!(
            out,
            "for (let i = 10; i > 0; i -= 2) {\n  console.log(i);\n}\n"
        );
    }

    #[test]
    fn enumerate_loop_destructures_pairs() {
        let out = ts("for i, x in enumerate(xs):\n    print(i)\n");
        assert_eq!(
            out,
            "for (const [i, x] of enumerate(xs)) {\n  console.log(i);\n}\n"
        );
    }

    #[test]
    fn dict_items_loop_iterates_entries() {
        let out = ts("for k, v in d.items():\n    print(k)\n");
        assert_eq!(
            out,
            "for (const [k, v] of Object.entries(d)) {\n  console.log(k);\n}\n"
        );
    }

    #[test]
    fn generic_iterables_go_through_the_helper() {
        let out = ts("for x in stream:\n    print(x)\n");
        assert_eq!(out, "for (const x of iter(stream)) {\n  console.log(x);\n}\n");
    }

    #[test]
    fn elif_chains_fold_into_else_if() {
        let out = ts("if a:\n    x = 1\nelif b:\n    x = 2\nelse:\n    x = 3\n");
        assert_eq!(
            out,
            "if (a) {\n  let x = 1;\n} else if (b) {\n  let x = 2;\n} else {\n  let x = 3;\n}\n"
        );
    }

    #[test]
    fn with_lowers_to_try_finally_dispose() {
        let out = ts("with open(p) as f:\n    read(f)\n");
        assert_eq!(
            out,
            "const f = open(p);\ntry {\n  read(f);\n} finally {\n  dispose(f);\n}\n"
        );
    }

    #[test]
    fn try_keeps_the_bound_name_and_drops_the_filter() {
        let out = ts("try:\n    risky()\nexcept ValueError as e:\n    print(e)\n");
        assert_eq!(
            out,
            "try {\n  risky();\n} catch (e) {\n  console.log(e);\n}\n"
        );
    }

    #[test]
    fn bare_except_with_rethrow_synthesizes_a_parameter() {
        let out = ts("try:\n    risky()\nexcept:\n    raise\n");
        assert_eq!(out, "try {\n  risky();\n} catch (_err) {\n  throw _err;\n}\n");
    }

    #[test]
    fn bare_except_without_reference_binds_nothing() {
        let out = ts("try:\n    risky()\nexcept:\n    pass\n");
        assert_eq!(out, "try {\n  risky();\n} catch {\n}\n");
    }

    #[test]
    fn builtin_raise_becomes_generic_error() {
        let out = ts("raise ValueError(\"bad\")\n");
        assert_eq!(out, "throw new Error(\"bad\");\n");
    }

    #[test]
    fn user_raise_keeps_the_identifier() {
        let out = ts("raise AppError(\"bad\")\n");
        assert_eq!(out, "throw new AppError(\"bad\");\n");
    }

    #[test]
    fn generator_functions_get_a_star() {
        let out = ts("def gen():\n    yield 1\n");
        assert!(out.starts_with("function* gen() {\n"), "got: {out}");
    }

    #[test]
    fn async_functions_wrap_returns_in_promise() {
        let out = ts("async def f() -> int:\n    return 1\n");
        assert!(
            out.starts_with("async function f(): Promise<number> {\n"),
            "got: {out}"
        );
    }

    #[test]
    fn docstring_is_extracted_not_emitted() {
        let out = ts("def f():\n    \"Say hi.\"\n    return 1\n");
        assert_eq!(
            out,
            "/**\n * Say hi.\n */\nfunction f() {\n  return 1;\n}\n"
        );
    }

    #[test]
    fn decorators_wrap_innermost_first() {
        let out = ts("@a\n@b\ndef f():\n    pass\n");
        assert_eq!(out, "function f() {\n}\nf = a(b(f));\n");
    }

    #[test]
    fn variadic_parameters() {
        let out = ts("def f(a, *rest):\n    pass\n");
        assert!(out.contains("function f(a, ...rest: any[]) {"), "got: {out}");
    }

    #[test]
    fn kwargs_become_an_options_parameter() {
        let out = ts("def f(a, **opts):\n    pass\n");
        assert!(
            out.contains("function f(a, opts: Record<string, any> = {}) {"),
            "got: {out}"
        );
    }

    #[test]
    fn nested_import_is_hoisted_with_marker() {
        let parsed = parse_python("def f():\n    import helpers\n    return helpers.go()\n", "t.py")
            .unwrap();
        let names = NameMap::new();
        let options = TransformOptions::default();
        let mut ctx = TransformContext::new(&names, &options);
        let text = transform_body(&parsed.body, &mut ctx).unwrap();
        let result = ctx.finish(text);
        assert_eq!(
            result.hoisted_imports,
            ["import * as helpers from \"helpers\";"]
        );
        assert!(result.text.contains("// import hoisted to module top"));
        assert!(!result.text.contains("import * as helpers"));
    }

    #[test]
    fn relative_imports_resolve_dot_counts() {
        assert_eq!(
            ts("from ..util import helper\n"),
            "import { helper } from \"../util\";\n"
        );
        assert_eq!(
            ts("from .sibling import thing\n"),
            "import { thing } from \"./sibling\";\n"
        );
    }

    #[test]
    fn wildcard_import_aliases_the_namespace() {
        assert_eq!(
            ts("from pkg.mod import *\n"),
            "import * as mod from \"pkg/mod\";\n"
        );
    }

    #[test]
    fn stdlib_imports_bind_runtime_members() {
        let parsed =
            parse_python("import math\nfrom itertools import chain\nx = math.floor(y)\nz = chain(a, b)\n", "t.py")
                .unwrap();
        let names = NameMap::new();
        let options = TransformOptions::default();
        let mut ctx = TransformContext::new(&names, &options);
        let text = transform_body(&parsed.body, &mut ctx).unwrap();
        let result = ctx.finish(text);
        assert_eq!(result.text, "let x = math.floor(y);\nlet z = chain(a, b);\n");
        let symbols: Vec<_> = result.runtime_symbols.iter().cloned().collect();
        assert_eq!(symbols, ["itertools/chain", "math.floor"]);
    }

    #[test]
    fn match_lowers_to_switch() {
        let out = ts("match x:\n    case 1:\n        a()\n    case _:\n        b()\n");
        assert_eq!(
            out,
            "switch (x) {\n  case 1: {\n    a();\n    break;\n  }\n  default: {\n    b();\n  }\n}\n"
        );
    }

    #[test]
    fn loop_else_is_translation_fatal() {
        let err = ts_err("for x in xs:\n    pass\nelse:\n    pass\n");
        assert!(err.contains("for/else"), "got: {err}");
    }

    #[test]
    fn multiple_except_clauses_are_fatal() {
        let err =
            ts_err("try:\n    pass\nexcept ValueError:\n    pass\nexcept KeyError:\n    pass\n");
        assert!(err.contains("multiple except"), "got: {err}");
    }

    #[test]
    fn assert_lowers_to_the_runtime() {
        assert_eq!(ts("assert x > 0, \"positive\"\n"), "assert(x > 0, \"positive\");\n");
    }

    #[test]
    fn global_suppresses_redeclaration() {
        let out = ts("def f():\n    global counter\n    counter = 1\n");
        assert!(out.contains("  counter = 1;\n"), "got: {out}");
        assert!(!out.contains("let counter"), "got: {out}");
    }

    #[test]
    fn bound_members_used_as_values_requalify() {
        let parsed = parse_python(
            "from math import floor\nfrom itertools import chain\ng = floor\nf = chain\n",
            "t.py",
        )
        .unwrap();
        let names = NameMap::new();
        let options = TransformOptions::default();
        let mut ctx = TransformContext::new(&names, &options);
        let text = transform_body(&parsed.body, &mut ctx).unwrap();
        let result = ctx.finish(text);
        assert_eq!(result.text, "let g = math.floor;\nlet f = chain;\n");
        let symbols: Vec<_> = result.runtime_symbols.iter().cloned().collect();
        assert_eq!(symbols, ["itertools/chain", "math.floor"]);
    }

    #[test]
    fn computed_range_stop_is_captured_once() {
        let out = ts("for i in range(len(xs)):\n    xs.append(0)\n");
        assert_eq!(
            out,
            "const _stop1 = len(xs);\nfor (let i = 0; i < _stop1; i += 1) {\n  xs.push(0);\n}\n"
        );
    }

    #[test]
    fn stable_name_bounds_stay_inline() {
        let out = ts("def f(n):\n    for i in range(n):\n        print(i)\n");
        assert!(out.contains("for (let i = 0; i < n; i += 1) {"), "got: {out}");
    }

    #[test]
    fn rebound_loop_variable_runs_on_a_hidden_counter() {
        let out = ts("for i in range(3):\n    i = i + 1\n");
        assert_eq!(
            out,
            "for (let _i1 = 0; _i1 < 3; _i1 += 1) {\n  let i = _i1;\n  i = i + 1;\n}\n"
        );
    }

    #[test]
    fn keyword_only_parameters_destructure_an_options_object() {
        let out = ts("def f(a: int, *, flag: bool = False) -> None:\n    pass\n");
        assert!(
            out.contains("function f(a: number, { flag = false }: { flag?: boolean } = {}): void {"),
            "got: {out}"
        );
    }

    #[test]
    fn keywords_reach_a_callee_with_an_options_object() {
        let out = ts("def f(*, flag=False):\n    pass\nf(flag=True)\n");
        assert!(out.contains("f({ flag: true });"), "got: {out}");
    }

    #[test]
    fn keywords_to_a_plain_function_are_fatal() {
        let err = ts_err("def f(a, b=2):\n    pass\nf(1, b=3)\n");
        assert!(err.contains("keyword arguments"), "got: {err}");
    }

    #[test]
    fn shadowed_print_is_not_console_log() {
        let out = ts("print = log\nprint(1)\n");
        assert_eq!(out, "let print = log;\nprint(1);\n");
    }

    #[test]
    fn yield_inside_assert_marks_a_generator() {
        let out = ts("def f():\n    assert (yield 1)\n");
        assert!(out.starts_with("function* f() {"), "got: {out}");
    }
}
