//! AST-walking helpers shared by the scope analyzer: collecting the names an
//! assignment target binds, the names embedded in a module's `__all__`
//! export list, and the pre-pass used to seed a hoisted frame's bound set
//! before any reference in that frame is checked.

use crate::ast::*;
use std::collections::HashSet;

// ── assignment targets ────────────────────────────────────────────────────────

/// Collect every leaf identifier an assignment target *binds* (as opposed to
/// reads). `Attribute`/`Subscript` targets bind nothing themselves — see
/// [`target_read_exprs`] for the names they read.
pub fn flatten_target_names<'src>(target: &AssignTarget<'src>, out: &mut Vec<(&'src str, Offset)>) {
    match target {
        AssignTarget::Name(n, off) => out.push((n, *off)),
        AssignTarget::Tuple(items) | AssignTarget::List(items) => {
            for item in items {
                flatten_target_names(item, out);
            }
        }
        AssignTarget::Starred(inner) => flatten_target_names(inner, out),
        AssignTarget::Attribute(..) | AssignTarget::Subscript(..) => {}
    }
}

/// Collect the sub-expressions an `Attribute`/`Subscript` assignment target
/// reads (e.g. `a` and `b` in `a[b] = …`, or `a.b` in `a.b.y = …`). Plain
/// `Name`/`Tuple`/`List`/`Starred` targets read nothing.
pub fn target_read_exprs<'src, 'a>(target: &'a AssignTarget<'src>, out: &mut Vec<&'a Expr<'src>>) {
    match target {
        AssignTarget::Attribute(base, _) => out.push(base),
        AssignTarget::Subscript(base, index) => {
            out.push(base);
            out.push(index);
        }
        AssignTarget::Name(..) => {}
        AssignTarget::Tuple(items) | AssignTarget::List(items) => {
            for item in items {
                target_read_exprs(item, out);
            }
        }
        AssignTarget::Starred(inner) => target_read_exprs(inner, out),
    }
}

fn flatten_into<'src>(target: &AssignTarget<'src>, bound: &mut HashSet<&'src str>) {
    let mut names = Vec::new();
    flatten_target_names(target, &mut names);
    bound.extend(names.into_iter().map(|(n, _)| n));
}

// ── __all__ extraction ────────────────────────────────────────────────────────

/// Collect the string literals assigned to a module-level `__all__` list or
/// tuple, treating every exported name as "used" for unused-import purposes.
pub fn collect_dunder_all(stmts: &[Stmt<'_>]) -> HashSet<String> {
    let mut out = HashSet::new();
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Assign { targets, value } => {
                if targets
                    .iter()
                    .any(|t| matches!(t, AssignTarget::Name("__all__", _)))
                {
                    collect_string_list(value, &mut out);
                }
            }
            StmtKind::AugAssign {
                target: AssignTarget::Name("__all__", _),
                value,
            } => collect_string_list(value, &mut out),
            _ => {}
        }
    }
    out
}

fn collect_string_list(expr: &Expr<'_>, out: &mut HashSet<String>) {
    match &expr.kind {
        ExprKind::List(items) | ExprKind::Tuple(items) | ExprKind::Set(items) => {
            for item in items {
                if let ExprKind::StringLit(s) = &item.kind {
                    out.insert(s.clone());
                }
            }
        }
        ExprKind::StringLit(s) => {
            out.insert(s.clone());
        }
        _ => {}
    }
}

// ── hoisted-frame seeding ──────────────────────────────────────────────────────

/// Accumulated result of a hoisting pre-pass over a function/lambda/
/// comprehension body: every name that frame's `bound` set must contain
/// before any reference inside it is checked.
#[derive(Default)]
pub struct HoistedNames<'src> {
    pub bound: HashSet<&'src str>,
    pub global_decls: HashSet<&'src str>,
    pub nonlocal_decls: HashSet<&'src str>,
}

#[derive(Clone, Copy)]
pub struct ScanOptions {
    pub list_comprehension_leak: bool,
}

/// Shallow statement-tree walk: descends into `if`/`while`/`for`/`with`/`try`/
/// `match` bodies (control flow does not introduce a new frame) but stops at
/// the boundary of a nested `def`/`class`/lambda/comprehension, since those
/// own their own frame and their own hoisting pass.
///
/// Decorator, default-value, base-class, and annotation expressions on a
/// nested `def`/`class` run in *this* frame at definition time, so they are
/// scanned for leak/walrus candidates even though the nested body is skipped.
pub fn collect_hoisted_names<'src>(
    stmts: &[Stmt<'src>],
    opts: &ScanOptions,
    out: &mut HoistedNames<'src>,
) {
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Import(aliases) => {
                for a in aliases {
                    out.bound.insert(import_local_name(a));
                }
            }
            StmtKind::ImportFrom { names, .. } => {
                for a in names {
                    if a.name == "*" {
                        continue;
                    }
                    out.bound.insert(a.asname.unwrap_or(a.name));
                }
            }
            StmtKind::FunctionDef(f) => {
                out.bound.insert(f.name);
                for dec in &f.decorators {
                    scan_expr_for_seed(dec, opts, out);
                }
                for e in f.args.enclosing_scope_exprs() {
                    scan_expr_for_seed(e, opts, out);
                }
                if let Some(r) = &f.returns {
                    scan_expr_for_seed(r, opts, out);
                }
            }
            StmtKind::ClassDef(c) => {
                out.bound.insert(c.name);
                for dec in &c.decorators {
                    scan_expr_for_seed(dec, opts, out);
                }
                for b in &c.bases {
                    scan_expr_for_seed(b, opts, out);
                }
                for kw in &c.keywords {
                    scan_expr_for_seed(&kw.value, opts, out);
                }
            }
            StmtKind::Assign { targets, value } => {
                for t in targets {
                    flatten_into(t, &mut out.bound);
                }
                scan_expr_for_seed(value, opts, out);
            }
            StmtKind::AnnAssign {
                target,
                annotation,
                value,
            } => {
                scan_expr_for_seed(annotation, opts, out);
                if let Some(v) = value {
                    flatten_into(target, &mut out.bound);
                    scan_expr_for_seed(v, opts, out);
                }
            }
            StmtKind::AugAssign { target, value } => {
                flatten_into(target, &mut out.bound);
                scan_expr_for_seed(value, opts, out);
            }
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
                ..
            } => {
                flatten_into(target, &mut out.bound);
                scan_expr_for_seed(iter, opts, out);
                collect_hoisted_names(body, opts, out);
                collect_hoisted_names(orelse, opts, out);
            }
            StmtKind::While { test, body, orelse } => {
                scan_expr_for_seed(test, opts, out);
                collect_hoisted_names(body, opts, out);
                collect_hoisted_names(orelse, opts, out);
            }
            StmtKind::If { test, body, orelse } => {
                scan_expr_for_seed(test, opts, out);
                collect_hoisted_names(body, opts, out);
                collect_hoisted_names(orelse, opts, out);
            }
            StmtKind::Return(Some(e)) => scan_expr_for_seed(e, opts, out),
            StmtKind::Return(None) => {}
            StmtKind::Raise { exc, cause } => {
                if let Some(e) = exc {
                    scan_expr_for_seed(e, opts, out);
                }
                if let Some(c) = cause {
                    scan_expr_for_seed(c, opts, out);
                }
            }
            StmtKind::With { items, body, .. } => {
                for item in items {
                    scan_expr_for_seed(&item.context, opts, out);
                    if let Some(t) = &item.target {
                        flatten_into(t, &mut out.bound);
                    }
                }
                collect_hoisted_names(body, opts, out);
            }
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                collect_hoisted_names(body, opts, out);
                for h in handlers {
                    if let Some((n, _)) = h.name {
                        out.bound.insert(n);
                    }
                    if let Some(te) = &h.type_expr {
                        scan_expr_for_seed(te, opts, out);
                    }
                    collect_hoisted_names(&h.body, opts, out);
                }
                collect_hoisted_names(orelse, opts, out);
                collect_hoisted_names(finalbody, opts, out);
            }
            StmtKind::Match { subject, arms } => {
                scan_expr_for_seed(subject, opts, out);
                for arm in arms {
                    for (n, _) in &arm.pattern_captures {
                        out.bound.insert(n);
                    }
                    if let Some(g) = &arm.guard {
                        scan_expr_for_seed(g, opts, out);
                    }
                    collect_hoisted_names(&arm.body, opts, out);
                }
            }
            StmtKind::Global(names) => {
                for n in names {
                    out.bound.insert(n);
                    out.global_decls.insert(n);
                }
            }
            StmtKind::Nonlocal(names) => {
                for n in names {
                    out.bound.insert(n);
                    out.nonlocal_decls.insert(n);
                }
            }
            StmtKind::Delete(exprs) => {
                for e in exprs {
                    scan_expr_for_seed(e, opts, out);
                }
            }
            StmtKind::Assert { test, msg } => {
                scan_expr_for_seed(test, opts, out);
                if let Some(m) = msg {
                    scan_expr_for_seed(m, opts, out);
                }
            }
            StmtKind::Expr(e) => scan_expr_for_seed(e, opts, out),
            StmtKind::Break | StmtKind::Continue | StmtKind::Pass | StmtKind::Other(_) => {}
        }
    }
}

fn import_local_name<'src>(alias: &ImportAlias<'src>) -> &'src str {
    alias
        .asname
        .unwrap_or_else(|| alias.name.split('.').next().unwrap_or(alias.name))
}

/// Recursively scan an expression for the two constructs whose bound names
/// must be known *before* a hoisted frame's references are checked:
/// walrus-operator targets (which bind in the frame where they're written)
/// and, when enabled, a directly-nested list comprehension's iteration
/// variables (which leak into this frame). Does not descend into a lambda
/// body or a nested comprehension's element/later generators — those belong
/// to that construct's own frame.
pub fn scan_expr_for_seed<'src>(expr: &Expr<'src>, opts: &ScanOptions, out: &mut HoistedNames<'src>) {
    match &expr.kind {
        ExprKind::NamedExpr(name, value) => {
            out.bound.insert(name);
            scan_expr_for_seed(value, opts, out);
        }
        ExprKind::Attribute(base, _) => scan_expr_for_seed(base, opts, out),
        ExprKind::Subscript(base, index) => {
            scan_expr_for_seed(base, opts, out);
            scan_expr_for_seed(index, opts, out);
        }
        ExprKind::Call {
            func,
            args,
            keywords,
        } => {
            scan_expr_for_seed(func, opts, out);
            for a in args {
                scan_expr_for_seed(a, opts, out);
            }
            for kw in keywords {
                scan_expr_for_seed(&kw.value, opts, out);
            }
        }
        ExprKind::Operator(items) => {
            for i in items {
                scan_expr_for_seed(i, opts, out);
            }
        }
        ExprKind::IfExp { test, body, orelse } => {
            scan_expr_for_seed(test, opts, out);
            scan_expr_for_seed(body, opts, out);
            scan_expr_for_seed(orelse, opts, out);
        }
        ExprKind::Tuple(items) | ExprKind::List(items) | ExprKind::Set(items) => {
            for i in items {
                scan_expr_for_seed(i, opts, out);
            }
        }
        ExprKind::Dict(pairs) => {
            for (k, v) in pairs {
                if let Some(k) = k {
                    scan_expr_for_seed(k, opts, out);
                }
                scan_expr_for_seed(v, opts, out);
            }
        }
        ExprKind::Starred(inner)
        | ExprKind::Yield(Some(inner))
        | ExprKind::YieldFrom(inner)
        | ExprKind::Await(inner) => {
            scan_expr_for_seed(inner, opts, out);
        }
        ExprKind::Lambda { args, .. } => {
            for e in args.enclosing_scope_exprs() {
                scan_expr_for_seed(e, opts, out);
            }
            // The lambda's body belongs to its own frame — not scanned here.
        }
        ExprKind::ListComp(comp) => {
            if opts.list_comprehension_leak {
                for gen in &comp.generators {
                    flatten_into(&gen.target, &mut out.bound);
                }
            }
            if let Some(first) = comp.generators.first() {
                scan_expr_for_seed(&first.iter, opts, out);
            }
        }
        ExprKind::SetComp(comp) | ExprKind::GeneratorExp(comp) => {
            if let Some(first) = comp.generators.first() {
                scan_expr_for_seed(&first.iter, opts, out);
            }
        }
        ExprKind::DictComp(dc) => {
            if let Some(first) = dc.generators.first() {
                scan_expr_for_seed(&first.iter, opts, out);
            }
        }
        ExprKind::Yield(None)
        | ExprKind::Name(_)
        | ExprKind::BoolLit(_)
        | ExprKind::NoneLit
        | ExprKind::EllipsisLit
        | ExprKind::NumberLit
        | ExprKind::StringLit(_)
        | ExprKind::FString(_)
        | ExprKind::Other(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Expr<'_> {
        Expr {
            offset: 0,
            kind: ExprKind::Name(s),
        }
    }

    #[test]
    fn test_flatten_tuple_target() {
        let target = AssignTarget::Tuple(vec![
            AssignTarget::Name("a", 0),
            AssignTarget::List(vec![AssignTarget::Name("b", 1), AssignTarget::Name("c", 2)]),
        ]);
        let mut out = Vec::new();
        flatten_target_names(&target, &mut out);
        let names: Vec<&str> = out.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_attribute_target_binds_nothing() {
        let target = AssignTarget::Attribute(name("obj"), "attr");
        let mut out = Vec::new();
        flatten_target_names(&target, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_attribute_target_reads_base() {
        let target = AssignTarget::Attribute(name("obj"), "attr");
        let mut out = Vec::new();
        target_read_exprs(&target, &mut out);
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0].kind, ExprKind::Name("obj")));
    }

    #[test]
    fn test_dunder_all_extraction() {
        let stmts = vec![Stmt {
            offset: 0,
            kind: StmtKind::Assign {
                targets: vec![AssignTarget::Name("__all__", 0)],
                value: Expr {
                    offset: 0,
                    kind: ExprKind::List(vec![
                        Expr {
                            offset: 0,
                            kind: ExprKind::StringLit("foo".into()),
                        },
                        Expr {
                            offset: 0,
                            kind: ExprKind::StringLit("bar".into()),
                        },
                    ]),
                },
            },
        }];
        let exported = collect_dunder_all(&stmts);
        assert!(exported.contains("foo"));
        assert!(exported.contains("bar"));
    }

    #[test]
    fn test_walrus_seeds_hoisted_bound() {
        let expr = Expr {
            offset: 0,
            kind: ExprKind::NamedExpr(
                "n",
                Box::new(Expr {
                    offset: 0,
                    kind: ExprKind::NumberLit,
                }),
            ),
        };
        let opts = ScanOptions {
            list_comprehension_leak: true,
        };
        let mut out = HoistedNames::default();
        scan_expr_for_seed(&expr, &opts, &mut out);
        assert!(out.bound.contains("n"));
    }

    #[test]
    fn test_listcomp_leak_seeds_bound_when_enabled() {
        let comp = Comprehension {
            element: name("x"),
            generators: vec![Generator {
                target: AssignTarget::Name("x", 0),
                iter: name("items"),
                ifs: vec![],
                is_async: false,
            }],
        };
        let expr = Expr {
            offset: 0,
            kind: ExprKind::ListComp(Box::new(comp)),
        };
        let opts = ScanOptions {
            list_comprehension_leak: true,
        };
        let mut out = HoistedNames::default();
        scan_expr_for_seed(&expr, &opts, &mut out);
        assert!(out.bound.contains("x"));

        let opts_off = ScanOptions {
            list_comprehension_leak: false,
        };
        let mut out2 = HoistedNames::default();
        scan_expr_for_seed(&expr, &opts_off, &mut out2);
        assert!(!out2.bound.contains("x"));
    }

    #[test]
    fn test_import_local_name_uses_top_package() {
        let alias = ImportAlias {
            name: "a.b.c",
            asname: None,
            offset: 0,
        };
        assert_eq!(import_local_name(&alias), "a");
    }
}
