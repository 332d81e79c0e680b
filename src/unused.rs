//! Unused-import detection: shares the parsed tree with the scope analyzer
//! but asks a different question — not "what's missing" but "what's bound
//! by an import and never read anywhere in the file".
//!
//! This is deliberately not scope-aware: an import whose name is shadowed in
//! one function and read in another still counts as used, since pyflyby's
//! own unused-import scanner treats any textual reference anywhere in the
//! file as evidence the import is wanted.

use std::collections::HashSet;

use crate::ast::*;
use crate::names::collect_dunder_all;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusedImport {
    pub bound_name: String,
    pub offset: Offset,
}

pub fn unused_imports(stmts: &[Stmt<'_>]) -> Vec<UnusedImport> {
    let mut imports = Vec::new();
    collect_imports(stmts, &mut imports);

    let mut used = HashSet::new();
    collect_used_names(stmts, &mut used);

    let dunder_all = collect_dunder_all(stmts);

    imports
        .into_iter()
        .filter(|(name, _)| !used.contains(*name) && !dunder_all.contains(*name))
        .map(|(name, offset)| UnusedImport {
            bound_name: name.to_string(),
            offset,
        })
        .collect()
}

fn collect_imports<'src>(stmts: &[Stmt<'src>], out: &mut Vec<(&'src str, Offset)>) {
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Import(aliases) => {
                for alias in aliases {
                    let name = alias
                        .asname
                        .unwrap_or_else(|| alias.name.split('.').next().unwrap_or(alias.name));
                    out.push((name, alias.offset));
                }
            }
            StmtKind::ImportFrom { names, .. } => {
                for alias in names {
                    if alias.name == "*" {
                        continue;
                    }
                    let name = alias.asname.unwrap_or(alias.name);
                    out.push((name, alias.offset));
                }
            }
            StmtKind::FunctionDef(f) => collect_imports(&f.body, out),
            StmtKind::ClassDef(c) => collect_imports(&c.body, out),
            StmtKind::If { body, orelse, .. } | StmtKind::While { body, orelse, .. } => {
                collect_imports(body, out);
                collect_imports(orelse, out);
            }
            StmtKind::For { body, orelse, .. } => {
                collect_imports(body, out);
                collect_imports(orelse, out);
            }
            StmtKind::With { body, .. } => collect_imports(body, out),
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                collect_imports(body, out);
                for h in handlers {
                    collect_imports(&h.body, out);
                }
                collect_imports(orelse, out);
                collect_imports(finalbody, out);
            }
            StmtKind::Match { arms, .. } => {
                for arm in arms {
                    collect_imports(&arm.body, out);
                }
            }
            _ => {}
        }
    }
}

/// Every identifier textually referenced anywhere in the tree, excluding
/// the import statements that bind them.
fn collect_used_names<'src>(stmts: &[Stmt<'src>], out: &mut HashSet<&'src str>) {
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Import(_) | StmtKind::ImportFrom { .. } => {}
            StmtKind::FunctionDef(f) => {
                for d in &f.decorators {
                    collect_used_in_expr(d, out);
                }
                for e in f.args.enclosing_scope_exprs() {
                    collect_used_in_expr(e, out);
                }
                if let Some(r) = &f.returns {
                    collect_used_in_expr(r, out);
                }
                collect_used_names(&f.body, out);
            }
            StmtKind::ClassDef(c) => {
                for d in &c.decorators {
                    collect_used_in_expr(d, out);
                }
                for b in &c.bases {
                    collect_used_in_expr(b, out);
                }
                for kw in &c.keywords {
                    collect_used_in_expr(&kw.value, out);
                }
                collect_used_names(&c.body, out);
            }
            StmtKind::Assign { targets, value } => {
                collect_used_in_expr(value, out);
                for t in targets {
                    collect_used_in_target(t, out);
                }
            }
            StmtKind::AnnAssign {
                target,
                annotation,
                value,
            } => {
                collect_used_in_expr(annotation, out);
                collect_used_in_target(target, out);
                if let Some(v) = value {
                    collect_used_in_expr(v, out);
                }
            }
            StmtKind::AugAssign { target, value } => {
                collect_used_in_target(target, out);
                collect_used_in_expr(value, out);
            }
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
                ..
            } => {
                collect_used_in_expr(iter, out);
                collect_used_in_target(target, out);
                collect_used_names(body, out);
                collect_used_names(orelse, out);
            }
            StmtKind::While { test, body, orelse } | StmtKind::If { test, body, orelse } => {
                collect_used_in_expr(test, out);
                collect_used_names(body, out);
                collect_used_names(orelse, out);
            }
            StmtKind::Return(Some(e)) => collect_used_in_expr(e, out),
            StmtKind::Return(None) => {}
            StmtKind::Raise { exc, cause } => {
                if let Some(e) = exc {
                    collect_used_in_expr(e, out);
                }
                if let Some(c) = cause {
                    collect_used_in_expr(c, out);
                }
            }
            StmtKind::Break | StmtKind::Continue | StmtKind::Pass => {}
            StmtKind::With { items, body, .. } => {
                for item in items {
                    collect_used_in_expr(&item.context, out);
                    if let Some(t) = &item.target {
                        collect_used_in_target(t, out);
                    }
                }
                collect_used_names(body, out);
            }
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                collect_used_names(body, out);
                for h in handlers {
                    if let Some(te) = &h.type_expr {
                        collect_used_in_expr(te, out);
                    }
                    collect_used_names(&h.body, out);
                }
                collect_used_names(orelse, out);
                collect_used_names(finalbody, out);
            }
            StmtKind::Match { subject, arms } => {
                collect_used_in_expr(subject, out);
                for arm in arms {
                    if let Some(g) = &arm.guard {
                        collect_used_in_expr(g, out);
                    }
                    collect_used_names(&arm.body, out);
                }
            }
            StmtKind::Global(_) | StmtKind::Nonlocal(_) => {}
            StmtKind::Delete(exprs) => {
                for e in exprs {
                    collect_used_in_expr(e, out);
                }
            }
            StmtKind::Assert { test, msg } => {
                collect_used_in_expr(test, out);
                if let Some(m) = msg {
                    collect_used_in_expr(m, out);
                }
            }
            StmtKind::Expr(e) => collect_used_in_expr(e, out),
            StmtKind::Other(names) => {
                for (n, _) in names {
                    out.insert(n);
                }
            }
        }
    }
}

fn collect_used_in_target<'src>(target: &AssignTarget<'src>, out: &mut HashSet<&'src str>) {
    let mut reads = Vec::new();
    crate::names::target_read_exprs(target, &mut reads);
    for r in reads {
        collect_used_in_expr(r, out);
    }
}

fn collect_used_in_expr<'src>(expr: &Expr<'src>, out: &mut HashSet<&'src str>) {
    match &expr.kind {
        ExprKind::Name(n) => {
            out.insert(n);
        }
        ExprKind::Attribute(base, _) => collect_used_in_expr(base, out),
        ExprKind::Subscript(base, index) => {
            collect_used_in_expr(base, out);
            collect_used_in_expr(index, out);
        }
        ExprKind::Call {
            func,
            args,
            keywords,
        } => {
            collect_used_in_expr(func, out);
            for a in args {
                collect_used_in_expr(a, out);
            }
            for kw in keywords {
                collect_used_in_expr(&kw.value, out);
            }
        }
        ExprKind::Operator(items) => {
            for i in items {
                collect_used_in_expr(i, out);
            }
        }
        ExprKind::IfExp { test, body, orelse } => {
            collect_used_in_expr(test, out);
            collect_used_in_expr(body, out);
            collect_used_in_expr(orelse, out);
        }
        ExprKind::Tuple(items) | ExprKind::List(items) | ExprKind::Set(items) => {
            for i in items {
                collect_used_in_expr(i, out);
            }
        }
        ExprKind::Dict(pairs) => {
            for (k, v) in pairs {
                if let Some(k) = k {
                    collect_used_in_expr(k, out);
                }
                collect_used_in_expr(v, out);
            }
        }
        ExprKind::Starred(inner)
        | ExprKind::Yield(Some(inner))
        | ExprKind::YieldFrom(inner)
        | ExprKind::Await(inner) => collect_used_in_expr(inner, out),
        ExprKind::NamedExpr(name, value) => {
            out.insert(name);
            collect_used_in_expr(value, out);
        }
        ExprKind::Lambda { args, body } => {
            for e in args.enclosing_scope_exprs() {
                collect_used_in_expr(e, out);
            }
            collect_used_in_expr(body, out);
        }
        ExprKind::ListComp(comp) | ExprKind::SetComp(comp) | ExprKind::GeneratorExp(comp) => {
            for gen in &comp.generators {
                collect_used_in_expr(&gen.iter, out);
                for ifc in &gen.ifs {
                    collect_used_in_expr(ifc, out);
                }
            }
            collect_used_in_expr(&comp.element, out);
        }
        ExprKind::DictComp(dc) => {
            for gen in &dc.generators {
                collect_used_in_expr(&gen.iter, out);
                for ifc in &gen.ifs {
                    collect_used_in_expr(ifc, out);
                }
            }
            collect_used_in_expr(&dc.key, out);
            collect_used_in_expr(&dc.value, out);
        }
        ExprKind::FString(names) | ExprKind::Other(names) => {
            for (n, _) in names {
                out.insert(n);
            }
        }
        ExprKind::Yield(None)
        | ExprKind::BoolLit(_)
        | ExprKind::NoneLit
        | ExprKind::EllipsisLit
        | ExprKind::NumberLit
        | ExprKind::StringLit(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_python;

    fn names_of(out: &[UnusedImport]) -> Vec<&str> {
        let mut v: Vec<&str> = out.iter().map(|u| u.bound_name.as_str()).collect();
        v.sort();
        v
    }

    #[test]
    fn test_unused_import_detected() {
        let stmts = parse_python("import os\nimport sys\nprint(sys.argv)\n", "t.py");
        assert_eq!(names_of(&unused_imports(&stmts)), vec!["os"]);
    }

    #[test]
    fn test_dunder_all_exempts_import() {
        let stmts = parse_python("import os\n__all__ = ['os']\n", "t.py");
        assert!(unused_imports(&stmts).is_empty());
    }

    #[test]
    fn test_import_used_only_in_nested_function_not_unused() {
        let stmts = parse_python("import os\ndef f():\n    return os.getcwd()\n", "t.py");
        assert!(unused_imports(&stmts).is_empty());
    }

    #[test]
    fn test_aliased_import_checked_by_asname() {
        let stmts = parse_python("import numpy as np\n", "t.py");
        assert_eq!(names_of(&unused_imports(&stmts)), vec!["np"]);
    }
}
