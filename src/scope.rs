//! Static scope analyzer: a single post-order-ish walk over the parsed tree
//! that produces the sorted, de-duplicated list of dotted names referenced
//! but never bound under the host language's scoping rules.
//!
//! Dotted-name resolution is intentionally *lexical and head-only* here: the
//! analyzer checks whether the leftmost identifier of a dotted chain is bound
//! anywhere visible, and if not, reports the *entire* chain's literal text as
//! missing (`os.path.join` when `os` is unbound). It does not attempt to walk
//! live attributes the way the symbol loader (`loader.rs`) does at runtime —
//! that is a deliberate split: lexical scope analysis can only ever know
//! about names, never about what a resolved object's attributes actually
//! are. The prefix-rollup behaviour described for the loader belongs there.

use std::collections::HashSet;

use crate::ast::*;
use crate::bindings::BindingsStack;
use crate::dotted::DottedName;
use crate::names::{
    collect_hoisted_names, flatten_target_names, scan_expr_for_seed, target_read_exprs,
    HoistedNames, ScanOptions,
};

/// Options controlling scope-analysis behaviour that differ across host
/// language revisions.
#[derive(Debug, Clone, Copy)]
pub struct ScopeOptions {
    /// Whether list-comprehension iteration variables leak into the
    /// enclosing frame (the historical/current behaviour). Generator, set,
    /// and dict comprehensions never leak regardless of this flag.
    pub list_comprehension_leak: bool,
}

impl Default for ScopeOptions {
    fn default() -> Self {
        Self {
            list_comprehension_leak: true,
        }
    }
}

impl From<ScopeOptions> for ScanOptions {
    fn from(o: ScopeOptions) -> Self {
        ScanOptions {
            list_comprehension_leak: o.list_comprehension_leak,
        }
    }
}

/// A conservative common subset of builtin names, seeded into the module
/// frame alongside the caller's bindings-stack keys.
const BUILTINS: &[&str] = &[
    "abs", "aiter", "anext", "all", "any", "ascii", "bin", "bool", "breakpoint", "bytearray",
    "bytes", "callable", "chr", "classmethod", "compile", "complex", "delattr", "dict", "dir",
    "divmod", "enumerate", "eval", "exec", "filter", "float", "format", "frozenset", "getattr",
    "globals", "hasattr", "hash", "help", "hex", "id", "input", "int", "isinstance",
    "issubclass", "iter", "len", "list", "locals", "map", "max", "memoryview", "min", "next",
    "object", "oct", "open", "ord", "pow", "print", "property", "range", "repr", "reversed",
    "round", "set", "setattr", "slice", "sorted", "staticmethod", "str", "sum", "super", "tuple",
    "type", "vars", "zip", "__import__", "__name__", "__file__", "__doc__", "__builtins__",
    "__package__", "__spec__", "__loader__", "self", "cls", "NotImplemented", "Ellipsis",
    "Exception", "BaseException", "ValueError", "TypeError", "KeyError", "IndexError",
    "AttributeError", "RuntimeError", "StopIteration", "StopAsyncIteration", "ImportError",
    "ModuleNotFoundError", "NameError", "UnboundLocalError", "OSError", "IOError",
    "FileNotFoundError", "NotImplementedError", "ZeroDivisionError", "OverflowError",
    "ArithmeticError", "AssertionError", "GeneratorExit", "KeyboardInterrupt", "SystemExit",
    "Warning", "DeprecationWarning", "UserWarning",
];

/// Run the scope analyzer over a parsed module, returning every distinct
/// unresolved dotted name, sorted by its dotted text.
pub fn missing_references<'src>(
    stmts: &[Stmt<'src>],
    bindings: &BindingsStack,
    opts: ScopeOptions,
) -> Vec<String> {
    let mut module_bound: HashSet<&str> = HashSet::new();
    for k in bindings.all_keys() {
        module_bound.insert(k);
    }
    for b in BUILTINS {
        module_bound.insert(b);
    }
    let mut analyzer = Analyzer {
        frames: vec![Frame {
            kind: FrameKind::Module,
            bound: module_bound,
        }],
        opts: opts.into(),
        missing: Vec::new(),
    };
    analyzer.visit_block(stmts);
    let mut out: Vec<String> = analyzer
        .missing
        .into_iter()
        .map(|d| d.to_string())
        .collect();
    out.sort();
    out.dedup();
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Module,
    Function,
    Class,
    Comprehension,
}

struct Frame<'a> {
    kind: FrameKind,
    bound: HashSet<&'a str>,
}

struct Analyzer<'a> {
    frames: Vec<Frame<'a>>,
    opts: ScanOptions,
    missing: Vec<DottedName>,
}

impl<'a> Analyzer<'a> {
    fn current_frame_mut(&mut self) -> &mut Frame<'a> {
        self.frames
            .last_mut()
            .expect("module frame is always present")
    }

    /// The nearest frame that isn't a comprehension — where a walrus
    /// assignment inside a comprehension actually binds, per the host
    /// language's rule that `:=` never introduces a name scoped to the
    /// comprehension itself.
    fn nearest_non_comprehension_frame_mut(&mut self) -> &mut Frame<'a> {
        if let Some(idx) = self
            .frames
            .iter()
            .rposition(|f| f.kind != FrameKind::Comprehension)
        {
            &mut self.frames[idx]
        } else {
            &mut self.frames[0]
        }
    }

    /// Whether `name` is bound in any frame visible from the current
    /// position. Class frames are visible only to themselves — a nested
    /// function or lambda body defined inside a class does not see the
    /// class's own attributes, matching the host language's rule that
    /// class bodies are not a lexical scope for their nested functions.
    fn resolve(&self, name: &str) -> bool {
        let n = self.frames.len();
        for i in (0..n).rev() {
            let is_current = i == n - 1;
            let frame = &self.frames[i];
            if !is_current && frame.kind == FrameKind::Class {
                continue;
            }
            if frame.bound.contains(name) {
                return true;
            }
        }
        false
    }

    fn push_hoisted_frame(&mut self, kind: FrameKind, bound: HashSet<&'a str>) {
        self.frames.push(Frame { kind, bound });
    }

    fn pop_frame(&mut self) {
        self.frames.pop();
    }

    fn report_missing(&mut self, parts: Vec<&str>) {
        self.missing
            .push(DottedName::new(parts.into_iter().map(str::to_string).collect()));
    }

    // ── statements ──────────────────────────────────────────────────────────

    fn visit_block(&mut self, stmts: &[Stmt<'a>]) {
        for stmt in stmts {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt<'a>) {
        match &stmt.kind {
            StmtKind::Import(aliases) => {
                for alias in aliases {
                    let local = import_local_name(alias);
                    self.current_frame_mut().bound.insert(local);
                }
            }
            StmtKind::ImportFrom { names, .. } => {
                for alias in names {
                    if alias.name == "*" {
                        continue;
                    }
                    let local = alias.asname.unwrap_or(alias.name);
                    self.current_frame_mut().bound.insert(local);
                }
            }
            StmtKind::FunctionDef(f) => self.visit_funcdef(f),
            StmtKind::ClassDef(c) => self.visit_classdef(c),
            StmtKind::Assign { targets, value } => {
                self.visit_expr(value);
                for t in targets {
                    self.visit_target(t);
                }
            }
            StmtKind::AnnAssign {
                target,
                annotation,
                value,
            } => {
                self.visit_expr(annotation);
                let mut reads = Vec::new();
                target_read_exprs(target, &mut reads);
                for r in reads {
                    self.visit_expr(r);
                }
                if let Some(v) = value {
                    self.visit_expr(v);
                    let mut names = Vec::new();
                    flatten_target_names(target, &mut names);
                    for (n, _) in names {
                        self.current_frame_mut().bound.insert(n);
                    }
                }
            }
            StmtKind::AugAssign { target, value } => {
                // `x += 1` reads `x` before writing it.
                if let AssignTarget::Name(n, off) = target {
                    if !self.resolve(n) {
                        self.report_missing(vec![n]);
                    }
                    let _ = off;
                }
                let mut reads = Vec::new();
                target_read_exprs(target, &mut reads);
                for r in reads {
                    self.visit_expr(r);
                }
                self.visit_expr(value);
                self.visit_target(target);
            }
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
                ..
            } => {
                self.visit_expr(iter);
                self.visit_target(target);
                self.visit_block(body);
                self.visit_block(orelse);
            }
            StmtKind::While { test, body, orelse } => {
                self.visit_expr(test);
                self.visit_block(body);
                self.visit_block(orelse);
            }
            StmtKind::If { test, body, orelse } => {
                self.visit_expr(test);
                self.visit_block(body);
                self.visit_block(orelse);
            }
            StmtKind::Return(Some(e)) => self.visit_expr(e),
            StmtKind::Return(None) => {}
            StmtKind::Raise { exc, cause } => {
                if let Some(e) = exc {
                    self.visit_expr(e);
                }
                if let Some(c) = cause {
                    self.visit_expr(c);
                }
            }
            StmtKind::Break | StmtKind::Continue | StmtKind::Pass => {}
            StmtKind::With {
                items, body, ..
            } => {
                for item in items {
                    self.visit_expr(&item.context);
                    if let Some(t) = &item.target {
                        self.visit_target(t);
                    }
                }
                self.visit_block(body);
            }
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                self.visit_block(body);
                for h in handlers {
                    if let Some(te) = &h.type_expr {
                        self.visit_expr(te);
                    }
                    if let Some((n, _)) = h.name {
                        self.current_frame_mut().bound.insert(n);
                    }
                    self.visit_block(&h.body);
                }
                self.visit_block(orelse);
                self.visit_block(finalbody);
            }
            StmtKind::Match { subject, arms } => {
                self.visit_expr(subject);
                for arm in arms {
                    for (n, _) in &arm.pattern_captures {
                        self.current_frame_mut().bound.insert(n);
                    }
                    if let Some(g) = &arm.guard {
                        self.visit_expr(g);
                    }
                    self.visit_block(&arm.body);
                }
            }
            StmtKind::Global(names) => {
                for n in names {
                    self.current_frame_mut().bound.insert(n);
                    self.frames[0].bound.insert(n);
                }
            }
            StmtKind::Nonlocal(names) => {
                for n in names {
                    self.current_frame_mut().bound.insert(n);
                }
            }
            StmtKind::Delete(exprs) => {
                for e in exprs {
                    self.visit_expr(e);
                }
            }
            StmtKind::Assert { test, msg } => {
                self.visit_expr(test);
                if let Some(m) = msg {
                    self.visit_expr(m);
                }
            }
            StmtKind::Expr(e) => self.visit_expr(e),
            StmtKind::Other(names) => {
                for (n, off) in names {
                    self.check_bare_name(n, *off);
                }
            }
        }
    }

    fn visit_target(&mut self, target: &AssignTarget<'a>) {
        let mut reads = Vec::new();
        target_read_exprs(target, &mut reads);
        for r in reads {
            self.visit_expr(r);
        }
        let mut names = Vec::new();
        flatten_target_names(target, &mut names);
        for (n, _) in names {
            self.current_frame_mut().bound.insert(n);
        }
    }

    fn visit_funcdef(&mut self, f: &FuncDef<'a>) {
        for dec in &f.decorators {
            self.visit_expr(dec);
        }
        for e in f.args.enclosing_scope_exprs() {
            self.visit_expr(e);
        }
        if let Some(r) = &f.returns {
            self.visit_expr(r);
        }
        self.current_frame_mut().bound.insert(f.name);

        let mut hoisted = HoistedNames::default();
        collect_hoisted_names(&f.body, &self.opts, &mut hoisted);
        let mut bound = hoisted.bound;
        for p in f.args.bound_names() {
            bound.insert(p);
        }
        for g in &hoisted.global_decls {
            self.frames[0].bound.insert(g);
        }

        self.push_hoisted_frame(FrameKind::Function, bound);
        self.visit_block(&f.body);
        self.pop_frame();
    }

    fn visit_classdef(&mut self, c: &ClassDef<'a>) {
        for dec in &c.decorators {
            self.visit_expr(dec);
        }
        for b in &c.bases {
            self.visit_expr(b);
        }
        for kw in &c.keywords {
            self.visit_expr(&kw.value);
        }
        self.current_frame_mut().bound.insert(c.name);

        self.push_hoisted_frame(FrameKind::Class, HashSet::new());
        self.visit_block(&c.body);
        self.pop_frame();
    }

    // ── expressions ─────────────────────────────────────────────────────────

    fn visit_expr(&mut self, expr: &Expr<'a>) {
        match &expr.kind {
            ExprKind::Name(_) | ExprKind::Attribute(..) => self.check_dotted_chain(expr),
            ExprKind::Subscript(base, index) => {
                self.visit_expr(base);
                self.visit_expr(index);
            }
            ExprKind::Call {
                func,
                args,
                keywords,
            } => {
                self.visit_expr(func);
                for a in args {
                    self.visit_expr(a);
                }
                for kw in keywords {
                    self.visit_expr(&kw.value);
                }
            }
            ExprKind::Operator(items) => {
                for i in items {
                    self.visit_expr(i);
                }
            }
            ExprKind::IfExp { test, body, orelse } => {
                self.visit_expr(test);
                self.visit_expr(body);
                self.visit_expr(orelse);
            }
            ExprKind::Tuple(items) | ExprKind::List(items) | ExprKind::Set(items) => {
                for i in items {
                    self.visit_expr(i);
                }
            }
            ExprKind::Dict(pairs) => {
                for (k, v) in pairs {
                    if let Some(k) = k {
                        self.visit_expr(k);
                    }
                    self.visit_expr(v);
                }
            }
            ExprKind::Starred(inner)
            | ExprKind::Yield(Some(inner))
            | ExprKind::YieldFrom(inner)
            | ExprKind::Await(inner) => self.visit_expr(inner),
            ExprKind::NamedExpr(name, value) => {
                self.visit_expr(value);
                self.nearest_non_comprehension_frame_mut().bound.insert(name);
            }
            ExprKind::Lambda { args, body } => {
                for e in args.enclosing_scope_exprs() {
                    self.visit_expr(e);
                }
                let mut hoisted = HoistedNames::default();
                scan_expr_for_seed(body, &self.opts, &mut hoisted);
                let mut bound = hoisted.bound;
                for p in args.bound_names() {
                    bound.insert(p);
                }
                self.push_hoisted_frame(FrameKind::Function, bound);
                self.visit_expr(body);
                self.pop_frame();
            }
            ExprKind::ListComp(comp) => self.visit_comprehension(comp, true),
            ExprKind::SetComp(comp) | ExprKind::GeneratorExp(comp) => {
                self.visit_comprehension(comp, false)
            }
            ExprKind::DictComp(dc) => self.visit_dict_comprehension(dc),
            ExprKind::FString(names) => {
                for (n, off) in names {
                    self.check_bare_name(n, *off);
                }
            }
            ExprKind::Other(names) => {
                for (n, off) in names {
                    self.check_bare_name(n, *off);
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

    fn visit_comprehension(&mut self, comp: &Comprehension<'a>, is_list: bool) {
        let generators = &comp.generators;
        if let Some(first) = generators.first() {
            self.visit_expr(&first.iter);
        }
        let mut bound: HashSet<&str> = HashSet::new();
        for gen in generators {
            let mut names = Vec::new();
            flatten_target_names(&gen.target, &mut names);
            for (n, _) in names {
                bound.insert(n);
            }
        }
        let mut hoisted = HoistedNames::default();
        for (i, gen) in generators.iter().enumerate() {
            if i > 0 {
                scan_expr_for_seed(&gen.iter, &self.opts, &mut hoisted);
            }
            for ifc in &gen.ifs {
                scan_expr_for_seed(ifc, &self.opts, &mut hoisted);
            }
        }
        scan_expr_for_seed(&comp.element, &self.opts, &mut hoisted);
        bound.extend(hoisted.bound);

        self.push_hoisted_frame(FrameKind::Comprehension, bound);
        for (i, gen) in generators.iter().enumerate() {
            if i > 0 {
                self.visit_expr(&gen.iter);
            }
            for ifc in &gen.ifs {
                self.visit_expr(ifc);
            }
        }
        self.visit_expr(&comp.element);
        self.pop_frame();

        if is_list && self.opts.list_comprehension_leak {
            for gen in generators {
                let mut names = Vec::new();
                flatten_target_names(&gen.target, &mut names);
                for (n, _) in names {
                    self.current_frame_mut().bound.insert(n);
                }
            }
        }
    }

    fn visit_dict_comprehension(&mut self, dc: &DictComprehension<'a>) {
        let generators = &dc.generators;
        if let Some(first) = generators.first() {
            self.visit_expr(&first.iter);
        }
        let mut bound: HashSet<&str> = HashSet::new();
        for gen in generators {
            let mut names = Vec::new();
            flatten_target_names(&gen.target, &mut names);
            for (n, _) in names {
                bound.insert(n);
            }
        }
        let mut hoisted = HoistedNames::default();
        for (i, gen) in generators.iter().enumerate() {
            if i > 0 {
                scan_expr_for_seed(&gen.iter, &self.opts, &mut hoisted);
            }
            for ifc in &gen.ifs {
                scan_expr_for_seed(ifc, &self.opts, &mut hoisted);
            }
        }
        scan_expr_for_seed(&dc.key, &self.opts, &mut hoisted);
        scan_expr_for_seed(&dc.value, &self.opts, &mut hoisted);
        bound.extend(hoisted.bound);

        self.push_hoisted_frame(FrameKind::Comprehension, bound);
        for (i, gen) in generators.iter().enumerate() {
            if i > 0 {
                self.visit_expr(&gen.iter);
            }
            for ifc in &gen.ifs {
                self.visit_expr(ifc);
            }
        }
        self.visit_expr(&dc.key);
        self.visit_expr(&dc.value);
        self.pop_frame();
    }

    fn check_dotted_chain(&mut self, expr: &Expr<'a>) {
        if let Some(parts) = chain_parts(expr) {
            let head = parts[0];
            if !self.resolve(head) {
                self.report_missing(parts);
            }
        } else if let ExprKind::Attribute(base, _) = &expr.kind {
            // Not a pure dotted chain (e.g. `f().attr`) — the attribute name
            // itself can't be an importable dotted reference, but the base
            // still needs its own references checked.
            self.visit_expr(base);
        }
    }

    fn check_bare_name(&mut self, name: &'a str, _offset: Offset) {
        if !self.resolve(name) {
            self.report_missing(vec![name]);
        }
    }
}

/// Extract the literal dotted-path parts of a pure `Name`/`Attribute` chain,
/// e.g. `a.b.c` -> `["a", "b", "c"]`. Returns `None` if any link in the chain
/// isn't itself a `Name` or `Attribute` (a call or subscript in the middle
/// breaks the chain — `f().b` is not a literal dotted reference).
fn chain_parts<'a>(expr: &Expr<'a>) -> Option<Vec<&'a str>> {
    match &expr.kind {
        ExprKind::Name(n) => Some(vec![*n]),
        ExprKind::Attribute(base, attr) => {
            let mut parts = chain_parts(base)?;
            parts.push(attr);
            Some(parts)
        }
        _ => None,
    }
}

fn import_local_name<'a>(alias: &ImportAlias<'a>) -> &'a str {
    alias
        .asname
        .unwrap_or_else(|| alias.name.split('.').next().unwrap_or(alias.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_python;
    use std::collections::HashMap;

    fn missing(src: &str) -> Vec<String> {
        let stmts = parse_python(src, "test.py");
        missing_references(&stmts, &BindingsStack::default(), ScopeOptions::default())
    }

    fn missing_with_bindings(src: &str, bound: &[&str]) -> Vec<String> {
        let stmts = parse_python(src, "test.py");
        let mut frame = HashMap::new();
        for b in bound {
            frame.insert(b.to_string(), crate::runtime::Value::new(*b, ()));
        }
        let bindings = BindingsStack::single(frame);
        missing_references(&stmts, &bindings, ScopeOptions::default())
    }

    #[test]
    fn test_fully_unbound_dotted_chain_reports_whole_path() {
        assert_eq!(missing("os.path.join\n"), vec!["os.path.join"]);
    }

    #[test]
    fn test_bound_head_resolves_whole_chain() {
        assert!(missing_with_bindings("os.path.join\n", &["os"]).is_empty());
    }

    #[test]
    fn test_late_binding_within_function() {
        let out = missing("def f():\n    return g()\ndef g():\n    return 1\n");
        assert!(out.is_empty());
    }

    #[test]
    fn test_no_late_binding_at_module_level() {
        let out = missing("y = x\nx = 1\n");
        assert_eq!(out, vec!["x"]);
    }

    #[test]
    fn test_list_comprehension_leaks_iteration_variable() {
        let out = missing("[x+y+z for x, y in [(1, 2)]]\ny\n");
        assert_eq!(out, vec!["z"]);
    }

    #[test]
    fn test_generator_does_not_leak() {
        let mut out = missing("(x+y+z for x, y in [(1, 2)])\ny\n");
        out.sort();
        assert_eq!(out, vec!["y", "z"]);
    }

    #[test]
    fn test_class_body_not_visible_to_nested_function() {
        let out = missing("class Foo:\n    X = 1\n    def method(self):\n        return X\n");
        assert_eq!(out, vec!["X"]);
    }

    #[test]
    fn test_class_body_sees_own_prior_attribute() {
        let out = missing("class Foo:\n    X = 1\n    Y = X\n");
        assert!(out.is_empty());
    }

    #[test]
    fn test_default_value_uses_enclosing_scope_not_sibling_param() {
        let out = missing("OUTER = 1\ndef f(a, b=OUTER):\n    return a + b\n");
        assert!(out.is_empty());
    }

    #[test]
    fn test_attribute_write_reads_base() {
        let out = missing("a.b.c = 1\n");
        assert_eq!(out, vec!["a.b"]);
    }

    #[test]
    fn test_tuple_unpacking_binds_all_leaves() {
        let out = missing("(a, (b, c)) = value\nprint(a, b, c)\n");
        assert_eq!(out, vec!["value"]);
    }

    #[test]
    fn test_global_declaration_binds_in_function_and_module() {
        let out = missing("def f():\n    global shared\n    shared = 1\ndef g():\n    return shared\n");
        assert!(out.is_empty());
    }

    #[test]
    fn test_nested_class_isolation() {
        let out = missing(
            "class Outer:\n    X = 1\n    class Inner:\n        Y = X\n",
        );
        assert_eq!(out, vec!["X"]);
    }

    #[test]
    fn test_sorted_and_deduped_output() {
        let out = missing("b\na\na\n");
        assert_eq!(out, vec!["a", "b"]);
    }
}
