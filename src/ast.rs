//! AST for the scope analyzer's Python subset.
#![allow(dead_code)]
//!
//! Design goals, carried over from this crate's lexer/parser split:
//! - Zero-copy: identifiers borrow `&'src str` slices from the source buffer.
//! - A real expression tree, not a flattened one: the scope analyzer's
//!   correctness properties (prefix rollup on dotted references, lambda and
//!   comprehension frames, class-body isolation) depend on knowing exactly
//!   which sub-expression introduces a new scope, so expressions are parsed
//!   into [`Expr`] nodes rather than reduced to a flat name list up front.
//! - Graceful degradation: anything the parser doesn't structurally
//!   recognise becomes `StmtKind::Other` / `ExprKind::Other` with whatever
//!   names could still be salvaged, rather than a hard parse error.

// ── Location ─────────────────────────────────────────────────────────────────

/// Byte offset of a token in the source file (0-indexed).
pub type Offset = u32;

// ── Expressions ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Expr<'src> {
    pub offset: Offset,
    pub kind: ExprKind<'src>,
}

#[derive(Debug, Clone)]
pub enum ExprKind<'src> {
    /// A bare identifier: `foo`.
    Name(&'src str),
    /// `True` / `False`.
    BoolLit(bool),
    /// `None`.
    NoneLit,
    /// The ellipsis literal `...`.
    EllipsisLit,
    /// A numeric literal — value never needed for scope analysis.
    NumberLit,
    /// A simple (non-f, non-concatenated) string literal; decoded value kept
    /// around for `__all__` extraction and DB-lookup-key recognition.
    StringLit(String),
    /// An f-string; `names` are every identifier found inside `{}` braces,
    /// collected by the lexer's conservative brace scanner (over-approximates
    /// usages, never misses one).
    FString(Vec<(&'src str, Offset)>),
    /// `value.attr`
    Attribute(Box<Expr<'src>>, &'src str),
    /// `value[index]`
    Subscript(Box<Expr<'src>>, Box<Expr<'src>>),
    /// `func(args, *starred, kw=val, **kwargs)`
    Call {
        func: Box<Expr<'src>>,
        args: Vec<Expr<'src>>,
        keywords: Vec<Keyword<'src>>,
    },
    /// Any unary/binary/boolean/comparison operator chain. The analyzer only
    /// needs the set of operand sub-expressions, not the operator identity.
    Operator(Vec<Expr<'src>>),
    /// `a if test else b`
    IfExp {
        test: Box<Expr<'src>>,
        body: Box<Expr<'src>>,
        orelse: Box<Expr<'src>>,
    },
    Tuple(Vec<Expr<'src>>),
    List(Vec<Expr<'src>>),
    Set(Vec<Expr<'src>>),
    /// `{k: v, ...}`; `None` key denotes a `**spread` entry.
    Dict(Vec<(Option<Expr<'src>>, Expr<'src>)>),
    /// `*value` used inside a call or display.
    Starred(Box<Expr<'src>>),
    /// `(name := value)` — a read-and-bind; `name` is bound in the *enclosing*
    /// frame (not a fresh one), per the host language's walrus-operator rule.
    NamedExpr(&'src str, Box<Expr<'src>>),
    Lambda {
        args: Box<Arguments<'src>>,
        body: Box<Expr<'src>>,
    },
    ListComp(Box<Comprehension<'src>>),
    SetComp(Box<Comprehension<'src>>),
    GeneratorExp(Box<Comprehension<'src>>),
    DictComp(Box<DictComprehension<'src>>),
    Yield(Option<Box<Expr<'src>>>),
    YieldFrom(Box<Expr<'src>>),
    Await(Box<Expr<'src>>),
    /// Anything the parser gave up on structurally; names salvaged by a
    /// best-effort token scan so they still count as usages.
    Other(Vec<(&'src str, Offset)>),
}

#[derive(Debug, Clone)]
pub struct Keyword<'src> {
    /// `None` for a `**kwargs` spread.
    pub arg: Option<&'src str>,
    pub value: Expr<'src>,
}

// ── Comprehensions ────────────────────────────────────────────────────────────

/// One `for target in iter [if cond]*` clause of a comprehension.
#[derive(Debug, Clone)]
pub struct Generator<'src> {
    pub target: AssignTarget<'src>,
    pub iter: Expr<'src>,
    pub ifs: Vec<Expr<'src>>,
    pub is_async: bool,
}

#[derive(Debug, Clone)]
pub struct Comprehension<'src> {
    pub element: Expr<'src>,
    pub generators: Vec<Generator<'src>>,
}

#[derive(Debug, Clone)]
pub struct DictComprehension<'src> {
    pub key: Expr<'src>,
    pub value: Expr<'src>,
    pub generators: Vec<Generator<'src>>,
}

// ── Assignment targets ────────────────────────────────────────────────────────

/// The left-hand side of an assignment, `for` target, or `with ... as` target.
#[derive(Debug, Clone)]
pub enum AssignTarget<'src> {
    Name(&'src str, Offset),
    Tuple(Vec<AssignTarget<'src>>),
    List(Vec<AssignTarget<'src>>),
    Starred(Box<AssignTarget<'src>>),
    /// `obj.attr = …` — not a local binding; `obj` (and any names inside it)
    /// are a *read*, per the attribute-write rule.
    Attribute(Expr<'src>, &'src str),
    /// `obj[key] = …` — both `obj` and `key` are reads.
    Subscript(Expr<'src>, Expr<'src>),
}

// ── Import aliases ────────────────────────────────────────────────────────────

/// One name inside an import statement.
///
/// For `import os.path`: `name = "os.path"`, `asname = None`.
/// For `from x import y as z`: `name = "y"`, `asname = Some("z")`.
#[derive(Debug, Clone)]
pub struct ImportAlias<'src> {
    pub name: &'src str,
    pub asname: Option<&'src str>,
    pub offset: Offset,
}

// ── Function arguments ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ArgDef<'src> {
    pub name: &'src str,
    pub offset: Offset,
    /// Annotation expression — evaluated in the enclosing scope.
    pub annotation: Option<Expr<'src>>,
    /// Default-value expression — evaluated in the enclosing scope, not the
    /// function body's frame (a default may see an outer `x` but never a
    /// sibling parameter).
    pub default: Option<Expr<'src>>,
}

#[derive(Debug, Default, Clone)]
pub struct Arguments<'src> {
    pub posonlyargs: Vec<ArgDef<'src>>,
    pub args: Vec<ArgDef<'src>>,
    pub vararg: Option<ArgDef<'src>>,
    pub kwonlyargs: Vec<ArgDef<'src>>,
    pub kwarg: Option<ArgDef<'src>>,
}

impl<'src> Arguments<'src> {
    /// Every parameter name bound inside the function/lambda body frame.
    pub fn bound_names(&self) -> impl Iterator<Item = &'src str> + '_ {
        self.posonlyargs
            .iter()
            .chain(self.args.iter())
            .chain(self.vararg.iter())
            .chain(self.kwonlyargs.iter())
            .chain(self.kwarg.iter())
            .map(|a| a.name)
    }

    /// Every expression evaluated in the *enclosing* scope: annotations and
    /// defaults for every parameter.
    pub fn enclosing_scope_exprs(&self) -> impl Iterator<Item = &Expr<'src>> + '_ {
        self.posonlyargs
            .iter()
            .chain(self.args.iter())
            .chain(self.vararg.iter())
            .chain(self.kwonlyargs.iter())
            .chain(self.kwarg.iter())
            .flat_map(|a| a.annotation.iter().chain(a.default.iter()))
    }
}

// ── Function / Class definitions ──────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FuncDef<'src> {
    pub name: &'src str,
    pub offset: Offset,
    pub is_async: bool,
    pub args: Arguments<'src>,
    /// `-> ReturnType` annotation, if present — evaluated in the enclosing scope.
    pub returns: Option<Expr<'src>>,
    /// Decorator expressions, evaluated in source order in the enclosing scope.
    pub decorators: Vec<Expr<'src>>,
    pub body: Vec<Stmt<'src>>,
}

#[derive(Debug, Clone)]
pub struct ClassDef<'src> {
    pub name: &'src str,
    pub offset: Offset,
    /// Base class expressions, evaluated in the enclosing scope.
    pub bases: Vec<Expr<'src>>,
    pub keywords: Vec<Keyword<'src>>,
    pub decorators: Vec<Expr<'src>>,
    pub body: Vec<Stmt<'src>>,
}

// ── Exception handlers ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ExceptHandler<'src> {
    /// `except E as name:` — the bound name, if present.
    pub name: Option<(&'src str, Offset)>,
    pub type_expr: Option<Expr<'src>>,
    pub body: Vec<Stmt<'src>>,
    pub offset: Offset,
}

// ── with items ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct WithItem<'src> {
    pub context: Expr<'src>,
    pub target: Option<AssignTarget<'src>>,
}

// ── Match arms ────────────────────────────────────────────────────────────────

/// One arm of a `match` statement (`case <pattern> [if <guard>]: <body>`).
///
/// Pattern syntax is not parsed into a structured form (`match` is rare in
/// scope-critical fragments and a full pattern grammar is a large surface for
/// little benefit here). Every identifier appearing in the pattern head is
/// conservatively treated as a *capture binding* added to the current frame —
/// the safe direction for a missing-name analyzer, since pattern capture
/// really is the common case and treating a bound name as "missing" would be
/// a false positive, which is worse here than the reverse.
#[derive(Debug, Clone)]
pub struct MatchArm<'src> {
    pub pattern_captures: Vec<(&'src str, Offset)>,
    pub guard: Option<Expr<'src>>,
    pub body: Vec<Stmt<'src>>,
}

// ── Statements ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Stmt<'src> {
    pub offset: Offset,
    pub kind: StmtKind<'src>,
}

#[derive(Debug, Clone)]
pub enum StmtKind<'src> {
    // ── import ──────────────────────────────────────────────────────────────
    Import(Vec<ImportAlias<'src>>),
    ImportFrom {
        module: Option<&'src str>,
        names: Vec<ImportAlias<'src>>,
        level: u32,
    },

    // ── definitions ─────────────────────────────────────────────────────────
    FunctionDef(Box<FuncDef<'src>>),
    ClassDef(Box<ClassDef<'src>>),

    // ── assignments ─────────────────────────────────────────────────────────
    Assign {
        targets: Vec<AssignTarget<'src>>,
        value: Expr<'src>,
    },
    AnnAssign {
        target: AssignTarget<'src>,
        annotation: Expr<'src>,
        value: Option<Expr<'src>>,
    },
    AugAssign {
        target: AssignTarget<'src>,
        value: Expr<'src>,
    },

    // ── control flow ────────────────────────────────────────────────────────
    For {
        target: AssignTarget<'src>,
        iter: Expr<'src>,
        body: Vec<Stmt<'src>>,
        orelse: Vec<Stmt<'src>>,
        is_async: bool,
    },
    While {
        test: Expr<'src>,
        body: Vec<Stmt<'src>>,
        orelse: Vec<Stmt<'src>>,
    },
    If {
        test: Expr<'src>,
        body: Vec<Stmt<'src>>,
        orelse: Vec<Stmt<'src>>,
    },
    Return(Option<Expr<'src>>),
    Raise {
        exc: Option<Expr<'src>>,
        cause: Option<Expr<'src>>,
    },
    Break,
    Continue,
    Pass,

    // ── other compound ──────────────────────────────────────────────────────
    With {
        items: Vec<WithItem<'src>>,
        body: Vec<Stmt<'src>>,
        is_async: bool,
    },
    Try {
        body: Vec<Stmt<'src>>,
        handlers: Vec<ExceptHandler<'src>>,
        orelse: Vec<Stmt<'src>>,
        finalbody: Vec<Stmt<'src>>,
    },
    Match {
        subject: Expr<'src>,
        arms: Vec<MatchArm<'src>>,
    },

    // ── simple ──────────────────────────────────────────────────────────────
    Global(Vec<&'src str>),
    Nonlocal(Vec<&'src str>),
    Delete(Vec<Expr<'src>>),
    Assert {
        test: Expr<'src>,
        msg: Option<Expr<'src>>,
    },
    /// A bare expression statement, e.g. a function call or docstring.
    Expr(Expr<'src>),

    /// A statement the parser could not structurally place (typically after
    /// a genuine syntax error); names salvaged for usage tracking.
    Other(Vec<(&'src str, Offset)>),
}
