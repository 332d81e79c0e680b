//! Recursive-descent statement and expression parser.
//!
//! Builds the tree in [`crate::ast`] from the token stream produced by
//! [`crate::lexer`]. Follows the same graceful-degradation philosophy as the
//! lexer: a construct the parser doesn't structurally recognise becomes a
//! `StmtKind::Other`/`ExprKind::Other` node carrying whatever names could
//! still be salvaged, rather than aborting the parse. The one place this
//! parser treats something as a genuine syntax error is the legacy
//! `print expr` statement form (Python 2 print-statement syntax) — detecting
//! that precisely is what lets a caller retry under a different parse mode.
//!
//! Binary/unary operators are collapsed to a single `Token::Op` by the lexer
//! (their identity doesn't matter for scope analysis), which means operator
//! precedence can't be reconstructed from the token stream and isn't needed:
//! an operator chain is parsed flat into `ExprKind::Operator(operands)`
//! rather than a precedence-climbed tree.

use crate::ast::*;
use crate::lexer::{collect_fstring_names, extract_str_value, Lexer, Token};

/// Result of parsing one source file.
pub struct ParseOutput<'src> {
    pub stmts: Vec<Stmt<'src>>,
    /// Byte offsets of legacy `print expr` statements encountered — signals
    /// to a caller that retrying under a print-as-statement-compatible parse
    /// mode may be worthwhile.
    pub print_statement_offsets: Vec<Offset>,
}

/// Parse a full module. Never fails — unrecognised input degrades to
/// `Other` nodes instead of aborting.
pub fn parse(source: &str) -> ParseOutput<'_> {
    let mut p = Parser {
        lex: Lexer::new(source),
        src: source,
        print_statement_offsets: Vec::new(),
    };
    let mut stmts = Vec::new();
    loop {
        if matches!(p.lex.peek(), Token::Eof) {
            break;
        }
        p.parse_stmt_or_line(&mut stmts);
    }
    ParseOutput {
        stmts,
        print_statement_offsets: p.print_statement_offsets,
    }
}

/// Parse a single source string into just its statements — convenience for
/// callers (and tests) that don't need the print-statement signal.
pub fn parse_python<'src>(source: &'src str, _filename: &str) -> Vec<Stmt<'src>> {
    parse(source).stmts
}

struct Parser<'src> {
    lex: Lexer<'src>,
    src: &'src str,
    print_statement_offsets: Vec<Offset>,
}

enum CallArgItem<'src> {
    Positional(Expr<'src>),
    Keyword(Keyword<'src>),
}

impl<'src> Parser<'src> {
    // ── token helpers ──────────────────────────────────────────────────────

    fn eat(&mut self, t: &Token<'src>) -> bool {
        self.lex.eat(t)
    }

    /// Attempt to consume `t`; does nothing if it isn't next. Parsing never
    /// hard-fails on a missing expected token — the rest of the statement is
    /// still parsed on a best-effort basis.
    fn expect(&mut self, t: &Token<'src>) {
        self.lex.eat(t);
    }

    fn expect_name(&mut self) -> (&'src str, Offset) {
        let off = self.lex.peek_offset();
        match self.lex.bump() {
            Token::Name(n) => (n, off),
            _ => ("", off),
        }
    }

    fn at_simple_stmt_end(&mut self) -> bool {
        matches!(
            self.lex.peek(),
            Token::Newline | Token::Semicolon | Token::Eof | Token::Dedent
        )
    }

    // ── module / block structure ───────────────────────────────────────────

    fn parse_stmt_or_line(&mut self, out: &mut Vec<Stmt<'src>>) {
        match self.lex.peek() {
            Token::KwIf => out.push(self.parse_if()),
            Token::KwWhile => out.push(self.parse_while()),
            Token::KwFor => out.push(self.parse_for(false)),
            Token::KwTry => out.push(self.parse_try()),
            Token::KwWith => out.push(self.parse_with(false)),
            Token::KwDef => out.push(self.parse_funcdef(false, vec![])),
            Token::KwClass => out.push(self.parse_classdef(vec![])),
            Token::KwMatch => out.push(self.parse_match()),
            Token::At => {
                let decs = self.parse_decorators();
                out.push(self.parse_def_or_class(decs));
            }
            Token::KwAsync => {
                self.lex.bump();
                match self.lex.peek() {
                    Token::KwDef => out.push(self.parse_funcdef(true, vec![])),
                    Token::KwFor => out.push(self.parse_for(true)),
                    Token::KwWith => out.push(self.parse_with(true)),
                    _ => out.extend(self.parse_simple_stmt_line()),
                }
            }
            Token::Newline | Token::Indent | Token::Dedent => {
                self.lex.bump();
            }
            Token::Eof => {}
            _ => out.extend(self.parse_simple_stmt_line()),
        }
    }

    fn parse_block(&mut self) -> Vec<Stmt<'src>> {
        if self.eat(&Token::Newline) {
            self.expect(&Token::Indent);
            let mut out = Vec::new();
            while !matches!(self.lex.peek(), Token::Dedent | Token::Eof) {
                self.parse_stmt_or_line(&mut out);
            }
            self.eat(&Token::Dedent);
            out
        } else {
            self.parse_simple_stmt_line()
        }
    }

    fn parse_simple_stmt_line(&mut self) -> Vec<Stmt<'src>> {
        let mut out = Vec::new();
        loop {
            out.push(self.parse_simple_stmt());
            if self.eat(&Token::Semicolon) {
                if matches!(self.lex.peek(), Token::Newline | Token::Eof | Token::Dedent) {
                    break;
                }
                continue;
            }
            break;
        }
        self.eat(&Token::Newline);
        out
    }

    fn parse_def_or_class(&mut self, decorators: Vec<Expr<'src>>) -> Stmt<'src> {
        match self.lex.peek() {
            Token::KwDef => self.parse_funcdef(false, decorators),
            Token::KwClass => self.parse_classdef(decorators),
            Token::KwAsync => {
                self.lex.bump();
                self.parse_funcdef(true, decorators)
            }
            _ => self.recover_stmt(),
        }
    }

    fn parse_decorators(&mut self) -> Vec<Expr<'src>> {
        let mut decs = Vec::new();
        while self.eat(&Token::At) {
            decs.push(self.parse_test());
            self.eat(&Token::Newline);
        }
        decs
    }

    // ── graceful-degradation recovery ──────────────────────────────────────

    fn recover_stmt(&mut self) -> Stmt<'src> {
        let offset = self.lex.peek_offset();
        self.recover_stmt_from(offset)
    }

    fn recover_stmt_from(&mut self, offset: Offset) -> Stmt<'src> {
        let mut names = Vec::new();
        loop {
            match self.lex.peek() {
                Token::Newline | Token::Semicolon | Token::Eof | Token::Dedent => break,
                Token::Name(n) => {
                    let off = self.lex.peek_offset();
                    names.push((*n, off));
                    self.lex.bump();
                }
                _ => {
                    self.lex.bump();
                }
            }
        }
        Stmt {
            offset,
            kind: StmtKind::Other(names),
        }
    }

    // ── simple statements ───────────────────────────────────────────────────

    fn parse_simple_stmt(&mut self) -> Stmt<'src> {
        match self.lex.peek() {
            Token::KwImport => self.parse_import(),
            Token::KwFrom => self.parse_import_from(),
            Token::KwReturn => self.parse_return(),
            Token::KwRaise => self.parse_raise(),
            Token::KwBreak => {
                let o = self.lex.peek_offset();
                self.lex.bump();
                Stmt {
                    offset: o,
                    kind: StmtKind::Break,
                }
            }
            Token::KwContinue => {
                let o = self.lex.peek_offset();
                self.lex.bump();
                Stmt {
                    offset: o,
                    kind: StmtKind::Continue,
                }
            }
            Token::KwPass => {
                let o = self.lex.peek_offset();
                self.lex.bump();
                Stmt {
                    offset: o,
                    kind: StmtKind::Pass,
                }
            }
            Token::KwGlobal => self.parse_global_or_nonlocal(true),
            Token::KwNonlocal => self.parse_global_or_nonlocal(false),
            Token::KwDel => self.parse_delete(),
            Token::KwAssert => self.parse_assert(),
            _ => self.parse_expr_or_assign_stmt(),
        }
    }

    fn parse_dotted_name(&mut self) -> (&'src str, Offset) {
        let start = self.lex.peek_offset();
        self.expect_name();
        while matches!(self.lex.peek(), Token::Dot) {
            self.lex.bump();
            self.expect_name();
        }
        let end = self.lex.peek_offset();
        let text = self.src[start as usize..end as usize].trim_end();
        (text, start)
    }

    fn parse_import(&mut self) -> Stmt<'src> {
        let stmt_offset = self.lex.peek_offset();
        self.lex.bump();
        let mut aliases = Vec::new();
        loop {
            let (name, offset) = self.parse_dotted_name();
            let asname = if self.eat(&Token::KwAs) {
                Some(self.expect_name().0)
            } else {
                None
            };
            aliases.push(ImportAlias {
                name,
                asname,
                offset,
            });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Stmt {
            offset: stmt_offset,
            kind: StmtKind::Import(aliases),
        }
    }

    fn parse_import_from(&mut self) -> Stmt<'src> {
        let stmt_offset = self.lex.peek_offset();
        self.lex.bump();
        let mut level = 0u32;
        loop {
            match self.lex.peek() {
                Token::Dot => {
                    level += 1;
                    self.lex.bump();
                }
                Token::Ellipsis => {
                    level += 3;
                    self.lex.bump();
                }
                _ => break,
            }
        }
        let module = if matches!(self.lex.peek(), Token::KwImport) {
            None
        } else {
            Some(self.parse_dotted_name().0)
        };
        self.expect(&Token::KwImport);
        let mut names = Vec::new();
        if self.eat(&Token::Star) {
            names.push(ImportAlias {
                name: "*",
                asname: None,
                offset: stmt_offset,
            });
        } else {
            let parenthesized = self.eat(&Token::LParen);
            loop {
                if parenthesized && matches!(self.lex.peek(), Token::RParen) {
                    break;
                }
                let (name, offset) = self.expect_name();
                let asname = if self.eat(&Token::KwAs) {
                    Some(self.expect_name().0)
                } else {
                    None
                };
                names.push(ImportAlias {
                    name,
                    asname,
                    offset,
                });
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            if parenthesized {
                self.expect(&Token::RParen);
            }
        }
        Stmt {
            offset: stmt_offset,
            kind: StmtKind::ImportFrom {
                module,
                names,
                level,
            },
        }
    }

    fn parse_return(&mut self) -> Stmt<'src> {
        let o = self.lex.peek_offset();
        self.lex.bump();
        let value = if self.at_simple_stmt_end() {
            None
        } else {
            Some(self.parse_testlist_star_expr())
        };
        Stmt {
            offset: o,
            kind: StmtKind::Return(value),
        }
    }

    fn parse_raise(&mut self) -> Stmt<'src> {
        let o = self.lex.peek_offset();
        self.lex.bump();
        if self.at_simple_stmt_end() {
            return Stmt {
                offset: o,
                kind: StmtKind::Raise {
                    exc: None,
                    cause: None,
                },
            };
        }
        let exc = Some(self.parse_test());
        let cause = if self.eat(&Token::KwFrom) {
            Some(self.parse_test())
        } else {
            None
        };
        Stmt {
            offset: o,
            kind: StmtKind::Raise { exc, cause },
        }
    }

    fn parse_global_or_nonlocal(&mut self, is_global: bool) -> Stmt<'src> {
        let o = self.lex.peek_offset();
        self.lex.bump();
        let mut names = vec![self.expect_name().0];
        while self.eat(&Token::Comma) {
            names.push(self.expect_name().0);
        }
        Stmt {
            offset: o,
            kind: if is_global {
                StmtKind::Global(names)
            } else {
                StmtKind::Nonlocal(names)
            },
        }
    }

    fn parse_delete(&mut self) -> Stmt<'src> {
        let o = self.lex.peek_offset();
        self.lex.bump();
        let mut exprs = vec![self.parse_test()];
        while self.eat(&Token::Comma) {
            if self.at_simple_stmt_end() {
                break;
            }
            exprs.push(self.parse_test());
        }
        Stmt {
            offset: o,
            kind: StmtKind::Delete(exprs),
        }
    }

    fn parse_assert(&mut self) -> Stmt<'src> {
        let o = self.lex.peek_offset();
        self.lex.bump();
        let test = self.parse_test();
        let msg = if self.eat(&Token::Comma) {
            Some(self.parse_test())
        } else {
            None
        };
        Stmt {
            offset: o,
            kind: StmtKind::Assert { test, msg },
        }
    }

    fn parse_expr_or_assign_stmt(&mut self) -> Stmt<'src> {
        let offset = self.lex.peek_offset();
        let is_bare_print = matches!(self.lex.peek(), Token::Name("print"));
        let first = self.parse_testlist_star_expr();

        if self.eat(&Token::Colon) {
            let annotation = self.parse_test();
            let value = if self.eat(&Token::Eq) {
                Some(self.parse_yield_or_testlist())
            } else {
                None
            };
            return Stmt {
                offset,
                kind: StmtKind::AnnAssign {
                    target: expr_to_target(first),
                    annotation,
                    value,
                },
            };
        }
        if matches!(self.lex.peek(), Token::AugAssign) {
            self.lex.bump();
            let value = self.parse_yield_or_testlist();
            return Stmt {
                offset,
                kind: StmtKind::AugAssign {
                    target: expr_to_target(first),
                    value,
                },
            };
        }
        if matches!(self.lex.peek(), Token::Eq) {
            let mut targets = vec![expr_to_target(first)];
            let mut value = {
                self.lex.bump();
                self.parse_yield_or_testlist()
            };
            while self.eat(&Token::Eq) {
                targets.push(expr_to_target(value));
                value = self.parse_yield_or_testlist();
            }
            return Stmt {
                offset,
                kind: StmtKind::Assign { targets, value },
            };
        }

        // A bare `print` name immediately followed by another atom-starting
        // token (no operator, no call parens) between it and end-of-line is
        // the legacy Python 2 print-statement form — the one construct this
        // parser treats as a genuine syntax error rather than degrading it.
        if is_bare_print && matches!(first.kind, ExprKind::Name("print")) {
            if matches!(
                self.lex.peek(),
                Token::Name(_) | Token::Str(_) | Token::FStr(_) | Token::Number
            ) {
                self.print_statement_offsets.push(offset);
                return self.recover_stmt_from(offset);
            }
        }

        Stmt {
            offset,
            kind: StmtKind::Expr(first),
        }
    }

    // ── compound statements ─────────────────────────────────────────────────

    fn parse_if(&mut self) -> Stmt<'src> {
        let o = self.lex.peek_offset();
        self.lex.bump();
        let test = self.parse_testlist_star_expr();
        self.expect(&Token::Colon);
        let body = self.parse_block();
        let orelse = self.parse_elif_or_else();
        Stmt {
            offset: o,
            kind: StmtKind::If { test, body, orelse },
        }
    }

    fn parse_elif_or_else(&mut self) -> Vec<Stmt<'src>> {
        match self.lex.peek() {
            Token::KwElif => {
                let o = self.lex.peek_offset();
                self.lex.bump();
                let test = self.parse_testlist_star_expr();
                self.expect(&Token::Colon);
                let body = self.parse_block();
                let orelse = self.parse_elif_or_else();
                vec![Stmt {
                    offset: o,
                    kind: StmtKind::If { test, body, orelse },
                }]
            }
            Token::KwElse => {
                self.lex.bump();
                self.expect(&Token::Colon);
                self.parse_block()
            }
            _ => vec![],
        }
    }

    fn parse_while(&mut self) -> Stmt<'src> {
        let o = self.lex.peek_offset();
        self.lex.bump();
        let test = self.parse_testlist_star_expr();
        self.expect(&Token::Colon);
        let body = self.parse_block();
        let orelse = if self.eat(&Token::KwElse) {
            self.expect(&Token::Colon);
            self.parse_block()
        } else {
            vec![]
        };
        Stmt {
            offset: o,
            kind: StmtKind::While { test, body, orelse },
        }
    }

    fn parse_for(&mut self, is_async: bool) -> Stmt<'src> {
        let o = self.lex.peek_offset();
        self.lex.bump();
        let target = self.parse_for_target();
        self.expect(&Token::KwIn);
        let iter = self.parse_testlist_star_expr();
        self.expect(&Token::Colon);
        let body = self.parse_block();
        let orelse = if self.eat(&Token::KwElse) {
            self.expect(&Token::Colon);
            self.parse_block()
        } else {
            vec![]
        };
        Stmt {
            offset: o,
            kind: StmtKind::For {
                target,
                iter,
                body,
                orelse,
                is_async,
            },
        }
    }

    fn parse_with(&mut self, is_async: bool) -> Stmt<'src> {
        let o = self.lex.peek_offset();
        self.lex.bump();
        let mut items = Vec::new();
        loop {
            let context = self.parse_test();
            let target = if self.eat(&Token::KwAs) {
                Some(self.parse_single_target())
            } else {
                None
            };
            items.push(WithItem { context, target });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::Colon);
        let body = self.parse_block();
        Stmt {
            offset: o,
            kind: StmtKind::With {
                items,
                body,
                is_async,
            },
        }
    }

    fn parse_try(&mut self) -> Stmt<'src> {
        let o = self.lex.peek_offset();
        self.lex.bump();
        self.expect(&Token::Colon);
        let body = self.parse_block();
        let mut handlers = Vec::new();
        while matches!(self.lex.peek(), Token::KwExcept) {
            let ho = self.lex.peek_offset();
            self.lex.bump();
            self.eat(&Token::Star);
            let type_expr = if matches!(self.lex.peek(), Token::Colon) {
                None
            } else {
                Some(self.parse_test())
            };
            let name = if self.eat(&Token::KwAs) {
                Some(self.expect_name())
            } else {
                None
            };
            self.expect(&Token::Colon);
            let hbody = self.parse_block();
            handlers.push(ExceptHandler {
                name,
                type_expr,
                body: hbody,
                offset: ho,
            });
        }
        let orelse = if self.eat(&Token::KwElse) {
            self.expect(&Token::Colon);
            self.parse_block()
        } else {
            vec![]
        };
        let finalbody = if self.eat(&Token::KwFinally) {
            self.expect(&Token::Colon);
            self.parse_block()
        } else {
            vec![]
        };
        Stmt {
            offset: o,
            kind: StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            },
        }
    }

    fn parse_match(&mut self) -> Stmt<'src> {
        let o = self.lex.peek_offset();
        self.lex.bump();
        let subject = self.parse_testlist_star_expr();
        self.expect(&Token::Colon);
        self.expect(&Token::Newline);
        self.expect(&Token::Indent);
        let mut arms = Vec::new();
        while matches!(self.lex.peek(), Token::KwCase) {
            self.lex.bump();
            let pattern_captures = self.parse_match_pattern_captures();
            let guard = if self.eat(&Token::KwIf) {
                Some(self.parse_test())
            } else {
                None
            };
            self.expect(&Token::Colon);
            let body = self.parse_block();
            arms.push(MatchArm {
                pattern_captures,
                guard,
                body,
            });
        }
        self.eat(&Token::Dedent);
        Stmt {
            offset: o,
            kind: StmtKind::Match { subject, arms },
        }
    }

    /// Scans `case` pattern tokens up to the arm's `:`/`if`, treating every
    /// bare identifier that isn't a dotted-value reference (`Color.RED`), a
    /// class-pattern constructor name (`Point(...)`), or a keyword-pattern
    /// label (`x=`) as a capture binding.
    fn parse_match_pattern_captures(&mut self) -> Vec<(&'src str, Offset)> {
        let mut captures = Vec::new();
        let mut prev_was_dot = false;
        let mut depth = 0i32;
        loop {
            match self.lex.peek().clone() {
                Token::Colon | Token::KwIf if depth == 0 => break,
                Token::LParen | Token::LBracket | Token::LBrace => {
                    depth += 1;
                    self.lex.bump();
                    prev_was_dot = false;
                }
                Token::RParen | Token::RBracket | Token::RBrace => {
                    depth -= 1;
                    self.lex.bump();
                    prev_was_dot = false;
                }
                Token::Dot => {
                    self.lex.bump();
                    prev_was_dot = true;
                }
                Token::Name(n) => {
                    let off = self.lex.peek_offset();
                    self.lex.bump();
                    let is_value_or_call_or_label =
                        matches!(self.lex.peek(), Token::Dot | Token::LParen | Token::Eq);
                    if !prev_was_dot && !is_value_or_call_or_label && n != "_" {
                        captures.push((n, off));
                    }
                    prev_was_dot = false;
                }
                Token::Eof => break,
                _ => {
                    self.lex.bump();
                    prev_was_dot = false;
                }
            }
        }
        captures
    }

    fn parse_funcdef(&mut self, is_async: bool, decorators: Vec<Expr<'src>>) -> Stmt<'src> {
        let offset = self.lex.peek_offset();
        self.expect(&Token::KwDef);
        let (name, _) = self.expect_name();
        let args = self.parse_params();
        let returns = if self.eat(&Token::Arrow) {
            Some(self.parse_test())
        } else {
            None
        };
        self.expect(&Token::Colon);
        let body = self.parse_block();
        Stmt {
            offset,
            kind: StmtKind::FunctionDef(Box::new(FuncDef {
                name,
                offset,
                is_async,
                args,
                returns,
                decorators,
                body,
            })),
        }
    }

    fn parse_classdef(&mut self, decorators: Vec<Expr<'src>>) -> Stmt<'src> {
        let offset = self.lex.peek_offset();
        self.expect(&Token::KwClass);
        let (name, _) = self.expect_name();
        let (bases, keywords) = if self.eat(&Token::LParen) {
            let r = self.parse_arg_list(&Token::RParen);
            self.expect(&Token::RParen);
            r
        } else {
            (vec![], vec![])
        };
        self.expect(&Token::Colon);
        let body = self.parse_block();
        Stmt {
            offset,
            kind: StmtKind::ClassDef(Box::new(ClassDef {
                name,
                offset,
                bases,
                keywords,
                decorators,
                body,
            })),
        }
    }

    // ── parameter lists ──────────────────────────────────────────────────────

    fn parse_params(&mut self) -> Arguments<'src> {
        self.expect(&Token::LParen);
        let mut args = Arguments::default();
        let mut collected = Vec::new();
        let mut seen_star = false;
        loop {
            if matches!(self.lex.peek(), Token::RParen | Token::Eof) {
                break;
            }
            if matches!(self.lex.peek(), Token::Op) {
                // The only operator-shaped token valid at the start of a
                // parameter is the positional-only marker `/`.
                self.lex.bump();
                args.posonlyargs.extend(collected.drain(..));
                if !self.eat(&Token::Comma) {
                    break;
                }
                continue;
            }
            if self.eat(&Token::DblStar) {
                let a = self.parse_one_param(false);
                args.kwarg = Some(a);
                if !self.eat(&Token::Comma) {
                    break;
                }
                continue;
            }
            if self.eat(&Token::Star) {
                if matches!(self.lex.peek(), Token::Name(_)) {
                    args.vararg = Some(self.parse_one_param(false));
                }
                seen_star = true;
                if !self.eat(&Token::Comma) {
                    break;
                }
                continue;
            }
            let a = self.parse_one_param(true);
            if seen_star {
                args.kwonlyargs.push(a);
            } else {
                collected.push(a);
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        args.args = collected;
        self.expect(&Token::RParen);
        args
    }

    fn parse_one_param(&mut self, allow_default: bool) -> ArgDef<'src> {
        let (name, offset) = self.expect_name();
        let annotation = if self.eat(&Token::Colon) {
            Some(self.parse_test())
        } else {
            None
        };
        let default = if allow_default && self.eat(&Token::Eq) {
            Some(self.parse_test())
        } else {
            None
        };
        ArgDef {
            name,
            offset,
            annotation,
            default,
        }
    }

    fn parse_lambda(&mut self) -> Expr<'src> {
        let offset = self.lex.peek_offset();
        self.lex.bump();
        let args = self.parse_lambda_params();
        self.expect(&Token::Colon);
        let body = self.parse_test();
        Expr {
            offset,
            kind: ExprKind::Lambda {
                args: Box::new(args),
                body: Box::new(body),
            },
        }
    }

    fn parse_lambda_params(&mut self) -> Arguments<'src> {
        let mut args = Arguments::default();
        if matches!(self.lex.peek(), Token::Colon) {
            return args;
        }
        let mut collected = Vec::new();
        let mut seen_star = false;
        loop {
            if matches!(self.lex.peek(), Token::Colon | Token::Eof) {
                break;
            }
            if matches!(self.lex.peek(), Token::Op) {
                self.lex.bump();
                args.posonlyargs.extend(collected.drain(..));
                if !self.eat(&Token::Comma) {
                    break;
                }
                continue;
            }
            if self.eat(&Token::DblStar) {
                let (name, offset) = self.expect_name();
                args.kwarg = Some(ArgDef {
                    name,
                    offset,
                    annotation: None,
                    default: None,
                });
                if !self.eat(&Token::Comma) {
                    break;
                }
                continue;
            }
            if self.eat(&Token::Star) {
                if matches!(self.lex.peek(), Token::Name(_)) {
                    let (name, offset) = self.expect_name();
                    args.vararg = Some(ArgDef {
                        name,
                        offset,
                        annotation: None,
                        default: None,
                    });
                }
                seen_star = true;
                if !self.eat(&Token::Comma) {
                    break;
                }
                continue;
            }
            let (name, offset) = self.expect_name();
            let default = if self.eat(&Token::Eq) {
                Some(self.parse_test())
            } else {
                None
            };
            let a = ArgDef {
                name,
                offset,
                annotation: None,
                default,
            };
            if seen_star {
                args.kwonlyargs.push(a);
            } else {
                collected.push(a);
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        args.args = collected;
        args
    }

    // ── targets ──────────────────────────────────────────────────────────────

    fn parse_single_target(&mut self) -> AssignTarget<'src> {
        if self.eat(&Token::Star) {
            return AssignTarget::Starred(Box::new(self.parse_single_target()));
        }
        if self.eat(&Token::LParen) {
            let mut items = Vec::new();
            while !matches!(self.lex.peek(), Token::RParen | Token::Eof) {
                items.push(self.parse_single_target());
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::RParen);
            return AssignTarget::Tuple(items);
        }
        if self.eat(&Token::LBracket) {
            let mut items = Vec::new();
            while !matches!(self.lex.peek(), Token::RBracket | Token::Eof) {
                items.push(self.parse_single_target());
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::RBracket);
            return AssignTarget::List(items);
        }
        let atom = self.parse_atom_expr();
        expr_to_target(atom)
    }

    fn parse_for_target(&mut self) -> AssignTarget<'src> {
        let mut items = vec![self.parse_single_target()];
        while self.eat(&Token::Comma) {
            if matches!(self.lex.peek(), Token::KwIn) {
                break;
            }
            items.push(self.parse_single_target());
        }
        if items.len() == 1 {
            items.pop().expect("just checked len == 1")
        } else {
            AssignTarget::Tuple(items)
        }
    }

    // ── expressions ──────────────────────────────────────────────────────────

    fn parse_yield_or_testlist(&mut self) -> Expr<'src> {
        if matches!(self.lex.peek(), Token::KwYield) {
            self.parse_yield()
        } else {
            self.parse_testlist_star_expr()
        }
    }

    fn parse_yield(&mut self) -> Expr<'src> {
        let o = self.lex.peek_offset();
        self.lex.bump();
        if self.eat(&Token::KwFrom) {
            let e = self.parse_test();
            return Expr {
                offset: o,
                kind: ExprKind::YieldFrom(Box::new(e)),
            };
        }
        if self.at_simple_stmt_end()
            || matches!(
                self.lex.peek(),
                Token::RParen | Token::RBracket | Token::RBrace | Token::Comma
            )
        {
            return Expr {
                offset: o,
                kind: ExprKind::Yield(None),
            };
        }
        let e = self.parse_testlist_star_expr();
        Expr {
            offset: o,
            kind: ExprKind::Yield(Some(Box::new(e))),
        }
    }

    fn parse_testlist_star_expr(&mut self) -> Expr<'src> {
        let o = self.lex.peek_offset();
        let first = self.parse_star_or_test();
        if matches!(self.lex.peek(), Token::Comma) {
            let mut items = vec![first];
            while self.eat(&Token::Comma) {
                if self.is_expr_terminator() {
                    break;
                }
                items.push(self.parse_star_or_test());
            }
            return Expr {
                offset: o,
                kind: ExprKind::Tuple(items),
            };
        }
        first
    }

    fn is_expr_terminator(&mut self) -> bool {
        matches!(
            self.lex.peek(),
            Token::Newline
                | Token::Semicolon
                | Token::Eof
                | Token::Eq
                | Token::Colon
                | Token::RParen
                | Token::RBracket
                | Token::RBrace
                | Token::AugAssign
                | Token::Dedent
        )
    }

    fn parse_star_or_test(&mut self) -> Expr<'src> {
        if matches!(self.lex.peek(), Token::Star) {
            let o = self.lex.peek_offset();
            self.lex.bump();
            let inner = self.parse_or_test();
            return Expr {
                offset: o,
                kind: ExprKind::Starred(Box::new(inner)),
            };
        }
        self.parse_test()
    }

    fn parse_test(&mut self) -> Expr<'src> {
        if matches!(self.lex.peek(), Token::KwLambda) {
            return self.parse_lambda();
        }
        let o = self.lex.peek_offset();
        let body = self.parse_or_test();
        self.finish_ternary(o, body)
    }

    fn finish_ternary(&mut self, o: Offset, body: Expr<'src>) -> Expr<'src> {
        if self.eat(&Token::KwIf) {
            let cond = self.parse_or_test();
            self.expect(&Token::KwElse);
            let orelse = self.parse_test();
            return Expr {
                offset: o,
                kind: ExprKind::IfExp {
                    test: Box::new(cond),
                    body: Box::new(body),
                    orelse: Box::new(orelse),
                },
            };
        }
        body
    }

    fn parse_or_test(&mut self) -> Expr<'src> {
        let o = self.lex.peek_offset();
        let base = self.parse_unary();
        self.continue_operator_chain(o, base)
    }

    fn continue_operator_chain(&mut self, o: Offset, first: Expr<'src>) -> Expr<'src> {
        let mut operands = vec![first];
        while self.try_consume_binop() {
            operands.push(self.parse_unary());
        }
        if operands.len() == 1 {
            operands.pop().expect("just checked len == 1")
        } else {
            Expr {
                offset: o,
                kind: ExprKind::Operator(operands),
            }
        }
    }

    fn try_consume_binop(&mut self) -> bool {
        match self.lex.peek() {
            Token::Op => {
                self.lex.bump();
                true
            }
            Token::KwAnd | Token::KwOr | Token::KwIn => {
                self.lex.bump();
                true
            }
            Token::KwIs => {
                self.lex.bump();
                self.eat(&Token::KwNot);
                true
            }
            Token::KwNot => {
                // Only legitimate as infix for `not in`; anything else here
                // is malformed input, but we still make progress on it.
                self.lex.bump();
                self.eat(&Token::KwIn);
                true
            }
            _ => false,
        }
    }

    fn parse_unary(&mut self) -> Expr<'src> {
        match self.lex.peek() {
            Token::KwNot => {
                let o = self.lex.peek_offset();
                self.lex.bump();
                let inner = self.parse_unary();
                Expr {
                    offset: o,
                    kind: ExprKind::Operator(vec![inner]),
                }
            }
            Token::Op => {
                self.lex.bump();
                self.parse_unary()
            }
            Token::KwAwait => {
                let o = self.lex.peek_offset();
                self.lex.bump();
                let inner = self.parse_unary();
                Expr {
                    offset: o,
                    kind: ExprKind::Await(Box::new(inner)),
                }
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Expr<'src> {
        let o = self.lex.peek_offset();
        let base = self.parse_atom_expr();
        self.continue_power_from(o, base)
    }

    fn continue_power_from(&mut self, o: Offset, base: Expr<'src>) -> Expr<'src> {
        if self.eat(&Token::DblStar) {
            let exponent = self.parse_unary();
            return Expr {
                offset: o,
                kind: ExprKind::Operator(vec![base, exponent]),
            };
        }
        base
    }

    fn parse_atom_expr(&mut self) -> Expr<'src> {
        let atom = self.parse_atom();
        self.parse_trailers(atom)
    }

    fn parse_trailers(&mut self, mut expr: Expr<'src>) -> Expr<'src> {
        loop {
            match self.lex.peek() {
                Token::Dot => {
                    self.lex.bump();
                    let (name, off) = self.expect_name();
                    expr = Expr {
                        offset: off,
                        kind: ExprKind::Attribute(Box::new(expr), name),
                    };
                }
                Token::LParen => {
                    let off = self.lex.peek_offset();
                    self.lex.bump();
                    let (args, keywords) = self.parse_arg_list(&Token::RParen);
                    self.expect(&Token::RParen);
                    expr = Expr {
                        offset: off,
                        kind: ExprKind::Call {
                            func: Box::new(expr),
                            args,
                            keywords,
                        },
                    };
                }
                Token::LBracket => {
                    let off = self.lex.peek_offset();
                    self.lex.bump();
                    let index = self.parse_subscript();
                    self.expect(&Token::RBracket);
                    expr = Expr {
                        offset: off,
                        kind: ExprKind::Subscript(Box::new(expr), Box::new(index)),
                    };
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_subscript(&mut self) -> Expr<'src> {
        let o = self.lex.peek_offset();
        let mut parts = Vec::new();
        loop {
            if !matches!(self.lex.peek(), Token::Colon | Token::Comma | Token::RBracket) {
                parts.push(self.parse_test());
            }
            if self.eat(&Token::Colon) {
                continue;
            }
            if self.eat(&Token::Comma) {
                if matches!(self.lex.peek(), Token::RBracket) {
                    break;
                }
                continue;
            }
            break;
        }
        if parts.len() == 1 {
            parts.pop().expect("just checked len == 1")
        } else {
            Expr {
                offset: o,
                kind: ExprKind::Operator(parts),
            }
        }
    }

    fn parse_arg_list(&mut self, closer: &Token<'src>) -> (Vec<Expr<'src>>, Vec<Keyword<'src>>) {
        let mut args = Vec::new();
        let mut keywords = Vec::new();
        if self.lex.peek() == closer {
            return (args, keywords);
        }
        loop {
            match self.parse_call_arg() {
                CallArgItem::Positional(e) => args.push(e),
                CallArgItem::Keyword(k) => keywords.push(k),
            }
            if !self.eat(&Token::Comma) {
                break;
            }
            if self.lex.peek() == closer {
                break;
            }
        }
        (args, keywords)
    }

    /// Parses one call/base-class argument. Keyword detection (`name=value`)
    /// needs to know whether the token *after* a leading `Name` is `=`, but
    /// the lexer only exposes one token of lookahead — so a leading `Name` is
    /// consumed speculatively, and if it doesn't turn out to be a keyword
    /// label, expression parsing resumes from that already-consumed atom via
    /// [`Self::parse_trailers`]/[`Self::continue_operator_chain`].
    fn parse_call_arg(&mut self) -> CallArgItem<'src> {
        if self.eat(&Token::DblStar) {
            let value = self.parse_test();
            return CallArgItem::Keyword(Keyword { arg: None, value });
        }
        if matches!(self.lex.peek(), Token::Star) {
            let o = self.lex.peek_offset();
            self.lex.bump();
            let inner = self.parse_or_test();
            return self.finish_call_arg(
                o,
                Expr {
                    offset: o,
                    kind: ExprKind::Starred(Box::new(inner)),
                },
            );
        }
        if let Token::Name(n) = self.lex.peek().clone() {
            let off = self.lex.peek_offset();
            self.lex.bump();
            if self.eat(&Token::Eq) {
                let value = self.parse_test();
                return CallArgItem::Keyword(Keyword {
                    arg: Some(n),
                    value,
                });
            }
            let atom = if self.eat(&Token::Walrus) {
                let value = self.parse_test();
                Expr {
                    offset: off,
                    kind: ExprKind::NamedExpr(n, Box::new(value)),
                }
            } else {
                Expr {
                    offset: off,
                    kind: ExprKind::Name(n),
                }
            };
            let atom = self.parse_trailers(atom);
            let atom = self.continue_power_from(off, atom);
            let atom = self.continue_operator_chain(off, atom);
            let atom = self.finish_ternary(off, atom);
            return self.finish_call_arg(off, atom);
        }
        let o = self.lex.peek_offset();
        let expr = self.parse_test();
        self.finish_call_arg(o, expr)
    }

    fn finish_call_arg(&mut self, offset: Offset, expr: Expr<'src>) -> CallArgItem<'src> {
        if matches!(self.lex.peek(), Token::KwFor | Token::KwAsync) {
            let generators = self.parse_comp_for();
            return CallArgItem::Positional(Expr {
                offset,
                kind: ExprKind::GeneratorExp(Box::new(Comprehension {
                    element: expr,
                    generators,
                })),
            });
        }
        CallArgItem::Positional(expr)
    }

    fn parse_comp_for(&mut self) -> Vec<Generator<'src>> {
        let mut gens = Vec::new();
        loop {
            let is_async = self.eat(&Token::KwAsync);
            if !self.eat(&Token::KwFor) {
                break;
            }
            let target = self.parse_for_target();
            self.expect(&Token::KwIn);
            let iter = self.parse_or_test();
            let mut ifs = Vec::new();
            while self.eat(&Token::KwIf) {
                ifs.push(self.parse_or_test());
            }
            gens.push(Generator {
                target,
                iter,
                ifs,
                is_async,
            });
            if !matches!(self.lex.peek(), Token::KwFor | Token::KwAsync) {
                break;
            }
        }
        gens
    }

    fn parse_atom(&mut self) -> Expr<'src> {
        let o = self.lex.peek_offset();
        match self.lex.peek().clone() {
            Token::Name(n) => {
                self.lex.bump();
                if self.eat(&Token::Walrus) {
                    let value = self.parse_test();
                    return Expr {
                        offset: o,
                        kind: ExprKind::NamedExpr(n, Box::new(value)),
                    };
                }
                Expr {
                    offset: o,
                    kind: ExprKind::Name(n),
                }
            }
            Token::KwNone => {
                self.lex.bump();
                Expr {
                    offset: o,
                    kind: ExprKind::NoneLit,
                }
            }
            Token::KwTrue => {
                self.lex.bump();
                Expr {
                    offset: o,
                    kind: ExprKind::BoolLit(true),
                }
            }
            Token::KwFalse => {
                self.lex.bump();
                Expr {
                    offset: o,
                    kind: ExprKind::BoolLit(false),
                }
            }
            Token::Ellipsis => {
                self.lex.bump();
                Expr {
                    offset: o,
                    kind: ExprKind::EllipsisLit,
                }
            }
            Token::Number => {
                self.lex.bump();
                Expr {
                    offset: o,
                    kind: ExprKind::NumberLit,
                }
            }
            Token::Str(raw) => {
                self.lex.bump();
                let mut value = extract_str_value(raw).unwrap_or_default();
                while let Token::Str(next) = self.lex.peek().clone() {
                    self.lex.bump();
                    value.push_str(&extract_str_value(next).unwrap_or_default());
                }
                Expr {
                    offset: o,
                    kind: ExprKind::StringLit(value),
                }
            }
            Token::FStr(raw) => {
                self.lex.bump();
                let mut names = Vec::new();
                collect_fstring_names(raw, &mut names, o);
                Expr {
                    offset: o,
                    kind: ExprKind::FString(names),
                }
            }
            Token::KwLambda => self.parse_lambda(),
            Token::KwYield => self.parse_yield(),
            Token::LParen => self.parse_paren(),
            Token::LBracket => self.parse_bracket(),
            Token::LBrace => self.parse_brace(),
            Token::Star => {
                self.lex.bump();
                let inner = self.parse_or_test();
                Expr {
                    offset: o,
                    kind: ExprKind::Starred(Box::new(inner)),
                }
            }
            _ => {
                let mut names = Vec::new();
                if let Token::Name(n) = self.lex.peek().clone() {
                    names.push((n, o));
                }
                self.lex.bump();
                Expr {
                    offset: o,
                    kind: ExprKind::Other(names),
                }
            }
        }
    }

    fn parse_paren(&mut self) -> Expr<'src> {
        let o = self.lex.peek_offset();
        self.lex.bump();
        if self.eat(&Token::RParen) {
            return Expr {
                offset: o,
                kind: ExprKind::Tuple(vec![]),
            };
        }
        if matches!(self.lex.peek(), Token::KwYield) {
            let y = self.parse_yield();
            self.expect(&Token::RParen);
            return y;
        }
        let first = self.parse_star_or_test();
        if matches!(self.lex.peek(), Token::KwFor | Token::KwAsync) {
            let generators = self.parse_comp_for();
            self.expect(&Token::RParen);
            return Expr {
                offset: o,
                kind: ExprKind::GeneratorExp(Box::new(Comprehension {
                    element: first,
                    generators,
                })),
            };
        }
        if self.eat(&Token::Comma) {
            let mut items = vec![first];
            while !matches!(self.lex.peek(), Token::RParen | Token::Eof) {
                items.push(self.parse_star_or_test());
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::RParen);
            return Expr {
                offset: o,
                kind: ExprKind::Tuple(items),
            };
        }
        self.expect(&Token::RParen);
        first
    }

    fn parse_bracket(&mut self) -> Expr<'src> {
        let o = self.lex.peek_offset();
        self.lex.bump();
        if self.eat(&Token::RBracket) {
            return Expr {
                offset: o,
                kind: ExprKind::List(vec![]),
            };
        }
        let first = self.parse_star_or_test();
        if matches!(self.lex.peek(), Token::KwFor | Token::KwAsync) {
            let generators = self.parse_comp_for();
            self.expect(&Token::RBracket);
            return Expr {
                offset: o,
                kind: ExprKind::ListComp(Box::new(Comprehension {
                    element: first,
                    generators,
                })),
            };
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if matches!(self.lex.peek(), Token::RBracket) {
                break;
            }
            items.push(self.parse_star_or_test());
        }
        self.expect(&Token::RBracket);
        Expr {
            offset: o,
            kind: ExprKind::List(items),
        }
    }

    fn parse_brace(&mut self) -> Expr<'src> {
        let o = self.lex.peek_offset();
        self.lex.bump();
        if self.eat(&Token::RBrace) {
            return Expr {
                offset: o,
                kind: ExprKind::Dict(vec![]),
            };
        }
        if self.eat(&Token::DblStar) {
            let v = self.parse_or_test();
            let mut pairs = vec![(None, v)];
            while self.eat(&Token::Comma) {
                if matches!(self.lex.peek(), Token::RBrace) {
                    break;
                }
                if self.eat(&Token::DblStar) {
                    pairs.push((None, self.parse_or_test()));
                } else {
                    let k = self.parse_test();
                    self.expect(&Token::Colon);
                    let v = self.parse_test();
                    pairs.push((Some(k), v));
                }
            }
            self.expect(&Token::RBrace);
            return Expr {
                offset: o,
                kind: ExprKind::Dict(pairs),
            };
        }

        let first = self.parse_star_or_test();
        if self.eat(&Token::Colon) {
            let value = self.parse_test();
            if matches!(self.lex.peek(), Token::KwFor | Token::KwAsync) {
                let generators = self.parse_comp_for();
                self.expect(&Token::RBrace);
                return Expr {
                    offset: o,
                    kind: ExprKind::DictComp(Box::new(DictComprehension {
                        key: first,
                        value,
                        generators,
                    })),
                };
            }
            let mut pairs = vec![(Some(first), value)];
            while self.eat(&Token::Comma) {
                if matches!(self.lex.peek(), Token::RBrace) {
                    break;
                }
                if self.eat(&Token::DblStar) {
                    pairs.push((None, self.parse_or_test()));
                    continue;
                }
                let k = self.parse_test();
                self.expect(&Token::Colon);
                let v = self.parse_test();
                pairs.push((Some(k), v));
            }
            self.expect(&Token::RBrace);
            return Expr {
                offset: o,
                kind: ExprKind::Dict(pairs),
            };
        }

        if matches!(self.lex.peek(), Token::KwFor | Token::KwAsync) {
            let generators = self.parse_comp_for();
            self.expect(&Token::RBrace);
            return Expr {
                offset: o,
                kind: ExprKind::SetComp(Box::new(Comprehension {
                    element: first,
                    generators,
                })),
            };
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if matches!(self.lex.peek(), Token::RBrace) {
                break;
            }
            items.push(self.parse_star_or_test());
        }
        self.expect(&Token::RBrace);
        Expr {
            offset: o,
            kind: ExprKind::Set(items),
        }
    }
}

/// Convert a parsed expression into an assignment target. Anything that
/// isn't structurally a valid target (shouldn't happen in well-formed
/// Python) degrades to an `Attribute` wrapper so its inner names are still
/// tracked as reads rather than silently dropped.
fn expr_to_target(expr: Expr<'_>) -> AssignTarget<'_> {
    let Expr { offset, kind } = expr;
    match kind {
        ExprKind::Name(n) => AssignTarget::Name(n, offset),
        ExprKind::Tuple(items) => {
            AssignTarget::Tuple(items.into_iter().map(expr_to_target).collect())
        }
        ExprKind::List(items) => {
            AssignTarget::List(items.into_iter().map(expr_to_target).collect())
        }
        ExprKind::Starred(inner) => AssignTarget::Starred(Box::new(expr_to_target(*inner))),
        ExprKind::Attribute(base, attr) => AssignTarget::Attribute(*base, attr),
        ExprKind::Subscript(base, index) => AssignTarget::Subscript(*base, *index),
        other => AssignTarget::Attribute(Expr { offset, kind: other }, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_assign() {
        let out = parse("x = 1\n");
        assert_eq!(out.stmts.len(), 1);
        assert!(matches!(out.stmts[0].kind, StmtKind::Assign { .. }));
    }

    #[test]
    fn test_import_with_alias() {
        let out = parse("import os.path as p\n");
        match &out.stmts[0].kind {
            StmtKind::Import(aliases) => {
                assert_eq!(aliases[0].name, "os.path");
                assert_eq!(aliases[0].asname, Some("p"));
            }
            _ => panic!("expected Import"),
        }
    }

    #[test]
    fn test_from_import_multiple() {
        let out = parse("from a.b import c, d as e\n");
        match &out.stmts[0].kind {
            StmtKind::ImportFrom {
                module,
                names,
                level,
            } => {
                assert_eq!(*module, Some("a.b"));
                assert_eq!(*level, 0);
                assert_eq!(names.len(), 2);
                assert_eq!(names[1].asname, Some("e"));
            }
            _ => panic!("expected ImportFrom"),
        }
    }

    #[test]
    fn test_relative_import() {
        let out = parse("from .. import x\n");
        match &out.stmts[0].kind {
            StmtKind::ImportFrom { level, module, .. } => {
                assert_eq!(*level, 2);
                assert_eq!(*module, None);
            }
            _ => panic!("expected ImportFrom"),
        }
    }

    #[test]
    fn test_funcdef_with_default_and_decorator() {
        let out = parse("@staticmethod\ndef f(a, b=1):\n    return a + b\n");
        match &out.stmts[0].kind {
            StmtKind::FunctionDef(f) => {
                assert_eq!(f.name, "f");
                assert_eq!(f.decorators.len(), 1);
                assert_eq!(f.args.args.len(), 2);
                assert!(f.args.args[1].default.is_some());
            }
            _ => panic!("expected FunctionDef"),
        }
    }

    #[test]
    fn test_classdef_with_bases_and_keyword() {
        let out = parse("class Foo(Base, metaclass=Meta):\n    pass\n");
        match &out.stmts[0].kind {
            StmtKind::ClassDef(c) => {
                assert_eq!(c.name, "Foo");
                assert_eq!(c.bases.len(), 1);
                assert_eq!(c.keywords.len(), 1);
                assert_eq!(c.keywords[0].arg, Some("metaclass"));
            }
            _ => panic!("expected ClassDef"),
        }
    }

    #[test]
    fn test_if_elif_else() {
        let out = parse("if a:\n    x = 1\nelif b:\n    x = 2\nelse:\n    x = 3\n");
        match &out.stmts[0].kind {
            StmtKind::If { orelse, .. } => {
                assert_eq!(orelse.len(), 1);
                assert!(matches!(orelse[0].kind, StmtKind::If { .. }));
            }
            _ => panic!("expected If"),
        }
    }

    #[test]
    fn test_list_comprehension() {
        let out = parse("y = [x for x in items if x]\n");
        if let StmtKind::Assign { value, .. } = &out.stmts[0].kind {
            match &value.kind {
                ExprKind::ListComp(comp) => {
                    assert_eq!(comp.generators.len(), 1);
                    assert_eq!(comp.generators[0].ifs.len(), 1);
                }
                _ => panic!("expected ListComp"),
            }
        } else {
            panic!("expected Assign");
        }
    }

    #[test]
    fn test_lambda() {
        let out = parse("f = lambda x, y=1: x + y\n");
        if let StmtKind::Assign { value, .. } = &out.stmts[0].kind {
            assert!(matches!(value.kind, ExprKind::Lambda { .. }));
        } else {
            panic!("expected Assign");
        }
    }

    #[test]
    fn test_walrus_in_if_condition() {
        let out = parse("if (n := compute()):\n    use(n)\n");
        match &out.stmts[0].kind {
            StmtKind::If { test, .. } => {
                assert!(matches!(test.kind, ExprKind::NamedExpr("n", _)));
            }
            _ => panic!("expected If"),
        }
    }

    #[test]
    fn test_match_case_capture() {
        let out = parse(
            "match point:\n    case Point(x=px, y=py):\n        use(px, py)\n    case _:\n        pass\n",
        );
        match &out.stmts[0].kind {
            StmtKind::Match { arms, .. } => {
                assert_eq!(arms.len(), 2);
                let names: Vec<&str> =
                    arms[0].pattern_captures.iter().map(|(n, _)| *n).collect();
                assert!(names.contains(&"px"));
                assert!(names.contains(&"py"));
                assert!(!names.contains(&"x"));
            }
            _ => panic!("expected Match"),
        }
    }

    #[test]
    fn test_try_except_finally() {
        let out = parse(
            "try:\n    risky()\nexcept ValueError as e:\n    handle(e)\nfinally:\n    cleanup()\n",
        );
        match &out.stmts[0].kind {
            StmtKind::Try {
                handlers,
                finalbody,
                ..
            } => {
                assert_eq!(handlers.len(), 1);
                assert_eq!(handlers[0].name.map(|(n, _)| n), Some("e"));
                assert_eq!(finalbody.len(), 1);
            }
            _ => panic!("expected Try"),
        }
    }

    #[test]
    fn test_global_statement() {
        let out = parse("def f():\n    global x, y\n    x = 1\n");
        if let StmtKind::FunctionDef(f) = &out.stmts[0].kind {
            assert!(matches!(&f.body[0].kind, StmtKind::Global(names) if names == &["x", "y"]));
        } else {
            panic!("expected FunctionDef");
        }
    }

    #[test]
    fn test_legacy_print_statement_detected() {
        let out = parse("print foo\n");
        assert_eq!(out.print_statement_offsets.len(), 1);
    }

    #[test]
    fn test_print_call_is_not_flagged() {
        let out = parse("print(foo)\n");
        assert!(out.print_statement_offsets.is_empty());
        assert!(matches!(out.stmts[0].kind, StmtKind::Expr(_)));
    }

    #[test]
    fn test_attribute_assign_target_preserves_base_read() {
        let out = parse("a.b.c = 1\n");
        match &out.stmts[0].kind {
            StmtKind::Assign { targets, .. } => {
                assert!(matches!(targets[0], AssignTarget::Attribute(..)));
            }
            _ => panic!("expected Assign"),
        }
    }

    #[test]
    fn test_keyword_call_argument() {
        let out = parse("f(a, b=c + 1)\n");
        if let StmtKind::Expr(e) = &out.stmts[0].kind {
            if let ExprKind::Call { args, keywords, .. } = &e.kind {
                assert_eq!(args.len(), 1);
                assert_eq!(keywords.len(), 1);
                assert_eq!(keywords[0].arg, Some("b"));
            } else {
                panic!("expected Call");
            }
        } else {
            panic!("expected Expr");
        }
    }

    #[test]
    fn test_fstring_names() {
        let out = parse("x = f'{a}{b}'\n");
        if let StmtKind::Assign { value, .. } = &out.stmts[0].kind {
            if let ExprKind::FString(names) = &value.kind {
                let ns: Vec<&str> = names.iter().map(|(n, _)| *n).collect();
                assert!(ns.contains(&"a"));
                assert!(ns.contains(&"b"));
            } else {
                panic!("expected FString");
            }
        } else {
            panic!("expected Assign");
        }
    }
}
