//! The auto-evaluator: parse a fragment (retrying once via `auto_flags` on a
//! syntax error), auto-import anything it references, then evaluate it.

use crate::bindings::BindingsStack;
use crate::error::{CoreError, SyntaxError};
use crate::importdb::ImportDb;
use crate::importer::{auto_import, ImportLogger, VecLogger};
use crate::parser;
use crate::runtime::{Runtime, Value};
use crate::scope::ScopeOptions;

/// Bitmask of parser compatibility flags an `auto_eval` retry may apply.
/// Only `PRINT_FUNCTION` has observable effect in this crate — when set, a
/// legacy `print expr` statement is a syntax error, since `print` is a
/// function and that syntax no longer parses as one.
pub mod auto_flags {
    pub const NONE: u32 = 0;
    pub const PRINT_FUNCTION: u32 = 1 << 0;
}

/// Evaluate `fragment` against `bindings`, auto-importing any names the
/// scope analyzer finds missing first.
///
/// A single-expression fragment is evaluated and its value returned; a
/// fragment of one or more statements is executed for effect and `None` is
/// returned. A persistent syntax error (one `auto_flags` retry doesn't fix)
/// is returned unchanged as [`CoreError::Syntax`].
pub fn auto_eval(
    fragment: &str,
    bindings: &mut BindingsStack,
    runtime: &dyn Runtime,
    db: &ImportDb,
    opts: ScopeOptions,
    flags: u32,
    auto_flags: u32,
) -> Result<Option<Value>, CoreError> {
    let output = parser::parse(fragment);

    let effective_flags = if !output.print_statement_offsets.is_empty() {
        flags | auto_flags
    } else {
        flags
    };

    if effective_flags & auto_flags::PRINT_FUNCTION != 0 && !output.print_statement_offsets.is_empty()
    {
        return Err(CoreError::Syntax(SyntaxError {
            message: "Missing parentheses in call to 'print'".to_string(),
            offset: output.print_statement_offsets[0],
        }));
    }

    let mut logger = VecLogger::default();
    auto_import(
        fragment,
        bindings,
        runtime,
        db,
        opts,
        &mut logger as &mut dyn ImportLogger,
        "[AUTOIMPORT]",
    );

    if let [stmt] = output.stmts.as_slice() {
        if let crate::ast::StmtKind::Expr(expr) = &stmt.kind {
            if let crate::ast::ExprKind::Name(name) = &expr.kind {
                if let Some(v) = bindings.get(name) {
                    return Ok(Some(v.clone()));
                }
            }
            let text = fragment.trim();
            return runtime
                .eval(text, bindings)
                .map(Some)
                .map_err(CoreError::Runtime);
        }
    }

    runtime
        .exec(fragment, bindings)
        .map(|()| None)
        .map_err(CoreError::Runtime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use std::collections::HashMap;

    #[test]
    fn test_auto_eval_evaluates_single_expression() {
        let rt = MockRuntime::new();
        rt.register("b64decode('aGVsbG8=')", Value::new("b'hello'", ()));
        let mut bindings = BindingsStack::single(HashMap::new());
        let db = ImportDb::default_table();
        let result = auto_eval(
            "b64decode('aGVsbG8=')",
            &mut bindings,
            &rt,
            &db,
            ScopeOptions::default(),
            0,
            0,
        )
        .unwrap();
        assert_eq!(result.unwrap().label, "b'hello'");
    }

    #[test]
    fn test_auto_eval_executes_statement_fragment_returns_none() {
        let rt = MockRuntime::new();
        let mut bindings = BindingsStack::single(HashMap::new());
        let db = ImportDb::default_table();
        let result = auto_eval(
            "x = 1\n",
            &mut bindings,
            &rt,
            &db,
            ScopeOptions::default(),
            0,
            0,
        )
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_auto_eval_accepts_legacy_print_statement_without_print_function_flag() {
        let rt = MockRuntime::new();
        let mut bindings = BindingsStack::single(HashMap::new());
        let db = ImportDb::default_table();
        let result = auto_eval(
            "print 'hi'\n",
            &mut bindings,
            &rt,
            &db,
            ScopeOptions::default(),
            0,
            0,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_auto_eval_rejects_legacy_print_statement_with_print_function_flag() {
        let rt = MockRuntime::new();
        let mut bindings = BindingsStack::single(HashMap::new());
        let db = ImportDb::default_table();
        let err = auto_eval(
            "print 'hi'\n",
            &mut bindings,
            &rt,
            &db,
            ScopeOptions::default(),
            0,
            auto_flags::PRINT_FUNCTION,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Syntax(_)));
    }
}
