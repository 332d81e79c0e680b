//! The symbol loader: resolve a dotted-path or expression fragment against
//! the caller's bindings, the import database, and the host runtime.
//!
//! Unlike the scope analyzer, this is a *runtime* resolution: each attribute
//! access is actually performed against the host, so a dotted reference like
//! `a.b.c` is reported missing at the longest prefix that is itself missing
//! — if `a` resolves but `a.b` doesn't, the error names `a.b`, not `a.b.c`.

use crate::bindings::BindingsStack;
use crate::dotted::DottedName;
use crate::error::{CoreError, LoadSymbolError};
use crate::importdb::ImportDb;
use crate::parser;
use crate::runtime::{Runtime, RuntimeError, Value};

/// Resolve `text` — either a dotted path (`os.path.join`) or an arbitrary
/// expression (`b64decode('aGVsbG8=')`) — against `bindings`.
///
/// When `auto_import` is set, an unresolved head (or an unresolved
/// intermediate attribute that the import database also covers as a
/// submodule) is imported before resolution continues. When `allow_eval` is
/// set, a fragment that isn't a plain dotted path is parsed and evaluated
/// against the runtime rather than rejected outright.
pub fn load_symbol(
    text: &str,
    bindings: &mut BindingsStack,
    runtime: &dyn Runtime,
    db: Option<&ImportDb>,
    auto_import: bool,
    allow_eval: bool,
) -> Result<Value, LoadSymbolError> {
    log::debug!("load_symbol({text:?}, auto_import={auto_import}, allow_eval={allow_eval})");
    if is_dotted_path(text) {
        load_dotted(text, bindings, runtime, db, auto_import)
    } else if allow_eval {
        runtime
            .eval(text, bindings)
            .map_err(|e| LoadSymbolError::new(text, CoreError::Runtime(e)))
    } else {
        Err(LoadSymbolError::new(
            text,
            CoreError::Runtime(RuntimeError::EvalFailed(format!(
                "'{text}' is not a dotted path and evaluation was not requested"
            ))),
        ))
    }
}

fn is_dotted_path(text: &str) -> bool {
    !text.is_empty()
        && text
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_alphanumeric() || c == '_'))
        && text
            .split('.')
            .next()
            .is_some_and(|first| first.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_'))
}

fn load_dotted(
    text: &str,
    bindings: &mut BindingsStack,
    runtime: &dyn Runtime,
    db: Option<&ImportDb>,
    auto_import: bool,
) -> Result<Value, LoadSymbolError> {
    let dotted = DottedName::parse(text);
    let head = dotted.head();

    let mut value = match bindings.get(head).cloned() {
        Some(v) => v,
        None => {
            if auto_import && db.is_some_and(|db| db.contains(head)) {
                import_head(head, bindings, runtime, db.unwrap())
                    .map_err(|e| LoadSymbolError::new(text, e))?;
                bindings
                    .get(head)
                    .cloned()
                    .ok_or_else(|| missing_prefix_error(text, &dotted, 1))?
            } else {
                return Err(missing_prefix_error(text, &dotted, 1));
            }
        }
    };

    for depth in 2..=dotted.len() {
        let attr = &dotted.parts()[depth - 1];
        match runtime.get_attr(&value, attr) {
            Ok(next) => value = next,
            Err(first_err) => {
                if auto_import {
                    if let Some(prefix) = dotted.prefix(depth) {
                        if let Some(db) = db {
                            if db.contains(prefix.to_string().as_str()) {
                                import_head(&prefix.to_string(), bindings, runtime, db)
                                    .map_err(|e| LoadSymbolError::new(text, e))?;
                                if let Ok(next) = runtime.get_attr(&value, attr) {
                                    value = next;
                                    continue;
                                }
                            }
                        }
                    }
                }
                return Err(LoadSymbolError::new(text, CoreError::Runtime(first_err)));
            }
        }
    }

    Ok(value)
}

fn import_head(
    head: &str,
    bindings: &mut BindingsStack,
    runtime: &dyn Runtime,
    db: &ImportDb,
) -> Result<(), CoreError> {
    for stmt in db.statements_for(head) {
        runtime
            .exec(stmt, bindings)
            .map_err(CoreError::Runtime)?;
    }
    if let Ok(module) = runtime.import_module(head) {
        bindings.writable().insert(head.to_string(), module);
    }
    Ok(())
}

fn missing_prefix_error(text: &str, dotted: &DottedName, depth: usize) -> LoadSymbolError {
    let prefix = dotted
        .prefix(depth)
        .unwrap_or_else(|| dotted.clone())
        .to_string();
    LoadSymbolError::new(
        text,
        CoreError::Runtime(RuntimeError::NotFound(prefix)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use std::collections::HashMap;

    #[test]
    fn test_load_symbol_resolves_bound_head() {
        let rt = MockRuntime::new();
        rt.register("os", Value::new("os", ()));
        let mut frame = HashMap::new();
        frame.insert("os".to_string(), Value::new("os", ()));
        let mut bindings = BindingsStack::single(frame);
        let v = load_symbol("os", &mut bindings, &rt, None, false, false).unwrap();
        assert_eq!(v.label, "os");
    }

    #[test]
    fn test_load_symbol_reports_longest_missing_prefix() {
        let rt = MockRuntime::new();
        rt.register("os", Value::new("os", ()));
        // "os.path" is deliberately NOT registered as an attribute of "os".
        let mut frame = HashMap::new();
        frame.insert("os".to_string(), Value::new("os", ()));
        let mut bindings = BindingsStack::single(frame);
        let err = load_symbol("os.path.join", &mut bindings, &rt, None, false, false).unwrap_err();
        assert_eq!(err.path, "os.path.join");
        assert!(err.cause.to_string().contains("os.path"));
    }

    #[test]
    fn test_load_symbol_auto_imports_missing_head() {
        let rt = MockRuntime::new();
        rt.register("os", Value::new("os", ()));
        let mut bindings = BindingsStack::single(HashMap::new());
        let db = ImportDb::default_table();
        let v = load_symbol("os", &mut bindings, &rt, Some(&db), true, false).unwrap();
        assert_eq!(v.label, "os");
    }

    #[test]
    fn test_load_symbol_auto_evaluates_expression() {
        let rt = MockRuntime::new();
        rt.register("b64decode('aGVsbG8=')", Value::new("b'hello'", ()));
        let mut bindings = BindingsStack::single(HashMap::new());
        let v = load_symbol(
            "b64decode('aGVsbG8=')",
            &mut bindings,
            &rt,
            None,
            false,
            true,
        )
        .unwrap();
        assert_eq!(v.label, "b'hello'");
    }

    #[test]
    fn test_load_symbol_rejects_expression_without_allow_eval() {
        let rt = MockRuntime::new();
        let mut bindings = BindingsStack::single(HashMap::new());
        assert!(load_symbol("f(1)", &mut bindings, &rt, None, false, false).is_err());
    }
}
