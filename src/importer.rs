//! The auto-importer: run the scope analyzer over a fragment and execute
//! whatever import statements the database has for each missing name's head.

use std::io;

use crate::bindings::BindingsStack;
use crate::dotted::DottedName;
use crate::importdb::ImportDb;
use crate::runtime::{Runtime, RuntimeError};
use crate::scope::{missing_references, ScopeOptions};

/// Sink for the auto-importer's `[PREFIX] <statement>` protocol lines. Tests
/// assert on this text exactly, so it's kept separate from the `log` crate's
/// diagnostic facade used elsewhere in the crate.
pub trait ImportLogger {
    fn line(&mut self, text: &str);
}

/// Collects lines into a `Vec<String>`, the default for tests and
/// `auto_eval`.
#[derive(Debug, Default)]
pub struct VecLogger {
    pub lines: Vec<String>,
}

impl ImportLogger for VecLogger {
    fn line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }
}

/// Streams lines to any writer (e.g. stderr in the CLI).
pub struct WriteLogger<W: io::Write> {
    writer: W,
}

impl<W: io::Write> WriteLogger<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: io::Write> ImportLogger for WriteLogger<W> {
    fn line(&mut self, text: &str) {
        let _ = writeln!(self.writer, "{text}");
    }
}

/// Logs a failed import statement as `[PREFIX] Error attempting to '<stmt>':
/// <ExceptionType>: <message>` followed by an unprefixed traceback header,
/// matching what a real host interpreter prints when an auto-imported
/// statement raises.
fn log_import_failure(logger: &mut dyn ImportLogger, prefix: &str, stmt: &str, err: &RuntimeError) {
    logger.line(&format!(
        "{prefix} Error attempting to '{stmt}': {}: {}",
        err.exception_name(),
        err.exception_message()
    ));
    logger.line("Traceback (most recent call last):");
}

/// Analyze `fragment` for missing names and import whatever the database
/// provides for each one's head, logging one `[PREFIX] <statement>` line per
/// statement executed (in sorted-missing-name order) and, for any import that
/// fails, a `[PREFIX] Error attempting to '<stmt>': <ExceptionType>: <msg>`
/// line followed by a traceback header. A database miss for a given name is
/// silent — it isn't this crate's job to know every importable name in
/// existence.
///
/// Returns `true` iff no import attempted during this call failed. A
/// fragment with no missing names returns `true` having logged nothing.
pub fn auto_import(
    fragment: &str,
    bindings: &mut BindingsStack,
    runtime: &dyn Runtime,
    db: &ImportDb,
    opts: ScopeOptions,
    logger: &mut dyn ImportLogger,
    prefix: &str,
) -> bool {
    let stmts = crate::parser::parse_python(fragment, "<fragment>");
    let missing = missing_references(&stmts, bindings, opts);

    let mut ok = true;
    for name in &missing {
        let dotted = DottedName::parse(name);
        let head = dotted.head();
        if !db.contains(head) {
            continue;
        }
        for stmt in db.statements_for(head) {
            match runtime.exec(stmt, bindings) {
                Ok(()) => {
                    logger.line(&format!("{prefix} {stmt}"));
                }
                Err(e) => {
                    logger.line(&format!("{prefix} {stmt}"));
                    log_import_failure(logger, prefix, stmt, &e);
                    ok = false;
                }
            }
        }
        if let Ok(module) = runtime.import_module(head) {
            bindings.writable().insert(head.to_string(), module);
        }

        if dotted.len() >= 2 {
            try_submodule_rollup(&dotted, bindings, runtime, db, logger, prefix, &mut ok);
        }
    }
    ok
}

/// For a dotted reference whose head is now bound (or was already bound),
/// attempt to import successive prefixes as submodules when a plain
/// attribute lookup on the live object would fail — e.g. `a.b.c` where `a`
/// resolves but `a.b` is a submodule that needs its own import.
fn try_submodule_rollup(
    dotted: &DottedName,
    bindings: &mut BindingsStack,
    runtime: &dyn Runtime,
    db: &ImportDb,
    logger: &mut dyn ImportLogger,
    prefix: &str,
    ok: &mut bool,
) {
    let Some(mut value) = bindings.get(dotted.head()).cloned() else {
        return;
    };
    for depth in 2..=dotted.len() {
        let attr = &dotted.parts()[depth - 1];
        match runtime.get_attr(&value, attr) {
            Ok(next) => value = next,
            Err(_) => {
                let Some(sub_prefix) = dotted.prefix(depth) else {
                    return;
                };
                let key = sub_prefix.to_string();
                if !db.contains(&key) {
                    return;
                }
                for stmt in db.statements_for(&key) {
                    match runtime.exec(stmt, bindings) {
                        Ok(()) => logger.line(&format!("{prefix} {stmt}")),
                        Err(e) => {
                            logger.line(&format!("{prefix} {stmt}"));
                            log_import_failure(logger, prefix, stmt, &e);
                            *ok = false;
                        }
                    }
                }
                match runtime.get_attr(&value, attr) {
                    Ok(next) => value = next,
                    Err(_) => return,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, Value};
    use std::collections::HashMap;

    #[test]
    fn test_auto_import_logs_executed_statement() {
        let rt = MockRuntime::new();
        rt.register("os", Value::new("os", ()));
        let mut bindings = BindingsStack::single(HashMap::new());
        let db = ImportDb::default_table();
        let mut logger = VecLogger::default();
        let ok = auto_import(
            "os.path\n",
            &mut bindings,
            &rt,
            &db,
            ScopeOptions::default(),
            &mut logger,
            "[AUTOIMPORT]",
        );
        assert!(ok);
        assert_eq!(logger.lines, vec!["[AUTOIMPORT] import os".to_string()]);
    }

    #[test]
    fn test_auto_import_silent_on_db_miss() {
        let rt = MockRuntime::new();
        let mut bindings = BindingsStack::single(HashMap::new());
        let db = ImportDb::new();
        let mut logger = VecLogger::default();
        let ok = auto_import(
            "totally_unknown_name\n",
            &mut bindings,
            &rt,
            &db,
            ScopeOptions::default(),
            &mut logger,
            "[AUTOIMPORT]",
        );
        assert!(ok);
        assert!(logger.lines.is_empty());
    }

    #[test]
    fn test_auto_import_no_missing_names_is_silent_success() {
        let rt = MockRuntime::new();
        let mut bindings = BindingsStack::single(HashMap::new());
        let db = ImportDb::default_table();
        let mut logger = VecLogger::default();
        let ok = auto_import(
            "x = 1\ny = x + 1\n",
            &mut bindings,
            &rt,
            &db,
            ScopeOptions::default(),
            &mut logger,
            "[AUTOIMPORT]",
        );
        assert!(ok);
        assert!(logger.lines.is_empty());
    }

    #[test]
    fn test_auto_import_multiple_imports_same_head_do_not_clobber() {
        let rt = MockRuntime::new();
        let mut bindings = BindingsStack::single(HashMap::new());
        let mut db = ImportDb::new();
        // Two separate statements both bind identifier "a".
        db.load_str("import a.b\nimport a.c\n").unwrap();
        let mut logger = VecLogger::default();
        let ok = auto_import(
            "a.b\n",
            &mut bindings,
            &rt,
            &db,
            ScopeOptions::default(),
            &mut logger,
            "[AUTOIMPORT]",
        );
        assert!(ok);
        assert_eq!(
            logger.lines,
            vec!["[AUTOIMPORT] import a.b".to_string(), "[AUTOIMPORT] import a.c".to_string()]
        );
    }
}
