//! Static scope analysis and auto-import core for Python source.
//!
//! This crate finds names a fragment of source references but never binds,
//! and can drive a host runtime to import and evaluate those fragments. It
//! does not embed a Python interpreter: callers inject their own bindings
//! and implement [`runtime::Runtime`] against whatever interpreter they
//! actually have.

pub mod ast;
pub mod bindings;
pub mod config;
pub mod dotted;
pub mod error;
pub mod evaluator;
pub mod importdb;
pub mod importer;
pub mod lexer;
pub mod loader;
pub mod names;
pub mod parser;
pub mod runtime;
pub mod scope;
pub mod unused;

use bindings::BindingsStack;
use error::LoadSymbolError;
use importdb::ImportDb;
use importer::ImportLogger;
use runtime::{Runtime, Value};
use scope::ScopeOptions;

/// Parse `source` and return every dotted name it references but does not
/// bind, sorted and de-duplicated.
pub fn find_missing_imports(
    source: &str,
    bindings: &BindingsStack,
    opts: ScopeOptions,
) -> Vec<String> {
    let stmts = parser::parse_python(source, "<fragment>");
    scope::missing_references(&stmts, bindings, opts)
}

/// Parse `source` and return every import statement whose bound name is
/// never referenced elsewhere in the file and isn't re-exported via
/// `__all__`.
pub fn find_unused_imports(source: &str) -> Vec<unused::UnusedImport> {
    let stmts = parser::parse_python(source, "<fragment>");
    unused::unused_imports(&stmts)
}

/// Resolve a dotted path or expression fragment against `bindings`. See
/// [`loader::load_symbol`] for the full contract.
pub fn load_symbol(
    text: &str,
    bindings: &mut BindingsStack,
    runtime: &dyn Runtime,
    db: Option<&ImportDb>,
    auto_import_enabled: bool,
    allow_eval: bool,
) -> Result<Value, LoadSymbolError> {
    loader::load_symbol(text, bindings, runtime, db, auto_import_enabled, allow_eval)
}

/// Auto-import whatever `fragment` is missing. See [`importer::auto_import`]
/// for the full contract.
pub fn auto_import(
    fragment: &str,
    bindings: &mut BindingsStack,
    runtime: &dyn Runtime,
    db: &ImportDb,
    opts: ScopeOptions,
    logger: &mut dyn ImportLogger,
    prefix: &str,
) -> bool {
    importer::auto_import(fragment, bindings, runtime, db, opts, logger, prefix)
}

/// Auto-import and evaluate `fragment`. See [`evaluator::auto_eval`] for the
/// full contract.
pub fn auto_eval(
    fragment: &str,
    bindings: &mut BindingsStack,
    runtime: &dyn Runtime,
    db: &ImportDb,
    opts: ScopeOptions,
    flags: u32,
    auto_flags: u32,
) -> Result<Option<Value>, error::CoreError> {
    evaluator::auto_eval(fragment, bindings, runtime, db, opts, flags, auto_flags)
}
