//! Host runtime abstraction.
//!
//! This crate analyzes Python source without embedding a Python interpreter,
//! so "import a module" and "evaluate an expression" are expressed against a
//! trait the caller supplies — the same injected-bindings seam the scope
//! analyzer uses for test isolation. [`MockRuntime`] is the in-memory fake
//! this crate's own test suite runs against, and a usable starting point for
//! embedders who haven't wired up a real interpreter.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::bindings::BindingsStack;

/// An opaque, cheaply-cloneable handle to a host-language value. The core
/// never inspects the contents beyond passing it through bindings maps and
/// displaying its label in log lines.
#[derive(Clone)]
pub struct Value {
    pub label: String,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Value {
    pub fn new(label: impl Into<String>, inner: impl Any + Send + Sync) -> Self {
        Self {
            label: label.into(),
            inner: Arc::new(inner),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({})", self.label)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("no such module or attribute: {0}")]
    NotFound(String),
    #[error("evaluation failed: {0}")]
    EvalFailed(String),
    #[error("execution failed: {0}")]
    ExecFailed(String),
}

impl RuntimeError {
    /// A host-exception-style type name for this failure, for log lines that
    /// mimic `ExceptionType: message` rather than this crate's own `Display`.
    pub fn exception_name(&self) -> &'static str {
        match self {
            RuntimeError::NotFound(_) => "ImportError",
            RuntimeError::EvalFailed(_) => "NameError",
            RuntimeError::ExecFailed(_) => "Exception",
        }
    }

    pub fn exception_message(&self) -> &str {
        match self {
            RuntimeError::NotFound(m) | RuntimeError::EvalFailed(m) | RuntimeError::ExecFailed(m) => m,
        }
    }
}

/// The seam between this crate's pure analysis core and a real host
/// language's import/eval machinery.
pub trait Runtime {
    fn import_module(&self, dotted: &str) -> Result<Value, RuntimeError>;
    fn get_attr(&self, value: &Value, attr: &str) -> Result<Value, RuntimeError>;
    fn eval(&self, expr: &str, bindings: &BindingsStack) -> Result<Value, RuntimeError>;
    fn exec(&self, stmts: &str, bindings: &BindingsStack) -> Result<(), RuntimeError>;
}

/// An in-memory fake module/attribute registry. Modules are registered with
/// their full dotted path; attribute access on a registered module looks up
/// `"<module>.<attr>"` in the same registry, modeling a `__getattr__`-style
/// lazy submodule loader when that combined key is itself a registered
/// module.
#[derive(Default)]
pub struct MockRuntime {
    registry: Mutex<HashMap<String, Value>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module or attribute value under a dotted path.
    pub fn register(&self, dotted: impl Into<String>, value: Value) {
        self.registry
            .lock()
            .expect("MockRuntime registry mutex poisoned")
            .insert(dotted.into(), value);
    }
}

impl Runtime for MockRuntime {
    fn import_module(&self, dotted: &str) -> Result<Value, RuntimeError> {
        self.registry
            .lock()
            .expect("MockRuntime registry mutex poisoned")
            .get(dotted)
            .cloned()
            .ok_or_else(|| RuntimeError::NotFound(dotted.to_string()))
    }

    fn get_attr(&self, value: &Value, attr: &str) -> Result<Value, RuntimeError> {
        let key = format!("{}.{}", value.label, attr);
        self.registry
            .lock()
            .expect("MockRuntime registry mutex poisoned")
            .get(&key)
            .cloned()
            .ok_or_else(|| RuntimeError::NotFound(key))
    }

    fn eval(&self, expr: &str, _bindings: &BindingsStack) -> Result<Value, RuntimeError> {
        self.registry
            .lock()
            .expect("MockRuntime registry mutex poisoned")
            .get(expr)
            .cloned()
            .ok_or_else(|| RuntimeError::EvalFailed(expr.to_string()))
    }

    fn exec(&self, _stmts: &str, _bindings: &BindingsStack) -> Result<(), RuntimeError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runtime_import_and_attr() {
        let rt = MockRuntime::new();
        rt.register("os", Value::new("os", ()));
        rt.register("os.path", Value::new("os.path", ()));
        let os = rt.import_module("os").unwrap();
        let path = rt.get_attr(&os, "path").unwrap();
        assert_eq!(path.label, "os.path");
    }

    #[test]
    fn test_mock_runtime_not_found() {
        let rt = MockRuntime::new();
        assert!(rt.import_module("nope").is_err());
    }

    #[test]
    fn test_lazy_submodule_attr_access() {
        // A proxy module whose attribute access itself performs a nested
        // import: requesting `pkg.sub` as an attribute of `pkg` succeeds
        // because `pkg.sub` was separately registered, modeling
        // `__getattr__`-based lazy submodule loading.
        let rt = MockRuntime::new();
        rt.register("pkg", Value::new("pkg", ()));
        rt.register("pkg.sub", Value::new("pkg.sub", ()));
        let pkg = rt.import_module("pkg").unwrap();
        let sub = rt.get_attr(&pkg, "sub").unwrap();
        assert_eq!(sub.label, "pkg.sub");
    }
}
