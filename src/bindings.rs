//! The caller-provided bindings stack.
//!
//! An ordered list of mappings (name -> value); the first is typically the
//! caller's locals, the last the globals. The auto-importer treats the last
//! mapping as writable.

use std::collections::HashMap;

use crate::runtime::Value;

#[derive(Debug, Default, Clone)]
pub struct BindingsStack {
    frames: Vec<HashMap<String, Value>>,
}

impl BindingsStack {
    pub fn new(frames: Vec<HashMap<String, Value>>) -> Self {
        Self { frames }
    }

    pub fn single(frame: HashMap<String, Value>) -> Self {
        Self {
            frames: vec![frame],
        }
    }

    /// Every identifier bound in any frame, used to seed the analyzer's
    /// module frame.
    pub fn all_keys(&self) -> impl Iterator<Item = &str> {
        self.frames.iter().flat_map(|f| f.keys().map(String::as_str))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.frames.iter().any(|f| f.contains_key(name))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.frames.iter().find_map(|f| f.get(name))
    }

    /// The writable frame (conventionally the last) — auto-import assigns
    /// newly imported names here.
    pub fn writable(&mut self) -> &mut HashMap<String, Value> {
        if self.frames.is_empty() {
            self.frames.push(HashMap::new());
        }
        self.frames
            .last_mut()
            .expect("just ensured frames is non-empty")
    }

    pub fn frames(&self) -> &[HashMap<String, Value>] {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_prefers_earlier_locals_frame_over_later_globals_frame() {
        let mut globals = HashMap::new();
        globals.insert("x".to_string(), Value::new("global-x", ()));
        let mut locals = HashMap::new();
        locals.insert("x".to_string(), Value::new("local-x", ()));
        let stack = BindingsStack::new(vec![locals, globals]);
        assert_eq!(stack.get("x").unwrap().label, "local-x");
    }

    #[test]
    fn test_writable_is_last_frame() {
        let mut stack = BindingsStack::new(vec![HashMap::new(), HashMap::new()]);
        stack
            .writable()
            .insert("os".to_string(), Value::new("os", ()));
        assert!(stack.frames()[1].contains_key("os"));
        assert!(!stack.frames()[0].contains_key("os"));
    }

    #[test]
    fn test_contains_checks_all_frames() {
        let mut locals = HashMap::new();
        locals.insert("y".to_string(), Value::new("y", ()));
        let stack = BindingsStack::new(vec![locals, HashMap::new()]);
        assert!(stack.contains("y"));
        assert!(!stack.contains("z"));
    }
}
