//! Dotted name handling shared by the scope analyzer, loader, and importer.

use std::fmt;

/// An ordered, non-empty sequence of identifier parts (`a.b.c`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DottedName {
    parts: Vec<String>,
}

impl DottedName {
    pub fn new(parts: Vec<String>) -> Self {
        debug_assert!(!parts.is_empty(), "DottedName must have at least one part");
        Self { parts }
    }

    pub fn parse(text: &str) -> Self {
        Self::new(text.split('.').map(str::to_string).collect())
    }

    pub fn head(&self) -> &str {
        &self.parts[0]
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// `self` is a (possibly equal) prefix of `other`.
    pub fn is_prefix_of(&self, other: &DottedName) -> bool {
        self.parts.len() <= other.parts.len() && self.parts == other.parts[..self.parts.len()]
    }

    /// The prefix consisting of the first `n` parts, or `None` if `n` is out
    /// of range.
    pub fn prefix(&self, n: usize) -> Option<DottedName> {
        if n == 0 || n > self.parts.len() {
            None
        } else {
            Some(DottedName::new(self.parts[..n].to_vec()))
        }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for DottedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_roundtrip() {
        let d = DottedName::parse("os.path.join");
        assert_eq!(d.to_string(), "os.path.join");
        assert_eq!(d.head(), "os");
        assert_eq!(d.len(), 3);
    }

    #[test]
    fn test_prefix_relation() {
        let a = DottedName::parse("os.path");
        let b = DottedName::parse("os.path.join");
        assert!(a.is_prefix_of(&b));
        assert!(!b.is_prefix_of(&a));
    }

    #[test]
    fn test_prefix_extraction() {
        let d = DottedName::parse("a.b.c.d");
        assert_eq!(d.prefix(2).unwrap().to_string(), "a.b");
        assert!(d.prefix(0).is_none());
        assert!(d.prefix(5).is_none());
    }

    #[test]
    fn test_lexicographic_ordering() {
        let mut v = vec![
            DottedName::parse("b.a"),
            DottedName::parse("a.b"),
            DottedName::parse("a.a"),
        ];
        v.sort();
        let rendered: Vec<String> = v.iter().map(|d| d.to_string()).collect();
        assert_eq!(rendered, vec!["a.a", "a.b", "b.a"]);
    }
}
