//! The import database: a mapping from a bare identifier to the import
//! statement(s) that bind it.
//!
//! The on-disk format is deliberately simple — one import statement (or a
//! blank line, or a `#` comment) per line — so it can be hand-edited and
//! diffed like any other text file. A statement is indexed under every
//! identifier it binds: the `asname` if aliased, otherwise the first dotted
//! component of the imported name. Multiple statements may bind the same
//! identifier; all of them run, in file order, when that identifier is
//! auto-imported.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::CoreError;

/// A small built-in table covering the identifiers a typical fragment of
/// code reaches for most often.
const DEFAULT_TABLE: &str = include_str!("default_importdb.txt");

#[derive(Debug, Clone, Default)]
pub struct ImportDb {
    // identifier -> ordered list of import statements that bind it.
    entries: HashMap<String, Vec<String>>,
}

impl ImportDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in default table, covering `os`, `sys`, `re`, `json`,
    /// `base64.b64decode`, `datetime`, `Path`, `defaultdict`, `OrderedDict`.
    pub fn default_table() -> Self {
        let mut db = Self::new();
        db.load_str(DEFAULT_TABLE)
            .expect("embedded default import table must parse");
        db
    }

    /// Load a database file from disk, merging into any entries already
    /// present (later files take precedence for a given identifier by being
    /// tried first — see [`ImportDb::statements_for`]).
    pub fn load_file(&mut self, path: &Path) -> Result<(), CoreError> {
        let text = fs::read_to_string(path).map_err(|source| CoreError::ImportDbLoad {
            path: path.display().to_string(),
            source,
        })?;
        self.load_str(&text).map_err(|source| CoreError::ImportDbLoad {
            path: path.display().to_string(),
            source,
        })
    }

    /// Parse import statements straight from a string, bypassing the
    /// filesystem — used to merge the embedded default table and by tests.
    pub fn load_str(&mut self, text: &str) -> Result<(), std::io::Error> {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let name = bound_identifier(line);
            self.entries
                .entry(name.to_string())
                .or_default()
                .push(line.to_string());
        }
        Ok(())
    }

    /// Every import statement registered for `identifier`, in the order they
    /// should be executed.
    pub fn statements_for(&self, identifier: &str) -> &[String] {
        self.entries
            .get(identifier)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }
}

/// Figure out which bare identifier an `import ...` / `from ... import ...`
/// line binds, without pulling in the full parser — the database format is a
/// deliberately restricted subset of import syntax.
fn bound_identifier(stmt: &str) -> &str {
    if let Some(rest) = stmt.strip_prefix("from ") {
        let (_module, imported) = rest.split_once(" import ").unwrap_or((rest, rest));
        let first = imported.split(',').next().unwrap_or(imported).trim();
        if let Some((_, asname)) = first.split_once(" as ") {
            asname.trim()
        } else {
            first
        }
    } else if let Some(rest) = stmt.strip_prefix("import ") {
        let first = rest.split(',').next().unwrap_or(rest).trim();
        if let Some((_, asname)) = first.split_once(" as ") {
            asname.trim()
        } else {
            first.split('.').next().unwrap_or(first)
        }
    } else {
        stmt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_identifier_plain_import() {
        assert_eq!(bound_identifier("import os"), "os");
    }

    #[test]
    fn test_bound_identifier_dotted_import_uses_top_package() {
        assert_eq!(bound_identifier("import os.path"), "os");
    }

    #[test]
    fn test_bound_identifier_aliased_import() {
        assert_eq!(bound_identifier("import numpy as np"), "np");
    }

    #[test]
    fn test_bound_identifier_from_import() {
        assert_eq!(bound_identifier("from base64 import b64decode"), "b64decode");
    }

    #[test]
    fn test_bound_identifier_from_import_aliased() {
        assert_eq!(
            bound_identifier("from collections import OrderedDict as OD"),
            "OD"
        );
    }

    #[test]
    fn test_load_str_skips_blank_and_comment_lines() {
        let mut db = ImportDb::new();
        db.load_str("# a comment\n\nimport os\n").unwrap();
        assert_eq!(db.statements_for("os"), &["import os".to_string()]);
    }

    #[test]
    fn test_multiple_statements_same_identifier_preserved() {
        let mut db = ImportDb::new();
        db.load_str("import a.b\nimport a.c\n").unwrap();
        assert_eq!(
            db.statements_for("a"),
            &["import a.b".to_string(), "import a.c".to_string()]
        );
    }

    #[test]
    fn test_default_table_covers_common_identifiers() {
        let db = ImportDb::default_table();
        assert!(db.contains("os"));
        assert!(db.contains("sys"));
        assert!(db.contains("re"));
        assert!(db.contains("json"));
        assert!(db.contains("b64decode"));
        assert!(db.contains("Path"));
        assert!(db.contains("defaultdict"));
        assert!(db.contains("OrderedDict"));
    }
}
