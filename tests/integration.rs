use std::path::PathBuf;
use std::process::Command;

use autoimport::bindings::BindingsStack;
use autoimport::runtime::{MockRuntime, Value};
use autoimport::scope::ScopeOptions;

// ── CLI helpers ──────────────────────────────────────────────────────────────

fn autoimport_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_autoimport"))
}

struct TempPy {
    dir: tempfile::TempDir,
    files: Vec<PathBuf>,
}

impl TempPy {
    fn new() -> Self {
        Self {
            dir: tempfile::TempDir::new().unwrap(),
            files: Vec::new(),
        }
    }

    fn file(&mut self, name: &str, content: &str) -> &mut Self {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        self.files.push(path);
        self
    }

    fn run(&self, extra: &[&str]) -> (String, String, i32) {
        let mut cmd = Command::new(autoimport_bin());
        for f in &self.files {
            cmd.arg(f);
        }
        for a in extra {
            cmd.arg(a);
        }
        let out = cmd.output().expect("failed to run autoimport");
        (
            String::from_utf8_lossy(&out.stdout).into_owned(),
            String::from_utf8_lossy(&out.stderr).into_owned(),
            out.status.code().unwrap_or(-1),
        )
    }

    fn run_no_exit(&self, extra: &[&str]) -> String {
        let mut args = vec!["--no-exit-code"];
        args.extend_from_slice(extra);
        let (stdout, _, _) = self.run(&args);
        stdout
    }
}

#[test]
fn test_cli_reports_missing_import() {
    let mut t = TempPy::new();
    t.file("mod.py", "os.path.join('a', 'b')\n");
    let out = t.run_no_exit(&[]);
    assert!(out.contains("AI001"));
    assert!(out.contains("os.path.join"));
}

#[test]
fn test_cli_reports_unused_import() {
    let mut t = TempPy::new();
    t.file("mod.py", "import os\nx = 1\n");
    let out = t.run_no_exit(&[]);
    assert!(out.contains("AI002"));
    assert!(out.contains("os"));
}

#[test]
fn test_cli_clean_file_exits_zero() {
    let mut t = TempPy::new();
    t.file("mod.py", "import os\nprint(os.getcwd())\n");
    let (stdout, _, code) = t.run(&[]);
    assert_eq!(code, 0);
    assert!(stdout.contains("No issues found"));
}

#[test]
fn test_cli_exit_code_nonzero_on_findings() {
    let mut t = TempPy::new();
    t.file("mod.py", "import os\nx = 1\n");
    let (_, _, code) = t.run(&[]);
    assert_eq!(code, 1);
}

#[test]
fn test_cli_json_output_shape() {
    let mut t = TempPy::new();
    t.file("mod.py", "import os\nx = 1\n");
    let out = t.run_no_exit(&["--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert!(parsed["diagnostics"].is_array());
    assert_eq!(parsed["count"], 1);
}

#[test]
fn test_cli_select_filters_by_code() {
    let mut t = TempPy::new();
    t.file("mod.py", "import os\nsys.exit()\n");
    let out = t.run_no_exit(&["--select", "AI001"]);
    assert!(out.contains("AI001"));
    assert!(!out.contains("AI002"));
}

#[test]
fn test_cli_multiple_files_scanned() {
    let mut t = TempPy::new();
    t.file("a.py", "import os\nx = 1\n");
    t.file("b.py", "import sys\ny = 1\n");
    let out = t.run_no_exit(&[]);
    assert!(out.contains("a.py"));
    assert!(out.contains("b.py"));
}

// ── library-level scenarios ──────────────────────────────────────────────────

#[test]
fn test_find_missing_imports_fully_unbound() {
    let bindings = BindingsStack::default();
    let out = autoimport::find_missing_imports(
        "os.path.join",
        &bindings,
        ScopeOptions::default(),
    );
    assert_eq!(out, vec!["os.path.join"]);
}

#[test]
fn test_find_missing_imports_bound_head_resolves() {
    let mut frame = std::collections::HashMap::new();
    frame.insert("os".to_string(), Value::new("os", ()));
    let bindings = BindingsStack::single(frame);
    let out = autoimport::find_missing_imports(
        "os.path.join",
        &bindings,
        ScopeOptions::default(),
    );
    assert!(out.is_empty());
}

#[test]
fn test_auto_import_end_to_end_with_logging() {
    let rt = MockRuntime::new();
    rt.register("os", Value::new("os", ()));
    let mut bindings = BindingsStack::single(std::collections::HashMap::new());
    let db = autoimport::importdb::ImportDb::default_table();
    let mut logger = autoimport::importer::VecLogger::default();
    let ok = autoimport::auto_import(
        "os.getcwd()\n",
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
fn test_load_symbol_proxy_module_nested_import() {
    let rt = MockRuntime::new();
    rt.register("pkg", Value::new("pkg", ()));
    rt.register("pkg.sub", Value::new("pkg.sub", ()));
    let mut frame = std::collections::HashMap::new();
    frame.insert("pkg".to_string(), Value::new("pkg", ()));
    let mut bindings = BindingsStack::single(frame);
    let v = autoimport::load_symbol("pkg.sub", &mut bindings, &rt, None, false, false).unwrap();
    assert_eq!(v.label, "pkg.sub");
}
