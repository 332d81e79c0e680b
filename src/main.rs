mod analyze;
mod discovery;
mod location;
mod types;

use clap::Parser;
use colored::Colorize;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::process;

use autoimport::config::Config;
use autoimport::scope::ScopeOptions;

#[derive(Parser)]
#[command(
    name = "autoimport",
    about = "Finds names a Python file references but never imports, and imports it never uses",
    version,
    long_about = "autoimport statically analyzes Python source for missing and unused imports.\n\n\
                  Pass one or more files or directories to scan; pass `.` to scan the current \
                  directory. Use --fix to prepend the missing imports it can resolve via the \
                  import database directly into each file."
)]
struct Cli {
    /// Paths to analyse (files or directories). Pass `.` to scan the current directory.
    #[arg()]
    paths: Vec<PathBuf>,

    /// Additional import-database file to load (repeatable).
    #[arg(long = "db", value_name = "PATH")]
    db_paths: Vec<PathBuf>,

    /// Path to an `autoimport.toml` config file.
    #[arg(long, value_name = "PATH", default_value = "autoimport.toml")]
    config: PathBuf,

    /// Only report the given comma-separated diagnostic codes (e.g. --select AI001).
    #[arg(long, value_delimiter = ',')]
    select: Option<Vec<String>>,

    /// Exclude directories or files whose path contains any of the given
    /// comma-separated names (e.g. --exclude tests,migrations,vendor).
    #[arg(long, value_delimiter = ',')]
    exclude: Option<Vec<String>>,

    /// Emit results as JSON instead of the default text format.
    #[arg(long)]
    json: bool,

    /// Prepend resolvable missing imports directly into each scanned file.
    #[arg(long)]
    fix: bool,

    /// Exit with code 0 even when issues are found (useful in CI with --json).
    #[arg(long)]
    no_exit_code: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.paths.is_empty() {
        eprintln!("{}", "usage: autoimport [OPTIONS] <PATHS>...".yellow());
        eprintln!("Run `autoimport --help` for details.");
        return;
    }

    let config = match Config::load_or_default(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            process::exit(2);
        }
    };
    let config = config.with_overrides(cli.db_paths.clone(), None, None);

    let opts = ScopeOptions {
        list_comprehension_leak: config.list_comprehension_leak,
    };

    let exclude: Vec<String> = cli.exclude.unwrap_or_default();

    let mut files = Vec::new();
    for path in &cli.paths {
        if path.is_file() {
            files.push(path.clone());
        } else {
            match discovery::discover_python_files(path, &exclude) {
                Ok(found) => files.extend(found),
                Err(e) => {
                    eprintln!("{}: {e}", "error".red().bold());
                    process::exit(2);
                }
            }
        }
    }

    let mut diagnostics = match analyze::analyze_files(&files, opts) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            process::exit(2);
        }
    };

    if let Some(ref selected) = cli.select {
        diagnostics.retain(|d| selected.contains(&d.code.to_string()));
    }

    diagnostics.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then(a.line.cmp(&b.line))
            .then(a.col.cmp(&b.col))
    });

    if cli.fix {
        apply_fixes(&files, &config);
    }

    if cli.json {
        print_json(&diagnostics);
    } else {
        for d in &diagnostics {
            println!("{d}");
        }
        if diagnostics.is_empty() {
            println!("{}", "No issues found".green());
        } else {
            let count = diagnostics.len();
            println!("{}", format!("Found {count} issue(s)").yellow().bold());
        }
    }

    if !cli.no_exit_code && !diagnostics.is_empty() {
        process::exit(1);
    }
}

/// Prepend whatever imports the database can resolve for each file's missing
/// names. This is the only place this crate mutates `.py` text on disk —
/// a CLI-level convenience layered on top of the pure analysis core, not
/// something the core itself does.
fn apply_fixes(files: &[PathBuf], config: &Config) {
    let mut db = autoimport::importdb::ImportDb::default_table();
    for path in &config.db_paths {
        if let Err(e) = db.load_file(path) {
            eprintln!("{}: {e}", "error".red().bold());
        }
    }

    for path in files {
        let Ok(source) = fs::read_to_string(path) else {
            continue;
        };
        let bindings = autoimport::bindings::BindingsStack::default();
        let missing = autoimport::find_missing_imports(
            &source,
            &bindings,
            ScopeOptions {
                list_comprehension_leak: config.list_comprehension_leak,
            },
        );

        let mut statements = Vec::new();
        for name in &missing {
            let head = name.split('.').next().unwrap_or(name);
            for stmt in db.statements_for(head) {
                if !statements.contains(stmt) {
                    statements.push(stmt.clone());
                }
            }
        }

        if statements.is_empty() {
            continue;
        }
        let mut new_source = statements.join("\n");
        new_source.push('\n');
        new_source.push_str(&source);
        if let Err(e) = fs::write(path, new_source) {
            eprintln!("{}: {e}", "error".red().bold());
        }
    }
}

/// Emit valid, well-formatted JSON using serde_json.
fn print_json(diagnostics: &[types::Diagnostic]) {
    let items: Vec<serde_json::Value> = diagnostics
        .iter()
        .map(|d| {
            json!({
                "file":    d.file,
                "line":    d.line,
                "col":     d.col,
                "code":    d.code.to_string(),
                "message": d.message,
            })
        })
        .collect();

    let output = json!({
        "diagnostics": items,
        "count":       diagnostics.len(),
    });

    println!(
        "{}",
        serde_json::to_string_pretty(&output).expect("serde_json::Value is always serialisable")
    );
}
