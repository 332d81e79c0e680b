use crate::location::offset_to_line_col;
use crate::types::{Diagnostic, DiagnosticKind};
use anyhow::Result;
use autoimport::bindings::BindingsStack;
use autoimport::scope::ScopeOptions;
use autoimport::unused::UnusedImport;
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;

struct FileAnalysis {
    diags: Vec<Diagnostic>,
}

/// Run both the missing-import and unused-import analyses over every file,
/// in parallel — each file's pair of passes is independent of every other
/// file's, so there's no cross-file merge step the way Reaper's dead-code
/// checks need one.
pub fn analyze_files(files: &[PathBuf], opts: ScopeOptions) -> Result<Vec<Diagnostic>> {
    log::debug!("analyzing {} file(s)", files.len());
    let analyses: Vec<FileAnalysis> = files
        .par_iter()
        .filter_map(|path| analyze_file(path, opts).ok())
        .collect();

    let diags: Vec<Diagnostic> = analyses.into_iter().flat_map(|a| a.diags).collect();
    log::info!("found {} diagnostic(s) across {} file(s)", diags.len(), files.len());
    Ok(diags)
}

fn analyze_file(path: &PathBuf, opts: ScopeOptions) -> Result<FileAnalysis> {
    let source = fs::read_to_string(path)?;
    let filename = path.display().to_string();
    log::debug!("scanning {filename}");

    let mut diags = Vec::new();

    let bindings = BindingsStack::default();
    for missing in autoimport::find_missing_imports(&source, &bindings, opts) {
        diags.push(Diagnostic {
            file: filename.clone(),
            line: 1,
            col: 1,
            code: DiagnosticKind::MissingImport,
            message: format!("`{missing}` used but never imported"),
        });
    }

    for unused in autoimport::find_unused_imports(&source) {
        let UnusedImport { bound_name, offset } = unused;
        let (line, col) = offset_to_line_col(offset as usize, &source);
        diags.push(Diagnostic {
            file: filename.clone(),
            line,
            col,
            code: DiagnosticKind::UnusedImport,
            message: format!("`{bound_name}` imported but unused"),
        });
    }

    Ok(FileAnalysis { diags })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_analyze_file_reports_missing_and_unused() {
        let mut f = NamedTempFile::with_suffix(".py").unwrap();
        writeln!(f, "import sys\nos.path.join('a')\n").unwrap();
        let analysis = analyze_file(&f.path().to_path_buf(), ScopeOptions::default()).unwrap();
        let codes: Vec<&DiagnosticKind> = analysis.diags.iter().map(|d| &d.code).collect();
        assert!(codes.contains(&&DiagnosticKind::MissingImport));
        assert!(codes.contains(&&DiagnosticKind::UnusedImport));
    }
}
