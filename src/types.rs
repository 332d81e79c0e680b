use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    MissingImport,
    UnusedImport,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            DiagnosticKind::MissingImport => "AI001",
            DiagnosticKind::UnusedImport => "AI002",
        };
        write!(f, "{code}")
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub file: String,
    pub line: usize,
    pub col: usize,
    pub code: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} {}",
            self.file, self.line, self.col, self.code, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic {
            file: "src/foo.py".to_string(),
            line: 12,
            col: 5,
            code: DiagnosticKind::UnusedImport,
            message: "`os` imported but unused".to_string(),
        };
        assert_eq!(
            d.to_string(),
            "src/foo.py:12:5: AI002 `os` imported but unused"
        );
    }

    #[test]
    fn test_diagnostic_kind_display() {
        assert_eq!(DiagnosticKind::MissingImport.to_string(), "AI001");
        assert_eq!(DiagnosticKind::UnusedImport.to_string(), "AI002");
    }
}
