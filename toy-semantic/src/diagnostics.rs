use std::fmt;

use serde::Serialize;
use toy_core::Location;
use toy_syntax::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DiagnosticCode {
    DuplicateDeclaration,
    UnknownType,
    InvalidSuperclass,
}

impl DiagnosticCode {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::DuplicateDeclaration => "duplicate-declaration",
            DiagnosticCode::UnknownType => "unknown-type",
            DiagnosticCode::InvalidSuperclass => "invalid-superclass",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A problem in the user's source. Logging one never stops resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemanticDiagnostic {
    pub node: NodeId,
    pub location: Location,
    pub code: DiagnosticCode,
    pub message: String,
}

impl fmt::Display for SemanticDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [{}] {}", self.location, self.code, self.message)
    }
}
