//! Error types for compilation and encoding

use std::fmt;

/// A single reason a statement or block was rejected
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MplError {
    /// Malformed statement or block structure
    #[error("Syntax error: {reason}")]
    Syntax { reason: String },

    #[error("Unknown bone: {bone}")]
    UnknownBone { bone: String },

    /// Unrecognized action word, or an action the bone does not support
    #[error("Bone {bone} cannot {action}")]
    UnknownAction { bone: String, action: String },

    /// Unrecognized direction word, or a direction the action does not support
    #[error("{bone} {action} has no direction {direction}")]
    UnknownDirection {
        bone: String,
        action: String,
        direction: String,
    },

    /// Non-numeric, negative or over-limit amount
    #[error("{bone} {action} {direction} takes 0 to {limit}, got {value}")]
    DegreeRange {
        bone: String,
        action: String,
        direction: String,
        value: String,
        limit: f32,
    },

    /// Animation timestamps must strictly increase
    #[error("Timestamp {time} does not come after {previous}")]
    TimelineOrder { previous: f32, time: f32 },

    #[error("Duplicate name: {name}")]
    DuplicateName { name: String },

    #[error("Unknown {kind}: {name}")]
    UnknownReference { kind: &'static str, name: String },

    /// Two poses joined with `&` both set the same bone
    #[error("Bone {bone} is set by both {first} and {second}")]
    CombinationConflict {
        bone: String,
        first: String,
        second: String,
    },

    /// A rule table or solver invariant no longer holds
    #[error("Internal invariant violated: {reason}")]
    InternalInvariant { reason: String },
}

impl MplError {
    pub fn syntax(reason: impl Into<String>) -> Self {
        Self::Syntax {
            reason: reason.into(),
        }
    }

    /// Stable kind name for tooling and JS callers
    #[inline]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "Syntax",
            Self::UnknownBone { .. } => "UnknownBone",
            Self::UnknownAction { .. } => "UnknownAction",
            Self::UnknownDirection { .. } => "UnknownDirection",
            Self::DegreeRange { .. } => "DegreeRange",
            Self::TimelineOrder { .. } => "TimelineOrder",
            Self::DuplicateName { .. } => "DuplicateName",
            Self::UnknownReference { .. } => "UnknownReference",
            Self::CombinationConflict { .. } => "CombinationConflict",
            Self::InternalInvariant { .. } => "InternalInvariant",
        }
    }
}

/// An error attributed to a line of the input
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// 1-based line number
    pub line: usize,
    /// Offending statement or block header
    pub source: String,
    pub error: MplError,
}

impl Diagnostic {
    pub fn new(line: usize, source: impl Into<String>, error: MplError) -> Self {
        Self {
            line,
            source: source.into(),
            error,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.source.is_empty() {
            write!(f, "Line {}: {}", self.line, self.error)
        } else {
            write!(f, "Line {}: {} ({})", self.line, self.error, self.source)
        }
    }
}

/// Every diagnostic collected while compiling one input.
/// Any diagnostic rejects the whole input.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn single(line: usize, source: impl Into<String>, error: MplError) -> Self {
        Self::new(vec![Diagnostic::new(line, source, error)])
    }

    /// First error, in input order
    pub fn first(&self) -> Option<&MplError> {
        self.diagnostics.first().map(|d| &d.error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &MplError> {
        self.diagnostics.iter().map(|d| &d.error)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileError {}

/// Failure while writing VMD motion data
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("Name {name} does not fit {capacity} Shift_JIS bytes")]
    NameTooLong { name: String, capacity: usize },

    #[error("Name {name} has characters outside Shift_JIS")]
    UnencodableName { name: String },

    #[error("Time {time}s is not a valid frame number")]
    FrameOverflow { time: f32 },

    #[error("Too many bone records: {count}")]
    TooManyRecords { count: usize },
}

/// Top-level error for the compiler facade
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display_includes_line_and_source() {
        let diagnostic = Diagnostic::new(
            3,
            "foot_l bend forward 10",
            MplError::UnknownBone {
                bone: "foot_l".to_string(),
            },
        );
        assert_eq!(
            diagnostic.to_string(),
            "Line 3: Unknown bone: foot_l (foot_l bend forward 10)"
        );
    }

    #[test]
    fn test_compile_error_lists_every_diagnostic() {
        let error = CompileError::new(vec![
            Diagnostic::new(1, "", MplError::syntax("missing ';'")),
            Diagnostic::new(
                2,
                "",
                MplError::DuplicateName {
                    name: "wave".to_string(),
                },
            ),
        ]);
        let text = error.to_string();
        assert_eq!(text.lines().count(), 2);
        assert_eq!(error.first().map(MplError::kind), Some("Syntax"));
        assert_eq!(error.errors().count(), 2);
    }
}
