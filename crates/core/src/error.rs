//! Error taxonomy for every stage of the pipeline.
//!
//! Each stage owns a `thiserror` enum. [`RecError`] pairs one of them with
//! the [`Span`] it was detected at; it is the unit handed to editor and CLI
//! collaborators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A source location: file, 1-based line and 1-based column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Span {
            file: file.into(),
            line,
            column,
        }
    }

    /// A span pointing at the start of a file, for errors with no better anchor.
    pub fn file_start(file: impl Into<String>) -> Self {
        Span::new(file, 1, 1)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unterminated block comment")]
    UnterminatedComment,

    #[error("unexpected character '{0}'")]
    InvalidCharacter(char),

    /// Integer literal that does not fit in an `i64`.
    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("duplicate key '{0}' in object")]
    DuplicateKey(String),

    #[error("duplicate field '{0}' in declaration")]
    DuplicateField(String),

    #[error("duplicate variant '{0}' in enum")]
    DuplicateVariant(String),

    #[error("{0}(...) takes exactly one string literal argument")]
    InvalidLiteralArgument(String),

    #[error("unbalanced braces: {0}")]
    UnbalancedBraces(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IncludeError {
    #[error("include file not found: {path} ({reason})")]
    FileNotFound { path: String, reason: String },

    #[error("circular include: {}", chain.join(" \u{2192} "))]
    CircularInclude { chain: Vec<String> },

    #[error("duplicate declaration '{name}': first declared at {first}")]
    DuplicateDeclaration { name: String, first: Span },

    #[error("duplicate top-level key '{key}': first defined at {first}")]
    DuplicateKey { key: String, first: Span },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field '{field}' of {owner}")]
    MissingRequiredField { owner: String, field: String },

    #[error("unknown field '{field}' for {owner}")]
    UnknownField { owner: String, field: String },

    #[error("unknown type '{0}'")]
    UnknownType(String),

    #[error("enum '{enum_name}' has no variant '{variant}'")]
    UnknownVariant { enum_name: String, variant: String },

    #[error("variant {variant} expects {expected}, found {found}")]
    VariantShapeMismatch {
        variant: String,
        expected: String,
        found: String,
    },

    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("invalid url '{raw}': {reason}")]
    InvalidUrl { raw: String, reason: String },

    #[error("invalid socket address '{raw}': {reason}")]
    InvalidSocket { raw: String, reason: String },

    #[error("invalid pubkey '{raw}': {reason}")]
    InvalidPubkey { raw: String, reason: String },
}

/// The stage-specific error carried by a [`RecError`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Include(#[from] IncludeError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A diagnostic: what went wrong and where.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{span}: {kind}")]
pub struct RecError {
    pub kind: ErrorKind,
    pub span: Span,
}

impl RecError {
    pub fn new(kind: impl Into<ErrorKind>, span: Span) -> Self {
        RecError {
            kind: kind.into(),
            span,
        }
    }

    /// Short name of the stage that produced the error.
    pub fn stage(&self) -> &'static str {
        match self.kind {
            ErrorKind::Lex(_) => "lex",
            ErrorKind::Parse(_) => "parse",
            ErrorKind::Include(_) => "include",
            ErrorKind::Validation(_) => "validate",
        }
    }

    /// The variant name of the underlying error, e.g. `"TypeMismatch"`.
    pub fn code(&self) -> &'static str {
        match &self.kind {
            ErrorKind::Lex(e) => match e {
                LexError::UnterminatedString => "UnterminatedString",
                LexError::UnterminatedComment => "UnterminatedComment",
                LexError::InvalidCharacter(_) => "InvalidCharacter",
                LexError::InvalidNumber(_) => "InvalidNumber",
            },
            ErrorKind::Parse(e) => match e {
                ParseError::UnexpectedToken { .. } => "UnexpectedToken",
                ParseError::DuplicateKey(_) => "DuplicateKey",
                ParseError::DuplicateField(_) => "DuplicateField",
                ParseError::DuplicateVariant(_) => "DuplicateVariant",
                ParseError::InvalidLiteralArgument(_) => "InvalidLiteralArgument",
                ParseError::UnbalancedBraces(_) => "UnbalancedBraces",
            },
            ErrorKind::Include(e) => match e {
                IncludeError::FileNotFound { .. } => "FileNotFound",
                IncludeError::CircularInclude { .. } => "CircularInclude",
                IncludeError::DuplicateDeclaration { .. } => "DuplicateDeclaration",
                IncludeError::DuplicateKey { .. } => "DuplicateKey",
            },
            ErrorKind::Validation(e) => match e {
                ValidationError::MissingRequiredField { .. } => "MissingRequiredField",
                ValidationError::UnknownField { .. } => "UnknownField",
                ValidationError::UnknownType(_) => "UnknownType",
                ValidationError::UnknownVariant { .. } => "UnknownVariant",
                ValidationError::VariantShapeMismatch { .. } => "VariantShapeMismatch",
                ValidationError::TypeMismatch { .. } => "TypeMismatch",
                ValidationError::InvalidUrl { .. } => "InvalidUrl",
                ValidationError::InvalidSocket { .. } => "InvalidSocket",
                ValidationError::InvalidPubkey { .. } => "InvalidPubkey",
            },
        }
    }

    /// Serialize to the diagnostic JSON shape consumed by editor and CLI
    /// front ends. All keys are always present.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "code":    self.code(),
            "column":  self.span.column,
            "file":    self.span.file,
            "line":    self.span.line,
            "message": self.kind.to_string(),
            "stage":   self.stage(),
        })
    }
}
