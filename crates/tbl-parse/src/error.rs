//! Error types for table parsing.
//!
//! A [`ParseError`] is an *abort*: once an extractor returns one, the rest of
//! the current file is abandoned. Callers catch it once per file load (see
//! [`crate::parse_guarded`]) and move on to the next file.

use std::path::PathBuf;
use thiserror::Error;

/// Numeric abort codes, reported in the per-file failure log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum AbortCode {
    MissingToken = 1,
    MissingEither = 2,
    UnterminatedText = 3,
    TextTooLong = 4,
    FileOpen = 5,
    MalformedList = 6,
    UnsupportedEncoding = 7,
    Strict = 8,
    ParseInProgress = 9,
    UnbalancedBlock = 10,
    VectorOpen = 11,
    VectorClose = 12,
    UnresolvedName = 13,
    StringList = 100,
}

impl AbortCode {
    /// The numeric value written to failure logs.
    pub fn value(self) -> i32 {
        self as i32
    }
}

/// Errors that abort the parse of a single file.
#[derive(Debug, Error)]
pub enum ParseError {
    // === Token Errors ===
    /// A required literal was not found within the retry budget.
    #[error("{file}(line {line}): required token [{token}] not found")]
    MissingToken {
        file: String,
        line: usize,
        token: String,
    },

    /// None of the alternative required literals were found.
    #[error("{file}(line {line}): required one of [{}] not found", .tokens.join("], ["))]
    MissingEither {
        file: String,
        line: usize,
        tokens: Vec<String>,
    },

    // === Block Errors ===
    /// A block-terminated string has no end tag.
    #[error("{file}(line {line}): unable to find [{end}]")]
    UnterminatedText {
        file: String,
        line: usize,
        end: String,
    },

    /// A block-terminated string is longer than its destination.
    #[error("{file}(line {line}): text before [{end}] is {len} characters, {max} allowed")]
    TextTooLong {
        file: String,
        line: usize,
        end: String,
        len: usize,
        max: usize,
    },

    /// A nested `start`/`end` block is never closed.
    #[error("{file}(line {line}): unbalanced [{start}] ... [{end}] block")]
    UnbalancedBlock {
        file: String,
        line: usize,
        start: String,
        end: String,
    },

    // === List Errors ===
    /// A list did not start with its opening delimiter.
    #[error("{file}(line {line}): expected '{expected}' to start {what}, found [{found}]")]
    MalformedList {
        file: String,
        line: usize,
        what: &'static str,
        expected: char,
        found: String,
    },

    /// A string list did not start with `(`.
    #[error("{file}(line {line}): expected '(' to start string list, found [{found}]")]
    StringList {
        file: String,
        line: usize,
        found: String,
    },

    /// A parenthesized vector is missing its opening parenthesis.
    #[error("{file}(line {line}): expected '(' before vector, found [{found}]")]
    VectorOpen {
        file: String,
        line: usize,
        found: String,
    },

    /// A parenthesized vector is missing its closing parenthesis.
    #[error("{file}(line {line}): expected ')' after vector, found [{found}]")]
    VectorClose {
        file: String,
        line: usize,
        found: String,
    },

    /// A hard reference names something the resolver does not know.
    #[error("{file}(line {line}): unable to find {kind} [{name}]")]
    UnresolvedName {
        file: String,
        line: usize,
        kind: &'static str,
        name: String,
    },

    // === Source Errors ===
    /// The source file could not be opened or read.
    #[error("failed to open {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source starts with a Unicode byte-order mark.
    #[error("{file} is in {encoding} format, only single-byte text is supported")]
    UnsupportedEncoding { file: String, encoding: &'static str },

    // === Mode Errors ===
    /// A warning promoted to an abort by strict mode.
    #[error("{file}(line {line}): {message}")]
    Strict {
        file: String,
        line: usize,
        message: String,
    },

    /// A primary parse was started while another is active on this thread.
    #[error("cannot start parsing {file}: another parse is already active")]
    ParseInProgress { file: String },
}

impl ParseError {
    /// Abort code for this error.
    pub fn code(&self) -> AbortCode {
        match self {
            Self::MissingToken { .. } => AbortCode::MissingToken,
            Self::MissingEither { .. } => AbortCode::MissingEither,
            Self::UnterminatedText { .. } => AbortCode::UnterminatedText,
            Self::TextTooLong { .. } => AbortCode::TextTooLong,
            Self::UnbalancedBlock { .. } => AbortCode::UnbalancedBlock,
            Self::MalformedList { .. } => AbortCode::MalformedList,
            Self::StringList { .. } => AbortCode::StringList,
            Self::VectorOpen { .. } => AbortCode::VectorOpen,
            Self::VectorClose { .. } => AbortCode::VectorClose,
            Self::UnresolvedName { .. } => AbortCode::UnresolvedName,
            Self::FileOpen { .. } => AbortCode::FileOpen,
            Self::UnsupportedEncoding { .. } => AbortCode::UnsupportedEncoding,
            Self::Strict { .. } => AbortCode::Strict,
            Self::ParseInProgress { .. } => AbortCode::ParseInProgress,
        }
    }
}

/// Result type for parse operations.
pub type Result<T> = std::result::Result<T, ParseError>;
