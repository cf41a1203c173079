//! Parsing engine for game table files.
//!
//! Table files are line-oriented text: `#Section` headers, `$Field:` and
//! `+Option:` markers, values, parenthesized lists and `;` comments. This
//! crate loads and normalizes such files, walks them with a single cursor and
//! extracts typed values, recovering from malformed input where it can.
//!
//! # Recovery model
//!
//! - **Warnings and errors** are counted, logged with file and line, and the
//!   parse continues.
//! - **Aborts** are returned as [`ParseError`] and propagated with `?`. They
//!   are caught once per file by [`parse_guarded`], which logs the failure
//!   code so the caller can move on to the next file.
//!
//! Strict mode ([`ParseConfig::strict`]) turns every warning and error into
//! an abort.
//!
//! # Example
//!
//! ```rust,ignore
//! use tbl_parse::{ParseConfig, SourceText, parse_guarded};
//!
//! let source = SourceText::from_bytes("ships.tbl", bytes, &ParseConfig::default())?;
//! let speed = parse_guarded(source, ParseConfig::default(), |p| {
//!     p.required_string("#Ships")?;
//!     p.required_string("$Max Speed:")?;
//!     p.stuff_float()
//! })?;
//! ```
//!
//! # Architecture
//!
//! - `source.rs` - File loading, unscrambling and normalization
//! - `cursor.rs` - Byte cursor over the normalized text
//! - `parser.rs` - Parse context, token matching and diagnostics
//! - `strings.rs`, `extract.rs`, `lists.rs`, `lookup.rs` - Typed extractors
//! - `recovery.rs` - Per-file abort boundary
//! - `external.rs` - Lenient parser for snippets outside a table file

mod config;
mod cursor;
pub mod encrypt;
mod error;
mod external;
mod extract;
mod lists;
mod localize;
mod lookup;
mod parser;
mod recovery;
mod source;
mod strings;
pub mod text;
mod vfs;

// === Configuration ===
pub use config::{EDITOR_MODE_ENV_VAR, ParseConfig, STRICT_ENV_VAR};

// === Errors ===
pub use error::{AbortCode, ParseError, Result};

// === Source ===
pub use source::{
    COMMENT_CHAR, INTERNAL_FILENAME, SourceText, detect_unicode, process_raw_text,
    remap_foreign_char,
};
pub use vfs::{DirFileSystem, FileSystem, PathType};

// === Cursor and Parser ===
pub use cursor::{Checkpoint, Cursor, is_gray, is_white};
pub use parser::{Choice, Diagnostics, Parser, PausedParse, Severity, SkipOutcome};

// === Extractors ===
pub use extract::{Matrix3, Vec3};
pub use lists::{LookupKind, NameResolver, NoResolver, UNRESOLVED};
pub use lookup::string_lookup;
pub use strings::{
    DATE_LENGTH, FILESPEC_LENGTH, MESSAGE_LENGTH, MULTITEXT_LENGTH, NAME_LENGTH, NOTES_LENGTH,
    PARSE_BUF_SIZE, PATHNAME_LENGTH, StringKind, TOKEN_LENGTH,
};

// === Localization ===
pub use localize::{Localized, Localizer, NoLocalize, StringHash, StringTable, XstrLocalizer};

// === Recovery ===
pub use external::ExternalParser;
pub use recovery::{parse_file, parse_guarded};
