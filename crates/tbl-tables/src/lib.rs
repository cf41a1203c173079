//! Modular tables and record registries.
//!
//! A table kind is loaded from a default compiled into the binary, an
//! optional base file and any number of overlay files. Overlays can add
//! records or patch existing ones with `+nocreate`.
//!
//! # Example
//!
//! ```rust,ignore
//! use tbl_parse::DirFileSystem;
//! use tbl_tables::{LoadConfig, load_ai_profiles};
//!
//! let fs = DirFileSystem::new("data");
//! let (profiles, outcome) = load_ai_profiles(&fs, &LoadConfig::default())?;
//! for failure in &outcome.failures {
//!     eprintln!("{}: {}", failure.file, failure.error);
//! }
//! let active = profiles.default_record();
//! ```
//!
//! # Architecture
//!
//! - `registry.rs` - Named records with template seeding
//! - `modular.rs` - The layered loader and the per-file grammar
//! - `ai_profiles.rs` - AI profiles, the built-in table kind
//! - `error.rs` - Errors that stop a load outright

mod ai_profiles;
mod embedded;
mod error;
mod modular;
mod registry;

// === Errors ===
pub use error::{Result, TableError};

// === Registry ===
pub use registry::{Record, Registry};

// === Modular Loading ===
pub use modular::{
    END_TAG, FileFailure, LoadConfig, LoadOutcome, NO_CREATE, TableKind, load_kind, load_registry,
    parse_table,
};

// === AI Profiles ===
pub use ai_profiles::{
    AiProfile, AiProfileFlags, AiProfiles, MAX_AI_PROFILES, NUM_SKILL_LEVELS, load_ai_profiles,
};
