//! Default tables compiled into the library.
//!
//! These load first for every table kind, so the built-in records exist even
//! when no table files are shipped.

// =============================================================================
// AI Profiles
// =============================================================================

/// Retail AI profile table.
pub const AI_PROFILES_TBL: &str = include_str!("../data/ai_profiles.tbl");
