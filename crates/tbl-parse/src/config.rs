//! Parser configuration.

use serde::{Deserialize, Serialize};

/// Environment variable that turns on strict mode.
pub const STRICT_ENV_VAR: &str = "TBL_STRICT";

/// Environment variable that turns on editor mode.
pub const EDITOR_MODE_ENV_VAR: &str = "TBL_EDITOR_MODE";

/// Configuration for a parse session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Promote every warning to an abort.
    pub strict: bool,

    /// Keep foreign characters as-is instead of remapping them for the
    /// in-game font.
    pub editor_mode: bool,

    /// Line advances a required literal gets before the parse aborts.
    pub max_required_retries: usize,

    /// Characters of upcoming text quoted in diagnostics.
    pub error_context_len: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            strict: false,
            editor_mode: false,
            max_required_retries: 5,
            error_context_len: 64,
        }
    }
}

impl ParseConfig {
    /// A config where warnings abort the parse.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Default::default()
        }
    }

    /// A config for editing tools: no foreign character remapping.
    pub fn editor() -> Self {
        Self {
            editor_mode: true,
            ..Default::default()
        }
    }

    /// Defaults overlaid with `TBL_STRICT` / `TBL_EDITOR_MODE`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(value) = env_flag(STRICT_ENV_VAR) {
            config.strict = value;
        }
        if let Some(value) = env_flag(EDITOR_MODE_ENV_VAR) {
            config.editor_mode = value;
        }
        config
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    parse_flag(&value)
}

fn parse_flag(value: &str) -> Option<bool> {
    let value = value.trim();
    if value == "1" || value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes") {
        Some(true)
    } else if value == "0" || value.eq_ignore_ascii_case("false") || value.eq_ignore_ascii_case("no")
    {
        Some(false)
    } else {
        tracing::warn!(value, "Ignoring unrecognized boolean environment value");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParseConfig::default();
        assert!(!config.strict);
        assert!(!config.editor_mode);
        assert_eq!(config.max_required_retries, 5);
        assert_eq!(config.error_context_len, 64);
    }

    #[test]
    fn test_presets() {
        assert!(ParseConfig::strict().strict);
        assert!(ParseConfig::editor().editor_mode);
        assert!(!ParseConfig::editor().strict);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("no"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ParseConfig = serde_json::from_str(r#"{"strict": true}"#).unwrap();
        assert!(config.strict);
        assert_eq!(config.max_required_retries, 5);
    }
}
