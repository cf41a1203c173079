//! Localization hooks applied to extracted strings.
//!
//! Every non-raw string extracted by the parser passes through a
//! [`Localizer`]. When a [`StringHash`] is attached, tagged results are also
//! registered with it.

use std::sync::{Arc, Mutex, PoisonError};

/// Result of localizing one string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Localized {
    pub text: String,
    /// Translation tag, `None` for untagged text.
    pub tag: Option<i32>,
}

impl Localized {
    pub fn untagged(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: None,
        }
    }
}

/// Rewrites extracted text for the current language.
pub trait Localizer {
    fn localize(&self, text: &str) -> Localized;
}

/// Receives tagged strings while hashing is active.
pub trait StringHash {
    fn register(&mut self, text: &str, tag: i32);
}

/// Leaves text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocalize;

impl Localizer for NoLocalize {
    fn localize(&self, text: &str) -> Localized {
        Localized::untagged(text)
    }
}

/// Unwraps `XSTR("text", id)` markers.
///
/// Text without a well-formed marker passes through untagged.
#[derive(Debug, Clone, Copy, Default)]
pub struct XstrLocalizer;

impl Localizer for XstrLocalizer {
    fn localize(&self, text: &str) -> Localized {
        parse_xstr(text).unwrap_or_else(|| Localized::untagged(text))
    }
}

fn parse_xstr(text: &str) -> Option<Localized> {
    let body = text.trim().strip_prefix("XSTR")?.trim_start();
    let body = body.strip_prefix('(')?.trim_start();
    let body = body.strip_prefix('"')?;
    let close = body.find('"')?;
    let (inner, rest) = body.split_at(close);

    let rest = rest[1..].trim_start().strip_prefix(',')?;
    let rest = rest.trim_end().strip_suffix(')')?;
    let tag = rest.trim().parse::<i32>().ok()?;

    Some(Localized {
        text: inner.to_string(),
        tag: Some(tag),
    })
}

/// A shareable in-memory [`StringHash`].
///
/// Clones share the same entries, so a host keeps one handle and gives the
/// parser another.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    entries: Arc<Mutex<Vec<(String, i32)>>>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of registered `(text, tag)` pairs in registration order.
    pub fn entries(&self) -> Vec<(String, i32)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StringHash for StringTable {
    fn register(&mut self, text: &str, tag: i32) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((text.to_string(), tag));
    }
}
