//! Secondary parser over a caller-supplied snippet.
//!
//! An [`ExternalParser`] shares no state with a [`crate::Parser`]: it has its
//! own cursor, never takes the thread's parse slot, and never aborts. Missing
//! tokens are logged and reported through return values.

use crate::config::ParseConfig;
use crate::cursor::Cursor;
use crate::extract::leading_int;
use crate::localize::{Localizer, XstrLocalizer};
use crate::strings::NAME_LENGTH;
use crate::text;

const INT_CHARS: &[u8] = b"+-0123456789";

/// A lenient parser for text that is not a table file.
pub struct ExternalParser {
    cursor: Cursor,
    config: ParseConfig,
    localizer: Box<dyn Localizer>,
    warnings: usize,
}

impl std::fmt::Debug for ExternalParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalParser")
            .field("offset", &self.cursor.offset())
            .field("warnings", &self.warnings)
            .finish_non_exhaustive()
    }
}

impl ExternalParser {
    pub fn new(text: &str) -> Self {
        Self::with_config(text, ParseConfig::default())
    }

    /// The snippet is normalized like a table file (comments, carriage
    /// returns, foreign characters).
    pub fn with_config(text: &str, config: ParseConfig) -> Self {
        let processed = crate::source::process_raw_text(text.as_bytes(), config.editor_mode);
        Self {
            cursor: Cursor::new(&processed),
            config,
            localizer: Box::new(XstrLocalizer),
            warnings: 0,
        }
    }

    pub fn with_localizer(mut self, localizer: impl Localizer + 'static) -> Self {
        self.localizer = Box::new(localizer);
        self
    }

    pub fn offset(&self) -> usize {
        self.cursor.offset()
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }

    pub fn is_eof(&self) -> bool {
        self.cursor.is_eof()
    }

    /// Rewinds to the start of the snippet.
    pub fn reset(&mut self) {
        self.cursor.reset();
        self.warnings = 0;
    }

    pub fn skip_white(&mut self) {
        self.cursor.skip_white();
    }

    pub fn skip_gray(&mut self) {
        self.cursor.skip_gray();
    }

    pub fn skip_token(&mut self) {
        self.cursor.skip_token();
    }

    pub fn advance_to_eoln(&mut self, terminators: &str) {
        self.cursor.advance_to_eoln(terminators.as_bytes());
    }

    /// Consumes `literal` if it is next.
    pub fn optional_string(&mut self, literal: &str) -> bool {
        self.cursor.skip_white();
        if self.cursor.starts_with_ci(literal) {
            self.cursor.advance_by(literal.len());
            true
        } else {
            false
        }
    }

    /// Looks for `literal` over the next few lines and consumes it.
    ///
    /// Returns false, with a logged error, when it is not found; the cursor
    /// is then left where the search stopped.
    pub fn required_string(&mut self, literal: &str) -> bool {
        self.cursor.skip_white();
        let mut tries = 0;
        while !self.cursor.starts_with_ci(literal) {
            if tries >= self.config.max_required_retries {
                self.warnings += 1;
                tracing::error!(token = literal, "Unable to find required token in external text");
                return false;
            }
            self.cursor.advance_to_eoln(&[]);
            self.cursor.skip_white();
            tries += 1;
        }
        self.cursor.advance_by(literal.len());
        true
    }

    /// Reads an integer; 0 when none is at the cursor. A trailing comma is
    /// consumed.
    pub fn stuff_int(&mut self) -> i32 {
        self.cursor.skip_white();
        let run = self.cursor.consume_while(|b| INT_CHARS.contains(&b));
        let value = match leading_int(run) {
            Ok(value) => value,
            Err(clamped) => {
                tracing::warn!(value = clamped, "Integer out of range in external text, clamped");
                self.warnings += 1;
                clamped
            }
        };
        if self.cursor.peek() == Some(b',') {
            self.cursor.advance();
        }
        value
    }

    /// Reads a name to the end of the line (or a terminator), localized and
    /// limited to `max_len` characters.
    pub fn stuff_name(&mut self, terminators: Option<&str>, max_len: Option<usize>) -> String {
        self.cursor.skip_gray();
        let start = self.cursor.offset();
        self.cursor
            .advance_to_eoln(terminators.unwrap_or("").as_bytes());
        let raw = text::decode(text::trim_trailing_white(
            self.cursor.slice(start, self.cursor.offset()),
        ));

        let value = self.localizer.localize(&raw).text;
        let max_len = max_len.unwrap_or(NAME_LENGTH);
        if value.chars().count() > max_len {
            self.warnings += 1;
            tracing::warn!(value = %value, max_len, "External name too long, truncating");
            return value.chars().take(max_len).collect();
        }
        value
    }
}
