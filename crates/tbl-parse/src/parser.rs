//! The parse context: one source, one cursor, recovery and diagnostics.
//!
//! All tokenizer operations live on [`Parser`]. Operations that can give up
//! on the file return [`ParseError`]; grammar code propagates it with `?` up
//! to the per-file boundary in [`crate::recovery`].
//!
//! Only one primary parse may be active per thread. A second
//! [`Parser::new`] while one is alive fails with
//! [`ParseError::ParseInProgress`]; use [`Parser::pause`] to step aside.

use std::cell::Cell;
use std::path::Path;

use crate::config::ParseConfig;
use crate::cursor::Cursor;
use crate::error::{ParseError, Result};
use crate::localize::{Localizer, StringHash, XstrLocalizer};
use crate::source::SourceText;
use crate::text;

thread_local! {
    static PARSE_ACTIVE: Cell<bool> = const { Cell::new(false) };
}

/// Held by a live [`Parser`]; releases the thread's parse slot on drop.
#[derive(Debug)]
struct ActiveParse {
    _private: (),
}

impl ActiveParse {
    fn acquire(file: &str) -> Result<Self> {
        PARSE_ACTIVE.with(|active| {
            if active.get() {
                return Err(ParseError::ParseInProgress {
                    file: file.to_string(),
                });
            }
            active.set(true);
            Ok(Self { _private: () })
        })
    }
}

impl Drop for ActiveParse {
    fn drop(&mut self) {
        PARSE_ACTIVE.with(|active| active.set(false));
    }
}

/// Warning and error counts for one parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub warnings: usize,
    pub errors: usize,
}

/// Severity of a non-fatal diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Which of two alternatives matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    First,
    Second,
}

/// Outcome of [`Parser::skip_to_string`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipOutcome {
    /// The literal was found and consumed.
    Found,
    /// Input ran out first.
    Eof,
    /// The end marker, or a `#` section header, came first.
    Boundary,
}

/// A primary parse over one [`SourceText`].
pub struct Parser {
    source: SourceText,
    cursor: Cursor,
    config: ParseConfig,
    localizer: Box<dyn Localizer>,
    string_hash: Option<Box<dyn StringHash>>,
    context: Option<String>,
    diagnostics: Diagnostics,
    active: Option<ActiveParse>,
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("file", &self.source.filename())
            .field("offset", &self.cursor.offset())
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

impl Parser {
    /// Starts parsing `source`.
    pub fn new(source: SourceText, config: ParseConfig) -> Result<Self> {
        let active = ActiveParse::acquire(source.filename())?;
        let cursor = Cursor::with_arc(source.shared_processed());
        Ok(Self {
            source,
            cursor,
            config,
            localizer: Box::new(XstrLocalizer),
            string_hash: None,
            context: None,
            diagnostics: Diagnostics::default(),
            active: Some(active),
        })
    }

    /// Reads and starts parsing a file on disk.
    pub fn open(path: &Path, config: ParseConfig) -> Result<Self> {
        let source = SourceText::open(path, &config)?;
        Self::new(source, config)
    }

    /// Starts parsing in-memory text under a given filename.
    pub fn from_text(filename: &str, text: &str, config: ParseConfig) -> Result<Self> {
        let source = SourceText::from_bytes(filename, text.as_bytes(), &config)?;
        Self::new(source, config)
    }

    /// Starts parsing text compiled into the binary.
    pub fn from_array(text: &str, config: ParseConfig) -> Result<Self> {
        let source = SourceText::from_array(text, &config)?;
        Self::new(source, config)
    }

    pub fn with_localizer(mut self, localizer: impl Localizer + 'static) -> Self {
        self.localizer = Box::new(localizer);
        self
    }

    /// Registers every tagged string extracted from now on.
    pub fn with_string_hash(mut self, hash: impl StringHash + 'static) -> Self {
        self.string_hash = Some(Box::new(hash));
        self
    }

    pub fn source(&self) -> &SourceText {
        &self.source
    }

    pub fn filename(&self) -> &str {
        self.source.filename()
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    /// Byte offset into the processed text.
    pub fn offset(&self) -> usize {
        self.cursor.offset()
    }

    /// Moves the cursor to an absolute offset (clamped to the end).
    pub fn seek(&mut self, offset: usize) {
        self.cursor.set_offset(offset);
    }

    /// 1-based line of the cursor.
    pub fn line_number(&self) -> usize {
        self.source.line_number(self.cursor.offset())
    }

    /// Describes what is being parsed; appended to every diagnostic until
    /// cleared.
    pub fn set_context(&mut self, context: impl Into<String>) {
        self.context = Some(context.into());
    }

    pub fn clear_context(&mut self) {
        self.context = None;
    }

    /// Rewinds to the start of the source and clears counters and context.
    pub fn reset(&mut self) {
        self.cursor.reset();
        self.diagnostics = Diagnostics::default();
        self.context = None;
    }

    /// Logs the warning and error totals for this parse.
    pub fn display_parse_diagnostics(&self) {
        tracing::info!(
            file = %self.source.filename(),
            errors = self.diagnostics.errors,
            warnings = self.diagnostics.warnings,
            "{} errors. {} warnings.",
            self.diagnostics.errors,
            self.diagnostics.warnings
        );
    }

    /// Ends the parse, releasing the thread's parse slot.
    pub fn finish(self) -> Diagnostics {
        self.diagnostics
    }

    /// Releases the parse slot so another primary parse can run.
    pub fn pause(mut self) -> PausedParse {
        self.active = None;
        PausedParse { inner: self }
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Emits a recoverable warning. Aborts in strict mode.
    pub fn warning(&mut self, message: impl Into<String>) -> Result<()> {
        self.diagnose(Severity::Warning, message.into())
    }

    /// Emits a recoverable error. Aborts in strict mode.
    pub fn report_error(&mut self, message: impl Into<String>) -> Result<()> {
        self.diagnose(Severity::Error, message.into())
    }

    fn diagnose(&mut self, severity: Severity, message: String) -> Result<()> {
        let line = self.line_number();
        let message = match &self.context {
            Some(context) => format!("{message} [{context}]"),
            None => message,
        };
        let file = self.source.filename();

        match severity {
            Severity::Warning => {
                self.diagnostics.warnings += 1;
                tracing::warn!(file = %file, line, "{message}");
            }
            Severity::Error => {
                self.diagnostics.errors += 1;
                tracing::error!(file = %file, line, "{message}");
            }
        }

        if self.config.strict {
            return Err(ParseError::Strict {
                file: file.to_string(),
                line,
                message,
            });
        }
        Ok(())
    }

    /// Filename and current line, for building abort errors.
    pub(crate) fn site(&self) -> (String, usize) {
        (self.source.filename().to_string(), self.line_number())
    }

    /// Records an abort in the counters before it propagates.
    pub(crate) fn abort<T>(&mut self, err: ParseError) -> Result<T> {
        self.diagnostics.errors += 1;
        Err(err)
    }

    /// Text from the cursor to the end of the line, for diagnostics.
    pub fn next_tokens(&self) -> String {
        let max = self.config.error_context_len.saturating_sub(1);
        let end = self.cursor.line_end(&[]).min(self.cursor.offset() + max);
        text::decode(self.cursor.slice(self.cursor.offset(), end))
    }

    // =========================================================================
    // Whitespace and line movement
    // =========================================================================

    pub fn skip_white(&mut self) {
        self.cursor.skip_white();
    }

    pub fn skip_gray(&mut self) {
        self.cursor.skip_gray();
    }

    pub fn check_for_eof(&mut self) -> bool {
        self.cursor.skip_white();
        self.cursor.is_eof()
    }

    /// Moves to the end of the line (or the first of `terminators`) without
    /// consuming the newline.
    pub fn advance_to_eoln(&mut self, terminators: &str) {
        self.cursor.advance_to_eoln(terminators.as_bytes());
    }

    pub fn advance_to_next_white(&mut self) {
        self.cursor.advance_to_next_white();
    }

    pub fn skip_token(&mut self) {
        self.cursor.skip_token();
    }

    pub(crate) fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub(crate) fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    // =========================================================================
    // Literal matching
    // =========================================================================

    /// Whether the next token starts with `literal`, after skipping
    /// whitespace. Never consumes the literal.
    pub fn check_for_string(&mut self, literal: &str) -> bool {
        self.cursor.skip_white();
        self.cursor.starts_with_ci(literal)
    }

    /// Like [`Self::check_for_string`] but without skipping whitespace.
    pub fn check_for_string_raw(&self, literal: &str) -> bool {
        self.cursor.starts_with_ci(literal)
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

    /// Consumes whichever of two literals is next.
    pub fn optional_string_either(&mut self, first: &str, second: &str) -> Option<Choice> {
        if self.optional_string(first) {
            Some(Choice::First)
        } else if self.optional_string(second) {
            Some(Choice::Second)
        } else {
            None
        }
    }

    /// Consumes `literal`, skipping up to `max_required_retries` lines to
    /// find it. Each skipped line is a warning.
    pub fn required_string(&mut self, literal: &str) -> Result<()> {
        self.cursor.skip_white();
        let mut tries = 0;

        while !self.cursor.starts_with_ci(literal) {
            if tries >= self.config.max_required_retries {
                let (file, line) = self.site();
                tracing::error!(file = %file, line, token = literal, "Required token not found, giving up");
                return self.abort(ParseError::MissingToken {
                    file,
                    line,
                    token: literal.to_string(),
                });
            }
            let found = self.next_tokens();
            self.warning(format!("Required token = [{literal}], found [{found}]"))?;
            self.cursor.advance_to_eoln(&[]);
            self.cursor.skip_white();
            tries += 1;
        }

        self.cursor.advance_by(literal.len());
        tracing::trace!(token = literal, "Found required string");
        Ok(())
    }

    /// Finds whichever literal comes first, with the same line-skipping
    /// recovery as [`Self::required_string`]. Does not consume the match.
    pub fn required_one_of(&mut self, literals: &[&str]) -> Result<usize> {
        self.cursor.skip_white();
        let mut tries = 0;

        loop {
            if let Some(index) = literals
                .iter()
                .position(|literal| self.cursor.starts_with_ci(literal))
            {
                return Ok(index);
            }

            if tries >= self.config.max_required_retries {
                let (file, line) = self.site();
                tracing::error!(file = %file, line, tokens = ?literals, "Required tokens not found, giving up");
                return self.abort(ParseError::MissingEither {
                    file,
                    line,
                    tokens: literals.iter().map(|s| (*s).to_string()).collect(),
                });
            }

            let found = self.next_tokens();
            self.warning(format!(
                "Required token = [{}], found [{found}]",
                literals.join("] or [")
            ))?;
            self.cursor.advance_to_eoln(&[]);
            self.cursor.skip_white();
            tries += 1;
        }
    }

    /// Two-way [`Self::required_one_of`].
    pub fn required_string_either(&mut self, first: &str, second: &str) -> Result<Choice> {
        match self.required_one_of(&[first, second])? {
            0 => Ok(Choice::First),
            _ => Ok(Choice::Second),
        }
    }

    /// Three-way [`Self::required_one_of`]; returns 0, 1 or 2.
    pub fn required_string_3(&mut self, first: &str, second: &str, third: &str) -> Result<usize> {
        self.required_one_of(&[first, second, third])
    }

    /// Four-way [`Self::required_one_of`]; returns 0 through 3.
    pub fn required_string_4(
        &mut self,
        first: &str,
        second: &str,
        third: &str,
        fourth: &str,
    ) -> Result<usize> {
        self.required_one_of(&[first, second, third, fourth])
    }

    // =========================================================================
    // Scanning ahead
    // =========================================================================

    /// Skips whole lines until one starts with `literal`, then consumes it.
    ///
    /// With an `end` marker, a line starting with `end` or with `#` stops the
    /// scan without consuming anything.
    pub fn skip_to_string(&mut self, literal: &str, end: Option<&str>) -> SkipOutcome {
        self.cursor.skip_white();
        while !self.cursor.is_eof() && !self.cursor.starts_with_ci(literal) {
            if let Some(end) = end
                && (self.cursor.peek() == Some(b'#') || self.cursor.starts_with_ci(end))
            {
                return SkipOutcome::Boundary;
            }
            self.cursor.advance_to_eoln(&[]);
            self.cursor.skip_white();
        }

        if self.cursor.is_eof() {
            return SkipOutcome::Eof;
        }
        self.cursor.advance_by(literal.len());
        SkipOutcome::Found
    }

    /// Skips whole lines until one starts with `literal`, leaving the cursor
    /// on it. Returns false on EOF or boundary.
    pub fn skip_to_start_of_string(&mut self, literal: &str, end: Option<&str>) -> bool {
        self.skip_to_start_of_any(&[literal], end)
    }

    /// Skips whole lines until one starts with either literal.
    pub fn skip_to_start_of_string_either(
        &mut self,
        first: &str,
        second: &str,
        end: Option<&str>,
    ) -> bool {
        self.skip_to_start_of_any(&[first, second], end)
    }

    fn skip_to_start_of_any(&mut self, literals: &[&str], end: Option<&str>) -> bool {
        self.cursor.skip_white();
        while !self.cursor.is_eof()
            && !literals
                .iter()
                .any(|literal| self.cursor.starts_with_ci(literal))
        {
            if let Some(end) = end
                && (self.cursor.peek() == Some(b'#') || self.cursor.starts_with_ci(end))
            {
                return false;
            }
            self.cursor.advance_to_eoln(&[]);
            self.cursor.skip_white();
        }
        !self.cursor.is_eof()
    }

    // =========================================================================
    // Localization
    // =========================================================================

    /// Runs extracted text through the localizer and the string hash.
    pub(crate) fn localize(&mut self, text: &str) -> String {
        let localized = self.localizer.localize(text);
        if let (Some(hash), Some(tag)) = (self.string_hash.as_mut(), localized.tag) {
            hash.register(&localized.text, tag);
        }
        localized.text
    }
}

/// A parser that has released the thread's parse slot.
#[derive(Debug)]
pub struct PausedParse {
    inner: Parser,
}

impl PausedParse {
    /// Re-acquires the parse slot and continues where the parse left off.
    pub fn resume(mut self) -> Result<Parser> {
        let active = ActiveParse::acquire(self.inner.filename())?;
        self.inner.active = Some(active);
        Ok(self.inner)
    }
}
