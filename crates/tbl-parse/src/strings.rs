//! String extraction.
//!
//! [`StringKind`] picks how a string ends and how long it may be. Line kinds
//! run to the end of the line (or an extra terminator); block kinds run to
//! an end tag and may span lines.

use crate::error::{ParseError, Result};
use crate::parser::Parser;
use crate::text;

/// Ship, weapon and profile names.
pub const NAME_LENGTH: usize = 32;
pub const DATE_LENGTH: usize = 32;
pub const NOTES_LENGTH: usize = 1024;
pub const MULTITEXT_LENGTH: usize = 4096;
pub const FILESPEC_LENGTH: usize = 64;
pub const PATHNAME_LENGTH: usize = 192;
pub const MESSAGE_LENGTH: usize = 512;
/// Longest raw line.
pub const PARSE_BUF_SIZE: usize = 4096;
/// Longest whitespace-delimited token read by [`Parser::stuff_boolean`].
pub const TOKEN_LENGTH: usize = 32;

/// The shape of a string value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringKind {
    /// Rest of the line, never localized.
    Raw,
    Name,
    Date,
    /// Block ending at `$End Notes:`.
    Notes,
    FileSpec,
    /// Block ending at `$End Briefing Text:`.
    MultiTextOld,
    /// Block ending at `$end_multi_text`.
    MultiText,
    PathName,
    Message,
}

impl StringKind {
    /// Maximum characters kept when no explicit limit is given.
    pub fn default_max_len(self) -> usize {
        match self {
            Self::Raw => PARSE_BUF_SIZE,
            Self::Name => NAME_LENGTH,
            Self::Date => DATE_LENGTH,
            Self::FileSpec => FILESPEC_LENGTH,
            Self::Notes | Self::MultiTextOld => NOTES_LENGTH,
            Self::MultiText => MULTITEXT_LENGTH,
            Self::PathName => PATHNAME_LENGTH,
            Self::Message => MESSAGE_LENGTH,
        }
    }

    /// Limit for one extraction. Only raw, name and multi-text strings take
    /// a caller limit; the other kinds always use their fixed length.
    pub fn max_len(self, requested: Option<usize>) -> usize {
        match (self, requested) {
            (Self::Raw | Self::Name | Self::MultiText, Some(len)) => len,
            _ => self.default_max_len(),
        }
    }

    /// End tag for block kinds.
    pub fn end_tag(self) -> Option<&'static str> {
        match self {
            Self::Notes => Some("$End Notes:"),
            Self::MultiTextOld => Some("$End Briefing Text:"),
            Self::MultiText => Some("$end_multi_text"),
            _ => None,
        }
    }

    pub fn is_localized(self) -> bool {
        self != Self::Raw
    }
}

impl Parser {
    /// Extracts a string of the given kind.
    ///
    /// Line kinds skip leading spaces and tabs, stop at the end of the line or
    /// at any byte in `terminators`, and leave the cursor there. Block kinds
    /// skip leading whitespace, take everything up to the end tag, and consume
    /// the tag. Trailing whitespace is always dropped.
    ///
    /// Line kinds longer than the limit are truncated with a warning. Block
    /// kinds longer than the limit abort the parse. See
    /// [`StringKind::max_len`] for which kinds honor `max_len`.
    pub fn stuff_string(
        &mut self,
        kind: StringKind,
        terminators: Option<&str>,
        max_len: Option<usize>,
    ) -> Result<String> {
        let max_len = kind.max_len(max_len);

        let bytes = match kind.end_tag() {
            Some(end) => {
                self.skip_white();
                let bytes = self.copy_text_until(end, max_len)?;
                self.required_string(end)?;
                bytes
            }
            None => {
                self.skip_gray();
                let start = self.offset();
                self.advance_to_eoln(terminators.unwrap_or(""));
                self.cursor().slice(start, self.offset()).to_vec()
            }
        };

        let mut value = text::decode(text::trim_trailing_white(&bytes));
        if kind.is_localized() {
            value = self.localize(&value);
        }
        let value = self.fit(value, max_len)?;
        tracing::trace!(kind = ?kind, value = %value, "Stuffed string");
        Ok(value)
    }

    /// Extracts the rest of the line (localized) and consumes the newline.
    pub fn stuff_string_line(&mut self, max_len: usize) -> Result<String> {
        let start = self.offset();
        self.advance_to_eoln("");
        let bytes = self.cursor().slice(start, self.offset()).to_vec();
        self.cursor_mut().advance();

        let value = text::decode(text::trim_trailing_white(&bytes));
        let value = self.localize(&value);
        self.fit(value, max_len)
    }

    /// Extracts a token up to the next whitespace outside double quotes.
    /// The quote characters are dropped.
    pub fn stuff_string_white(&mut self, max_len: usize) -> Result<String> {
        self.skip_white();
        let start = self.offset();
        self.advance_to_next_white();
        let token: Vec<u8> = self
            .cursor()
            .slice(start, self.offset())
            .iter()
            .copied()
            .filter(|&b| b != b'"')
            .collect();
        self.fit(text::decode(&token), max_len)
    }

    /// Extracts text up to `end` (which may span lines), leaving the cursor
    /// on `end`.
    pub fn stuff_string_until(&mut self, end: &str, max_len: usize) -> Result<String> {
        self.skip_gray();
        let bytes = self.copy_text_until(end, max_len)?;
        Ok(text::decode(text::trim_trailing_white(&bytes)))
    }

    /// Extracts a string and trims it. `None` when nothing is left.
    pub fn stuff_and_malloc_string(
        &mut self,
        kind: StringKind,
        terminators: Option<&str>,
        max_len: Option<usize>,
    ) -> Result<Option<String>> {
        let mut value = self.stuff_string(kind, terminators, max_len)?;
        text::drop_white_space(&mut value);
        Ok((!value.is_empty()).then_some(value))
    }

    /// Replaces `dest` with a freshly extracted string, keeping the old value
    /// when the new one is empty.
    pub fn stuff_malloc_string(
        &mut self,
        dest: &mut Option<String>,
        kind: StringKind,
        terminators: Option<&str>,
        max_len: Option<usize>,
    ) -> Result<()> {
        if let Some(value) = self.stuff_and_malloc_string(kind, terminators, max_len)? {
            *dest = Some(value);
        }
        Ok(())
    }

    /// Extracts a double-quoted string and consumes both quotes.
    ///
    /// Unquoted input falls back to a whitespace-delimited token; an
    /// unterminated quote runs to the end of the line. Both are warnings.
    pub fn get_string(&mut self) -> Result<String> {
        self.skip_white();
        if self.cursor().peek() != Some(b'"') {
            let found = self.next_tokens();
            self.warning(format!("Expecting quoted string, found [{found}]"))?;
            return self.stuff_string_white(PARSE_BUF_SIZE);
        }

        self.cursor_mut().advance();
        let start = self.offset();
        self.advance_to_eoln("\"");
        let value = text::decode(self.cursor().slice(start, self.offset()));

        if self.cursor().peek() == Some(b'"') {
            self.cursor_mut().advance();
        } else {
            self.warning(format!("Unterminated string [{value}]"))?;
        }
        Ok(value)
    }

    /// Consumes `start`, then copies everything up to the matching `end`,
    /// counting nested `start`/`end` pairs, and consumes `end`.
    pub fn alloc_block(&mut self, start: &str, end: &str) -> Result<String> {
        self.required_string(start)?;
        self.skip_white();

        let begin = self.offset();
        let mut probe = self.cursor().clone();
        let mut depth = 1usize;
        while !probe.is_eof() {
            if probe.starts_with_ci(end) {
                depth -= 1;
                if depth == 0 {
                    break;
                }
                probe.advance_by(end.len());
            } else if probe.starts_with_ci(start) {
                depth += 1;
                probe.advance_by(start.len());
            } else {
                probe.advance();
            }
        }

        if depth > 0 {
            let (file, line) = self.site();
            return self.abort(ParseError::UnbalancedBlock {
                file,
                line,
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let value = text::decode(self.cursor().slice(begin, probe.offset()));
        self.seek(probe.offset());
        self.required_string(end)?;
        Ok(value)
    }

    /// Copies the text from the cursor up to `end` without moving.
    pub fn alloc_text_until(&mut self, end: &str) -> Result<String> {
        let Some(found) = self.cursor().find_ci(end) else {
            let (file, line) = self.site();
            return self.abort(ParseError::UnterminatedText {
                file,
                line,
                end: end.to_string(),
            });
        };
        Ok(text::decode(self.cursor().slice(self.offset(), found)))
    }

    /// Copies up to (not including) `end` and moves the cursor onto it.
    fn copy_text_until(&mut self, end: &str, max_len: usize) -> Result<Vec<u8>> {
        let start = self.offset();
        let Some(found) = self.cursor().find_ci(end) else {
            let (file, line) = self.site();
            tracing::error!(file = %file, line, end, "Looking for end tag, but never found it");
            return self.abort(ParseError::UnterminatedText {
                file,
                line,
                end: end.to_string(),
            });
        };

        let len = found - start;
        if len > max_len {
            let (file, line) = self.site();
            return self.abort(ParseError::TextTooLong {
                file,
                line,
                end: end.to_string(),
                len,
                max: max_len,
            });
        }

        let bytes = self.cursor().slice(start, found).to_vec();
        self.seek(found);
        Ok(bytes)
    }

    /// Truncates `value` to `max_len` characters with a warning.
    pub(crate) fn fit(&mut self, value: String, max_len: usize) -> Result<String> {
        let len = value.chars().count();
        if len <= max_len {
            return Ok(value);
        }
        self.warning(format!(
            "Token too long: [{value}].  Length = {len}.  Max is {max_len}."
        ))?;
        Ok(value.chars().take(max_len).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseConfig;
    use crate::error::AbortCode;
    use crate::localize::{NoLocalize, StringTable};

    fn parser(text: &str) -> Parser {
        Parser::from_text("test.tbl", text, ParseConfig::default()).unwrap()
    }

    #[test]
    fn test_name_trims_and_stops_at_eoln() {
        let mut p = parser("$Name:   GTF Ulysses   \n$Next:");
        p.required_string("$Name:").unwrap();
        let name = p.stuff_string(StringKind::Name, None, None).unwrap();
        assert_eq!(name, "GTF Ulysses");
        assert!(p.check_for_string("$Next:"));
    }

    #[test]
    fn test_terminators_stop_line_kinds() {
        let mut p = parser("alpha, beta\n");
        let first = p.stuff_string(StringKind::Name, Some(","), None).unwrap();
        assert_eq!(first, "alpha");
        assert!(p.check_for_string_raw(","));
    }

    #[test]
    fn test_line_kind_truncates_with_warning() {
        let mut p = parser("abcdefghij\n");
        let value = p.stuff_string(StringKind::Name, None, Some(4)).unwrap();
        assert_eq!(value, "abcd");
        assert_eq!(p.diagnostics().warnings, 1);
    }

    #[test]
    fn test_fixed_length_kinds_ignore_requested_limit() {
        let mut p = parser("abcdefghij
");
        let value = p.stuff_string(StringKind::Message, None, Some(4)).unwrap();
        assert_eq!(value, "abcdefghij");
        assert_eq!(p.diagnostics().warnings, 0);
        drop(p);

        let mut p = parser("0123456789 $End Notes:");
        let value = p.stuff_string(StringKind::Notes, None, Some(5)).unwrap();
        assert_eq!(value, "0123456789");
    }

    #[test]
    fn test_string_kind_limits() {
        assert_eq!(StringKind::MultiTextOld.default_max_len(), NOTES_LENGTH);
        assert_eq!(StringKind::MultiText.max_len(Some(10)), 10);
        assert_eq!(StringKind::Raw.max_len(Some(10)), 10);
        assert_eq!(StringKind::Date.max_len(Some(10)), DATE_LENGTH);
        assert_eq!(StringKind::Name.max_len(None), NAME_LENGTH);
    }

    #[test]
    fn test_multitext_block_spans_lines() {
        let mut p = parser("$Text:\nLine one\nLine two   \n$end_multi_text\n#End");
        p.required_string("$Text:").unwrap();
        let value = p.stuff_string(StringKind::MultiText, None, None).unwrap();
        assert_eq!(value, "Line one\nLine two");
        assert!(p.check_for_string("#End"));
    }

    #[test]
    fn test_notes_block_end_tag_case_insensitive() {
        let mut p = parser("some notes $END NOTES: tail");
        let value = p.stuff_string(StringKind::Notes, None, None).unwrap();
        assert_eq!(value, "some notes");
        assert_eq!(p.next_tokens(), " tail");
    }

    #[test]
    fn test_block_without_end_tag_aborts() {
        let mut p = parser("text that never ends");
        let err = p.stuff_string(StringKind::MultiText, None, None).unwrap_err();
        assert_eq!(err.code(), AbortCode::UnterminatedText);
    }

    #[test]
    fn test_oversized_block_aborts() {
        let mut p = parser("0123456789 $end_multi_text");
        let err = p
            .stuff_string(StringKind::MultiText, None, Some(5))
            .unwrap_err();
        assert_eq!(err.code(), AbortCode::TextTooLong);
    }

    #[test]
    fn test_localized_strings_reach_the_hash() {
        let table = StringTable::new();
        let mut p = parser("XSTR(\"Alpha\", 12)\nXSTR(\"Beta\", 13)\n").with_string_hash(table.clone());
        assert_eq!(p.stuff_string(StringKind::Name, None, None).unwrap(), "Alpha");
        p.skip_white();
        assert_eq!(
            p.stuff_string(StringKind::Raw, None, None).unwrap(),
            "XSTR(\"Beta\", 13)"
        );
        assert_eq!(table.entries(), vec![("Alpha".to_string(), 12)]);
    }

    #[test]
    fn test_custom_localizer() {
        let mut p = parser("XSTR(\"Alpha\", 12)").with_localizer(NoLocalize);
        assert_eq!(
            p.stuff_string(StringKind::Message, None, None).unwrap(),
            "XSTR(\"Alpha\", 12)"
        );
    }

    #[test]
    fn test_stuff_string_white_strips_quotes() {
        let mut p = parser("  \"ita vero\" next");
        assert_eq!(p.stuff_string_white(TOKEN_LENGTH).unwrap(), "ita vero");
        assert_eq!(p.stuff_string_white(TOKEN_LENGTH).unwrap(), "next");
    }

    #[test]
    fn test_stuff_string_line_consumes_newline() {
        let mut p = parser("first line  \nsecond");
        assert_eq!(p.stuff_string_line(NAME_LENGTH).unwrap(), "first line");
        assert!(p.check_for_string_raw("second"));
    }

    #[test]
    fn test_stuff_string_until_leaves_end_tag() {
        let mut p = parser("abc def $Stop");
        assert_eq!(p.stuff_string_until("$stop", NAME_LENGTH).unwrap(), "abc def");
        assert!(p.check_for_string_raw("$Stop"));
    }

    #[test]
    fn test_malloc_string_keeps_old_value_on_empty() {
        let mut p = parser("   \nvalue\n");
        let mut dest = Some("old".to_string());
        p.stuff_malloc_string(&mut dest, StringKind::Name, None, None)
            .unwrap();
        assert_eq!(dest.as_deref(), Some("old"));
        p.skip_white();
        p.stuff_malloc_string(&mut dest, StringKind::Name, None, None)
            .unwrap();
        assert_eq!(dest.as_deref(), Some("value"));
    }

    #[test]
    fn test_get_string() {
        let mut p = parser("  \"GTF Apollo\" \"Open");
        assert_eq!(p.get_string().unwrap(), "GTF Apollo");
        assert_eq!(p.get_string().unwrap(), "Open");
        assert_eq!(p.diagnostics().warnings, 1);
    }

    #[test]
    fn test_alloc_block_counts_nesting() {
        let mut p = parser("[ outer [ inner ] tail ] after");
        let block = p.alloc_block("[", "]").unwrap();
        assert_eq!(block, "outer [ inner ] tail ");
        assert!(p.check_for_string("after"));
    }

    #[test]
    fn test_alloc_block_unbalanced_aborts() {
        let mut p = parser("[ outer [ inner ]");
        let err = p.alloc_block("[", "]").unwrap_err();
        assert_eq!(err.code(), AbortCode::UnbalancedBlock);
    }

    #[test]
    fn test_alloc_text_until_does_not_move() {
        let mut p = parser("abc#def");
        assert_eq!(p.alloc_text_until("#").unwrap(), "abc");
        assert_eq!(p.offset(), 0);
    }
}
