//! Source text loading and normalization.
//!
//! A [`SourceText`] keeps two copies of a file:
//!
//! - `raw`: the bytes as read (after unscrambling), used for diagnostics
//! - `processed`: carriage returns dropped, `;` comments removed, foreign
//!   characters remapped for the in-game font
//!
//! Both copies have the same number of lines, so a line number computed from
//! a `processed` offset always points at the matching `raw` line.

use std::path::Path;
use std::sync::Arc;

use crate::config::ParseConfig;
use crate::encrypt;
use crate::error::{ParseError, Result};
use crate::vfs::{FileSystem, PathType};

/// Filename reported for text compiled into the binary.
pub const INTERNAL_FILENAME: &str = "internal default file";

/// Starts a comment that runs to the end of the line.
pub const COMMENT_CHAR: u8 = b';';

/// Byte-order marks that identify multi-byte encodings, longest first.
const UNICODE_MARKS: &[(&[u8], &str)] = &[
    (&[0xFF, 0xFE, 0x00, 0x00], "UTF-32 LE"),
    (&[0x00, 0x00, 0xFE, 0xFF], "UTF-32 BE"),
    (&[0xEF, 0xBB, 0xBF], "UTF-8"),
    (&[0xFF, 0xFE], "UTF-16 LE"),
    (&[0xFE, 0xFF], "UTF-16 BE"),
];

/// A loaded, normalized table file.
#[derive(Debug, Clone)]
pub struct SourceText {
    filename: String,
    raw: Vec<u8>,
    processed: Arc<[u8]>,
}

impl SourceText {
    /// Reads a file from disk.
    pub fn open(path: &Path, config: &ParseConfig) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| ParseError::FileOpen {
            path: path.to_path_buf(),
            source: e,
        })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(filename, &bytes, config)
    }

    /// Reads a file through a host [`FileSystem`].
    pub fn load(
        fs: &dyn FileSystem,
        name: &str,
        path_type: PathType,
        config: &ParseConfig,
    ) -> Result<Self> {
        let bytes = fs
            .read(name, path_type)
            .map_err(|e| ParseError::FileOpen {
                path: fs.display_path(name, path_type),
                source: e,
            })?;
        Self::from_bytes(name, &bytes, config)
    }

    /// Builds a source from text compiled into the binary.
    ///
    /// The text is treated as single-byte, exactly like a file on disk.
    pub fn from_array(text: &str, config: &ParseConfig) -> Result<Self> {
        Self::from_bytes(INTERNAL_FILENAME, text.as_bytes(), config)
    }

    /// Builds a source from bytes already in memory.
    pub fn from_bytes(
        filename: impl Into<String>,
        bytes: &[u8],
        config: &ParseConfig,
    ) -> Result<Self> {
        let filename = filename.into();

        if let Some(encoding) = detect_unicode(bytes) {
            return Err(ParseError::UnsupportedEncoding {
                file: filename,
                encoding,
            });
        }

        let raw = if encrypt::is_encrypted(bytes) {
            tracing::debug!(file = %filename, "Unscrambling table file");
            encrypt::decrypt(bytes)
        } else {
            bytes.to_vec()
        };

        let processed = process_raw_text(&raw, config.editor_mode);
        tracing::trace!(
            file = %filename,
            raw_len = raw.len(),
            processed_len = processed.len(),
            "Loaded table source"
        );

        Ok(Self {
            filename,
            raw,
            processed: processed.into(),
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn processed(&self) -> &[u8] {
        &self.processed
    }

    pub(crate) fn shared_processed(&self) -> Arc<[u8]> {
        Arc::clone(&self.processed)
    }

    /// 1-based line number of a `processed` offset.
    ///
    /// Offsets past the end report the last line.
    pub fn line_number(&self, offset: usize) -> usize {
        let end = offset.min(self.processed.len());
        1 + self.processed[..end].iter().filter(|&&b| b == b'\n').count()
    }

    /// Raw text of a 1-based line, without its line terminator.
    pub fn raw_line(&self, line: usize) -> Option<&[u8]> {
        let index = line.checked_sub(1)?;
        let text = self.raw.split(|&b| b == b'\n').nth(index)?;
        Some(text.strip_suffix(b"\r").unwrap_or(text))
    }
}

/// Name of the Unicode encoding announced by a leading byte-order mark.
pub fn detect_unicode(bytes: &[u8]) -> Option<&'static str> {
    UNICODE_MARKS
        .iter()
        .find(|(mark, _)| bytes.starts_with(mark))
        .map(|&(_, encoding)| encoding)
}

/// Normalizes raw text line by line.
///
/// Drops `\r`, cuts each line at the first [`COMMENT_CHAR`] outside double
/// quotes, and remaps foreign characters unless `editor_mode` is set. Every
/// `\n` of the input survives.
pub fn process_raw_text(raw: &[u8], editor_mode: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());

    for (index, line) in raw.split(|&b| b == b'\n').enumerate() {
        if index > 0 {
            out.push(b'\n');
        }

        let mut in_quotes = false;
        for &byte in line {
            match byte {
                b'\r' => continue,
                b'"' => in_quotes = !in_quotes,
                COMMENT_CHAR if !in_quotes => break,
                _ => {}
            }

            if editor_mode {
                out.push(byte);
            } else if byte == 0xDF {
                // No glyph for sharp s in the game font.
                out.extend_from_slice(b"ss");
            } else {
                out.push(remap_foreign_char(byte));
            }
        }
    }

    out
}

/// Maps a Latin-1 letter to its slot in the game font.
///
/// Bytes without a mapping are returned unchanged.
pub fn remap_foreign_char(byte: u8) -> u8 {
    match byte {
        0xFC => 129, // u umlaut
        0xE9 => 130, // e acute
        0xE2 => 131, // a circumflex
        0xE4 => 132, // a umlaut
        0xE0 => 133, // a grave
        0xE7 => 135, // c cedilla
        0xEA => 136, // e circumflex
        0xEB => 137, // e umlaut
        0xE8 => 138, // e grave
        0xEF => 139, // i umlaut
        0xEE => 140, // i circumflex
        0xEC => 141, // i grave
        0xC4 => 142, // A umlaut
        0xC9 => 144, // E acute
        0xF4 => 147, // o circumflex
        0xF6 => 148, // o umlaut
        0xF2 => 149, // o grave
        0xFB => 150, // u circumflex
        0xF9 => 151, // u grave
        0xD6 => 153, // O umlaut
        0xDC => 154, // U umlaut
        0xE1 => 160, // a acute
        0xED => 161, // i acute
        0xF3 => 162, // o acute
        0xFA => 163, // u acute
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source(text: &[u8]) -> SourceText {
        SourceText::from_bytes("test.tbl", text, &ParseConfig::default()).unwrap()
    }

    #[test]
    fn test_comment_removed_newline_kept() {
        let src = source(b"$Name: Alpha ; trailing note\n$Next: 1\n");
        assert_eq!(src.processed(), b"$Name: Alpha \n$Next: 1\n");
        assert_eq!(src.raw(), b"$Name: Alpha ; trailing note\n$Next: 1\n");
    }

    #[test]
    fn test_comment_char_inside_quotes_is_text() {
        let src = source(b"$Text: \"a;b\" ; gone\n");
        assert_eq!(src.processed(), b"$Text: \"a;b\" \n");
    }

    #[test]
    fn test_unbalanced_quote_keeps_rest_of_line_only() {
        let src = source(b"$Text: \"open ; kept ; also kept\n$Next: 1 ; gone\n");
        assert_eq!(
            src.processed(),
            b"$Text: \"open ; kept ; also kept\n$Next: 1 \n"
        );
    }

    #[test]
    fn test_carriage_returns_dropped() {
        let src = source(b"a\r\nb\r\n");
        assert_eq!(src.processed(), b"a\nb\n");
        assert_eq!(src.raw_line(1), Some(&b"a"[..]));
    }

    #[test]
    fn test_foreign_characters_remapped() {
        let src = source(&[b'M', 0xFC, b'n', 0xDF, b'e']);
        assert_eq!(src.processed(), &[b'M', 129, b'n', b's', b's', b'e']);
    }

    #[test]
    fn test_editor_mode_keeps_foreign_characters() {
        let bytes = [b'M', 0xFC, 0xDF];
        let src = SourceText::from_bytes("t", &bytes, &ParseConfig::editor()).unwrap();
        assert_eq!(src.processed(), &bytes);
    }

    #[test]
    fn test_rejects_byte_order_marks() {
        for (bom, name) in [
            (&[0xFF, 0xFE, b'a', 0][..], "UTF-16 LE"),
            (&[0xFE, 0xFF, 0, b'a'][..], "UTF-16 BE"),
            (&[0xFF, 0xFE, 0, 0][..], "UTF-32 LE"),
            (&[0, 0, 0xFE, 0xFF][..], "UTF-32 BE"),
            (&[0xEF, 0xBB, 0xBF, b'a'][..], "UTF-8"),
        ] {
            let err = SourceText::from_bytes("u.tbl", bom, &ParseConfig::default()).unwrap_err();
            assert!(
                matches!(err, ParseError::UnsupportedEncoding { encoding, .. } if encoding == name)
            );
        }
    }

    #[test]
    fn test_line_numbers_survive_comments() {
        let src = source(b"one ; x\n; whole line\nthree\n");
        let offset = src
            .processed()
            .windows(5)
            .position(|w| w == b"three")
            .unwrap();
        assert_eq!(src.line_number(offset), 3);
        assert_eq!(src.raw_line(3), Some(&b"three"[..]));
        assert_eq!(src.line_number(0), 1);
    }

    #[test]
    fn test_scrambled_file_is_unscrambled() {
        let scrambled = encrypt::encrypt(b"#AI Profiles ; note\n");
        let src = source(&scrambled);
        assert_eq!(src.raw(), b"#AI Profiles ; note\n");
        assert_eq!(src.processed(), b"#AI Profiles \n");
    }

    #[test]
    fn test_open_missing_file() {
        let err =
            SourceText::open(Path::new("/nonexistent/x.tbl"), &ParseConfig::default()).unwrap_err();
        assert!(matches!(err, ParseError::FileOpen { .. }));
        assert_eq!(err.code().value(), 5);
    }

    #[test]
    fn test_open_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "#Section\n#End\n").unwrap();
        let src = SourceText::open(file.path(), &ParseConfig::default()).unwrap();
        assert_eq!(src.processed(), b"#Section\n#End\n");
    }

    #[test]
    fn test_from_array_uses_internal_name() {
        let src = SourceText::from_array("#End", &ParseConfig::default()).unwrap();
        assert_eq!(src.filename(), INTERNAL_FILENAME);
    }
}
