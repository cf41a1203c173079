//! Scalar extractors: numbers, booleans, vectors and matrices.

use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};

use crate::cursor::is_gray;
use crate::error::{ParseError, Result};
use crate::parser::Parser;
use crate::strings::TOKEN_LENGTH;
use crate::text;

const FLOAT_CHARS: &[u8] = b"+-0123456789.";
const INT_CHARS: &[u8] = b"+-0123456789";

const TRUE_WORDS: &[&str] = &["yes", "true", "ja", "oui", "si", "ita vero", "HIja'", "HISlaH"];
const FALSE_WORDS: &[&str] = &["no", "false", "nein", "non", "minime", "ghobe'"];

/// Three floats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Orientation as right, up and forward vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Matrix3 {
    pub rvec: Vec3,
    pub uvec: Vec3,
    pub fvec: Vec3,
}

/// The leading `[+-]digits[.digits]` of `run`. The fraction is only taken
/// when `fraction` is set.
fn numeric_prefix(run: &[u8], fraction: bool) -> &str {
    let mut end = usize::from(matches!(run.first(), Some(b'+' | b'-')));
    end += run[end..].iter().take_while(|b| b.is_ascii_digit()).count();
    if fraction && run.get(end) == Some(&b'.') {
        end += 1;
        end += run[end..].iter().take_while(|b| b.is_ascii_digit()).count();
    }
    std::str::from_utf8(&run[..end]).unwrap_or_default()
}

/// Leading float of `run`, or 0.
fn leading_float(run: &[u8]) -> f32 {
    numeric_prefix(run, true).parse().unwrap_or_default()
}

/// Leading integer of `run`, or 0. Out-of-range values saturate and come
/// back as `Err` carrying the clamped value.
pub(crate) fn leading_int(run: &[u8]) -> std::result::Result<i32, i32> {
    match numeric_prefix(run, false).parse::<i32>() {
        Ok(value) => Ok(value),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Err(i32::MAX),
            IntErrorKind::NegOverflow => Err(i32::MIN),
            _ => Ok(0),
        },
    }
}

impl Parser {
    /// Scans a run of `charset` bytes after whitespace. A bad leading byte is
    /// reported and its token skipped. A trailing comma is consumed either way.
    fn scan_number(&mut self, charset: &[u8], what: &str) -> Result<Option<Vec<u8>>> {
        self.skip_white();

        let run = match self.cursor().peek() {
            Some(byte) if charset.contains(&byte) => Some(
                self.cursor_mut()
                    .consume_while(|b| charset.contains(&b))
                    .to_vec(),
            ),
            _ => {
                let found = self.next_tokens();
                self.report_error(format!("Expecting {what}, found [{found}]."))?;
                self.skip_token();
                None
            }
        };

        if self.cursor().peek() == Some(b',') {
            self.cursor_mut().advance();
        }
        Ok(run)
    }

    /// Reads a float. Malformed input yields 0 after a diagnostic.
    pub fn stuff_float(&mut self) -> Result<f32> {
        let value = self
            .scan_number(FLOAT_CHARS, "float")?
            .map_or(0.0, |run| leading_float(&run));
        tracing::trace!(value, "Stuffed float");
        Ok(value)
    }

    /// Reads a float if one is at the cursor.
    ///
    /// Returns `None` without a diagnostic when the next token does not look
    /// numeric; a lone comma is consumed in that case.
    pub fn stuff_float_optional(&mut self) -> Result<Option<f32>> {
        self.skip_white();
        let rest = self.cursor().remaining();
        let run_len = rest.iter().take_while(|b| FLOAT_CHARS.contains(b)).count();
        let numeric = rest[..run_len].iter().any(u8::is_ascii_digit);

        if !numeric {
            if run_len == 0 && self.cursor().peek() == Some(b',') {
                self.cursor_mut().advance();
            }
            return Ok(None);
        }
        self.stuff_float().map(Some)
    }

    /// Reads an integer. Malformed input yields 0 after a diagnostic; values
    /// outside `i32` are clamped with a warning.
    pub fn stuff_int(&mut self) -> Result<i32> {
        let value = match self.scan_number(INT_CHARS, "int")? {
            Some(run) => match leading_int(&run) {
                Ok(value) => value,
                Err(clamped) => {
                    let digits = text::decode(&run);
                    self.warning(format!(
                        "Integer [{digits}] is out of range; using {clamped}."
                    ))?;
                    clamped
                }
            },
            None => 0,
        };
        tracing::trace!(value, "Stuffed int");
        Ok(value)
    }

    /// Reads an integer and keeps its low byte.
    pub fn stuff_ubyte(&mut self) -> Result<u8> {
        let value = self.stuff_int()?;
        Ok(value as u8)
    }

    /// Reads a boolean word or digit.
    ///
    /// A leading digit means false for `0` and true otherwise. Words are
    /// matched case-insensitively in several languages; anything else is a
    /// warning and false. A trailing comma is consumed. With
    /// `advance_to_eol` the rest of the line is skipped.
    pub fn stuff_boolean(&mut self, advance_to_eol: bool) -> Result<bool> {
        let token = self.boolean_token(b",")?;
        if self.cursor().peek() == Some(b',') {
            self.cursor_mut().advance();
        }
        if advance_to_eol {
            self.advance_to_eoln("");
        }
        self.interpret_boolean(&token)
    }

    /// Reads a possibly quoted token ending at whitespace or any of `stops`.
    pub(crate) fn boolean_token(&mut self, stops: &[u8]) -> Result<String> {
        self.skip_white();
        let mut in_quotes = false;
        let mut token = Vec::new();
        while let Some(byte) = self.cursor().peek() {
            if byte == b'"' {
                in_quotes = !in_quotes;
            } else if byte == b'\n' || (!in_quotes && (is_gray(byte) || stops.contains(&byte))) {
                break;
            } else {
                token.push(byte);
            }
            self.cursor_mut().advance();
        }
        self.fit(text::decode(&token), TOKEN_LENGTH)
    }

    pub(crate) fn interpret_boolean(&mut self, token: &str) -> Result<bool> {
        let value = match token.as_bytes().first() {
            Some(digit) if digit.is_ascii_digit() => *digit != b'0',
            _ if TRUE_WORDS.iter().any(|w| w.eq_ignore_ascii_case(token)) => true,
            _ if FALSE_WORDS.iter().any(|w| w.eq_ignore_ascii_case(token)) => false,
            _ => {
                self.warning(format!(
                    "Boolean '{token}' type unknown; assuming 'no/false'"
                ))?;
                false
            }
        };
        tracing::trace!(value, "Stuffed bool");
        Ok(value)
    }

    /// Reads a boolean and sets or clears `flag` in `flags`.
    pub fn stuff_boolean_flag(
        &mut self,
        flags: &mut u32,
        flag: u32,
        advance_to_eol: bool,
    ) -> Result<()> {
        if self.stuff_boolean(advance_to_eol)? {
            *flags |= flag;
        } else {
            *flags &= !flag;
        }
        Ok(())
    }

    /// Reads three floats.
    pub fn stuff_vector(&mut self) -> Result<Vec3> {
        Ok(Vec3 {
            x: self.stuff_float()?,
            y: self.stuff_float()?,
            z: self.stuff_float()?,
        })
    }

    /// Reads `( x y z )`.
    pub fn stuff_parenthesized_vector(&mut self) -> Result<Vec3> {
        self.skip_white();
        if self.cursor().peek() != Some(b'(') {
            let (file, line) = self.site();
            let found = self.next_tokens();
            return self.abort(ParseError::VectorOpen { file, line, found });
        }
        self.cursor_mut().advance();

        let vector = self.stuff_vector()?;

        self.skip_white();
        if self.cursor().peek() != Some(b')') {
            let (file, line) = self.site();
            let found = self.next_tokens();
            return self.abort(ParseError::VectorClose { file, line, found });
        }
        self.cursor_mut().advance();
        Ok(vector)
    }

    /// Reads three vectors: right, up, forward.
    pub fn stuff_matrix(&mut self) -> Result<Matrix3> {
        Ok(Matrix3 {
            rvec: self.stuff_vector()?,
            uvec: self.stuff_vector()?,
            fvec: self.stuff_vector()?,
        })
    }
}
