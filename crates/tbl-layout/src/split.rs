//! Greedy line splitting.

/// Reports the rendered width of a string in pixels.
pub trait TextMeasure {
    fn width(&self, text: &str) -> u32;
}

impl<F> TextMeasure for F
where
    F: Fn(&str) -> u32,
{
    fn width(&self, text: &str) -> u32 {
        self(text)
    }
}

/// One output line as a byte range of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The line's text within `src`.
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end()]
    }
}

fn is_white(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n')
}

fn is_gray(c: char) -> bool {
    matches!(c, ' ' | '\t')
}

/// Span from `start` to `end` without trailing spaces or tabs.
fn trimmed_span(src: &str, start: usize, end: usize) -> Span {
    let text = src[start..end].trim_end_matches(is_gray);
    Span {
        start,
        len: text.len(),
    }
}

/// Splits `src` into at most `max_lines` lines no wider than `max_width`.
///
/// Lines break at the first space of the last run of spaces that fit, and
/// always at `\n`. A word wider than `max_width` is not broken: it gets a
/// line to itself and runs to the next whitespace. Characters from
/// `ignore_char` up to the next whitespace are kept in the line but not
/// measured, so inline markup takes no room.
///
/// Leading whitespace of the text and leading spaces of each line are
/// skipped. Spans never include trailing spaces.
pub fn split(
    src: &str,
    max_width: u32,
    measure: &impl TextMeasure,
    max_lines: usize,
    ignore_char: Option<char>,
) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut line_start: Option<usize> = None;
    let mut breakpoint: Option<usize> = None;
    let mut last_was_white = false;
    let mut ignoring = false;
    let mut buffer = String::new();

    let mut i = src.len() - src.trim_start_matches(is_white).len();
    while let Some(c) = src[i..].chars().next() {
        if spans.len() >= max_lines {
            return spans;
        }
        let next = i + c.len_utf8();

        let start = match line_start {
            Some(start) => start,
            None if is_gray(c) => {
                i = next;
                continue;
            }
            None => {
                breakpoint = None;
                last_was_white = false;
                buffer.clear();
                line_start = Some(i);
                i
            }
        };

        if ignoring {
            if !is_white(c) {
                i = next;
                continue;
            }
            ignoring = false;
            if c != '\n' {
                i = next;
                continue;
            }
        }

        if c == '\n' {
            spans.push(trimmed_span(src, start, i));
            line_start = None;
            i = next;
            continue;
        }

        if Some(c) == ignore_char {
            ignoring = true;
            i = next;
            continue;
        }

        if is_gray(c) {
            if !last_was_white {
                breakpoint = Some(i);
            }
            last_was_white = true;
        } else {
            last_was_white = false;
        }

        buffer.push(c);
        if measure.width(&buffer) > max_width {
            let end = match breakpoint {
                Some(at) => at,
                None => src[i..].find(is_white).map_or(src.len(), |offset| i + offset),
            };
            spans.push(trimmed_span(src, start, end));
            line_start = None;
            i = skip_break(src, end);
            continue;
        }

        i = next;
    }

    if let Some(start) = line_start
        && spans.len() < max_lines
    {
        let span = trimmed_span(src, start, src.len());
        if !span.is_empty() {
            spans.push(span);
        }
    }

    tracing::trace!(lines = spans.len(), max_width, "Split text");
    spans
}

/// Offset of the next line after a width break at `end`: trailing spaces
/// and at most one `\n` belong to the line just ended.
fn skip_break(src: &str, end: usize) -> usize {
    let rest = src[end..].trim_start_matches(is_gray);
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    src.len() - rest.len()
}

/// Splits off the first line of `src` if it is wider than `max_width`.
///
/// Returns the first line and the rest with leading whitespace removed, or
/// `None` for the rest when nothing is left. The first line ends at `\n`,
/// else at the start of the last run of whitespace that fits, else at the
/// first character that does not fit.
pub fn split_once<'a>(
    src: &'a str,
    max_width: u32,
    measure: &impl TextMeasure,
) -> (&'a str, Option<&'a str>) {
    if measure.width(src) <= max_width {
        return (src, None);
    }

    let mut breakpoint: Option<(usize, usize)> = None;
    let mut last_was_white = false;
    let mut stop = src.len();

    for (i, c) in src.char_indices() {
        if c == '\n' {
            return (&src[..i], remainder(&src[i + 1..]));
        }
        let next = i + c.len_utf8();
        if is_white(c) {
            if !last_was_white {
                breakpoint = Some((i, next));
            }
            last_was_white = true;
        } else {
            last_was_white = false;
        }
        if measure.width(&src[..next]) > max_width {
            // Always keep at least one character on the first line.
            stop = if i == 0 { next } else { i };
            break;
        }
    }

    let (end, rest) = breakpoint.unwrap_or((stop, stop));
    (&src[..end], remainder(&src[rest..]))
}

fn remainder(rest: &str) -> Option<&str> {
    let rest = rest.trim_start_matches(is_white);
    (!rest.is_empty()).then_some(rest)
}
