//! Word-wrap layout for on-screen text.
//!
//! Text is broken into lines that fit a pixel width. The crate does no font
//! work itself: callers pass a [`TextMeasure`] that reports the rendered
//! width of a string.
//!
//! # Example
//!
//! ```rust,ignore
//! use tbl_layout::split;
//!
//! let text = "Proceed to nav point Alpha";
//! let spans = split(text, 80, &|s: &str| s.chars().count() as u32 * 6, 4, Some('$'));
//! for span in &spans {
//!     draw_line(span.text(text));
//! }
//! ```

mod split;

pub use split::{Span, TextMeasure, split, split_once};
