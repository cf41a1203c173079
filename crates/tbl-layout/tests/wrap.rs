//! Width properties of the line splitter.

use proptest::prelude::*;
use tbl_layout::{split, split_once};

fn chars(text: &str) -> u32 {
    text.chars().count() as u32
}

fn words(src: &str) -> Vec<&str> {
    src.split_whitespace().collect()
}

proptest! {
    #[test]
    fn spans_fit_when_every_word_fits(
        text_words in prop::collection::vec("[a-z]{1,10}", 1..30),
        max_width in 10u32..40,
    ) {
        let src = text_words.join(" ");
        let spans = split(&src, max_width, &chars, usize::MAX, None);

        for span in &spans {
            prop_assert!(chars(span.text(&src)) <= max_width);
        }
        let rejoined: Vec<&str> = spans.iter().flat_map(|s| words(s.text(&src))).collect();
        prop_assert_eq!(rejoined, words(&src));
    }

    #[test]
    fn wide_word_gets_its_own_span(
        before in "[a-z]{1,4}",
        wide in "[a-z]{12,20}",
        after in "[a-z]{1,4}",
    ) {
        let src = format!("{before} {wide} {after}");
        let spans = split(&src, 8, &chars, usize::MAX, None);
        let lines: Vec<&str> = spans.iter().map(|s| s.text(&src)).collect();

        prop_assert_eq!(lines, vec![before.as_str(), wide.as_str(), after.as_str()]);
    }

    #[test]
    fn newlines_always_break(lines in prop::collection::vec("[a-z]{1,8}", 1..10)) {
        let src = lines.join("\n");
        let spans = split(&src, 100, &chars, usize::MAX, None);
        let out: Vec<&str> = spans.iter().map(|s| s.text(&src)).collect();
        prop_assert_eq!(out, lines.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn empty_spans_only_for_blank_lines(
        first in "[a-z]{1,12}",
        middle in prop::collection::vec(prop::collection::vec("[a-z]{1,12}", 0..4), 0..6),
        last in "[a-z]{1,12}",
        trailing_spaces in prop::collection::vec(0usize..3, 8),
        max_width in 3u32..10,
    ) {
        let mut source_lines = vec![first];
        source_lines.extend(middle.iter().map(|words| words.join(" ")));
        source_lines.push(last);
        let blank_lines = source_lines.iter().filter(|line| line.is_empty()).count();

        let src = source_lines
            .iter()
            .zip(trailing_spaces.iter().cycle())
            .map(|(line, &pad)| format!("{line}{}", " ".repeat(pad)))
            .collect::<Vec<_>>()
            .join("\n");
        let spans = split(&src, max_width, &chars, usize::MAX, None);

        let empty = spans.iter().filter(|span| span.is_empty()).count();
        prop_assert_eq!(empty, blank_lines);
        let rejoined: Vec<&str> = spans.iter().flat_map(|s| words(s.text(&src))).collect();
        prop_assert_eq!(rejoined, words(&src));
    }

    #[test]
    fn split_once_first_line_fits(
        text_words in prop::collection::vec("[a-z]{1,6}", 1..20),
        max_width in 6u32..30,
    ) {
        let src = text_words.join(" ");
        let (first, rest) = split_once(&src, max_width, &chars);

        prop_assert!(chars(first) <= max_width);
        if let Some(rest) = rest {
            prop_assert_eq!(
                words(first).len() + words(rest).len(),
                text_words.len()
            );
        }
    }
}
