//! String helpers shared by the views.

use std::ops::Range;

const ELLIPSIS: &str = "...";

/// Cut `text` to its first `limit` characters, appending `...` only when
/// something was cut.
pub fn truncate_preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Wrap occurrences of `keyword` in `text` using `mark`.
///
/// Only two casings are marked: `keyword` exactly as given and its
/// upper-case form. Other casings of a case-insensitive match stay plain.
/// Both sets of occurrences are located on the unmarked text; an upper-case
/// occurrence overlapping an exact one is left to the exact one.
pub fn highlight<F>(text: &str, keyword: &str, mark: F) -> String
where
    F: Fn(&str) -> String,
{
    if keyword.is_empty() {
        return text.to_string();
    }

    let mut ranges: Vec<Range<usize>> = text
        .match_indices(keyword)
        .map(|(start, m)| start..start + m.len())
        .collect();

    let upper = keyword.to_uppercase();
    if upper != keyword {
        let exact = ranges.clone();
        ranges.extend(
            text.match_indices(upper.as_str())
                .map(|(start, m)| start..start + m.len())
                .filter(|r| !exact.iter().any(|e| r.start < e.end && e.start < r.end)),
        );
        ranges.sort_by_key(|r| r.start);
    }

    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    for range in ranges {
        out.push_str(&text[pos..range.start]);
        out.push_str(&mark(&text[range.clone()]));
        pos = range.end;
    }
    out.push_str(&text[pos..]);
    out
}

/// Human form of an agent id: underscores become spaces, and each run of
/// letters starts upper-case with the rest lower-case (`claude_code` ->
/// `Claude Code`).
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_word = false;

    for c in name.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}
