//! Query highlighting for table cells.
//!
//! The query is matched as a literal string: characters such as `(`, `*` or
//! `\` only ever match themselves.

/// A run of cell text, either matching the query or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub matched: bool,
}

impl<'a> Segment<'a> {
    fn plain(text: &'a str) -> Self {
        Self {
            text,
            matched: false,
        }
    }
}

/// Lowercased copy of a text that remembers where each source char went.
struct Folded {
    text: String,
    /// `(folded offset, source offset)` of every source char, in order.
    chars: Vec<(usize, usize)>,
}

impl Folded {
    fn new(source: &str) -> Self {
        let mut text = String::with_capacity(source.len());
        let mut chars = Vec::with_capacity(source.len());
        for (offset, ch) in source.char_indices() {
            chars.push((text.len(), offset));
            text.extend(ch.to_lowercase());
        }
        Self { text, chars }
    }

    /// Index of the source char whose folded form covers byte `offset`.
    fn char_at(&self, offset: usize) -> usize {
        self.chars
            .partition_point(|&(start, _)| start <= offset)
            .saturating_sub(1)
    }
}

fn fold(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

/// Splits `text` into segments, marking every non-overlapping occurrence of
/// `query` (case-insensitive, leftmost first).
///
/// Matching runs on the lowercased text. A match that covers only part of a
/// char's lowercase form (`i` inside `İ`) marks the whole source char.
///
/// An empty query yields the whole text as a single unmatched segment.
pub fn highlight<'a>(text: &'a str, query: &str) -> Vec<Segment<'a>> {
    if query.is_empty() {
        return vec![Segment::plain(text)];
    }

    let needle = fold(query);
    let folded = Folded::new(text);
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut search_from = 0;

    while let Some(found) = folded.text[search_from..].find(&needle) {
        let start = search_from + found;
        let first = folded.chars[folded.char_at(start)].1;
        let last = folded.char_at(start + needle.len() - 1);
        let (next_folded, end) = folded
            .chars
            .get(last + 1)
            .copied()
            .unwrap_or((folded.text.len(), text.len()));

        if plain_start < first {
            segments.push(Segment::plain(&text[plain_start..first]));
        }
        segments.push(Segment {
            text: &text[first..end],
            matched: true,
        });
        plain_start = end;
        search_from = next_folded;
    }

    if plain_start < text.len() || segments.is_empty() {
        segments.push(Segment::plain(&text[plain_start..]));
    }
    segments
}

/// Returns `true` if the lowercase form of `text` contains the lowercase
/// form of `query`.
pub fn contains_ignore_case(text: &str, query: &str) -> bool {
    query.is_empty() || fold(text).contains(&fold(query))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(segments: &[Segment<'_>]) -> String {
        segments.iter().map(|s| s.text).collect()
    }

    #[test]
    fn test_empty_query_is_noop() {
        let segments = highlight("Alice Smith", "");
        assert_eq!(segments, vec![Segment::plain("Alice Smith")]);
    }

    #[test]
    fn test_empty_text_does_not_panic() {
        assert_eq!(highlight("", "ali"), vec![Segment::plain("")]);
        assert_eq!(highlight("", ""), vec![Segment::plain("")]);
    }

    #[test]
    fn test_case_insensitive_matches() {
        let segments = highlight("Alice and ALI", "ali");
        assert_eq!(
            segments,
            vec![
                Segment {
                    text: "Ali",
                    matched: true
                },
                Segment::plain("ce and "),
                Segment {
                    text: "ALI",
                    matched: true
                },
            ]
        );
    }

    #[test]
    fn test_no_match_returns_plain_text() {
        let segments = highlight("Bob", "ali");
        assert_eq!(segments, vec![Segment::plain("Bob")]);
    }

    #[test]
    fn test_matches_do_not_overlap() {
        let segments = highlight("aaaa", "aa");
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| s.matched && s.text == "aa"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let segments = highlight("fee (15%) [x]", "(15%");
        assert_eq!(joined(&segments), "fee (15%) [x]");
        assert!(segments.iter().any(|s| s.matched && s.text == "(15%"));

        // Would be an invalid pattern if used as a regex.
        let segments = highlight("a\\b[", "[");
        assert!(segments.iter().any(|s| s.matched && s.text == "["));
    }

    #[test]
    fn test_multibyte_text_roundtrips() {
        let text = "José Ñúñez – Attorney’s";
        let segments = highlight(text, "ÑÚ");
        assert_eq!(joined(&segments), text);
        assert!(segments.iter().any(|s| s.matched && s.text == "Ñú"));
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Alice", "ALI"));
        assert!(contains_ignore_case("Alice", ""));
        assert!(!contains_ignore_case("Bob", "ali"));
        assert!(!contains_ignore_case("", "a"));
    }

    #[test]
    fn test_partial_lowercase_expansion_matches() {
        // 'İ' lowercases to "i\u{307}".
        assert!(contains_ignore_case("İpek", "i"));
        assert!(contains_ignore_case("İpek", "İp"));
        assert!(contains_ignore_case("İpek", "i\u{307}p"));
        assert!(!contains_ignore_case("İpek", "ip"));
        assert!(contains_ignore_case("İpek", "pek"));
    }

    #[test]
    fn test_partial_lowercase_expansion_highlights_whole_char() {
        let segments = highlight("İpek", "i");
        assert_eq!(
            segments,
            vec![
                Segment {
                    text: "İ",
                    matched: true
                },
                Segment::plain("pek"),
            ]
        );

        let segments = highlight("AİB", "\u{307}b");
        assert_eq!(joined(&segments), "AİB");
        assert!(segments.iter().any(|s| s.matched && s.text == "İB"));
    }

    #[test]
    fn test_highlight_agrees_with_contains() {
        for (text, query) in [("İpek", "i"), ("Straße", "SS"), ("ΣΟΦΙΑ", "σοφ"), ("Bob", "o")] {
            let any_match = highlight(text, query).iter().any(|s| s.matched);
            assert_eq!(any_match, contains_ignore_case(text, query), "{text:?} {query:?}");
        }
    }
}
