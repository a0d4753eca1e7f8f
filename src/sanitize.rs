//! Defensive cleaning of harvested text
//!
//! External extraction tools routinely leak control characters and other
//! junk into their output; anything outside the XML character ranges breaks
//! both the intermediate XML parse and the search indexer.

/// Replaces every maximal run of disallowed characters with a single space.
///
/// The permitted set is tab, line feed, carriage return, `U+0020`..=`U+D7FF`,
/// `U+E000`..=`U+FFFD` and the supplementary planes. A `char` is a Unicode
/// scalar value, so supplementary-plane characters are handled whole and
/// surrogate halves cannot occur.
pub fn sanitize_fulltext(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_bad_run = false;
    for c in text.chars() {
        if is_permitted(c) {
            out.push(c);
            in_bad_run = false;
        } else if !in_bad_run {
            out.push(' ');
            in_bad_run = true;
        }
    }
    out
}

fn is_permitted(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{a}' | '\u{d}'
        | '\u{20}'..='\u{d7ff}'
        | '\u{e000}'..='\u{fffd}'
        | '\u{10000}'..='\u{10ffff}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_clean_text_through() {
        let text = "An den Ufern des Mains\tZeile zwei\r\nZeile drei";
        assert_eq!(sanitize_fulltext(text), text);
    }

    #[test]
    fn collapses_runs_into_one_space() {
        assert_eq!(sanitize_fulltext("a\u{0}\u{1}\u{8}b"), "a b");
        assert_eq!(sanitize_fulltext("\u{b}\u{c}"), " ");
        assert_eq!(sanitize_fulltext("a\u{0}b\u{0}c"), "a b c");
    }

    #[test]
    fn strips_noncharacters() {
        assert_eq!(sanitize_fulltext("x\u{fffe}\u{ffff}y"), "x y");
        // U+FFFD itself is inside the permitted range
        assert_eq!(sanitize_fulltext("x\u{fffd}y"), "x\u{fffd}y");
    }

    #[test]
    fn preserves_supplementary_plane() {
        let text = "clef \u{1d11e} and beyond \u{10ffff}";
        assert_eq!(sanitize_fulltext(text), text);
    }

    #[test]
    fn idempotent() {
        for sample in [
            "plain",
            "a\u{0}\u{1}b",
            "\u{fffe}",
            "mixed \u{1f600}\u{7}text\ttab",
            "",
        ] {
            let once = sanitize_fulltext(sample);
            assert_eq!(sanitize_fulltext(&once), once);
        }
    }

    #[test]
    fn never_longer_than_input() {
        for sample in ["", "abc", "a\u{0}\u{1}\u{2}\u{3}b", "\u{0}\u{1}\u{2}"] {
            assert!(sanitize_fulltext(sample).chars().count() <= sample.chars().count());
        }
    }
}
