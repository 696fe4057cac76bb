//! Availability checker.
//!
//! Decides whether a movie is listed on a fetched page by looking for the
//! movie name, case-insensitively, inside the text of the page's links.
//! The match is a plain substring test: "Dune" matches "Dune: Part Two".

use once_cell::sync::Lazy;
use regex_lite::Regex;

static ANCHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<a\b[^>]*>(.*?)</a\s*>").expect("anchor regex is valid"));

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag regex is valid"));

static BODY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<body\b").expect("body regex is valid"));

/// True if any link on the page has text containing `movie_name`.
///
/// A blank movie name never matches.
pub fn is_available(page: &str, movie_name: &str) -> bool {
    if movie_name.trim().is_empty() {
        return false;
    }
    anchor_texts(page).any(|text| mentions(&text, movie_name))
}

/// Case-insensitive substring test of one link's text against the movie name.
pub fn mentions(text: &str, movie_name: &str) -> bool {
    let needle = movie_name.trim().to_lowercase();
    !needle.is_empty() && text.to_lowercase().contains(&needle)
}

/// Visible text of every `<a>` element, with nested tags removed and
/// character references decoded.
pub fn anchor_texts(page: &str) -> impl Iterator<Item = String> + '_ {
    ANCHOR.captures_iter(page).filter_map(|caps| {
        let inner = caps.get(1)?.as_str();
        let text = decode_entities(&TAG.replace_all(inner, ""));
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    })
}

/// Whether the page has a `<body>` element, i.e. it actually rendered.
pub fn has_body(page: &str) -> bool {
    BODY.is_match(page)
}

fn decode_entities(text: &str) -> String {
    // Rendered text has plain spaces where the markup had &nbsp;
    html_escape::decode_html_entities(text).replace('\u{a0}', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
<html><body>
  <nav><a href="/home">Home</a></nav>
  <div class="movies">
    <a href="/movies/dune-part-two" class="title">Dune Part Two</a>
    <a href="/movies/oppenheimer"><span>Oppenheimer</span> (IMAX)</a>
  </div>
  <p>Coming soon: Interstellar</p>
</body></html>
"#;

    #[test]
    fn test_finds_movie_in_link_text() {
        assert!(is_available(LISTING, "Dune"));
    }

    #[test]
    fn test_match_is_case_insensitive() {
        assert!(is_available(LISTING, "dune part two"));
        assert!(is_available(LISTING, "DUNE"));
    }

    #[test]
    fn test_substring_match_is_loose() {
        assert!(is_available(LISTING, "Part"));
    }

    #[test]
    fn test_text_outside_links_does_not_count() {
        assert!(!is_available(LISTING, "Interstellar"));
    }

    #[test]
    fn test_missing_movie() {
        assert!(!is_available(LISTING, "Barbie"));
    }

    #[test]
    fn test_nested_tags_are_stripped() {
        assert!(is_available(LISTING, "oppenheimer (imax)"));
    }

    #[test]
    fn test_entities_are_decoded() {
        let page = r#"<body><a href="/m/1">Fast &amp; Furious</a></body>"#;
        assert!(is_available(page, "fast & furious"));
    }

    #[test]
    fn test_numeric_references_are_decoded() {
        let hex = r#"<body><a href="/m">Ocean&#x27;s Eleven</a></body>"#;
        assert!(is_available(hex, "Ocean's Eleven"));

        let decimal = r#"<body><a href="/m">Fast &#38; Furious</a></body>"#;
        assert!(is_available(decimal, "Fast & Furious"));
    }

    #[test]
    fn test_nbsp_matches_plain_space() {
        let page = "<body><a href='/m'>Dune&nbsp;Part&#160;Two</a></body>";
        assert!(is_available(page, "dune part two"));
    }

    #[test]
    fn test_double_escaped_text_decodes_once() {
        let page = "<body><a href='/m'>A &amp;lt; B</a></body>";
        assert!(is_available(page, "a &lt; b"));
    }

    #[test]
    fn test_mentions() {
        assert!(mentions("Dune: Part Two", "dune"));
        assert!(mentions("  DUNE  ", " Dune "));
        assert!(!mentions("Barbie", "Dune"));
        assert!(!mentions("Barbie", " "));
    }

    #[test]
    fn test_multiline_anchor() {
        let page = "<body><A HREF='/m/2'>\n  Dune\n  Part Two\n</A></body>";
        assert!(is_available(page, "dune"));
    }

    #[test]
    fn test_blank_movie_never_matches() {
        assert!(!is_available(LISTING, ""));
        assert!(!is_available(LISTING, "   "));
    }

    #[test]
    fn test_anchor_texts() {
        let texts: Vec<String> = anchor_texts(LISTING).collect();
        assert_eq!(
            texts,
            vec!["Home", "Dune Part Two", "Oppenheimer (IMAX)"]
        );
    }

    #[test]
    fn test_has_body() {
        assert!(has_body(LISTING));
        assert!(has_body("<BODY class='x'>"));
        assert!(!has_body("<html><head></head></html>"));
        assert!(!has_body(""));
    }
}
