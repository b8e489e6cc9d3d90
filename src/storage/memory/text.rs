//! Term matching behind `$text` queries on the embedded engine.
//!
//! A `$search` string is read the way MongoDB reads it: bare words are OR'ed,
//! a word prefixed with `-` excludes documents containing it, and a quoted
//! `"phrase"` must appear verbatim (case-insensitive). When phrases are
//! present every phrase must match and bare words no longer widen the result.
//! A search made only of exclusions matches nothing.

use bson::{Bson, Document};
use std::collections::HashSet;

use super::eval::get_path;

/// Lowercased alphanumeric terms in first-seen order, without duplicates.
#[must_use]
pub fn tokenize(s: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// A parsed `$search` string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSearch {
    pub terms: Vec<String>,
    /// Lowercased, whitespace-normalized phrases.
    pub phrases: Vec<String>,
    pub excluded: Vec<String>,
}

impl TextSearch {
    #[must_use]
    pub fn parse(search: &str) -> Self {
        let mut out = Self::default();
        let mut rest = String::new();
        for (i, part) in search.split('"').enumerate() {
            // odd segments sit between quotes; an unclosed quote runs to the end
            if i % 2 == 1 {
                let phrase = normalize(part);
                if !phrase.is_empty() && !out.phrases.contains(&phrase) {
                    out.phrases.push(phrase);
                }
            } else {
                rest.push(' ');
                rest.push_str(part);
            }
        }
        for word in rest.split_whitespace() {
            match word.strip_prefix('-') {
                Some(neg) => push_unique(&mut out.excluded, tokenize(neg)),
                None => push_unique(&mut out.terms, tokenize(word)),
            }
        }
        out
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.phrases.is_empty()
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace().map(str::to_lowercase).collect::<Vec<_>>().join(" ")
}

fn push_unique(into: &mut Vec<String>, terms: Vec<String>) {
    for t in terms {
        if !into.contains(&t) {
            into.push(t);
        }
    }
}

/// Strings of the indexed fields; array fields contribute every string element.
fn indexed_text<'a>(doc: &'a Document, fields: &[String]) -> Vec<&'a str> {
    let mut out = Vec::new();
    for field in fields {
        match get_path(doc, field) {
            Some(Bson::String(s)) => out.push(s.as_str()),
            Some(Bson::Array(items)) => {
                out.extend(items.iter().filter_map(|item| match item {
                    Bson::String(s) => Some(s.as_str()),
                    _ => None,
                }));
            }
            _ => {}
        }
    }
    out
}

#[must_use]
pub fn matches(doc: &Document, fields: &[String], search: &TextSearch) -> bool {
    if search.is_empty() {
        return false;
    }
    let texts = indexed_text(doc, fields);
    let tokens: HashSet<String> = texts.iter().flat_map(|s| tokenize(s)).collect();
    if search.excluded.iter().any(|t| tokens.contains(t)) {
        return false;
    }
    if !search.phrases.is_empty() {
        let normalized: Vec<String> = texts.iter().map(|s| normalize(s)).collect();
        return search.phrases.iter().all(|p| normalized.iter().any(|s| s.contains(p.as_str())));
    }
    search.terms.iter().any(|t| tokens.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn fields() -> Vec<String> {
        vec!["title".to_string(), "tags".to_string()]
    }

    #[test]
    fn tokenize_splits_and_dedupes() {
        assert_eq!(tokenize("The Matrix: Reloaded, the"), vec!["the", "matrix", "reloaded"]);
        assert!(tokenize("  --  ").is_empty());
    }

    #[test]
    fn parse_separates_terms_phrases_and_exclusions() {
        let s = TextSearch::parse(r#"matrix -reloaded "The  Matrix" PG-13"#);
        assert_eq!(s.terms, vec!["matrix", "pg", "13"]);
        assert_eq!(s.phrases, vec!["the matrix"]);
        assert_eq!(s.excluded, vec!["reloaded"]);
        assert!(TextSearch::parse("  ").is_empty());
    }

    #[test]
    fn any_term_in_any_field() {
        let d = doc! { "title": "The Matrix", "tags": ["cyberpunk", "action"] };
        assert!(matches(&d, &fields(), &TextSearch::parse("matrix")));
        assert!(matches(&d, &fields(), &TextSearch::parse("Cyberpunk western")));
        assert!(!matches(&d, &fields(), &TextSearch::parse("titanic")));
        assert!(!matches(&d, &fields(), &TextSearch::default()));
    }

    #[test]
    fn exclusions_and_phrases() {
        let matrix = doc! { "title": "The Matrix" };
        let reloaded = doc! { "title": "The Matrix Reloaded" };
        let f = fields();

        assert!(!matches(&matrix, &f, &TextSearch::parse("-matrix")));
        assert!(matches(&matrix, &f, &TextSearch::parse("matrix -reloaded")));
        assert!(!matches(&reloaded, &f, &TextSearch::parse("matrix -reloaded")));

        assert!(matches(&reloaded, &f, &TextSearch::parse(r#""matrix reloaded""#)));
        assert!(!matches(&matrix, &f, &TextSearch::parse(r#""matrix reloaded" titanic"#)));
        assert!(!matches(&reloaded, &f, &TextSearch::parse(r#""reloaded matrix""#)));
    }
}
