use bson::{Document, doc};
use serde::{Deserialize, Serialize};

/// Raw filter input as it arrives from a caller. Both keys may be present;
/// [`MovieFilter::from`] decides which one counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rated: Option<String>,
}

/// What a movie query selects on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MovieFilter {
    #[default]
    All,
    /// Full-text search over the title index.
    ByTitle(String),
    /// Exact match on the content rating code.
    ByRating(String),
}

impl From<FilterSpec> for MovieFilter {
    /// `title` takes precedence; `rated` is only consulted when `title` is absent.
    fn from(spec: FilterSpec) -> Self {
        match (spec.title, spec.rated) {
            (Some(title), _) => Self::ByTitle(title),
            (None, Some(rated)) => Self::ByRating(rated),
            (None, None) => Self::All,
        }
    }
}

impl From<Option<FilterSpec>> for MovieFilter {
    fn from(spec: Option<FilterSpec>) -> Self {
        spec.map_or(Self::All, Self::from)
    }
}

impl MovieFilter {
    /// The storage query document for this filter.
    #[must_use]
    pub fn to_query(&self) -> Document {
        match self {
            Self::All => Document::new(),
            Self::ByTitle(text) => doc! { "$text": { "$search": text.as_str() } },
            Self::ByRating(code) => doc! { "rated": { "$eq": code.as_str() } },
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::ByTitle(_) => "title",
            Self::ByRating(_) => "rated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_wins_over_rated() {
        let spec = FilterSpec { title: Some("matrix".into()), rated: Some("PG".into()) };
        let f = MovieFilter::from(spec);
        assert_eq!(f, MovieFilter::ByTitle("matrix".into()));
        assert_eq!(f.to_query(), doc! { "$text": { "$search": "matrix" } });
    }

    #[test]
    fn rated_and_empty_forms() {
        let f = MovieFilter::from(FilterSpec { title: None, rated: Some("G".into()) });
        assert_eq!(f.to_query(), doc! { "rated": { "$eq": "G" } });
        assert_eq!(MovieFilter::from(FilterSpec::default()), MovieFilter::All);
        assert_eq!(MovieFilter::from(None::<FilterSpec>).to_query(), doc! {});
    }
}
