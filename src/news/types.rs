use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A news outlet known to the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Source {
    pub id: String,
    pub name: String,
}

/// The `source` object embedded in every article.
///
/// `id` is null for outlets the API has no source entry for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: String,
}

/// A single headline as returned by the remote API.
///
/// Fields the program does not display (`author`, `urlToImage`, ...) are
/// kept in `extra` so a saved article round-trips without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub source: ArticleSource,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Which sources a search is restricted to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SourceSelection {
    #[default]
    All,
    Only(Vec<String>),
}

impl SourceSelection {
    /// Value for the `sources` query parameter, or `None` when the parameter
    /// must be omitted (all sources, or an empty list).
    pub fn query_value(&self) -> Option<String> {
        match self {
            SourceSelection::All => None,
            SourceSelection::Only(ids) if ids.is_empty() => None,
            SourceSelection::Only(ids) => Some(ids.join(",")),
        }
    }

    pub fn is_all(&self) -> bool {
        self.query_value().is_none()
    }
}

/// Body of the `sources` endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct SourcesResponse {
    pub sources: Vec<Source>,
}

/// Body of the `top-headlines` endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct ArticlesResponse {
    pub articles: Vec<Article>,
}

/// Error body the API sends with non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ARTICLE_JSON: &str = r#"{
        "source": {"id": null, "name": "Example Times"},
        "author": "Jane Doe",
        "title": "Something happened",
        "description": null,
        "url": "https://example.com/story",
        "urlToImage": "https://example.com/story.jpg",
        "publishedAt": "2024-03-01T12:00:00Z",
        "content": "Body text [+123 chars]"
    }"#;

    #[test]
    fn test_article_parses_known_and_unknown_fields() {
        let article: Article = serde_json::from_str(ARTICLE_JSON).unwrap();
        assert_eq!(article.source.name, "Example Times");
        assert_eq!(article.source.id, None);
        assert_eq!(article.description, None);
        assert_eq!(article.published_at.as_deref(), Some("2024-03-01T12:00:00Z"));
        assert_eq!(article.extra.get("author"), Some(&Value::from("Jane Doe")));
        assert!(article.extra.contains_key("urlToImage"));
    }

    #[test]
    fn test_article_serialization_keeps_every_field() {
        let article: Article = serde_json::from_str(ARTICLE_JSON).unwrap();
        let original: Value = serde_json::from_str(ARTICLE_JSON).unwrap();
        let reencoded = serde_json::to_value(&article).unwrap();
        assert_eq!(reencoded, original);
    }

    #[test]
    fn test_article_missing_title_is_rejected() {
        let json = r#"{"source": {"id": null, "name": "X"}, "url": "https://x"}"#;
        assert!(serde_json::from_str::<Article>(json).is_err());
    }

    #[test]
    fn test_selection_query_value() {
        assert_eq!(SourceSelection::All.query_value(), None);
        assert_eq!(SourceSelection::Only(vec![]).query_value(), None);
        assert_eq!(
            SourceSelection::Only(vec!["bbc".to_string(), "cnn".to_string()]).query_value(),
            Some("bbc,cnn".to_string())
        );
        assert!(SourceSelection::default().is_all());
    }
}
