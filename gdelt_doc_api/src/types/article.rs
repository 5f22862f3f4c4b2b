//! Article list types: the `artlist` response and its tabular form.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Format of `seendate` and timeline `date` values, e.g. `20200501T134500Z`.
pub const GDELT_DATETIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// A single article from the article list mode.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Article {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub url_mobile: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,

    /// When GDELT first saw the article, as `YYYYMMDDTHHMMSSZ`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub seendate: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub socialimage: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub domain: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub language: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub sourcecountry: String,
}

/// The API sends `null` for some fields it has no value for.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Article {
    /// Parses `seendate`, if it is in the usual format.
    pub fn seen_at(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.seendate, GDELT_DATETIME_FORMAT)
            .ok()
            .map(|dt| dt.and_utc())
    }

    /// Cell values in [`ArticleList::COLUMNS`] order.
    pub fn values(&self) -> [&str; 8] {
        [
            self.url.as_str(),
            self.url_mobile.as_str(),
            self.title.as_str(),
            self.seendate.as_str(),
            self.socialimage.as_str(),
            self.domain.as_str(),
            self.language.as_str(),
            self.sourcecountry.as_str(),
        ]
    }
}

/// Raw `artlist` response body.
#[derive(Serialize, Deserialize)]
pub struct ArticleResponse {
    #[serde(default)]
    pub articles: Vec<Article>,
}

/// Articles as a table with a fixed column set.
///
/// An empty result still reports every column.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticleList {
    pub articles: Vec<Article>,
}

impl ArticleList {
    pub const COLUMNS: [&'static str; 8] = [
        "url",
        "url_mobile",
        "title",
        "seendate",
        "socialimage",
        "domain",
        "language",
        "sourcecountry",
    ];

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &Self::COLUMNS
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Article> {
        self.articles.iter()
    }
}

impl From<ArticleResponse> for ArticleList {
    fn from(resp: ArticleResponse) -> Self {
        Self {
            articles: resp.articles,
        }
    }
}

impl IntoIterator for ArticleList {
    type Item = Article;
    type IntoIter = std::vec::IntoIter<Article>;

    fn into_iter(self) -> Self::IntoIter {
        self.articles.into_iter()
    }
}
