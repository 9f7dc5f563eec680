use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::html;
use crate::Config;

/// Server-assigned post identifier. The backend has shipped both numeric and
/// string ids, so either is accepted and kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BlogId(String);

impl BlogId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlogId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl<'de> Deserialize<'de> for BlogId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(id) => BlogId(id),
            RawId::Number(id) => BlogId(id.to_string()),
        })
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BlogSummary {
    pub id: BlogId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub image: Option<String>,
    #[serde(default)]
    pub author: String,
    #[serde(rename = "publishDate", default, deserialize_with = "lenient_timestamp")]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(rename = "totalLike", default)]
    pub total_like: u64,
    #[serde(rename = "totalComment", default)]
    pub total_comment: u64,
}

impl BlogSummary {
    /// Plain-text teaser for cards: markup stripped, whitespace collapsed,
    /// cut on a char boundary.
    pub fn preview(&self, max_chars: usize) -> String {
        html::preview(&self.content, max_chars)
    }

    /// Card teaser at the configured `preview_len`.
    pub fn card_preview(&self, config: &Config) -> String {
        self.preview(config.preview_len)
    }
}

/// Full post as returned by the detail endpoint. Same wire shape as a
/// summary, but `content` is never truncated.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BlogDetail {
    #[serde(flatten)]
    pub blog: BlogSummary,
}

impl std::ops::Deref for BlogDetail {
    type Target = BlogSummary;

    fn deref(&self) -> &BlogSummary {
        &self.blog
    }
}

/// The post shown above the grid: highest like count, earliest wins a tie.
pub fn featured(items: &[BlogSummary]) -> Option<&BlogSummary> {
    items.iter().fold(None, |best: Option<&BlogSummary>, blog| match best {
        Some(current) if current.total_like >= blog.total_like => Some(current),
        _ => Some(blog),
    })
}

fn non_empty_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(serde::de::Error::custom)
}
