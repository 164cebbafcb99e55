//! Core data models used throughout Concierge.
//!
//! These types represent the retrievable content, the external catalog
//! records it is built from, and the chat response handed back to callers.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Closed set of content types. Determines how a matched item is phrased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Static,
    Faq,
    Property,
    Article,
}

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [
        ContentKind::Static,
        ContentKind::Faq,
        ContentKind::Property,
        ContentKind::Article,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Static => "static",
            ContentKind::Faq => "faq",
            ContentKind::Property => "property",
            ContentKind::Article => "article",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unit of retrieval: a normalized, typed piece of answerable text.
///
/// Items are immutable once built; a new aggregation pass produces a
/// fresh set rather than editing existing ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Namespaced identifier, e.g. `faq-1` or `property-42`.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub title: String,
    pub body: String,
    /// Provenance link. Empty for purely informational items.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Grouping tag (region, topic). Not used for scoring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ContentItem {
    pub fn new(
        id: impl Into<String>,
        kind: ContentKind,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            body: body.into(),
            url: String::new(),
            keywords: Vec::new(),
            category: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// True when the item has nothing to show and must not enter a corpus.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.body.trim().is_empty()
    }
}

/// Topic bucket assigned to a free-text query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryClass {
    Property,
    Investment,
    Company,
    ProtocolTech,
    General,
    Unknown,
}

impl QueryClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryClass::Property => "property",
            QueryClass::Investment => "investment",
            QueryClass::Company => "company",
            QueryClass::ProtocolTech => "protocol_tech",
            QueryClass::General => "general",
            QueryClass::Unknown => "unknown",
        }
    }
}

impl fmt::Display for QueryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record shape returned by the property catalog's `ListProperties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub total_value: f64,
    #[serde(rename = "type", default)]
    pub property_type: String,
    #[serde(default)]
    pub region: String,
}

/// Record shape returned by the article catalog's `ListArticles`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Catalogs in the wild hand out both numeric and string ids.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// Who authored a chat message. The engine only ever speaks as the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Bot,
}

/// Wire shape of a generated answer.
///
/// ```json
/// { "id": 1760000000000, "text": "...", "sender": "bot",
///   "timestamp": "2026-10-19T09:30:00.000Z",
///   "sourceUrl": "/faq", "sourceTitle": "..." }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub id: i64,
    pub text: String,
    pub sender: Sender,
    #[serde(serialize_with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_title: Option<String>,
}

fn iso_millis<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}
