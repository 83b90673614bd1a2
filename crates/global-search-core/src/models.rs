//! Core data models used throughout the search subsystem.
//!
//! These types represent the queries, raw entities, ranked results, and
//! persisted history records that flow through the search pipeline.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The subset of entity collections a search targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    All,
    Projects,
    Goals,
    Tasks,
    Contexts,
    Tags,
    Notes,
}

impl Scope {
    /// Every scope, in the order the scope bar displays them.
    pub const ALL_SCOPES: [Scope; 7] = [
        Scope::All,
        Scope::Projects,
        Scope::Goals,
        Scope::Tasks,
        Scope::Contexts,
        Scope::Tags,
        Scope::Notes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::All => "all",
            Scope::Projects => "projects",
            Scope::Goals => "goals",
            Scope::Tasks => "tasks",
            Scope::Contexts => "contexts",
            Scope::Tags => "tags",
            Scope::Notes => "notes",
        }
    }

    /// Human-readable name shown in the scope bar and group headers.
    pub fn display_name(&self) -> &'static str {
        match self {
            Scope::All => "All",
            Scope::Projects => "Projects",
            Scope::Goals => "Goals",
            Scope::Tasks => "Tasks",
            Scope::Contexts => "Contexts",
            Scope::Tags => "Tags",
            Scope::Notes => "Notes",
        }
    }

    /// The remote collections this scope fans out to.
    ///
    /// `all` maps to the six collections in request order; every other
    /// scope maps to exactly one.
    pub fn collections(&self) -> Vec<Collection> {
        match self {
            Scope::All => Collection::ALL.to_vec(),
            Scope::Projects => vec![Collection::Projects],
            Scope::Goals => vec![Collection::Goals],
            Scope::Tasks => vec![Collection::Tasks],
            Scope::Contexts => vec![Collection::Contexts],
            Scope::Tags => vec![Collection::Tags],
            Scope::Notes => vec![Collection::Notes],
        }
    }

    /// Input placeholder text for this scope.
    pub fn placeholder(&self) -> String {
        match self {
            Scope::All => "Search across all your data...".to_string(),
            other => format!("Search {}...", other.display_name().to_lowercase()),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Scope::ALL_SCOPES
            .iter()
            .copied()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown scope: '{}'. Use all, projects, goals, tasks, contexts, tags, or notes.",
                    s
                )
            })
    }
}

impl From<Collection> for Scope {
    fn from(c: Collection) -> Self {
        match c {
            Collection::Projects => Scope::Projects,
            Collection::Goals => Scope::Goals,
            Collection::Tasks => Scope::Tasks,
            Collection::Contexts => Scope::Contexts,
            Collection::Tags => Scope::Tags,
            Collection::Notes => Scope::Notes,
        }
    }
}

/// One remote entity collection (every scope except `all`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Projects,
    Goals,
    Tasks,
    Contexts,
    Tags,
    Notes,
}

impl Collection {
    /// The six collections in the order `all` requests them.
    pub const ALL: [Collection; 6] = [
        Collection::Projects,
        Collection::Goals,
        Collection::Tasks,
        Collection::Contexts,
        Collection::Notes,
        Collection::Tags,
    ];

    pub fn as_str(&self) -> &'static str {
        Scope::from(*self).as_str()
    }

    pub fn display_name(&self) -> &'static str {
        Scope::from(*self).display_name()
    }

    /// Tie-break priority when relevance scores are equal (higher first).
    pub fn priority(&self) -> u8 {
        match self {
            Collection::Projects => 5,
            Collection::Goals => 4,
            Collection::Tasks => 3,
            Collection::Contexts => 2,
            Collection::Notes => 1,
            Collection::Tags => 0,
        }
    }

    /// Path prefix of the page that shows an entity of this collection.
    pub fn url_prefix(&self) -> &'static str {
        match self {
            Collection::Projects => "/projects",
            Collection::Goals => "/goals",
            Collection::Tasks => "/tasks",
            Collection::Contexts => "/contexts",
            Collection::Notes => "/notes",
            Collection::Tags => "/tags",
        }
    }

    /// `{prefix}/{id}` for the given entity.
    pub fn item_url(&self, id: &EntityId) -> String {
        format!("{}/{}", self.url_prefix(), id)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<Scope> for Collection {
    type Error = anyhow::Error;

    fn try_from(scope: Scope) -> anyhow::Result<Self> {
        match scope {
            Scope::All => anyhow::bail!("scope 'all' does not name a single collection"),
            Scope::Projects => Ok(Collection::Projects),
            Scope::Goals => Ok(Collection::Goals),
            Scope::Tasks => Ok(Collection::Tasks),
            Scope::Contexts => Ok(Collection::Contexts),
            Scope::Tags => Ok(Collection::Tags),
            Scope::Notes => Ok(Collection::Notes),
        }
    }
}

/// Entity identifier. The backend emits integers; strings are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId(s.to_string())
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        EntityId(n.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => EntityId(n.to_string()),
            Raw::Str(s) => EntityId(s),
        })
    }
}

/// A tag attached to an entity: either `{ "name": ... }` or a bare string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagRef {
    Named { name: String },
    Plain(String),
}

impl TagRef {
    pub fn name(&self) -> &str {
        match self {
            TagRef::Named { name } => name,
            TagRef::Plain(s) => s,
        }
    }
}

/// Heterogeneous record returned by the data source.
///
/// Guaranteed fields vary by collection; every entity has an `id` and one of
/// `title`/`name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntity {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, alias = "due_date", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, alias = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl RawEntity {
    /// Minimal entity with only an id and a title.
    pub fn titled(id: impl Into<EntityId>, title: &str) -> Self {
        Self {
            id: id.into(),
            title: Some(title.to_string()),
            name: None,
            description: None,
            content: None,
            tags: Vec::new(),
            status: None,
            priority: None,
            due_date: None,
            created_at: None,
        }
    }

    /// Primary label: the first non-empty of `title` and `name`.
    pub fn label(&self) -> &str {
        first_non_empty(&self.title, &self.name)
    }

    /// Secondary text: the first non-empty of `description` and `content`.
    pub fn body_text(&self) -> &str {
        first_non_empty(&self.description, &self.content)
    }

    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(TagRef::name)
    }

    /// Creation time in Unix milliseconds; unparseable or missing dates are 0.
    pub fn created_millis(&self) -> i64 {
        self.created_at.as_deref().map(parse_millis).unwrap_or(0)
    }

    /// Due date as `YYYY-MM-DD`, when present and parseable.
    pub fn due_day(&self) -> Option<String> {
        let raw = self.due_date.as_deref()?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.format("%Y-%m-%d").to_string());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .map(|d| d.format("%Y-%m-%d").to_string())
    }
}

fn first_non_empty<'a>(a: &'a Option<String>, b: &'a Option<String>) -> &'a str {
    match (a.as_deref(), b.as_deref()) {
        (Some(s), _) if !s.is_empty() => s,
        (_, Some(s)) if !s.is_empty() => s,
        _ => "",
    }
}

fn parse_millis(raw: &str) -> i64 {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp_millis();
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0)
}

/// A single search invocation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub scope: Scope,
    pub filters: BTreeMap<String, String>,
}

impl SearchQuery {
    pub fn new(text: &str, scope: Scope) -> Self {
        Self {
            text: text.trim().to_string(),
            scope,
            filters: BTreeMap::new(),
        }
    }

    pub fn with_filters(mut self, filters: BTreeMap<String, String>) -> Self {
        self.filters = filters;
        self
    }
}

/// A ranked candidate: the raw entity tagged with its source collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub entity: RawEntity,
    #[serde(rename = "type")]
    pub kind: Collection,
    #[serde(rename = "relevanceScore")]
    pub relevance_score: u32,
}

impl SearchResult {
    pub fn url(&self) -> String {
        self.kind.item_url(&self.entity.id)
    }
}

/// Results of one collection, in rank order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultGroup {
    #[serde(rename = "type")]
    pub kind: Collection,
    pub items: Vec<SearchResult>,
}

/// A past activation: which query led to which result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub query: String,
    #[serde(rename = "type")]
    pub kind: Collection,
    pub title: String,
    pub timestamp: i64,
}

/// A snapshot of a visited entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentItem {
    #[serde(flatten)]
    pub entity: RawEntity,
    #[serde(rename = "type")]
    pub kind: Collection,
    pub timestamp: i64,
}

impl RecentItem {
    pub fn url(&self) -> String {
        self.kind.item_url(&self.entity.id)
    }
}
