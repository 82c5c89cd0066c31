//! Data structures for SearXNG web search
//!
//! `SearchQuery` doubles as the `web_search` tool's argument schema. Its
//! deserializer is lenient on purpose for every field except `query`:
//! out-of-enum or mistyped optional values fall back to their defaults
//! instead of failing the call.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::utils::constants::{DEFAULT_PAGENO, DEFAULT_RESULT_COUNT, LANGUAGE_ALL};

// =============================================================================
// Enumerated parameters
// =============================================================================

/// Time window filter understood by SearXNG
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    Month,
    Year,
}

impl TimeRange {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Day => "day",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
        }
    }
}

impl FromStr for TimeRange {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(TimeRange::Day),
            "month" => Ok(TimeRange::Month),
            "year" => Ok(TimeRange::Year),
            _ => Err(()),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Safe search level: "0" off, "1" moderate, "2" strict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum SafeSearch {
    #[serde(rename = "0")]
    Off,
    #[serde(rename = "1")]
    Moderate,
    #[serde(rename = "2")]
    Strict,
}

impl SafeSearch {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SafeSearch::Off => "0",
            SafeSearch::Moderate => "1",
            SafeSearch::Strict => "2",
        }
    }
}

impl FromStr for SafeSearch {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(SafeSearch::Off),
            "1" => Ok(SafeSearch::Moderate),
            "2" => Ok(SafeSearch::Strict),
            _ => Err(()),
        }
    }
}

impl fmt::Display for SafeSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Search request
// =============================================================================

/// A web search request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchQuery {
    /// The search query. This string is passed to external search services.
    pub query: String,

    /// Search page number (starts at 1)
    #[serde(default = "default_pageno", deserialize_with = "lenient_pageno")]
    pub pageno: u32,

    /// Number of results to return per page (default 10)
    #[serde(default = "default_count", deserialize_with = "lenient_count")]
    pub count: u32,

    /// Time range of search (day, month, year)
    #[serde(default, deserialize_with = "lenient_enum")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,

    /// Language code for search results (e.g. "en", "fr"). Default "all".
    #[serde(default = "default_language", deserialize_with = "lenient_language")]
    pub language: String,

    /// Safe search filter level ("0": none, "1": moderate, "2": strict)
    #[serde(default, deserialize_with = "lenient_enum")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safesearch: Option<SafeSearch>,
}

impl SearchQuery {
    /// Create a query with every optional field defaulted
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            pageno: DEFAULT_PAGENO,
            count: DEFAULT_RESULT_COUNT,
            time_range: None,
            language: default_language(),
            safesearch: None,
        }
    }

    #[must_use]
    pub fn with_pageno(mut self, pageno: u32) -> Self {
        self.pageno = pageno.max(1);
        self
    }

    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count.max(1);
        self
    }

    #[must_use]
    pub fn with_time_range(mut self, time_range: TimeRange) -> Self {
        self.time_range = Some(time_range);
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    #[must_use]
    pub fn with_safesearch(mut self, safesearch: SafeSearch) -> Self {
        self.safesearch = Some(safesearch);
        self
    }

    /// Whether `language` should be forwarded to SearXNG
    ///
    /// The value is forwarded verbatim unless it is exactly `""` or `"all"`.
    #[must_use]
    pub fn language_filter(&self) -> Option<&str> {
        match self.language.as_str() {
            "" | LANGUAGE_ALL => None,
            language => Some(language),
        }
    }
}

fn default_pageno() -> u32 {
    DEFAULT_PAGENO
}

fn default_count() -> u32 {
    DEFAULT_RESULT_COUNT
}

fn default_language() -> String {
    LANGUAGE_ALL.to_string()
}

/// Positive integer from a JSON number or numeric string
fn positive_int(value: &Value) -> Option<u32> {
    let raw = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    u32::try_from(raw).ok().filter(|n| *n >= 1)
}

fn lenient_pageno<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(positive_int(&value).unwrap_or(DEFAULT_PAGENO))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(positive_int(&value).unwrap_or(DEFAULT_RESULT_COUNT))
}

fn lenient_language<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(default_language))
}

/// Exact-match string enum; anything else becomes `None`
fn lenient_enum<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(|s| s.parse().ok()))
}

// =============================================================================
// Search results
// =============================================================================

/// A single normalized search hit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Page title
    pub title: String,

    /// Description snippet from the search engine
    pub content: String,

    /// Page URL
    pub url: String,
}

impl SearchResult {
    /// Map one raw SearXNG hit, defaulting absent or non-string fields to ""
    #[must_use]
    pub fn from_raw(hit: &Value) -> Self {
        let field = |name: &str| {
            hit.get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            title: field("title"),
            content: field("content"),
            url: field("url"),
        }
    }

    /// Three-line digest block for this hit
    #[must_use]
    pub fn to_block(&self) -> String {
        format!(
            "Title: {}\nDescription: {}\nURL: {}",
            self.title, self.content, self.url
        )
    }
}
