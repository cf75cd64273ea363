use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DEFAULT_COUNTRY: &str = "us";
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Query parameters exactly as they arrive on the wire. Any of them may be
/// missing or empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNewsQuery {
    pub country: Option<String>,
    pub category: Option<String>,
    pub q: Option<String>,
    pub language: Option<String>,
    pub sources: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// The normalized request. Stored alongside every cached article as its
/// provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalFilter {
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
}

impl Default for CanonicalFilter {
    fn default() -> Self {
        Self {
            country: DEFAULT_COUNTRY.to_string(),
            category: None,
            query: None,
            language: None,
            sources: None,
            date_from: None,
            date_to: None,
        }
    }
}

impl CanonicalFilter {
    pub fn normalize(raw: &RawNewsQuery) -> Result<Self> {
        Ok(Self {
            country: code(raw.country.as_deref()).unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            category: code(raw.category.as_deref()),
            query: text(raw.q.as_deref()).map(str::to_string),
            language: code(raw.language.as_deref()),
            sources: sources(raw.sources.as_deref()),
            date_from: date("from", raw.from.as_deref())?,
            date_to: date("to", raw.to.as_deref())?,
        })
    }

    pub fn has_default_country(&self) -> bool {
        self.country == DEFAULT_COUNTRY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn normalize(raw: &RawNewsQuery) -> Result<Self> {
        let page = number("page", raw.page.as_deref())?.unwrap_or(1).max(1);
        let page_size = number("limit", raw.limit.as_deref())?
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        Ok(Self { page, page_size })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Provider pages that together reach the end of this page, starting
    /// from the first result. Fits in one request up to `MAX_PAGE_SIZE`
    /// results, then walks full-size pages.
    pub fn covering_pages(&self) -> Vec<Pagination> {
        let end = self.offset() + u64::from(self.page_size);
        let max = u64::from(MAX_PAGE_SIZE);
        if end <= max {
            return vec![Pagination {
                page: 1,
                page_size: end as u32,
            }];
        }
        let pages = (end + max - 1) / max;
        (1..=pages)
            .map(|page| Pagination {
                page: page as u32,
                page_size: MAX_PAGE_SIZE,
            })
            .collect()
    }
}

fn text(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn code(value: Option<&str>) -> Option<String> {
    text(value).map(str::to_lowercase)
}

fn sources(value: Option<&str>) -> Option<String> {
    let joined = text(value)?
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(",");
    (!joined.is_empty()).then_some(joined)
}

fn date(name: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    text(value)
        .map(|v| {
            NaiveDate::parse_from_str(v, DATE_FORMAT).map_err(|_| {
                Error::Validation(format!("'{}' is not a valid date for '{}' (expected YYYY-MM-DD)", v, name))
            })
        })
        .transpose()
}

fn number(name: &str, value: Option<&str>) -> Result<Option<u32>> {
    text(value)
        .map(|v| {
            v.parse::<u32>()
                .map_err(|_| Error::Validation(format!("'{}' is not a valid number for '{}'", v, name)))
        })
        .transpose()
}
