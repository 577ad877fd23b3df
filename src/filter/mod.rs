//! List filter state
//!
//! `FilterState` describes which subset of records a list view is showing:
//! search text, facet constraints, sort order and the current page.
//! It is a value type; every `with_*` builder returns a new instance so a
//! selection can hold a snapshot of it without aliasing the live filter.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;
use ts_rs::TS;

/// 输出目录常量
pub const TS_EXPORT_PATH: &str = "../admin-panel/src/services/panel.generated.ts";

/// Facet value meaning "no constraint"
pub const FACET_ALL: &str = "all";

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_SORT_KEY: &str = "createdAt";

/// Query parameters owned by the list endpoint; no facet may use these names
pub const RESERVED_PARAMS: [&str; 5] = ["search", "sort", "order", "page", "pageSize"];

pub fn is_reserved_param(name: &str) -> bool {
    RESERVED_PARAMS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name.trim()))
}

/// 排序方向
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(format!("Invalid sort direction: '{}'. Valid: asc, desc", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export_to = TS_EXPORT_PATH)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            key: DEFAULT_SORT_KEY.to_string(),
            direction: SortDirection::default(),
        }
    }
}

/// The predicate part of a filter, without pagination.
///
/// This is what gets forwarded to the backend for "all matching" bulk
/// targets, since the predicate spans every page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub search: String,
    #[serde(default)]
    pub facets: BTreeMap<String, String>,
    pub sort: SortSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    search: String,
    facets: BTreeMap<String, String>,
    sort: SortSpec,
    page: u32,
    page_size: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl FilterState {
    pub fn new(page_size: u32) -> Self {
        Self {
            search: String::new(),
            facets: BTreeMap::new(),
            sort: SortSpec::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn facets(&self) -> &BTreeMap<String, String> {
        &self.facets
    }

    /// Active value of a facet, `None` when unconstrained
    pub fn facet(&self, name: &str) -> Option<&str> {
        self.facets.get(name).map(String::as_str)
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Constrain a facet. `"all"` or an empty value removes the constraint,
    /// so an absent key and an explicit "all" compare equal.
    /// A facet named like a reserved query parameter is ignored.
    pub fn with_facet(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        if is_reserved_param(&name) {
            warn!("Ignoring facet '{}': the name is a reserved query parameter", name);
            return self.clone();
        }
        let mut next = self.clone();
        if is_unconstrained(&value) {
            next.facets.remove(&name);
        } else {
            next.facets.insert(name, value);
        }
        next.page = 1;
        next
    }

    pub fn with_search(&self, text: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.search = text.into();
        next.page = 1;
        next
    }

    pub fn with_sort(&self, key: impl Into<String>, direction: SortDirection) -> Self {
        let mut next = self.clone();
        next.sort = SortSpec {
            key: key.into(),
            direction,
        };
        next.page = 1;
        next
    }

    pub fn with_page(&self, page: u32) -> Self {
        let mut next = self.clone();
        next.page = page.max(1);
        next
    }

    pub fn with_page_size(&self, page_size: u32) -> Self {
        let mut next = self.clone();
        next.page_size = page_size.max(1);
        next.page = 1;
        next
    }

    /// Equality that ignores pagination.
    ///
    /// Two filters that differ only in page/page size select the same
    /// records, so an "all matching" selection stays valid across them.
    pub fn equals_for_selection(&self, other: &FilterState) -> bool {
        self.search == other.search && self.facets == other.facets && self.sort == other.sort
    }

    pub fn to_query(&self) -> FilterQuery {
        FilterQuery {
            search: self.search.clone(),
            facets: self.facets.clone(),
            sort: self.sort.clone(),
        }
    }

    /// Query-string pairs for the paged list endpoint
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(5 + self.facets.len());
        if !self.search.is_empty() {
            pairs.push(("search".to_string(), self.search.clone()));
        }
        pairs.push(("sort".to_string(), self.sort.key.clone()));
        pairs.push(("order".to_string(), self.sort.direction.to_string()));
        pairs.push(("page".to_string(), self.page.to_string()));
        pairs.push(("pageSize".to_string(), self.page_size.to_string()));
        for (name, value) in &self.facets {
            pairs.push((name.clone(), value.clone()));
        }
        pairs
    }
}

fn is_unconstrained(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case(FACET_ALL)
}
