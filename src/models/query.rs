//! List query model and its backend encoding.

use std::fmt;

use url::form_urlencoded;

use crate::utils::params::SearchParams;

/// Tag value meaning "no tag filter".
pub const ALL_TAGS: &str = "all";

/// Default sort field.
pub const DEFAULT_ORDER_BY: &str = "createdAt";

/// Names of the URL parameters that carry search state.
pub mod param {
    pub const SEARCH: &str = "search";
    pub const PAGE: &str = "page";
    pub const SORT: &str = "sort";
    pub const ORDER_BY: &str = "order_by";
    pub const TAGS: &str = "tags";
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    /// Unknown values fall back to descending.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "asc" => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-tag filter or the "all" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum TagFilter {
    #[default]
    All,
    Tag(String),
}

impl TagFilter {
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s == ALL_TAGS {
            TagFilter::All
        } else {
            TagFilter::Tag(s.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TagFilter::All => ALL_TAGS,
            TagFilter::Tag(tag) => tag,
        }
    }
}

/// The semantic list query sent to `GET /<resource>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationQuery {
    /// Free-text filter matched against title and description
    pub filter: String,
    /// 1-based page number
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub order: SortOrder,
    pub order_by: String,
    pub tags: Option<TagFilter>,
}

/// The part of a query that identifies one accumulated feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterKey {
    pub filter: String,
    pub tags: TagFilter,
    pub order_by: String,
    pub order: SortOrder,
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            filter: String::new(),
            page: None,
            per_page: None,
            order: SortOrder::Desc,
            order_by: DEFAULT_ORDER_BY.to_string(),
            tags: None,
        }
    }
}

impl PaginationQuery {
    /// Derive the query from URL search state.
    pub fn from_params(params: &SearchParams, page: u32, per_page: u32) -> Self {
        Self {
            filter: params.get(param::SEARCH).unwrap_or_default().to_string(),
            page: Some(page),
            per_page: Some(per_page),
            order: params
                .get(param::SORT)
                .map(SortOrder::parse)
                .unwrap_or_default(),
            order_by: params
                .get(param::ORDER_BY)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(DEFAULT_ORDER_BY)
                .to_string(),
            tags: Some(
                params
                    .get(param::TAGS)
                    .map(TagFilter::parse)
                    .unwrap_or_default(),
            ),
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Whether the free-text filter has content.
    pub fn has_search_text(&self) -> bool {
        !self.filter.trim().is_empty()
    }

    pub fn filter_key(&self) -> FilterKey {
        FilterKey {
            filter: self.filter.clone(),
            tags: self.tags.clone().unwrap_or_default(),
            order_by: self.order_by.clone(),
            order: self.order,
        }
    }

    /// Comma-joined filter clauses in the backend grammar.
    pub fn filter_clauses(&self) -> String {
        let mut clauses = Vec::new();
        if !self.filter.is_empty() {
            clauses.push(format!(
                "title:ilike:{0},description:ilike:{0}",
                self.filter
            ));
        }
        if let Some(TagFilter::Tag(tag)) = &self.tags {
            clauses.push(format!("tags:in:{tag}"));
        }
        clauses.join(",")
    }

    /// Encode as the literal query string the backend expects.
    ///
    /// `:` and `,` stay literal because they are part of the filter and
    /// order grammar; everything else is form-encoded.
    pub fn encode(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();

        if !self.filter.is_empty() || self.tags.is_some() {
            pairs.push(("filter", self.filter_clauses()));
        }
        if let Some(page) = self.page.filter(|p| *p > 0) {
            pairs.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page.filter(|p| *p > 0) {
            pairs.push(("per_page", per_page.to_string()));
        }
        if !self.order_by.is_empty() {
            pairs.push(("order", format!("{}:{}", self.order_by, self.order)));
        }

        pairs
            .iter()
            .map(|(k, v)| format!("{k}={}", encode_component(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace("%3A", ":")
        .replace("%2C", ",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_filter_tag_and_order() {
        let query = PaginationQuery {
            filter: "robot".to_string(),
            tags: Some(TagFilter::parse("ai")),
            order: SortOrder::Desc,
            order_by: "createdAt".to_string(),
            ..PaginationQuery::default()
        };

        assert_eq!(
            query.encode(),
            "filter=title:ilike:robot,description:ilike:robot,tags:in:ai&order=createdAt:desc"
        );
    }

    #[test]
    fn test_encode_all_tags_has_no_tag_clause() {
        let query = PaginationQuery {
            filter: "robot".to_string(),
            tags: Some(TagFilter::All),
            page: Some(2),
            per_page: Some(8),
            ..PaginationQuery::default()
        };

        assert_eq!(
            query.encode(),
            "filter=title:ilike:robot,description:ilike:robot&page=2&per_page=8&order=createdAt:desc"
        );
    }

    #[test]
    fn test_encode_without_filter_or_tags() {
        let query = PaginationQuery {
            order: SortOrder::Asc,
            order_by: "title".to_string(),
            ..PaginationQuery::default()
        };
        assert_eq!(query.encode(), "order=title:asc");
    }

    #[test]
    fn test_encode_escapes_reserved_characters() {
        let query = PaginationQuery {
            filter: "red & blue".to_string(),
            ..PaginationQuery::default()
        };
        assert_eq!(
            query.encode(),
            "filter=title:ilike:red+%26+blue,description:ilike:red+%26+blue&order=createdAt:desc"
        );
    }

    #[test]
    fn test_from_params_defaults() {
        let query = PaginationQuery::from_params(&SearchParams::new(), 1, 8);
        assert_eq!(query.filter, "");
        assert_eq!(query.order, SortOrder::Desc);
        assert_eq!(query.order_by, "createdAt");
        assert_eq!(query.tags, Some(TagFilter::All));
        assert_eq!(query.page, Some(1));
        assert_eq!(query.per_page, Some(8));
        assert!(!query.has_search_text());
    }

    #[test]
    fn test_from_params_reads_search_state() {
        let params = SearchParams::parse("search=robot&sort=asc&order_by=title&tags=ai");
        let query = PaginationQuery::from_params(&params, 3, 8);
        assert_eq!(query.filter, "robot");
        assert_eq!(query.order, SortOrder::Asc);
        assert_eq!(query.order_by, "title");
        assert_eq!(query.tags, Some(TagFilter::Tag("ai".to_string())));
    }

    #[test]
    fn test_filter_key_ignores_page() {
        let params = SearchParams::parse("search=robot");
        let first = PaginationQuery::from_params(&params, 1, 8);
        let second = first.clone().with_page(4);
        assert_eq!(first.filter_key(), second.filter_key());
    }
}
