//! Search parameters and pagination utilities

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::form_urlencoded;

/// Search parameters for the invoice list
///
/// This structure is extracted from the URL query string. A missing or
/// malformed `page` falls back to 1.
///
/// # Example
/// ```text
/// GET /dashboard/invoices?query=lee&page=2
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SearchParams {
    /// Free-text search term
    #[serde(default)]
    pub query: Option<String>,

    /// Page number (starts at 1)
    #[serde(default, deserialize_with = "lenient_page")]
    pub page: Option<usize>,
}

fn lenient_page<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse::<usize>().ok()))
}

impl SearchParams {
    pub fn new(query: Option<&str>, page: Option<usize>) -> Self {
        Self {
            query: query.map(str::to_string),
            page,
        }
    }

    /// Get page number, ensuring minimum of 1
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    /// Search term, empty when absent
    pub fn query(&self) -> &str {
        self.query.as_deref().unwrap_or("")
    }

    /// URL for a new search term
    ///
    /// A new search always restarts at page 1; an empty term drops `query`.
    pub fn search_href(pathname: &str, term: &str) -> String {
        let query = if term.is_empty() { None } else { Some(term) };
        build_href(pathname, 1, query)
    }

    /// URL for another page of the current search
    pub fn page_href(&self, pathname: &str, page: usize) -> String {
        let query = self.query.as_deref().filter(|q| !q.is_empty());
        build_href(pathname, page, query)
    }
}

fn build_href(pathname: &str, page: usize, query: Option<&str>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer.append_pair("page", &page.to_string());
    if let Some(query) = query {
        serializer.append_pair("query", query);
    }
    format!("{}?{}", pathname, serializer.finish())
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Total number of items (after filters)
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Create pagination metadata from calculation
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        // Ensure limit is at least 1 to avoid division by zero
        let limit = limit.max(1);
        let page = page.max(1);
        let total_pages = total.div_ceil(limit);
        let start = page_offset(page, limit);

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: start.saturating_add(limit) < total,
            has_prev: page > 1,
        }
    }
}

/// Index of the first item on `page`, saturating for pages past any real total
pub fn page_offset(page: usize, per_page: usize) -> usize {
    (page.max(1) - 1).saturating_mul(per_page)
}

/// One entry of the page selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageToken {
    Page(usize),
    Ellipsis,
}

impl Serialize for PageToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageToken::Page(n) => serializer.serialize_u64(*n as u64),
            PageToken::Ellipsis => serializer.serialize_str("..."),
        }
    }
}

/// Page selector entries for `current_page` out of `total_pages`
///
/// Up to seven pages are listed in full. Beyond that the first and last
/// pages stay visible and the gaps collapse into ellipses.
pub fn generate_pagination(current_page: usize, total_pages: usize) -> Vec<PageToken> {
    use PageToken::{Ellipsis, Page};

    if total_pages <= 7 {
        return (1..=total_pages).map(Page).collect();
    }

    if current_page <= 3 {
        return vec![
            Page(1),
            Page(2),
            Page(3),
            Ellipsis,
            Page(total_pages - 1),
            Page(total_pages),
        ];
    }

    if current_page >= total_pages - 2 {
        return vec![
            Page(1),
            Page(2),
            Ellipsis,
            Page(total_pages - 2),
            Page(total_pages - 1),
            Page(total_pages),
        ];
    }

    vec![
        Page(1),
        Ellipsis,
        Page(current_page - 1),
        Page(current_page),
        Page(current_page + 1),
        Ellipsis,
        Page(total_pages),
    ]
}

/// A rendered page selector entry
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageLink {
    pub label: PageToken,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    pub active: bool,
}

/// Page selector with links for the current search
pub fn page_links(pathname: &str, params: &SearchParams, total_pages: usize) -> Vec<PageLink> {
    let current = params.page();
    generate_pagination(current, total_pages)
        .into_iter()
        .map(|token| match token {
            PageToken::Page(n) => PageLink {
                label: token,
                href: Some(params.page_href(pathname, n)),
                active: n == current,
            },
            PageToken::Ellipsis => PageLink {
                label: token,
                href: None,
                active: false,
            },
        })
        .collect()
}
