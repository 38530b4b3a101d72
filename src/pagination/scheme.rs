//! Pagination schemes and page-number substitution.
//!
//! Every scheme renders a page URL from a [`UrlTemplate`] through
//! [`PaginationScheme::render`], for both freshly discovered and cached
//! templates.

use super::url::{SEARCH_PAGE_PARAM, replace_param, set_param};
use crate::error::ResolutionError;
use std::fmt;
use url::Url;

/// Where the page number sits inside a numeric path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentForm {
    /// `.../rolex-2.htm`, page 1 is `.../rolex.htm`.
    Generic,
    /// `.../index-2.htm`, page 1 is `.../index.htm`.
    Index,
}

/// How page numbers map into URLs for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationScheme {
    /// Search endpoint addressed with `showpage=N`.
    SearchShowPage,
    /// Category URL with a page-index query parameter, spelled as discovered.
    QueryParamShowPage { param: String },
    /// Page number embedded in the last path segment.
    NumericSegment(SegmentForm),
    /// Pages reachable only by following `rel="next"` links.
    NextLinkOnly,
}

/// A concrete URL anchored at a known page number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    /// The URL of `anchor_page`.
    pub url: String,
    /// Page number the URL addresses.
    pub anchor_page: u32,
}

impl UrlTemplate {
    pub fn new(url: impl Into<String>, anchor_page: u32) -> Self {
        Self {
            url: url.into(),
            anchor_page,
        }
    }
}

/// Outcome of rendering a template for a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// The page URL.
    Url(String),
    /// The caller's own first-page URL.
    FirstPage,
    /// Follow `hops` next relations starting at the document behind `from`.
    Walk { from: String, hops: u32 },
}

impl PaginationScheme {
    /// Short identifier used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            PaginationScheme::SearchShowPage => "search-showpage",
            PaginationScheme::QueryParamShowPage { .. } => "query-param",
            PaginationScheme::NumericSegment(SegmentForm::Generic) => "numeric-segment",
            PaginationScheme::NumericSegment(SegmentForm::Index) => "index-segment",
            PaginationScheme::NextLinkOnly => "next-link",
        }
    }

    /// Derives the URL for `page` from `template`.
    pub fn render(&self, template: &UrlTemplate, page: u32) -> Result<Rendered, ResolutionError> {
        match self {
            PaginationScheme::SearchShowPage => {
                if page == 1 {
                    Ok(Rendered::Url(template.url.clone()))
                } else {
                    Ok(Rendered::Url(set_param(&template.url, SEARCH_PAGE_PARAM, page)))
                }
            }
            PaginationScheme::QueryParamShowPage { param } => replace_param(&template.url, param, page)
                .map(Rendered::Url)
                .ok_or_else(|| malformed(template, &format!("no '{}' parameter", param))),
            PaginationScheme::NumericSegment(form) => {
                render_segment(template, *form, page).map(Rendered::Url)
            }
            PaginationScheme::NextLinkOnly => {
                if page == 1 {
                    Ok(Rendered::FirstPage)
                } else if page == template.anchor_page {
                    Ok(Rendered::Url(template.url.clone()))
                } else if page > template.anchor_page {
                    Ok(Rendered::Walk {
                        from: template.url.clone(),
                        hops: page - template.anchor_page,
                    })
                } else {
                    Err(malformed(
                        template,
                        &format!("page {} precedes the anchor page", page),
                    ))
                }
            }
        }
    }
}

impl fmt::Display for PaginationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn render_segment(
    template: &UrlTemplate,
    form: SegmentForm,
    page: u32,
) -> Result<String, ResolutionError> {
    let mut url = Url::parse(&template.url).map_err(|e| malformed(template, &e.to_string()))?;
    let path = url.path().to_string();

    let new_path = match form {
        SegmentForm::Generic => {
            let marker = format!("-{}.htm", template.anchor_page);
            let stem = path
                .strip_suffix(&marker)
                .ok_or_else(|| malformed(template, &format!("path does not end with '{}'", marker)))?;
            if page == 1 {
                format!("{}.htm", stem)
            } else {
                format!("{}-{}.htm", stem, page)
            }
        }
        SegmentForm::Index => {
            let marker = format!("index-{}.htm", template.anchor_page);
            let at = path
                .rfind(&marker)
                .ok_or_else(|| malformed(template, &format!("path has no '{}'", marker)))?;
            let segment = if page == 1 {
                "index.htm".to_string()
            } else {
                format!("index-{}.htm", page)
            };
            format!("{}{}{}", &path[..at], segment, &path[at + marker.len()..])
        }
    };

    url.set_path(&new_path);
    Ok(url.to_string())
}

fn malformed(template: &UrlTemplate, reason: &str) -> ResolutionError {
    ResolutionError::MalformedTemplate {
        template: template.url.clone(),
        reason: reason.to_string(),
    }
}
