//! Page-by-page collection of list endpoints.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ReportError, Result};

/// Most items a single listing may return before pagination gives up on a
/// server that never sends an empty page.
pub const MAX_ITEMS: u32 = 100_000;

/// Number of requests allowed for `per_page`: enough pages for [`MAX_ITEMS`]
/// plus the terminating empty one.
pub fn page_limit(per_page: u32) -> u32 {
    MAX_ITEMS.div_ceil(per_page.max(1)) + 1
}

/// One page request against a list endpoint.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    /// Path below the API root, e.g. `/orgs/acme/repos`.
    pub endpoint: &'a str,
    /// Extra query parameters sent with every page.
    pub params: &'a [(&'a str, String)],
    /// 1-based page number.
    pub page: u32,
    /// Items requested per page.
    pub per_page: u32,
}

/// Something that can fetch a single page of a JSON array endpoint.
pub trait PageFetch {
    /// Fetch one page and decode it as a list of `T`.
    ///
    /// Non-success statuses, transport failures and undecodable bodies are
    /// all returned as errors.
    fn fetch_page<T: DeserializeOwned>(&self, request: &PageRequest<'_>) -> Result<Vec<T>>;
}

/// Everything a pagination run gathered.
#[derive(Debug)]
pub struct Paged<T> {
    /// Items in server order across all pages.
    pub items: Vec<T>,
    /// Number of page requests issued, including the terminating one.
    pub requests: u32,
    /// The error that stopped pagination early, if any.
    pub error: Option<ReportError>,
}

impl<T> Paged<T> {
    /// Whether pagination ran until an empty page. False after an error or
    /// when the page limit was hit.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Walk `endpoint` page by page until an empty page is returned.
///
/// A failed request does not raise: it is logged, pagination stops, and the
/// items collected so far are returned with the error attached. Hitting
/// [`page_limit`] is recorded the same way.
pub fn paginate<T, C>(
    client: &C,
    endpoint: &str,
    params: &[(&str, String)],
    per_page: u32,
) -> Paged<T>
where
    T: DeserializeOwned,
    C: PageFetch,
{
    let mut paged = Paged {
        items: Vec::new(),
        requests: 0,
        error: None,
    };

    let limit = page_limit(per_page);
    for page in 1..=limit {
        let request = PageRequest {
            endpoint,
            params,
            page,
            per_page,
        };
        paged.requests += 1;

        match client.fetch_page::<T>(&request) {
            Ok(batch) if batch.is_empty() => {
                debug!(endpoint, page, total = paged.items.len(), "pagination complete");
                return paged;
            }
            Ok(batch) => {
                debug!(endpoint, page, count = batch.len(), "fetched page");
                paged.items.extend(batch);
            }
            Err(e) => {
                warn!(
                    endpoint,
                    page,
                    kept = paged.items.len(),
                    error = %e,
                    "pagination halted, keeping partial results"
                );
                paged.error = Some(e);
                return paged;
            }
        }
    }

    warn!(
        endpoint,
        pages = limit,
        kept = paged.items.len(),
        "page limit reached before an empty page"
    );
    paged.error = Some(ReportError::GitHub {
        message: format!("page limit of {} reached before an empty page", limit),
    });
    paged
}
