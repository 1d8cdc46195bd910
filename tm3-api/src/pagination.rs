//! Offset-based pagination.
//!
//! One iterative state machine drives every multi-page fetch: a cursor, an
//! accumulator, and a policy that knows where records live in the response
//! envelope and when the last page has been seen. Entity listings and bulk
//! queries share the machine with different page sizes and termination
//! rules.

use std::future::Future;

use serde_json::Value;

use crate::error::ApiError;

/// Page size for entity listings.
pub const LIST_LIMIT: u64 = 100;

/// Page size for bulk queries.
pub const QUERY_LIMIT: u64 = 1000;

/// Offset/limit pair sent with every request after the first.
///
/// The first request carries no cursor at all; once present, the offset
/// only ever grows, by exactly one page size per iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageCursor {
    pub offset: u64,
    pub limit: u64,
}

impl PageCursor {
    /// Cursor for the second page.
    fn first(limit: u64) -> Self {
        Self { offset: limit, limit }
    }

    /// Advance by exactly one page.
    fn advance(&mut self) {
        self.offset += self.limit;
    }
}

/// Where a page's records live and when pagination stops.
pub(crate) trait PagePolicy {
    fn page_size(&self) -> u64;

    /// The record list inside one response envelope, if any.
    fn records<'a>(&self, body: &'a Value) -> Option<&'a Vec<Value>>;

    /// True when `body` is the final page. `fetched` counts records
    /// accumulated so far, including this page.
    fn is_last(&self, body: &Value, page_len: usize, fetched: usize) -> bool;
}

/// Entity listings: records under `data`, pages of 100, a short page ends
/// the walk.
///
/// A total count that is an exact multiple of the page size costs one extra
/// request observing an empty page. Callers rely on that closing
/// round-trip, so it stays.
pub(crate) struct ListPolicy;

impl PagePolicy for ListPolicy {
    fn page_size(&self) -> u64 {
        LIST_LIMIT
    }

    fn records<'a>(&self, body: &'a Value) -> Option<&'a Vec<Value>> {
        body.get("data").and_then(Value::as_array)
    }

    fn is_last(&self, _body: &Value, page_len: usize, _fetched: usize) -> bool {
        (page_len as u64) < LIST_LIMIT
    }
}

/// Bulk queries: records under `results`, pages of 1000, and the envelope
/// predicts the total under `nbrofresults`. The walk stops on a short page
/// or as soon as the prediction is met, whichever comes first.
pub(crate) struct QueryPolicy;

impl PagePolicy for QueryPolicy {
    fn page_size(&self) -> u64 {
        QUERY_LIMIT
    }

    fn records<'a>(&self, body: &'a Value) -> Option<&'a Vec<Value>> {
        body.get("results").and_then(Value::as_array)
    }

    fn is_last(&self, body: &Value, page_len: usize, fetched: usize) -> bool {
        if (page_len as u64) < QUERY_LIMIT {
            return true;
        }
        match body.get("nbrofresults").and_then(Value::as_u64) {
            Some(total) => fetched as u64 >= total,
            None => false,
        }
    }
}

/// Walk an offset-paginated endpoint to completion.
///
/// `fetch_page` issues one request with the given cursor (`None` on the
/// first call). Pages are requested strictly sequentially; page N+1 is
/// never requested before page N resolved. Records are appended in arrival
/// order, and an envelope without a record list ends the walk with whatever
/// accumulated so far.
pub(crate) async fn paginate<P, F, Fut>(policy: P, mut fetch_page: F) -> Result<Vec<Value>, ApiError>
where
    P: PagePolicy,
    F: FnMut(Option<PageCursor>) -> Fut,
    Fut: Future<Output = Result<Value, ApiError>>,
{
    let mut accumulated: Vec<Value> = Vec::new();
    let mut cursor: Option<PageCursor> = None;

    loop {
        let body = fetch_page(cursor).await?;

        let Some(records) = policy.records(&body) else {
            return Ok(accumulated);
        };

        let page_len = records.len();
        accumulated.extend(records.iter().cloned());

        if policy.is_last(&body, page_len, accumulated.len()) {
            return Ok(accumulated);
        }

        cursor = Some(match cursor {
            None => PageCursor::first(policy.page_size()),
            Some(mut current) => {
                current.advance();
                current
            }
        });
    }
}
