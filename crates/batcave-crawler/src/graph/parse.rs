//! Decoding of Graph search response bodies into [`Page`]s.

use serde::Deserialize;

use crate::cursor::Cursor;
use crate::error::FetchError;
use crate::types::{Page, RawRecord};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Post>,
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Post {
    message: Option<String>,
    id: Option<String>,
    created_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    next: Option<String>,
}

/// Parses one search response body.
///
/// Posts without a message are dropped. Post ids arrive as
/// `{object}_{post}`; only the post half is kept. Missing ids or times are
/// passed through as empty strings for the normalizer to reject.
///
/// # Errors
///
/// Returns [`FetchError::Deserialize`] if the body is not a search response.
pub(crate) fn parse_search_page(body: &str, context: &str) -> Result<Page, FetchError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Deserialize {
            context: context.to_string(),
            source: e,
        })?;

    let records = response
        .data
        .into_iter()
        .filter_map(|post| {
            let text = post.message?;
            let id = post.id.as_deref().map(post_id).unwrap_or_default();
            Some(RawRecord::new(
                text,
                id,
                post.created_time.unwrap_or_default(),
            ))
        })
        .collect();

    let next_cursor = response
        .paging
        .and_then(|p| p.next)
        .filter(|next| !next.is_empty())
        .map(Cursor::new);

    Ok(Page {
        records,
        next_cursor,
    })
}

fn post_id(raw: &str) -> String {
    match raw.split_once('_') {
        Some((_, post)) => post.to_string(),
        None => raw.to_string(),
    }
}
