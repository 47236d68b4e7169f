use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use gathr_core::store::{EventStore, SearchFilters};
use gathr_sdk::objects::Pagination;
use gathr_sdk::objects::events::{SearchQuery, SearchResponse};

use crate::api::extractors::MaybeAuthUser;
use crate::api::{ApiError, now_ms};
use crate::state::AppState;

/// `GET /search` — search events.
///
/// Anonymous callers can use free text, categories and the OPEN/ARCHIVE
/// status filters; MY_EVENTS and ATTENDING need a session token.
pub(super) async fn search_events(
    state: State<AppState>,
    MaybeAuthUser(actor_id): MaybeAuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = query
        .categories
        .as_deref()
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|category| !category.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    let page = EventStore::new(state.db.clone())
        .search(
            SearchFilters {
                query: query.q,
                categories,
                status: query.status,
                limit: query.limit,
                offset: query.offset,
            },
            actor_id,
            now_ms(),
        )
        .await?;

    let events: Vec<_> = page.events.into_iter().map(Into::into).collect();
    let total = events.len() as i64;
    Ok(Json(SearchResponse {
        events,
        pagination: Pagination {
            limit: page.limit,
            offset: page.offset,
            total,
        },
    }))
}
