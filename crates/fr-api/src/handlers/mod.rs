//! # fr-api Handlers
//!
//! Each module coordinates the flow between HTTP requests and one group of
//! core ports.

pub mod filters;
pub mod freets;
pub mod intents;
pub mod suggestions;
pub mod tags;

use std::collections::{BTreeSet, HashSet};

use actix_web::web;
use fr_core::{newest_first, AppError, Freet};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub type ApiResult<T> = Result<T, ApiError>;

/// Loads the freets behind a set of ids, newest first.
async fn newest_freets(state: &web::Data<AppState>, ids: HashSet<Uuid>) -> ApiResult<Vec<Freet>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let ids: BTreeSet<Uuid> = ids.into_iter().collect();
    let mut freets = state.repos.freets.fetch_by_ids(&ids).await?;
    newest_first(&mut freets);
    Ok(freets)
}

async fn existing_freet(state: &web::Data<AppState>, freet_id: Uuid) -> ApiResult<Freet> {
    state
        .repos
        .freets
        .get(freet_id)
        .await?
        .ok_or_else(|| AppError::not_found("Freet", freet_id).into())
}

/// The freet, if `requester` wrote it.
async fn authored_freet(
    state: &web::Data<AppState>,
    freet_id: Uuid,
    requester: Uuid,
) -> ApiResult<Freet> {
    let freet = existing_freet(state, freet_id).await?;
    if freet.author_id != requester {
        return Err(AppError::Forbidden("Cannot modify other users' freets.".to_string()).into());
    }
    Ok(freet)
}
