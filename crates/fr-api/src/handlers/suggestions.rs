use actix_web::{web, HttpResponse};
use fr_core::{validation, AppError, SuggestionKind};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{existing_freet, newest_freets, ApiResult};
use crate::extract::Requester;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SuggestionQuery {
    pub suggestion: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Deserialize)]
pub struct KindQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSuggestion {
    pub suggestion: String,
    pub suggestion_type: String,
}

/// Freets that carry `suggestion` as a suggestion of kind `type`.
pub async fn view(data: web::Data<AppState>, query: web::Query<SuggestionQuery>) -> ApiResult<HttpResponse> {
    let kind = validation::suggestion_kind(&query.kind)?;
    let ids = data.repos.suggestions.post_ids_with(&query.suggestion, kind).await?;
    Ok(HttpResponse::Ok().json(newest_freets(&data, ids).await?))
}

/// Popularity counts for one freet, for the given kind or all of them.
pub async fn popular(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<KindQuery>,
) -> ApiResult<HttpResponse> {
    let freet_id = path.into_inner();
    existing_freet(&data, freet_id).await?;

    let kinds = match &query.kind {
        Some(raw) => vec![validation::suggestion_kind(raw)?],
        None => SuggestionKind::ALL.to_vec(),
    };
    let mut counts = Vec::new();
    for kind in kinds {
        counts.extend(data.repos.suggestions.popular_by_kind(kind, freet_id).await?);
    }
    Ok(HttpResponse::Ok().json(counts))
}

pub async fn mine(
    data: web::Data<AppState>,
    requester: Requester,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let requester = requester.require()?;
    let freet_id = path.into_inner();
    existing_freet(&data, freet_id).await?;

    let suggestions = data.repos.suggestions.find_by_suggestor(requester, freet_id).await?;
    Ok(HttpResponse::Ok().json(suggestions))
}

pub async fn add(
    data: web::Data<AppState>,
    requester: Requester,
    path: web::Path<Uuid>,
    body: web::Json<NewSuggestion>,
) -> ApiResult<HttpResponse> {
    let requester = requester.require()?;
    let freet_id = path.into_inner();
    existing_freet(&data, freet_id).await?;

    let kind = validation::suggestion_kind(&body.suggestion_type)?;
    validation::suggestion_value(kind, &body.suggestion)?;

    let duplicate = data
        .repos
        .suggestions
        .find_one(&body.suggestion, kind, requester, freet_id)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::ValidationError(
            "You have already made this suggestion on this freet.".to_string(),
        )
        .into());
    }

    let suggestion = data
        .repos
        .suggestions
        .add(freet_id, requester, kind, &body.suggestion)
        .await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Your suggestion was added successfully.",
        "suggestion": suggestion,
    })))
}

pub async fn delete(
    data: web::Data<AppState>,
    requester: Requester,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let requester = requester.require()?;
    let suggestion_id = path.into_inner();
    let suggestion = data
        .repos
        .suggestions
        .get(suggestion_id)
        .await?
        .ok_or_else(|| AppError::not_found("Suggestion", suggestion_id))?;

    if suggestion.suggestor_id != requester {
        return Err(AppError::Forbidden("Cannot delete other users' suggestions.".to_string()).into());
    }

    data.repos.suggestions.delete(suggestion_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Your suggestion was deleted successfully." })))
}
