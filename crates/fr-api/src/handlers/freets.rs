use actix_web::{web, HttpResponse};
use fr_core::{validation, AppError};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{authored_freet, ApiResult};
use crate::extract::Requester;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub author_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct Content {
    pub content: String,
}

/// Every freet, or one author's when `authorId` is given.
pub async fn list(data: web::Data<AppState>, query: web::Query<ListQuery>) -> ApiResult<HttpResponse> {
    let freets = match query.author_id {
        Some(author) => data.repos.freets.fetch_by_author(author).await?,
        None => data.repos.freets.list_all().await?,
    };
    Ok(HttpResponse::Ok().json(freets))
}

pub async fn create(
    data: web::Data<AppState>,
    requester: Requester,
    body: web::Json<Content>,
) -> ApiResult<HttpResponse> {
    let author = requester.require()?;
    validation::freet_content(&body.content)?;

    let freet = data.repos.freets.create(author, &body.content).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Your freet was created successfully.",
        "freet": freet,
    })))
}

pub async fn update(
    data: web::Data<AppState>,
    requester: Requester,
    path: web::Path<Uuid>,
    body: web::Json<Content>,
) -> ApiResult<HttpResponse> {
    let requester = requester.require()?;
    let freet_id = path.into_inner();
    authored_freet(&data, freet_id, requester).await?;
    validation::freet_content(&body.content)?;

    let freet = data
        .repos
        .freets
        .update_content(freet_id, &body.content)
        .await?
        .ok_or_else(|| AppError::not_found("Freet", freet_id))?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Your freet was updated successfully.",
        "freet": freet,
    })))
}

/// Removes the freet along with its tags, intent and suggestions.
pub async fn delete(
    data: web::Data<AppState>,
    requester: Requester,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let requester = requester.require()?;
    let freet_id = path.into_inner();
    authored_freet(&data, freet_id, requester).await?;

    data.repos.freets.delete(freet_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Your freet was deleted successfully." })))
}
