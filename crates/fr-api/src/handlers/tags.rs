use actix_web::{web, HttpResponse};
use fr_core::{validation, AppError};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{authored_freet, newest_freets, ApiResult};
use crate::extract::Requester;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PrefixQuery {
    #[serde(default)]
    pub prefix: String,
}

#[derive(Deserialize)]
pub struct TagQuery {
    pub tag: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTags {
    pub tag_labels: Vec<String>,
}

/// Labels starting with `prefix`, most used first.
pub async fn popular(data: web::Data<AppState>, query: web::Query<PrefixQuery>) -> ApiResult<HttpResponse> {
    let labels = data.repos.tags.labels_by_prefix(&query.prefix).await?;
    Ok(HttpResponse::Ok().json(labels))
}

pub async fn view(data: web::Data<AppState>, query: web::Query<TagQuery>) -> ApiResult<HttpResponse> {
    validation::tag_label(&query.tag)?;
    let ids = data.repos.tags.post_ids_by_label(&query.tag).await?;
    Ok(HttpResponse::Ok().json(newest_freets(&data, ids).await?))
}

pub async fn add(
    data: web::Data<AppState>,
    requester: Requester,
    path: web::Path<Uuid>,
    body: web::Json<NewTags>,
) -> ApiResult<HttpResponse> {
    let requester = requester.require()?;
    let freet_id = path.into_inner();
    authored_freet(&data, freet_id, requester).await?;

    let mut labels: Vec<String> = Vec::with_capacity(body.tag_labels.len());
    for label in &body.tag_labels {
        validation::tag_label(label)?;
        if labels.contains(label) {
            continue;
        }
        if data.repos.tags.find_one(label, freet_id).await?.is_some() {
            return Err(AppError::ValidationError(format!("Tag {label} already exists on this freet.")).into());
        }
        labels.push(label.clone());
    }

    let tags = data.repos.tags.add_all(freet_id, &labels).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Your tags were added successfully.",
        "tags": tags,
    })))
}

/// Clears every tag on the freet.
pub async fn delete(
    data: web::Data<AppState>,
    requester: Requester,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let requester = requester.require()?;
    let freet_id = path.into_inner();
    authored_freet(&data, freet_id, requester).await?;

    let removed = data.repos.tags.delete_for_freet(freet_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Your tags were deleted successfully.",
        "removed": removed,
    })))
}
