use actix_web::{web, HttpResponse};
use fr_core::{validation, AppError};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{authored_freet, existing_freet, newest_freets, ApiResult};
use crate::extract::Requester;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct IntentQuery {
    pub intent: String,
}

#[derive(Deserialize)]
pub struct NewIntent {
    pub intent: String,
    #[serde(default)]
    pub supplement: Option<String>,
}

pub async fn view(data: web::Data<AppState>, query: web::Query<IntentQuery>) -> ApiResult<HttpResponse> {
    let kind = validation::intent_kind(&query.intent)?;
    let ids = data.repos.intents.post_ids_by_kind(kind).await?;
    Ok(HttpResponse::Ok().json(newest_freets(&data, ids).await?))
}

pub async fn get(data: web::Data<AppState>, path: web::Path<Uuid>) -> ApiResult<HttpResponse> {
    let freet_id = path.into_inner();
    existing_freet(&data, freet_id).await?;
    let intent = data
        .repos
        .intents
        .get(freet_id)
        .await?
        .ok_or_else(|| AppError::not_found("Intent for freet", freet_id))?;
    Ok(HttpResponse::Ok().json(intent))
}

pub async fn add(
    data: web::Data<AppState>,
    requester: Requester,
    path: web::Path<Uuid>,
    body: web::Json<NewIntent>,
) -> ApiResult<HttpResponse> {
    let requester = requester.require()?;
    let freet_id = path.into_inner();
    authored_freet(&data, freet_id, requester).await?;

    let kind = validation::intent_kind(&body.intent)?;
    let supplement = body.supplement.as_deref().filter(|s| !s.is_empty());
    validation::intent_supplement(kind, supplement)?;

    if data.repos.intents.get(freet_id).await?.is_some() {
        return Err(AppError::Conflict("This freet already has an intent.".to_string()).into());
    }

    let intent = data
        .repos
        .intents
        .add(freet_id, kind, supplement.map(str::to_string))
        .await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Your intent was added successfully.",
        "intent": intent,
    })))
}

pub async fn delete(
    data: web::Data<AppState>,
    requester: Requester,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let requester = requester.require()?;
    let freet_id = path.into_inner();
    authored_freet(&data, freet_id, requester).await?;

    if !data.repos.intents.delete(freet_id).await? {
        return Err(AppError::not_found("Intent for freet", freet_id).into());
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Your intent was deleted successfully." })))
}
