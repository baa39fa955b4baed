use actix_web::{web, HttpResponse};
use fr_core::{validation, AppError, FilterCriteria};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::ApiResult;
use crate::extract::Requester;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewQuery {
    pub filter_id: Uuid,
}

#[derive(Deserialize)]
pub struct PrefixQuery {
    #[serde(default)]
    pub prefix: String,
}

#[derive(Deserialize)]
pub struct NewFilter {
    pub name: String,
    #[serde(default = "public_by_default")]
    pub public: bool,
    #[serde(default)]
    pub include: FilterCriteria,
}

fn public_by_default() -> bool {
    true
}

/// Runs a filter: `GET /api/filters/view?filterId=ID`.
pub async fn view(
    data: web::Data<AppState>,
    requester: Requester,
    query: web::Query<ViewQuery>,
) -> ApiResult<HttpResponse> {
    let freets = data.aggregator.apply_filter(query.filter_id, requester.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "freets": freets })))
}

/// Public filters plus the requester's private ones whose name starts with `prefix`.
pub async fn search(
    data: web::Data<AppState>,
    requester: Requester,
    query: web::Query<PrefixQuery>,
) -> ApiResult<HttpResponse> {
    let requester = requester.require()?;
    let filters = data.repos.filters.find_by_name_prefix(&query.prefix, requester).await?;
    Ok(HttpResponse::Ok().json(json!({ "filters": filters })))
}

pub async fn mine(data: web::Data<AppState>, requester: Requester) -> ApiResult<HttpResponse> {
    let requester = requester.require()?;
    let filters = data.repos.filters.find_by_owner(requester).await?;
    Ok(HttpResponse::Ok().json(json!({ "filters": filters })))
}

pub async fn create(
    data: web::Data<AppState>,
    requester: Requester,
    body: web::Json<NewFilter>,
) -> ApiResult<HttpResponse> {
    let requester = requester.require()?;
    let NewFilter { name, public, include } = body.into_inner();

    validation::filter_name(&name)?;
    validation::filter_criteria(&include)?;
    for author in &include.authors {
        let written = data.repos.freets.post_ids_by_author(*author).await?.len();
        validation::known_author(*author, requester, written)?;
    }

    let filter = data.repos.filters.create(name.trim(), requester, public, include).await?;
    log::info!("filter {} created by {requester}", filter.id);
    Ok(HttpResponse::Created().json(json!({
        "message": "Your filter was created successfully.",
        "filter": filter,
    })))
}

pub async fn delete(
    data: web::Data<AppState>,
    requester: Requester,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let filter_id = path.into_inner();
    let filter = data
        .repos
        .filters
        .get(filter_id)
        .await?
        .ok_or_else(|| AppError::not_found("Filter", filter_id))?;

    if !data.policy.can_modify(&filter, requester.0) {
        return Err(AppError::Forbidden("Cannot delete other users' filters.".to_string()).into());
    }

    data.repos.filters.delete(filter_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Your filter was deleted successfully." })))
}
