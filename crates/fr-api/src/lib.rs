//! # fr-api
//!
//! The JSON routing and orchestration layer for Fritter.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod state;

use actix_web::web;
use fr_core::AppError;

pub use error::ApiError;
pub use extract::{Requester, USER_ID_HEADER};
pub use state::AppState;

use handlers::{filters, freets, intents, suggestions, tags};

/// Configures every route under `/api`.
///
/// Literal segments (`view`, `mine`) are registered before the `{id}`
/// routes sharing their prefix.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| {
        ApiError(AppError::ValidationError(err.to_string())).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _| {
        ApiError(AppError::ValidationError(err.to_string())).into()
    }))
    .service(
        web::scope("/api")
            // Filters
            .route("/filters/view", web::get().to(filters::view))
            .route("/filters/mine", web::get().to(filters::mine))
            .service(
                web::resource("/filters")
                    .route(web::get().to(filters::search))
                    .route(web::post().to(filters::create)),
            )
            .route("/filters/{filter_id}", web::delete().to(filters::delete))
            // Freets
            .service(
                web::resource("/freets")
                    .route(web::get().to(freets::list))
                    .route(web::post().to(freets::create)),
            )
            .service(
                web::resource("/freets/{freet_id}")
                    .route(web::patch().to(freets::update))
                    .route(web::delete().to(freets::delete)),
            )
            // Tags
            .route("/tags", web::get().to(tags::popular))
            .route("/tags/view", web::get().to(tags::view))
            .service(
                web::resource("/tags/{freet_id}")
                    .route(web::post().to(tags::add))
                    .route(web::delete().to(tags::delete)),
            )
            // Intents
            .route("/intent/view", web::get().to(intents::view))
            .service(
                web::resource("/intent/{freet_id}")
                    .route(web::get().to(intents::get))
                    .route(web::post().to(intents::add))
                    .route(web::delete().to(intents::delete)),
            )
            // Suggestions
            .route("/suggestions/view", web::get().to(suggestions::view))
            .route("/suggestions/{freet_id}/mine", web::get().to(suggestions::mine))
            .service(
                web::resource("/suggestions/{id}")
                    .route(web::get().to(suggestions::popular))
                    .route(web::post().to(suggestions::add))
                    .route(web::delete().to(suggestions::delete)),
            ),
    );
}
