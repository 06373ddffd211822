//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod accounts;
pub mod analytics;
pub mod auth;
pub mod envelope;
pub mod error;
pub mod groups;
pub mod health;
pub mod ideas;
pub mod projects;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;
pub mod votes;

pub use error::ApiResult;

/// Register extractor error handlers and every `/api` scope.
///
/// The caller provides [`state::HttpState`] as app data and wraps the session
/// middleware.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(validation::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(validation::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(validation::path_error_handler))
        .service(accounts::scope())
        .service(groups::scope())
        .service(ideas::scope())
        .service(votes::scope())
        .service(projects::scope())
        .service(analytics::scope());
}
