//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod auth;
pub mod error;
pub mod health;
pub mod recipes;
pub mod records;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register the account and record APIs together with extractor settings
/// that report failures in the shared error envelope.
///
/// Expects `web::Data<HttpState>` to be provided by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .configure(users::configure)
        .service(
            web::scope("/recipe")
                .configure(records::configure)
                .configure(recipes::configure),
        );
}
