use actix_web::web;

use crate::error::AppError;
use crate::errors::ErrorCode;

pub mod games;
pub mod health;
pub mod players;

/// JSON extractor config: malformed bodies become problem+json 400s.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| {
            AppError::bad_request(ErrorCode::BadRequest, format!("Invalid JSON body: {err}")).into()
        })
}

/// Register every route. Shared by `main` and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());

    // Health check routes: /health
    cfg.configure(health::configure_routes);

    // Games routes: /games/**
    cfg.service(web::scope("/games").configure(games::configure_routes));

    // Player profile routes: /players/**
    cfg.service(web::scope("/players").configure(players::configure_routes));
}
