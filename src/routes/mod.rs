// Route exports
pub mod matching;

use actix_web::{error, web, HttpRequest};

use crate::error::MatchingError;
use crate::services::MatchStore;

pub use matching::AppState;

pub fn configure_routes<S: MatchStore + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/v1").configure(matching::configure::<S>));
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    MatchingError::InvalidRequest(format!("Invalid JSON: {}", err)).into()
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(handle_json_payload_error)
}
