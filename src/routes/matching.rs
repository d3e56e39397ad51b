use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::core::{CandidateSelector, Decision, MatchLedger};
use crate::error::MatchingError;
use crate::models::{DetailResponse, HealthResponse, MatchRequestBody, MatchResponseBody, User};
use crate::services::MatchStore;

/// Application state shared across all handlers
pub struct AppState<S> {
    pub store: Arc<S>,
    pub selector: CandidateSelector,
    pub ledger: MatchLedger,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            selector: self.selector,
            ledger: self.ledger,
        }
    }
}

impl<S: MatchStore> AppState<S> {
    /// Load the caller's current user record
    async fn current_user(&self, caller: AuthenticatedUser) -> Result<User, MatchingError> {
        self.store
            .get_user(caller.user_id)
            .await?
            .ok_or_else(|| MatchingError::Unauthenticated("Could not validate credentials".to_string()))
    }
}

/// Configure all matching routes
pub fn configure<S: MatchStore + 'static>(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check::<S>))
        .route("/matching/status", web::get().to(get_matching_status::<S>))
        .route("/matching/list", web::get().to(list_candidates::<S>))
        .route("/matching/partner", web::get().to(get_partner::<S>))
        .route("/matching/request", web::post().to(request_match::<S>))
        .route("/matching/accept", web::post().to(respond_to_match::<S>));
}

fn validation_error(errors: validator::ValidationErrors) -> MatchingError {
    MatchingError::InvalidRequest(format!("Validation failed: {}", errors))
}

/// Health check endpoint
async fn health_check<S: MatchStore>(state: web::Data<AppState<S>>) -> impl Responder {
    let healthy = state.store.health_check().await.unwrap_or(false);

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// GET /api/v1/matching/status
///
/// Returns the caller's matching status as a bare JSON string.
async fn get_matching_status<S: MatchStore>(
    state: web::Data<AppState<S>>,
    caller: AuthenticatedUser,
) -> Result<HttpResponse, MatchingError> {
    let user = state.current_user(caller).await?;
    Ok(HttpResponse::Ok().json(user.matching_status))
}

/// GET /api/v1/matching/list
///
/// Up to four candidates, compatible personality types first.
async fn list_candidates<S: MatchStore>(
    state: web::Data<AppState<S>>,
    caller: AuthenticatedUser,
) -> Result<HttpResponse, MatchingError> {
    let user = state.current_user(caller).await?;
    let candidates = state.selector.list_candidates(&*state.store, &user).await?;

    tracing::info!("Returning {} candidates for user {}", candidates.len(), user.id);

    Ok(HttpResponse::Ok().json(candidates))
}

/// GET /api/v1/matching/partner
async fn get_partner<S: MatchStore>(
    state: web::Data<AppState<S>>,
    caller: AuthenticatedUser,
) -> Result<HttpResponse, MatchingError> {
    let user = state.current_user(caller).await?;
    let partner = state.selector.active_partner(&*state.store, &user).await?;
    Ok(HttpResponse::Ok().json(partner))
}

/// POST /api/v1/matching/request
///
/// Request body:
/// ```json
/// { "partner_id": 12 }
/// ```
async fn request_match<S: MatchStore>(
    state: web::Data<AppState<S>>,
    caller: AuthenticatedUser,
    req: web::Json<MatchRequestBody>,
) -> Result<HttpResponse, MatchingError> {
    req.validate().map_err(validation_error)?;

    state
        .ledger
        .request_match(&*state.store, caller.user_id, req.partner_id)
        .await?;

    Ok(HttpResponse::Ok().json(DetailResponse::new("Match request sent successfully")))
}

/// POST /api/v1/matching/accept
///
/// Request body:
/// ```json
/// { "match_id": 7, "accept": true }
/// ```
/// `match_id` is the requester's user id.
async fn respond_to_match<S: MatchStore>(
    state: web::Data<AppState<S>>,
    caller: AuthenticatedUser,
    req: web::Json<MatchResponseBody>,
) -> Result<HttpResponse, MatchingError> {
    req.validate().map_err(validation_error)?;

    state
        .ledger
        .respond_to_match(
            &*state.store,
            caller.user_id,
            req.match_id,
            Decision::from(req.accept),
        )
        .await?;

    Ok(HttpResponse::Ok().json(DetailResponse::new("Match request handled successfully")))
}
