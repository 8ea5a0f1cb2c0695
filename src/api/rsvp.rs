use crate::api::AppState;
use crate::api::client_ip;
use crate::api::schemas::{RsvpForm, RsvpResponse};
use crate::error::Result;
use axum::{
    Form, Json,
    extract::{ConnectInfo, State},
    http::{HeaderMap, header},
};
use std::net::SocketAddr;

/// Accepts one RSVP submission.
///
/// # Errors
/// Returns `AppError::Validation` for malformed fields,
/// `AppError::RateLimited` when a submission ceiling is reached, or
/// `AppError::Database` if the submission cannot be persisted.
pub async fn submit_rsvp(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Form(form): Form<RsvpForm>,
) -> Result<Json<RsvpResponse>> {
    let origin = client_ip::resolve(&headers, peer.ip(), &state.config.server.trusted_proxies);
    let user_agent = headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()).map(ToString::to_string);

    let accepted = state.rsvp_service.submit(&form, origin, user_agent).await?;

    Ok(Json(RsvpResponse {
        success: true,
        message: "RSVP submitted successfully!".to_string(),
        id: accepted.id,
    }))
}
