use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::AppState;
use crate::error::ApiError;
use crate::token;

/// Extract and validate the bearer token in front of every protected route.
/// On failure the request never reaches a handler, so no store operation
/// can run without a verified identity.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let claims = token::verify(&state.jwt_secret, auth_header)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
