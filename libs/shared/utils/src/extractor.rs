use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::{typed_header::TypedHeaderRejection, TypedHeader};
use headers::{authorization::Bearer, Authorization};
use tracing::debug;
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::user::{Role, User, PUBLIC_USER_COLUMNS};

use crate::jwt::validate_token;
use crate::state::AppState;

/// Resolves the bearer token to a stored, active user and places it in the
/// request extensions for `Extension<User>` extraction.
pub async fn auth_middleware(
    State(state): State<AppState>,
    auth: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(auth) =
        auth.map_err(|_| AppError::Auth("Not authorized, no token".to_string()))?;

    let claims = validate_token(auth.token(), &state.config.jwt_secret)
        .map_err(|e| AppError::Auth(format!("Not authorized, {}", e.to_lowercase())))?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Auth("Not authorized, invalid token subject".to_string()))?;

    let user = load_user(&state, user_id)
        .await?
        .ok_or_else(|| AppError::Auth("Not authorized, user not found".to_string()))?;

    if !user.is_active {
        return Err(AppError::Forbidden(
            "Your account has been deactivated. Please contact support.".to_string(),
        ));
    }
    if user.awaiting_approval() {
        return Err(AppError::Forbidden(
            "Your account is pending admin approval.".to_string(),
        ));
    }

    debug!("Authenticated {} {}", user.role, user.id);
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

async fn load_user(state: &AppState, user_id: Uuid) -> Result<Option<User>, AppError> {
    let query = format!("select={}&id=eq.{}", PUBLIC_USER_COLUMNS, user_id);
    state
        .db
        .select_one::<User>("users", &query)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Route-level role gate.
pub fn authorize(user: &User, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "User role {} is not authorized to access this route",
            user.role
        )))
    }
}
