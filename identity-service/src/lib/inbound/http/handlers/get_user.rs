use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::identity::models::UserId;
use crate::identity::ports::IdentityServicePort;
use crate::inbound::http::router::AppState;

/// Any authenticated caller may fetch any user's public profile; there is
/// deliberately no ownership check on this endpoint.
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    // An unparseable id cannot name an existing user
    let user_id = UserId::from_string(&user_id)
        .map_err(|_| ApiError::NotFound("User not found".to_string()))?;

    let user = state.identity_service.get_user(&user_id).await?;

    Ok(ApiSuccess::new(StatusCode::OK, "", (&user).into()))
}
