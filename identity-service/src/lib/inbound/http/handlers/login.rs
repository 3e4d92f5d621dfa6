use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::AuthData;
use crate::identity::ports::IdentityServicePort;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<AuthData>, ApiError> {
    // Incomplete credentials get the same generic failure as wrong ones
    let (email, password) = match (body.email, body.password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            (email, password)
        }
        _ => return Err(ApiError::AuthenticationFailed),
    };

    // An unknown email maps to the same response as a wrong password so
    // the endpoint cannot be used to enumerate accounts
    let user = state.identity_service.get_user_by_email(&email).await?;

    let result = state
        .authenticator
        .authenticate(&password, &user.password_hash, user.id)
        .map_err(|e| match e {
            auth::AuthenticationError::InvalidCredentials => ApiError::AuthenticationFailed,
            auth::AuthenticationError::Password(err) => {
                ApiError::InternalServerError(format!("Password verification failed: {}", err))
            }
            auth::AuthenticationError::Jwt(err) => {
                ApiError::InternalServerError(format!("Token generation failed: {}", err))
            }
        })?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        "Login successful",
        AuthData {
            access_token: result.access_token,
            user: (&user).into(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    email: Option<String>,
    password: Option<String>,
}
