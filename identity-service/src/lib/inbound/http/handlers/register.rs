use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::AuthData;
use super::FieldError;
use crate::identity::models::RegisterUserCommand;
use crate::identity::ports::IdentityServicePort;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequestBody>,
) -> Result<ApiSuccess<AuthData>, ApiError> {
    let command = body.try_into_command()?;

    let user = state.identity_service.register_user(command).await?;

    let access_token = state
        .authenticator
        .issue_token(user.id)
        .map_err(|e| ApiError::InternalServerError(format!("Token generation failed: {}", e)))?;

    Ok(ApiSuccess::new(
        StatusCode::CREATED,
        "Registration successful",
        AuthData {
            access_token,
            user: (&user).into(),
        },
    ))
}

/// HTTP request body for registration (raw JSON).
///
/// Every field is optional at the wire level so that presence validation
/// can report all missing fields at once instead of failing on the first.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestBody {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    phone: Option<String>,
}

impl RegisterRequestBody {
    fn try_into_command(self) -> Result<RegisterUserCommand, ApiError> {
        let mut errors = Vec::new();

        let first_name = require(
            self.first_name,
            "firstName",
            "First name is required",
            &mut errors,
        );
        let last_name = require(
            self.last_name,
            "lastName",
            "Last name is required",
            &mut errors,
        );
        let email = require(self.email, "email", "Email is required", &mut errors);
        let password = require(
            self.password,
            "password",
            "Password is required",
            &mut errors,
        );

        match (first_name, last_name, email, password) {
            (Some(first_name), Some(last_name), Some(email), Some(password)) => {
                Ok(RegisterUserCommand {
                    first_name,
                    last_name,
                    email,
                    password,
                    phone: self.phone.filter(|phone| !phone.is_empty()),
                })
            }
            _ => Err(ApiError::validation(errors)),
        }
    }
}

/// An absent field and an empty string both count as missing.
fn require(
    value: Option<String>,
    field: &'static str,
    message: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match value {
        Some(value) if !value.is_empty() => Some(value),
        _ => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}
