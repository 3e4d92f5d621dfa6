use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::identity::errors::IdentityError;
use crate::identity::models::Organisation;
use crate::identity::models::User;

pub mod add_member;
pub mod create_organisation;
pub mod get_organisation;
pub mod get_user;
pub mod list_organisations;
pub mod login;
pub mod register;

/// Successful response envelope: `{status: "success", message, data}`.
///
/// `data` is omitted entirely for acknowledgement-only responses.
#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiSuccessBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, message: &str, data: T) -> Self {
        ApiSuccess(
            status,
            Json(ApiSuccessBody {
                status: "success",
                message: message.to_string(),
                data: Some(data),
            }),
        )
    }
}

impl ApiSuccess<()> {
    /// Acknowledgement with no payload beyond the message.
    pub fn message_only(status: StatusCode, message: &str) -> Self {
        ApiSuccess(
            status,
            Json(ApiSuccessBody {
                status: "success",
                message: message.to_string(),
                data: None,
            }),
        )
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiSuccessBody<T: Serialize + PartialEq> {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// A single field-tagged validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    pub fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Error responses, one variant per contract failure class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 422 `{errors: [{field, message}, ...]}` - covers missing fields and
    /// the duplicate-email conflict, which shares the shape
    Validation(Vec<FieldError>),
    /// 401 with a generic body; wrong password and unknown email are
    /// indistinguishable
    AuthenticationFailed,
    /// 401, token was presented but did not verify
    InvalidToken,
    /// 403, no bearer token was presented at all
    NoToken,
    /// 403, authenticated but not a member
    AccessDenied,
    /// 404 with a resource-specific message
    NotFound(String),
    /// 500; the detail is logged, never returned to the caller
    InternalServerError(String),
}

impl ApiError {
    pub fn validation(errors: Vec<FieldError>) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "errors": errors })),
            )
                .into_response(),
            ApiError::AuthenticationFailed => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "status": "Bad request", "message": "Authentication failed" })),
            )
                .into_response(),
            ApiError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "status": "Failed", "message": "Failed to authenticate token" })),
            )
                .into_response(),
            ApiError::NoToken => (
                StatusCode::FORBIDDEN,
                Json(json!({ "status": "Forbidden", "message": "No token provided" })),
            )
                .into_response(),
            ApiError::AccessDenied => (
                StatusCode::FORBIDDEN,
                Json(json!({ "status": "Forbidden", "message": "Access denied" })),
            )
                .into_response(),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "status": "Not Found", "message": message })),
            )
                .into_response(),
            ApiError::InternalServerError(detail) => {
                tracing::error!(detail = %detail, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "status": "Error", "message": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::UserNotFound(_) => ApiError::NotFound("User not found".to_string()),
            IdentityError::OrganisationNotFound(_) => {
                ApiError::NotFound("Organisation not found".to_string())
            }
            IdentityError::UserNotFoundByEmail(_) => ApiError::AuthenticationFailed,
            IdentityError::EmailAlreadyExists(_) => {
                ApiError::Validation(vec![FieldError::new("email", "Email already exists")])
            }
            IdentityError::AccessDenied => ApiError::AccessDenied,
            IdentityError::InvalidUserId(_)
            | IdentityError::InvalidOrganisationId(_)
            | IdentityError::Password(_)
            | IdentityError::DatabaseError(_)
            | IdentityError::Unknown(_) => ApiError::InternalServerError(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

/// Public view of a user; the password hash never appears here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
        }
    }
}

/// Payload returned by both registration and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    pub access_token: String,
    pub user: UserData,
}

/// Public view of an organisation; the member list is not exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationData {
    pub org_id: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<&Organisation> for OrganisationData {
    fn from(organisation: &Organisation) -> Self {
        Self {
            org_id: organisation.id.to_string(),
            name: organisation.name.clone(),
            description: organisation.description.clone(),
        }
    }
}
