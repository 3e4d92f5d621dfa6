use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::FieldError;
use crate::identity::errors::IdentityError;
use crate::identity::models::OrganisationId;
use crate::identity::models::UserId;
use crate::identity::ports::IdentityServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(org_id): Path<String>,
    Json(body): Json<AddMemberRequestBody>,
) -> Result<ApiSuccess<()>, ApiError> {
    let user_id = match body.user_id {
        Some(user_id) if !user_id.is_empty() => user_id,
        _ => {
            return Err(ApiError::validation(vec![FieldError::new(
                "userId",
                "userId is required",
            )]))
        }
    };

    // A userId that does not parse cannot name an existing user, which is
    // the same validation failure as an unknown one
    let target = UserId::from_string(&user_id).map_err(|_| invalid_user_id())?;

    let org_id = OrganisationId::from_string(&org_id)
        .map_err(|_| ApiError::NotFound("Organisation not found".to_string()))?;

    state
        .identity_service
        .add_member(&org_id, &auth_user.user_id, &target)
        .await
        .map_err(|e| match e {
            IdentityError::UserNotFound(_) => invalid_user_id(),
            other => ApiError::from(other),
        })?;

    Ok(ApiSuccess::message_only(
        StatusCode::OK,
        "User added to organisation successfully",
    ))
}

fn invalid_user_id() -> ApiError {
    ApiError::validation(vec![FieldError::new("userId", "Invalid userId")])
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequestBody {
    user_id: Option<String>,
}
