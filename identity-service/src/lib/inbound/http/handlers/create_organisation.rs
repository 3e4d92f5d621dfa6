use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::FieldError;
use super::OrganisationData;
use crate::identity::models::CreateOrganisationCommand;
use crate::identity::ports::IdentityServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn create_organisation(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(body): Json<CreateOrganisationRequestBody>,
) -> Result<ApiSuccess<OrganisationData>, ApiError> {
    let name = match body.name {
        Some(name) if !name.is_empty() => name,
        _ => {
            return Err(ApiError::validation(vec![FieldError::new(
                "name",
                "Name is required",
            )]))
        }
    };

    let command = CreateOrganisationCommand {
        name,
        description: body.description.filter(|description| !description.is_empty()),
    };

    let organisation = state
        .identity_service
        .create_organisation(command, &auth_user.user_id)
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::CREATED,
        "Organisation created successfully",
        (&organisation).into(),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateOrganisationRequestBody {
    name: Option<String>,
    description: Option<String>,
}
