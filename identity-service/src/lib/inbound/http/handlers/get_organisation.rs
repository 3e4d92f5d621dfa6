use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::OrganisationData;
use crate::identity::models::OrganisationId;
use crate::identity::ports::IdentityServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn get_organisation(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(org_id): Path<String>,
) -> Result<ApiSuccess<OrganisationData>, ApiError> {
    let org_id = OrganisationId::from_string(&org_id)
        .map_err(|_| ApiError::NotFound("Organisation not found".to_string()))?;

    let organisation = state
        .identity_service
        .get_organisation(&org_id, &auth_user.user_id)
        .await?;

    Ok(ApiSuccess::new(StatusCode::OK, "", (&organisation).into()))
}
