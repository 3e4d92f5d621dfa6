use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::OrganisationData;
use crate::identity::ports::IdentityServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn list_organisations(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<ApiSuccess<ListOrganisationsResponseData>, ApiError> {
    let organisations = state
        .identity_service
        .list_member_organisations(&auth_user.user_id)
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        "",
        ListOrganisationsResponseData {
            organisations: organisations.iter().map(Into::into).collect(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListOrganisationsResponseData {
    pub organisations: Vec<OrganisationData>,
}
