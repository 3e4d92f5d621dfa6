use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::add_member::add_member;
use super::handlers::create_organisation::create_organisation;
use super::handlers::get_organisation::get_organisation;
use super::handlers::get_user::get_user;
use super::handlers::list_organisations::list_organisations;
use super::handlers::login::login;
use super::handlers::register::register;
use super::middleware::require_auth;
use crate::domain::identity::service::IdentityService;
use crate::outbound::repositories::PostgresIdentityRepository;

#[derive(Clone)]
pub struct AppState {
    pub identity_service: Arc<IdentityService<PostgresIdentityRepository>>,
    pub authenticator: Arc<Authenticator>,
}

pub fn create_router(
    identity_service: Arc<IdentityService<PostgresIdentityRepository>>,
    authenticator: Arc<Authenticator>,
) -> Router {
    let state = AppState {
        identity_service,
        authenticator,
    };

    let public_routes = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login));

    let protected_routes = Router::new()
        .route("/api/users/:user_id", get(get_user))
        .route(
            "/api/organisations",
            get(list_organisations).post(create_organisation),
        )
        .route("/api/organisations/:org_id", get(get_organisation))
        .route("/api/organisations/:org_id/users", post(add_member))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
