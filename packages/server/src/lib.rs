pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::CorsLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Aula Forum API",
        version = "1.0.0",
        description = "API for the aula campus forum backend"
    ),
    tags(
        (name = "Auth", description = "Authentication and user management"),
        (name = "Posts", description = "Posts, comments and thread assembly"),
        (name = "Votes", description = "Vote casting and score reads"),
        (name = "Subjects", description = "Subject management"),
        (name = "Careers", description = "Career management"),
        (name = "Users", description = "Public user profiles"),
        (name = "Files", description = "Stored file downloads"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state);

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi()).split_for_parts();

    let router = router
        .nest("/api", routes::api_routes())
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api));

    match cors {
        Some(layer) => router.layer(layer),
        None => router,
    }
}

fn cors_layer(state: &AppState) -> Option<CorsLayer> {
    let cors = &state.config.server.cors;
    if cors.allow_origins.is_empty() {
        return None;
    }

    let origins: Vec<HeaderValue> = cors
        .allow_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
            .max_age(Duration::from_secs(cors.max_age)),
    )
}
