use axum::Router;
use trai::domain::constants::STATIC_PREFIX;
use trai::kernel::server::ApiState;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(
    info(title = "TrAi", description = "Personal training intelligence API"),
    modifiers(&BearerAuth)
)]
struct ApiDoc;

/// Registers the `bearer` scheme referenced by protected handlers.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build(),
            ),
        );
    }
}

#[allow(unreachable_pub)]
pub fn init(state: ApiState) -> Router {
    let static_dir = state.config.storage.static_dir.clone();

    let (api_routes, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(trai::router())
        .with_state(state)
        .split_for_parts();

    Router::new()
        .merge(api_routes)
        .merge(Scalar::with_url("/api", api_doc))
        .nest_service(STATIC_PREFIX, ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
}
