use crate::api;
use crate::state::ApiState;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa::openapi::server::Server as DocServer;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

/// Interactive API reference.
pub const DOCS_PATH: &str = "/docs";
/// Raw `OpenAPI` document.
pub const OPENAPI_PATH: &str = "/v3/api-docs";

#[derive(OpenApi)]
#[openapi(info(
    title = "Remit API",
    description = "Accounts, deposits, withdrawals and fee-charging transfers with a daily limit per account."
))]
struct ApiDoc;

pub(crate) fn init(state: ApiState) -> Router {
    let mut api = ApiDoc::openapi();
    api.servers = Some(vec![DocServer::new(state.config.server.public_url.clone())]);

    let (routes, api_doc) = OpenApiRouter::with_openapi(api)
        .merge(remit::server::router::system_router())
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    let document = api_doc.clone();
    let raw_doc = Router::new().route(OPENAPI_PATH, get(move || async move { Json(document) }));

    Router::new().merge(routes).merge(raw_doc).merge(Scalar::with_url(DOCS_PATH, api_doc))
}
