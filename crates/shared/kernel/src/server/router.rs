use super::health;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Routes every deployment exposes regardless of enabled slices.
pub fn system_router<S>() -> OpenApiRouter<S>
where
    S: Send + Sync + Clone + 'static,
{
    // Uptime counts from router construction, not from the first probe.
    std::sync::LazyLock::force(&health::START_TIME);
    OpenApiRouter::<S>::new().routes(routes!(health::health_handler))
}
