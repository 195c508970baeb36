use super::dto::ActivityResponse;
use crate::state::ApiState;
use axum::extract::{Path, State};
use remit::domain::constants::ACTIVITY_TAG;
use remit::kernel::server::{ApiError, ApiResponse};
use remit_derive::api_handler;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub(super) fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(list_activities))
}

pub(super) async fn history(
    state: &ApiState,
    account_number: &str,
) -> Result<ApiResponse<Vec<ActivityResponse>>, ApiError> {
    let activities = state.accounts()?.activities_of(account_number).await?;
    Ok(ApiResponse::success(activities.into_iter().map(ActivityResponse::from).collect()))
}

#[api_handler(
    get,
    path = "/api/activities/{accountNumber}",
    params(("accountNumber" = String, Path, description = "Account number")),
    responses(
        (status = OK, description = "Activities, newest first", body = ApiResponse<Vec<ActivityResponse>>),
        (status = NOT_FOUND, description = "Account not found"),
    ),
    tag = ACTIVITY_TAG,
)]
pub(super) async fn list_activities(
    State(state): State<ApiState>,
    Path(account_number): Path<String>,
) -> Result<ApiResponse<Vec<ActivityResponse>>, ApiError> {
    history(&state, &account_number).await
}
