use super::dto::{AccountResponse, ActivityResponse, PageParams, RegisterAccountRequest};
use crate::state::ApiState;
use axum::extract::{Path, State};
use remit::domain::constants::ACCOUNT_TAG;
use remit::kernel::pagination::{Page, PageRequest};
use remit::kernel::server::{ApiError, ApiResponse, ValidJson, ValidQuery};
use remit_derive::api_handler;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub(super) fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(list_accounts, register_account))
        .routes(routes!(get_account, delete_account))
        .routes(routes!(account_activities))
}

#[api_handler(
    get,
    path = "/api/accounts",
    params(PageParams),
    responses(
        (status = OK, description = "Live accounts ordered by id", body = ApiResponse<Page<AccountResponse>>),
        (status = BAD_REQUEST, description = "Page or size out of range"),
    ),
    tag = ACCOUNT_TAG,
)]
pub(super) async fn list_accounts(
    State(state): State<ApiState>,
    ValidQuery(params): ValidQuery<PageParams>,
) -> Result<ApiResponse<Page<AccountResponse>>, ApiError> {
    let request = PageRequest::new(params.page, params.size)?;
    let page = state.accounts()?.list(request).await?;
    Ok(ApiResponse::success(page.map(AccountResponse::from)))
}

#[api_handler(
    post,
    path = "/api/accounts",
    request_body = RegisterAccountRequest,
    responses(
        (status = OK, description = "Account opened with a zero balance", body = ApiResponse<AccountResponse>),
        (status = BAD_REQUEST, description = "Invalid fields or duplicate account number"),
    ),
    tag = ACCOUNT_TAG,
)]
pub(super) async fn register_account(
    State(state): State<ApiState>,
    ValidJson(body): ValidJson<RegisterAccountRequest>,
) -> Result<ApiResponse<AccountResponse>, ApiError> {
    let account = state.accounts()?.register(&body.account_number, &body.account_name).await?;
    Ok(ApiResponse::success(account.into()))
}

#[api_handler(
    get,
    path = "/api/accounts/{accountNumber}",
    params(("accountNumber" = String, Path, description = "Account number")),
    responses(
        (status = OK, description = "Account found", body = ApiResponse<AccountResponse>),
        (status = NOT_FOUND, description = "Account not found"),
    ),
    tag = ACCOUNT_TAG,
)]
pub(super) async fn get_account(
    State(state): State<ApiState>,
    Path(account_number): Path<String>,
) -> Result<ApiResponse<AccountResponse>, ApiError> {
    let account = state.accounts()?.get(&account_number).await?;
    Ok(ApiResponse::success(account.into()))
}

#[api_handler(
    delete,
    path = "/api/accounts/{accountNumber}",
    params(("accountNumber" = String, Path, description = "Account number")),
    responses(
        (status = OK, description = "Account soft-deleted; its number stays reserved"),
        (status = NOT_FOUND, description = "Account not found"),
    ),
    tag = ACCOUNT_TAG,
)]
pub(super) async fn delete_account(
    State(state): State<ApiState>,
    Path(account_number): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    state.accounts()?.delete(&account_number).await?;
    Ok(ApiResponse::empty())
}

#[api_handler(
    get,
    path = "/api/accounts/{accountNumber}/activities",
    params(("accountNumber" = String, Path, description = "Account number")),
    responses(
        (status = OK, description = "Activities, newest first", body = ApiResponse<Vec<ActivityResponse>>),
        (status = NOT_FOUND, description = "Account not found"),
    ),
    tag = ACCOUNT_TAG,
)]
pub(super) async fn account_activities(
    State(state): State<ApiState>,
    Path(account_number): Path<String>,
) -> Result<ApiResponse<Vec<ActivityResponse>>, ApiError> {
    super::activities::history(&state, &account_number).await
}
