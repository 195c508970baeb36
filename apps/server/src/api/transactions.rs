use super::dto::{
    AccountResponse, DepositRequest, TransferRequest, TransferResponse, WithdrawRequest, amount,
};
use crate::state::ApiState;
use axum::extract::State;
use remit::domain::constants::TRANSACTION_TAG;
use remit::kernel::server::{ApiError, ApiResponse, ValidJson};
use remit_derive::api_handler;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub(super) fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(deposit))
        .routes(routes!(withdraw))
        .routes(routes!(transfer))
}

#[api_handler(
    post,
    path = "/api/transactions/deposit",
    request_body = DepositRequest,
    responses(
        (status = OK, description = "Balance after the deposit", body = ApiResponse<AccountResponse>),
        (status = BAD_REQUEST, description = "Invalid fields"),
        (status = NOT_FOUND, description = "Account not found"),
        (status = CONFLICT, description = "Concurrent update; retries exhausted"),
    ),
    tag = TRANSACTION_TAG,
)]
pub(super) async fn deposit(
    State(state): State<ApiState>,
    ValidJson(body): ValidJson<DepositRequest>,
) -> Result<ApiResponse<AccountResponse>, ApiError> {
    let account = state.accounts()?.deposit(&body.account_number, amount(body.amount)).await?;
    Ok(ApiResponse::success(account.into()))
}

#[api_handler(
    post,
    path = "/api/transactions/withdraw",
    request_body = WithdrawRequest,
    responses(
        (status = OK, description = "Balance after the withdrawal", body = ApiResponse<AccountResponse>),
        (status = BAD_REQUEST, description = "Invalid fields, insufficient balance or daily limit exceeded"),
        (status = NOT_FOUND, description = "Account not found"),
        (status = CONFLICT, description = "Concurrent update; retries exhausted"),
    ),
    tag = TRANSACTION_TAG,
)]
pub(super) async fn withdraw(
    State(state): State<ApiState>,
    ValidJson(body): ValidJson<WithdrawRequest>,
) -> Result<ApiResponse<AccountResponse>, ApiError> {
    let account = state.accounts()?.withdraw(&body.account_number, amount(body.amount)).await?;
    Ok(ApiResponse::success(account.into()))
}

#[api_handler(
    post,
    path = "/api/transactions/transfer",
    request_body = TransferRequest,
    responses(
        (status = OK, description = "Both accounts after the transfer and the fee charged", body = ApiResponse<TransferResponse>),
        (status = BAD_REQUEST, description = "Invalid fields, same account, insufficient balance or daily limit exceeded"),
        (status = NOT_FOUND, description = "Sender or recipient not found"),
        (status = CONFLICT, description = "Concurrent update; retries exhausted"),
    ),
    tag = TRANSACTION_TAG,
)]
pub(super) async fn transfer(
    State(state): State<ApiState>,
    ValidJson(body): ValidJson<TransferRequest>,
) -> Result<ApiResponse<TransferResponse>, ApiError> {
    let result = state
        .accounts()?
        .transfer(&body.from_account_number, &body.to_account_number, amount(body.amount))
        .await?;
    Ok(ApiResponse::success(result.into()))
}
