//! Business routes. Every handler resolves its slice from [`ApiState`] and answers with the
//! kernel envelope.

mod accounts;
mod activities;
pub mod dto;
mod transactions;

use crate::state::ApiState;
use utoipa_axum::router::OpenApiRouter;

pub(crate) fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .merge(accounts::router())
        .merge(transactions::router())
        .merge(activities::router())
}
