//! Activity feature slice.
//!
//! Every balance change is recorded as an [`Activity`]. A transfer produces two activities, one
//! per leg, sharing a transaction id. The slice owns the read side; writes happen atomically with
//! the account update in the account slice.

mod error;
mod model;
mod repository;
mod service;

pub use error::{ActivityError, ActivityErrorExt};
pub use model::{
    Activity, ActivityType, MAX_DESCRIPTION_LEN, MAX_TRANSACTION_ID_LEN, NewActivity,
    TransactionReference,
};
pub use repository::ActivityRepository;
pub use service::{ActivityService, ActivityServiceInner};

use remit_kernel::domain::registry::InitializedSlice;
use std::sync::Arc;

/// Initialize the activity feature over the given storage.
pub fn init(repository: Arc<dyn ActivityRepository>) -> (ActivityService, InitializedSlice) {
    tracing::info!("Activity slice initialized");

    let slice = ActivityService::with_repository(repository);
    (slice.clone(), slice.into_initialized())
}
