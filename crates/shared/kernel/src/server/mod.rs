//! HTTP plumbing shared by every slice: the response envelope, error mapping,
//! validating extractors and the system router.

mod error;
mod extract;
mod health;
mod response;
pub mod router;

pub use error::ApiError;
pub use extract::{ValidJson, ValidQuery};
pub use response::{ApiResponse, Status};
