#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the Remit workspace: error enums, API models and
//! handlers, and feature slices.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! remit-derive.workspace = true
//! ```
//!
//! Examples below are `ignore`d because the generated code refers to `remit_kernel`,
//! `serde`, `thiserror` and `utoipa`, which this crate does not depend on.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Defines a standard API data model.
///
/// # Injected Behaviors
///
/// * **Derives**: `Debug`, plus `Serialize` and/or `Deserialize` depending on direction.
/// * **`OpenAPI`**: `utoipa::ToSchema` (or `utoipa::IntoParams` for `params`) behind the
///   `server` feature.
/// * **Serde Policy**: `rename_all = "camelCase"` and, for readable models,
///   `deny_unknown_fields`.
///
/// # Arguments
///
/// * `request` / `response` - Restricts the model to deserialization or serialization.
/// * `params` - Documents the model as query parameters.
/// * `rename_all = "..."` - Overrides the default rename policy.
/// * `deny_unknown_fields = false` - Disables strict field checking.
///
/// # Example
///
/// ```rust,ignore
/// use remit_derive::api_model;
///
/// #[api_model(request)]
/// pub struct DepositRequest {
///     pub account_number: String,
///     pub amount: i64,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Bridges an axum handler with `OpenAPI` documentation.
///
/// Accepts standard `utoipa::path` arguments (`get`, `post`, `path = "..."`,
/// `responses(...)`, `tag = "..."`) and applies them when the `server` feature is enabled.
///
/// # Example
///
/// ```rust,ignore
/// use remit_derive::api_handler;
///
/// #[api_handler(
///     get,
///     path = "/health",
///     responses((status = OK, body = HealthResponse)),
///     tag = "System"
/// )]
/// pub async fn health_handler() -> impl IntoResponse {
///     // ...
/// }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Defines a domain error enum.
///
/// # Features
///
/// * Injects `#[derive(Debug, thiserror::Error)]`.
/// * Generates a companion `...Ext` trait that adds `.context()` to results carrying
///   this error or any wrapped source error.
/// * Implements `From<T>` for variants with a `source` field, so `?` works upstream.
/// * Implements `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * Implements `remit_kernel::error::ErrorCode` when variants are annotated with
///   `#[api(code = "...", kind = ...)]` or `#[api(transparent)]`. Unannotated variants
///   report `INTERNAL_ERROR`.
///
/// # Requirements
///
/// 1. Applied to an **enum** with named-field variants only.
/// 2. Variants with a source must also carry `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[remit_derive::remit_error]
/// pub enum AccountError {
///     #[api(code = "ACCOUNT_001", kind = NotFound)]
///     #[error("Account not found: {account_number}")]
///     NotFound { account_number: String },
///
///     #[error("Storage error{}: {source}", format_context(.context))]
///     Storage { source: StorageError, context: Option<Cow<'static, str>> },
///
///     #[error("Internal account error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn remit_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Defines a feature slice handle.
///
/// Generates `<Name>Inner` holding the fields, an `Arc` wrapper named `<Name>` with
/// `Deref` to the inner state, and a `FeatureSlice` impl for the API state registry.
///
/// # Example
/// ```rust,ignore
/// #[remit_derive::remit_slice]
/// pub struct ActivityService {
///     repository: Arc<dyn ActivityRepository>,
/// }
///
/// let service = ActivityService::new(ActivityServiceInner { repository });
/// ```
#[proc_macro_attribute]
pub fn remit_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
