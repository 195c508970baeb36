//! Kernel utilities shared across slices.
//! Keep this crate lightweight: it holds the error contract every slice reports through,
//! request validation, pagination, ID generation and config loading. HTTP plumbing lives
//! behind the `server` feature.
//!
//! ## ID generation
//! Use `safe_nanoid!` for URL-safe, unambiguous IDs:
//! ```rust
//! # use remit_kernel::safe_nanoid;
//! let id = safe_nanoid!();
//! assert_eq!(id.len(), 12);
//! ```
//!
//! ## Config loading (non-wasm)
//! ```rust,ignore
//! use remit_kernel::config::load_config;
//! let cfg: remit_kernel::domain::config::ApiConfig = load_config(Some("server"))?;
//! ```

// Lets `remit_derive` expansions resolve `::remit_kernel` paths inside this crate.
extern crate self as remit_kernel;

#[cfg(not(target_arch = "wasm32"))]
pub mod config;
pub mod error;
pub mod pagination;
pub mod validation;
#[cfg(feature = "server")]
pub mod server;

// Alphabet excludes visually ambiguous characters (I, O, l, 0, 1).
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f',
    'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

pub use nanoid::nanoid;
pub use remit_domain as domain;

/// Generates an unambiguous `NanoID` (no visually confusing characters).
#[macro_export]
macro_rules! safe_nanoid {
    () => {
        $crate::nanoid!(12, $crate::SAFE_ALPHABET)
    };
    ($size:expr) => {
        $crate::nanoid!($size, $crate::SAFE_ALPHABET)
    };
}

/// Generates the id shared by both legs of a transfer, e.g. `TX_7hKp2mQx9ZtR4bWn`.
#[must_use]
pub fn transaction_id() -> String {
    format!("{}{}", domain::constants::TRANSACTION_ID_PREFIX, safe_nanoid!(16))
}
