//! Shared types for the conversation vault: the error taxonomy, the
//! provider tag, message role normalization, and small cross-crate
//! combinators.

pub mod error;
pub mod provider;
pub mod role;
pub mod util;

pub use error::{Error, ErrorCode, Result};
pub use provider::Provider;
pub use role::Role;
