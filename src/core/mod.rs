//! Core types for viewdigest
//!
//! This module holds the error taxonomy shared by the digest engine, the lookup
//! layer, and the CLI.
//!
//! ## `error` - Error Handling
//!
//! - [`DigestError`] - The failures the engine cannot absorb (collaborator
//!   failures and configuration problems)
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to user-friendly format

pub mod error;

pub use error::{DigestError, ErrorContext, user_friendly_error};
