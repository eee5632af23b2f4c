//! Integration test suite for viewdigest
//!
//! End-to-end tests of the digest engine against real view directories and of
//! the `viewdigest` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **digest_behavior**: Digest values, sensitivity, injected tokens, cycles
//! - **concurrency**: At-most-once computation under contention
//! - **filesystem**: Lookup over view directories, formats, wildcards
//! - **cli**: The `viewdigest` binary
//!
//! Set `RUST_LOG=viewdigest=debug` to see engine logging.

mod cli;
mod concurrency;
mod digest_behavior;
mod filesystem;
