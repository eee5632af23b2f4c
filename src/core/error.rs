//! Error handling for viewdigest
//!
//! This module provides the error types surfaced by the digest engine and the
//! user-friendly error reporting used by the CLI. The error system follows two
//! principles:
//! 1. **Strongly-typed errors** ([`DigestError`]) for the few failures the engine
//!    cannot absorb itself
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions
//!    for CLI users
//!
//! # What is (and is not) an error
//!
//! Most unusual graph shapes are *not* errors. A template that cannot be found
//! becomes a missing node contributing an empty digest, and dependency cycles
//! are broken during both tree building and digest composition. Only failures
//! of a collaborator (a resolver that cannot read its view path, a dependency
//! tracker that fails) propagate, and they are never retried.
//!
//! # Examples
//!
//! ```rust,no_run
//! use viewdigest::core::{DigestError, user_friendly_error};
//!
//! let error = DigestError::InvalidConfig {
//!     reason: "lock_stripes must be a power of two".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for digest operations.
///
/// Each variant names the template or file involved so that a failure deep in
/// a dependency tree can be traced back to its origin.
#[derive(Error, Debug)]
pub enum DigestError {
    /// A resolver failed while looking a template up.
    ///
    /// "Not found" is not a failure; this variant is reserved for resolvers that
    /// could not complete the lookup at all (unreadable view path, bad pattern).
    #[error("Template lookup failed for '{name}'")]
    TemplateLookup {
        /// Logical name being resolved
        name: String,
        /// Underlying resolver failure
        #[source]
        source: anyhow::Error,
    },

    /// The dependency tracker failed while scanning a template.
    #[error("Dependency extraction failed for '{name}'")]
    DependencyExtraction {
        /// Name of the template being scanned
        name: String,
        /// Underlying tracker failure
        #[source]
        source: anyhow::Error,
    },

    /// The configuration file could not be parsed.
    #[error("Invalid configuration file {file}: {reason}")]
    ConfigParse {
        /// Path to the configuration file
        file: String,
        /// Parser message
        reason: String,
    },

    /// The configuration parsed but holds unusable values.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration
        reason: String,
    },

    /// No view paths were configured for a command that needs them.
    #[error("No view paths configured")]
    NoViewPaths,
}

/// Error context wrapper that provides user-friendly error information.
///
/// Carries the rendered error message together with an optional suggestion and
/// additional details for display in the terminal.
#[derive(Debug)]
pub struct ErrorContext {
    /// The rendered error message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors.
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Walks the error chain looking for a [`DigestError`] and attaches a suggestion
/// tailored to it. Errors that carry no known type are reported with their
/// full chain as details.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(digest_error) = cause.downcast_ref::<DigestError>() {
            return create_error_context(digest_error, &error);
        }
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>()
        && io_error.kind() == std::io::ErrorKind::NotFound
    {
        return ErrorContext::new(error.to_string())
            .with_suggestion("Check that the file or directory exists and the path is correct");
    }

    ErrorContext::new(error.to_string()).with_details(chain_details(&error))
}

fn create_error_context(digest_error: &DigestError, error: &anyhow::Error) -> ErrorContext {
    let ctx = ErrorContext::new(error.to_string());
    match digest_error {
        DigestError::TemplateLookup {
            ..
        } => ctx
            .with_details(chain_details(error))
            .with_suggestion("Check that every configured view path exists and is readable"),
        DigestError::DependencyExtraction {
            ..
        } => ctx
            .with_details(chain_details(error))
            .with_suggestion("Check the template source for unreadable dependency declarations"),
        DigestError::ConfigParse {
            ..
        } => ctx.with_suggestion(
            "Check the TOML syntax of the configuration file. Verify quotes, brackets, and keys",
        ),
        DigestError::InvalidConfig {
            ..
        } => ctx.with_suggestion("Fix the configuration value and run the command again"),
        DigestError::NoViewPaths => ctx.with_suggestion(
            "Pass --view-path <DIR> or set view_paths in viewdigest.toml",
        ),
    }
}

fn chain_details(error: &anyhow::Error) -> String {
    error.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>().join(": ")
}
