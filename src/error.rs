//! Error types for the stamping policy.
//!
//! This module provides idiomatic Rust error types using thiserror. The
//! policy surfaces exactly one error kind: a misconfigured rule table. Every
//! runtime problem (missing session, failed session start, absent actor id)
//! is absorbed into an absent stamp value instead, so a broken session never
//! blocks a save.

use thiserror::Error;

/// The only error the stamping policy raises.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// A rule's condition string is not one of the recognized spellings.
    ///
    /// This is a configuration mistake, not a runtime condition: it aborts
    /// processing of the remaining fields for the event and propagates to
    /// the caller.
    #[error(
        "condition should be one of \"always\", \"new\" or \"existing\"; \
         the value \"{value}\" for field \"{field}\" in event \"{event}\" is invalid"
    )]
    InvalidCondition {
        event: String,
        field: String,
        value: String,
    },
}
