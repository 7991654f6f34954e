//! Structured result of a business operation.
//!
//! Policy rejections, authorization failures, missing records and illegal
//! transitions are expected outcomes, not errors: callers must check
//! `success` before assuming the action completed.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Malformed input or a policy limit (streak, capacity).
    Validation,
    /// The acting user may not perform this action.
    Unauthorized,
    /// The target record does not exist.
    NotFound,
    /// The record is not in a state that allows the transition.
    InvalidState,
}

/// A business-rule failure, before it is folded into an [`Outcome`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub kind: FailureKind,
    pub message: String,
}

impl Rejection {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Validation, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FailureKind::NotFound, message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidState, message)
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Outcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Outcome<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            kind: None,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    /// Success without a payload.
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            kind: None,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn fail(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            kind: Some(kind),
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            success: self.success,
            kind: self.kind,
            message: self.message,
            data: self.data.map(f),
        }
    }
}

impl<T> From<Rejection> for Outcome<T> {
    fn from(r: Rejection) -> Self {
        Outcome::fail(r.kind, r.message)
    }
}
