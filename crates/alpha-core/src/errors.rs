//! Structured error types shared across Alpha crates.

use std::collections::{BTreeMap, TryReserveError};
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`AlphaError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (node identifiers, depths, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Discriminant of an [`AlphaError`], convenient for matching without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// See [`AlphaError::InvalidArgument`].
    InvalidArgument,
    /// See [`AlphaError::NotFound`].
    NotFound,
    /// See [`AlphaError::OutOfMemory`].
    OutOfMemory,
    /// See [`AlphaError::Fatal`].
    Fatal,
}

/// Canonical error type for the Alpha engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", content = "detail")]
pub enum AlphaError {
    /// A structural precondition was violated. The tree is untouched.
    #[error("invalid argument: {0}")]
    InvalidArgument(ErrorInfo),
    /// An identity lookup in a child list failed.
    #[error("not found: {0}")]
    NotFound(ErrorInfo),
    /// Storage could not grow during a single atomic step. The tree is untouched.
    #[error("out of memory: {0}")]
    OutOfMemory(ErrorInfo),
    /// A composite operation failed midway. The graph must be treated as invalid.
    #[error("fatal: {0}")]
    Fatal(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl AlphaError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            AlphaError::InvalidArgument(info)
            | AlphaError::NotFound(info)
            | AlphaError::OutOfMemory(info)
            | AlphaError::Fatal(info) => info,
        }
    }

    /// Returns the error discriminant.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AlphaError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            AlphaError::NotFound(_) => ErrorKind::NotFound,
            AlphaError::OutOfMemory(_) => ErrorKind::OutOfMemory,
            AlphaError::Fatal(_) => ErrorKind::Fatal,
        }
    }

    /// Shorthand for an [`AlphaError::InvalidArgument`] with the given code.
    pub fn invalid(code: impl Into<String>, message: impl Into<String>) -> Self {
        AlphaError::InvalidArgument(ErrorInfo::new(code, message))
    }

    /// Adds a context entry to the payload, keeping the variant.
    pub fn with_context(self, key: impl Into<String>, value: impl ToString) -> Self {
        let value = value.to_string();
        match self {
            AlphaError::InvalidArgument(info) => {
                AlphaError::InvalidArgument(info.with_context(key, value))
            }
            AlphaError::NotFound(info) => AlphaError::NotFound(info.with_context(key, value)),
            AlphaError::OutOfMemory(info) => AlphaError::OutOfMemory(info.with_context(key, value)),
            AlphaError::Fatal(info) => AlphaError::Fatal(info.with_context(key, value)),
        }
    }

    /// Attaches a remediation hint to the payload, keeping the variant.
    pub fn with_hint(self, hint: impl Into<String>) -> Self {
        match self {
            AlphaError::InvalidArgument(info) => AlphaError::InvalidArgument(info.with_hint(hint)),
            AlphaError::NotFound(info) => AlphaError::NotFound(info.with_hint(hint)),
            AlphaError::OutOfMemory(info) => AlphaError::OutOfMemory(info.with_hint(hint)),
            AlphaError::Fatal(info) => AlphaError::Fatal(info.with_hint(hint)),
        }
    }

    /// Re-labels the error as [`AlphaError::Fatal`], keeping its payload.
    pub fn into_fatal(self) -> Self {
        match self {
            AlphaError::Fatal(info) => AlphaError::Fatal(info),
            other => {
                let info = other.info().clone();
                AlphaError::Fatal(info)
            }
        }
    }
}

impl From<TryReserveError> for AlphaError {
    fn from(err: TryReserveError) -> Self {
        AlphaError::OutOfMemory(
            ErrorInfo::new("alloc-failed", "child storage could not grow")
                .with_context("reason", err.to_string()),
        )
    }
}
