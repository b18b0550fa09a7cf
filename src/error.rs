// src/error.rs

//! Unified error handling for the classfetch application.

use std::fmt;

use thiserror::Error;

/// Result type alias for classfetch operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client construction or transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Fetching a specific URL failed
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Category/class discovery error
    #[error("Discovery error: {0}")]
    Discovery(String),

    /// Partition invariant violation: a class resolved to zero or
    /// multiple categories after override application.
    #[error("Class {class} has appeared in {count} categories")]
    Partition { class: String, count: usize },
}

impl AppError {
    /// Create a fetch error carrying the offending URL.
    pub fn fetch(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Fetch {
            url: url.into(),
            source,
        }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a discovery error.
    pub fn discovery(message: impl Into<String>) -> Self {
        Self::Discovery(message.into())
    }

    /// Create a partition invariant error.
    pub fn partition(class: impl Into<String>, count: usize) -> Self {
        Self::Partition {
            class: class.into(),
            count,
        }
    }
}
