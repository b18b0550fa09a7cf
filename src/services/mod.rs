//! Service layer for the classfetch application.
//!
//! This module contains the network-facing logic:
//! - Cache-backed page fetching (`WikiFetcher`)
//! - Category discovery with pagination (`categories`)
//! - Canonical class list extraction (`classes`)
//! - Per-class metadata mining (`metadata`)

pub mod categories;
pub mod classes;
mod fetch;
pub mod metadata;

pub use fetch::WikiFetcher;
