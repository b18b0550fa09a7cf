// src/lib.rs

//! classfetch library
//!
//! Scrapes the ZDoom wiki for Doom actor classes and their categories,
//! resolves every class to a single primary category, and renders the
//! result as a generated C++ header.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
