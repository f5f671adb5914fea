//! # TrackElo Common Library
//!
//! Shared code for the TrackElo services including:
//! - Database initialization, schema, and migrations
//! - Rating, comparison history, and session models
//! - Rating scope type (global vs. per-playlist)
//! - Settings table access
//! - Configuration loading and root folder resolution
//! - Utility functions

pub mod config;
pub mod db;
pub mod error;
pub mod scope;
pub mod time;

pub use error::{Error, Result};
pub use scope::Scope;
