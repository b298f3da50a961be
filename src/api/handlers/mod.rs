//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Session snapshot and event stream handlers.
pub mod activity;
/// Health and model listing handlers.
pub mod health;
/// Research run handlers.
pub mod research;
