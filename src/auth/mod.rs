//! API Key Authentication
//!
//! Research endpoints can be protected with a shared key. The key is never
//! stored in the configuration file: `[auth] api_key_env` names the
//! environment variable that holds it.
//!
//! ```toml
//! [auth]
//! api_key_env = "API_SECRET"
//! ```
//!
//! Clients then send:
//!
//! ```text
//! X-API-Key: <value of API_SECRET>
//! ```
//!
//! When the variable is unset or empty, the check is skipped.

/// Axum middleware validating the `X-API-Key` header.
pub mod middleware;
