//! Solar Lead Relay Library
//!
//! This library provides the core functionality for the solar lead relay:
//! a stateless HTTP service that enriches lead-capture submissions with the
//! solar provider's building insights and forwards the result to a webhook.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `integrations`: External service integrations.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `insights_models`: Building insights document models.
//! - `models`: Submission and relay document models.
//! - `router`: Route table and HTTP middleware.
//! - `services`: External service clients (solar provider, webhook).
//! - `transform`: Building insights → financing summary transformation.

pub mod api;
pub mod core;
pub mod integrations;

// Re-export primary modules for shared use in tests and other binaries
pub mod config;
pub mod errors;
pub mod handlers;
pub mod insights_models;
pub mod models;
pub mod router;
pub mod services;
pub mod transform;
