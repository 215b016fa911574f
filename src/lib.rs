//! Phone Trust API Library
//!
//! This library provides the core functionality for the Phone Trust API: the
//! spam-reputation and OTP-verification endpoints that proxy Twilio's Lookup
//! and Verify services.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and router assembly.
//! - `models`: Request/response models and the spam score mapping.
//! - `twilio`: Twilio REST API client.

// Re-export primary modules for shared use in tests and other binaries
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod twilio;
