/// Scanflow Core - Shared library for the Scanflow image scanning triggers
///
/// This crate contains the event models, configuration resolution, and
/// external service capabilities used by the backend and inline scanning
/// Lambda functions.
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use error::ScanflowError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
