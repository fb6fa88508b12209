/// Data models for the scanning triggers
pub mod events;

// Re-export commonly used types
pub use events::*;
