// Core layer - configuration
pub mod core;

// Features layer - all feature modules
pub mod features;

// Transport seams - Discord-backed Transport and Presence implementations
pub mod transport;

// Application layer
pub mod command_handler;

// Re-export core config for convenience
pub use crate::core::Config;

// Re-export feature items
pub use features::{RateLimiter, ReminderScheduler};
