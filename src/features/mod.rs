//! Feature modules.

pub mod rate_limiting;
pub mod reminders;

pub use rate_limiting::RateLimiter;
pub use reminders::ReminderScheduler;
