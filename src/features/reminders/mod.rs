//! # Reminders Feature
//!
//! Natural-language `remind` commands turned into one-shot or recurring
//! timer jobs, with interactive cancellation controls on every recurring
//! delivery.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod command;
pub mod controls;
pub mod dispatcher;
pub mod error;
pub mod intent;
pub mod scheduler;
pub mod timeparse;

pub use controls::ControlRegistry;
pub use error::{DeliveryError, ParseError, SchedulerError, TimeError};
pub use intent::{FireTime, ScheduleIntent, Timing};
pub use scheduler::{FireCallback, JobFire, JobHandle, ReminderScheduler};
