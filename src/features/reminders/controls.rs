//! Cancellation control registry.
//!
//! Every non-final fire of a job attaches a "Remove reminder" control whose
//! custom id combines the job tag with the fire's run count, so each fire's
//! control is distinct. The registry maps those custom ids back to job tags
//! for the transport layer's interaction events; it replaces registering a
//! one-shot interaction handler per fire.

use std::sync::Arc;

use dashmap::DashMap;

/// Custom id prefix for cancellation controls.
pub const CANCEL_CONTROL_PREFIX: &str = "cancel_reminder_";

/// Composite custom id for one fire's control.
pub fn cancel_control_id(tag: &str, run_count: u32) -> String {
    format!("{CANCEL_CONTROL_PREFIX}{tag}_{run_count}")
}

/// Pending cancellation controls, keyed by custom id.
#[derive(Clone, Default)]
pub struct ControlRegistry {
    pending: Arc<DashMap<String, String>>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, custom_id: &str, tag: &str) {
        self.pending
            .insert(custom_id.to_string(), tag.to_string());
    }

    /// Job tag for a pressed control, if it is one of ours.
    pub fn lookup(&self, custom_id: &str) -> Option<String> {
        self.pending.get(custom_id).map(|entry| entry.clone())
    }

    /// Drop every control registered for `tag`. Returns how many were
    /// removed. Called on cancellation so stale controls stop resolving.
    pub fn remove_for_tag(&self, tag: &str) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, t| t != tag);
        before - self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_ids_distinct_per_fire() {
        let first = cancel_control_id("9001", 1);
        let second = cancel_control_id("9001", 2);
        assert_ne!(first, second);
        assert!(first.starts_with(CANCEL_CONTROL_PREFIX));
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = ControlRegistry::new();
        let id = cancel_control_id("9001", 1);
        registry.register(&id, "9001");

        assert_eq!(registry.lookup(&id), Some("9001".to_string()));
        assert_eq!(registry.lookup("cancel_reminder_9002_1"), None);
    }

    #[test]
    fn test_remove_for_tag_purges_all_runs() {
        let registry = ControlRegistry::new();
        for run in 1..=3 {
            registry.register(&cancel_control_id("9001", run), "9001");
        }
        registry.register(&cancel_control_id("9002", 1), "9002");

        assert_eq!(registry.remove_for_tag("9001"), 3);
        assert_eq!(registry.lookup(&cancel_control_id("9001", 2)), None);
        assert_eq!(
            registry.lookup(&cancel_control_id("9002", 1)),
            Some("9002".to_string())
        );
    }
}
