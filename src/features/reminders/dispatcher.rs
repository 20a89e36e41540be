//! Outbound notification delivery.
//!
//! Invoked by the scheduler core when a job fires: composes the reminder
//! text, attaches a cancellation control to every non-final fire, and hands
//! the payload to the transport. Send failures abandon the attempt; they are
//! logged and never retried.

use log::{error, info};

use crate::transport::{CancelControl, Transport};

use super::controls::{cancel_control_id, ControlRegistry};
use super::error::DeliveryError;
use super::intent::ScheduleIntent;
use super::scheduler::JobFire;

/// Reminder text as delivered to the channel.
pub fn compose_content(intent: &ScheduleIntent) -> String {
    format!(
        "{} {} (courtesy of {})",
        intent.mention, intent.message, intent.requester
    )
}

/// Deliver one fire of a job to its channel.
pub async fn deliver(
    transport: &dyn Transport,
    controls: &ControlRegistry,
    intent: &ScheduleIntent,
    channel_id: u64,
    fire: &JobFire,
) -> Result<(), DeliveryError> {
    let control = if fire.is_last {
        None
    } else {
        let custom_id = cancel_control_id(&fire.tag, fire.run_count);
        controls.register(&custom_id, &fire.tag);
        Some(CancelControl { custom_id })
    };

    match transport
        .send_message(channel_id, &compose_content(intent), intent.tts, control)
        .await
    {
        Ok(()) => {
            info!("Sent reminder for job {} (run {})", fire.tag, fire.run_count);
            Ok(())
        }
        Err(e) => {
            error!("Delivery failed for job {}: {e}", fire.tag);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reminders::intent::Timing;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct Sent {
        channel_id: u64,
        content: String,
        tts: bool,
        control: Option<String>,
    }

    #[derive(Default)]
    struct MockTransport {
        sent: Mutex<Vec<Sent>>,
        fail: bool,
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send_message(
            &self,
            channel_id: u64,
            content: &str,
            tts: bool,
            control: Option<CancelControl>,
        ) -> Result<(), DeliveryError> {
            if self.fail {
                return Err(DeliveryError::TransportFailure("boom".to_string()));
            }
            self.sent.lock().unwrap().push(Sent {
                channel_id,
                content: content.to_string(),
                tts,
                control: control.map(|c| c.custom_id),
            });
            Ok(())
        }
    }

    fn intent() -> ScheduleIntent {
        ScheduleIntent {
            mention: "@everyone".to_string(),
            message: "stretch".to_string(),
            requester: "<@100>".to_string(),
            tts: true,
            timing: Timing::Recurring {
                interval: Duration::from_secs(3600),
                start_at: None,
            },
        }
    }

    fn fire(run_count: u32, is_last: bool) -> JobFire {
        JobFire {
            tag: "9001".to_string(),
            run_count,
            is_last,
        }
    }

    #[test]
    fn test_compose_content() {
        assert_eq!(
            compose_content(&intent()),
            "@everyone stretch (courtesy of <@100>)"
        );
    }

    #[tokio::test]
    async fn test_non_final_fire_attaches_and_registers_control() {
        let transport = MockTransport::default();
        let controls = ControlRegistry::new();

        deliver(&transport, &controls, &intent(), 42, &fire(3, false))
            .await
            .unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].channel_id, 42);
        assert!(sent[0].tts);
        let custom_id = sent[0].control.as_deref().unwrap();
        assert_eq!(custom_id, cancel_control_id("9001", 3));
        assert_eq!(controls.lookup(custom_id), Some("9001".to_string()));
    }

    #[tokio::test]
    async fn test_final_fire_has_no_control() {
        let transport = MockTransport::default();
        let controls = ControlRegistry::new();

        deliver(&transport, &controls, &intent(), 42, &fire(1, true))
            .await
            .unwrap();

        let sent = transport.sent.lock().unwrap();
        assert!(sent[0].control.is_none());
        assert_eq!(controls.lookup(&cancel_control_id("9001", 1)), None);
    }

    #[tokio::test]
    async fn test_transport_failure_is_surfaced() {
        let transport = MockTransport {
            fail: true,
            ..Default::default()
        };
        let controls = ControlRegistry::new();

        let err = deliver(&transport, &controls, &intent(), 42, &fire(1, false))
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::TransportFailure(_)));
    }
}
