//! Narrow seams to the chat transport and the presence indicator.
//!
//! The reminder core only ever talks to Discord through the [`Transport`]
//! and [`Presence`] traits; the serenity-backed implementations live here so
//! the core stays mockable in tests.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use log::warn;
use serenity::client::bridge::gateway::ShardMessenger;
use serenity::http::Http;
use serenity::model::application::component::ButtonStyle;
use serenity::model::gateway::Activity;
use serenity::model::id::ChannelId;

use crate::features::reminders::error::DeliveryError;

/// Label shown on cancellation controls.
pub const CANCEL_BUTTON_LABEL: &str = "Remove reminder";

/// A single cancellation control to attach to an outbound message.
#[derive(Debug, Clone)]
pub struct CancelControl {
    pub custom_id: String,
}

/// Outbound message channel consumed by the notification dispatcher.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_message(
        &self,
        channel_id: u64,
        content: &str,
        tts: bool,
        control: Option<CancelControl>,
    ) -> Result<(), DeliveryError>;
}

/// Presence indicator fed with the live-reminder count.
pub trait Presence: Send + Sync {
    fn set_live_count(&self, count: usize);
}

/// Discord-backed transport over the serenity HTTP client.
pub struct DiscordTransport {
    http: Arc<Http>,
}

impl DiscordTransport {
    pub fn new(http: Arc<Http>) -> Self {
        DiscordTransport { http }
    }
}

#[async_trait]
impl Transport for DiscordTransport {
    async fn send_message(
        &self,
        channel_id: u64,
        content: &str,
        tts: bool,
        control: Option<CancelControl>,
    ) -> Result<(), DeliveryError> {
        ChannelId(channel_id)
            .send_message(&self.http, |message| {
                message.content(content).tts(tts);
                if let Some(control) = control {
                    message.components(|components| {
                        components.create_action_row(|row| {
                            row.create_button(|button| {
                                button
                                    .custom_id(control.custom_id)
                                    .label(CANCEL_BUTTON_LABEL)
                                    .style(ButtonStyle::Danger)
                            })
                        })
                    });
                }
                message
            })
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError::TransportFailure(e.to_string()))
    }
}

/// Discord presence backed by the gateway shard.
///
/// The shard messenger only exists once the gateway is ready, so it is
/// attached late; updates before that are dropped with a warning.
#[derive(Default)]
pub struct DiscordPresence {
    shard: RwLock<Option<ShardMessenger>>,
}

impl DiscordPresence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, shard: ShardMessenger) {
        if let Ok(mut guard) = self.shard.write() {
            *guard = Some(shard);
        }
    }
}

impl Presence for DiscordPresence {
    fn set_live_count(&self, count: usize) {
        let Ok(guard) = self.shard.read() else {
            return;
        };
        match guard.as_ref() {
            Some(shard) => {
                shard.set_activity(Some(Activity::playing(format!("{count} reminders!"))));
            }
            None => warn!("Presence update ({count} reminders) before the gateway is ready"),
        }
    }
}
