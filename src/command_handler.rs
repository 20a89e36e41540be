//! Application layer: routes inbound Discord events into the reminder core.
//!
//! Messages starting with the trigger word are parsed, validated, and
//! registered with the scheduler; component interactions resolve through
//! the control registry to tag-based cancellation. All parse and scheduling
//! failures are answered with a short reply; nothing here crashes the bot.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{info, warn};
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::channel::Message;
use serenity::model::mention::Mentionable;
use serenity::prelude::Context;

use crate::features::rate_limiting::RateLimiter;
use crate::features::reminders::scheduler::FireCallback;
use crate::features::reminders::{command, dispatcher, intent, ControlRegistry, ReminderScheduler};
use crate::transport::DiscordTransport;

/// Format for the "next reminder at" confirmation reply.
const NEXT_RUN_FORMAT: &str = "%a %b %e %H:%M:%S %Z %Y";

pub struct CommandHandler {
    scheduler: ReminderScheduler,
    controls: ControlRegistry,
    rate_limiter: RateLimiter,
}

impl CommandHandler {
    pub fn new(scheduler: ReminderScheduler) -> Self {
        CommandHandler {
            scheduler,
            controls: ControlRegistry::new(),
            rate_limiter: RateLimiter::new(10, Duration::from_secs(60)),
        }
    }

    pub fn live_count(&self) -> usize {
        self.scheduler.live_count()
    }

    /// Handle one inbound chat message.
    pub async fn handle_message(&self, ctx: &Context, msg: &Message) -> Result<()> {
        if !command::is_trigger(&msg.content) {
            return Ok(());
        }
        info!(
            "Reminder command received from {}: '{}'",
            msg.author.id,
            msg.content.chars().take(100).collect::<String>()
        );

        if !self.rate_limiter.check_rate_limit(&msg.author.id.to_string()) {
            warn!("Rate limit exceeded for user {}", msg.author.id);
            msg.reply(
                &ctx.http,
                "You're sending commands too quickly! Please slow down.",
            )
            .await?;
            return Ok(());
        }

        let author_mention = msg.author.mention().to_string();
        let referenced_author = msg
            .referenced_message
            .as_ref()
            .map(|replied| replied.author.mention().to_string());

        let parsed = match command::parse(
            &msg.content,
            &author_mention,
            referenced_author.as_deref(),
        ) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Could not parse reminder command: {e}");
                msg.reply(&ctx.http, e.user_reply()).await?;
                return Ok(());
            }
        };

        let intent = match intent::build(&parsed, &author_mention) {
            Ok(intent) => Arc::new(intent),
            Err(e) => {
                warn!("Could not build schedule intent: {e}");
                msg.reply(&ctx.http, e.user_reply()).await?;
                return Ok(());
            }
        };

        // The command message id is the job tag: unique per command, and the
        // sole cancellation key.
        let tag = msg.id.to_string();
        let channel_id = msg.channel_id.0;
        let transport = Arc::new(DiscordTransport::new(ctx.http.clone()));
        let controls = self.controls.clone();
        let fire_intent = intent.clone();
        let on_fire: FireCallback = Arc::new(move |fire| {
            let transport = transport.clone();
            let controls = controls.clone();
            let intent = fire_intent.clone();
            Box::pin(async move {
                // Failures abandon this attempt only; the job keeps running.
                let _ =
                    dispatcher::deliver(transport.as_ref(), &controls, &intent, channel_id, &fire)
                        .await;
            })
        });

        match self.scheduler.schedule(intent.as_ref(), tag, on_fire) {
            Ok(handle) => {
                msg.reply(
                    &ctx.http,
                    format!(
                        "Reminder set! Next reminder at: {}",
                        handle.next_run.format(NEXT_RUN_FORMAT)
                    ),
                )
                .await?;
                info!("Reminder set for job {}", handle.tag);
            }
            Err(e) => {
                warn!("Scheduling failed: {e}");
                msg.reply(&ctx.http, e.user_reply()).await?;
            }
        }
        Ok(())
    }

    /// Handle a pressed message component.
    pub async fn handle_component(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
    ) -> Result<()> {
        let custom_id = &interaction.data.custom_id;
        let Some(tag) = self.controls.lookup(custom_id) else {
            warn!("Unknown component interaction: {custom_id}");
            respond(ctx, interaction, "Unknown component interaction.").await?;
            return Ok(());
        };

        let removed = self.scheduler.cancel(&tag);
        self.controls.remove_for_tag(&tag);
        if removed {
            info!("Reminder removed via control {custom_id}");
            respond(ctx, interaction, "Removed reminder!").await?;
        } else {
            respond(ctx, interaction, "That reminder is already gone.").await?;
        }
        Ok(())
    }
}

async fn respond(
    ctx: &Context,
    interaction: &MessageComponentInteraction,
    content: &str,
) -> Result<()> {
    interaction
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| message.content(content))
        })
        .await?;
    Ok(())
}
