//! Relay bot coordination
//!
//! A relayed channel uses exactly one forwarding bot. The coordinator
//! discovers an existing bot or creates one, then reuses that reference
//! for the rest of the session. It never destroys the bot; the channel
//! owns it.

use roomcast_core::{BotId, ChannelId, MediaSessionService, RoomcastError};
use tracing::{debug, info};

/// Ensures at most one relay bot reference per session
#[derive(Debug, Default)]
pub struct RelayBotCoordinator {
    cached: Option<BotId>,
}

impl RelayBotCoordinator {
    /// Coordinator with no bot discovered yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the channel's relay bot, creating one only if the channel has
    /// none. Idempotent within a session: a second call returns the same
    /// reference without touching the service. On a creation failure no
    /// reference is cached, so a retry re-attempts creation.
    pub async fn ensure_bot<S>(
        &mut self,
        service: &S,
        channel: &ChannelId,
    ) -> Result<BotId, RoomcastError>
    where
        S: MediaSessionService + ?Sized,
    {
        if let Some(bot) = self.cached {
            debug!(%bot, "🤖 Reusing relay bot");
            return Ok(bot);
        }

        let existing = service.list_bots(channel).await?;
        let bot = match existing.first() {
            Some(bot) => {
                debug!(%bot, "🤖 Found existing relay bot");
                *bot
            }
            None => {
                let bot = service.create_bot(channel).await?;
                info!(%bot, %channel, "🤖 Created relay bot");
                bot
            }
        };

        self.cached = Some(bot);
        Ok(bot)
    }

    /// The bot reference held by this coordinator, if any
    pub fn cached(&self) -> Option<BotId> {
        self.cached
    }
}
