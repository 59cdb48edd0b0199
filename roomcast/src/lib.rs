//! # Roomcast
//!
//! Session orchestration core for real-time media channels. A participant
//! joins a named channel in mesh (`Direct`) or SFU (`Relayed`) mode,
//! publishes audio/video, and the session takes over from there: it
//! subscribes to every foreign publication, collapses each publisher to a
//! single renderer record, coordinates the one relay bot per channel, and
//! releases every bound resource deterministically on departure.
//!
//! Signaling/SFU transport and platform rendering stay behind the
//! [`MediaSessionService`] and [`RendererBinder`] seams from
//! `roomcast-core`; this crate contains no I/O of its own.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use roomcast::{ChannelMode, MediaStream, Roomcast};
//! use roomcast_core::ContentKind;
//!
//! # async fn example(service: impl roomcast_core::MediaSessionService + 'static,
//! #                  binder: impl roomcast_core::RendererBinder) -> Result<(), roomcast::RoomcastError> {
//! let roomcast = Roomcast::new(service);
//! let mut session = roomcast
//!     .session("room-a")
//!     .mode(ChannelMode::Relayed)
//!     .join(binder)
//!     .await?;
//!
//! session.publish_audio(MediaStream::new(ContentKind::Audio)).await?;
//! session.publish_video(MediaStream::new(ContentKind::Video)).await?;
//!
//! session.run_until_left().await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod bot;
pub mod config;
pub mod encoding;
pub mod event;
pub mod session;

// Re-export main API types
pub use bot::RelayBotCoordinator;
pub use config::{EncodingPolicy, SessionConfig};
pub use encoding::EncodingTierController;
pub use event::{NotificationStream, SessionNotification};
pub use session::{MediaSession, PublicationPhase};

// Re-export the interface boundary for convenience
pub use roomcast_core::{
    ChannelMode, ContentKind, MediaSessionService, MediaStream, RendererBinder, RoomcastError,
};

use std::sync::Arc;

/// Main entry point: holds the service handle and builds sessions
#[derive(Debug)]
pub struct Roomcast<S>
where
    S: MediaSessionService,
{
    service: Arc<S>,
}

impl<S> Roomcast<S>
where
    S: MediaSessionService,
{
    /// Wrap a media session service
    pub fn new(service: S) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Wrap an already shared service handle
    pub fn with_shared(service: Arc<S>) -> Self {
        Self { service }
    }

    /// Start building a session for the named channel
    pub fn session(&self, channel_name: &str) -> SessionBuilder<S> {
        SessionBuilder::new(Arc::clone(&self.service), channel_name)
    }
}

/// Fluent builder for session configuration and joining
#[derive(Debug)]
pub struct SessionBuilder<S>
where
    S: MediaSessionService,
{
    service: Arc<S>,
    channel_name: String,
    config: SessionConfig,
    policy: EncodingPolicy,
}

impl<S> SessionBuilder<S>
where
    S: MediaSessionService,
{
    pub(crate) fn new(service: Arc<S>, channel_name: &str) -> Self {
        Self {
            service,
            channel_name: channel_name.to_string(),
            config: SessionConfig::default(),
            policy: EncodingPolicy::default(),
        }
    }

    /// Set the channel mode (direct mesh or relayed)
    pub fn mode(mut self, mode: ChannelMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Control automatic subscription to foreign publications
    pub fn auto_subscribe(mut self, enabled: bool) -> Self {
        self.config.auto_subscribe = enabled;
        self
    }

    /// Override the simulcast tier policy for relayed video
    pub fn encoding_policy(mut self, policy: EncodingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Join the channel with the current configuration, binding renderers
    /// through the given binder
    pub async fn join<B>(self, binder: B) -> Result<MediaSession<S, B>, RoomcastError>
    where
        B: RendererBinder,
    {
        if self.channel_name.is_empty() {
            return Err(RoomcastError::Setup {
                reason: "channel name must not be empty".to_string(),
            });
        }
        MediaSession::join_internal(
            self.service,
            self.channel_name,
            self.config,
            self.policy,
            binder,
        )
        .await
    }
}
