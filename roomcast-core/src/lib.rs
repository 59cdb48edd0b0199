//! # Roomcast Core
//!
//! Data model and external interface boundary for the roomcast session
//! orchestration core. This crate defines the identifiers and value types
//! shared across the workspace, the [`MediaSessionService`] seam behind
//! which signaling, SFU relaying, and transport live, and the
//! [`RendererBinder`] seam behind which platform rendering lives.
//!
//! The orchestration logic itself lives in the `roomcast` crate; nothing
//! in this crate talks to a network or a display.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod render;
pub mod service;
pub mod stream;
pub mod types;

// Re-export main types
pub use error::RoomcastError;
pub use render::RendererBinder;
pub use service::{MediaSessionService, ServiceEvent, SubscribeOutcome, SubscriptionInfo};
pub use stream::{MediaStream, MediaTrack};
pub use types::{
    BotId, ChannelId, ChannelInfo, ChannelMode, ContentKind, EncodingTier, MemberId, MemberInfo,
    MemberKind, Publication, PublicationId, SubscriptionId,
};
