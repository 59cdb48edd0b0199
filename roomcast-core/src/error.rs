//! Error types for roomcast

use crate::types::{ChannelId, MemberId, PublicationId, SubscriptionId};
use thiserror::Error;

/// Main error type for roomcast operations
#[derive(Error, Debug)]
pub enum RoomcastError {
    /// Startup failed before any channel work happened (bad credentials,
    /// service unreachable). Fatal; the core never retries.
    #[error("Session setup failed: {reason}")]
    Setup {
        /// Reason for setup failure
        reason: String,
    },

    /// Channel lookup or creation failed
    #[error("Channel lookup failed for {name:?}: {reason}")]
    ChannelLookup {
        /// Channel name that was requested
        name: String,
        /// Reason for lookup failure
        reason: String,
    },

    /// Joining a channel failed
    #[error("Join failed for channel {channel}: {reason}")]
    Join {
        /// Channel that could not be joined
        channel: ChannelId,
        /// Reason for join failure
        reason: String,
    },

    /// Publishing a local stream failed
    #[error("Publish failed for member {member}: {reason}")]
    Publish {
        /// Member that attempted to publish
        member: MemberId,
        /// Reason for publish failure
        reason: String,
    },

    /// Subscribing to a remote publication failed
    #[error("Subscribe failed for publication {publication}: {reason}")]
    Subscribe {
        /// Publication that could not be subscribed
        publication: PublicationId,
        /// Reason for subscribe failure
        reason: String,
    },

    /// Leaving the channel failed
    #[error("Leave failed for member {member}: {reason}")]
    Leave {
        /// Member that attempted to leave
        member: MemberId,
        /// Reason for leave failure
        reason: String,
    },

    /// Relay bot creation failed. No bot reference is cached on this path,
    /// so a later retry re-attempts creation.
    #[error("Bot creation failed for channel {channel}: {reason}")]
    BotCreation {
        /// Channel the bot was requested for
        channel: ChannelId,
        /// Reason for creation failure
        reason: String,
    },

    /// Starting a relay forwarding failed
    #[error("Forwarding failed for publication {publication}: {reason}")]
    Forwarding {
        /// Publication that could not be forwarded
        publication: PublicationId,
        /// Reason for forwarding failure
        reason: String,
    },

    /// Changing a subscription's preferred encoding tier failed. Non-fatal;
    /// the current rendering is unaffected.
    #[error("Encoding change to {tier:?} failed for subscription {subscription}: {reason}")]
    EncodingChange {
        /// Subscription the change targeted
        subscription: SubscriptionId,
        /// Requested tier id
        tier: String,
        /// Reason for the failure
        reason: String,
    },

    /// No tier toggle is available for the given publisher (not a
    /// multi-tier video subscription, or the channel is not relayed)
    #[error("No encoding tier toggle available for publisher {member}")]
    TierToggleUnavailable {
        /// Publisher whose rendering was clicked
        member: MemberId,
    },

    /// An operation was attempted in the wrong lifecycle state
    #[error("Invalid state: expected {expected}, got {actual}")]
    InvalidState {
        /// Expected state
        expected: String,
        /// Actual state
        actual: String,
    },

    /// Transport-level service failure not tied to a single operation
    #[error("Media session service error: {reason}")]
    Service {
        /// Reason for the service failure
        reason: String,
    },
}
