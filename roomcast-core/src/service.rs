//! Media session service interface
//!
//! Everything behind this trait is the service's concern: signaling,
//! SFU internals, ICE, wire formats. The orchestration core only sees
//! the operations and the event feed defined here.

use crate::error::RoomcastError;
use crate::stream::MediaStream;
use crate::types::{
    BotId, ChannelId, ChannelInfo, ChannelMode, EncodingTier, MemberId, MemberInfo, Publication,
    PublicationId, SubscriptionId,
};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// The local member's view of an established subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionInfo {
    /// Subscription identifier
    pub id: SubscriptionId,
    /// The publication this subscription is bound to
    pub publication: Publication,
    /// Currently preferred encoding tier, if the publication is multi-tier
    pub preferred_encoding: Option<String>,
}

/// Result of a successful subscribe call
#[derive(Debug, Clone)]
pub struct SubscribeOutcome {
    /// The stream the subscription yields
    pub stream: MediaStream,
    /// The subscription handle
    pub subscription: SubscriptionInfo,
}

/// Events delivered by the service, in arrival order.
///
/// Each variant carries a fixed payload shape; handlers resolve them by
/// pattern match, never by ad hoc field probing.
#[derive(Debug, Clone)]
pub enum ServiceEvent {
    /// A member joined the channel
    MemberJoined {
        /// The member that joined
        member: MemberInfo,
    },
    /// A member left the channel
    MemberLeft {
        /// The member that left
        member: MemberInfo,
    },
    /// A publication became available in the channel
    StreamPublished {
        /// The new publication
        publication: Publication,
    },
    /// The local member's subscription to a publication was established
    PublicationSubscribed {
        /// The subscription that was established
        subscription: SubscriptionInfo,
    },
    /// The local member left the channel. Fires once per join.
    Left,
}

impl ServiceEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            ServiceEvent::MemberJoined { .. } => "member_joined",
            ServiceEvent::MemberLeft { .. } => "member_left",
            ServiceEvent::StreamPublished { .. } => "stream_published",
            ServiceEvent::PublicationSubscribed { .. } => "publication_subscribed",
            ServiceEvent::Left => "left",
        }
    }
}

/// Abstract media session service.
///
/// All calls may suspend; while a call is in flight the service may queue
/// further events on the feed, which are delivered in arrival order once
/// the consumer resumes. Errors are returned to the specific operation
/// that triggered them and are never retried here.
#[async_trait]
pub trait MediaSessionService: Send + Sync {
    /// Find a channel by name, creating it if absent. Idempotent: two
    /// lookups with the same name yield the same channel.
    async fn find_or_create_channel(
        &self,
        name: &str,
        mode: ChannelMode,
    ) -> Result<ChannelInfo, RoomcastError>;

    /// Join a channel, creating the local member
    async fn join(&self, channel: &ChannelId) -> Result<MemberInfo, RoomcastError>;

    /// Publications currently present in the channel
    async fn list_publications(
        &self,
        channel: &ChannelId,
    ) -> Result<Vec<Publication>, RoomcastError>;

    /// Publish a local stream, optionally with simulcast encoding tiers
    async fn publish(
        &self,
        member: &MemberId,
        stream: MediaStream,
        encodings: Vec<EncodingTier>,
    ) -> Result<Publication, RoomcastError>;

    /// Subscribe the local member to a publication
    async fn subscribe(
        &self,
        member: &MemberId,
        publication: &PublicationId,
    ) -> Result<SubscribeOutcome, RoomcastError>;

    /// Leave the channel. The service answers with a `MemberLeft` event for
    /// the local member followed by a one-shot `Left` event.
    async fn leave(&self, member: &MemberId) -> Result<(), RoomcastError>;

    /// Release the local handle on a channel after leaving it
    async fn dispose_channel(&self, channel: &ChannelId) -> Result<(), RoomcastError>;

    /// Relay bots currently attached to the channel
    async fn list_bots(&self, channel: &ChannelId) -> Result<Vec<BotId>, RoomcastError>;

    /// Create a relay bot in the channel
    async fn create_bot(&self, channel: &ChannelId) -> Result<BotId, RoomcastError>;

    /// Ask a bot to re-publish a publication, returning the forwarded
    /// publication (its origin references the original publisher)
    async fn start_forwarding(
        &self,
        bot: &BotId,
        publication: &PublicationId,
    ) -> Result<Publication, RoomcastError>;

    /// Ask the service to renegotiate a subscription to the given tier.
    /// Completion is asynchronous on the service side; rendering continues
    /// on the existing sink meanwhile.
    async fn change_preferred_encoding(
        &self,
        subscription: &SubscriptionId,
        tier: &str,
    ) -> Result<(), RoomcastError>;

    /// Take the service event feed. Single consumer; the feed preserves
    /// arrival order. A second call returns a feed that yields nothing.
    fn events(&self) -> mpsc::UnboundedReceiver<ServiceEvent>;
}
