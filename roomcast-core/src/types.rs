//! Identifiers and value types shared across the workspace

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Short prefix of the identifier, for log lines and user-facing feeds
            pub fn short(&self) -> String {
                self.0.to_string().chars().take(5).collect()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_type! {
    /// Identifies a channel (a named communication scope)
    ChannelId
}
id_type! {
    /// Identifies a member of a channel
    MemberId
}
id_type! {
    /// Identifies a single outgoing publication
    PublicationId
}
id_type! {
    /// Identifies the local member's subscription to a remote publication
    SubscriptionId
}
id_type! {
    /// Identifies a relay bot attached to a channel
    BotId
}

/// How media travels between members of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelMode {
    /// Full mesh; every member exchanges media directly with every other member
    Direct,
    /// Media is forwarded through a relay bot; members subscribe to the bot
    Relayed,
}

/// Content carried by a publication or stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentKind {
    /// Audio media
    Audio,
    /// Video media
    Video,
    /// Arbitrary non-media payloads; never rendered
    Data,
}

/// Role of a channel member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberKind {
    /// A regular participant
    Ordinary,
    /// A server-side relay bot that re-publishes other members' streams
    RelayBot,
}

/// One named bitrate-limited variant of a video publication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingTier {
    /// Tier name, e.g. `low` or `high`
    pub id: String,
    /// Maximum bitrate for this tier, in bits per second
    pub max_bitrate: u32,
}

impl EncodingTier {
    /// Create a tier with the given name and bitrate ceiling
    pub fn new(id: impl Into<String>, max_bitrate: u32) -> Self {
        Self {
            id: id.into(),
            max_bitrate,
        }
    }
}

/// A member of a channel as reported by the media session service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    /// Stable member identifier
    pub id: MemberId,
    /// Whether this member is a participant or a relay bot
    pub kind: MemberKind,
}

impl MemberInfo {
    /// An ordinary participant with the given id
    pub fn ordinary(id: MemberId) -> Self {
        Self {
            id,
            kind: MemberKind::Ordinary,
        }
    }

    /// A relay bot member with the given id
    pub fn relay_bot(id: MemberId) -> Self {
        Self {
            id,
            kind: MemberKind::RelayBot,
        }
    }
}

/// One outgoing media stream owned by a member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    /// Publication identifier
    pub id: PublicationId,
    /// The member that owns this publication
    pub publisher: MemberId,
    /// What the publication carries
    pub kind: ContentKind,
    /// For a relay forwarding, the original non-bot publisher
    pub origin: Option<MemberId>,
    /// Simulcast tiers, in ascending quality order; empty for single-encoding media
    pub encodings: Vec<EncodingTier>,
}

impl Publication {
    /// The identity that actually produced this media.
    ///
    /// For a relay forwarding this is the origin publisher; otherwise the
    /// direct publisher. Subscription decisions and renderer bindings key
    /// off this identity so a bot re-forwarding a publisher's stream
    /// collapses to a single record.
    pub fn effective_publisher(&self) -> MemberId {
        self.origin.unwrap_or(self.publisher)
    }

    /// Whether this publication carries more than one encoding tier
    pub fn is_multi_tier(&self) -> bool {
        self.encodings.len() > 1
    }
}

/// A channel as reported by the media session service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Channel identifier
    pub id: ChannelId,
    /// Channel name used for find-or-create lookup
    pub name: String,
    /// How media travels in this channel
    pub mode: ChannelMode,
}
