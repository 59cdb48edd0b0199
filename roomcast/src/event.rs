//! Session notification feed
//!
//! The session exposes a filtered, deduplicated view of channel activity
//! to its host: membership changes, publications it decided about, and
//! renderer bindings it created. Payloads carry identifiers, never raw
//! service objects.

use roomcast_core::{ContentKind, MemberId, PublicationId};
use tokio::sync::mpsc;

/// Notifications emitted by a [`MediaSession`](crate::MediaSession)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotification {
    /// The local member joined the channel
    LocalJoined {
        /// The local member's identity
        member: MemberId,
    },
    /// A remote member joined the channel
    MemberJoined {
        /// The member that joined
        member: MemberId,
    },
    /// A remote member left; any renderer binding it held is already released
    MemberLeft {
        /// The member that left
        member: MemberId,
    },
    /// A foreign publication was observed in the channel
    StreamPublished {
        /// The publication that appeared
        publication: PublicationId,
        /// Its effective publisher
        publisher: MemberId,
        /// What it carries
        kind: ContentKind,
    },
    /// A stream was attached to a sink for the given publisher
    RendererBound {
        /// Publisher the sink is keyed by
        publisher: MemberId,
        /// Content kind of the attached stream
        kind: ContentKind,
    },
    /// The local member left; all bindings are released. Emitted once per
    /// join, and nothing follows it.
    LocalLeft,
}

impl SessionNotification {
    /// Get the notification type as a string
    pub fn notification_type(&self) -> &'static str {
        match self {
            SessionNotification::LocalJoined { .. } => "local_joined",
            SessionNotification::MemberJoined { .. } => "member_joined",
            SessionNotification::MemberLeft { .. } => "member_left",
            SessionNotification::StreamPublished { .. } => "stream_published",
            SessionNotification::RendererBound { .. } => "renderer_bound",
            SessionNotification::LocalLeft => "local_left",
        }
    }

    /// Check if this is a membership notification
    pub fn is_membership(&self) -> bool {
        matches!(
            self,
            SessionNotification::LocalJoined { .. }
                | SessionNotification::MemberJoined { .. }
                | SessionNotification::MemberLeft { .. }
                | SessionNotification::LocalLeft
        )
    }

    /// Check if this is a media notification
    pub fn is_media(&self) -> bool {
        matches!(
            self,
            SessionNotification::StreamPublished { .. }
                | SessionNotification::RendererBound { .. }
        )
    }
}

/// Stream of session notifications for async iteration
#[derive(Debug)]
pub struct NotificationStream {
    receiver: mpsc::UnboundedReceiver<SessionNotification>,
}

impl NotificationStream {
    pub(crate) fn new(receiver: mpsc::UnboundedReceiver<SessionNotification>) -> Self {
        Self { receiver }
    }

    /// Get the next notification
    pub async fn next(&mut self) -> Option<SessionNotification> {
        self.receiver.recv().await
    }

    /// Try to get the next notification without blocking
    pub fn try_next(&mut self) -> Option<SessionNotification> {
        self.receiver.try_recv().ok()
    }

    /// Close the stream
    pub fn close(&mut self) {
        self.receiver.close();
    }
}
