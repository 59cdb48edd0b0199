//! Encoding tier control
//!
//! A subscription over a multi-tier video stream in relayed mode can be
//! flipped between the low and high simulcast tiers. The flip is a
//! fire-and-forget request: the service renegotiates the forwarding
//! asynchronously and rendering continues on the existing sink meanwhile.

use crate::config::EncodingPolicy;
use roomcast_core::{MediaSessionService, RoomcastError, SubscriptionId};
use tracing::debug;

/// Tier state tracked for one togglable video subscription
#[derive(Debug, Clone)]
pub(crate) struct TierHandle {
    pub(crate) subscription: SubscriptionId,
    pub(crate) preferred: Option<String>,
}

/// Flips a subscription's preferred encoding tier between low and high
#[derive(Debug)]
pub struct EncodingTierController {
    policy: EncodingPolicy,
}

impl EncodingTierController {
    /// Controller using the given tier policy
    pub fn new(policy: EncodingPolicy) -> Self {
        Self { policy }
    }

    /// The tier policy this controller flips between
    pub fn policy(&self) -> &EncodingPolicy {
        &self.policy
    }

    /// Binary toggle: a subscription currently preferring `low` moves to
    /// `high`; anything else, including an unset preference, moves to
    /// `low`. Returns the tier that was requested. On failure the tracked
    /// preference is left unchanged and rendering is unaffected.
    pub(crate) async fn toggle<S>(
        &self,
        service: &S,
        handle: &mut TierHandle,
    ) -> Result<String, RoomcastError>
    where
        S: MediaSessionService + ?Sized,
    {
        let next = if handle.preferred.as_deref() == Some(self.policy.low.id.as_str()) {
            self.policy.high.id.clone()
        } else {
            self.policy.low.id.clone()
        };

        service
            .change_preferred_encoding(&handle.subscription, &next)
            .await?;

        debug!(
            subscription = %handle.subscription,
            from = handle.preferred.as_deref().unwrap_or("unset"),
            to = %next,
            "🎚️ Preferred encoding changed"
        );
        handle.preferred = Some(next.clone());
        Ok(next)
    }
}
