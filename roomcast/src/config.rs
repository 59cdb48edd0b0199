//! Configuration types and defaults

use roomcast_core::{ChannelMode, EncodingTier};

/// Per-session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How media travels in the channel being joined
    pub mode: ChannelMode,
    /// Subscribe to foreign publications as they are observed. When
    /// disabled the session only records them and the host subscribes
    /// explicitly.
    pub auto_subscribe: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: ChannelMode::Direct,
            auto_subscribe: true,
        }
    }
}

/// The simulcast tiers attached to outgoing video in relayed mode.
///
/// These are policy constants, not computed values: a small tier for
/// bandwidth-constrained subscribers and a much larger one for everyone
/// else.
#[derive(Debug, Clone)]
pub struct EncodingPolicy {
    /// Bandwidth-constrained tier
    pub low: EncodingTier,
    /// Full-quality tier
    pub high: EncodingTier,
}

impl Default for EncodingPolicy {
    fn default() -> Self {
        Self {
            low: EncodingTier::new("low", 10_000),
            high: EncodingTier::new("high", 800_000),
        }
    }
}

impl EncodingPolicy {
    /// Policy with custom tiers
    pub fn new(low: EncodingTier, high: EncodingTier) -> Self {
        Self { low, high }
    }

    /// The ordered tier set attached to a video publish call
    pub fn publish_tiers(&self) -> Vec<EncodingTier> {
        vec![self.low.clone(), self.high.clone()]
    }
}
