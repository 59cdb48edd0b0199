//! Media stream and track handles
//!
//! These are handles to media produced elsewhere (capture or the relay),
//! not media buffers. The orchestration core only needs two things from a
//! stream: its content kind, and the ability to stop its tracks
//! deterministically on teardown. Tracks share their liveness flag across
//! clones so a stop is observable through every handle.

use crate::types::ContentKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Handle to a single media track
#[derive(Debug, Clone)]
pub struct MediaTrack {
    id: Uuid,
    live: Arc<AtomicBool>,
}

impl MediaTrack {
    /// Create a live track
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Track identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether the track is still producing media
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Stop the track, releasing the underlying device or relay resource
    pub fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
    }
}

impl Default for MediaTrack {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a media stream and its tracks
#[derive(Debug, Clone)]
pub struct MediaStream {
    id: Uuid,
    kind: ContentKind,
    tracks: Vec<MediaTrack>,
}

impl MediaStream {
    /// Create a stream of the given kind with a single live track
    pub fn new(kind: ContentKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            tracks: vec![MediaTrack::new()],
        }
    }

    /// Create a stream carrying the given tracks
    pub fn with_tracks(kind: ContentKind, tracks: Vec<MediaTrack>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            tracks,
        }
    }

    /// Stream identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// What this stream carries
    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    /// The stream's tracks
    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    /// Whether any track is still live
    pub fn is_live(&self) -> bool {
        self.tracks.iter().any(MediaTrack::is_live)
    }

    /// Stop every track. Must run before a sink is detached so devices and
    /// relay bandwidth are not held open past logical departure.
    pub fn stop_tracks(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }
}
