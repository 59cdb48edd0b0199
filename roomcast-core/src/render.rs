//! Renderer binding interface
//!
//! The core never owns a sink's underlying platform resource (a video
//! surface, an audio output). It creates sinks through this trait, binds
//! streams to them, and guarantees a deterministic unbind on every exit
//! path for every binding it created.

use crate::stream::MediaStream;
use crate::types::ContentKind;

/// Platform seam for attaching media streams to output sinks.
///
/// Implementations must stop accepting frames from a stream once
/// [`unbind`](RendererBinder::unbind) runs; the caller stops the stream's
/// tracks before detaching.
pub trait RendererBinder {
    /// Opaque handle to a platform output sink
    type Sink;

    /// Create a sink appropriate to the given content kind
    fn create_sink(&mut self, kind: ContentKind) -> Self::Sink;

    /// Attach a stream to a sink. Re-attaching an already-bound sink
    /// rebinds the source; it is not an error.
    fn bind(&mut self, sink: &mut Self::Sink, stream: &MediaStream);

    /// Detach whatever is bound to the sink and release it
    fn unbind(&mut self, sink: &mut Self::Sink);
}
