//! Media session management
//!
//! [`MediaSession`] is the orchestration state machine for one joined
//! channel. It tracks every publication it observes, decides which ones to
//! subscribe to, keys renderer bindings by effective publisher so
//! duplicate sources collapse to one sink, and releases everything
//! deterministically on departure.
//!
//! All state here is mutated on the session's own event-handling path;
//! processing is single-consumer and cooperative, so no locking is needed
//! beyond event arrival order.

use crate::bot::RelayBotCoordinator;
use crate::config::{EncodingPolicy, SessionConfig};
use crate::encoding::{EncodingTierController, TierHandle};
use crate::event::{NotificationStream, SessionNotification};
use roomcast_core::{
    ChannelInfo, ChannelMode, ContentKind, EncodingTier, MediaSessionService, MediaStream,
    MemberId, MemberInfo, Publication, PublicationId, RendererBinder, RoomcastError, ServiceEvent,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Lifecycle of one observed publication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicationPhase {
    /// Known but not subscribed (self-publications never leave this phase)
    Observed,
    /// Subscribe call in flight
    Subscribing,
    /// Subscription established
    Subscribed,
    /// Publisher left or the session tore down
    Released,
}

#[derive(Debug)]
struct TrackedPublication {
    publication: Publication,
    phase: PublicationPhase,
}

struct BoundSink<K> {
    sink: K,
    stream: MediaStream,
}

/// Publisher-keyed renderer record: at most one per distinct publisher,
/// with per-kind sink slots underneath.
struct RendererBinding<K> {
    video: Option<BoundSink<K>>,
    audio: Option<BoundSink<K>>,
    tier: Option<TierHandle>,
}

impl<K> RendererBinding<K> {
    fn new() -> Self {
        Self {
            video: None,
            audio: None,
            tier: None,
        }
    }

    /// Attach a stream to the slot matching its kind, creating the sink on
    /// first use. Re-attaching rebinds the source on the existing sink.
    fn attach<B>(&mut self, binder: &mut B, stream: MediaStream)
    where
        B: RendererBinder<Sink = K>,
    {
        let kind = stream.kind();
        let slot = match kind {
            ContentKind::Video => &mut self.video,
            ContentKind::Audio => &mut self.audio,
            ContentKind::Data => return,
        };
        match slot {
            Some(bound) => {
                binder.bind(&mut bound.sink, &stream);
                bound.stream = stream;
            }
            None => {
                let mut sink = binder.create_sink(kind);
                binder.bind(&mut sink, &stream);
                *slot = Some(BoundSink { sink, stream });
            }
        }
    }

    /// Stop every bound stream's tracks, then detach the sinks
    fn release<B>(&mut self, binder: &mut B)
    where
        B: RendererBinder<Sink = K>,
    {
        for slot in [&mut self.video, &mut self.audio] {
            if let Some(mut bound) = slot.take() {
                bound.stream.stop_tracks();
                binder.unbind(&mut bound.sink);
            }
        }
        self.tier = None;
    }
}

/// One joined channel: membership, publications, renderer bindings, and
/// the relay bot, owned explicitly with init on join and teardown on leave
pub struct MediaSession<S, B>
where
    S: MediaSessionService,
    B: RendererBinder,
{
    service: Arc<S>,
    binder: B,
    config: SessionConfig,
    channel: Option<ChannelInfo>,
    mode: ChannelMode,
    local: MemberInfo,
    events: mpsc::UnboundedReceiver<ServiceEvent>,
    notify_tx: mpsc::UnboundedSender<SessionNotification>,
    notify_rx: Option<mpsc::UnboundedReceiver<SessionNotification>>,
    publications: HashMap<PublicationId, TrackedPublication>,
    bindings: HashMap<MemberId, RendererBinding<B::Sink>>,
    bots: RelayBotCoordinator,
    tiers: EncodingTierController,
    left: bool,
}

impl<S, B> std::fmt::Debug for MediaSession<S, B>
where
    S: MediaSessionService,
    B: RendererBinder,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaSession")
            .field("channel", &self.channel)
            .field("mode", &self.mode)
            .field("left", &self.left)
            .finish_non_exhaustive()
    }
}

impl<S, B> MediaSession<S, B>
where
    S: MediaSessionService,
    B: RendererBinder,
{
    pub(crate) async fn join_internal(
        service: Arc<S>,
        channel_name: String,
        config: SessionConfig,
        policy: EncodingPolicy,
        binder: B,
    ) -> Result<Self, RoomcastError> {
        let channel = service
            .find_or_create_channel(&channel_name, config.mode)
            .await?;
        let local = service.join(&channel.id).await?;
        // Register for events synchronously after the join succeeds, before
        // anything else can be published or can leave.
        let events = service.events();

        info!(channel = %channel.id, member = %local.id, mode = ?channel.mode, "📡 Joined channel");

        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        let mode = channel.mode;
        let channel_id = channel.id;
        let mut session = Self {
            service,
            binder,
            config,
            mode,
            channel: Some(channel),
            local,
            events,
            notify_tx,
            notify_rx: Some(notify_rx),
            publications: HashMap::new(),
            bindings: HashMap::new(),
            bots: RelayBotCoordinator::new(),
            tiers: EncodingTierController::new(policy),
            left: false,
        };
        session.notify(SessionNotification::LocalJoined {
            member: session.local.id,
        });

        // The initial enumeration runs to completion before the host starts
        // draining live events, so a publication present in both is only
        // evaluated once.
        let snapshot = session.service.list_publications(&channel_id).await?;
        for publication in snapshot {
            session.consider(publication).await?;
        }

        Ok(session)
    }

    /// The local member
    pub fn local_member(&self) -> &MemberInfo {
        &self.local
    }

    /// The joined channel, until local leave disposes it
    pub fn channel(&self) -> Option<&ChannelInfo> {
        self.channel.as_ref()
    }

    /// Whether the terminal local-leave teardown has fired
    pub fn is_left(&self) -> bool {
        self.left
    }

    /// Number of publisher-keyed renderer bindings currently held
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Whether a renderer binding exists for the given publisher
    pub fn has_binding(&self, publisher: &MemberId) -> bool {
        self.bindings.contains_key(publisher)
    }

    /// Current phase of a tracked publication
    pub fn publication_phase(&self, publication: &PublicationId) -> Option<PublicationPhase> {
        self.publications.get(publication).map(|t| t.phase)
    }

    /// Preferred encoding tier tracked for a publisher's video
    /// subscription, if a tier toggle is registered for it
    pub fn preferred_tier(&self, publisher: &MemberId) -> Option<&str> {
        self.bindings
            .get(publisher)
            .and_then(|b| b.tier.as_ref())
            .and_then(|t| t.preferred.as_deref())
    }

    /// Take the notification feed. Single consumer; a second call returns a
    /// feed that yields nothing.
    pub fn notifications(&mut self) -> NotificationStream {
        match self.notify_rx.take() {
            Some(rx) => NotificationStream::new(rx),
            None => {
                let (_tx, rx) = mpsc::unbounded_channel();
                NotificationStream::new(rx)
            }
        }
    }

    fn notify(&self, notification: SessionNotification) {
        // The host may have dropped its feed; that is not an error.
        let _ = self.notify_tx.send(notification);
    }

    /// Publish a local audio stream
    pub async fn publish_audio(&mut self, stream: MediaStream) -> Result<Publication, RoomcastError> {
        self.publish(stream, Vec::new()).await
    }

    /// Publish a local video stream. In relayed mode the policy's simulcast
    /// tiers are attached; in direct mode the video is published plain.
    pub async fn publish_video(&mut self, stream: MediaStream) -> Result<Publication, RoomcastError> {
        let encodings = match self.mode {
            ChannelMode::Relayed => self.tiers.policy().publish_tiers(),
            ChannelMode::Direct => Vec::new(),
        };
        self.publish(stream, encodings).await
    }

    async fn publish(
        &mut self,
        stream: MediaStream,
        encodings: Vec<EncodingTier>,
    ) -> Result<Publication, RoomcastError> {
        if self.left {
            return Err(RoomcastError::InvalidState {
                expected: "joined".to_string(),
                actual: "left".to_string(),
            });
        }
        let publication = self
            .service
            .publish(&self.local.id, stream, encodings)
            .await?;
        info!(publication = %publication.id, kind = ?publication.kind, "🎙️ Published local stream");

        // In relayed mode every local publication goes through the single
        // channel bot, forwarded exactly once.
        if self.mode == ChannelMode::Relayed {
            if let Some(channel) = self.channel.as_ref().map(|c| c.id) {
                let bot = self.bots.ensure_bot(self.service.as_ref(), &channel).await?;
                self.service.start_forwarding(&bot, &publication.id).await?;
                debug!(publication = %publication.id, %bot, "Forwarding started");
            }
        }
        Ok(publication)
    }

    /// Process one service event. This is the dispatch table: each event
    /// kind maps to exactly one handler, and nothing is handled after the
    /// one-shot local-leave teardown.
    pub async fn dispatch(&mut self, event: ServiceEvent) -> Result<(), RoomcastError> {
        if self.left {
            debug!(event = event.event_type(), "Event ignored after teardown");
            return Ok(());
        }
        match event {
            ServiceEvent::MemberJoined { member } => {
                if member.id != self.local.id {
                    info!(member = %member.id.short(), "👥 Member joined");
                    self.notify(SessionNotification::MemberJoined { member: member.id });
                }
            }
            ServiceEvent::MemberLeft { member } => self.on_member_left(member),
            ServiceEvent::StreamPublished { publication } => {
                self.consider(publication).await?;
            }
            ServiceEvent::PublicationSubscribed { subscription } => {
                debug!(subscription = %subscription.id, "Subscription established");
            }
            ServiceEvent::Left => self.teardown().await?,
        }
        Ok(())
    }

    /// Drain and dispatch every event currently queued, in arrival order.
    /// Returns how many were handled.
    pub async fn process_pending(&mut self) -> Result<usize, RoomcastError> {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.dispatch(event).await?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Dispatch events until the local member has left or the feed closes
    pub async fn run_until_left(&mut self) -> Result<(), RoomcastError> {
        while !self.left {
            match self.events.recv().await {
                Some(event) => self.dispatch(event).await?,
                None => break,
            }
        }
        Ok(())
    }

    /// Evaluate a newly observed publication against the subscribe
    /// predicate: subscribe unless its effective publisher is the local
    /// member. Already-tracked publications are never re-subscribed.
    async fn consider(&mut self, publication: Publication) -> Result<(), RoomcastError> {
        if self.left {
            return Ok(());
        }
        if self.publications.contains_key(&publication.id) {
            debug!(publication = %publication.id, "Publication already tracked");
            return Ok(());
        }

        let publisher = publication.effective_publisher();
        if publisher == self.local.id {
            // Subscribing to our own media is rejected or degenerate on the
            // service side; keep it Observed forever.
            self.track(publication, PublicationPhase::Observed);
            return Ok(());
        }

        self.notify(SessionNotification::StreamPublished {
            publication: publication.id,
            publisher,
            kind: publication.kind,
        });

        if !self.config.auto_subscribe {
            self.track(publication, PublicationPhase::Observed);
            return Ok(());
        }
        self.subscribe_inner(publication).await
    }

    /// Subscribe to a publication the session has already observed. A
    /// no-op for publications that are subscribing or subscribed.
    pub async fn subscribe_to(&mut self, publication: &PublicationId) -> Result<(), RoomcastError> {
        let tracked = self.publications.get(publication).ok_or_else(|| {
            RoomcastError::Subscribe {
                publication: *publication,
                reason: "publication is not known to this session".to_string(),
            }
        })?;
        match tracked.phase {
            PublicationPhase::Observed => {}
            PublicationPhase::Subscribing | PublicationPhase::Subscribed => return Ok(()),
            PublicationPhase::Released => {
                return Err(RoomcastError::Subscribe {
                    publication: *publication,
                    reason: "publication has been released".to_string(),
                })
            }
        }
        let publication = tracked.publication.clone();
        if publication.effective_publisher() == self.local.id {
            return Err(RoomcastError::InvalidState {
                expected: "foreign publication".to_string(),
                actual: "own publication".to_string(),
            });
        }
        self.subscribe_inner(publication).await
    }

    async fn subscribe_inner(&mut self, publication: Publication) -> Result<(), RoomcastError> {
        let id = publication.id;
        self.track(publication.clone(), PublicationPhase::Subscribing);

        let outcome = match self.service.subscribe(&self.local.id, &id).await {
            Ok(outcome) => outcome,
            Err(err) => {
                // No binding is created for a failed subscribe; the host may
                // retry through subscribe_to.
                self.set_phase(&id, PublicationPhase::Observed);
                return Err(err);
            }
        };
        self.set_phase(&id, PublicationPhase::Subscribed);

        if self.left {
            // Completion landed after teardown; the binding map is already
            // empty and stays that way.
            outcome.stream.stop_tracks();
            return Ok(());
        }

        if outcome.stream.kind() == ContentKind::Data {
            // Protocol parity with non-media channels: subscribed, nothing
            // to render.
            debug!(publication = %id, "Data publication subscribed without rendering");
            return Ok(());
        }

        let publisher = publication.effective_publisher();
        let kind = outcome.stream.kind();
        let binding = self
            .bindings
            .entry(publisher)
            .or_insert_with(RendererBinding::new);
        binding.attach(&mut self.binder, outcome.stream);

        if kind == ContentKind::Video
            && self.mode == ChannelMode::Relayed
            && publication.is_multi_tier()
        {
            binding.tier = Some(TierHandle {
                subscription: outcome.subscription.id,
                preferred: outcome.subscription.preferred_encoding.clone(),
            });
            debug!(publisher = %publisher.short(), "Tier toggle registered");
        }

        info!(publisher = %publisher.short(), kind = ?kind, "🎥 Renderer bound");
        self.notify(SessionNotification::RendererBound { publisher, kind });
        Ok(())
    }

    /// Flip the preferred encoding tier of the publisher's bound video
    /// subscription, returning the tier that was requested
    pub async fn toggle_tier(&mut self, publisher: &MemberId) -> Result<String, RoomcastError> {
        let handle = self
            .bindings
            .get_mut(publisher)
            .and_then(|binding| binding.tier.as_mut())
            .ok_or(RoomcastError::TierToggleUnavailable { member: *publisher })?;
        self.tiers.toggle(self.service.as_ref(), handle).await
    }

    fn on_member_left(&mut self, member: MemberInfo) {
        if member.id == self.local.id {
            // The terminal teardown rides the one-shot Left event.
            return;
        }
        match self.bindings.remove(&member.id) {
            Some(mut binding) => {
                binding.release(&mut self.binder);
                info!(member = %member.id.short(), "👋 Member left, renderer released");
            }
            // A member we never bound anything for, or a stale event.
            None => debug!(member = %member.id.short(), "Member left without bindings"),
        }
        for tracked in self.publications.values_mut() {
            if tracked.publication.effective_publisher() == member.id {
                tracked.phase = PublicationPhase::Released;
            }
        }
        self.notify(SessionNotification::MemberLeft { member: member.id });
    }

    /// Leave the channel. Teardown itself happens when the service's
    /// one-shot `Left` event is dispatched.
    pub async fn leave(&mut self) -> Result<(), RoomcastError> {
        if self.left {
            return Ok(());
        }
        self.service.leave(&self.local.id).await
    }

    /// Terminal one-shot teardown: release every binding regardless of
    /// key, forget all publication state, and dispose the channel. Safe to
    /// reach with subscriptions still pending; their completions land
    /// against an emptied binding map.
    async fn teardown(&mut self) -> Result<(), RoomcastError> {
        if self.left {
            return Ok(());
        }
        self.left = true;

        for (_, mut binding) in self.bindings.drain() {
            binding.release(&mut self.binder);
        }
        // The tracker resets to empty: late subscribe completions no-op
        // against the cleared maps.
        self.publications.clear();
        info!(member = %self.local.id.short(), "👋 Left channel, session torn down");
        self.notify(SessionNotification::LocalLeft);

        if let Some(channel) = self.channel.take() {
            if let Err(err) = self.service.dispose_channel(&channel.id).await {
                warn!(channel = %channel.id, %err, "Channel disposal failed");
                return Err(err);
            }
        }
        Ok(())
    }

    fn track(&mut self, publication: Publication, phase: PublicationPhase) {
        self.publications
            .insert(publication.id, TrackedPublication { publication, phase });
    }

    fn set_phase(&mut self, publication: &PublicationId, phase: PublicationPhase) {
        if let Some(tracked) = self.publications.get_mut(publication) {
            tracked.phase = phase;
        }
    }
}
