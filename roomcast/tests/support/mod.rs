//! In-memory fakes driving the session tests: a scriptable media session
//! service and a renderer binder that records every sink operation.

#![allow(dead_code)]

use async_trait::async_trait;
use roomcast_core::{
    BotId, ChannelId, ChannelInfo, ChannelMode, ContentKind, EncodingTier, MediaSessionService,
    MediaStream, MemberId, MemberInfo, Publication, PublicationId, RendererBinder, RoomcastError,
    ServiceEvent, SubscribeOutcome, SubscriptionId, SubscriptionInfo,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[derive(Default)]
struct FakeState {
    channels: HashMap<String, ChannelInfo>,
    members: Vec<MemberInfo>,
    publications: Vec<Publication>,
    bots: HashMap<ChannelId, Vec<BotId>>,
    bot_members: HashMap<BotId, MemberId>,
    issued_streams: Vec<(PublicationId, MediaStream)>,
    subscribe_calls: Vec<PublicationId>,
    create_bot_calls: u32,
    forwardings: Vec<(BotId, PublicationId)>,
    encoding_changes: Vec<(SubscriptionId, String)>,
    disposed: Vec<ChannelId>,
    fail_next_subscribe: bool,
    fail_next_create_bot: bool,
    fail_next_encoding_change: bool,
}

/// Scriptable in-memory media session service
pub struct FakeService {
    state: Mutex<FakeState>,
    events_tx: mpsc::UnboundedSender<ServiceEvent>,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<ServiceEvent>>>,
}

impl FakeService {
    pub fn new() -> Arc<Self> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            state: Mutex::new(FakeState::default()),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn emit(&self, event: ServiceEvent) {
        self.events_tx.send(event).unwrap();
    }

    /// A remote participant, without announcing it
    pub fn remote_member(&self) -> MemberInfo {
        MemberInfo::ordinary(MemberId::new())
    }

    pub fn announce_join(&self, member: &MemberInfo) {
        self.emit(ServiceEvent::MemberJoined {
            member: member.clone(),
        });
    }

    pub fn announce_left(&self, member: &MemberInfo) {
        self.emit(ServiceEvent::MemberLeft {
            member: member.clone(),
        });
    }

    /// Register a publication in the channel. Announced publications are
    /// also delivered as a live `StreamPublished` event; unannounced ones
    /// only show up in the snapshot.
    pub fn remote_publish(
        &self,
        publisher: MemberId,
        kind: ContentKind,
        encodings: Vec<EncodingTier>,
        origin: Option<MemberId>,
        announce: bool,
    ) -> Publication {
        let publication = Publication {
            id: PublicationId::new(),
            publisher,
            kind,
            origin,
            encodings,
        };
        self.lock().publications.push(publication.clone());
        if announce {
            self.emit(ServiceEvent::StreamPublished {
                publication: publication.clone(),
            });
        }
        publication
    }

    pub fn subscribe_calls(&self) -> Vec<PublicationId> {
        self.lock().subscribe_calls.clone()
    }

    pub fn create_bot_calls(&self) -> u32 {
        self.lock().create_bot_calls
    }

    pub fn forwardings(&self) -> Vec<(BotId, PublicationId)> {
        self.lock().forwardings.clone()
    }

    pub fn encoding_changes(&self) -> Vec<(SubscriptionId, String)> {
        self.lock().encoding_changes.clone()
    }

    pub fn disposed_channels(&self) -> Vec<ChannelId> {
        self.lock().disposed.clone()
    }

    pub fn channel_count(&self) -> usize {
        self.lock().channels.len()
    }

    /// Streams handed out by subscribe calls for the given publisher's
    /// publications
    pub fn issued_streams_for(&self, publisher: MemberId) -> Vec<MediaStream> {
        let state = self.lock();
        state
            .issued_streams
            .iter()
            .filter(|(publication, _)| {
                state
                    .publications
                    .iter()
                    .any(|p| p.id == *publication && p.effective_publisher() == publisher)
            })
            .map(|(_, stream)| stream.clone())
            .collect()
    }

    pub fn fail_next_subscribe(&self) {
        self.lock().fail_next_subscribe = true;
    }

    pub fn fail_next_create_bot(&self) {
        self.lock().fail_next_create_bot = true;
    }

    pub fn fail_next_encoding_change(&self) {
        self.lock().fail_next_encoding_change = true;
    }
}

#[async_trait]
impl MediaSessionService for FakeService {
    async fn find_or_create_channel(
        &self,
        name: &str,
        mode: ChannelMode,
    ) -> Result<ChannelInfo, RoomcastError> {
        let mut state = self.lock();
        let channel = state
            .channels
            .entry(name.to_string())
            .or_insert_with(|| ChannelInfo {
                id: ChannelId::new(),
                name: name.to_string(),
                mode,
            });
        Ok(channel.clone())
    }

    async fn join(&self, _channel: &ChannelId) -> Result<MemberInfo, RoomcastError> {
        let member = MemberInfo::ordinary(MemberId::new());
        self.lock().members.push(member.clone());
        Ok(member)
    }

    async fn list_publications(
        &self,
        _channel: &ChannelId,
    ) -> Result<Vec<Publication>, RoomcastError> {
        Ok(self.lock().publications.clone())
    }

    async fn publish(
        &self,
        member: &MemberId,
        stream: MediaStream,
        encodings: Vec<EncodingTier>,
    ) -> Result<Publication, RoomcastError> {
        let publication = Publication {
            id: PublicationId::new(),
            publisher: *member,
            kind: stream.kind(),
            origin: None,
            encodings,
        };
        let mut state = self.lock();
        state.publications.push(publication.clone());
        drop(state);
        self.emit(ServiceEvent::StreamPublished {
            publication: publication.clone(),
        });
        Ok(publication)
    }

    async fn subscribe(
        &self,
        _member: &MemberId,
        publication: &PublicationId,
    ) -> Result<SubscribeOutcome, RoomcastError> {
        let mut state = self.lock();
        if state.fail_next_subscribe {
            state.fail_next_subscribe = false;
            return Err(RoomcastError::Subscribe {
                publication: *publication,
                reason: "injected failure".to_string(),
            });
        }
        let found = state
            .publications
            .iter()
            .find(|p| p.id == *publication)
            .cloned()
            .ok_or(RoomcastError::Subscribe {
                publication: *publication,
                reason: "no such publication".to_string(),
            })?;
        state.subscribe_calls.push(*publication);

        let stream = MediaStream::new(found.kind);
        state.issued_streams.push((*publication, stream.clone()));
        // A multi-tier subscription starts on the first (lowest) tier.
        let preferred = found.encodings.first().map(|tier| tier.id.clone());
        Ok(SubscribeOutcome {
            stream,
            subscription: SubscriptionInfo {
                id: SubscriptionId::new(),
                publication: found,
                preferred_encoding: preferred,
            },
        })
    }

    async fn leave(&self, member: &MemberId) -> Result<(), RoomcastError> {
        self.emit(ServiceEvent::MemberLeft {
            member: MemberInfo::ordinary(*member),
        });
        self.emit(ServiceEvent::Left);
        Ok(())
    }

    async fn dispose_channel(&self, channel: &ChannelId) -> Result<(), RoomcastError> {
        self.lock().disposed.push(*channel);
        Ok(())
    }

    async fn list_bots(&self, channel: &ChannelId) -> Result<Vec<BotId>, RoomcastError> {
        Ok(self.lock().bots.get(channel).cloned().unwrap_or_default())
    }

    async fn create_bot(&self, channel: &ChannelId) -> Result<BotId, RoomcastError> {
        let mut state = self.lock();
        state.create_bot_calls += 1;
        if state.fail_next_create_bot {
            state.fail_next_create_bot = false;
            return Err(RoomcastError::BotCreation {
                channel: *channel,
                reason: "injected failure".to_string(),
            });
        }
        let bot = BotId::new();
        state.bots.entry(*channel).or_default().push(bot);
        state.bot_members.insert(bot, MemberId::new());
        Ok(bot)
    }

    async fn start_forwarding(
        &self,
        bot: &BotId,
        publication: &PublicationId,
    ) -> Result<Publication, RoomcastError> {
        let mut state = self.lock();
        let original = state
            .publications
            .iter()
            .find(|p| p.id == *publication)
            .cloned()
            .ok_or(RoomcastError::Forwarding {
                publication: *publication,
                reason: "no such publication".to_string(),
            })?;
        let bot_member = state
            .bot_members
            .get(bot)
            .copied()
            .ok_or(RoomcastError::Forwarding {
                publication: *publication,
                reason: "no such bot".to_string(),
            })?;
        let forwarded = Publication {
            id: PublicationId::new(),
            publisher: bot_member,
            kind: original.kind,
            origin: Some(original.effective_publisher()),
            encodings: original.encodings.clone(),
        };
        state.publications.push(forwarded.clone());
        state.forwardings.push((*bot, *publication));
        drop(state);
        self.emit(ServiceEvent::StreamPublished {
            publication: forwarded.clone(),
        });
        Ok(forwarded)
    }

    async fn change_preferred_encoding(
        &self,
        subscription: &SubscriptionId,
        tier: &str,
    ) -> Result<(), RoomcastError> {
        let mut state = self.lock();
        if state.fail_next_encoding_change {
            state.fail_next_encoding_change = false;
            return Err(RoomcastError::EncodingChange {
                subscription: *subscription,
                tier: tier.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        state
            .encoding_changes
            .push((*subscription, tier.to_string()));
        Ok(())
    }

    fn events(&self) -> mpsc::UnboundedReceiver<ServiceEvent> {
        match self.events_rx.lock().unwrap().take() {
            Some(rx) => rx,
            None => {
                let (_tx, rx) = mpsc::unbounded_channel();
                rx
            }
        }
    }
}

/// Everything the recording binder observed, shared with the test body
#[derive(Debug, Default)]
pub struct BinderLog {
    pub created: Vec<ContentKind>,
    pub bound: Vec<(usize, String)>,
    pub unbound: Vec<usize>,
}

/// Renderer binder that records sink operations instead of rendering
pub struct RecordingBinder {
    next_id: usize,
    log: Arc<Mutex<BinderLog>>,
}

/// Opaque sink handle issued by [`RecordingBinder`]
#[derive(Debug)]
pub struct FakeSink {
    pub id: usize,
    pub kind: ContentKind,
}

impl RecordingBinder {
    pub fn new() -> (Self, Arc<Mutex<BinderLog>>) {
        let log = Arc::new(Mutex::new(BinderLog::default()));
        (
            Self {
                next_id: 0,
                log: Arc::clone(&log),
            },
            log,
        )
    }
}

impl RendererBinder for RecordingBinder {
    type Sink = FakeSink;

    fn create_sink(&mut self, kind: ContentKind) -> FakeSink {
        let id = self.next_id;
        self.next_id += 1;
        self.log.lock().unwrap().created.push(kind);
        FakeSink { id, kind }
    }

    fn bind(&mut self, sink: &mut FakeSink, stream: &MediaStream) {
        self.log
            .lock()
            .unwrap()
            .bound
            .push((sink.id, stream.id().to_string()));
    }

    fn unbind(&mut self, sink: &mut FakeSink) {
        self.log.lock().unwrap().unbound.push(sink.id);
    }
}
