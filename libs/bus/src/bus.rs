//! Topic registry, publishers and subscriptions
//!
//! Each topic owns one tokio broadcast channel plus a sequencer. The first
//! publisher or subscription on a topic creates it and fixes its payload
//! kind and depth; later registrations must request the same kind.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, error, trace, warn};

use types::messages::{now_nanos, Envelope, Message, PayloadKind};
use types::topics::is_valid_topic_name;

use crate::error::BusError;
use crate::qos::{LagTracker, QosProfile};

/// Registry entry for one topic.
struct TopicEntry {
    kind: PayloadKind,
    depth: usize,
    sender: broadcast::Sender<Envelope>,
    /// Last assigned sequence; locked across assignment and send so
    /// subscribers always observe increasing sequences.
    sequencer: Arc<Mutex<u64>>,
}

/// In-process publish/subscribe bus. Clones share the same topics.
#[derive(Clone, Default)]
pub struct Bus {
    topics: Arc<Mutex<BTreeMap<String, TopicEntry>>>,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a publisher for `M` on `topic`.
    pub fn create_publisher<M: Message>(
        &self,
        node: &str,
        topic: &str,
        qos: QosProfile,
    ) -> Result<Publisher<M>, BusError> {
        let (sender, sequencer) = self.register(topic, M::KIND, qos)?;
        debug!(node, topic, kind = %M::KIND, "Publisher registered");

        Ok(Publisher {
            node: node.to_string(),
            topic: topic.to_string(),
            sender,
            sequencer,
            _marker: PhantomData,
        })
    }

    /// Register a subscription for `M` on `topic`.
    ///
    /// Only messages published after this call are delivered.
    pub fn create_subscription<M: Message>(
        &self,
        topic: &str,
        qos: QosProfile,
    ) -> Result<Subscription<M>, BusError> {
        let (sender, _) = self.register(topic, M::KIND, qos)?;
        debug!(topic, kind = %M::KIND, "Subscription registered");

        Ok(Subscription {
            topic: topic.to_string(),
            receiver: sender.subscribe(),
            lag: LagTracker::new(),
            _marker: PhantomData,
        })
    }

    /// Names of all registered topics, sorted.
    pub fn topic_names(&self) -> Vec<String> {
        self.lock_topics().keys().cloned().collect()
    }

    /// Number of live subscriptions on `topic` (0 if unknown).
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.lock_topics()
            .get(topic)
            .map(|entry| entry.sender.receiver_count())
            .unwrap_or(0)
    }

    fn register(
        &self,
        topic: &str,
        kind: PayloadKind,
        qos: QosProfile,
    ) -> Result<(broadcast::Sender<Envelope>, Arc<Mutex<u64>>), BusError> {
        if !is_valid_topic_name(topic) {
            return Err(BusError::InvalidTopic(topic.to_string()));
        }
        qos.validate()?;

        let mut topics = self.lock_topics();
        let entry = topics.entry(topic.to_string()).or_insert_with(|| {
            debug!(topic, %kind, depth = qos.depth, "Topic created");
            let (sender, _) = broadcast::channel(qos.depth);
            TopicEntry {
                kind,
                depth: qos.depth,
                sender,
                sequencer: Arc::new(Mutex::new(0)),
            }
        });

        if entry.kind != kind {
            return Err(BusError::KindMismatch {
                topic: topic.to_string(),
                bound: entry.kind,
                requested: kind,
            });
        }
        if entry.depth != qos.depth {
            debug!(
                topic,
                existing_depth = entry.depth,
                requested_depth = qos.depth,
                "Topic already exists; keeping existing depth"
            );
        }

        Ok((entry.sender.clone(), Arc::clone(&entry.sequencer)))
    }

    fn lock_topics(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, TopicEntry>> {
        self.topics.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Typed publishing handle for one topic.
pub struct Publisher<M> {
    node: String,
    topic: String,
    sender: broadcast::Sender<Envelope>,
    sequencer: Arc<Mutex<u64>>,
    _marker: PhantomData<fn(M)>,
}

impl<M: Message> Publisher<M> {
    /// Publish a message. Fire-and-forget: returns how many subscriptions
    /// it reached, 0 when nobody is listening.
    pub fn publish(&self, message: M) -> usize {
        let mut last = self.sequencer.lock().unwrap_or_else(PoisonError::into_inner);
        let sequence = *last + 1;
        *last = sequence;

        let envelope = Envelope {
            sequence,
            published_at: now_nanos(),
            publisher: self.node.clone(),
            topic: self.topic.clone(),
            payload: message.into_payload(),
        };

        match self.sender.send(envelope) {
            Ok(receivers) => {
                trace!(topic = %self.topic, sequence, receivers, "Published");
                receivers
            }
            Err(_) => {
                trace!(topic = %self.topic, sequence, "No subscribers; message dropped");
                0
            }
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

/// A message handed to a subscriber, with its bus metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery<M> {
    pub message: M,
    /// Per-topic sequence assigned at publish time.
    pub sequence: u64,
    /// Name of the publishing node.
    pub publisher: String,
    /// Unix nanoseconds at publish time.
    pub published_at: i64,
    /// Messages lost to lag immediately before this one.
    pub missed: u64,
}

/// Typed receiving handle for one topic.
pub struct Subscription<M> {
    topic: String,
    receiver: broadcast::Receiver<Envelope>,
    lag: LagTracker,
    _marker: PhantomData<fn() -> M>,
}

impl<M: Message> Subscription<M> {
    /// Wait for the next message. Returns `None` once every publisher and
    /// the bus itself are gone.
    pub async fn recv(&mut self) -> Option<Delivery<M>> {
        let mut missed = 0;
        loop {
            match self.receiver.recv().await {
                Ok(envelope) => {
                    if let Some(delivery) = self.open(envelope, missed) {
                        return Some(delivery);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    missed += skipped;
                    self.note_lag(skipped);
                }
                Err(RecvError::Closed) => {
                    debug!(topic = %self.topic, "Topic closed");
                    return None;
                }
            }
        }
    }

    /// Take the next message if one is already queued.
    pub fn try_recv(&mut self) -> Option<Delivery<M>> {
        let mut missed = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(envelope) => {
                    if let Some(delivery) = self.open(envelope, missed) {
                        return Some(delivery);
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    missed += skipped;
                    self.note_lag(skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn lag(&self) -> &LagTracker {
        &self.lag
    }

    fn open(&self, envelope: Envelope, missed: u64) -> Option<Delivery<M>> {
        match envelope.message::<M>() {
            Ok(message) => Some(Delivery {
                message,
                sequence: envelope.sequence,
                publisher: envelope.publisher,
                published_at: envelope.published_at,
                missed,
            }),
            Err(e) => {
                // Topic kinds are fixed at registration, so this means a
                // broken invariant rather than bad input.
                error!(topic = %self.topic, sequence = envelope.sequence, error = %e, "Dropping envelope");
                None
            }
        }
    }

    fn note_lag(&mut self, skipped: u64) {
        self.lag.record_lag(skipped);
        warn!(
            topic = %self.topic,
            skipped,
            total_dropped = self.lag.messages_dropped(),
            incidents = self.lag.incidents(),
            "Subscription lagged; oldest messages dropped"
        );
    }
}
