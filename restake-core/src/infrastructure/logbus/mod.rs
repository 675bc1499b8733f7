//! Per-operation log channels.
//!
//! An operation id maps to an ordered list of subscribers. `emit` hands the
//! message to every live subscriber in subscription order before returning;
//! `complete` broadcasts `Done`, drops every subscriber and removes the
//! channel. Nothing is buffered: a subscriber only sees what is emitted after
//! it attached. A channel created by `subscribe` alone disappears with its
//! last subscriber unless a flow has opened it in the meantime.

use crate::foundation::{OperationId, COMPLETED_OPERATION_MEMORY};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// Fallback sink target; every operation message is mirrored here.
pub const OPLOG_TARGET: &str = "oplog";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogEvent {
    Log(String),
    Done,
}

#[derive(Default)]
struct Channel {
    subscribers: Vec<(u64, mpsc::UnboundedSender<LogEvent>)>,
    /// Set once a flow called `obtain`.
    opened: bool,
}

#[derive(Default)]
struct Registry {
    channels: HashMap<OperationId, Channel>,
    completed: HashSet<OperationId>,
    completed_order: VecDeque<OperationId>,
    next_subscriber: u64,
}

impl Registry {
    fn remember_completed(&mut self, id: OperationId) {
        if !self.completed.insert(id.clone()) {
            return;
        }
        self.completed_order.push_back(id);
        while self.completed_order.len() > COMPLETED_OPERATION_MEMORY {
            if let Some(evicted) = self.completed_order.pop_front() {
                self.completed.remove(&evicted);
            }
        }
    }

    fn forget_completed(&mut self, id: &OperationId) {
        if self.completed.remove(id) {
            self.completed_order.retain(|entry| entry != id);
        }
    }
}

#[derive(Default)]
pub struct LogBus {
    registry: Mutex<Registry>,
}

impl LogBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        // emit/complete must never fail; a panic elsewhere does not invalidate the map.
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create the channel if absent. Re-opens an id that was completed earlier.
    pub fn obtain(&self, id: &OperationId) {
        let mut registry = self.lock();
        registry.forget_completed(id);
        registry.channels.entry(id.clone()).or_default().opened = true;
    }

    pub fn subscribe(self: &Arc<Self>, id: &OperationId) -> LogSubscription {
        let mut registry = self.lock();
        if registry.completed.contains(id) {
            log::debug!(target: OPLOG_TARGET, "[LOG:{}] subscribe after completion; stream is already finished", id);
            return LogSubscription { bus: Arc::clone(self), id: id.clone(), subscriber: None, receiver: None };
        }
        registry.next_subscriber += 1;
        let subscriber = registry.next_subscriber;
        let (tx, rx) = mpsc::unbounded_channel();
        registry.channels.entry(id.clone()).or_default().subscribers.push((subscriber, tx));
        LogSubscription { bus: Arc::clone(self), id: id.clone(), subscriber: Some(subscriber), receiver: Some(rx) }
    }

    /// Deliver to current subscribers in order. Unknown or completed ids only reach the fallback sink.
    pub fn emit(&self, id: &OperationId, message: impl Into<String>) {
        let message = message.into();
        log::info!(target: OPLOG_TARGET, "[LOG:{}] {}", id, message);
        let mut registry = self.lock();
        let Some(channel) = registry.channels.get_mut(id) else {
            return;
        };
        channel.subscribers.retain(|(_, tx)| tx.send(LogEvent::Log(message.clone())).is_ok());
    }

    /// Broadcast `Done` and tear the channel down. Idempotent.
    pub fn complete(&self, id: &OperationId) {
        let mut registry = self.lock();
        if let Some(channel) = registry.channels.remove(id) {
            for (_, tx) in channel.subscribers {
                let _ = tx.send(LogEvent::Done);
            }
            log::debug!(target: OPLOG_TARGET, "[LOG:{}] channel completed", id);
        }
        registry.remember_completed(id.clone());
    }

    pub fn is_open(&self, id: &OperationId) -> bool {
        self.lock().channels.contains_key(id)
    }

    pub fn subscriber_count(&self, id: &OperationId) -> usize {
        self.lock().channels.get(id).map(|channel| channel.subscribers.len()).unwrap_or(0)
    }

    fn unsubscribe(&self, id: &OperationId, subscriber: u64) {
        let mut registry = self.lock();
        let Some(channel) = registry.channels.get_mut(id) else {
            return;
        };
        channel.subscribers.retain(|(entry, _)| *entry != subscriber);
        if channel.subscribers.is_empty() && !channel.opened {
            registry.channels.remove(id);
        }
    }
}

/// Receiving end of one subscription. Dropping it detaches from the channel
/// without completing the operation.
pub struct LogSubscription {
    bus: Arc<LogBus>,
    id: OperationId,
    subscriber: Option<u64>,
    receiver: Option<mpsc::UnboundedReceiver<LogEvent>>,
}

impl LogSubscription {
    pub fn id(&self) -> &OperationId {
        &self.id
    }

    /// Next event; `None` once the channel is gone.
    pub async fn recv(&mut self) -> Option<LogEvent> {
        match self.receiver.as_mut() {
            Some(receiver) => receiver.recv().await,
            None => None,
        }
    }
}

impl Drop for LogSubscription {
    fn drop(&mut self) {
        if let Some(subscriber) = self.subscriber.take() {
            self.bus.unsubscribe(&self.id, subscriber);
        }
    }
}

/// Emission handle passed through a flow. Without an id, lines only reach the fallback sink.
#[derive(Clone)]
pub struct OperationLog {
    bus: Arc<LogBus>,
    id: Option<OperationId>,
}

impl OperationLog {
    pub fn new(bus: Arc<LogBus>, id: Option<OperationId>) -> Self {
        Self { bus, id }
    }

    /// Open the channel for this operation.
    pub fn begin(bus: Arc<LogBus>, id: Option<OperationId>) -> Self {
        if let Some(id) = id.as_ref() {
            bus.obtain(id);
        }
        Self { bus, id }
    }

    pub fn id(&self) -> Option<&OperationId> {
        self.id.as_ref()
    }

    pub fn emit(&self, message: impl Into<String>) {
        let message: String = message.into();
        match self.id.as_ref() {
            Some(id) => self.bus.emit(id, message),
            None => log::info!(target: OPLOG_TARGET, "{}", message),
        }
    }

    pub fn complete(&self) {
        if let Some(id) = self.id.as_ref() {
            self.bus.complete(id);
        }
    }
}
