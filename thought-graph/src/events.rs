//! Event emission.
//!
//! Fire-and-forget hooks; the absence of listeners must not alter search
//! semantics. A single async `emit` method that must not raise, plus a
//! non-blocking `emit_sync` for call sites that can't await, and a no-op
//! default so a `Graph` can be constructed without a host-provided emitter.

use async_trait::async_trait;

use crate::thought::Thought;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    ThoughtAdded,
    ThoughtExpanded,
    ThoughtFailed,
    SearchStarted,
    SearchCompleted,
    GoalReached,
}

/// Payload for a graph event. `thought` carries the relevant node (the
/// parent for `ThoughtExpanded`/`ThoughtFailed`, the thought itself for
/// `ThoughtAdded`/`GoalReached`), absent for the search-lifecycle events.
#[derive(Debug, Clone)]
pub struct GraphEvent<T> {
    pub event_type: EventType,
    pub thought: Option<Thought<T>>,
    pub child_count: Option<usize>,
    pub message: Option<String>,
    pub strategy: Option<String>,
    pub termination_reason: Option<String>,
}

impl<T> GraphEvent<T> {
    pub fn thought_added(thought: Thought<T>) -> Self {
        Self {
            event_type: EventType::ThoughtAdded,
            thought: Some(thought),
            child_count: None,
            message: None,
            strategy: None,
            termination_reason: None,
        }
    }

    pub fn thought_expanded(thought: Thought<T>, child_count: usize) -> Self {
        Self {
            event_type: EventType::ThoughtExpanded,
            thought: Some(thought),
            child_count: Some(child_count),
            message: None,
            strategy: None,
            termination_reason: None,
        }
    }

    pub fn thought_failed(thought: Thought<T>, message: impl Into<String>) -> Self {
        Self {
            event_type: EventType::ThoughtFailed,
            thought: Some(thought),
            child_count: None,
            message: Some(message.into()),
            strategy: None,
            termination_reason: None,
        }
    }

    pub fn search_started(strategy: impl Into<String>) -> Self {
        Self {
            event_type: EventType::SearchStarted,
            thought: None,
            child_count: None,
            message: None,
            strategy: Some(strategy.into()),
            termination_reason: None,
        }
    }

    pub fn search_completed(termination_reason: impl Into<String>) -> Self {
        Self {
            event_type: EventType::SearchCompleted,
            thought: None,
            child_count: None,
            message: None,
            strategy: None,
            termination_reason: Some(termination_reason.into()),
        }
    }

    pub fn goal_reached(thought: Thought<T>) -> Self {
        Self {
            event_type: EventType::GoalReached,
            thought: Some(thought),
            child_count: None,
            message: None,
            strategy: None,
            termination_reason: None,
        }
    }
}

/// Event sink. Must not raise; the emitter swallows handler errors so a
/// misbehaving listener never perturbs the search.
#[async_trait]
pub trait EventEmitter<T: Send + Sync>: Send + Sync {
    async fn emit(&self, event: GraphEvent<T>);

    /// Non-blocking emit for call sites that cannot await, such as
    /// `Graph::add_thought`. Defaults to a no-op; emitters that can forward
    /// without suspending (like `ChannelEventEmitter`'s `try_send`) override
    /// it instead of requiring every caller to spawn a task.
    fn emit_sync(&self, _event: GraphEvent<T>) {}
}

/// Default emitter: discards every event.
#[derive(Debug, Default)]
pub struct NullEventEmitter;

#[async_trait]
impl<T: Send + Sync + 'static> EventEmitter<T> for NullEventEmitter {
    async fn emit(&self, _event: GraphEvent<T>) {}
}

/// Bounded, non-blocking event emitter: forwards events into an mpsc channel
/// without ever blocking the caller, so a slow listener can never add
/// back-pressure to the search loop. A full channel means the consumer is
/// behind; the event being emitted is dropped rather than stalling the
/// caller.
pub struct ChannelEventEmitter<T> {
    sender: tokio::sync::mpsc::Sender<GraphEvent<T>>,
}

impl<T: Send + Sync + 'static> ChannelEventEmitter<T> {
    pub fn new(capacity: usize) -> (Self, tokio::sync::mpsc::Receiver<GraphEvent<T>>) {
        let (sender, receiver) = tokio::sync::mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> EventEmitter<T> for ChannelEventEmitter<T> {
    async fn emit(&self, event: GraphEvent<T>) {
        // `try_send` never blocks the caller; under backpressure the event
        // is dropped rather than stalling the search loop on a slow
        // listener. A `Sender` has no way to evict a queued item, so this
        // drops the newest event, not the oldest, when the channel is full.
        let _ = self.sender.try_send(event);
    }

    fn emit_sync(&self, event: GraphEvent<T>) {
        let _ = self.sender.try_send(event);
    }
}
