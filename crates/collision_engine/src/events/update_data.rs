//! The batch of listener calls produced by one pass

use crate::foundation::collections::ListenerKey;
use super::{CollisionEvent, ContactEvent, EventState};

/// Event carried by a queued call
#[derive(Debug, Clone, PartialEq)]
pub enum QueuedEvent {
    /// For a collision listener
    Collision(CollisionEvent),
    /// For a contact listener
    Contact(ContactEvent),
}

impl QueuedEvent {
    /// Lifecycle stage of the carried event
    pub fn state(&self) -> EventState {
        match self {
            QueuedEvent::Collision(e) => e.state(),
            QueuedEvent::Contact(e) => e.state(),
        }
    }
}

/// One listener invocation waiting for the flush
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedCall {
    /// Listener to invoke
    pub listener: ListenerKey,
    /// What to tell it
    pub event: QueuedEvent,
}

/// Ordered batch of calls; flushed front to back, each exactly once
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateData {
    calls: Vec<QueuedCall>,
}

impl UpdateData {
    /// Empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call
    pub fn push(&mut self, listener: ListenerKey, event: QueuedEvent) {
        self.calls.push(QueuedCall { listener, event });
    }

    /// Append every call of another batch
    pub fn append(&mut self, other: &mut UpdateData) {
        self.calls.append(&mut other.calls);
    }

    /// Calls in flush order
    pub fn calls(&self) -> &[QueuedCall] {
        &self.calls
    }

    /// Number of calls
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// True if nothing was queued
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// New and ongoing collision calls
    pub fn on_collision_calls(&self) -> impl Iterator<Item = (ListenerKey, &CollisionEvent)> {
        self.collision_calls().filter(|(_, e)| e.state() != EventState::Finished)
    }

    /// Finished collision calls
    pub fn on_collision_finish_calls(&self) -> impl Iterator<Item = (ListenerKey, &CollisionEvent)> {
        self.collision_calls().filter(|(_, e)| e.state() == EventState::Finished)
    }

    /// New and ongoing contact calls
    pub fn on_contact_calls(&self) -> impl Iterator<Item = (ListenerKey, &ContactEvent)> {
        self.contact_calls().filter(|(_, e)| e.state() != EventState::Finished)
    }

    /// Finished contact calls
    pub fn on_contact_finish_calls(&self) -> impl Iterator<Item = (ListenerKey, &ContactEvent)> {
        self.contact_calls().filter(|(_, e)| e.state() == EventState::Finished)
    }

    fn collision_calls(&self) -> impl Iterator<Item = (ListenerKey, &CollisionEvent)> {
        self.calls.iter().filter_map(|call| match &call.event {
            QueuedEvent::Collision(e) => Some((call.listener, e)),
            QueuedEvent::Contact(_) => None,
        })
    }

    fn contact_calls(&self) -> impl Iterator<Item = (ListenerKey, &ContactEvent)> {
        self.calls.iter().filter_map(|call| match &call.event {
            QueuedEvent::Contact(e) => Some((call.listener, e)),
            QueuedEvent::Collision(_) => None,
        })
    }
}
