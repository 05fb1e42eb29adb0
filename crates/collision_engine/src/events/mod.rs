//! Collision and contact events, following Game Engine Architecture Ch 16.8
//! Key principles:
//! - Events are immutable snapshots, never retained after dispatch
//! - Registration system (only listeners attached to a body hear about it)
//! - Queuing support (every call of a pass is queued, then flushed in order)
//! - Structural changes made by listeners are deferred to the next pass

pub mod commands;
pub mod update_data;

pub use commands::{CollisionCommand, CollisionCommands, ListenerContext};
pub use update_data::{QueuedCall, QueuedEvent, UpdateData};

use crate::foundation::collections::CollidableKey;
use crate::foundation::time::AppData;
use crate::physics::collision_pair::RectTagPair;
use crate::physics::collision_side::CollisionSide;

/// Lifecycle stage of a collision or contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventState {
    /// Started this frame
    New,
    /// Ongoing since an earlier frame
    Updated,
    /// Ended this frame
    Finished,
}

/// One side of one body touching another body
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    target: CollidableKey,
    other: CollidableKey,
    side: CollisionSide,
    state: EventState,
    rect_pairs: Vec<RectTagPair>,
    previous_rect_pairs: Vec<RectTagPair>,
    ignored_rect_pairs: Vec<RectTagPair>,
    app_data: AppData,
}

impl CollisionEvent {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        target: CollidableKey,
        other: CollidableKey,
        side: CollisionSide,
        state: EventState,
        rect_pairs: Vec<RectTagPair>,
        previous_rect_pairs: Vec<RectTagPair>,
        ignored_rect_pairs: Vec<RectTagPair>,
        app_data: AppData,
    ) -> Self {
        Self { target, other, side, state, rect_pairs, previous_rect_pairs, ignored_rect_pairs, app_data }
    }

    /// Body the event is about
    pub fn target(&self) -> CollidableKey {
        self.target
    }

    /// Body it touched; may already be removed for finish events caused by removal
    pub fn other(&self) -> CollidableKey {
        self.other
    }

    /// Side of the target
    pub fn side(&self) -> CollisionSide {
        self.side
    }

    /// Lifecycle stage
    pub fn state(&self) -> EventState {
        self.state
    }

    /// Rect pairs touching this side now, target's tag first
    pub fn rect_pairs(&self) -> &[RectTagPair] {
        &self.rect_pairs
    }

    /// Rect pairs that touched this side last frame, target's tag first
    pub fn previous_rect_pairs(&self) -> &[RectTagPair] {
        &self.previous_rect_pairs
    }

    /// Rect pairs skipped this frame, target's tag first
    pub fn ignored_rect_pairs(&self) -> &[RectTagPair] {
        &self.ignored_rect_pairs
    }

    /// Frame the event was produced in
    pub fn app_data(&self) -> &AppData {
        &self.app_data
    }
}

/// Two bodies touching on any side, responsive or not
#[derive(Debug, Clone, PartialEq)]
pub struct ContactEvent {
    target: CollidableKey,
    other: CollidableKey,
    state: EventState,
    sides: Vec<CollisionSide>,
    previous_sides: Vec<CollisionSide>,
    rect_pairs: Vec<RectTagPair>,
    previous_rect_pairs: Vec<RectTagPair>,
    ignored_rect_pairs: Vec<RectTagPair>,
    app_data: AppData,
}

impl ContactEvent {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        target: CollidableKey,
        other: CollidableKey,
        state: EventState,
        sides: Vec<CollisionSide>,
        previous_sides: Vec<CollisionSide>,
        rect_pairs: Vec<RectTagPair>,
        previous_rect_pairs: Vec<RectTagPair>,
        ignored_rect_pairs: Vec<RectTagPair>,
        app_data: AppData,
    ) -> Self {
        Self {
            target,
            other,
            state,
            sides,
            previous_sides,
            rect_pairs,
            previous_rect_pairs,
            ignored_rect_pairs,
            app_data,
        }
    }

    /// Body the event is about
    pub fn target(&self) -> CollidableKey {
        self.target
    }

    /// Body it touched
    pub fn other(&self) -> CollidableKey {
        self.other
    }

    /// Lifecycle stage
    pub fn state(&self) -> EventState {
        self.state
    }

    /// Sides of the target touching now; empty once finished
    pub fn sides(&self) -> &[CollisionSide] {
        &self.sides
    }

    /// Sides of the target that touched last frame
    pub fn previous_sides(&self) -> &[CollisionSide] {
        &self.previous_sides
    }

    /// Rect pairs touching now, target's tag first
    pub fn rect_pairs(&self) -> &[RectTagPair] {
        &self.rect_pairs
    }

    /// Rect pairs that touched last frame, target's tag first
    pub fn previous_rect_pairs(&self) -> &[RectTagPair] {
        &self.previous_rect_pairs
    }

    /// Rect pairs skipped this frame, target's tag first
    pub fn ignored_rect_pairs(&self) -> &[RectTagPair] {
        &self.ignored_rect_pairs
    }

    /// Frame the event was produced in
    pub fn app_data(&self) -> &AppData {
        &self.app_data
    }
}

/// Receives collision events for the body it is attached to
pub trait CollisionEventListener {
    /// A side started touching
    fn on_collision(&mut self, _event: &CollisionEvent, _context: &mut ListenerContext<'_>) {}

    /// A side is still touching
    fn on_collision_update(&mut self, _event: &CollisionEvent, _context: &mut ListenerContext<'_>) {}

    /// A side stopped touching
    fn on_collision_finish(&mut self, _event: &CollisionEvent, _context: &mut ListenerContext<'_>) {}
}

/// Receives contact events for the body it is attached to
pub trait ContactEventListener {
    /// Contact started
    fn on_contact(&mut self, _event: &ContactEvent, _context: &mut ListenerContext<'_>) {}

    /// Contact ongoing
    fn on_contact_update(&mut self, _event: &ContactEvent, _context: &mut ListenerContext<'_>) {}

    /// Contact ended
    fn on_contact_finish(&mut self, _event: &ContactEvent, _context: &mut ListenerContext<'_>) {}
}

/// Hears about whole passes rather than single bodies
pub trait CollisionManagerEventListener {
    /// Before any body's begin bookkeeping
    fn on_will_begin_collision_updates(&mut self, _app_data: &AppData) {}

    /// After the flush, before the bodies' finish hooks
    fn on_will_finish_collision_updates(&mut self, _app_data: &AppData, _update_data: &UpdateData) {}
}
