//! Bodies that take part in collision detection
//!
//! A game object becomes collidable by embedding a [`CollidableState`] and
//! implementing [`Collidable`]. The state is bookkeeping owned by the
//! collision manager: which partners touch each side, the rects as of this
//! frame, the transform captured at the start of the pass. The owner reads it
//! and flags geometry changes; the manager is the only writer of the
//! collided maps.

use std::any::Any;
use std::collections::HashMap;

use crate::error::CollisionResult;
use crate::foundation::collections::{CollidableKey, ListenerKey};
use crate::foundation::logging::{trace, warn};
use crate::foundation::math::{Rect, Vec2};
use crate::foundation::time::AppData;
use super::collision::CollisionRect;
use super::collision_layers::CollisionLayers;
use super::collision_side::CollisionSide;
use super::transform_state::TransformState;

/// Partner touching one side of a body, as seen when the contact was detected
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollidedEntry {
    /// The partner
    pub key: CollidableKey,
    /// Partner mass at detection time
    pub mass: f32,
    /// Whether the partner is a static collision body
    pub is_static: bool,
}

type CollidedMap = HashMap<CollisionSide, Vec<CollidedEntry>>;

/// Per-body collision bookkeeping
#[derive(Debug, Clone)]
pub struct CollidableState {
    rects: Vec<CollisionRect>,
    needs_new_rects: bool,
    transform_at_begin: Option<TransformState>,
    previous_transform_state: Option<TransformState>,
    displacement: Vec2,
    awake: bool,
    collided: CollidedMap,
    new_collided: CollidedMap,
    collision_listeners: Vec<ListenerKey>,
    contact_listeners: Vec<ListenerKey>,
    last_begin_frame: Option<u64>,
}

impl CollidableState {
    /// Fresh state: awake, with rects built on the first pass
    pub fn new() -> Self {
        Self {
            rects: Vec::new(),
            needs_new_rects: true,
            transform_at_begin: None,
            previous_transform_state: None,
            displacement: Vec2::zeros(),
            awake: true,
            collided: HashMap::new(),
            new_collided: HashMap::new(),
            collision_listeners: Vec::new(),
            contact_listeners: Vec::new(),
            last_begin_frame: None,
        }
    }

    /// Rects as of the current pass
    pub fn collision_rects(&self) -> &[CollisionRect] {
        &self.rects
    }

    /// Rect with the given tag
    pub fn collision_rect(&self, tag: &str) -> Option<&CollisionRect> {
        self.rects.iter().find(|r| r.tag() == tag)
    }

    /// Partners touching `side`
    pub fn collided_on_side(&self, side: CollisionSide) -> &[CollidedEntry] {
        self.collided.get(&side).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of partners touching `side`
    pub fn collided_count_on_side(&self, side: CollisionSide) -> usize {
        self.collided_on_side(side).len()
    }

    /// Summed mass of the partners touching `side`
    pub fn collided_mass_on_side(&self, side: CollisionSide) -> f32 {
        self.collided_on_side(side).iter().map(|e| e.mass).sum()
    }

    /// True if a static body touches `side`
    pub fn has_static_collision_on_side(&self, side: CollisionSide) -> bool {
        self.collided_on_side(side).iter().any(|e| e.is_static)
    }

    /// True if `other` touches any side
    pub fn is_colliding_with(&self, other: CollidableKey) -> bool {
        self.collided.values().flatten().any(|e| e.key == other)
    }

    /// Sides on which `other` is touching
    pub fn sides_colliding_with(&self, other: CollidableKey) -> Vec<CollisionSide> {
        CollisionSide::ALL
            .into_iter()
            .filter(|side| self.collided_on_side(*side).iter().any(|e| e.key == other))
            .collect()
    }

    /// Transform captured at the start of the previous pass
    pub fn previous_transform_state(&self) -> Option<TransformState> {
        self.previous_transform_state
    }

    /// Movement between the previous pass and this one
    pub fn displacement(&self) -> Vec2 {
        self.displacement
    }

    /// Sleeping bodies are skipped by detection
    pub fn is_awake(&self) -> bool {
        self.awake
    }

    /// Resume detection on the next update
    pub fn wake(&mut self) {
        self.awake = true;
    }

    /// Skip detection until woken; current contacts are frozen, not finished
    pub fn sleep(&mut self) {
        self.awake = false;
    }

    /// Rebuild rects through [`Collidable::create_collision_rects`] on the next pass
    pub fn set_needs_new_collision_rects(&mut self) {
        self.needs_new_rects = true;
    }

    /// True while a rebuild is pending
    pub fn needs_new_collision_rects(&self) -> bool {
        self.needs_new_rects
    }

    /// Collision listeners attached to this body
    pub fn collision_listeners(&self) -> &[ListenerKey] {
        &self.collision_listeners
    }

    /// Contact listeners attached to this body
    pub fn contact_listeners(&self) -> &[ListenerKey] {
        &self.contact_listeners
    }

    pub(crate) fn push_collision_listener(&mut self, key: ListenerKey) {
        self.collision_listeners.push(key);
    }

    pub(crate) fn push_contact_listener(&mut self, key: ListenerKey) {
        self.contact_listeners.push(key);
    }

    pub(crate) fn forget_listener(&mut self, key: ListenerKey) -> bool {
        let before = self.collision_listeners.len() + self.contact_listeners.len();
        self.collision_listeners.retain(|k| *k != key);
        self.contact_listeners.retain(|k| *k != key);
        before != self.collision_listeners.len() + self.contact_listeners.len()
    }

    pub(crate) fn record_new_collided(&mut self, side: CollisionSide, entry: CollidedEntry) {
        let entries = self.new_collided.entry(side).or_default();
        if !entries.iter().any(|e| e.key == entry.key) {
            entries.push(entry);
        }
    }

    /// Carry a partner's entries over unchanged, used for frozen pairs
    pub(crate) fn carry_collided(&mut self, partner: CollidableKey) {
        for side in CollisionSide::ALL {
            let kept: Vec<_> = self.collided_on_side(side).iter().filter(|e| e.key == partner).copied().collect();
            for entry in kept {
                self.record_new_collided(side, entry);
            }
        }
    }

    pub(crate) fn swap_in_new_collided(&mut self) {
        self.collided = std::mem::take(&mut self.new_collided);
    }

    pub(crate) fn purge_partner(&mut self, partner: CollidableKey) {
        for entries in self.collided.values_mut().chain(self.new_collided.values_mut()) {
            entries.retain(|e| e.key != partner);
        }
        self.collided.retain(|_, entries| !entries.is_empty());
    }

    pub(crate) fn clear_collided(&mut self) {
        self.collided.clear();
        self.new_collided.clear();
    }
}

impl Default for CollidableState {
    fn default() -> Self {
        Self::new()
    }
}

/// A body that takes part in collision detection
///
/// Implementors embed a [`CollidableState`] and supply their transform and
/// rect geometry; every other method has a default that can be overridden.
pub trait Collidable: Any {
    /// Embedded bookkeeping
    fn collidable_state(&self) -> &CollidableState;

    /// Embedded bookkeeping (mutable)
    fn collidable_state_mut(&mut self) -> &mut CollidableState;

    /// Position and rotation as of now
    fn transform_state(&self) -> TransformState;

    /// Build the rects in world space for the current transform
    ///
    /// Called on the first pass, after [`CollidableState::set_needs_new_collision_rects`]
    /// and whenever the rotation changed. Tags must be unique within the body.
    fn create_collision_rects(&self) -> CollisionResult<Vec<CollisionRect>>;

    /// Downcast to Any for type-specific access
    fn as_any(&self) -> &dyn Any;

    /// Downcast to Any for mutable type-specific access
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Mass reported to partners
    fn mass(&self) -> f32 {
        1.0
    }

    /// Static bodies never pair with other static bodies
    fn is_static_collision_body(&self) -> bool {
        false
    }

    /// Sensors report contact but never collision responses
    fn is_sensor(&self) -> bool {
        false
    }

    /// Layer this body lives on
    fn collision_layer(&self) -> CollisionLayers {
        CollisionLayers::all()
    }

    /// Layers this body wants to be tested against
    fn collision_mask(&self) -> CollisionLayers {
        CollisionLayers::all()
    }

    /// Whether a collision with `other` on `side` (this body's side) gets a response
    fn responds_to_collision(&self, _other: &dyn Collidable, _side: CollisionSide) -> bool {
        true
    }

    /// Hook run after begin bookkeeping, before detection
    fn on_begin_collision_updates(&mut self, _app_data: &AppData) {}

    /// Hook run once the pass and its dispatch are over
    fn on_finish_collision_updates(&mut self, _app_data: &AppData) {}

    /// Union of the rect bounds; `None` without rects
    fn bounding_rect(&self) -> Option<Rect> {
        self.collidable_state()
            .collision_rects()
            .iter()
            .map(CollisionRect::current_rect)
            .reduce(|a, b| a.union(&b))
    }

    /// Bounding rect rejection, then every rect pair
    fn check_collision(&self, other: &dyn Collidable) -> bool {
        match (self.bounding_rect(), other.bounding_rect()) {
            (Some(a), Some(b)) if a.intersects(&b) => {}
            _ => return false,
        }
        let theirs = other.collidable_state().collision_rects();
        self.collidable_state()
            .collision_rects()
            .iter()
            .any(|mine| theirs.iter().any(|r| CollisionRect::check_collision(mine, r)))
    }
}

/// Start-of-pass bookkeeping, idempotent per frame number
///
/// Captures the transform and displacement, then brings the rects up to date:
/// a rebuild when flagged or rotated (previous bounds are carried over by
/// tag), otherwise a shift by the displacement.
pub(crate) fn begin_collision_updates(body: &mut dyn Collidable, app_data: &AppData) {
    let frame = app_data.frame_number();
    if body.collidable_state().last_begin_frame == Some(frame) {
        return;
    }

    let transform = body.transform_state();
    let (last, rebuild) = {
        let state = body.collidable_state();
        let last = state.transform_at_begin;
        let rotated = last.is_some_and(|prev| transform.has_rotated_from(&prev));
        (last, state.needs_new_rects || rotated)
    };
    let fresh = if rebuild {
        match body.create_collision_rects() {
            Ok(rects) => Some(rects),
            Err(err) => {
                warn!("Keeping stale collision rects, rebuild failed: {err}");
                None
            }
        }
    } else {
        None
    };

    let state = body.collidable_state_mut();
    state.last_begin_frame = Some(frame);
    state.previous_transform_state = last;
    state.transform_at_begin = Some(transform);
    state.displacement = last.map_or_else(Vec2::zeros, |prev| transform.displacement_from(&prev));

    for rect in &mut state.rects {
        rect.advance_frame();
    }

    match fresh {
        Some(mut rects) => {
            for rect in &mut rects {
                if let Some(old) = state.rects.iter().find(|old| old.tag() == rect.tag()) {
                    rect.inherit_previous_rect(old.previous_rect());
                }
            }
            for (i, rect) in rects.iter().enumerate() {
                if rects[..i].iter().any(|r| r.tag() == rect.tag()) {
                    warn!("Duplicate collision rect tag '{}'", rect.tag());
                }
            }
            trace!("Rebuilt {} collision rects", rects.len());
            state.rects = rects;
            state.needs_new_rects = false;
        }
        None if state.displacement != Vec2::zeros() => {
            let offset = state.displacement;
            for rect in &mut state.rects {
                rect.shift(offset);
            }
        }
        None => {}
    }
}
