//! Per-frame collision state machine
//!
//! One [`CollisionManager::update`] runs a whole pass:
//! 1. Begin: manager listeners are told, awake bodies update their rects
//! 2. Broad phase: bounding rect rejection over every unordered pair
//! 3. Narrow phase: rect pairs, last frame's colliding pairs first
//! 4. Side classification and the response gate
//! 5. Diff against the previous frame into NEW / UPDATED / FINISHED
//! 6. Every listener call is queued, then the batch is flushed in order
//! 7. End: deferred commands are applied and finish hooks run
//!
//! Detection is complete before the first listener runs, so listeners always
//! observe a consistent frame.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use std::sync::Arc;

use approx::abs_diff_eq;

use crate::config::CollisionConfig;
use crate::debug::CollisionDebugVisualizer;
use crate::error::{CollisionError, CollisionResult};
use crate::events::{
    CollisionCommand, CollisionCommands, CollisionEvent, CollisionEventListener,
    CollisionManagerEventListener, ContactEvent, ContactEventListener, EventState,
    ListenerContext, QueuedEvent, UpdateData,
};
use crate::foundation::collections::{CollidableKey, HandleMap, ListenerKey, ManagerListenerKey};
use crate::foundation::logging::{debug, trace, warn};
use crate::foundation::math::{Rect, Vec2};
use crate::foundation::time::AppData;
use super::collidable::{begin_collision_updates, Collidable, CollidedEntry};
use super::collision::{CollisionRect, PixelMask};
use super::collision_layers::CollisionLayers;
use super::collision_pair::{CollisionPair, PairKey};
use super::collision_side::CollisionSide;

/// Offsets whose axes differ by less than this count as a tie
pub const SIDE_TIE_EPSILON: f32 = 1e-4;

/// Side of the first body that an offset pushing the second body out points to
///
/// The dominant axis of `shift` wins. Screen coordinates are assumed, so a
/// positive y is [`CollisionSide::Bottom`]. When both axes are equal the
/// vertical side is reported, so a body landing exactly on a corner counts
/// as standing on the floor. A zero offset has no side.
pub fn get_collision_side(shift: Vec2) -> Option<CollisionSide> {
    classify_side(shift, true)
}

/// [`get_collision_side`] with a configurable tie rule
pub fn classify_side(shift: Vec2, prefer_vertical_on_tie: bool) -> Option<CollisionSide> {
    let (ax, ay) = (shift.x.abs(), shift.y.abs());
    if abs_diff_eq!(ax, 0.0, epsilon = SIDE_TIE_EPSILON) && abs_diff_eq!(ay, 0.0, epsilon = SIDE_TIE_EPSILON) {
        return None;
    }
    let vertical = if abs_diff_eq!(ax, ay, epsilon = SIDE_TIE_EPSILON) {
        prefer_vertical_on_tie
    } else {
        ay > ax
    };
    Some(match (vertical, shift.x > 0.0, shift.y > 0.0) {
        (true, _, true) => CollisionSide::Bottom,
        (true, _, false) => CollisionSide::Top,
        (false, true, _) => CollisionSide::Right,
        (false, false, _) => CollisionSide::Left,
    })
}

/// Side the second rect entered from, judged by last frame's bounds
///
/// Only decisive when the rects were apart on exactly one axis.
pub fn sweep_side(previous1: Rect, previous2: Rect) -> Option<CollisionSide> {
    let apart_x = previous1.right() <= previous2.left() || previous2.right() <= previous1.left();
    let apart_y = previous1.bottom() <= previous2.top() || previous2.bottom() <= previous1.top();
    match (apart_x, apart_y) {
        (true, false) if previous2.center().x >= previous1.center().x => Some(CollisionSide::Right),
        (true, false) => Some(CollisionSide::Left),
        (false, true) if previous2.center().y >= previous1.center().y => Some(CollisionSide::Bottom),
        (false, true) => Some(CollisionSide::Top),
        _ => None,
    }
}

/// Manager-wide veto over collision responses
///
/// `side` is `a`'s side. Returning false keeps the contact but suppresses
/// collision events and collided entries for that side.
pub trait ResponseFilter {
    /// Whether the collision gets a response
    fn responds(&self, a: &dyn Collidable, b: &dyn Collidable, side: CollisionSide) -> bool;
}

impl<F> ResponseFilter for F
where
    F: Fn(&dyn Collidable, &dyn Collidable, CollisionSide) -> bool,
{
    fn responds(&self, a: &dyn Collidable, b: &dyn Collidable, side: CollisionSide) -> bool {
        self(a, b, side)
    }
}

enum ListenerSlot {
    Collision(Box<dyn CollisionEventListener>),
    Contact(Box<dyn ContactEventListener>),
}

struct ListenerEntry {
    owner: CollidableKey,
    slot: ListenerSlot,
}

/// Tracks every collidable and the collisions between them
pub struct CollisionManager {
    config: CollisionConfig,
    bodies: HandleMap<CollidableKey, Box<dyn Collidable>>,
    listeners: HandleMap<ListenerKey, ListenerEntry>,
    manager_listeners: HandleMap<ManagerListenerKey, Box<dyn CollisionManagerEventListener>>,
    response_filter: Option<Box<dyn ResponseFilter>>,

    /// Contacting pairs of the last pass
    previous_collisions: BTreeMap<PairKey, CollisionPair>,

    /// Pairs whose contact finished in the last pass
    removed_collisions: Vec<CollisionPair>,

    /// Pairs ended by a body removal, reported with the next pass
    pending_removed: Vec<CollisionPair>,

    /// Calls waiting for the next flush
    pending: UpdateData,

    /// Batch flushed by the last pass
    last_update_data: UpdateData,

    commands: CollisionCommands,
    awake_at_begin: Vec<CollidableKey>,
    last_app_data: AppData,
    debug_visualizer: Option<CollisionDebugVisualizer>,
}

impl CollisionManager {
    /// Manager with default configuration
    pub fn new() -> Self {
        Self::with_config(CollisionConfig::default())
    }

    /// Manager with the given configuration
    pub fn with_config(config: CollisionConfig) -> Self {
        let debug_visualizer = config.debug_draw.then(CollisionDebugVisualizer::new);
        Self {
            config,
            bodies: HandleMap::with_key(),
            listeners: HandleMap::with_key(),
            manager_listeners: HandleMap::with_key(),
            response_filter: None,
            previous_collisions: BTreeMap::new(),
            removed_collisions: Vec::new(),
            pending_removed: Vec::new(),
            pending: UpdateData::new(),
            last_update_data: UpdateData::new(),
            commands: CollisionCommands::new(),
            awake_at_begin: Vec::new(),
            last_app_data: AppData::new(),
            debug_visualizer,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Load an alpha mask using the configured threshold
    pub fn load_pixel_mask<P: AsRef<Path>>(&self, path: P) -> CollisionResult<Arc<PixelMask>> {
        Ok(Arc::new(PixelMask::load(path, self.config.alpha_threshold)?))
    }

    // ---- Registration ----------------------------------------------------

    /// Register a body
    pub fn add_collidable<C: Collidable>(&mut self, body: C) -> CollidableKey {
        self.add_boxed_collidable(Box::new(body))
    }

    /// Register an already boxed body
    pub fn add_boxed_collidable(&mut self, body: Box<dyn Collidable>) -> CollidableKey {
        let key = self.bodies.insert(body);
        debug!("Added collidable {key:?}");
        key
    }

    /// Unregister a body and return it
    ///
    /// Partners lose it from their collided maps immediately. Their FINISHED
    /// events are queued and delivered at the start of the next flush, and
    /// the ended pairs lead that pass's
    /// [`removed_collisions`](Self::removed_collisions). The body's own
    /// listeners are dropped, and it comes back with no partners or listener
    /// handles. Removing an unknown key does nothing.
    pub fn remove_collidable(&mut self, key: CollidableKey) -> Option<Box<dyn Collidable>> {
        let Some(mut body) = self.bodies.remove(key) else {
            debug!("Ignoring removal of unknown collidable {key:?}");
            return None;
        };

        let state = body.collidable_state_mut();
        let owned: Vec<ListenerKey> = state.collision_listeners().iter().chain(state.contact_listeners()).copied().collect();
        for listener in owned {
            self.listeners.remove(listener);
            state.forget_listener(listener);
        }
        state.clear_collided();

        let touching: Vec<PairKey> = self.previous_collisions.keys().filter(|k| k.involves(key)).copied().collect();
        let mut batch = UpdateData::new();
        for pair_key in touching {
            let Some(pair) = self.previous_collisions.remove(&pair_key) else { continue };
            let Some(partner) = pair.other(key) else { continue };
            if let Some(partner_body) = self.bodies.get_mut(partner) {
                partner_body.collidable_state_mut().purge_partner(key);
            }
            self.queue_removal_finish(&mut batch, &pair, partner, key);
            self.pending_removed.push(pair);
        }
        self.pending.append(&mut batch);
        self.awake_at_begin.retain(|k| *k != key);
        if let Some(viz) = self.debug_visualizer.as_mut() {
            viz.clear_broad_phase(key);
        }

        debug!("Removed collidable {key:?}");
        Some(body)
    }

    /// Attach a collision listener to a body
    pub fn add_collision_listener(
        &mut self,
        body: CollidableKey,
        listener: Box<dyn CollisionEventListener>,
    ) -> CollisionResult<ListenerKey> {
        let Some(target) = self.bodies.get_mut(body) else {
            return Err(CollisionError::UnknownCollidable);
        };
        let key = self.listeners.insert(ListenerEntry { owner: body, slot: ListenerSlot::Collision(listener) });
        target.collidable_state_mut().push_collision_listener(key);
        Ok(key)
    }

    /// Attach a contact listener to a body
    pub fn add_contact_listener(
        &mut self,
        body: CollidableKey,
        listener: Box<dyn ContactEventListener>,
    ) -> CollisionResult<ListenerKey> {
        let Some(target) = self.bodies.get_mut(body) else {
            return Err(CollisionError::UnknownCollidable);
        };
        let key = self.listeners.insert(ListenerEntry { owner: body, slot: ListenerSlot::Contact(listener) });
        target.collidable_state_mut().push_contact_listener(key);
        Ok(key)
    }

    /// Detach a collision or contact listener; unknown keys are ignored
    pub fn remove_listener(&mut self, key: ListenerKey) {
        match self.listeners.remove(key) {
            Some(entry) => {
                if let Some(owner) = self.bodies.get_mut(entry.owner) {
                    owner.collidable_state_mut().forget_listener(key);
                }
            }
            None => debug!("Ignoring removal of unknown listener {key:?}"),
        }
    }

    /// Body a listener is attached to
    pub fn listener_owner(&self, key: ListenerKey) -> CollisionResult<CollidableKey> {
        self.listeners.get(key).map(|e| e.owner).ok_or(CollisionError::UnknownListener)
    }

    /// Register a pass-level listener
    pub fn add_manager_listener(&mut self, listener: Box<dyn CollisionManagerEventListener>) -> ManagerListenerKey {
        self.manager_listeners.insert(listener)
    }

    /// Unregister a pass-level listener; unknown keys are ignored
    pub fn remove_manager_listener(&mut self, key: ManagerListenerKey) {
        if self.manager_listeners.remove(key).is_none() {
            debug!("Ignoring removal of unknown manager listener {key:?}");
        }
    }

    /// Install a manager-wide response veto
    pub fn set_response_filter(&mut self, filter: impl ResponseFilter + 'static) {
        self.response_filter = Some(Box::new(filter));
    }

    /// Remove the response veto
    pub fn clear_response_filter(&mut self) {
        self.response_filter = None;
    }

    // ---- Queries ---------------------------------------------------------

    /// A registered body
    pub fn collidable(&self, key: CollidableKey) -> Option<&dyn Collidable> {
        self.bodies.get(key).map(|b| b.as_ref())
    }

    /// A registered body (mutable)
    pub fn collidable_mut(&mut self, key: CollidableKey) -> Option<&mut dyn Collidable> {
        match self.bodies.get_mut(key) {
            Some(body) => Some(body.as_mut()),
            None => None,
        }
    }

    /// A registered body downcast to its concrete type
    pub fn collidable_as<T: Collidable>(&self, key: CollidableKey) -> Option<&T> {
        self.bodies.get(key).and_then(|b| b.as_any().downcast_ref::<T>())
    }

    /// A registered body downcast to its concrete type (mutable)
    pub fn collidable_as_mut<T: Collidable>(&mut self, key: CollidableKey) -> Option<&mut T> {
        self.bodies.get_mut(key).and_then(|b| b.as_any_mut().downcast_mut::<T>())
    }

    /// Every registered body
    pub fn collidables(&self) -> impl Iterator<Item = (CollidableKey, &dyn Collidable)> {
        self.bodies.iter().map(|(k, b)| (k, b.as_ref()))
    }

    /// Number of registered bodies
    pub fn collidable_count(&self) -> usize {
        self.bodies.len()
    }

    /// Pairs contacting in the last pass
    pub fn previous_collisions(&self) -> impl Iterator<Item = &CollisionPair> {
        self.previous_collisions.values()
    }

    /// Pairs whose contact finished in the last pass
    pub fn removed_collisions(&self) -> &[CollisionPair] {
        &self.removed_collisions
    }

    /// The last pass's pair for two bodies, in either order
    pub fn get_collision_pair(&self, a: CollidableKey, b: CollidableKey) -> Option<&CollisionPair> {
        self.previous_collisions.get(&PairKey::new(a, b))
    }

    /// Batch flushed by the last pass
    pub fn last_update_data(&self) -> &UpdateData {
        &self.last_update_data
    }

    /// Visualizer, when `debug_draw` is configured
    pub fn debug_visualizer(&self) -> Option<&CollisionDebugVisualizer> {
        self.debug_visualizer.as_ref()
    }

    /// Visualizer, when `debug_draw` is configured (mutable)
    pub fn debug_visualizer_mut(&mut self) -> Option<&mut CollisionDebugVisualizer> {
        self.debug_visualizer.as_mut()
    }

    /// Skip the rect pair (`tag_a` on `a`, `tag_b` on `b`) in the next pass
    ///
    /// Only a pair that touched in the last pass can be dismissed; otherwise
    /// this does nothing.
    pub fn ignore_collision(&mut self, a: CollidableKey, b: CollidableKey, tag_a: &str, tag_b: &str) {
        match self.previous_collisions.get_mut(&PairKey::new(a, b)) {
            Some(pair) if pair.collidable1() == a => pair.ignore_collision(tag_a, tag_b),
            Some(pair) => pair.ignore_collision(tag_b, tag_a),
            None => debug!("Ignoring dismissal of vanished pair {a:?}/{b:?}"),
        }
    }

    /// Whether a collision on `side` of `a` gets a response
    ///
    /// Sensors never respond. Both bodies must agree, and so must the
    /// response filter if one is installed.
    pub fn responds_to_collision(&self, a: &dyn Collidable, b: &dyn Collidable, side: CollisionSide) -> bool {
        !a.is_sensor()
            && !b.is_sensor()
            && a.responds_to_collision(b, side)
            && b.responds_to_collision(a, side.opposite())
            && self.response_filter.as_ref().map_or(true, |f| f.responds(a, b, side))
    }

    /// Drop every body, listener and pair; manager listeners and config stay
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.listeners.clear();
        self.previous_collisions.clear();
        self.removed_collisions.clear();
        self.pending_removed.clear();
        self.pending = UpdateData::new();
        self.last_update_data = UpdateData::new();
        self.commands.take();
        self.awake_at_begin.clear();
        if let Some(viz) = self.debug_visualizer.as_mut() {
            viz.clear();
        }
    }

    // ---- The pass --------------------------------------------------------

    /// Run one full collision pass
    pub fn update(&mut self, app_data: &AppData) {
        self.last_app_data = *app_data;
        self.begin(app_data);
        let (current, frozen) = self.detect();
        self.diff(current, &frozen, app_data);
        self.draw_debug(app_data);
        self.perform_final_collision_updates(app_data);
    }

    /// Flush the queued calls in order, then apply deferred commands and run
    /// the end-of-pass hooks
    ///
    /// [`update`](Self::update) calls this; calling it again flushes only
    /// what was queued since, such as removal events.
    pub fn perform_final_collision_updates(&mut self, app_data: &AppData) {
        let batch = std::mem::take(&mut self.pending);
        for call in batch.calls() {
            let Some(entry) = self.listeners.get_mut(call.listener) else {
                trace!("Skipping call for removed listener {:?}", call.listener);
                continue;
            };
            let mut context = ListenerContext::new(&mut self.bodies, &mut self.commands, app_data);
            match (&mut entry.slot, &call.event) {
                (ListenerSlot::Collision(listener), QueuedEvent::Collision(event)) => match event.state() {
                    EventState::New => listener.on_collision(event, &mut context),
                    EventState::Updated => listener.on_collision_update(event, &mut context),
                    EventState::Finished => listener.on_collision_finish(event, &mut context),
                },
                (ListenerSlot::Contact(listener), QueuedEvent::Contact(event)) => match event.state() {
                    EventState::New => listener.on_contact(event, &mut context),
                    EventState::Updated => listener.on_contact_update(event, &mut context),
                    EventState::Finished => listener.on_contact_finish(event, &mut context),
                },
                _ => warn!("Listener {:?} cannot take the queued event kind", call.listener),
            }
        }

        self.apply_commands();

        for (_, listener) in self.manager_listeners.iter_mut() {
            listener.on_will_finish_collision_updates(app_data, &batch);
        }
        for key in std::mem::take(&mut self.awake_at_begin) {
            if let Some(body) = self.bodies.get_mut(key) {
                body.on_finish_collision_updates(app_data);
            }
        }

        debug!(
            "Collision pass {}: {} contacting pairs, {} calls flushed",
            app_data.frame_number(),
            self.previous_collisions.len(),
            batch.len()
        );
        self.last_update_data = batch;
    }

    fn begin(&mut self, app_data: &AppData) {
        for (_, listener) in self.manager_listeners.iter_mut() {
            listener.on_will_begin_collision_updates(app_data);
        }
        self.awake_at_begin.clear();
        for (key, body) in self.bodies.iter_mut() {
            if !body.collidable_state().is_awake() {
                continue;
            }
            begin_collision_updates(body.as_mut(), app_data);
            body.on_begin_collision_updates(app_data);
            self.awake_at_begin.push(key);
        }
    }

    /// Broad and narrow phase; returns the contacting pairs and which of
    /// them were carried over frozen because a body sleeps
    fn detect(&self) -> (BTreeMap<PairKey, CollisionPair>, HashSet<PairKey>) {
        let awake: HashSet<CollidableKey> = self.awake_at_begin.iter().copied().collect();
        let mut current = BTreeMap::new();
        let mut frozen = HashSet::new();

        for (key, pair) in &self.previous_collisions {
            let (a, b) = (key.first(), key.second());
            if !self.bodies.contains_key(a) || !self.bodies.contains_key(b) {
                continue;
            }
            if !awake.contains(&a) || !awake.contains(&b) {
                current.insert(*key, pair.frozen());
                frozen.insert(*key);
            }
        }

        for (i, &ka) in self.awake_at_begin.iter().enumerate() {
            for &kb in &self.awake_at_begin[i + 1..] {
                let (Some(a), Some(b)) = (self.bodies.get(ka), self.bodies.get(kb)) else {
                    continue;
                };
                let (a, b) = (a.as_ref(), b.as_ref());
                if a.is_static_collision_body() && b.is_static_collision_body() {
                    continue;
                }
                if !CollisionLayers::should_collide(a.collision_layer(), a.collision_mask(), b.collision_layer(), b.collision_mask()) {
                    continue;
                }
                match (a.bounding_rect(), b.bounding_rect()) {
                    (Some(ra), Some(rb)) if ra.intersects(&rb) => {}
                    _ => continue,
                }

                let pair_key = PairKey::new(ka, kb);
                let (body1, body2) = if pair_key.first() == ka { (a, b) } else { (b, a) };
                let pair = self.narrow_phase(pair_key, body1, body2);
                trace!("Pair {pair_key:?}: sides {:?}, responsive {:?}", pair.sides(), pair.responsive_sides());
                if pair.is_contacting() {
                    current.insert(pair_key, pair);
                }
            }
        }
        (current, frozen)
    }

    fn narrow_phase(&self, key: PairKey, body1: &dyn Collidable, body2: &dyn Collidable) -> CollisionPair {
        let previous = self.previous_collisions.get(&key);
        let mut pair = CollisionPair::successor(previous, key.first(), key.second());

        let rects2 = body2.collidable_state().collision_rects();
        let mut candidates: Vec<_> = body1
            .collidable_state()
            .collision_rects()
            .iter()
            .flat_map(|r1| rects2.iter().map(move |r2| (r1, r2)))
            .map(|(r1, r2)| {
                let tags = (r1.tag().to_string(), r2.tag().to_string());
                let prior = pair.priority_side(&tags);
                (r1, r2, tags, prior)
            })
            .collect();
        candidates.sort_by_key(|(_, _, _, prior)| prior.is_none());

        for (r1, r2, tags, prior) in candidates {
            if previous.is_some_and(|p| p.is_ignored(&tags.0, &tags.1)) {
                trace!("Skipping ignored rect pair {tags:?}");
                continue;
            }
            if !CollisionRect::check_collision(r1, r2) {
                continue;
            }
            let Some(side) = prior.or_else(|| self.resolve_side(r1, r2)) else {
                continue;
            };
            let responsive = self.responds_to_collision(body1, body2, side);
            trace!("Rect pair {tags:?} collides on {side} (responsive: {responsive})");
            pair.record(tags, side, responsive);
        }
        pair
    }

    fn resolve_side(&self, r1: &CollisionRect, r2: &CollisionRect) -> Option<CollisionSide> {
        if self.config.sweep_side_resolution {
            if let Some(side) = sweep_side(r1.previous_rect(), r2.previous_rect()) {
                return Some(side);
            }
        }
        classify_side(CollisionRect::get_collision_offset(r1, r2), self.config.prefer_vertical_on_tie)
    }

    fn diff(&mut self, current: BTreeMap<PairKey, CollisionPair>, frozen: &HashSet<PairKey>, app_data: &AppData) {
        let previous = std::mem::take(&mut self.previous_collisions);
        let mut batch = std::mem::take(&mut self.pending);
        let mut removed = std::mem::take(&mut self.pending_removed);

        let keys: BTreeSet<PairKey> = previous.keys().chain(current.keys()).copied().collect();
        for key in keys {
            let (k1, k2) = (key.first(), key.second());
            let (Some(b1), Some(b2)) = (self.bodies.get(k1), self.bodies.get(k2)) else {
                warn!("Dropping pair {key:?} that references a removed collidable");
                continue;
            };
            let entry1 = CollidedEntry { key: k1, mass: b1.mass(), is_static: b1.is_static_collision_body() };
            let entry2 = CollidedEntry { key: k2, mass: b2.mass(), is_static: b2.is_static_collision_body() };

            if frozen.contains(&key) {
                if let Some(body) = self.bodies.get_mut(k1) {
                    body.collidable_state_mut().carry_collided(k2);
                }
                if let Some(body) = self.bodies.get_mut(k2) {
                    body.collidable_state_mut().carry_collided(k1);
                }
                continue;
            }

            let prev = previous.get(&key);
            let cur = current.get(&key);
            self.queue_collision_events(&mut batch, key, prev, cur, app_data);
            self.queue_contact_events(&mut batch, key, prev, cur, app_data);

            if let (Some(p), None) = (prev, cur) {
                removed.push(p.clone());
            }
            if let Some(c) = cur {
                for &side in c.responsive_sides() {
                    if let Some(body) = self.bodies.get_mut(k1) {
                        body.collidable_state_mut().record_new_collided(side, entry2);
                    }
                    if let Some(body) = self.bodies.get_mut(k2) {
                        body.collidable_state_mut().record_new_collided(side.opposite(), entry1);
                    }
                }
            }
        }

        for (_, body) in self.bodies.iter_mut() {
            body.collidable_state_mut().swap_in_new_collided();
        }
        self.previous_collisions = current;
        self.removed_collisions = removed;
        self.pending = batch;
    }

    fn queue_collision_events(
        &self,
        batch: &mut UpdateData,
        key: PairKey,
        prev: Option<&CollisionPair>,
        cur: Option<&CollisionPair>,
        app_data: &AppData,
    ) {
        let empty = BTreeSet::new();
        let was = prev.map_or(&empty, CollisionPair::responsive_sides);
        let is = cur.map_or(&empty, CollisionPair::responsive_sides);

        for side in CollisionSide::ALL {
            let state = match (was.contains(&side), is.contains(&side)) {
                (false, true) => EventState::New,
                (true, true) => EventState::Updated,
                (true, false) => EventState::Finished,
                (false, false) => continue,
            };
            for (target, other, target_side) in [
                (key.first(), key.second(), side),
                (key.second(), key.first(), side.opposite()),
            ] {
                let event = CollisionEvent::new(
                    target,
                    other,
                    target_side,
                    state,
                    cur.map(|p| p.rect_pairs_on_side_for(target, target_side)).unwrap_or_default(),
                    prev.map(|p| p.rect_pairs_on_side_for(target, target_side)).unwrap_or_default(),
                    prev.map(|p| p.ignored_collisions_for(target)).unwrap_or_default(),
                    *app_data,
                );
                self.queue_collision(batch, event);
            }
        }
    }

    fn queue_contact_events(
        &self,
        batch: &mut UpdateData,
        key: PairKey,
        prev: Option<&CollisionPair>,
        cur: Option<&CollisionPair>,
        app_data: &AppData,
    ) {
        let was = prev.is_some_and(CollisionPair::is_contacting);
        let is = cur.is_some_and(CollisionPair::is_contacting);
        let state = match (was, is) {
            (false, true) => EventState::New,
            (true, true) => EventState::Updated,
            (true, false) => EventState::Finished,
            (false, false) => return,
        };
        for (target, other) in [(key.first(), key.second()), (key.second(), key.first())] {
            let event = ContactEvent::new(
                target,
                other,
                state,
                cur.map(|p| p.sides_for(target)).unwrap_or_default(),
                prev.map(|p| p.sides_for(target)).unwrap_or_default(),
                cur.map(|p| p.rect_pairs_for(target)).unwrap_or_default(),
                prev.map(|p| p.rect_pairs_for(target)).unwrap_or_default(),
                prev.map(|p| p.ignored_collisions_for(target)).unwrap_or_default(),
                *app_data,
            );
            self.queue_contact(batch, event);
        }
    }

    /// FINISHED events for the partner left behind by a removal
    fn queue_removal_finish(&self, batch: &mut UpdateData, pair: &CollisionPair, partner: CollidableKey, removed: CollidableKey) {
        let app_data = self.last_app_data;
        for side in pair.responsive_sides_for(partner) {
            let event = CollisionEvent::new(
                partner,
                removed,
                side,
                EventState::Finished,
                Vec::new(),
                pair.rect_pairs_on_side_for(partner, side),
                pair.ignored_collisions_for(partner),
                app_data,
            );
            self.queue_collision(batch, event);
        }
        if pair.is_contacting() {
            let event = ContactEvent::new(
                partner,
                removed,
                EventState::Finished,
                Vec::new(),
                pair.sides_for(partner),
                Vec::new(),
                pair.rect_pairs_for(partner),
                pair.ignored_collisions_for(partner),
                app_data,
            );
            self.queue_contact(batch, event);
        }
    }

    fn queue_collision(&self, batch: &mut UpdateData, event: CollisionEvent) {
        let Some(body) = self.bodies.get(event.target()) else { return };
        for &listener in body.collidable_state().collision_listeners() {
            batch.push(listener, QueuedEvent::Collision(event.clone()));
        }
    }

    fn queue_contact(&self, batch: &mut UpdateData, event: ContactEvent) {
        let Some(body) = self.bodies.get(event.target()) else { return };
        for &listener in body.collidable_state().contact_listeners() {
            batch.push(listener, QueuedEvent::Contact(event.clone()));
        }
    }

    fn apply_commands(&mut self) {
        for command in self.commands.take() {
            trace!("Applying deferred {command:?}");
            match command {
                CollisionCommand::AddCollidable(body) => {
                    self.add_boxed_collidable(body);
                }
                CollisionCommand::RemoveCollidable(key) => {
                    self.remove_collidable(key);
                }
                CollisionCommand::AddCollisionListener(key, listener) => {
                    if let Err(err) = self.add_collision_listener(key, listener) {
                        debug!("Dropping deferred collision listener: {err}");
                    }
                }
                CollisionCommand::AddContactListener(key, listener) => {
                    if let Err(err) = self.add_contact_listener(key, listener) {
                        debug!("Dropping deferred contact listener: {err}");
                    }
                }
                CollisionCommand::RemoveListener(key) => self.remove_listener(key),
                CollisionCommand::IgnoreCollision { a, b, tag_a, tag_b } => {
                    self.ignore_collision(a, b, &tag_a, &tag_b);
                }
            }
        }
    }

    fn draw_debug(&mut self, app_data: &AppData) {
        let Some(viz) = self.debug_visualizer.as_mut() else { return };
        viz.update(app_data.delta_time());
        for (key, body) in self.bodies.iter() {
            viz.draw_broad_phase(key, body.as_ref());
            viz.draw_collidable(body.as_ref());
        }
    }
}

impl Default for CollisionManager {
    fn default() -> Self {
        Self::new()
    }
}
