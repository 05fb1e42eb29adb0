//! Multi-frame scenarios for the collision manager
//!
//! Bodies here are plain boxes (or masks) positioned in world space; every
//! listener writes into a shared log so tests can compare what each body
//! heard frame by frame.

mod lifecycle;
mod dispatch;

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::config::CollisionConfig;
use crate::error::CollisionResult;
use crate::events::{
    CollisionEvent, CollisionEventListener, ContactEvent, ContactEventListener, EventState,
    ListenerContext,
};
use crate::foundation::collections::CollidableKey;
use crate::foundation::math::{Rect, Vec2};
use crate::foundation::time::AppData;
use crate::physics::{
    Collidable, CollidableState, CollisionLayers, CollisionManager, CollisionRect,
    CollisionSide, PixelCollisionRect, PixelMask, TransformState,
};

/// What a listener heard
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Collision {
        target: CollidableKey,
        other: CollidableKey,
        side: CollisionSide,
        state: EventState,
        rect_pairs: Vec<(String, String)>,
    },
    Contact {
        target: CollidableKey,
        other: CollidableKey,
        state: EventState,
    },
}

pub type Log = Rc<RefCell<Vec<Record>>>;

/// Writes every collision and contact event into the log
#[derive(Clone)]
pub struct Recorder {
    log: Log,
}

impl Recorder {
    fn collision(&self, event: &CollisionEvent) {
        self.log.borrow_mut().push(Record::Collision {
            target: event.target(),
            other: event.other(),
            side: event.side(),
            state: event.state(),
            rect_pairs: event.rect_pairs().to_vec(),
        });
    }

    fn contact(&self, event: &ContactEvent) {
        self.log.borrow_mut().push(Record::Contact {
            target: event.target(),
            other: event.other(),
            state: event.state(),
        });
    }
}

impl CollisionEventListener for Recorder {
    fn on_collision(&mut self, event: &CollisionEvent, _context: &mut ListenerContext<'_>) {
        self.collision(event);
    }

    fn on_collision_update(&mut self, event: &CollisionEvent, _context: &mut ListenerContext<'_>) {
        self.collision(event);
    }

    fn on_collision_finish(&mut self, event: &CollisionEvent, _context: &mut ListenerContext<'_>) {
        self.collision(event);
    }
}

impl ContactEventListener for Recorder {
    fn on_contact(&mut self, event: &ContactEvent, _context: &mut ListenerContext<'_>) {
        self.contact(event);
    }

    fn on_contact_update(&mut self, event: &ContactEvent, _context: &mut ListenerContext<'_>) {
        self.contact(event);
    }

    fn on_contact_finish(&mut self, event: &ContactEvent, _context: &mut ListenerContext<'_>) {
        self.contact(event);
    }
}

/// Box-shaped (or mask-shaped) test body; rects are stored relative to `position`
pub struct TestBody {
    state: CollidableState,
    pub position: Vec2,
    pub rotation: f32,
    rects: Vec<(String, Rect)>,
    mask: Option<Arc<PixelMask>>,
    pub mass: f32,
    pub is_static: bool,
    pub is_sensor: bool,
    pub layer: CollisionLayers,
    pub layer_mask: CollisionLayers,
}

impl TestBody {
    /// One rect tagged "body" covering (x, y, w, h)
    pub fn boxed(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            state: CollidableState::new(),
            position: Vec2::new(x, y),
            rotation: 0.0,
            rects: vec![("body".to_string(), Rect::new(0.0, 0.0, w, h))],
            mask: None,
            mass: 1.0,
            is_static: false,
            is_sensor: false,
            layer: CollisionLayers::all(),
            layer_mask: CollisionLayers::all(),
        }
    }

    pub fn with_rect(mut self, tag: &str, local: Rect) -> Self {
        self.rects.push((tag.to_string(), local));
        self
    }

    /// Every rect samples `mask` instead of being a filled box
    pub fn with_pixel_mask(mut self, mask: Arc<PixelMask>) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn sensor(mut self) -> Self {
        self.is_sensor = true;
        self
    }

    pub fn static_body(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn on_layer(mut self, layer: CollisionLayers, mask: CollisionLayers) -> Self {
        self.layer = layer;
        self.layer_mask = mask;
        self
    }
}

impl Collidable for TestBody {
    fn collidable_state(&self) -> &CollidableState {
        &self.state
    }

    fn collidable_state_mut(&mut self) -> &mut CollidableState {
        &mut self.state
    }

    fn transform_state(&self) -> TransformState {
        TransformState::new(self.position, self.rotation)
    }

    fn create_collision_rects(&self) -> CollisionResult<Vec<CollisionRect>> {
        self.rects
            .iter()
            .map(|(tag, local)| {
                let world = local.translated(self.position);
                match &self.mask {
                    Some(mask) => {
                        let shape = PixelCollisionRect::whole_mask(Arc::clone(mask), world)?
                            .with_rotation(self.rotation)?;
                        Ok(CollisionRect::new(tag.as_str(), shape))
                    }
                    None => CollisionRect::new_box(tag.as_str(), world),
                }
            })
            .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn is_static_collision_body(&self) -> bool {
        self.is_static
    }

    fn is_sensor(&self) -> bool {
        self.is_sensor
    }

    fn collision_layer(&self) -> CollisionLayers {
        self.layer
    }

    fn collision_mask(&self) -> CollisionLayers {
        self.layer_mask
    }
}

/// Manager, shared log and a frame clock
pub struct Harness {
    pub manager: CollisionManager,
    pub log: Log,
    clock: AppData,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(CollisionConfig::default())
    }

    pub fn with_config(config: CollisionConfig) -> Self {
        crate::foundation::logging::init_for_tests();
        Self {
            manager: CollisionManager::with_config(config),
            log: Rc::new(RefCell::new(Vec::new())),
            clock: AppData::new(),
        }
    }

    /// Register a body with a recorder for both collision and contact events
    pub fn spawn(&mut self, body: TestBody) -> CollidableKey {
        let key = self.manager.add_collidable(body);
        let recorder = Recorder { log: Rc::clone(&self.log) };
        self.manager.add_collision_listener(key, Box::new(recorder.clone())).unwrap();
        self.manager.add_contact_listener(key, Box::new(recorder)).unwrap();
        key
    }

    /// Advance one frame and run a pass
    pub fn step(&mut self) {
        self.clock.advance(1.0 / 60.0);
        self.manager.update(&self.clock);
    }

    pub fn app_data(&self) -> AppData {
        self.clock
    }

    pub fn move_to(&mut self, key: CollidableKey, x: f32, y: f32) {
        self.body_mut(key).position = Vec2::new(x, y);
    }

    pub fn body(&self, key: CollidableKey) -> &TestBody {
        self.manager.collidable_as::<TestBody>(key).unwrap()
    }

    pub fn body_mut(&mut self, key: CollidableKey) -> &mut TestBody {
        self.manager.collidable_as_mut::<TestBody>(key).unwrap()
    }

    /// Collision events `target` heard, in order
    pub fn collisions(&self, target: CollidableKey) -> Vec<(CollisionSide, EventState)> {
        self.log
            .borrow()
            .iter()
            .filter_map(|r| match r {
                Record::Collision { target: t, side, state, .. } if *t == target => Some((*side, *state)),
                _ => None,
            })
            .collect()
    }

    /// Contact events `target` heard, in order
    pub fn contacts(&self, target: CollidableKey) -> Vec<EventState> {
        self.log
            .borrow()
            .iter()
            .filter_map(|r| match r {
                Record::Contact { target: t, state, .. } if *t == target => Some(*state),
                _ => None,
            })
            .collect()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }
}
