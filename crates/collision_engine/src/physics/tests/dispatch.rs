//! Deferred dispatch, listener context and structural changes

use std::cell::Cell;

use super::*;
use crate::error::CollisionError;
use crate::events::CollisionManagerEventListener;
use crate::events::EventState::{Finished, New, Updated};
use crate::events::UpdateData;
use crate::physics::CollisionSide::Right;

/// Removes its partner the first time they touch
struct Remover {
    saw_partner: Rc<Cell<bool>>,
}

impl CollisionEventListener for Remover {
    fn on_collision(&mut self, event: &CollisionEvent, context: &mut ListenerContext<'_>) {
        // Still registered while the batch is flushing
        self.saw_partner.set(context.collidable(event.other()).is_some());
        context.commands().remove_collidable(event.other());
    }
}

#[test]
fn test_removal_from_listener_is_deferred() {
    let mut h = Harness::new();
    let a = h.spawn(TestBody::boxed(0.0, 0.0, 10.0, 10.0));
    let b = h.spawn(TestBody::boxed(8.0, 2.0, 10.0, 10.0));
    let saw_partner = Rc::new(Cell::new(false));
    h.manager
        .add_collision_listener(a, Box::new(Remover { saw_partner: Rc::clone(&saw_partner) }))
        .unwrap();

    h.step();
    assert!(saw_partner.get());
    assert!(h.manager.collidable(b).is_none());
    assert_eq!(h.body(a).collidable_state().collided_count_on_side(Right), 0);
    assert_eq!(h.collisions(a), vec![(Right, New)]);

    h.clear_log();
    h.step();
    assert_eq!(h.collisions(a), vec![(Right, Finished)]);
    assert_eq!(h.contacts(a), vec![Finished]);

    h.clear_log();
    h.step();
    assert!(h.log.borrow().is_empty());
}

/// Reads the target's collided count for the event's side
struct CountProbe {
    seen: Rc<RefCell<Vec<(EventState, usize, u64)>>>,
}

impl CountProbe {
    fn probe(&self, event: &CollisionEvent, context: &ListenerContext<'_>) {
        let count = context
            .collidable(event.target())
            .map_or(usize::MAX, |body| body.collidable_state().collided_count_on_side(event.side()));
        self.seen.borrow_mut().push((event.state(), count, event.app_data().frame_number()));
    }
}

impl CollisionEventListener for CountProbe {
    fn on_collision(&mut self, event: &CollisionEvent, context: &mut ListenerContext<'_>) {
        self.probe(event, context);
    }

    fn on_collision_finish(&mut self, event: &CollisionEvent, context: &mut ListenerContext<'_>) {
        self.probe(event, context);
    }
}

#[test]
fn test_listeners_see_the_finished_frame() {
    let mut h = Harness::new();
    let a = h.spawn(TestBody::boxed(0.0, 0.0, 10.0, 10.0));
    let b = h.spawn(TestBody::boxed(8.0, 2.0, 10.0, 10.0));
    let seen = Rc::new(RefCell::new(Vec::new()));
    h.manager.add_collision_listener(a, Box::new(CountProbe { seen: Rc::clone(&seen) })).unwrap();

    h.step();
    let first = h.app_data().frame_number();
    h.move_to(b, 40.0, 2.0);
    h.step();
    let second = h.app_data().frame_number();

    assert_eq!(*seen.borrow(), vec![(New, 1, first), (Finished, 0, second)]);
}

/// Dismisses the first rect pair it hears about
struct IgnoreOnce {
    done: bool,
}

impl CollisionEventListener for IgnoreOnce {
    fn on_collision(&mut self, event: &CollisionEvent, context: &mut ListenerContext<'_>) {
        if self.done {
            return;
        }
        self.done = true;
        for (mine, theirs) in event.rect_pairs() {
            context.commands().ignore_collision(event.target(), event.other(), mine.clone(), theirs.clone());
        }
    }
}

#[test]
fn test_ignored_pair_is_skipped_for_one_pass() {
    let mut h = Harness::new();
    let a = h.spawn(TestBody::boxed(0.0, 0.0, 10.0, 10.0));
    let b = h.spawn(TestBody::boxed(8.0, 2.0, 10.0, 10.0));
    h.manager.add_collision_listener(a, Box::new(IgnoreOnce { done: false })).unwrap();

    h.step();
    h.step();
    let ignored = h
        .manager
        .last_update_data()
        .on_collision_finish_calls()
        .find(|(_, e)| e.target() == a)
        .map(|(_, e)| e.ignored_rect_pairs().to_vec());
    assert_eq!(ignored, Some(vec![("body".to_string(), "body".to_string())]));
    assert!(h.manager.get_collision_pair(a, b).is_none());

    h.step();
    h.step();
    assert_eq!(h.collisions(a), vec![(Right, New), (Right, Finished), (Right, New), (Right, Updated)]);
    assert_eq!(h.contacts(b), vec![New, Finished, New, Updated]);
}

#[test]
fn test_ignoring_a_vanished_pair_does_nothing() {
    let mut h = Harness::new();
    let a = h.spawn(TestBody::boxed(0.0, 0.0, 10.0, 10.0));
    let b = h.spawn(TestBody::boxed(50.0, 0.0, 10.0, 10.0));

    h.step();
    h.manager.ignore_collision(a, b, "body", "body");
    h.move_to(b, 8.0, 2.0);
    h.step();
    assert_eq!(h.collisions(a), vec![(Right, New)]);
}

#[test]
fn test_direct_removal_purges_partner_state() {
    let mut h = Harness::new();
    let a = h.spawn(TestBody::boxed(0.0, 0.0, 10.0, 10.0));
    let b = h.spawn(TestBody::boxed(8.0, 2.0, 10.0, 10.0));
    let extra = h.manager.add_contact_listener(b, Box::new(Recorder { log: Rc::clone(&h.log) })).unwrap();
    assert_eq!(h.manager.listener_owner(extra).unwrap(), b);

    h.step();
    let removed = h.manager.remove_collidable(b).unwrap();
    assert!(!removed.collidable_state().is_colliding_with(a));
    assert!(removed.collidable_state().contact_listeners().is_empty());
    assert!(h.manager.remove_collidable(b).is_none());
    assert!(!h.body(a).collidable_state().is_colliding_with(b));
    assert!(h.manager.get_collision_pair(a, b).is_none());
    assert!(matches!(h.manager.listener_owner(extra), Err(CollisionError::UnknownListener)));

    h.clear_log();
    h.step();
    assert_eq!(h.collisions(a), vec![(Right, Finished)]);
    assert_eq!(h.contacts(a), vec![Finished]);
    assert!(h.collisions(b).is_empty());
    assert_eq!(h.manager.collidable_count(), 1);

    // The ended pair is reported with the pass that delivered its events
    let ended = h.manager.removed_collisions();
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0].other(a), Some(b));

    h.step();
    assert!(h.manager.removed_collisions().is_empty());
}

#[test]
fn test_listener_on_unknown_body_is_an_error() {
    let mut h = Harness::new();
    let b = h.spawn(TestBody::boxed(0.0, 0.0, 10.0, 10.0));
    h.manager.remove_collidable(b);

    let recorder = Recorder { log: Rc::clone(&h.log) };
    let result = h.manager.add_collision_listener(b, Box::new(recorder.clone()));
    assert!(matches!(result, Err(CollisionError::UnknownCollidable)));
    let result = h.manager.add_contact_listener(b, Box::new(recorder));
    assert!(matches!(result, Err(CollisionError::UnknownCollidable)));
}

#[test]
fn test_removed_listener_stops_hearing() {
    let mut h = Harness::new();
    let a = h.spawn(TestBody::boxed(0.0, 0.0, 10.0, 10.0));
    h.spawn(TestBody::boxed(8.0, 2.0, 10.0, 10.0));
    let second_log: Log = Rc::new(RefCell::new(Vec::new()));
    let key = h.manager.add_collision_listener(a, Box::new(Recorder { log: Rc::clone(&second_log) })).unwrap();

    h.step();
    assert_eq!(second_log.borrow().len(), 1);

    h.manager.remove_listener(key);
    h.manager.remove_listener(key);
    assert!(!h.body(a).collidable_state().collision_listeners().contains(&key));
    h.step();
    assert_eq!(second_log.borrow().len(), 1);
    assert_eq!(h.collisions(a), vec![(Right, New), (Right, Updated)]);
}

/// Spawns a body and hooks a listener onto its own body on first contact
struct Spawner {
    log: Log,
    spawned: bool,
}

impl ContactEventListener for Spawner {
    fn on_contact(&mut self, event: &ContactEvent, context: &mut ListenerContext<'_>) {
        if self.spawned {
            return;
        }
        self.spawned = true;
        context.commands().add_collidable(Box::new(TestBody::boxed(100.0, 100.0, 5.0, 5.0)));
        context
            .commands()
            .add_collision_listener(event.target(), Box::new(Recorder { log: Rc::clone(&self.log) }));
    }
}

#[test]
fn test_structural_commands_apply_after_the_flush() {
    let mut h = Harness::new();
    let a = h.spawn(TestBody::boxed(0.0, 0.0, 10.0, 10.0));
    h.spawn(TestBody::boxed(8.0, 2.0, 10.0, 10.0));
    let late_log: Log = Rc::new(RefCell::new(Vec::new()));
    h.manager
        .add_contact_listener(a, Box::new(Spawner { log: Rc::clone(&late_log), spawned: false }))
        .unwrap();

    h.step();
    assert_eq!(h.manager.collidable_count(), 3);
    assert_eq!(h.body(a).collidable_state().collision_listeners().len(), 2);
    // Attached after this pass's events went out
    assert!(late_log.borrow().is_empty());

    h.step();
    assert_eq!(late_log.borrow().len(), 1);
}

/// Moves its own body out of the way on contact
struct Dodger;

impl CollisionEventListener for Dodger {
    fn on_collision(&mut self, event: &CollisionEvent, context: &mut ListenerContext<'_>) {
        if let Some(body) = context.collidable_as_mut::<TestBody>(event.target()) {
            body.position.x -= 50.0;
        }
    }
}

#[test]
fn test_listener_can_move_its_body() {
    let mut h = Harness::new();
    let a = h.spawn(TestBody::boxed(0.0, 0.0, 10.0, 10.0));
    h.spawn(TestBody::boxed(8.0, 2.0, 10.0, 10.0));
    h.manager.add_collision_listener(a, Box::new(Dodger)).unwrap();

    h.step();
    h.step();
    assert_eq!(h.collisions(a), vec![(Right, New), (Right, Finished)]);
    assert_eq!(h.body(a).position.x, -50.0);
}

/// Counts passes and the size of each flushed batch
struct PassCounter {
    begins: Rc<Cell<u32>>,
    batches: Rc<RefCell<Vec<(usize, usize)>>>,
}

impl CollisionManagerEventListener for PassCounter {
    fn on_will_begin_collision_updates(&mut self, _app_data: &AppData) {
        self.begins.set(self.begins.get() + 1);
    }

    fn on_will_finish_collision_updates(&mut self, _app_data: &AppData, update_data: &UpdateData) {
        self.batches.borrow_mut().push((update_data.len(), update_data.on_collision_calls().count()));
    }
}

#[test]
fn test_manager_listener_brackets_each_pass() {
    let mut h = Harness::new();
    h.spawn(TestBody::boxed(0.0, 0.0, 10.0, 10.0));
    h.spawn(TestBody::boxed(8.0, 2.0, 10.0, 10.0));
    let begins = Rc::new(Cell::new(0));
    let batches = Rc::new(RefCell::new(Vec::new()));
    let key = h.manager.add_manager_listener(Box::new(PassCounter {
        begins: Rc::clone(&begins),
        batches: Rc::clone(&batches),
    }));

    h.step();
    h.step();
    assert_eq!(begins.get(), 2);
    // Two collision and two contact calls per pass
    assert_eq!(*batches.borrow(), vec![(4, 2), (4, 2)]);

    h.manager.remove_manager_listener(key);
    h.step();
    assert_eq!(begins.get(), 2);
}

#[test]
fn test_last_update_data_views() {
    let mut h = Harness::new();
    let a = h.spawn(TestBody::boxed(0.0, 0.0, 10.0, 10.0));
    let b = h.spawn(TestBody::boxed(8.0, 2.0, 10.0, 10.0));

    h.step();
    let data = h.manager.last_update_data();
    assert_eq!(data.on_collision_calls().count(), 2);
    assert_eq!(data.on_contact_calls().count(), 2);
    assert_eq!(data.on_collision_finish_calls().count(), 0);
    let sides: Vec<_> = data.on_contact_calls().filter(|(_, e)| e.target() == a).map(|(_, e)| e.sides().to_vec()).collect();
    assert_eq!(sides, vec![vec![Right]]);

    h.move_to(a, -40.0, 0.0);
    h.step();
    let data = h.manager.last_update_data();
    assert_eq!(data.on_collision_calls().count(), 0);
    assert_eq!(data.on_collision_finish_calls().count(), 2);
    let previous: Vec<_> = data
        .on_contact_finish_calls()
        .filter(|(_, e)| e.target() == b)
        .map(|(_, e)| e.previous_sides().to_vec())
        .collect();
    assert_eq!(previous, vec![vec![crate::physics::CollisionSide::Left]]);
}

#[test]
fn test_clear_drops_bodies_but_keeps_manager_listeners() {
    let mut h = Harness::new();
    h.spawn(TestBody::boxed(0.0, 0.0, 10.0, 10.0));
    h.spawn(TestBody::boxed(8.0, 2.0, 10.0, 10.0));
    let begins = Rc::new(Cell::new(0));
    h.manager.add_manager_listener(Box::new(PassCounter {
        begins: Rc::clone(&begins),
        batches: Rc::new(RefCell::new(Vec::new())),
    }));

    h.step();
    h.manager.clear();
    assert_eq!(h.manager.collidable_count(), 0);
    assert_eq!(h.manager.previous_collisions().count(), 0);

    h.clear_log();
    h.step();
    assert!(h.log.borrow().is_empty());
    assert_eq!(begins.get(), 2);
}

#[test]
fn test_updated_events_keep_previous_rect_pairs() {
    let mut h = Harness::new();
    let a = h.spawn(TestBody::boxed(0.0, 0.0, 10.0, 10.0));
    h.spawn(TestBody::boxed(8.0, 2.0, 10.0, 10.0));

    h.step();
    h.step();
    let updated: Vec<_> = h
        .manager
        .last_update_data()
        .on_collision_calls()
        .filter(|(_, e)| e.target() == a && e.state() == Updated)
        .map(|(_, e)| (e.rect_pairs().to_vec(), e.previous_rect_pairs().to_vec()))
        .collect();
    let body_pair = vec![("body".to_string(), "body".to_string())];
    assert_eq!(updated, vec![(body_pair.clone(), body_pair)]);
}
