//! NEW / UPDATED / FINISHED lifecycle across frames

use super::*;
use crate::events::EventState::{Finished, New, Updated};
use crate::physics::CollisionSide::{Bottom, Left, Right, Top};

#[test]
fn test_overlap_reports_side_of_smaller_penetration() {
    let mut h = Harness::new();
    let a = h.spawn(TestBody::boxed(0.0, 0.0, 10.0, 10.0));
    let b = h.spawn(TestBody::boxed(8.0, 2.0, 10.0, 10.0));

    h.step();

    assert_eq!(h.collisions(a), vec![(Right, New)]);
    assert_eq!(h.collisions(b), vec![(Left, New)]);
    assert_eq!(h.contacts(a), vec![New]);
    assert_eq!(h.contacts(b), vec![New]);

    let state_a = h.body(a).collidable_state();
    assert_eq!(state_a.collided_count_on_side(Right), 1);
    assert_eq!(state_a.collided_on_side(Right)[0].key, b);
    assert!(h.body(b).collidable_state().is_colliding_with(a));
    assert_eq!(h.manager.get_collision_pair(b, a).map(|p| p.sides_for(a)), Some(vec![Right]));
}

#[test]
fn test_three_frames_then_separation() {
    let mut h = Harness::new();
    let a = h.spawn(TestBody::boxed(0.0, 0.0, 10.0, 10.0));
    let b = h.spawn(TestBody::boxed(8.0, 2.0, 10.0, 10.0));

    h.step();
    h.step();
    h.step();
    h.move_to(b, 30.0, 2.0);
    h.step();

    assert_eq!(h.collisions(a), vec![(Right, New), (Right, Updated), (Right, Updated), (Right, Finished)]);
    assert_eq!(h.contacts(a), vec![New, Updated, Updated, Finished]);
    assert_eq!(h.manager.removed_collisions().len(), 1);
    assert_eq!(h.body(a).collidable_state().collided_count_on_side(Right), 0);

    // Quiet once apart
    h.clear_log();
    h.step();
    assert!(h.log.borrow().is_empty());
    assert!(h.manager.removed_collisions().is_empty());
}

#[test]
fn test_events_are_mirrored_between_partners() {
    let mut h = Harness::new();
    let a = h.spawn(TestBody::boxed(0.0, 0.0, 10.0, 10.0));
    let b = h.spawn(TestBody::boxed(3.0, 8.0, 4.0, 10.0));

    h.step();
    h.move_to(b, 3.0, 7.0);
    h.step();
    h.move_to(b, 3.0, 20.0);
    h.step();

    let seen_by_a = h.collisions(a);
    let seen_by_b: Vec<_> = h.collisions(b).into_iter().map(|(side, state)| (side.opposite(), state)).collect();
    assert_eq!(seen_by_a, vec![(Bottom, New), (Bottom, Updated), (Bottom, Finished)]);
    assert_eq!(seen_by_a, seen_by_b);
    assert_eq!(h.contacts(a), h.contacts(b));
}

#[test]
fn test_landing_side_comes_from_last_frame() {
    // A thin body drops onto the right end of a wide floor: the x overlap
    // is smaller, but it came in from above
    let mut h = Harness::new();
    let floor = h.spawn(TestBody::boxed(0.0, 10.0, 100.0, 10.0).static_body());
    let pin = h.spawn(TestBody::boxed(99.5, 0.0, 1.0, 10.0));

    h.step();
    assert!(h.collisions(pin).is_empty());

    h.move_to(pin, 99.5, 2.0);
    h.step();
    assert_eq!(h.collisions(pin), vec![(Bottom, New)]);
    assert_eq!(h.collisions(floor), vec![(Top, New)]);
    assert!(h.body(pin).collidable_state().has_static_collision_on_side(Bottom));
}

#[test]
fn test_without_sweep_the_offset_decides() {
    let config = CollisionConfig { sweep_side_resolution: false, ..Default::default() };
    let mut h = Harness::with_config(config);
    h.spawn(TestBody::boxed(0.0, 10.0, 100.0, 10.0).static_body());
    let pin = h.spawn(TestBody::boxed(99.5, 0.0, 1.0, 10.0));

    h.step();
    h.move_to(pin, 99.5, 2.0);
    h.step();
    assert_eq!(h.collisions(pin), vec![(Left, New)]);
}

#[test]
fn test_ongoing_rect_pair_keeps_its_side() {
    let mut h = Harness::new();
    let a = h.spawn(TestBody::boxed(0.0, 0.0, 10.0, 10.0));
    let b = h.spawn(TestBody::boxed(8.0, 2.0, 10.0, 10.0));

    h.step();
    // The y overlap is now the smaller one; the rect pair keeps its side
    h.move_to(b, 2.0, 7.0);
    h.step();

    assert_eq!(h.collisions(a), vec![(Right, New), (Right, Updated)]);
}

#[test]
fn test_tags_survive_shift_and_rebuild() {
    let mut h = Harness::new();
    let a = h.spawn(TestBody::boxed(0.0, 0.0, 10.0, 10.0).with_rect("head", Rect::new(2.0, -4.0, 6.0, 4.0)));
    let b = h.spawn(TestBody::boxed(8.0, 2.0, 10.0, 10.0));

    h.step();
    h.move_to(a, 0.5, 0.0);
    h.step();
    h.body_mut(a).collidable_state_mut().set_needs_new_collision_rects();
    h.step();

    let tags: Vec<_> = h.body(a).collidable_state().collision_rects().iter().map(|r| r.tag().to_string()).collect();
    assert_eq!(tags, vec!["body", "head"]);

    let log = h.log.borrow();
    let pairs: Vec<_> = log
        .iter()
        .filter_map(|r| match r {
            Record::Collision { target, state, rect_pairs, .. } if *target == a => Some((*state, rect_pairs.clone())),
            _ => None,
        })
        .collect();
    let body_pair = vec![("body".to_string(), "body".to_string())];
    assert_eq!(pairs, vec![
        (New, body_pair.clone()),
        (Updated, body_pair.clone()),
        (Updated, body_pair),
    ]);
    assert!(h.collisions(b).iter().all(|(side, _)| *side == Left));
}

#[test]
fn test_equal_penetration_reports_vertical_side() {
    let mut h = Harness::new();
    let a = h.spawn(TestBody::boxed(0.0, 0.0, 10.0, 10.0));
    h.spawn(TestBody::boxed(7.0, 7.0, 10.0, 10.0));

    h.step();
    assert_eq!(h.collisions(a), vec![(Bottom, New)]);
}

#[test]
fn test_collided_entries_snapshot_mass() {
    let mut h = Harness::new();
    let floor = h.spawn(TestBody::boxed(0.0, 10.0, 30.0, 10.0).static_body());
    h.spawn(TestBody::boxed(0.0, 0.0, 10.0, 12.0).with_mass(2.0));
    h.spawn(TestBody::boxed(15.0, 0.0, 10.0, 12.0).with_mass(3.0));

    h.step();
    let state = h.body(floor).collidable_state();
    assert_eq!(state.collided_count_on_side(Top), 2);
    assert_eq!(state.collided_mass_on_side(Top), 5.0);
    assert!(!state.has_static_collision_on_side(Top));
}
