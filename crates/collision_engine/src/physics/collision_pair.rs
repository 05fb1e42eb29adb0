//! Per-frame record of two touching collidables

use std::collections::BTreeSet;

use crate::foundation::collections::CollidableKey;
use super::collision_side::CollisionSide;

/// Rect tags of a colliding rect pair, ordered as (first body's tag, second body's tag)
pub type RectTagPair = (String, String);

/// Unordered identity of a pair of collidables
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey(CollidableKey, CollidableKey);

impl PairKey {
    /// Create a pair key (always stores the smaller key first for consistency)
    pub fn new(a: CollidableKey, b: CollidableKey) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    /// Smaller key
    pub fn first(&self) -> CollidableKey {
        self.0
    }

    /// Larger key
    pub fn second(&self) -> CollidableKey {
        self.1
    }

    /// True if `key` is one of the two
    pub fn involves(&self, key: CollidableKey) -> bool {
        self.0 == key || self.1 == key
    }
}

/// Two collidables and what touched between them this frame
///
/// Sides and rect sides are stored from `collidable1`'s perspective; use the
/// `*_for` accessors to read them from either body.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionPair {
    key: PairKey,
    priority_rects: Vec<(RectTagPair, CollisionSide)>,
    rect_sides: Vec<(RectTagPair, CollisionSide)>,
    sides: BTreeSet<CollisionSide>,
    responsive_sides: BTreeSet<CollisionSide>,
    ignored_collisions: Vec<RectTagPair>,
}

impl CollisionPair {
    /// Empty pair; the smaller key becomes `collidable1`
    pub fn new(a: CollidableKey, b: CollidableKey) -> Self {
        Self {
            key: PairKey::new(a, b),
            priority_rects: Vec::new(),
            rect_sides: Vec::new(),
            sides: BTreeSet::new(),
            responsive_sides: BTreeSet::new(),
            ignored_collisions: Vec::new(),
        }
    }

    /// Fresh pair for the next frame, seeded with this frame's rect sides as priorities
    pub(crate) fn successor(previous: Option<&CollisionPair>, a: CollidableKey, b: CollidableKey) -> Self {
        let mut pair = Self::new(a, b);
        if let Some(previous) = previous {
            pair.priority_rects = previous.rect_sides.clone();
        }
        pair
    }

    /// Unordered identity
    pub fn key(&self) -> PairKey {
        self.key
    }

    /// First body
    pub fn collidable1(&self) -> CollidableKey {
        self.key.first()
    }

    /// Second body
    pub fn collidable2(&self) -> CollidableKey {
        self.key.second()
    }

    /// The body that is not `key`
    pub fn other(&self, key: CollidableKey) -> Option<CollidableKey> {
        if key == self.collidable1() {
            Some(self.collidable2())
        } else if key == self.collidable2() {
            Some(self.collidable1())
        } else {
            None
        }
    }

    /// Rect pairs that collided last frame, with the side they reported
    pub fn priority_rects(&self) -> &[(RectTagPair, CollisionSide)] {
        &self.priority_rects
    }

    /// Side reported last frame by a rect pair, if it collided then
    pub fn priority_side(&self, tags: &RectTagPair) -> Option<CollisionSide> {
        self.priority_rects.iter().find(|(t, _)| t == tags).map(|(_, side)| *side)
    }

    /// Rect pairs colliding this frame, with their side
    pub fn rect_sides(&self) -> &[(RectTagPair, CollisionSide)] {
        &self.rect_sides
    }

    /// Every touching side, `collidable1`'s perspective
    pub fn sides(&self) -> &BTreeSet<CollisionSide> {
        &self.sides
    }

    /// Touching sides that passed the response gate, `collidable1`'s perspective
    pub fn responsive_sides(&self) -> &BTreeSet<CollisionSide> {
        &self.responsive_sides
    }

    /// Rect pairs skipped for the next frame
    pub fn ignored_collisions(&self) -> &[RectTagPair] {
        &self.ignored_collisions
    }

    /// True iff any side touches
    pub fn is_contacting(&self) -> bool {
        !self.sides.is_empty()
    }

    /// True iff any side produced a collision response
    pub fn is_colliding(&self) -> bool {
        !self.responsive_sides.is_empty()
    }

    /// Skip the rect pair (`tag1` on `collidable1`, `tag2` on `collidable2`) next frame
    pub fn ignore_collision(&mut self, tag1: impl Into<String>, tag2: impl Into<String>) {
        let tags = (tag1.into(), tag2.into());
        if !self.ignored_collisions.contains(&tags) {
            self.ignored_collisions.push(tags);
        }
    }

    /// True if the rect pair is skipped next frame
    pub fn is_ignored(&self, tag1: &str, tag2: &str) -> bool {
        self.ignored_collisions.iter().any(|(a, b)| a == tag1 && b == tag2)
    }

    /// Sides from `key`'s perspective
    pub fn sides_for(&self, key: CollidableKey) -> Vec<CollisionSide> {
        self.oriented_sides(&self.sides, key)
    }

    /// Responsive sides from `key`'s perspective
    pub fn responsive_sides_for(&self, key: CollidableKey) -> Vec<CollisionSide> {
        self.oriented_sides(&self.responsive_sides, key)
    }

    /// Rect pairs touching `side` of `key`, with `key`'s tag first
    pub fn rect_pairs_on_side_for(&self, key: CollidableKey, side: CollisionSide) -> Vec<RectTagPair> {
        let flip = key == self.collidable2();
        let side = if flip { side.opposite() } else { side };
        self.rect_sides
            .iter()
            .filter(|(_, s)| *s == side)
            .map(|(tags, _)| orient(tags, flip))
            .collect()
    }

    /// All rect pairs touching `key`, with `key`'s tag first
    pub fn rect_pairs_for(&self, key: CollidableKey) -> Vec<RectTagPair> {
        let flip = key == self.collidable2();
        self.rect_sides.iter().map(|(tags, _)| orient(tags, flip)).collect()
    }

    /// Ignored rect pairs with `key`'s tag first
    pub fn ignored_collisions_for(&self, key: CollidableKey) -> Vec<RectTagPair> {
        let flip = key == self.collidable2();
        self.ignored_collisions.iter().map(|tags| orient(tags, flip)).collect()
    }

    pub(crate) fn record(&mut self, tags: RectTagPair, side: CollisionSide, responsive: bool) {
        self.sides.insert(side);
        if responsive {
            self.responsive_sides.insert(side);
        }
        self.rect_sides.push((tags, side));
    }

    /// Same contacts, carried into a frame where one body sleeps
    pub(crate) fn frozen(&self) -> Self {
        Self {
            priority_rects: self.rect_sides.clone(),
            ignored_collisions: Vec::new(),
            ..self.clone()
        }
    }

    fn oriented_sides(&self, sides: &BTreeSet<CollisionSide>, key: CollidableKey) -> Vec<CollisionSide> {
        if key == self.collidable2() {
            sides.iter().map(|s| s.opposite()).collect()
        } else {
            sides.iter().copied().collect()
        }
    }
}

fn orient(tags: &RectTagPair, flip: bool) -> RectTagPair {
    if flip {
        (tags.1.clone(), tags.0.clone())
    } else {
        tags.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::HandleMap;

    fn keys() -> (CollidableKey, CollidableKey) {
        let mut map: HandleMap<CollidableKey, ()> = HandleMap::with_key();
        (map.insert(()), map.insert(()))
    }

    #[test]
    fn test_identity_is_unordered() {
        let (a, b) = keys();
        assert_eq!(PairKey::new(a, b), PairKey::new(b, a));
        assert_eq!(CollisionPair::new(b, a).collidable1(), CollisionPair::new(a, b).collidable1());
    }

    #[test]
    fn test_perspective_flip() {
        let (a, b) = keys();
        let mut pair = CollisionPair::new(a, b);
        let first = pair.collidable1();
        let second = pair.collidable2();
        pair.record(("feet".into(), "floor".into()), CollisionSide::Bottom, true);

        assert!(pair.is_contacting());
        assert_eq!(pair.sides_for(first), vec![CollisionSide::Bottom]);
        assert_eq!(pair.sides_for(second), vec![CollisionSide::Top]);
        assert_eq!(
            pair.rect_pairs_on_side_for(second, CollisionSide::Top),
            vec![("floor".to_string(), "feet".to_string())]
        );
        assert_eq!(pair.other(first), Some(second));
    }

    #[test]
    fn test_unresponsive_side_still_contacts() {
        let (a, b) = keys();
        let mut pair = CollisionPair::new(a, b);
        pair.record(("a".into(), "b".into()), CollisionSide::Left, false);

        assert!(pair.is_contacting());
        assert!(!pair.is_colliding());
    }

    #[test]
    fn test_successor_keeps_priorities_not_ignores() {
        let (a, b) = keys();
        let mut pair = CollisionPair::new(a, b);
        pair.record(("x".into(), "y".into()), CollisionSide::Right, true);
        pair.ignore_collision("x", "y");
        pair.ignore_collision("x", "y");
        assert_eq!(pair.ignored_collisions().len(), 1);
        assert!(pair.is_ignored("x", "y"));

        let next = CollisionPair::successor(Some(&pair), a, b);
        assert_eq!(next.priority_side(&("x".into(), "y".into())), Some(CollisionSide::Right));
        assert!(next.ignored_collisions().is_empty());
        assert!(!next.is_contacting());
    }
}
