//! Two-phase overlap tests between runners, borders and targets.
//!
//! A cheap rectangle intersection rules out most candidates; only the
//! survivors pay for the per-pixel mask comparison.

use crate::geometry::{Border, Rect};
use crate::mask::Mask;

/// Anything with a bounding rectangle and a pixel mask anchored at its
/// top-left corner.
pub trait Collidable {
    fn rect(&self) -> Rect;
    fn mask(&self) -> &Mask;
}

impl Collidable for Border {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn mask(&self) -> &Mask {
        &self.mask
    }
}

/// Precise overlap between two collidables.
pub fn collide<A, B>(a: &A, b: &B) -> bool
where
    A: Collidable + ?Sized,
    B: Collidable + ?Sized,
{
    let (ra, rb) = (a.rect(), b.rect());
    if !ra.intersects(&rb) {
        return false;
    }
    let dx = rb.x.floor() as i64 - ra.x.floor() as i64;
    let dy = rb.y.floor() as i64 - ra.y.floor() as i64;
    a.mask().overlaps(b.mask(), dx, dy)
}

/// Whether `entity` overlaps at least one obstacle.
pub fn overlaps<E, O>(entity: &E, obstacles: &[O]) -> bool
where
    E: Collidable + ?Sized,
    O: Collidable,
{
    obstacles.iter().any(|o| collide(entity, o))
}

/// Indices of every obstacle `entity` overlaps.
pub fn collisions<E, O>(entity: &E, obstacles: &[O]) -> Vec<usize>
where
    E: Collidable + ?Sized,
    O: Collidable,
{
    obstacles
        .iter()
        .enumerate()
        .filter(|(_, o)| collide(entity, *o))
        .map(|(i, _)| i)
        .collect()
}
