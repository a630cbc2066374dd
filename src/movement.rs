//! Player movement with axis-separated collision resolution.

use std::f32::consts::FRAC_1_SQRT_2;

use crate::collision::{overlaps, Collidable};
use crate::geometry::Vec2;
use crate::input::HeldDirections;
use crate::runner::Runner;

/// Per-tick displacement for the held directions.
///
/// Opposite keys cancel on their axis. When both axes move, each is scaled
/// by 1/sqrt(2) so diagonal speed matches axial speed.
pub fn velocity(held: HeldDirections, speed: Vec2) -> Vec2 {
    let (ax, ay) = (held.axis_x(), held.axis_y());
    let scale = if ax != 0.0 && ay != 0.0 {
        FRAC_1_SQRT_2
    } else {
        1.0
    };
    Vec2::new(ax * speed.x * scale, ay * speed.y * scale)
}

/// Which axes were blocked during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    pub blocked_x: bool,
    pub blocked_y: bool,
}

/// Moves `runner` horizontally, then vertically, undoing each axis on its
/// own when it ends up overlapping an obstacle.
pub fn step_player<O: Collidable>(
    runner: &mut Runner,
    held: HeldDirections,
    obstacles: &[O],
) -> MoveOutcome {
    let v = velocity(held, runner.speed());
    let mut outcome = MoveOutcome::default();

    if v.x != 0.0 {
        let before = runner.rect().x;
        runner.translate(v.x, 0.0);
        if overlaps(&*runner, obstacles) {
            runner.set_x(before);
            outcome.blocked_x = true;
        }
    }

    if v.y != 0.0 {
        let before = runner.rect().y;
        runner.translate(0.0, v.y);
        if overlaps(&*runner, obstacles) {
            runner.set_y(before);
            outcome.blocked_y = true;
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;
    use crate::geometry::{Border, Rect, Size};
    use crate::grid::Location;
    use crate::input::KeyMap;
    use crate::mask::{Mask, Shape};

    fn player_at(center: Vec2, speed: f32) -> Runner {
        let mut runner = Runner::player(0, 0, KeyMap::Arrows, Location::new(0, 0), center);
        runner.scale_to(Size::new(100.0, 100.0), 0.8);
        // 200px area at 60fps with divisor 200/speed.
        runner.update_speed(Size::new(200.0, 200.0), 200.0 / speed, 60);
        runner
    }

    fn wall(rect: Rect) -> Border {
        Border {
            cell: Location::new(0, 0),
            side: Direction::Right,
            mask: Mask::for_shape(Shape::Filled, rect.width, rect.height),
            rect,
        }
    }

    #[test]
    fn axial_and_diagonal_speed() {
        let speed = Vec2::new(6.0, 5.0);
        assert_eq!(velocity(HeldDirections::of(&[Direction::Right]), speed), Vec2::new(6.0, 0.0));
        assert_eq!(velocity(HeldDirections::of(&[Direction::Top]), speed), Vec2::new(0.0, -5.0));
        let diag = velocity(HeldDirections::of(&[Direction::Left, Direction::Bottom]), speed);
        assert!((diag.x + 6.0 * FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((diag.y - 5.0 * FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn opposite_keys_cancel_without_diagonal_scaling() {
        let speed = Vec2::new(6.0, 5.0);
        let held = HeldDirections::of(&[Direction::Left, Direction::Right, Direction::Bottom]);
        assert_eq!(velocity(held, speed), Vec2::new(0.0, 5.0));
        assert_eq!(velocity(HeldDirections::none(), speed), Vec2::ZERO);
    }

    #[test]
    fn free_movement_is_not_blocked() {
        let mut runner = player_at(Vec2::new(50.0, 50.0), 10.0);
        let walls = vec![wall(Rect::new(500.0, 0.0, 5.0, 100.0))];
        let outcome = step_player(&mut runner, HeldDirections::of(&[Direction::Right]), &walls);
        assert_eq!(outcome, MoveOutcome::default());
        assert_eq!(runner.center(), Vec2::new(60.0, 50.0));
    }

    #[test]
    fn blocked_axis_reverts_exactly() {
        let mut runner = player_at(Vec2::new(50.0, 50.0), 10.0);
        let walls = vec![wall(Rect::new(95.0, 0.0, 5.0, 100.0))];
        let outcome = step_player(&mut runner, HeldDirections::of(&[Direction::Right]), &walls);
        assert!(outcome.blocked_x);
        assert_eq!(runner.rect().x.to_bits(), 10.0f32.to_bits());
    }

    #[test]
    fn slides_along_wall_on_free_axis() {
        let mut runner = player_at(Vec2::new(50.0, 50.0), 10.0);
        let walls = vec![wall(Rect::new(95.0, 0.0, 5.0, 300.0))];
        let held = HeldDirections::of(&[Direction::Right, Direction::Bottom]);
        let outcome = step_player(&mut runner, held, &walls);
        assert!(outcome.blocked_x);
        assert!(!outcome.blocked_y);
        assert_eq!(runner.rect().x, 10.0);
        assert!((runner.rect().y - (10.0 + 10.0 * FRAC_1_SQRT_2)).abs() < 1e-4);
    }

    #[test]
    fn sprite_without_area_never_blocks() {
        let center = Vec2::new(50.0, 50.0);
        let mut runner = Runner::player(0, 0, KeyMap::Arrows, Location::new(0, 0), center);
        runner.update_speed(Size::new(200.0, 200.0), 20.0, 60);
        let walls = vec![wall(Rect::new(55.0, 0.0, 5.0, 100.0))];
        let outcome = step_player(&mut runner, HeldDirections::of(&[Direction::Right]), &walls);
        assert_eq!(outcome, MoveOutcome::default());
        assert_eq!(runner.center(), Vec2::new(60.0, 50.0));
    }
}
