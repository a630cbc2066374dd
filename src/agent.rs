//! Autonomous agents.
//!
//! An agent is either waiting for a new target or seeking the one it has.
//! While waiting it reads the open paths of the cell it stands in, picks
//! one (usually not the way it came) and targets the centre of the next
//! cell. While seeking it steers straight at that point.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::direction::Direction;
use crate::geometry::{Geometry, Rect, Vec2};
use crate::grid::MazeGrid;

/// Probability of dropping the way back from the candidate paths.
pub const DEFAULT_REVERSAL_AVOIDANCE: f64 = 0.9;
/// Fraction of the speed covered per tick while far from the target.
pub const DEFAULT_APPROACH_FRACTION: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentParams {
    pub reversal_avoidance: f64,
    pub approach_fraction: f32,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            reversal_avoidance: DEFAULT_REVERSAL_AVOIDANCE,
            approach_fraction: DEFAULT_APPROACH_FRACTION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AgentMode {
    #[default]
    Waiting,
    Seeking {
        target: Vec2,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgentState {
    mode: AgentMode,
    direction: Option<Direction>,
}

impl AgentState {
    pub fn mode(&self) -> AgentMode {
        self.mode
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn target(&self) -> Option<Vec2> {
        match self.mode {
            AgentMode::Seeking { target } => Some(target),
            AgentMode::Waiting => None,
        }
    }

    pub(crate) fn rescale_target(&mut self, sx: f32, sy: f32) {
        if let AgentMode::Seeking { target } = &mut self.mode {
            target.x *= sx;
            target.y *= sy;
        }
    }

    /// Advances the agent by one tick. A waiting agent picks its next target
    /// and starts moving towards it in the same tick.
    pub fn step(
        &mut self,
        body: &mut Rect,
        speed: f32,
        grid: &MazeGrid,
        geometry: &Geometry,
        params: &AgentParams,
        rng: &mut impl Rng,
    ) {
        if self.mode == AgentMode::Waiting {
            self.pick_target(body.center(), grid, geometry, params, rng);
        }
        if let AgentMode::Seeking { target } = self.mode {
            if seek(body, target, speed, params.approach_fraction) {
                debug!(x = target.x, y = target.y, "agent reached target");
                self.mode = AgentMode::Waiting;
            }
        }
    }

    fn pick_target(
        &mut self,
        position: Vec2,
        grid: &MazeGrid,
        geometry: &Geometry,
        params: &AgentParams,
        rng: &mut impl Rng,
    ) {
        let Some(loc) = geometry.cell_at(position) else {
            return;
        };
        let paths = grid.open_directions(loc);
        let Some(dir) = choose_direction(&paths, self.direction, params.reversal_avoidance, rng)
        else {
            return;
        };
        let next = grid.neighbour(loc, dir);
        self.direction = Some(dir);
        self.mode = AgentMode::Seeking {
            target: geometry.cell_center(next),
        };
        debug!(?loc, ?dir, "agent picked direction");
    }
}

/// Paths an agent heading `current` may take next. The way back is removed
/// with probability `avoidance`, unless it is the only way out. Values above
/// 1 always remove it; NaN never does.
pub fn candidate_paths(
    paths: &[Direction],
    current: Option<Direction>,
    avoidance: f64,
    rng: &mut impl Rng,
) -> Vec<Direction> {
    let mut candidates = paths.to_vec();
    if let Some(back) = current.map(Direction::opposite) {
        if candidates.len() > 1 && candidates.contains(&back) && rng.gen::<f64>() < avoidance {
            candidates.retain(|d| *d != back);
        }
    }
    candidates
}

/// Uniform choice among the candidate paths. `None` for a sealed cell.
pub fn choose_direction(
    paths: &[Direction],
    current: Option<Direction>,
    avoidance: f64,
    rng: &mut impl Rng,
) -> Option<Direction> {
    candidate_paths(paths, current, avoidance, rng)
        .choose(rng)
        .copied()
}

/// Moves `body` towards `target`. Returns true once it has snapped onto it.
fn seek(body: &mut Rect, target: Vec2, speed: f32, fraction: f32) -> bool {
    let center = body.center();
    let (dx, dy) = (target.x - center.x, target.y - center.y);
    let distance = center.distance(&target);
    if distance > speed {
        let step = speed * fraction / distance;
        body.translate(dx * step, dy * step);
        false
    } else {
        body.set_center(target);
        true
    }
}
