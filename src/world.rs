//! One maze with everything in it, stepped one tick at a time.
//!
//! Tick order is fixed: players move and collide with borders, then pick
//! up targets, then every agent runs its state machine, then agents that
//! touch a player are removed.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::agent::AgentParams;
use crate::collision::{collide, collisions, Collidable};
use crate::config::Config;
use crate::error::MazeError;
use crate::generator::{Backtracker, GenerationStats, MAX_EXTRA_PASSAGE_RATIO};
use crate::geometry::{Geometry, MazeLayout, Rect, Size};
use crate::grid::{Location, MazeGrid};
use crate::input::{HeldDirections, KeyMap};
use crate::movement::step_player;
use crate::runner::{Runner, RunnerId, Sprite, Target};

/// Targets are drawn smaller than runners.
pub const TARGET_SCALE: f32 = 0.5;

/// Everything a world needs to build and run a maze.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldParams {
    pub rows: usize,
    pub columns: usize,
    pub extra_passage_ratio: f64,
    pub border_factor: f32,
    pub sprite_scale: f32,
    pub speed_divisor: f32,
    pub target_fps: u32,
    pub agent_count: usize,
    pub target_count: usize,
    pub second_player: bool,
    pub agent: AgentParams,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for WorldParams {
    fn from(config: &Config) -> Self {
        Self {
            rows: config.maze.rows,
            columns: config.maze.columns,
            extra_passage_ratio: config.maze.extra_passage_ratio,
            border_factor: config.maze.border_factor,
            sprite_scale: config.runners.sprite_scale,
            speed_divisor: config.runners.speed_divisor,
            target_fps: config.display.target_fps,
            agent_count: config.runners.agent_count,
            target_count: config.runners.target_count,
            second_player: config.runners.second_player,
            agent: AgentParams {
                reversal_avoidance: config.runners.reversal_avoidance,
                approach_fraction: config.runners.approach_fraction,
            },
        }
    }
}

impl WorldParams {
    /// Checks every parameter is in its accepted range. NaN is never accepted.
    pub fn validate(&self) -> Result<(), MazeError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(MazeError::InvalidDimensions {
                rows: self.rows,
                columns: self.columns,
            });
        }
        if !(0.0..=MAX_EXTRA_PASSAGE_RATIO).contains(&self.extra_passage_ratio) {
            return Err(invalid("extra_passage_ratio", "must be in [0, 1]"));
        }
        if !(self.border_factor > 0.0 && self.border_factor < 0.5) {
            return Err(invalid("border_factor", "must be in (0, 0.5)"));
        }
        if !fraction(self.sprite_scale) {
            return Err(invalid("sprite_scale", "must be in (0, 1]"));
        }
        if !(self.speed_divisor.is_finite() && self.speed_divisor > 0.0) {
            return Err(invalid("speed_divisor", "must be positive"));
        }
        if self.target_fps == 0 {
            return Err(invalid("target_fps", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.agent.reversal_avoidance) {
            return Err(invalid("reversal_avoidance", "must be in [0, 1]"));
        }
        if !fraction(self.agent.approach_fraction) {
            return Err(invalid("approach_fraction", "must be in (0, 1]"));
        }
        Ok(())
    }
}

fn fraction(value: f32) -> bool {
    value > 0.0 && value <= 1.0
}

fn invalid(name: &'static str, reason: &'static str) -> MazeError {
    MazeError::InvalidParams { name, reason }
}

/// Something that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A player picked up the target spawned at `target`.
    TargetReached { player: RunnerId, target: Location },
    /// An agent touched a player and was taken out of play.
    AgentCaught { agent: RunnerId, player: RunnerId },
}

/// A sprite to draw at a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawable {
    pub rect: Rect,
    pub sprite: Sprite,
}

pub struct World {
    params: WorldParams,
    grid: MazeGrid,
    layout: MazeLayout,
    stats: GenerationStats,
    area: Size,
    last_valid_area: Option<Size>,
    runners: Vec<Runner>,
    targets: Vec<Target>,
    next_id: RunnerId,
}

impl World {
    /// Generates a maze for `params` laid out over `area` and populates it.
    /// Fails if `params` does not pass [`WorldParams::validate`].
    pub fn new(params: WorldParams, area: Size, rng: &mut impl Rng) -> Result<Self, MazeError> {
        let (grid, stats) = build_maze(&params, rng)?;
        let layout = MazeLayout::new(&grid, area, params.border_factor);
        let mut world = Self {
            params,
            grid,
            layout,
            stats,
            area,
            last_valid_area: (!area.is_degenerate()).then_some(area),
            runners: Vec::new(),
            targets: Vec::new(),
            next_id: 0,
        };
        world.populate(rng);
        Ok(world)
    }

    /// Throws the maze away and builds a fresh one for the current area.
    pub fn regenerate(&mut self, rng: &mut impl Rng) -> Result<(), MazeError> {
        let (grid, stats) = build_maze(&self.params, rng)?;
        self.grid = grid;
        self.stats = stats;
        self.layout = MazeLayout::new(&self.grid, self.area, self.params.border_factor);
        self.populate(rng);
        Ok(())
    }

    pub fn params(&self) -> &WorldParams {
        &self.params
    }

    pub fn grid(&self) -> &MazeGrid {
        &self.grid
    }

    pub fn layout(&self) -> &MazeLayout {
        &self.layout
    }

    pub fn geometry(&self) -> &Geometry {
        self.layout.geometry()
    }

    pub fn stats(&self) -> GenerationStats {
        self.stats
    }

    pub fn area(&self) -> Size {
        self.area
    }

    pub fn runners(&self) -> &[Runner] {
        &self.runners
    }

    pub fn runner(&self, id: RunnerId) -> Option<&Runner> {
        self.runners.iter().find(|r| r.id() == id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Runner> {
        self.runners.iter().filter(|r| r.is_player())
    }

    pub fn agents(&self) -> impl Iterator<Item = &Runner> {
        self.runners.iter().filter(|r| !r.is_player())
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Every target has been picked up.
    pub fn is_cleared(&self) -> bool {
        self.targets.is_empty()
    }

    /// Lays the world out over a new playable area.
    ///
    /// Runners and targets keep their position relative to the maze. While
    /// the area is degenerate nothing moves and all masks are empty.
    ///
    /// Border thickness follows the cell width on both axes, so a change of
    /// aspect ratio can leave a runner overlapping a horizontal strip. Until
    /// it moves clear, every step on the blocked axis is reverted.
    pub fn resize(&mut self, area: Size) {
        self.layout.recompute(&self.grid, area);
        self.area = area;
        if !area.is_degenerate() {
            match self.last_valid_area {
                Some(old) => {
                    for runner in &mut self.runners {
                        runner.relocate(old, area);
                    }
                    for target in &mut self.targets {
                        target.relocate(old, area);
                    }
                }
                None => self.respawn(),
            }
            self.last_valid_area = Some(area);
        }
        self.refit();
        debug!(width = area.width, height = area.height, "world resized");
    }

    /// Advances the world by one tick. `held` is indexed by player number;
    /// missing entries mean no keys held.
    pub fn step(&mut self, held: &[HeldDirections], rng: &mut impl Rng) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.area.is_degenerate() {
            return events;
        }

        let borders = self.layout.borders();
        for runner in self.runners.iter_mut() {
            if let Sprite::Player(index) = runner.sprite() {
                let keys = held.get(index as usize).copied().unwrap_or_default();
                step_player(runner, keys, borders);
            }
        }

        self.collect_targets(&mut events);

        let geometry = *self.layout.geometry();
        for runner in self.runners.iter_mut() {
            if let Some((body, state, speed)) = runner.agent_parts() {
                state.step(
                    body,
                    speed.x.min(speed.y),
                    &self.grid,
                    &geometry,
                    &self.params.agent,
                    rng,
                );
            }
        }

        self.catch_agents(&mut events);
        events
    }

    /// Draw list in back-to-front order: borders, targets, runners.
    pub fn drawables(&self) -> Vec<Drawable> {
        let borders = self.layout.borders().iter().map(|b| Drawable {
            rect: b.rect,
            sprite: Sprite::Border,
        });
        let targets = self.targets.iter().map(|t| Drawable {
            rect: t.rect(),
            sprite: Sprite::Target,
        });
        let runners = self.runners.iter().map(|r| Drawable {
            rect: r.rect(),
            sprite: r.sprite(),
        });
        borders.chain(targets).chain(runners).collect()
    }

    /// Adds an agent at the centre of `loc`.
    pub fn spawn_agent_at(&mut self, loc: Location) -> RunnerId {
        let id = self.allocate_id();
        let center = self.geometry().cell_center(loc);
        let mut agent = Runner::agent(id, loc, center);
        self.fit_runner(&mut agent);
        self.runners.push(agent);
        id
    }

    /// Adds a target at the centre of `loc`.
    pub fn spawn_target_at(&mut self, loc: Location) {
        let mut target = Target::new(loc, self.geometry().cell_center(loc));
        target.scale_to(self.geometry().cell_size(), TARGET_SCALE);
        self.targets.push(target);
    }

    fn allocate_id(&mut self) -> RunnerId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn populate(&mut self, rng: &mut impl Rng) {
        self.runners.clear();
        self.targets.clear();

        let last = Location::new(self.grid.rows() - 1, self.grid.columns() - 1);
        let mut starts = vec![(Location::new(0, 0), KeyMap::Arrows)];
        if self.params.second_player {
            starts.push((last, KeyMap::Wasd));
        }
        for (index, (loc, keys)) in starts.iter().enumerate() {
            let id = self.allocate_id();
            let center = self.geometry().cell_center(*loc);
            self.runners.push(Runner::player(id, index as u8, *keys, *loc, center));
        }
        let player_cells: Vec<Location> = starts.iter().map(|(loc, _)| *loc).collect();

        let free: Vec<Location> = self
            .grid
            .cells()
            .map(|c| c.location())
            .filter(|loc| !player_cells.contains(loc))
            .collect();

        let reach = (self.grid.rows() + self.grid.columns() - 2) / 2;
        let mut far: Vec<Location> = free
            .iter()
            .copied()
            .filter(|loc| player_cells.iter().all(|p| p.manhattan(*loc) >= reach))
            .collect();
        if far.is_empty() {
            far = if free.is_empty() { player_cells.clone() } else { free.clone() };
        }
        far.shuffle(rng);
        for i in 0..self.params.agent_count {
            self.spawn_agent_at(far[i % far.len()]);
        }

        let mut spots = free;
        spots.shuffle(rng);
        for loc in spots.into_iter().take(self.params.target_count) {
            self.spawn_target_at(loc);
        }

        self.refit();
        info!(
            players = player_cells.len(),
            agents = self.params.agent_count,
            targets = self.targets.len(),
            "world populated"
        );
    }

    /// Puts everything back on its spawn cell.
    fn respawn(&mut self) {
        let geometry = *self.layout.geometry();
        for runner in &mut self.runners {
            runner.place(geometry.cell_center(runner.spawn()));
        }
        for target in &mut self.targets {
            target.place(geometry.cell_center(target.spawn()));
        }
    }

    /// Rescales every sprite and speed to the current geometry.
    fn refit(&mut self) {
        let cell = self.geometry().cell_size();
        let (scale, area, divisor, fps) = (
            self.params.sprite_scale,
            self.area,
            self.params.speed_divisor,
            self.params.target_fps,
        );
        for runner in &mut self.runners {
            runner.scale_to(cell, scale);
            runner.update_speed(area, divisor, fps);
        }
        for target in &mut self.targets {
            target.scale_to(cell, TARGET_SCALE);
        }
    }

    fn fit_runner(&self, runner: &mut Runner) {
        runner.scale_to(self.geometry().cell_size(), self.params.sprite_scale);
        runner.update_speed(self.area, self.params.speed_divisor, self.params.target_fps);
    }

    fn collect_targets(&mut self, events: &mut Vec<GameEvent>) {
        let mut taken: Vec<usize> = Vec::new();
        for player in self.runners.iter().filter(|r| r.is_player()) {
            for index in collisions(player, &self.targets) {
                if !taken.contains(&index) {
                    taken.push(index);
                    let target = self.targets[index].spawn();
                    info!(player = player.id(), ?target, "target reached");
                    events.push(GameEvent::TargetReached {
                        player: player.id(),
                        target,
                    });
                }
            }
        }
        taken.sort_unstable();
        for index in taken.into_iter().rev() {
            self.targets.remove(index);
        }
    }

    fn catch_agents(&mut self, events: &mut Vec<GameEvent>) {
        let mut caught: Vec<RunnerId> = Vec::new();
        for agent in self.runners.iter().filter(|r| !r.is_player()) {
            let catcher = self
                .runners
                .iter()
                .filter(|r| r.is_player())
                .find(|p| collide(agent, *p));
            if let Some(player) = catcher {
                info!(agent = agent.id(), player = player.id(), "agent caught");
                events.push(GameEvent::AgentCaught {
                    agent: agent.id(),
                    player: player.id(),
                });
                caught.push(agent.id());
            }
        }
        self.runners.retain(|r| !caught.contains(&r.id()));
    }
}

fn build_maze(
    params: &WorldParams,
    rng: &mut impl Rng,
) -> Result<(MazeGrid, GenerationStats), MazeError> {
    params.validate()?;
    let mut grid = MazeGrid::new(params.rows, params.columns)?;
    let stats = Backtracker::new(params.extra_passage_ratio).generate(&mut grid, rng);
    Ok((grid, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::overlaps;
    use crate::direction::Direction;
    use crate::geometry::Vec2;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn params(rows: usize, columns: usize) -> WorldParams {
        WorldParams {
            rows,
            columns,
            ..WorldParams::default()
        }
    }

    fn empty_params(rows: usize, columns: usize) -> WorldParams {
        WorldParams {
            agent_count: 0,
            target_count: 0,
            ..params(rows, columns)
        }
    }

    #[test]
    fn rejects_empty_maze() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = World::new(params(0, 4), Size::new(100.0, 100.0), &mut rng).err();
        assert_eq!(err, Some(MazeError::InvalidDimensions { rows: 0, columns: 4 }));
    }

    #[test]
    fn rejects_out_of_range_avoidance() {
        let mut rng = StdRng::seed_from_u64(0);
        for avoidance in [1.5, -0.1, f64::NAN] {
            let mut bad = params(4, 4);
            bad.agent.reversal_avoidance = avoidance;
            let err = World::new(bad, Size::new(100.0, 100.0), &mut rng).err();
            assert_eq!(
                err,
                Some(MazeError::InvalidParams {
                    name: "reversal_avoidance",
                    reason: "must be in [0, 1]",
                })
            );
        }
    }

    #[test]
    fn rejects_out_of_range_generation_params() {
        let mut rng = StdRng::seed_from_u64(0);
        let area = Size::new(100.0, 100.0);
        let cases = [
            WorldParams { extra_passage_ratio: 1e9, ..params(4, 4) },
            WorldParams { extra_passage_ratio: f64::NAN, ..params(4, 4) },
            WorldParams { border_factor: 0.5, ..params(4, 4) },
            WorldParams { sprite_scale: 0.0, ..params(4, 4) },
            WorldParams { speed_divisor: f32::INFINITY, ..params(4, 4) },
            WorldParams { target_fps: 0, ..params(4, 4) },
        ];
        for case in cases {
            let err = World::new(case.clone(), area, &mut rng).err();
            assert!(
                matches!(err, Some(MazeError::InvalidParams { .. })),
                "accepted {case:?}"
            );
        }
        assert!(WorldParams::default().validate().is_ok());
    }

    #[test]
    fn population_follows_params() {
        let mut rng = StdRng::seed_from_u64(5);
        let world = World::new(params(10, 10), Size::new(1000.0, 1000.0), &mut rng).unwrap();
        let player = world.players().next().unwrap();
        assert_eq!(player.spawn(), Location::new(0, 0));
        assert_eq!(player.center(), Vec2::new(50.0, 50.0));
        assert_eq!(world.agents().count(), 1);
        for agent in world.agents() {
            assert!(agent.spawn().manhattan(Location::new(0, 0)) >= 9);
        }
        assert_eq!(world.targets().len(), 3);
        let cells: HashSet<Location> = world.targets().iter().map(|t| t.spawn()).collect();
        assert_eq!(cells.len(), 3);
        assert!(!cells.contains(&Location::new(0, 0)));
    }

    #[test]
    fn second_player_starts_in_far_corner() {
        let mut rng = StdRng::seed_from_u64(5);
        let p = WorldParams {
            second_player: true,
            ..params(4, 6)
        };
        let world = World::new(p, Size::new(600.0, 400.0), &mut rng).unwrap();
        let players: Vec<&Runner> = world.players().collect();
        assert_eq!(players.len(), 2);
        assert_eq!(players[1].spawn(), Location::new(3, 5));
        assert_eq!(players[1].keys(), Some(KeyMap::Wasd));
    }

    #[test]
    fn drawables_cover_everything() {
        let mut rng = StdRng::seed_from_u64(8);
        let world = World::new(params(5, 5), Size::new(500.0, 500.0), &mut rng).unwrap();
        let drawables = world.drawables();
        let expected =
            world.layout().borders().len() + world.targets().len() + world.runners().len();
        assert_eq!(drawables.len(), expected);
        assert_eq!(drawables[0].sprite, Sprite::Border);
        assert_eq!(drawables.last().unwrap().sprite, Sprite::Agent);
    }

    #[test]
    fn player_on_target_collects_it() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut world = World::new(empty_params(3, 3), Size::new(300.0, 300.0), &mut rng).unwrap();
        world.spawn_target_at(Location::new(0, 0));
        assert!(!world.is_cleared());
        let events = world.step(&[], &mut rng);
        assert_eq!(
            events,
            vec![GameEvent::TargetReached {
                player: 0,
                target: Location::new(0, 0)
            }]
        );
        assert!(world.is_cleared());
    }

    #[test]
    fn agent_touching_player_is_removed() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut world = World::new(empty_params(3, 3), Size::new(300.0, 300.0), &mut rng).unwrap();
        let agent = world.spawn_agent_at(Location::new(0, 0));
        let events = world.step(&[], &mut rng);
        assert_eq!(events, vec![GameEvent::AgentCaught { agent, player: 0 }]);
        assert_eq!(world.agents().count(), 0);
    }

    #[test]
    fn players_never_end_inside_borders() {
        let mut rng = StdRng::seed_from_u64(31);
        let mut world = World::new(empty_params(6, 6), Size::new(600.0, 600.0), &mut rng).unwrap();
        let mut held = HeldDirections::none();
        for tick in 0..3000 {
            if tick % 25 == 0 {
                held = HeldDirections::none();
                for dir in Direction::ALL {
                    if rng.gen_bool(0.4) {
                        held.press(dir);
                    }
                }
            }
            world.step(&[held], &mut rng);
            let player = world.players().next().unwrap();
            assert!(!overlaps(player, world.layout().borders()), "tick {tick}");
        }
    }

    #[test]
    fn degenerate_resize_pauses_and_keeps_positions() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut world = World::new(params(4, 4), Size::new(400.0, 400.0), &mut rng).unwrap();
        let before: Vec<Vec2> = world.runners().iter().map(|r| r.center()).collect();
        world.resize(Size::new(0.0, 400.0));
        assert!(world.runners().iter().all(|r| r.mask().is_empty()));
        assert!(world.step(&[HeldDirections::of(&[Direction::Right])], &mut rng).is_empty());
        let during: Vec<Vec2> = world.runners().iter().map(|r| r.center()).collect();
        assert_eq!(before, during);

        world.resize(Size::new(800.0, 200.0));
        let player = world.players().next().unwrap();
        assert_eq!(player.center(), Vec2::new(100.0, 25.0));
        assert!(!player.mask().is_empty());
    }

    #[test]
    fn first_valid_area_respawns_from_cells() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut world = World::new(params(10, 10), Size::new(0.0, 0.0), &mut rng).unwrap();
        world.resize(Size::new(500.0, 500.0));
        let player = world.players().next().unwrap();
        assert_eq!(player.center(), Vec2::new(25.0, 25.0));
        for target in world.targets() {
            assert_eq!(target.center(), world.geometry().cell_center(target.spawn()));
        }
    }

    #[test]
    fn regenerate_builds_new_connected_maze() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut world = World::new(params(8, 8), Size::new(800.0, 800.0), &mut rng).unwrap();
        let first = world.grid().clone();
        world.step(&[HeldDirections::of(&[Direction::Right])], &mut rng);
        world.regenerate(&mut rng).unwrap();
        assert_ne!(world.grid(), &first);
        assert!(world.grid().is_fully_connected());
        assert_eq!(world.players().next().unwrap().center(), Vec2::new(50.0, 50.0));
        assert_eq!(world.targets().len(), 3);
    }

    proptest! {
        #[test]
        fn resize_round_trip_restores_relative_positions(
            w1 in 100.0f32..2000.0,
            h1 in 100.0f32..2000.0,
            w2 in 100.0f32..2000.0,
            h2 in 100.0f32..2000.0,
            seed in any::<u64>(),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let s1 = Size::new(w1, h1);
            let mut world = World::new(params(5, 7), s1, &mut rng).unwrap();
            for _ in 0..10 {
                world.step(&[HeldDirections::of(&[Direction::Bottom])], &mut rng);
            }
            let before: Vec<Vec2> = world.runners().iter().map(|r| r.center()).collect();
            world.resize(Size::new(w2, h2));
            world.resize(s1);
            for (runner, old) in world.runners().iter().zip(&before) {
                let now = runner.center();
                prop_assert!(((now.x - old.x) / w1).abs() < 1e-4);
                prop_assert!(((now.y - old.y) / h1).abs() < 1e-4);
            }
        }
    }
}
