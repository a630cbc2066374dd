//! Runners and targets: everything that occupies a cell and gets drawn on
//! top of the maze.

use crate::agent::AgentState;
use crate::collision::Collidable;
use crate::geometry::{Rect, Size, Vec2};
use crate::grid::Location;
use crate::input::KeyMap;
use crate::mask::{Mask, Shape};

/// Image handle the renderer draws at a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sprite {
    Border,
    Player(u8),
    Agent,
    Target,
}

pub type RunnerId = u32;

/// What drives a runner each tick.
#[derive(Debug, Clone, PartialEq)]
pub enum RunnerKind {
    /// Moved by held keys.
    Player { keys: KeyMap },
    /// Walks cell to cell on its own.
    Agent(AgentState),
}

/// A player or autonomous agent.
///
/// The rectangle and mask belong to the runner alone; maze state is only
/// ever read.
#[derive(Debug, Clone, PartialEq)]
pub struct Runner {
    id: RunnerId,
    kind: RunnerKind,
    sprite: Sprite,
    shape: Shape,
    spawn: Location,
    rect: Rect,
    mask: Mask,
    speed: Vec2,
}

impl Runner {
    pub fn player(id: RunnerId, index: u8, keys: KeyMap, spawn: Location, center: Vec2) -> Self {
        Self::new(id, RunnerKind::Player { keys }, Sprite::Player(index), spawn, center)
    }

    pub fn agent(id: RunnerId, spawn: Location, center: Vec2) -> Self {
        Self::new(id, RunnerKind::Agent(AgentState::default()), Sprite::Agent, spawn, center)
    }

    fn new(id: RunnerId, kind: RunnerKind, sprite: Sprite, spawn: Location, center: Vec2) -> Self {
        Self {
            id,
            kind,
            sprite,
            shape: Shape::Ellipse,
            spawn,
            rect: Rect::from_center(center, Size::default()),
            mask: Mask::empty(),
            speed: Vec2::ZERO,
        }
    }

    pub fn id(&self) -> RunnerId {
        self.id
    }

    pub fn kind(&self) -> &RunnerKind {
        &self.kind
    }

    pub fn sprite(&self) -> Sprite {
        self.sprite
    }

    pub fn spawn(&self) -> Location {
        self.spawn
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, RunnerKind::Player { .. })
    }

    pub fn keys(&self) -> Option<KeyMap> {
        match self.kind {
            RunnerKind::Player { keys } => Some(keys),
            RunnerKind::Agent(_) => None,
        }
    }

    pub fn agent_state(&self) -> Option<&AgentState> {
        match &self.kind {
            RunnerKind::Agent(state) => Some(state),
            RunnerKind::Player { .. } => None,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    pub fn place(&mut self, center: Vec2) {
        self.rect.set_center(center);
    }

    pub fn speed(&self) -> Vec2 {
        self.speed
    }

    pub(crate) fn translate(&mut self, dx: f32, dy: f32) {
        self.rect.translate(dx, dy);
    }

    pub(crate) fn set_x(&mut self, x: f32) {
        self.rect.x = x;
    }

    pub(crate) fn set_y(&mut self, y: f32) {
        self.rect.y = y;
    }

    /// Splits the runner into its body and its agent state, for steps that
    /// move one while updating the other.
    pub(crate) fn agent_parts(&mut self) -> Option<(&mut Rect, &mut AgentState, Vec2)> {
        match &mut self.kind {
            RunnerKind::Agent(state) => Some((&mut self.rect, state, self.speed)),
            RunnerKind::Player { .. } => None,
        }
    }

    /// Resizes the sprite to `scale` times the cell size, keeping its centre,
    /// and rebuilds the mask.
    pub fn scale_to(&mut self, cell: Size, scale: f32) {
        let center = self.center();
        self.rect = Rect::from_center(center, cell.scaled(scale));
        self.mask = Mask::for_shape(self.shape, self.rect.width, self.rect.height);
    }

    /// Derives per-axis speed from the playable area so motion covers the
    /// same fraction of the maze at any resolution.
    pub fn update_speed(&mut self, area: Size, divisor: f32, target_fps: u32) {
        let frame = target_fps.max(1) as f32 / 60.0;
        self.speed = Vec2::new(area.width / divisor / frame, area.height / divisor / frame);
    }

    /// Moves the runner so it keeps the same relative position when the area
    /// changes from `old` to `new`.
    pub fn relocate(&mut self, old: Size, new: Size) {
        let (sx, sy) = (new.width / old.width, new.height / old.height);
        let c = self.center();
        self.place(Vec2::new(c.x * sx, c.y * sy));
        if let RunnerKind::Agent(state) = &mut self.kind {
            state.rescale_target(sx, sy);
        }
    }
}

impl Collidable for Runner {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn mask(&self) -> &Mask {
        &self.mask
    }
}

/// A collectible placed at a cell centre.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    spawn: Location,
    rect: Rect,
    mask: Mask,
}

impl Target {
    pub fn new(spawn: Location, center: Vec2) -> Self {
        Self {
            spawn,
            rect: Rect::from_center(center, Size::default()),
            mask: Mask::empty(),
        }
    }

    pub fn spawn(&self) -> Location {
        self.spawn
    }

    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    pub fn place(&mut self, center: Vec2) {
        self.rect.set_center(center);
    }

    pub fn scale_to(&mut self, cell: Size, scale: f32) {
        let center = self.center();
        self.rect = Rect::from_center(center, cell.scaled(scale));
        self.mask = Mask::for_shape(Shape::Filled, self.rect.width, self.rect.height);
    }

    pub fn relocate(&mut self, old: Size, new: Size) {
        let c = self.center();
        self.place(Vec2::new(
            c.x * new.width / old.width,
            c.y * new.height / old.height,
        ));
    }
}

impl Collidable for Target {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn mask(&self) -> &Mask {
        &self.mask
    }
}
