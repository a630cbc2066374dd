use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use crate::direction::Direction;

/// Directions currently held by one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeldDirections {
    held: [bool; 4],
}

impl HeldDirections {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn of(dirs: &[Direction]) -> Self {
        let mut held = Self::none();
        for dir in dirs {
            held.press(*dir);
        }
        held
    }

    pub fn press(&mut self, dir: Direction) {
        self.held[dir.index()] = true;
    }

    pub fn is_held(&self, dir: Direction) -> bool {
        self.held[dir.index()]
    }

    pub fn is_empty(&self) -> bool {
        !self.held.iter().any(|h| *h)
    }

    /// Net horizontal intent: -1 left, 1 right, 0 for none or both.
    pub fn axis_x(&self) -> f32 {
        axis(self.is_held(Direction::Left), self.is_held(Direction::Right))
    }

    /// Net vertical intent: -1 up, 1 down, 0 for none or both.
    pub fn axis_y(&self) -> f32 {
        axis(self.is_held(Direction::Top), self.is_held(Direction::Bottom))
    }
}

fn axis(negative: bool, positive: bool) -> f32 {
    match (negative, positive) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}

/// Keyboard layout for one local player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMap {
    /// Arrow keys.
    Arrows,
    /// W/A/S/D, for a second player sharing the keyboard.
    Wasd,
}

impl KeyMap {
    pub fn direction_for(self, code: KeyCode) -> Option<Direction> {
        match (self, code) {
            (KeyMap::Arrows, KeyCode::Up) => Some(Direction::Top),
            (KeyMap::Arrows, KeyCode::Down) => Some(Direction::Bottom),
            (KeyMap::Arrows, KeyCode::Left) => Some(Direction::Left),
            (KeyMap::Arrows, KeyCode::Right) => Some(Direction::Right),
            (KeyMap::Wasd, KeyCode::Char(c)) => match c.to_ascii_lowercase() {
                'w' => Some(Direction::Top),
                's' => Some(Direction::Bottom),
                'a' => Some(Direction::Left),
                'd' => Some(Direction::Right),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Turns key press and repeat events into a held set.
///
/// Terminals only report presses and auto-repeats, so a direction counts
/// as held for `hold` after its last event.
#[derive(Debug, Clone)]
pub struct HoldTracker {
    last_seen: [Option<Instant>; 4],
    hold: Duration,
}

impl HoldTracker {
    pub fn new(hold: Duration) -> Self {
        Self {
            last_seen: [None; 4],
            hold,
        }
    }

    pub fn record(&mut self, dir: Direction, at: Instant) {
        self.last_seen[dir.index()] = Some(at);
        // A fresh press cancels the opposite direction still inside its window.
        self.last_seen[dir.opposite().index()] = None;
    }

    pub fn held(&self, now: Instant) -> HeldDirections {
        let mut held = HeldDirections::none();
        for dir in Direction::ALL {
            if let Some(t) = self.last_seen[dir.index()] {
                if now.saturating_duration_since(t) <= self.hold {
                    held.press(dir);
                }
            }
        }
        held
    }
}
