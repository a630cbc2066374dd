use std::fmt;

use thiserror::Error;

/// Where the frontend is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Starting,
    DisplayInitialized,
    Gameplay,
    Resizing,
    Quitting,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameState::Starting => "starting",
            GameState::DisplayInitialized => "display initialized",
            GameState::Gameplay => "gameplay",
            GameState::Resizing => "resizing",
            GameState::Quitting => "quitting",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected game state to be one of {expected:?}, not {actual}")]
pub struct StateError {
    pub expected: Vec<GameState>,
    pub actual: GameState,
}

#[derive(Debug)]
pub struct StateMachine {
    state: GameState,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: GameState::Starting,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn assert_state_is(&self, expected: &[GameState]) -> Result<(), StateError> {
        if expected.contains(&self.state) {
            Ok(())
        } else {
            Err(StateError {
                expected: expected.to_vec(),
                actual: self.state,
            })
        }
    }

    /// Moves to `next` if the current state is one of `from`.
    pub fn advance(&mut self, from: &[GameState], next: GameState) -> Result<(), StateError> {
        self.assert_state_is(from)?;
        tracing::debug!(from = %self.state, to = %next, "state change");
        self.state = next;
        Ok(())
    }

    /// Quitting is allowed from anywhere.
    pub fn quit(&mut self) {
        self.state = GameState::Quitting;
    }

    pub fn is_quitting(&self) -> bool {
        self.state == GameState::Quitting
    }
}
