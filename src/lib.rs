//! Procedurally generated mazes with collision-aware runners.
//!
//! A [`grid::MazeGrid`] is carved by the [`generator::Backtracker`], laid out
//! in pixels by [`geometry::MazeLayout`] and populated by a [`world::World`]
//! holding players, autonomous agents and targets. Rendering and input
//! polling live in the binary.

pub mod agent;
pub mod cell;
pub mod collision;
pub mod config;
pub mod direction;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod grid;
pub mod input;
pub mod mask;
pub mod movement;
pub mod runner;
pub mod world;

pub use config::Config;
pub use error::{ConfigError, MazeError};
pub use world::{Drawable, GameEvent, World, WorldParams};
