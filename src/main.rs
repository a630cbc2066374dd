//! Terminal frontend: plays a honeymaze inside the alternate screen.
mod render;
mod state;

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use honeymaze::config::{Config, DisplayConfig, CONFIG_FILE};
use honeymaze::geometry::Size;
use honeymaze::input::{HeldDirections, HoldTracker, KeyMap};
use honeymaze::world::{GameEvent, World, WorldParams};
use render::{Renderer, CELL_W, PX_PER_CELL};
use state::{GameState, StateMachine};

fn main() -> Result<()> {
    let _guard = setup_logging()?;
    let config = load_config()?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &config);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    if let Err(err) = &result {
        tracing::error!("honeymaze stopped: {err:#}");
    }
    result
}

/// Logs go to a file: stdout belongs to the terminal UI.
fn setup_logging() -> Result<WorkerGuard> {
    let log_dir = std::env::var_os("HONEYMAZE_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("honeymaze"));
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "honeymaze.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("honeymaze=info"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    info!("Log file: {}/honeymaze.log", log_dir.display());
    Ok(guard)
}

fn load_config() -> Result<Config> {
    let path = std::env::var_os("HONEYMAZE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    Config::load_from(&path).with_context(|| format!("loading config from {}", path.display()))
}

/// Playable area for a terminal of `term` columns x rows, one row kept for
/// the HUD. Returns the area in pixels and its raster size in cells.
fn playable_area(term: (u16, u16), display: &DisplayConfig) -> (Size, usize, usize) {
    let mut width = (term.0 as usize / CELL_W) as f32 * PX_PER_CELL;
    let mut height = (term.1 as usize).saturating_sub(1) as f32 * PX_PER_CELL;
    if !display.fullscreen {
        width = width.min(display.width as f32);
        height = height.min(display.height as f32);
    }
    let columns = (width / PX_PER_CELL).floor() as usize;
    let rows = (height / PX_PER_CELL).floor() as usize;
    let area = Size::new(columns as f32 * PX_PER_CELL, rows as f32 * PX_PER_CELL);
    (area, columns, rows)
}

fn run(stdout: &mut Stdout, config: &Config) -> Result<()> {
    let mut machine = StateMachine::new();
    let mut rng = match config.maze.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let (area, columns, rows) = playable_area(terminal::size()?, &config.display);
    let mut renderer = Renderer::new(columns, rows);
    machine.advance(&[GameState::Starting], GameState::DisplayInitialized)?;

    let mut world = World::new(WorldParams::from(config), area, &mut rng)?;
    machine.advance(&[GameState::DisplayInitialized], GameState::Gameplay)?;

    let hold = Duration::from_millis(config.display.input_hold_ms);
    let mut trackers: Vec<(KeyMap, HoldTracker)> = world
        .players()
        .filter_map(|p| p.keys())
        .map(|keys| (keys, HoldTracker::new(hold)))
        .collect();
    let frame_time = Duration::from_micros(1_000_000 / config.display.target_fps.max(1) as u64);
    let mut level = 1u32;
    let mut caught = 0u32;

    while !machine.is_quitting() {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key)
                    if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) =>
                {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => machine.quit(),
                        KeyCode::Char('r') => {
                            world.regenerate(&mut rng)?;
                            renderer.invalidate();
                        }
                        code => {
                            for (keys, tracker) in trackers.iter_mut() {
                                if let Some(dir) = keys.direction_for(code) {
                                    tracker.record(dir, Instant::now());
                                }
                            }
                        }
                    }
                }
                Event::Resize(w, h) if !machine.is_quitting() => {
                    machine.advance(&[GameState::Gameplay], GameState::Resizing)?;
                    let (area, columns, rows) = playable_area((w, h), &config.display);
                    world.resize(area);
                    renderer.resize(columns, rows);
                    machine.advance(&[GameState::Resizing], GameState::Gameplay)?;
                }
                _ => {}
            }
        }
        if machine.is_quitting() {
            break;
        }

        let now = Instant::now();
        let held: Vec<HeldDirections> = trackers.iter().map(|(_, t)| t.held(now)).collect();
        let mut collected = false;
        for event in world.step(&held, &mut rng) {
            match event {
                GameEvent::AgentCaught { .. } => caught += 1,
                GameEvent::TargetReached { .. } => collected = true,
            }
        }
        if collected && world.is_cleared() {
            level += 1;
            info!(level, "maze cleared");
            world.regenerate(&mut rng)?;
            renderer.invalidate();
        }

        let hud = format!(
            "Level: {}  Honey left: {}  Bees caught: {}  (r new maze, q to quit)",
            level,
            world.targets().len(),
            caught
        );
        renderer.render(stdout, &world.drawables(), &hud)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }

    info!(level, caught, state = %machine.state(), "quitting");
    Ok(())
}
