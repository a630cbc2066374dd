use honeymaze::collision::overlaps;
use honeymaze::direction::Direction;
use honeymaze::geometry::Size;
use honeymaze::input::HeldDirections;
use honeymaze::{Config, GameEvent, World, WorldParams};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn world(seed: u64) -> (World, StdRng) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut config = Config::default();
    config.runners.agent_count = 3;
    config.runners.second_player = true;
    let world = World::new(WorldParams::from(&config), Size::new(1200.0, 1000.0), &mut rng)
        .expect("default config builds a maze");
    (world, rng)
}

#[test]
fn generated_maze_is_connected_with_loops() {
    let (world, _) = world(7);
    let grid = world.grid();
    assert!(grid.is_fully_connected());
    assert!(grid.walls_are_paired());
    let stats = world.stats();
    assert_eq!(stats.carves, 99);
    assert_eq!(stats.extra_passages, 10);
    assert!(grid.open_wall_pairs() >= 99);
}

#[test]
fn long_run_keeps_invariants() {
    let (mut world, mut rng) = world(11);
    let inputs = [
        HeldDirections::of(&[Direction::Right]),
        HeldDirections::of(&[Direction::Bottom, Direction::Right]),
        HeldDirections::of(&[Direction::Left, Direction::Top]),
    ];
    let mut caught = 0;
    for tick in 0..2000usize {
        let held = [inputs[tick / 100 % 3], inputs[(tick / 70 + 1) % 3]];
        for event in world.step(&held, &mut rng) {
            if let GameEvent::AgentCaught { .. } = event {
                caught += 1;
            }
        }
        for player in world.players() {
            assert!(!overlaps(player, world.layout().borders()));
        }
        let area = world.area();
        for agent in world.agents() {
            let c = agent.center();
            assert!(c.x > 0.0 && c.x < area.width && c.y > 0.0 && c.y < area.height);
        }
    }
    assert_eq!(world.agents().count() + caught, 3);
    assert_eq!(world.players().count(), 2);
}

#[test]
fn resize_mid_game_keeps_relative_positions() {
    let (mut world, mut rng) = world(5);
    for _ in 0..50 {
        world.step(&[HeldDirections::of(&[Direction::Bottom])], &mut rng);
    }
    let relative = |w: &World| -> Vec<(f32, f32)> {
        let area = w.area();
        w.runners()
            .iter()
            .map(|r| (r.center().x / area.width, r.center().y / area.height))
            .collect()
    };
    let before = relative(&world);
    world.resize(Size::new(640.0, 480.0));
    for ((bx, by), (ax, ay)) in before.iter().zip(relative(&world)) {
        assert!((bx - ax).abs() < 1e-5);
        assert!((by - ay).abs() < 1e-5);
    }
    let borders = world.layout().borders().to_vec();
    world.resize(Size::new(640.0, 480.0));
    assert_eq!(world.layout().borders(), borders.as_slice());
}
