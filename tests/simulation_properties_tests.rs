//! Simulation Properties Tests
//!
//! Movement, growth, collision and placement behaviour of the worm simulation,
//! driven through the public World/SegmentChain API.

use cyber_worm::chain::SegmentChain;
use cyber_worm::placement::{PlacementSampler, SessionRng};
use cyber_worm::simulation::{Board, CollisionKind, Rules, StepOutcome, World};
use cyber_worm::score::ScoreState;
use cyber_worm::types::{Direction, GridPosition};

fn bare_world(rules: &Rules, head: GridPosition) -> World {
    World {
        chain: SegmentChain::new(head),
        board: Board::default(),
        score: ScoreState::new(rules.initial_own_score, rules.initial_opposing_score),
        items_collected: 0,
    }
}

/// Tiny deterministic generator for walking the chain around
fn pseudo_direction(i: u32) -> Direction {
    Direction::all()[((i * 7 + 3) % 4) as usize]
}

#[test]
fn test_advance_then_append_scenario() {
    let mut chain = SegmentChain::new(GridPosition::new(0, 0));
    chain.advance(Direction::Right);
    assert_eq!(chain.segments(), &[GridPosition::new(1, 0)]);

    chain.append(Direction::Right);
    assert_eq!(
        chain.segments(),
        &[GridPosition::new(1, 0), GridPosition::new(0, 0)]
    );
}

#[test]
fn test_advance_preserves_length_without_append() {
    let mut chain = SegmentChain::new(GridPosition::new(0, 0));
    for i in 0..200 {
        let before = chain.len();
        let grow = i % 13 == 0;
        if grow {
            chain.append(pseudo_direction(i));
        }
        chain.advance(pseudo_direction(i));
        let expected = if grow { before + 1 } else { before };
        assert_eq!(chain.len(), expected, "length changed on tick {}", i);
    }
}

#[test]
fn test_boundary_scenario_half_extent_12() {
    let rules = Rules::default();
    let mut rng = SessionRng::new(5);
    let mut world = bare_world(&rules, GridPosition::new(11, 0));

    let outcome = world.step(Direction::Right, &rules, &mut rng);
    assert_eq!(world.chain.head(), GridPosition::new(12, 0));
    assert_eq!(outcome, StepOutcome::Crashed(CollisionKind::Boundary));
}

#[test]
fn test_every_edge_cell_is_terminal() {
    let rules = Rules {
        half_extent: 6,
        ..Rules::default()
    };
    let b = rules.half_extent;
    let mut rng = SessionRng::new(5);

    for i in -(b - 1)..b {
        let cases = [
            (GridPosition::new(b - 1, i), Direction::Right),
            (GridPosition::new(-(b - 1), i), Direction::Left),
            (GridPosition::new(i, b - 1), Direction::Up),
            (GridPosition::new(i, -(b - 1)), Direction::Down),
        ];
        for (start, dir) in cases.iter() {
            let mut world = bare_world(&rules, *start);
            let outcome = world.step(*dir, &rules, &mut rng);
            assert_eq!(
                outcome,
                StepOutcome::Crashed(CollisionKind::Boundary),
                "from {:?} moving {:?}",
                start,
                dir
            );
        }
    }
}

#[test]
fn test_walls_sit_on_the_boundary() {
    let rules = Rules::default();
    let mut rng = SessionRng::new(9);
    let world = World::new(&rules, &mut rng);
    assert!(world
        .board
        .walls
        .iter()
        .all(|w| w.is_outside(rules.half_extent)));
}

#[test]
fn test_food_in_normal_mode_adds_ten() {
    let rules = Rules::default();
    let mut rng = SessionRng::new(5);
    for own in [-30, 0, 50, 990].iter() {
        let mut world = bare_world(&rules, GridPosition::new(0, 0));
        world.score = ScoreState::new(*own, 150);
        world.board.food = Some(GridPosition::new(0, 1));
        world.step(Direction::Up, &rules, &mut rng);
        assert_eq!(world.score.own(), own + 10);
        assert_eq!(world.score.opposing(), 150);
    }
}

#[test]
fn test_food_in_sabotage_mode_subtracts_ten() {
    let rules = Rules::default();
    let mut rng = SessionRng::new(5);
    for opposing in [150, 10, 0, -20].iter() {
        let mut world = bare_world(&rules, GridPosition::new(0, 0));
        world.score = ScoreState::new(50, *opposing);
        world.score.toggle_mode();
        world.board.food = Some(GridPosition::new(0, 1));
        world.step(Direction::Up, &rules, &mut rng);
        assert_eq!(world.score.own(), 50);
        assert_eq!(world.score.opposing(), opposing - 10);
    }
}

#[test]
fn test_sabotage_scenario() {
    let rules = Rules::default();
    let mut rng = SessionRng::new(5);
    let mut world = bare_world(&rules, GridPosition::new(0, 0));
    world.score = ScoreState::new(50, 150);
    world.score.toggle_mode();
    world.board.food = Some(GridPosition::new(-1, 0));

    let outcome = world.step(Direction::Left, &rules, &mut rng);
    assert_eq!(outcome, StepOutcome::Ate { escalated: false });
    assert_eq!(world.score.opposing(), 140);
    assert_eq!(world.score.own(), 50);
}

#[test]
fn test_growth_amount_is_applied_per_food() {
    let rules = Rules {
        growth_amount: 3,
        ..Rules::default()
    };
    let mut rng = SessionRng::new(5);
    let mut world = bare_world(&rules, GridPosition::new(0, 0));
    world.board.food = Some(GridPosition::new(1, 0));
    world.step(Direction::Right, &rules, &mut rng);
    assert_eq!(world.chain.len(), 4);
}

#[test]
fn test_obstacle_spawns_every_fifth_food() {
    let rules = Rules::default();
    let mut rng = SessionRng::new(5);
    let mut world = bare_world(&rules, GridPosition::new(-5, 0));

    let mut escalations = 0;
    for _ in 0..10 {
        let next = Direction::Right.apply(&world.chain.head());
        world.board.food = Some(next);
        world.board.obstacles.retain(|o| *o != next);
        if let StepOutcome::Ate { escalated } = world.step(Direction::Right, &rules, &mut rng) {
            if escalated {
                escalations += 1;
            }
        }
    }
    assert_eq!(world.items_collected, 10);
    assert_eq!(escalations, 2);
}

#[test]
fn test_checked_sampler_avoids_chain_at_low_density() {
    let rules = Rules::default();
    let sampler = PlacementSampler::default();

    // A 12-cell worm on a 21x21 interior
    let mut chain = SegmentChain::new(GridPosition::new(-6, 3));
    for _ in 0..11 {
        chain.append(Direction::Right);
        chain.advance(Direction::Right);
    }

    let trials = 1000;
    let mut clean = 0;
    let mut rng = SessionRng::new(2024);
    for _ in 0..trials {
        let p = sampler.sample(rules.half_extent, rules.spawn_margin, &chain, &mut rng);
        if !chain.contains(&p) {
            clean += 1;
        }
    }
    assert!(
        clean * 100 >= trials * 95,
        "only {} of {} samples avoided the chain",
        clean,
        trials
    );
}

#[test]
fn test_unchecked_sampler_covers_interior_only() {
    let sampler = PlacementSampler::Unchecked;
    let chain = SegmentChain::new(GridPosition::new(0, 0));
    let mut rng = SessionRng::new(77);
    let mut seen_low = false;
    let mut seen_high = false;
    for _ in 0..5000 {
        let p = sampler.sample(12, 2, &chain, &mut rng);
        assert!(p.x.abs() <= 10 && p.y.abs() <= 10);
        seen_low |= p.x == -10;
        seen_high |= p.x == 10;
    }
    assert!(seen_low && seen_high, "both interior bounds should be reachable");
}
