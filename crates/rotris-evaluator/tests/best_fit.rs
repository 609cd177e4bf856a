//! End-to-end best-fit behaviour: filling and clearing a row, running out of room,
//! determinism, and agreement between the step-wise and monolithic searches.

use std::sync::Arc;

use proptest::prelude::*;
use rotris_engine::{
    Cell, GridEvent, GridMap, GridMapEngine, PiecePlacement, PieceShape, Rotation, Topology,
    TopologyConfig, event_channel,
};
use rotris_evaluator::{BestFit, Dispatcher, HeuristicKind, SearchStep};

fn topology(config: TopologyConfig) -> Arc<Topology> {
    Arc::new(Topology::new(config).unwrap())
}

fn bar(len: i32) -> PieceShape {
    let cells: Vec<_> = (0..len).map(|x| (x, 0)).collect();
    PieceShape::new(format!("I{len}"), &cells, (len / 2, 0)).unwrap()
}

fn tetrominoes() -> Vec<PieceShape> {
    [
        ("I", [(0, 0), (1, 0), (2, 0), (3, 0)], (1, 0)),
        ("O", [(0, 0), (1, 0), (0, 1), (1, 1)], (0, 0)),
        ("T", [(0, 0), (1, 0), (2, 0), (1, 1)], (1, 0)),
        ("S", [(1, 0), (2, 0), (0, 1), (1, 1)], (1, 0)),
        ("Z", [(0, 0), (1, 0), (1, 1), (2, 1)], (1, 0)),
        ("J", [(0, 0), (0, 1), (1, 1), (2, 1)], (1, 1)),
        ("L", [(2, 0), (0, 1), (1, 1), (2, 1)], (1, 1)),
    ]
    .into_iter()
    .map(|(name, cells, pivot)| PieceShape::new(name, &cells, pivot).unwrap())
    .collect()
}

/// Spawns `shape`, asks for a best fit, drains the queue into the engine and settles.
fn drop_piece(engine: &mut GridMapEngine, dispatcher: &Dispatcher, shape: &PieceShape) {
    let mut placement = shape.spawn_placement(engine.map().bucket_width());
    let fit = dispatcher.best_fit(engine.map(), shape, placement);
    assert!(fit.is_found(), "no placement for {}", shape.name());
    for motion in fit.into_motions() {
        assert!(
            motion.apply(engine, shape, &mut placement),
            "{motion} refused for {}",
            shape.name()
        );
    }
    assert!(engine.settle_piece(shape, placement));
}

#[test]
fn four_bars_fill_the_floor_row_and_clear_it_once() {
    let mut engine = GridMapEngine::new(topology(TopologyConfig::framed(10, 3)));
    let (sender, receiver) = event_channel();
    engine.subscribe(sender);
    let dispatcher = Dispatcher::new(HeuristicKind::MeanRowHeight.build());

    for shape in [bar(3), bar(3), bar(2), bar(2)] {
        drop_piece(&mut engine, &dispatcher, &shape);
    }
    assert_eq!(
        engine.map().bucket_dump(),
        "..........\n..........\n@@@@@@@@@@\n"
    );

    let cleared = engine.collapse_full_rows(2, false);
    assert_eq!(cleared, vec![2]);
    let deleted: Vec<_> = receiver
        .try_iter()
        .filter(GridEvent::is_row_deleted)
        .collect();
    assert_eq!(deleted, vec![GridEvent::RowDeleted { row: 2 }]);
    assert_eq!(
        engine.map().bucket_dump(),
        "..........\n..........\n..........\n"
    );
}

#[test]
fn full_bucket_reports_no_placement_and_empty_queue() {
    let map = GridMap::from_ascii(
        topology(TopologyConfig::framed(6, 5)),
        "
        ...@..
        @@@.@@
        @.@@@.
        @@@.@@
        .@@@@@
        ",
    );
    let square = PieceShape::new("O", &[(0, 0), (1, 0), (0, 1), (1, 1)], (0, 0)).unwrap();
    let spawn = square.spawn_placement(map.bucket_width());

    for kind in HeuristicKind::ALL {
        let dispatcher = Dispatcher::new(kind.build());
        let fit = dispatcher.best_fit(&map, &square, spawn);
        assert_eq!(fit, BestFit::NoPlacement, "{kind}");
        assert_eq!(fit.into_motions().count(), 0, "{kind}");
    }
}

#[test]
fn identical_inputs_give_identical_queues() {
    let map = GridMap::from_ascii(
        topology(TopologyConfig::framed(10, 8)),
        "
        ..........
        .@........
        .@@...@...
        @@@@.@@@.@
        ",
    );
    for kind in HeuristicKind::ALL {
        for shape in tetrominoes() {
            let spawn = shape.spawn_placement(map.bucket_width());
            let first = Dispatcher::new(kind.build()).best_fit(&map, &shape, spawn);
            let second = Dispatcher::new(kind.build()).best_fit(&map.clone(), &shape, spawn);
            assert_eq!(first, second, "{kind} / {}", shape.name());
        }
    }
}

#[test]
fn spinning_bucket_queue_replays_on_the_live_grid() {
    let config = TopologyConfig {
        bucket_rotates: true,
        ..TopologyConfig::framed(6, 6)
    };
    let map = GridMap::from_ascii(
        topology(config),
        "
        ......
        ......
        .....@
        ....@@
        .....@
        @@..@@
        ",
    );
    let dispatcher = Dispatcher::new(HeuristicKind::NeighborAdjacency.build());
    for shape in tetrominoes() {
        let mut replay = GridMapEngine::from_map(map.clone());
        let mut placement = shape.spawn_placement(replay.map().bucket_width());
        let BestFit::Found(plan) = dispatcher.best_fit(replay.map(), &shape, placement) else {
            panic!("no placement for {}", shape.name());
        };
        for motion in plan.motions().clone() {
            assert!(motion.apply(&mut replay, &shape, &mut placement));
        }
        assert_eq!(placement, plan.candidate().resting());
        assert_eq!(
            replay.map().quarter_turns(),
            plan.candidate().bucket_turns(),
            "{}",
            shape.name()
        );
        assert_eq!(replay.drop_distance(&shape, placement), Some(0));
    }
}

fn map_from_bits(bits: &[bool]) -> GridMap {
    let mut map = GridMap::new(topology(TopologyConfig::framed(6, 8)));
    for (i, &filled) in bits.iter().enumerate() {
        // Keep the top rows open so the spawn is usually free.
        if filled && i >= 6 * 3 {
            let x = i32::try_from(i % 6).unwrap();
            let y = i32::try_from(i / 6).unwrap();
            map.set_cell(x, y, Cell::Block);
        }
    }
    map
}

fn spinning_map_from_bits(bits: &[bool]) -> GridMap {
    let config = TopologyConfig {
        bucket_rotates: true,
        ..TopologyConfig::framed(4, 4)
    };
    let mut map = GridMap::new(topology(config));
    for (i, &filled) in bits.iter().enumerate() {
        if filled && i != 0 {
            let x = i32::try_from(i % 4).unwrap();
            let y = i32::try_from(i / 4).unwrap();
            map.set_cell(x, y, Cell::Block);
        }
    }
    map
}

proptest! {
    #[test]
    fn spinning_plans_never_pass_through_blocks(
        bits in prop::collection::vec(prop::bool::weighted(0.5), 4 * 4),
        kind_index in 0usize..8,
    ) {
        let mut engine = GridMapEngine::from_map(spinning_map_from_bits(&bits));
        let dot = PieceShape::new("O1", &[(0, 0)], (0, 0)).unwrap();
        let dispatcher = Dispatcher::new(HeuristicKind::ALL[kind_index].build());
        let mut placement = PiecePlacement::new(Rotation::default(), 0, 0);

        let fit = dispatcher.best_fit(engine.map(), &dot, placement);
        prop_assert!(fit.is_found());
        for motion in fit.into_motions() {
            prop_assert!(motion.apply(&mut engine, &dot, &mut placement));
            prop_assert!(
                engine.is_contained(&dot, placement),
                "{} overlaps a block after {}",
                dot.name(),
                motion
            );
        }
    }

    #[test]
    fn stepper_and_monolithic_search_agree(
        bits in prop::collection::vec(prop::bool::weighted(0.4), 6 * 8),
        shape_index in 0usize..7,
        kind_index in 0usize..8,
    ) {
        let map = map_from_bits(&bits);
        let shapes = tetrominoes();
        let shape = &shapes[shape_index];
        let dispatcher = Dispatcher::new(HeuristicKind::ALL[kind_index].build());
        let spawn = shape.spawn_placement(map.bucket_width());

        let monolithic = dispatcher.best_fit(&map, shape, spawn);
        let mut stepper = dispatcher.stepper(&map, shape, spawn);
        let stepped = loop {
            if let SearchStep::Done(result) = stepper.step() {
                break result;
            }
        };
        prop_assert_eq!(stepped, monolithic);
    }

    #[test]
    fn planned_motions_land_on_the_candidate(
        bits in prop::collection::vec(prop::bool::weighted(0.4), 6 * 8),
        shape_index in 0usize..7,
        kind_index in 0usize..8,
    ) {
        let mut engine = GridMapEngine::from_map(map_from_bits(&bits));
        let shapes = tetrominoes();
        let shape = &shapes[shape_index];
        let dispatcher = Dispatcher::new(HeuristicKind::ALL[kind_index].build());
        let mut placement: PiecePlacement = shape.spawn_placement(engine.map().bucket_width());

        let fit = dispatcher.best_fit(engine.map(), shape, placement);
        prop_assume!(fit.is_found());
        let resting = fit.plan().unwrap().candidate().resting();
        for motion in fit.into_motions() {
            prop_assert!(motion.apply(&mut engine, shape, &mut placement));
        }
        prop_assert_eq!(placement, resting);
        prop_assert_eq!(engine.drop_distance(shape, placement), Some(0));
    }
}
