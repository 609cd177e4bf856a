//! Entry point the game loop talks to.
//!
//! The [`Dispatcher`] owns the configured heuristic, picks a [`SearchStrategy`] from the
//! board's topology class and runs the search.

use rotris_engine::{GridMap, PiecePlacement, PieceShape, TopologyClass};

use crate::{
    heuristic::{BoxedPlacementHeuristic, PlacementHeuristic},
    search::{BestFit, BestFitStepper, SearchStrategy},
};

#[derive(Debug, Clone)]
pub struct Dispatcher {
    heuristic: BoxedPlacementHeuristic,
}

impl Dispatcher {
    #[must_use]
    pub fn new(heuristic: BoxedPlacementHeuristic) -> Self {
        Self { heuristic }
    }

    #[must_use]
    pub fn heuristic(&self) -> &dyn PlacementHeuristic {
        self.heuristic.as_ref()
    }

    /// Best placement for `shape`, currently at `current`, using the strategy of the
    /// map's own topology class.
    #[must_use]
    pub fn best_fit(&self, map: &GridMap, shape: &PieceShape, current: PiecePlacement) -> BestFit {
        self.best_fit_for_class(map.topology().class(), map, shape, current)
    }

    /// Like [`Self::best_fit`], with the topology class given explicitly.
    ///
    /// # Panics
    ///
    /// Panics if `class` is [`TopologyClass::Rotatable`] and the board is not square.
    #[must_use]
    pub fn best_fit_for_class(
        &self,
        class: TopologyClass,
        map: &GridMap,
        shape: &PieceShape,
        current: PiecePlacement,
    ) -> BestFit {
        self.stepper_for_class(class, map, shape, current).run()
    }

    /// Step-wise form of [`Self::best_fit`].
    #[must_use]
    pub fn stepper<'a>(
        &'a self,
        map: &'a GridMap,
        shape: &'a PieceShape,
        current: PiecePlacement,
    ) -> BestFitStepper<'a> {
        self.stepper_for_class(map.topology().class(), map, shape, current)
    }

    /// Step-wise form of [`Self::best_fit_for_class`].
    #[must_use]
    pub fn stepper_for_class<'a>(
        &'a self,
        class: TopologyClass,
        map: &'a GridMap,
        shape: &'a PieceShape,
        current: PiecePlacement,
    ) -> BestFitStepper<'a> {
        BestFitStepper::new(
            SearchStrategy::for_class(class),
            self.heuristic.as_ref(),
            map,
            shape,
            current,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rotris_engine::{Topology, TopologyConfig};

    use crate::{heuristic::HeuristicKind, search::SearchStep};

    use super::*;

    #[test]
    fn test_stepper_matches_monolithic_search() {
        let topology = Arc::new(Topology::new(TopologyConfig::framed(6, 6)).unwrap());
        let map = GridMap::from_ascii(
            topology,
            "
            ......
            ......
            ......
            .@....
            .@@.@.
            @@@.@@
            ",
        );
        let shape = PieceShape::new("T", &[(0, 0), (1, 0), (2, 0), (1, 1)], (1, 0)).unwrap();
        let current = shape.spawn_placement(map.bucket_width());

        for kind in HeuristicKind::ALL {
            let dispatcher = Dispatcher::new(kind.build());
            let monolithic = dispatcher.best_fit(&map, &shape, current);

            let mut stepper = dispatcher.stepper(&map, &shape, current);
            let stepped = loop {
                if let SearchStep::Done(result) = stepper.step() {
                    break result;
                }
            };
            assert_eq!(stepped, monolithic, "{kind}");
            assert!(monolithic.is_found(), "{kind}");
        }
    }

    #[test]
    fn test_explicit_class_overrides_topology() {
        let config = TopologyConfig {
            bucket_rotates: true,
            ..TopologyConfig::framed(4, 4)
        };
        let map = GridMap::new(Arc::new(Topology::new(config).unwrap()));
        let shape = PieceShape::new("O1", &[(0, 0)], (0, 0)).unwrap();
        let current = shape.spawn_placement(4);
        let dispatcher = Dispatcher::new(HeuristicKind::MeanRowHeight.build());

        let fixed = dispatcher.stepper_for_class(TopologyClass::Static, &map, &shape, current);
        let spinning = dispatcher.stepper(&map, &shape, current);
        assert_eq!(spinning.remaining(), 4 * fixed.remaining());
    }
}
