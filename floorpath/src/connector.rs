use log::debug;

use crate::grid::{Coordinate, Graph};

/// Link every node to the node at the same row and column on the floor directly above,
/// in both directions, with a flat `weight`. Terrain is ignored on purpose: the link
/// models a stairway or elevator.
///
/// Floors may differ in size; cells are linked only where both floors have a node.
/// Returns the number of directed edges added.
pub fn connect_floors(graph: &mut Graph, weight: f64) -> usize {
    let mut links: Vec<(Coordinate, Coordinate)> = Vec::new();

    for floor in 1..graph.floor_count() {
        for (&lower, _) in graph.nodes().filter(|(c, _)| c.floor == floor - 1) {
            let upper = Coordinate::new(lower.row, lower.col, floor);
            if graph.contains(upper) {
                links.push((lower, upper));
            }
        }
    }

    for &(lower, upper) in &links {
        graph.add_edge(lower, upper, weight);
        graph.add_edge(upper, lower, weight);
    }

    debug!(
        "connected {} floors with {} vertical links (weight {})",
        graph.floor_count(),
        links.len(),
        weight
    );

    links.len() * 2
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::test::graph_from;
    use crate::grid::{GraphBuilder, WeightPolicy};
    use crate::raster::FloorMap;

    #[test]
    fn test_two_open_floors() {
        let graph = graph_from(
            &[&["..", ".."], &["..", ".."]],
            WeightPolicy::Multiplicative,
        );
        let origin = Coordinate::new(0, 0, 0);

        assert_eq!(graph.weight(origin, Coordinate::new(0, 0, 1)), Some(5.0));
        assert_eq!(graph.weight(Coordinate::new(0, 0, 1), origin), Some(5.0));
        assert_eq!(graph.weight(origin, Coordinate::new(0, 1, 0)), Some(1.0));
        assert_eq!(graph.weight(origin, Coordinate::new(1, 0, 0)), Some(1.0));
        assert_eq!(graph.weight(origin, Coordinate::new(1, 1, 1)), None);
        assert_eq!(graph.weight(origin, Coordinate::new(0, 1, 1)), None);

        // 8 in-floor edges per floor plus 4 links in each direction
        assert_eq!(graph.edge_count(), 8 + 8 + 8);
    }

    #[test]
    fn test_only_adjacent_floors_are_linked() {
        let graph = graph_from(&[&["."], &["."], &["."]], WeightPolicy::Multiplicative);
        let on = |floor| Coordinate::new(0, 0, floor);

        assert_eq!(graph.weight(on(0), on(1)), Some(5.0));
        assert_eq!(graph.weight(on(1), on(2)), Some(5.0));
        assert_eq!(graph.weight(on(0), on(2)), None);
    }

    #[test]
    fn test_link_ignores_terrain_but_not_obstacles() {
        let graph = graph_from(&[&["h#"], &["hh"]], WeightPolicy::Fixed);

        assert_eq!(
            graph.weight(Coordinate::new(0, 0, 0), Coordinate::new(0, 0, 1)),
            Some(5.0)
        );
        assert!(!graph.contains(Coordinate::new(0, 1, 0)));
        assert_eq!(
            graph.weight(Coordinate::new(0, 1, 1), Coordinate::new(0, 1, 0)),
            None
        );
    }

    #[test]
    fn test_floors_of_different_size() {
        let graph = graph_from(&[&["..."], &[".", "."]], WeightPolicy::Multiplicative);

        assert!(graph.validate().is_ok());
        assert!(graph.contains(Coordinate::new(1, 0, 1)));
        assert_eq!(
            graph
                .neighbors_of(Coordinate::new(0, 2, 0))
                .filter(|(c, _)| c.floor == 1)
                .count(),
            0
        );
    }

    #[test]
    fn test_custom_weight() {
        let img = crate::grid::test::image_from(&[".."]);
        let mut builder = GraphBuilder::new(WeightPolicy::Multiplicative).with_floor_weight(7.5);
        builder.add_floor(FloorMap::from_raster(&img).unwrap());
        builder.add_floor(FloorMap::from_raster(&img).unwrap());
        let graph = builder.finish().unwrap();

        assert_eq!(
            graph.weight(Coordinate::new(0, 1, 1), Coordinate::new(0, 1, 0)),
            Some(7.5)
        );
    }
}
