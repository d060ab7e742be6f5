use std::collections::BTreeMap;
use std::{fmt::Display, str::FromStr};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::connector::connect_floors;
use crate::error::Error;
use crate::raster::{Cell, FloorMap, TerrainCategory};

/// Weight of a vertical connector between two floors.
pub const DEFAULT_FLOOR_WEIGHT: f64 = 5.0;

/// A cell of the stacked grid. Single floor graphs live entirely on floor 0.
///
/// Ordering is floor-major, then row, then column, so iterating a graph visits
/// floors one after the other in reading order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Coordinate {
    pub floor: usize,
    pub row: usize,
    pub col: usize,
}

impl Coordinate {
    pub fn new(row: usize, col: usize, floor: usize) -> Self {
        Self { floor, row, col }
    }

    /// In-bounds axis-aligned neighbours in the order up, down, left, right.
    pub fn neighbors_within(self, rows: usize, columns: usize) -> impl Iterator<Item = Coordinate> {
        let Coordinate { floor, row, col } = self;

        let up = (row > 0).then(|| Coordinate::new(row - 1, col, floor));
        let down = (row + 1 < rows).then(|| Coordinate::new(row + 1, col, floor));
        let left = (col > 0).then(|| Coordinate::new(row, col - 1, floor));
        let right = (col + 1 < columns).then(|| Coordinate::new(row, col + 1, floor));

        [up, down, left, right].into_iter().flatten()
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.row, self.col, self.floor)
    }
}

/// How edge weights are derived from the terrain at both ends of an edge.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum WeightPolicy {
    /// Base 1, x1.5 when entering a non-white pixel, then x2 out of heavy
    /// terrain or x1.5 out of light terrain.
    #[default]
    Multiplicative,
    /// Flat 4 out of heavy terrain, 2 out of light terrain, 1 otherwise.
    Fixed,
}

impl WeightPolicy {
    pub fn weight(self, from: Cell, to: Cell) -> f64 {
        match self {
            WeightPolicy::Multiplicative => {
                let mut weight = 1.0;

                if to.rough {
                    weight *= 1.5;
                }

                match from.category {
                    TerrainCategory::HeavyCost => weight *= 2.0,
                    TerrainCategory::LightCost => weight *= 1.5,
                    _ => {}
                }

                weight
            }
            WeightPolicy::Fixed => match from.category {
                TerrainCategory::HeavyCost => 4.0,
                TerrainCategory::LightCost => 2.0,
                _ => 1.0,
            },
        }
    }
}

impl Display for WeightPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                WeightPolicy::Multiplicative => "multiplicative",
                WeightPolicy::Fixed => "fixed",
            }
        )
    }
}

impl FromStr for WeightPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multiplicative" => Ok(WeightPolicy::Multiplicative),
            "fixed" => Ok(WeightPolicy::Fixed),
            _ => Err(anyhow::anyhow!("Invalid weight policy: {}", s)),
        }
    }
}

/// Outgoing edges of one node, kept in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
    edges: Vec<(Coordinate, f64)>,
}

impl Node {
    pub fn edges(&self) -> &[(Coordinate, f64)] {
        &self.edges
    }

    pub fn weight_to(&self, to: Coordinate) -> Option<f64> {
        self.edges.iter().find(|(c, _)| *c == to).map(|(_, w)| *w)
    }

    /// Adding an edge twice keeps its original position and takes the new weight.
    fn insert(&mut self, to: Coordinate, weight: f64) {
        match self.edges.iter_mut().find(|(c, _)| *c == to) {
            Some(edge) => edge.1 = weight,
            None => self.edges.push((to, weight)),
        }
    }
}

/// A directed, weighted grid graph over one or more floors.
///
/// Built through [`GraphBuilder`] and read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: BTreeMap<Coordinate, Node>,
    floors: Vec<FloorMap>,
}

impl Graph {
    pub fn contains(&self, node: Coordinate) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn node(&self, node: Coordinate) -> Option<&Node> {
        self.nodes.get(&node)
    }

    /// Neighbours of `node` with the weight of the edge leading there.
    pub fn neighbors_of(&self, node: Coordinate) -> impl Iterator<Item = (Coordinate, f64)> + '_ {
        self.nodes
            .get(&node)
            .into_iter()
            .flat_map(|n| n.edges.iter().copied())
    }

    pub fn weight(&self, from: Coordinate, to: Coordinate) -> Option<f64> {
        self.nodes.get(&from).and_then(|n| n.weight_to(to))
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&Coordinate, &Node)> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.edges.len()).sum()
    }

    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }

    pub fn floors(&self) -> &[FloorMap] {
        &self.floors
    }

    /// The terrain under any in-bounds coordinate, obstacles included.
    pub fn category(&self, at: Coordinate) -> Option<TerrainCategory> {
        self.floors
            .get(at.floor)
            .and_then(|f| f.get(at.row, at.col))
            .map(|cell| cell.category)
    }

    /// All coordinates with the given terrain, sorted.
    pub fn coordinates_of(&self, category: TerrainCategory) -> Vec<Coordinate> {
        self.floors
            .iter()
            .enumerate()
            .flat_map(|(floor, map)| {
                map.positions_of(category)
                    .map(move |(row, col)| Coordinate::new(row, col, floor))
            })
            .collect()
    }

    pub fn starts(&self) -> Vec<Coordinate> {
        self.coordinates_of(TerrainCategory::Start)
    }

    pub fn goals(&self) -> Vec<Coordinate> {
        self.coordinates_of(TerrainCategory::Goal)
    }

    /// Check that every edge has a positive finite weight and ends at a node.
    pub fn validate(&self) -> Result<(), Error> {
        for (&from, node) in &self.nodes {
            for &(to, weight) in &node.edges {
                if !(weight.is_finite() && weight > 0.0) {
                    return Err(Error::InvalidWeight { from, to, weight });
                }
                if !self.nodes.contains_key(&to) {
                    return Err(Error::DanglingEdge { from, to });
                }
            }
        }

        Ok(())
    }

    /// Inserting an existing node leaves it untouched.
    pub(crate) fn add_node(&mut self, node: Coordinate) {
        self.nodes.entry(node).or_default();
    }

    /// `from` must already be a node. Targets are checked later by [`Graph::validate`].
    pub(crate) fn add_edge(&mut self, from: Coordinate, to: Coordinate, weight: f64) {
        debug_assert!(
            self.nodes.contains_key(&from),
            "edge out of missing node {from}"
        );
        if let Some(node) = self.nodes.get_mut(&from) {
            node.insert(to, weight);
        }
    }
}

impl Display for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (coordinate, node) in &self.nodes {
            write!(f, "{}:", coordinate)?;
            for (to, weight) in &node.edges {
                write!(f, " {}={}", to, weight)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Assembles a [`Graph`] floor by floor.
///
/// ```
/// use floorpath::{FloorMap, GraphBuilder, WeightPolicy};
/// use image::{Rgb, RgbImage};
///
/// let img = RgbImage::from_pixel(2, 2, Rgb([255, 255, 255]));
/// let mut builder = GraphBuilder::new(WeightPolicy::Multiplicative);
/// builder.add_floor(FloorMap::from_raster(&img).unwrap());
/// let graph = builder.finish().unwrap();
///
/// assert_eq!(graph.node_count(), 4);
/// assert_eq!(graph.edge_count(), 8);
/// ```
#[derive(Debug)]
pub struct GraphBuilder {
    policy: WeightPolicy,
    floor_weight: f64,
    graph: Graph,
}

impl GraphBuilder {
    pub fn new(policy: WeightPolicy) -> Self {
        Self {
            policy,
            floor_weight: DEFAULT_FLOOR_WEIGHT,
            graph: Graph::default(),
        }
    }

    pub fn with_floor_weight(mut self, weight: f64) -> Self {
        self.floor_weight = weight;
        self
    }

    /// Add the nodes and in-floor edges of one classified raster. Returns the floor index,
    /// which is the position of the floor in the stack.
    pub fn add_floor(&mut self, map: FloorMap) -> usize {
        let floor = self.graph.floors.len();
        let nodes_before = self.graph.node_count();
        let edges_before = self.graph.edge_count();

        for (row, cells) in map.cells.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if !cell.category.is_obstacle() {
                    self.graph.add_node(Coordinate::new(row, col, floor));
                }
            }
        }

        for (row, cells) in map.cells.iter().enumerate() {
            for (col, &cell) in cells.iter().enumerate() {
                if cell.category.is_obstacle() {
                    continue;
                }

                let from = Coordinate::new(row, col, floor);
                for to in from.neighbors_within(map.rows, map.columns) {
                    let neighbor = map.cells[to.row][to.col];
                    if neighbor.category.is_obstacle() {
                        continue;
                    }
                    self.graph.add_edge(from, to, self.policy.weight(cell, neighbor));
                }
            }
        }

        debug!(
            "floor {}: {}x{} raster -> {} nodes, {} edges",
            floor,
            map.columns,
            map.rows,
            self.graph.node_count() - nodes_before,
            self.graph.edge_count() - edges_before
        );

        self.graph.floors.push(map);
        floor
    }

    /// Connect the floors when there is more than one and check the graph invariants.
    pub fn finish(mut self) -> Result<Graph, Error> {
        if self.graph.floor_count() > 1 {
            connect_floors(&mut self.graph, self.floor_weight);
        }

        self.graph.validate()?;

        info!(
            "graph built: floors={} nodes={} edges={} weights={}",
            self.graph.floor_count(),
            self.graph.node_count(),
            self.graph.edge_count(),
            self.policy
        );

        Ok(self.graph)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::raster::{BLACK, DARK_GRAY, GREEN, LIGHT_GRAY, RED, WHITE};
    use image::{Rgb, RgbImage};

    /// Build an image from rows of characters: `#` obstacle, `.` open, `S` start,
    /// `G` goal, `h` heavy, `l` light, `?` an unrecognized color.
    pub(crate) fn image_from(rows: &[&str]) -> RgbImage {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        let mut img = RgbImage::new(width, height);

        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                let color = match c {
                    '#' => BLACK,
                    'S' => RED,
                    'G' => GREEN,
                    'h' => DARK_GRAY,
                    'l' => LIGHT_GRAY,
                    '?' => Rgb([10, 20, 30]),
                    _ => WHITE,
                };
                img.put_pixel(x as u32, y as u32, color);
            }
        }

        img
    }

    pub(crate) fn graph_from(floors: &[&[&str]], policy: WeightPolicy) -> Graph {
        let mut builder = GraphBuilder::new(policy);
        for rows in floors {
            builder.add_floor(FloorMap::from_raster(&image_from(rows)).unwrap());
        }
        builder.finish().unwrap()
    }

    fn c(row: usize, col: usize) -> Coordinate {
        Coordinate::new(row, col, 0)
    }

    #[test]
    fn test_nodes_match_non_obstacle_pixels() {
        let rows = ["S.#", "#h.", "l.G"];
        let graph = graph_from(&[&rows], WeightPolicy::Multiplicative);

        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                assert_eq!(graph.contains(c(row, col)), ch != '#', "at {row},{col}");
            }
        }
        assert_eq!(graph.node_count(), 7);
    }

    #[test]
    fn test_edges_are_positive_and_not_dangling() {
        let graph = graph_from(&[&["S.#?", "#h.l", "l.G."]], WeightPolicy::Multiplicative);

        for (_, node) in graph.nodes() {
            for (to, weight) in node.edges() {
                assert!(*weight > 0.0);
                assert!(graph.contains(*to));
            }
        }
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_no_edge_towards_obstacle() {
        let graph = graph_from(&[&["..", ".#"]], WeightPolicy::Multiplicative);

        assert_eq!(graph.weight(c(0, 1), c(1, 1)), None);
        assert_eq!(graph.weight(c(1, 0), c(1, 1)), None);
        assert_eq!(graph.node(c(1, 1)), None);
    }

    #[test]
    fn test_multiplicative_weights() {
        let graph = graph_from(&[&["..h.", "l?S."]], WeightPolicy::Multiplicative);

        // white -> white
        assert_eq!(graph.weight(c(0, 0), c(0, 1)), Some(1.0));
        // white -> heavy pays the rough terrain penalty
        assert_eq!(graph.weight(c(0, 1), c(0, 2)), Some(1.5));
        // heavy -> white
        assert_eq!(graph.weight(c(0, 2), c(0, 3)), Some(2.0));
        // heavy -> start (not white)
        assert_eq!(graph.weight(c(0, 2), c(1, 2)), Some(3.0));
        // light -> unrecognized color
        assert_eq!(graph.weight(c(1, 0), c(1, 1)), Some(2.25));
        // light -> white
        assert_eq!(graph.weight(c(1, 0), c(0, 0)), Some(1.5));
        // start pixels carry no multiplier of their own
        assert_eq!(graph.weight(c(1, 2), c(1, 3)), Some(1.0));
    }

    #[test]
    fn test_fixed_weights() {
        let graph = graph_from(&[&["..h", "l?G"]], WeightPolicy::Fixed);

        assert_eq!(graph.weight(c(0, 0), c(0, 1)), Some(1.0));
        assert_eq!(graph.weight(c(0, 1), c(0, 2)), Some(1.0));
        assert_eq!(graph.weight(c(0, 2), c(0, 1)), Some(4.0));
        assert_eq!(graph.weight(c(1, 0), c(1, 1)), Some(2.0));
        assert_eq!(graph.weight(c(1, 1), c(1, 2)), Some(1.0));
    }

    #[test]
    fn test_neighbor_order() {
        let graph = graph_from(&[&["...", "...", "..."]], WeightPolicy::Multiplicative);
        let order: Vec<_> = graph.neighbors_of(c(1, 1)).map(|(to, _)| to).collect();

        assert_eq!(order, vec![c(0, 1), c(2, 1), c(1, 0), c(1, 2)]);
    }

    #[test]
    fn test_markers_are_derived_from_classification() {
        let graph = graph_from(&[&["S.G", "G#."], &["..S", "..."]], WeightPolicy::Fixed);

        assert_eq!(graph.starts(), vec![c(0, 0), Coordinate::new(0, 2, 1)]);
        assert_eq!(graph.goals(), vec![c(0, 2), c(1, 0)]);
        assert_eq!(graph.category(c(1, 1)), Some(TerrainCategory::Obstacle));
        assert_eq!(graph.category(c(5, 5)), None);
        assert_eq!(
            graph.coordinates_of(TerrainCategory::Obstacle),
            vec![c(1, 1)]
        );
    }

    #[test]
    fn test_node_insertion_is_idempotent() {
        let mut graph = graph_from(&[&[".."]], WeightPolicy::Multiplicative);
        graph.add_node(c(0, 0));

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.weight(c(0, 0), c(0, 1)), Some(1.0));
    }

    #[test]
    fn test_validate_catches_dangling_edge() {
        let mut graph = graph_from(&[&[".."]], WeightPolicy::Multiplicative);
        graph.add_edge(c(0, 0), c(3, 3), 1.0);

        assert!(matches!(
            graph.validate(),
            Err(Error::DanglingEdge { to, .. }) if to == c(3, 3)
        ));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "edge out of missing node")]
    fn test_edge_out_of_missing_node_panics() {
        let mut graph = graph_from(&[&[".."]], WeightPolicy::Multiplicative);
        graph.add_edge(c(2, 2), c(0, 0), 1.0);
    }

    #[test]
    fn test_weight_policy_from_str() {
        assert_eq!(
            "fixed".parse::<WeightPolicy>().unwrap(),
            WeightPolicy::Fixed
        );
        assert_eq!(
            " Multiplicative".parse::<WeightPolicy>().unwrap(),
            WeightPolicy::Multiplicative
        );
        assert!("heavy".parse::<WeightPolicy>().is_err());
    }

    #[test]
    fn test_display() {
        let graph = graph_from(&[&["S."]], WeightPolicy::Multiplicative);

        assert_eq!(
            graph.to_string(),
            "(0, 0, 0): (0, 1, 0)=1\n(0, 1, 0): (0, 0, 0)=1.5\n"
        );
    }
}
