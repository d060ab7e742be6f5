use std::{fmt::Display, str::FromStr};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::find::{bfs, dijkstra, PredecessorMap};
use crate::grid::{Coordinate, Graph, GraphBuilder, WeightPolicy};
use crate::path::{reconstruct, SearchOutcome};
use crate::raster::{FloorMap, Raster, TerrainCategory};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Algorithm {
    /// Hop count from the first start marker, weights ignored.
    Bfs,
    /// Weighted distance from the nearest of all start markers.
    #[default]
    Dijkstra,
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Algorithm::Bfs => "bfs",
                Algorithm::Dijkstra => "dijkstra",
            }
        )
    }
}

impl FromStr for Algorithm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bfs" => Ok(Algorithm::Bfs),
            "dijkstra" => Ok(Algorithm::Dijkstra),
            _ => Err(anyhow::anyhow!("Invalid algorithm: {}", s)),
        }
    }
}

/// Classify a stack of rasters and build the combined graph.
///
/// The floor index of each raster is its position in `rasters`. Marker checks run
/// on the classification, before any node or edge is created.
pub fn build_graph<R: Raster>(
    rasters: &[R],
    policy: WeightPolicy,
    floor_weight: f64,
) -> Result<Graph, Error> {
    if rasters.is_empty() {
        return Err(Error::NoRasters);
    }

    let maps = rasters
        .iter()
        .map(FloorMap::from_raster)
        .collect::<Result<Vec<_>, _>>()?;

    if !maps.iter().any(|m| m.contains(TerrainCategory::Start)) {
        return Err(Error::MissingStart);
    }
    if !maps.iter().any(|m| m.contains(TerrainCategory::Goal)) {
        return Err(Error::MissingGoal);
    }

    if maps
        .windows(2)
        .any(|w| (w[0].rows, w[0].columns) != (w[1].rows, w[1].columns))
    {
        warn!("floors differ in size, only overlapping cells are linked");
    }

    let mut builder = GraphBuilder::new(policy).with_floor_weight(floor_weight);
    for map in maps {
        builder.add_floor(map);
    }

    builder.finish()
}

/// Search from the start markers and return the path to the closest reachable goal.
///
/// Goals at equal distance are broken by coordinate order.
pub fn solve(graph: &Graph, algorithm: Algorithm) -> Result<SearchOutcome<f64>, Error> {
    let starts = graph.starts();
    let goals = graph.goals();

    if starts.is_empty() {
        return Err(Error::MissingStart);
    }
    if goals.is_empty() {
        return Err(Error::MissingGoal);
    }

    let outcome = match algorithm {
        Algorithm::Bfs => {
            if starts.len() > 1 {
                debug!(
                    "bfs is single source, using {} out of {} starts",
                    starts[0],
                    starts.len()
                );
            }
            let visited = bfs(graph, starts[0])?;
            match nearest_goal(&goals, &visited) {
                Some(goal) => match reconstruct(goal, &visited) {
                    SearchOutcome::PathFound(result) => {
                        SearchOutcome::PathFound(result.map_cost(f64::from))
                    }
                    SearchOutcome::NoPathFound => SearchOutcome::NoPathFound,
                },
                None => {
                    if starts.len() > 1 {
                        warn!(
                            "bfs from {} reaches no goal, {} other starts were not searched",
                            starts[0],
                            starts.len() - 1
                        );
                    }
                    SearchOutcome::NoPathFound
                }
            }
        }
        Algorithm::Dijkstra => {
            let visited = dijkstra(graph, &starts)?;
            match nearest_goal(&goals, &visited) {
                Some(goal) => reconstruct(goal, &visited),
                None => SearchOutcome::NoPathFound,
            }
        }
    };

    match &outcome {
        SearchOutcome::PathFound(result) => info!(
            "{}: path {} -> {} with {} steps, cost {}",
            algorithm,
            result.start,
            result.goal,
            result.steps(),
            result.total_cost
        ),
        SearchOutcome::NoPathFound => info!(
            "{}: none of {} goals is reachable from {} starts",
            algorithm,
            goals.len(),
            starts.len()
        ),
    }

    Ok(outcome)
}

fn nearest_goal<C: Copy + Into<f64>>(
    goals: &[Coordinate],
    visited: &PredecessorMap<C>,
) -> Option<Coordinate> {
    goals
        .iter()
        .filter_map(|&goal| {
            let distance: f64 = visited.distance(goal)?.into();
            Some((distance, goal))
        })
        .min_by(|(a, ga), (b, gb)| a.total_cmp(b).then_with(|| ga.cmp(gb)))
        .map(|(_, goal)| goal)
}
