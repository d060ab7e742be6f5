use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::find::PredecessorMap;
use crate::grid::{Coordinate, Graph};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// The direction of a single step inside one floor.
    pub fn between(from: Coordinate, to: Coordinate) -> Result<Self, Error> {
        if from.floor != to.floor {
            return Err(Error::FloorChange { from, to });
        }

        let d_row = to.row as isize - from.row as isize;
        let d_col = to.col as isize - from.col as isize;

        match (d_row, d_col) {
            (-1, 0) => Ok(Direction::Up),
            (1, 0) => Ok(Direction::Down),
            (0, -1) => Ok(Direction::Left),
            (0, 1) => Ok(Direction::Right),
            _ => Err(Error::NotADirection { from, to }),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Direction::Up => "↑",
                Direction::Down => "↓",
                Direction::Left => "←",
                Direction::Right => "→",
            }
        )
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PathResult<C> {
    /// Every node from `start` to `goal`, both included.
    pub path: Vec<Coordinate>,
    pub start: Coordinate,
    pub goal: Coordinate,
    pub total_cost: C,
}

impl<C> PathResult<C> {
    /// Number of edges walked.
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn changes_floor(&self) -> bool {
        self.path.windows(2).any(|w| w[0].floor != w[1].floor)
    }

    /// The path as relative moves. Fails on the first step that leaves the floor.
    pub fn directions(&self) -> Result<Vec<Direction>, Error> {
        self.path
            .windows(2)
            .map(|w| Direction::between(w[0], w[1]))
            .collect()
    }

    /// Sum of the edge weights along the path, in walking order. `None` if a step
    /// is not an edge of `graph`.
    pub fn weighted_cost(&self, graph: &Graph) -> Option<f64> {
        self.path
            .windows(2)
            .try_fold(0.0, |acc, w| graph.weight(w[0], w[1]).map(|weight| acc + weight))
    }

    pub fn map_cost<D>(self, f: impl FnOnce(C) -> D) -> PathResult<D> {
        PathResult {
            path: self.path,
            start: self.start,
            goal: self.goal,
            total_cost: f(self.total_cost),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchOutcome<C> {
    NoPathFound,
    PathFound(PathResult<C>),
}

impl<C> SearchOutcome<C> {
    pub fn path(&self) -> Option<&PathResult<C>> {
        match self {
            SearchOutcome::PathFound(result) => Some(result),
            SearchOutcome::NoPathFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::PathFound(_))
    }
}

/// Walk the predecessor links back from `goal` and return the path in walking order.
///
/// A goal the search never reached gives [`SearchOutcome::NoPathFound`]; a goal that
/// is itself a source gives a single-node path of cost zero.
pub fn reconstruct<C: Copy>(goal: Coordinate, visited: &PredecessorMap<C>) -> SearchOutcome<C> {
    let Some(item) = visited.get(goal) else {
        return SearchOutcome::NoPathFound;
    };

    let mut path = vec![goal];
    let mut current = item;

    while let Some(from) = current.from {
        path.push(from);
        current = match visited.get(from) {
            Some(previous) => previous,
            None => panic!("Backtracking lead to a Coordinate that was never visited"),
        };

        // a chain longer than the map means the back-pointers form a cycle
        assert!(path.len() <= visited.len(), "predecessor chain is cyclic");
    }

    path.reverse();

    SearchOutcome::PathFound(PathResult {
        start: path[0],
        goal,
        total_cost: item.cost,
        path,
    })
}
