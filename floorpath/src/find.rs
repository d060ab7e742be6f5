use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, HashSet, VecDeque},
};

use log::debug;

use crate::error::Error;
use crate::grid::{Coordinate, Graph};

/// What a search recorded for one reached node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisitedItem<C> {
    pub cost: C,
    /// `None` for the sources of the search.
    pub from: Option<Coordinate>,
}

/// Back-pointers and distances produced by one search.
#[derive(Clone, Debug, PartialEq)]
pub struct PredecessorMap<C> {
    visited: HashMap<Coordinate, VisitedItem<C>>,
}

impl<C: Copy> PredecessorMap<C> {
    pub fn get(&self, node: Coordinate) -> Option<VisitedItem<C>> {
        self.visited.get(&node).copied()
    }

    /// The node `node` was reached from, `None` for sources and unreached nodes.
    pub fn predecessor(&self, node: Coordinate) -> Option<Coordinate> {
        self.visited.get(&node).and_then(|v| v.from)
    }

    pub fn distance(&self, node: Coordinate) -> Option<C> {
        self.visited.get(&node).map(|v| v.cost)
    }

    pub fn is_reached(&self, node: Coordinate) -> bool {
        self.visited.contains_key(&node)
    }

    pub fn is_source(&self, node: Coordinate) -> bool {
        matches!(
            self.visited.get(&node),
            Some(VisitedItem { from: None, .. })
        )
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, VisitedItem<C>)> + '_ {
        self.visited.iter().map(|(c, v)| (*c, *v))
    }
}

fn check_sources(graph: &Graph, sources: &[Coordinate]) -> Result<(), Error> {
    if sources.is_empty() {
        return Err(Error::NoSources);
    }
    match sources.iter().find(|s| !graph.contains(**s)) {
        Some(&missing) => Err(Error::UnknownSource(missing)),
        None => Ok(()),
    }
}

/// Breadth-first search from `source` over the whole reachable component.
///
/// Distances count edges and ignore weights. Neighbours are expanded in the order
/// the graph stores them (up, down, left, right within a floor, then vertical links).
pub fn bfs(graph: &Graph, source: Coordinate) -> Result<PredecessorMap<u32>, Error> {
    check_sources(graph, &[source])?;

    let mut visited = HashMap::new();
    visited.insert(
        source,
        VisitedItem {
            cost: 0,
            from: None,
        },
    );

    let mut queue = VecDeque::from([source]);

    while let Some(current) = queue.pop_front() {
        let current_cost = visited[&current].cost;

        for (next, _) in graph.neighbors_of(current) {
            if visited.contains_key(&next) {
                continue;
            }
            visited.insert(
                next,
                VisitedItem {
                    cost: current_cost + 1,
                    from: Some(current),
                },
            );
            queue.push_back(next);
        }
    }

    debug!("bfs from {}: reached {} nodes", source, visited.len());

    Ok(PredecessorMap { visited })
}

/// The objects that we store in the priority queue
#[derive(Debug)]
struct ToVisit {
    cost: f64,
    point: Coordinate,
}

impl Ord for ToVisit {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed for BinaryHeap to be a min-heap, ties go to the smaller coordinate
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.point.cmp(&self.point))
    }
}

impl PartialOrd for ToVisit {
    fn partial_cmp(&self, other: &ToVisit) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ToVisit {
    fn eq(&self, other: &ToVisit) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ToVisit {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Computing,
    Done,
}

/// Multi-source Dijkstra that can be advanced one frontier entry at a time.
#[derive(Debug)]
pub struct Dijkstra<'g> {
    graph: &'g Graph,
    visited: HashMap<Coordinate, VisitedItem<f64>>,
    settled: HashSet<Coordinate>,
    visit_list: BinaryHeap<ToVisit>,
}

impl<'g> Dijkstra<'g> {
    /// Seed every source at distance 0. At least one source is required and all of
    /// them must be nodes of `graph`.
    pub fn new(graph: &'g Graph, sources: &[Coordinate]) -> Result<Self, Error> {
        check_sources(graph, sources)?;

        let mut visited = HashMap::new();
        let mut visit_list = BinaryHeap::new();

        for &source in sources {
            visited.insert(
                source,
                VisitedItem {
                    cost: 0.0,
                    from: None,
                },
            );
            visit_list.push(ToVisit {
                cost: 0.0,
                point: source,
            });
        }

        Ok(Self {
            graph,
            visited,
            settled: HashSet::new(),
            visit_list,
        })
    }

    /// Pop one frontier entry and relax its edges.
    pub fn step(&mut self) -> SearchState {
        let Some(visit) = self.visit_list.pop() else {
            return SearchState::Done;
        };

        // stale entry, the node was settled through a cheaper push
        if !self.settled.insert(visit.point) {
            return SearchState::Computing;
        }

        for (next, weight) in self.graph.neighbors_of(visit.point) {
            let cost = visit.cost + weight;
            let improves = self
                .visited
                .get(&next)
                .map_or(true, |known| cost < known.cost);

            if improves {
                self.visited.insert(
                    next,
                    VisitedItem {
                        cost,
                        from: Some(visit.point),
                    },
                );
                self.visit_list.push(ToVisit { cost, point: next });
            }
        }

        SearchState::Computing
    }

    pub fn finish(mut self) -> PredecessorMap<f64> {
        while self.step() == SearchState::Computing {}

        debug!("dijkstra: settled {} nodes", self.settled.len());

        PredecessorMap {
            visited: self.visited,
        }
    }

    pub fn is_settled(&self, node: Coordinate) -> bool {
        self.settled.contains(&node)
    }

    /// Best known distance so far; final once the node is settled.
    pub fn distance(&self, node: Coordinate) -> Option<f64> {
        self.visited.get(&node).map(|v| v.cost)
    }
}

/// Weighted shortest paths from the nearest of `sources` to every reachable node.
pub fn dijkstra(graph: &Graph, sources: &[Coordinate]) -> Result<PredecessorMap<f64>, Error> {
    Ok(Dijkstra::new(graph, sources)?.finish())
}
