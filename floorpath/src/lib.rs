//! Shortest paths across color-coded floor plans.
//!
//! A raster is classified pixel by pixel into terrain ([`raster`]), turned into a
//! weighted 4-connected grid graph ([`grid`]), optionally stacked with other floors
//! through fixed-weight vertical links ([`connector`]), searched with BFS or
//! multi-source Dijkstra ([`find`]) and finally walked back into a path ([`path`]).
//!
//! ```
//! use floorpath::{build_graph, solve, Algorithm, WeightPolicy, DEFAULT_FLOOR_WEIGHT};
//! use image::{Rgb, RgbImage};
//!
//! let mut img = RgbImage::from_pixel(3, 3, Rgb([255, 255, 255]));
//! img.put_pixel(0, 0, Rgb([255, 0, 0]));
//! img.put_pixel(2, 2, Rgb([0, 255, 0]));
//!
//! let graph = build_graph(&[img], WeightPolicy::Multiplicative, DEFAULT_FLOOR_WEIGHT).unwrap();
//! let outcome = solve(&graph, Algorithm::Bfs).unwrap();
//!
//! assert_eq!(outcome.path().unwrap().steps(), 4);
//! ```

pub mod config;
pub mod connector;
pub mod error;
pub mod find;
pub mod grid;
pub mod logging;
pub mod path;
pub mod pipeline;
pub mod raster;
pub mod util;

pub use connector::connect_floors;
pub use error::Error;
pub use find::{bfs, dijkstra, Dijkstra, PredecessorMap, SearchState, VisitedItem};
pub use grid::{Coordinate, Graph, GraphBuilder, Node, WeightPolicy, DEFAULT_FLOOR_WEIGHT};
pub use path::{reconstruct, Direction, PathResult, SearchOutcome};
pub use pipeline::{build_graph, solve, Algorithm};
pub use raster::{classify, Cell, FloorMap, Raster, TerrainCategory};
