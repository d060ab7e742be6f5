use std::path::PathBuf;

use crate::grid::Coordinate;

/// Everything that can go wrong between reading a raster and handing a path to the caller.
///
/// An unreachable goal is not an error; searches report it through
/// [`SearchOutcome::NoPathFound`](crate::path::SearchOutcome::NoPathFound).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The image file could not be decoded.
    #[error("failed to decode raster {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A floor folder could not be listed.
    #[error("failed to read folder {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No raster was supplied at all.
    #[error("no rasters to build a graph from")]
    NoRasters,

    #[error("raster has zero size ({width}x{height})")]
    EmptyRaster { width: usize, height: usize },

    #[error("no start marker (red pixel) found")]
    MissingStart,

    #[error("no goal marker (green pixel) found")]
    MissingGoal,

    /// A search was asked to run without any source.
    #[error("search requires at least one source")]
    NoSources,

    #[error("source {0} is not a node of the graph")]
    UnknownSource(Coordinate),

    /// An edge points at a coordinate that is not a node. Indicates a construction bug.
    #[error("edge {from} -> {to} references a missing node")]
    DanglingEdge { from: Coordinate, to: Coordinate },

    #[error("edge {from} -> {to} has non-positive or non-finite weight {weight}")]
    InvalidWeight {
        from: Coordinate,
        to: Coordinate,
        weight: f64,
    },

    /// Direction symbols only exist for moves inside one floor.
    #[error("path changes floor at {from} -> {to}, directions are undefined")]
    FloorChange { from: Coordinate, to: Coordinate },

    #[error("cannot express the move {from} -> {to} as a direction")]
    NotADirection { from: Coordinate, to: Coordinate },
}
