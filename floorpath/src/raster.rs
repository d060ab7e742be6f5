use std::fmt::Display;

use image::{DynamicImage, GenericImageView, Pixel, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const DARK_GRAY: Rgb<u8> = Rgb([128, 128, 128]);
pub const LIGHT_GRAY: Rgb<u8> = Rgb([196, 196, 196]);

/// A decoded image that can be queried pixel by pixel.
///
/// `x` is the column and `y` the row, both zero based from the top left corner.
pub trait Raster {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn pixel_at(&self, x: usize, y: usize) -> Rgb<u8>;
}

impl Raster for DynamicImage {
    fn width(&self) -> usize {
        GenericImageView::width(self) as usize
    }

    fn height(&self) -> usize {
        GenericImageView::height(self) as usize
    }

    fn pixel_at(&self, x: usize, y: usize) -> Rgb<u8> {
        // alpha is dropped, only the color channels carry meaning
        GenericImageView::get_pixel(self, x as u32, y as u32).to_rgb()
    }
}

impl Raster for RgbImage {
    fn width(&self) -> usize {
        GenericImageView::width(self) as usize
    }

    fn height(&self) -> usize {
        GenericImageView::height(self) as usize
    }

    fn pixel_at(&self, x: usize, y: usize) -> Rgb<u8> {
        *self.get_pixel(x as u32, y as u32)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TerrainCategory {
    Obstacle,
    Open,
    LightCost,
    HeavyCost,
    Start,
    Goal,
}

impl TerrainCategory {
    pub fn is_obstacle(self) -> bool {
        self == TerrainCategory::Obstacle
    }
}

/// Maps a pixel color to its terrain. Colors outside the table are open floor.
pub fn classify(rgb: Rgb<u8>) -> TerrainCategory {
    match rgb.0 {
        [0, 0, 0] => TerrainCategory::Obstacle,
        [255, 0, 0] => TerrainCategory::Start,
        [0, 255, 0] => TerrainCategory::Goal,
        [128, 128, 128] => TerrainCategory::HeavyCost,
        [196, 196, 196] => TerrainCategory::LightCost,
        _ => TerrainCategory::Open,
    }
}

/// One classified pixel.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub category: TerrainCategory,
    /// Set for every pixel that is not pure white, including unrecognized colors.
    pub rough: bool,
}

impl Cell {
    pub fn from_rgb(rgb: Rgb<u8>) -> Self {
        Self {
            category: classify(rgb),
            rough: rgb != WHITE,
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self.category {
                TerrainCategory::Obstacle => "X",
                TerrainCategory::Open if self.rough => ".",
                TerrainCategory::Open => " ",
                TerrainCategory::LightCost => "-",
                TerrainCategory::HeavyCost => "$",
                TerrainCategory::Start => "S",
                TerrainCategory::Goal => "G",
            }
        )
    }
}

/// The classification lookup of a single floor, built once per raster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloorMap {
    pub rows: usize,
    pub columns: usize,
    pub cells: Vec<Vec<Cell>>,
}

impl FloorMap {
    /// Classify every pixel of `raster`. Fails only when the raster has no pixels.
    pub fn from_raster<R: Raster + ?Sized>(raster: &R) -> Result<Self, Error> {
        let width = raster.width();
        let height = raster.height();

        if width == 0 || height == 0 {
            return Err(Error::EmptyRaster { width, height });
        }

        let cells = (0..height)
            .map(|row| {
                (0..width)
                    .map(|col| Cell::from_rgb(raster.pixel_at(col, row)))
                    .collect()
            })
            .collect();

        Ok(Self {
            rows: height,
            columns: width,
            cells,
        })
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Row and column of every cell with the given category, in row-major order.
    pub fn positions_of(
        &self,
        category: TerrainCategory,
    ) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells.iter().enumerate().flat_map(move |(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(move |(_, cell)| cell.category == category)
                .map(move |(col, _)| (row, col))
        })
    }

    pub fn contains(&self, category: TerrainCategory) -> bool {
        self.positions_of(category).next().is_some()
    }
}

impl Display for FloorMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.cells {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
