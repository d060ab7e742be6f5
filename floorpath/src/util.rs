use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use log::debug;

use crate::error::Error;

pub const FLOOR_EXTENSION: &str = "bmp";

pub fn load_raster(path: &Path) -> Result<DynamicImage, Error> {
    image::open(path).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// The `.bmp` files of a folder, sorted by file name. The sort order is the floor order.
pub fn floor_files(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let io_err = |source| Error::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_floor = path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(FLOOR_EXTENSION));
        if is_floor {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Decode every floor image of `dir`.
pub fn load_floor_stack(dir: &Path) -> Result<Vec<DynamicImage>, Error> {
    let files = floor_files(dir)?;
    if files.is_empty() {
        return Err(Error::NoRasters);
    }

    files.iter().map(|f| load_raster(f)).collect()
}

/// Expand a mix of image files and floor folders into one ordered floor stack.
pub fn load_inputs(paths: &[PathBuf]) -> Result<Vec<DynamicImage>, Error> {
    let mut rasters = Vec::new();

    for path in paths {
        if path.is_dir() {
            let stack = load_floor_stack(path)?;
            debug!("{}: {} floors", path.display(), stack.len());
            rasters.extend(stack);
        } else {
            rasters.push(load_raster(path)?);
        }
    }

    if rasters.is_empty() {
        return Err(Error::NoRasters);
    }

    Ok(rasters)
}
