//! Square cutouts from decoded raster images.
//!
//! Pixel `(col, row)` of the cutout is image pixel
//! `(xpos - boxsize/2 + col, ypos - boxsize/2 + row)`, zero-based, which is
//! the same translation the core uses for its distance calculations.

use std::path::Path;

use image::{DynamicImage, ImageBuffer, Luma};
use starphot_core::{GridAnchor, GridError, PixelGrid};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced while cutting a grid out of an image.
#[derive(thiserror::Error, Debug)]
pub enum CutoutError {
    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(
        "box of {boxsize} px around ({xpos}, {ypos}) leaves the {width}x{height} image"
    )]
    OutOfBounds {
        xpos: i64,
        ypos: i64,
        boxsize: usize,
        width: u32,
        height: u32,
    },

    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Cut a `boxsize` square centered on `anchor` out of a 16-bit image.
pub fn cutout_from_luma16(
    img: &ImageBuffer<Luma<u16>, Vec<u16>>,
    anchor: GridAnchor,
    boxsize: usize,
) -> Result<PixelGrid, CutoutError> {
    let out_of_bounds = || CutoutError::OutOfBounds {
        xpos: anchor.xpos,
        ypos: anchor.ypos,
        boxsize,
        width: img.width(),
        height: img.height(),
    };

    let half = i64::try_from(boxsize / 2).map_err(|_| out_of_bounds())?;
    let size = i64::try_from(boxsize).map_err(|_| out_of_bounds())?;
    let left = anchor.xpos - half;
    let top = anchor.ypos - half;
    if boxsize == 0
        || left < 0
        || top < 0
        || left + size > i64::from(img.width())
        || top + size > i64::from(img.height())
    {
        return Err(out_of_bounds());
    }

    // bounds checked above, so the casts cannot truncate
    let (left, top) = (left as u32, top as u32);
    Ok(PixelGrid::from_fn(boxsize, anchor, |col, row| {
        f64::from(img.get_pixel(left + col as u32, top + row as u32).0[0])
    })?)
}

/// Cut a grid out of any decoded image, converting it to 16-bit luminance.
pub fn cutout_from_dynamic(
    img: &DynamicImage,
    anchor: GridAnchor,
    boxsize: usize,
) -> Result<PixelGrid, CutoutError> {
    match img {
        DynamicImage::ImageLuma16(buf) => cutout_from_luma16(buf, anchor, boxsize),
        other => cutout_from_luma16(&other.to_luma16(), anchor, boxsize),
    }
}

/// Decode the image at `path` and cut out the grid.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))
)]
pub fn load_cutout(
    path: impl AsRef<Path>,
    anchor: GridAnchor,
    boxsize: usize,
) -> Result<PixelGrid, CutoutError> {
    let img = image::open(path.as_ref())?;
    log::debug!(
        "decoded {} ({}x{})",
        path.as_ref().display(),
        img.width(),
        img.height()
    );
    cutout_from_dynamic(&img, anchor, boxsize)
}
