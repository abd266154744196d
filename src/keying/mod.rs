mod composite;
mod cube;

pub use composite::{apply_chroma_key, source_out};
pub use cube::{ColorCube, DEFAULT_CUBE_DIMENSION};

/// Errors from the keying and compositing stages. Either failure aborts
/// the pipeline; a partially keyed or composited image is never returned.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FilterError {
    #[error("color cube dimension must be at least 2, got {dimension}")]
    CubeDimension { dimension: usize },

    #[error(
        "mask is {mask_width}x{mask_height} but the photo is \
         {photo_width}x{photo_height}"
    )]
    SizeMismatch {
        mask_width: u32,
        mask_height: u32,
        photo_width: u32,
        photo_height: u32,
    },
}
