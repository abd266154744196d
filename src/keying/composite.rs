use super::{ColorCube, FilterError};
use image::{Rgba, RgbaImage};

/// Remaps every pixel of `mask` through the cube, producing the
/// transparency-carrying mask: transparent wherever the input was at full
/// brightness, the input color (opaque, premultiplied) everywhere else.
pub fn apply_chroma_key(mask: &RgbaImage, cube: &ColorCube) -> RgbaImage {
    let _span = tracing::debug_span!("chroma_key").entered();

    RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        let pixel = mask.get_pixel(x, y);
        let keyed = cube.lookup(
            pixel[0] as f32 / 255.0,
            pixel[1] as f32 / 255.0,
            pixel[2] as f32 / 255.0,
        );
        Rgba([
            (keyed[0] * 255.0).clamp(0.0, 255.0) as u8,
            (keyed[1] * 255.0).clamp(0.0, 255.0) as u8,
            (keyed[2] * 255.0).clamp(0.0, 255.0) as u8,
            (keyed[3] * 255.0).clamp(0.0, 255.0) as u8,
        ])
    })
}

/// Source-out composite: every component of the photo, alpha included, is
/// scaled by `1 - mask_alpha`, so the photo survives exactly where the
/// mask is transparent and vanishes where it is opaque.
pub fn source_out(photo: &RgbaImage, mask: &RgbaImage) -> Result<RgbaImage, FilterError> {
    let _span = tracing::debug_span!("composite").entered();

    if photo.dimensions() != mask.dimensions() {
        return Err(FilterError::SizeMismatch {
            mask_width: mask.width(),
            mask_height: mask.height(),
            photo_width: photo.width(),
            photo_height: photo.height(),
        });
    }

    Ok(RgbaImage::from_fn(photo.width(), photo.height(), |x, y| {
        let source = photo.get_pixel(x, y);
        let hole = 1.0 - mask.get_pixel(x, y)[3] as f32 / 255.0;
        Rgba([
            (source[0] as f32 * hole) as u8,
            (source[1] as f32 * hole) as u8,
            (source[2] as f32 * hole) as u8,
            (source[3] as f32 * hole) as u8,
        ])
    }))
}
