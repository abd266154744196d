use crate::tensor::{DecodedImage, PixelChannels};
use image::{DynamicImage, GrayImage, RgbaImage};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BuildError {
    #[error(
        "pixel buffer holds {actual} bytes, expected {expected} for a \
         {width}x{height} image"
    )]
    BufferSize {
        expected: usize,
        actual: usize,
        width: u32,
        height: u32,
    },
}

/// Moves decoded pixel bytes into a drawable image.
///
/// Grayscale buffers become 8-bit luma images; RGBA buffers become 8-bit
/// interleaved images with alpha last and a row span of `width * 4`. The
/// byte vector is consumed, so the image's backing store never aliases
/// the decoder's scratch buffer.
pub fn into_image(decoded: DecodedImage) -> Result<DynamicImage, BuildError> {
    let DecodedImage {
        bytes,
        width,
        height,
        channels,
    } = decoded;

    let expected = width as usize * height as usize * channels.count();
    let actual = bytes.len();
    if actual != expected {
        return Err(BuildError::BufferSize {
            expected,
            actual,
            width,
            height,
        });
    }

    match channels {
        PixelChannels::Gray => {
            GrayImage::from_raw(width, height, bytes).map(DynamicImage::ImageLuma8)
        }
        PixelChannels::Rgba => {
            RgbaImage::from_raw(width, height, bytes).map(DynamicImage::ImageRgba8)
        }
    }
    .ok_or(BuildError::BufferSize {
        expected,
        actual,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grayscale_bytes_become_a_luma_image() {
        let decoded = DecodedImage {
            bytes: vec![0, 128, 255, 64, 32, 16],
            width: 3,
            height: 2,
            channels: PixelChannels::Gray,
        };
        let image = into_image(decoded).unwrap();
        let luma = match image {
            DynamicImage::ImageLuma8(luma) => luma,
            other => panic!("expected a luma image, got {other:?}"),
        };
        assert_eq!(luma.dimensions(), (3, 2));
        assert_eq!(luma.get_pixel(1, 0)[0], 128);
        assert_eq!(luma.get_pixel(2, 1)[0], 16);
    }

    #[test]
    fn rgba_bytes_become_an_interleaved_rgba_image() {
        let decoded = DecodedImage {
            bytes: vec![255, 0, 0, 255, 0, 255, 0, 128],
            width: 2,
            height: 1,
            channels: PixelChannels::Rgba,
        };
        let image = into_image(decoded).unwrap();
        let rgba = match image {
            DynamicImage::ImageRgba8(rgba) => rgba,
            other => panic!("expected an rgba image, got {other:?}"),
        };
        assert_eq!(rgba.dimensions(), (2, 1));
        assert_eq!(rgba.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(rgba.get_pixel(1, 0).0, [0, 255, 0, 128]);
    }

    #[test]
    fn short_buffer_is_rejected() {
        let decoded = DecodedImage {
            bytes: vec![0; 5],
            width: 2,
            height: 2,
            channels: PixelChannels::Gray,
        };
        assert_eq!(
            into_image(decoded).unwrap_err(),
            BuildError::BufferSize {
                expected: 4,
                actual: 5,
                width: 2,
                height: 2,
            }
        );
    }
}
