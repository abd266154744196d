use anyhow::{ensure, Result};
use image::{imageops, RgbImage};
use ndarray::Array4;

/// Prepares photos for the model: resizing to the input dimensions and
/// rasterizing into a normalized NCHW float tensor.
pub struct Preprocessor {
    width: u32,
    height: u32,
}

impl Preprocessor {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Resizes a photo to the model input size. Returns a clone when the
    /// dimensions already match.
    pub fn resize(&self, photo: &RgbImage) -> RgbImage {
        if photo.dimensions() == (self.width, self.height) {
            return photo.clone();
        }
        imageops::resize(
            photo,
            self.width,
            self.height,
            imageops::FilterType::Lanczos3,
        )
    }

    /// Rasterizes an already-sized frame into a `[1, 3, height, width]`
    /// tensor with each channel normalized to `[0, 1]`.
    pub fn tensor(&self, frame: &RgbImage) -> Result<Array4<f32>> {
        let _span = tracing::debug_span!("preprocess").entered();

        ensure!(
            frame.dimensions() == (self.width, self.height),
            "frame is {}x{} but the model expects {}x{}",
            frame.width(),
            frame.height(),
            self.width,
            self.height,
        );

        let mut tensor =
            Array4::<f32>::zeros((1, 3, self.height as usize, self.width as usize));
        for (x, y, pixel) in frame.enumerate_pixels() {
            for channel in 0..3 {
                tensor[[0, channel, y as usize, x as usize]] =
                    pixel[channel] as f32 / 255.0;
            }
        }

        Ok(tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn tensor_is_normalized_channel_first() {
        let mut frame = RgbImage::new(2, 2);
        frame.put_pixel(0, 0, Rgb([255, 0, 0]));
        frame.put_pixel(1, 0, Rgb([0, 255, 0]));
        frame.put_pixel(0, 1, Rgb([0, 0, 255]));
        frame.put_pixel(1, 1, Rgb([51, 102, 153]));

        let preprocessor = Preprocessor::new(2, 2);
        let tensor = preprocessor.tensor(&frame).unwrap();

        assert_eq!(tensor.shape(), &[1, 3, 2, 2]);
        assert_eq!(tensor[[0, 0, 0, 0]], 1.0);
        assert_eq!(tensor[[0, 1, 0, 1]], 1.0);
        assert_eq!(tensor[[0, 2, 1, 0]], 1.0);
        assert!((tensor[[0, 0, 1, 1]] - 0.2).abs() < 1e-6);
        assert!((tensor[[0, 1, 1, 1]] - 0.4).abs() < 1e-6);
        assert!((tensor[[0, 2, 1, 1]] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn tensor_rejects_a_frame_of_the_wrong_size() {
        let preprocessor = Preprocessor::new(4, 4);
        let frame = RgbImage::new(2, 2);
        assert!(preprocessor.tensor(&frame).is_err());
    }

    #[test]
    fn resize_is_a_clone_at_matching_dimensions() {
        let preprocessor = Preprocessor::new(3, 2);
        let frame = RgbImage::new(3, 2);
        let resized = preprocessor.resize(&frame);
        assert_eq!(resized.dimensions(), (3, 2));
    }

    #[test]
    fn resize_reaches_the_model_dimensions() {
        let preprocessor = Preprocessor::new(4, 6);
        let frame = RgbImage::new(10, 10);
        let resized = preprocessor.resize(&frame);
        assert_eq!(resized.dimensions(), (4, 6));
    }
}
