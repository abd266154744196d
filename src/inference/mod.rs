mod onnx;
mod preprocess;

pub use onnx::OnnxMatting;
pub use preprocess::Preprocessor;

use crate::tensor::TensorData;
use anyhow::Result;
use image::RgbImage;

/// Trait for matting model backends.
/// Allows swapping between different model families (MODNet, U²-Net, etc.)
pub trait MattingModel {
    /// Runs the model on one frame and returns its raw output tensor.
    ///
    /// The tensor comes back exactly as the backend produced it — shape,
    /// strides and element kind untouched. Turning it into a mask image
    /// is the decoder's job, not the backend's.
    fn infer(&mut self, frame: &RgbImage) -> Result<TensorData>;

    /// The input dimensions the model expects, as (width, height).
    fn input_size(&self) -> (u32, u32);
}

/// Create the default matting backend (ONNX).
pub fn load_model(model_path: &str) -> Result<Box<dyn MattingModel>> {
    let model = OnnxMatting::new(model_path)?;
    Ok(Box::new(model))
}
