use super::preprocess::Preprocessor;
use super::MattingModel;
use crate::tensor::{SampleData, TensorData};
use anyhow::{Context, Result};
use image::RgbImage;
use ort::{GraphOptimizationLevel, Session};
use std::path::Path;

/// Matting backed by a single-input, single-output ONNX model
/// (MODNet, U²-Net and similar portrait matting networks).
///
/// The model takes a normalized `[1, 3, H, W]` frame and emits one
/// matte tensor, typically `[1, 1, H, W]` with values in `[0, 1]`.
pub struct OnnxMatting {
    session: Session,
    preprocessor: Preprocessor,
    width: u32,
    height: u32,
}

impl OnnxMatting {
    /// Loads a matting model from an ONNX file.
    ///
    /// # Default Configuration
    /// - Input size: 512x512 (adjust for a performance/quality tradeoff)
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let path = model_path.as_ref();

        tracing::info!("Loading matting model from {}", path.display());

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        tracing::info!("Matting model loaded successfully");

        let width = 512;
        let height = 512;

        Ok(Self {
            session,
            preprocessor: Preprocessor::new(width, height),
            width,
            height,
        })
    }
}

impl MattingModel for OnnxMatting {
    fn infer(&mut self, frame: &RgbImage) -> Result<TensorData> {
        let _span = tracing::debug_span!("onnx_infer").entered();

        let frame = self.preprocessor.resize(frame);
        let input = self.preprocessor.tensor(&frame)?;

        let outputs = self
            .session
            .run(ort::inputs![input.view()]?)
            .context("Failed to run inference")?;

        // The matte is the model's sole output.
        let matte = outputs[0]
            .try_extract_tensor::<f32>()
            .context("Model output is not a float tensor")?;
        let view = matte.view();
        let shape: Vec<usize> = view.shape().to_vec();
        let samples: Vec<f32> = view.iter().copied().collect();

        Ok(TensorData::contiguous(SampleData::F32(samples), shape))
    }

    fn input_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
