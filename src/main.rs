mod inference;
mod keying;
mod raster;
mod tensor;

use anyhow::{Context, Result};
use clap::Parser;
use image::{imageops, DynamicImage, RgbImage, RgbaImage};
use inference::MattingModel;
use keying::{apply_chroma_key, source_out, ColorCube};
use std::time::Instant;
use tensor::{AxisAssignment, ChannelSelect, DecodeParams, SampleRange};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input photo path
    input: String,

    /// Output path (PNG keeps the cut-out background transparent)
    #[arg(short, long, default_value = "out.png")]
    output: String,

    /// Path to the matting model (ONNX file)
    /// If not provided, runs in passthrough mode and writes the photo unchanged
    #[arg(long)]
    model: Option<String>,

    /// Resolution per axis of the chroma-key color cube
    #[arg(long, default_value_t = keying::DEFAULT_CUBE_DIMENSION)]
    cube_size: usize,

    /// Lower bound of the model's output value range
    #[arg(long, default_value_t = 0.0)]
    value_min: f32,

    /// Upper bound of the model's output value range
    #[arg(long, default_value_t = 1.0)]
    value_max: f32,

    /// Decode a single channel of the model output instead of all channels
    #[arg(long)]
    channel: Option<usize>,

    /// Write the decoded matte (grayscale silhouette) instead of the composite
    #[arg(long)]
    show_matte: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("Keyout starting");

    let photo = image::open(&args.input)
        .with_context(|| format!("Failed to open photo at {}", args.input))?
        .to_rgb8();
    tracing::info!(
        "Loaded {} ({}x{})",
        args.input,
        photo.width(),
        photo.height()
    );

    let Some(model_path) = args.model.as_deref() else {
        tracing::info!("Running in passthrough mode (no matting model)");
        photo
            .save(&args.output)
            .with_context(|| format!("Failed to write {}", args.output))?;
        tracing::info!("Wrote {}", args.output);
        return Ok(());
    };

    let mut model =
        inference::load_model(model_path).context("Failed to load matting model")?;

    let result = match remove_background(&photo, model.as_mut(), &args) {
        Ok(image) => image,
        Err(error) => {
            tracing::warn!(
                "Background removal failed, keeping the photo unchanged: {error:#}"
            );
            DynamicImage::ImageRgb8(photo).to_rgba8()
        }
    };

    result
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output))?;
    tracing::info!("Wrote {}", args.output);

    Ok(())
}

/// Runs the full matting pipeline over one photo:
/// resize to the model input, infer, decode the matte tensor, punch out
/// the full-brightness region with the chroma-key cube, composite the
/// photo through the hole, and resize back to the photo's dimensions.
fn remove_background(
    photo: &RgbImage,
    model: &mut dyn MattingModel,
    args: &Args,
) -> Result<RgbaImage> {
    let (input_width, input_height) = model.input_size();

    let resize_start = Instant::now();
    let resized = if photo.dimensions() != (input_width, input_height) {
        imageops::resize(
            photo,
            input_width,
            input_height,
            imageops::FilterType::Lanczos3,
        )
    } else {
        photo.clone()
    };
    let resize_time = resize_start.elapsed();

    let infer_start = Instant::now();
    let tensor = model
        .infer(&resized)
        .context("Failed to run matting inference")?;
    let infer_time = infer_start.elapsed();

    let decode_start = Instant::now();
    let axes = if tensor.shape().len() == 4 {
        // Batched NCHW output: skip the batch axis.
        AxisAssignment::Explicit {
            channel: Some(1),
            height: 2,
            width: 3,
        }
    } else {
        AxisAssignment::Auto
    };
    let params = DecodeParams {
        axes,
        channel: match args.channel {
            Some(index) => ChannelSelect::Index(index),
            None => ChannelSelect::All,
        },
        range: SampleRange::F32 {
            min: args.value_min,
            max: args.value_max,
        },
    };
    let decoded = tensor::decode(&tensor.view(), &params)
        .context("Failed to decode the matte tensor")?;
    let matte = raster::into_image(decoded).context("Failed to build the matte image")?;
    let decode_time = decode_start.elapsed();

    let matte = matte.to_rgba8();
    if args.show_matte {
        return Ok(restore_size(matte, photo.dimensions()));
    }

    let key_start = Instant::now();
    let cube =
        ColorCube::generate(args.cube_size).context("Failed to build the chroma-key cube")?;
    let mask = apply_chroma_key(&matte, &cube);
    let key_time = key_start.elapsed();

    let composite_start = Instant::now();
    let mut base = DynamicImage::ImageRgb8(resized).to_rgba8();
    if base.dimensions() != mask.dimensions() {
        tracing::debug!(
            "Resizing photo {}x{} to match the {}x{} matte",
            base.width(),
            base.height(),
            mask.width(),
            mask.height()
        );
        base = imageops::resize(
            &base,
            mask.width(),
            mask.height(),
            imageops::FilterType::Lanczos3,
        );
    }
    let composited = source_out(&base, &mask).context("Failed to composite the photo")?;
    let composite_time = composite_start.elapsed();

    tracing::info!(
        "Stages: resize={:.1}ms, inference={:.1}ms, decode={:.1}ms, key={:.1}ms, composite={:.1}ms",
        resize_time.as_secs_f64() * 1000.0,
        infer_time.as_secs_f64() * 1000.0,
        decode_time.as_secs_f64() * 1000.0,
        key_time.as_secs_f64() * 1000.0,
        composite_time.as_secs_f64() * 1000.0,
    );

    Ok(restore_size(composited, photo.dimensions()))
}

/// Resizes a pipeline image back to the photo's original dimensions.
fn restore_size(image: RgbaImage, (width, height): (u32, u32)) -> RgbaImage {
    if image.dimensions() == (width, height) {
        return image;
    }
    imageops::resize(&image, width, height, imageops::FilterType::Lanczos3)
}
