use super::view::{Sample, SampleKind, SampleValue, TensorView};

/// Which tensor channels end up in the decoded pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSelect {
    /// Decode every channel the tensor carries.
    All,
    /// Decode a single channel as a grayscale plane.
    Index(usize),
}

/// Maps tensor axes onto the channel/height/width roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisAssignment {
    /// Derive from the rank: 2-D tensors are height-by-width, anything
    /// larger is channel-first (channel=0, height=1, width=2).
    Auto,
    /// Explicit axis indices. `channel` may be `None` only for 2-D tensors.
    Explicit {
        channel: Option<usize>,
        height: usize,
        width: usize,
    },
}

/// The numeric range the tensor values occupy, tagged with the same kind
/// as the backing buffer. No widening happens across kinds; a mismatched
/// pair is rejected at decode entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleRange {
    F64 { min: f64, max: f64 },
    F32 { min: f32, max: f32 },
    I32 { min: i32, max: i32 },
}

impl SampleRange {
    pub fn kind(&self) -> SampleKind {
        match self {
            SampleRange::F64 { .. } => SampleKind::F64,
            SampleRange::F32 { .. } => SampleKind::F32,
            SampleRange::I32 { .. } => SampleKind::I32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeParams {
    pub axes: AxisAssignment,
    pub channel: ChannelSelect,
    pub range: SampleRange,
}

/// Layout of a decoded pixel buffer. Three-channel tensors are widened to
/// RGBA during decoding, so only these two layouts exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelChannels {
    Gray,
    Rgba,
}

impl PixelChannels {
    pub fn count(self) -> usize {
        match self {
            PixelChannels::Gray => 1,
            PixelChannels::Rgba => 4,
        }
    }
}

/// Flat interleaved pixel bytes plus the dimensions derived from the
/// tensor's height/width axes.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub channels: PixelChannels,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DecodeError {
    #[error("tensor rank must be at least 2, got {rank}")]
    Shape { rank: usize },

    #[error(
        "axis assignment channel={channel:?} height={height} width={width} \
         is out of range or duplicated for a rank-{rank} tensor"
    )]
    Axis {
        channel: Option<usize>,
        height: usize,
        width: usize,
        rank: usize,
    },

    #[error("channel index {index} is out of range for channel dimension {channels}")]
    ChannelRange { index: usize, channels: usize },

    #[error("channel dimension {channels} has no pixel layout (expected 1, 3 or 4)")]
    UnsupportedChannelCount { channels: usize },

    #[error("value range [{min}, {max}] is degenerate or inverted")]
    Range { min: f64, max: f64 },

    #[error("value range is {range} but the tensor holds {samples} samples")]
    SampleKind {
        range: &'static str,
        samples: &'static str,
    },

    #[error("stride count {strides} does not match shape rank {rank}")]
    StrideCount { strides: usize, rank: usize },
}

#[derive(Debug, Clone, Copy)]
struct ResolvedAxes {
    channel: Option<usize>,
    height: usize,
    width: usize,
}

/// How the channel dimension feeds the output pixels.
#[derive(Debug, Clone, Copy)]
enum ChannelPlan {
    /// One byte per pixel, read at a fixed channel index (or with no
    /// channel axis at all for 2-D tensors).
    Gray { channel: Option<(usize, usize)> },
    /// Four bytes per pixel; `source_channels` is 3 or 4. With 3 source
    /// channels the alpha byte is forced to 255.
    Rgba {
        axis: usize,
        source_channels: usize,
    },
}

impl ChannelPlan {
    fn pixel_channels(&self) -> PixelChannels {
        match self {
            ChannelPlan::Gray { .. } => PixelChannels::Gray,
            ChannelPlan::Rgba { .. } => PixelChannels::Rgba,
        }
    }
}

/// Walks the view in row-major pixel order and remaps every sample onto a
/// byte, producing an interleaved grayscale or RGBA buffer.
///
/// Element access goes through [`TensorView::read`]. The sample and range
/// kinds are paired once here at entry; [`Sample`] carries the per-kind
/// arithmetic applied to each tagged value the view hands back.
pub fn decode(view: &TensorView<'_>, params: &DecodeParams) -> Result<DecodedImage, DecodeError> {
    let _span = tracing::debug_span!("decode").entered();

    let rank = view.rank();
    if rank < 2 {
        return Err(DecodeError::Shape { rank });
    }

    let axes = resolve_axes(params.axes, rank)?;
    let plan = resolve_channels(&axes, view.shape(), params.channel)?;

    if view.kind() != params.range.kind() {
        return Err(DecodeError::SampleKind {
            range: params.range.kind().as_str(),
            samples: view.kind().as_str(),
        });
    }
    validate_range(params.range)?;

    let bytes = walk(view, &axes, &plan, params.range)?;

    Ok(DecodedImage {
        bytes,
        width: view.shape()[axes.width] as u32,
        height: view.shape()[axes.height] as u32,
        channels: plan.pixel_channels(),
    })
}

fn resolve_axes(axes: AxisAssignment, rank: usize) -> Result<ResolvedAxes, DecodeError> {
    let resolved = match axes {
        AxisAssignment::Auto if rank == 2 => ResolvedAxes {
            channel: None,
            height: 0,
            width: 1,
        },
        AxisAssignment::Auto => ResolvedAxes {
            channel: Some(0),
            height: 1,
            width: 2,
        },
        AxisAssignment::Explicit {
            channel,
            height,
            width,
        } => ResolvedAxes {
            channel,
            height,
            width,
        },
    };

    let invalid = resolved.height >= rank
        || resolved.width >= rank
        || resolved.height == resolved.width
        || match resolved.channel {
            Some(channel) => {
                channel >= rank || channel == resolved.height || channel == resolved.width
            }
            // The channel role may only go unassigned on a plain 2-D plane.
            None => rank != 2,
        };
    if invalid {
        return Err(DecodeError::Axis {
            channel: resolved.channel,
            height: resolved.height,
            width: resolved.width,
            rank,
        });
    }
    Ok(resolved)
}

fn resolve_channels(
    axes: &ResolvedAxes,
    shape: &[usize],
    select: ChannelSelect,
) -> Result<ChannelPlan, DecodeError> {
    // 2-D tensors are a single grayscale plane no matter what was selected.
    let Some(axis) = axes.channel else {
        return Ok(ChannelPlan::Gray { channel: None });
    };
    let channels = shape[axis];

    match select {
        ChannelSelect::Index(index) => {
            if index >= channels {
                return Err(DecodeError::ChannelRange { index, channels });
            }
            Ok(ChannelPlan::Gray {
                channel: Some((axis, index)),
            })
        }
        ChannelSelect::All => match channels {
            1 => Ok(ChannelPlan::Gray {
                channel: Some((axis, 0)),
            }),
            3 | 4 => Ok(ChannelPlan::Rgba {
                axis,
                source_channels: channels,
            }),
            _ => Err(DecodeError::UnsupportedChannelCount { channels }),
        },
    }
}

fn validate_range(range: SampleRange) -> Result<(), DecodeError> {
    let (valid, min, max) = match range {
        SampleRange::F64 { min, max } => (f64::valid_range(min, max), min, max),
        SampleRange::F32 { min, max } => {
            (f32::valid_range(min, max), min.to_f64(), max.to_f64())
        }
        SampleRange::I32 { min, max } => {
            (i32::valid_range(min, max), min.to_f64(), max.to_f64())
        }
    };
    if valid {
        Ok(())
    } else {
        Err(DecodeError::Range { min, max })
    }
}

/// Applies the per-kind range arithmetic to one sample read out of the view.
fn remap(value: SampleValue, range: SampleRange) -> Result<u8, DecodeError> {
    match (value, range) {
        (SampleValue::F64(value), SampleRange::F64 { min, max }) => Ok(value.to_byte(min, max)),
        (SampleValue::F32(value), SampleRange::F32 { min, max }) => Ok(value.to_byte(min, max)),
        (SampleValue::I32(value), SampleRange::I32 { min, max }) => Ok(value.to_byte(min, max)),
        (value, range) => Err(DecodeError::SampleKind {
            range: range.kind().as_str(),
            samples: value.kind().as_str(),
        }),
    }
}

fn walk(
    view: &TensorView<'_>,
    axes: &ResolvedAxes,
    plan: &ChannelPlan,
    range: SampleRange,
) -> Result<Vec<u8>, DecodeError> {
    let height = view.shape()[axes.height];
    let width = view.shape()[axes.width];
    // Axes outside the channel/height/width assignment stay pinned at 0.
    let mut index = vec![0usize; view.rank()];

    match *plan {
        ChannelPlan::Gray { channel } => {
            if let Some((axis, pick)) = channel {
                index[axis] = pick;
            }
            let mut bytes = Vec::with_capacity(width * height);
            for y in 0..height {
                index[axes.height] = y;
                for x in 0..width {
                    index[axes.width] = x;
                    bytes.push(remap(view.read(&index), range)?);
                }
            }
            Ok(bytes)
        }
        ChannelPlan::Rgba {
            axis,
            source_channels,
        } => {
            let mut bytes = Vec::with_capacity(width * height * 4);
            for y in 0..height {
                index[axes.height] = y;
                for x in 0..width {
                    index[axes.width] = x;
                    for channel in 0..source_channels {
                        index[axis] = channel;
                        bytes.push(remap(view.read(&index), range)?);
                    }
                    if source_channels == 3 {
                        bytes.push(255);
                    }
                }
            }
            Ok(bytes)
        }
    }
}
