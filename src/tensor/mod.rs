mod decode;
mod view;

pub use decode::{
    decode, AxisAssignment, ChannelSelect, DecodeError, DecodeParams, DecodedImage,
    PixelChannels, SampleRange,
};
pub use view::{SampleData, SampleKind, SampleValue, Samples, TensorData, TensorView};
