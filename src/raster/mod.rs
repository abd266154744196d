mod builder;

pub use builder::{into_image, BuildError};
