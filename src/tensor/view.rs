use super::decode::DecodeError;

/// Numeric kind of a tensor's backing buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    F64,
    F32,
    I32,
}

impl SampleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SampleKind::F64 => "f64",
            SampleKind::F32 => "f32",
            SampleKind::I32 => "i32",
        }
    }
}

/// Borrowed sample storage, tagged by kind.
///
/// The slice is owned by the caller (typically the inference backend's
/// output buffer); a `Samples` value only borrows it.
#[derive(Debug, Clone, Copy)]
pub enum Samples<'a> {
    F64(&'a [f64]),
    F32(&'a [f32]),
    I32(&'a [i32]),
}

impl Samples<'_> {
    pub fn kind(&self) -> SampleKind {
        match self {
            Samples::F64(_) => SampleKind::F64,
            Samples::F32(_) => SampleKind::F32,
            Samples::I32(_) => SampleKind::I32,
        }
    }
}

/// A single element read out of a view, tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    F64(f64),
    F32(f32),
    I32(i32),
}

impl SampleValue {
    pub fn kind(self) -> SampleKind {
        match self {
            SampleValue::F64(_) => SampleKind::F64,
            SampleValue::F32(_) => SampleKind::F32,
            SampleValue::I32(_) => SampleKind::I32,
        }
    }
}

/// Owned sample storage, for tensors handed across the inference seam.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleData {
    F64(Vec<f64>),
    F32(Vec<f32>),
    I32(Vec<i32>),
}

impl SampleData {
    fn as_samples(&self) -> Samples<'_> {
        match self {
            SampleData::F64(data) => Samples::F64(data),
            SampleData::F32(data) => Samples::F32(data),
            SampleData::I32(data) => Samples::I32(data),
        }
    }
}

/// An owned tensor as produced by an inference backend: a flat sample
/// buffer plus the shape and per-axis strides describing its layout.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorData {
    data: SampleData,
    shape: Vec<usize>,
    strides: Vec<isize>,
}

impl TensorData {
    /// Wraps a sample buffer with an explicit shape and stride layout.
    pub fn new(
        data: SampleData,
        shape: Vec<usize>,
        strides: Vec<isize>,
    ) -> Result<Self, DecodeError> {
        if strides.len() != shape.len() {
            return Err(DecodeError::StrideCount {
                strides: strides.len(),
                rank: shape.len(),
            });
        }
        Ok(Self {
            data,
            shape,
            strides,
        })
    }

    /// Wraps a row-major contiguous buffer, deriving the strides from the shape.
    pub fn contiguous(data: SampleData, shape: Vec<usize>) -> Self {
        let strides = row_major_strides(&shape);
        Self {
            data,
            shape,
            strides,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Borrows this tensor as a read-only strided view.
    pub fn view(&self) -> TensorView<'_> {
        TensorView {
            samples: self.data.as_samples(),
            shape: &self.shape,
            strides: &self.strides,
        }
    }
}

/// A read-only strided view over a caller-owned sample buffer.
///
/// The view never copies or frees the buffer, and the borrow ties its
/// lifetime to the buffer's owner. Strides are element offsets per unit
/// step along each axis; no contiguity or axis order is assumed.
#[derive(Debug, Clone, Copy)]
pub struct TensorView<'a> {
    samples: Samples<'a>,
    shape: &'a [usize],
    strides: &'a [isize],
}

impl<'a> TensorView<'a> {
    pub fn new(
        samples: Samples<'a>,
        shape: &'a [usize],
        strides: &'a [isize],
    ) -> Result<Self, DecodeError> {
        if strides.len() != shape.len() {
            return Err(DecodeError::StrideCount {
                strides: strides.len(),
                rank: shape.len(),
            });
        }
        Ok(Self {
            samples,
            shape,
            strides,
        })
    }

    pub fn shape(&self) -> &[usize] {
        self.shape
    }

    pub fn strides(&self) -> &[isize] {
        self.strides
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn kind(&self) -> SampleKind {
        self.samples.kind()
    }

    /// Reads the element at the given per-axis offsets.
    ///
    /// The flat position is `sum(index[i] * stride[i])`. The caller keeps
    /// every index within `shape`; an offset that escapes the buffer
    /// panics like any out-of-range slice access.
    pub fn read(&self, index: &[usize]) -> SampleValue {
        let offset = flat_offset(self.strides, index);
        match self.samples {
            Samples::F64(data) => SampleValue::F64(data[offset]),
            Samples::F32(data) => SampleValue::F32(data[offset]),
            Samples::I32(data) => SampleValue::I32(data[offset]),
        }
    }
}

fn flat_offset(strides: &[isize], index: &[usize]) -> usize {
    let mut offset = 0isize;
    for (i, stride) in index.iter().zip(strides) {
        offset += *i as isize * stride;
    }
    offset as usize
}

fn row_major_strides(shape: &[usize]) -> Vec<isize> {
    let rank = shape.len();
    let mut strides = vec![0isize; rank];
    if rank == 0 {
        return strides;
    }
    strides[rank - 1] = 1;
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1] as isize;
    }
    strides
}

/// One decodable element kind. Implementations carry the per-kind
/// arithmetic for remapping a value range onto a single byte.
pub(crate) trait Sample: Copy {
    /// Remaps `self` from `[min, max]` onto `[0, 255]`, truncating.
    ///
    /// The scale factor is 256 over the range span, clamped at 255, so the
    /// lower bound lands on 0 and the upper bound on 255 exactly.
    fn to_byte(self, min: Self, max: Self) -> u8;

    /// `true` when the range spans at least one representable step.
    fn valid_range(min: Self, max: Self) -> bool;

    fn to_f64(self) -> f64;
}

impl Sample for f64 {
    fn to_byte(self, min: Self, max: Self) -> u8 {
        ((self - min) * 256.0 / (max - min)).clamp(0.0, 255.0) as u8
    }

    fn valid_range(min: Self, max: Self) -> bool {
        max > min
    }

    fn to_f64(self) -> f64 {
        self
    }
}

impl Sample for f32 {
    fn to_byte(self, min: Self, max: Self) -> u8 {
        ((self - min) * 256.0 / (max - min)).clamp(0.0, 255.0) as u8
    }

    fn valid_range(min: Self, max: Self) -> bool {
        max > min
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Sample for i32 {
    fn to_byte(self, min: Self, max: Self) -> u8 {
        let span = i64::from(max) - i64::from(min);
        let scaled = (i64::from(self) - i64::from(min)) * 256 / span;
        scaled.clamp(0, 255) as u8
    }

    fn valid_range(min: Self, max: Self) -> bool {
        max > min
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_follows_row_major_strides() {
        let data: Vec<f32> = (0..6).map(|v| v as f32).collect();
        let shape = [2usize, 3];
        let strides = [3isize, 1];
        let view = TensorView::new(Samples::F32(&data), &shape, &strides).unwrap();
        assert_eq!(view.read(&[0, 0]), SampleValue::F32(0.0));
        assert_eq!(view.read(&[1, 2]), SampleValue::F32(5.0));
    }

    #[test]
    fn read_follows_permuted_strides() {
        // Column-major layout of a 2x3 tensor: element (y, x) lives at x*2 + y.
        let data: Vec<f64> = (0..6).map(|v| v as f64).collect();
        let shape = [2usize, 3];
        let strides = [1isize, 2];
        let view = TensorView::new(Samples::F64(&data), &shape, &strides).unwrap();
        assert_eq!(view.read(&[0, 2]), SampleValue::F64(4.0));
        assert_eq!(view.read(&[1, 1]), SampleValue::F64(3.0));
    }

    #[test]
    fn read_skips_padding_between_rows() {
        // 2x2 tensor stored with 4-element rows, upper-left of a larger buffer.
        let data: Vec<i32> = (0..8).collect();
        let shape = [2usize, 2];
        let strides = [4isize, 1];
        let view = TensorView::new(Samples::I32(&data), &shape, &strides).unwrap();
        assert_eq!(view.read(&[1, 0]), SampleValue::I32(4));
        assert_eq!(view.read(&[1, 1]), SampleValue::I32(5));
    }

    #[test]
    fn stride_count_must_match_rank() {
        let data = [0.0f32; 4];
        let shape = [2usize, 2];
        let strides = [2isize];
        let result = TensorView::new(Samples::F32(&data), &shape, &strides);
        assert_eq!(
            result.unwrap_err(),
            DecodeError::StrideCount {
                strides: 1,
                rank: 2
            }
        );
    }

    #[test]
    fn owned_tensor_rejects_mismatched_strides() {
        let result = TensorData::new(SampleData::F32(vec![0.0; 4]), vec![2, 2], vec![1]);
        assert_eq!(
            result.unwrap_err(),
            DecodeError::StrideCount {
                strides: 1,
                rank: 2
            }
        );
    }

    #[test]
    fn owned_tensor_carries_permuted_strides() {
        // Column-major 2x3: element (y, x) lives at x*2 + y.
        let tensor = TensorData::new(
            SampleData::I32(vec![0, 3, 1, 4, 2, 5]),
            vec![2, 3],
            vec![1, 2],
        )
        .unwrap();
        let view = tensor.view();
        assert_eq!(view.strides(), &[1, 2]);
        assert_eq!(view.read(&[0, 1]), SampleValue::I32(1));
        assert_eq!(view.read(&[1, 2]), SampleValue::I32(5));
    }

    #[test]
    fn contiguous_tensor_derives_row_major_strides() {
        let tensor = TensorData::contiguous(
            SampleData::F32(vec![0.0; 24]),
            vec![2, 3, 4],
        );
        let view = tensor.view();
        assert_eq!(view.strides(), &[12, 4, 1]);
        assert_eq!(view.shape(), &[2, 3, 4]);
        assert_eq!(view.kind(), SampleKind::F32);
    }

    #[test]
    fn byte_mapping_hits_both_endpoints() {
        assert_eq!(0.0f32.to_byte(0.0, 2.0), 0);
        assert_eq!(2.0f32.to_byte(0.0, 2.0), 255);
        assert_eq!(0.5f32.to_byte(0.0, 2.0), 64);
        assert_eq!(0i32.to_byte(0, 100), 0);
        assert_eq!(100i32.to_byte(0, 100), 255);
        assert_eq!((-1.0f64).to_byte(-1.0, 1.0), 0);
        assert_eq!(1.0f64.to_byte(-1.0, 1.0), 255);
    }

    #[test]
    fn byte_mapping_clamps_outliers() {
        assert_eq!((-3.0f32).to_byte(0.0, 1.0), 0);
        assert_eq!(7.5f32.to_byte(0.0, 1.0), 255);
        assert_eq!(1000i32.to_byte(0, 100), 255);
    }
}
