//! Minimal N-dimensional raster container.
//!
//! The measurement engine does not own a full image type; it consumes a small
//! dense container exposing exactly what the passes need: sizes, a
//! scalar/tensor flag, a per-dimension physical pixel size, and line-wise
//! traversal. Storage is dimension-0 fastest with tensor samples interleaved,
//! so a scanline along dimension 0 is always a contiguous slice.

use image::GrayImage;

use crate::error::{MeasureError, MeasureResult};

/// Dense N-dimensional raster with interleaved tensor samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
    sizes: Vec<usize>,
    pixel_size: Vec<f64>,
    tensor_len: usize,
    data: Vec<T>,
}

/// A labeled image: positive `u32` identifiers, zero background.
pub type LabelImage = Raster<u32>;

/// A real-valued intensity image.
pub type IntensityImage = Raster<f64>;

impl<T: Copy + Default> Raster<T> {
    /// Zero-initialized scalar raster.
    pub fn new(sizes: &[usize]) -> Self {
        Self::with_tensor(sizes, 1)
    }

    /// Zero-initialized raster with `tensor_len` samples per pixel.
    pub fn with_tensor(sizes: &[usize], tensor_len: usize) -> Self {
        assert!(!sizes.is_empty(), "raster needs at least one dimension");
        assert!(tensor_len > 0, "raster needs at least one tensor sample");
        let n: usize = sizes.iter().product();
        Self {
            sizes: sizes.to_vec(),
            pixel_size: vec![1.0; sizes.len()],
            tensor_len,
            data: vec![T::default(); n * tensor_len],
        }
    }

    /// Scalar raster over existing data in memory order (dimension 0 fastest).
    pub fn from_vec(sizes: &[usize], data: Vec<T>) -> MeasureResult<Self> {
        if sizes.is_empty() {
            return Err(MeasureError::invalid("raster needs at least one dimension"));
        }
        let n: usize = sizes.iter().product();
        if data.len() != n {
            return Err(MeasureError::invalid(format!(
                "data length {} does not match sizes {:?}",
                data.len(),
                sizes
            )));
        }
        Ok(Self {
            sizes: sizes.to_vec(),
            pixel_size: vec![1.0; sizes.len()],
            tensor_len: 1,
            data,
        })
    }
}

impl<T: Copy> Raster<T> {
    /// Number of dimensions.
    pub fn dimensionality(&self) -> usize {
        self.sizes.len()
    }

    /// Extent along each dimension.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Extent along one dimension.
    pub fn size(&self, dim: usize) -> usize {
        self.sizes[dim]
    }

    /// Number of pixels (tensor samples not counted).
    pub fn num_pixels(&self) -> usize {
        self.sizes.iter().product()
    }

    /// True if there is a single sample per pixel.
    pub fn is_scalar(&self) -> bool {
        self.tensor_len == 1
    }

    /// Samples per pixel.
    pub fn tensor_len(&self) -> usize {
        self.tensor_len
    }

    /// Physical size of one pixel along each dimension.
    pub fn pixel_size(&self) -> &[f64] {
        &self.pixel_size
    }

    /// Set the physical pixel size; one entry per dimension.
    pub fn set_pixel_size(&mut self, pixel_size: &[f64]) -> MeasureResult<()> {
        if pixel_size.len() != self.sizes.len() {
            return Err(MeasureError::invalid(format!(
                "pixel size has {} entries for a {}-dimensional raster",
                pixel_size.len(),
                self.sizes.len()
            )));
        }
        self.pixel_size = pixel_size.to_vec();
        Ok(())
    }

    /// Product of the per-dimension pixel sizes.
    pub fn pixel_volume(&self) -> f64 {
        self.pixel_size.iter().product()
    }

    /// True if all per-dimension pixel sizes are equal.
    pub fn is_isotropic(&self) -> bool {
        self.pixel_size
            .iter()
            .all(|&s| (s - self.pixel_size[0]).abs() < 1e-12)
    }

    /// Raw samples in memory order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable raw samples in memory order.
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Element offset of the pixel at `coords` (first tensor sample).
    fn pixel_offset(&self, coords: &[usize]) -> usize {
        debug_assert_eq!(coords.len(), self.sizes.len());
        let mut index = 0;
        let mut stride = 1;
        for (d, &c) in coords.iter().enumerate() {
            debug_assert!(c < self.sizes[d]);
            index += c * stride;
            stride *= self.sizes[d];
        }
        index * self.tensor_len
    }

    /// Sample at `coords` of a scalar raster.
    pub fn at(&self, coords: &[usize]) -> T {
        debug_assert!(self.is_scalar());
        self.data[self.pixel_offset(coords)]
    }

    /// All tensor samples of the pixel at `coords`.
    pub fn tensor_at(&self, coords: &[usize]) -> &[T] {
        let off = self.pixel_offset(coords);
        &self.data[off..off + self.tensor_len]
    }

    /// Iterate over all scanlines along dimension 0.
    ///
    /// Lines are produced in memory order: the remaining dimensions advance
    /// odometer-style, dimension 1 fastest. Each line is visited exactly once.
    pub fn lines(&self) -> ScanLines<'_, T> {
        ScanLines {
            raster: self,
            coords: Some(vec![0; self.sizes.len()]),
        }
    }

    /// Contiguous samples of one scanline (`len × tensor_len` entries).
    pub fn line(&self, line: &ScanLine) -> &[T] {
        &self.data[line.offset..line.offset + line.len * self.tensor_len]
    }

    /// Scanline starting at `coords`, addressed in this raster's own layout.
    ///
    /// Lets a co-registered image of different tensor length be walked in
    /// lockstep with another raster's [`ScanLine`]s.
    pub fn line_at(&self, coords: &[usize]) -> &[T] {
        let offset = self.pixel_offset(coords);
        &self.data[offset..offset + self.sizes[0] * self.tensor_len]
    }
}

/// One scanline along dimension 0.
#[derive(Debug, Clone)]
pub struct ScanLine {
    /// Coordinates of the first pixel on the line.
    pub coords: Vec<usize>,
    /// Number of pixels on the line.
    pub len: usize,
    offset: usize,
}

/// Iterator over all scanlines of a raster; see [`Raster::lines`].
pub struct ScanLines<'a, T> {
    raster: &'a Raster<T>,
    coords: Option<Vec<usize>>,
}

impl<T: Copy> Iterator for ScanLines<'_, T> {
    type Item = ScanLine;

    fn next(&mut self) -> Option<ScanLine> {
        let coords = self.coords.as_mut()?;
        let line = ScanLine {
            coords: coords.clone(),
            len: self.raster.sizes[0],
            offset: self.raster.pixel_offset(coords),
        };
        // Odometer step over dimensions 1..n.
        let mut done = true;
        for d in 1..coords.len() {
            coords[d] += 1;
            if coords[d] < self.raster.sizes[d] {
                done = false;
                break;
            }
            coords[d] = 0;
        }
        if done {
            self.coords = None;
        }
        Some(line)
    }
}

impl Raster<u32> {
    /// Interpret an 8-bit grayscale image as a labeled image.
    ///
    /// Pixel values become identifiers verbatim; zero stays background.
    pub fn from_gray(img: &GrayImage) -> Self {
        let (w, h) = img.dimensions();
        let mut out = Self::new(&[w as usize, h as usize]);
        for (i, p) in img.pixels().enumerate() {
            out.data[i] = u32::from(p[0]);
        }
        out
    }
}

impl Raster<f64> {
    /// Interpret an 8-bit grayscale image as an intensity image in `[0, 255]`.
    pub fn from_gray(img: &GrayImage) -> Self {
        let (w, h) = img.dimensions();
        let mut out = Self::new(&[w as usize, h as usize]);
        for (i, p) in img.pixels().enumerate() {
            out.data[i] = f64::from(p[0]);
        }
        out
    }
}
