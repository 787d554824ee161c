use crate::errors::{HistogramError, Result};
use image::RgbImage;

/// One RGB triple. Before quantization each channel is in `0..=255`,
/// afterwards it holds a bin index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pixel {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Pixel {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

/// Row-major RGB raster. The pixel count always equals `width * height`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<Pixel>,
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize, data: Vec<Pixel>) -> Result<Self> {
        if width.checked_mul(height) != Some(data.len()) {
            return Err(HistogramError::DimensionMismatch {
                width,
                height,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    pub fn filled(width: usize, height: usize, pixel: Pixel) -> Result<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(HistogramError::DimensionMismatch {
                width,
                height,
                actual: 0,
            })?;
        Ok(Self {
            width,
            height,
            data: vec![pixel; len],
        })
    }

    /// Builds a buffer from interleaved `r, g, b` bytes.
    pub fn from_rgb_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        if width.checked_mul(height).and_then(|n| n.checked_mul(3)) != Some(bytes.len()) {
            return Err(HistogramError::DimensionMismatch {
                width,
                height,
                actual: bytes.len() / 3,
            });
        }
        let data = bytes
            .chunks_exact(3)
            .map(|c| Pixel::new(c[0], c[1], c[2]))
            .collect();
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total pixel count `N`.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.data
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.data
            .iter()
            .flat_map(|p| [p.red, p.green, p.blue])
            .collect()
    }

    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        RgbImage::from_raw(
            u32::try_from(self.width).ok()?,
            u32::try_from(self.height).ok()?,
            self.to_rgb_bytes(),
        )
    }
}

impl From<&RgbImage> for PixelBuffer {
    fn from(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let data = image
            .pixels()
            .map(|p| Pixel::new(p[0], p[1], p[2]))
            .collect();
        Self {
            width: width as usize,
            height: height as usize,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_length_mismatch() {
        let err = PixelBuffer::new(2, 2, vec![Pixel::default(); 3]).unwrap_err();
        assert_eq!(err.error_code(), "DIMENSION_MISMATCH");
    }

    #[test]
    fn test_filled_rejects_overflowing_size() {
        let err = PixelBuffer::filled(usize::MAX, 2, Pixel::default()).unwrap_err();
        assert_eq!(err.error_code(), "DIMENSION_MISMATCH");

        let buffer = PixelBuffer::filled(3, 2, Pixel::new(1, 1, 1)).unwrap();
        assert_eq!(buffer.len(), 6);
    }

    #[test]
    fn test_row_major_access() {
        let bytes = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
        let buffer = PixelBuffer::from_rgb_bytes(2, 2, &bytes).unwrap();
        assert_eq!(buffer.get(1, 0), Some(Pixel::new(4, 5, 6)));
        assert_eq!(buffer.get(0, 1), Some(Pixel::new(7, 8, 9)));
        assert_eq!(buffer.get(2, 0), None);
        assert_eq!(buffer.to_rgb_bytes(), bytes.to_vec());
    }

    #[test]
    fn test_rgb_image_conversion() {
        let image = RgbImage::from_pixel(3, 2, image::Rgb([10, 20, 30]));
        let buffer = PixelBuffer::from(&image);
        assert_eq!(buffer.len(), 6);
        assert!(buffer.pixels().iter().all(|p| *p == Pixel::new(10, 20, 30)));
        assert_eq!(buffer.to_rgb_image(), Some(image));
    }
}
