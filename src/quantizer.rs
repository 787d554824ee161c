use crate::errors::{HistogramError, Result};
use crate::pixel_buffer::PixelBuffer;
use rayon::prelude::*;
use rayon::ThreadPool;

/// Default bins per channel (8 gives 512 bins).
pub const DEFAULT_DIVISIONS: usize = 8;

/// Largest supported bins per channel. Every worker holds a `D^3` counter
/// array, so this keeps one accumulator at 2 MiB.
pub const MAX_DIVISIONS: usize = 64;

pub fn validate_divisions(divisions: usize) -> Result<()> {
    if divisions == 0 || divisions > MAX_DIVISIONS {
        return Err(HistogramError::InvalidDivisions {
            divisions,
            max: MAX_DIVISIONS,
        });
    }
    Ok(())
}

/// Maps an 8-bit channel value to its bin: `floor(value * divisions / 256)`.
#[inline]
pub fn quantize_channel(value: u8, divisions: usize) -> u8 {
    // divisions <= MAX_DIVISIONS, so the result is below 256
    ((value as usize * divisions) >> 8) as u8
}

/// Overwrites every channel of every pixel with its bin index.
///
/// Runs as a parallel-for over pixels on `pool`. The call returns only after
/// all pixels are written, so a histogram pass started afterwards sees the
/// fully quantized buffer.
pub fn quantize(buffer: &mut PixelBuffer, divisions: usize, pool: &ThreadPool) -> Result<()> {
    validate_divisions(divisions)?;

    let table: [u8; 256] = std::array::from_fn(|v| quantize_channel(v as u8, divisions));

    let start = std::time::Instant::now();
    pool.install(|| {
        buffer.pixels_mut().par_iter_mut().for_each(|pixel| {
            pixel.red = table[pixel.red as usize];
            pixel.green = table[pixel.green as usize];
            pixel.blue = table[pixel.blue as usize];
        });
    });
    tracing::debug!(
        divisions,
        pixels = buffer.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "quantized image"
    );

    Ok(())
}

/// Number of pixels whose three channels all hold a bin index below `divisions`.
pub fn count_quantized(buffer: &PixelBuffer, divisions: usize) -> usize {
    let limit = divisions.min(256);
    buffer
        .pixels()
        .par_iter()
        .filter(|p| {
            (p.red as usize) < limit && (p.green as usize) < limit && (p.blue as usize) < limit
        })
        .count()
}

/// True when every channel already holds a bin index below `divisions`.
pub fn is_quantized(buffer: &PixelBuffer, divisions: usize) -> bool {
    count_quantized(buffer, divisions) == buffer.len()
}
