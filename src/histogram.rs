//! Normalized 3D color histogram over a quantized [`PixelBuffer`].
//!
//! The default [`Strategy::BinParallel`] splits the `D^3` bin space across the
//! worker pool. Every worker rescans the whole image once per bin it owns and
//! keeps its counts in an accumulator nobody else touches. Accumulators are
//! folded into one shared count vector under a single mutex, then the counts
//! are divided by the pixel count. This costs `O(D^3 * N)` and is the
//! workload the benchmark measures.
//!
//! [`Strategy::SinglePass`] splits the pixels instead and increments one bin
//! per pixel, for `O(N)` total work. It produces identical output and is only
//! used when selected explicitly.

use crate::errors::{HistogramError, Result};
use crate::pixel_buffer::{Pixel, PixelBuffer};
use crate::quantizer::{count_quantized, validate_divisions};
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Work partitioning used by [`HistogramEngine`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Bins are partitioned across workers; each bin rescans every pixel.
    #[default]
    BinParallel,
    /// Pixels are partitioned across workers; one pass over the image.
    SinglePass,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::BinParallel => write!(f, "bin-parallel"),
            Strategy::SinglePass => write!(f, "single-pass"),
        }
    }
}

/// 3D coordinates of a bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BinCoord {
    pub red: usize,
    pub green: usize,
    pub blue: usize,
}

impl BinCoord {
    pub const fn new(red: usize, green: usize, blue: usize) -> Self {
        Self { red, green, blue }
    }
}

impl fmt::Display for BinCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.red, self.green, self.blue)
    }
}

/// Flattened `D x D x D` histogram, indexed `r * D * D + g * D + b`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    divisions: usize,
    bins: Vec<f32>,
}

impl Histogram {
    pub fn new(divisions: usize) -> Result<Self> {
        validate_divisions(divisions)?;
        Ok(Self {
            divisions,
            bins: vec![0.0; divisions * divisions * divisions],
        })
    }

    pub fn divisions(&self) -> usize {
        self.divisions
    }

    pub fn bins(&self) -> &[f32] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn flat_index(&self, coord: BinCoord) -> usize {
        flat_index(self.divisions, coord)
    }

    pub fn coord(&self, index: usize) -> BinCoord {
        let d = self.divisions;
        BinCoord::new(index / (d * d), (index / d) % d, index % d)
    }

    pub fn get(&self, coord: BinCoord) -> Option<f32> {
        if coord.red >= self.divisions
            || coord.green >= self.divisions
            || coord.blue >= self.divisions
        {
            return None;
        }
        self.bins.get(self.flat_index(coord)).copied()
    }

    pub fn sum(&self) -> f64 {
        self.bins.iter().map(|&v| v as f64).sum()
    }

    /// Non-zero bins in flat index order.
    pub fn non_zero(&self) -> impl Iterator<Item = (BinCoord, f32)> + '_ {
        self.bins
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v != 0.0)
            .map(|(i, &v)| (self.coord(i), v))
    }
}

#[inline]
fn flat_index(divisions: usize, coord: BinCoord) -> usize {
    (coord.red * divisions + coord.green) * divisions + coord.blue
}

/// Computes histograms of quantized buffers on a shared worker pool.
pub struct HistogramEngine {
    pool: Arc<ThreadPool>,
    divisions: usize,
    strategy: Strategy,
}

impl HistogramEngine {
    pub fn new(pool: Arc<ThreadPool>, divisions: usize) -> Result<Self> {
        validate_divisions(divisions)?;
        Ok(Self {
            pool,
            divisions,
            strategy: Strategy::default(),
        })
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn divisions(&self) -> usize {
        self.divisions
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Overwrites `histogram` with the normalized histogram of `buffer`.
    ///
    /// `buffer` must already be quantized with this engine's divisions.
    pub fn compute(&self, buffer: &PixelBuffer, histogram: &mut Histogram) -> Result<()> {
        let expected = self.bin_count();
        if histogram.divisions != self.divisions || histogram.bins.len() != expected {
            return Err(HistogramError::HistogramSizeMismatch {
                divisions: self.divisions,
                expected,
                actual: histogram.bins.len(),
            });
        }

        let counts = self.count_bins(buffer)?;
        let total = buffer.len() as f64;

        self.pool.install(|| {
            histogram
                .bins
                .par_iter_mut()
                .zip(counts.par_iter())
                .for_each(|(bin, &count)| *bin = (count as f64 / total) as f32);
        });

        Ok(())
    }

    /// Raw per-bin pixel counts. Their sum is always the pixel count.
    ///
    /// The buffer must already be quantized to this engine's divisions;
    /// otherwise nothing is scanned and `UnquantizedPixels` is returned.
    pub fn count_bins(&self, buffer: &PixelBuffer) -> Result<Vec<u64>> {
        if buffer.is_empty() {
            return Err(HistogramError::EmptyImage {
                width: buffer.width(),
                height: buffer.height(),
            });
        }

        let in_range = self
            .pool
            .install(|| count_quantized(buffer, self.divisions));
        if in_range != buffer.len() {
            return Err(HistogramError::UnquantizedPixels {
                counted: in_range as u64,
                total: buffer.len(),
            });
        }

        let bins = self.bin_count();
        let shared = Mutex::new(vec![0u64; bins]);

        let start = std::time::Instant::now();
        self.pool.install(|| match self.strategy {
            Strategy::BinParallel => self.scan_per_bin(buffer.pixels(), &shared),
            Strategy::SinglePass => self.scan_per_pixel(buffer.pixels(), &shared),
        });
        let counts = shared.into_inner().unwrap_or_else(PoisonError::into_inner);
        tracing::trace!(
            strategy = %self.strategy,
            elapsed_us = start.elapsed().as_micros() as u64,
            "counted bins"
        );

        debug_assert_eq!(counts.iter().sum::<u64>(), buffer.len() as u64);

        Ok(counts)
    }

    fn bin_count(&self) -> usize {
        self.divisions * self.divisions * self.divisions
    }

    /// One task per worker. Worker `w` owns every `(r, g)` column with
    /// `(r * D + g) % workers == w`, including all `D` blue bins under it.
    fn scan_per_bin(&self, pixels: &[Pixel], shared: &Mutex<Vec<u64>>) {
        let d = self.divisions;
        let bins = self.bin_count();
        let workers = self.pool.current_num_threads().clamp(1, d * d);

        (0..workers).into_par_iter().for_each(|worker| {
            let mut local = vec![0u64; bins];

            for column in (worker..d * d).step_by(workers) {
                let (red, green) = ((column / d) as u8, (column % d) as u8);
                for blue in 0..d {
                    let count = pixels
                        .iter()
                        .filter(|p| p.red == red && p.green == green && p.blue == blue as u8)
                        .count();
                    local[column * d + blue] = count as u64;
                }
            }

            tracing::trace!(worker, "bin scan finished");
            merge(shared, &local);
        });
    }

    /// One task per contiguous block of pixels.
    fn scan_per_pixel(&self, pixels: &[Pixel], shared: &Mutex<Vec<u64>>) {
        let d = self.divisions;
        let bins = self.bin_count();
        let workers = self.pool.current_num_threads().max(1);
        let block = pixels.len().div_ceil(workers).max(1);

        pixels.par_chunks(block).for_each(|chunk| {
            let mut local = vec![0u64; bins];
            for p in chunk {
                let (r, g, b) = (p.red as usize, p.green as usize, p.blue as usize);
                // Out-of-range pixels are skipped so both strategies agree on
                // what an unquantized buffer counts.
                if r < d && g < d && b < d {
                    local[flat_index(d, BinCoord::new(r, g, b))] += 1;
                }
            }
            merge(shared, &local);
        });
    }
}

/// Adds a worker's accumulator into the shared counts. The lock is held for
/// the whole addition and nowhere else.
fn merge(shared: &Mutex<Vec<u64>>, local: &[u64]) {
    let mut global = shared.lock().unwrap_or_else(PoisonError::into_inner);
    for (total, &count) in global.iter_mut().zip(local) {
        *total += count;
    }
}
