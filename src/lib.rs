//! Parallel 3D color histogram engine for binary PPM images, with a
//! benchmark harness that times repeated histogram computations.

pub mod benchmark;
pub mod errors;
pub mod histogram;
pub mod image_loader;
pub mod logging;
pub mod pixel_buffer;
pub mod quantizer;
pub mod report;
pub mod settings;
pub mod worker_pool;


pub use benchmark::{BenchmarkHarness, BenchmarkReport, IterationEvent, IterationTiming};
pub use errors::{HistogramError, Result};
pub use histogram::{BinCoord, Histogram, HistogramEngine, Strategy};
pub use image_loader::load;
pub use pixel_buffer::{Pixel, PixelBuffer};
pub use quantizer::quantize;
pub use settings::{Settings, SettingsOverrides};
