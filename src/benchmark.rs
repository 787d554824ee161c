use crate::errors::{HistogramError, Result};
use crate::histogram::{Histogram, HistogramEngine};
use crate::pixel_buffer::PixelBuffer;
use std::time::{Duration, Instant};

/// Default number of timed histogram computations.
pub const DEFAULT_ITERATIONS: usize = 40;

/// Timing of a single engine run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationTiming {
    /// 1-based iteration number.
    pub iteration: usize,
    pub elapsed: Duration,
}

/// Progress notification passed to the observer of [`BenchmarkHarness::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationEvent {
    Started { iteration: usize },
    Finished(IterationTiming),
}

/// Aggregate timings over all iterations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkReport {
    pub timings: Vec<Duration>,
    pub count: usize,
    pub total_time: Duration,
    pub average_time: Duration,
    pub min_time: Duration,
    pub max_time: Duration,
}

impl BenchmarkReport {
    /// Returns `None` when no timings were recorded.
    pub fn from_timings(timings: Vec<Duration>) -> Option<Self> {
        let min_time = *timings.iter().min()?;
        let max_time = *timings.iter().max()?;
        let total_time: Duration = timings.iter().sum();
        let average_time = mean_duration(total_time, timings.len());

        Some(Self {
            count: timings.len(),
            timings,
            total_time,
            average_time,
            min_time,
            max_time,
        })
    }

    /// Iterations per second based on the mean iteration time.
    pub fn throughput(&self) -> f64 {
        let avg = self.average_time.as_secs_f64();
        if avg == 0.0 {
            0.0
        } else {
            1.0 / avg
        }
    }
}

/// `total / count`, exact while the count fits in `u32`.
fn mean_duration(total: Duration, count: usize) -> Duration {
    match u32::try_from(count) {
        Ok(0) => Duration::ZERO,
        Ok(count) => total / count,
        Err(_) => Duration::from_secs_f64(total.as_secs_f64() / count as f64),
    }
}

/// Runs the engine a fixed number of times over one quantized buffer.
pub struct BenchmarkHarness<'a> {
    engine: &'a HistogramEngine,
    iterations: usize,
}

impl<'a> BenchmarkHarness<'a> {
    pub fn new(engine: &'a HistogramEngine, iterations: usize) -> Result<Self> {
        if iterations == 0 {
            return Err(HistogramError::InvalidIterations { iterations });
        }
        Ok(Self { engine, iterations })
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Times every iteration with a monotonic clock and reports progress to
    /// `observer`. The histogram holds the last iteration's result when this
    /// returns.
    pub fn run<F>(
        &self,
        buffer: &PixelBuffer,
        histogram: &mut Histogram,
        mut observer: F,
    ) -> Result<BenchmarkReport>
    where
        F: FnMut(IterationEvent),
    {
        let mut timings = Vec::with_capacity(self.iterations);

        for iteration in 1..=self.iterations {
            observer(IterationEvent::Started { iteration });

            let start = Instant::now();
            self.engine.compute(buffer, histogram)?;
            let elapsed = start.elapsed();

            tracing::debug!(iteration, elapsed_ms = elapsed.as_secs_f64() * 1000.0, "iteration");
            observer(IterationEvent::Finished(IterationTiming { iteration, elapsed }));
            timings.push(elapsed);
        }

        let report = BenchmarkReport::from_timings(timings)
            .ok_or(HistogramError::InvalidIterations { iterations: 0 })?;
        tracing::info!(
            iterations = report.count,
            total_s = report.total_time.as_secs_f64(),
            average_s = report.average_time.as_secs_f64(),
            "benchmark finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel_buffer::Pixel;
    use crate::worker_pool::build_pool;

    #[test]
    fn test_report_statistics() {
        let timings = vec![
            Duration::from_millis(10),
            Duration::from_millis(30),
            Duration::from_millis(20),
        ];
        let report = BenchmarkReport::from_timings(timings).unwrap();

        assert_eq!(report.count, 3);
        assert_eq!(report.total_time, Duration::from_millis(60));
        assert_eq!(report.average_time, Duration::from_millis(20));
        assert_eq!(report.min_time, Duration::from_millis(10));
        assert_eq!(report.max_time, Duration::from_millis(30));
        assert!((report.throughput() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_mean_duration() {
        assert_eq!(mean_duration(Duration::from_millis(60), 3), Duration::from_millis(20));
        assert_eq!(mean_duration(Duration::from_secs(5), 0), Duration::ZERO);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_mean_duration_count_above_u32() {
        let count = 1usize << 33;
        let total = Duration::from_secs(1 << 33);
        assert_eq!(mean_duration(total, count), Duration::from_secs(1));

        let count = u32::MAX as usize + 1;
        let total = Duration::from_secs(2 * count as u64);
        assert_eq!(mean_duration(total, count), Duration::from_secs(2));
    }

    #[test]
    fn test_empty_report() {
        assert!(BenchmarkReport::from_timings(Vec::new()).is_none());
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let engine = HistogramEngine::new(build_pool(1).unwrap(), 8).unwrap();
        let err = BenchmarkHarness::new(&engine, 0).err().unwrap();
        assert_eq!(err.error_code(), "INVALID_ITERATIONS");
    }

    #[test]
    fn test_runs_every_iteration() {
        let engine = HistogramEngine::new(build_pool(2).unwrap(), 8).unwrap();
        let harness = BenchmarkHarness::new(&engine, 5).unwrap();
        let buffer = PixelBuffer::filled(4, 4, Pixel::new(1, 2, 3)).unwrap();
        let mut hist = Histogram::new(8).unwrap();

        let mut started = Vec::new();
        let mut finished = Vec::new();
        let report = harness
            .run(&buffer, &mut hist, |event| match event {
                IterationEvent::Started { iteration } => started.push(iteration),
                IterationEvent::Finished(timing) => finished.push(timing.iteration),
            })
            .unwrap();

        assert_eq!(started, vec![1, 2, 3, 4, 5]);
        assert_eq!(finished, vec![1, 2, 3, 4, 5]);
        assert_eq!(report.count, 5);
        assert_eq!(report.timings.iter().sum::<Duration>(), report.total_time);
        assert_eq!(hist.get(crate::histogram::BinCoord::new(1, 2, 3)), Some(1.0));
    }

    #[test]
    fn test_engine_error_stops_run() {
        let engine = HistogramEngine::new(build_pool(1).unwrap(), 8).unwrap();
        let harness = BenchmarkHarness::new(&engine, 3).unwrap();
        let buffer = PixelBuffer::new(0, 0, Vec::new()).unwrap();
        let mut hist = Histogram::new(8).unwrap();

        let mut finished = 0;
        let err = harness
            .run(&buffer, &mut hist, |event| {
                if let IterationEvent::Finished(_) = event {
                    finished += 1;
                }
            })
            .unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_IMAGE");
        assert_eq!(finished, 0);
    }
}
