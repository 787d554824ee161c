//! Console output: timing lines and the sparse bin listing.

use crate::benchmark::{BenchmarkReport, IterationTiming};
use crate::histogram::Histogram;
use std::io::{self, Write};

pub fn write_thread_count<W: Write>(out: &mut W, threads: usize) -> io::Result<()> {
    writeln!(out, "Number of threads: {}", threads)
}

pub fn write_iteration_start<W: Write>(out: &mut W, iteration: usize) -> io::Result<()> {
    writeln!(out, "Starting iteration {}...", iteration)
}

pub fn write_iteration<W: Write>(out: &mut W, timing: &IterationTiming) -> io::Result<()> {
    writeln!(
        out,
        "Iteration {} took {:.8} seconds.",
        timing.iteration,
        timing.elapsed.as_secs_f64()
    )
}

pub fn write_summary<W: Write>(out: &mut W, report: &BenchmarkReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "Total time for {} iterations: {:.8} seconds.",
        report.count,
        report.total_time.as_secs_f64()
    )?;
    writeln!(
        out,
        "Average time per iteration: {:.8} seconds.",
        report.average_time.as_secs_f64()
    )
}

/// Every non-zero bin as `(r, g, b): value`, then a blank line.
pub fn write_histogram<W: Write>(out: &mut W, histogram: &Histogram) -> io::Result<()> {
    for (coord, value) in histogram.non_zero() {
        writeln!(out, "{}: {:.6}", coord, value)?;
    }
    writeln!(out)
}
