use anyhow::Context;
use clap::Parser;
use colorhist::report;
use colorhist::worker_pool::build_pool;
use colorhist::{
    BenchmarkHarness, Histogram, HistogramEngine, HistogramError, IterationEvent, Settings,
    SettingsOverrides, Strategy,
};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "colorhist")]
#[command(version, about = "Parallel 3D color histogram benchmark for P6 images", long_about = None)]
struct Cli {
    /// Input image (binary PPM, 8-bit channels)
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Number of worker threads (default: hardware concurrency)
    #[arg(short = 'j', long, value_name = "N")]
    threads: Option<usize>,

    /// Bins per channel
    #[arg(short, long, value_name = "D")]
    divisions: Option<usize>,

    /// Number of timed histogram computations
    #[arg(short = 'n', long, value_name = "N")]
    iterations: Option<usize>,

    /// Work partitioning for the histogram pass
    #[arg(long, value_enum, value_name = "STRATEGY")]
    strategy: Option<Strategy>,

    /// Settings file to use instead of the user config
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Persist the effective settings to the user config
    #[arg(long)]
    save_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    colorhist::logging::init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        match e.downcast_ref::<HistogramError>() {
            Some(err) => {
                err.log();
                eprintln!("Error: {}", err.user_message());
            }
            None => {
                tracing::error!("{:#}", e);
                eprintln!("Error: {:#}", e);
            }
        }
        std::process::exit(1);
    }
}

fn resolve_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let loaded = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load(),
    };
    let settings = loaded.with_overrides(SettingsOverrides {
        threads: cli.threads,
        divisions: cli.divisions,
        iterations: cli.iterations,
        strategy: cli.strategy,
    });

    settings.validate()?;
    Ok(settings)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = resolve_settings(&cli)?;
    if cli.save_config {
        let path = settings.save()?;
        tracing::info!(path = %path.display(), "saved settings");
    }

    let mut buffer = colorhist::load(&cli.image)?;
    let threads = settings.effective_threads();
    let pool = build_pool(threads)?;
    tracing::info!(
        threads,
        divisions = settings.divisions,
        iterations = settings.iterations,
        strategy = %settings.strategy,
        "starting benchmark"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report::write_thread_count(&mut out, threads).context("writing to stdout")?;

    // Phase 1: quantize once; returns after every pixel is written.
    colorhist::quantize(&mut buffer, settings.divisions, &pool)?;

    // Phase 2: repeated histogram passes over the quantized buffer.
    let engine =
        HistogramEngine::new(pool, settings.divisions)?.with_strategy(settings.strategy);
    let harness = BenchmarkHarness::new(&engine, settings.iterations)?;
    let mut histogram = Histogram::new(settings.divisions)?;

    let mut io_result = Ok(());
    let bench = harness.run(&buffer, &mut histogram, |event| {
        if io_result.is_err() {
            return;
        }
        io_result = match event {
            IterationEvent::Started { iteration } => {
                report::write_iteration_start(&mut out, iteration)
            }
            IterationEvent::Finished(timing) => report::write_iteration(&mut out, &timing),
        };
    })?;
    io_result.context("writing to stdout")?;

    report::write_summary(&mut out, &bench).context("writing to stdout")?;
    report::write_histogram(&mut out, &histogram).context("writing to stdout")?;
    out.flush().context("writing to stdout")?;

    Ok(())
}
