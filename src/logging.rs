use tracing_subscriber::EnvFilter;

/// Filter used when neither `--verbose` nor `RUST_LOG` asks for more.
const DEFAULT_DIRECTIVES: &str = "warn";

/// `--verbose` turns on this crate's pool, quantize and per-scan events
/// without pulling in debug output from dependencies.
const VERBOSE_DIRECTIVES: &str = "warn,colorhist=debug";

/// Picks the filter directives. `--verbose` wins over `RUST_LOG`.
pub fn filter_directives(verbose: bool, from_env: Option<&str>) -> String {
    match (verbose, from_env) {
        (true, _) => VERBOSE_DIRECTIVES.to_string(),
        (false, Some(directives)) if !directives.trim().is_empty() => directives.to_string(),
        (false, _) => DEFAULT_DIRECTIVES.to_string(),
    }
}

/// Installs the global subscriber for the benchmark binary.
///
/// Events go to stderr so stdout holds only the timing lines and the
/// histogram listing. Thread names are kept so `histogram-worker-N` shows up
/// next to per-worker events. A second call leaves the first subscriber in
/// place.
pub fn init_tracing(verbose: bool) {
    let _ = tracing_log::LogTracer::init();

    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directives = filter_directives(verbose, from_env.as_deref());
    let env_filter = EnvFilter::try_new(&directives).unwrap_or_else(|err| {
        eprintln!("ignoring invalid log filter {directives:?}: {err}");
        EnvFilter::new(DEFAULT_DIRECTIVES)
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(true)
        .try_init()
        .ok();
}
