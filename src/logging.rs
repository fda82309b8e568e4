//! Logger setup for the bramble CLI.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Initialize the logger with an elapsed-time prefix on stderr.
///
/// Verbose selects Info, otherwise Warn. Load and eviction events are
/// logged at Info, so `--verbose` shows residency churn as it happens.
pub fn init_logger(verbose: bool) {
    START_TIME.set(Instant::now()).ok();

    let level = if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format(|buf, record| {
            let elapsed = START_TIME
                .get()
                .map(|s| s.elapsed())
                .unwrap_or_default();
            writeln!(
                buf,
                "[{:>8.1}s] {:<5} {}",
                elapsed.as_secs_f64(),
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .init();
}
