//! Structured logging facade.
//!
//! Every core component logs through a [`slog::Logger`] rather than
//! `println!`, mirroring the teacher's `SimpleLogger`/`Logger` bridge —
//! except here the runtime itself is the single writer (there is no
//! actor-per-log-sink indirection to build, since the scheduler already
//! owns the one logical thread of execution).

use slog::{o, Drain};

/// Builds the default terminal drain used when a caller doesn't supply
/// their own [`slog::Logger`] to [`crate::runtime::Runtime::builder`].
///
/// `module_filter` mirrors `log.module_filter` in [`crate::config::Config`]:
/// empty means log everything, otherwise only records whose module path
/// starts with one of the given prefixes pass the drain.
pub fn default_logger(level: &str, module_filter: &[String]) -> slog::Logger {
    let level = parse_level(level);
    let module_filter = module_filter.to_vec();

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog::LevelFilter::new(drain, level).fuse();
    let drain = slog::Filter::new(drain, move |record: &slog::Record| {
        module_filter.is_empty() || module_filter.iter().any(|prefix| record.module().starts_with(prefix.as_str()))
    })
    .fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    slog::Logger::root(drain, o!("component" => "actorcheck"))
}

fn parse_level(level: &str) -> slog::Level {
    match level.to_ascii_lowercase().as_str() {
        "critical" => slog::Level::Critical,
        "error" => slog::Level::Error,
        "warning" | "warn" => slog::Level::Warning,
        "info" => slog::Level::Info,
        "debug" => slog::Level::Debug,
        "trace" => slog::Level::Trace,
        _ => slog::Level::Info,
    }
}
