//! Logging setup and colored output shared between quill crates.

use ansi_term::Colour;
use std::{env, io};
use tracing::{Level, Metadata};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::MakeWriter,
};

/// A compiler error, printed in red through the `error` level.
pub fn println_error(txt: &str) {
    tracing::error!("{}", Colour::Red.paint(format!("error: {txt}")));
}

const LOG_FILTER: &str = "RUST_LOG";

// ERROR and WARN go to stderr, everything else to stdout.
struct StdioTracingWriter {
    writer_mode: TracingWriterMode,
}

impl<'a> MakeWriter<'a> for StdioTracingWriter {
    type Writer = Box<dyn io::Write>;

    fn make_writer(&'a self) -> Self::Writer {
        if self.writer_mode == TracingWriterMode::Stderr {
            Box::new(io::stderr())
        } else {
            Box::new(io::stdout())
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        if self.writer_mode.is_stderr_for(meta.level()) {
            return Box::new(io::stderr());
        }
        Box::new(io::stdout())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingWriterMode {
    /// Write ERROR and WARN to stderr and everything else to stdout.
    Stdio,
    /// Write everything to stdout.
    Stdout,
    /// Write everything to stderr.
    Stderr,
}

impl TracingWriterMode {
    fn is_stderr_for(&self, level: &Level) -> bool {
        match self {
            TracingWriterMode::Stderr => true,
            TracingWriterMode::Stdio => level <= &Level::WARN,
            TracingWriterMode::Stdout => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct TracingSubscriberOptions {
    pub verbosity: Option<u8>,
    pub silent: Option<bool>,
    pub log_level: Option<LevelFilter>,
    pub writer_mode: Option<TracingWriterMode>,
}

impl TracingSubscriberOptions {
    /// The level that overrides `RUST_LOG`, if any: an explicit level, then `-v`/`-vv`,
    /// then silent mode.
    fn level_filter(&self) -> Option<LevelFilter> {
        self.log_level
            .or(match self.verbosity {
                Some(1) => Some(LevelFilter::DEBUG),
                Some(2) => Some(LevelFilter::TRACE),
                _ => None,
            })
            .or(match self.silent {
                Some(true) => Some(LevelFilter::OFF),
                _ => None,
            })
    }
}

/// Installs a `tracing_subscriber::fmt` subscriber whose output reads like plain
/// `println!`: no timestamps, levels or targets.
///
/// `RUST_LOG` sets the minimum level, `info` by default. An unparsable `RUST_LOG` is
/// ignored. Installing a second subscriber is a no-op.
pub fn init_tracing_subscriber(options: TracingSubscriberOptions) {
    let env_filter = match env::var_os(LOG_FILTER) {
        Some(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        None => EnvFilter::new("info"),
    };
    let level_filter = options.level_filter();

    let builder = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_ansi(true)
        .with_level(false)
        .with_file(false)
        .with_line_number(false)
        .without_time()
        .with_target(false)
        .with_writer(StdioTracingWriter {
            writer_mode: options.writer_mode.unwrap_or(TracingWriterMode::Stdio),
        });

    let installed = match level_filter {
        Some(level_filter) => builder.with_max_level(level_filter).try_init(),
        None => builder.try_init(),
    };
    if installed.is_err() {
        tracing::debug!("a tracing subscriber is already installed");
    }
}
