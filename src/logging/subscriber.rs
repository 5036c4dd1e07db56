//! Tracing subscriber setup: console formatter, log-file layer, and initialisation.
//!
//! Both outputs classify an event the same way (see [`EventKind`]); they
//! differ only in decoration. The console gets ANSI styling and honours the
//! verbose flag, the log file gets timestamps and always records `DEBUG`.
use std::fs;
use std::io::Write as _;
use std::sync::Mutex;

use tracing::Level;

use super::utils::{format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

/// Target used for stage headers.
pub(super) const STAGE_TARGET: &str = "jsobf::stage";
/// Target used for dry-run action lines.
pub(super) const DRY_RUN_TARGET: &str = "jsobf::dry_run";
/// Target used for per-file results.
pub(super) const FILE_TARGET: &str = "jsobf::file";

/// How an event is rendered, derived from its level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventKind {
    Stage,
    DryRun,
    File,
    Error,
    Warn,
    Info,
    Debug,
}

impl EventKind {
    fn of(metadata: &tracing::Metadata<'_>) -> Self {
        match (*metadata.level(), metadata.target()) {
            (_, FILE_TARGET) => Self::File,
            (Level::ERROR, _) => Self::Error,
            (Level::WARN, _) => Self::Warn,
            (Level::INFO, STAGE_TARGET) => Self::Stage,
            (Level::INFO, DRY_RUN_TARGET) => Self::DryRun,
            (Level::INFO, _) => Self::Info,
            _ => Self::Debug,
        }
    }

    /// Plain-text prefix for the log file.
    const fn file_prefix(self) -> &'static str {
        match self {
            Self::Stage => "==> ",
            Self::DryRun => "    [dry run] ",
            Self::File => "    [file] ",
            Self::Error => "    [error] ",
            Self::Warn => "    [warn] ",
            Self::Info => "    ",
            Self::Debug => "    [debug] ",
        }
    }

    /// ANSI-styled `(prefix, suffix)` for the console.
    const fn console_style(self) -> (&'static str, &'static str) {
        match self {
            Self::Stage => ("\x1b[1;34m==>\x1b[0m \x1b[1m", "\x1b[0m"),
            Self::DryRun => ("  \x1b[33m[DRY RUN]\x1b[0m ", ""),
            Self::File => ("  \x1b[36m•\x1b[0m \x1b[2m", "\x1b[0m"),
            Self::Error => ("\x1b[31mERROR\x1b[0m ", ""),
            Self::Warn => ("\x1b[33mWARN\x1b[0m  ", ""),
            Self::Info => ("  ", ""),
            Self::Debug => ("  \x1b[2m", "\x1b[0m"),
        }
    }
}

/// Pulls the formatted `message` field out of an event.
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl MessageExtractor {
    fn extract(event: &tracing::Event<'_>) -> String {
        let mut extractor = Self::default();
        event.record(&mut extractor);
        extractor.message
    }
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// Appends every event to `$XDG_CACHE_HOME/jsobf/<command>.log`.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate the log file for `command` and write the run header: tool
    /// version, command, start time and working directory.
    ///
    /// Returns `None` if the cache directory or the file is unavailable.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file_path(command)?;
        let version =
            option_env!("JSOBF_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let cwd = std::env::current_dir()
            .map_or_else(|_| "<unknown>".to_string(), |d| d.display().to_string());
        let header = format!(
            "# jsobf {version} {command} started {} UTC\n# cwd: {cwd}\n",
            format_utc_datetime(),
        );
        fs::write(&path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(&path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let kind = EventKind::of(event.metadata());
        let msg = strip_ansi(&MessageExtractor::extract(event));
        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "[{}] {}{msg}", format_utc_time(), kind.file_prefix()).ok();
        }
    }
}

/// Console [`FormatEvent`](tracing_subscriber::fmt::FormatEvent) for jsobf.
struct JsobfFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for JsobfFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let (prefix, suffix) = EventKind::of(event.metadata()).console_style();
        let msg = MessageExtractor::extract(event);
        writeln!(writer, "{prefix}{msg}{suffix}")
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Warnings and errors go to stderr, everything else to stdout. The console
/// shows `DEBUG` (including per-file lines) only when `verbose` is set; the
/// log file for `command` always does. Call once at startup.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    let console_layer = fmt::layer()
        .event_format(JsobfFormatter)
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
