use once_cell::sync::OnceCell;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::Rotation;
use tracing_log::LogTracer;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::registry::Registry;
use tracing_subscriber::{EnvFilter, util::SubscriberInitExt};

// Keeps the non-blocking file writer thread alive
static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Logger configuration structure
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use payload_offload::utils::logger::LoggerConfig;
///
/// let config = LoggerConfig::new()
///     .with_level("debug")
///     .with_file_path(PathBuf::from("./logs/offload"))
///     .with_console(true);
/// assert_eq!(config.level, "debug");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Log level filter (trace, debug, info, warn, error) or an `EnvFilter` directive
    pub level: String,
    /// Optional file prefix for daily-rolling log output
    pub file_path: Option<PathBuf>,
    /// Whether to enable console output
    pub enable_console: bool,
    /// Whether to use JSON format for logs
    pub json_format: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "error".to_string(),
            file_path: None,
            enable_console: true,
            json_format: false,
        }
    }
}

impl LoggerConfig {
    /// Initialize the logger with this configuration
    pub fn init(self) -> Result<(), Box<dyn std::error::Error>> {
        init_logger(self)
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: impl AsRef<str>) -> Self {
        self.level = level.as_ref().into();
        self
    }

    pub fn with_file_path(mut self, path: PathBuf) -> Self {
        self.file_path = Some(path);
        self
    }

    pub fn with_console(mut self, enable: bool) -> Self {
        self.enable_console = enable;
        self
    }

    pub fn with_json(mut self, enable: bool) -> Self {
        self.json_format = enable;
        self
    }
}

pub fn is_logging_disabled() -> bool {
    let value = env::var("DISABLE_LOGS")
        .or_else(|_| env::var("PAYLOAD_OFFLOAD_DISABLE_LOGS"))
        .unwrap_or_default();
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize and configure the tracing subscriber.
///
/// The first successful call installs the subscriber; later calls are no-ops.
/// A call that fails (e.g. the log directory cannot be created) leaves the
/// logger uninitialized so a corrected config can be retried.
pub fn init_logger(config: LoggerConfig) -> Result<(), Box<dyn std::error::Error>> {
    if is_logging_disabled() {
        LOGGER_INITIALIZED.store(true, Ordering::SeqCst);
        return Ok(());
    }
    if LOGGER_INITIALIZED.load(Ordering::SeqCst) {
        tracing::warn!("Logger already initialized, skipping re-initialization");
        return Ok(());
    }

    let default_level = config.level.to_lowercase();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let local_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(local_offset, Rfc3339);

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if config.enable_console {
        layers.push(console_layer(config.json_format, timer.clone()));
    }
    let mut file_guard = None;
    if let Some(file_path) = &config.file_path {
        let (layer, guard) = file_layer(file_path, config.json_format, timer)?;
        layers.push(layer);
        file_guard = Some(guard);
    }

    // lost a race with a concurrent init
    if LOGGER_INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    if let Some(guard) = file_guard {
        let _ = FILE_GUARD.set(guard);
    }

    // bridge log crate
    let _ = LogTracer::builder()
        .with_max_level(log::LevelFilter::Trace)
        .init();

    let _ = tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init();
    Ok(())
}

fn console_layer(json_format: bool, timer: OffsetTime<Rfc3339>) -> BoxedLayer {
    if json_format {
        fmt::layer().json().with_timer(timer).boxed()
    } else {
        fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(true)
            .with_timer(timer)
            .boxed()
    }
}

/// Daily-rolling file output named `<prefix>.<date>.log` next to `file_path`.
fn file_layer(
    file_path: &Path,
    json_format: bool,
    timer: OffsetTime<Rfc3339>,
) -> Result<(BoxedLayer, WorkerGuard), Box<dyn std::error::Error>> {
    let directory = file_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(directory)?;
    let file_path_prefix = file_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "app".to_string());
    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix(file_path_prefix)
        .filename_suffix("log")
        .build(directory)?;

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let layer = if json_format {
        fmt::layer()
            .json()
            .with_writer(file_writer)
            .with_timer(timer)
            .boxed()
    } else {
        fmt::layer()
            .with_ansi(false)
            .with_writer(file_writer)
            .with_timer(timer)
            .boxed()
    };
    Ok((layer, guard))
}
