// Copyright (c) 2026 rezky_nightky

use std::path::{Path, PathBuf};

use color_eyre::eyre::{ContextCompat as _, WrapErr as _};
use color_eyre::Result;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::Layer as _;

/// Env var holding `EnvFilter` directives. Setting it turns file logging on even
/// when `--log-level` is `off`.
pub const LOG_ENV_VAR: &str = "LLUVIA_LOG";

const LOG_FILE_NAME: &str = "lluvia.log";

/// The valid log levels, as `tracing` understands them.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    /// No logging
    #[default]
    Off,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
            LogLevel::Off => "off",
        }
    }
}

/// Where the log file goes when `--log-path` isn't given.
pub fn default_log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("lluvia")
        .join(LOG_FILE_NAME)
}

fn build_filter(level: LogLevel, from_env: bool) -> Result<tracing_subscriber::EnvFilter> {
    let builder = tracing_subscriber::EnvFilter::builder().with_env_var(LOG_ENV_VAR);
    let filter = if from_env {
        builder
            .with_default_directive("error".parse()?)
            .from_env_lossy()
    } else {
        builder
            .with_default_directive("off".parse()?)
            .from_env_lossy()
            .add_directive(format!("lluvia={}", level.as_str()).parse()?)
    };
    Ok(filter)
}

/// Installs the global subscriber. The terminal is the display, so logs only
/// ever go to a file, and only when asked for. Returns whether logging is on.
pub fn setup_logging(level: LogLevel, path: Option<&Path>) -> Result<bool> {
    let from_env = std::env::var_os(LOG_ENV_VAR).is_some();
    if level == LogLevel::Off && !from_env {
        return Ok(false);
    }

    let path = path.map_or_else(default_log_path, Path::to_path_buf);
    let directory = path.parent().context("Couldn't get log path's parent")?;
    std::fs::create_dir_all(directory)
        .wrap_err_with(|| format!("creating log directory {}", directory.display()))?;
    let file = std::fs::File::create(&path)
        .wrap_err_with(|| format!("creating log file {}", path.display()))?;

    let logfile_layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_filter(build_filter(level, from_env)?);

    tracing_subscriber::registry()
        .with(logfile_layer)
        .try_init()
        .wrap_err("installing tracing subscriber")?;

    Ok(true)
}
