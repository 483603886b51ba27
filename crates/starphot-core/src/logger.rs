//! Stderr logger for command-line tools built on this crate.
//!
//! Verbosity is set with a directive string such as
//! `"warn,starphot_core::pipeline=debug"`: a bare level sets the default and
//! `target=level` pairs override it for a module path and everything below
//! it. [`init_from_env`] reads the directives from an environment variable;
//! with the `tracing` feature, [`init_tracing`] feeds the same variable to a
//! `tracing-subscriber` pipeline instead.

use std::io::Write;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable read by the command-line tools.
pub const LOG_ENV: &str = "STARPHOT_LOG";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LogFilterError {
    #[error("unknown log level `{0}`")]
    UnknownLevel(String),
    #[error("empty target in log directive `{0}`")]
    EmptyTarget(String),
}

/// Default level plus per-target overrides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogFilter {
    default: LevelFilter,
    targets: Vec<(String, LevelFilter)>,
}

impl Default for LogFilter {
    fn default() -> Self {
        Self::new(LevelFilter::Info)
    }
}

impl LogFilter {
    pub fn new(default: LevelFilter) -> Self {
        Self {
            default,
            targets: Vec::new(),
        }
    }

    /// Override the level for `target` and its submodules.
    pub fn with_target(mut self, target: impl Into<String>, level: LevelFilter) -> Self {
        let target = target.into();
        self.targets.retain(|(t, _)| *t != target);
        self.targets.push((target, level));
        // longest prefix first so the most specific directive wins
        self.targets.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        self
    }

    /// Level in effect for a record emitted under `target`.
    pub fn level_for(&self, target: &str) -> LevelFilter {
        self.targets
            .iter()
            .find(|(prefix, _)| is_module_prefix(prefix, target))
            .map_or(self.default, |&(_, level)| level)
    }

    /// Most verbose level any target can reach.
    pub fn max_level(&self) -> LevelFilter {
        self.targets
            .iter()
            .map(|&(_, level)| level)
            .fold(self.default, Ord::max)
    }
}

fn is_module_prefix(prefix: &str, target: &str) -> bool {
    match target.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with("::"),
        None => false,
    }
}

fn parse_level(name: &str) -> Result<LevelFilter, LogFilterError> {
    LevelFilter::from_str(name).map_err(|_| LogFilterError::UnknownLevel(name.to_string()))
}

impl FromStr for LogFilter {
    type Err = LogFilterError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut filter = LogFilter::default();
        for directive in spec.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            match directive.split_once('=') {
                Some((target, level)) => {
                    let target = target.trim();
                    if target.is_empty() {
                        return Err(LogFilterError::EmptyTarget(directive.to_string()));
                    }
                    filter = filter.with_target(target, parse_level(level.trim())?);
                }
                None => filter.default = parse_level(directive)?,
            }
        }
        Ok(filter)
    }
}

struct StderrLogger {
    filter: LogFilter,
    started: Instant,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.filter.level_for(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let millis = self.started.elapsed().as_millis();
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "{millis:>7}ms {:<5} {}: {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger. Later calls keep the first filter.
pub fn init(filter: LogFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let max = filter.max_level();
    let logger = LOGGER.get_or_init(|| StderrLogger {
        filter,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(max);
    Ok(())
}

/// Install the stderr logger with directives from the environment variable
/// `var`. An unset variable means `info`; a malformed one is reported after
/// falling back to `info`.
pub fn init_from_env(var: &str) -> Result<(), log::SetLoggerError> {
    let parsed = std::env::var(var).ok().map(|spec| spec.parse::<LogFilter>());
    match parsed {
        Some(Ok(filter)) => init(filter),
        Some(Err(err)) => {
            init(LogFilter::default())?;
            log::warn!("ignoring {var}: {err}");
            Ok(())
        }
        None => init(LogFilter::default()),
    }
}

/// Install a `tracing` subscriber filtered by the environment variable
/// `var`, in the same directive syntax.
#[cfg(feature = "tracing")]
pub fn init_tracing(var: &str, json: bool) {
    let filter = EnvFilter::try_from_env(var).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder.compact().finish().try_init()
    };
}
