//! log4rs setup for query and developer logs.

use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

use crate::config::LoggingConfig;
use crate::errors::OdmError;
use crate::utils::devlog::DEV_TARGET;

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;

/// Initializes the logging system from `log4rs.yaml` in the working directory.
///
/// # Errors
/// See [`init_file`].
pub fn init() -> Result<(), OdmError> {
    init_file(Path::new("log4rs.yaml"))
}

/// Initializes the logging system from a log4rs YAML file.
///
/// # Errors
/// Returns `OdmError::Io` when the file cannot be read or parsed, or a logger is already installed.
pub fn init_file(path: &Path) -> Result<(), OdmError> {
    let config = log4rs::config::load_config_file(path, log4rs::config::Deserializers::default())
        .map_err(|e| OdmError::Io(format!("{}: {e}", path.display())))?;
    log4rs::init_config(config).map_err(|e| OdmError::Io(format!("logger already initialized: {e}")))?;
    Ok(())
}

fn rolling(base: &Path, stem: &str, keep: u32) -> Result<RollingFileAppender, OdmError> {
    let io = |e: &dyn std::fmt::Display| OdmError::Io(format!("{stem} log: {e}"));
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", base.join(format!("{stem}.{{}}.log")).display()), keep)
        .map_err(|e| io(&e))?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(base.join(format!("{stem}.log")), Box::new(policy))
        .map_err(|e| io(&e))
}

/// Builds the log4rs config: `query.log` for everything at the configured level, plus `dev.log`
/// for developer records when enabled.
///
/// # Errors
/// Returns `OdmError::Io` when the log directory or files cannot be created.
pub fn build_config(cfg: &LoggingConfig) -> Result<Config, OdmError> {
    let base = match &cfg.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    std::fs::create_dir_all(&base).map_err(|e| OdmError::Io(format!("{}: {e}", base.display())))?;
    let keep = cfg.retention.max(1);
    let mut builder =
        Config::builder().appender(Appender::builder().build("query", Box::new(rolling(&base, "query", keep)?)));
    builder = if cfg.dev_log {
        builder
            .appender(Appender::builder().build("dev", Box::new(rolling(&base, "dev", keep)?)))
            .logger(Logger::builder().appender("dev").additive(false).build(DEV_TARGET, log::LevelFilter::Trace))
    } else {
        builder.logger(Logger::builder().additive(false).build(DEV_TARGET, log::LevelFilter::Off))
    };
    builder
        .build(Root::builder().appender("query").build(cfg.level_filter()))
        .map_err(|e| OdmError::Io(format!("logging config: {e}")))
}

/// Configures logging globally for the process. Subsequent calls are ignored by log4rs once a
/// logger is installed; the files are still created.
///
/// # Errors
/// See [`build_config`].
pub fn configure_logging(cfg: &LoggingConfig) -> Result<(), OdmError> {
    let config = build_config(cfg)?;
    if let Err(e) = log4rs::init_config(config) {
        log::debug!("logger already initialized: {e}");
    }
    Ok(())
}

/// Configures logging from `ODM_QUERY_*` environment variables.
///
/// # Errors
/// See [`build_config`].
pub fn configure_from_env() -> Result<(), OdmError> {
    configure_logging(&LoggingConfig::from_env())
}
