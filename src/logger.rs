use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::Path;

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";

/// Initializes console logging to stderr at `level`.
///
/// JSON timing lines (`tourlite::bench`) stay off unless `level` is `Trace`.
/// A second initialization is a no-op.
///
/// # Errors
/// Returns an error if the configuration cannot be built.
pub fn init_console(level: LevelFilter) -> Result<(), Box<dyn std::error::Error>> {
    let stderr = ConsoleAppender::builder()
        .target(log4rs::append::console::Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build();
    let dev_level = if level == LevelFilter::Trace { LevelFilter::Trace } else { LevelFilter::Off };
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .logger(Logger::builder().build(crate::devlog::TARGET, dev_level))
        .build(Root::builder().appender("stderr").build(level))?;
    let _ = log4rs::init_config(config);
    Ok(())
}

/// Initializes the logging system from a log4rs YAML file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn init_path(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    log4rs::init_file(path, log4rs::config::Deserializers::default())?;
    Ok(())
}
