use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::Path;
use std::str::FromStr;

/// Log target carrying one line per query and per bind outcome.
pub const METRICS_TARGET: &str = "moviereviews::metrics";

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;
const ROLL_WINDOW: u32 = 7;

/// Initializes logging from a log4rs YAML file.
///
/// # Errors
/// Returns an error if the file cannot be read or a logger is already set.
pub fn init_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    log4rs::init_file(path, log4rs::config::Deserializers::default())?;
    Ok(())
}

/// Initializes logging programmatically: stdout at `level`, plus rolling
/// `moviereviews.log` and `moviereviews_metrics.log` under `log_dir` when given.
/// Metrics lines go only to their own file when a directory is configured.
///
/// # Errors
/// Returns an error if the directory cannot be created, the level is unknown,
/// or a logger is already set.
pub fn init(level: &str, log_dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let level = LevelFilter::from_str(level).map_err(|_| format!("unknown log level '{level}'"))?;
    let console = ConsoleAppender::builder().encoder(Box::new(PatternEncoder::new(PATTERN))).build();
    let mut builder = Config::builder().appender(Appender::builder().build("stdout", Box::new(console)));
    let mut root = Root::builder().appender("stdout");

    if let Some(dir) = log_dir {
        std::fs::create_dir_all(dir)?;
        builder = builder
            .appender(Appender::builder().build("app", Box::new(rolling(dir, "moviereviews")?)))
            .appender(Appender::builder().build("metrics", Box::new(rolling(dir, "moviereviews_metrics")?)))
            .logger(Logger::builder().appender("metrics").additive(false).build(METRICS_TARGET, LevelFilter::Info));
        root = root.appender("app");
    }

    let config = builder.build(root.build(level))?;
    log4rs::init_config(config)?;
    Ok(())
}

fn rolling(dir: &Path, stem: &str) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", dir.join(format!("{stem}.{{}}.log")).display()), ROLL_WINDOW)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    let appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(dir.join(format!("{stem}.log")), Box::new(policy))?;
    Ok(appender)
}

/// Applies `config`: the YAML file when set, the programmatic setup otherwise.
///
/// # Errors
/// See [`init_file`] and [`init`].
pub fn init_from(config: &crate::config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    match &config.log_config {
        Some(path) => init_file(path),
        None => init(config.log_level(), config.log_dir.as_deref()),
    }
}
