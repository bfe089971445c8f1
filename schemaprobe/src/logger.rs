use clap::ValueEnum;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
/// Logging verbosity accepted on the command line.
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<&Level> for LevelFilter {
    fn from(l: &Level) -> Self {
        match l {
            Level::Error => LevelFilter::Error,
            Level::Warn => LevelFilter::Warn,
            Level::Info => LevelFilter::Info,
            Level::Debug => LevelFilter::Debug,
            Level::Trace => LevelFilter::Trace,
        }
    }
}

/// librdkafka is chatty at debug level, so it is capped at info.
fn rdkafka_level(level: &Level) -> LevelFilter {
    LevelFilter::from(level).min(LevelFilter::Info)
}

/// Installs the global logger.
///
/// Progress goes to stdout and warnings/errors to stderr, so a live stream
/// can be followed while failures stay separable.
pub fn init(level: &Level) {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    let result = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} {:<5} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(level.into())
        .level_for("rdkafka", rdkafka_level(level))
        .chain(
            fern::Dispatch::new()
                .filter(|m| m.level() > log::Level::Warn)
                .chain(std::io::stdout()),
        )
        .chain(
            fern::Dispatch::new()
                .level(LevelFilter::Warn)
                .chain(std::io::stderr()),
        )
        .apply();

    if let Err(e) = result {
        eprintln!("logger already initialized: {}", e);
    }
}
