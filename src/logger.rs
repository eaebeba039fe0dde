use std::{env, str::FromStr, time::SystemTime};

use colored::{Color, Colorize};
use fern::colors::ColoredLevelConfig;
use log::LevelFilter;

const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Sets up the global logger. The level comes from `LOG_LEVEL` and defaults to `info`.
pub fn setup_logger() -> Result<(), fern::InitError> {
    let level = env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|value| LevelFilter::from_str(&value).ok())
        .unwrap_or(LevelFilter::Info);

    let colors = ColoredLevelConfig::new()
        .error(fern::colors::Color::Red)
        .warn(fern::colors::Color::Yellow)
        .info(fern::colors::Color::Green)
        .debug(fern::colors::Color::Blue);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339_seconds(SystemTime::now()),
                colors.color(record.level()),
                record.target().color(Color::BrightBlack),
                message
            ))
        })
        .level(level)
        // diesel's r2d2 pool and hyper are chatty at debug
        .level_for("hyper", LevelFilter::Info)
        .level_for("r2d2", LevelFilter::Warn)
        .chain(std::io::stdout())
        .apply()?;

    Ok(())
}
