use std::str::FromStr;

use log::LevelFilter;

use crate::config::LoggingConfig;

/// Installs the global logger: everything at or above the configured level goes to stdout, and to the
/// configured log file if there is one. Can only be called once per process
pub fn init_logging(config: &LoggingConfig) -> Result<(), fern::InitError> {
    let level = LevelFilter::from_str(&config.level).unwrap_or_else(|_| {
        eprintln!("Unknown log level {}, using info", config.level);
        LevelFilter::Info
    });
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout());
    if let Some(file) = &config.file {
        dispatch = dispatch.chain(fern::log_file(file)?);
    }
    dispatch.apply()?;
    Ok(())
}
