use log::LevelFilter;
use simplelog::{ConfigBuilder, SimpleLogger};

/// Console logger for runs without a Logfire token. Only records from this
/// crate pass the filter.
pub fn setup_simple_logger(level: LevelFilter) -> anyhow::Result<()> {
    let logger_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("wacloud")
        .build();

    Ok(SimpleLogger::init(level, logger_config)?)
}
