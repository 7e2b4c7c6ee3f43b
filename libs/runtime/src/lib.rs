pub mod config;
pub mod logging;
pub mod shutdown;

pub use config::{
    default_logging_config, AppConfig, CliArgs, LoggingConfig, RunMode, Section, ServerConfig,
};
pub use shutdown::wait_for_shutdown;
