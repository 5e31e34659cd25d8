mod config_load;
mod logging;
mod redact;

pub const RUN_ID_ENV_VAR: &str = "COMPOSER_RUN_ID";

pub mod prelude {
    pub use super::RUN_ID_ENV_VAR;
    pub use super::config_load::{ConfigOptions, FoundConfig};
    pub use super::logging::{LoggingOpts, LoggingProgress, log_dir, progress_bar_without_pos};
    pub use super::redact::{REDACTED, Redactor};
}
