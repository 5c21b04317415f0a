// jsonscrub/src/logger.rs
//! Logger setup for the `jsonscrub` binary.
//!
//! `RUST_LOG` is honoured unless an explicit level is passed in, which is how
//! `--quiet` and `--debug` take precedence over the environment.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes `env_logger`. Calling it more than once is harmless.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.format_timestamp(None).format_target(false);
    let _ = builder.try_init();
}
