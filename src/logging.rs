//! Logging setup: `log` facade with an `env_logger` backend writing to stderr,
//! so diagnostics never mix with reports printed on stdout.
//!
//! `RUST_LOG` takes precedence when set. Otherwise `--quiet` shows errors
//! only and each `-v` raises the level one step from the default (warn).

use env_logger::{Builder, Target};
use log::LevelFilter;

/// Map CLI verbosity flags to a level filter.
pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Initialize logging once at startup. Calling it again is a no-op.
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = if std::env::var_os("RUST_LOG").is_some() {
        Builder::from_default_env()
    } else {
        let mut b = Builder::new();
        b.filter_level(level_for(verbose, quiet));
        b
    };

    builder.target(Target::Stderr).format_timestamp(None);
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_flags() {
        assert_eq!(level_for(0, false), LevelFilter::Warn);
        assert_eq!(level_for(1, false), LevelFilter::Info);
        assert_eq!(level_for(2, false), LevelFilter::Debug);
        assert_eq!(level_for(5, false), LevelFilter::Trace);
        assert_eq!(level_for(3, true), LevelFilter::Error);
    }
}
