//! Utilities: logging setup (stderr only, `RUST_LOG` aware).

/// Logging helpers.
pub mod logging {
    use log::LevelFilter;

    /// Map `-v`/`-q` flags to a default level.
    pub fn derive_level(verbose: u8, quiet: bool) -> LevelFilter {
        if quiet {
            return LevelFilter::Error;
        }
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Install the global logger. Output goes to stderr because stdout
    /// carries the stdio protocol; `RUST_LOG` overrides `level`.
    pub fn init_logging(level: LevelFilter) {
        let default = level.to_string().to_lowercase();
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
            .target(env_logger::Target::Stderr)
            .filter_module("hyper", LevelFilter::Warn)
            .filter_module("reqwest", LevelFilter::Warn)
            .try_init();
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn level_from_flags() {
            assert_eq!(derive_level(0, false), LevelFilter::Info);
            assert_eq!(derive_level(1, false), LevelFilter::Debug);
            assert_eq!(derive_level(3, false), LevelFilter::Trace);
            assert_eq!(derive_level(2, true), LevelFilter::Error);
        }
    }
}

pub use logging::{derive_level, init_logging};
