//! Logging Module
//!
//! Structured logging setup using the `tracing` crate. The server and the
//! command-line tools all install their subscriber through [`init_logging`].

use std::io::IsTerminal;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Minimum level to display
    pub level: Level,
    /// Whether to include target (module path)
    pub include_target: bool,
    /// Whether to include thread IDs
    pub include_thread_ids: bool,
    /// Whether to use ANSI colors
    pub ansi_colors: bool,
}

impl LogConfig {
    /// Info level, compact lines
    pub fn standard() -> Self {
        Self {
            level: Level::INFO,
            include_target: false,
            include_thread_ids: false,
            ansi_colors: true,
        }
    }

    /// Debug level with module paths and thread ids, for `--debug`
    pub fn verbose() -> Self {
        Self {
            level: Level::DEBUG,
            include_target: true,
            include_thread_ids: true,
            ansi_colors: true,
        }
    }

    /// Pick the config for the debug flag. Colors are only used when
    /// stdout is a terminal, so redirected logs stay plain.
    pub fn for_debug(debug: bool) -> Self {
        let config = if debug { Self::verbose() } else { Self::standard() };
        config.with_ansi(std::io::stdout().is_terminal())
    }

    pub fn with_ansi(mut self, ansi_colors: bool) -> Self {
        self.ansi_colors = ansi_colors;
        self
    }
}

/// Install the global subscriber
///
/// # Returns
/// * `Result<(), String>` - Err if a global subscriber is already installed
pub fn init_logging(config: &LogConfig) -> Result<(), String> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level)
        .with_ansi(config.ansi_colors)
        .with_target(config.include_target)
        .with_thread_ids(config.include_thread_ids)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("Failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_debug() {
        let verbose = LogConfig::for_debug(true);
        assert_eq!(verbose.level, Level::DEBUG);
        assert!(verbose.include_target);
        assert!(verbose.include_thread_ids);

        let standard = LogConfig::for_debug(false);
        assert_eq!(standard.level, Level::INFO);
        assert!(!standard.include_target);
    }

    #[test]
    fn test_with_ansi() {
        assert!(!LogConfig::standard().with_ansi(false).ansi_colors);
        assert!(LogConfig::verbose().with_ansi(true).ansi_colors);
    }

    #[test]
    fn test_init_twice_fails() {
        let config = LogConfig::standard().with_ansi(false);
        let result = init_logging(&config).and_then(|_| init_logging(&config));
        assert!(result.is_err());
    }
}
