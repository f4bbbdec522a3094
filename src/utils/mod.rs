//! Utilities module for logging and error handling

pub mod error;
pub mod logging;

// Re-export main types for convenience
pub use error::{FoodVisionError, Result};
pub use logging::{init_logging, LogConfig};

/// Round a value to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a duration in milliseconds for log lines
pub fn format_millis(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("{:.1} ms", seconds * 1000.0)
    } else {
        format!("{:.2} s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(87.654), 87.65);
        assert_eq!(round2(99.999), 100.0);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(0.0125), "12.5 ms");
        assert_eq!(format_millis(2.5), "2.50 s");
    }
}
