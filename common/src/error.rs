//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid rational: {0}")]
    InvalidRational(String),

    #[error("Invalid hemisphere reference: {0}")]
    InvalidHemisphere(String),

    #[error("Hemisphere mismatch: {0}")]
    HemisphereMismatch(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_rational() {
        let error = Error::InvalidRational("5/0".to_string());
        assert_eq!(format!("{}", error), "Invalid rational: 5/0");
    }

    #[test]
    fn test_error_display_hemisphere() {
        let error = Error::InvalidHemisphere("X".to_string());
        let display = format!("{}", error);
        assert!(display.contains("hemisphere"));
        assert!(display.contains('X'));
    }

    #[test]
    fn test_error_debug() {
        let error = Error::HemisphereMismatch("緯度にE".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("HemisphereMismatch"));
        assert!(debug.contains("緯度にE"));
    }
}
