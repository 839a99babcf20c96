//! Crate-level error types.

use std::fmt;

/// Errors produced by the skitter crate.
///
/// None of these are allowed to reach the frame loop: the [`Stage`] isolates
/// load and skeleton failures per creature and only logs them.
///
/// [`Stage`]: crate::scene::Stage
#[derive(Debug)]
pub enum SkitterError {
    /// Rejected construction parameters (path generation, gait tuning).
    InvalidConfiguration(String),
    /// A skeletal model could not be fetched or decoded.
    AssetLoad(String),
    /// The rig is missing its root bone or a required leg joint.
    SkeletonShape(String),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Generic I/O failure.
    Io(std::io::Error),
}

impl fmt::Display for SkitterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration(msg) => {
                write!(f, "invalid configuration: {msg}")
            }
            Self::AssetLoad(msg) => write!(f, "asset load error: {msg}"),
            Self::SkeletonShape(msg) => {
                write!(f, "unexpected skeleton shape: {msg}")
            }
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for SkitterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SkitterError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn display_includes_context() {
        let err = SkitterError::InvalidConfiguration(
            "need at least 4 control points, got 3".to_owned(),
        );
        assert_eq!(
            err.to_string(),
            "invalid configuration: need at least 4 control points, got 3"
        );
    }

    #[test]
    fn io_errors_expose_source() {
        let err: SkitterError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.source().is_some());
        assert!(SkitterError::AssetLoad("x".to_owned()).source().is_none());
    }
}
