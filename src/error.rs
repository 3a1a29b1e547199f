use crate::fix::FixError;
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Result alias for errors emitted by Java Clippy internals.
pub type ClippyResult<T> = Result<T, JavaClippyError>;

/// Structured error type for Java Clippy subsystems.
#[derive(Debug, Error)]
pub enum JavaClippyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse failure: {0}")]
    Parse(String),

    #[error(transparent)]
    Fix(#[from] FixError),

    /// A checker gave up on a node for an internal reason.
    #[error("checker {checker} failed: {message}")]
    Checker {
        checker: &'static str,
        message: String,
    },

    #[error("{0}")]
    Other(String),
}

impl JavaClippyError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn checker(checker: &'static str, msg: impl Into<String>) -> Self {
        Self::Checker {
            checker,
            message: msg.into(),
        }
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Convert to anyhow::Error for interop with anyhow-based code.
    pub fn into_anyhow(self) -> AnyhowError {
        AnyhowError::new(self)
    }
}

impl From<AnyhowError> for JavaClippyError {
    fn from(err: AnyhowError) -> Self {
        JavaClippyError::other(err.to_string())
    }
}

/// Convenience macro mirroring `anyhow::bail!` but returning JavaClippyError.
#[macro_export]
macro_rules! clippy_bail {
    ($($arg:tt)*) => {
        return Err($crate::error::JavaClippyError::other(format!($($arg)*)))
    };
}

/// Convenience macro mirroring `anyhow::ensure!`.
#[macro_export]
macro_rules! clippy_ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::clippy_bail!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guarded(x: i32) -> ClippyResult<i32> {
        clippy_ensure!(x >= 0, "negative input: {x}");
        Ok(x)
    }

    #[test]
    fn ensure_macro_returns_other() {
        assert_eq!(guarded(3).unwrap(), 3);
        let err = guarded(-1).unwrap_err();
        assert_eq!(err.to_string(), "negative input: -1");
    }

    #[test]
    fn fix_errors_are_transparent() {
        let err: JavaClippyError = FixError::Overlapping {
            first: 10..20,
            second: 15..25,
        }
        .into();
        assert!(err.to_string().contains("overlap"));
    }
}
