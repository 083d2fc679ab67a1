//! Error handling for llama-rng.
//!
//! Every failure is classified into one of a handful of categories so that
//! the caller driving the sampler can decide whether to abort, switch
//! providers, or end the session. Nothing in this crate retries on its own.
//!
//! # Error Categories
//!
//! * Configuration: a required parameter is missing or invalid
//! * Connectivity: the device or endpoint cannot be reached
//! * Protocol: the source answered with something malformed
//! * Timeout: no answer within the bounded wait
//! * Io: the value log could not be written
//!
//! # Example
//!
//! ```rust
//! use llama_rng::error::{Error, ErrorKind, Result};
//!
//! fn check(url: Option<&str>) -> Result<&str> {
//!     url.ok_or_else(|| Error::configuration("no endpoint configured"))
//! }
//!
//! assert_eq!(check(None).unwrap_err().kind, ErrorKind::Configuration);
//! ```

use std::fmt;
use thiserror::Error;

/// Main error type combining error kind and details.
#[derive(Debug)]
pub struct Error {
    /// Classification of the error
    pub kind: ErrorKind,

    /// Details of the underlying error
    pub error: Box<dyn std::error::Error + Send + Sync>,
}

impl Error {
    /// Attempts to downcast the underlying error to a concrete type.
    ///
    /// # Returns
    /// * `Some(&E)` - If the underlying error is of type `E`
    /// * `None` - If the underlying error is not of type `E`
    #[must_use]
    pub fn downcast<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        self.error.downcast_ref::<E>()
    }
}

/// Standard result type for llama-rng operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories shared by all providers.
#[expect(clippy::module_name_repetitions)]
#[derive(Clone, Copy, Debug, Eq, Error, Hash, Ord, PartialEq, PartialOrd)]
pub enum ErrorKind {
    /// A required parameter is missing or invalid for the selected backend.
    #[error("configuration error")]
    Configuration,

    /// The serial device cannot be opened or the endpoint cannot be reached.
    #[error("connectivity error")]
    Connectivity,

    /// The entropy source answered with an unexpected shape.
    #[error("protocol error")]
    Protocol,

    /// No response or bytes within the backend's bounded wait.
    #[error("operation timed out")]
    Timeout,

    /// Reading or writing the value log failed.
    #[error("i/o error")]
    Io,

    /// The backend does not support the requested operation.
    #[error("not implemented")]
    Unimplemented,

    /// Invariant violation inside this crate.
    #[error("internal error")]
    Internal,
}

impl Error {
    /// Creates a new error with specified kind and details.
    pub fn new<E>(kind: ErrorKind, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self {
            kind,
            error: error.into(),
        }
    }

    /// Creates an error for missing or invalid configuration.
    ///
    /// # Examples
    ///
    /// ```rust
    /// let err = Error::configuration("remote-http requires an endpoint URL");
    /// assert_eq!(err.kind, ErrorKind::Configuration);
    /// ```
    pub fn configuration<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Configuration, error)
    }

    /// Creates an error for unreachable devices or endpoints.
    ///
    /// Use when:
    /// * The serial device cannot be opened
    /// * The HTTP endpoint refuses the connection
    /// * Name resolution fails
    pub fn connectivity<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Connectivity, error)
    }

    /// Creates an error for malformed responses.
    ///
    /// # Examples
    ///
    /// ```rust
    /// let err = Error::protocol("response has no `random` field");
    /// assert_eq!(err.kind, ErrorKind::Protocol);
    /// ```
    pub fn protocol<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Protocol, error)
    }

    /// Creates an error for operations that exceeded their bounded wait.
    pub fn timeout<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Timeout, error)
    }

    /// Creates an error for value log failures.
    pub fn io<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Io, error)
    }

    /// Creates an error for operations a backend does not support.
    pub fn unimplemented<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Unimplemented, error)
    }

    /// Creates an error for internal errors.
    ///
    /// Use for unexpected internal errors that shouldn't occur during
    /// normal operation.
    pub fn internal<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Internal, error)
    }
}

/// Returns the underlying error source.
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.error.source()
    }
}

/// Formats the error for display, showing both kind and details.
///
/// Format: "{kind}: {details}"
impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}: ", self.kind)?;
        self.error.fmt(fmt)
    }
}

/// Converts IO errors into appropriate error kinds.
///
/// Maps standard IO errors to their logical equivalents:
/// * `TimedOut`, `WouldBlock` -> `Timeout`
/// * `NotFound`, `PermissionDenied`, `ConnectionRefused` -> `Connectivity`
/// * `InvalidInput` -> `Configuration`
/// * everything else -> `Io`
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind::*;
        match err.kind() {
            TimedOut | WouldBlock => Self::timeout(err),
            NotFound | PermissionDenied | ConnectionRefused | ConnectionReset
            | ConnectionAborted | NotConnected | AddrNotAvailable | BrokenPipe => {
                Self::connectivity(err)
            }
            InvalidInput => Self::configuration(err),
            _ => Self::io(err),
        }
    }
}

/// Converts HTTP client errors into appropriate error kinds.
///
/// Maps HTTP errors based on their nature:
/// * Timeout errors -> `Timeout`
/// * Builder errors -> `Configuration`
/// * Connect and request errors -> `Connectivity`
/// * Body, decode and status errors -> `Protocol`
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Check timeouts first: a timed out connect is also a connect error.
        if err.is_timeout() {
            return Self::timeout(err);
        }

        if err.is_builder() {
            return Self::configuration(err);
        }

        if err.is_body() || err.is_decode() || err.is_status() || err.is_redirect() {
            return Self::protocol(err);
        }

        Self::connectivity(err)
    }
}

/// Converts JSON errors to `Protocol`.
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::protocol(err)
    }
}

/// Converts URL parsing errors to `Configuration`.
impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Self::configuration(e.to_string())
    }
}

/// Converts integer parsing errors to `Configuration`.
impl From<std::num::ParseIntError> for Error {
    fn from(e: std::num::ParseIntError) -> Self {
        Self::configuration(e.to_string())
    }
}

/// Converts float parsing errors to `Configuration`.
impl From<std::num::ParseFloatError> for Error {
    fn from(e: std::num::ParseFloatError) -> Self {
        Self::configuration(e.to_string())
    }
}

/// Converts mutex poisoning errors to `Internal`.
impl<T> From<std::sync::PoisonError<std::sync::MutexGuard<'_, T>>> for Error {
    fn from(e: std::sync::PoisonError<std::sync::MutexGuard<'_, T>>) -> Self {
        Self::internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_timeouts_map_to_timeout() {
        let err = Error::from(std::io::Error::from(std::io::ErrorKind::TimedOut));
        assert_eq!(err.kind, ErrorKind::Timeout);
    }

    #[test]
    fn io_missing_device_maps_to_connectivity() {
        let err = Error::from(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(err.kind, ErrorKind::Connectivity);
    }

    #[test]
    fn downcast_reaches_the_wrapped_error() {
        let err = Error::from(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        let io = err.downcast::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::BrokenPipe);
        assert!(err.downcast::<serde_json::Error>().is_none());
    }

    #[test]
    fn display_includes_kind_and_details() {
        let err = Error::protocol("missing field");
        assert_eq!(err.to_string(), "protocol error: missing field");
    }

    #[test]
    fn json_errors_are_protocol_errors() {
        let err: Error = serde_json::from_str::<serde_json::Value>("not json")
            .unwrap_err()
            .into();
        assert_eq!(err.kind, ErrorKind::Protocol);
    }
}
