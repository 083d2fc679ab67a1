//! Byte transport underneath the serial provider.
//!
//! The provider only needs a blocking byte pipe. How a port is opened and
//! clocked is the business of the per-platform implementation selected at
//! build time (see [`PlatformTransport`](super::PlatformTransport)).

use std::{
    io::{Read, Write},
    path::PathBuf,
    time::Duration,
};

/// A byte pipe to the device.
///
/// `read` must wait at most the configured idle timeout and return `Ok(0)`
/// when it expires without data.
pub trait Transport: Read + Write + Send {}

impl<T: Read + Write + Send> Transport for T {}

/// Line parameters for opening a device.
///
/// The line is always 8 data bits, no parity, 1 stop bit, no flow control,
/// raw input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerialSettings {
    /// Device path; discovered when absent.
    pub port: Option<PathBuf>,

    pub baud_rate: u32,

    /// How long a single byte read may wait before failing.
    pub read_timeout: Duration,

    /// Send the toggle byte after opening and again before closing.
    pub toggle_stream: bool,
}

impl SerialSettings {
    pub const DEFAULT_BAUD_RATE: u32 = 921_600;

    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: Self::DEFAULT_BAUD_RATE,
            read_timeout: Self::DEFAULT_READ_TIMEOUT,
            toggle_stream: false,
        }
    }
}
