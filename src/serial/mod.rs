//! Provider backed by a hardware random source on a serial link.
//!
//! The device, once switched on, streams raw random bytes without any
//! framing. Every call to [`generate`](Provider::generate) consumes the next
//! four bytes as a little-endian `u32` and scales it by `u32::MAX`.
//!
//! # Wire Protocol
//!
//! * 8 data bits, no parity, 1 stop bit, no flow control
//! * Commonly clocked at 921600 baud
//! * Writing the single byte [`TOGGLE_BYTE`] switches streaming on or off;
//!   nothing is acknowledged
//!
//! # Limitations
//!
//! There is no frame marker, checksum or resynchronisation. If a byte is
//! lost on the link, every later frame is silently misaligned and nothing
//! here can detect it.
//!
//! # Lifecycle
//!
//! ```text
//! CLOSED --open--> OPEN --toggle (any party)--> STREAMING --drop--> CLOSED
//! ```
//!
//! Dropping the provider closes the port but does not guarantee the device
//! stops streaming, even when a stop toggle is sent.

mod transport;

#[cfg(unix)]
mod baud;
#[cfg(unix)]
mod posix;
#[cfg(not(unix))]
mod unsupported;

use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

pub use transport::{SerialSettings, Transport};

#[cfg(unix)]
pub use baud::Baud;
#[cfg(unix)]
pub use posix::PosixTransport;

use crate::{
    error::{Error, Result},
    logger::ValueLogger,
    provider::{Provider, ProviderKind},
    value::RandomValue,
};

/// Transport used for real devices on this platform.
#[cfg(unix)]
pub type PlatformTransport = posix::PosixTransport;

/// Transport used for real devices on this platform.
#[cfg(not(unix))]
pub type PlatformTransport = unsupported::UnsupportedTransport;

/// Control byte that toggles the device's streaming state.
pub const TOGGLE_BYTE: u8 = 0x42;

/// Number of bytes consumed per value.
pub const FRAME_LEN: usize = 4;

/// Directory scanned for candidate devices.
const DEVICE_DIR: &str = "/dev";

/// File name prefixes of USB serial adapters, in priority order.
const PORT_PREFIXES: &[&str] = &[
    "cu.usbserial",
    "tty.usbserial",
    "ttyUSB",
    "cu.usbmodem",
    "ttyACM",
];

/// Converts one little-endian frame into a value in `[0, 1]`.
#[must_use]
pub fn decode_frame(frame: [u8; FRAME_LEN]) -> f64 {
    f64::from(u32::from_le_bytes(frame)) / f64::from(u32::MAX)
}

/// Lists candidate devices under `/dev`.
#[must_use]
pub fn discover_ports() -> Vec<PathBuf> {
    discover_ports_in(Path::new(DEVICE_DIR))
}

/// Returns the first candidate device, if any.
///
/// Nothing checks that the device actually is a random source.
#[must_use]
pub fn discover_port() -> Option<PathBuf> {
    discover_ports().into_iter().next()
}

/// Lists entries of `dir` matching the known adapter prefixes.
///
/// Ordered by prefix priority, then by name.
#[must_use]
pub fn discover_ports_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok()?.file_name().into_string().ok())
        .collect();
    names.sort();

    let mut ports = Vec::new();
    for prefix in PORT_PREFIXES {
        ports.extend(
            names
                .iter()
                .filter(|name| name.starts_with(prefix))
                .map(|name| dir.join(name)),
        );
    }

    trace!("serial port candidates: {ports:?}");
    ports
}

/// Provider reading values from a hardware random source.
pub struct SerialProvider<T: Transport> {
    transport: T,
    port: PathBuf,
    toggle_on_close: bool,
    logger: ValueLogger,
}

impl SerialProvider<PlatformTransport> {
    /// Opens the configured or discovered device.
    ///
    /// The baud rate is validated before any device is touched, so an
    /// unsupported rate always fails here and never on a later read.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// * The baud rate is not supported on this platform
    /// * No port is configured and none is found
    /// * The device cannot be opened or configured
    /// * The start toggle cannot be written
    pub fn open(settings: &SerialSettings) -> Result<Self> {
        #[cfg(unix)]
        let baud = Baud::resolve(settings.baud_rate)?;
        #[cfg(not(unix))]
        let baud = settings.baud_rate;

        let port = match &settings.port {
            Some(port) => port.clone(),
            None => {
                let port = discover_port()
                    .ok_or_else(|| Error::connectivity("no serial device found"))?;
                info!("auto-detected serial device {}", port.display());
                port
            }
        };

        let transport = PlatformTransport::open(&port, baud, settings.read_timeout)
            .map_err(|e| open_error(&port, e))?;
        info!("opened {} at {} baud", port.display(), settings.baud_rate);

        let mut provider = Self::with_transport(transport, port);
        if settings.toggle_stream {
            provider.toggle_stream()?;
            provider.toggle_on_close = true;
        }

        Ok(provider)
    }
}

impl<T: Transport> SerialProvider<T> {
    /// Wraps an already open transport.
    pub fn with_transport(transport: T, port: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            port: port.into(),
            toggle_on_close: false,
            logger: ValueLogger::disabled(),
        }
    }

    #[must_use]
    pub fn port(&self) -> &Path {
        &self.port
    }

    /// Writes the toggle byte. The device does not acknowledge it.
    ///
    /// # Errors
    ///
    /// Returns an error if the byte cannot be written.
    pub fn toggle_stream(&mut self) -> Result<()> {
        self.transport.write_all(&[TOGGLE_BYTE])?;
        self.transport.flush()?;
        debug!("sent toggle to {}", self.port.display());
        Ok(())
    }

    /// Reads exactly one frame.
    ///
    /// Each read may wait up to the idle timeout; running out fails the
    /// whole frame.
    fn read_frame(&mut self) -> Result<[u8; FRAME_LEN]> {
        let mut frame = [0; FRAME_LEN];
        let mut filled = 0;
        while filled < FRAME_LEN {
            match self.transport.read(&mut frame[filled..]) {
                Ok(0) => {
                    return Err(Error::timeout(format!(
                        "no data from {} after {filled} of {FRAME_LEN} bytes",
                        self.port.display()
                    )));
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }

        trace!("frame {frame:02x?} from {}", self.port.display());
        Ok(frame)
    }
}

impl<T: Transport> Provider for SerialProvider<T> {
    fn generate(&mut self) -> Result<RandomValue> {
        let frame = self.read_frame()?;
        Ok(self.logger.record(RandomValue::new(
            decode_frame(frame),
            ProviderKind::SerialHardware.as_str(),
        )))
    }

    fn name(&self) -> &str {
        ProviderKind::SerialHardware.as_str()
    }

    fn set_log_sink(&mut self, path: &Path) -> Result<()> {
        self.logger = ValueLogger::open(path, self.name())?;
        Ok(())
    }
}

impl<T: Transport> Drop for SerialProvider<T> {
    fn drop(&mut self) {
        if self.toggle_on_close {
            if let Err(e) = self.toggle_stream() {
                warn!("could not send stop toggle to {}: {e}", self.port.display());
            }
        }
    }
}

/// Classifies a failure to open `port`.
fn open_error(port: &Path, e: io::Error) -> Error {
    let message = format!("cannot open {}: {e}", port.display());
    match e.kind() {
        io::ErrorKind::Unsupported => Error::unimplemented(message),
        _ => Error::connectivity(message),
    }
}
