//! Placeholder transport for platforms without a serial implementation.

use std::{
    io::{self, Read, Write},
    path::Path,
    time::Duration,
};

/// Never constructed: [`open`](UnsupportedTransport::open) always fails.
#[derive(Debug)]
pub struct UnsupportedTransport(());

impl UnsupportedTransport {
    /// # Errors
    ///
    /// Always returns `Unsupported`.
    pub fn open(path: &Path, _baud_rate: u32, _read_timeout: Duration) -> io::Result<Self> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!(
                "serial devices are not supported on this platform ({})",
                path.display()
            ),
        ))
    }
}

impl Read for UnsupportedTransport {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::ErrorKind::Unsupported.into())
    }
}

impl Write for UnsupportedTransport {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::ErrorKind::Unsupported.into())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
