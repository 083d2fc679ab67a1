//! Serial transport for Unix systems.

use std::{
    fs::{File, OpenOptions},
    io::{self, Read, Write},
    mem,
    os::{
        fd::AsRawFd,
        unix::fs::OpenOptionsExt,
    },
    path::Path,
    time::Duration,
};

use super::baud::{cvt, Baud};

/// Longest idle wait `VTIME` can express, in deciseconds.
const MAX_VTIME: u128 = 255;

/// An open tty in raw 8-N-1 mode.
///
/// The descriptor is closed when the transport is dropped.
#[derive(Debug)]
pub struct PosixTransport {
    file: File,
}

impl PosixTransport {
    /// Opens and configures `path`.
    ///
    /// Reads return after `read_timeout` without data (rounded up to a tenth
    /// of a second, at most 25.5 seconds).
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be opened or is not a tty.
    pub fn open(path: &Path, baud: Baud, read_timeout: Duration) -> io::Result<Self> {
        // Non-blocking so that opening does not wait for carrier detect.
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(path)?;
        let fd = file.as_raw_fd();

        // Safety: `termios` is plain old data, filled in by `tcgetattr`.
        let mut tty: libc::termios = unsafe { mem::zeroed() };
        unsafe {
            cvt(libc::tcgetattr(fd, &mut tty))?;
            libc::cfmakeraw(&mut tty);
        }

        tty.c_cflag &= !(libc::PARENB | libc::CSTOPB | libc::CSIZE | libc::CRTSCTS);
        tty.c_cflag |= libc::CS8 | libc::CLOCAL | libc::CREAD;
        tty.c_iflag &= !(libc::IXON | libc::IXOFF | libc::IXANY);
        tty.c_cc[libc::VMIN] = 0;
        tty.c_cc[libc::VTIME] = vtime(read_timeout);

        baud.apply(fd, &mut tty)?;

        // Safety: `fd` is owned by `file` and still open.
        unsafe {
            cvt(libc::tcflush(fd, libc::TCIFLUSH))?;
            let flags = cvt(libc::fcntl(fd, libc::F_GETFL))?;
            cvt(libc::fcntl(fd, libc::F_SETFL, flags & !libc::O_NONBLOCK))?;
        }

        Ok(Self { file })
    }
}

/// Converts a timeout into `VTIME` deciseconds, at least one.
#[expect(clippy::cast_possible_truncation)]
fn vtime(timeout: Duration) -> libc::cc_t {
    timeout.as_millis().div_ceil(100).clamp(1, MAX_VTIME) as libc::cc_t
}

impl Read for PosixTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for PosixTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    /// Waits until all written bytes have been transmitted.
    fn flush(&mut self) -> io::Result<()> {
        // Safety: the descriptor is owned by `self.file`.
        cvt(unsafe { libc::tcdrain(self.file.as_raw_fd()) })?;
        Ok(())
    }
}
