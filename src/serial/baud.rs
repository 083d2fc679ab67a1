//! Baud rate configuration per OS family.
//!
//! * Linux and most other Unix systems only accept the symbolic `B*`
//!   constants. A rate missing from that set is rejected when resolved, before
//!   any device is touched. There is no rounding to the nearest rate.
//! * Apple's `termios` cannot hold arbitrary rates. The line is first
//!   configured at a nominal standard rate, then `IOSSIOSPEED` sets the real
//!   clock. The order matters: the `tcsetattr` after the ioctl would reset
//!   the clock to the nominal rate.

use std::{io, os::fd::RawFd};

use crate::error::{Error, Result};

/// A baud rate the current platform can program.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Baud {
    rate: u32,
    speed: libc::speed_t,
}

impl Baud {
    /// Validates `rate` for this platform.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for zero or unsupported rates.
    pub fn resolve(rate: u32) -> Result<Self> {
        let speed = imp::speed_for(rate)
            .ok_or_else(|| Error::configuration(format!("unsupported baud rate {rate}")))?;
        Ok(Self { rate, speed })
    }

    #[must_use]
    pub fn rate(self) -> u32 {
        self.rate
    }

    /// Programs `tty` with this rate and commits it to `fd`.
    pub(super) fn apply(self, fd: RawFd, tty: &mut libc::termios) -> io::Result<()> {
        imp::apply(self.speed, fd, tty)
    }
}

/// Turns a `-1` libc return into the current OS error.
pub(super) fn cvt(ret: libc::c_int) -> io::Result<libc::c_int> {
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret)
    }
}

#[cfg(any(target_os = "macos", target_os = "ios"))]
mod imp {
    use std::{io, mem, os::fd::RawFd};

    use super::cvt;

    /// `_IOW('T', 2, speed_t)` from `<IOKit/serial/ioss.h>`.
    const IOSSIOSPEED: libc::c_ulong = 0x8000_0000
        | (((mem::size_of::<libc::speed_t>() as libc::c_ulong) & 0x1fff) << 16)
        | ((b'T' as libc::c_ulong) << 8)
        | 2;

    /// Any non-zero rate can be clocked through `IOSSIOSPEED`.
    pub fn speed_for(rate: u32) -> Option<libc::speed_t> {
        (rate > 0).then(|| libc::speed_t::from(rate))
    }

    pub fn apply(speed: libc::speed_t, fd: RawFd, tty: &mut libc::termios) -> io::Result<()> {
        // Safety: `tty` is a valid, initialised termios owned by the caller.
        unsafe {
            cvt(libc::cfsetspeed(tty, libc::B9600))?;
            cvt(libc::tcsetattr(fd, libc::TCSANOW, tty))?;
            cvt(libc::ioctl(fd, IOSSIOSPEED, &speed as *const libc::speed_t))?;
        }
        Ok(())
    }
}

#[cfg(not(any(target_os = "macos", target_os = "ios")))]
mod imp {
    use std::{io, os::fd::RawFd};

    use super::cvt;

    pub fn speed_for(rate: u32) -> Option<libc::speed_t> {
        let speed = match rate {
            50 => libc::B50,
            75 => libc::B75,
            110 => libc::B110,
            134 => libc::B134,
            150 => libc::B150,
            200 => libc::B200,
            300 => libc::B300,
            600 => libc::B600,
            1_200 => libc::B1200,
            1_800 => libc::B1800,
            2_400 => libc::B2400,
            4_800 => libc::B4800,
            9_600 => libc::B9600,
            19_200 => libc::B19200,
            38_400 => libc::B38400,
            57_600 => libc::B57600,
            115_200 => libc::B115200,
            230_400 => libc::B230400,
            #[cfg(any(target_os = "linux", target_os = "android"))]
            460_800 => libc::B460800,
            #[cfg(any(target_os = "linux", target_os = "android"))]
            500_000 => libc::B500000,
            #[cfg(any(target_os = "linux", target_os = "android"))]
            576_000 => libc::B576000,
            #[cfg(any(target_os = "linux", target_os = "android"))]
            921_600 => libc::B921600,
            #[cfg(any(target_os = "linux", target_os = "android"))]
            1_000_000 => libc::B1000000,
            #[cfg(any(target_os = "linux", target_os = "android"))]
            1_152_000 => libc::B1152000,
            #[cfg(any(target_os = "linux", target_os = "android"))]
            1_500_000 => libc::B1500000,
            #[cfg(any(target_os = "linux", target_os = "android"))]
            2_000_000 => libc::B2000000,
            #[cfg(any(target_os = "linux", target_os = "android"))]
            2_500_000 => libc::B2500000,
            #[cfg(any(target_os = "linux", target_os = "android"))]
            3_000_000 => libc::B3000000,
            #[cfg(any(target_os = "linux", target_os = "android"))]
            3_500_000 => libc::B3500000,
            #[cfg(any(target_os = "linux", target_os = "android"))]
            4_000_000 => libc::B4000000,
            _ => return None,
        };
        Some(speed)
    }

    pub fn apply(speed: libc::speed_t, fd: RawFd, tty: &mut libc::termios) -> io::Result<()> {
        // Safety: `tty` is a valid, initialised termios owned by the caller.
        unsafe {
            cvt(libc::cfsetispeed(tty, speed))?;
            cvt(libc::cfsetospeed(tty, speed))?;
            cvt(libc::tcsetattr(fd, libc::TCSANOW, tty))?;
        }
        Ok(())
    }
}
