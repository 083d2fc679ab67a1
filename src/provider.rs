//! The sampler-facing provider contract.
//!
//! A provider hands out one [`RandomValue`] per decoding step. Which entropy
//! source backs it is invisible to the caller:
//!
//! * [`LocalProvider`](crate::local::LocalProvider): seeded in-process PRNG
//! * [`RemoteProvider`](crate::remote::RemoteProvider): HTTP service
//! * [`SerialProvider`](crate::serial::SerialProvider): hardware source on a
//!   serial link
//!
//! Resources are acquired when a provider is constructed and released when
//! it is dropped. There are no half-open providers.

use std::{fmt, path::Path, str::FromStr};

use crate::{
    error::{Error, Result},
    value::RandomValue,
};

/// Source of control values for token sampling.
///
/// Driven by a single thread; `generate` may block up to the backend's
/// bounded timeout and never retries.
pub trait Provider: Send {
    /// Produces the next value in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns the backend's connectivity, protocol or timeout error. No
    /// default value is ever substituted.
    fn generate(&mut self) -> Result<RandomValue>;

    /// Backend name, as written to the value log header.
    fn name(&self) -> &str;

    /// Starts appending every generated value to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be opened.
    fn set_log_sink(&mut self, path: &Path) -> Result<()>;

    /// Restarts the value stream from `seed`.
    ///
    /// # Errors
    ///
    /// Returns `Unimplemented` for backends that have no seed.
    fn reseed(&mut self, seed: u64) -> Result<()> {
        let _ = seed;
        Err(Error::unimplemented(format!(
            "{} cannot be reseeded",
            self.name()
        )))
    }

    /// Copies the provider, including its position in the value stream.
    ///
    /// The copy starts without a value log.
    ///
    /// # Errors
    ///
    /// Returns `Unimplemented` for backends bound to a single device.
    fn try_clone(&self) -> Result<Box<dyn Provider>> {
        Err(Error::unimplemented(format!(
            "{} cannot be cloned",
            self.name()
        )))
    }
}

impl<P: Provider + ?Sized> Provider for Box<P> {
    fn generate(&mut self) -> Result<RandomValue> {
        (**self).generate()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn set_log_sink(&mut self, path: &Path) -> Result<()> {
        (**self).set_log_sink(path)
    }

    fn reseed(&mut self, seed: u64) -> Result<()> {
        (**self).reseed(seed)
    }

    fn try_clone(&self) -> Result<Box<dyn Provider>> {
        (**self).try_clone()
    }
}

/// The four backends a provider can be built from.
#[expect(clippy::module_name_repetitions)]
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum ProviderKind {
    #[default]
    LocalUniform,
    LocalNormal,
    RemoteHttp,
    SerialHardware,
}

impl ProviderKind {
    /// Canonical name, also used as the backend name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LocalUniform => "local-uniform",
            Self::LocalNormal => "local-normal",
            Self::RemoteHttp => "remote-http",
            Self::SerialHardware => "serial-hardware",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    /// Parses canonical names and the short aliases `uniform`, `normal`,
    /// `http`, `external-api`, `serial` and `fpga`.
    fn from_str(s: &str) -> Result<Self> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "local-uniform" | "uniform" => Self::LocalUniform,
            "local-normal" | "normal" => Self::LocalNormal,
            "remote-http" | "http" | "external-api" => Self::RemoteHttp,
            "serial-hardware" | "serial" | "fpga" => Self::SerialHardware,
            other => return Err(Error::configuration(format!("unknown provider `{other}`"))),
        };
        Ok(kind)
    }
}
