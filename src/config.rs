//! Provider configuration from environment variables.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `LLAMA_RNG_PROVIDER` | backend kind | `uniform` |
//! | `LLAMA_RNG_SEED` | PRNG seed | random |
//! | `LLAMA_RNG_API_URL` | HTTP endpoint | none |
//! | `LLAMA_RNG_TIMEOUT_MS` | HTTP timeout | 5000 |
//! | `LLAMA_RNG_SERIAL_PORT` | serial device | auto-detect |
//! | `LLAMA_RNG_BAUD_RATE` | baud rate | 921600 |
//! | `LLAMA_RNG_SERIAL_TIMEOUT_MS` | per-byte read timeout | 2000 |
//! | `LLAMA_RNG_SERIAL_TOGGLE` | toggle streaming on open and close | off |
//! | `LLAMA_RNG_DEBUG` | enable the value log | off |
//! | `LLAMA_RNG_OUTPUT` | value log path | `rng_values.txt` |
//! | `LLAMA_RNG_FALLBACK` | fall back to local-uniform on bad configuration | off |

use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::{
    error::{Error, Result},
    remote::RemoteProvider,
    serial::SerialSettings,
};

pub const ENV_PROVIDER: &str = "LLAMA_RNG_PROVIDER";
pub const ENV_SEED: &str = "LLAMA_RNG_SEED";
pub const ENV_API_URL: &str = "LLAMA_RNG_API_URL";
pub const ENV_TIMEOUT_MS: &str = "LLAMA_RNG_TIMEOUT_MS";
pub const ENV_SERIAL_PORT: &str = "LLAMA_RNG_SERIAL_PORT";
pub const ENV_BAUD_RATE: &str = "LLAMA_RNG_BAUD_RATE";
pub const ENV_SERIAL_TIMEOUT_MS: &str = "LLAMA_RNG_SERIAL_TIMEOUT_MS";
pub const ENV_SERIAL_TOGGLE: &str = "LLAMA_RNG_SERIAL_TOGGLE";
pub const ENV_DEBUG: &str = "LLAMA_RNG_DEBUG";
pub const ENV_OUTPUT: &str = "LLAMA_RNG_OUTPUT";
pub const ENV_FALLBACK: &str = "LLAMA_RNG_FALLBACK";

/// Value log path when logging is enabled without one.
pub const DEFAULT_OUTPUT: &str = "rng_values.txt";

/// Everything needed to construct any backend.
///
/// Built once before construction and never changed afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Requested backend, kept verbatim so the factory can report it.
    pub kind: String,

    pub seed: Option<u64>,

    pub api_url: Option<String>,
    pub http_timeout: Duration,

    pub serial: SerialSettings,

    /// Whether generated values are appended to `log_path`.
    pub debug: bool,
    pub log_path: PathBuf,

    /// Substitute local-uniform for an unknown kind or missing parameter
    /// instead of failing.
    pub fallback: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: String::from("uniform"),
            seed: None,
            api_url: None,
            http_timeout: RemoteProvider::DEFAULT_TIMEOUT,
            serial: SerialSettings::default(),
            debug: false,
            log_path: PathBuf::from(DEFAULT_OUTPUT),
            fallback: false,
        }
    }
}

impl ProviderConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for malformed numeric values.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Builds a configuration from key/value pairs.
    ///
    /// Unknown keys are ignored; empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for malformed numeric values.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();

        for (key, value) in vars {
            let key = key.as_ref();
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }

            match key {
                ENV_PROVIDER => config.kind = value.to_owned(),
                ENV_SEED => config.seed = Some(parse(key, value)?),
                ENV_API_URL => config.api_url = Some(value.to_owned()),
                ENV_TIMEOUT_MS => config.http_timeout = Duration::from_millis(parse(key, value)?),
                ENV_SERIAL_PORT => config.serial.port = Some(PathBuf::from(value)),
                ENV_BAUD_RATE => config.serial.baud_rate = parse(key, value)?,
                ENV_SERIAL_TIMEOUT_MS => {
                    config.serial.read_timeout = Duration::from_millis(parse(key, value)?);
                }
                ENV_SERIAL_TOGGLE => config.serial.toggle_stream = flag(value),
                ENV_DEBUG => config.debug = flag(value),
                ENV_OUTPUT => config.log_path = PathBuf::from(value),
                ENV_FALLBACK => config.fallback = flag(value),
                _ => {}
            }
        }

        trace!("provider config: {config:?}");
        Ok(config)
    }

    /// Log path if value logging is enabled.
    #[must_use]
    pub fn log_sink(&self) -> Option<&std::path::Path> {
        self.debug.then_some(self.log_path.as_path())
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| Error::configuration(format!("{key}={value}: {e}")))
}

fn flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
