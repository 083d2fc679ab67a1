//! Selects and constructs a provider.
//!
//! Construction fails with a `Configuration` error for an unknown kind or a
//! missing backend parameter. When [`ProviderConfig::fallback`] is set, those
//! configuration errors instead produce a local-uniform provider and a
//! warning. The substitution only ever happens here: once built, a provider
//! is never swapped mid-session, and run-time errors always reach the caller.
//!
//! # Example
//!
//! ```rust
//! use llama_rng::{config::ProviderConfig, factory, provider::Provider};
//!
//! let config = ProviderConfig::from_env()?;
//! let mut provider = factory::from_config(&config)?;
//! let value = provider.generate()?;
//! ```

use crate::{
    config::{ProviderConfig, ENV_API_URL},
    error::{Error, ErrorKind, Result},
    local::LocalProvider,
    provider::{Provider, ProviderKind},
    remote::RemoteProvider,
    serial::SerialProvider,
};

/// Builds the provider named by `config.kind`.
///
/// # Errors
///
/// See [`build`].
pub fn from_config(config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    build(&config.kind, config)
}

/// Builds the provider named by the environment.
///
/// # Errors
///
/// Returns an error if the environment is malformed or the provider cannot
/// be built.
pub fn from_env() -> Result<Box<dyn Provider>> {
    from_config(&ProviderConfig::from_env()?)
}

/// Builds a provider of `kind` and attaches the value log if enabled.
///
/// # Errors
///
/// Returns error if:
/// * `kind` is unknown or a required parameter is missing, unless
///   fallback is enabled
/// * The device or endpoint cannot be set up
/// * The value log cannot be opened
pub fn build(kind: &str, config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    let mut provider = match construct(kind, config) {
        Ok(provider) => provider,
        Err(e) if e.kind == ErrorKind::Configuration && config.fallback => {
            warn!("{e}; falling back to {}", ProviderKind::LocalUniform);
            Box::new(LocalProvider::uniform(config.seed))
        }
        Err(e) => return Err(e),
    };

    if let Some(path) = config.log_sink() {
        provider.set_log_sink(path)?;
    }

    Ok(provider)
}

fn construct(kind: &str, config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    let kind: ProviderKind = kind.parse()?;

    let provider: Box<dyn Provider> = match kind {
        ProviderKind::LocalUniform => Box::new(LocalProvider::uniform(config.seed)),
        ProviderKind::LocalNormal => Box::new(LocalProvider::normal(config.seed)),
        ProviderKind::RemoteHttp => {
            let url = config
                .api_url
                .as_deref()
                .ok_or_else(|| Error::configuration(format!("{kind} requires {ENV_API_URL}")))?;
            Box::new(RemoteProvider::with_timeout(url, config.http_timeout)?)
        }
        ProviderKind::SerialHardware => Box::new(SerialProvider::open(&config.serial)?),
    };

    info!("using {kind} provider");
    Ok(provider)
}
