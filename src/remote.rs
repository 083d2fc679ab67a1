//! Provider backed by a remote random number service.
//!
//! Each call to [`generate`](Provider::generate) issues exactly one GET
//! against the configured endpoint and expects:
//!
//! ```text
//! 200 OK
//! {"random": 0.73}
//! ```
//!
//! # Failure Handling
//!
//! There are no retries and no substitute values:
//! * Connection refused or DNS failure -> `Connectivity`
//! * No answer within the timeout -> `Timeout`
//! * Non-200 status, non-JSON body, missing or non-numeric `random` -> `Protocol`
//!
//! Values the service returns outside `[0, 1]` are clamped.
//!
//! # Runtime
//!
//! The HTTP client is asynchronous. Every provider owns its own client, and
//! all providers in the process share one background runtime that is created
//! with the first provider and shut down when the last one is dropped. Do not
//! call `generate` from within an asynchronous context.

use std::{
    path::Path,
    sync::{Arc, Mutex, Weak},
    time::Duration,
};

use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tokio::runtime::Runtime;

use crate::{
    error::{Error, Result},
    logger::ValueLogger,
    provider::{Provider, ProviderKind},
    value::RandomValue,
};

/// Shared runtime, alive while at least one remote provider is.
static RUNTIME: Mutex<Weak<Runtime>> = Mutex::new(Weak::new());

/// Returns the process-wide runtime, starting it if no provider holds it.
fn shared_runtime() -> Result<Arc<Runtime>> {
    let mut slot = RUNTIME.lock()?;
    if let Some(runtime) = slot.upgrade() {
        return Ok(runtime);
    }

    let runtime = Arc::new(
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("llama-rng-http")
            .enable_all()
            .build()?,
    );
    trace!("started http runtime");
    *slot = Arc::downgrade(&runtime);

    Ok(runtime)
}

/// Expected response body.
#[derive(Debug, Deserialize)]
struct RandomResponse {
    random: f64,
}

/// Provider that fetches each value from an HTTP endpoint.
pub struct RemoteProvider {
    url: Url,
    client: reqwest::Client,
    runtime: Arc<Runtime>,
    logger: ValueLogger,
}

impl RemoteProvider {
    /// Bound on every request, from connect to last body byte.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Duration to keep the connection alive between calls.
    const KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Creates a provider for `url` with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// * The URL does not parse or is not http(s)
    /// * HTTP client creation fails
    pub fn new(url: &str) -> Result<Self> {
        Self::with_timeout(url, Self::DEFAULT_TIMEOUT)
    }

    /// Creates a provider with a custom request timeout.
    ///
    /// # Errors
    ///
    /// See [`RemoteProvider::new`].
    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::configuration(format!(
                "unsupported url scheme `{}`",
                url.scheme()
            )));
        }

        let runtime = shared_runtime()?;
        let client = {
            let _guard = runtime.enter();
            reqwest::Client::builder()
                .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
                .tcp_keepalive(Self::KEEPALIVE_TIMEOUT)
                .timeout(timeout)
                .build()?
        };

        info!("using random values from {url} (timeout {}ms)", timeout.as_millis());
        Ok(Self {
            url,
            client,
            runtime,
            logger: ValueLogger::disabled(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Performs one request and extracts the raw number.
    fn fetch(&self) -> Result<f64> {
        let body = self.runtime.block_on(async {
            let response = self.client.get(self.url.clone()).send().await?;
            let status = response.status();
            trace!("GET {}: {status}", self.url);
            if status != StatusCode::OK {
                return Err(Error::protocol(format!("unexpected status {status}")));
            }
            Ok::<_, Error>(response.bytes().await?)
        })?;

        let response: RandomResponse = serde_json::from_slice(&body)?;
        if !response.random.is_finite() {
            return Err(Error::protocol("`random` is not a finite number"));
        }

        Ok(response.random)
    }
}

impl Provider for RemoteProvider {
    fn generate(&mut self) -> Result<RandomValue> {
        let raw = self.fetch()?;
        if !(0.0..=1.0).contains(&raw) {
            debug!("clamping out of range value {raw} from {}", self.url);
        }

        Ok(self
            .logger
            .record(RandomValue::new(raw, ProviderKind::RemoteHttp.as_str())))
    }

    fn name(&self) -> &str {
        ProviderKind::RemoteHttp.as_str()
    }

    fn set_log_sink(&mut self, path: &Path) -> Result<()> {
        self.logger = ValueLogger::open(path, self.name())?;
        Ok(())
    }

    fn try_clone(&self) -> Result<Box<dyn Provider>> {
        Ok(Box::new(Self {
            url: self.url.clone(),
            client: self.client.clone(),
            runtime: Arc::clone(&self.runtime),
            logger: ValueLogger::disabled(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn rejects_malformed_url() {
        let err = RemoteProvider::new("not a url").err().unwrap();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = RemoteProvider::new("ftp://example.com/random").err().unwrap();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn providers_share_one_runtime() {
        let a = RemoteProvider::new("http://127.0.0.1:9/random").unwrap();
        let b = RemoteProvider::new("http://127.0.0.1:9/random").unwrap();
        assert!(Arc::ptr_eq(&a.runtime, &b.runtime));
    }

    #[test]
    fn generate_reports_failures_as_errors() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/random", listener.local_addr().unwrap());
        drop(listener);

        let mut provider =
            RemoteProvider::with_timeout(&url, Duration::from_millis(500)).unwrap();
        let err = provider.generate().unwrap_err();
        assert!(
            matches!(err.kind, ErrorKind::Connectivity | ErrorKind::Timeout),
            "{err}"
        );
    }

    #[test]
    fn clones_share_the_endpoint() {
        let provider = RemoteProvider::new("http://127.0.0.1:9/random").unwrap();
        let copy = provider.try_clone().unwrap();
        assert_eq!(copy.name(), "remote-http");
    }

    #[test]
    fn cannot_be_reseeded() {
        let mut provider = RemoteProvider::new("http://127.0.0.1:9/random").unwrap();
        assert_eq!(provider.reseed(1).unwrap_err().kind, ErrorKind::Unimplemented);
    }
}
