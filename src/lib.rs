//! Random control values for LLM token sampling.
//!
//! A sampler asks for one value in `[0, 1]` per decoding step. This crate
//! decides where that value comes from:
//!
//! * [`local`]: seeded uniform or clamped-normal PRNG
//! * [`remote`]: an HTTP service answering `{"random": <number>}`
//! * [`serial`]: a hardware random source streaming bytes over a serial link
//!
//! All of them implement [`Provider`], are selected by [`factory`] from a
//! [`ProviderConfig`], and can append every value to a [`logger`] file that a
//! visualiser tails.
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[macro_use]
extern crate log;

pub mod config;
pub mod error;
pub mod factory;
pub mod local;
pub mod logger;
pub mod provider;
pub mod remote;
pub mod serial;
pub mod stats;
pub mod util;
pub mod value;

pub use config::ProviderConfig;
pub use error::{Error, ErrorKind, Result};
pub use provider::{Provider, ProviderKind};
pub use value::RandomValue;
