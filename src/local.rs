//! In-process pseudo-random providers.
//!
//! Both variants share one seeded [`StdRng`], so a given seed always yields
//! the same sequence of values for the same number of calls.
//!
//! The normal variant draws from N(0.5, 0.15) and clamps into `[0, 1]`.
//! Draws beyond roughly 3.3 standard deviations therefore pile up exactly on
//! `0.0` and `1.0`; this bias is accepted, not corrected by resampling.

use std::path::Path;

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::Normal;

use crate::{
    error::{Error, Result},
    logger::ValueLogger,
    provider::{Provider, ProviderKind},
    value::RandomValue,
};

/// Mean of the normal variant.
pub const NORMAL_MEAN: f64 = 0.5;

/// Standard deviation of the normal variant.
pub const NORMAL_STD_DEV: f64 = 0.15;

/// Shape of the values drawn from the PRNG.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Distribution {
    /// Uniform over `[0, 1)`.
    Uniform,
    /// Normal with the given mean and standard deviation, clamped to `[0, 1]`.
    Normal { mean: f64, std_dev: f64 },
}

impl Distribution {
    #[must_use]
    pub fn normal() -> Self {
        Self::Normal {
            mean: NORMAL_MEAN,
            std_dev: NORMAL_STD_DEV,
        }
    }
}

#[derive(Clone)]
enum Sampler {
    Uniform,
    Normal(Normal<f64>),
}

/// Provider backed by a seeded, deterministic PRNG.
pub struct LocalProvider {
    name: &'static str,
    seed: u64,
    rng: StdRng,
    sampler: Sampler,
    logger: ValueLogger,
}

impl LocalProvider {
    /// Creates a uniform provider.
    ///
    /// Without a seed, one is drawn from OS entropy and logged so the
    /// session can be replayed.
    #[must_use]
    pub fn uniform(seed: Option<u64>) -> Self {
        Self::build(ProviderKind::LocalUniform, Sampler::Uniform, seed)
    }

    /// Creates a normal provider with mean 0.5 and standard deviation 0.15.
    #[must_use]
    pub fn normal(seed: Option<u64>) -> Self {
        let normal = Normal::new(NORMAL_MEAN, NORMAL_STD_DEV)
            .expect("normal distribution parameters are valid");
        Self::build(ProviderKind::LocalNormal, Sampler::Normal(normal), seed)
    }

    /// Creates a provider for an arbitrary distribution.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the mean is not finite or the
    /// standard deviation is not a finite positive number.
    pub fn new(distribution: Distribution, seed: Option<u64>) -> Result<Self> {
        match distribution {
            Distribution::Uniform => Ok(Self::uniform(seed)),
            Distribution::Normal { mean, std_dev } => {
                if !mean.is_finite() || !std_dev.is_finite() || std_dev <= 0.0 {
                    return Err(Error::configuration(format!(
                        "invalid normal distribution: mean {mean}, std dev {std_dev}"
                    )));
                }

                let normal = Normal::new(mean, std_dev).map_err(|e| {
                    Error::configuration(format!("invalid normal distribution: {e}"))
                })?;
                Ok(Self::build(
                    ProviderKind::LocalNormal,
                    Sampler::Normal(normal),
                    seed,
                ))
            }
        }
    }

    fn build(kind: ProviderKind, sampler: Sampler, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| {
            let seed = rand::thread_rng().gen();
            info!("no seed configured for {kind}, using {seed}");
            seed
        });
        debug!("{kind} provider seeded with {seed}");

        Self {
            name: kind.as_str(),
            seed,
            rng: StdRng::seed_from_u64(seed),
            sampler,
            logger: ValueLogger::disabled(),
        }
    }

    /// Seed the current stream started from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn draw(&mut self) -> f64 {
        match &self.sampler {
            Sampler::Uniform => self.rng.gen::<f64>(),
            Sampler::Normal(normal) => self.rng.sample(normal),
        }
    }
}

/// Copies the generator state, so the copy continues the same sequence.
///
/// The value log is not shared: the copy starts with logging disabled.
impl Clone for LocalProvider {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            seed: self.seed,
            rng: self.rng.clone(),
            sampler: self.sampler.clone(),
            logger: ValueLogger::disabled(),
        }
    }
}

impl Provider for LocalProvider {
    fn generate(&mut self) -> Result<RandomValue> {
        let raw = self.draw();
        Ok(self.logger.record(RandomValue::new(raw, self.name)))
    }

    fn name(&self) -> &str {
        self.name
    }

    fn set_log_sink(&mut self, path: &Path) -> Result<()> {
        self.logger = ValueLogger::open(path, self.name)?;
        Ok(())
    }

    fn reseed(&mut self, seed: u64) -> Result<()> {
        self.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
        Ok(())
    }

    fn try_clone(&self) -> Result<Box<dyn Provider>> {
        Ok(Box::new(self.clone()))
    }
}
