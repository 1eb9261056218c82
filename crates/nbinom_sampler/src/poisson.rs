//! Poisson variates and the state-introspection surface of their source.
//!
//! In a managed generator the Poisson sampler is the designated holder of
//! the shared state: the generator reads state, seed and lengths through it.

use nbinom_core::{Mt19937, PrngError, SharedState, UniformSource};
use rand_distr::{Distribution, Poisson};

/// Poisson(`lambda`) sampler.
#[derive(Clone, Debug)]
pub struct PoissonSampler {
    source: UniformSource,
    dist: Option<Poisson<f64>>,
}

impl PoissonSampler {
    /// Creates a sampler with a bound mean.
    ///
    /// # Errors
    ///
    /// Returns `PrngError::RangeKind` unless `lambda` is positive and finite.
    pub fn new(lambda: f64, source: UniformSource) -> Result<Self, PrngError> {
        let dist = poisson(lambda).ok_or_else(|| {
            PrngError::range_kind(format!(
                "invalid argument. Mean must be a positive finite number. Value: `{}`.",
                lambda
            ))
        })?;
        Ok(Self {
            source,
            dist: Some(dist),
        })
    }

    /// Creates a sampler that takes its mean per call.
    pub fn unbound(source: UniformSource) -> Self {
        Self { source, dist: None }
    }

    /// Draws with the bound mean; NaN on an unbound sampler.
    pub fn sample(&mut self) -> f64 {
        match &self.dist {
            Some(dist) => dist.sample(&mut self.source),
            None => f64::NAN,
        }
    }

    /// Draws Poisson(`lambda`).
    ///
    /// `lambda = 0` yields 0 without consuming randomness. NaN, negative or
    /// infinite `lambda` yields NaN.
    pub fn sample_with(&mut self, lambda: f64) -> f64 {
        if lambda == 0.0 {
            return 0.0;
        }
        match poisson(lambda) {
            Some(dist) => dist.sample(&mut self.source),
            None => f64::NAN,
        }
    }

    /// Returns the uniform source.
    pub fn source(&self) -> &UniformSource {
        &self.source
    }

    /// Returns the managed engine, if the source is not external.
    pub fn engine(&self) -> Option<&Mt19937> {
        self.source.engine()
    }

    /// Seed words of the managed engine.
    pub fn seed(&self) -> Option<Vec<u32>> {
        self.engine().map(Mt19937::seed)
    }

    /// Seed length of the managed engine.
    pub fn seed_length(&self) -> Option<usize> {
        self.engine().map(Mt19937::seed_length)
    }

    /// Copy of the managed engine state.
    pub fn state(&self) -> Option<Vec<u32>> {
        self.engine().map(Mt19937::state)
    }

    /// Handle aliasing the managed engine state.
    pub fn state_handle(&self) -> Option<SharedState> {
        self.engine().map(Mt19937::state_handle)
    }

    /// Points the managed engine at `state` without copying. A no-op for an
    /// external source.
    ///
    /// # Errors
    ///
    /// Returns `PrngError::RangeKind` if the engine rejects the layout.
    pub fn set_state(&self, state: SharedState) -> Result<(), PrngError> {
        match self.engine() {
            Some(mt) => mt.set_state(state),
            None => Ok(()),
        }
    }

    /// State length of the managed engine, in words.
    pub fn state_length(&self) -> Option<usize> {
        self.engine().map(Mt19937::state_length)
    }

    /// State length of the managed engine, in bytes.
    pub fn byte_length(&self) -> Option<usize> {
        self.engine().map(Mt19937::byte_length)
    }
}

fn poisson(lambda: f64) -> Option<Poisson<f64>> {
    if !(lambda > 0.0 && lambda.is_finite()) {
        return None;
    }
    Poisson::new(lambda).ok()
}
