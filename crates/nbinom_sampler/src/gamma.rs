//! Gamma variates parameterised by shape and rate.
//!
//! Wraps `rand_distr::Gamma`, which takes a *scale*; the rate `beta` given
//! here is converted to scale `1 / beta`.

use nbinom_core::{PrngError, UniformSource};
use rand_distr::{Distribution, Gamma};

/// Gamma(shape `alpha`, rate `beta`) sampler.
///
/// Bound samplers fix `(alpha, beta)` at construction; unbound samplers take
/// them per call. Out-of-domain per-call parameters yield NaN.
#[derive(Clone, Debug)]
pub struct GammaSampler {
    source: UniformSource,
    dist: Option<Gamma<f64>>,
}

impl GammaSampler {
    /// Creates a sampler with bound shape and rate.
    ///
    /// # Errors
    ///
    /// Returns `PrngError::RangeKind` unless `alpha > 0` and `beta > 0`.
    /// A subnormal `beta` is also rejected, since its scale `1 / beta`
    /// overflows to infinity.
    pub fn new(alpha: f64, beta: f64, source: UniformSource) -> Result<Self, PrngError> {
        let dist = gamma(alpha, beta).ok_or_else(|| {
            PrngError::range_kind(format!(
                "invalid arguments. Shape and rate must be positive numbers. Value: `({}, {})`.",
                alpha, beta
            ))
        })?;
        Ok(Self {
            source,
            dist: Some(dist),
        })
    }

    /// Creates a sampler that takes its parameters per call.
    pub fn unbound(source: UniformSource) -> Self {
        Self { source, dist: None }
    }

    /// Draws with the bound parameters; NaN on an unbound sampler.
    pub fn sample(&mut self) -> f64 {
        match &self.dist {
            Some(dist) => dist.sample(&mut self.source),
            None => f64::NAN,
        }
    }

    /// Draws Gamma(`alpha`, `beta`).
    ///
    /// NaN for parameters [`GammaSampler::new`] would reject, including a
    /// subnormal `beta`.
    pub fn sample_with(&mut self, alpha: f64, beta: f64) -> f64 {
        match gamma(alpha, beta) {
            Some(dist) => dist.sample(&mut self.source),
            None => f64::NAN,
        }
    }

    /// Returns the uniform source.
    pub fn source(&self) -> &UniformSource {
        &self.source
    }
}

/// `None` unless `alpha > 0` and `beta > 0` with a finite scale `1 / beta`.
fn gamma(alpha: f64, beta: f64) -> Option<Gamma<f64>> {
    let scale = beta.recip();
    if !(alpha > 0.0 && beta > 0.0 && scale.is_finite()) {
        return None;
    }
    Gamma::new(alpha, scale).ok()
}
