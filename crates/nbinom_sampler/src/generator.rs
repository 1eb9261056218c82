//! Negative binomial generator.
//!
//! Each draw is `Poisson(Gamma(r, p / (1 - p)))`, with the Gamma variate
//! parameterised by *rate*, so the result counts failures before the `r`-th
//! success with success probability `p`.
//!
//! ## State ownership
//!
//! Decided once at construction:
//!
//! - **Managed**: both samplers hold clones of one [`Mt19937`] handle, whose
//!   word buffer is the generator's state. A draw by either sampler advances
//!   that one buffer, and `set_state` is observed by both. The buffer is
//!   copied on the way in (construction and `set_state`) unless the `copy`
//!   option is `false`, in which case the caller's [`SharedState`] is aliased.
//! - **External**: both samplers share the caller's [`ExternalPrng`]; seed,
//!   state and serialisation accessors return `None` and `set_state` does
//!   nothing, since the closure's state cannot be inspected.

use nbinom_core::{Mt19937, PrngError, SharedState, TypedArrayJson, UniformSource};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gamma::GammaSampler;
use crate::options::{Config, Options};
use crate::poisson::PoissonSampler;
use crate::validate::validate;

/// Record type tag of a serialised generator.
pub const RECORD_TYPE: &str = "PRNG";

/// Serialised generator.
///
/// ```json
/// {
///   "type": "PRNG",
///   "name": "negative-binomial",
///   "state": { "type": "Uint32Array", "data": [1, 3, 624, ...] },
///   "params": [10, 0.5]
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratorJson {
    /// Always [`RECORD_TYPE`].
    #[serde(rename = "type")]
    pub record_type: String,
    /// Always [`NegativeBinomial::NAME`].
    pub name: String,
    /// Engine state words.
    pub state: TypedArrayJson,
    /// `[]` for an unbound generator, `[r, p]` for a bound one.
    pub params: Vec<f64>,
}

/// Negative binomial pseudorandom number generator.
///
/// # Examples
///
/// ```rust
/// use nbinom_sampler::{Config, NegativeBinomial, Options};
///
/// // Bound parameters, fixed seed
/// let mut rng = NegativeBinomial::new(
///     Config::bound(10.0, 0.5).with_options(Options::new().seed(297)),
/// ).unwrap();
/// let v = rng.sample();
/// assert!(v >= 0.0 && v.fract() == 0.0);
///
/// // Checkpoint and replay
/// let checkpoint = rng.state().unwrap();
/// let a: Vec<f64> = rng.samples(5);
/// rng.set_state(checkpoint).unwrap();
/// assert_eq!(rng.samples(5), a);
///
/// // Unbound parameters
/// let mut rng = NegativeBinomial::new(Config::Unbound).unwrap();
/// assert!(rng.sample_with(10.0, 0.5) >= 0.0);
/// assert!(rng.sample_with(10.0, 1.5).is_nan());
/// ```
#[derive(Debug)]
pub struct NegativeBinomial {
    gamma: GammaSampler,
    poisson: PoissonSampler,
    params: Option<(f64, f64)>,
    copy_on_state_mutation: bool,
}

impl NegativeBinomial {
    /// Generator name.
    pub const NAME: &'static str = "negative-binomial";

    /// Creates a generator.
    ///
    /// # Errors
    ///
    /// - `PrngError` from [`validate`] for invalid bound parameters
    /// - `PrngError::RangeKind` for an empty seed array or a `state` whose
    ///   layout the engine rejects
    /// - `PrngError::RangeKind` for a subnormal `p`, whose Gamma scale
    ///   `(1 - p) / p` overflows to infinity
    pub fn new(config: Config) -> Result<Self, PrngError> {
        let (params, options) = config.into_parts();
        if let Some((r, p)) = params {
            validate(r, p)?;
        }
        match options.prng_value() {
            Some(prng) => Self::external(params, UniformSource::External(prng.clone())),
            None => Self::managed(params, &options),
        }
    }

    /// Bound generator with default options.
    ///
    /// # Errors
    ///
    /// Returns the [`validate`] failure for invalid `r` or `p`.
    pub fn bound(r: f64, p: f64) -> Result<Self, PrngError> {
        Self::new(Config::bound(r, p))
    }

    /// Builds a generator from untyped positional arguments; see
    /// [`Config::from_json_args`].
    ///
    /// # Errors
    ///
    /// Returns `TypeKind` failures for malformed arguments, plus everything
    /// [`NegativeBinomial::new`] can return.
    pub fn from_json_args(args: &[Value]) -> Result<Self, PrngError> {
        Self::new(Config::from_json_args(args)?)
    }

    /// Revives a serialised generator, continuing from the recorded state.
    ///
    /// The revived generator copies the recorded words and is bound iff the
    /// record has parameters.
    ///
    /// # Errors
    ///
    /// Returns `PrngError::TypeKind` if the record type, name, state array
    /// type or parameter count is wrong, plus everything
    /// [`NegativeBinomial::new`] can return.
    pub fn from_json(record: &GeneratorJson) -> Result<Self, PrngError> {
        if record.record_type != RECORD_TYPE || record.name != Self::NAME {
            return Err(PrngError::type_kind(format!(
                "invalid argument. Must provide a serialised `{}` generator. Value: `{} {}`.",
                Self::NAME,
                record.record_type,
                record.name
            )));
        }
        let words = record.state.clone().into_words()?;
        let options = Options::new().state(words);
        let config = match record.params.as_slice() {
            [] => Config::UnboundWithOptions(options),
            [r, p] => Config::bound(*r, *p).with_options(options),
            other => {
                return Err(PrngError::type_kind(format!(
                    "invalid argument. Parameters must be empty or `[r, p]`. Value: `{:?}`.",
                    other
                )))
            }
        };
        Self::new(config)
    }

    fn external(params: Option<(f64, f64)>, source: UniformSource) -> Result<Self, PrngError> {
        let poisson = PoissonSampler::unbound(source.clone());
        let gamma = gamma_sampler(params, source)?;
        tracing::debug!(bound = params.is_some(), "negative binomial generator using external prng");
        Ok(Self {
            gamma,
            poisson,
            params,
            copy_on_state_mutation: true,
        })
    }

    fn managed(params: Option<(f64, f64)>, options: &Options) -> Result<Self, PrngError> {
        let copy = options.copies_state();
        let supplied = options
            .state_value()
            .map(|state| if copy { state.deep_copy() } else { state.clone() });
        let engine = match &supplied {
            Some(state) => Mt19937::from_state(state.clone())?,
            None => Mt19937::new(options.seed_value().cloned())?,
        };
        let poisson = PoissonSampler::unbound(UniformSource::Managed(engine.clone()));

        // Poisson holds the authoritative buffer; when no state was supplied,
        // read it back and reassign so the shared reference is explicit.
        let state = match supplied {
            Some(state) => state,
            None => {
                let state = engine.state_handle();
                poisson.set_state(state.clone())?;
                state
            }
        };
        debug_assert!(engine.state_handle().ptr_eq(&state));

        let gamma = gamma_sampler(params, UniformSource::Managed(engine))?;
        tracing::debug!(
            bound = params.is_some(),
            copy,
            state_length = state.len(),
            "negative binomial generator using managed state"
        );
        Ok(Self {
            gamma,
            poisson,
            params,
            copy_on_state_mutation: copy,
        })
    }

    /// Draws with the bound parameters. NaN on an unbound generator.
    pub fn sample(&mut self) -> f64 {
        if self.params.is_none() {
            return f64::NAN;
        }
        let lambda = self.gamma.sample();
        self.poisson.sample_with(lambda)
    }

    /// Draws NegativeBinomial(`r`, `p`).
    ///
    /// Never fails: returns NaN if `r` or `p` is NaN or `p` is outside
    /// `(0, 1)`. Invalid `r` otherwise propagates as NaN from the Gamma
    /// draw, as does a subnormal `p` (the Gamma scale overflows). The
    /// parameters apply to this draw only, also on a bound generator.
    pub fn sample_with(&mut self, r: f64, p: f64) -> f64 {
        if r.is_nan() || p.is_nan() || p <= 0.0 || p >= 1.0 {
            return f64::NAN;
        }
        let lambda = self.gamma.sample_with(r, p / (1.0 - p));
        self.poisson.sample_with(lambda)
    }

    /// Draws `n` values with the bound parameters.
    pub fn samples(&mut self, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.sample()).collect()
    }

    /// Fills `buffer` with draws using the bound parameters.
    pub fn fill(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = self.sample();
        }
    }

    /// Bound parameters, if any.
    pub fn params(&self) -> Option<(f64, f64)> {
        self.params
    }

    /// Generator name.
    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// The underlying uniform source.
    pub fn prng(&self) -> &UniformSource {
        self.poisson.source()
    }

    /// Returns `true` if randomness comes from a caller closure.
    pub fn is_external(&self) -> bool {
        self.prng().is_external()
    }

    /// Whether supplied and assigned state arrays are copied.
    pub fn copies_state(&self) -> bool {
        self.copy_on_state_mutation
    }

    /// Engine seed words. `None` in external mode.
    pub fn seed(&self) -> Option<Vec<u32>> {
        self.poisson.seed()
    }

    /// Engine seed length. `None` in external mode.
    pub fn seed_length(&self) -> Option<usize> {
        self.poisson.seed_length()
    }

    /// Current engine state words. `None` in external mode.
    pub fn state(&self) -> Option<Vec<u32>> {
        self.poisson.state()
    }

    /// Replaces the engine state.
    ///
    /// The state is copied unless the generator was built with
    /// `copy: false`, in which case a [`SharedState`] handle is aliased.
    /// Both samplers observe the new state. Does nothing in external mode.
    ///
    /// # Errors
    ///
    /// Returns `PrngError::RangeKind` if the engine rejects the layout; the
    /// current state is kept.
    pub fn set_state(&self, state: impl Into<SharedState>) -> Result<(), PrngError> {
        if self.is_external() {
            return Ok(());
        }
        let state = state.into();
        let state = if self.copy_on_state_mutation {
            state.deep_copy()
        } else {
            state
        };
        tracing::debug!(state_length = state.len(), "setting negative binomial generator state");
        self.poisson.set_state(state)
    }

    /// Replaces the engine state from an untyped word array.
    ///
    /// # Errors
    ///
    /// Returns `PrngError::TypeKind` if `value` is not a `u32` array or
    /// typed-array record, plus everything [`NegativeBinomial::set_state`]
    /// can return.
    pub fn set_state_value(&self, value: &Value) -> Result<(), PrngError> {
        if self.is_external() {
            return Ok(());
        }
        let words = nbinom_core::words_from_value(value, "state")?;
        self.set_state(words)
    }

    /// Engine state length in words. `None` in external mode.
    pub fn state_length(&self) -> Option<usize> {
        self.poisson.state_length()
    }

    /// Engine state size in bytes. `None` in external mode.
    pub fn byte_length(&self) -> Option<usize> {
        self.poisson.byte_length()
    }

    /// Serialises the generator. `None` in external mode.
    pub fn to_json(&self) -> Option<GeneratorJson> {
        let engine = self.poisson.engine()?;
        Some(GeneratorJson {
            record_type: RECORD_TYPE.to_string(),
            name: Self::NAME.to_string(),
            state: engine.to_json(),
            params: self.params.map_or_else(Vec::new, |(r, p)| vec![r, p]),
        })
    }

    #[cfg(test)]
    pub(crate) fn samplers_share_state(&self) -> bool {
        match (self.gamma.source().engine(), self.poisson.engine()) {
            (Some(g), Some(p)) => g.shares_state_with(p),
            _ => false,
        }
    }
}

impl Default for NegativeBinomial {
    /// Unbound generator over a freshly seeded engine.
    fn default() -> Self {
        let engine = Mt19937::from_entropy();
        Self {
            gamma: GammaSampler::unbound(UniformSource::Managed(engine.clone())),
            poisson: PoissonSampler::unbound(UniformSource::Managed(engine)),
            params: None,
            copy_on_state_mutation: true,
        }
    }
}

/// Builds the Gamma sampler with rate `p / (1 - p)` when bound.
fn gamma_sampler(
    params: Option<(f64, f64)>,
    source: UniformSource,
) -> Result<GammaSampler, PrngError> {
    match params {
        Some((r, p)) => GammaSampler::new(r, p / (1.0 - p), source),
        None => Ok(GammaSampler::unbound(source)),
    }
}
