//! Generator construction configuration.
//!
//! [`Config`] fixes, once, whether parameters are bound and which options
//! apply. [`Options`] selects the randomness source: an external closure
//! (`prng`) or a managed engine initialised from `state` or `seed`.
//! [`Config::from_json_args`] accepts untyped arguments and applies the same
//! decision table, reporting shape errors as `TypeKind` failures.

use nbinom_core::{words_from_value, ExternalPrng, PrngError, Seed, SharedState};
use serde_json::{Map, Value};

use crate::validate::validate_value;

/// Generator options.
///
/// # Examples
///
/// ```rust
/// use nbinom_sampler::Options;
///
/// let options = Options::new().seed(297).copy(false);
/// assert!(!options.copies_state());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Options {
    copy: Option<bool>,
    seed: Option<Seed>,
    state: Option<SharedState>,
    prng: Option<ExternalPrng>,
}

impl Options {
    /// Creates empty options (copy on, fresh random seed).
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether supplied and assigned state arrays are copied (default
    /// `true`). With `false` they are aliased.
    pub fn copy(mut self, copy: bool) -> Self {
        self.copy = Some(copy);
        self
    }

    /// Seeds the managed engine. Ignored when `state` or `prng` is set.
    pub fn seed(mut self, seed: impl Into<Seed>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    /// Initial managed engine state.
    pub fn state(mut self, state: impl Into<SharedState>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Delegates uniform randomness to a caller closure, disabling state
    /// introspection.
    pub fn prng(mut self, prng: ExternalPrng) -> Self {
        self.prng = Some(prng);
        self
    }

    /// Resolved copy flag.
    pub fn copies_state(&self) -> bool {
        self.copy.unwrap_or(true)
    }

    pub(crate) fn seed_value(&self) -> Option<&Seed> {
        self.seed.as_ref()
    }

    pub(crate) fn state_value(&self) -> Option<&SharedState> {
        self.state.as_ref()
    }

    pub(crate) fn prng_value(&self) -> Option<&ExternalPrng> {
        self.prng.as_ref()
    }

    /// Parses an untyped options object.
    ///
    /// # Errors
    ///
    /// Returns `PrngError::TypeKind` if the value is not an object, `copy`
    /// is not a boolean, `prng` is present (a closure cannot be expressed in
    /// JSON), or `state`/`seed` are not `u32` word arrays.
    pub fn from_json(value: &Value) -> Result<Self, PrngError> {
        let map = value.as_object().ok_or_else(|| {
            PrngError::type_kind(format!(
                "invalid argument. Options argument must be an object. Value: `{}`.",
                value
            ))
        })?;
        let mut options = Options::new();
        if let Some(copy) = map.get("copy") {
            let copy = copy.as_bool().ok_or_else(|| {
                PrngError::type_kind(format!(
                    "invalid option. `copy` option must be a boolean. Option: `{}`.",
                    copy
                ))
            })?;
            options = options.copy(copy);
        }
        if let Some(prng) = map.get("prng") {
            return Err(PrngError::type_kind(format!(
                "invalid option. `prng` option must be a pseudorandom number generator function. Option: `{}`.",
                prng
            )));
        }
        if let Some(state) = map.get("state") {
            options = options.state(words_from_value(state, "state")?);
        }
        if let Some(seed) = parse_seed(map)? {
            options = options.seed(seed);
        }
        Ok(options)
    }
}

fn parse_seed(map: &Map<String, Value>) -> Result<Option<Seed>, PrngError> {
    let Some(seed) = map.get("seed") else {
        return Ok(None);
    };
    if let Some(word) = seed.as_u64().and_then(|w| u32::try_from(w).ok()) {
        return Ok(Some(Seed::Scalar(word)));
    }
    if seed.is_array() {
        return words_from_value(seed, "seed").map(|w| Some(Seed::Words(w)));
    }
    Err(PrngError::type_kind(format!(
        "invalid option. `seed` option must be a 32-bit unsigned integer or an array of them. Option: `{}`.",
        seed
    )))
}

/// Construction configuration, resolved once.
///
/// # Examples
///
/// ```rust
/// use nbinom_sampler::{Config, Options};
///
/// let unbound = Config::Unbound;
/// let bound = Config::bound(10.0, 0.5).with_options(Options::new().seed(297));
/// assert_eq!(bound.params(), Some((10.0, 0.5)));
/// assert_eq!(unbound.params(), None);
/// ```
#[derive(Clone, Debug, Default)]
pub enum Config {
    /// Parameters per call, default options.
    #[default]
    Unbound,
    /// Parameters per call.
    UnboundWithOptions(Options),
    /// Parameters bound at construction, default options.
    Bound {
        /// Number of successes.
        r: f64,
        /// Success probability.
        p: f64,
    },
    /// Parameters bound at construction.
    BoundWithOptions {
        /// Number of successes.
        r: f64,
        /// Success probability.
        p: f64,
        /// Options.
        options: Options,
    },
}

impl Config {
    /// Bound configuration with default options.
    pub fn bound(r: f64, p: f64) -> Self {
        Config::Bound { r, p }
    }

    /// Attaches options, keeping the bound/unbound choice.
    pub fn with_options(self, options: Options) -> Self {
        match self {
            Config::Unbound | Config::UnboundWithOptions(_) => Config::UnboundWithOptions(options),
            Config::Bound { r, p } | Config::BoundWithOptions { r, p, .. } => {
                Config::BoundWithOptions { r, p, options }
            }
        }
    }

    /// Bound parameters, if any.
    pub fn params(&self) -> Option<(f64, f64)> {
        match self {
            Config::Bound { r, p } | Config::BoundWithOptions { r, p, .. } => Some((*r, *p)),
            _ => None,
        }
    }

    /// Splits into bound parameters and options.
    pub fn into_parts(self) -> (Option<(f64, f64)>, Options) {
        match self {
            Config::Unbound => (None, Options::default()),
            Config::UnboundWithOptions(options) => (None, options),
            Config::Bound { r, p } => (Some((r, p)), Options::default()),
            Config::BoundWithOptions { r, p, options } => (Some((r, p)), options),
        }
    }

    /// Builds a configuration from untyped positional arguments.
    ///
    /// | Arguments | Result |
    /// |---|---|
    /// | none | `Unbound` |
    /// | `[options]` | `UnboundWithOptions` |
    /// | `[r, p]` | `Bound` |
    /// | `[r, p, options, ...]` | `BoundWithOptions`, extra arguments ignored |
    ///
    /// # Errors
    ///
    /// `r`/`p` failures as reported by [`crate::validate`] (checked before
    /// options); option shape failures as reported by [`Options::from_json`].
    pub fn from_json_args(args: &[Value]) -> Result<Self, PrngError> {
        match args {
            [] => Ok(Config::Unbound),
            [options] => Ok(Config::UnboundWithOptions(Options::from_json(options)?)),
            [r, p] => {
                let (r, p) = validate_value(r, p)?;
                Ok(Config::Bound { r, p })
            }
            [r, p, options, ..] => {
                let (r, p) = validate_value(r, p)?;
                Ok(Config::BoundWithOptions {
                    r,
                    p,
                    options: Options::from_json(options)?,
                })
            }
        }
    }
}
