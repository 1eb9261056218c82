//! # nbinom_sampler (Layer 2: Samplers)
//!
//! Negative binomial pseudorandom numbers as a Gamma-Poisson mixture:
//! a draw is `Poisson(Gamma(r, p / (1 - p)))` with the Gamma variate in its
//! shape/rate form.
//!
//! ## Module Structure
//!
//! - [`validate`](mod@validate): strict `(r, p)` checks
//! - [`gamma`], [`poisson`]: samplers over a [`nbinom_core::UniformSource`]
//! - [`options`]: [`Options`] and the tagged [`Config`]
//! - [`generator`]: [`NegativeBinomial`], state accessors and JSON records
//! - [`default`](mod@default): the lazily created default generator and
//!   [`negative_binomial`]
//!
//! ## Usage Example
//!
//! ```rust
//! use nbinom_sampler::{negative_binomial, Config, NegativeBinomial, Options};
//!
//! // One-shot draw from the default generator
//! let v = negative_binomial(10.0, 0.5).unwrap();
//! assert!(v >= 0.0);
//!
//! // Reproducible generator with bound parameters
//! let mut rng = NegativeBinomial::new(
//!     Config::bound(10.0, 0.5).with_options(Options::new().seed(297)),
//! ).unwrap();
//! let record = rng.to_json().unwrap();
//! let expected = rng.samples(10);
//!
//! let mut revived = NegativeBinomial::from_json(&record).unwrap();
//! assert_eq!(revived.samples(10), expected);
//! ```

pub mod default;
pub mod gamma;
pub mod generator;
pub mod options;
pub mod poisson;
pub mod validate;

pub use default::{negative_binomial, replace_default, with_default};
pub use gamma::GammaSampler;
pub use generator::{GeneratorJson, NegativeBinomial, RECORD_TYPE};
pub use options::{Config, Options};
pub use poisson::PoissonSampler;
pub use validate::{validate, validate_value};
