//! # nbinom_core (Layer 1: Foundation)
//!
//! Uniform randomness and state plumbing for the negative binomial
//! generator in `nbinom_sampler`:
//!
//! - [`Mt19937`]: Mersenne Twister engine whose entire state is a `u32` word
//!   buffer, so it can be snapshotted, restored and shared
//! - [`SharedState`]: reference-counted handle to that buffer
//! - [`ExternalPrng`] and [`UniformSource`]: managed engine or caller closure,
//!   both usable as a `rand::RngCore`
//! - [`PrngError`]: the two-kind error taxonomy (type, range)
//!
//! ## Usage Example
//!
//! ```rust
//! use nbinom_core::{Mt19937, Seed, SharedState};
//!
//! let mt = Mt19937::from_seed(Seed::Scalar(297)).unwrap();
//! let checkpoint = mt.state();
//! let a = mt.uniform();
//!
//! mt.set_state(SharedState::from(checkpoint)).unwrap();
//! assert_eq!(mt.uniform(), a);
//! ```
//!
//! ## Threading
//!
//! Every handle here is `Rc`-based. Generators are meant for sequential use
//! on one thread; concurrent use of one generator is not supported.

pub mod error;
pub mod mt19937;
pub mod source;
pub mod state;

pub use error::{ErrorKind, PrngError};
pub use mt19937::{Mt19937, Seed};
pub use source::{ExternalPrng, UniformSource};
pub use state::{words_from_value, SharedState, TypedArrayJson, UINT32_ARRAY};
