//! Default generator and the top-level sampling function.
//!
//! The default generator is unbound, uses default options, and is created
//! lazily on first use. Its state is `Rc`-based, so there is one default
//! per thread, living until the thread exits.

use std::cell::RefCell;

use nbinom_core::PrngError;

use crate::generator::NegativeBinomial;
use crate::validate::validate;

thread_local! {
    static DEFAULT: RefCell<Option<NegativeBinomial>> = const { RefCell::new(None) };
}

/// Runs `f` with the default generator, creating it on first use.
///
/// # Panics
///
/// Panics if `f` re-enters `with_default`.
///
/// # Examples
///
/// ```rust
/// use nbinom_sampler::with_default;
///
/// let state = with_default(|rng| rng.state()).unwrap();
/// assert_eq!(with_default(|rng| rng.state_length()), Some(state.len()));
/// ```
pub fn with_default<R>(f: impl FnOnce(&mut NegativeBinomial) -> R) -> R {
    DEFAULT.with(|cell| {
        let mut slot = cell.borrow_mut();
        let rng = slot.get_or_insert_with(NegativeBinomial::default);
        f(rng)
    })
}

/// Swaps in `rng` as this thread's default generator, returning the
/// previous one if it had been created.
pub fn replace_default(rng: NegativeBinomial) -> Option<NegativeBinomial> {
    DEFAULT.with(|cell| cell.borrow_mut().replace(rng))
}

/// Draws NegativeBinomial(`r`, `p`) from the default generator.
///
/// The default generator is per thread, not per process: each thread gets
/// its own independently seeded default on first use, and draws on one
/// thread never advance another thread's state.
///
/// # Errors
///
/// Returns the [`validate`] failure for invalid `r` or `p`; no randomness is
/// consumed in that case.
///
/// # Examples
///
/// ```rust
/// use nbinom_sampler::negative_binomial;
///
/// let v = negative_binomial(10.0, 0.5).unwrap();
/// assert!(v >= 0.0 && v.fract() == 0.0);
/// assert!(negative_binomial(10.0, 1.5).is_err());
/// ```
pub fn negative_binomial(r: f64, p: f64) -> Result<f64, PrngError> {
    validate(r, p)?;
    Ok(with_default(|rng| rng.sample_with(r, p)))
}
