//! Uniform randomness sources consumed by the samplers.
//!
//! A [`UniformSource`] is either the managed [`Mt19937`] engine, whose state
//! the generator owns and exposes, or an [`ExternalPrng`] closure supplied by
//! the caller, whose state is opaque. Both implement [`rand::RngCore`] so the
//! `rand_distr` samplers draw from either without knowing which.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rand::RngCore;

use crate::mt19937::Mt19937;

/// `2^32`
const TWO_32: f64 = 4_294_967_296.0;

/// Caller-supplied uniform generator on `[0, 1)`.
///
/// Cloning shares the closure, so a Gamma and a Poisson sampler built from
/// clones consume one stream.
///
/// # Examples
///
/// ```rust
/// use nbinom_core::ExternalPrng;
///
/// let mut x = 0.0;
/// let prng = ExternalPrng::new(move || {
///     x = (x + 0.25) % 1.0;
///     x
/// });
/// let alias = prng.clone();
/// assert_eq!(prng.draw(), 0.25);
/// assert_eq!(alias.draw(), 0.5);
/// ```
#[derive(Clone)]
pub struct ExternalPrng {
    inner: Rc<RefCell<dyn FnMut() -> f64>>,
}

impl ExternalPrng {
    /// Wraps a uniform generator closure.
    pub fn new(f: impl FnMut() -> f64 + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(f)),
        }
    }

    /// Draws the next value.
    pub fn draw(&self) -> f64 {
        let mut f = self.inner.borrow_mut();
        (*f)()
    }

    /// Returns `true` if both wrap the same closure.
    pub fn ptr_eq(&self, other: &ExternalPrng) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ExternalPrng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ExternalPrng")
    }
}

/// Uniform randomness for a sampler.
#[derive(Clone, Debug)]
pub enum UniformSource {
    /// Engine whose state the generator owns.
    Managed(Mt19937),
    /// Caller-supplied closure; state is not observable.
    External(ExternalPrng),
}

impl UniformSource {
    /// Draws a uniform value on `[0, 1)`.
    pub fn uniform(&self) -> f64 {
        match self {
            UniformSource::Managed(mt) => mt.uniform(),
            UniformSource::External(prng) => prng.draw(),
        }
    }

    /// Returns the managed engine, if any.
    pub fn engine(&self) -> Option<&Mt19937> {
        match self {
            UniformSource::Managed(mt) => Some(mt),
            UniformSource::External(_) => None,
        }
    }

    /// Returns `true` for a caller-supplied closure.
    pub fn is_external(&self) -> bool {
        matches!(self, UniformSource::External(_))
    }
}

impl From<Mt19937> for UniformSource {
    fn from(mt: Mt19937) -> Self {
        UniformSource::Managed(mt)
    }
}

impl From<ExternalPrng> for UniformSource {
    fn from(prng: ExternalPrng) -> Self {
        UniformSource::External(prng)
    }
}

/// Maps a uniform on `[0, 1)` to a full 32-bit word.
#[inline]
fn unit_to_u32(u: f64) -> u32 {
    (u.clamp(0.0, 1.0) * TWO_32) as u32
}

impl RngCore for UniformSource {
    fn next_u32(&mut self) -> u32 {
        match self {
            UniformSource::Managed(mt) => mt.next_u32(),
            UniformSource::External(prng) => unit_to_u32(prng.draw()),
        }
    }

    fn next_u64(&mut self) -> u64 {
        match self {
            UniformSource::Managed(mt) => {
                let lo = u64::from(mt.next_u32());
                let hi = u64::from(mt.next_u32());
                (hi << 32) | lo
            }
            // Two draws: the ziggurat samplers index layers by the low bits.
            UniformSource::External(prng) => {
                let hi = u64::from(unit_to_u32(prng.draw()));
                let lo = u64::from(unit_to_u32(prng.draw()));
                (hi << 32) | lo
            }
        }
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
