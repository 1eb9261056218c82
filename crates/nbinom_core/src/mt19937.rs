//! 32-bit Mersenne Twister over a [`SharedState`] word buffer.
//!
//! The whole engine lives in the word buffer, laid out as
//!
//! ```text
//! [ version, sections, 624, mt[0..624], 1, index, seed_len, seed[0..seed_len] ]
//! ```
//!
//! so a snapshot of the words is a complete, replayable checkpoint and two
//! engines pointed at the same buffer advance one sequence.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::PrngError;
use crate::state::{SharedState, TypedArrayJson};

/// Degree of recurrence.
const N: usize = 624;
/// Middle word offset.
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_b0df;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7fff_ffff;

/// State layout version.
const STATE_VERSION: u32 = 1;
const NUM_STATE_SECTIONS: u32 = 3;
/// Index of the first Mersenne Twister word.
const MT_OFFSET: usize = 3;
/// Index of the "other" section length word.
const OTHER_LEN_INDEX: usize = MT_OFFSET + N;
/// Index of the output position word.
const POS_INDEX: usize = OTHER_LEN_INDEX + 1;
/// Index of the seed section length word.
const SEED_LEN_INDEX: usize = POS_INDEX + 1;
/// Index of the first seed word.
const SEED_OFFSET: usize = SEED_LEN_INDEX + 1;

/// `2^26`
const TWO_26: f64 = 67_108_864.0;
/// `2^53`
const TWO_53: f64 = 9_007_199_254_740_992.0;

/// Engine seed: a single word or a word array.
///
/// A single word seeds through `init_genrand`; an array through
/// `init_by_array`, matching the reference MT19937 initialisers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seed {
    /// Single 32-bit seed.
    Scalar(u32),
    /// Seed key of one or more words.
    Words(Vec<u32>),
}

impl Seed {
    /// Seed words as stored in the state's seed section.
    pub fn words(&self) -> Vec<u32> {
        match self {
            Seed::Scalar(s) => vec![*s],
            Seed::Words(w) => w.clone(),
        }
    }
}

impl From<u32> for Seed {
    fn from(seed: u32) -> Self {
        Seed::Scalar(seed)
    }
}

impl From<Vec<u32>> for Seed {
    fn from(words: Vec<u32>) -> Self {
        Seed::Words(words)
    }
}

impl From<&[u32]> for Seed {
    fn from(words: &[u32]) -> Self {
        Seed::Words(words.to_vec())
    }
}

/// Mersenne Twister uniform engine.
///
/// Cloning an `Mt19937` yields a second handle to the *same* engine: both
/// handles draw from, and replace, one state. Use [`Mt19937::from_state`]
/// with a deep-copied [`SharedState`] for an independent engine.
///
/// # Examples
///
/// ```rust
/// use nbinom_core::{Mt19937, Seed};
///
/// let mt = Mt19937::from_seed(Seed::Scalar(5489)).unwrap();
/// assert_eq!(mt.next_u32(), 3_499_211_612);
///
/// let u = mt.uniform();
/// assert!((0.0..1.0).contains(&u));
/// ```
#[derive(Clone)]
pub struct Mt19937 {
    /// Current state buffer; replaced wholesale by `set_state`.
    cell: Rc<RefCell<SharedState>>,
}

impl Mt19937 {
    /// Engine name.
    pub const NAME: &'static str = "mt19937";

    /// Creates an engine from an optional seed, drawing a random seed word
    /// from the thread RNG when none is given.
    ///
    /// # Errors
    ///
    /// Returns `PrngError::RangeKind` for an empty seed array.
    pub fn new(seed: Option<Seed>) -> Result<Self, PrngError> {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Ok(Self::from_entropy()),
        }
    }

    /// Creates an engine seeded with a random word from the thread RNG.
    pub fn from_entropy() -> Self {
        Self::seeded(&Seed::Scalar(rand::thread_rng().gen()))
    }

    /// Creates an engine from `seed`.
    ///
    /// # Errors
    ///
    /// Returns `PrngError::RangeKind` for an empty seed array.
    pub fn from_seed(seed: Seed) -> Result<Self, PrngError> {
        if matches!(&seed, Seed::Words(key) if key.is_empty()) {
            return Err(PrngError::range_kind(
                "invalid option. `seed` option must have at least one element. Option: `[]`.",
            ));
        }
        Ok(Self::seeded(&seed))
    }

    /// Seeds a fresh buffer. `seed` must hold at least one word.
    fn seeded(seed: &Seed) -> Self {
        let words = seed.words();
        let mut mt = [0u32; N];
        match seed {
            Seed::Scalar(s) => init_genrand(&mut mt, *s),
            Seed::Words(key) => init_by_array(&mut mt, key),
        }
        tracing::trace!(seed_len = words.len(), "seeded mt19937");
        Self::wrap(SharedState::from(build_state(&mt, N as u32, &words)))
    }

    /// Creates an engine that uses `state` as its buffer without copying.
    ///
    /// # Errors
    ///
    /// Returns `PrngError::RangeKind` if the buffer layout is invalid.
    pub fn from_state(state: SharedState) -> Result<Self, PrngError> {
        state.with(validate_state)?;
        Ok(Self::wrap(state))
    }

    fn wrap(state: SharedState) -> Self {
        Self {
            cell: Rc::new(RefCell::new(state)),
        }
    }

    /// Returns the seed words.
    pub fn seed(&self) -> Vec<u32> {
        self.cell
            .borrow()
            .with(|w| w[SEED_OFFSET..].to_vec())
    }

    /// Number of seed words.
    pub fn seed_length(&self) -> usize {
        self.cell.borrow().with(|w| w[SEED_LEN_INDEX] as usize)
    }

    /// Returns a copy of the state words.
    pub fn state(&self) -> Vec<u32> {
        self.cell.borrow().to_vec()
    }

    /// Returns a handle aliasing the current state buffer.
    pub fn state_handle(&self) -> SharedState {
        self.cell.borrow().clone()
    }

    /// Points the engine at `state` without copying.
    ///
    /// Every clone of this engine observes the new buffer.
    ///
    /// # Errors
    ///
    /// Returns `PrngError::RangeKind` if the buffer layout is invalid; the
    /// engine state is left untouched.
    pub fn set_state(&self, state: SharedState) -> Result<(), PrngError> {
        state.with(validate_state)?;
        *self.cell.borrow_mut() = state;
        Ok(())
    }

    /// Number of state words.
    pub fn state_length(&self) -> usize {
        self.cell.borrow().len()
    }

    /// State size in bytes.
    pub fn byte_length(&self) -> usize {
        self.state_length() * std::mem::size_of::<u32>()
    }

    /// Returns `true` if both engines currently draw from the same buffer.
    pub fn shares_state_with(&self, other: &Mt19937) -> bool {
        self.cell.borrow().ptr_eq(&other.cell.borrow())
    }

    /// Draws the next tempered 32-bit word.
    pub fn next_u32(&self) -> u32 {
        self.cell.borrow().with_mut(|w| {
            let mut pos = w[POS_INDEX] as usize;
            if pos >= N {
                twist(&mut w[MT_OFFSET..MT_OFFSET + N]);
                pos = 0;
            }
            let y = w[MT_OFFSET + pos];
            w[POS_INDEX] = (pos + 1) as u32;
            temper(y)
        })
    }

    /// Draws a uniform value on `[0, 1)` with 53-bit resolution.
    pub fn uniform(&self) -> f64 {
        let a = (self.next_u32() >> 5) as f64;
        let b = (self.next_u32() >> 6) as f64;
        (a * TWO_26 + b) / TWO_53
    }

    /// Serialises the state as a typed-array record.
    pub fn to_json(&self) -> TypedArrayJson {
        self.cell.borrow().to_json()
    }
}

impl fmt::Debug for Mt19937 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mt19937")
            .field("state_length", &self.state_length())
            .field("seed_length", &self.seed_length())
            .finish()
    }
}

fn init_genrand(mt: &mut [u32; N], seed: u32) {
    mt[0] = seed;
    for i in 1..N {
        let prev = mt[i - 1];
        mt[i] = 1_812_433_253u32
            .wrapping_mul(prev ^ (prev >> 30))
            .wrapping_add(i as u32);
    }
}

fn init_by_array(mt: &mut [u32; N], key: &[u32]) {
    init_genrand(mt, 19_650_218);
    let mut i = 1usize;
    let mut j = 0usize;
    for _ in 0..N.max(key.len()) {
        let prev = mt[i - 1];
        mt[i] = (mt[i] ^ (prev ^ (prev >> 30)).wrapping_mul(1_664_525))
            .wrapping_add(key[j])
            .wrapping_add(j as u32);
        i += 1;
        j += 1;
        if i >= N {
            mt[0] = mt[N - 1];
            i = 1;
        }
        if j >= key.len() {
            j = 0;
        }
    }
    for _ in 0..N - 1 {
        let prev = mt[i - 1];
        mt[i] = (mt[i] ^ (prev ^ (prev >> 30)).wrapping_mul(1_566_083_941))
            .wrapping_sub(i as u32);
        i += 1;
        if i >= N {
            mt[0] = mt[N - 1];
            i = 1;
        }
    }
    mt[0] = UPPER_MASK;
}

fn twist(mt: &mut [u32]) {
    for k in 0..N {
        let y = (mt[k] & UPPER_MASK) | (mt[(k + 1) % N] & LOWER_MASK);
        let mag = if y & 1 == 0 { 0 } else { MATRIX_A };
        mt[k] = mt[(k + M) % N] ^ (y >> 1) ^ mag;
    }
}

#[inline]
fn temper(mut y: u32) -> u32 {
    y ^= y >> 11;
    y ^= (y << 7) & 0x9d2c_5680;
    y ^= (y << 15) & 0xefc6_0000;
    y ^ (y >> 18)
}

fn build_state(mt: &[u32; N], pos: u32, seed: &[u32]) -> Vec<u32> {
    let mut words = Vec::with_capacity(SEED_OFFSET + seed.len());
    words.extend_from_slice(&[STATE_VERSION, NUM_STATE_SECTIONS, N as u32]);
    words.extend_from_slice(mt);
    words.extend_from_slice(&[1, pos, seed.len() as u32]);
    words.extend_from_slice(seed);
    words
}

/// Checks that `words` is a complete state record for this engine.
fn validate_state(words: &[u32]) -> Result<(), PrngError> {
    let invalid = |reason: &str| {
        Err(PrngError::range_kind(format!(
            "invalid argument. Must provide a valid state. {}",
            reason
        )))
    };
    if words.len() < SEED_OFFSET + 1 {
        return invalid("State array is too short.");
    }
    if words[0] != STATE_VERSION {
        return invalid("Incompatible state version.");
    }
    if words[1] != NUM_STATE_SECTIONS {
        return invalid("Unexpected number of state sections.");
    }
    if words[2] as usize != N {
        return invalid("Unexpected state section length.");
    }
    if words[OTHER_LEN_INDEX] != 1 {
        return invalid("Unexpected section length.");
    }
    if words[POS_INDEX] as usize > N {
        return invalid("Output position out of range.");
    }
    if words[SEED_LEN_INDEX] as usize != words.len() - SEED_OFFSET {
        return invalid("Seed section length does not match state length.");
    }
    Ok(())
}
