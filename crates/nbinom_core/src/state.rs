//! Shared generator state.
//!
//! [`SharedState`] is a reference-counted handle to a fixed-length sequence
//! of `u32` words. Cloning the handle aliases the words: every clone observes
//! every mutation. The Gamma and Poisson samplers of a managed generator hold
//! the same handle, so a draw by either advances the one state both read.
//!
//! Single-threaded only. The handle is `!Send` and `!Sync`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::PrngError;

/// Element type tag written into serialised state records.
pub const UINT32_ARRAY: &str = "Uint32Array";

/// Reference-counted, aliasable `u32` word buffer.
///
/// The length is fixed at creation; mutation goes through [`SharedState::set`]
/// or [`SharedState::with_mut`], neither of which can resize the buffer.
///
/// # Examples
///
/// ```rust
/// use nbinom_core::SharedState;
///
/// let a = SharedState::from(vec![1, 2, 3]);
/// let b = a.clone();
/// b.set(0, 42);
/// assert_eq!(a.get(0), Some(42));
/// assert!(a.ptr_eq(&b));
///
/// let c = a.deep_copy();
/// c.set(0, 7);
/// assert_eq!(a.get(0), Some(42));
/// ```
#[derive(Clone, Default)]
pub struct SharedState {
    words: Rc<RefCell<Vec<u32>>>,
}

impl SharedState {
    /// Creates a handle owning a copy of `words`.
    pub fn from_slice(words: &[u32]) -> Self {
        Self::from(words.to_vec())
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.borrow().len()
    }

    /// Returns `true` if the buffer holds no words.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads a single word.
    pub fn get(&self, index: usize) -> Option<u32> {
        self.words.borrow().get(index).copied()
    }

    /// Overwrites a single word. Out-of-bounds writes are ignored.
    pub fn set(&self, index: usize, value: u32) {
        if let Some(word) = self.words.borrow_mut().get_mut(index) {
            *word = value;
        }
    }

    /// Copies the words out.
    pub fn to_vec(&self) -> Vec<u32> {
        self.words.borrow().clone()
    }

    /// Allocates an independent buffer with the same contents.
    pub fn deep_copy(&self) -> Self {
        Self::from(self.to_vec())
    }

    /// Returns `true` if both handles alias the same buffer.
    pub fn ptr_eq(&self, other: &SharedState) -> bool {
        Rc::ptr_eq(&self.words, &other.words)
    }

    /// Runs `f` with shared access to the words.
    pub fn with<R>(&self, f: impl FnOnce(&[u32]) -> R) -> R {
        f(&self.words.borrow())
    }

    /// Runs `f` with exclusive access to the words.
    ///
    /// # Panics
    ///
    /// Panics if called re-entrantly from inside another `with`/`with_mut`
    /// on an alias of the same buffer.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut [u32]) -> R) -> R {
        f(&mut self.words.borrow_mut())
    }

    /// Serialises the words as a typed-array record.
    pub fn to_json(&self) -> TypedArrayJson {
        TypedArrayJson::from_words(&self.words.borrow())
    }
}

impl From<Vec<u32>> for SharedState {
    fn from(words: Vec<u32>) -> Self {
        Self {
            words: Rc::new(RefCell::new(words)),
        }
    }
}

impl From<&[u32]> for SharedState {
    fn from(words: &[u32]) -> Self {
        Self::from_slice(words)
    }
}

impl From<&SharedState> for SharedState {
    fn from(state: &SharedState) -> Self {
        state.clone()
    }
}

impl PartialEq for SharedState {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.words.borrow() == *other.words.borrow()
    }
}

impl fmt::Debug for SharedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedState")
            .field("len", &self.len())
            .field("aliases", &Rc::strong_count(&self.words))
            .finish()
    }
}

/// Serialised form of a typed word array.
///
/// ```json
/// { "type": "Uint32Array", "data": [1, 3, 624, ...] }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedArrayJson {
    /// Element type tag, always [`UINT32_ARRAY`] when produced by this crate.
    #[serde(rename = "type")]
    pub array_type: String,
    /// Array elements.
    pub data: Vec<u32>,
}

impl TypedArrayJson {
    /// Builds a `Uint32Array` record from raw words.
    pub fn from_words(words: &[u32]) -> Self {
        Self {
            array_type: UINT32_ARRAY.to_string(),
            data: words.to_vec(),
        }
    }

    /// Recovers the words, checking the element type tag.
    ///
    /// # Errors
    ///
    /// Returns `PrngError::TypeKind` if the record is not a `Uint32Array`.
    pub fn into_words(self) -> Result<Vec<u32>, PrngError> {
        if self.array_type != UINT32_ARRAY {
            return Err(PrngError::type_kind(format!(
                "invalid argument. Must provide a {}. Value: `{}`.",
                UINT32_ARRAY, self.array_type
            )));
        }
        Ok(self.data)
    }
}

/// Parses a JSON value as a `u32` word array.
///
/// Accepts either a plain array of integers or a typed-array record.
///
/// # Errors
///
/// Returns `PrngError::TypeKind` naming `what` if the value is neither, or if
/// any element is not an integer in `[0, 2^32)`.
pub fn words_from_value(value: &serde_json::Value, what: &str) -> Result<Vec<u32>, PrngError> {
    let invalid = || {
        PrngError::type_kind(format!(
            "invalid option. `{}` option must be a {}. Option: `{}`.",
            what, UINT32_ARRAY, value
        ))
    };
    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(_) => {
            let record: TypedArrayJson =
                serde_json::from_value(value.clone()).map_err(|_| invalid())?;
            return record.into_words().map_err(|_| invalid());
        }
        _ => return Err(invalid()),
    };
    items
        .iter()
        .map(|item| {
            item.as_u64()
                .and_then(|w| u32::try_from(w).ok())
                .ok_or_else(invalid)
        })
        .collect()
}
