//! Seeded hash families.
//!
//! Every repetition of a sketch hashes items with its own member of a hash family,
//! addressed by the repetition index used as a seed. Any 32 or 64-bit non-cryptographic
//! hash can be plugged in by implementing [`HashFamily`].

use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use wyhash::WyHash;

/// A family of deterministic hash functions, one per seed.
pub trait HashFamily {
    /// Hash `item` with the family member selected by `seed`.
    fn hash<T: Hash + ?Sized>(&self, item: &T, seed: u64) -> u64;
}

/// Default hash family backed by `wyhash`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WyHashFamily {
    base: u64,
}

impl WyHashFamily {
    /// Creates a family whose members are keyed by `base ^ seed`.
    ///
    /// Families with different bases behave as independent families, which is
    /// handy for running repeated trials over the same stream.
    pub fn with_base(base: u64) -> Self {
        Self { base }
    }
}

impl HashFamily for WyHashFamily {
    #[inline]
    fn hash<T: Hash + ?Sized>(&self, item: &T, seed: u64) -> u64 {
        let mut hasher = WyHash::with_seed(self.base ^ seed);
        item.hash(&mut hasher);
        hasher.finish()
    }
}

/// Turns any default-constructible [`Hasher`] into a hash family by feeding the
/// seed ahead of the item.
pub struct SeededHasherFamily<H: Hasher + Default> {
    _hasher: PhantomData<fn() -> H>,
}

impl<H: Hasher + Default> SeededHasherFamily<H> {
    pub fn new() -> Self {
        Self {
            _hasher: PhantomData,
        }
    }
}

impl<H: Hasher + Default> Default for SeededHasherFamily<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Hasher + Default> Clone for SeededHasherFamily<H> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<H: Hasher + Default> HashFamily for SeededHasherFamily<H> {
    #[inline]
    fn hash<T: Hash + ?Sized>(&self, item: &T, seed: u64) -> u64 {
        let mut hasher = H::default();
        hasher.write_u64(seed);
        item.hash(&mut hasher);
        hasher.finish()
    }
}

/// Keep the low `width` bits of `h`.
#[inline]
pub(crate) fn truncate(h: u64, width: usize) -> u64 {
    if width >= 64 {
        h
    } else {
        h & ((1u64 << width) - 1)
    }
}

/// Zero-based position of the least significant 1-bit of `h`,
/// or the sentinel `width` when `h == 0`.
#[inline]
pub fn least_sig_1bit(h: u64, width: usize) -> usize {
    if h == 0 {
        width
    } else {
        h.trailing_zeros() as usize
    }
}
