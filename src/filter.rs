//! Bloom filter membership over a compressed bit vector.
//!
//! Each filter owns one bit vector and shares the tree-wide hash pair.
//! Probe positions come from Kirsch-Mitzenmacher double hashing: two hash
//! values expand into `k` positions, so every filter in a tree probes the
//! same positions for the same item.
//!
//! A `true` answer is probabilistic (false positives possible); a `false`
//! answer is exact, provided the backing vector was built with the same
//! hash pair and hash count.

use std::path::Path;
use std::sync::Arc;

use crate::bitvec::BitVec;
use crate::error::{BrambleError, Result};
use crate::hashing::HashPair;

/// Probe positions for one item: `(base + i * step) mod m` for `i` in
/// `0..k`, with `base = h0 mod m` and `step = h1 mod m`.
///
/// Shared by the membership test and the filter builder so the two can
/// never disagree on positions.
#[inline]
pub(crate) fn probe_positions(
    hashes: &HashPair,
    num_bits: u64,
    num_hashes: usize,
    item: u64,
) -> impl Iterator<Item = u64> {
    let (h0, h1) = hashes.apply(item);
    let base = h0 % num_bits;
    let step = h1 % num_bits;
    // base + i * step stays far below u64::MAX for any supported
    // num_bits/num_hashes, see constants.rs.
    (0..num_hashes as u64).map(move |i| (base + i * step) % num_bits)
}

/// An immutable Bloom filter answering membership queries.
#[derive(Debug)]
pub struct BloomFilter {
    bits: BitVec,
    hashes: Arc<HashPair>,
    num_hashes: usize,
}

impl BloomFilter {
    /// Wrap an already-built bit vector.
    ///
    /// # Errors
    /// Returns an error if `num_hashes` is 0.
    pub fn from_parts(bits: BitVec, hashes: Arc<HashPair>, num_hashes: usize) -> Result<Self> {
        if num_hashes == 0 {
            return Err(BrambleError::validation("hash applications must be >= 1"));
        }
        Ok(BloomFilter {
            bits,
            hashes,
            num_hashes,
        })
    }

    /// Load a filter from its backing store.
    ///
    /// The bit length is captured implicitly as the stored vector's length.
    /// Fails if the file cannot be read or its format is invalid; there is
    /// no partially-constructed filter.
    pub fn load(path: &Path, hashes: Arc<HashPair>, num_hashes: usize) -> Result<Self> {
        let bits = BitVec::load(path)?;
        log::debug!(
            "loaded filter {} ({} bits, {} set)",
            path.display(),
            bits.len(),
            bits.count_ones()
        );
        BloomFilter::from_parts(bits, hashes, num_hashes)
    }

    /// Membership test. Short-circuits on the first probed 0 bit.
    #[inline]
    pub fn contains(&self, item: u64) -> bool {
        probe_positions(&self.hashes, self.bits.len(), self.num_hashes, item)
            .all(|pos| self.bits.get(pos))
    }

    /// Total bits in the backing vector.
    pub fn num_bits(&self) -> u64 {
        self.bits.len()
    }

    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    /// Write the backing vector in the compressed on-disk format.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.bits.save(path)
    }
}

/// Builder for filter backing stores.
///
/// Sets the same positions `contains` will later probe, so an item inserted
/// here is never reported absent by a filter loaded from the saved vector.
pub struct FilterBuilder {
    bits: BitVec,
    hashes: Arc<HashPair>,
    num_hashes: usize,
}

impl FilterBuilder {
    pub fn new(num_bits: u64, hashes: Arc<HashPair>, num_hashes: usize) -> Result<Self> {
        if num_hashes == 0 {
            return Err(BrambleError::validation("hash applications must be >= 1"));
        }
        Ok(FilterBuilder {
            bits: BitVec::new(num_bits)?,
            hashes,
            num_hashes,
        })
    }

    /// Set the probe positions for one item.
    pub fn insert(&mut self, item: u64) {
        let positions: Vec<u64> =
            probe_positions(&self.hashes, self.bits.len(), self.num_hashes, item).collect();
        for pos in positions {
            self.bits.set(pos);
        }
    }

    pub fn finish(self) -> BloomFilter {
        BloomFilter {
            bits: self.bits,
            hashes: self.hashes,
            num_hashes: self.num_hashes,
        }
    }
}
