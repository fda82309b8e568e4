//! bramble: a Bloom-filter tree index over k-mer sets of sequencing
//! samples.
//!
//! Many large k-mer sets are each approximated by a Bloom filter, and the
//! filters are organized as a binary tree so a membership probe can prune
//! whole subtrees without every filter resident in memory. Filters load on
//! demand; a bounded-memory cache evicts the least-used filter when the
//! resident count passes its limit, and usage counts reprioritize resident
//! filters in place.
//!
//! # Components
//!
//! - [`kmer`]: canonical 2-bit k-mer encoding of fixed width
//! - [`hashing`]: the shared two-function hash pair and its header file
//! - [`bitvec`]: fixed-size bit vectors with a compressed on-disk form
//! - [`filter`]: Bloom filter membership via double hashing
//! - [`cache`]: usage-ordered eviction with stable, reprioritizable slots
//! - [`tree`]: the node arena with lazy load/unload
//! - [`builder`]: the line-oriented tree-description parser
//!
//! Walking the tree to aggregate query results is a consumer's job; this
//! crate stops at per-node membership.
//!
//! The core is single-threaded cooperative: loading is a
//! check-evict-insert sequence with no internal locking, and concurrent
//! use requires external serialization around a whole `Tree`.

pub mod bitvec;
pub mod builder;
pub mod cache;
mod constants;
pub mod error;
pub mod filter;
pub mod hashing;
pub mod kmer;
pub mod logging;
pub mod tree;

pub use bitvec::BitVec;
pub use builder::{parse_tree, read_tree};
pub use cache::{CacheSlot, FilterCache};
pub use constants::DEFAULT_INMEM_LIMIT;
pub use error::{BrambleError, Result};
pub use filter::{BloomFilter, FilterBuilder};
pub use hashing::{HashConfig, HashPair};
pub use kmer::KmerCodec;
pub use tree::{NodeId, Tree, TreeOptions};
