//! Shared hash pair and the hash header resource.
//!
//! Every filter in one tree uses the same pair of 64-bit hash functions and
//! the same hash-application count, so probe positions line up across the
//! whole tree. The pair is derived from two seeds stored in a small binary
//! header file (`.bbh`) read once when the tree is built, alongside the
//! fixed k-mer width.
//!
//! # Header Format (v1)
//! - magic "BBH1", version (u32 LE)
//! - kmer_len (u64 LE), num_hashes (u64 LE)
//! - seed0 (u64 LE), seed1 (u64 LE)

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use crate::constants::{HASH_HEADER_MAGIC, HASH_HEADER_VERSION, MAX_NUM_HASHES};
use crate::error::{BrambleError, Result};
use crate::kmer::KmerCodec;

/// Two independent deterministic 64-bit hash functions over packed k-mers.
///
/// Each function is a seeded finalizer with full avalanche, so the two
/// outputs are uncorrelated even for adjacent inputs. Immutable and shared
/// by `Arc` across every filter of one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashPair {
    seed0: u64,
    seed1: u64,
}

/// 64-bit avalanche finalizer (splitmix64 mixing constants).
#[inline(always)]
fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^= x >> 31;
    x
}

impl HashPair {
    pub fn new(seed0: u64, seed1: u64) -> Self {
        HashPair { seed0, seed1 }
    }

    /// Apply both hash functions to one item.
    #[inline]
    pub fn apply(&self, item: u64) -> (u64, u64) {
        (mix64(item ^ self.seed0), mix64(item ^ self.seed1))
    }

    pub fn seed0(&self) -> u64 {
        self.seed0
    }

    pub fn seed1(&self) -> u64 {
        self.seed1
    }
}

/// The shared header resource: hash pair, hash-application count and the
/// fixed item width for one tree.
///
/// Created once when a tree is built from its root line's header field and
/// shared for the life of the tree.
#[derive(Debug, Clone)]
pub struct HashConfig {
    codec: KmerCodec,
    hashes: Arc<HashPair>,
    num_hashes: usize,
}

impl HashConfig {
    /// Assemble a header in memory.
    ///
    /// # Errors
    /// Returns an error if `kmer_len` is out of range or `num_hashes` is 0
    /// or exceeds the supported maximum.
    pub fn new(kmer_len: usize, num_hashes: usize, seed0: u64, seed1: u64) -> Result<Self> {
        let codec = KmerCodec::new(kmer_len)?;
        if num_hashes == 0 || num_hashes > MAX_NUM_HASHES {
            return Err(BrambleError::validation(format!(
                "hash applications must be 1..={} (got {})",
                MAX_NUM_HASHES, num_hashes
            )));
        }
        Ok(HashConfig {
            codec,
            hashes: Arc::new(HashPair::new(seed0, seed1)),
            num_hashes,
        })
    }

    pub fn codec(&self) -> &KmerCodec {
        &self.codec
    }

    pub fn kmer_len(&self) -> usize {
        self.codec.k()
    }

    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    pub fn hashes(&self) -> &Arc<HashPair> {
        &self.hashes
    }

    /// Load a header file, validating magic, version and field ranges.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| BrambleError::io(path, "open", e))?;
        let mut reader = BufReader::new(file);
        let mut buf4 = [0u8; 4];
        let mut buf8 = [0u8; 8];

        reader
            .read_exact(&mut buf4)
            .map_err(|e| BrambleError::io(path, "read", e))?;
        if &buf4 != HASH_HEADER_MAGIC {
            return Err(BrambleError::format(path, "invalid hash header magic"));
        }

        reader
            .read_exact(&mut buf4)
            .map_err(|e| BrambleError::io(path, "read", e))?;
        let version = u32::from_le_bytes(buf4);
        if version != HASH_HEADER_VERSION {
            return Err(BrambleError::format(
                path,
                format!(
                    "unsupported hash header version {} (expected {})",
                    version, HASH_HEADER_VERSION
                ),
            ));
        }

        reader
            .read_exact(&mut buf8)
            .map_err(|e| BrambleError::io(path, "read", e))?;
        let kmer_len = u64::from_le_bytes(buf8) as usize;
        reader
            .read_exact(&mut buf8)
            .map_err(|e| BrambleError::io(path, "read", e))?;
        let num_hashes = u64::from_le_bytes(buf8) as usize;
        reader
            .read_exact(&mut buf8)
            .map_err(|e| BrambleError::io(path, "read", e))?;
        let seed0 = u64::from_le_bytes(buf8);
        reader
            .read_exact(&mut buf8)
            .map_err(|e| BrambleError::io(path, "read", e))?;
        let seed1 = u64::from_le_bytes(buf8);

        HashConfig::new(kmer_len, num_hashes, seed0, seed1)
            .map_err(|e| BrambleError::format(path, e.to_string()))
    }

    /// Write the header file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| BrambleError::io(path, "create", e))?;
        let mut writer = BufWriter::new(file);
        let write = |w: &mut BufWriter<File>, bytes: &[u8]| {
            w.write_all(bytes).map_err(|e| BrambleError::io(path, "write", e))
        };
        write(&mut writer, HASH_HEADER_MAGIC)?;
        write(&mut writer, &HASH_HEADER_VERSION.to_le_bytes())?;
        write(&mut writer, &(self.kmer_len() as u64).to_le_bytes())?;
        write(&mut writer, &(self.num_hashes as u64).to_le_bytes())?;
        write(&mut writer, &self.hashes.seed0().to_le_bytes())?;
        write(&mut writer, &self.hashes.seed1().to_le_bytes())?;
        writer.flush().map_err(|e| BrambleError::io(path, "write", e))
    }
}
