//! Fixed-size bit vectors with a space-compressed on-disk form.
//!
//! A `BitVec` is immutable once loaded and answers `get` in O(1) from plain
//! u64 words. On disk the word array is stored as a zstd-compressed stream
//! behind an uncompressed header, decoded once at load time.
//!
//! # File Format (v1)
//! - Header (uncompressed): magic "BBV1", version (u32 LE), bit length (u64 LE)
//! - Payload (zstd compressed stream): the word array, LE u64s

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::constants::{
    BIT_VECTOR_MAGIC, BIT_VECTOR_VERSION, MAX_BIT_LENGTH, READ_BUF_SIZE, WRITE_BUF_SIZE,
    ZSTD_LEVEL,
};
use crate::error::{BrambleError, Result};

/// A fixed-size bit array with O(1) bit lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitVec {
    words: Vec<u64>,
    len_bits: u64,
}

fn validate_len(len_bits: u64) -> Result<()> {
    if len_bits == 0 {
        return Err(BrambleError::validation("bit vector length must be > 0"));
    }
    if len_bits > MAX_BIT_LENGTH {
        return Err(BrambleError::validation(format!(
            "bit vector length {} exceeds maximum {}",
            len_bits, MAX_BIT_LENGTH
        )));
    }
    Ok(())
}

impl BitVec {
    /// Create a zeroed bit vector of `len_bits` bits.
    pub fn new(len_bits: u64) -> Result<Self> {
        validate_len(len_bits)?;
        let num_words = len_bits.div_ceil(64) as usize;
        Ok(BitVec {
            words: vec![0; num_words],
            len_bits,
        })
    }

    /// Create a bit vector with the given positions set.
    ///
    /// # Errors
    /// Returns an error if the length is out of range or any position is
    /// past the end.
    pub fn from_set_bits(len_bits: u64, positions: impl IntoIterator<Item = u64>) -> Result<Self> {
        let mut bv = BitVec::new(len_bits)?;
        for pos in positions {
            if pos >= len_bits {
                return Err(BrambleError::validation(format!(
                    "bit position {} out of range for length {}",
                    pos, len_bits
                )));
            }
            bv.set(pos);
        }
        Ok(bv)
    }

    /// Length in bits. Always > 0.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len_bits
    }

    /// Read the bit at `index`.
    #[inline]
    pub fn get(&self, index: u64) -> bool {
        debug_assert!(index < self.len_bits);
        (self.words[(index >> 6) as usize] >> (index & 63)) & 1 == 1
    }

    /// Set the bit at `index`.
    #[inline]
    pub fn set(&mut self, index: u64) {
        debug_assert!(index < self.len_bits);
        self.words[(index >> 6) as usize] |= 1 << (index & 63);
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> u64 {
        self.words.iter().map(|w| w.count_ones() as u64).sum()
    }

    /// Write the vector in the compressed on-disk format.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| BrambleError::io(path, "create", e))?;
        let mut writer = BufWriter::new(file);

        writer
            .write_all(BIT_VECTOR_MAGIC)
            .and_then(|_| writer.write_all(&BIT_VECTOR_VERSION.to_le_bytes()))
            .and_then(|_| writer.write_all(&self.len_bits.to_le_bytes()))
            .map_err(|e| BrambleError::io(path, "write", e))?;

        let mut encoder = zstd::stream::write::Encoder::new(writer, ZSTD_LEVEL)
            .map_err(|e| BrambleError::io(path, "compress", e))?;

        let mut buf = Vec::with_capacity(WRITE_BUF_SIZE);
        for word in &self.words {
            buf.extend_from_slice(&word.to_le_bytes());
            if buf.len() >= WRITE_BUF_SIZE {
                encoder
                    .write_all(&buf)
                    .map_err(|e| BrambleError::io(path, "write", e))?;
                buf.clear();
            }
        }
        if !buf.is_empty() {
            encoder
                .write_all(&buf)
                .map_err(|e| BrambleError::io(path, "write", e))?;
        }
        let mut writer = encoder
            .finish()
            .map_err(|e| BrambleError::io(path, "write", e))?;
        writer
            .flush()
            .map_err(|e| BrambleError::io(path, "write", e))?;
        Ok(())
    }

    /// Load a vector from the compressed on-disk format.
    ///
    /// Fails on a missing file, bad magic, unsupported version, an
    /// out-of-range length, or a truncated payload. There is no partial
    /// result: the vector either loads whole or not at all.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| BrambleError::io(path, "open", e))?;
        let mut reader = BufReader::with_capacity(READ_BUF_SIZE, file);
        let mut buf4 = [0u8; 4];
        let mut buf8 = [0u8; 8];

        reader
            .read_exact(&mut buf4)
            .map_err(|e| BrambleError::io(path, "read", e))?;
        if &buf4 != BIT_VECTOR_MAGIC {
            return Err(BrambleError::format(path, "invalid bit vector magic"));
        }

        reader
            .read_exact(&mut buf4)
            .map_err(|e| BrambleError::io(path, "read", e))?;
        let version = u32::from_le_bytes(buf4);
        if version != BIT_VECTOR_VERSION {
            return Err(BrambleError::format(
                path,
                format!(
                    "unsupported bit vector version {} (expected {})",
                    version, BIT_VECTOR_VERSION
                ),
            ));
        }

        reader
            .read_exact(&mut buf8)
            .map_err(|e| BrambleError::io(path, "read", e))?;
        let len_bits = u64::from_le_bytes(buf8);
        validate_len(len_bits).map_err(|e| BrambleError::format(path, e.to_string()))?;

        let mut decoder = zstd::stream::read::Decoder::new(reader)
            .map_err(|e| BrambleError::io(path, "decompress", e))?;

        let num_words = len_bits.div_ceil(64) as usize;
        let mut words = Vec::with_capacity(num_words);
        for _ in 0..num_words {
            decoder
                .read_exact(&mut buf8)
                .map_err(|e| BrambleError::io(path, "decompress", e))?;
            words.push(u64::from_le_bytes(buf8));
        }

        Ok(BitVec { words, len_bits })
    }
}
