//! Constants used throughout the bramble library for safety limits and
//! binary format definitions.
//!
//! Centralizing these ensures the on-disk formats and the loaders agree,
//! and makes it easy to adjust limits when needed.

// ============================================================================
// Binary Format Magic Bytes
// ============================================================================

/// Magic bytes for compressed bit-vector files (.bbv).
pub(crate) const BIT_VECTOR_MAGIC: &[u8; 4] = b"BBV1";

/// Magic bytes for shared hash header files (.bbh).
pub(crate) const HASH_HEADER_MAGIC: &[u8; 4] = b"BBH1";

// ============================================================================
// Binary Format Versions
// ============================================================================

/// Current version for compressed bit-vector files.
pub(crate) const BIT_VECTOR_VERSION: u32 = 1;

/// Current version for shared hash header files.
pub(crate) const HASH_HEADER_VERSION: u32 = 1;

// ============================================================================
// Safety Limits for Loading Files
// ============================================================================

/// Maximum bit-vector length in bits (2^40, 128 GiB resident).
pub(crate) const MAX_BIT_LENGTH: u64 = 1 << 40;

/// Maximum hash applications per filter.
pub(crate) const MAX_NUM_HASHES: usize = 64;

/// Maximum k-mer length (2-bit codes packed into one u64).
pub(crate) const MAX_KMER_LEN: usize = 32;

// ============================================================================
// Tree Description Limits
// ============================================================================

/// Maximum depth of a tree description (marker count per line).
pub(crate) const MAX_TREE_DEPTH: usize = 64;

/// Maximum length for a node identifier in a tree description.
pub(crate) const MAX_NAME_LENGTH: usize = 4096;

// ============================================================================
// Residency
// ============================================================================

/// Default maximum number of simultaneously resident filters.
///
/// Residency may transiently reach the limit plus one: the capacity check
/// runs against the pre-insertion count and evicts a single victim.
pub const DEFAULT_INMEM_LIMIT: usize = 100;

// ============================================================================
// I/O
// ============================================================================

/// Buffer size for writing bit-vector files (1MB).
pub(crate) const WRITE_BUF_SIZE: usize = 1024 * 1024;

/// Buffer size for reading bit-vector files (1MB).
pub(crate) const READ_BUF_SIZE: usize = 1024 * 1024;

/// zstd compression level for bit-vector payloads.
pub(crate) const ZSTD_LEVEL: i32 = 3;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_bytes_are_4_bytes() {
        assert_eq!(BIT_VECTOR_MAGIC.len(), 4);
        assert_eq!(HASH_HEADER_MAGIC.len(), 4);
    }

    #[test]
    fn test_magic_bytes_distinct() {
        assert_ne!(BIT_VECTOR_MAGIC, HASH_HEADER_MAGIC);
    }

    #[test]
    fn test_max_kmer_fits_in_u64() {
        assert!(2 * MAX_KMER_LEN <= 64, "2-bit codes must pack into a u64");
    }

    #[test]
    fn test_probe_arithmetic_cannot_overflow() {
        // Probe positions are computed as base + i * step with base and step
        // below MAX_BIT_LENGTH and i below MAX_NUM_HASHES.
        let max_term = (MAX_NUM_HASHES as u64).checked_mul(MAX_BIT_LENGTH);
        assert!(max_term.is_some());
        assert!(max_term.unwrap().checked_add(MAX_BIT_LENGTH).is_some());
    }

    #[test]
    fn test_buffer_sizes_are_power_of_two() {
        assert!(WRITE_BUF_SIZE.is_power_of_two());
        assert!(READ_BUF_SIZE.is_power_of_two());
    }

    #[test]
    fn test_default_limit_nonzero() {
        assert!(DEFAULT_INMEM_LIMIT > 0);
    }
}
