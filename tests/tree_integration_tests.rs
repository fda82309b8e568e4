//! Integration tests for tree construction, lazy residency and eviction.
//!
//! These tests build real header and filter files in a temp directory,
//! construct trees from description text, and drive membership queries
//! through the lazy-loading path.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::{tempdir, TempDir};

use bramble::{
    read_tree, BloomFilter, FilterBuilder, HashConfig, NodeId, Tree, TreeOptions,
};

const KMER_LEN: usize = 8;
const NUM_HASHES: usize = 3;
const FILTER_BITS: u64 = 1 << 16;

/// Write the shared hash header and return its path.
fn write_header(dir: &TempDir) -> (PathBuf, HashConfig) {
    let path = dir.path().join("hashes.bbh");
    let config = HashConfig::new(KMER_LEN, NUM_HASHES, 0xA5A5, 0x5A5A).unwrap();
    config.save(&path).unwrap();
    (path, config)
}

/// Pack a filter file holding the canonical encodings of the given k-mers.
fn write_filter(dir: &TempDir, name: &str, config: &HashConfig, kmers: &[&[u8]]) -> PathBuf {
    let path = dir.path().join(name);
    let mut builder = FilterBuilder::new(
        FILTER_BITS,
        Arc::clone(config.hashes()),
        config.num_hashes(),
    )
    .unwrap();
    for kmer in kmers {
        builder
            .insert(config.codec().encode_canonical(kmer).unwrap());
    }
    builder.finish().save(&path).unwrap();
    path
}

/// Build the four-node sample tree on disk and return its description path.
fn write_sample_tree(dir: &TempDir, config: &HashConfig) -> PathBuf {
    write_filter(dir, "root.bbv", config, &[b"ACGTACGT", b"AAAACCCC", b"GGGGTTTT"]);
    write_filter(dir, "childA.bbv", config, &[b"ACGTACGT", b"AAAACCCC"]);
    write_filter(dir, "childB.bbv", config, &[b"GGGGTTTT"]);
    write_filter(dir, "grandchild.bbv", config, &[b"AAAACCCC"]);

    let tree_path = dir.path().join("tree.txt");
    fs::write(
        &tree_path,
        "root.bbv,hashes.bbh\n*childA.bbv\n*childB.bbv\n**grandchild.bbv\n",
    )
    .unwrap();
    tree_path
}

#[test]
fn test_sample_tree_structure() {
    let dir = tempdir().unwrap();
    let (_, config) = write_header(&dir);
    let tree_path = write_sample_tree(&dir, &config);

    let tree = read_tree(&tree_path, TreeOptions::default()).unwrap();
    assert_eq!(tree.num_nodes(), 4);

    let root = tree.root();
    let a = tree.child(root, 0).unwrap();
    let b = tree.child(root, 1).unwrap();
    assert!(tree.name(a).ends_with("childA.bbv"));
    assert!(tree.name(b).ends_with("childB.bbv"));
    assert_eq!(tree.parent(root), None);
    assert_eq!(tree.parent(a), Some(root));

    let g = tree.child(a, 0).unwrap();
    assert!(tree.name(g).ends_with("grandchild.bbv"));
    assert_eq!(tree.child(a, 1), None);
    assert_eq!(tree.child(b, 0), None);
    assert_eq!(tree.child(b, 1), None);

    // One shared hash configuration across the tree.
    assert_eq!(tree.config().kmer_len(), KMER_LEN);
    assert_eq!(tree.config().num_hashes(), NUM_HASHES);
}

#[test]
fn test_membership_round_trip_through_lazy_loading() {
    let dir = tempdir().unwrap();
    let (_, config) = write_header(&dir);
    let tree_path = write_sample_tree(&dir, &config);

    let mut tree = read_tree(&tree_path, TreeOptions::default()).unwrap();
    let root = tree.root();
    let a = tree.child(root, 0).unwrap();
    let b = tree.child(root, 1).unwrap();
    let g = tree.child(a, 0).unwrap();

    // Nothing is resident until a query touches a node.
    assert_eq!(tree.resident_count(), 0);

    // Everything inserted is found (no false negatives).
    assert!(tree.contains(root, b"ACGTACGT").unwrap());
    assert!(tree.contains(root, b"AAAACCCC").unwrap());
    assert!(tree.contains(root, b"GGGGTTTT").unwrap());
    assert!(tree.contains(a, b"ACGTACGT").unwrap());
    assert!(tree.contains(a, b"AAAACCCC").unwrap());
    assert!(tree.contains(b, b"GGGGTTTT").unwrap());
    assert!(tree.contains(g, b"AAAACCCC").unwrap());

    assert_eq!(tree.resident_count(), 4);

    // The sparse filters make false positives negligible at this size;
    // the hash pair is deterministic so these answers are stable.
    assert!(!tree.contains(b, b"ACGTACGT").unwrap());
    assert!(!tree.contains(g, b"GGGGTTTT").unwrap());
}

#[test]
fn test_queries_are_strand_independent() {
    let dir = tempdir().unwrap();
    let (_, config) = write_header(&dir);
    let tree_path = write_sample_tree(&dir, &config);

    let mut tree = read_tree(&tree_path, TreeOptions::default()).unwrap();
    let root = tree.root();

    // Reverse complement of AAAACCCC.
    assert!(tree.contains(root, b"GGGGTTTT").unwrap());
    assert!(tree.contains(root, b"ggggtttt").unwrap());
}

/// Build a wide tree: a root with a left-spine of children, each leaf
/// backed by its own filter file. Returns node ids in creation order.
fn spine_tree(dir: &TempDir, config: &HashConfig, count: usize, limit: usize) -> (Tree, Vec<NodeId>) {
    let mut text = String::new();
    for i in 0..count {
        write_filter(dir, &format!("n{}.bbv", i), config, &[b"ACGTACGT"]);
        if i == 0 {
            text.push_str("n0.bbv,hashes.bbh\n");
        } else {
            text.push_str(&format!("{}n{}.bbv\n", "*".repeat(i), i));
        }
    }
    let tree_path = dir.path().join("spine.txt");
    fs::write(&tree_path, text).unwrap();

    let tree = read_tree(&tree_path, TreeOptions { inmem_limit: limit }).unwrap();
    let mut ids = vec![tree.root()];
    for _ in 1..count {
        let next = tree.child(*ids.last().unwrap(), 0).unwrap();
        ids.push(next);
    }
    (tree, ids)
}

#[test]
fn test_resident_count_stays_bounded() {
    let dir = tempdir().unwrap();
    let (_, config) = write_header(&dir);
    let limit = 3;
    let (mut tree, ids) = spine_tree(&dir, &config, 10, limit);

    for (i, &id) in ids.iter().enumerate() {
        tree.increment_usage(id);
        tree.load(id).unwrap();
        // Bounded by limit + 1 at every observation point.
        assert!(
            tree.resident_count() <= limit + 1,
            "after {} loads: {} resident",
            i + 1,
            tree.resident_count()
        );
    }
}

#[test]
fn test_eviction_victim_is_least_used() {
    let dir = tempdir().unwrap();
    let (_, config) = write_header(&dir);
    let (mut tree, ids) = spine_tree(&dir, &config, 6, 2);

    // Load three nodes with distinct usage counts; the cache now holds
    // limit + 1 entries, so the next load evicts exactly one.
    for (bumps, &id) in [3usize, 1, 2].iter().zip(&ids[..3]) {
        for _ in 0..*bumps {
            tree.increment_usage(id);
        }
        tree.load(id).unwrap();
    }
    assert_eq!(tree.resident_count(), 3);

    tree.load(ids[3]).unwrap();
    // ids[1] had the globally smallest usage among residents.
    assert!(!tree.is_resident(ids[1]));
    assert!(tree.is_resident(ids[0]));
    assert!(tree.is_resident(ids[2]));
    assert!(tree.is_resident(ids[3]));
}

#[test]
fn test_reprioritization_protects_hot_node() {
    let dir = tempdir().unwrap();
    let (_, config) = write_header(&dir);
    let (mut tree, ids) = spine_tree(&dir, &config, 8, 2);

    tree.load(ids[0]).unwrap();
    tree.load(ids[1]).unwrap();
    tree.load(ids[2]).unwrap();

    // Bump ids[0] past every other node while it is resident.
    for _ in 0..10 {
        tree.increment_usage(ids[0]);
    }

    // Force evictions; the hot node must survive them all.
    tree.load(ids[3]).unwrap();
    tree.load(ids[4]).unwrap();
    tree.load(ids[5]).unwrap();
    assert!(tree.is_resident(ids[0]));
    assert!(!tree.is_resident(ids[1]));
    assert!(!tree.is_resident(ids[2]));
}

#[test]
fn test_unload_then_filter_reloads_identically() {
    let dir = tempdir().unwrap();
    let (_, config) = write_header(&dir);
    let tree_path = write_sample_tree(&dir, &config);

    let mut tree = read_tree(&tree_path, TreeOptions::default()).unwrap();
    let a = tree.child(tree.root(), 0).unwrap();

    let probes: Vec<u64> = (0..512).map(|i| i * 977).collect();
    let before: Vec<bool> = {
        let filter = tree.filter(a).unwrap();
        probes.iter().map(|&p| filter.contains(p)).collect()
    };

    tree.unload(a);
    assert!(!tree.is_resident(a));

    let after: Vec<bool> = {
        let filter = tree.filter(a).unwrap();
        probes.iter().map(|&p| filter.contains(p)).collect()
    };
    assert_eq!(before, after);
}

#[test]
fn test_evicted_node_reloads_transparently() {
    let dir = tempdir().unwrap();
    let (_, config) = write_header(&dir);
    let (mut tree, ids) = spine_tree(&dir, &config, 5, 1);

    tree.load(ids[0]).unwrap();
    tree.load(ids[1]).unwrap();
    tree.load(ids[2]).unwrap();
    assert!(!tree.is_resident(ids[0]));

    // A later query on the evicted node reloads from the backing store.
    assert!(tree.contains(ids[0], b"ACGTACGT").unwrap());
    assert!(tree.is_resident(ids[0]));
}

#[test]
fn test_depth_jump_is_rejected() {
    let dir = tempdir().unwrap();
    let (_, config) = write_header(&dir);
    write_filter(&dir, "root.bbv", &config, &[b"ACGTACGT"]);
    write_filter(&dir, "deep.bbv", &config, &[b"ACGTACGT"]);

    let tree_path = dir.path().join("bad.txt");
    fs::write(&tree_path, "root.bbv,hashes.bbh\n**deep.bbv\n").unwrap();

    let err = read_tree(&tree_path, TreeOptions::default()).unwrap_err();
    assert!(err.to_string().contains("at most 1"), "got: {}", err);
}

#[test]
fn test_third_child_is_rejected() {
    let dir = tempdir().unwrap();
    let (_, config) = write_header(&dir);
    for name in ["root.bbv", "a.bbv", "b.bbv", "c.bbv"] {
        write_filter(&dir, name, &config, &[b"ACGTACGT"]);
    }

    let tree_path = dir.path().join("bad.txt");
    fs::write(&tree_path, "root.bbv,hashes.bbh\n*a.bbv\n*b.bbv\n*c.bbv\n").unwrap();

    let err = read_tree(&tree_path, TreeOptions::default()).unwrap_err();
    assert!(err.to_string().contains("two children"), "got: {}", err);
}

#[test]
fn test_corrupt_filter_surfaces_on_first_access() {
    let dir = tempdir().unwrap();
    let (_, config) = write_header(&dir);
    write_filter(&dir, "root.bbv", &config, &[b"ACGTACGT"]);
    fs::write(dir.path().join("broken.bbv"), b"not a filter").unwrap();

    let tree_path = dir.path().join("tree.txt");
    fs::write(&tree_path, "root.bbv,hashes.bbh\n*broken.bbv\n").unwrap();

    // Construction succeeds: filters load lazily.
    let mut tree = read_tree(&tree_path, TreeOptions::default()).unwrap();
    let root = tree.root();
    let child = tree.child(root, 0).unwrap();

    // The healthy branch works; the corrupt one fails at first access.
    assert!(tree.contains(root, b"ACGTACGT").unwrap());
    assert!(tree.filter(child).is_err());
    assert!(!tree.is_resident(child));
}

#[test]
fn test_filter_file_is_readable_standalone() {
    // A packed filter is usable without a tree around it, with the same
    // answers the tree gives.
    let dir = tempdir().unwrap();
    let (_, config) = write_header(&dir);
    let path = write_filter(&dir, "solo.bbv", &config, &[b"ACGTACGT", b"TTTTACGT"]);

    let filter = BloomFilter::load(
        Path::new(&path),
        Arc::clone(config.hashes()),
        config.num_hashes(),
    )
    .unwrap();

    let present = config.codec().encode_canonical(b"TTTTACGT").unwrap();
    assert!(filter.contains(present));
    assert_eq!(filter.num_bits(), FILTER_BITS);
}

#[test]
fn test_two_trees_do_not_interfere() {
    // Each tree owns its cache; loading in one never evicts in the other.
    let dir = tempdir().unwrap();
    let (_, config) = write_header(&dir);

    let (mut tree_a, ids_a) = spine_tree(&dir, &config, 4, 1);

    let dir_b = tempdir().unwrap();
    let (_, config_b) = write_header(&dir_b);
    let (mut tree_b, ids_b) = spine_tree(&dir_b, &config_b, 4, 1);

    tree_a.load(ids_a[0]).unwrap();
    tree_b.load(ids_b[0]).unwrap();
    tree_b.load(ids_b[1]).unwrap();
    tree_b.load(ids_b[2]).unwrap();

    assert!(tree_a.is_resident(ids_a[0]));
    assert_eq!(tree_a.resident_count(), 1);
    assert!(tree_b.resident_count() <= 2);
}
