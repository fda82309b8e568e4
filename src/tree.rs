//! Binary tree of lazily-loaded Bloom filters.
//!
//! Nodes live in an arena owned by the `Tree`, addressed by `NodeId`;
//! parent links are plain back-references and never own anything, so the
//! ownership direction is strictly parent to child. Each tree owns its own
//! eviction cache, created with the tree and torn down with it, so two
//! trees in one process never interfere.
//!
//! A node's filter is loaded on first use and unloaded when the cache
//! evicts it. `filter()` borrows the whole tree mutably, so a returned
//! filter reference cannot outlive the next operation that could trigger
//! eviction: holding a filter while loading other nodes is rejected at
//! compile time rather than documented as a caller obligation.

use std::path::Path;
use std::sync::Arc;

use crate::cache::{CacheSlot, FilterCache};
use crate::constants::DEFAULT_INMEM_LIMIT;
use crate::error::Result;
use crate::filter::BloomFilter;
use crate::hashing::HashConfig;

/// Arena index of a node within its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(raw: u32) -> Self {
        NodeId(raw)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Per-tree settings.
#[derive(Debug, Clone, Copy)]
pub struct TreeOptions {
    /// Maximum simultaneously resident filters. Residency may transiently
    /// reach this plus one: the capacity check runs against the
    /// pre-insertion count and evicts a single victim.
    pub inmem_limit: usize,
}

impl Default for TreeOptions {
    fn default() -> Self {
        TreeOptions {
            inmem_limit: DEFAULT_INMEM_LIMIT,
        }
    }
}

/// One tree node: identity, topology, residency state, usage accounting.
#[derive(Debug)]
struct TreeNode {
    /// Backing-store path; also the display name.
    name: String,
    filter: Option<BloomFilter>,
    parent: Option<NodeId>,
    children: [Option<NodeId>; 2],
    usage: u64,
    /// Valid iff the node is resident.
    slot: Option<CacheSlot>,
}

/// A binary tree of Bloom filters sharing one hash configuration.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<TreeNode>,
    cache: FilterCache,
    config: HashConfig,
    options: TreeOptions,
}

impl Tree {
    /// Create an empty tree around a shared hash configuration.
    pub fn new(config: HashConfig, options: TreeOptions) -> Self {
        Tree {
            nodes: Vec::new(),
            cache: FilterCache::new(),
            config,
            options,
        }
    }

    /// Append a node with no links and zero usage.
    ///
    /// The first node added is the root.
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        assert!(self.nodes.len() < u32::MAX as usize, "node count overflow");
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(TreeNode {
            name: name.into(),
            filter: None,
            parent: None,
            children: [None, None],
            usage: 0,
            slot: None,
        });
        id
    }

    /// The root node. Panics on an empty tree; the builder never returns
    /// one.
    pub fn root(&self) -> NodeId {
        assert!(!self.nodes.is_empty(), "tree has no nodes");
        NodeId(0)
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Wire `child` into `parent`'s slot `which` (0 or 1).
    ///
    /// Slot reassignment and re-parenting are contract violations: the
    /// builder assigns each slot at most once.
    pub fn set_child(&mut self, parent: NodeId, which: usize, child: NodeId) {
        assert!(which < 2, "child slot must be 0 or 1");
        assert!(
            self.node(parent).children[which].is_none(),
            "child slot {} of '{}' already assigned",
            which,
            self.node(parent).name
        );
        assert!(
            self.node(child).parent.is_none(),
            "node '{}' already has a parent",
            self.node(child).name
        );
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children[which] = Some(child);
    }

    /// The child in slot `which` (0 or 1), if assigned.
    pub fn child(&self, id: NodeId, which: usize) -> Option<NodeId> {
        assert!(which < 2, "child slot must be 0 or 1");
        self.node(id).children[which]
    }

    /// The parent back-reference; `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.node(id).name
    }

    pub fn usage(&self, id: NodeId) -> u64 {
        self.node(id).usage
    }

    pub fn is_resident(&self, id: NodeId) -> bool {
        self.node(id).filter.is_some()
    }

    /// Number of filters currently resident across the tree.
    pub fn resident_count(&self) -> usize {
        self.cache.size()
    }

    pub fn config(&self) -> &HashConfig {
        &self.config
    }

    /// Ensure residency, evicting first if the cache is over its limit.
    ///
    /// Idempotent: a resident node returns immediately with no side
    /// effects. Otherwise, if the resident count already exceeds
    /// `inmem_limit`, the globally least-used resident node is unloaded
    /// before this node's filter is read from its backing store and the
    /// node is registered in the cache at its current usage count.
    pub fn load(&mut self, id: NodeId) -> Result<()> {
        if self.node(id).filter.is_some() {
            return Ok(());
        }

        log::info!("loading filter: {}", self.node(id).name);
        if self.cache.size() > self.options.inmem_limit {
            self.evict_one();
        }

        let filter = BloomFilter::load(
            Path::new(&self.node(id).name),
            Arc::clone(self.config.hashes()),
            self.config.num_hashes(),
        )?;
        let usage = self.node(id).usage;
        let slot = self.cache.insert(id, usage);
        let node = self.node_mut(id);
        node.filter = Some(filter);
        node.slot = Some(slot);
        Ok(())
    }

    /// Free the resident filter, if any. No-op when not resident.
    pub fn unload(&mut self, id: NodeId) {
        if let Some(slot) = self.node_mut(id).slot.take() {
            self.cache.remove(slot);
        }
        self.node_mut(id).filter = None;
    }

    /// The node's filter, loading it first if necessary.
    ///
    /// The returned borrow is tied to the tree, so it cannot be held across
    /// a later `load()` of another node (which could evict this filter).
    pub fn filter(&mut self, id: NodeId) -> Result<&BloomFilter> {
        self.load(id)?;
        Ok(self
            .node(id)
            .filter
            .as_ref()
            .unwrap_or_else(|| unreachable!("load() leaves the node resident")))
    }

    /// Count one use of this node, biasing eviction away from it.
    ///
    /// This is the sole mechanism that makes hot nodes survive: callers
    /// invoke it on every access they consider a use. If the node is
    /// resident its cache key is raised in place.
    pub fn increment_usage(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        node.usage += 1;
        let usage = node.usage;
        if let Some(slot) = node.slot {
            self.cache.increase_key(slot, usage);
        }
    }

    /// Membership test for a raw base slice against this node's filter,
    /// encoding through the tree's shared codec.
    pub fn contains(&mut self, id: NodeId, seq: &[u8]) -> Result<bool> {
        let item = self.config.codec().encode_canonical(seq)?;
        Ok(self.filter(id)?.contains(item))
    }

    fn evict_one(&mut self) {
        if let Some(victim) = self.cache.pop_min() {
            let node = self.node_mut(victim);
            log::info!("unloading filter: {}", node.name);
            node.slot = None;
            node.filter = None;
        }
    }

    fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.index()]
    }
}
