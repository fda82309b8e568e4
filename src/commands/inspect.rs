//! Tree inspection handler.

use anyhow::{Context, Result};
use std::path::Path;

use bramble::{read_tree, NodeId, TreeOptions};

/// Parse a tree description and print its structure and summary stats.
pub fn inspect_tree(path: &Path, inmem_limit: usize) -> Result<()> {
    let tree = read_tree(path, TreeOptions { inmem_limit })
        .context(format!("Failed to build tree from {}", path.display()))?;

    let mut leaves = 0usize;
    let mut max_depth = 0usize;

    // Depth-first, child 0 before child 1, printing lines in the same
    // marker format the description uses.
    let mut stack: Vec<(NodeId, usize)> = vec![(tree.root(), 0)];
    let mut lines = Vec::new();
    while let Some((id, depth)) = stack.pop() {
        lines.push(format!("{}{}", "*".repeat(depth), tree.name(id)));
        max_depth = max_depth.max(depth);

        match (tree.child(id, 0), tree.child(id, 1)) {
            (None, None) => leaves += 1,
            (c0, c1) => {
                // Push child 1 first so child 0 prints first.
                if let Some(c) = c1 {
                    stack.push((c, depth + 1));
                }
                if let Some(c) = c0 {
                    stack.push((c, depth + 1));
                }
            }
        }
    }

    println!("tree: {}", path.display());
    println!("nodes: {}", tree.num_nodes());
    println!("leaves: {}", leaves);
    println!("max depth: {}", max_depth);
    println!("kmer length: {}", tree.config().kmer_len());
    println!("hash applications: {}", tree.config().num_hashes());
    println!("resident limit: {}", inmem_limit);
    println!();
    for line in lines {
        println!("{}", line);
    }

    Ok(())
}
