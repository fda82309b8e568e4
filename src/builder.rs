//! Tree-description parsing.
//!
//! A tree description is line-oriented text. Each non-blank line, after
//! trimming, starts with a run of `*` markers whose count is the node's
//! depth (root = depth 0); the rest is a comma-separated field list where
//! field 0 is the filter's backing-store path. The root line carries a
//! second field naming the shared hash header. Fields past those are
//! tolerated and ignored.
//!
//! ```text
//! root.bbv,hashes.bbh
//! *childA.bbv
//! *childB.bbv
//! **grandchild.bbv
//! ```
//!
//! Construction is all-or-nothing: any malformed line fails the whole
//! build with an error naming the violated rule and the line number, and
//! no partial tree is returned.

use std::fs;
use std::path::Path;

use crate::constants::{MAX_NAME_LENGTH, MAX_TREE_DEPTH};
use crate::error::{BrambleError, Result};
use crate::hashing::HashConfig;
use crate::tree::{NodeId, Tree, TreeOptions};

/// Read and build a tree from a description file.
///
/// Relative paths inside the description (filter files and the hash
/// header) are resolved against the description file's directory.
pub fn read_tree(path: &Path, options: TreeOptions) -> Result<Tree> {
    let text = fs::read_to_string(path).map_err(|e| BrambleError::io(path, "read", e))?;
    parse_tree(&text, path.parent(), options)
}

/// Build a tree from description text.
///
/// `base` is the directory used to resolve relative paths; `None` leaves
/// paths as written.
pub fn parse_tree(text: &str, base: Option<&Path>, options: TreeOptions) -> Result<Tree> {
    let mut tree: Option<Tree> = None;
    // Ancestor stack from the root to the most recent node; a node of
    // depth d sits at stack index d.
    let mut path_stack: Vec<NodeId> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let depth = line.chars().take_while(|&c| c == '*').count();
        if depth > MAX_TREE_DEPTH {
            return Err(BrambleError::tree(
                lineno,
                format!("depth {} exceeds maximum {}", depth, MAX_TREE_DEPTH),
            ));
        }

        let fields: Vec<&str> = line[depth..].split(',').map(str::trim).collect();
        let name = fields[0];
        if name.is_empty() {
            return Err(BrambleError::tree(lineno, "missing filter path"));
        }
        if name.len() > MAX_NAME_LENGTH {
            return Err(BrambleError::tree(
                lineno,
                format!("filter path exceeds {} bytes", MAX_NAME_LENGTH),
            ));
        }
        let name = resolve_path(base, name);

        if depth == 0 {
            if tree.is_some() {
                return Err(BrambleError::tree(lineno, "tree already has a root"));
            }

            // The root line names the shared hash header; every node of
            // the tree uses the hash pair and counts read from it.
            let header = match fields.get(1) {
                Some(f) if !f.is_empty() => resolve_path(base, f),
                _ => {
                    return Err(BrambleError::tree(
                        lineno,
                        "root line must name a hash header as its second field",
                    ))
                }
            };
            let config = HashConfig::load(Path::new(&header))?;
            log::info!(
                "hash header {}: kmer_len={}, num_hashes={}",
                header,
                config.kmer_len(),
                config.num_hashes()
            );

            let mut t = Tree::new(config, options);
            let root = t.add_node(name);
            tree = Some(t);
            path_stack.push(root);
        } else {
            let t = match tree.as_mut() {
                Some(t) => t,
                None => {
                    return Err(BrambleError::tree(
                        lineno,
                        "first line must be the root (no markers)",
                    ))
                }
            };

            while path_stack.len() > depth {
                path_stack.pop();
            }
            if path_stack.len() < depth {
                return Err(BrambleError::tree(
                    lineno,
                    "must increase level by at most 1",
                ));
            }
            // Stack now ends at the parent (depth - 1).
            let parent = path_stack[depth - 1];

            let node = t.add_node(name);
            if t.child(parent, 0).is_none() {
                t.set_child(parent, 0, node);
            } else if t.child(parent, 1).is_none() {
                t.set_child(parent, 1, node);
            } else {
                return Err(BrambleError::tree(
                    lineno,
                    format!("node '{}' already has two children", t.name(parent)),
                ));
            }
            path_stack.push(node);
        }
    }

    match tree {
        Some(t) => {
            log::info!("read {} nodes from tree description", t.num_nodes());
            Ok(t)
        }
        None => Err(BrambleError::validation("empty tree description")),
    }
}

fn resolve_path(base: Option<&Path>, path: &str) -> String {
    match base {
        Some(dir) if !Path::new(path).is_absolute() && !dir.as_os_str().is_empty() => {
            dir.join(path).to_string_lossy().into_owned()
        }
        _ => path.to_string(),
    }
}
