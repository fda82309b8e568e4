//! Command-line argument definitions for the bramble CLI.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use bramble::DEFAULT_INMEM_LIMIT;

#[derive(Parser)]
#[command(name = "bramble")]
#[command(about = "Bloom-filter tree index over k-mer sets of sequencing samples")]
#[command(
    long_about = "Bramble: a binary tree of Bloom filters over k-mer sets, with on-demand
filter loading and bounded-memory residency.

WORKFLOW:
  1. Create a shared hash header:   bramble header create -o hashes.bbh -k 20
  2. Pack filters from k-mer lists: bramble filter pack --header hashes.bbh \\
                                        --kmers sample.kmers -o sample.bbv
  3. Describe the tree (text file, one node per line, '*' markers for depth,
     root line names the header):
         root.bbv,hashes.bbh
         *childA.bbv
         *childB.bbv
  4. Inspect it:                    bramble tree inspect -t tree.txt

K-MER LIST FORMAT:
  One k-mer per line, exactly the header's k-mer length, bases ACGT
  (case-insensitive). Blank lines and lines starting with '#' are skipped."
)]
#[command(after_help = "EXAMPLES:
  # Header with 3 hash applications per probe
  bramble header create -o hashes.bbh -k 20 -n 3

  # Pack one filter
  bramble filter pack --header hashes.bbh --kmers sample.kmers -o sample.bbv --bits 8388608

  # Pack a batch of filters from a TOML job file
  bramble filter pack --config pack.toml

  # Probe a filter for the k-mers in a list
  bramble filter check --header hashes.bbh --filter sample.bbv --kmers probes.kmers

  # Parse a tree description and print its structure
  bramble tree inspect -t tree.txt")]
pub struct Cli {
    /// Enable verbose progress output (load/eviction events, timings)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Shared hash header operations
    #[command(subcommand)]
    Header(HeaderCommands),

    /// Filter backing-store operations: pack and probe
    #[command(subcommand)]
    Filter(FilterCommands),

    /// Tree description operations
    #[command(subcommand)]
    Tree(TreeCommands),
}

#[derive(Subcommand)]
pub enum HeaderCommands {
    /// Create a shared hash header file (.bbh)
    Create {
        /// Output path for the header
        #[arg(short, long)]
        output: PathBuf,

        /// K-mer length. Every filter built against this header encodes
        /// items at this fixed width. Must be 1-32.
        #[arg(short, long, default_value_t = 20)]
        kmer_len: usize,

        /// Hash applications per membership probe
        #[arg(short, long, default_value_t = 3)]
        num_hashes: usize,

        /// Seed for the first hash function
        #[arg(long, default_value_t = 0x5555_5555_5555_5555)]
        seed0: u64,

        /// Seed for the second hash function
        #[arg(long, default_value_t = 0x9E37_79B9_7F4A_7C15)]
        seed1: u64,
    },
}

#[derive(Subcommand)]
pub enum FilterCommands {
    /// Build compressed filter backing stores (.bbv) from k-mer lists
    Pack {
        /// TOML job file describing a batch of filters.
        /// Mutually exclusive with the direct flags below.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Shared hash header (.bbh)
        #[arg(long)]
        header: Option<PathBuf>,

        /// K-mer list file, one k-mer per line
        #[arg(long)]
        kmers: Option<PathBuf>,

        /// Output filter path (.bbv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Bit vector length for directly-packed filters
        #[arg(short, long, default_value_t = 1 << 23)]
        bits: u64,
    },

    /// Probe one filter file for each k-mer in a list
    Check {
        /// Shared hash header (.bbh)
        #[arg(long)]
        header: PathBuf,

        /// Filter backing store (.bbv)
        #[arg(short, long)]
        filter: PathBuf,

        /// K-mer list file, one k-mer per line
        #[arg(long)]
        kmers: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum TreeCommands {
    /// Parse a tree description and print its structure and stats
    Inspect {
        /// Tree description file
        #[arg(short, long)]
        tree: PathBuf,

        /// Maximum simultaneously resident filters
        #[arg(long, default_value_t = DEFAULT_INMEM_LIMIT)]
        inmem_limit: usize,
    },
}
