//! Filter packing and probing handlers.
//!
//! Packing is the encoder side of the filter's backing store: it reads a
//! k-mer list, canonicalizes each k-mer through the shared header's codec,
//! sets the same probe positions membership will later test, and writes
//! the compressed bit vector. A batch of filters can be described in a
//! TOML job file.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bramble::{BloomFilter, FilterBuilder, HashConfig};

/// TOML job file for packing a batch of filters.
///
/// ```toml
/// [pack]
/// header = "hashes.bbh"
/// bits = 8388608
///
/// [filters.sample_a]
/// kmers = "sample_a.kmers"
/// output = "sample_a.bbv"
/// ```
#[derive(Debug, Deserialize)]
pub struct PackConfig {
    pub pack: PackSettings,
    pub filters: HashMap<String, FilterEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PackSettings {
    pub header: PathBuf,
    pub bits: u64,
}

#[derive(Debug, Deserialize)]
pub struct FilterEntry {
    pub kmers: PathBuf,
    pub output: PathBuf,
}

pub fn parse_pack_config(path: &Path) -> Result<PackConfig> {
    let contents = fs::read_to_string(path)
        .context(format!("Failed to read pack config: {}", path.display()))?;

    let config: PackConfig =
        toml::from_str(&contents).context("Failed to parse TOML pack config")?;

    if config.filters.is_empty() {
        return Err(anyhow!("Pack config must define at least one filter"));
    }

    Ok(config)
}

/// Resolve a possibly-relative path against a base directory.
fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Counts from packing one filter.
pub struct PackStats {
    pub inserted: usize,
    pub skipped: usize,
}

/// Pack one filter file from a k-mer list.
///
/// Lines that are blank or start with '#' are skipped; lines that do not
/// encode at the header's width are counted and warned about, not fatal.
pub fn pack_one(
    config: &HashConfig,
    bits: u64,
    kmers_path: &Path,
    output: &Path,
) -> Result<PackStats> {
    let contents = fs::read_to_string(kmers_path)
        .context(format!("Failed to read k-mer list: {}", kmers_path.display()))?;

    let mut builder = FilterBuilder::new(bits, Arc::clone(config.hashes()), config.num_hashes())?;
    let mut inserted = 0usize;
    let mut skipped = 0usize;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match config.codec().encode_canonical(line.as_bytes()) {
            Ok(item) => {
                builder.insert(item);
                inserted += 1;
            }
            Err(err) => {
                log::warn!("{}: skipping k-mer '{}': {}", kmers_path.display(), line, err);
                skipped += 1;
            }
        }
    }

    if inserted == 0 {
        return Err(anyhow!(
            "No usable k-mers in {} ({} skipped)",
            kmers_path.display(),
            skipped
        ));
    }

    builder
        .finish()
        .save(output)
        .context(format!("Failed to write filter: {}", output.display()))?;
    log::info!(
        "packed {}: {} k-mers, {} skipped, {} bits",
        output.display(),
        inserted,
        skipped,
        bits
    );

    Ok(PackStats { inserted, skipped })
}

/// Handler for `bramble filter pack`.
pub fn run_pack(
    config: Option<PathBuf>,
    header: Option<PathBuf>,
    kmers: Option<PathBuf>,
    output: Option<PathBuf>,
    bits: u64,
) -> Result<()> {
    match (config, header, kmers, output) {
        (Some(job_path), None, None, None) => {
            let job = parse_pack_config(&job_path)?;
            let base = job_path.parent().unwrap_or(Path::new("")).to_path_buf();
            let header_path = resolve_path(&base, &job.pack.header);
            let hashes = HashConfig::load(&header_path)?;

            let mut names: Vec<&String> = job.filters.keys().collect();
            names.sort();
            for name in names {
                let entry = &job.filters[name];
                let stats = pack_one(
                    &hashes,
                    job.pack.bits,
                    &resolve_path(&base, &entry.kmers),
                    &resolve_path(&base, &entry.output),
                )?;
                println!(
                    "{}: {} k-mers packed ({} skipped)",
                    name, stats.inserted, stats.skipped
                );
            }
            Ok(())
        }
        (None, Some(header), Some(kmers), Some(output)) => {
            let hashes = HashConfig::load(&header)?;
            let stats = pack_one(&hashes, bits, &kmers, &output)?;
            println!(
                "{}: {} k-mers packed ({} skipped)",
                output.display(),
                stats.inserted,
                stats.skipped
            );
            Ok(())
        }
        _ => Err(anyhow!(
            "Use either --config, or all of --header/--kmers/--output"
        )),
    }
}

/// Handler for `bramble filter check`: probe one filter for each k-mer in
/// a list and print a line per probe.
pub fn run_check(header: &Path, filter_path: &Path, kmers_path: &Path) -> Result<()> {
    let config = HashConfig::load(header)?;
    let filter = BloomFilter::load(
        filter_path,
        Arc::clone(config.hashes()),
        config.num_hashes(),
    )?;

    let contents = fs::read_to_string(kmers_path)
        .context(format!("Failed to read k-mer list: {}", kmers_path.display()))?;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let item = config
            .codec()
            .encode_canonical(line.as_bytes())
            .context(format!("Bad k-mer '{}'", line))?;
        let verdict = if filter.contains(item) {
            "present"
        } else {
            "absent"
        };
        println!("{}\t{}", line, verdict);
    }

    Ok(())
}

/// Handler for `bramble header create`.
pub fn run_header_create(
    output: &Path,
    kmer_len: usize,
    num_hashes: usize,
    seed0: u64,
    seed1: u64,
) -> Result<()> {
    let config = HashConfig::new(kmer_len, num_hashes, seed0, seed1)?;
    config.save(output)?;
    println!(
        "wrote hash header {} (kmer_len={}, num_hashes={})",
        output.display(),
        kmer_len,
        num_hashes
    );
    Ok(())
}
