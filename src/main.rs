//! bramble CLI entry point.

mod commands;

use anyhow::Result;
use clap::Parser;

use commands::{Cli, Commands, FilterCommands, HeaderCommands, TreeCommands};

fn main() {
    let cli = Cli::parse();
    bramble::logging::init_logger(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Header(HeaderCommands::Create {
            output,
            kmer_len,
            num_hashes,
            seed0,
            seed1,
        }) => commands::filters::run_header_create(&output, kmer_len, num_hashes, seed0, seed1),

        Commands::Filter(FilterCommands::Pack {
            config,
            header,
            kmers,
            output,
            bits,
        }) => commands::filters::run_pack(config, header, kmers, output, bits),

        Commands::Filter(FilterCommands::Check {
            header,
            filter,
            kmers,
        }) => commands::filters::run_check(&header, &filter, &kmers),

        Commands::Tree(TreeCommands::Inspect { tree, inmem_limit }) => {
            commands::inspect::inspect_tree(&tree, inmem_limit)
        }
    }
}
