// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use std::{fs, path::PathBuf};

use anyhow::Context;
use binchunk::{
    listing::{Listing, ListingOptions},
    opcodes::STANDARD,
    undump,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Lists the functions in a precompiled chunk.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Chunk file to list.
    file: PathBuf,

    /// Do not list constants.
    #[arg(long)]
    no_constants: bool,

    /// Do not list local variables.
    #[arg(long)]
    no_locals: bool,

    /// Do not list upvalues.
    #[arg(long)]
    no_upvalues: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let data = fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    info!(bytes = data.len(), file = %args.file.display(), "read chunk");

    let main = undump(&data).with_context(|| {
        format!("failed to load chunk {}", args.file.display())
    })?;

    let options = ListingOptions {
        constants: !args.no_constants,
        locals: !args.no_locals,
        upvalues: !args.no_upvalues,
    };
    print!("{}", Listing::new(&main, &STANDARD).with_options(options));

    Ok(())
}
