//! Command-line front end: `--rom`/`--verbose`/`--debugger`/
//! `--max-cycles`/`--config`, so a run is test- and CI-drivable.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "dmg-emu", about = "Sharp LR35902 instruction-set interpreter")]
pub struct Args {
    /// Path to the ROM image to load. Overrides the config file's `rom`.
    #[arg(long)]
    pub rom: Option<PathBuf>,

    /// Repeatable; each occurrence raises the log level by one tier.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Arms the pre-instruction debugger hook.
    #[arg(long)]
    pub debugger: bool,

    /// Stops the run loop after this many instructions have executed.
    #[arg(long)]
    pub max_cycles: Option<u64>,

    /// Optional JSON config file, applied before the flags above.
    #[arg(long)]
    pub config: Option<PathBuf>,
}
