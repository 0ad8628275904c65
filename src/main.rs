#[macro_use]
extern crate log;

mod bench;
mod block_source;
mod error;
mod executor;
mod file_map;
mod input_file;
mod progress_reporter;
mod shared_types;

use std::error::Error;
use std::io;
use std::path::PathBuf;

use bench::{BenchContext, RunSettings};
use block_source::Extraction;
use clap::Parser;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Number of blocks to map
    #[arg(short, long, default_value = "24")]
    n: u64,

    /// Ranges at or below this many blocks are processed sequentially
    #[arg(short, long, default_value = "25")]
    cutoff: u64,

    /// Input file, written fresh unless --no-create is given
    #[arg(short, long, default_value = "input.dat")]
    input: PathBuf,

    /// Map an existing input file instead of writing one
    #[arg(long)]
    no_create: bool,

    /// Keep the generated input file after the run
    #[arg(long)]
    keep: bool,

    /// Worker threads (defaults to one per logical CPU)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Run every fork on the calling thread
    #[arg(long)]
    sequential: bool,

    /// How a block becomes the value that gets summed
    #[arg(short = 'x', long, value_enum, default_value_t = Extraction::FirstByte)]
    extract: Extraction,

    /// Show a progress bar over processed blocks
    #[arg(long)]
    progress: bool,

    /// One of off, error, warn, info, debug, trace
    #[arg(long, default_value = "info")]
    log_level: simplelog::LevelFilter,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();

    let level = args.log_level;
    let multi = MultiProgress::new();
    let logger = *simplelog::TermLogger::new(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    LogWrapper::new(multi.clone(), logger).try_init()?;
    log::set_max_level(level);

    let settings = RunSettings {
        input: args.input,
        create_input: !args.no_create,
        keep_input: args.keep,
        threads: args.threads,
        sequential: args.sequential,
        extraction: args.extract,
        show_progress: args.progress,
    };
    let mut ctx = BenchContext::new(args.n, args.cutoff, settings);

    ctx.launch(&multi, &mut io::stdout().lock())?;

    Ok(())
}
