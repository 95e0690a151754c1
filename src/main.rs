use anyhow::Result;
use biotorus_lib::app::{App, RunOptions};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path (defaults are used when it does not exist)
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 1000)]
    ticks: u64,

    /// Override the configured seed
    #[arg(long)]
    seed: Option<u64>,

    /// Resume from a save file instead of starting a new world
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write the final state here (`.gz` for gzip)
    #[arg(long)]
    save: Option<PathBuf>,

    /// Ticks between progress reports, 0 to disable
    #[arg(long, default_value_t = 100)]
    report_every: u64,

    /// Write the ancestry graph as Graphviz DOT
    #[arg(long)]
    ancestry_dot: Option<PathBuf>,
}

impl From<Args> for RunOptions {
    fn from(args: Args) -> Self {
        Self {
            config: args.config,
            ticks: args.ticks,
            seed: args.seed,
            load: args.load,
            save: args.save,
            report_every: args.report_every,
            ancestry_dot: args.ancestry_dot,
        }
    }
}

fn main() -> Result<()> {
    biotorus_core::init_logging();
    let args = Args::parse();

    let mut app = App::new(args.into())?;
    let summary = app.run()?;
    println!(
        "tick {}: {} prey, {} predators (digest {})",
        summary.final_tick, summary.prey, summary.predators, summary.digest
    );
    Ok(())
}
