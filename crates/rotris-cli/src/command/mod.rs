use clap::{Parser, Subcommand};

use self::{autoplay::AutoplayArg, dump::DumpArg};

mod autoplay;
mod dump;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Let the placement search play a game and print the final bucket
    Autoplay(#[clap(flatten)] AutoplayArg),
    /// Print the freshly reset grid of a configuration
    Dump(#[clap(flatten)] DumpArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Autoplay(arg) => autoplay::run(&arg)?,
        Mode::Dump(arg) => dump::run(&arg)?,
    }
    Ok(())
}
