use clap::{Parser, Subcommand};

use self::{analyze::AnalyzeArg, generate::GenerateArg};

mod analyze;
mod generate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What to do
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Check how closely a sample follows a normal distribution
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Generate synthetic samples for trying out the analyzer
    Generate(#[clap(flatten)] GenerateArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Analyze(arg) => analyze::run(&arg)?,
        Mode::Generate(arg) => generate::run(&arg)?,
    }
    Ok(())
}
