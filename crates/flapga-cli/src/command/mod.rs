use clap::{Parser, Subcommand};

use self::{evaluate::EvaluateArg, init_config::InitConfigArg, train::TrainArg};

mod evaluate;
mod init_config;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve flight policies with the genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Fly a saved model through fresh worlds and report its scores
    Evaluate(#[clap(flatten)] EvaluateArg),
    /// Write the default training configuration as JSON
    InitConfig(#[clap(flatten)] InitConfigArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
        Mode::InitConfig(arg) => init_config::run(&arg)?,
    }
    Ok(())
}
