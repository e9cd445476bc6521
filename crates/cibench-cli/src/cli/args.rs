use cibench_core::model::{EnhancementMethod, Persona};
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cibench",
    version,
    about = "Benchmark emotionally intelligent chatbots against a human baseline of contextual-integrity acceptability"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Drive one benchmark tier through a chatbot backend and record the
    /// scored conversation
    Run(RunArgs),
}

#[derive(clap::Args, Debug)]
#[command(group(
    ArgGroup::new("identity")
        .required(true)
        .args(["character", "enhancement"])
))]
pub struct RunArgs {
    /// Chatbot platform to benchmark
    #[arg(long, value_enum)]
    pub bot: BotArg,

    /// Character identity of a baseline run (exclusive with --enhancement)
    #[arg(long, value_enum)]
    pub character: Option<CharacterArg>,

    /// Enhancement method layered on the benchmark (exclusive with --character)
    #[arg(long, value_enum)]
    pub enhancement: Option<EnhancementArg>,

    /// Character identity of the recorded baseline an enhancement run
    /// builds on; required with --enhancement
    #[arg(long, value_enum, requires = "enhancement")]
    pub source_character: Option<CharacterArg>,

    /// Benchmark tier
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub tier: u8,

    /// Scenario/evaluation-task phrasing variant
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub variant: u8,

    /// Config file; defaults apply when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BotArg {
    NomiAi,
    Kindroid,
}

impl BotArg {
    pub fn label(self) -> &'static str {
        match self {
            BotArg::NomiAi => "nomi_ai",
            BotArg::Kindroid => "kindroid",
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharacterArg {
    Emilia,
    Matteo,
    MsSmith,
    SatoruGojo,
}

impl CharacterArg {
    pub fn persona(self) -> Persona {
        match self {
            CharacterArg::Emilia => Persona::Emilia,
            CharacterArg::Matteo => Persona::Matteo,
            CharacterArg::MsSmith => Persona::MsSmith,
            CharacterArg::SatoruGojo => Persona::SatoruGojo,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnhancementArg {
    Cot,
    SelfDefense,
    SelfDefenseProxy,
}

impl EnhancementArg {
    pub fn method(self) -> EnhancementMethod {
        match self {
            EnhancementArg::Cot => EnhancementMethod::ChainOfThought,
            EnhancementArg::SelfDefense => EnhancementMethod::SelfDefense,
            EnhancementArg::SelfDefenseProxy => EnhancementMethod::SelfDefenseProxy,
        }
    }
}
