pub mod args;
pub mod commands;

pub use args::{InspectArgs, MergeArgs, TreeFileArgs};
use crate::core::types::TreeFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
INPUT SET COMMANDS:\n{subcommands}\n";

#[derive(Parser, Debug)]
#[command(name = "reconciler")]
#[command(version = crate::VERSION)]
#[command(about = "Reconcile saved pipeline input sets against updated templates")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: clear a template into a blank input set, fill it in, then merge it back whenever the template changes."
)]
pub struct Args {
    /// Configuration file (default: ./reconciler.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format: yaml or json (default: from config, else yaml)
    #[arg(long, global = true, value_name = "FORMAT")]
    pub format: Option<TreeFormat>,

    /// Write the result to FILE instead of stdout
    #[arg(long, short = 'o', global = true, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(
        about = "Merge a saved input set into the current template",
        long_about = "Merge keeps the template's structure, matches stages and steps by identifier, and carries input-set values into every runtime input the template still declares.",
        after_help = "Example:\n    reconciler merge --template pipeline.yaml --input-set saved.yaml --use-default-values"
    )]
    Merge(MergeArgs),
    #[command(
        about = "Blank every runtime input in a tree",
        long_about = "Clear turns each <+input> leaf into an empty value or its declared default, keeping execution inputs.",
        after_help = "Example:\n    reconciler clear pipeline.yaml"
    )]
    Clear(TreeFileArgs),
    #[command(
        about = "Replace runtime inputs that declare a default",
        after_help = "Example:\n    reconciler defaults pipeline.yaml --format json"
    )]
    Defaults(TreeFileArgs),
    #[command(
        about = "Merge variable lists by name",
        long_about = "Variables merges two sequences of variable records by name, keeping template order, optionally backfilling defaults from the all-values sequence.",
        after_help = "Example:\n    reconciler variables --template vars.yaml --input-set saved.yaml"
    )]
    Variables(MergeArgs),
    #[command(
        about = "Show how a runtime-input marker parses",
        after_help = "Example:\n    reconciler inspect '<+input>.default(a).allowedValues(a,b)'"
    )]
    Inspect(InspectArgs),
    #[command(
        about = "List runtime inputs still present in a tree",
        after_help = "Example:\n    reconciler unresolved merged.yaml"
    )]
    Unresolved(TreeFileArgs),
}

pub fn run(args: Args) -> crate::Result<()> {
    let config = commands::load_config(args.config.as_deref())?;
    let sink = commands::OutputSink::new(args.format.unwrap_or(config.output.format), args.output);
    match args.command {
        Command::Merge(merge_args) => commands::merge(&merge_args, &config, &sink),
        Command::Clear(file_args) => commands::clear(&file_args, &config, &sink),
        Command::Defaults(file_args) => commands::defaults(&file_args, &sink),
        Command::Variables(merge_args) => commands::variables(&merge_args, &config, &sink),
        Command::Inspect(inspect_args) => commands::inspect(&inspect_args, &sink),
        Command::Unresolved(file_args) => commands::unresolved(&file_args, &sink),
    }
}
