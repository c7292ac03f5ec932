use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rich-delta",
    about = "Compose, transform, invert and diff rich-text deltas",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Register the nested-delta embed handler under KEY (repeatable)
    #[arg(long = "embed", value_name = "KEY", global = true)]
    pub embeds: Vec<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Combine two sequential changes into one
    Compose(PairArgs),
    /// Rewrite B to apply after the concurrent change A
    Transform(TransformArgs),
    /// Build the change that undoes CHANGE against BASE
    Invert(InvertArgs),
    /// Build the change turning document A into document B
    Diff(PairArgs),
    /// Apply CHANGE to DOCUMENT, checking that it fits
    Apply(ApplyArgs),
    /// Print the output, base and net lengths of a change
    Length(LengthArgs),
}

/// Change arguments are JSON; `-` reads the value from stdin.
#[derive(Args)]
pub struct PairArgs {
    pub a: String,
    pub b: String,
}

#[derive(Args)]
pub struct TransformArgs {
    pub a: String,
    pub b: String,
    /// Treat A as having happened first
    #[arg(long)]
    pub priority: bool,
    /// Document both changes were made against; checks they fit it
    #[arg(long, value_name = "DOCUMENT")]
    pub base: Option<String>,
}

#[derive(Args)]
pub struct InvertArgs {
    pub change: String,
    pub base: String,
}

#[derive(Args)]
pub struct ApplyArgs {
    pub change: String,
    pub document: String,
}

#[derive(Args)]
pub struct LengthArgs {
    pub change: String,
}
