use std::io::{self, Read, Write};

use rich_delta::{Delta, DeltaError, EmbedRegistry, NestedDelta};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::cli::*;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Delta(#[from] DeltaError),
    #[error("invalid JSON for {name}: {source}")]
    Json {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("only one argument may be read from stdin")]
    StdinReused,
    #[error("failed to read stdin: {0}")]
    Io(#[from] io::Error),
}

/// Resolves change arguments, reading at most one of them from stdin.
struct Inputs<R> {
    stdin: Option<R>,
}

impl<R: Read> Inputs<R> {
    fn new(stdin: R) -> Self {
        Self { stdin: Some(stdin) }
    }

    fn delta(&mut self, name: &'static str, arg: &str) -> Result<Delta, CliError> {
        let text = if arg == "-" {
            let mut stdin = self.stdin.take().ok_or(CliError::StdinReused)?;
            let mut buf = String::new();
            stdin.read_to_string(&mut buf)?;
            buf
        } else {
            arg.to_owned()
        };
        let value: Value =
            serde_json::from_str(text.trim()).map_err(|source| CliError::Json { name, source })?;
        Ok(Delta::from_json(&value)?)
    }
}

fn registry(keys: &[String]) -> EmbedRegistry {
    let mut registry = EmbedRegistry::new();
    for key in keys {
        registry.register(key.clone(), NestedDelta);
    }
    registry
}

/// Run one subcommand and return its JSON result.
fn execute<R: Read>(cli: &Cli, inputs: &mut Inputs<R>) -> Result<Value, CliError> {
    let embeds = registry(&cli.embeds);
    debug!(?embeds, "running command");
    let result = match &cli.command {
        Command::Compose(args) => {
            let a = inputs.delta("A", &args.a)?;
            let b = inputs.delta("B", &args.b)?;
            a.compose_with(&b, &embeds)?
        }
        Command::Transform(args) => {
            let a = inputs.delta("A", &args.a)?;
            let b = inputs.delta("B", &args.b)?;
            match &args.base {
                Some(base) => {
                    let base = inputs.delta("BASE", base)?;
                    a.transform_on_with(&base, &b, args.priority, &embeds)?
                }
                None => a.transform_with(&b, args.priority, &embeds)?,
            }
        }
        Command::Invert(args) => {
            let change = inputs.delta("CHANGE", &args.change)?;
            let base = inputs.delta("BASE", &args.base)?;
            change.invert_with(&base, &embeds)?
        }
        Command::Diff(args) => {
            let a = inputs.delta("A", &args.a)?;
            let b = inputs.delta("B", &args.b)?;
            a.diff(&b)?
        }
        Command::Apply(args) => {
            let change = inputs.delta("CHANGE", &args.change)?;
            let document = inputs.delta("DOCUMENT", &args.document)?;
            change.apply_with(&document, &embeds)?
        }
        Command::Length(args) => {
            let change = inputs.delta("CHANGE", &args.change)?;
            return Ok(json!({
                "length": change.length(),
                "baseLength": change.base_length(),
                "changeLength": change.change_length(),
            }));
        }
    };
    Ok(result.to_json())
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut inputs = Inputs::new(io::stdin().lock());
    let value = execute(&cli, &mut inputs)?;
    let text = if cli.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{text}")?;
    Ok(())
}
