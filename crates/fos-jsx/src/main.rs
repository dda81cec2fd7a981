//! fOS JSX - command line compiler
//!
//! `fos-jsx <input> [-o <output>] [--config <json>]`

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use fos_jsx::{compile, Config};
use tracing_subscriber::EnvFilter;

struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut input = None;
    let mut output = None;
    let mut config = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-o" | "--output" => {
                output = Some(PathBuf::from(args.next().context("missing path after -o")?));
            }
            "--config" => {
                config = Some(PathBuf::from(args.next().context("missing path after --config")?));
            }
            flag if flag.starts_with('-') => bail!("unknown option {}", flag),
            path => {
                if input.replace(PathBuf::from(path)).is_some() {
                    bail!("only one input file is accepted");
                }
            }
        }
    }
    let input = input.context("usage: fos-jsx <input> [-o <output>] [--config <json>]")?;
    Ok(Args {
        input,
        output,
        config,
    })
}

fn run() -> anyhow::Result<bool> {
    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let source = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let output = match compile(&source, &config) {
        Ok(output) => output,
        Err(err) => {
            eprint!("{}", err.report(&source, &args.input.display().to_string()));
            return Ok(false);
        }
    };
    tracing::info!(
        "{}: {} partials hoisted, {} validated",
        args.input.display(),
        output.partials,
        output.validations
    );

    match &args.output {
        Some(path) => std::fs::write(path, &output.code)
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{}", output.code),
    }
    Ok(true)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
