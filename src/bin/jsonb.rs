//! jsonb command-line tool.
//!
//! Converts a JSON document to jsonb or back.
//!
//! # Usage
//!
//! ```text
//! jsonb -e -i doc.json -o doc.jsonb
//! jsonb -d < doc.jsonb
//! ```
//!
//! # Options
//!
//! - `-i FILE` - Input file, `-` for stdin (default: -)
//! - `-o FILE` - Output file, `-` for stdout (default: -)
//! - `-e` - Encode JSON into jsonb
//! - `-d` - Decode jsonb into JSON
//! - `--max-depth N` - Reject documents nested deeper than N
//!
//! Log verbosity is controlled with `RUST_LOG` (default: warn).

use std::process::ExitCode;

use jsonb::io::{read_document, write_document};
use jsonb::{JsonbCodec, JsonbError, Mode};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: jsonb (-e | -d) [-i FILE] [-o FILE] [--max-depth N]

Options:
  -i FILE          input file, - for stdin (default: -)
  -o FILE          output file, - for stdout (default: -)
  -e               encode JSON into jsonb
  -d               decode jsonb into JSON
  --max-depth N    reject documents nested deeper than N
  -h, --help       print this help";

#[derive(Debug, PartialEq, Eq)]
struct CliConfig {
    input: String,
    output: String,
    mode: Mode,
    max_depth: Option<usize>,
}

#[derive(Debug, PartialEq, Eq)]
enum ParseOutcome {
    Run(CliConfig),
    Help,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<ParseOutcome, String> {
    let mut input = "-".to_string();
    let mut output = "-".to_string();
    let mut encode = false;
    let mut decode = false;
    let mut max_depth = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-i" => input = args.next().ok_or("-i requires a file argument")?,
            "-o" => output = args.next().ok_or("-o requires a file argument")?,
            "-e" => encode = true,
            "-d" => decode = true,
            "--max-depth" => {
                let value = args.next().ok_or("--max-depth requires a number")?;
                let limit = value
                    .parse::<usize>()
                    .map_err(|_| format!("invalid --max-depth value '{value}'"))?;
                max_depth = Some(limit);
            }
            "-h" | "--help" => return Ok(ParseOutcome::Help),
            other => return Err(format!("unknown argument '{other}'")),
        }
    }

    let mode = match (encode, decode) {
        (true, false) => Mode::Encode,
        (false, true) => Mode::Decode,
        _ => return Err("either -e or -d must be set".to_string()),
    };

    Ok(ParseOutcome::Run(CliConfig {
        input,
        output,
        mode,
        max_depth,
    }))
}

async fn open_input(path: &str) -> Result<Box<dyn AsyncRead + Unpin>, JsonbError> {
    if path == "-" {
        Ok(Box::new(tokio::io::stdin()))
    } else {
        Ok(Box::new(File::open(path).await?))
    }
}

async fn open_output(path: &str) -> Result<Box<dyn AsyncWrite + Unpin>, JsonbError> {
    if path == "-" {
        Ok(Box::new(tokio::io::stdout()))
    } else {
        Ok(Box::new(File::create(path).await?))
    }
}

async fn run(config: CliConfig) -> Result<usize, JsonbError> {
    let mut builder = JsonbCodec::builder();
    if let Some(limit) = config.max_depth {
        builder = builder.max_depth(limit);
    }
    let codec = builder.build();

    // Convert before touching the output so a failed run leaves no file behind.
    let mut reader = open_input(&config.input).await?;
    let document = read_document(&mut reader).await?;
    let converted = codec.transcode(config.mode, &document)?;

    let mut writer = open_output(&config.output).await?;
    write_document(&mut writer, &converted).await?;
    Ok(converted.len())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = match parse_args(std::env::args().skip(1)) {
        Ok(ParseOutcome::Run(config)) => config,
        Ok(ParseOutcome::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("{USAGE}\n\n{message}");
            return ExitCode::FAILURE;
        }
    };

    tracing::debug!(?config, "starting conversion");
    match run(config).await {
        Ok(written) => {
            tracing::debug!(written, "conversion complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "conversion failed");
            eprintln!("jsonb: {e}");
            ExitCode::FAILURE
        }
    }
}
