//! protobuf-metta: write the MeTTa rendering of a .proto file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use metta_generator::{Options, generate_metta};
use parser::Loader;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "protobuf-metta", version)]
#[command(about = "Translate a protobuf schema into MeTTa type declarations")]
struct Args {
    /// Input .proto file
    input: PathBuf,

    /// Output file [default: the input path with a .metta extension]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Prefix for every MeTTa symbol [default: the protobuf package]
    #[arg(short, long, default_value = "")]
    prefix: String,

    /// Declare constructors as curried (nested single-argument) functions
    #[arg(short, long)]
    curried: bool,

    /// Directories searched for imported .proto files
    #[arg(short = 'I', long = "proto-path")]
    proto_paths: Vec<PathBuf>,

    /// Log progress to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension("metta"))
    }

    fn options(&self) -> Options {
        Options::default()
            .with_prefix(self.prefix.as_str())
            .with_curried(self.curried)
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(args: &Args) -> Result<PathBuf> {
    let schema = Loader::new(&args.proto_paths)
        .load(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;

    let metta = generate_metta(&schema, &args.options());

    let output = args.output_path();
    std::fs::write(&output, metta)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        input = %args.input.display(),
        output = %output.display(),
        messages = schema.messages.len(),
        services = schema.services.len(),
        "wrote MeTTa representation"
    );
    Ok(output)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    run(&args)?;
    Ok(())
}
