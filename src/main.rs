//! jcanon CLI.
//!
//! Reads one JSON document from standard input and validates or
//! canonicalizes it. All failures print a single-line diagnostic to standard
//! error and exit non-zero.

use std::io::{Read, Write};
use std::process::ExitCode;

use clap::{ArgGroup, Parser};

use jcanon::{Config, Mode, WriteOptions};

#[derive(Parser)]
#[command(name = "jcanon")]
#[command(about = "Canonical JSON validator and serializer", long_about = None)]
#[command(version)]
#[command(group(ArgGroup::new("mode").required(true).args(["canonicalize", "validate"])))]
struct Cli {
    /// Read JSON from stdin and write its canonical form to stdout
    #[arg(short = 'c', long)]
    canonicalize: bool,

    /// Pretty-print the canonical form, indenting WIDTH spaces per level
    #[arg(
        short = 'p',
        long = "pretty",
        value_name = "WIDTH",
        requires = "canonicalize",
        num_args = 0..=1,
        default_missing_value = "4",
        value_parser = clap::value_parser!(u8).range(0..=15)
    )]
    pretty: Option<u8>,

    /// Read JSON from stdin and report validity via the exit status
    #[arg(short = 'v', long)]
    validate: bool,
}

impl Cli {
    fn config(&self) -> Config {
        let mode = if self.validate {
            Mode::ValidateOnly
        } else {
            Mode::ParseAndCanonicalize
        };
        let write = match self.pretty {
            Some(width) => WriteOptions::pretty(width),
            None => WriteOptions::compact(),
        };
        Config { mode, write }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.config();

    let mut input = Vec::new();
    if let Err(e) = std::io::stdin().read_to_end(&mut input) {
        eprintln!("jcanon: i/o error: {e}");
        return ExitCode::FAILURE;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = jcanon::run(&input, &mut out, &config) {
        eprintln!("jcanon: {e}");
        return ExitCode::FAILURE;
    }
    if let Err(e) = out.flush() {
        eprintln!("jcanon: i/o error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
