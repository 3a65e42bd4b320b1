//! Callgrind Tree CLI
//!
//! Prints the call tree of a callgrind profile, annotated with the cost of
//! every function.

use anyhow::Result;
use clap::{ArgAction, Parser};
use env_logger::Env;
use std::path::PathBuf;
use std::process::ExitCode;

use callgrind_tree::commands::{execute_annotate, validate_args, AnnotateArgs};
use callgrind_tree::utils::config::{
    AnnotateConfig, DEFAULT_MAX_DEPTH, DEFAULT_ROOT_FUNCTION, RULE_WIDTH,
};

/// Callgrind Tree - cost-annotated call trees from callgrind profiles
#[derive(Parser, Debug)]
#[command(name = "callgrind-tree")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Callgrind profile to read
    file: PathBuf,

    /// On failure, dump the full error payload for inspection
    #[arg(long)]
    debug: bool,

    /// Trace decoding steps (-vv for every input line)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Function the call tree starts from
    #[arg(long, default_value = DEFAULT_ROOT_FUNCTION)]
    root: String,

    /// Deepest indentation level before a branch is aborted
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Keep linker/loader stub frames in the tree
    #[arg(long)]
    show_stubs: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    // Parse CLI arguments; wrong arity exits here with a usage message
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let config = AnnotateConfig::new()
        .with_root(cli.root)
        .with_max_depth(cli.max_depth)
        .with_ignore_stubs(!cli.show_stubs)
        .with_verbose(cli.verbose > 0);

    let args = AnnotateArgs {
        input: cli.file,
        output: cli.output,
        config,
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if cli.debug {
                post_mortem(&err);
            } else {
                eprintln!("Error: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &AnnotateArgs) -> Result<()> {
    validate_args(args)?;
    execute_annotate(args)
}

/// Dump everything the error carries: message chain and structured payload
fn post_mortem(err: &anyhow::Error) {
    let rule = "-".repeat(RULE_WIDTH);

    eprintln!("{}", rule);
    eprintln!("Caught error: {:#}", err);
    eprintln!("{}", rule);

    for (depth, cause) in err.chain().enumerate() {
        eprintln!("{:>3}: {}", depth, cause);
    }

    eprintln!("{}", rule);
    eprintln!("{:#?}", err);
    eprintln!("{}", rule);
}
