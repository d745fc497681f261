use std::{env, fs, io, path::PathBuf};

use clap::Parser;
use miette::{IntoDiagnostic, NamedSource, WrapErr};
use tdl_interpreter as tdl;
use tdl::{
    lexer::normalize_line_endings,
    runner::{RunOptions, Runner},
    runtime::Runtime,
};

const WELCOME_MESSAGE: &str = "Thanks for checking out the TDL test interpreter! \
    Supply a test declaration file to begin testing.";

/// Runs the test cases declared in a TDL file and reports the results
#[derive(Parser, Debug)]
#[command(name = "tdl", version, about, long_about = None)]
struct Args {
    /// Test declaration file, relative to the current directory
    filename: Option<PathBuf>,

    /// Print the token stream before parsing
    #[arg(long = "printtokens")]
    print_tokens: bool,

    /// Also render lexer and parser errors as annotated reports on stderr
    #[arg(long)]
    verbose: bool,
}

fn main() -> miette::Result<()> {
    let args = Args::parse();

    let Some(filename) = args.filename else {
        tdl::log_stdout!("{WELCOME_MESSAGE}");
        return Ok(());
    };

    let path = env::current_dir()
        .into_diagnostic()
        .wrap_err("Failed to resolve the current directory")?
        .join(filename);

    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tdl::log_stdout!("File \"{}\" not found", path.display());
            std::process::exit(1);
        }
        Err(_) => {
            tdl::log_stdout!("File \"{}\" could not be opened", path.display());
            std::process::exit(1);
        }
    };

    let options = RunOptions {
        print_tokens: args.print_tokens,
    };

    if let Err(e) = Runner::new(&source, Runtime::standard(), options).run() {
        tdl::log_stdout!("{e}");

        if args.verbose {
            // spans point into the normalized text
            let source = NamedSource::new(
                path.display().to_string(),
                normalize_line_endings(&source).into_owned(),
            );
            let report = miette::Report::new(e).with_source_code(source);
            tdl::log_stderr!("{report:?}");
        }

        std::process::exit(1);
    }

    Ok(())
}
