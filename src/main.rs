use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use brook::interpreter::engine::Interpreter;

/// Brook is a tree-walking interpreter for a small imperative scripting
/// language.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the program source file.
    source: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let interpreter = Interpreter::new();
    match interpreter.run_file(&args.source) {
        Ok(Some(value)) if value.printable() => {
            println!("Value: {}", value);
            ExitCode::SUCCESS
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(fault) => {
            eprintln!("{}", fault);
            ExitCode::FAILURE
        }
    }
}
