//! `rocc`: compiles one `.roc` source file.
//!
//! Mirrors the reference compiler's command-line contract exactly: one
//! positional input file, a `.roc` extension requirement, `output.s`
//! written to the working directory on success, exit code 0 on success
//! and 1 on any input or compilation error.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

/// Ahead-of-time compiler for the roc surface language.
#[derive(Parser)]
#[command(name = "rocc")]
#[command(about = "Compiles a .roc source file", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the `.roc` file to compile.
    input: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli.input) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(input: &Path) -> Result<(), String> {
    if input.extension().and_then(|e| e.to_str()) != Some("roc") {
        return Err("Expected input Roc lang file".to_string());
    }

    let source = fs::read_to_string(input)
        .map_err(|_| "Input file does not exist".to_string())?;

    log::debug!("compiling {}", input.display());
    let module_name = roc_compile::module_name_from_path(input);
    let backend = roc_compile::StubBackend;
    let (compiled, interner) = roc_compile::compile_source(&source, &module_name, &backend)
        .map_err(|err| err.render(&input.display().to_string(), &source))?;

    fs::write("output.s", &compiled.artifact.bytes)
        .map_err(|e| format!("failed to write output.s: {e}"))?;

    log::info!(
        "compiled module `{}` ({} function(s))",
        interner.resolve(compiled.module_name),
        compiled.mir.functions.len()
    );

    Ok(())
}
