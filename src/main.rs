//! dupemark - per-directory duplicate file marker
//!
//! Entry point for the dupemark CLI application.

use clap::Parser;
use dupemark::{
    cli::Cli,
    error::{ExitCode, StructuredError},
};

fn main() {
    let cli = Cli::parse();
    let json_errors = cli.json_errors;

    match dupemark::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = ExitCode::for_error(&err);
            if json_errors {
                eprintln!("{}", StructuredError::new(&err, exit_code).to_json());
            } else {
                eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err);
            }
            std::process::exit(exit_code.as_i32());
        }
    }
}
