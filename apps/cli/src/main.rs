//! # gomarket Entry Point
//!
//! Parses arguments, runs one command, prints JSON.
//!
//! ## Output Contract
//! - Success: cart (or config) JSON on stdout, exit 0
//! - Failure: `{"code": ..., "message": ...}` on stderr, exit 1
//! - Logs: stderr, filtered by `RUST_LOG`

use std::process::ExitCode;

use clap::Parser;
use gomarket_cli::{init_tracing, run, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e.to_json());
            ExitCode::FAILURE
        }
    }
}
