//! libdesk - library circulation desk console

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = libdesk::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
