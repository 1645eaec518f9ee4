//! taskp - keep `.taskp` task documents in sync with the codebase

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = taskpiea::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
