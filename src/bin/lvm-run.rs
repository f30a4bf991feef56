//! Runs a `.clvm2` container, or itself if a container has been bundled onto
//! the end of this executable.
//!
//! Usage: `lvm-run [<input.clvm2>]`

use std::path::PathBuf;
use std::process::ExitCode;

use lvm::loader::{load, load_program_bytes};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => {
            // Guest exit codes are u64; the process exit status is a byte.
            ExitCode::from((code & 0xFF) as u8)
        }
        Err(message) => {
            eprintln!("lvm-run: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<u64, String> {
    let path = std::env::args().nth(1).map(PathBuf::from);
    let bytes = load_program_bytes(path.as_deref()).map_err(|e| e.to_string())?;
    let mut vm = load(bytes).map_err(|e| e.to_string())?;
    vm.run().map_err(|e| e.to_string())
}
