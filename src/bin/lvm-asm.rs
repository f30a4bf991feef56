//! Textual-source to `.clvm2` container assembler.
//!
//! Usage: `lvm-asm <input.lasm> [-o|--o <output.clvm2>]`

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use lvm::assembler::assemble;
use lvm::container::{Encoding, Header, Program};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("lvm-asm: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (input, output) = parse_args(&args)?;

    let source = fs::read_to_string(&input).map_err(|e| format!("reading {input:?}: {e}"))?;
    let (code, entry) = assemble(&source).map_err(|e| e.to_string())?;

    let program = Program::new(Encoding::Raw, Header::new(1, entry), &code);
    fs::write(&output, program.as_bytes()).map_err(|e| format!("writing {output:?}: {e}"))?;

    tracing::info!(input = %input.display(), output = %output.display(), entry, "assembled");
    Ok(())
}

fn parse_args(args: &[String]) -> Result<(PathBuf, PathBuf), String> {
    let mut input = None;
    let mut output = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--o" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| "-o requires a path".to_string())?;
                output = Some(PathBuf::from(value));
                i += 2;
            }
            positional if input.is_none() => {
                input = Some(PathBuf::from(positional));
                i += 1;
            }
            other => return Err(format!("unexpected argument '{other}'")),
        }
    }

    let input = input.ok_or_else(|| "usage: lvm-asm <input.lasm> [-o|--o <output.clvm2>]".to_string())?;
    let output = output.unwrap_or_else(|| input.with_extension("clvm2"));
    Ok((input, output))
}
