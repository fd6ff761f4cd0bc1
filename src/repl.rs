//! Interactive read-eval-print loop.
//!
//! Grounded on `original_source/src/repl.py`: each line is preprocessed,
//! compiled and run independently (no variables persist across lines — a
//! fresh [`crate::vm::Vm`] with an empty environment is built every time),
//! empty input is ignored, and the literal line `exit` ends the session.

use std::io::{BufRead, Write};

use anyhow::Result;

use crate::{compile_source, preprocess, vm::Vm};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runs the REPL against `input`/`output`, returning once the session ends
/// (on `exit` or end-of-input). Taking generic streams instead of hardcoding
/// stdin/stdout keeps this testable without a terminal. `OilError` converts
/// into `anyhow::Error` for free, the same boundary `aeryz-bci`'s own
/// `anyhow::Result`-returning `run` methods sit at.
pub fn run<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<()> {
    writeln!(output, "OilLang {VERSION}. Type 'exit' to exit.")?;
    let mut line = String::new();
    loop {
        write!(output, ">> ")?;
        output.flush()?;
        line.clear();
        let bytes_read = input.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(output, "\nExiting...")?;
            return Ok(());
        }
        let trimmed = line.trim();
        if trimmed == "exit" {
            return Ok(());
        }
        if trimmed.is_empty() {
            continue;
        }

        let stripped = preprocess::strip_comments(trimmed);
        match compile_source(&stripped) {
            Ok(code) => {
                let mut interpreter = Vm::new(&code);
                match interpreter.run() {
                    Ok(()) => {}
                    Err(err) => writeln!(output, "Error: {err}")?,
                }
            }
            Err(err) => writeln!(output, "Error: {err}")?,
        }
    }
}
