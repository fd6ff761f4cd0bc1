//! Command-line entry point: `oil` with no arguments starts the REPL,
//! `oil <path>` runs a file once.
//!
//! Grounded on `original_source/main.py`'s `main()` (file-not-found and
//! usage-arity handling, exit code 1 on any pipeline failure) and on
//! `aeryz-bci/examples/runner.rs`'s load-then-run-then-report shape.

use std::{env, fs, io, process};

use oillang::{compile_source, disasm, preprocess, repl, vm::Vm};

fn main() {
    let args: Vec<String> = env::args().collect();

    match args.len() {
        1 => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            if let Err(err) = repl::run(stdin.lock(), stdout.lock()) {
                eprintln!("Error: {err}");
                process::exit(1);
            }
        }
        2 => run_file(&args[1]),
        _ => {
            println!("Usage: oil [source_file.oil]");
            println!("If no file is provided, starts REPL mode.");
            process::exit(1);
        }
    }
}

fn run_file(path: &str) {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(_) => {
            eprintln!("Error: File '{path}' not found.");
            process::exit(1);
        }
    };

    let stripped = preprocess::strip_comments(&source);
    let code = match compile_source(&stripped) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    };

    println!("=== Bytecode ===");
    println!("{}", disasm::listing(&code));
    println!("=== Running VM ===");

    let mut interpreter = Vm::new(&code);
    if let Err(err) = interpreter.run() {
        eprintln!("Error during execution: {err}");
        process::exit(1);
    }
}
