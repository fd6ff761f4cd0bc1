//! OilLang: lexer, parser, compiler and stack VM for a small teaching
//! language.
//!
//! Pipeline: source text flows through [`lexer::Lexer`], [`parser::parse`],
//! [`compiler::compile`] and [`vm::Vm`] in turn. [`compile_source`] and
//! [`run_source`] wire the whole chain together, the way `aeryz-bci`'s
//! crate root re-exports one `pub mod` per pipeline stage and leaves the
//! wiring to its callers. Comment stripping ([`preprocess::strip_comments`])
//! happens upstream of this pipeline, in the file and REPL entry points —
//! the lexer's input is source text with `//` comments already gone.
//!
//! ```text
//! x = 5;
//! while (x > 0) {
//!     print x;
//!     x -= 1;
//! }
//! ```

pub mod ast;
pub mod compiler;
pub mod disasm;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod preprocess;
pub mod repl;
pub mod token;
pub mod vm;

use error::OilError;

/// Runs lexer, parser and compiler over `source`, without executing it.
/// `source` is expected to already have `//` comments stripped.
pub fn compile_source(source: &str) -> Result<Vec<compiler::Instruction>, OilError> {
    let program = parser::parse(source)?;
    compiler::compile(&program)
}

/// Compiles and runs `source`, returning every line the program printed.
pub fn run_source(source: &str) -> Result<Vec<String>, OilError> {
    let code = compile_source(source)?;
    let mut vm = vm::Vm::new(&code);
    vm.run()?;
    Ok(vm.output_lines)
}
