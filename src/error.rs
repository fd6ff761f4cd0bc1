//! Error taxonomy for the OilLang pipeline.
//!
//! Each pipeline stage gets its own variant, carrying the line and source
//! text a diagnostic needs to point at the failure. The type implements
//! `std::error::Error`, so it converts into `anyhow::Error` for free once it
//! reaches the CLI/REPL boundary.

use std::fmt;

use crate::token::Token;

/// Unified error type for lexing, parsing, compiling, and running a program.
#[derive(Debug, Clone, PartialEq)]
pub enum OilError {
    Lex {
        message: String,
        line: usize,
        source_line: String,
    },
    Parse {
        message: String,
        line: usize,
        source_line: String,
    },
    Compile {
        message: String,
    },
    Runtime {
        message: String,
    },
}

impl OilError {
    pub fn lex(message: impl Into<String>, line: usize, source_line: impl Into<String>) -> Self {
        OilError::Lex {
            message: message.into(),
            line,
            source_line: source_line.into(),
        }
    }

    pub fn parse(message: impl Into<String>, line: usize, source_line: impl Into<String>) -> Self {
        OilError::Parse {
            message: message.into(),
            line,
            source_line: source_line.into(),
        }
    }

    pub fn compile(message: impl Into<String>) -> Self {
        OilError::Compile {
            message: message.into(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        OilError::Runtime {
            message: message.into(),
        }
    }

    /// Builds a `Parse` error from the token the parser choked on.
    pub fn unexpected(token: &Token, message: impl Into<String>, source_line: impl Into<String>) -> Self {
        OilError::Parse {
            message: message.into(),
            line: token.line,
            source_line: source_line.into(),
        }
    }
}

impl fmt::Display for OilError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OilError::Lex {
                message,
                line,
                source_line,
            }
            | OilError::Parse {
                message,
                line,
                source_line,
            } => write!(f, "SyntaxError at line {line}:\n  {source_line}\n  {message}"),
            OilError::Compile { message } => write!(f, "CompileError: {message}"),
            OilError::Runtime { message } => write!(f, "RuntimeError: {message}"),
        }
    }
}

impl std::error::Error for OilError {}
