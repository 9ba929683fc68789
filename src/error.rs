use std::io;

use thiserror::Error;

use crate::object::Object;
use crate::token::{Token, TokenType};

/// Everything that can unwind out of the pipeline. `Return` and `Break` are
/// not failures: they are the non-local control flow signals that a function
/// call or an enclosing `while` catches.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The parser already reported the details through the [`Reporter`];
    /// this is just the signal that sends it into panic-mode recovery.
    #[error("parse error")]
    Parse,

    #[error("[line {}] {}", .token.line, .message)]
    Runtime { token: Token, message: String },

    #[error("return signal")]
    Return { value: Object },

    #[error("break signal")]
    Break,
}

/// The error sink. One lives in the CLI driver and is borrowed by the
/// scanner, parser and resolver; the driver reports runtime errors itself
/// after `interpret` returns.
pub struct Reporter {
    pub had_error: bool,
    pub had_runtime_error: bool,
}

impl Reporter {
    pub fn new() -> Self {
        Self {
            had_error: false,
            had_runtime_error: false,
        }
    }

    /// The REPL clears the flags after every line so one bad line does not
    /// poison the session.
    pub fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }

    /// Scanner errors locate themselves by character offset rather than by
    /// token, since the offending input never became a token.
    pub fn lex_error(&mut self, line: i32, at_char: Option<usize>, message: &str) {
        let location = match at_char {
            Some(offset) => format!("chr {offset}"),
            None => String::new(),
        };
        self.report(line, &location, message);
    }

    /// Parse and resolve errors are anchored to a token.
    pub fn error(&mut self, token: &Token, message: &str) {
        self.report(token.line, &Self::locate(token), message);
    }

    pub fn runtime_error(&mut self, token: &Token, message: &str) {
        self.report(token.line, &Self::locate(token), message);
        self.had_runtime_error = true;
    }

    /// Warnings go to stderr but never block execution.
    pub fn warning(&mut self, line: i32, message: &str) {
        eprintln!("Warning in line {line}: {message}");
    }

    fn locate(token: &Token) -> String {
        if token.token_type == TokenType::Eof {
            "at end".to_string()
        } else {
            format!("at {}", token.lexeme)
        }
    }

    fn report(&mut self, line: i32, location: &str, message: &str) {
        eprintln!("Error in line {line} {location}: {message}");
        self.had_error = true;
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}
