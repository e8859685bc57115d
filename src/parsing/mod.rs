//! Parsing
//!
//! This module turns the source text into an [ast::Program]. Lexing and
//! parsing are interleaved: the [parser] is a recursive descent over the
//! token stream with a single token of lookahead, backed by the peek-
//! memoizing [stream::TokenStream]. The main interface is [parse].
//!
//! The first error aborts parsing; there is no recovery.

mod parser;
mod stream;

use miette::Diagnostic;
use thiserror::Error;

use crate::ast;
use crate::lexing::{LexError, Lexer};
use crate::util::{Position, Span};

#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error("Expected {expected} but got `{found}` ({position})")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: Position,

        #[label("unexpected token")]
        span: Span,
    },

    #[error("Expected {expected} but the input ended")]
    UnexpectedEof {
        expected: String,

        #[label("input ends here")]
        span: Span,
    },

    #[error("Trailing input after the final `.` ({position})")]
    TrailingInput {
        position: Position,

        #[label("expected end of input")]
        span: Span,
    },
}

type Result<T> = std::result::Result<T, ParseError>;

/// Parse Mila source code into an AST
pub fn parse(source: &str) -> Result<ast::Program> {
    parser::Parser::new(Lexer::new(source)).program()
}
