//! Token stream
//!
//! A stack-like wrapper around the lexer that memoizes the peeked token,
//! giving the parser its single token of lookahead.

use crate::lexing::{LexError, Lexer, SpannedToken};
use crate::util::Span;

pub(super) struct TokenStream<'src> {
    lexer: Lexer<'src>,
    peeked: Option<SpannedToken>,
}

impl<'src> TokenStream<'src> {
    pub fn new(lexer: Lexer<'src>) -> Self {
        Self {
            lexer,
            peeked: None,
        }
    }

    /// Look at the next token without consuming it
    pub fn peek(&mut self) -> Result<Option<&SpannedToken>, LexError> {
        if self.peeked.is_none() {
            self.peeked = self.lexer.next_token()?;
        }

        Ok(self.peeked.as_ref())
    }

    /// Consume the next token
    pub fn next(&mut self) -> Result<Option<SpannedToken>, LexError> {
        match self.peeked.take() {
            Some(token) => Ok(Some(token)),
            None => self.lexer.next_token(),
        }
    }

    /// An empty span pointing past the end of the source
    pub fn end_span(&self) -> Span {
        self.lexer.end_span()
    }
}
