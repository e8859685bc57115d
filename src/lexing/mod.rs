//! Lexer
//!
//! This module splits the source text into [Token]s using a character-level
//! state machine with one character of lookahead. The main interface is
//! [Lexer::next_token]; every token carries its byte [Span] and the
//! line/column [Position] of its first character.
//!
//! Lexer errors are fatal, there is no recovery.

mod state;
mod token;

pub use token::{
    control_symbol_table, keyword_table, operator_table, ControlSymbol, Keyword, Operator, Token,
};

use std::iter::Peekable;
use std::str::CharIndices;

use miette::Diagnostic;
use thiserror::Error;

use crate::util::{Position, Span};

use state::{extract, step, State, Step};

#[derive(Debug, Error, Diagnostic)]
pub enum LexError {
    #[error("Unexpected character `{character}` ({position})")]
    UnexpectedCharacter {
        character: char,
        position: Position,

        #[label("this character")]
        span: Span,
    },

    #[error("Unexpected end of input ({position})")]
    UnexpectedEndOfInput {
        position: Position,

        #[label("input ends here")]
        span: Span,
    },
}

type Result<T> = std::result::Result<T, LexError>;

/// A token together with its source location
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
    pub position: Position,
}

/// The lexer state machine driver
pub struct Lexer<'src> {
    chars: Peekable<CharIndices<'src>>,
    source_len: usize,
    state: State,
    position: Position,
    token_start: Position,
    token_offset: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            chars: source.char_indices().peekable(),
            source_len: source.len(),
            state: State::Start,
            position: Position::start(),
            token_start: Position::start(),
            token_offset: 0,
        }
    }

    /// Position of the next unconsumed character
    pub fn position(&self) -> Position {
        self.position
    }

    /// An empty span pointing past the end of the source
    pub fn end_span(&self) -> Span {
        Span::marker(self.source_len)
    }

    /// Scan the next token; `Ok(None)` signals the end of input
    pub fn next_token(&mut self) -> Result<Option<SpannedToken>> {
        loop {
            if self.state == State::Start {
                self.skip_whitespace();
                self.token_start = self.position;
                self.token_offset = self.peek_offset();
            }

            let Some(&(offset, ch)) = self.chars.peek() else {
                let state = std::mem::replace(&mut self.state, State::Start);
                if state == State::Start {
                    return Ok(None);
                }

                return match extract(state) {
                    Some(token) => Ok(Some(self.spanned(token, self.source_len))),
                    None => Err(LexError::UnexpectedEndOfInput {
                        position: self.position,
                        span: Span::marker(self.source_len),
                    }),
                };
            };

            let state = std::mem::replace(&mut self.state, State::Start);
            match step(state, ch) {
                Step::To(next) => {
                    self.bump();
                    self.state = next;
                }
                Step::Emit(token) => {
                    self.bump();
                    return Ok(Some(self.spanned(token, offset + ch.len_utf8())));
                }
                Step::Reject(state) => match extract(state) {
                    // the offending character stays for the next round
                    Some(token) => return Ok(Some(self.spanned(token, offset))),
                    None => {
                        return Err(LexError::UnexpectedCharacter {
                            character: ch,
                            position: self.position,
                            span: Span::new(offset, offset + ch.len_utf8()),
                        })
                    }
                },
            }
        }
    }

    fn spanned(&self, token: Token, end: usize) -> SpannedToken {
        SpannedToken {
            token,
            span: Span::new(self.token_offset, end),
            position: self.token_start,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, ch)) = self.chars.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.bump();
        }
    }

    fn peek_offset(&mut self) -> usize {
        self.chars
            .peek()
            .map_or(self.source_len, |&(offset, _)| offset)
    }

    fn bump(&mut self) {
        if let Some((_, ch)) = self.chars.next() {
            self.position.advance(ch);
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<SpannedToken>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Vec<Token> {
        Lexer::new(source)
            .map(|token| token.unwrap().token)
            .collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            tokenize("program prog begin end foo_2 _x"),
            vec![
                Token::Keyword(Keyword::Program),
                Token::Identifier(String::from("prog")),
                Token::Keyword(Keyword::Begin),
                Token::Keyword(Keyword::End),
                Token::Identifier(String::from("foo_2")),
                Token::Identifier(String::from("_x")),
            ]
        );
    }

    #[test]
    fn keyword_lookup_is_case_sensitive() {
        assert_eq!(
            tokenize("Begin BEGIN begin"),
            vec![
                Token::Identifier(String::from("Begin")),
                Token::Identifier(String::from("BEGIN")),
                Token::Keyword(Keyword::Begin),
            ]
        );
    }

    #[test]
    fn boolean_literals() {
        assert_eq!(
            tokenize("true false truely"),
            vec![
                Token::Boolean(true),
                Token::Boolean(false),
                Token::Identifier(String::from("truely")),
            ]
        );
    }

    #[test]
    fn integer_literals() {
        assert_eq!(
            tokenize("0 42 &17 &0 $ff $FF $10"),
            vec![
                Token::Integer(0),
                Token::Integer(42),
                Token::Integer(0o17),
                Token::Integer(0),
                Token::Integer(0xff),
                Token::Integer(0xff),
                Token::Integer(0x10),
            ]
        );
    }

    #[test]
    fn operators_and_control_symbols() {
        assert_eq!(
            tokenize("= <> <= < >= > + - * / := ; : , . .. ( ) [ ]"),
            vec![
                Token::Operator(Operator::Eq),
                Token::Operator(Operator::NotEq),
                Token::Operator(Operator::LessEq),
                Token::Operator(Operator::Less),
                Token::Operator(Operator::GreaterEq),
                Token::Operator(Operator::Greater),
                Token::Operator(Operator::Plus),
                Token::Operator(Operator::Minus),
                Token::Operator(Operator::Times),
                Token::Operator(Operator::Divide),
                Token::Operator(Operator::Assign),
                Token::ControlSymbol(ControlSymbol::Semicolon),
                Token::ControlSymbol(ControlSymbol::Colon),
                Token::ControlSymbol(ControlSymbol::Comma),
                Token::ControlSymbol(ControlSymbol::Dot),
                Token::ControlSymbol(ControlSymbol::TwoDots),
                Token::ControlSymbol(ControlSymbol::BracketOpen),
                Token::ControlSymbol(ControlSymbol::BracketClose),
                Token::ControlSymbol(ControlSymbol::SquareBracketOpen),
                Token::ControlSymbol(ControlSymbol::SquareBracketClose),
            ]
        );
    }

    #[test]
    fn adjacent_tokens_split_correctly() {
        assert_eq!(
            tokenize("i:=1..3"),
            vec![
                Token::Identifier(String::from("i")),
                Token::Operator(Operator::Assign),
                Token::Integer(1),
                Token::ControlSymbol(ControlSymbol::TwoDots),
                Token::Integer(3),
            ]
        );

        assert_eq!(
            tokenize("a<b<=c<>d"),
            vec![
                Token::Identifier(String::from("a")),
                Token::Operator(Operator::Less),
                Token::Identifier(String::from("b")),
                Token::Operator(Operator::LessEq),
                Token::Identifier(String::from("c")),
                Token::Operator(Operator::NotEq),
                Token::Identifier(String::from("d")),
            ]
        );
    }

    #[test]
    fn whitespace_is_invisible() {
        let dense = tokenize("program p;var x:integer;begin x:=1 end.");
        let spaced = tokenize("program  p ;\n var x : integer ;\nbegin\n\tx := 1\nend .");
        assert_eq!(dense, spaced);
    }

    #[test]
    fn tokens_roundtrip_through_their_text() {
        let source = "program p; var a: array [1 .. 3] of integer; begin a[2] := &7 + $f * 2; if a[2] >= 10 then writeln(a[2]) end.";
        let tokens = tokenize(source);

        let rendered = tokens
            .iter()
            .map(|token| token.to_string())
            .collect::<Vec<_>>()
            .join(" ");

        assert_eq!(tokenize(&rendered), tokens);
    }

    #[test]
    fn positions_are_tracked() {
        let mut lexer = Lexer::new("ab\n  cd");

        let first = lexer.next_token().unwrap().unwrap();
        assert_eq!(first.position, Position { line: 1, column: 0 });
        assert_eq!(first.span, Span::new(0, 2));

        let second = lexer.next_token().unwrap().unwrap();
        assert_eq!(second.position, Position { line: 2, column: 2 });
        assert_eq!(second.span, Span::new(5, 7));

        assert_eq!(lexer.next_token().unwrap(), None);
    }

    #[test]
    fn unknown_character_fails() {
        let mut lexer = Lexer::new("x # y");
        lexer.next_token().unwrap();

        let error = lexer.next_token().unwrap_err();
        assert!(matches!(
            error,
            LexError::UnexpectedCharacter { character: '#', .. }
        ));
    }

    #[test]
    fn unterminated_numeric_prefix_fails() {
        let error = Lexer::new("&").next_token().unwrap_err();
        assert!(matches!(error, LexError::UnexpectedEndOfInput { .. }));

        let error = Lexer::new("$q").next_token().unwrap_err();
        assert!(matches!(
            error,
            LexError::UnexpectedCharacter { character: 'q', .. }
        ));

        let error = Lexer::new("&9").next_token().unwrap_err();
        assert!(matches!(
            error,
            LexError::UnexpectedCharacter { character: '9', .. }
        ));
    }

    #[test]
    fn eof_inside_token_extracts() {
        assert_eq!(tokenize("x"), vec![Token::Identifier(String::from("x"))]);
        assert_eq!(tokenize("12"), vec![Token::Integer(12)]);
        assert_eq!(tokenize("<"), vec![Token::Operator(Operator::Less)]);
        assert_eq!(
            tokenize(":"),
            vec![Token::ControlSymbol(ControlSymbol::Colon)]
        );
    }
}
