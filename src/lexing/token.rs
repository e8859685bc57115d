use std::fmt;
use std::sync::OnceLock;

use crate::util::Bimap;

/// Operator tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    NotEq,
    LessEq,
    Less,
    GreaterEq,
    Greater,
    Plus,
    Minus,
    Times,
    Divide,
    Assign,
}

/// Control symbol tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlSymbol {
    Semicolon,
    Colon,
    Comma,
    Dot,
    TwoDots,
    BracketOpen,
    BracketClose,
    SquareBracketOpen,
    SquareBracketClose,
}

/// Keyword tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Program,
    Forward,
    Function,
    Procedure,
    Const,
    Var,
    Begin,
    End,
    While,
    Do,
    For,
    To,
    Downto,
    If,
    Then,
    Else,
    Array,
    Of,
    Integer,
    Boolean,
    Exit,
    Break,
    Div,
    Mod,
    Not,
    And,
    Or,
    Xor,
}

/// All token kinds produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Operator(Operator),
    ControlSymbol(ControlSymbol),
    Keyword(Keyword),
    Identifier(String),
    Integer(i64),
    Boolean(bool),
}

/// Operator-to-text table
pub fn operator_table() -> &'static Bimap<Operator, &'static str> {
    static TABLE: OnceLock<Bimap<Operator, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| {
        [
            (Operator::Eq, "="),
            (Operator::NotEq, "<>"),
            (Operator::LessEq, "<="),
            (Operator::Less, "<"),
            (Operator::GreaterEq, ">="),
            (Operator::Greater, ">"),
            (Operator::Plus, "+"),
            (Operator::Minus, "-"),
            (Operator::Times, "*"),
            (Operator::Divide, "/"),
            (Operator::Assign, ":="),
        ]
        .into_iter()
        .collect()
    })
}

/// Control-symbol-to-text table
pub fn control_symbol_table() -> &'static Bimap<ControlSymbol, &'static str> {
    static TABLE: OnceLock<Bimap<ControlSymbol, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| {
        [
            (ControlSymbol::Semicolon, ";"),
            (ControlSymbol::Colon, ":"),
            (ControlSymbol::Comma, ","),
            (ControlSymbol::Dot, "."),
            (ControlSymbol::TwoDots, ".."),
            (ControlSymbol::BracketOpen, "("),
            (ControlSymbol::BracketClose, ")"),
            (ControlSymbol::SquareBracketOpen, "["),
            (ControlSymbol::SquareBracketClose, "]"),
        ]
        .into_iter()
        .collect()
    })
}

/// Keyword-to-text table; lookups are case-sensitive
pub fn keyword_table() -> &'static Bimap<Keyword, &'static str> {
    static TABLE: OnceLock<Bimap<Keyword, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| {
        [
            (Keyword::Program, "program"),
            (Keyword::Forward, "forward"),
            (Keyword::Function, "function"),
            (Keyword::Procedure, "procedure"),
            (Keyword::Const, "const"),
            (Keyword::Var, "var"),
            (Keyword::Begin, "begin"),
            (Keyword::End, "end"),
            (Keyword::While, "while"),
            (Keyword::Do, "do"),
            (Keyword::For, "for"),
            (Keyword::To, "to"),
            (Keyword::Downto, "downto"),
            (Keyword::If, "if"),
            (Keyword::Then, "then"),
            (Keyword::Else, "else"),
            (Keyword::Array, "array"),
            (Keyword::Of, "of"),
            (Keyword::Integer, "integer"),
            (Keyword::Boolean, "boolean"),
            (Keyword::Exit, "exit"),
            (Keyword::Break, "break"),
            (Keyword::Div, "div"),
            (Keyword::Mod, "mod"),
            (Keyword::Not, "not"),
            (Keyword::And, "and"),
            (Keyword::Or, "or"),
            (Keyword::Xor, "xor"),
        ]
        .into_iter()
        .collect()
    })
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = operator_table().by_key(self).expect("operator in table");
        write!(f, "{text}")
    }
}

impl fmt::Display for ControlSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = control_symbol_table()
            .by_key(self)
            .expect("control symbol in table");
        write!(f, "{text}")
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = keyword_table().by_key(self).expect("keyword in table");
        write!(f, "{text}")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Operator(op) => write!(f, "{op}"),
            Token::ControlSymbol(symbol) => write!(f, "{symbol}"),
            Token::Keyword(keyword) => write!(f, "{keyword}"),
            Token::Identifier(name) => write!(f, "{name}"),
            Token::Integer(value) => write!(f, "{value}"),
            Token::Boolean(value) => write!(f, "{value}"),
        }
    }
}

impl Token {
    /// Token dump with its kind spelled out, used by the lexer mode of the CLI
    pub fn describe(&self) -> String {
        match self {
            Token::Operator(op) => format!("<{op}>"),
            Token::ControlSymbol(symbol) => format!("<{symbol}>"),
            Token::Keyword(keyword) => format!("<{keyword}>"),
            Token::Identifier(name) => format!("<identifier> ({name})"),
            Token::Integer(value) => format!("<integer> ({value})"),
            Token::Boolean(value) => format!("<boolean> ({value})"),
        }
    }
}
