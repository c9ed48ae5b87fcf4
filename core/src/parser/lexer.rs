//! The lexer of the type and unit syntax.
use logos::Logos;

// **IMPORTANT**
// When adding or removing a keyword, please update the [KEYWORDS] array.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token<'input> {
    #[regex("[_a-zA-Z][_a-zA-Z0-9]*")]
    Identifier(&'input str),
    #[regex("-?[0-9]+", |lex| lex.slice().parse::<i32>().ok())]
    Int(i32),

    #[token("Boolean")]
    Boolean,
    #[token("Text")]
    Text,
    #[token("Number")]
    Number,
    #[token("Date")]
    Date,
    #[token("DateYMD")]
    DateYMD,
    #[token("DateYM")]
    DateYM,
    #[token("Time")]
    Time,
    #[token("DateTime")]
    DateTime,
    #[token("DateTimeZoned")]
    DateTimeZoned,

    #[token("@unitvar")]
    UnitVar,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("?")]
    QuestionMark,
    #[token("...")]
    Ellipsis,
    #[token("->")]
    RightArrow,
    #[token("*")]
    Times,
    #[token("/")]
    Div,
    #[token("^")]
    Pow,
}

/// The builtin type keywords. They can't be used as tagged type names or type variables.
pub const KEYWORDS: &[&str] = &[
    "Boolean",
    "Text",
    "Number",
    "Date",
    "DateYMD",
    "DateYM",
    "Time",
    "DateTime",
    "DateTimeZoned",
];

impl Token<'_> {
    /// The source text of a keyword or of an identifier. Keywords are allowed as record field
    /// names.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Token::Identifier(name) => Some(name),
            Token::Boolean => Some("Boolean"),
            Token::Text => Some("Text"),
            Token::Number => Some("Number"),
            Token::Date => Some("Date"),
            Token::DateYMD => Some("DateYMD"),
            Token::DateYM => Some("DateYM"),
            Token::Time => Some("Time"),
            Token::DateTime => Some("DateTime"),
            Token::DateTimeZoned => Some("DateTimeZoned"),
            _ => None,
        }
    }
}
