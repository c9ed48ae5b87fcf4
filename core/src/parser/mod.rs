//! Parsing of jelly types and units.
//!
//! The syntax is the one produced by the pretty printer (see [crate::pretty]):
//!
//! ```text
//! type        ::= 'Boolean' | 'Text' | 'Number' ('{' unit '}')?
//!               | 'Date' | 'DateYMD' | 'DateYM' | 'Time' | 'DateTime' | 'DateTimeZoned'
//!               | '[' type ']'
//!               | '(' '(' (type (',' type)*)? ')' '->' type ')'
//!               | '(' fields ')'
//!               | NAME ('(' type ')' | '(' '{' unit '}' ')')*
//! fields      ::= '...' | (field (',' field)* (',' '...')?)?
//! field       ::= NAME '?'? ':' type
//!
//! unit        ::= quotient ('*' quotient)*
//! quotient    ::= single ('/' single)?
//! single      ::= NAME ('^' INT)? | '@unitvar' NAME ('^' INT)? | '1' | '(' unit ')'
//! ```
//!
//! Division only applies to the term right after the slash, and binds tighter than
//! multiplication: `m*s/kg` is `m*(s/kg)`. Division can't be chained: `m/s/s` is an error, and
//! must be written `m/(s*s)` or `m/s^2`.
//!
//! Unit names are resolved against a [UnitManager] during parsing.
use logos::Logos;
use std::collections::BTreeMap;

use crate::{
    identifier::Ident,
    jelly::{Field, JellyType, JellyTypeArg, JellyUnit},
    typ::{DateTimeKind, PrimitiveType, TypeArgF},
    unit::UnitManager,
};

pub mod error;
pub mod lexer;


use error::{ParseError, Span};
use lexer::Token;

/// Parse a jelly type.
pub fn parse_type(src: &str, units: &UnitManager) -> Result<JellyType, ParseError> {
    let mut parser = Parser::new(src, units)?;
    let typ = parser.typ()?;
    parser.end()?;
    Ok(typ)
}

/// Parse a jelly unit.
pub fn parse_unit(src: &str, units: &UnitManager) -> Result<JellyUnit, ParseError> {
    let mut parser = Parser::new(src, units)?;
    let unit = parser.unit()?;
    parser.end()?;
    Ok(unit)
}

struct Parser<'input, 'u> {
    src: &'input str,
    tokens: Vec<(Token<'input>, Span)>,
    pos: usize,
    units: &'u UnitManager,
}

impl<'input, 'u> Parser<'input, 'u> {
    fn new(src: &'input str, units: &'u UnitManager) -> Result<Self, ParseError> {
        let tokens = Token::lexer(src)
            .spanned()
            .map(|(tok, span)| match tok {
                Ok(tok) => Ok((tok, span)),
                Err(()) => Err(ParseError::Lexical { span }),
            })
            .collect::<Result<_, _>>()?;

        Ok(Parser {
            src,
            tokens,
            pos: 0,
            units,
        })
    }

    fn peek(&self) -> Option<&Token<'input>> {
        self.tokens.get(self.pos).map(|(tok, _)| tok)
    }

    fn next(&mut self, expected: &str) -> Result<(Token<'input>, Span), ParseError> {
        let next = self.tokens.get(self.pos).cloned().ok_or_else(|| ParseError::UnexpectedEof {
            expected: expected.to_owned(),
        })?;

        self.pos += 1;
        Ok(next)
    }

    /// Consume the next token if it is `tok`.
    fn eat(&mut self, tok: &Token<'input>) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Token<'input>, expected: &str) -> Result<Span, ParseError> {
        let (found, span) = self.next(expected)?;

        if found == tok {
            Ok(span)
        } else {
            Err(self.unexpected(span, expected))
        }
    }

    /// The byte offset where the next token starts.
    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.src.len(), |(_, span)| span.start)
    }

    /// The span from `start` to the end of the last consumed token.
    fn span_from(&self, start: usize) -> Span {
        let end = match self.pos.checked_sub(1) {
            Some(last) => self.tokens[last].1.end,
            None => start,
        };

        start..end
    }

    fn unexpected(&self, span: Span, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            found: self.src[span.clone()].to_owned(),
            span,
            expected: expected.to_owned(),
        }
    }

    fn end(&self) -> Result<(), ParseError> {
        match self.tokens.get(self.pos) {
            None => Ok(()),
            Some((_, span)) => Err(self.unexpected(span.clone(), "end of input")),
        }
    }

    /// A name: an identifier, or a keyword used as an identifier.
    fn name(&mut self, expected: &str) -> Result<(Ident, Span), ParseError> {
        let (tok, span) = self.next(expected)?;

        match tok.as_name() {
            Some(name) => Ok((Ident::new(name), span)),
            None => Err(self.unexpected(span, expected)),
        }
    }

    fn typ(&mut self) -> Result<JellyType, ParseError> {
        let (tok, span) = self.next("a type")?;

        let typ = match tok {
            Token::Boolean => JellyType::Primitive(PrimitiveType::Bool),
            Token::Text => JellyType::Primitive(PrimitiveType::Text),
            Token::Date | Token::DateYMD => JellyType::date(DateTimeKind::YearMonthDay),
            Token::DateYM => JellyType::date(DateTimeKind::YearMonth),
            Token::Time => JellyType::date(DateTimeKind::TimeOfDay),
            Token::DateTime => JellyType::date(DateTimeKind::DateTime),
            Token::DateTimeZoned => JellyType::date(DateTimeKind::DateTimeZoned),
            Token::Number => {
                if self.eat(&Token::LBrace) {
                    let unit = self.unit()?;
                    self.expect(Token::RBrace, "`}`")?;
                    JellyType::Number(unit)
                } else {
                    JellyType::scalar_number()
                }
            }
            Token::LBracket => {
                let elem = self.typ()?;
                self.expect(Token::RBracket, "`]`")?;
                JellyType::array(elem)
            }
            Token::LParen if self.eat(&Token::LParen) => self.function()?,
            Token::LParen => self.record()?,
            Token::Identifier(name) => self.tagged(Ident::new(name))?,
            _ => return Err(self.unexpected(span, "a type")),
        };

        Ok(typ)
    }

    /// Parse the rest of a function type, after the two opening parentheses.
    fn function(&mut self) -> Result<JellyType, ParseError> {
        let mut params = Vec::new();

        if !self.eat(&Token::RParen) {
            loop {
                params.push(self.typ()?);

                let (tok, span) = self.next("`,` or `)`")?;
                match tok {
                    Token::Comma => (),
                    Token::RParen => break,
                    _ => return Err(self.unexpected(span, "`,` or `)`")),
                }
            }
        }

        self.expect(Token::RightArrow, "`->`")?;
        let result = self.typ()?;
        self.expect(Token::RParen, "`)`")?;

        Ok(JellyType::function(params, result))
    }

    /// Parse the rest of a record type, after the opening parenthesis.
    fn record(&mut self) -> Result<JellyType, ParseError> {
        let mut fields = BTreeMap::new();
        let mut complete = true;

        if self.eat(&Token::RParen) {
            return Ok(JellyType::Record { fields, complete });
        }

        loop {
            if self.eat(&Token::Ellipsis) {
                complete = false;
                self.expect(Token::RParen, "`)`")?;
                break;
            }

            let (name, span) = self.name("a field name or `...`")?;
            let required = !self.eat(&Token::QuestionMark);
            self.expect(Token::Colon, "`:`")?;
            let typ = self.typ()?;

            if fields.insert(name, Field { typ, required }).is_some() {
                return Err(ParseError::DuplicateField {
                    span,
                    name: name.into_label(),
                });
            }

            let (tok, span) = self.next("`,` or `)`")?;
            match tok {
                Token::Comma => (),
                Token::RParen => break,
                _ => return Err(self.unexpected(span, "`,` or `)`")),
            }
        }

        Ok(JellyType::Record { fields, complete })
    }

    /// Parse the arguments of a tagged type, if any.
    fn tagged(&mut self, name: Ident) -> Result<JellyType, ParseError> {
        let mut args: Vec<JellyTypeArg> = Vec::new();

        while self.eat(&Token::LParen) {
            if self.eat(&Token::LBrace) {
                let unit = self.unit()?;
                self.expect(Token::RBrace, "`}`")?;
                args.push(TypeArgF::Unit(unit));
            } else {
                args.push(TypeArgF::Type(self.typ()?));
            }

            self.expect(Token::RParen, "`)`")?;
        }

        Ok(JellyType::tagged(name, args))
    }

    fn unit(&mut self) -> Result<JellyUnit, ParseError> {
        let start = self.offset();
        let mut unit = self.quotient()?;

        while self.eat(&Token::Times) {
            let factor = self.quotient()?;
            unit = unit
                .checked_times(&factor)
                .ok_or_else(|| ParseError::InvalidExponent {
                    span: self.span_from(start),
                })?;
        }

        Ok(unit)
    }

    fn quotient(&mut self) -> Result<JellyUnit, ParseError> {
        let start = self.offset();
        let numerator = self.single_unit()?;

        if !self.eat(&Token::Div) {
            return Ok(numerator);
        }

        let denominator = self.single_unit()?;

        if self.peek() == Some(&Token::Div) {
            let span = self.tokens[self.pos].1.clone();
            return Err(ParseError::ChainedDivision { span });
        }

        numerator
            .checked_divide_by(&denominator)
            .ok_or_else(|| ParseError::InvalidExponent {
                span: self.span_from(start),
            })
    }

    fn single_unit(&mut self) -> Result<JellyUnit, ParseError> {
        const EXPECTED: &str = "a unit";
        let (tok, span) = self.next(EXPECTED)?;

        let unit = match tok {
            Token::Int(1) => return Ok(JellyUnit::scalar()),
            Token::Int(_) => return Err(ParseError::InvalidExponent { span }),
            Token::LParen => {
                let unit = self.unit()?;
                self.expect(Token::RParen, "`)`")?;
                return Ok(unit);
            }
            Token::UnitVar => {
                let (name, _) = self.name("a unit variable name")?;
                JellyUnit::unit_variable(name)
            }
            tok => match tok.as_name() {
                Some(name) => JellyUnit::single(self.units.get_declared(name)?),
                None => return Err(self.unexpected(span, EXPECTED)),
            },
        };

        if self.eat(&Token::Pow) {
            let (tok, span) = self.next("an integer exponent")?;

            match tok {
                Token::Int(power) => unit
                    .checked_raise_by(power)
                    .ok_or(ParseError::InvalidExponent { span }),
                _ => Err(self.unexpected(span, "an integer exponent")),
            }
        } else {
            Ok(unit)
        }
    }
}
