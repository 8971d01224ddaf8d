use crate::lexer::{Lexer, Span, Token, TokenKind};
use crate::model::{ConstraintInput, ObjectiveSpec, Sense};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found `{found}` at position {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Unknown variable `{name}` at position {span:?} (only x and y are allowed)")]
    UnknownVariable { name: String, span: Span },
    #[error("Constant term at position {span:?}; move constants to the right-hand side")]
    ConstantTerm { span: Span },
    #[error("Missing objective sense at position {span:?} (expected max or min)")]
    MissingSense { span: Span },
}

/// Parser for single-line objectives (`max 3x + 5y`) and constraints
/// (`x + 2y <= 14`).
///
/// The relation of a constraint is returned verbatim; whether it is one of
/// `<=` / `>=` is decided when the problem is formulated.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse_constraint(source: &str) -> Result<ConstraintInput, ParseError> {
        let mut parser = Parser::new(Lexer::tokenize(source));
        let (coeff_x, coeff_y) = parser.parse_linear()?;
        let relation = parser.expect(TokenKind::Relation)?;
        let rhs = parser.parse_signed_number()?;
        parser.expect(TokenKind::Eof)?;
        Ok(ConstraintInput::new(coeff_x, coeff_y, relation.text, rhs))
    }

    /// `max|maximize|min|minimize [z =] <linear expression>`
    pub fn parse_objective(source: &str) -> Result<ObjectiveSpec, ParseError> {
        let mut parser = Parser::new(Lexer::tokenize(source));
        let sense = parser.parse_sense()?;

        // Optional `z =`
        let named = parser
            .current()
            .is_some_and(|t| t.kind == TokenKind::Ident && t.text.eq_ignore_ascii_case("z"));
        let assigned = parser
            .tokens
            .get(parser.pos + 1)
            .is_some_and(|t| t.kind == TokenKind::Relation && t.text == "=");
        if named && assigned {
            parser.advance();
            parser.advance();
        }

        let (coeff_x, coeff_y) = parser.parse_linear()?;
        parser.expect(TokenKind::Eof)?;
        Ok(ObjectiveSpec::new(coeff_x, coeff_y, sense))
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(t) if t.kind != TokenKind::Eof => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: t.text.clone(),
                span: t.span,
            },
            _ => ParseError::UnexpectedEof,
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.peek_kind() == kind {
            if let Some(token) = self.advance() {
                return Ok(token);
            }
        }
        let expected = match kind {
            TokenKind::Relation => "<= or >=",
            TokenKind::Eof => "end of input",
            TokenKind::Number => "number",
            _ => "token",
        };
        Err(self.unexpected(expected))
    }

    fn parse_sense(&mut self) -> Result<Sense, ParseError> {
        let Some(token) = self.current().cloned() else {
            return Err(ParseError::UnexpectedEof);
        };
        if token.kind == TokenKind::Eof {
            return Err(ParseError::UnexpectedEof);
        }
        let sense = match token.text.to_ascii_lowercase().as_str() {
            "max" | "maximize" | "maximise" => Sense::Maximize,
            "min" | "minimize" | "minimise" => Sense::Minimize,
            _ => return Err(ParseError::MissingSense { span: token.span }),
        };
        self.advance();
        Ok(sense)
    }

    /// Sum of `[sign] [number] [*] (x|y)` terms. Repeated variables add up.
    fn parse_linear(&mut self) -> Result<(f64, f64), ParseError> {
        let (mut coeff_x, mut coeff_y) = (0.0, 0.0);
        let mut first = true;
        loop {
            if !first && !matches!(self.peek_kind(), TokenKind::Plus | TokenKind::Minus) {
                break;
            }
            let (x, y) = self.parse_term()?;
            coeff_x += x;
            coeff_y += y;
            first = false;
        }
        Ok((coeff_x, coeff_y))
    }

    fn parse_term(&mut self) -> Result<(f64, f64), ParseError> {
        let mut sign = 1.0;
        match self.peek_kind() {
            TokenKind::Plus => {
                self.advance();
            }
            TokenKind::Minus => {
                self.advance();
                sign = -1.0;
            }
            _ => {}
        }

        let mut coefficient = 1.0;
        let mut number_span = None;
        if self.peek_kind() == TokenKind::Number {
            if let Some(token) = self.advance() {
                coefficient = parse_number(&token)?;
                number_span = Some(token.span);
            }
            if self.peek_kind() == TokenKind::Star {
                self.advance();
            }
        }

        match (self.peek_kind(), number_span) {
            (TokenKind::Ident, _) => {
                let Some(token) = self.advance() else {
                    return Err(ParseError::UnexpectedEof);
                };
                let value = sign * coefficient;
                if token.text.eq_ignore_ascii_case("x") {
                    Ok((value, 0.0))
                } else if token.text.eq_ignore_ascii_case("y") {
                    Ok((0.0, value))
                } else {
                    Err(ParseError::UnknownVariable {
                        name: token.text,
                        span: token.span,
                    })
                }
            }
            (TokenKind::Relation | TokenKind::Plus | TokenKind::Minus | TokenKind::Eof, Some(span)) => {
                Err(ParseError::ConstantTerm { span })
            }
            _ => Err(self.unexpected("number or variable")),
        }
    }

    fn parse_signed_number(&mut self) -> Result<f64, ParseError> {
        let sign = match self.peek_kind() {
            TokenKind::Minus => {
                self.advance();
                -1.0
            }
            TokenKind::Plus => {
                self.advance();
                1.0
            }
            _ => 1.0,
        };
        let token = self.expect(TokenKind::Number)?;
        Ok(sign * parse_number(&token)?)
    }
}

fn parse_number(token: &Token) -> Result<f64, ParseError> {
    token
        .text
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::InvalidNumber(token.text.clone()))
}
