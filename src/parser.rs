use log::{debug, trace};

use crate::{
    ast::{ASTNode, Expression, Function, Prototype},
    cursor::TokenCursor,
    lexer::{Position, Token},
    precedence::PrecedenceTable,
};

#[derive(Debug, PartialEq, Clone, thiserror::Error)]
pub enum ParserError {
    #[error("{1}: unknown token {0} when expecting an expression")]
    UnexpectedToken(Token, Position),
    #[error("{1}: expected ')', found {0}")]
    ExpectedCloseParen(Token, Position),
    #[error("{1}: expected ')' or ',' in argument list, found {0}")]
    ExpectedArgSeparator(Token, Position),
    #[error("{1}: expected function name in prototype, found {0}")]
    ExpectedFunctionName(Token, Position),
    #[error("{1}: expected '(' in prototype, found {0}")]
    ExpectedPrototypeOpen(Token, Position),
    #[error("{1}: expected ')' in prototype, found {0}")]
    ExpectedPrototypeClose(Token, Position),
}

impl ParserError {
    pub fn token(&self) -> &Token {
        match self {
            ParserError::UnexpectedToken(token, _)
            | ParserError::ExpectedCloseParen(token, _)
            | ParserError::ExpectedArgSeparator(token, _)
            | ParserError::ExpectedFunctionName(token, _)
            | ParserError::ExpectedPrototypeOpen(token, _)
            | ParserError::ExpectedPrototypeClose(token, _) => token,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            ParserError::UnexpectedToken(_, pos)
            | ParserError::ExpectedCloseParen(_, pos)
            | ParserError::ExpectedArgSeparator(_, pos)
            | ParserError::ExpectedFunctionName(_, pos)
            | ParserError::ExpectedPrototypeOpen(_, pos)
            | ParserError::ExpectedPrototypeClose(_, pos) => *pos,
        }
    }
}

pub type PartialParseResult = Result<Expression, ParserError>;

/// A parsing session over one character source.
///
/// The precedence table is only ever read, so any number of sessions may
/// borrow the same one.
pub struct Parser<'p, I: Iterator<Item = char>> {
    cursor: TokenCursor<I>,
    operator_precedence: &'p PrecedenceTable,
}

impl<'p, I: Iterator<Item = char>> Parser<'p, I> {
    /// start a session; this reads the first token of `chars`
    pub fn new(chars: I, operator_precedence: &'p PrecedenceTable) -> Self {
        Self {
            cursor: TokenCursor::new(chars),
            operator_precedence,
        }
    }

    pub fn current(&self) -> &Token {
        self.cursor.current()
    }

    pub fn is_at_end(&self) -> bool {
        *self.cursor.current() == Token::Eof
    }

    /// drop the current token; callers use this to resynchronise after an error
    pub fn skip_token(&mut self) {
        self.cursor.advance();
    }

    fn error(&self, kind: fn(Token, Position) -> ParserError) -> ParserError {
        kind(self.cursor.current().clone(), self.cursor.position())
    }

    fn expect_char(
        &mut self,
        expected: char,
        kind: fn(Token, Position) -> ParserError,
    ) -> Result<(), ParserError> {
        if *self.cursor.current() != Token::Char(expected) {
            return Err(self.error(kind));
        }
        self.cursor.advance();
        Ok(())
    }

    /// the current token as a binary operator, if the table knows it
    fn current_operator(&self) -> Option<(char, u32)> {
        match *self.cursor.current() {
            Token::Char(op) => self
                .operator_precedence
                .get(op)
                .map(|precedence| (op, precedence)),
            _ => None,
        }
    }

    fn parse_number(&mut self) -> PartialParseResult {
        match *self.cursor.current() {
            Token::Number(num) => {
                self.cursor.advance();
                Ok(Expression::Literal(num))
            }
            _ => Err(self.error(ParserError::UnexpectedToken)),
        }
    }

    fn parse_identifier(&mut self) -> PartialParseResult {
        let ident = match self.cursor.current() {
            Token::Ident(ident) => ident.clone(),
            _ => return Err(self.error(ParserError::UnexpectedToken)),
        };

        if *self.cursor.advance() != Token::Char('(') {
            return Ok(Expression::Variable(ident));
        }
        self.cursor.advance();

        let mut args = Vec::new();
        if *self.cursor.current() != Token::Char(')') {
            loop {
                args.push(self.parse_expression()?);

                match self.cursor.current() {
                    Token::Char(')') => break,
                    Token::Char(',') => {
                        self.cursor.advance();
                    }
                    _ => return Err(self.error(ParserError::ExpectedArgSeparator)),
                }
            }
        }
        self.cursor.advance();

        Ok(Expression::Call(ident, args))
    }

    fn parse_nested(&mut self) -> PartialParseResult {
        self.expect_char('(', ParserError::UnexpectedToken)?;
        let res = self.parse_expression()?;
        self.expect_char(')', ParserError::ExpectedCloseParen)?;
        Ok(res)
    }

    fn parse_primary(&mut self) -> PartialParseResult {
        trace!("parse_primary: current token = {:?}", self.cursor.current());
        match self.cursor.current() {
            Token::Number(_) => self.parse_number(),
            Token::Ident(_) => self.parse_identifier(),
            Token::Char('(') => self.parse_nested(),
            _ => Err(self.error(ParserError::UnexpectedToken)),
        }
    }

    /// Fold every following `op primary` pair binding at least as tightly as
    /// `expr_precedence` onto `lhs`.
    fn parse_rhs(&mut self, expr_precedence: u32, lhs: Expression) -> PartialParseResult {
        let mut result = lhs;

        loop {
            let (operator, precedence) = match self.current_operator() {
                Some((op, pr)) if pr >= expr_precedence => (op, pr),
                _ => return Ok(result),
            };
            trace!("parse_rhs: operator {} at precedence {}", operator, precedence);
            self.cursor.advance();

            let mut rhs = self.parse_primary()?;

            // only a strictly tighter operator steals the rhs, so ties stay left-associative
            if let Some((_, next_precedence)) = self.current_operator() {
                if precedence < next_precedence {
                    rhs = self.parse_rhs(precedence + 1, rhs)?;
                }
            }

            result = Expression::Binary(operator, Box::new(result), Box::new(rhs));
        }
    }

    pub fn parse_expression(&mut self) -> PartialParseResult {
        let lhs = self.parse_primary()?;
        self.parse_rhs(0, lhs)
    }

    /// `name(arg arg ...)`
    pub fn parse_prototype(&mut self) -> Result<Prototype, ParserError> {
        trace!("parse_prototype: current token = {:?}", self.cursor.current());
        let name = match self.cursor.current() {
            Token::Ident(name) => name.clone(),
            _ => return Err(self.error(ParserError::ExpectedFunctionName)),
        };
        self.cursor.advance();

        if *self.cursor.current() != Token::Char('(') {
            return Err(self.error(ParserError::ExpectedPrototypeOpen));
        }

        let mut args = Vec::new();
        while let Token::Ident(arg) = self.cursor.advance() {
            args.push(arg.clone());
        }

        self.expect_char(')', ParserError::ExpectedPrototypeClose)?;

        Ok(Prototype { name, args })
    }

    /// `def prototype expression`
    pub fn parse_definition(&mut self) -> Result<Function, ParserError> {
        self.cursor.advance();
        let prototype = self.parse_prototype()?;
        let body = self.parse_expression()?;
        Ok(Function { prototype, body })
    }

    /// `extern prototype`
    pub fn parse_extern(&mut self) -> Result<Prototype, ParserError> {
        self.cursor.advance();
        self.parse_prototype()
    }

    /// a bare expression, wrapped in an anonymous function
    pub fn parse_top_level_expr(&mut self) -> Result<Function, ParserError> {
        let body = self.parse_expression()?;
        Ok(Function {
            prototype: Prototype::anonymous(),
            body,
        })
    }

    /// Parse exactly one top-level unit starting at the current token.
    ///
    /// On failure nothing built so far is returned and the current token is
    /// left where the error was found.
    pub fn parse_top_level(&mut self) -> Result<ASTNode, ParserError> {
        let start = self.cursor.position();
        let res = match self.cursor.current() {
            Token::Def => self.parse_definition().map(ASTNode::Function),
            Token::Extern => self.parse_extern().map(ASTNode::Extern),
            _ => self.parse_top_level_expr().map(ASTNode::Function),
        };

        match &res {
            Ok(node) => debug!("parsed unit at {}: {}", start, node),
            Err(err) => debug!("failed to parse unit at {}: {}", start, err),
        }
        res
    }
}

/// Parse every unit in `input`, skipping `;` between them.
pub fn parse_str(
    input: &str,
    operator_precedence: &PrecedenceTable,
) -> Result<Vec<ASTNode>, ParserError> {
    let mut parser = Parser::new(input.chars(), operator_precedence);
    let mut ast = Vec::new();

    loop {
        match parser.current() {
            Token::Eof => break,
            Token::Char(';') => parser.skip_token(),
            _ => ast.push(parser.parse_top_level()?),
        }
    }

    Ok(ast)
}
