use crate::lexer::{Lexer, Position, Token};

/// One token of lookahead on top of a [`Lexer`].
///
/// The parser only ever inspects `current()`; nothing past it has been read.
pub struct TokenCursor<I: Iterator<Item = char>> {
    lexer: Lexer<I>,
    current: Token,
    position: Position,
}

impl<I: Iterator<Item = char>> TokenCursor<I> {
    /// create a cursor, priming it with the first token of `chars`
    pub fn new(chars: I) -> Self {
        let mut cursor = Self {
            lexer: Lexer::new(chars),
            current: Token::Eof,
            position: Position::default(),
        };
        cursor.advance();
        cursor
    }

    pub fn current(&self) -> &Token {
        &self.current
    }

    /// where the current token starts in the source
    pub fn position(&self) -> Position {
        self.position
    }

    /// replace the current token with the next one from the lexer
    pub fn advance(&mut self) -> &Token {
        self.current = self.lexer.next_token();
        self.position = self.lexer.token_start();
        &self.current
    }
}
