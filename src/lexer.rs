use std::{fmt, iter::Peekable};

use lazy_static::lazy_static;
use regex::Regex;

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Eof,
    Def,
    Extern,
    Ident(String),
    Number(f64),
    Char(char),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Eof => write!(f, "end of input"),
            Token::Def => write!(f, "'def'"),
            Token::Extern => write!(f, "'extern'"),
            Token::Ident(ident) => write!(f, "identifier '{}'", ident),
            Token::Number(num) => write!(f, "number {}", num),
            Token::Char(c) => write!(f, "'{}'", c.escape_default()),
        }
    }
}

/// line and column (both 1-based) of a character in the source
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

lazy_static! {
    // the part of a digit/dot run that reads as a number, the rest is dropped
    static ref NUMBER_PREFIX_RE: Regex = Regex::new(r"^[0-9]*(\.[0-9]*)?").unwrap();
}

fn parse_number(run: &str) -> f64 {
    let prefix = NUMBER_PREFIX_RE
        .find(run)
        .map(|m| m.as_str())
        .unwrap_or_default();
    prefix.parse().unwrap_or(0.0)
}

/// Character level tokenizer over any (possibly unbounded) stream of chars.
///
/// Exactly one character is held pending between calls to
/// [`Lexer::next_token`], so skipping whitespace and comments never reads
/// further into the stream than the start of the next token.
pub struct Lexer<I: Iterator<Item = char>> {
    chars: Peekable<I>,
    position: Position,
    token_start: Position,
    finished: bool,
}

impl<I: Iterator<Item = char>> Lexer<I> {
    pub fn new(chars: I) -> Self {
        Self {
            chars: chars.peekable(),
            position: Position::default(),
            token_start: Position::default(),
            finished: false,
        }
    }

    /// where the most recently produced token started
    pub fn token_start(&self) -> Position {
        self.token_start
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.position.line += 1;
            self.position.column = 1;
        } else {
            self.position.column += 1;
        }
        Some(c)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut res = String::new();
        while let Some(&c) = self.chars.peek() {
            if !pred(c) {
                break;
            }
            res.push(c);
            self.bump();
        }
        res
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.chars.peek() {
            // '\x0b' (vertical tab) is blank to C but not to `is_ascii_whitespace`
            if !(c.is_ascii_whitespace() || c == '\x0b') {
                break;
            }
            self.bump();
        }
    }

    fn skip_comment(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            self.bump();
        }
    }

    /// produce the next token, yielding `Token::Eof` forever once the source runs dry
    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();
            self.token_start = self.position;

            let c = match self.chars.peek() {
                Some(&c) => c,
                None => return Token::Eof,
            };

            if c.is_ascii_alphabetic() {
                let ident = self.take_while(|c| c.is_ascii_alphanumeric());
                return match ident.as_str() {
                    "def" => Token::Def,
                    "extern" => Token::Extern,
                    _ => Token::Ident(ident),
                };
            }

            if c.is_ascii_digit() || c == '.' {
                let run = self.take_while(|c| c.is_ascii_digit() || c == '.');
                return Token::Number(parse_number(&run));
            }

            if c == '#' {
                self.skip_comment();
                continue;
            }

            self.bump();
            return Token::Char(c);
        }
    }
}

impl<I: Iterator<Item = char>> Iterator for Lexer<I> {
    type Item = (Position, Token);

    /// yields tokens up to and including the first `Token::Eof`
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        let position = self.token_start;
        if token == Token::Eof {
            self.finished = true;
        }
        Some((position, token))
    }
}

/// lex the whole input string, the last token is always `Token::Eof`
pub fn lex(input: &str) -> Vec<Token> {
    Lexer::new(input.chars()).map(|(_, token)| token).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ident(name: &str) -> Token {
        Token::Ident(name.to_string())
    }

    #[test]
    fn lex_works() {
        let tokenized = vec![
            Token::Def,
            ident("foo"),
            Token::Char('('),
            ident("x"),
            ident("y"),
            Token::Char(')'),
            ident("x"),
            Token::Char('+'),
            ident("y"),
            Token::Eof,
        ];
        assert_eq!(lex("def foo(x y) x+y"), tokenized);
    }

    #[test]
    fn comments_are_elided() {
        assert_eq!(
            lex("3.14 # comment\n42"),
            vec![Token::Number(3.14), Token::Number(42.0), Token::Eof]
        );
        assert_eq!(lex("# only a comment"), vec![Token::Eof]);
        assert_eq!(
            lex("a # one\r# two\nb"),
            vec![ident("a"), ident("b"), Token::Eof]
        );
    }

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(
            lex("Def extern externs def2"),
            vec![ident("Def"), Token::Extern, ident("externs"), ident("def2"), Token::Eof]
        );
    }

    #[test]
    fn loose_numbers_keep_their_leading_value() {
        assert_eq!(
            lex("1.2.3 . .5 7."),
            vec![
                Token::Number(1.2),
                Token::Number(0.0),
                Token::Number(0.5),
                Token::Number(7.0),
                Token::Eof
            ]
        );
    }

    #[test]
    fn numbers_stop_at_letters() {
        assert_eq!(
            lex("2x"),
            vec![Token::Number(2.0), ident("x"), Token::Eof]
        );
    }

    #[test]
    fn unknown_chars_become_char_tokens() {
        assert_eq!(
            lex("a;$ ,"),
            vec![
                ident("a"),
                Token::Char(';'),
                Token::Char('$'),
                Token::Char(','),
                Token::Eof
            ]
        );
    }

    #[test]
    fn vertical_tab_is_whitespace() {
        assert_eq!(
            lex("a\x0b\t\x0c b"),
            vec![ident("a"), ident("b"), Token::Eof]
        );
    }

    #[test]
    fn eof_repeats_once_exhausted() {
        let mut lexer = Lexer::new("x".chars());
        assert_eq!(lexer.next_token(), ident("x"));
        assert_eq!(lexer.next_token(), Token::Eof);
        assert_eq!(lexer.next_token(), Token::Eof);
    }

    #[test]
    fn relexing_is_deterministic() {
        let input = "def f(a) a*2 # x\n f(1.5) < 3";
        assert_eq!(lex(input), lex(input));
    }

    #[test]
    fn positions_point_at_token_starts() {
        let positions: Vec<Position> = Lexer::new("a\n  # c\n  bc +".chars())
            .map(|(pos, _)| pos)
            .collect();
        assert_eq!(
            positions,
            vec![
                Position { line: 1, column: 1 },
                Position { line: 3, column: 3 },
                Position { line: 3, column: 6 },
                Position { line: 3, column: 7 },
            ]
        );
    }
}
