use std::{iter::Peekable, str::CharIndices};

use tracing::debug;

use crate::token::{Span, Token, TokenKind, EOF_TEXT, NEWLINE_TEXT};

mod error;

pub use error::{LexError, LexResult};

/// Characters that end an identifier. Anything else, including characters
/// that start no other token, is swallowed into the identifier being read.
const IDENTIFIER_DELIMITERS: &str = " \\\t\r\n\"';:`~!@#$%^&*()+-=|{}[]<>,./?";

/// Pull-based tokenizer over an in-memory source buffer.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            line: 1,
            column: 0,
            finished: false,
        }
    }

    /// Returns the next token; once the input is exhausted every call yields
    /// an end-of-input token.
    pub fn next_token(&mut self) -> LexResult<Token<'a>> {
        loop {
            self.skip_whitespace();

            let Some(&(start, ch)) = self.chars.peek() else {
                return Ok(self.eof_token());
            };
            let line = self.line;
            let column = self.column;

            match ch {
                '\r' | '\n' => return Ok(self.read_newline(start, line, column)),
                '/' if self.peek_second() == Some('/') => self.skip_comment(),
                '"' => return self.read_string(start, line, column),
                c if c.is_ascii_digit() => return Ok(self.read_number(start, line, column)),
                _ => {
                    if let Some(kind) = self.read_operator(ch) {
                        return Ok(self.token_from(kind, start, line, column));
                    }
                    return Ok(self.read_identifier(start, line, column));
                }
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c == ' ' || c == '\t' {
                self.advance_char();
            } else {
                break;
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            self.advance_char();
        }
    }

    fn read_newline(&mut self, start: usize, line: usize, column: usize) -> Token<'a> {
        // Blank lines, indentation and whole-line comments all fold into the
        // one separator.
        loop {
            match self.chars.peek().map(|&(_, c)| c) {
                Some(' ' | '\t' | '\r' | '\n') => {
                    self.advance_char();
                }
                Some('/') if self.peek_second() == Some('/') => self.skip_comment(),
                _ => break,
            }
        }
        Token::new(
            TokenKind::Newline,
            NEWLINE_TEXT,
            Span {
                start,
                end: self.current_index(),
                line,
                column,
            },
        )
    }

    fn read_operator(&mut self, ch: char) -> Option<TokenKind> {
        let single = match ch {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '=' => TokenKind::Assign,
            '<' => TokenKind::Less,
            '>' => TokenKind::Greater,
            '!' => TokenKind::Bang,
            '&' => TokenKind::Amp,
            '|' => TokenKind::Pipe,
            '^' => TokenKind::Caret,
            '~' => TokenKind::Tilde,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ':' => TokenKind::Colon,
            _ => return None,
        };
        self.advance_char();

        let double = match (ch, self.chars.peek().map(|&(_, c)| c)) {
            ('+', Some('=')) => Some(TokenKind::PlusAssign),
            ('-', Some('=')) => Some(TokenKind::MinusAssign),
            ('*', Some('=')) => Some(TokenKind::StarAssign),
            ('/', Some('=')) => Some(TokenKind::SlashAssign),
            ('=', Some('=')) => Some(TokenKind::EqualEqual),
            ('!', Some('=')) => Some(TokenKind::BangEqual),
            ('<', Some('=')) => Some(TokenKind::LessEqual),
            ('>', Some('=')) => Some(TokenKind::GreaterEqual),
            ('&', Some('&')) => Some(TokenKind::AmpAmp),
            ('|', Some('|')) => Some(TokenKind::PipePipe),
            _ => None,
        };
        if let Some(kind) = double {
            self.advance_char();
            return Some(kind);
        }
        Some(single)
    }

    fn read_number(&mut self, start: usize, line: usize, column: usize) -> Token<'a> {
        self.advance_char(); // Consume first digit
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_hexdigit() || matches!(c, '.' | '_' | 'o' | 'x') {
                self.advance_char();
            } else {
                break;
            }
        }
        self.token_from(TokenKind::Number, start, line, column)
    }

    fn read_string(&mut self, start: usize, line: usize, column: usize) -> LexResult<Token<'a>> {
        self.advance_char(); // Consume opening quote
        let content_start = start + 1;
        loop {
            let Some(&(idx, c)) = self.chars.peek() else {
                return Err(LexError::UnterminatedString { line, column });
            };
            match c {
                '"' => {
                    self.advance_char(); // Consume closing quote
                    return Ok(Token::new(
                        TokenKind::String,
                        &self.input[content_start..idx],
                        Span {
                            start,
                            end: idx + 1,
                            line,
                            column,
                        },
                    ));
                }
                '\\' => {
                    self.advance_char();
                    if self.advance_char().is_none() {
                        return Err(LexError::UnterminatedString { line, column });
                    }
                }
                _ => {
                    self.advance_char();
                }
            }
        }
    }

    fn read_identifier(&mut self, start: usize, line: usize, column: usize) -> Token<'a> {
        self.advance_char(); // Consume first char, even if it is a delimiter
        while let Some(&(_, c)) = self.chars.peek() {
            if IDENTIFIER_DELIMITERS.contains(c) {
                break;
            }
            self.advance_char();
        }

        let end = self.current_index();
        let kind = TokenKind::keyword(&self.input[start..end]).unwrap_or(TokenKind::Identifier);
        self.token_from(kind, start, line, column)
    }

    fn token_from(
        &mut self,
        kind: TokenKind,
        start: usize,
        line: usize,
        column: usize,
    ) -> Token<'a> {
        let end = self.current_index();
        Token::new(
            kind,
            &self.input[start..end],
            Span {
                start,
                end,
                line,
                column,
            },
        )
    }

    fn eof_token(&mut self) -> Token<'a> {
        let index = self.input.len();
        Token::new(
            TokenKind::Eof,
            EOF_TEXT,
            Span {
                start: index,
                end: index,
                line: self.line,
                column: self.column,
            },
        )
    }

    fn advance_char(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if let Some((_, c)) = next {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        next
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.peek().map(|&(_, c)| c)
    }

    fn current_index(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }
}

/// Yields every token up to and including the first end-of-input token, or
/// the first lexical error.
impl<'a> Iterator for Lexer<'a> {
    type Item = LexResult<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_token();
        match &result {
            Ok(token) if token.kind == TokenKind::Eof => self.finished = true,
            Err(_) => self.finished = true,
            Ok(_) => {}
        }
        Some(result)
    }
}

pub fn tokenize(input: &str) -> LexResult<Vec<Token<'_>>> {
    let tokens = Lexer::new(input).collect::<LexResult<Vec<_>>>()?;
    debug!(count = tokens.len(), "tokenized source");
    Ok(tokens)
}
