//! SQL Lexer (Tokenizer)
//!
//! This module converts SQL strings into a stream of tokens. The lexer never
//! fails: bytes it does not recognise are skipped, and the stream always ends
//! with a single EOF token. Every token carries the 0-based byte offset where
//! it starts, which the parser uses for syntax-error positions.

use super::token::{SpannedToken, Token};

/// SQL Lexer
pub struct Lexer {
    /// Input characters with their byte offsets
    input: Vec<(usize, char)>,
    /// Total byte length of the input
    len: usize,
    /// Current position in input (character index)
    position: usize,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        Self {
            input: input.char_indices().collect(),
            len: input.len(),
            position: 0,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Vec<SpannedToken> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let done = token.token == Token::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }

        tokens
    }

    /// Get the next token from the input
    fn next_token(&mut self) -> SpannedToken {
        loop {
            self.skip_whitespace();
            self.skip_comment();

            if self.is_at_end() {
                return SpannedToken::new(Token::Eof, self.len);
            }

            let offset = self.current_offset();
            let ch = self.current_char();

            let token = match ch {
                '(' => {
                    self.advance();
                    Token::LParen
                }
                ')' => {
                    self.advance();
                    Token::RParen
                }
                ',' => {
                    self.advance();
                    Token::Comma
                }
                ';' => {
                    self.advance();
                    Token::Semicolon
                }
                '*' => {
                    self.advance();
                    Token::Asterisk
                }
                '.' => {
                    self.advance();
                    Token::Dot
                }
                '=' => {
                    self.advance();
                    Token::Eq
                }
                '!' => {
                    self.advance();
                    if self.current_is('=') {
                        self.advance();
                        Token::Neq
                    } else {
                        // lone '!' is not part of the language; skip it
                        continue;
                    }
                }
                '<' => {
                    self.advance();
                    if self.current_is('=') {
                        self.advance();
                        Token::Lte
                    } else {
                        Token::Lt
                    }
                }
                '>' => {
                    self.advance();
                    if self.current_is('=') {
                        self.advance();
                        Token::Gte
                    } else {
                        Token::Gt
                    }
                }
                '\'' | '"' => self.read_string(ch),
                c if c.is_ascii_digit() => self.read_number(),
                c if c.is_ascii_alphabetic() => self.read_identifier(),
                _ => {
                    // unknown byte: skip and keep going
                    self.advance();
                    continue;
                }
            };

            return SpannedToken::new(token, offset);
        }
    }

    /// Check if we've reached the end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get the current character
    fn current_char(&self) -> char {
        self.input[self.position].1
    }

    /// Byte offset of the current character
    fn current_offset(&self) -> usize {
        self.input[self.position].0
    }

    /// Peek at the next character
    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).map(|&(_, c)| c)
    }

    /// Check the current character without consuming it
    fn current_is(&self, expected: char) -> bool {
        !self.is_at_end() && self.current_char() == expected
    }

    /// Advance to the next character
    fn advance(&mut self) {
        self.position += 1;
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    /// Skip a line comment (`--` to the line terminator, inclusive)
    fn skip_comment(&mut self) {
        while self.current_is('-') && self.peek_char() == Some('-') {
            while !self.is_at_end() && self.current_char() != '\n' {
                self.advance();
            }
            if !self.is_at_end() {
                self.advance(); // consume the line terminator
            }
            self.skip_whitespace();
        }
    }

    /// Read a string literal delimited by `delim`. The only escape is
    /// `\<delim>`, which yields the literal delimiter. An unterminated
    /// string consumes to end of input.
    fn read_string(&mut self, delim: char) -> Token {
        self.advance(); // skip opening delimiter

        let mut value = String::new();

        while !self.is_at_end() {
            let ch = self.current_char();

            if ch == '\\' && self.peek_char() == Some(delim) {
                value.push(delim);
                self.advance();
                self.advance();
            } else if ch == delim {
                self.advance(); // skip closing delimiter
                break;
            } else {
                value.push(ch);
                self.advance();
            }
        }

        Token::StringLiteral(value)
    }

    /// Read a number: one or more digits, with a fractional part only when
    /// `.` is followed by at least one digit.
    fn read_number(&mut self) -> Token {
        let mut value = String::new();

        while !self.is_at_end() && self.current_char().is_ascii_digit() {
            value.push(self.current_char());
            self.advance();
        }

        let mut is_float = false;
        if self.current_is('.') {
            if let Some(next) = self.peek_char() {
                if next.is_ascii_digit() {
                    is_float = true;
                    value.push('.');
                    self.advance();
                    while !self.is_at_end() && self.current_char().is_ascii_digit() {
                        value.push(self.current_char());
                        self.advance();
                    }
                }
            }
        }

        if is_float {
            Token::FloatLiteral(value.parse::<f64>().unwrap_or(0.0))
        } else {
            Token::IntegerLiteral(value.parse::<i64>().unwrap_or(0))
        }
    }

    /// Read an identifier and reclassify it as a keyword when its uppercase
    /// form matches one. Keyword tokens carry the uppercase form, identifier
    /// tokens the original case.
    fn read_identifier(&mut self) -> Token {
        let mut value = String::new();

        while !self.is_at_end() {
            let ch = self.current_char();
            if ch.is_ascii_alphanumeric() || ch == '_' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match Token::from_keyword(&value) {
            Some(keyword) => keyword,
            None => Token::Identifier(value),
        }
    }
}
