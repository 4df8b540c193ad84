// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Query lexer.
//!
//! Keywords are recognised case-insensitively but keep their spelling, so the
//! renderer reproduces `SELECT` and `select` as written.

use super::token::{Position, Token, TokenType, is_reserved_keyword};

/// Tokenizer over a query string.
pub struct Lexer {
    input:         Vec<char>,
    position:      usize,
    read_position: usize,
    ch:            char,
    pos:           Position
}

impl Lexer {
    /// Create a lexer for `input`.
    pub fn new(input: &str) -> Self {
        let mut lexer = Self {
            input:         input.chars().collect(),
            position:      0,
            read_position: 0,
            ch:            '\0',
            pos:           Position::new(0, 1, 0)
        };
        lexer.read_char();
        lexer.pos = Position::new(0, 1, 0);
        lexer
    }

    /// Tokenize the whole input; the last token is [`TokenType::Eof`].
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.token_type == TokenType::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn read_char(&mut self) {
        if self.read_position > 0 {
            if self.ch == '\n' {
                self.pos.line += 1;
                self.pos.column = 0;
            } else {
                self.pos.column += 1;
            }
        }
        if self.read_position >= self.input.len() {
            self.ch = '\0';
            self.position = self.input.len();
        } else {
            self.ch = self.input[self.read_position];
            self.position = self.read_position;
        }
        self.read_position += 1;
        self.pos.offset = self.position;
    }

    fn peek_char(&self) -> char {
        self.input.get(self.read_position).copied().unwrap_or('\0')
    }

    fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        let pos = self.pos;

        if self.at_end() {
            return Token::new(TokenType::Eof, "", pos);
        }

        match self.ch {
            '\'' => {
                let literal = self.read_quoted('\'');
                Token::new(TokenType::String, literal, pos)
            }
            '"' | '`' => {
                let literal = self.read_quoted(self.ch);
                Token::new(TokenType::Identifier, literal, pos)
            }
            '?' => {
                let mut literal = String::from('?');
                self.read_char();
                while self.ch.is_ascii_digit() && !self.at_end() {
                    literal.push(self.ch);
                    self.read_char();
                }
                Token::new(TokenType::Parameter, literal, pos)
            }
            ':' if is_identifier_start(self.peek_char()) => {
                let mut literal = String::from(':');
                self.read_char();
                literal.push_str(&self.read_identifier());
                Token::new(TokenType::Parameter, literal, pos)
            }
            c if c.is_ascii_digit() || (c == '.' && self.peek_char().is_ascii_digit()) => self.read_number(pos),
            c if is_identifier_start(c) => {
                let literal = self.read_identifier();
                let token_type = if is_reserved_keyword(&literal) {
                    TokenType::Keyword
                } else {
                    TokenType::Identifier
                };
                Token::new(token_type, literal, pos)
            }
            '(' | ')' | ',' | '.' | '{' | '}' | '[' | ']' | ';' => {
                let literal = self.ch.to_string();
                self.read_char();
                Token::new(TokenType::Punctuator, literal, pos)
            }
            _ => self.read_operator(pos)
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while !self.at_end() && self.ch.is_whitespace() {
                self.read_char();
            }
            if self.ch == '-' && self.peek_char() == '-' {
                while !self.at_end() && self.ch != '\n' {
                    self.read_char();
                }
                continue;
            }
            if self.ch == '/' && self.peek_char() == '*' {
                self.read_char();
                self.read_char();
                while !self.at_end() && !(self.ch == '*' && self.peek_char() == '/') {
                    self.read_char();
                }
                if !self.at_end() {
                    self.read_char();
                    self.read_char();
                }
                continue;
            }
            return;
        }
    }

    /// Quoted text including the quotes; a doubled quote escapes itself.
    fn read_quoted(&mut self, quote: char) -> String {
        let mut literal = String::from(quote);
        self.read_char();
        while !self.at_end() {
            if self.ch == quote {
                literal.push(quote);
                self.read_char();
                if self.ch == quote && !self.at_end() {
                    literal.push(quote);
                    self.read_char();
                    continue;
                }
                return literal;
            }
            literal.push(self.ch);
            self.read_char();
        }
        literal
    }

    fn read_identifier(&mut self) -> String {
        let mut literal = String::new();
        while !self.at_end() && is_identifier_part(self.ch) {
            literal.push(self.ch);
            self.read_char();
        }
        literal
    }

    fn read_number(&mut self, pos: Position) -> Token {
        let mut literal = String::new();
        let mut token_type = TokenType::Integer;
        while !self.at_end() && self.ch.is_ascii_digit() {
            literal.push(self.ch);
            self.read_char();
        }
        if self.ch == '.' && self.peek_char().is_ascii_digit() {
            token_type = TokenType::Decimal;
            literal.push('.');
            self.read_char();
            while !self.at_end() && self.ch.is_ascii_digit() {
                literal.push(self.ch);
                self.read_char();
            }
        }
        if matches!(self.ch, 'e' | 'E')
            && (self.peek_char().is_ascii_digit() || matches!(self.peek_char(), '+' | '-'))
        {
            token_type = TokenType::Decimal;
            literal.push(self.ch);
            self.read_char();
            if matches!(self.ch, '+' | '-') {
                literal.push(self.ch);
                self.read_char();
            }
            while !self.at_end() && self.ch.is_ascii_digit() {
                literal.push(self.ch);
                self.read_char();
            }
        }
        while !self.at_end() && matches!(self.ch, 'l' | 'L' | 'd' | 'D' | 'f' | 'F' | 'b' | 'B' | 'i' | 'I')
        {
            if !matches!(self.ch, 'l' | 'L') {
                token_type = TokenType::Decimal;
            }
            literal.push(self.ch);
            self.read_char();
        }
        Token::new(token_type, literal, pos)
    }

    fn read_operator(&mut self, pos: Position) -> Token {
        let first = self.ch;
        let second = self.peek_char();
        let two: String = [first, second].iter().collect();
        if matches!(two.as_str(), "<>" | "!=" | "^=" | "<=" | ">=" | "||") {
            self.read_char();
            self.read_char();
            return Token::new(TokenType::Operator, two, pos);
        }
        self.read_char();
        let token_type = if matches!(first, '=' | '<' | '>' | '+' | '-' | '*' | '/' | '%') {
            TokenType::Operator
        } else {
            TokenType::Illegal
        };
        Token::new(token_type, first.to_string(), pos)
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
