// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Lexical tokens of JPQL, HQL and EQL.

use std::{collections::HashSet, fmt, sync::LazyLock};

/// Location of a token in the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Character offset, starting at 0.
    pub offset: usize,

    /// Line number, starting at 1.
    pub line: usize,

    /// Character position in the line, starting at 0.
    pub column: usize
}

impl Position {
    /// Create a new position.
    pub const fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// End of input.
    Eof,

    /// Character the lexer cannot classify.
    Illegal,

    /// Identifier, including quoted identifiers.
    Identifier,

    /// Reserved word.
    Keyword,

    /// `'text'`
    String,

    /// `42`, `42L`
    Integer,

    /// `4.2`, `4.2e1`, `4.2BD`
    Decimal,

    /// `?1`, `?`, `:name`
    Parameter,

    /// `=`, `<>`, `||`, `+`, …
    Operator,

    /// `(`, `)`, `,`, `.`, `{`, `}`
    Punctuator
}

/// Lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Classification.
    pub token_type: TokenType,

    /// Source text.
    pub literal: String,

    /// Location of the first character.
    pub position: Position
}

impl Token {
    /// Create a new token.
    pub fn new(token_type: TokenType, literal: impl Into<String>, position: Position) -> Self {
        Self {
            token_type,
            literal: literal.into(),
            position
        }
    }

    /// Check for the keyword `keyword`, ignoring case.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.token_type == TokenType::Keyword && self.literal.eq_ignore_ascii_case(keyword)
    }

    /// Check for an identifier or keyword spelled `word`, ignoring case.
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self.token_type, TokenType::Identifier | TokenType::Keyword)
            && self.literal.eq_ignore_ascii_case(word)
    }

    /// Check for the punctuator `punct`.
    pub fn is_punct(&self, punct: &str) -> bool {
        self.token_type == TokenType::Punctuator && self.literal == punct
    }

    /// Check for the operator `op`.
    pub fn is_operator(&self, op: &str) -> bool {
        self.token_type == TokenType::Operator && self.literal == op
    }

    /// Check for identifiers and keywords.
    pub const fn is_any_word(&self) -> bool {
        matches!(self.token_type, TokenType::Identifier | TokenType::Keyword)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token_type {
            TokenType::Eof => f.write_str("<EOF>"),
            _ => f.write_str(&self.literal)
        }
    }
}

/// Words that cannot be used as identification variables or unqualified
/// paths. Any word may follow a `.` in a path.
static RESERVED_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "ALL", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "DELETE", "DESC", "DISTINCT",
        "ELSE", "EMPTY", "END", "ESCAPE", "EXCEPT", "EXISTS", "FALSE", "FETCH", "FROM", "GROUP",
        "HAVING", "IN", "INNER", "INTERSECT", "IS", "JOIN", "LEFT", "LIKE", "MEMBER", "NEW", "NOT",
        "NULL", "NULLS", "OF", "ON", "OR", "ORDER", "OUTER", "SELECT", "SET", "SOME", "THEN",
        "TRUE", "UNION", "UPDATE", "WHEN", "WHERE", "WITH"
    ]
    .into_iter()
    .collect()
});

/// Check if `word` is reserved, ignoring case.
pub fn is_reserved_keyword(word: &str) -> bool {
    RESERVED_KEYWORDS.contains(word.to_ascii_uppercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_words_ignore_case() {
        assert!(is_reserved_keyword("select"));
        assert!(is_reserved_keyword("Order"));
        assert!(!is_reserved_keyword("lastname"));
        assert!(!is_reserved_keyword("limit"));
    }

    #[test]
    fn token_predicates() {
        let token = Token::new(TokenType::Keyword, "Select", Position::new(0, 1, 0));
        assert!(token.is_keyword("SELECT"));
        assert!(token.is_word("select"));
        assert!(!token.is_punct("("));
        assert_eq!(Token::new(TokenType::Eof, "", Position::default()).to_string(), "<EOF>");
    }
}
