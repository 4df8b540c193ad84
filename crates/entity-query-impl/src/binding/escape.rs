// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Escaping of LIKE wildcards.

use std::fmt;

/// Character used to escape `%` and `_` in LIKE values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EscapeCharacter(char);

impl EscapeCharacter {
    /// Backslash, the default escape character.
    pub const DEFAULT: Self = Self('\\');

    /// Escape character `c`.
    pub const fn of(c: char) -> Self {
        Self(c)
    }

    /// The escape character.
    pub const fn value(&self) -> char {
        self.0
    }

    /// Escape `%`, `_` and the escape character itself.
    pub fn escape(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        for c in value.chars() {
            if c == '%' || c == '_' || c == self.0 {
                out.push(self.0);
            }
            out.push(c);
        }
        out
    }
}

impl Default for EscapeCharacter {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for EscapeCharacter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
