// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while reading and evaluating Fisp filters.

use thiserror::Error;

/// Malformed filter text. Positions are byte offsets into the input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unterminated quoted atom starting at position {position}")]
    UnterminatedQuote { position: usize },

    #[error("unmatched ')' at position {position}")]
    UnmatchedClose { position: usize },

    #[error("unclosed '(' opened at position {position}")]
    UnclosedOpen { position: usize },

    #[error("invalid \\u escape at position {position}: {text:?}")]
    InvalidUnicodeEscape { position: usize, text: String },
}

impl ParseError {
    pub fn position(&self) -> usize {
        match self {
            ParseError::UnterminatedQuote { position }
            | ParseError::UnmatchedClose { position }
            | ParseError::UnclosedOpen { position }
            | ParseError::InvalidUnicodeEscape { position, .. } => *position,
        }
    }
}

/// Failure while evaluating an expression against a filter context.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("no such function '{name}'")]
    UnknownFunction { name: String },

    #[error("cannot evaluate call form with head {head}")]
    UnresolvableHead { head: String },

    #[error("expected a single text value but found {found}")]
    NotText { found: String },

    #[error("invalid regular expression {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
