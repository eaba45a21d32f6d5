//! Error types for encoding and decoding.
//!
//! Every failure is fatal: the codec either produces a complete document or
//! value, or it returns one of these errors and nothing else.
//!
//! ## Error Categories
//!
//! - **Syntax Errors**: malformed headers, wrong indentation, stray content lines
//! - **Unknown Types**: a chunk title or inline token no handler recognizes
//! - **Missing Labels**: a reference to a label that was never defined
//! - **Root Ambiguity**: no single chunk can be chosen as the root
//! - **Key Types**: a record key that did not decode to a string
//! - **Numeric Round Trip**: a number token spelled in a non-canonical way
//! - **Invalid Literals**: an enum literal the grammar could not read back
//!
//! ## Examples
//!
//! ```rust
//! use circlebytes::{deserialize, Error};
//!
//! let result = deserialize("@ list\n      1");
//! assert!(matches!(result, Err(Error::Syntax { line: 2, .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while encoding or decoding.
///
/// Line numbers are 1-based and refer to the input document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Malformed framing or inline syntax
    #[error("Syntax error at line {line}: {msg}")]
    Syntax { line: usize, msg: String },

    /// A chunk title or inline token that no handler in the active context accepts
    #[error("Unknown type at line {line}: no handler for {token:?}")]
    UnknownType { line: usize, token: String },

    /// A label referenced without a defining chunk
    #[error("Missing label at line {line}: {label} is never defined")]
    MissingLabel { line: usize, label: String },

    /// The root chunk cannot be determined
    #[error("Root ambiguity: {0}")]
    RootAmbiguity(String),

    /// A record key that is not a string
    #[error("Key type error at line {line}: record keys must be strings, found {found}")]
    KeyType { line: usize, found: String },

    /// A number whose canonical spelling differs from the token
    #[error("Numeric round trip error at line {line}: {token:?} is not a canonical number")]
    NumericRoundTrip { line: usize, token: String },

    /// An enum literal that would collide with the document grammar
    #[error("Invalid enum literal {literal:?}: {reason}")]
    InvalidLiteral { literal: String, reason: String },

    /// A value that no handler in the active context can encode
    #[error("Unsupported value: {0}")]
    Unsupported(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error for the given line.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use circlebytes::Error;
    ///
    /// let err = Error::syntax(10, "unexpected indentation");
    /// assert!(err.to_string().contains("line 10"));
    /// ```
    pub fn syntax(line: usize, msg: &str) -> Self {
        Error::Syntax {
            line,
            msg: msg.to_string(),
        }
    }

    /// Creates an unknown type error carrying the offending token.
    pub fn unknown_type(line: usize, token: &str) -> Self {
        Error::UnknownType {
            line,
            token: token.to_string(),
        }
    }

    /// Creates a missing label error.
    pub fn missing_label(line: usize, label: &str) -> Self {
        Error::MissingLabel {
            line,
            label: label.to_string(),
        }
    }

    /// Creates a root ambiguity error.
    pub fn root_ambiguity(msg: &str) -> Self {
        Error::RootAmbiguity(msg.to_string())
    }

    /// Creates a record key type error; `found` names the decoded key's kind.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use circlebytes::Error;
    ///
    /// let err = Error::key_type(3, "number");
    /// assert!(err.to_string().contains("record keys must be strings"));
    /// ```
    pub fn key_type(line: usize, found: &str) -> Self {
        Error::KeyType {
            line,
            found: found.to_string(),
        }
    }

    /// Creates a numeric round trip error.
    pub fn numeric_round_trip(line: usize, token: &str) -> Self {
        Error::NumericRoundTrip {
            line,
            token: token.to_string(),
        }
    }

    /// Creates an invalid enum literal error.
    pub fn invalid_literal(literal: &str, reason: &str) -> Self {
        Error::InvalidLiteral {
            literal: literal.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an unsupported value error for values no handler accepts.
    pub fn unsupported(msg: &str) -> Self {
        Error::Unsupported(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reader/writer failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the input line the error points at, if it has one.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Syntax { line, .. }
            | Error::UnknownType { line, .. }
            | Error::MissingLabel { line, .. }
            | Error::KeyType { line, .. }
            | Error::NumericRoundTrip { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_accessor() {
        assert_eq!(Error::syntax(4, "bad").line(), Some(4));
        assert_eq!(Error::missing_label(2, "@3").line(), Some(2));
        assert_eq!(Error::root_ambiguity("no root").line(), None);
        assert_eq!(Error::unsupported("x").line(), None);
    }

    #[test]
    fn test_messages_carry_tokens() {
        let err = Error::unknown_type(1, "bogus");
        assert!(err.to_string().contains("\"bogus\""));

        let err = Error::numeric_round_trip(7, "01");
        assert!(err.to_string().contains("line 7"));
        assert!(err.to_string().contains("\"01\""));
    }
}
