//! The circlebytes document format.
//!
//! This module documents the text format as implemented by this library. It
//! contains no code.
//!
//! # Overview
//!
//! A document is a sequence of **chunks**. Each chunk describes one block
//! value (a list, map, record or long string) and starts with a header line.
//! Content lines follow, indented by exactly four spaces. Values inside
//! content lines are **inline tokens**; a token that names another chunk is a
//! **label**, which is how sharing and cycles are written.
//!
//! ```text
//! @ jshash
//!     |title| |Graph|
//!     |self| @
//!     |notes| @1
//!     |tags| @2
//! @1 text
//!     first line
//!     second line
//! @2 hash
//!     1 @1
//!     @2 |me|
//! ```
//!
//! Decoding this gives a record whose `self` field is the record itself,
//! whose `notes` is a two-line string and whose `tags` is a map with two
//! entries: the number `1` mapped to that same string, and the map itself
//! mapped to `"me"`.
//!
//! # Headers
//!
//! ```text
//! [label ]title
//! ```
//!
//! | Label | Meaning |
//! |-------|---------|
//! | `@` | the root value |
//! | `@1`, `@2`, ... | other values, numbered in the order the encoder met them |
//!
//! Labels have no leading zeros and `@0` is not a label. A header without a
//! label is only allowed when the document has a single chunk, which is then
//! the root.
//!
//! | Title | Value | Content line |
//! |-------|-------|--------------|
//! | `list` | list | one token |
//! | `hash` | map with keys of any kind | key token, space, value token |
//! | `jshash` | record with string keys | key token, space, value token |
//! | `text` | string | one raw line of the string |
//!
//! Custom handlers registered on a [`Context`](crate::Context) add titles of
//! their own.
//!
//! # Inline Tokens
//!
//! Tried in order: label, custom handler tokens, enum literal, number,
//! short text.
//!
//! | Token | Value |
//! |-------|-------|
//! | `@`, `@3` | the value of that chunk |
//! | `true`, `false` | booleans |
//! | `null`, `undefined` | the two "no value" singletons |
//! | `nan`, `infinity`, `-infinity` | the non-finite numbers |
//! | `42`, `-0.5`, `1000000` | finite numbers |
//! | `\|hello world\|` | short text |
//!
//! Custom enum literals must stay readable as one token: they may not be
//! empty, contain whitespace or `|`, start with `@` or `#`, equal a block
//! title, or parse as a finite number.
//!
//! ## Numbers
//!
//! A finite number is written in its shortest round-trip decimal form.
//! When decoding, a token that parses as a number but whose canonical form
//! has a different length (`007`, `1.50`, `+1`, `1e3`) is rejected rather than
//! silently normalized.
//!
//! ## Short Text
//!
//! A string shorter than 50 characters without `|` or a line break is
//! written between pipes and may contain spaces. Every other string gets a
//! `text` chunk, and equal strings of that kind share one chunk.
//!
//! # Content Lines
//!
//! - Exactly four spaces of indentation; fewer or more (outside `text`
//!   chunks) is a syntax error
//! - Tokens are separated by exactly one space
//! - After the expected tokens, ` #` starts a comment
//! - `text` content is raw: further indentation and `#` are part of the string
//! - A key appears at most once per `hash` or `jshash` chunk
//!
//! # Blank Lines and Comments
//!
//! - A blank line ends the current chunk; an indented line after it needs a
//!   new header
//! - A line starting with `#` at the top level is a comment
//! - A labeled header may end in ` # comment`; an unlabeled header is taken
//!   whole, so `list # root` names an unknown type while `@ list # root` is a
//!   list
//!
//! ```text
//! # settings
//! @ jshash # root
//!     |retries| 3 # per request
//!     |verbose| false
//! ```
//!
//! # Bare Values
//!
//! A document whose root needs no chunk is a single inline token:
//!
//! ```text
//! |hello|
//! ```
//!
//! # Errors
//!
//! | Error | Raised for |
//! |-------|------------|
//! | [`Syntax`](crate::Error::Syntax) | bad indentation, spacing, headers, duplicate labels or keys, empty document |
//! | [`UnknownType`](crate::Error::UnknownType) | a title or token no handler claims |
//! | [`MissingLabel`](crate::Error::MissingLabel) | a reference to an undefined label |
//! | [`RootAmbiguity`](crate::Error::RootAmbiguity) | no root, two roots, or unlabeled chunks in a multi-chunk document |
//! | [`KeyType`](crate::Error::KeyType) | a non-string key in a `jshash` |
//! | [`NumericRoundTrip`](crate::Error::NumericRoundTrip) | a number token that is not canonical |
//! | [`InvalidLiteral`](crate::Error::InvalidLiteral) | an enum literal passed to `Context::with_enum` that the grammar could not read back |
