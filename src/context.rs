//! The handler registry and enum literal table used by one encode or decode.
//!
//! A [`Context`] is built once and then only read. The process-wide default
//! is available through [`Context::shared`]; callers that need a different
//! grammar build their own instead of mutating the shared one.
//!
//! ## Examples
//!
//! ```rust
//! use circlebytes::{deserialize_with_context, serialize_with_context, Context, Value};
//!
//! // Spell booleans as yes/no.
//! let context = Context::new()
//!     .without_enum("true")
//!     .without_enum("false")
//!     .with_enum("yes", true)?
//!     .with_enum("no", false)?;
//!
//! let text = serialize_with_context(&Value::Bool(true), &context).unwrap();
//! assert_eq!(text, "yes");
//! assert_eq!(deserialize_with_context("no", &context).unwrap(), Value::Bool(false));
//!
//! // An empty context accepts no enum literals at all.
//! assert!(deserialize_with_context("null", &Context::empty()).is_err());
//! # Ok::<(), circlebytes::Error>(())
//! ```

use crate::handler::{
    EnumHandler, ListHandler, LongTextHandler, MapHandler, NumberHandler, RecordHandler,
    ReferenceHandler, ShortTextHandler, TypeHandler,
};
use crate::refs::{LabelTable, RefTable};
use crate::value::Primitive;
use crate::{Error, Result, Value};
use lazy_static::lazy_static;
use std::fmt;
use std::sync::Arc;

/// The default enum literals, in dispatch order.
pub const DEFAULT_ENUMS: [(&str, Primitive); 7] = [
    ("true", Primitive::Bool(true)),
    ("false", Primitive::Bool(false)),
    ("null", Primitive::Null),
    ("undefined", Primitive::Undefined),
    ("infinity", Primitive::Infinity),
    ("-infinity", Primitive::NegInfinity),
    ("nan", Primitive::NaN),
];

lazy_static! {
    static ref SHARED: Context = Context::new();
}

/// Handler registry plus enum literal table.
///
/// Dispatch order, most to least specific: reference, custom handlers (in
/// registration order), each enum literal, number, short text, long text,
/// list, map, record.
#[derive(Clone)]
pub struct Context {
    enums: Vec<(String, Primitive)>,
    custom: Vec<Arc<dyn TypeHandler>>,
    handlers: Vec<Arc<dyn TypeHandler>>,
}

impl Default for Context {
    fn default() -> Self {
        Context::with_enums(
            DEFAULT_ENUMS
                .iter()
                .map(|(literal, value)| (literal.to_string(), value.clone()))
                .collect(),
        )
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("enums", &self.enums)
            .field(
                "handlers",
                &self.handlers.iter().map(|h| h.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Context {
    /// Creates the default context: all seven enum literals
    /// (`true false null undefined infinity -infinity nan`) and the
    /// built-in handlers.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use circlebytes::Context;
    ///
    /// let context = Context::new();
    /// assert_eq!(context.enum_literals().count(), 7);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context without any enum literals.
    ///
    /// Payloads containing `true`, `null` and the like are rejected, which
    /// narrows the accepted grammar for untrusted input.
    #[must_use]
    pub fn empty() -> Self {
        Context::with_enums(Vec::new())
    }

    /// The frozen process-wide default context.
    #[must_use]
    pub fn shared() -> &'static Context {
        &SHARED
    }

    fn with_enums(enums: Vec<(String, Primitive)>) -> Self {
        let mut context = Context {
            enums,
            custom: Vec::new(),
            handlers: Vec::new(),
        };
        context.rebuild();
        context
    }

    fn rebuild(&mut self) {
        let mut handlers: Vec<Arc<dyn TypeHandler>> =
            Vec::with_capacity(self.enums.len() + self.custom.len() + 7);
        handlers.push(Arc::new(ReferenceHandler));
        handlers.extend(self.custom.iter().cloned());
        for (literal, value) in &self.enums {
            handlers.push(Arc::new(EnumHandler::new(literal.clone(), value.clone())));
        }
        handlers.push(Arc::new(NumberHandler));
        handlers.push(Arc::new(ShortTextHandler));
        handlers.push(Arc::new(LongTextHandler));
        handlers.push(Arc::new(ListHandler));
        handlers.push(Arc::new(MapHandler));
        handlers.push(Arc::new(RecordHandler));
        self.handlers = handlers;
    }

    /// Adds or replaces an enum literal.
    ///
    /// A replaced literal keeps its position; a new one is tried after the
    /// existing literals.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLiteral`] if the literal could not be read
    /// back as a single inline token: it is empty, contains whitespace or
    /// `|`, starts with `@` or `#`, is a block title, or is a finite number.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use circlebytes::{Context, Primitive};
    ///
    /// assert!(Context::new().with_enum("nil", Primitive::Null).is_ok());
    /// assert!(Context::new().with_enum("#nil", Primitive::Null).is_err());
    /// assert!(Context::new().with_enum("list", Primitive::Null).is_err());
    /// ```
    pub fn with_enum(mut self, literal: &str, value: impl Into<Primitive>) -> Result<Self> {
        self.check_literal(literal)?;
        let value = value.into();
        match self.enums.iter_mut().find(|(l, _)| l == literal) {
            Some(entry) => entry.1 = value,
            None => self.enums.push((literal.to_string(), value)),
        }
        self.rebuild();
        Ok(self)
    }

    fn check_literal(&self, literal: &str) -> Result<()> {
        let reason = if literal.is_empty() {
            "literal is empty"
        } else if literal.chars().any(char::is_whitespace) {
            "literal contains whitespace"
        } else if literal.contains('|') {
            "literal contains |"
        } else if literal.starts_with('@') {
            "literal starts with @ and would read as a label"
        } else if literal.starts_with('#') {
            "literal starts with # and would read as a comment"
        } else if self.handler_for_title(literal).is_some() {
            "literal is a block title"
        } else if literal.parse::<f64>().map_or(false, f64::is_finite) {
            "literal is a number"
        } else {
            return Ok(());
        };
        Err(Error::invalid_literal(literal, reason))
    }

    /// Removes an enum literal.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use circlebytes::{serialize_with_context, Context, Value};
    ///
    /// let context = Context::new().without_enum("undefined");
    /// assert!(serialize_with_context(&Value::Undefined, &context).is_err());
    /// ```
    #[must_use]
    pub fn without_enum(mut self, literal: &str) -> Self {
        self.enums.retain(|(l, _)| l != literal);
        self.rebuild();
        self
    }

    /// Registers a custom handler, tried before every built-in except the
    /// reference handler.
    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn TypeHandler>) -> Self {
        self.custom.push(handler);
        self.rebuild();
        self
    }

    /// The enum literals in dispatch order.
    pub fn enum_literals(&self) -> impl Iterator<Item = (&str, &Primitive)> {
        self.enums.iter().map(|(l, v)| (l.as_str(), v))
    }

    /// All handlers in dispatch order.
    #[must_use]
    pub fn handlers(&self) -> &[Arc<dyn TypeHandler>] {
        &self.handlers
    }

    /// The first handler whose encode-side test accepts `value`.
    #[must_use]
    pub fn dispatch(&self, value: &Value, refs: &RefTable) -> Option<&Arc<dyn TypeHandler>> {
        self.handlers.iter().find(|h| h.matches(value, refs))
    }

    /// The first block handler owning `title`.
    #[must_use]
    pub fn handler_for_title(&self, title: &str) -> Option<&Arc<dyn TypeHandler>> {
        self.handlers.iter().find(|h| h.title() == Some(title))
    }

    /// Decodes one inline token with the first handler that claims it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if no handler claims the token, or the
    /// error raised by the handler that did.
    pub fn decode_inline(&self, token: &str, labels: &LabelTable, line: usize) -> Result<Value> {
        self.handlers
            .iter()
            .find_map(|h| h.decode_inline(token, labels, line))
            .unwrap_or_else(|| Err(Error::unknown_type(line, token)))
    }
}
