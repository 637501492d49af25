//! Term Reader: the s-expression dialect shared by schema and rule files.
//!
//! The reader knows nothing about nodes or rules. It turns source text into
//! the list of its top-level [`Term`] items.

pub mod lexeme;
pub mod lexer;
pub mod reader;


use std::fmt;

use crate::span::Spanned;

pub use reader::read_items;

/// Numeric literal. Decimals that are exactly integral are stored as `Int`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn from_float(value: f64) -> Number {
        if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
            Number::Int(value as i64)
        } else {
            Number::Float(value)
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{}", n),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

/// Pieces of the `&& guard =>` shorthand, kept flat in the enclosing list.
#[derive(Clone, Debug, PartialEq)]
pub enum Guard {
    And,
    Text(String),
    Arrow,
}

/// Untyped reader output.
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    Atom(String),
    Number(Number),
    Str(String),
    /// Brace-delimited C fragment, braces included.
    Code(String),
    List(Vec<Spanned<Term>>),
    /// `name:( ... )`
    NamedList {
        name: String,
        items: Vec<Spanned<Term>>,
    },
    /// `[field value]`
    Field {
        field: String,
        value: String,
    },
    Guard(Guard),
}

impl Term {
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Term::Atom(name) => Some(name),
            _ => None,
        }
    }

    /// Short description used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Term::Atom(_) => "atom",
            Term::Number(_) => "number",
            Term::Str(_) => "string",
            Term::Code(_) => "code block",
            Term::List(_) => "list",
            Term::NamedList { .. } => "named list",
            Term::Field { .. } => "field constraint",
            Term::Guard(_) => "guard",
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Spanned<Term>]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", item.node)?;
    }
    f.write_str(")")
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(name) => f.write_str(name),
            Term::Number(n) => write!(f, "{}", n),
            Term::Str(s) if s.contains('"') => write!(f, "'{}'", s),
            Term::Str(s) => write!(f, "\"{}\"", s),
            Term::Code(body) => f.write_str(body),
            Term::List(items) => {
                f.write_str("(")?;
                write_items(f, items)
            }
            Term::NamedList { name, items } => {
                write!(f, "{}:(", name)?;
                write_items(f, items)
            }
            Term::Field { field, value } => write!(f, "[{} {}]", field, value),
            Term::Guard(Guard::And) => f.write_str("&&"),
            Term::Guard(Guard::Text(text)) => f.write_str(text),
            Term::Guard(Guard::Arrow) => f.write_str("=>"),
        }
    }
}
