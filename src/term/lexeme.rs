use super::Number;

/// All lexemes of the s-expression dialect.
#[derive(Clone, Debug, PartialEq)]
pub enum Lexeme {
    // Delimiters
    LParen,            // (
    RParen,            // )
    NamedOpen(String), // name:(

    // Literals
    Atom(String),
    Number(Number),
    Str(String),
    /// `{ ... }` fragment, braces included.
    Code(String),
    /// `[field value text]`
    Field { field: String, value: String },

    // Guard shorthand: `&& text =>`
    GuardAnd,
    GuardText(String),
    GuardArrow,

    // End of file
    Eof,
}
