use crate::diagnostic::Diagnostic;
use crate::span::{Span, Spanned};

use super::lexeme::Lexeme;
use super::lexer::Lexer;
use super::{Guard, Term};

const MAX_NESTING_DEPTH: u32 = 256;

/// Read `source` and return the items of its implicit outer list.
pub fn read_items(source: &str, file_id: u16) -> Result<Vec<Spanned<Term>>, Diagnostic> {
    let tokens = Lexer::new(source, file_id).tokenize()?;
    let mut reader = Reader {
        tokens,
        pos: 0,
        depth: 0,
    };
    let items = reader.read_seq(None)?;
    log::trace!("read {} top-level items from file {}", items.len(), file_id);
    Ok(items)
}

struct Reader {
    tokens: Vec<Spanned<Lexeme>>,
    pos: usize,
    depth: u32,
}

impl Reader {
    /// Read items until the matching `)` (when `open` is the span of the
    /// opening paren) or end of file (top level).
    fn read_seq(&mut self, open: Option<Span>) -> Result<Vec<Spanned<Term>>, Diagnostic> {
        let mut items = Vec::new();
        loop {
            let tok = self.advance();
            let span = tok.span;
            let term = match tok.node {
                Lexeme::Eof => {
                    return match open {
                        None => Ok(items),
                        Some(open) => Err(Diagnostic::error(
                            "unbalanced parentheses: '(' is never closed".to_string(),
                            open,
                        )
                        .with_help("add the missing ')'".to_string())),
                    };
                }
                Lexeme::RParen => {
                    return match open {
                        Some(_) => Ok(items),
                        None => Err(Diagnostic::error(
                            "unbalanced parentheses: unmatched ')'".to_string(),
                            span,
                        )),
                    };
                }
                Lexeme::LParen => {
                    let (inner, end) = self.read_nested(span)?;
                    items.push(Spanned::new(Term::List(inner), span.merge(end)));
                    continue;
                }
                Lexeme::NamedOpen(name) => {
                    let (inner, end) = self.read_nested(span)?;
                    items.push(Spanned::new(
                        Term::NamedList { name, items: inner },
                        span.merge(end),
                    ));
                    continue;
                }
                Lexeme::Atom(name) => Term::Atom(name),
                Lexeme::Number(n) => Term::Number(n),
                Lexeme::Str(s) => Term::Str(s),
                Lexeme::Code(body) => Term::Code(body),
                Lexeme::Field { field, value } => Term::Field { field, value },
                Lexeme::GuardAnd => Term::Guard(Guard::And),
                Lexeme::GuardText(text) => Term::Guard(Guard::Text(text)),
                Lexeme::GuardArrow => Term::Guard(Guard::Arrow),
            };
            items.push(Spanned::new(term, span));
        }
    }

    /// Read the body of a list opened at `open`; returns the items and the
    /// span of the closing paren.
    fn read_nested(&mut self, open: Span) -> Result<(Vec<Spanned<Term>>, Span), Diagnostic> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(Diagnostic::error(
                "nesting depth exceeded (maximum 256 levels)".to_string(),
                open,
            ));
        }
        let items = self.read_seq(Some(open))?;
        self.depth -= 1;
        let close = self.tokens[self.pos - 1].span;
        Ok((items, close))
    }

    fn advance(&mut self) -> Spanned<Lexeme> {
        let tok = self.tokens[self.pos].clone();
        // Eof is the last token and is never consumed past.
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }
}
