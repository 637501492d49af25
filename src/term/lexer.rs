use crate::diagnostic::Diagnostic;
use crate::span::{Span, Spanned};

use super::lexeme::Lexeme;
use super::Number;

pub struct Lexer<'src> {
    text: &'src str,
    source: &'src [u8],
    file_id: u16,
    pos: usize,
    tokens: Vec<Spanned<Lexeme>>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str, file_id: u16) -> Self {
        Self {
            text: source,
            source: source.as_bytes(),
            file_id,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    /// Split the whole input into lexemes. The first malformed token aborts.
    pub fn tokenize(mut self) -> Result<Vec<Spanned<Lexeme>>, Diagnostic> {
        loop {
            self.skip_whitespace_and_comments();

            if self.pos >= self.source.len() {
                self.push(Lexeme::Eof, self.pos, self.pos);
                return Ok(self.tokens);
            }

            self.next_token()?;
        }
    }

    fn next_token(&mut self) -> Result<(), Diagnostic> {
        let start = self.pos;
        match self.source[self.pos] {
            b'{' => self.scan_code(),
            b'\'' | b'"' => self.scan_string(),
            b'&' if self.peek() == Some(b'&') => self.scan_guard(),
            b'(' => {
                self.pos += 1;
                self.push(Lexeme::LParen, start, self.pos);
                Ok(())
            }
            b')' => {
                self.pos += 1;
                self.push(Lexeme::RParen, start, self.pos);
                Ok(())
            }
            b'[' => self.scan_field(),
            b']' | b'}' => {
                let ch = self.source[self.pos] as char;
                Err(self.error(format!("unexpected '{}'", ch), start, start + 1))
            }
            _ => {
                if self.scan_named_open() || self.scan_number()? {
                    return Ok(());
                }
                self.scan_atom();
                Ok(())
            }
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }

            if self.pos < self.source.len() && self.source[self.pos] == b'#' {
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }

            break;
        }
    }

    /// `{ ... }`, kept verbatim with balanced inner braces.
    fn scan_code(&mut self) -> Result<(), Diagnostic> {
        let start = self.pos;
        let mut depth = 0u32;
        while self.pos < self.source.len() {
            match self.source[self.pos] {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        let body = self.text[start..self.pos].to_string();
                        self.push(Lexeme::Code(body), start, self.pos);
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        Err(self
            .error("unterminated code block: missing closing '}'".to_string(), start, start + 1)
            .with_help("payload bodies look like `{ u64 value; }`".to_string()))
    }

    fn scan_string(&mut self) -> Result<(), Diagnostic> {
        let start = self.pos;
        let quote = self.source[self.pos];
        self.pos += 1;
        while self.pos < self.source.len() && self.source[self.pos] != quote {
            self.pos += 1;
        }
        if self.pos >= self.source.len() {
            return Err(self.error(
                format!("unterminated string: missing closing {}", quote as char),
                start,
                start + 1,
            ));
        }
        let body = self.text[start + 1..self.pos].to_string();
        self.pos += 1;
        self.push(Lexeme::Str(body), start, self.pos);
        Ok(())
    }

    /// `&& guard text =>` becomes three lexemes.
    fn scan_guard(&mut self) -> Result<(), Diagnostic> {
        let start = self.pos;
        let text_start = start + 2;
        let Some(rel) = self.text[text_start..].find("=>") else {
            return Err(self
                .error("guard '&&' is not followed by '=>'".to_string(), start, text_start)
                .with_help("a guarded rule looks like `lhs && condition => rhs`".to_string()));
        };
        let arrow = text_start + rel;
        self.push(Lexeme::GuardAnd, start, text_start);
        let raw = &self.text[text_start..arrow];
        let lead = raw.len() - raw.trim_start().len();
        let text = raw.trim();
        self.push(
            Lexeme::GuardText(text.to_string()),
            text_start + lead,
            text_start + lead + text.len(),
        );
        self.pos = arrow + 2;
        self.push(Lexeme::GuardArrow, arrow, self.pos);
        Ok(())
    }

    /// `[field value]`, split on the first whitespace.
    fn scan_field(&mut self) -> Result<(), Diagnostic> {
        let start = self.pos;
        let Some(rel) = self.text[start + 1..].find(']') else {
            return Err(self.error(
                "unterminated field constraint: missing closing ']'".to_string(),
                start,
                start + 1,
            ));
        };
        let end = start + 1 + rel + 1;
        let inner = self.text[start + 1..end - 1].trim();
        let split = inner
            .split_once(|c: char| c.is_ascii_whitespace())
            .map(|(field, value)| (field, value.trim()));
        match split {
            Some((field, value)) if !field.is_empty() && !value.is_empty() => {
                self.pos = end;
                self.push(
                    Lexeme::Field {
                        field: field.to_string(),
                        value: value.to_string(),
                    },
                    start,
                    end,
                );
                Ok(())
            }
            _ => Err(self
                .error(format!("field constraint `[{}]` needs a value", inner), start, end)
                .with_help("constraints look like `[field value]`".to_string())),
        }
    }

    /// `name:(`. Returns false without consuming if the input is not one.
    fn scan_named_open(&mut self) -> bool {
        let start = self.pos;
        if !is_ident_start(self.source[start]) {
            return false;
        }
        let mut end = start;
        while end < self.source.len() && is_ident_continue(self.source[end]) {
            end += 1;
        }
        if self.source[end..].starts_with(b":(") {
            self.pos = end + 2;
            let name = self.text[start..end].to_string();
            self.push(Lexeme::NamedOpen(name), start, self.pos);
            true
        } else {
            false
        }
    }

    /// Signed integer or decimal ending at a delimiter. Returns false without
    /// consuming when the text is not a number (e.g. `-x`, `2nd`).
    fn scan_number(&mut self) -> Result<bool, Diagnostic> {
        let start = self.pos;
        let mut end = start;
        if matches!(self.source[end], b'+' | b'-') {
            end += 1;
        }
        let int_start = end;
        while end < self.source.len() && self.source[end].is_ascii_digit() {
            end += 1;
        }
        if end == int_start {
            return Ok(false);
        }
        let mut is_decimal = false;
        if end + 1 < self.source.len()
            && self.source[end] == b'.'
            && self.source[end + 1].is_ascii_digit()
        {
            is_decimal = true;
            end += 1;
            while end < self.source.len() && self.source[end].is_ascii_digit() {
                end += 1;
            }
        }
        if end < self.source.len() && is_atom_char(self.source[end]) {
            return Ok(false);
        }

        let text = &self.text[start..end];
        let number = if is_decimal {
            match text.parse::<f64>() {
                Ok(value) => Number::from_float(value),
                Err(_) => return Ok(false),
            }
        } else {
            match text.parse::<i64>() {
                Ok(value) => Number::Int(value),
                Err(_) => {
                    return Err(self
                        .error(format!("integer literal '{}' is too large", text), start, end)
                        .with_help(format!("maximum integer value is {}", i64::MAX)))
                }
            }
        };
        self.pos = end;
        self.push(Lexeme::Number(number), start, end);
        Ok(true)
    }

    fn scan_atom(&mut self) {
        let start = self.pos;
        while self.pos < self.source.len() && is_atom_char(self.source[self.pos]) {
            self.pos += 1;
        }
        let text = self.text[start..self.pos].to_string();
        self.push(Lexeme::Atom(text), start, self.pos);
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos + 1).copied()
    }

    fn push(&mut self, token: Lexeme, start: usize, end: usize) {
        self.tokens
            .push(Spanned::new(token, Span::at(self.file_id, start, end)));
    }

    fn error(&self, message: String, start: usize, end: usize) -> Diagnostic {
        Diagnostic::error(message, Span::at(self.file_id, start, end))
    }
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_ident_continue(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}

fn is_atom_char(ch: u8) -> bool {
    !ch.is_ascii_whitespace() && !matches!(ch, b'(' | b')' | b'[' | b']')
}
