use std::borrow::Cow;

use miette::SourceSpan;

use crate::error::LexError;

mod token;
pub use token::{Keyword, Literal, Symbol, Token, TokenKind};


/// Canonicalizes `\r\n` and lone `\r` to `\n`. Borrows when nothing changes.
pub fn normalize_line_endings(source: &str) -> Cow<'_, str> {
    if source.contains('\r') {
        Cow::Owned(source.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(source)
    }
}

/// Lexes the whole source, stopping at the first error.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).collect()
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_body(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit() || c == '.'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumericSuffix {
    Int,
    UInt,
    Long,
    Short,
    Float,
    Double,
    Byte,
}

impl NumericSuffix {
    fn from_char(c: char) -> Option<Self> {
        let suffix = match c {
            'i' => NumericSuffix::Int,
            'u' => NumericSuffix::UInt,
            'l' => NumericSuffix::Long,
            's' => NumericSuffix::Short,
            'f' => NumericSuffix::Float,
            'd' => NumericSuffix::Double,
            'b' => NumericSuffix::Byte,
            _ => return None,
        };
        Some(suffix)
    }

    fn is_integer(self) -> bool {
        matches!(
            self,
            NumericSuffix::Int | NumericSuffix::UInt | NumericSuffix::Long | NumericSuffix::Short
        )
    }
}

/// Where a token (or an error) starts.
#[derive(Debug, Clone, Copy)]
struct Mark {
    byte: usize,
    line: usize,
    column: usize,
}

/// Single-pass, pull-based lexer over normalized source text.
///
/// Once the iterator returns `Err`, it will only return `None`.
#[derive(Debug)]
pub struct Lexer<'de> {
    source: Cow<'de, str>,
    byte: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl<'de> Lexer<'de> {
    pub fn new(input: &'de str) -> Self {
        Self {
            source: normalize_line_endings(input),
            byte: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    fn rest(&self) -> &str {
        &self.source[self.byte..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.byte += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn mark(&self) -> Mark {
        Mark {
            byte: self.byte,
            line: self.line,
            column: self.column,
        }
    }

    fn token(&self, kind: TokenKind, start: Mark) -> Token {
        Token {
            kind,
            line: start.line,
            column: start.column,
            span: SourceSpan::from(start.byte..self.byte),
        }
    }

    fn error_at(&self, at: Mark, message: impl Into<String>) -> LexError {
        let len = self.source[at.byte..]
            .chars()
            .next()
            .map_or(0, char::len_utf8);
        LexError {
            message: message.into(),
            line: at.line,
            column: at.column,
            err_span: SourceSpan::from(at.byte..at.byte + len),
        }
    }

    fn error_here(&self, message: impl Into<String>) -> LexError {
        self.error_at(self.mark(), message)
    }

    fn lex_token(&mut self) -> Result<Option<Token>, LexError> {
        loop {
            let Some(c) = self.peek() else {
                return Ok(None);
            };
            let start = self.mark();

            let token = match c {
                ' ' | '\t' | '\n' => {
                    self.bump();
                    continue;
                }
                ':' if self.peek_second() == Some(':') => {
                    self.skip_line_comment();
                    continue;
                }
                '"' => self.lex_string(start, false)?,
                '\'' => self.lex_char(start, false)?,
                '&' => {
                    self.bump();
                    match self.peek() {
                        Some('"') => self.lex_string(start, true)?,
                        Some('\'') => self.lex_char(start, true)?,
                        _ => return Err(self.error_here("Expected raw text literal after '&'")),
                    }
                }
                c if is_identifier_start(c) => self.lex_identifier(start),
                c if c.is_ascii_digit() => self.lex_numeric(start)?,
                '-' if self.peek_second().is_some_and(|next| next.is_ascii_digit()) => {
                    self.lex_numeric(start)?
                }
                c => {
                    if let Some(symbol) = Symbol::from_char(c) {
                        self.bump();
                        self.token(TokenKind::Symbol(symbol), start)
                    } else if let Some(symbol) = self
                        .peek_second()
                        .and_then(|second| Symbol::from_pair(c, second))
                    {
                        self.bump();
                        self.bump();
                        self.token(TokenKind::Symbol(symbol), start)
                    } else {
                        return Err(self.error_here(format!("Unexpected character '{c}'")));
                    }
                }
            };

            return Ok(Some(token));
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    /// Consumes one character of a string or char literal body.
    fn literal_char(&mut self) -> Result<char, LexError> {
        match self.peek() {
            None => Err(self.error_here("Reached end of file when parsing literal")),
            Some('\n') => Err(self.error_here("Reached end of line when parsing literal")),
            Some(c) => {
                self.bump();
                Ok(c)
            }
        }
    }

    /// Called after a backslash has been consumed.
    fn escape_sequence(&mut self) -> Result<char, LexError> {
        let at = self.mark();
        let c = self.literal_char()?;
        match c {
            '\\' => Ok('\\'),
            'n' => Ok('\n'),
            't' => Ok('\t'),
            '\'' => Ok('\''),
            '"' => Ok('"'),
            other => Err(self.error_at(at, format!("Invalid escape sequence '\\{other}'"))),
        }
    }

    fn lex_string(&mut self, start: Mark, raw: bool) -> Result<Token, LexError> {
        // opening quote
        self.bump();

        let mut value = String::new();
        loop {
            match self.literal_char()? {
                '"' => break,
                '\\' if !raw => value.push(self.escape_sequence()?),
                c => value.push(c),
            }
        }

        Ok(self.token(TokenKind::Literal(Literal::String(value)), start))
    }

    fn lex_char(&mut self, start: Mark, raw: bool) -> Result<Token, LexError> {
        // opening quote
        self.bump();

        let at = self.mark();
        let value = match self.literal_char()? {
            '\'' => return Err(self.error_at(at, "Empty character literal")),
            '\\' if !raw => self.escape_sequence()?,
            c => c,
        };

        if self.peek() != Some('\'') {
            return Err(self.error_here("Expected \"'\" to close character literal"));
        }
        self.bump();

        Ok(self.token(TokenKind::Literal(Literal::Char(value)), start))
    }

    fn lex_identifier(&mut self, start: Mark) -> Token {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !is_identifier_body(c))
            .unwrap_or(rest.len());
        let word = rest[..end].to_string();

        // identifiers are ASCII, one column per byte
        self.byte += end;
        self.column += end;

        let kind = match word.as_str() {
            "true" => TokenKind::Literal(Literal::Bool(true)),
            "false" => TokenKind::Literal(Literal::Bool(false)),
            _ => match Keyword::from_word(&word) {
                Some(keyword) => TokenKind::Keyword(keyword),
                None => TokenKind::Identifier(word),
            },
        };

        self.token(kind, start)
    }

    fn lex_numeric(&mut self, start: Mark) -> Result<Token, LexError> {
        let mut literal = String::new();
        if self.peek() == Some('-') {
            literal.push('-');
            self.bump();
        }

        let negative = !literal.is_empty();
        let mut has_point = false;
        let mut suffix = None;

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                literal.push(c);
                self.bump();
                continue;
            }

            if c == '.' {
                if has_point {
                    return Err(self.error_here("Unexpected '.' in numeric literal"));
                }
                has_point = true;
                literal.push(c);
                self.bump();
                continue;
            }

            if let Some(found) = NumericSuffix::from_char(c) {
                if found == NumericSuffix::UInt && negative {
                    return Err(self.error_here("Unsigned int literal cannot be negative"));
                }
                if found == NumericSuffix::Byte && negative {
                    return Err(self.error_here("Byte literal cannot be negative"));
                }
                if found == NumericSuffix::Byte && has_point {
                    return Err(self.error_here("Byte literal cannot have decimal point"));
                }
                if found.is_integer() && has_point {
                    return Err(self.error_here("Integer literal cannot have decimal point"));
                }
                self.bump();
                suffix = Some(found);
            }

            break;
        }

        let suffix = suffix.unwrap_or(if has_point {
            NumericSuffix::Float
        } else {
            NumericSuffix::Int
        });

        let out_of_range =
            |kind: &str| format!("Numeric literal '{literal}' is out of range for {kind}");

        let parsed = match suffix {
            NumericSuffix::Int => literal.parse().map(Literal::Int).ok(),
            NumericSuffix::UInt => literal.parse().map(Literal::UInt).ok(),
            NumericSuffix::Long => literal.parse().map(Literal::Long).ok(),
            NumericSuffix::Short => literal.parse().map(Literal::Short).ok(),
            NumericSuffix::Byte => literal.parse().map(Literal::Byte).ok(),
            NumericSuffix::Float => literal
                .parse::<f32>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Literal::Float),
            NumericSuffix::Double => literal
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Literal::Double),
        };

        let Some(value) = parsed else {
            let kind = match suffix {
                NumericSuffix::Int => "int",
                NumericSuffix::UInt => "uint",
                NumericSuffix::Long => "long",
                NumericSuffix::Short => "short",
                NumericSuffix::Float => "float",
                NumericSuffix::Double => "double",
                NumericSuffix::Byte => "byte",
            };
            return Err(self.error_at(start, out_of_range(kind)));
        };

        Ok(self.token(TokenKind::Literal(value), start))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.lex_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
