use std::fmt;

use miette::SourceSpan;

use crate::runtime::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// 1-based line of the first character.
    pub line: usize,
    /// 1-based column of the first character, counted in characters.
    pub column: usize,
    /// Byte span in the normalized source.
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    Keyword(Keyword),
    Symbol(Symbol),
    Literal(Literal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Using,
    TestGroup,
    Do,
    Expect,
    Case,
    New,
    Throws,
    On,
    Namespace,
    InstanceOf,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Self> {
        let keyword = match word {
            "using" => Keyword::Using,
            "test_group" => Keyword::TestGroup,
            "do" => Keyword::Do,
            "expect" => Keyword::Expect,
            "case" => Keyword::Case,
            "new" => Keyword::New,
            "throws" => Keyword::Throws,
            "on" => Keyword::On,
            "namespace" => Keyword::Namespace,
            "instanceof" => Keyword::InstanceOf,
            _ => return None,
        };
        Some(keyword)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Using => "using",
            Keyword::TestGroup => "test_group",
            Keyword::Do => "do",
            Keyword::Expect => "expect",
            Keyword::Case => "case",
            Keyword::New => "new",
            Keyword::Throws => "throws",
            Keyword::On => "on",
            Keyword::Namespace => "namespace",
            Keyword::InstanceOf => "instanceof",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Arrow,
    SemiColon,
    LParen,
    RParen,
    Comma,
    Colon,
    QuestionMark,
    Tilde,
}

impl Symbol {
    pub fn from_char(c: char) -> Option<Self> {
        let symbol = match c {
            ';' => Symbol::SemiColon,
            '(' => Symbol::LParen,
            ')' => Symbol::RParen,
            ',' => Symbol::Comma,
            ':' => Symbol::Colon,
            '~' => Symbol::Tilde,
            _ => return None,
        };
        Some(symbol)
    }

    pub fn from_pair(first: char, second: char) -> Option<Self> {
        match (first, second) {
            ('-', '>') => Some(Symbol::Arrow),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::Arrow => "->",
            Symbol::SemiColon => ";",
            Symbol::LParen => "(",
            Symbol::RParen => ")",
            Symbol::Comma => ",",
            Symbol::Colon => ":",
            Symbol::QuestionMark => "?",
            Symbol::Tilde => "~",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Char(char),
    Bool(bool),
    Int(i32),
    UInt(u32),
    Long(i64),
    Short(i16),
    Float(f32),
    Double(f64),
    Byte(u8),
}

impl Literal {
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::String(_) => "string",
            Literal::Char(_) => "char",
            Literal::Bool(_) => "bool",
            Literal::Int(_) => "int",
            Literal::UInt(_) => "uint",
            Literal::Long(_) => "long",
            Literal::Short(_) => "short",
            Literal::Float(_) => "float",
            Literal::Double(_) => "double",
            Literal::Byte(_) => "byte",
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Literal::String(s) => Value::new_string(s),
            Literal::Char(c) => Value::new_char(*c),
            Literal::Bool(b) => Value::new_bool(*b),
            Literal::Int(n) => Value::new_int(*n),
            Literal::UInt(n) => Value::new_uint(*n),
            Literal::Long(n) => Value::new_long(*n),
            Literal::Short(n) => Value::new_short(*n),
            Literal::Float(n) => Value::new_float(*n),
            Literal::Double(n) => Value::new_double(*n),
            Literal::Byte(n) => Value::new_byte(*n),
        }
    }

    /// Canonical source text which lexes back to the same literal.
    pub fn lexeme(&self) -> String {
        match self {
            Literal::String(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('"');
                for c in s.chars() {
                    push_escaped(&mut out, c, '"');
                }
                out.push('"');
                out
            }
            Literal::Char(c) => {
                let mut out = String::from("'");
                push_escaped(&mut out, *c, '\'');
                out.push('\'');
                out
            }
            Literal::Bool(b) => b.to_string(),
            Literal::Int(n) => n.to_string(),
            Literal::UInt(n) => format!("{n}u"),
            Literal::Long(n) => format!("{n}l"),
            Literal::Short(n) => format!("{n}s"),
            Literal::Float(n) => format!("{n}f"),
            Literal::Double(n) => format!("{n}d"),
            Literal::Byte(n) => format!("{n}b"),
        }
    }
}

fn push_escaped(out: &mut String, c: char, quote: char) {
    match c {
        '\\' => out.push_str("\\\\"),
        '\n' => out.push_str("\\n"),
        '\t' => out.push_str("\\t"),
        c if c == quote => {
            out.push('\\');
            out.push(c);
        }
        c => out.push(c),
    }
}

impl Token {
    /// Canonical source text of this token.
    pub fn lexeme(&self) -> String {
        match &self.kind {
            TokenKind::Identifier(name) => name.clone(),
            TokenKind::Keyword(keyword) => keyword.as_str().to_string(),
            TokenKind::Symbol(symbol) => symbol.as_str().to_string(),
            TokenKind::Literal(literal) => literal.lexeme(),
        }
    }

    pub fn is_symbol(&self, symbol: Symbol) -> bool {
        self.kind == TokenKind::Symbol(symbol)
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Identifier(name) => write!(f, "IDENTIFIER {name}"),
            TokenKind::Keyword(keyword) => write!(f, "KEYWORD {}", keyword.as_str()),
            TokenKind::Symbol(symbol) => write!(f, "SYMBOL {}", symbol.as_str()),
            TokenKind::Literal(literal) => {
                write!(f, "LITERAL<{}> {}", literal.type_name(), literal.lexeme())
            }
        }
    }
}
