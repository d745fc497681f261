use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Raised by the lexer. Fatal to the whole run.
#[derive(Diagnostic, Debug, Error, Clone, PartialEq)]
#[error("Lexer Error: {message} (line {line} column {column})")]
#[diagnostic(code(tdl::lex))]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub column: usize,

    #[label = "here"]
    pub err_span: SourceSpan,
}

/// Raised by the parser, positioned at the offending token or just past the
/// last token when the input ended early.
#[derive(Diagnostic, Debug, Error, Clone, PartialEq)]
#[error("Parser Error: {message} (line {line}, column {column})")]
#[diagnostic(code(tdl::parse))]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,

    #[label = "here"]
    pub err_span: SourceSpan,
}

/// Anything that stops a run before execution starts.
#[derive(Diagnostic, Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),
}
