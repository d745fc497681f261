use chrono::Utc;

use crate::{
    error::RunError,
    lexer::lex,
    log_stdout,
    model::GroupResult,
    parser::Parser,
    runtime::Runtime,
};

mod report;
pub use report::{report, RunSummary};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Dump the token stream before parsing.
    pub print_tokens: bool,
}

/// Drives one source file through lexing, parsing, execution and reporting.
#[derive(Debug)]
pub struct Runner<'src> {
    source: &'src str,
    runtime: Runtime,
    options: RunOptions,
}

impl<'src> Runner<'src> {
    pub fn new(source: &'src str, runtime: Runtime, options: RunOptions) -> Self {
        Self {
            source,
            runtime,
            options,
        }
    }

    pub fn run(mut self) -> Result<RunSummary, RunError> {
        let tokens = lex(self.source)?;

        if self.options.print_tokens {
            for token in &tokens {
                log_stdout!("{token}");
            }
        }

        let groups = Parser::new(&tokens, &mut self.runtime).parse()?;
        let results: Vec<GroupResult> = groups.iter().map(|group| group.run()).collect();

        Ok(report(&results, Utc::now()))
    }
}
