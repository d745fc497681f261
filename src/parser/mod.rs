use miette::SourceSpan;
use rustc_hash::FxHashMap as HashMap;

use crate::{
    error::ParseError,
    lexer::{Keyword, Literal, Symbol, Token, TokenKind},
    model::{ExpectedResult, Test, TestCase, TestGroup, ValueExpr},
    runtime::{LoadError, Runtime, TypeRef, Value},
};


fn error_at(token: &Token, message: impl Into<String>) -> ParseError {
    ParseError {
        message: message.into(),
        line: token.line,
        column: token.column,
        err_span: token.span,
    }
}

fn load_error_message(err: &LoadError) -> String {
    match err {
        LoadError::EmptyPath => "Empty code unit path".to_string(),
        LoadError::NotFound(_) => "Code unit does not exist".to_string(),
        LoadError::LoadFailed { reason, .. } => {
            format!("Code unit was found but could not be loaded: {reason}")
        }
        LoadError::InvalidFormat(_) => {
            "Code unit was found but is invalid in this context".to_string()
        }
        LoadError::AccessDenied(_) => "Access to the code unit was denied".to_string(),
        LoadError::PathTooLong(_) => {
            "Code unit path was longer than the system-defined maximum length".to_string()
        }
    }
}

/// Recursive descent over a lexed program. Resolves every type, method and
/// constructor against the runtime as it goes, loading code units on `using`.
#[derive(Debug)]
pub struct Parser<'t, 'rt> {
    tokens: &'t [Token],
    pointer: usize,
    runtime: &'rt mut Runtime,
    /// Search prefixes from `using namespace`, in registration order.
    namespaces: Vec<String>,
    groups: Vec<TestGroup>,
    group_index: HashMap<String, usize>,
    current_group: usize,
}

impl<'t, 'rt> Parser<'t, 'rt> {
    pub fn new(tokens: &'t [Token], runtime: &'rt mut Runtime) -> Self {
        let mut group_index = HashMap::default();
        group_index.insert(String::new(), 0);

        Self {
            tokens,
            pointer: 0,
            runtime,
            namespaces: vec![String::new()],
            groups: vec![TestGroup::new("")],
            group_index,
            current_group: 0,
        }
    }

    /// Groups in declaration order, the default group first.
    pub fn parse(mut self) -> Result<Vec<TestGroup>, ParseError> {
        while let Some(token) = self.current() {
            match &token.kind {
                TokenKind::Keyword(Keyword::Using) => {
                    self.advance();
                    self.parse_using()?;
                }
                TokenKind::Keyword(Keyword::TestGroup) => {
                    self.advance();
                    self.parse_test_group()?;
                }
                TokenKind::Keyword(Keyword::Do) => {
                    self.advance();
                    let test = self.parse_test()?;
                    self.groups[self.current_group].tests.push(test);
                }
                _ => return Err(error_at(token, "Unexpected token")),
            }
        }

        Ok(self.groups)
    }

    fn current(&self) -> Option<&'t Token> {
        self.tokens.get(self.pointer)
    }

    fn advance(&mut self) {
        self.pointer += 1;
    }

    fn check_symbol(&self, symbol: Symbol) -> bool {
        self.current().is_some_and(|token| token.is_symbol(symbol))
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current().is_some_and(|token| token.is_keyword(keyword))
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        match self.current() {
            Some(token) => error_at(token, message),
            None => self.eof_error(message),
        }
    }

    /// Positioned just past the last token.
    fn eof_error(&self, message: impl Into<String>) -> ParseError {
        let (line, column, offset) = match self.tokens.last() {
            Some(last) => (
                last.line,
                last.column + last.span.len(),
                last.span.offset() + last.span.len(),
            ),
            None => (1, 1, 0),
        };

        ParseError {
            message: message.into(),
            line,
            column,
            err_span: SourceSpan::from(offset..offset),
        }
    }

    fn consume_symbol(&mut self, symbol: Symbol, message: &str) -> Result<(), ParseError> {
        if !self.check_symbol(symbol) {
            return Err(self.error(message));
        }
        self.advance();
        Ok(())
    }

    fn consume_identifier(&mut self, message: &str) -> Result<(&'t Token, &'t str), ParseError> {
        let Some(token) = self.current() else {
            return Err(self.eof_error(message));
        };
        match &token.kind {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok((token, name.as_str()))
            }
            _ => Err(error_at(token, message)),
        }
    }

    fn parse_using(&mut self) -> Result<(), ParseError> {
        let Some(token) = self.current() else {
            return Err(self.error("Expected code unit path after using statement"));
        };

        match &token.kind {
            TokenKind::Literal(Literal::String(path)) => {
                if let Err(err) = self.runtime.load_unit(path) {
                    return Err(error_at(token, load_error_message(&err)));
                }
                self.advance();
                self.consume_symbol(
                    Symbol::SemiColon,
                    "Expected semicolon after code unit inclusion",
                )
            }
            TokenKind::Keyword(Keyword::Namespace) => {
                self.advance();
                let (_, namespace) = self.consume_identifier("Expected namespace name")?;
                self.namespaces.push(namespace.to_string());
                self.consume_symbol(
                    Symbol::SemiColon,
                    "Expected semicolon after namespace inclusion",
                )
            }
            _ => Err(error_at(token, "Expected code unit path after using statement")),
        }
    }

    fn parse_test_group(&mut self) -> Result<(), ParseError> {
        let (name_token, name) =
            self.consume_identifier("Expected test group name after test_group statement")?;
        self.consume_symbol(Symbol::SemiColon, "Expected semicolon after test group declaration")?;

        if self.group_index.contains_key(name) {
            return Err(error_at(
                name_token,
                format!("Cannot redefine already existing test group '{name}'"),
            ));
        }

        self.groups.push(TestGroup::new(name));
        self.current_group = self.groups.len() - 1;
        self.group_index.insert(name.to_string(), self.current_group);
        Ok(())
    }

    fn resolve_type(&self, token: &Token, name: &str) -> Result<TypeRef, ParseError> {
        self.runtime
            .resolve_type(&self.namespaces, name)
            .ok_or_else(|| {
                error_at(
                    token,
                    format!("Type '{name}' was not found (have you loaded the correct code unit?)"),
                )
            })
    }

    /// `do <Type> -> <Method>[(<types>)] : <entries> ;`, after `do`.
    fn parse_test(&mut self) -> Result<Test, ParseError> {
        let (type_token, type_name) = self.consume_identifier("Expected Type Name")?;
        let ty = self.resolve_type(type_token, type_name)?;

        self.consume_symbol(Symbol::Arrow, "Expected '->'")?;
        let (method_token, method_name) =
            self.consume_identifier("Expected Method Name after 'do'")?;

        let signature = if self.check_symbol(Symbol::LParen) {
            Some(self.parse_type_params()?)
        } else {
            None
        };

        self.consume_symbol(Symbol::Colon, "Expected ':'")?;

        let mut cases = vec![];
        let mut activator = None;

        loop {
            if self.check_keyword(Keyword::Case) {
                self.advance();
                let arguments = self.parse_arguments(Some(&ty))?;

                let thrown = if self.check_keyword(Keyword::Expect) {
                    false
                } else if self.check_keyword(Keyword::Throws) {
                    true
                } else {
                    return Err(self.error("Expected test result"));
                };
                self.advance();

                let expected = self.parse_expectation(thrown, &ty)?;
                cases.push(TestCase {
                    activator: activator.clone(),
                    arguments,
                    expected,
                });

                if self.check_symbol(Symbol::Comma) {
                    self.advance();
                    continue;
                }
                if self.check_symbol(Symbol::SemiColon) {
                    self.advance();
                    break;
                }
                return Err(self.error("Expected ',' or ';' after test case"));
            }

            if self.check_keyword(Keyword::On) {
                self.advance();
                activator = Some(self.parse_value_expr(Some(&ty))?);
                self.consume_symbol(Symbol::Colon, "Expected ':'")?;
                continue;
            }

            return Err(self.error("Expected test case"));
        }

        // Inferred from the first case only.
        let signature = match signature {
            Some(signature) => signature,
            None => cases
                .first()
                .map(|case| case.arguments.iter().map(Value::type_ref).collect())
                .unwrap_or_default(),
        };

        let target = self
            .runtime
            .resolve_member(&ty, method_name, &signature)
            .ok_or_else(|| {
                error_at(
                    method_token,
                    format!("Cannot find method '{method_name}' on type {ty}"),
                )
            })?;

        Ok(Test { target, cases })
    }

    /// `(<Type>, ...)`, consuming both parentheses.
    fn parse_type_params(&mut self) -> Result<Vec<TypeRef>, ParseError> {
        self.consume_symbol(Symbol::LParen, "Expected '('")?;

        let mut params = vec![];
        while !self.check_symbol(Symbol::RParen) {
            let (token, name) = self.consume_identifier("Type expected")?;
            params.push(self.resolve_type(token, name)?);
            self.list_separator()?;
        }
        self.advance();

        Ok(params)
    }

    /// `(<value>, ...)`, consuming both parentheses.
    fn parse_arguments(&mut self, inferred: Option<&TypeRef>) -> Result<Vec<Value>, ParseError> {
        self.consume_symbol(Symbol::LParen, "Expected '('")?;

        let mut values = vec![];
        while !self.check_symbol(Symbol::RParen) {
            values.push(self.parse_value(inferred)?);
            self.list_separator()?;
        }
        self.advance();

        Ok(values)
    }

    fn list_separator(&mut self) -> Result<(), ParseError> {
        if self.check_symbol(Symbol::Comma) {
            self.advance();
            Ok(())
        } else if self.check_symbol(Symbol::RParen) {
            Ok(())
        } else {
            Err(self.error("Expected ) or ,"))
        }
    }

    fn parse_expectation(
        &mut self,
        thrown: bool,
        inferred: &TypeRef,
    ) -> Result<ExpectedResult, ParseError> {
        let equivalent = self.check_symbol(Symbol::Tilde);
        if equivalent {
            self.advance();
        }

        let bare_type = !equivalent
            && self
                .current()
                .is_some_and(|token| matches!(token.kind, TokenKind::Identifier(_)));
        let value = self.parse_value(Some(inferred))?;

        if let Some(ty) = value.as_type().filter(|_| bare_type) {
            let ty = ty.clone();
            return Ok(if thrown {
                ExpectedResult::FaultTypeMatch(ty)
            } else {
                ExpectedResult::TypeMatch(ty)
            });
        }

        let expected = match (thrown, equivalent) {
            (false, false) => ExpectedResult::Equality(value),
            (false, true) => ExpectedResult::Equivalence(value),
            (true, false) => ExpectedResult::FaultEquality(value),
            (true, true) => ExpectedResult::FaultEquivalence(value),
        };

        Ok(expected)
    }

    /// A value evaluated right away. Constructor faults become parse errors.
    fn parse_value(&mut self, inferred: Option<&TypeRef>) -> Result<Value, ParseError> {
        let start = self.current();
        let expr = self.parse_value_expr(inferred)?;

        expr.evaluate().map_err(|fault| {
            let message = format!("Constructor raised {fault}");
            match start {
                Some(token) => error_at(token, message),
                None => self.eof_error(message),
            }
        })
    }

    fn parse_value_expr(&mut self, inferred: Option<&TypeRef>) -> Result<ValueExpr, ParseError> {
        let Some(token) = self.current() else {
            return Err(self.error("Argument expected"));
        };

        match &token.kind {
            TokenKind::Literal(literal) => {
                self.advance();
                Ok(ValueExpr::Literal(literal.to_value()))
            }
            TokenKind::Identifier(name) => {
                let ty = self.resolve_type(token, name)?;
                self.advance();
                Ok(ValueExpr::Literal(Value::new_type(ty)))
            }
            TokenKind::Keyword(Keyword::New) => {
                self.advance();

                let named = self.current().and_then(|name_token| match &name_token.kind {
                    TokenKind::Identifier(name) => Some((name_token, name)),
                    _ => None,
                });
                let ty = match (named, inferred) {
                    (Some((name_token, name)), _) => {
                        let ty = self.resolve_type(name_token, name)?;
                        self.advance();
                        ty
                    }
                    (None, Some(ty)) => ty.clone(),
                    (None, None) => return Err(self.error("Type name expected")),
                };

                let args = self.parse_arguments(inferred)?;
                let signature: Vec<TypeRef> = args.iter().map(Value::type_ref).collect();
                let constructor = self
                    .runtime
                    .resolve_constructor(&ty, &signature)
                    .ok_or_else(|| {
                        error_at(
                            token,
                            format!("Cannot get constructor on type {ty} with given parameters"),
                        )
                    })?;

                Ok(ValueExpr::New { constructor, args })
            }
            _ => Err(error_at(token, "Argument expected")),
        }
    }
}
