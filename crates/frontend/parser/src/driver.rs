//! # Parser driver
//!
//! Recursive-descent parser over the mapped token stream. It recognises the
//! supported C99 / C++ subset and performs exactly one builder action per
//! reduction; it never builds nodes itself.
//!
//! Type names (typedefs, C++ class and enum names, template type parameters)
//! are tracked per lexical scope to tell declarations from expressions.
//!
//! A syntax error inside a statement or declaration rolls the builder back to
//! the start of that construct, skips to the next `;` or balanced `}`, and
//! emits a problem node covering the skipped tokens.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::action::BuildAstAction;
use crate::ast::{
    Ast, BinaryOp, CompositeKey, Declaration, DeclaratorKind, ElaboratedKey, NodeId, NodeKind,
    StorageClass, TypeIdOp, UnaryOp,
};
use crate::cancel::CancellationToken;
use crate::error::{InternalError, ParseError};
use crate::node_factory::NodeFactory;
use crate::options::{Language, ParserOptions};
use crate::token_map::{GrammarToken, MappedToken};

/// Why a grammar rule did not complete
#[derive(Debug, Clone, PartialEq, Eq)]
enum Failure {
    Syntax,
    Cancelled,
    Internal(InternalError),
}

impl From<InternalError> for Failure {
    fn from(error: InternalError) -> Self {
        Self::Internal(error)
    }
}

type PResult<T = ()> = Result<T, Failure>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclContext {
    File,
    Block,
    Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclaratorMode {
    Named,
    Abstract,
    /// Parameters may be named or abstract
    Either,
}

pub struct Parser<'a, F: NodeFactory> {
    tokens: &'a [MappedToken],
    pos: usize,
    action: BuildAstAction<F>,
    language: Language,
    type_scopes: Vec<FxHashSet<SmolStr>>,
    template_names: FxHashSet<SmolStr>,
    /// Names of the classes whose bodies are being parsed
    class_names: Vec<SmolStr>,
    /// Inside template arguments `>` closes the list
    no_greater: bool,
    cancel: &'a CancellationToken,
    check_interval: usize,
    next_check: usize,
}

/// Parses a mapped token stream ending in `EndOfFile` into an AST
pub fn parse_tokens<F: NodeFactory>(
    tokens: &[MappedToken],
    factory: F,
    options: &ParserOptions,
    cancel: &CancellationToken,
) -> Result<(Ast, NodeId), ParseError> {
    let mut parser = Parser::new(tokens, factory, options, cancel);
    let root = parser.translation_unit()?;
    Ok((parser.action.into_ast(), root))
}

const fn is_specifier_keyword(token: GrammarToken) -> bool {
    matches!(
        token,
        GrammarToken::Typedef
            | GrammarToken::Extern
            | GrammarToken::Static
            | GrammarToken::Auto
            | GrammarToken::Register
            | GrammarToken::Const
            | GrammarToken::Volatile
            | GrammarToken::Restrict
            | GrammarToken::Inline
            | GrammarToken::Void
            | GrammarToken::Char
            | GrammarToken::Short
            | GrammarToken::Int
            | GrammarToken::Long
            | GrammarToken::Float
            | GrammarToken::Double
            | GrammarToken::Signed
            | GrammarToken::Unsigned
            | GrammarToken::Bool
            | GrammarToken::Complex
            | GrammarToken::Imaginary
            | GrammarToken::Virtual
            | GrammarToken::Explicit
            | GrammarToken::Friend
            | GrammarToken::Mutable
    )
}

const fn is_simple_type_keyword(token: GrammarToken) -> bool {
    matches!(
        token,
        GrammarToken::Void
            | GrammarToken::Char
            | GrammarToken::Short
            | GrammarToken::Int
            | GrammarToken::Long
            | GrammarToken::Float
            | GrammarToken::Double
            | GrammarToken::Signed
            | GrammarToken::Unsigned
            | GrammarToken::Bool
            | GrammarToken::Complex
            | GrammarToken::Imaginary
    )
}

const fn is_type_specifier_start(token: GrammarToken) -> bool {
    matches!(
        token,
        GrammarToken::Struct
            | GrammarToken::Union
            | GrammarToken::Class
            | GrammarToken::Enum
            | GrammarToken::Typename
    )
}

const fn is_cv_qualifier(token: GrammarToken) -> bool {
    matches!(
        token,
        GrammarToken::Const | GrammarToken::Volatile | GrammarToken::Restrict
    )
}

const fn assignment_op(token: GrammarToken) -> Option<BinaryOp> {
    Some(match token {
        GrammarToken::Assign => BinaryOp::Assign,
        GrammarToken::StarAssign => BinaryOp::MultiplyAssign,
        GrammarToken::SlashAssign => BinaryOp::DivideAssign,
        GrammarToken::PercentAssign => BinaryOp::ModuloAssign,
        GrammarToken::PlusAssign => BinaryOp::PlusAssign,
        GrammarToken::MinusAssign => BinaryOp::MinusAssign,
        GrammarToken::LeftShiftAssign => BinaryOp::ShiftLeftAssign,
        GrammarToken::RightShiftAssign => BinaryOp::ShiftRightAssign,
        GrammarToken::AndAssign => BinaryOp::BinaryAndAssign,
        GrammarToken::CaretAssign => BinaryOp::BinaryXorAssign,
        GrammarToken::OrAssign => BinaryOp::BinaryOrAssign,
        _ => return None,
    })
}

/// Binary operator and its precedence, higher binds tighter
const fn binary_op(token: GrammarToken) -> Option<(BinaryOp, u8)> {
    Some(match token {
        GrammarToken::OrOr => (BinaryOp::LogicalOr, 1),
        GrammarToken::AndAnd => (BinaryOp::LogicalAnd, 2),
        GrammarToken::Or => (BinaryOp::BinaryOr, 3),
        GrammarToken::Caret => (BinaryOp::BinaryXor, 4),
        GrammarToken::And => (BinaryOp::BinaryAnd, 5),
        GrammarToken::EqualEqual => (BinaryOp::Equals, 6),
        GrammarToken::NotEqual => (BinaryOp::NotEquals, 6),
        GrammarToken::LessThan => (BinaryOp::LessThan, 7),
        GrammarToken::GreaterThan => (BinaryOp::GreaterThan, 7),
        GrammarToken::LessThanEqual => (BinaryOp::LessEqual, 7),
        GrammarToken::GreaterThanEqual => (BinaryOp::GreaterEqual, 7),
        GrammarToken::LeftShift => (BinaryOp::ShiftLeft, 8),
        GrammarToken::RightShift => (BinaryOp::ShiftRight, 8),
        GrammarToken::Plus => (BinaryOp::Plus, 9),
        GrammarToken::Minus => (BinaryOp::Minus, 9),
        GrammarToken::Star => (BinaryOp::Multiply, 10),
        GrammarToken::Slash => (BinaryOp::Divide, 10),
        GrammarToken::Percent => (BinaryOp::Modulo, 10),
        _ => return None,
    })
}

const fn prefix_op(token: GrammarToken) -> Option<UnaryOp> {
    Some(match token {
        GrammarToken::And => UnaryOp::Amper,
        GrammarToken::Star => UnaryOp::Star,
        GrammarToken::Plus => UnaryOp::Plus,
        GrammarToken::Minus => UnaryOp::Minus,
        GrammarToken::Tilde => UnaryOp::Tilde,
        GrammarToken::Bang => UnaryOp::Not,
        _ => return None,
    })
}

impl<'a, F: NodeFactory> Parser<'a, F> {
    pub fn new(
        tokens: &'a [MappedToken],
        factory: F,
        options: &ParserOptions,
        cancel: &'a CancellationToken,
    ) -> Self {
        let check_interval = options.cancellation_check_interval.max(1);
        Self {
            tokens,
            pos: 0,
            language: factory.language(),
            action: BuildAstAction::new(factory),
            type_scopes: vec![FxHashSet::default()],
            template_names: FxHashSet::default(),
            class_names: Vec::new(),
            no_greater: false,
            cancel,
            check_interval,
            next_check: check_interval,
        }
    }

    // Token cursor

    fn nth(&self, n: usize) -> GrammarToken {
        self.tokens
            .get(self.pos + n)
            .map_or(GrammarToken::EndOfFile, |t| t.grammar)
    }

    fn peek(&self) -> GrammarToken {
        self.nth(0)
    }

    fn nth_text(&self, n: usize) -> &'a str {
        self.tokens
            .get(self.pos + n)
            .map_or("", |t| t.token.text.as_str())
    }

    fn advance(&mut self) {
        if self.peek() != GrammarToken::EndOfFile {
            self.pos += 1;
        }
    }

    fn eat(&mut self, token: GrammarToken) -> bool {
        if self.peek() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: GrammarToken) -> PResult {
        if self.eat(token) {
            Ok(())
        } else {
            tracing::trace!(expected = ?token, found = ?self.peek(), offset = self.offset(), "syntax error");
            Err(Failure::Syntax)
        }
    }

    /// Tokens from `start` up to the cursor
    fn rule(&self, start: usize) -> &'a [MappedToken] {
        &self.tokens[start..self.pos]
    }

    /// Byte offset of the current token
    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(0, |t| t.token.span.start)
    }

    /// Byte offset just past the previous token
    fn previous_end(&self) -> usize {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.token.span.end,
            None => self.offset(),
        }
    }

    const fn is_cpp(&self) -> bool {
        matches!(self.language, Language::Cpp)
    }

    // Scopes of type names

    fn is_type_name(&self, text: &str) -> bool {
        self.type_scopes.iter().any(|scope| scope.contains(text))
    }

    fn add_type_name(&mut self, text: &str) {
        if let Some(scope) = self.type_scopes.last_mut() {
            scope.insert(text.into());
        }
    }

    fn push_type_scope(&mut self) {
        self.type_scopes.push(FxHashSet::default());
    }

    fn pop_type_scope(&mut self) {
        if self.type_scopes.len() > 1 {
            self.type_scopes.pop();
        }
    }

    fn poll_cancellation(&mut self) -> PResult {
        if self.action.reductions() >= self.next_check {
            self.next_check = self.action.reductions() + self.check_interval;
            if self.cancel.is_cancelled() {
                return Err(Failure::Cancelled);
            }
        }
        Ok(())
    }

    fn finish(result: PResult) -> Result<(), ParseError> {
        match result {
            Ok(()) | Err(Failure::Syntax) => Ok(()),
            Err(Failure::Cancelled) => Err(ParseError::Cancelled),
            Err(Failure::Internal(error)) => Err(ParseError::Internal(error)),
        }
    }

    // Translation unit and declarations

    pub fn translation_unit(&mut self) -> Result<NodeId, ParseError> {
        while self.peek() != GrammarToken::EndOfFile {
            if self.cancel.is_cancelled() {
                return Err(ParseError::Cancelled);
            }
            let result = self.external_declaration();
            Self::finish(result)?;
        }
        Ok(self.action.consume_translation_unit(self.language)?)
    }

    /// Skips to the end of the construct starting at `start`
    fn recover(&mut self, start: usize) {
        self.pos = start;
        let mut depth = 0usize;
        loop {
            match self.peek() {
                GrammarToken::EndOfFile => break,
                GrammarToken::LeftBrace => {
                    depth += 1;
                    self.advance();
                }
                GrammarToken::RightBrace => {
                    if depth == 0 {
                        if self.pos == start {
                            self.advance();
                        }
                        break;
                    }
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        self.eat(GrammarToken::SemiColon);
                        break;
                    }
                }
                GrammarToken::SemiColon if depth == 0 => {
                    self.advance();
                    break;
                }
                _ => self.advance(),
            }
        }
        tracing::debug!(
            start = self.tokens.get(start).map_or(0, |t| t.token.span.start),
            end = self.previous_end(),
            "recovered from syntax error"
        );
    }

    fn with_declaration_recovery(&mut self, parse: impl FnOnce(&mut Self) -> PResult) -> PResult {
        let checkpoint = self.action.checkpoint();
        let scopes = self.type_scopes.len();
        let classes = self.class_names.len();
        let start = self.pos;
        match parse(self) {
            Err(Failure::Syntax) => {
                self.action.rollback(checkpoint);
                self.type_scopes.truncate(scopes);
                self.class_names.truncate(classes);
                self.no_greater = false;
                self.recover(start);
                let tokens = self.rule(start);
                self.action.consume_declaration_problem(tokens);
                Ok(())
            }
            other => other,
        }
    }

    fn external_declaration(&mut self) -> PResult {
        self.poll_cancellation()?;
        if self.eat(GrammarToken::SemiColon) {
            return Ok(());
        }
        self.with_declaration_recovery(|p| p.declaration(DeclContext::File))
    }

    fn declaration(&mut self, context: DeclContext) -> PResult {
        if self.is_cpp() {
            match self.peek() {
                GrammarToken::Namespace => return self.namespace_definition(),
                GrammarToken::Using if self.nth(1) == GrammarToken::Namespace => {
                    return self.using_directive();
                }
                GrammarToken::Template => return self.template_declaration(context),
                GrammarToken::Extern if self.nth(1) == GrammarToken::StringLit => {
                    return self.linkage_specification();
                }
                _ => {}
            }
        }
        self.simple_declaration(context)
    }

    fn namespace_definition(&mut self) -> PResult {
        let start = self.pos;
        self.expect(GrammarToken::Namespace)?;
        if self.peek() == GrammarToken::Identifier {
            let name_start = self.pos;
            self.advance();
            let tokens = self.rule(name_start);
            self.action.consume_identifier_name(tokens);
        } else {
            self.action.consume_empty();
        }
        self.expect(GrammarToken::LeftBrace)?;
        self.action.open_ast_scope();
        while !matches!(
            self.peek(),
            GrammarToken::RightBrace | GrammarToken::EndOfFile
        ) {
            self.external_declaration()?;
        }
        self.expect(GrammarToken::RightBrace)?;
        let tokens = self.rule(start);
        self.action.consume_namespace_definition(tokens)?;
        Ok(())
    }

    fn using_directive(&mut self) -> PResult {
        let start = self.pos;
        self.expect(GrammarToken::Using)?;
        self.expect(GrammarToken::Namespace)?;
        self.name()?;
        self.expect(GrammarToken::SemiColon)?;
        let tokens = self.rule(start);
        self.action.consume_using_directive(tokens)?;
        Ok(())
    }

    /// `extern "C" { ... }` and `extern "C" declaration`; the linkage is not kept
    fn linkage_specification(&mut self) -> PResult {
        self.advance();
        self.advance();
        if !self.eat(GrammarToken::LeftBrace) {
            return self.declaration(DeclContext::File);
        }
        // The braces are not a construct of their own: declare into the enclosing scope
        while !matches!(
            self.peek(),
            GrammarToken::RightBrace | GrammarToken::EndOfFile
        ) {
            self.external_declaration()?;
        }
        self.expect(GrammarToken::RightBrace)
    }

    fn template_declaration(&mut self, context: DeclContext) -> PResult {
        let start = self.pos;
        self.expect(GrammarToken::Template)?;
        self.expect(GrammarToken::LessThan)?;
        self.push_type_scope();
        self.action.open_ast_scope();
        if self.peek() != GrammarToken::GreaterThan {
            loop {
                self.template_type_parameter()?;
                if !self.eat(GrammarToken::Comma) {
                    break;
                }
            }
        }
        self.expect(GrammarToken::GreaterThan)?;
        self.declaration(context)?;
        self.pop_type_scope();
        if let Some((name, declares_type)) = self.templated_name() {
            // The parameter scope is gone; a class template stays a type name
            if declares_type {
                self.add_type_name(&name);
            }
            self.template_names.insert(name);
        }
        let tokens = self.rule(start);
        self.action.consume_template_declaration(tokens)?;
        Ok(())
    }

    /// Name introduced by the declaration on top of the builder stack, and
    /// whether it names a class template
    fn templated_name(&self) -> Option<(SmolStr, bool)> {
        let ast = self.action.ast();
        let declaration = self.action.top_node()?;
        match ast.declaration(declaration)? {
            Declaration::FunctionDefinition { declarator, .. } => {
                let name = ast.last_segment(ast.declarator_name(*declarator));
                Some((ast.name_text(name).into(), false))
            }
            Declaration::Simple {
                decl_spec,
                declarators,
            } => {
                if let Some(&first) = declarators.first() {
                    let name = ast.last_segment(ast.declarator_name(first));
                    return Some((ast.name_text(name).into(), false));
                }
                let spec = ast.decl_specifier(*decl_spec)?.type_specifier?;
                let name = match ast.kind(spec) {
                    NodeKind::CompositeSpecifier(composite) => composite.name,
                    NodeKind::ElaboratedSpecifier(elaborated) => elaborated.name,
                    _ => return None,
                };
                Some((ast.name_text(ast.last_segment(name)).into(), true))
            }
            _ => None,
        }
    }

    fn template_type_parameter(&mut self) -> PResult {
        let start = self.pos;
        if !matches!(self.peek(), GrammarToken::Typename | GrammarToken::Class) {
            return Err(Failure::Syntax);
        }
        self.advance();
        if self.peek() == GrammarToken::Identifier {
            let name_start = self.pos;
            let text = self.nth_text(0);
            self.advance();
            self.add_type_name(text);
            let tokens = self.rule(name_start);
            self.action.consume_identifier_name(tokens);
        } else {
            self.action.consume_empty();
        }
        if self.eat(GrammarToken::Assign) {
            self.type_id()?;
        } else {
            self.action.consume_place_holder();
        }
        let tokens = self.rule(start);
        self.action.consume_template_type_parameter(tokens)?;
        Ok(())
    }

    /// Declaration specifiers, declarators and either `;` or a function body
    fn simple_declaration(&mut self, context: DeclContext) -> PResult {
        let start = self.pos;
        self.decl_specifiers()?;
        self.action.open_ast_scope();
        if self.eat(GrammarToken::SemiColon) {
            let tokens = self.rule(start);
            self.action.consume_declaration_simple(tokens)?;
            return Ok(());
        }
        let mut first = true;
        loop {
            self.init_declarator(context)?;
            if first
                && context != DeclContext::Block
                && self.peek() == GrammarToken::LeftBrace
                && self.top_is_function_declarator()
            {
                self.function_body()?;
                let tokens = self.rule(start);
                self.action.consume_function_definition(tokens)?;
                return Ok(());
            }
            first = false;
            if !self.eat(GrammarToken::Comma) {
                break;
            }
        }
        self.expect(GrammarToken::SemiColon)?;
        let tokens = self.rule(start);
        self.action.consume_declaration_simple(tokens)?;
        self.register_typedef_names();
        Ok(())
    }

    fn top_is_function_declarator(&self) -> bool {
        let ast = self.action.ast();
        let mut current = self.action.top_node();
        while let Some(id) = current {
            match ast.declarator(id) {
                Some(declarator) => match declarator.kind {
                    DeclaratorKind::Function { .. } => return true,
                    DeclaratorKind::Plain if declarator.nested.is_some() => {
                        current = declarator.nested;
                    }
                    _ => return false,
                },
                None => return false,
            }
        }
        false
    }

    /// Makes the declarators of a just-built `typedef` visible as type names
    fn register_typedef_names(&mut self) {
        let ast = self.action.ast();
        let Some(id) = self.action.top_node() else {
            return;
        };
        let Some(Declaration::Simple {
            decl_spec,
            declarators,
        }) = ast.declaration(id)
        else {
            return;
        };
        let is_typedef = ast
            .decl_specifier(*decl_spec)
            .is_some_and(|spec| spec.storage == StorageClass::Typedef);
        if !is_typedef {
            return;
        }
        let names: Vec<SmolStr> = declarators
            .iter()
            .map(|&d| SmolStr::from(ast.name_text(ast.declarator_name(d))))
            .collect();
        for name in names {
            self.add_type_name(&name);
        }
    }

    fn function_body(&mut self) -> PResult {
        self.push_type_scope();
        let result = self.compound_statement();
        self.pop_type_scope();
        result
    }

    // Declaration specifiers

    /// Whether an identifier at `n` starts a constructor or destructor
    /// declarator rather than naming a type
    fn is_constructor_name(&self, n: usize) -> bool {
        let text = self.nth_text(n);
        if self.nth(n + 1) == GrammarToken::LeftParen {
            return self.class_names.last().is_some_and(|class| class == text);
        }
        if self.nth(n + 1) != GrammarToken::ColonColon {
            return false;
        }
        match self.nth(n + 2) {
            GrammarToken::Tilde => true,
            GrammarToken::Identifier => {
                self.nth_text(n + 2) == text && self.nth(n + 3) == GrammarToken::LeftParen
            }
            _ => false,
        }
    }

    fn decl_specifiers(&mut self) -> PResult {
        let start = self.pos;
        let at = self.offset();
        self.action.open_ast_scope();
        let mut seen_type = false;
        loop {
            let token = self.peek();
            if is_specifier_keyword(token) {
                seen_type |= is_simple_type_keyword(token);
                let mapped = &self.tokens[self.pos];
                self.action.consume_decl_spec_token(mapped);
                self.advance();
                continue;
            }
            match token {
                GrammarToken::Struct | GrammarToken::Union | GrammarToken::Class if !seen_type => {
                    self.composite_or_elaborated()?;
                    seen_type = true;
                }
                GrammarToken::Enum if !seen_type => {
                    self.enumeration_or_elaborated()?;
                    seen_type = true;
                }
                GrammarToken::Typename if !seen_type && self.is_cpp() => {
                    self.advance();
                    self.named_type_specifier()?;
                    seen_type = true;
                }
                GrammarToken::Identifier
                    if !seen_type
                        && self.is_type_name(self.nth_text(0))
                        && !self.is_constructor_name(0) =>
                {
                    self.named_type_specifier()?;
                    seen_type = true;
                }
                GrammarToken::ColonColon if !seen_type && self.qualified_type_ahead() => {
                    self.named_type_specifier()?;
                    seen_type = true;
                }
                _ => break,
            }
        }
        let tokens = self.rule(start);
        self.action.consume_declaration_specifiers(tokens, at)?;
        Ok(())
    }

    /// `::A::B` where the last segment is a known type name
    fn qualified_type_ahead(&self) -> bool {
        let mut n = 0;
        loop {
            if self.nth(n) == GrammarToken::ColonColon {
                n += 1;
            }
            if self.nth(n) != GrammarToken::Identifier {
                return false;
            }
            if self.nth(n + 1) != GrammarToken::ColonColon {
                return self.is_type_name(self.nth_text(n));
            }
            n += 1;
        }
    }

    fn named_type_specifier(&mut self) -> PResult {
        let start = self.pos;
        self.name()?;
        let tokens = self.rule(start);
        self.action.consume_type_specifier_named(tokens)?;
        Ok(())
    }

    fn composite_or_elaborated(&mut self) -> PResult {
        let start = self.pos;
        let key = match self.peek() {
            GrammarToken::Union => CompositeKey::Union,
            GrammarToken::Class => CompositeKey::Class,
            _ => CompositeKey::Struct,
        };
        self.advance();
        let has_name = matches!(
            self.peek(),
            GrammarToken::Identifier | GrammarToken::ColonColon
        );
        let mut class_name = SmolStr::default();
        if has_name {
            let name_start = self.pos;
            self.name()?;
            let tokens = self.rule(name_start);
            class_name = tokens
                .last()
                .map(|t| t.token.text.clone())
                .unwrap_or_default();
            if self.is_cpp() {
                self.add_type_name(&class_name);
            }
        }
        if self.peek() != GrammarToken::LeftBrace {
            if !has_name {
                return Err(Failure::Syntax);
            }
            let tokens = self.rule(start);
            self.action
                .consume_type_specifier_elaborated(tokens, ElaboratedKey::Composite(key))?;
            return Ok(());
        }
        if !has_name {
            self.action.consume_empty();
        }
        self.advance();
        self.action.open_ast_scope();
        self.class_names.push(class_name);
        while !matches!(
            self.peek(),
            GrammarToken::RightBrace | GrammarToken::EndOfFile
        ) {
            self.poll_cancellation()?;
            if self.is_cpp()
                && matches!(
                    self.peek(),
                    GrammarToken::Public | GrammarToken::Private | GrammarToken::Protected
                )
                && self.nth(1) == GrammarToken::Colon
            {
                self.advance();
                self.advance();
                continue;
            }
            if self.eat(GrammarToken::SemiColon) {
                continue;
            }
            self.with_declaration_recovery(|p| p.declaration(DeclContext::Member))?;
        }
        self.class_names.pop();
        self.expect(GrammarToken::RightBrace)?;
        let tokens = self.rule(start);
        self.action.consume_type_specifier_composite(tokens, key)?;
        Ok(())
    }

    fn enumeration_or_elaborated(&mut self) -> PResult {
        let start = self.pos;
        self.expect(GrammarToken::Enum)?;
        let has_name = self.peek() == GrammarToken::Identifier;
        if has_name {
            let name_start = self.pos;
            let text = self.nth_text(0);
            self.advance();
            if self.is_cpp() {
                self.add_type_name(text);
            }
            let tokens = self.rule(name_start);
            self.action.consume_identifier_name(tokens);
        }
        if self.peek() != GrammarToken::LeftBrace {
            if !has_name {
                return Err(Failure::Syntax);
            }
            let tokens = self.rule(start);
            self.action
                .consume_type_specifier_elaborated(tokens, ElaboratedKey::Enum)?;
            return Ok(());
        }
        if !has_name {
            self.action.consume_empty();
        }
        self.advance();
        self.action.open_ast_scope();
        while self.peek() == GrammarToken::Identifier {
            let enumerator_start = self.pos;
            self.advance();
            let tokens = self.rule(enumerator_start);
            self.action.consume_identifier_name(tokens);
            if self.eat(GrammarToken::Assign) {
                self.conditional_expression()?;
            } else {
                self.action.consume_place_holder();
            }
            let tokens = self.rule(enumerator_start);
            self.action.consume_enumerator(tokens)?;
            if !self.eat(GrammarToken::Comma) {
                break;
            }
        }
        self.expect(GrammarToken::RightBrace)?;
        let tokens = self.rule(start);
        self.action.consume_type_specifier_enumeration(tokens)?;
        Ok(())
    }

    // Declarators

    fn init_declarator(&mut self, context: DeclContext) -> PResult {
        let start = self.pos;
        self.declarator(DeclaratorMode::Named)?;
        if context == DeclContext::Member && self.eat(GrammarToken::Colon) {
            self.conditional_expression()?;
            let tokens = self.rule(start);
            self.action.consume_declarator_bit_field(tokens)?;
        }
        if self.peek() == GrammarToken::Assign {
            self.advance();
            self.initializer_clause()?;
            let tokens = self.rule(start);
            self.action.consume_declarator_with_initializer(tokens)?;
        } else if self.is_cpp() && self.peek() == GrammarToken::LeftParen {
            let init_start = self.pos;
            self.advance();
            if self.peek() == GrammarToken::RightParen {
                self.action.consume_place_holder();
            } else {
                self.expression()?;
            }
            self.expect(GrammarToken::RightParen)?;
            let tokens = self.rule(init_start);
            self.action.consume_constructor_initializer(tokens)?;
            let tokens = self.rule(start);
            self.action.consume_declarator_with_initializer(tokens)?;
        }
        Ok(())
    }

    fn initializer_clause(&mut self) -> PResult {
        let start = self.pos;
        if self.eat(GrammarToken::LeftBrace) {
            self.action.open_ast_scope();
            while self.peek() != GrammarToken::RightBrace {
                self.initializer_clause()?;
                if !self.eat(GrammarToken::Comma) {
                    break;
                }
            }
            self.expect(GrammarToken::RightBrace)?;
            let tokens = self.rule(start);
            self.action.consume_initializer_list(tokens)?;
        } else {
            self.assignment_expression()?;
            let tokens = self.rule(start);
            self.action.consume_initializer(tokens)?;
        }
        Ok(())
    }

    fn is_pointer_operator(&self) -> bool {
        match self.peek() {
            GrammarToken::Star => true,
            GrammarToken::And => self.is_cpp(),
            _ => false,
        }
    }

    fn declarator(&mut self, mode: DeclaratorMode) -> PResult {
        if !self.is_pointer_operator() {
            return self.direct_declarator(mode);
        }
        let start = self.pos;
        self.action.open_ast_scope();
        while self.is_pointer_operator() {
            let pointer_start = self.pos;
            self.advance();
            while is_cv_qualifier(self.peek()) {
                self.advance();
            }
            let tokens = self.rule(pointer_start);
            self.action.consume_pointer(tokens)?;
        }
        self.direct_declarator(mode)?;
        let tokens = self.rule(start);
        self.action.consume_declarator_with_pointer(tokens)?;
        Ok(())
    }

    fn starts_declarator_name(&self) -> bool {
        match self.peek() {
            GrammarToken::Identifier => true,
            GrammarToken::ColonColon | GrammarToken::Tilde | GrammarToken::Operator => {
                self.is_cpp()
            }
            _ => false,
        }
    }

    /// `(` opening a nested declarator rather than a parameter list
    fn starts_nested_declarator(&self, mode: DeclaratorMode) -> bool {
        if self.peek() != GrammarToken::LeftParen {
            return false;
        }
        match self.nth(1) {
            GrammarToken::Star | GrammarToken::LeftParen => true,
            GrammarToken::And => self.is_cpp(),
            GrammarToken::Identifier => {
                mode != DeclaratorMode::Abstract && !self.is_type_name(self.nth_text(1))
            }
            _ => false,
        }
    }

    /// Whether the `(` at the cursor opens a parameter list; C++ constructor
    /// initializers look the same
    fn starts_parameter_list(&self) -> bool {
        match self.nth(1) {
            GrammarToken::RightParen | GrammarToken::DotDotDot => true,
            GrammarToken::Identifier => self.is_type_name(self.nth_text(1)),
            token => is_specifier_keyword(token) || is_type_specifier_start(token),
        }
    }

    fn direct_declarator(&mut self, mode: DeclaratorMode) -> PResult {
        let start = self.pos;
        if self.starts_nested_declarator(mode) {
            self.advance();
            self.declarator(mode)?;
            self.expect(GrammarToken::RightParen)?;
            let tokens = self.rule(start);
            self.action.consume_direct_declarator_bracketed(tokens)?;
        } else if mode != DeclaratorMode::Abstract && self.starts_declarator_name() {
            self.name()?;
            let tokens = self.rule(start);
            self.action.consume_direct_declarator_identifier(tokens)?;
        } else if mode == DeclaratorMode::Named {
            return Err(Failure::Syntax);
        } else {
            let at = self.previous_end();
            self.action.consume_abstract_declarator_empty(at);
        }

        loop {
            match self.peek() {
                GrammarToken::LeftBracket => {
                    let modifier_start = self.pos;
                    self.advance();
                    if self.peek() == GrammarToken::RightBracket {
                        self.action.consume_place_holder();
                    } else {
                        self.assignment_expression()?;
                    }
                    self.expect(GrammarToken::RightBracket)?;
                    let tokens = self.rule(modifier_start);
                    self.action.consume_array_modifier(tokens)?;
                    let tokens = self.rule(start);
                    self.action.consume_array_declarator(tokens)?;
                }
                GrammarToken::LeftParen => {
                    if self.is_cpp() && mode == DeclaratorMode::Named && !self.starts_parameter_list()
                    {
                        break;
                    }
                    self.advance();
                    self.action.open_ast_scope();
                    let var_args = self.parameter_list()?;
                    self.expect(GrammarToken::RightParen)?;
                    while is_cv_qualifier(self.peek()) {
                        self.advance();
                    }
                    let tokens = self.rule(start);
                    self.action.consume_function_declarator(tokens, var_args)?;
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Parameters up to (not including) `)`; returns whether `...` ended the list
    fn parameter_list(&mut self) -> PResult<bool> {
        if self.peek() == GrammarToken::RightParen {
            return Ok(false);
        }
        loop {
            if self.eat(GrammarToken::DotDotDot) {
                return Ok(true);
            }
            let start = self.pos;
            self.decl_specifiers()?;
            if self.pos == start {
                return Err(Failure::Syntax);
            }
            self.declarator(DeclaratorMode::Either)?;
            if self.is_cpp() && self.peek() == GrammarToken::Assign {
                self.advance();
                self.initializer_clause()?;
                let tokens = self.rule(start);
                self.action.consume_declarator_with_initializer(tokens)?;
            }
            let tokens = self.rule(start);
            self.action.consume_parameter_declaration(tokens)?;
            if !self.eat(GrammarToken::Comma) {
                return Ok(false);
            }
        }
    }

    fn type_id(&mut self) -> PResult {
        let start = self.pos;
        self.decl_specifiers()?;
        if self.pos == start {
            return Err(Failure::Syntax);
        }
        let has_declarator = self.is_pointer_operator()
            || matches!(
                self.peek(),
                GrammarToken::LeftParen | GrammarToken::LeftBracket
            );
        if has_declarator {
            self.declarator(DeclaratorMode::Abstract)?;
        }
        let tokens = self.rule(start);
        self.action.consume_type_id(tokens, has_declarator)?;
        Ok(())
    }

    /// Whether the token at `n` can start a type-id
    fn starts_type_id(&self, n: usize) -> bool {
        let token = self.nth(n);
        if is_specifier_keyword(token) || is_type_specifier_start(token) {
            return true;
        }
        token == GrammarToken::Identifier && self.is_type_name(self.nth_text(n))
    }

    // Names

    /// A possibly qualified name
    fn name(&mut self) -> PResult {
        let start = self.pos;
        let fully_qualified = self.is_cpp() && self.peek() == GrammarToken::ColonColon;
        let qualified = self.is_cpp()
            && (fully_qualified || self.nth(1) == GrammarToken::ColonColon);
        if !qualified {
            return self.unqualified_name();
        }
        self.action.open_ast_scope();
        if fully_qualified {
            self.advance();
        }
        loop {
            self.unqualified_name()?;
            if self.peek() == GrammarToken::ColonColon
                && matches!(
                    self.nth(1),
                    GrammarToken::Identifier | GrammarToken::Tilde | GrammarToken::Operator
                )
            {
                self.advance();
                continue;
            }
            break;
        }
        let tokens = self.rule(start);
        self.action.consume_qualified_name(tokens, fully_qualified)?;
        Ok(())
    }

    fn unqualified_name(&mut self) -> PResult {
        let start = self.pos;
        match self.peek() {
            GrammarToken::Identifier => {
                let is_template = self.is_cpp()
                    && self.nth(1) == GrammarToken::LessThan
                    && self.template_names.contains(self.nth_text(0));
                if is_template {
                    return self.template_id();
                }
                self.advance();
                let tokens = self.rule(start);
                self.action.consume_identifier_name(tokens);
                Ok(())
            }
            GrammarToken::Tilde if self.is_cpp() && self.nth(1) == GrammarToken::Identifier => {
                self.advance();
                self.advance();
                let tokens = self.rule(start);
                self.action.consume_identifier_name(tokens);
                Ok(())
            }
            GrammarToken::Operator if self.is_cpp() => self.operator_name(),
            _ => Err(Failure::Syntax),
        }
    }

    fn template_id(&mut self) -> PResult {
        let start = self.pos;
        self.action.open_ast_scope();
        self.advance();
        let tokens = self.rule(start);
        self.action.consume_identifier_name(tokens);
        self.expect(GrammarToken::LessThan)?;
        let outer = self.no_greater;
        self.no_greater = true;
        if self.peek() != GrammarToken::GreaterThan {
            loop {
                if self.starts_type_id(0) {
                    self.type_id()?;
                } else {
                    self.conditional_expression()?;
                }
                if !self.eat(GrammarToken::Comma) {
                    break;
                }
            }
        }
        self.no_greater = outer;
        self.expect(GrammarToken::GreaterThan)?;
        let tokens = self.rule(start);
        self.action.consume_template_id(tokens)?;
        Ok(())
    }

    /// `operator` followed by an operator symbol or `""_suffix`
    fn operator_name(&mut self) -> PResult {
        let start = self.pos;
        self.expect(GrammarToken::Operator)?;
        match self.peek() {
            GrammarToken::StringLit => {
                self.advance();
                self.expect(GrammarToken::Identifier)?;
            }
            GrammarToken::UserDefinedLiteral => self.advance(),
            GrammarToken::LeftParen => {
                self.advance();
                self.expect(GrammarToken::RightParen)?;
            }
            GrammarToken::LeftBracket => {
                self.advance();
                self.expect(GrammarToken::RightBracket)?;
            }
            GrammarToken::New | GrammarToken::Delete => {
                self.advance();
                if self.eat(GrammarToken::LeftBracket) {
                    self.expect(GrammarToken::RightBracket)?;
                }
            }
            token if binary_op(token).is_some()
                || assignment_op(token).is_some()
                || prefix_op(token).is_some()
                || matches!(
                    token,
                    GrammarToken::PlusPlus
                        | GrammarToken::MinusMinus
                        | GrammarToken::Arrow
                        | GrammarToken::Comma
                ) =>
            {
                self.advance();
            }
            _ => return Err(Failure::Syntax),
        }
        let tokens = self.rule(start);
        self.action.consume_operator_name(tokens);
        Ok(())
    }

    // Statements

    fn statement_with_recovery(&mut self) -> PResult {
        let checkpoint = self.action.checkpoint();
        let scopes = self.type_scopes.len();
        let classes = self.class_names.len();
        let start = self.pos;
        match self.statement() {
            Err(Failure::Syntax) => {
                self.action.rollback(checkpoint);
                self.type_scopes.truncate(scopes);
                self.class_names.truncate(classes);
                self.no_greater = false;
                self.recover(start);
                let tokens = self.rule(start);
                self.action.consume_statement_problem(tokens);
                Ok(())
            }
            other => other,
        }
    }

    /// Whether the statement at the cursor is a declaration
    fn starts_declaration(&self) -> bool {
        let token = self.peek();
        if is_specifier_keyword(token) || is_type_specifier_start(token) {
            return true;
        }
        match token {
            GrammarToken::Identifier => {
                if self.nth(1) == GrammarToken::ColonColon {
                    return self.is_cpp() && self.qualified_type_ahead();
                }
                self.is_type_name(self.nth_text(0))
                    && !matches!(
                        self.nth(1),
                        GrammarToken::LeftParen | GrammarToken::Dot | GrammarToken::Arrow
                    )
            }
            GrammarToken::ColonColon => self.is_cpp() && self.qualified_type_ahead(),
            GrammarToken::Template | GrammarToken::Using | GrammarToken::Namespace => {
                self.is_cpp()
            }
            _ => false,
        }
    }

    fn statement(&mut self) -> PResult {
        self.poll_cancellation()?;
        let start = self.pos;
        match self.peek() {
            GrammarToken::LeftBrace => {
                self.push_type_scope();
                let result = self.compound_statement();
                self.pop_type_scope();
                result
            }
            GrammarToken::SemiColon => {
                self.advance();
                let tokens = self.rule(start);
                self.action.consume_statement_null(tokens);
                Ok(())
            }
            GrammarToken::If => self.if_statement(),
            GrammarToken::While => {
                self.advance();
                self.parenthesized_expression()?;
                self.statement()?;
                let tokens = self.rule(start);
                self.action.consume_statement_while(tokens)?;
                Ok(())
            }
            GrammarToken::Do => {
                self.advance();
                self.statement()?;
                self.expect(GrammarToken::While)?;
                self.parenthesized_expression()?;
                self.expect(GrammarToken::SemiColon)?;
                let tokens = self.rule(start);
                self.action.consume_statement_do(tokens)?;
                Ok(())
            }
            GrammarToken::For => self.for_statement(),
            GrammarToken::Switch => {
                self.advance();
                self.parenthesized_expression()?;
                self.statement()?;
                let tokens = self.rule(start);
                self.action.consume_statement_switch(tokens)?;
                Ok(())
            }
            GrammarToken::Goto => {
                self.advance();
                let label_start = self.pos;
                self.expect(GrammarToken::Identifier)?;
                let tokens = self.rule(label_start);
                self.action.consume_identifier_name(tokens);
                self.expect(GrammarToken::SemiColon)?;
                let tokens = self.rule(start);
                self.action.consume_statement_goto(tokens)?;
                Ok(())
            }
            GrammarToken::Continue => {
                self.advance();
                self.expect(GrammarToken::SemiColon)?;
                let tokens = self.rule(start);
                self.action.consume_statement_continue(tokens);
                Ok(())
            }
            GrammarToken::Break => {
                self.advance();
                self.expect(GrammarToken::SemiColon)?;
                let tokens = self.rule(start);
                self.action.consume_statement_break(tokens);
                Ok(())
            }
            GrammarToken::Return => {
                self.advance();
                let has_expr = self.peek() != GrammarToken::SemiColon;
                if has_expr {
                    self.expression()?;
                }
                self.expect(GrammarToken::SemiColon)?;
                let tokens = self.rule(start);
                self.action.consume_statement_return(tokens, has_expr)?;
                Ok(())
            }
            GrammarToken::Case => {
                self.advance();
                self.conditional_expression()?;
                self.expect(GrammarToken::Colon)?;
                let tokens = self.rule(start);
                self.action.consume_statement_case(tokens)?;
                Ok(())
            }
            GrammarToken::Default => {
                self.advance();
                self.expect(GrammarToken::Colon)?;
                let tokens = self.rule(start);
                self.action.consume_statement_default(tokens);
                Ok(())
            }
            GrammarToken::Identifier if self.nth(1) == GrammarToken::Colon => {
                self.advance();
                let tokens = self.rule(start);
                self.action.consume_identifier_name(tokens);
                self.advance();
                self.statement()?;
                let tokens = self.rule(start);
                self.action.consume_statement_labeled(tokens)?;
                Ok(())
            }
            _ if self.starts_declaration() => {
                self.declaration(DeclContext::Block)?;
                let tokens = self.rule(start);
                self.action.consume_statement_declaration(tokens)?;
                Ok(())
            }
            _ => {
                self.expression()?;
                self.expect(GrammarToken::SemiColon)?;
                let tokens = self.rule(start);
                self.action.consume_statement_expression(tokens)?;
                Ok(())
            }
        }
    }

    fn compound_statement(&mut self) -> PResult {
        let start = self.pos;
        self.expect(GrammarToken::LeftBrace)?;
        self.action.open_ast_scope();
        while !matches!(
            self.peek(),
            GrammarToken::RightBrace | GrammarToken::EndOfFile
        ) {
            self.statement_with_recovery()?;
        }
        self.expect(GrammarToken::RightBrace)?;
        let tokens = self.rule(start);
        self.action.consume_statement_compound(tokens)?;
        Ok(())
    }

    fn parenthesized_expression(&mut self) -> PResult {
        self.expect(GrammarToken::LeftParen)?;
        self.expression()?;
        self.expect(GrammarToken::RightParen)
    }

    fn if_statement(&mut self) -> PResult {
        let start = self.pos;
        self.expect(GrammarToken::If)?;
        self.parenthesized_expression()?;
        self.statement()?;
        let has_else = self.eat(GrammarToken::Else);
        if has_else {
            self.statement()?;
        }
        let tokens = self.rule(start);
        self.action.consume_statement_if(tokens, has_else)?;
        Ok(())
    }

    fn for_statement(&mut self) -> PResult {
        let start = self.pos;
        self.expect(GrammarToken::For)?;
        self.expect(GrammarToken::LeftParen)?;
        self.push_type_scope();
        let result = self.for_clauses(start);
        self.pop_type_scope();
        result
    }

    fn for_clauses(&mut self, start: usize) -> PResult {
        let init_start = self.pos;
        if self.eat(GrammarToken::SemiColon) {
            let tokens = self.rule(init_start);
            self.action.consume_statement_null(tokens);
        } else if self.starts_declaration() {
            self.simple_declaration(DeclContext::Block)?;
            let tokens = self.rule(init_start);
            self.action.consume_statement_declaration(tokens)?;
        } else {
            self.expression()?;
            self.expect(GrammarToken::SemiColon)?;
            let tokens = self.rule(init_start);
            self.action.consume_statement_expression(tokens)?;
        }
        if self.peek() == GrammarToken::SemiColon {
            self.action.consume_place_holder();
        } else {
            self.expression()?;
        }
        self.expect(GrammarToken::SemiColon)?;
        if self.peek() == GrammarToken::RightParen {
            self.action.consume_place_holder();
        } else {
            self.expression()?;
        }
        self.expect(GrammarToken::RightParen)?;
        self.statement()?;
        let tokens = self.rule(start);
        self.action.consume_statement_for(tokens)?;
        Ok(())
    }

    // Expressions

    /// Comma-separated expressions; a single one is not wrapped in a list
    fn expression(&mut self) -> PResult {
        let start = self.pos;
        self.action.open_ast_scope();
        self.assignment_expression()?;
        while self.eat(GrammarToken::Comma) {
            self.assignment_expression()?;
        }
        let tokens = self.rule(start);
        self.action.consume_expression_list(tokens)?;
        Ok(())
    }

    fn assignment_expression(&mut self) -> PResult {
        let start = self.pos;
        self.conditional_expression()?;
        if let Some(op) = assignment_op(self.peek()) {
            self.advance();
            self.assignment_expression()?;
            let tokens = self.rule(start);
            self.action.consume_expression_binary(tokens, op)?;
        }
        Ok(())
    }

    fn conditional_expression(&mut self) -> PResult {
        let start = self.pos;
        self.binary_expression(1)?;
        if self.eat(GrammarToken::Question) {
            self.expression()?;
            self.expect(GrammarToken::Colon)?;
            self.assignment_expression()?;
            let tokens = self.rule(start);
            self.action.consume_expression_conditional(tokens)?;
        }
        Ok(())
    }

    fn binary_expression(&mut self, min_precedence: u8) -> PResult {
        let start = self.pos;
        self.cast_expression()?;
        while let Some((op, precedence)) = binary_op(self.peek()) {
            if precedence < min_precedence {
                break;
            }
            if self.no_greater && matches!(op, BinaryOp::GreaterThan | BinaryOp::ShiftRight) {
                break;
            }
            self.advance();
            self.binary_expression(precedence + 1)?;
            let tokens = self.rule(start);
            self.action.consume_expression_binary(tokens, op)?;
        }
        Ok(())
    }

    fn cast_expression(&mut self) -> PResult {
        if self.peek() == GrammarToken::LeftParen && self.starts_type_id(1) {
            let start = self.pos;
            self.advance();
            self.type_id()?;
            self.expect(GrammarToken::RightParen)?;
            self.cast_expression()?;
            let tokens = self.rule(start);
            self.action.consume_expression_cast(tokens)?;
            return Ok(());
        }
        self.unary_expression()
    }

    fn unary_expression(&mut self) -> PResult {
        let start = self.pos;
        let token = self.peek();
        if matches!(token, GrammarToken::PlusPlus | GrammarToken::MinusMinus) {
            self.advance();
            self.unary_expression()?;
            let op = if token == GrammarToken::PlusPlus {
                UnaryOp::PrefixIncr
            } else {
                UnaryOp::PrefixDecr
            };
            let tokens = self.rule(start);
            self.action.consume_expression_unary(tokens, op)?;
            return Ok(());
        }
        if let Some(op) = prefix_op(token) {
            self.advance();
            self.cast_expression()?;
            let tokens = self.rule(start);
            self.action.consume_expression_unary(tokens, op)?;
            return Ok(());
        }
        if token == GrammarToken::Sizeof {
            self.advance();
            if self.peek() == GrammarToken::LeftParen && self.starts_type_id(1) {
                self.advance();
                self.type_id()?;
                self.expect(GrammarToken::RightParen)?;
                let tokens = self.rule(start);
                self.action
                    .consume_expression_type_id(tokens, TypeIdOp::Sizeof)?;
            } else {
                self.unary_expression()?;
                let tokens = self.rule(start);
                self.action
                    .consume_expression_unary(tokens, UnaryOp::Sizeof)?;
            }
            return Ok(());
        }
        self.postfix_expression()
    }

    fn postfix_expression(&mut self) -> PResult {
        let start = self.pos;
        self.primary_expression()?;
        loop {
            match self.peek() {
                GrammarToken::LeftBracket => {
                    self.advance();
                    let outer = std::mem::replace(&mut self.no_greater, false);
                    self.expression()?;
                    self.no_greater = outer;
                    self.expect(GrammarToken::RightBracket)?;
                    let tokens = self.rule(start);
                    self.action.consume_expression_array_subscript(tokens)?;
                }
                GrammarToken::LeftParen => {
                    self.advance();
                    if self.peek() == GrammarToken::RightParen {
                        self.action.consume_place_holder();
                    } else {
                        let outer = std::mem::replace(&mut self.no_greater, false);
                        self.expression()?;
                        self.no_greater = outer;
                    }
                    self.expect(GrammarToken::RightParen)?;
                    let tokens = self.rule(start);
                    self.action.consume_expression_function_call(tokens)?;
                }
                GrammarToken::Dot | GrammarToken::Arrow => {
                    let is_pointer = self.peek() == GrammarToken::Arrow;
                    self.advance();
                    if self.is_cpp() {
                        self.name()?;
                    } else {
                        let name_start = self.pos;
                        self.expect(GrammarToken::Identifier)?;
                        let tokens = self.rule(name_start);
                        self.action.consume_identifier_name(tokens);
                    }
                    let tokens = self.rule(start);
                    self.action
                        .consume_expression_field_reference(tokens, is_pointer)?;
                }
                GrammarToken::PlusPlus | GrammarToken::MinusMinus => {
                    let op = if self.peek() == GrammarToken::PlusPlus {
                        UnaryOp::PostfixIncr
                    } else {
                        UnaryOp::PostfixDecr
                    };
                    self.advance();
                    let tokens = self.rule(start);
                    self.action.consume_expression_unary(tokens, op)?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn primary_expression(&mut self) -> PResult {
        let start = self.pos;
        match self.peek() {
            GrammarToken::Integer
            | GrammarToken::Floating
            | GrammarToken::CharConst
            | GrammarToken::StringLit
            | GrammarToken::UserDefinedLiteral
            | GrammarToken::True
            | GrammarToken::False
            | GrammarToken::This
            | GrammarToken::Nullptr => {
                let is_string = self.peek() == GrammarToken::StringLit;
                self.advance();
                while is_string && self.peek() == GrammarToken::StringLit {
                    self.advance();
                }
                let tokens = self.rule(start);
                self.action.consume_expression_literal(tokens)?;
                Ok(())
            }
            GrammarToken::LeftParen => {
                self.advance();
                let outer = std::mem::replace(&mut self.no_greater, false);
                self.expression()?;
                self.no_greater = outer;
                self.expect(GrammarToken::RightParen)?;
                let tokens = self.rule(start);
                self.action.consume_expression_bracketed(tokens)?;
                Ok(())
            }
            GrammarToken::Identifier => {
                let is_compound_name = self.is_cpp()
                    && (self.nth(1) == GrammarToken::ColonColon
                        || (self.nth(1) == GrammarToken::LessThan
                            && self.template_names.contains(self.nth_text(0))));
                if is_compound_name {
                    self.name()?;
                    let tokens = self.rule(start);
                    self.action.consume_expression_name(tokens)?;
                } else {
                    self.advance();
                    let tokens = self.rule(start);
                    self.action.consume_expression_id(tokens);
                }
                Ok(())
            }
            GrammarToken::ColonColon | GrammarToken::Operator | GrammarToken::Tilde
                if self.is_cpp() =>
            {
                self.name()?;
                let tokens = self.rule(start);
                self.action.consume_expression_name(tokens)?;
                Ok(())
            }
            GrammarToken::Invalid => {
                self.advance();
                let tokens = self.rule(start);
                self.action.consume_expression_problem(tokens);
                Ok(())
            }
            _ => Err(Failure::Syntax),
        }
    }
}
