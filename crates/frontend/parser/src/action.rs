//! # AST builder actions
//!
//! [`BuildAstAction`] is driven by the parser: every grammar reduction calls
//! exactly one `consume_*` method with the tokens the rule matched. Actions
//! pop the fragments their rule's children pushed, build a node through the
//! dialect's [`NodeFactory`] and push the result.
//!
//! Variable-length constructs (statement lists, parameter lists, pointer
//! operators, declarator lists) are collected by opening a scope on the stack
//! before the first element; the consuming action closes it.
//!
//! Node spans are the smallest range covering every token of the rule. A
//! fragment of the wrong shape on the stack means the driver and the actions
//! disagree, and is reported as an [`InternalError`].

use chumsky::span::SimpleSpan;
use smol_str::SmolStr;

use crate::ast::{
    ArrayModifier, Ast, BinaryOp, CompositeKey, CompositeSpecifier, DeclSpecifier, Declaration,
    Declarator, DeclaratorKind, ElaboratedKey, ElaboratedSpecifier, Enumerator,
    EnumerationSpecifier, Expression, Initializer, Name, NameKind, NamedTypeSpecifier, NodeId,
    NodeKind, ParameterDeclaration, PointerKind, PointerOperator, Qualifiers, Statement,
    TemplateParameter, TranslationUnit, TypeId, TypeIdOp, UnaryOp,
};
use crate::error::InternalError;
use crate::node_factory::NodeFactory;
use crate::options::Language;
use crate::scoped_stack::{Checkpoint, Fragment, ScopedStack};
use crate::token::TokenOrigin;
use crate::token_map::{GrammarToken, MappedToken};

/// Tokens matched by one grammar rule, in source order
pub type RuleTokens<'a> = &'a [MappedToken];

type ActionResult = Result<(), InternalError>;

/// Saved builder state for backtracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionCheckpoint {
    stack: Checkpoint,
    nodes: usize,
    reductions: usize,
}

/// Shape of a declarator about to receive an array or function suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Promotion {
    /// A name with nothing applied yet; promoted in place
    Plain,
    /// `( declarator )`
    Nested(NodeId),
    Array,
    Function,
}

impl Promotion {
    fn of(declarator: &Declarator) -> Self {
        match (&declarator.kind, declarator.nested) {
            (DeclaratorKind::Plain, Some(nested)) => Self::Nested(nested),
            (DeclaratorKind::Plain, None) => Self::Plain,
            (DeclaratorKind::Array { .. }, _) => Self::Array,
            (DeclaratorKind::Function { .. }, _) => Self::Function,
        }
    }
}

pub struct BuildAstAction<F: NodeFactory> {
    factory: F,
    ast: Ast,
    stack: ScopedStack<Fragment>,
    reductions: usize,
}

/// Smallest span covering every token of a rule
pub fn rule_span(tokens: RuleTokens<'_>) -> SimpleSpan<usize> {
    let start = tokens.iter().map(|t| t.token.span.start).min();
    let end = tokens.iter().map(|t| t.token.span.end).max();
    match (start, end) {
        (Some(start), Some(end)) => SimpleSpan::from(start..end),
        _ => SimpleSpan::from(0..0),
    }
}

fn rule_origin(tokens: RuleTokens<'_>) -> TokenOrigin {
    tokens.first().map_or(TokenOrigin::Source, |t| t.token.origin)
}

fn rule_text(tokens: RuleTokens<'_>) -> SmolStr {
    let mut text = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 && token.token.span.start > tokens[i - 1].token.span.end {
            text.push(' ');
        }
        text.push_str(&token.token.text);
    }
    text.into()
}

impl<F: NodeFactory> BuildAstAction<F> {
    pub fn new(factory: F) -> Self {
        let mut stack = ScopedStack::new();
        // Implicit translation unit scope
        stack.open_scope();
        Self {
            factory,
            ast: Ast::new(),
            stack,
            reductions: 0,
        }
    }

    pub const fn factory(&self) -> &F {
        &self.factory
    }

    pub const fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn into_ast(self) -> Ast {
        self.ast
    }

    /// Number of reductions performed so far
    pub const fn reductions(&self) -> usize {
        self.reductions
    }

    /// The node on top of the builder stack, if any
    pub fn top_node(&self) -> Option<NodeId> {
        self.stack.peek().and_then(Fragment::node)
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn checkpoint(&self) -> ActionCheckpoint {
        ActionCheckpoint {
            stack: self.stack.checkpoint(),
            nodes: self.ast.len(),
            reductions: self.reductions,
        }
    }

    pub fn rollback(&mut self, checkpoint: ActionCheckpoint) {
        self.stack.rollback(checkpoint.stack);
        self.ast.truncate(checkpoint.nodes);
        self.reductions = checkpoint.reductions;
    }

    // Stack plumbing

    fn reduce(&mut self, action: &'static str, span: SimpleSpan<usize>) {
        self.reductions += 1;
        tracing::trace!(action, start = span.start, end = span.end, "reduce");
    }

    fn alloc(&mut self, kind: NodeKind, span: SimpleSpan<usize>, origin: TokenOrigin) -> NodeId {
        self.ast.alloc(kind, span, origin)
    }

    fn push_node(&mut self, id: NodeId) {
        self.stack.push(Fragment::Node(id));
    }

    fn alloc_rule(&mut self, action: &'static str, kind: NodeKind, tokens: RuleTokens<'_>) {
        let span = rule_span(tokens);
        self.reduce(action, span);
        let id = self.alloc(kind, span, rule_origin(tokens));
        self.push_node(id);
    }

    fn pop_node(&mut self, action: &'static str) -> Result<NodeId, InternalError> {
        match self.stack.pop() {
            Some(Fragment::Node(id)) => Ok(id),
            Some(_) => Err(InternalError::StackDesync {
                action,
                expected: "node",
            }),
            None => Err(InternalError::MissingFragment { action }),
        }
    }

    /// Pops a node that the driver may have replaced by a placeholder
    fn pop_optional(&mut self, action: &'static str) -> Result<Option<NodeId>, InternalError> {
        match self.stack.pop() {
            Some(Fragment::Node(id)) => Ok(Some(id)),
            Some(Fragment::PlaceHolder) => Ok(None),
            Some(_) => Err(InternalError::StackDesync {
                action,
                expected: "node or placeholder",
            }),
            None => Err(InternalError::MissingFragment { action }),
        }
    }

    /// Pops a name, materialising an `Empty` fragment as an empty name at `at`
    fn pop_name(&mut self, action: &'static str, at: usize) -> Result<NodeId, InternalError> {
        match self.stack.pop() {
            Some(Fragment::Node(id)) if self.ast.name(id).is_some() => Ok(id),
            Some(Fragment::Empty) => Ok(self.empty_name(at)),
            Some(_) => Err(InternalError::StackDesync {
                action,
                expected: "name",
            }),
            None => Err(InternalError::MissingFragment { action }),
        }
    }

    fn pop_declarator(&mut self, action: &'static str) -> Result<NodeId, InternalError> {
        let id = self.pop_node(action)?;
        if self.ast.declarator(id).is_none() {
            return Err(InternalError::StackDesync {
                action,
                expected: "declarator",
            });
        }
        Ok(id)
    }

    fn close_nodes(&mut self, action: &'static str) -> Result<Vec<NodeId>, InternalError> {
        let fragments = self
            .stack
            .close_scope()
            .ok_or(InternalError::MissingFragment { action })?;
        fragments
            .into_iter()
            .map(|fragment| {
                fragment.node().ok_or(InternalError::StackDesync {
                    action,
                    expected: "node in scope",
                })
            })
            .collect()
    }

    fn empty_name(&mut self, at: usize) -> NodeId {
        let name = self.factory.new_empty_name();
        self.alloc(
            NodeKind::Name(name),
            SimpleSpan::from(at..at),
            TokenOrigin::Source,
        )
    }

    fn declarator_copy(&self, id: NodeId) -> Declarator {
        self.ast
            .declarator(id)
            .cloned()
            .unwrap_or_else(|| Declarator {
                kind: DeclaratorKind::Plain,
                name: id,
                pointer_ops: Vec::new(),
                nested: None,
                initializer: None,
                bit_width: None,
            })
    }

    // Pushes

    pub fn open_ast_scope(&mut self) {
        self.stack.open_scope();
    }

    /// An absent optional construct
    pub fn consume_place_holder(&mut self) {
        self.stack.push(Fragment::PlaceHolder);
    }

    /// A required construct with no tokens, such as an anonymous tag name
    pub fn consume_empty(&mut self) {
        self.stack.push(Fragment::Empty);
    }

    pub fn consume_decl_spec_token(&mut self, token: &MappedToken) {
        self.stack.push(Fragment::Token(token.clone()));
    }

    pub fn consume_translation_unit(&mut self, language: Language) -> Result<NodeId, InternalError> {
        const ACTION: &str = "consume_translation_unit";
        let declarations = self.close_nodes(ACTION)?;
        let end = declarations
            .last()
            .map_or(0, |&last| self.ast.span(last).end);
        let span = SimpleSpan::from(0..end);
        self.reduce(ACTION, span);
        let root = self.alloc(
            NodeKind::TranslationUnit(TranslationUnit {
                language,
                declarations,
            }),
            span,
            TokenOrigin::Source,
        );
        if !self.stack.is_empty() {
            return Err(InternalError::StackDesync {
                action: ACTION,
                expected: "empty stack",
            });
        }
        Ok(root)
    }

    // Names

    /// An identifier, or `~` followed by one
    pub fn consume_identifier_name(&mut self, tokens: RuleTokens<'_>) {
        let text: String = tokens.iter().map(|t| t.token.text.as_str()).collect();
        let name = self.factory.new_identifier(&text);
        self.alloc_rule("consume_identifier_name", NodeKind::Name(name), tokens);
    }

    /// Closes the scope holding the segments of `A::B::c`
    pub fn consume_qualified_name(
        &mut self,
        tokens: RuleTokens<'_>,
        fully_qualified: bool,
    ) -> ActionResult {
        const ACTION: &str = "consume_qualified_name";
        let segments = self.close_nodes(ACTION)?;
        let mut text = String::new();
        if fully_qualified {
            text.push_str("::");
        }
        for (i, &segment) in segments.iter().enumerate() {
            if i > 0 {
                text.push_str("::");
            }
            text.push_str(self.ast.name_text(segment));
        }
        let name = Name {
            text: text.into(),
            kind: NameKind::Qualified {
                segments,
                fully_qualified,
            },
        };
        self.alloc_rule(ACTION, NodeKind::Name(name), tokens);
        Ok(())
    }

    /// `operator+`, `operator()`, `operator""_suffix`
    pub fn consume_operator_name(&mut self, tokens: RuleTokens<'_>) {
        let text: String = tokens.iter().map(|t| t.token.text.as_str()).collect();
        let name = Name {
            text: text.into(),
            kind: NameKind::Operator,
        };
        self.alloc_rule("consume_operator_name", NodeKind::Name(name), tokens);
    }

    /// Closes the scope holding the template name followed by its arguments
    pub fn consume_template_id(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_template_id";
        let mut items = self.close_nodes(ACTION)?;
        if items.is_empty() {
            return Err(InternalError::MissingFragment { action: ACTION });
        }
        let template = items.remove(0);
        let name = Name {
            text: self.ast.name_text(template).into(),
            kind: NameKind::TemplateId {
                template,
                arguments: items,
            },
        };
        self.alloc_rule(ACTION, NodeKind::Name(name), tokens);
        Ok(())
    }

    // Expressions

    pub fn consume_expression_literal(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_expression_literal";
        let token = tokens
            .first()
            .ok_or(InternalError::MissingFragment { action: ACTION })?;
        let mut literal = self.factory.new_literal(token);
        if tokens.len() > 1 {
            // Adjacent string literals form one literal
            literal.value = tokens
                .iter()
                .map(|t| t.token.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
                .into();
        }
        self.alloc_rule(
            ACTION,
            NodeKind::Expression(Expression::Literal(literal)),
            tokens,
        );
        Ok(())
    }

    /// An identifier used as an expression
    pub fn consume_expression_id(&mut self, tokens: RuleTokens<'_>) {
        let text = tokens.first().map_or("", |t| t.token.text.as_str());
        let name = self.factory.new_identifier(text);
        let span = rule_span(tokens);
        let name = self.alloc(NodeKind::Name(name), span, rule_origin(tokens));
        self.alloc_rule(
            "consume_expression_id",
            NodeKind::Expression(Expression::Id { name }),
            tokens,
        );
    }

    /// A qualified, operator or template name used as an expression
    pub fn consume_expression_name(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_expression_name";
        let name = self.pop_node(ACTION)?;
        self.alloc_rule(ACTION, NodeKind::Expression(Expression::Id { name }), tokens);
        Ok(())
    }

    pub fn consume_expression_bracketed(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        self.consume_expression_unary(tokens, UnaryOp::Bracketed)
    }

    /// Closes a scope of comma-separated expressions; one expression is kept as is
    pub fn consume_expression_list(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_expression_list";
        let mut expressions = self.close_nodes(ACTION)?;
        if expressions.len() == 1 {
            let single = expressions.remove(0);
            self.push_node(single);
            return Ok(());
        }
        self.alloc_rule(
            ACTION,
            NodeKind::Expression(Expression::List { expressions }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_expression_array_subscript(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_expression_array_subscript";
        let subscript = self.pop_node(ACTION)?;
        let array = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Expression(Expression::ArraySubscript { array, subscript }),
            tokens,
        );
        Ok(())
    }

    /// Pops the argument (or placeholder) and the callee
    pub fn consume_expression_function_call(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_expression_function_call";
        let argument = self.pop_optional(ACTION)?;
        let callee = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Expression(Expression::FunctionCall { callee, argument }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_expression_field_reference(
        &mut self,
        tokens: RuleTokens<'_>,
        is_pointer: bool,
    ) -> ActionResult {
        const ACTION: &str = "consume_expression_field_reference";
        let field = self.pop_node(ACTION)?;
        let owner = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Expression(Expression::FieldReference {
                owner,
                field,
                is_pointer,
            }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_expression_cast(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_expression_cast";
        let operand = self.pop_node(ACTION)?;
        let type_id = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Expression(Expression::Cast { type_id, operand }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_expression_unary(&mut self, tokens: RuleTokens<'_>, op: UnaryOp) -> ActionResult {
        const ACTION: &str = "consume_expression_unary";
        let operand = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Expression(Expression::Unary { op, operand }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_expression_type_id(&mut self, tokens: RuleTokens<'_>, op: TypeIdOp) -> ActionResult {
        const ACTION: &str = "consume_expression_type_id";
        let type_id = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Expression(Expression::TypeIdOperation { op, type_id }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_expression_binary(&mut self, tokens: RuleTokens<'_>, op: BinaryOp) -> ActionResult {
        const ACTION: &str = "consume_expression_binary";
        let rhs = self.pop_node(ACTION)?;
        let lhs = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Expression(Expression::Binary { op, lhs, rhs }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_expression_conditional(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_expression_conditional";
        let negative = self.pop_node(ACTION)?;
        let positive = self.pop_node(ACTION)?;
        let condition = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Expression(Expression::Conditional {
                condition,
                positive,
                negative,
            }),
            tokens,
        );
        Ok(())
    }

    fn alloc_problem(&mut self, tokens: RuleTokens<'_>) -> NodeId {
        let problem = self.factory.new_syntax_problem(&rule_text(tokens));
        self.alloc(
            NodeKind::Problem(problem),
            rule_span(tokens),
            rule_origin(tokens),
        )
    }

    pub fn consume_expression_problem(&mut self, tokens: RuleTokens<'_>) {
        let problem = self.alloc_problem(tokens);
        self.alloc_rule(
            "consume_expression_problem",
            NodeKind::Expression(Expression::Problem { problem }),
            tokens,
        );
    }

    // Statements

    pub fn consume_statement_labeled(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_statement_labeled";
        let body = self.pop_node(ACTION)?;
        let label = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Statement(Statement::Labeled { label, body }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_statement_case(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_statement_case";
        let expression = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Statement(Statement::Case { expression }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_statement_default(&mut self, tokens: RuleTokens<'_>) {
        self.alloc_rule(
            "consume_statement_default",
            NodeKind::Statement(Statement::Default),
            tokens,
        );
    }

    pub fn consume_statement_null(&mut self, tokens: RuleTokens<'_>) {
        self.alloc_rule(
            "consume_statement_null",
            NodeKind::Statement(Statement::Null),
            tokens,
        );
    }

    pub fn consume_statement_expression(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_statement_expression";
        let expression = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Statement(Statement::Expression { expression }),
            tokens,
        );
        Ok(())
    }

    /// Closes the scope opened after `{`
    pub fn consume_statement_compound(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_statement_compound";
        let statements = self.close_nodes(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Statement(Statement::Compound { statements }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_statement_if(&mut self, tokens: RuleTokens<'_>, has_else: bool) -> ActionResult {
        const ACTION: &str = "consume_statement_if";
        let else_clause = if has_else {
            Some(self.pop_node(ACTION)?)
        } else {
            None
        };
        let then_clause = self.pop_node(ACTION)?;
        let condition = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Statement(Statement::If {
                condition,
                then_clause,
                else_clause,
            }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_statement_while(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_statement_while";
        let body = self.pop_node(ACTION)?;
        let condition = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Statement(Statement::While { condition, body }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_statement_do(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_statement_do";
        let condition = self.pop_node(ACTION)?;
        let body = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Statement(Statement::Do { body, condition }),
            tokens,
        );
        Ok(())
    }

    /// Pops body, iteration, condition (both optional) and the initializer statement
    pub fn consume_statement_for(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_statement_for";
        let body = self.pop_node(ACTION)?;
        let iteration = self.pop_optional(ACTION)?;
        let condition = self.pop_optional(ACTION)?;
        let initializer = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Statement(Statement::For {
                initializer,
                condition,
                iteration,
                body,
            }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_statement_switch(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_statement_switch";
        let body = self.pop_node(ACTION)?;
        let controller = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Statement(Statement::Switch { controller, body }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_statement_goto(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_statement_goto";
        let label = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Statement(Statement::Goto { label }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_statement_continue(&mut self, tokens: RuleTokens<'_>) {
        self.alloc_rule(
            "consume_statement_continue",
            NodeKind::Statement(Statement::Continue),
            tokens,
        );
    }

    pub fn consume_statement_break(&mut self, tokens: RuleTokens<'_>) {
        self.alloc_rule(
            "consume_statement_break",
            NodeKind::Statement(Statement::Break),
            tokens,
        );
    }

    pub fn consume_statement_return(&mut self, tokens: RuleTokens<'_>, has_expr: bool) -> ActionResult {
        const ACTION: &str = "consume_statement_return";
        let value = if has_expr {
            Some(self.pop_node(ACTION)?)
        } else {
            None
        };
        self.alloc_rule(
            ACTION,
            NodeKind::Statement(Statement::Return { value }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_statement_declaration(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_statement_declaration";
        let declaration = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Statement(Statement::Declaration { declaration }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_statement_problem(&mut self, tokens: RuleTokens<'_>) {
        let problem = self.alloc_problem(tokens);
        self.alloc_rule(
            "consume_statement_problem",
            NodeKind::Statement(Statement::Problem { problem }),
            tokens,
        );
    }

    // Declaration specifiers

    /// Closes the scope of specifier tokens and at most one type specifier node.
    ///
    /// With no tokens (implicit `int`) the specifier is empty and sits at `at`.
    pub fn consume_declaration_specifiers(
        &mut self,
        tokens: RuleTokens<'_>,
        at: usize,
    ) -> ActionResult {
        const ACTION: &str = "consume_declaration_specifiers";
        let fragments = self
            .stack
            .close_scope()
            .ok_or(InternalError::MissingFragment { action: ACTION })?;
        let mut spec = DeclSpecifier::default();
        for fragment in fragments {
            match fragment {
                Fragment::Token(token) => {
                    if !self.factory.apply_specifier(&mut spec, token.grammar) {
                        return Err(InternalError::StackDesync {
                            action: ACTION,
                            expected: "declaration specifier token",
                        });
                    }
                }
                Fragment::Node(id) => spec.type_specifier = Some(id),
                Fragment::PlaceHolder | Fragment::Empty => {
                    return Err(InternalError::StackDesync {
                        action: ACTION,
                        expected: "specifier",
                    })
                }
            }
        }
        if tokens.is_empty() {
            let span = SimpleSpan::from(at..at);
            self.reduce(ACTION, span);
            let id = self.alloc(NodeKind::DeclSpecifier(spec), span, TokenOrigin::Source);
            self.push_node(id);
        } else {
            self.alloc_rule(ACTION, NodeKind::DeclSpecifier(spec), tokens);
        }
        Ok(())
    }

    /// Closes the member scope and pops the tag name (or empty)
    pub fn consume_type_specifier_composite(
        &mut self,
        tokens: RuleTokens<'_>,
        key: CompositeKey,
    ) -> ActionResult {
        const ACTION: &str = "consume_type_specifier_composite";
        let members = self.close_nodes(ACTION)?;
        let at = tokens.first().map_or(0, |t| t.token.span.end);
        let name = self.pop_name(ACTION, at)?;
        self.alloc_rule(
            ACTION,
            NodeKind::CompositeSpecifier(CompositeSpecifier { key, name, members }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_type_specifier_elaborated(
        &mut self,
        tokens: RuleTokens<'_>,
        key: ElaboratedKey,
    ) -> ActionResult {
        const ACTION: &str = "consume_type_specifier_elaborated";
        let name = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::ElaboratedSpecifier(ElaboratedSpecifier { key, name }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_type_specifier_enumeration(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_type_specifier_enumeration";
        let enumerators = self.close_nodes(ACTION)?;
        let at = tokens.first().map_or(0, |t| t.token.span.end);
        let name = self.pop_name(ACTION, at)?;
        self.alloc_rule(
            ACTION,
            NodeKind::EnumerationSpecifier(EnumerationSpecifier { name, enumerators }),
            tokens,
        );
        Ok(())
    }

    /// A typedef, class or qualified name used as a type
    pub fn consume_type_specifier_named(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_type_specifier_named";
        let name = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::NamedTypeSpecifier(NamedTypeSpecifier { name }),
            tokens,
        );
        Ok(())
    }

    /// Pops the value (or placeholder) and the enumerator name
    pub fn consume_enumerator(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_enumerator";
        let value = self.pop_optional(ACTION)?;
        let name = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Enumerator(Enumerator { name, value }),
            tokens,
        );
        Ok(())
    }

    // Declarators

    pub fn consume_direct_declarator_identifier(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_direct_declarator_identifier";
        let name = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Declarator(Declarator {
                kind: DeclaratorKind::Plain,
                name,
                pointer_ops: Vec::new(),
                nested: None,
                initializer: None,
                bit_width: None,
            }),
            tokens,
        );
        Ok(())
    }

    /// `( declarator )`
    pub fn consume_direct_declarator_bracketed(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_direct_declarator_bracketed";
        let nested = self.pop_declarator(ACTION)?;
        let at = self.ast.span(nested).start;
        let name = self.empty_name(at);
        self.alloc_rule(
            ACTION,
            NodeKind::Declarator(Declarator {
                kind: DeclaratorKind::Plain,
                name,
                pointer_ops: Vec::new(),
                nested: Some(nested),
                initializer: None,
                bit_width: None,
            }),
            tokens,
        );
        Ok(())
    }

    /// A declarator with no tokens, positioned at byte `at`
    pub fn consume_abstract_declarator_empty(&mut self, at: usize) {
        let name = self.empty_name(at);
        let span = SimpleSpan::from(at..at);
        self.reduce("consume_abstract_declarator_empty", span);
        let id = self.alloc(
            NodeKind::Declarator(Declarator {
                kind: DeclaratorKind::Plain,
                name,
                pointer_ops: Vec::new(),
                nested: None,
                initializer: None,
                bit_width: None,
            }),
            span,
            TokenOrigin::Source,
        );
        self.push_node(id);
    }

    /// `[ size? ]`; pops the size or a placeholder
    pub fn consume_array_modifier(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_array_modifier";
        let size = self.pop_optional(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::ArrayModifier(ArrayModifier { size }),
            tokens,
        );
        Ok(())
    }

    /// Applies an array modifier to the declarator beneath it
    pub fn consume_array_declarator(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_array_declarator";
        let modifier = self.pop_node(ACTION)?;
        let target = self.pop_declarator(ACTION)?;
        let end = rule_span(tokens).end;
        let mut declarator = self.declarator_copy(target);
        let span = self.ast.span(target);

        let promoted = match Promotion::of(&declarator) {
            Promotion::Array => {
                self.reduce(ACTION, SimpleSpan::from(span.start..end));
                if let DeclaratorKind::Array { modifiers } = &mut declarator.kind {
                    modifiers.push(modifier);
                }
                self.replace_declarator(target, declarator, span.start..end)
            }
            Promotion::Plain => {
                let start = self.ast.span(declarator.name).start;
                self.reduce(ACTION, SimpleSpan::from(start..end));
                declarator.kind = DeclaratorKind::Array {
                    modifiers: vec![modifier],
                };
                self.replace_declarator(target, declarator, start..end)
            }
            Promotion::Nested(_) | Promotion::Function => {
                self.reduce(ACTION, SimpleSpan::from(span.start..end));
                let kind = DeclaratorKind::Array {
                    modifiers: vec![modifier],
                };
                self.wrap_declarator(target, kind, span.start..end)
            }
        };
        self.push_node(promoted);
        Ok(())
    }

    /// Closes the parameter scope and applies it to the declarator beneath it
    pub fn consume_function_declarator(&mut self, tokens: RuleTokens<'_>, var_args: bool) -> ActionResult {
        const ACTION: &str = "consume_function_declarator";
        let parameters = self.close_nodes(ACTION)?;
        let target = self.pop_declarator(ACTION)?;
        let end = rule_span(tokens).end;
        let mut declarator = self.declarator_copy(target);
        let span = self.ast.span(target);
        let function = DeclaratorKind::Function {
            parameters,
            var_args,
        };

        let promoted = match Promotion::of(&declarator) {
            Promotion::Nested(nested) => {
                let start = self.ast.span(nested).start;
                self.reduce(ACTION, SimpleSpan::from(start..end));
                declarator.kind = function;
                self.replace_declarator(target, declarator, start..end)
            }
            Promotion::Plain => {
                let start = self.ast.span(declarator.name).start;
                self.reduce(ACTION, SimpleSpan::from(start..end));
                declarator.kind = function;
                self.replace_declarator(target, declarator, start..end)
            }
            Promotion::Array | Promotion::Function => {
                self.reduce(ACTION, SimpleSpan::from(span.start..end));
                self.wrap_declarator(target, function, span.start..end)
            }
        };
        self.push_node(promoted);
        Ok(())
    }

    fn replace_declarator(
        &mut self,
        target: NodeId,
        declarator: Declarator,
        range: std::ops::Range<usize>,
    ) -> NodeId {
        self.ast.set_kind(target, NodeKind::Declarator(declarator));
        self.ast.set_span(target, SimpleSpan::from(range));
        target
    }

    fn wrap_declarator(
        &mut self,
        target: NodeId,
        kind: DeclaratorKind,
        range: std::ops::Range<usize>,
    ) -> NodeId {
        let name = self.empty_name(range.start);
        let origin = self.ast.node(target).origin;
        self.alloc(
            NodeKind::Declarator(Declarator {
                kind,
                name,
                pointer_ops: Vec::new(),
                nested: Some(target),
                initializer: None,
                bit_width: None,
            }),
            SimpleSpan::from(range),
            origin,
        )
    }

    /// `*`, `&` or `* const volatile`
    pub fn consume_pointer(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_pointer";
        let first = tokens
            .first()
            .ok_or(InternalError::MissingFragment { action: ACTION })?;
        let kind = match first.grammar {
            GrammarToken::And => PointerKind::Reference,
            _ => PointerKind::Pointer,
        };
        let mut qualifiers = Qualifiers::empty();
        for token in &tokens[1..] {
            match token.grammar {
                GrammarToken::Const => qualifiers |= Qualifiers::CONST,
                GrammarToken::Volatile => qualifiers |= Qualifiers::VOLATILE,
                GrammarToken::Restrict => qualifiers |= Qualifiers::RESTRICT,
                _ => {
                    return Err(InternalError::StackDesync {
                        action: ACTION,
                        expected: "cv-qualifier",
                    })
                }
            }
        }
        self.alloc_rule(
            ACTION,
            NodeKind::PointerOperator(PointerOperator { kind, qualifiers }),
            tokens,
        );
        Ok(())
    }

    /// Pops the direct declarator, then closes the scope of pointer operators
    /// opened before it
    pub fn consume_declarator_with_pointer(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_declarator_with_pointer";
        let target = self.pop_declarator(ACTION)?;
        let pointer_ops = self.close_nodes(ACTION)?;
        let mut declarator = self.declarator_copy(target);
        let span = rule_span(tokens);
        self.reduce(ACTION, span);
        let start = pointer_ops
            .first()
            .map_or(self.ast.span(target).start, |&op| self.ast.span(op).start);
        let end = self.ast.span(target).end.max(span.end);
        declarator.pointer_ops = pointer_ops;
        self.ast.set_kind(target, NodeKind::Declarator(declarator));
        self.ast.set_span(target, SimpleSpan::from(start..end));
        self.push_node(target);
        Ok(())
    }

    /// `declarator : width`
    pub fn consume_declarator_bit_field(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_declarator_bit_field";
        let width = self.pop_node(ACTION)?;
        let target = self.pop_declarator(ACTION)?;
        let mut declarator = self.declarator_copy(target);
        declarator.bit_width = Some(width);
        let start = self.ast.span(target).start;
        let end = self.ast.span(width).end;
        self.reduce(ACTION, rule_span(tokens));
        self.ast.set_kind(target, NodeKind::Declarator(declarator));
        self.ast.set_span(target, SimpleSpan::from(start..end));
        self.push_node(target);
        Ok(())
    }

    pub fn consume_parameter_declaration(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_parameter_declaration";
        let declarator = self.pop_declarator(ACTION)?;
        let decl_spec = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::ParameterDeclaration(ParameterDeclaration {
                decl_spec,
                declarator,
            }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_type_id(&mut self, tokens: RuleTokens<'_>, has_declarator: bool) -> ActionResult {
        const ACTION: &str = "consume_type_id";
        let declarator = if has_declarator {
            Some(self.pop_declarator(ACTION)?)
        } else {
            None
        };
        let decl_spec = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::TypeId(TypeId {
                decl_spec,
                declarator,
            }),
            tokens,
        );
        Ok(())
    }

    // Initializers

    pub fn consume_initializer(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_initializer";
        let expression = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Initializer(Initializer::Expression(expression)),
            tokens,
        );
        Ok(())
    }

    /// Closes the scope opened after `{`
    pub fn consume_initializer_list(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_initializer_list";
        let items = self.close_nodes(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Initializer(Initializer::List(items)),
            tokens,
        );
        Ok(())
    }

    /// `( arguments? )` after a declarator; pops the argument or a placeholder
    pub fn consume_constructor_initializer(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_constructor_initializer";
        let argument = self.pop_optional(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Initializer(Initializer::Constructor { argument }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_declarator_with_initializer(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_declarator_with_initializer";
        let initializer = self.pop_node(ACTION)?;
        let target = self.pop_declarator(ACTION)?;
        let mut declarator = self.declarator_copy(target);
        declarator.initializer = Some(initializer);
        let start = self.ast.span(target).start;
        let end = self.ast.span(initializer).end;
        self.reduce(ACTION, rule_span(tokens));
        self.ast.set_kind(target, NodeKind::Declarator(declarator));
        self.ast.set_span(target, SimpleSpan::from(start..end));
        self.push_node(target);
        Ok(())
    }

    // Declarations

    /// Closes the declarator scope and pops the declaration specifier
    pub fn consume_declaration_simple(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_declaration_simple";
        let declarators = self.close_nodes(ACTION)?;
        let decl_spec = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Declaration(Declaration::Simple {
                decl_spec,
                declarators,
            }),
            tokens,
        );
        Ok(())
    }

    /// Pops the body, closes the declarator scope holding exactly one
    /// declarator and pops the declaration specifier
    pub fn consume_function_definition(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_function_definition";
        let body = self.pop_node(ACTION)?;
        let declarators = self.close_nodes(ACTION)?;
        let [declarator] = declarators[..] else {
            return Err(InternalError::StackDesync {
                action: ACTION,
                expected: "single function declarator",
            });
        };
        let decl_spec = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Declaration(Declaration::FunctionDefinition {
                decl_spec,
                declarator,
                body,
            }),
            tokens,
        );
        Ok(())
    }

    /// Closes the body scope and pops the namespace name (or empty)
    pub fn consume_namespace_definition(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_namespace_definition";
        let declarations = self.close_nodes(ACTION)?;
        let at = tokens.first().map_or(0, |t| t.token.span.end);
        let name = self.pop_name(ACTION, at)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Declaration(Declaration::Namespace { name, declarations }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_using_directive(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_using_directive";
        let name = self.pop_node(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Declaration(Declaration::UsingDirective { name }),
            tokens,
        );
        Ok(())
    }

    /// Pops the templated declaration, then closes the parameter scope
    pub fn consume_template_declaration(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_template_declaration";
        let declaration = self.pop_node(ACTION)?;
        let parameters = self.close_nodes(ACTION)?;
        self.alloc_rule(
            ACTION,
            NodeKind::Declaration(Declaration::Template {
                parameters,
                declaration,
            }),
            tokens,
        );
        Ok(())
    }

    /// Pops the default type (or placeholder) and the parameter name
    pub fn consume_template_type_parameter(&mut self, tokens: RuleTokens<'_>) -> ActionResult {
        const ACTION: &str = "consume_template_type_parameter";
        let default = self.pop_optional(ACTION)?;
        let at = tokens.first().map_or(0, |t| t.token.span.end);
        let name = self.pop_name(ACTION, at)?;
        self.alloc_rule(
            ACTION,
            NodeKind::TemplateParameter(TemplateParameter { name, default }),
            tokens,
        );
        Ok(())
    }

    pub fn consume_declaration_problem(&mut self, tokens: RuleTokens<'_>) {
        let problem = self.alloc_problem(tokens);
        self.alloc_rule(
            "consume_declaration_problem",
            NodeKind::Declaration(Declaration::Problem { problem }),
            tokens,
        );
    }
}
