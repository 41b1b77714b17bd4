//! # Abstract Syntax Tree
//!
//! The AST of one translation unit lives in an [`Ast`] arena. Nodes refer to
//! their children and their parent by [`NodeId`]; every node except the
//! translation unit has exactly one parent. Spans are byte ranges in the
//! logical source, before macro substitution where that is known.
//!
//! Problem nodes are ordinary members of the tree: a statement, expression or
//! declaration that failed to parse is replaced by a holder pointing at a
//! [`Problem`] node that covers the offending tokens.

use std::fmt;

use bitflags::bitflags;
use chumsky::span::SimpleSpan;
use index_vec::IndexVec;
use smol_str::SmolStr;

use crate::options::Language;
use crate::token::TokenOrigin;

index_vec::define_index_type! {
    /// Index of a node in an [`Ast`]
    pub struct NodeId = u32;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: SimpleSpan<usize>,
    pub parent: Option<NodeId>,
    /// Origin of the first token of the node
    pub origin: TokenOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    TranslationUnit(TranslationUnit),
    Name(Name),
    Expression(Expression),
    Statement(Statement),
    Declaration(Declaration),
    DeclSpecifier(DeclSpecifier),
    Declarator(Declarator),
    ArrayModifier(ArrayModifier),
    PointerOperator(PointerOperator),
    ParameterDeclaration(ParameterDeclaration),
    Initializer(Initializer),
    TypeId(TypeId),
    CompositeSpecifier(CompositeSpecifier),
    ElaboratedSpecifier(ElaboratedSpecifier),
    EnumerationSpecifier(EnumerationSpecifier),
    NamedTypeSpecifier(NamedTypeSpecifier),
    Enumerator(Enumerator),
    TemplateParameter(TemplateParameter),
    Problem(Problem),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    pub language: Language,
    pub declarations: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    /// Full spelling, `A::b` for qualified names and `operator""_x` for operators
    pub text: SmolStr,
    pub kind: NameKind,
}

impl Name {
    pub fn is_empty(&self) -> bool {
        matches!(self.kind, NameKind::Empty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameKind {
    Identifier,
    /// Abstract declarators, anonymous composites
    Empty,
    Qualified {
        segments: Vec<NodeId>,
        fully_qualified: bool,
    },
    Operator,
    TemplateId {
        template: NodeId,
        arguments: Vec<NodeId>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Literal(Literal),
    Id {
        name: NodeId,
    },
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Binary {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    Conditional {
        condition: NodeId,
        positive: NodeId,
        negative: NodeId,
    },
    /// Comma-separated expressions; a single expression is never wrapped
    List {
        expressions: Vec<NodeId>,
    },
    ArraySubscript {
        array: NodeId,
        subscript: NodeId,
    },
    FunctionCall {
        callee: NodeId,
        /// A single argument, a `List` of arguments, or nothing
        argument: Option<NodeId>,
    },
    FieldReference {
        owner: NodeId,
        field: NodeId,
        is_pointer: bool,
    },
    Cast {
        type_id: NodeId,
        operand: NodeId,
    },
    TypeIdOperation {
        op: TypeIdOp,
        type_id: NodeId,
    },
    Problem {
        problem: NodeId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
    /// Spelling without any user-defined suffix
    pub value: SmolStr,
    /// User-defined literal suffix, C++ only
    pub suffix: Option<SmolStr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Integer,
    Float,
    Char,
    String,
    True,
    False,
    This,
    Nullptr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    PrefixIncr,
    PrefixDecr,
    Plus,
    Minus,
    Star,
    Amper,
    Tilde,
    Not,
    Sizeof,
    PostfixIncr,
    PostfixDecr,
    Bracketed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Multiply,
    Divide,
    Modulo,
    Plus,
    Minus,
    ShiftLeft,
    ShiftRight,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    Equals,
    NotEquals,
    BinaryAnd,
    BinaryXor,
    BinaryOr,
    LogicalAnd,
    LogicalOr,
    Assign,
    MultiplyAssign,
    DivideAssign,
    ModuloAssign,
    PlusAssign,
    MinusAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    BinaryAndAssign,
    BinaryXorAssign,
    BinaryOrAssign,
}

impl BinaryOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::BinaryAnd => "&",
            Self::BinaryXor => "^",
            Self::BinaryOr => "|",
            Self::LogicalAnd => "&&",
            Self::LogicalOr => "||",
            Self::Assign => "=",
            Self::MultiplyAssign => "*=",
            Self::DivideAssign => "/=",
            Self::ModuloAssign => "%=",
            Self::PlusAssign => "+=",
            Self::MinusAssign => "-=",
            Self::ShiftLeftAssign => "<<=",
            Self::ShiftRightAssign => ">>=",
            Self::BinaryAndAssign => "&=",
            Self::BinaryXorAssign => "^=",
            Self::BinaryOrAssign => "|=",
        }
    }

    pub const fn is_assignment(self) -> bool {
        matches!(
            self,
            Self::Assign
                | Self::MultiplyAssign
                | Self::DivideAssign
                | Self::ModuloAssign
                | Self::PlusAssign
                | Self::MinusAssign
                | Self::ShiftLeftAssign
                | Self::ShiftRightAssign
                | Self::BinaryAndAssign
                | Self::BinaryXorAssign
                | Self::BinaryOrAssign
        )
    }

    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::LessThan
                | Self::GreaterThan
                | Self::LessEqual
                | Self::GreaterEqual
                | Self::Equals
                | Self::NotEquals
                | Self::LogicalAnd
                | Self::LogicalOr
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeIdOp {
    Sizeof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Compound {
        statements: Vec<NodeId>,
    },
    Expression {
        expression: NodeId,
    },
    Declaration {
        declaration: NodeId,
    },
    Null,
    Labeled {
        label: NodeId,
        body: NodeId,
    },
    /// `case expr:`; the statement that follows is a sibling
    Case {
        expression: NodeId,
    },
    Default,
    If {
        condition: NodeId,
        then_clause: NodeId,
        else_clause: Option<NodeId>,
    },
    While {
        condition: NodeId,
        body: NodeId,
    },
    Do {
        body: NodeId,
        condition: NodeId,
    },
    For {
        /// An expression statement, a declaration statement or a null statement
        initializer: NodeId,
        condition: Option<NodeId>,
        iteration: Option<NodeId>,
        body: NodeId,
    },
    Switch {
        controller: NodeId,
        body: NodeId,
    },
    Goto {
        label: NodeId,
    },
    Continue,
    Break,
    Return {
        value: Option<NodeId>,
    },
    Problem {
        problem: NodeId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Simple {
        decl_spec: NodeId,
        declarators: Vec<NodeId>,
    },
    FunctionDefinition {
        decl_spec: NodeId,
        declarator: NodeId,
        body: NodeId,
    },
    Namespace {
        name: NodeId,
        declarations: Vec<NodeId>,
    },
    UsingDirective {
        name: NodeId,
    },
    Template {
        parameters: Vec<NodeId>,
        declaration: NodeId,
    },
    Problem {
        problem: NodeId,
    },
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Qualifiers: u8 {
        const CONST = 1 << 0;
        const VOLATILE = 1 << 1;
        const RESTRICT = 1 << 2;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct SpecifierFlags: u8 {
        const INLINE = 1 << 0;
        const VIRTUAL = 1 << 1;
        const EXPLICIT = 1 << 2;
        const FRIEND = 1 << 3;
        const MUTABLE = 1 << 4;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct TypeModifiers: u8 {
        const SIGNED = 1 << 0;
        const UNSIGNED = 1 << 1;
        const SHORT = 1 << 2;
        const LONG = 1 << 3;
        const LONG_LONG = 1 << 4;
        const COMPLEX = 1 << 5;
        const IMAGINARY = 1 << 6;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StorageClass {
    #[default]
    Unspecified,
    Typedef,
    Extern,
    Static,
    Auto,
    Register,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SimpleType {
    #[default]
    Unspecified,
    Void,
    Char,
    Int,
    Float,
    Double,
    Bool,
    /// C++ deduced type
    Auto,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclSpecifier {
    pub storage: StorageClass,
    pub qualifiers: Qualifiers,
    pub flags: SpecifierFlags,
    pub simple: SimpleType,
    pub modifiers: TypeModifiers,
    /// Composite, elaborated, enumeration or named type specifier
    pub type_specifier: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declarator {
    pub kind: DeclaratorKind,
    /// Empty when the declarator is abstract or wraps a nested declarator
    pub name: NodeId,
    pub pointer_ops: Vec<NodeId>,
    pub nested: Option<NodeId>,
    pub initializer: Option<NodeId>,
    pub bit_width: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaratorKind {
    Plain,
    Array { modifiers: Vec<NodeId> },
    Function { parameters: Vec<NodeId>, var_args: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayModifier {
    pub size: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Pointer,
    /// C++ lvalue reference
    Reference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerOperator {
    pub kind: PointerKind,
    pub qualifiers: Qualifiers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDeclaration {
    pub decl_spec: NodeId,
    pub declarator: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Initializer {
    Expression(NodeId),
    List(Vec<NodeId>),
    /// `T x(args)`; the argument is a single expression, a list, or nothing
    Constructor { argument: Option<NodeId> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeId {
    pub decl_spec: NodeId,
    pub declarator: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKey {
    Struct,
    Union,
    Class,
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Struct => write!(f, "struct"),
            Self::Union => write!(f, "union"),
            Self::Class => write!(f, "class"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeSpecifier {
    pub key: CompositeKey,
    pub name: NodeId,
    pub members: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElaboratedKey {
    Composite(CompositeKey),
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElaboratedSpecifier {
    pub key: ElaboratedKey,
    pub name: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerationSpecifier {
    pub name: NodeId,
    pub enumerators: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTypeSpecifier {
    pub name: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumerator {
    pub name: NodeId,
    pub value: Option<NodeId>,
}

/// `typename T` / `class T`, optionally with a default type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParameter {
    pub name: NodeId,
    pub default: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemId {
    SyntaxError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub id: ProblemId,
    pub is_error: bool,
    /// The offending source text
    pub arguments: SmolStr,
}

impl NodeKind {
    /// Direct children in source order
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            Self::TranslationUnit(tu) => out.extend(&tu.declarations),
            Self::Name(name) => match &name.kind {
                NameKind::Identifier | NameKind::Empty | NameKind::Operator => {}
                NameKind::Qualified { segments, .. } => out.extend(segments),
                NameKind::TemplateId {
                    template,
                    arguments,
                } => {
                    out.push(*template);
                    out.extend(arguments);
                }
            },
            Self::Expression(expr) => match expr {
                Expression::Literal(_) => {}
                Expression::Id { name } => out.push(*name),
                Expression::Unary { operand, .. } => out.push(*operand),
                Expression::Binary { lhs, rhs, .. } => out.extend([*lhs, *rhs]),
                Expression::Conditional {
                    condition,
                    positive,
                    negative,
                } => out.extend([*condition, *positive, *negative]),
                Expression::List { expressions } => out.extend(expressions),
                Expression::ArraySubscript { array, subscript } => {
                    out.extend([*array, *subscript]);
                }
                Expression::FunctionCall { callee, argument } => {
                    out.push(*callee);
                    out.extend(argument);
                }
                Expression::FieldReference { owner, field, .. } => out.extend([*owner, *field]),
                Expression::Cast { type_id, operand } => out.extend([*type_id, *operand]),
                Expression::TypeIdOperation { type_id, .. } => out.push(*type_id),
                Expression::Problem { problem } => out.push(*problem),
            },
            Self::Statement(stmt) => match stmt {
                Statement::Compound { statements } => out.extend(statements),
                Statement::Expression { expression } => out.push(*expression),
                Statement::Declaration { declaration } => out.push(*declaration),
                Statement::Null
                | Statement::Default
                | Statement::Continue
                | Statement::Break => {}
                Statement::Labeled { label, body } => out.extend([*label, *body]),
                Statement::Case { expression } => out.push(*expression),
                Statement::If {
                    condition,
                    then_clause,
                    else_clause,
                } => {
                    out.extend([*condition, *then_clause]);
                    out.extend(else_clause);
                }
                Statement::While { condition, body } => out.extend([*condition, *body]),
                Statement::Do { body, condition } => out.extend([*body, *condition]),
                Statement::For {
                    initializer,
                    condition,
                    iteration,
                    body,
                } => {
                    out.push(*initializer);
                    out.extend(condition);
                    out.extend(iteration);
                    out.push(*body);
                }
                Statement::Switch { controller, body } => out.extend([*controller, *body]),
                Statement::Goto { label } => out.push(*label),
                Statement::Return { value } => out.extend(value),
                Statement::Problem { problem } => out.push(*problem),
            },
            Self::Declaration(decl) => match decl {
                Declaration::Simple {
                    decl_spec,
                    declarators,
                } => {
                    out.push(*decl_spec);
                    out.extend(declarators);
                }
                Declaration::FunctionDefinition {
                    decl_spec,
                    declarator,
                    body,
                } => out.extend([*decl_spec, *declarator, *body]),
                Declaration::Namespace { name, declarations } => {
                    out.push(*name);
                    out.extend(declarations);
                }
                Declaration::UsingDirective { name } => out.push(*name),
                Declaration::Template {
                    parameters,
                    declaration,
                } => {
                    out.extend(parameters);
                    out.push(*declaration);
                }
                Declaration::Problem { problem } => out.push(*problem),
            },
            Self::DeclSpecifier(spec) => out.extend(spec.type_specifier),
            Self::Declarator(decl) => {
                out.extend(&decl.pointer_ops);
                out.push(decl.name);
                out.extend(decl.nested);
                match &decl.kind {
                    DeclaratorKind::Plain => {}
                    DeclaratorKind::Array { modifiers } => out.extend(modifiers),
                    DeclaratorKind::Function { parameters, .. } => out.extend(parameters),
                }
                out.extend(decl.bit_width);
                out.extend(decl.initializer);
            }
            Self::ArrayModifier(modifier) => out.extend(modifier.size),
            Self::PointerOperator(_) | Self::Problem(_) => {}
            Self::ParameterDeclaration(param) => out.extend([param.decl_spec, param.declarator]),
            Self::Initializer(init) => match init {
                Initializer::Expression(expr) => out.push(*expr),
                Initializer::List(items) => out.extend(items),
                Initializer::Constructor { argument } => out.extend(argument),
            },
            Self::TypeId(type_id) => {
                out.push(type_id.decl_spec);
                out.extend(type_id.declarator);
            }
            Self::CompositeSpecifier(spec) => {
                out.push(spec.name);
                out.extend(&spec.members);
            }
            Self::ElaboratedSpecifier(spec) => out.push(spec.name),
            Self::EnumerationSpecifier(spec) => {
                out.push(spec.name);
                out.extend(&spec.enumerators);
            }
            Self::NamedTypeSpecifier(spec) => out.push(spec.name),
            Self::Enumerator(enumerator) => {
                out.push(enumerator.name);
                out.extend(enumerator.value);
            }
            Self::TemplateParameter(param) => {
                out.push(param.name);
                out.extend(param.default);
            }
        }
        out
    }
}

/// Arena holding every node of one translation unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ast {
    nodes: IndexVec<NodeId, Node>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and makes it the parent of the children it names
    pub fn alloc(&mut self, kind: NodeKind, span: SimpleSpan<usize>, origin: TokenOrigin) -> NodeId {
        let id = self.nodes.next_idx();
        for child in kind.children() {
            self.nodes[child].parent = Some(id);
        }
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
            origin,
        })
    }

    /// Replaces a node's kind in place, re-parenting the new children
    pub fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        for child in kind.children() {
            self.nodes[child].parent = Some(id);
        }
        self.nodes[id].kind = kind;
    }

    pub fn set_span(&mut self, id: NodeId, span: SimpleSpan<usize>) {
        self.nodes[id].span = span;
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    pub fn span(&self, id: NodeId) -> SimpleSpan<usize> {
        self.nodes[id].span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drops every node allocated after the first `len`, clearing parent
    /// links that pointed at them
    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
        for node in self.nodes.iter_mut() {
            if node.parent.is_some_and(|parent| parent.index() >= len) {
                node.parent = None;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter_enumerated()
    }

    /// Nodes reachable from `root`, parents before children, in source order
    pub fn preorder(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            let children = self.nodes[id].kind.children();
            stack.extend(children.into_iter().rev());
        }
        order
    }

    pub fn name(&self, id: NodeId) -> Option<&Name> {
        match self.kind(id) {
            NodeKind::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn expression(&self, id: NodeId) -> Option<&Expression> {
        match self.kind(id) {
            NodeKind::Expression(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn statement(&self, id: NodeId) -> Option<&Statement> {
        match self.kind(id) {
            NodeKind::Statement(stmt) => Some(stmt),
            _ => None,
        }
    }

    pub fn declaration(&self, id: NodeId) -> Option<&Declaration> {
        match self.kind(id) {
            NodeKind::Declaration(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn declarator(&self, id: NodeId) -> Option<&Declarator> {
        match self.kind(id) {
            NodeKind::Declarator(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn decl_specifier(&self, id: NodeId) -> Option<&DeclSpecifier> {
        match self.kind(id) {
            NodeKind::DeclSpecifier(spec) => Some(spec),
            _ => None,
        }
    }

    pub fn translation_unit(&self, id: NodeId) -> Option<&TranslationUnit> {
        match self.kind(id) {
            NodeKind::TranslationUnit(tu) => Some(tu),
            _ => None,
        }
    }

    /// Text of a name node, empty for anything else
    pub fn name_text(&self, id: NodeId) -> &str {
        self.name(id).map_or("", |name| name.text.as_str())
    }

    /// The name node that a declarator finally declares, looking through nesting
    pub fn declarator_name(&self, mut declarator: NodeId) -> NodeId {
        while let Some(decl) = self.declarator(declarator) {
            match decl.nested {
                Some(nested) if self.name(decl.name).is_some_and(Name::is_empty) => {
                    declarator = nested;
                }
                _ => return decl.name,
            }
        }
        declarator
    }

    /// The last segment of a qualified name, or the name itself
    pub fn last_segment(&self, name: NodeId) -> NodeId {
        match self.name(name).map(|n| &n.kind) {
            Some(NameKind::Qualified { segments, .. }) => {
                segments.last().copied().unwrap_or(name)
            }
            _ => name,
        }
    }

    /// Arguments of a call or constructor initializer, with a top-level list flattened
    pub fn call_arguments(&self, argument: Option<NodeId>) -> Vec<NodeId> {
        match argument {
            None => Vec::new(),
            Some(arg) => match self.expression(arg) {
                Some(Expression::List { expressions }) => expressions.clone(),
                _ => vec![arg],
            },
        }
    }
}
