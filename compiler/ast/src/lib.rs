//! The abstract syntax tree (AST).
//!
//! The most important definitions are [`Node`], [`Declaration`] and [`Expression`].
//!
//! Nodes are created once by the parser and mutated in place by the later passes:
//! The annotator records symbols and usage flags, the resolver binds references and fills
//! in types.

use lexer::{Operator, Radix};
use span::{SourceFileIndex, Span, Spanned, Spanning};
use std::fmt;
use utility::{Atom, Nat};

pub use format::Format;
pub use r#type::{FieldType, ParameterType, ProcedureType, QualifiedType, StructType, TypeInfo};

mod format;
mod r#type;

#[cfg(test)]
mod test;

/// The syntax tree of a single source file.
pub struct File {
    pub index: SourceFileIndex,
    pub nodes: Vec<Node>,
}

/// A top-level or block-level element.
#[derive(Clone, PartialEq)]
pub enum Node {
    Declaration(Declaration),
    Expression(Expression),
    Assignment(Box<Assignment>),
}

impl Spanning for Node {
    fn span(&self) -> Span {
        match self {
            Self::Declaration(declaration) => declaration.span,
            Self::Expression(expression) => expression.span,
            Self::Assignment(assignment) => assignment.span,
        }
    }
}

impl From<Declaration> for Node {
    fn from(declaration: Declaration) -> Self {
        Self::Declaration(declaration)
    }
}

impl From<Expression> for Node {
    fn from(expression: Expression) -> Self {
        Self::Expression(expression)
    }
}

impl From<Assignment> for Node {
    fn from(assignment: Assignment) -> Self {
        Self::Assignment(Box::new(assignment))
    }
}

pub type Identifier = Spanned<Atom>;

/// The index of a symbol inside of the symbol table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolIndex(u32);

impl SymbolIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn value(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SymbolIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A declaration.
pub type Declaration = Spanned<BareDeclaration>;

/// A declaration without an enclosing [`Span`].
#[derive(Clone, PartialEq)]
pub enum BareDeclaration {
    Procedure(Box<Procedure>),
    Struct(Box<Struct>),
    Binding(Box<Binding>),
    Load(Box<Load>),
}

impl BareDeclaration {
    /// The symbol the annotator registered for this declaration.
    pub fn symbol(&self) -> Option<SymbolIndex> {
        match self {
            Self::Procedure(procedure) => procedure.symbol,
            Self::Struct(struct_) => struct_.symbol,
            Self::Binding(binding) => binding.symbol,
            Self::Load(_) => None,
        }
    }
}

impl From<Procedure> for BareDeclaration {
    fn from(procedure: Procedure) -> Self {
        Self::Procedure(Box::new(procedure))
    }
}

impl From<Struct> for BareDeclaration {
    fn from(struct_: Struct) -> Self {
        Self::Struct(Box::new(struct_))
    }
}

impl From<Binding> for BareDeclaration {
    fn from(binding: Binding) -> Self {
        Self::Binding(Box::new(binding))
    }
}

impl From<Load> for BareDeclaration {
    fn from(load: Load) -> Self {
        Self::Load(Box::new(load))
    }
}

/// A procedure declaration.
///
/// # Examples
///
/// ```cadence
/// proc add(a: s32, b: s32) -> s32 = a + b
/// ```
///
/// * `add` is the *binder*
/// * `a: s32` and `b: s32` are the *parameters*
/// * `s32` following the arrow is the *result* type
/// * `a + b` is the *body*
///
/// The binder is absent for anonymous procedures. External procedures do not have a body.
#[derive(Clone, PartialEq)]
pub struct Procedure {
    pub binder: Option<Identifier>,
    pub parameters: Vec<Binding>,
    pub is_variadic: bool,
    pub result: Option<Type>,
    pub body: Option<Expression>,
    pub is_extern: bool,
    pub symbol: Option<SymbolIndex>,
}

impl Procedure {
    /// The signature of the procedure.
    pub fn type_(&self) -> TypeInfo {
        ProcedureType {
            parameters: self
                .parameters
                .iter()
                .map(|parameter| ParameterType {
                    binder: (parameter.binder.bare != Atom::UNDERSCORE)
                        .then_some(parameter.binder.bare),
                    type_: parameter.declared_type(),
                })
                .collect(),
            is_variadic: self.is_variadic,
            result: self
                .result
                .as_ref()
                .map_or(TypeInfo::VOID, |type_| type_.bare.clone()),
        }
        .into()
    }

    /// Whether the procedure yields a value.
    pub fn returns_value(&self) -> bool {
        self.result
            .as_ref()
            .is_some_and(|type_| !type_.bare.is_void())
    }
}

/// A struct declaration.
///
/// # Examples
///
/// ```cadence
/// struct Point { x: s32, y: s32 }
/// ```
#[derive(Clone, PartialEq)]
pub struct Struct {
    pub binder: Option<Identifier>,
    pub fields: Vec<Binding>,
    pub symbol: Option<SymbolIndex>,
}

impl Struct {
    pub fn type_(&self) -> TypeInfo {
        StructType {
            binder: self.binder.map_or(Atom::UNDERSCORE, |binder| binder.bare),
            fields: self
                .fields
                .iter()
                .map(|field| FieldType {
                    binder: field.binder.bare,
                    type_: field.declared_type(),
                })
                .collect(),
        }
        .into()
    }
}

/// A named value: a local or global variable, a parameter or a struct field.
///
/// # Examples
///
/// ```cadence
/// var count: s32 = 0
/// ```
#[derive(Clone, PartialEq)]
pub struct Binding {
    pub kind: BindingKind,
    pub binder: Identifier,
    pub type_: Option<Type>,
    pub initializer: Option<Expression>,
    pub symbol: Option<SymbolIndex>,
}

impl Binding {
    /// The annotated type, `void` if there is none.
    pub fn declared_type(&self) -> TypeInfo {
        self.type_
            .as_ref()
            .map_or(TypeInfo::VOID, |type_| type_.bare.clone())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BindingKind {
    Let,
    Var,
    Parameter,
    Field,
}

impl BindingKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Let => "let",
            Self::Var => "var",
            Self::Parameter => "parameter",
            Self::Field => "field",
        }
    }
}

/// A load directive naming a further source file of the compilation unit.
///
/// # Examples
///
/// ```cadence
/// #load "io.cad"
/// ```
#[derive(Clone, PartialEq)]
pub struct Load {
    pub path: Spanned<Atom>,
}

/// An assignment or operator-assignment statement.
#[derive(Clone, PartialEq)]
pub struct Assignment {
    pub span: Span,
    pub target: Expression,
    /// The operator of an operator-assignment like `+=` as its infix counterpart.
    pub operator: Option<Spanned<Operator>>,
    pub value: Expression,
}

/// A type annotation.
pub type Type = Spanned<TypeInfo>;

/// An expression together with its analysis metadata.
#[derive(Clone, PartialEq)]
pub struct Expression {
    pub bare: BareExpression,
    pub span: Span,
    /// The type of the expression if it is already known.
    ///
    /// Literals and casts are typed by the parser, everything else by the resolver.
    pub type_: Option<TypeInfo>,
    /// Whether the value of the expression is used.
    pub result_required: bool,
    /// Whether the expression is the last one of its sequence.
    pub tail_position: bool,
}

impl Expression {
    pub fn new(span: Span, bare: BareExpression) -> Self {
        Self {
            bare,
            span,
            type_: None,
            result_required: false,
            tail_position: false,
        }
    }

    #[must_use]
    pub fn typed(mut self, type_: TypeInfo) -> Self {
        self.type_ = Some(type_);
        self
    }

    /// Whether the expression denotes a location that can be assigned to.
    pub fn is_place(&self) -> bool {
        match &self.bare {
            BareExpression::Identifier(_) | BareExpression::FieldIndex(_) => true,
            BareExpression::Prefix(prefix) => prefix.operator.bare == Operator::Asterisk,
            _ => false,
        }
    }
}

impl Spanning for Expression {
    fn span(&self) -> Span {
        self.span
    }
}

/// An expression without an enclosing [`Span`].
#[derive(Clone, PartialEq)]
pub enum BareExpression {
    Bool(bool),
    Integer(Box<IntegerLiteral>),
    Real(Atom),
    Text(Atom),
    Character(char),
    Identifier(Box<Reference>),
    FieldIndex(Box<FieldIndex>),
    Invocation(Box<Invocation>),
    Infix(Box<Infix>),
    Prefix(Box<Prefix>),
    Cast(Box<Cast>),
    Block(Box<Block>),
    If(Box<If>),
    While(Box<While>),
    New(Box<New>),
    Delete(Box<Delete>),
    Defer(Box<Defer>),
    /// The explicit absence of an initial value, `---`.
    Uninitialized,
}

macro_rules! bare_expression_from {
    ($( $Variant:ident($Type:ident) ),* $(,)?) => {
        $(
            impl From<$Type> for BareExpression {
                fn from(expression: $Type) -> Self {
                    Self::$Variant(Box::new(expression))
                }
            }
        )*
    };
}

bare_expression_from! {
    Integer(IntegerLiteral),
    Identifier(Reference),
    FieldIndex(FieldIndex),
    Invocation(Invocation),
    Infix(Infix),
    Prefix(Prefix),
    Cast(Cast),
    Block(Block),
    If(If),
    While(While),
    New(New),
    Delete(Delete),
    Defer(Defer),
}

#[derive(Clone, PartialEq, Eq)]
pub struct IntegerLiteral {
    pub value: Nat,
    pub radix: Radix,
}

/// A reference to a binding by name.
#[derive(Clone, PartialEq)]
pub struct Reference {
    pub identifier: Identifier,
    /// The referenced symbol, set by the resolver.
    pub symbol: Option<SymbolIndex>,
}

/// The access of a struct field, `target.field`.
#[derive(Clone, PartialEq)]
pub struct FieldIndex {
    pub target: Expression,
    pub field: Identifier,
}

/// A procedure call, `callee(arguments)`.
#[derive(Clone, PartialEq)]
pub struct Invocation {
    pub callee: Expression,
    pub arguments: Vec<Expression>,
}

#[derive(Clone, PartialEq)]
pub struct Infix {
    pub left: Expression,
    pub operator: Spanned<Operator>,
    pub right: Expression,
}

#[derive(Clone, PartialEq)]
pub struct Prefix {
    pub operator: Spanned<Operator>,
    pub operand: Expression,
}

/// A type conversion, `expression as Type`.
#[derive(Clone, PartialEq)]
pub struct Cast {
    pub expression: Expression,
    pub type_: Type,
}

/// A sequence of nodes delimited by curly brackets.
///
/// The value of a block is the value of its last node.
#[derive(Clone, PartialEq)]
pub struct Block {
    pub nodes: Vec<Node>,
}

/// A conditional, `if condition consequent else alternative`.
///
/// An `unless` is a negated `if`.
#[derive(Clone, PartialEq)]
pub struct If {
    pub is_negated: bool,
    pub condition: Expression,
    pub consequent: Expression,
    pub alternative: Option<Expression>,
}

/// A loop, `while condition body else alternative`.
///
/// An `until` is a negated `while`. The alternative runs if the body never does.
#[derive(Clone, PartialEq)]
pub struct While {
    pub is_negated: bool,
    pub condition: Expression,
    pub body: Expression,
    pub alternative: Option<Expression>,
}

/// A heap allocation, `new Type`.
#[derive(Clone, PartialEq)]
pub struct New {
    pub type_: Type,
}

#[derive(Clone, PartialEq)]
pub struct Delete {
    pub operand: Expression,
}

/// The deferral of a node to the end of the enclosing scope, `defer node`.
#[derive(Clone, PartialEq)]
pub struct Defer {
    pub node: Node,
}
