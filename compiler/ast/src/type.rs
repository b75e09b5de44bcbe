use crate::{Identifier, SymbolIndex};
use joinery::JoinableIterator;
use lexer::BuiltinType;
use std::fmt;
use utility::Atom;

/// The type of an expression or a declaration.
#[derive(Clone, PartialEq, Debug)]
pub enum TypeInfo {
    Builtin(BuiltinType),
    Pointer(Box<TypeInfo>),
    Procedure(Box<ProcedureType>),
    Struct(Box<StructType>),
    /// A type referenced by name, resolved to a struct declaration by the resolver.
    Qualified(Box<QualifiedType>),
}

impl TypeInfo {
    pub const VOID: Self = Self::Builtin(BuiltinType::Void);

    pub fn pointer(to: Self) -> Self {
        Self::Pointer(Box::new(to))
    }

    pub fn is_void(&self) -> bool {
        *self == Self::VOID
    }
}

impl From<BuiltinType> for TypeInfo {
    fn from(type_: BuiltinType) -> Self {
        Self::Builtin(type_)
    }
}

impl From<ProcedureType> for TypeInfo {
    fn from(type_: ProcedureType) -> Self {
        Self::Procedure(Box::new(type_))
    }
}

impl From<StructType> for TypeInfo {
    fn from(type_: StructType) -> Self {
        Self::Struct(Box::new(type_))
    }
}

impl From<QualifiedType> for TypeInfo {
    fn from(type_: QualifiedType) -> Self {
        Self::Qualified(Box::new(type_))
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(type_) => write!(f, "{type_}"),
            Self::Pointer(type_) => write!(f, "*{type_}"),
            Self::Procedure(type_) => write!(f, "{type_}"),
            Self::Struct(type_) => write!(f, "{}", type_.binder),
            Self::Qualified(type_) => write!(f, "{}", type_.path.bare),
        }
    }
}

/// The signature of a procedure.
#[derive(Clone, PartialEq, Debug)]
pub struct ProcedureType {
    pub parameters: Vec<ParameterType>,
    /// Whether further arguments of any type may follow the parameters.
    pub is_variadic: bool,
    pub result: TypeInfo,
}

impl fmt::Display for ProcedureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let varargs = self.is_variadic.then_some("...");
        let parameters = self
            .parameters
            .iter()
            .map(ToString::to_string)
            .chain(varargs.map(ToString::to_string));

        write!(f, "({})", parameters.join_with(", "))?;

        if !self.result.is_void() {
            write!(f, " -> {}", self.result)?;
        }

        Ok(())
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct ParameterType {
    pub binder: Option<Atom>,
    pub type_: TypeInfo,
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(binder) = self.binder {
            write!(f, "{binder}: ")?;
        }

        write!(f, "{}", self.type_)
    }
}

/// The layout of a struct.
#[derive(Clone, PartialEq, Debug)]
pub struct StructType {
    pub binder: Atom,
    pub fields: Vec<FieldType>,
}

impl StructType {
    pub fn field(&self, binder: Atom) -> Option<&FieldType> {
        self.fields.iter().find(|field| field.binder == binder)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct FieldType {
    pub binder: Atom,
    pub type_: TypeInfo,
}

#[derive(Clone, PartialEq, Debug)]
pub struct QualifiedType {
    pub path: Identifier,
    /// The struct declaration the path refers to, set by the resolver.
    pub symbol: Option<SymbolIndex>,
}
