//! The textual tree representation of the AST.

use super::*;
use format_struct::FormatStruct;
pub use indentation::Indentation;
use std::fmt::{Formatter, Result};

mod indentation {
    use std::fmt;

    const INDENTATION_IN_SPACES: Representation = 4;
    type Representation = usize;

    #[derive(Clone, Copy, Default)]
    pub struct Indentation(Representation);

    impl Indentation {
        pub(super) fn increased(self) -> Self {
            Self(self.0 + INDENTATION_IN_SPACES)
        }
    }

    impl fmt::Display for Indentation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", " ".repeat(self.0))
        }
    }
}

mod format_struct {
    use super::{Expression, Format, Formatter, Indentation, Result};
    use joinery::Joinable;
    use span::Span;

    pub(super) struct FormatStruct<'f, 'v> {
        formatter: &'f mut Formatter<'v>,
        indentation: Indentation,
        result: Result,
    }

    impl<'f, 'v> FormatStruct<'f, 'v> {
        pub(super) fn new(formatter: &'f mut Formatter<'v>, indentation: Indentation) -> Self {
            Self {
                formatter,
                indentation: indentation.increased(),
                result: Ok(()),
            }
        }

        pub(super) fn name(mut self, name: &str, span: Span) -> Self {
            self.result = self
                .result
                .and_then(|()| write!(self.formatter, "{name} {span:?}"));
            self
        }

        /// Append the analysis metadata of an expression to the header.
        pub(super) fn metadata(mut self, expression: &Expression) -> Self {
            self.result = self.result.and_then(|()| {
                if let Some(type_) = &expression.type_ {
                    write!(self.formatter, " : {type_}")?;
                }

                let flags: Vec<_> = [
                    (expression.result_required, "required"),
                    (expression.tail_position, "tail"),
                ]
                .into_iter()
                .filter_map(|(set, flag)| set.then_some(flag))
                .collect();

                if !flags.is_empty() {
                    write!(self.formatter, " [{}]", flags.join_with(", "))?;
                }

                Ok(())
            });
            self
        }

        pub(super) fn field(mut self, name: &str, field: &impl Format) -> Self {
            self.result = self.result.and_then(|()| {
                writeln!(self.formatter)?;
                write!(self.formatter, "{}{name}:", self.indentation)?;
                if field.is_inline() {
                    write!(self.formatter, " ")?;
                }
                field.format(self.formatter, self.indentation)
            });
            self
        }

        pub(super) fn finish(self) -> Result {
            self.result
        }
    }
}

/// Formatting of syntax trees as indented trees.
pub trait Format {
    fn format(&self, f: &mut Formatter<'_>, indentation: Indentation) -> Result;

    /// Whether the representation starts on the current line.
    fn is_inline(&self) -> bool {
        true
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        self.format(f, Indentation::default())
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        self.format(f, Indentation::default())
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for node in &self.nodes {
            node.format(f, Indentation::default())?;
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Format for Node {
    fn format(&self, f: &mut Formatter<'_>, indentation: Indentation) -> Result {
        match self {
            Self::Declaration(declaration) => declaration.format(f, indentation),
            Self::Expression(expression) => expression.format(f, indentation),
            Self::Assignment(assignment) => FormatStruct::new(f, indentation)
                .name("Assignment", assignment.span)
                .field("target", &assignment.target)
                .field("operator", &assignment.operator)
                .field("value", &assignment.value)
                .finish(),
        }
    }
}

impl Format for Declaration {
    fn format(&self, f: &mut Formatter<'_>, indentation: Indentation) -> Result {
        match &self.bare {
            BareDeclaration::Procedure(procedure) => FormatStruct::new(f, indentation)
                .name("Procedure", self.span)
                .field("binder", &procedure.binder)
                .field("parameters", &procedure.parameters)
                .field("is-variadic", &procedure.is_variadic)
                .field("result", &procedure.result)
                .field("body", &procedure.body)
                .field("is-extern", &procedure.is_extern)
                .field("symbol", &procedure.symbol)
                .finish(),
            BareDeclaration::Struct(struct_) => FormatStruct::new(f, indentation)
                .name("Struct", self.span)
                .field("binder", &struct_.binder)
                .field("fields", &struct_.fields)
                .field("symbol", &struct_.symbol)
                .finish(),
            BareDeclaration::Binding(binding) => binding.format(f, indentation),
            BareDeclaration::Load(load) => FormatStruct::new(f, indentation)
                .name("Load", self.span)
                .field("path", &load.path)
                .finish(),
        }
    }
}

impl Format for Binding {
    fn format(&self, f: &mut Formatter<'_>, indentation: Indentation) -> Result {
        FormatStruct::new(f, indentation)
            .name("Binding", self.binder.span)
            .field("kind", &self.kind)
            .field("binder", &self.binder)
            .field("type", &self.type_)
            .field("initializer", &self.initializer)
            .field("symbol", &self.symbol)
            .finish()
    }
}

impl Format for Expression {
    fn format(&self, f: &mut Formatter<'_>, indentation: Indentation) -> Result {
        use BareExpression::*;

        let structure = FormatStruct::new(f, indentation)
            .name(name(&self.bare), self.span)
            .metadata(self);

        match &self.bare {
            Bool(value) => structure.field("value", value),
            Integer(literal) => structure
                .field("value", &Verbatim(&literal.value))
                .field("radix", &Verbatim(literal.radix.name())),
            Real(literal) => structure.field("value", &Verbatim(literal)),
            Text(literal) => structure.field("value", literal),
            Character(literal) => structure.field("value", &Verbatim(format!("{literal:?}"))),
            Identifier(reference) => structure
                .field("binder", &reference.identifier)
                .field("symbol", &reference.symbol),
            FieldIndex(index) => structure
                .field("target", &index.target)
                .field("field", &index.field),
            Invocation(invocation) => structure
                .field("callee", &invocation.callee)
                .field("arguments", &invocation.arguments),
            Infix(infix) => structure
                .field("left", &infix.left)
                .field("operator", &infix.operator)
                .field("right", &infix.right),
            Prefix(prefix) => structure
                .field("operator", &prefix.operator)
                .field("operand", &prefix.operand),
            Cast(cast) => structure
                .field("expression", &cast.expression)
                .field("type", &cast.type_),
            Block(block) => structure.field("nodes", &block.nodes),
            If(if_) => structure
                .field("condition", &if_.condition)
                .field("consequent", &if_.consequent)
                .field("alternative", &if_.alternative),
            While(while_) => structure
                .field("condition", &while_.condition)
                .field("body", &while_.body)
                .field("alternative", &while_.alternative),
            New(new) => structure.field("type", &new.type_),
            Delete(delete) => structure.field("operand", &delete.operand),
            Defer(defer) => structure.field("node", &defer.node),
            Uninitialized => structure,
        }
        .finish()
    }
}

fn name(expression: &BareExpression) -> &'static str {
    use BareExpression::*;

    match expression {
        Bool(_) => "Bool",
        Integer(_) => "Integer",
        Real(_) => "Real",
        Text(_) => "Text",
        Character(_) => "Character",
        Identifier(_) => "Identifier",
        FieldIndex(_) => "FieldIndex",
        Invocation(_) => "Invocation",
        Infix(_) => "Infix",
        Prefix(_) => "Prefix",
        Cast(_) => "Cast",
        Block(_) => "Block",
        If(if_) if if_.is_negated => "Unless",
        If(_) => "If",
        While(while_) if while_.is_negated => "Until",
        While(_) => "While",
        New(_) => "New",
        Delete(_) => "Delete",
        Defer(_) => "Defer",
        Uninitialized => "Uninitialized",
    }
}

impl<T: Format> Format for Option<T> {
    fn format(&self, f: &mut Formatter<'_>, indentation: Indentation) -> Result {
        match self {
            Some(value) => value.format(f, indentation),
            None => write!(f, "none"),
        }
    }
}

impl<T: Format> Format for Vec<T> {
    fn is_inline(&self) -> bool {
        self.is_empty()
    }

    fn format(&self, f: &mut Formatter<'_>, indentation: Indentation) -> Result {
        if self.is_empty() {
            return write!(f, "[]");
        }

        let indentation = indentation.increased();

        for element in self {
            writeln!(f)?;
            write!(f, "{indentation}")?;
            element.format(f, indentation)?;
        }

        Ok(())
    }
}

impl Format for Identifier {
    fn format(&self, f: &mut Formatter<'_>, _: Indentation) -> Result {
        write!(f, "{} {:?}", self.bare, self.span)
    }
}

impl Format for Type {
    fn format(&self, f: &mut Formatter<'_>, _: Indentation) -> Result {
        write!(f, "{} {:?}", self.bare, self.span)
    }
}

impl Format for Spanned<Operator> {
    fn format(&self, f: &mut Formatter<'_>, _: Indentation) -> Result {
        write!(f, "{} {:?}", self.bare, self.span)
    }
}

impl Format for Atom {
    fn format(&self, f: &mut Formatter<'_>, _: Indentation) -> Result {
        write!(f, "{:?}", self.to_str())
    }
}

impl Format for bool {
    fn format(&self, f: &mut Formatter<'_>, _: Indentation) -> Result {
        write!(f, "{self}")
    }
}

impl Format for SymbolIndex {
    fn format(&self, f: &mut Formatter<'_>, _: Indentation) -> Result {
        write!(f, "{self:?}")
    }
}

impl Format for BindingKind {
    fn format(&self, f: &mut Formatter<'_>, _: Indentation) -> Result {
        write!(f, "{}", self.name())
    }
}

/// A value formatted with its [`Display`](fmt::Display) implementation.
struct Verbatim<T>(T);

impl<T: fmt::Display> Format for Verbatim<T> {
    fn format(&self, f: &mut Formatter<'_>, _: Indentation) -> Result {
        write!(f, "{}", self.0)
    }
}
