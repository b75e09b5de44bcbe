//! The semantic annotator.
//!
//! It registers a symbol for every declaration it encounters and records its index on the
//! declaration node. Furthermore, it marks every expression whose value is used as
//! _result-required_ and the last node of every sequence as being in _tail position_.
//!
//! All files of a compilation unit are annotated one after the other with the same
//! [`Builder`]. The resolver later replays the exact order in which symbols are added here.

use ast::{BareDeclaration, BareExpression, Binding, Expression, File, Node, Procedure, Struct};
use span::Span;
use symbol_table::{Builder, Kind};
use utility::Atom;


/// Annotate the given file adding its declarations to the symbol table.
pub fn annotate(file: &mut File, builder: &mut Builder) {
    let mut annotator = Annotator { builder };

    for node in &mut file.nodes {
        annotator.annotate_node(node);
    }
}

struct Annotator<'a> {
    builder: &'a mut Builder,
}

impl Annotator<'_> {
    fn annotate_node(&mut self, node: &mut Node) {
        match node {
            Node::Declaration(declaration) => match &mut declaration.bare {
                BareDeclaration::Procedure(procedure) => {
                    self.annotate_procedure(procedure, declaration.span);
                }
                BareDeclaration::Struct(struct_) => {
                    self.annotate_struct(struct_, declaration.span);
                }
                BareDeclaration::Binding(binding) => self.annotate_binding(binding),
                BareDeclaration::Load(_) => {}
            },
            Node::Expression(expression) => self.annotate_expression(expression),
            Node::Assignment(assignment) => {
                self.annotate_operand(&mut assignment.target);
                self.annotate_operand(&mut assignment.value);
            }
        }
    }

    /// Annotate a sequence of nodes whose last node determines the value of the sequence.
    fn annotate_sequence(&mut self, nodes: &mut [Node], result_required: bool) {
        if let Some(Node::Expression(last)) = nodes.last_mut() {
            last.tail_position = true;
            last.result_required |= result_required;
        }

        for node in nodes {
            self.annotate_node(node);
        }
    }

    fn annotate_procedure(&mut self, procedure: &mut Procedure, span: Span) {
        let binder = procedure.binder.map_or(Atom::UNDERSCORE, |binder| binder.bare);
        let span = procedure.binder.map_or(span, |binder| binder.span);

        procedure.symbol = Some(self.builder.add_symbol(
            binder,
            Kind::PROCEDURE,
            Some(procedure.type_()),
            span,
        ));

        let returns_value = procedure.returns_value();

        // external procedures do not have a body to open a scope for
        let Some(body) = &mut procedure.body else {
            return;
        };

        self.builder.open_scope(body.span);

        for parameter in &mut procedure.parameters {
            self.annotate_binding(parameter);
        }

        body.result_required = returns_value;
        body.tail_position = true;
        self.annotate_expression(body);

        self.builder.close_scope();
    }

    fn annotate_struct(&mut self, struct_: &mut Struct, span: Span) {
        let binder = struct_.binder.map_or(Atom::UNDERSCORE, |binder| binder.bare);

        struct_.symbol = Some(self.builder.add_symbol(
            binder,
            Kind::STRUCT,
            Some(struct_.type_()),
            struct_.binder.map_or(span, |binder| binder.span),
        ));

        self.builder.open_scope(span);

        for field in &mut struct_.fields {
            self.annotate_binding(field);
        }

        self.builder.close_scope();
    }

    /// Annotate a binding.
    ///
    /// The initializer is annotated before the binding itself is registered. Hence,
    /// the initializer cannot refer to the binding.
    fn annotate_binding(&mut self, binding: &mut Binding) {
        if let Some(initializer) = &mut binding.initializer {
            self.annotate_operand(initializer);
        }

        binding.symbol = Some(self.builder.add_symbol(
            binding.binder.bare,
            Kind::empty(),
            binding.type_.as_ref().map(|type_| type_.bare.clone()),
            binding.binder.span,
        ));
    }

    /// Annotate an expression whose value is always used.
    fn annotate_operand(&mut self, expression: &mut Expression) {
        expression.result_required = true;
        self.annotate_expression(expression);
    }

    fn annotate_expression(&mut self, expression: &mut Expression) {
        let result_required = expression.result_required;

        match &mut expression.bare {
            BareExpression::Block(block) => {
                self.annotate_sequence(&mut block.nodes, result_required);
            }
            BareExpression::FieldIndex(index) => self.annotate_operand(&mut index.target),
            BareExpression::Invocation(invocation) => {
                self.annotate_operand(&mut invocation.callee);

                for argument in &mut invocation.arguments {
                    self.annotate_operand(argument);
                }
            }
            BareExpression::Infix(infix) => {
                self.annotate_operand(&mut infix.left);
                self.annotate_operand(&mut infix.right);
            }
            BareExpression::Prefix(prefix) => self.annotate_operand(&mut prefix.operand),
            BareExpression::Cast(cast) => self.annotate_operand(&mut cast.expression),
            BareExpression::If(if_) => {
                self.annotate_operand(&mut if_.condition);

                if_.consequent.result_required = result_required;
                self.annotate_expression(&mut if_.consequent);

                if let Some(alternative) = &mut if_.alternative {
                    alternative.result_required = result_required;
                    self.annotate_expression(alternative);
                }
            }
            BareExpression::While(while_) => {
                self.annotate_operand(&mut while_.condition);
                self.annotate_expression(&mut while_.body);

                if let Some(alternative) = &mut while_.alternative {
                    self.annotate_expression(alternative);
                }
            }
            BareExpression::Delete(delete) => self.annotate_operand(&mut delete.operand),
            BareExpression::Defer(defer) => self.annotate_node(&mut defer.node),
            BareExpression::Bool(_)
            | BareExpression::Integer(_)
            | BareExpression::Real(_)
            | BareExpression::Text(_)
            | BareExpression::Character(_)
            | BareExpression::Identifier(_)
            | BareExpression::New(_)
            | BareExpression::Uninitialized => {}
        }
    }
}
