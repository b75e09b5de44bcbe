//! The symbolic resolver.
//!
//! It binds every reference to the symbol it denotes and fills in the types of expressions.
//!
//! The resolver traverses the syntax trees a second time in the very same order as the
//! [annotator](../annotator/index.html) did and walks the symbol table in lockstep.
//! For every open scope, a _scout_ tracks how many of its symbols were already walked.
//! Since only those are visible to lookups, locals cannot be referenced before their
//! declaration. Global declarations on the other hand are visible everywhere.
//!
//! Arriving at a declaration whose symbol differs from the one the scout expects is a bug
//! in the front end and not an error in the user's program.

use ast::{
    BareDeclaration, BareExpression, Binding, Declaration, Expression, FieldIndex, File,
    Identifier, Node, Procedure, Struct, StructType, SymbolIndex, TypeInfo,
};
use diagnostics::{
    error::{Health, Result},
    Diagnostic, ErrorCode, Reporter,
};
use lexer::{BuiltinType, Operator, OperatorClass};
use std::{fmt, io, iter::once};
use symbol_table::SymbolTable;
use unicode_width::UnicodeWidthStr;
use utility::{
    paint::{paint_to_string, ColorChoice, Effects, Painter},
    Atom, QuoteExt,
};


/// Resolve the files of a compilation unit in the order they were annotated in.
pub fn resolve(files: &mut [File], table: &mut SymbolTable, reporter: &Reporter) -> Result {
    let mut resolver = Resolver::new(table, reporter);

    for file in files {
        resolver.resolve_file(file);
    }

    resolver.finish()
}

struct Resolver<'a> {
    table: &'a mut SymbolTable,
    reporter: &'a Reporter,
    root: Scout,
    scouts: Vec<Scout>,
    /// The errors found during the current walk over a file.
    errors: Vec<Diagnostic>,
    /// The number of references to symbols whose type is not known yet.
    deferred: usize,
    health: Health,
}

impl<'a> Resolver<'a> {
    fn new(table: &'a mut SymbolTable, reporter: &'a Reporter) -> Self {
        Self {
            table,
            reporter,
            root: Scout::new(SymbolTable::ROOT),
            scouts: Vec::new(),
            errors: Vec::new(),
            deferred: 0,
            health: Health::Untainted,
        }
    }

    /// Resolve a single file.
    ///
    /// The file is walked repeatedly until no further progress can be made. Only global
    /// bindings without a type annotation that are referenced before their declaration
    /// need more than one walk. The errors of the last walk are the ones reported.
    fn resolve_file(&mut self, file: &mut File) {
        let start = self.root.position;
        let mut deferred = usize::MAX;

        loop {
            self.root.position = start;
            self.errors.clear();
            self.deferred = 0;

            for node in &mut file.nodes {
                self.resolve_node(node);
            }

            let progressed = self.deferred < deferred;
            deferred = self.deferred;

            if deferred == 0 || !progressed {
                break;
            }
        }

        for error in std::mem::take(&mut self.errors) {
            let error = error.report(self.reporter);
            self.health.taint(error);
        }
    }

    fn finish(self) -> Result {
        assert!(self.scouts.is_empty(), "a scope was not left");
        assert_eq!(
            self.root.position,
            self.table.root().children.len(),
            "not every global symbol was walked",
        );

        self.health.into()
    }

    fn error(&mut self, diagnostic: Diagnostic) {
        self.errors.push(diagnostic);
    }

    fn scout(&mut self) -> &mut Scout {
        self.scouts.last_mut().unwrap_or(&mut self.root)
    }

    /// Step over the next symbol of the current scope.
    ///
    /// # Panics
    ///
    /// Panics if the symbol is not the one the annotator registered for the declaration.
    fn walk(&mut self, expected: Option<SymbolIndex>) -> SymbolIndex {
        let scout = self.scout();
        let scope = scout.scope;
        let position = scout.position;
        scout.position += 1;

        let actual = self.table[scope].children.get(position).copied();

        match (actual, expected) {
            (Some(actual), Some(expected)) if actual == expected => actual,
            _ => panic!(
                "the resolver diverged from the annotator in scope {scope:?} at position \
                 {position}: expected {expected:?} but found {actual:?}"
            ),
        }
    }

    /// Step into the body of the given procedure or struct.
    fn enter_body(&mut self, owner: SymbolIndex) {
        let scope = self.table.body_scope(owner);
        let body = self.walk(scope);

        self.scouts.push(Scout::new(body));
    }

    fn leave_body(&mut self) {
        let scout = self.scouts.pop();
        assert!(
            scout.is_some_and(|scout| scout.position == self.table[scout.scope].children.len()),
            "a scope was left before all of its symbols were walked"
        );
    }

    fn resolve_node(&mut self, node: &mut Node) {
        match node {
            Node::Declaration(declaration) => self.resolve_declaration(declaration),
            Node::Expression(expression) => self.resolve_expression(expression),
            Node::Assignment(assignment) => {
                self.resolve_expression(&mut assignment.target);
                self.resolve_expression(&mut assignment.value);
            }
        }
    }

    fn resolve_declaration(&mut self, declaration: &mut Declaration) {
        match &mut declaration.bare {
            BareDeclaration::Procedure(procedure) => self.resolve_procedure(procedure),
            BareDeclaration::Struct(struct_) => self.resolve_struct(struct_),
            BareDeclaration::Binding(binding) => self.resolve_binding(binding),
            BareDeclaration::Load(_) => {}
        }
    }

    fn resolve_procedure(&mut self, procedure: &mut Procedure) {
        let symbol = self.walk(procedure.symbol);

        for parameter in &mut procedure.parameters {
            if let Some(type_) = &mut parameter.type_ {
                self.resolve_type(&mut type_.bare);
            }
        }
        if let Some(result) = &mut procedure.result {
            self.resolve_type(&mut result.bare);
        }

        self.table[symbol].type_ = Some(procedure.type_());

        let Some(body) = &mut procedure.body else {
            return;
        };

        self.enter_body(symbol);

        for parameter in &procedure.parameters {
            let parameter_symbol = self.walk(parameter.symbol);
            self.table[parameter_symbol].type_ = Some(parameter.declared_type());
        }

        self.resolve_expression(body);
        self.leave_body();
    }

    /// Resolve a struct declaration.
    ///
    /// Field types are resolved outside of the body since field names are not in scope there.
    fn resolve_struct(&mut self, struct_: &mut Struct) {
        let symbol = self.walk(struct_.symbol);

        for field in &mut struct_.fields {
            if let Some(type_) = &mut field.type_ {
                self.resolve_type(&mut type_.bare);
            }
        }

        self.enter_body(symbol);

        for field in &struct_.fields {
            let field_symbol = self.walk(field.symbol);
            self.table[field_symbol].type_ = Some(field.declared_type());
        }

        self.leave_body();
        self.table[symbol].type_ = Some(struct_.type_());
    }

    /// Resolve a binding declaration.
    ///
    /// Without a type annotation, the binding takes the type of its initializer.
    fn resolve_binding(&mut self, binding: &mut Binding) {
        if let Some(type_) = &mut binding.type_ {
            self.resolve_type(&mut type_.bare);
        }
        if let Some(initializer) = &mut binding.initializer {
            self.resolve_expression(initializer);
        }

        let symbol = self.walk(binding.symbol);

        let type_ = match &binding.type_ {
            Some(type_) => Some(type_.bare.clone()),
            None => binding
                .initializer
                .as_ref()
                .and_then(|initializer| initializer.type_.clone()),
        };
        self.table[symbol].type_ = type_;
    }

    fn resolve_expression(&mut self, expression: &mut Expression) {
        let type_ = match &mut expression.bare {
            BareExpression::Identifier(reference) => {
                let symbol = self.resolve_identifier(reference.identifier);
                reference.symbol = symbol;

                let type_ = symbol.and_then(|symbol| self.table[symbol].type_.clone());
                if symbol.is_some() && type_.is_none() {
                    self.deferred += 1;
                }
                type_
            }
            BareExpression::FieldIndex(index) => {
                self.resolve_expression(&mut index.target);
                self.resolve_field(index)
            }
            BareExpression::Invocation(invocation) => {
                self.resolve_expression(&mut invocation.callee);

                for argument in &mut invocation.arguments {
                    self.resolve_expression(argument);
                }

                match &invocation.callee.type_ {
                    Some(TypeInfo::Procedure(procedure)) => Some(procedure.result.clone()),
                    _ => None,
                }
            }
            BareExpression::Infix(infix) => {
                self.resolve_expression(&mut infix.left);
                self.resolve_expression(&mut infix.right);

                match infix.operator.bare.class() {
                    Some(OperatorClass::Logical | OperatorClass::Relational) => {
                        Some(BuiltinType::Bool.into())
                    }
                    _ => infix.left.type_.clone(),
                }
            }
            BareExpression::Prefix(prefix) => {
                self.resolve_expression(&mut prefix.operand);
                let operand = prefix.operand.type_.clone();

                match prefix.operator.bare {
                    Operator::Bang => Some(BuiltinType::Bool.into()),
                    Operator::Caret => operand.map(TypeInfo::pointer),
                    Operator::Asterisk => match operand {
                        Some(TypeInfo::Pointer(pointee)) => Some(*pointee),
                        _ => None,
                    },
                    _ => operand,
                }
            }
            BareExpression::Cast(cast) => {
                self.resolve_expression(&mut cast.expression);
                self.resolve_type(&mut cast.type_.bare);
                Some(cast.type_.bare.clone())
            }
            BareExpression::Block(block) => {
                for node in &mut block.nodes {
                    self.resolve_node(node);
                }

                match block.nodes.last() {
                    Some(Node::Expression(last)) => last.type_.clone(),
                    _ => None,
                }
            }
            BareExpression::If(if_) => {
                self.resolve_expression(&mut if_.condition);
                self.resolve_expression(&mut if_.consequent);

                match &mut if_.alternative {
                    Some(alternative) => {
                        self.resolve_expression(alternative);
                        if_.consequent.type_.clone()
                    }
                    None => None,
                }
            }
            BareExpression::While(while_) => {
                self.resolve_expression(&mut while_.condition);
                self.resolve_expression(&mut while_.body);

                if let Some(alternative) = &mut while_.alternative {
                    self.resolve_expression(alternative);
                }

                None
            }
            BareExpression::New(new) => {
                self.resolve_type(&mut new.type_.bare);
                Some(TypeInfo::pointer(new.type_.bare.clone()))
            }
            BareExpression::Delete(delete) => {
                self.resolve_expression(&mut delete.operand);
                None
            }
            BareExpression::Defer(defer) => {
                self.resolve_node(&mut defer.node);
                None
            }
            BareExpression::Bool(_)
            | BareExpression::Integer(_)
            | BareExpression::Real(_)
            | BareExpression::Text(_)
            | BareExpression::Character(_)
            | BareExpression::Uninitialized => return,
        };

        expression.type_ = type_;
    }

    fn resolve_identifier(&mut self, identifier: Identifier) -> Option<SymbolIndex> {
        match self.lookup(identifier.bare) {
            Some(symbol) => Some(symbol),
            None => {
                let lookalike = self.lookalike(identifier.bare);

                self.error(
                    Diagnostic::error()
                        .code(ErrorCode::E020)
                        .message(format!(
                            "the binding {} is not defined in this scope",
                            identifier.bare.quote()
                        ))
                        .unlabeled_span(identifier)
                        .with(|error| match lookalike {
                            Some(lookalike) => error.help(format!(
                                "a binding with a similar name exists in scope: {}",
                                Lookalike {
                                    actual: identifier.bare,
                                    lookalike,
                                },
                            )),
                            None => error,
                        }),
                );
                None
            }
        }
    }

    /// Find the symbol with the given name that is visible at the current position.
    ///
    /// Only symbols already walked are visible. Among those, the innermost and latest
    /// declaration shadows the others. Globals are visible regardless of the position.
    fn lookup(&self, name: Atom) -> Option<SymbolIndex> {
        self.visible_symbols()
            .find(|&symbol| self.table[symbol].name == name)
            .or_else(|| self.table.lookup_global(name))
    }

    fn visible_symbols(&self) -> impl Iterator<Item = SymbolIndex> + '_ {
        self.scouts
            .iter()
            .rev()
            .chain(once(&self.root))
            .flat_map(move |scout| {
                self.table[scout.scope].children[..scout.position]
                    .iter()
                    .rev()
                    .copied()
            })
            .filter(move |&symbol| !self.table[symbol].is_scope())
    }

    /// Find a visible binding whose name is similar to the given one.
    fn lookalike(&self, name: Atom) -> Option<Atom> {
        let name = name.to_str();
        let globals = self.table.root().children.iter().copied();

        self.visible_symbols()
            .chain(globals)
            .filter(|&symbol| !self.table[symbol].is_scope())
            .map(|symbol| self.table[symbol].name)
            .find(|candidate| is_similar(name, candidate.to_str()))
    }

    /// Resolve the names inside of a type annotation.
    ///
    /// Named types have to refer to structs.
    fn resolve_type(&mut self, type_: &mut TypeInfo) {
        match type_ {
            TypeInfo::Builtin(_) | TypeInfo::Struct(_) => {}
            TypeInfo::Pointer(pointee) => self.resolve_type(pointee),
            TypeInfo::Procedure(procedure) => {
                for parameter in &mut procedure.parameters {
                    self.resolve_type(&mut parameter.type_);
                }
                self.resolve_type(&mut procedure.result);
            }
            TypeInfo::Qualified(qualified) => {
                let path = qualified.path;
                let Some(symbol) = self.resolve_identifier(path) else {
                    return;
                };

                if !self.table[symbol].is_struct() {
                    let declaration = self.table[symbol].span;
                    self.error(
                        Diagnostic::error()
                            .code(ErrorCode::E021)
                            .message(format!("the binding {} is not a type", path.bare.quote()))
                            .span(path, "used as a type here")
                            .label(declaration, "the binding is declared here")
                            .note("only structs can be named in type position"),
                    );
                    return;
                }

                qualified.symbol = Some(symbol);
            }
        }
    }

    /// The layout of the struct the given type refers to.
    fn layout(&self, type_: &TypeInfo) -> Layout {
        let symbol = match type_ {
            TypeInfo::Struct(struct_) => return Layout::Struct((**struct_).clone()),
            TypeInfo::Qualified(qualified) => match qualified.symbol {
                Some(symbol) => Some(symbol),
                // the field types of struct types stem from the declaration
                None => self.table.lookup_global(qualified.path.bare),
            },
            _ => return Layout::NotAStruct,
        };

        match symbol.and_then(|symbol| self.table[symbol].type_.as_ref()) {
            Some(TypeInfo::Struct(struct_)) => Layout::Struct((**struct_).clone()),
            _ => Layout::Unresolved,
        }
    }

    /// Resolve the access of a field yielding the type of the field.
    ///
    /// Accesses on targets whose type is unknown are skipped since any failure to infer
    /// the type was already reported.
    fn resolve_field(&mut self, index: &FieldIndex) -> Option<TypeInfo> {
        let target = index.target.type_.as_ref()?;

        let struct_ = match self.layout(target) {
            Layout::Struct(struct_) => struct_,
            Layout::NotAStruct => {
                self.error(
                    Diagnostic::error()
                        .code(ErrorCode::E022)
                        .message(format!(
                            "values of type {} do not have fields",
                            target.quote()
                        ))
                        .span(index.field, "cannot access this field")
                        .label(&index.target, format!("has type {}", target.quote())),
                );
                return None;
            }
            Layout::Unresolved => return None,
        };

        match struct_.field(index.field.bare) {
            Some(field) => Some(field.type_.clone()),
            None => {
                self.error(undefined_field_error(&struct_, index));
                None
            }
        }
    }
}

fn undefined_field_error(struct_: &StructType, index: &FieldIndex) -> Diagnostic {
    let field = index.field.bare;
    let lookalike = struct_
        .fields
        .iter()
        .map(|candidate| candidate.binder)
        .find(|candidate| is_similar(field.to_str(), candidate.to_str()));

    Diagnostic::error()
        .code(ErrorCode::E023)
        .message(format!(
            "the struct {} does not have a field named {}",
            struct_.binder.quote(),
            field.quote()
        ))
        .span(index.field, "undefined field")
        .with(|error| match lookalike {
            Some(lookalike) => error.help(format!(
                "a field with a similar name exists: {}",
                Lookalike {
                    actual: field,
                    lookalike,
                }
            )),
            None => error,
        })
}

/// A cursor into the ordered symbols of a scope.
struct Scout {
    scope: SymbolIndex,
    /// The number of symbols already walked.
    position: usize,
}

impl Scout {
    const fn new(scope: SymbolIndex) -> Self {
        Self { scope, position: 0 }
    }
}

enum Layout {
    Struct(StructType),
    NotAStruct,
    Unresolved,
}

fn is_similar(identifier: &str, other_identifier: &str) -> bool {
    strsim::levenshtein(other_identifier, identifier) <= std::cmp::max(identifier.len(), 3) / 3
}

struct Lookalike {
    actual: Atom,
    lookalike: Atom,
}

impl Lookalike {
    fn render(&self, painter: &mut Painter) -> io::Result<()> {
        use difference::{Changeset, Difference};
        use std::io::Write;

        let actual = self.actual.to_str();
        let changeset = Changeset::new(actual, self.lookalike.to_str(), "");
        let mut purely_additive = true;

        write!(painter, "‘")?;

        for difference in &changeset.diffs {
            match difference {
                Difference::Same(segment) => write!(painter, "{segment}")?,
                Difference::Add(segment) => {
                    painter.set(Effects::BOLD)?;
                    write!(painter, "{segment}")?;
                    painter.unset()?;
                }
                Difference::Rem(_) => {
                    purely_additive = false;
                }
            }
        }

        write!(painter, "’")?;

        if !(purely_additive || actual.width() == 1 && changeset.distance == 2) {
            write!(painter, " (instead of {})", self.actual.quote())?;
        }

        Ok(())
    }
}

impl fmt::Display for Lookalike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lookalike = paint_to_string(|painter| self.render(painter), ColorChoice::Auto)
            .map_err(|_| fmt::Error)?;

        f.write_str(&lookalike)
    }
}
