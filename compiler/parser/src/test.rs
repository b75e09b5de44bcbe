use ast::{BareDeclaration, BareExpression, BindingKind, Declaration, Expression, Node, TypeInfo};
use diagnostics::{reporter::Buffer, ErrorCode, Reporter};
use lexer::{BuiltinType, Operator};
use span::{span, FileName, SourceMap, Span};
use utility::difference;

struct Parsed {
    nodes: Vec<Node>,
    errors: Vec<(Option<ErrorCode>, Span)>,
}

impl Parsed {
    #[track_caller]
    fn assert_clean(&self) {
        assert!(
            self.errors.is_empty(),
            "unexpected errors: {:?}",
            self.errors
        );
    }

    #[track_caller]
    fn assert_error(&self, code: ErrorCode, span: Span) {
        assert!(
            self.errors.contains(&(Some(code), span)),
            "expected the error {code} at {span:?} but got {:?}",
            self.errors
        );
    }

    fn rendered(&self) -> Vec<String> {
        self.nodes
            .iter()
            .map(|node| render(expression(node)))
            .collect()
    }
}

fn parse(source: &str) -> Parsed {
    let mut map = SourceMap::default();
    let file = map.add_str(FileName::Anonymous, source);
    let buffer = Buffer::default();
    let reporter = Reporter::buffer(buffer.clone());

    let tokens = lexer::lex(&map[file], &reporter).bare;
    let nodes = super::parse(tokens, file, &map, &reporter).bare.nodes;

    let errors = buffer
        .lock()
        .unwrap()
        .iter()
        .map(|diagnostic| (diagnostic.code, diagnostic.primary_span().unwrap()))
        .collect();

    Parsed { nodes, errors }
}

#[track_caller]
fn expression(node: &Node) -> &Expression {
    match node {
        Node::Expression(expression) => expression,
        _ => panic!("expected an expression but got {node:?}"),
    }
}

#[track_caller]
fn declaration(node: &Node) -> &Declaration {
    match node {
        Node::Declaration(declaration) => declaration,
        _ => panic!("expected a declaration but got {node:?}"),
    }
}

/// Render an expression with explicit grouping.
fn render(expression: &Expression) -> String {
    use BareExpression::*;

    match &expression.bare {
        Bool(value) => value.to_string(),
        Integer(literal) => literal.value.to_string(),
        Identifier(reference) => reference.identifier.bare.to_string(),
        Infix(infix) => format!(
            "({} {} {})",
            render(&infix.left),
            infix.operator.bare,
            render(&infix.right)
        ),
        Prefix(prefix) => format!("({}{})", prefix.operator.bare, render(&prefix.operand)),
        Cast(cast) => format!("({} as {})", render(&cast.expression), cast.type_.bare),
        FieldIndex(index) => format!("{}.{}", render(&index.target), index.field.bare),
        Invocation(invocation) => format!(
            "{}({})",
            render(&invocation.callee),
            invocation
                .arguments
                .iter()
                .map(render)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        _ => format!("{expression:?}"),
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let parsed = parse("a + b * c");
    parsed.assert_clean();
    assert_eq!(parsed.rendered(), ["(a + (b * c))"]);
}

#[test]
fn subtraction_is_left_associative() {
    let parsed = parse("a - b - c");
    parsed.assert_clean();
    assert_eq!(parsed.rendered(), ["((a - b) - c)"]);
}

#[test]
fn logical_operators_bind_weakest() {
    let parsed = parse("a < b && c == d << 1");
    parsed.assert_clean();
    assert_eq!(parsed.rendered(), ["((a < b) && (c == (d << 1)))"]);
}

#[test]
fn prefix_operators_bind_tighter_than_infix_operators() {
    let parsed = parse("-a * *b");
    parsed.assert_clean();
    assert_eq!(parsed.rendered(), ["((-a) * (*b))"]);
}

#[test]
fn operator_on_next_line_does_not_continue_expression() {
    let parsed = parse("a\n- b");
    parsed.assert_clean();
    assert_eq!(parsed.rendered(), ["a", "(-b)"]);
}

#[test]
fn infix_operator_on_next_line_starts_new_statement() {
    let parsed = parse("a\n+ b");
    assert_eq!(parsed.errors, [(Some(ErrorCode::E010), span(3, 4))]);
    assert_eq!(parsed.rendered(), ["a", "b"]);
}

#[test]
fn operator_at_end_of_line_continues_expression() {
    let parsed = parse("a +\nb");
    parsed.assert_clean();
    assert_eq!(parsed.rendered(), ["(a + b)"]);
}

#[test]
fn suffixes_chain() {
    let parsed = parse("f(x).y(1, 2,) as *s8\n-p.x");
    parsed.assert_clean();
    assert_eq!(parsed.rendered(), ["(f(x).y(1, 2) as *s8)", "(-p.x)"]);
}

#[test]
fn cast_is_typed_with_its_target_type() {
    let parsed = parse("x as real");
    parsed.assert_clean();
    assert_eq!(
        expression(&parsed.nodes[0]).type_,
        Some(BuiltinType::Real.into())
    );
}

#[test]
fn semicolons_separate_statements() {
    let parsed = parse("a; b;; c");
    parsed.assert_clean();
    assert_eq!(parsed.rendered(), ["a", "b", "c"]);
}

#[test]
fn operator_assignment() {
    let parsed = parse("p.x += 1");
    parsed.assert_clean();

    let Node::Assignment(assignment) = &parsed.nodes[0] else {
        panic!("expected an assignment");
    };
    assert_eq!(render(&assignment.target), "p.x");
    assert_eq!(
        assignment.operator.map(|operator| operator.bare),
        Some(Operator::Plus)
    );
    assert_eq!(assignment.span, span(1, 9));
}

#[test]
fn assignment_to_dereferenced_pointer() {
    let parsed = parse("*p = 0");
    parsed.assert_clean();
    assert!(matches!(&parsed.nodes[0], Node::Assignment(assignment) if assignment.operator.is_none()));
}

#[test]
fn invalid_assignment_target() {
    let parsed = parse("1 = 2");
    assert_eq!(parsed.errors, [(Some(ErrorCode::E016), span(1, 2))]);
    assert!(parsed.nodes.is_empty());
}

#[test]
fn trailing_comma_in_arguments() {
    let parsed = parse("f(a, b,)");
    parsed.assert_clean();
    assert_eq!(parsed.rendered(), ["f(a, b)"]);
}

#[test]
fn comma_without_preceeding_element() {
    parse("f(,)").assert_error(ErrorCode::E014, span(3, 4));
}

#[test]
fn consecutive_commas() {
    parse("f(a,,)").assert_error(ErrorCode::E014, span(5, 6));
}

#[test]
fn unclosed_argument_list() {
    parse("f(a, b").assert_error(ErrorCode::E017, span(2, 3));
}

#[test]
fn unclosed_block() {
    parse("proc main() {\n    1").assert_error(ErrorCode::E017, span(13, 14));
}

#[test]
fn procedure_declaration() {
    let parsed = parse("proc id(x: s32) -> s32 = x");
    parsed.assert_clean();

    let actual = format!("{:?}", parsed.nodes[0]);
    let expected = "\
Procedure 1..27
    binder: id 6..8
    parameters:
        Binding 9..10
            kind: parameter
            binder: x 9..10
            type: s32 12..15
            initializer: none
            symbol: none
    is-variadic: false
    result: s32 20..23
    body: Identifier 26..27
        binder: x 26..27
        symbol: none
    is-extern: false
    symbol: none";

    if actual != expected {
        panic!(
            "the formatted tree differs:\n{}",
            difference(expected, &actual, "\n")
        );
    }
}

#[test]
fn operator_procedure_with_block_body() {
    let parsed = parse("proc + (a: s32, b: s32) -> s32 { a }");
    parsed.assert_clean();

    let BareDeclaration::Procedure(procedure) = &declaration(&parsed.nodes[0]).bare else {
        panic!("expected a procedure");
    };
    assert_eq!(procedure.binder.map(|binder| binder.bare), Some("+".into()));
    assert!(matches!(
        procedure.body.as_ref().map(|body| &body.bare),
        Some(BareExpression::Block(_))
    ));
}

#[test]
fn extern_procedure() {
    let parsed = parse("extern proc printf(format: *s8, ...) -> s32");
    parsed.assert_clean();

    let BareDeclaration::Procedure(procedure) = &declaration(&parsed.nodes[0]).bare else {
        panic!("expected a procedure");
    };
    assert!(procedure.is_extern);
    assert!(procedure.is_variadic);
    assert!(procedure.body.is_none());
    assert_eq!(procedure.type_().to_string(), "(format: *s8, ...) -> s32");
}

#[test]
fn extern_without_procedure() {
    let parsed = parse("extern struct S {}");
    parsed.assert_error(ErrorCode::E010, span(8, 14));
}

#[test]
fn misplaced_variadic_marker() {
    parse("extern proc f(..., x: s32)").assert_error(ErrorCode::E010, span(15, 18));
}

#[test]
fn procedure_without_name() {
    let parsed = parse("proc (x: s32) {}");
    assert_eq!(parsed.errors, [(Some(ErrorCode::E011), span(1, 5))]);

    let BareDeclaration::Procedure(procedure) = &declaration(&parsed.nodes[0]).bare else {
        panic!("expected a procedure");
    };
    assert!(procedure.binder.is_none());
    assert_eq!(procedure.parameters.len(), 1);
}

#[test]
fn procedure_with_invalid_name() {
    let parsed = parse("proc 1(x: s32) {}");
    assert_eq!(parsed.errors, [(Some(ErrorCode::E011), span(6, 7))]);
    assert_eq!(parsed.nodes.len(), 1);
}

#[test]
fn stray_procedure_keyword() {
    let parsed = parse("proc 1 + 2");
    assert_eq!(parsed.errors, [(Some(ErrorCode::E011), span(1, 5))]);
    assert_eq!(parsed.rendered(), ["(1 + 2)"]);
}

#[test]
fn procedure_without_type() {
    let parsed = parse("proc main {}");
    assert_eq!(parsed.errors, [(Some(ErrorCode::E012), span(1, 5))]);
}

#[test]
fn procedure_without_body() {
    let parsed = parse("proc main() -> s32");
    assert_eq!(parsed.errors, [(Some(ErrorCode::E012), span(1, 5))]);
    assert!(parsed.nodes.is_empty());
}

#[test]
fn struct_declaration() {
    let parsed = parse("struct Point { x: s32, y: s32; z: *Point }");
    parsed.assert_clean();

    let BareDeclaration::Struct(struct_) = &declaration(&parsed.nodes[0]).bare else {
        panic!("expected a struct");
    };
    assert_eq!(struct_.binder.map(|binder| binder.bare), Some("Point".into()));
    assert_eq!(struct_.fields.len(), 3);
    assert!(struct_
        .fields
        .iter()
        .all(|field| field.kind == BindingKind::Field));
    assert_eq!(struct_.fields[2].declared_type().to_string(), "*Point");
}

#[test]
fn struct_without_name() {
    let parsed = parse("struct { x: s32 }");
    assert_eq!(parsed.errors, [(Some(ErrorCode::E013), span(1, 7))]);

    let BareDeclaration::Struct(struct_) = &declaration(&parsed.nodes[0]).bare else {
        panic!("expected a struct");
    };
    assert!(struct_.binder.is_none());
    assert_eq!(struct_.fields.len(), 1);
}

#[test]
fn qualified_path_with_several_segments() {
    parse("let x: a.b.c = 1").assert_error(ErrorCode::E015, span(8, 13));
}

#[test]
fn bindings() {
    let parsed = parse("var x: s32 = ---\nlet y = 2");
    parsed.assert_clean();

    let BareDeclaration::Binding(x) = &declaration(&parsed.nodes[0]).bare else {
        panic!("expected a binding");
    };
    assert_eq!(x.kind, BindingKind::Var);
    assert_eq!(x.declared_type(), BuiltinType::S32.into());
    assert!(matches!(
        x.initializer.as_ref().map(|initializer| &initializer.bare),
        Some(BareExpression::Uninitialized)
    ));

    let BareDeclaration::Binding(y) = &declaration(&parsed.nodes[1]).bare else {
        panic!("expected a binding");
    };
    assert_eq!(y.kind, BindingKind::Let);
    assert!(y.type_.is_none());
    assert_eq!(declaration(&parsed.nodes[1]).span, span(18, 27));
}

#[test]
fn procedure_type() {
    let parsed = parse("let f: (*s8, count: int) -> bool\nlet g: ()");
    parsed.assert_clean();

    let types: Vec<_> = parsed
        .nodes
        .iter()
        .map(|node| match &declaration(node).bare {
            BareDeclaration::Binding(binding) => binding.declared_type().to_string(),
            _ => panic!("expected a binding"),
        })
        .collect();
    assert_eq!(types, ["(*s8, count: int) -> bool", "()"]);
}

#[test]
fn load_directive() {
    let parsed = parse("#load \"io.cad\"");
    parsed.assert_clean();

    let BareDeclaration::Load(load) = &declaration(&parsed.nodes[0]).bare else {
        panic!("expected a load directive");
    };
    assert_eq!(load.path.bare, "io.cad".into());
    assert_eq!(load.path.span, span(7, 15));
}

#[test]
fn character_directive() {
    let parsed = parse("#char \"ö\"");
    parsed.assert_clean();

    let expression = expression(&parsed.nodes[0]);
    assert!(matches!(expression.bare, BareExpression::Character('ö')));
    assert_eq!(expression.type_, Some(BuiltinType::U32.into()));
}

#[test]
fn character_directive_with_several_characters() {
    let parsed = parse("#char \"ab\"");
    assert_eq!(parsed.errors, [(None, span(7, 11))]);
}

#[test]
fn literals_are_typed() {
    let parsed = parse("1 2.5 \"s\" 'c' true");
    parsed.assert_clean();

    let types: Vec<_> = parsed
        .nodes
        .iter()
        .map(|node| expression(node).type_.clone())
        .collect();
    assert_eq!(
        types,
        [
            Some(BuiltinType::Int.into()),
            Some(BuiltinType::Real.into()),
            Some(TypeInfo::pointer(BuiltinType::S8.into())),
            Some(BuiltinType::U32.into()),
            Some(BuiltinType::Bool.into()),
        ]
    );
}

#[test]
fn conditionals_and_loops() {
    let parsed = parse("if a b else c\nuntil done { step() }");
    parsed.assert_clean();

    let BareExpression::If(if_) = &expression(&parsed.nodes[0]).bare else {
        panic!("expected a conditional");
    };
    assert!(!if_.is_negated);
    assert_eq!(if_.alternative.as_ref().map(render), Some("c".to_owned()));

    let BareExpression::While(while_) = &expression(&parsed.nodes[1]).bare else {
        panic!("expected a loop");
    };
    assert!(while_.is_negated);
    assert_eq!(render(&while_.condition), "done");
}

#[test]
fn memory_management() {
    let parsed = parse("let p = new s32\ndefer delete p");
    parsed.assert_clean();

    let BareDeclaration::Binding(binding) = &declaration(&parsed.nodes[0]).bare else {
        panic!("expected a binding");
    };
    assert_eq!(
        binding
            .initializer
            .as_ref()
            .and_then(|initializer| initializer.type_.clone()),
        Some(TypeInfo::pointer(BuiltinType::S32.into()))
    );

    let BareExpression::Defer(defer) = &expression(&parsed.nodes[1]).bare else {
        panic!("expected a deferral");
    };
    assert!(matches!(
        &defer.node,
        Node::Expression(Expression {
            bare: BareExpression::Delete(_),
            ..
        })
    ));
}

#[test]
fn unparsable_tokens_are_skipped() {
    let parsed = parse(") a");
    assert_eq!(parsed.errors, [(Some(ErrorCode::E010), span(1, 2))]);
    assert_eq!(parsed.rendered(), ["a"]);
}
