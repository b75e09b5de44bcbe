use crate::{
    BareExpression, Binding, BindingKind, Block, Expression, FieldIndex, Node, ParameterType,
    Prefix, Procedure, ProcedureType, Reference, StructType, TypeInfo,
};
use lexer::{BuiltinType, Operator};
use span::{span, Spanned};
use utility::{difference, Atom};

fn identifier(start: u32, name: &str) -> Expression {
    #[allow(clippy::cast_possible_truncation)]
    let end = start + name.len() as u32;

    Expression::new(
        span(start, end),
        Reference {
            identifier: Spanned::new(span(start, end), name.into()),
            symbol: None,
        }
        .into(),
    )
}

fn parameter(name: &str, type_: BuiltinType) -> Binding {
    Binding {
        kind: BindingKind::Parameter,
        binder: Spanned::new(span(1, 2), name.into()),
        type_: Some(Spanned::new(span(3, 4), type_.into())),
        initializer: None,
        symbol: None,
    }
}

#[track_caller]
fn assert_format(node: &Node, expected: &str) {
    let actual = format!("{node:?}");

    if actual != expected {
        panic!(
            "the formatted tree differs:\n{}",
            difference(expected, &actual, "\n")
        );
    }
}

#[test]
fn type_display() {
    assert_eq!(TypeInfo::pointer(BuiltinType::S8.into()).to_string(), "*s8");

    let procedure: TypeInfo = ProcedureType {
        parameters: vec![
            ParameterType {
                binder: Some(Atom::from("format")),
                type_: TypeInfo::pointer(BuiltinType::S8.into()),
            },
            ParameterType {
                binder: None,
                type_: BuiltinType::Int.into(),
            },
        ],
        is_variadic: true,
        result: BuiltinType::S32.into(),
    }
    .into();
    assert_eq!(procedure.to_string(), "(format: *s8, int, ...) -> s32");

    let void_procedure: TypeInfo = ProcedureType {
        parameters: Vec::new(),
        is_variadic: false,
        result: TypeInfo::VOID,
    }
    .into();
    assert_eq!(void_procedure.to_string(), "()");

    let struct_: TypeInfo = StructType {
        binder: "Point".into(),
        fields: Vec::new(),
    }
    .into();
    assert_eq!(struct_.to_string(), "Point");
}

#[test]
fn procedure_signature() {
    let procedure = Procedure {
        binder: Some(Spanned::new(span(6, 9), "add".into())),
        parameters: vec![
            parameter("a", BuiltinType::S32),
            parameter("_", BuiltinType::S32),
        ],
        is_variadic: false,
        result: Some(Spanned::new(span(20, 23), BuiltinType::S32.into())),
        body: None,
        is_extern: true,
        symbol: None,
    };

    assert!(procedure.returns_value());
    assert_eq!(procedure.type_().to_string(), "(a: s32, s32) -> s32");

    let procedure = Procedure {
        result: Some(Spanned::new(span(20, 24), TypeInfo::VOID)),
        ..procedure
    };
    assert!(!procedure.returns_value());
}

#[test]
fn places() {
    assert!(identifier(1, "x").is_place());

    let field = Expression::new(
        span(1, 4),
        FieldIndex {
            target: identifier(1, "p"),
            field: Spanned::new(span(3, 4), "x".into()),
        }
        .into(),
    );
    assert!(field.is_place());

    let dereference = Expression::new(
        span(1, 3),
        Prefix {
            operator: Spanned::new(span(1, 2), Operator::Asterisk),
            operand: identifier(2, "p"),
        }
        .into(),
    );
    assert!(dereference.is_place());

    let negation = Expression::new(
        span(1, 3),
        Prefix {
            operator: Spanned::new(span(1, 2), Operator::Minus),
            operand: identifier(2, "p"),
        }
        .into(),
    );
    assert!(!negation.is_place());
    assert!(!Expression::new(span(1, 5), BareExpression::Bool(true)).is_place());
}

#[test]
fn format_block_with_metadata() {
    let mut value = identifier(3, "x");
    value.type_ = Some(BuiltinType::S32.into());
    value.result_required = true;
    value.tail_position = true;

    let block = Node::Expression(Expression::new(
        span(1, 6),
        Block {
            nodes: vec![value.into()],
        }
        .into(),
    ));

    assert_format(
        &block,
        "\
Block 1..6
    nodes:
        Identifier 3..4 : s32 [required, tail]
            binder: x 3..4
            symbol: none",
    );
}

#[test]
fn format_empty_block() {
    let block = Node::Expression(
        Expression::new(span(1, 3), Block { nodes: Vec::new() }.into())
            .typed(TypeInfo::VOID),
    );

    assert_format(
        &block,
        "\
Block 1..3 : void
    nodes: []",
    );
}
