use super::{loader::normalize, MemoryLoader, Options, Pass, Session, Unit};
use ast::{BareDeclaration, BareExpression, Expression, Node};
use diagnostics::{reporter::Buffer, ErrorCode, Reporter};
use lexer::BuiltinType;
use span::{span, Span};
use std::path::{Path, PathBuf};
use utility::default;

struct Checked {
    unit: Option<Unit>,
    errors: Vec<(Option<ErrorCode>, Option<Span>)>,
}

impl Checked {
    #[track_caller]
    fn unit(&self) -> &Unit {
        match &self.unit {
            Some(unit) => unit,
            None => panic!("the check failed with {:?}", self.errors),
        }
    }
}

fn check(options: Options, loader: &MemoryLoader, paths: &[&str]) -> Checked {
    let buffer = Buffer::default();
    let session = Session::new(options, default(), Reporter::buffer(buffer.clone()));
    let paths: Vec<_> = paths.iter().map(PathBuf::from).collect();

    let unit = session.check(&paths, loader).ok();
    assert_eq!(unit.is_none(), session.reporter().has_errors());

    let errors = buffer
        .lock()
        .unwrap()
        .iter()
        .map(|diagnostic| (diagnostic.code, diagnostic.primary_span()))
        .collect();

    Checked { unit, errors }
}

fn check_source(options: Options, source: &str) -> Checked {
    check(options, &MemoryLoader::new().file("main.cad", source), &["main.cad"])
}

/// The last expression of the body of the first procedure of the first file.
#[track_caller]
fn tail(unit: &Unit) -> &Expression {
    let body = unit.files[0]
        .nodes
        .iter()
        .find_map(|node| match node {
            Node::Declaration(declaration) => match &declaration.bare {
                BareDeclaration::Procedure(procedure) => procedure.body.as_ref(),
                _ => None,
            },
            _ => None,
        })
        .expect("no procedure with a body");

    match &body.bare {
        BareExpression::Block(block) => match block.nodes.last() {
            Some(Node::Expression(expression)) => expression,
            node => panic!("expected an expression but got {node:?}"),
        },
        _ => body,
    }
}

#[test]
fn struct_field_access_end_to_end() {
    let checked = check_source(
        default(),
        "struct P { x: s32 } proc main() -> s32 { let p = P; p.x }",
    );

    let tail = tail(checked.unit());
    assert_eq!(tail.type_, Some(BuiltinType::S32.into()));
    assert!(tail.result_required);
    assert!(tail.tail_position);
}

#[test]
fn loaded_files_share_their_globals() {
    let loader = MemoryLoader::new()
        .file(
            "main.cad",
            "#load \"lib/helper.cad\"\nproc main() -> s32 = helper()",
        )
        .file(
            "lib/helper.cad",
            "#load \"../main.cad\"\nproc helper() -> s32 = 0",
        );
    let checked = check(default(), &loader, &["main.cad"]);
    let unit = checked.unit();

    assert_eq!(unit.files.len(), 2);
    assert_eq!(tail(unit).type_, Some(BuiltinType::S32.into()));
    assert!(unit.table.lookup_global("helper".into()).is_some());
}

#[test]
fn files_are_loaded_once() {
    let loader = MemoryLoader::new().file("a.cad", "let a = 1");
    let checked = check(default(), &loader, &["a.cad", "./a.cad", "b/../a.cad"]);

    assert_eq!(checked.unit().files.len(), 1);
}

#[test]
fn missing_file() {
    let checked = check(default(), &MemoryLoader::new(), &["missing.cad"]);
    assert_eq!(checked.errors, [(Some(ErrorCode::E030), None)]);
}

#[test]
fn missing_loaded_file() {
    let checked = check_source(default(), "#load \"gone.cad\"\nproc main() = 0");
    assert_eq!(checked.errors, [(Some(ErrorCode::E030), Some(span(7, 17)))]);
}

#[test]
fn lexer_errors_halt_before_parsing() {
    let checked = check_source(default(), "proc main() = 0b102 + undefined");

    assert!(checked.unit.is_none());
    assert_eq!(checked.errors.len(), 1);
    assert_eq!(checked.errors[0].0, Some(ErrorCode::E002));
}

#[test]
fn parser_errors_halt_before_resolution() {
    let checked = check_source(default(), "struct { x: s32 }\nproc main() = undefined");

    assert!(checked.unit.is_none());
    assert_eq!(checked.errors, [(Some(ErrorCode::E013), Some(span(1, 7)))]);
}

#[test]
fn resolver_errors_fail_the_check() {
    let checked = check_source(default(), "proc main() = undefined");
    assert_eq!(checked.errors, [(Some(ErrorCode::E020), Some(span(15, 24)))]);
}

#[test]
fn halt_after_lexer() {
    let options = Options {
        halt_after: Some(Pass::Lexer),
        ..default()
    };
    let checked = check_source(options, "proc main() = undefined");

    let unit = checked.unit();
    assert!(unit.files.is_empty());
    assert_eq!(unit.table.len(), 1);
}

#[test]
fn halt_after_parser() {
    let options = Options {
        halt_after: Some(Pass::Parser),
        ..default()
    };
    let checked = check_source(options, "proc main() = undefined");

    let unit = checked.unit();
    assert_eq!(unit.files.len(), 1);
    assert_eq!(unit.table.len(), 1);
}

#[test]
fn halt_after_annotator() {
    let options = Options {
        halt_after: Some(Pass::Annotator),
        ..default()
    };
    let checked = check_source(options, "proc main() = undefined");

    let unit = checked.unit();
    assert!(unit.table.lookup_global("main".into()).is_some());
    assert_eq!(tail(unit).type_, None);
}

#[test]
fn pass_names() {
    assert_eq!("annotator".parse::<Pass>(), Ok(Pass::Annotator));
    assert_eq!("typer".parse::<Pass>(), Err(()));
    assert!(Pass::Lexer < Pass::Resolver);
}

#[test]
fn normalization() {
    assert_eq!(normalize(Path::new("./lib/../main.cad")), Path::new("main.cad"));
    assert_eq!(normalize(Path::new("../main.cad")), Path::new("../main.cad"));
    assert_eq!(normalize(Path::new("/lib/./io.cad")), Path::new("/lib/io.cad"));
}
