use crate::{BareToken, BareToken::*, Keyword, Operator, Radix};
use diagnostics::{reporter::Buffer, ErrorCode, Reporter};
use span::{span, FileName, SourceMap, Spanned};
use utility::difference;

#[derive(PartialEq, Eq, Debug)]
struct Lexed {
    tokens: Vec<Spanned<BareToken>>,
    errors: Vec<Spanned<ErrorCode>>,
}

fn lex(source: &str) -> Lexed {
    let mut map = SourceMap::default();
    let file = map.add_str(FileName::Anonymous, source);
    let buffer = Buffer::default();
    let reporter = Reporter::buffer(buffer.clone());

    let tokens = super::lex(&map[file], &reporter).bare;

    let errors = buffer
        .lock()
        .unwrap()
        .iter()
        .map(|diagnostic| {
            Spanned::new(
                diagnostic.primary_span().unwrap(),
                diagnostic.code.unwrap(),
            )
        })
        .collect();

    Lexed {
        tokens: tokens
            .into_iter()
            .map(|token| Spanned::new(token.span, token.bare))
            .collect(),
        errors,
    }
}

macro_rules! assert_lex_eq {
    ($source:expr, $tokens:expr $(,)?) => {
        assert_lex_eq!($source, $tokens, Vec::new())
    };
    ($source:expr, $tokens:expr, $errors:expr $(,)?) => {
        assert_eq(
            lex($source),
            Lexed {
                tokens: $tokens,
                errors: $errors,
            },
        )
    };
}

#[track_caller]
fn assert_eq(actual: Lexed, expected: Lexed) {
    if actual != expected {
        panic!(
            "the output by the lexer does not match the expected one:\n{}",
            difference(&format!("{expected:#?}"), &format!("{actual:#?}"), "\n"),
        );
    }
}

fn token(start: u32, end: u32, bare: BareToken) -> Spanned<BareToken> {
    Spanned::new(span(start, end), bare)
}

fn error(start: u32, end: u32, code: ErrorCode) -> Spanned<ErrorCode> {
    Spanned::new(span(start, end), code)
}

fn integer(digits: &str, radix: Radix) -> BareToken {
    Integer {
        digits: digits.into(),
        radix,
    }
}

#[test]
fn empty_source() {
    assert_lex_eq!("", vec![token(1, 1, EndOfInput)]);
}

#[test]
fn keywords_identifiers_and_builtin_types() {
    assert_lex_eq!(
        "proc main _ s32 _x",
        vec![
            token(1, 5, Keyword(Keyword::Proc)),
            token(6, 10, Identifier("main".into())),
            token(11, 12, Wildcard),
            token(13, 16, BuiltinTypeName(crate::BuiltinType::S32)),
            token(17, 19, Identifier("_x".into())),
            token(19, 19, EndOfInput),
        ],
    );
}

#[test]
fn identifiers_may_contain_non_ascii_letters_and_marks() {
    assert_lex_eq!(
        "größe e\u{301}",
        vec![
            token(1, 8, Identifier("größe".into())),
            token(9, 12, Identifier("e\u{301}".into())),
            token(12, 12, EndOfInput),
        ],
    );
}

#[test]
fn operators_take_the_longest_match() {
    assert_lex_eq!(
        "< <= << <<=",
        vec![
            token(1, 2, Operator(Operator::Less)),
            token(3, 5, Operator(Operator::LessEqual)),
            token(6, 8, Operator(Operator::ShiftLeft)),
            token(9, 12, Operator(Operator::ShiftLeftAssign)),
            token(12, 12, EndOfInput),
        ],
    );
}

#[test]
fn unordered_comparison_operators() {
    assert_lex_eq!(
        "!<>= !<> !x",
        vec![
            token(1, 5, Operator(Operator::NotLessGreaterEqual)),
            token(6, 9, Operator(Operator::NotLessGreater)),
            token(10, 11, Operator(Operator::Bang)),
            token(11, 12, Identifier("x".into())),
            token(12, 12, EndOfInput),
        ],
    );
}

#[test]
fn assignment_and_arrow() {
    assert_lex_eq!(
        "x=-1 -> ==",
        vec![
            token(1, 2, Identifier("x".into())),
            token(2, 3, Assign),
            token(3, 4, Operator(Operator::Minus)),
            token(4, 5, integer("1", Radix::Decimal)),
            token(6, 8, ThinArrowRight),
            token(9, 11, Operator(Operator::Equal)),
            token(11, 11, EndOfInput),
        ],
    );
}

#[test]
fn comment_terminates_operator() {
    assert_lex_eq!(
        "+/# hi",
        vec![
            token(1, 2, Operator(Operator::Plus)),
            token(7, 7, EndOfInput),
        ],
    );
}

#[test]
fn dots_and_dashes() {
    assert_lex_eq!(
        "... --- .. .",
        vec![
            token(1, 4, Varargs),
            token(5, 8, Uninitialized),
            token(9, 11, RangeOf),
            token(12, 13, Dot),
            token(13, 13, EndOfInput),
        ],
    );
}

#[test]
fn punctuation() {
    assert_lex_eq!(
        "([{,:;}])",
        vec![
            token(1, 2, OpeningRoundBracket),
            token(2, 3, OpeningSquareBracket),
            token(3, 4, OpeningCurlyBracket),
            token(4, 5, Comma),
            token(5, 6, Colon),
            token(6, 7, Semicolon),
            token(7, 8, ClosingCurlyBracket),
            token(8, 9, ClosingSquareBracket),
            token(9, 10, ClosingRoundBracket),
            token(10, 10, EndOfInput),
        ],
    );
}

#[test]
fn comments() {
    assert_lex_eq!(
        "a /# comment\nb /* c \n d */ c",
        vec![
            token(1, 2, Identifier("a".into())),
            token(14, 15, Identifier("b".into())),
            token(28, 29, Identifier("c".into())),
            token(29, 29, EndOfInput),
        ],
    );
}

#[test]
fn unterminated_block_comment() {
    assert_lex_eq!(
        "/* x",
        vec![token(5, 5, EndOfInput)],
        vec![error(1, 5, ErrorCode::E005)],
    );
}

#[test]
fn binary_literal_with_invalid_digit() {
    assert_lex_eq!(
        "0b1012",
        vec![
            token(1, 7, integer("1012", Radix::Binary)),
            token(7, 7, EndOfInput),
        ],
        vec![error(6, 7, ErrorCode::E002)],
    );
}

#[test]
fn adjacent_invalid_digits_are_reported_separately() {
    assert_lex_eq!(
        "0b1023",
        vec![
            token(1, 7, integer("1023", Radix::Binary)),
            token(7, 7, EndOfInput),
        ],
        vec![error(5, 6, ErrorCode::E002), error(6, 7, ErrorCode::E002)],
    );
}

#[test]
fn hexadecimal_literal() {
    assert_lex_eq!(
        "0xFF_a0",
        vec![
            token(1, 8, integer("FFa0", Radix::Hexadecimal)),
            token(8, 8, EndOfInput),
        ],
    );
}

#[test]
fn radix_prefix_without_digits() {
    assert_lex_eq!(
        "0x",
        vec![
            token(1, 3, integer("", Radix::Hexadecimal)),
            token(3, 3, EndOfInput),
        ],
        vec![error(1, 3, ErrorCode::E002)],
    );
}

#[test]
fn identifier_characters_are_absorbed_into_number_literal() {
    assert_lex_eq!(
        "10asdf",
        vec![
            token(1, 7, integer("10asdf", Radix::Decimal)),
            token(7, 7, EndOfInput),
        ],
        vec![
            error(3, 4, ErrorCode::E002),
            error(4, 5, ErrorCode::E002),
            error(5, 6, ErrorCode::E002),
            error(6, 7, ErrorCode::E002),
        ],
    );
}

#[test]
fn well_placed_digit_separator() {
    assert_lex_eq!(
        "1_000",
        vec![
            token(1, 6, integer("1000", Radix::Decimal)),
            token(6, 6, EndOfInput),
        ],
    );
}

#[test]
fn leading_digit_separator() {
    assert_lex_eq!(
        "_100",
        vec![
            token(1, 5, integer("100", Radix::Decimal)),
            token(5, 5, EndOfInput),
        ],
        vec![error(1, 2, ErrorCode::E003)],
    );
}

#[test]
fn trailing_digit_separator() {
    assert_lex_eq!(
        "100_",
        vec![
            token(1, 5, integer("100", Radix::Decimal)),
            token(5, 5, EndOfInput),
        ],
        vec![error(4, 5, ErrorCode::E003)],
    );
}

#[test]
fn consecutive_digit_separators() {
    assert_lex_eq!(
        "1__0",
        vec![
            token(1, 5, integer("10", Radix::Decimal)),
            token(5, 5, EndOfInput),
        ],
        vec![error(2, 4, ErrorCode::E003)],
    );
}

#[test]
fn real_literals() {
    assert_lex_eq!(
        "1.5e-3 1_0.2_5 2E8",
        vec![
            token(1, 7, Real("1.5e-3".into())),
            token(8, 15, Real("10.25".into())),
            token(16, 19, Real("2E8".into())),
            token(19, 19, EndOfInput),
        ],
    );
}

#[test]
fn range_between_integers() {
    assert_lex_eq!(
        "1..5",
        vec![
            token(1, 2, integer("1", Radix::Decimal)),
            token(2, 4, RangeOf),
            token(4, 5, integer("5", Radix::Decimal)),
            token(5, 5, EndOfInput),
        ],
    );
}

#[test]
fn string_literal_with_escape_sequences() {
    assert_lex_eq!(
        r#""a\tb\q""#,
        vec![
            token(1, 9, Text("a\tbq".into())),
            token(9, 9, EndOfInput),
        ],
    );
}

#[test]
fn string_literal_unterminated_at_line_break() {
    assert_lex_eq!(
        "\"abc\nx",
        vec![
            token(6, 7, Identifier("x".into())),
            token(7, 7, EndOfInput),
        ],
        vec![error(1, 5, ErrorCode::E004)],
    );
}

#[test]
fn string_literal_unterminated_at_end_of_input() {
    assert_lex_eq!(
        "\"abc",
        vec![token(5, 5, EndOfInput)],
        vec![error(1, 5, ErrorCode::E005)],
    );
}

#[test]
fn verbatim_string_literal() {
    assert_lex_eq!(
        "`a\\`b\nc`",
        vec![
            token(1, 9, Text("a`b\nc".into())),
            token(9, 9, EndOfInput),
        ],
    );
}

#[test]
fn character_literals() {
    assert_lex_eq!(
        r"'x' '\n'",
        vec![
            token(1, 4, Character('x')),
            token(5, 9, Character('\n')),
            token(9, 9, EndOfInput),
        ],
    );
}

#[test]
fn character_literal_unterminated_at_end_of_input() {
    assert_lex_eq!(
        "'x",
        vec![token(3, 3, EndOfInput)],
        vec![error(1, 3, ErrorCode::E005)],
    );
}

#[test]
fn directive() {
    assert_lex_eq!(
        r#"#load "x.cad""#,
        vec![
            token(1, 6, Directive("load".into())),
            token(7, 14, Text("x.cad".into())),
            token(14, 14, EndOfInput),
        ],
    );
}

#[test]
fn lone_hash_sign() {
    assert_lex_eq!(
        "#",
        vec![token(2, 2, EndOfInput)],
        vec![error(1, 2, ErrorCode::E001)],
    );
}

#[test]
fn unrecognized_character() {
    assert_lex_eq!(
        "a @ b",
        vec![
            token(1, 2, Identifier("a".into())),
            token(5, 6, Identifier("b".into())),
            token(6, 6, EndOfInput),
        ],
        vec![error(3, 4, ErrorCode::E001)],
    );
}

#[test]
fn images_equal_the_source_text() {
    let mut map = SourceMap::default();
    let file = map.add_str(
        FileName::Anonymous,
        "proc f(x: *s8, ...) -> int { 0x1_F + 2.5 \"a\\n\" } /# done",
    );
    let tokens = super::lex(&map[file], &Reporter::silent()).bare;

    for token in tokens {
        assert_eq!(token.image.to_str(), map.snippet(token.span));
    }
}

#[test]
fn lexer_always_terminates_with_end_of_input() {
    for source in ["@@@", "'", "\"", "`", "0b", "/*", "#", "$ ! ^", "'ab'", "\u{FEFF}"] {
        let mut map = SourceMap::default();
        let file = map.add_str(FileName::Anonymous, source);
        let tokens = super::lex(&map[file], &Reporter::silent()).bare;

        assert!(matches!(tokens.last(), Some(token) if token.bare == EndOfInput));
    }
}
