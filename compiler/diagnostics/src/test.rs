use crate::{reporter::Buffer, Diagnostic, ErrorCode, Reporter, Severity};
use span::span;
use utility::default;

#[test]
fn errors_are_counted() {
    let reporter = Reporter::silent();
    assert!(!reporter.has_errors());

    Diagnostic::warning().message("unused").report(&reporter);
    assert!(!reporter.has_errors());

    let _ = Diagnostic::error().message("failure").report(&reporter);
    let _ = Diagnostic::bug().message("mismatch").report(&reporter);
    assert!(reporter.has_errors());
    assert_eq!(reporter.error_count(), 2);
}

#[test]
fn buffered_diagnostics_are_in_source_order() {
    let buffer = Buffer::default();
    let reporter = Reporter::buffer(buffer.clone());

    let _ = Diagnostic::error()
        .code(ErrorCode::E020)
        .unlabeled_span(span(20, 25))
        .report(&reporter);
    let _ = Diagnostic::error()
        .code(ErrorCode::E001)
        .unlabeled_span(span(3, 4))
        .report(&reporter);

    let codes: Vec<_> = buffer
        .lock()
        .unwrap()
        .iter()
        .map(|diagnostic| diagnostic.code)
        .collect();
    assert_eq!(codes, [Some(ErrorCode::E001), Some(ErrorCode::E020)]);
}

#[test]
fn info_is_only_emitted_when_verbose() {
    let buffer = Buffer::default();
    let reporter = Reporter::buffer(buffer.clone());
    Diagnostic::info().message("lexing").report(&reporter);
    assert!(buffer.lock().unwrap().is_empty());

    let reporter = Reporter::buffer(buffer.clone()).verbose(true);
    Diagnostic::info().message("lexing").report(&reporter);

    let buffer = buffer.lock().unwrap();
    assert_eq!(buffer.len(), 1);
    assert!(buffer.iter().all(|diagnostic| diagnostic.severity == Severity::Info));
}

#[test]
fn primary_span_skips_secondary_highlights() {
    let diagnostic = Diagnostic::error()
        .label(span(1, 2), "declared here")
        .unlabeled_span(span(7, 9));

    assert_eq!(diagnostic.primary_span(), Some(span(7, 9)));
    assert_eq!(Diagnostic::error().primary_span(), None);
}

#[test]
fn error_codes_parse_case_insensitively() {
    assert_eq!("E023".parse::<ErrorCode>(), Ok(ErrorCode::E023));
    assert_eq!("e001".parse::<ErrorCode>(), Ok(ErrorCode::E001));
    assert_eq!("E999".parse::<ErrorCode>(), Err(()));
    assert!(!ErrorCode::E014.explanation().is_empty());
}

#[test]
fn unreported_buffer_is_empty() {
    let buffer: Buffer = default();
    let _reporter = Reporter::buffer(buffer.clone());

    assert!(buffer.lock().unwrap().is_empty());
}
