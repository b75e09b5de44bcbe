//! The diagnostics system.
//!
//! Diagnostics are the sole channel through which the front end communicates problems and
//! progress to the user. They are built with [`Diagnostic`] and sent to a [`Reporter`].

use span::{Span, Spanning};
use std::{collections::BTreeSet, marker::PhantomData, ops::Deref};
use utility::Str;

pub use code::ErrorCode;
pub use reporter::{ErasedReportedError, Reporter};

mod code;
mod render;

pub mod error;
pub mod reporter;

#[cfg(test)]
mod test;

/// A complex diagnostic message, optionally with source locations.
///
/// The type parameter is a [severity tag](tag) that determines what reporting the
/// diagnostic yields: Errors and bugs yield an [`ErasedReportedError`].
#[must_use]
pub struct Diagnostic<S: tag::Tag = tag::Error> {
    untagged: UntaggedDiagnostic,
    _tag: PhantomData<S>,
}

impl<S: tag::Tag> Diagnostic<S> {
    fn new() -> Self {
        Self {
            untagged: Box::new(UnboxedUntaggedDiagnostic::new(S::SEVERITY)),
            _tag: PhantomData,
        }
    }

    /// Add a text message describing the issue.
    ///
    /// # Guidelines
    ///
    /// * The message should not contain any line breaks
    /// * The message should not start with an upper case letter
    /// * The message should not end in a punctuation mark
    /// * Surround source code snippets with single quotation marks,
    ///   i.e. `‘` (U+2018) to the left and `’` (U+2019) to the right
    pub fn message(mut self, message: impl Into<Str>) -> Self {
        self.untagged.message = Some(message.into());
        self
    }

    fn highlight(mut self, spanning: impl Spanning, label: Option<Str>, role: Role) -> Self {
        self.untagged.highlights.insert(Highlight {
            span: spanning.span(),
            label,
            role,
        });
        self
    }

    /// Reference and label a code snippet as one of the focal points of the diagnostic.
    pub fn span(self, spanning: impl Spanning, label: impl Into<Str>) -> Self {
        self.highlight(spanning, Some(label.into()), Role::Primary)
    }

    /// Reference a code snippet as one of the focal points of the diagnostic.
    pub fn unlabeled_span(self, spanning: impl Spanning) -> Self {
        self.highlight(spanning, None, Role::Primary)
    }

    /// Reference and label a code snippet as auxiliary information for the diagnostic.
    pub fn label(self, spanning: impl Spanning, label: impl Into<Str>) -> Self {
        self.highlight(spanning, Some(label.into()), Role::Secondary)
    }

    fn subdiagnostic(mut self, severity: Subseverity, message: Str) -> Self {
        self.untagged
            .subdiagnostics
            .push(Subdiagnostic { severity, message });
        self
    }

    /// Add further clarifying information.
    pub fn note(self, message: impl Into<Str>) -> Self {
        self.subdiagnostic(Subseverity::Note, message.into())
    }

    /// Add steps or tips to solve the diagnosed issue.
    ///
    /// Do not pose a question like `did you mean …?`.
    pub fn help(self, message: impl Into<Str>) -> Self {
        self.subdiagnostic(Subseverity::Help, message.into())
    }

    pub fn with(self, builder: impl FnOnce(Self) -> Self) -> Self {
        builder(self)
    }

    /// Report the diagnostic.
    pub fn report(self, reporter: &Reporter) -> S::Output {
        reporter.report_untagged(self.untagged);
        S::OUTPUT
    }
}

impl Diagnostic<tag::Bug> {
    /// Create a diagnostic for an internal compiler error (ICE).
    pub fn bug() -> Self {
        Self::new()
    }
}

impl Diagnostic {
    /// Create a diagnostic for a user error.
    pub fn error() -> Self {
        Self::new()
    }

    pub fn code(mut self, code: ErrorCode) -> Self {
        self.untagged.code = Some(code);
        self
    }
}

impl Diagnostic<tag::Warning> {
    /// Create a diagnostic for a warning.
    pub fn warning() -> Self {
        Self::new()
    }
}

impl Diagnostic<tag::Info> {
    /// Create a diagnostic for progress information.
    ///
    /// These are only emitted by verbose reporters.
    pub fn info() -> Self {
        Self::new()
    }
}

// There is intentionally no `DerefMut` impl: It would allow users to retag a diagnostic.
impl<S: tag::Tag> Deref for Diagnostic<S> {
    type Target = UnboxedUntaggedDiagnostic;

    fn deref(&self) -> &Self::Target {
        &self.untagged
    }
}

/// Severity tags of diagnostics.
pub mod tag {
    use super::{ErasedReportedError, Severity};

    pub trait Tag {
        const SEVERITY: Severity;

        /// What reporting a diagnostic of this severity yields.
        type Output;

        const OUTPUT: Self::Output;
    }

    pub struct Bug;

    impl Tag for Bug {
        const SEVERITY: Severity = Severity::Bug;
        type Output = ErasedReportedError;
        const OUTPUT: Self::Output = ErasedReportedError::new();
    }

    pub struct Error;

    impl Tag for Error {
        const SEVERITY: Severity = Severity::Error;
        type Output = ErasedReportedError;
        const OUTPUT: Self::Output = ErasedReportedError::new();
    }

    pub struct Warning;

    impl Tag for Warning {
        const SEVERITY: Severity = Severity::Warning;
        type Output = ();
        const OUTPUT: Self::Output = ();
    }

    pub struct Info;

    impl Tag for Info {
        const SEVERITY: Severity = Severity::Info;
        type Output = ();
        const OUTPUT: Self::Output = ();
    }
}

pub type UntaggedDiagnostic = Box<UnboxedUntaggedDiagnostic>;

/// The payload of a [`Diagnostic`].
///
/// Highlights come first since they have the highest priority when ordering. This places
/// buffered diagnostics into source order.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct UnboxedUntaggedDiagnostic {
    pub highlights: BTreeSet<Highlight>,
    pub subdiagnostics: Vec<Subdiagnostic>,
    pub code: Option<ErrorCode>,
    pub message: Option<Str>,
    pub severity: Severity,
}

impl UnboxedUntaggedDiagnostic {
    fn new(severity: Severity) -> Self {
        Self {
            highlights: BTreeSet::new(),
            subdiagnostics: Vec::new(),
            code: None,
            message: None,
            severity,
        }
    }

    /// The span of the first primary highlight if there is one.
    pub fn primary_span(&self) -> Option<Span> {
        self.highlights
            .iter()
            .find(|highlight| highlight.role == Role::Primary)
            .map(|highlight| highlight.span)
    }
}

/// A highlighted code snippet.
#[derive(PartialEq, Eq, Debug, Clone, PartialOrd, Ord)]
pub struct Highlight {
    pub span: Span,
    pub role: Role,
    pub label: Option<Str>,
}

/// The role of a highlighted code snippet.
#[derive(PartialEq, Eq, Debug, Clone, Copy, PartialOrd, Ord)]
pub enum Role {
    /// A focal point of the diagnostic.
    Primary,
    /// An auxiliary note of the diagnostic.
    Secondary,
}

/// Part of a [complex error message](Diagnostic) providing extra text messages.
#[derive(PartialEq, Eq, Debug, Clone, PartialOrd, Ord)]
pub struct Subdiagnostic {
    pub severity: Subseverity,
    pub message: Str,
}

/// Level of severity of a diagnostic.
#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord)]
pub enum Severity {
    /// An internal compiler error (ICE).
    Bug,
    /// A user error.
    Error,
    Warning,
    /// Progress information.
    Info,
}

impl Severity {
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Bug | Self::Error)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord)]
pub enum Subseverity {
    /// An auxiliary note.
    Note,
    /// A message containing steps to solve an issue.
    Help,
}

impl Subseverity {
    const fn name(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Help => "help",
        }
    }
}
