//! The diagnostic reporter.

use super::{Diagnostic, Severity, UnboxedUntaggedDiagnostic, UntaggedDiagnostic};
use span::SourceMap;
use std::{
    collections::BTreeSet,
    io::Write,
    mem,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, RwLock, RwLockReadGuard,
    },
};
use utility::{
    default,
    paint::{epaint, ColorChoice},
    pluralize,
};

/// A diagnostic reporter.
///
/// The sink every stage of the front end reports to. It counts the errors it received
/// which lets the pipeline halt after a stage that reported any.
pub struct Reporter {
    kind: ReporterKind,
    map: Option<Arc<RwLock<SourceMap>>>,
    color: ColorChoice,
    verbose: bool,
    errors: AtomicUsize,
}

impl Reporter {
    fn new(kind: ReporterKind) -> Self {
        Self {
            kind,
            map: None,
            color: default(),
            verbose: false,
            errors: AtomicUsize::new(0),
        }
    }

    pub fn silent() -> Self {
        Self::new(ReporterKind::Silent)
    }

    pub fn buffer(diagnostics: Buffer) -> Self {
        Self::new(ReporterKind::Buffer(diagnostics))
    }

    pub fn stderr() -> Self {
        Self::new(ReporterKind::Stderr)
    }

    /// A reporter that holds back diagnostics until it is [flushed](Self::flush) or dropped.
    ///
    /// Flushing prints the warnings before the errors, each group in source order, and
    /// finishes with a summary.
    pub fn buffered_stderr() -> Self {
        Self::new(ReporterKind::BufferedStderr(default()))
    }

    #[must_use]
    pub fn with_map(mut self, map: Arc<RwLock<SourceMap>>) -> Self {
        self.map = Some(map);
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Whether to emit [info diagnostics](Diagnostic::info).
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn map(&self) -> Option<RwLockReadGuard<'_, SourceMap>> {
        self.map.as_ref().map(|map| map.read().unwrap())
    }

    /// Whether any error or bug was reported since the creation of this reporter.
    pub fn has_errors(&self) -> bool {
        self.error_count() != 0
    }

    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }

    pub(super) fn report_untagged(&self, diagnostic: UntaggedDiagnostic) {
        if diagnostic.severity.is_error() {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        if diagnostic.severity == Severity::Info && !self.verbose {
            return;
        }

        match &self.kind {
            ReporterKind::Silent => {}
            ReporterKind::Buffer(diagnostics) => {
                diagnostics.lock().unwrap().insert(diagnostic);
            }
            ReporterKind::Stderr => self.print(&diagnostic, self.map().as_deref()),
            ReporterKind::BufferedStderr(buffer) => match diagnostic.severity {
                Severity::Bug | Severity::Error => {
                    buffer.errors.lock().unwrap().insert(diagnostic);
                }
                Severity::Warning => {
                    buffer.warnings.lock().unwrap().insert(diagnostic);
                }
                Severity::Info => self.print(&diagnostic, self.map().as_deref()),
            },
        }
    }

    /// Print and clear all buffered diagnostics.
    ///
    /// This is a no-op for unbuffered reporters.
    pub fn flush(&self) {
        if let ReporterKind::BufferedStderr(buffer) = &self.kind {
            let map = self.map();
            let map = map.as_deref();

            let warnings = mem::take(&mut *buffer.warnings.lock().unwrap());

            for warning in &warnings {
                self.print(warning, map);
            }

            if !warnings.is_empty() {
                let summary = Diagnostic::warning().message(format!(
                    "emitted {} {}",
                    warnings.len(),
                    pluralize!(warnings.len(), "warning")
                ));
                self.print(&summary, map);
            }

            let errors = mem::take(&mut *buffer.errors.lock().unwrap());

            for error in &errors {
                self.print(error, map);
            }

            if !errors.is_empty() {
                let summary = Diagnostic::error().message(pluralize!(
                    errors.len(),
                    "aborting due to previous error",
                    format!("aborting due to {} previous errors", errors.len()),
                ));

                let codes: BTreeSet<_> = errors.iter().filter_map(|error| error.code).collect();
                let summary = match codes.first() {
                    Some(code) => summary.help(format!(
                        "run ‘cadence explain {code}’ to learn more about {this} error",
                        this = pluralize!(codes.len(), "this", "the first"),
                    )),
                    None => summary,
                };

                self.print(&summary, map);
            }
        }
    }

    fn print(&self, diagnostic: &UnboxedUntaggedDiagnostic, map: Option<&SourceMap>) {
        // Failing to write to stderr leaves us without any channel to complain through.
        let _ = epaint(
            |painter| {
                diagnostic.render(map, painter)?;
                writeln!(painter)?;
                writeln!(painter)
            },
            self.color,
        );
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        self.flush();
    }
}

enum ReporterKind {
    Silent,
    Buffer(Buffer),
    Stderr,
    BufferedStderr(StderrBuffer),
}

pub type Buffer = Arc<Mutex<BTreeSet<UntaggedDiagnostic>>>;

#[derive(Default)]
struct StderrBuffer {
    errors: Mutex<BTreeSet<UntaggedDiagnostic>>,
    warnings: Mutex<BTreeSet<UntaggedDiagnostic>>,
}

/// A witness to a [reported](Diagnostic::report) error.
///
/// A value of this type is a proof that an error was reported. Using it as the error type
/// instead of `()` makes it harder to return an error without reporting anything since
/// it can only be constructed by reporting a diagnostic or by [`Self::new_unchecked`].
///
/// Routines that already reported their failure return it to signal to their callers
/// that the failure is _handled_ and must not be reported a second time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErasedReportedError(());

impl ErasedReportedError {
    pub(crate) const fn new() -> Self {
        Self(())
    }

    /// Obtain a witness without reporting anything.
    ///
    /// Only use this if it is certain that an error has been reported through other means.
    pub const fn new_unchecked() -> Self {
        Self::new()
    }
}
