//! The compilation session.
//!
//! A session owns the source map and the reporter of a compilation unit and drives the
//! passes of the front end over it. Every file reachable from the given paths through load
//! directives is lexed and parsed, then all files are annotated with a shared symbol table
//! and finally resolved. The pipeline halts after the first pass that reported an error.

use ast::{BareDeclaration, File, Node};
use diagnostics::{error::Result, reporter::ErasedReportedError, Diagnostic, ErrorCode, Reporter};
use span::{SourceMap, Span};
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    sync::{Arc, RwLock, RwLockReadGuard},
    time::{Duration, Instant},
};
use symbol_table::{Builder, SymbolTable};
use utility::{default, pluralize, FormatError, HashSet, QuoteExt};

pub use loader::{MemoryLoader, SourceLoader};

mod loader;
#[cfg(test)]
mod test;

pub struct Session {
    options: Options,
    map: Arc<RwLock<SourceMap>>,
    reporter: Reporter,
}

impl Session {
    pub fn new(options: Options, map: Arc<RwLock<SourceMap>>, reporter: Reporter) -> Self {
        Self {
            options,
            map,
            reporter,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn map(&self) -> RwLockReadGuard<'_, SourceMap> {
        self.map.read().unwrap()
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Check the compilation unit made up of the given files and the files they load.
    ///
    /// Returns the unit as far as it was analyzed if no pass reported any errors.
    pub fn check(&self, paths: &[PathBuf], loader: &dyn SourceLoader) -> Result<Unit> {
        let mut stopwatch = Stopwatch::new(self.options.timing);
        let unit = self.run(paths, loader, &mut stopwatch);
        stopwatch.report();
        unit
    }

    fn run(
        &self,
        paths: &[PathBuf],
        loader: &dyn SourceLoader,
        stopwatch: &mut Stopwatch,
    ) -> Result<Unit> {
        let mut loading = Loading {
            session: self,
            loader,
            stopwatch: &mut *stopwatch,
            loaded: default(),
            files: Vec::new(),
        };

        for path in paths {
            loading.load(path, None);
        }

        let mut files = loading.files;
        self.halt_on_errors()?;

        if self.halts_after(Pass::Parser) {
            return Ok(Unit {
                files,
                table: Builder::new().finish(),
            });
        }

        self.info(format!(
            "annotating {} {}",
            files.len(),
            pluralize!(files.len(), "file")
        ));

        let mut builder = Builder::new();
        stopwatch.time(Pass::Annotator, || {
            for file in &mut files {
                annotator::annotate(file, &mut builder);
            }
        });
        let mut table = builder.finish();

        if self.halts_after(Pass::Annotator) {
            self.emit_symbols(&table);
            return Ok(Unit { files, table });
        }

        self.info(format!("resolving {} symbols", table.len()));

        let resolution = stopwatch.time(Pass::Resolver, || {
            resolver::resolve(&mut files, &mut table, &self.reporter)
        });
        self.emit_symbols(&table);
        resolution?;

        Ok(Unit { files, table })
    }

    fn halts_after(&self, pass: Pass) -> bool {
        self.options.halt_after.is_some_and(|halt| halt <= pass)
    }

    fn halt_on_errors(&self) -> Result {
        if self.reporter.has_errors() {
            return Err(ErasedReportedError::new_unchecked());
        }

        Ok(())
    }

    fn emit_symbols(&self, table: &SymbolTable) {
        if self.options.emit_symbols {
            eprintln!("{table}");
        }
    }

    fn info(&self, message: String) {
        Diagnostic::info().message(message).report(&self.reporter);
    }
}

/// The options of a session.
#[derive(Default, Clone, Debug)]
pub struct Options {
    /// Print the tokens of each file.
    pub emit_tokens: bool,
    /// Print the syntax tree of each file after parsing.
    pub emit_ast: bool,
    /// Print the symbol table after the last pass that ran.
    pub emit_symbols: bool,
    /// Print the time spent in each pass.
    pub timing: bool,
    /// The last pass to run.
    pub halt_after: Option<Pass>,
}

/// A pass of the front end.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Pass {
    Lexer,
    Parser,
    Annotator,
    Resolver,
}

impl Pass {
    pub const ELEMENTS: [Self; 4] = [Self::Lexer, Self::Parser, Self::Annotator, Self::Resolver];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Lexer => "lexer",
            Self::Parser => "parser",
            Self::Annotator => "annotator",
            Self::Resolver => "resolver",
        }
    }

    const fn title(self) -> &'static str {
        match self {
            Self::Lexer => "Lexing",
            Self::Parser => "Parsing",
            Self::Annotator => "Semantic Annotation",
            Self::Resolver => "Symbolic Resolution",
        }
    }
}

impl FromStr for Pass {
    type Err = ();

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::ELEMENTS
            .into_iter()
            .find(|pass| pass.name() == source)
            .ok_or(())
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The files of a compilation unit together with their symbols.
///
/// The symbol table only contains the root scope if the pipeline halted before annotation.
pub struct Unit {
    pub files: Vec<File>,
    pub table: SymbolTable,
}

struct Loading<'a> {
    session: &'a Session,
    loader: &'a dyn SourceLoader,
    stopwatch: &'a mut Stopwatch,
    loaded: HashSet<PathBuf>,
    files: Vec<File>,
}

impl Loading<'_> {
    /// Lex and parse the given file followed by the files it loads.
    ///
    /// Each file is loaded at most once. Load directives are resolved relative to the
    /// folder of the loading file.
    fn load(&mut self, path: &Path, origin: Option<Span>) {
        let path = loader::normalize(path);

        if !self.loaded.insert(path.clone()) {
            return;
        }

        let session = self.session;
        session.info(format!("loading {}", path.display().quote()));

        let source = match self.loader.load(&path) {
            Ok(source) => source,
            Err(error) => {
                Diagnostic::error()
                    .code(ErrorCode::E030)
                    .message(format!("could not load the file {}", path.display().quote()))
                    .with(|it| match origin {
                        Some(span) => it.span(span, "loaded here"),
                        None => it,
                    })
                    .note(error.format())
                    .report(&session.reporter);
                return;
            }
        };

        let index = session.map.write().unwrap().add(path.clone(), source);
        let map = session.map();

        let tokens = self
            .stopwatch
            .time(Pass::Lexer, || lexer::lex(&map[index], &session.reporter));

        if session.options.emit_tokens {
            for token in &tokens.bare {
                eprintln!("{token:?}");
            }
        }

        // the load directives of a file that failed to lex stay unknown
        if tokens.health.is_tainted() || session.halts_after(Pass::Lexer) {
            return;
        }

        let file = self
            .stopwatch
            .time(Pass::Parser, || {
                parser::parse(tokens.bare, index, &map, &session.reporter)
            })
            .bare;
        drop(map);

        if session.options.emit_ast {
            eprintln!("{file}");
        }

        let loads: Vec<_> = file
            .nodes
            .iter()
            .filter_map(|node| match node {
                Node::Declaration(declaration) => match &declaration.bare {
                    BareDeclaration::Load(load) => Some(load.path),
                    _ => None,
                },
                _ => None,
            })
            .collect();

        self.files.push(file);

        let folder = path.parent().unwrap_or(Path::new(""));

        for load in loads {
            self.load(&folder.join(load.bare.to_str()), Some(load.span));
        }
    }
}

struct Stopwatch {
    enabled: bool,
    durations: [Option<Duration>; Pass::ELEMENTS.len()],
}

impl Stopwatch {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            durations: default(),
        }
    }

    /// Run the given pass adding the time it took to the total of the pass.
    fn time<T>(&mut self, pass: Pass, run: impl FnOnce() -> T) -> T {
        if !self.enabled {
            return run();
        }

        let start = Instant::now();
        let result = run();
        *self.durations[pass as usize].get_or_insert_with(Duration::default) += start.elapsed();
        result
    }

    fn report(&self) {
        if !self.enabled {
            return;
        }

        eprintln!("Execution times by pass:");

        for pass in Pass::ELEMENTS {
            if let Some(duration) = self.durations[pass as usize] {
                eprintln!("  {:<30}{duration:?}", pass.title());
            }
        }
    }
}
