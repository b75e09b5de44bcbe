use cli::{CheckOptions, Command, GlobalOptions};
use diagnostics::{
    error::{Health, Result},
    Diagnostic, ErrorCode, Reporter,
};
use session::{Session, SourceLoader};
use span::SourceMap;
use std::{
    borrow::Cow,
    fmt,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};
use utility::{
    default, has_file_extension,
    paint::{paint, AnsiColor, ColorChoice, Effects},
    Conjunction, ListingExt, QuoteExt, FILE_EXTENSION,
};

mod cli;
#[cfg(test)]
mod test;

pub fn main() -> Result {
    set_panic_hook();

    let (command, global_options) = cli::arguments();

    match command {
        Command::Check { paths, options } => check(&paths, options, &global_options),
        Command::Explain { codes } => explain(&codes, &global_options),
    }
}

fn check(paths: &[PathBuf], options: CheckOptions, global_options: &GlobalOptions) -> Result {
    let map: Arc<RwLock<SourceMap>> = default();
    let reporter = Reporter::buffered_stderr()
        .with_map(map.clone())
        .with_color(global_options.color)
        .verbose(options.verbose);

    for path in paths {
        // intentionally not `!path.is_file()` to exclude broken symlinks
        if path.is_dir() {
            // give a more useful diagnostic than the generic "could not load" one
            return Err(Diagnostic::error()
                .message(format!(
                    "the path {} does not refer to a file",
                    path.display().quote()
                ))
                .help("pass the source files inside of the folder instead")
                .report(&reporter));
        }

        if !has_file_extension(path, FILE_EXTENSION) {
            Diagnostic::warning()
                .message(format!(
                    "the file {} does not have the file extension {}",
                    path.display().quote(),
                    FILE_EXTENSION.quote()
                ))
                .report(&reporter);
        }
    }

    if !global_options.quiet {
        print_status(
            "Checking",
            paths.iter().map(|path| path.display()).list(Conjunction::And),
            global_options.color,
        );
    }

    let session = Session::new(options.session, map, reporter);
    session.check(paths, &FileSystem).map(drop)
}

fn explain(codes: &[String], global_options: &GlobalOptions) -> Result {
    let reporter = Reporter::buffered_stderr().with_color(global_options.color);
    let mut health = Health::Untainted;

    for code in codes {
        match code.parse::<ErrorCode>() {
            Ok(code) => {
                // a closed stdout leaves nobody to read the explanation anyway
                let _ = paint(
                    |painter| {
                        painter.set(Effects::BOLD)?;
                        write!(painter, "{code}")?;
                        painter.unset()?;
                        writeln!(painter, ": {}", code.explanation())
                    },
                    global_options.color,
                );
            }
            Err(()) => health.taint(
                Diagnostic::error()
                    .message(format!("{} is not a valid error code", code.quote()))
                    .note(format!(
                        "the valid error codes are {}",
                        ErrorCode::ELEMENTS.iter().list(Conjunction::And)
                    ))
                    .report(&reporter),
            ),
        }
    }

    health.into()
}

fn print_status(label: &str, message: impl fmt::Display, color: ColorChoice) {
    // the status is purely informational
    let _ = paint(
        |painter| {
            painter.set(AnsiColor::Green.on_default().bold())?;
            write!(painter, "{label:>12} ")?;
            painter.unset()?;
            writeln!(painter, "{message}")
        },
        color,
    );
}

/// Loads source files from the file system.
struct FileSystem;

impl SourceLoader for FileSystem {
    fn load(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

fn set_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let payload = info.payload();

        let message = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("unknown cause")
            .to_owned();

        let backtrace = std::env::var("CADENCE_BACKTRACE")
            .is_ok_and(|variable| variable != "0")
            .then(std::backtrace::Backtrace::force_capture);

        Diagnostic::bug()
            .message(message)
            .with(|it| match info.location() {
                Some(location) => it.note(format!("at {}", location.quote())),
                None => it,
            })
            .note(std::thread::current().name().map_or_else(
                || Cow::from("in an unnamed thread"),
                |name| format!("in thread {}", name.quote()).into(),
            ))
            .note("the compiler unexpectedly panicked. this is a bug. we would appreciate a bug report")
            .note(format!("cadence {}", env!("CARGO_PKG_VERSION")))
            .with(|it| match backtrace {
                Some(backtrace) => it.note(format!("with the following backtrace:\n{backtrace}")),
                None => it.help(
                    "rerun with the environment variable ‘CADENCE_BACKTRACE=1’ to display a backtrace",
                ),
            })
            .report(&Reporter::stderr());
    }));
}
