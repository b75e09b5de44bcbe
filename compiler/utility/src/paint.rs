//! Styled terminal output.
//!
//! Diagnostics and the textual dumps of the driver are written through a [`Painter`] which
//! only emits ANSI escape sequences if the resolved [`ColorChoice`] permits it.

use crate::SmallVec;
use std::{
    fmt,
    io::{self, BufWriter, StderrLock, StdoutLock, Write},
    str::FromStr,
    string::FromUtf8Error,
};
use supports_color::Stream;

pub use anstyle::{AnsiColor, Effects, Style};

/// Paint to a `String`.
pub fn paint_to_string(
    paint: impl FnOnce(&mut Painter) -> io::Result<()>,
    choice: ColorChoice,
) -> Result<String, FromUtf8Error> {
    let mut painter = Painter::bytes(choice);
    // Writing to bytes does not fail.
    let _ = paint(&mut painter);
    String::from_utf8(painter.buffer())
}

/// Paint to locked and buffered stdout.
pub fn paint(
    paint: impl FnOnce(&mut Painter) -> io::Result<()>,
    choice: ColorChoice,
) -> io::Result<()> {
    let mut painter = Painter::stdout(choice);
    paint(&mut painter)?;
    painter.flush()
}

/// Paint to locked and buffered stderr.
pub fn epaint(
    paint: impl FnOnce(&mut Painter) -> io::Result<()>,
    choice: ColorChoice,
) -> io::Result<()> {
    let mut painter = Painter::stderr(choice);
    paint(&mut painter)?;
    painter.flush()
}

pub struct Painter {
    writer: Writer,
    colorize: bool,
    stack: SmallVec<Style, 3>,
}

impl Painter {
    pub fn bytes(choice: ColorChoice) -> Self {
        Self::new(Writer::Bytes(Vec::new()), choice.resolve(None))
    }

    pub fn stdout(choice: ColorChoice) -> Self {
        Self::new(
            Writer::Stdout(BufWriter::new(io::stdout().lock())),
            choice.resolve(Some(Stream::Stdout)),
        )
    }

    pub fn stderr(choice: ColorChoice) -> Self {
        Self::new(
            Writer::Stderr(BufWriter::new(io::stderr().lock())),
            choice.resolve(Some(Stream::Stderr)),
        )
    }

    fn new(writer: Writer, colorize: bool) -> Self {
        Self { writer, colorize, stack: SmallVec::new() }
    }

    /// Push a style onto the style stack and activate it.
    pub fn set(&mut self, style: impl IntoStyle) -> io::Result<()> {
        if !self.colorize {
            return Ok(());
        }

        let style = style.into_style();
        self.stack.push(style);
        write!(self.writer, "{}", style.render())
    }

    /// Pop the innermost style and restore the ones below it.
    pub fn unset(&mut self) -> io::Result<()> {
        if !self.colorize {
            return Ok(());
        }

        if let Some(style) = self.stack.pop() {
            write!(self.writer, "{}", style.render_reset())?;
        }

        for style in &self.stack {
            write!(self.writer, "{}", style.render())?;
        }

        Ok(())
    }

    pub fn buffer(self) -> Vec<u8> {
        match self.writer {
            Writer::Bytes(bytes) => bytes,
            Writer::Stdout(_) | Writer::Stderr(_) => Vec::new(),
        }
    }
}

impl Write for Painter {
    fn write(&mut self, buffer: &[u8]) -> io::Result<usize> {
        self.writer.write(buffer)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

enum Writer {
    Stdout(BufWriter<StdoutLock<'static>>),
    Stderr(BufWriter<StderrLock<'static>>),
    Bytes(Vec<u8>),
}

impl Write for Writer {
    fn write(&mut self, buffer: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(stdout) => stdout.write(buffer),
            Self::Stderr(stderr) => stderr.write(buffer),
            Self::Bytes(bytes) => bytes.write(buffer),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(stdout) => stdout.flush(),
            Self::Stderr(stderr) => stderr.flush(),
            Self::Bytes(bytes) => bytes.flush(),
        }
    }
}

#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ColorChoice {
    #[default]
    Auto,
    Never,
    Always,
}

impl ColorChoice {
    pub const ELEMENTS: [Self; 3] = [Self::Auto, Self::Never, Self::Always];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Never => "never",
            Self::Always => "always",
        }
    }

    fn resolve(self, stream: Option<Stream>) -> bool /*colorize*/ {
        match (self, stream) {
            (Self::Auto, Some(stream)) => {
                supports_color::on_cached(stream).is_some_and(|level| level.has_basic)
            }
            (Self::Never, _) | (Self::Auto, None) => false,
            (Self::Always, _) => true,
        }
    }
}

impl FromStr for ColorChoice {
    type Err = ();

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::ELEMENTS
            .into_iter()
            .find(|choice| choice.name() == source)
            .ok_or(())
    }
}

impl fmt::Display for ColorChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub trait IntoStyle {
    fn into_style(self) -> Style;
}

impl IntoStyle for Style {
    fn into_style(self) -> Style {
        self
    }
}

impl IntoStyle for AnsiColor {
    fn into_style(self) -> Style {
        self.on_default()
    }
}

impl IntoStyle for Effects {
    fn into_style(self) -> Style {
        Style::new().effects(self)
    }
}
