//! The code responsible for rendering diagnostics.

use super::{Role, Severity, Subseverity, UnboxedUntaggedDiagnostic};
use span::{FileName, LineWithHighlight, SourceMap};
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;
use utility::paint::{AnsiColor, Effects, Painter};


impl UnboxedUntaggedDiagnostic {
    /// Render the diagnostic.
    ///
    /// Highlights spanning several lines are cut off at the end of their first line.
    ///
    /// # Panics
    ///
    /// Panics if the diagnostic references source code but no source map is provided.
    pub fn render(&self, map: Option<&SourceMap>, p: &mut Painter) -> io::Result<()> {
        render_header(self, p)?;

        let highlights = resolve_highlights(self, map);
        let padding = match highlights.iter().map(|highlight| highlight.line.location.line).max() {
            Some(widest_line_number) => " ".repeat((widest_line_number.ilog10() + 1) as usize),
            None => " ".into(),
        };

        let mut renderer = Renderer {
            diagnostic: self,
            padding,
            p,
        };

        for (index, highlight) in highlights.iter().enumerate() {
            renderer.render_location(&highlight.line, index != 0)?;
            renderer.render_highlight(highlight)?;

            if !self.subdiagnostics.is_empty() || index + 1 < highlights.len() {
                renderer.render_bar()?;
            }
        }

        for subdiagnostic in &self.subdiagnostics {
            renderer.render_subdiagnostic(subdiagnostic.severity, &subdiagnostic.message)?;
        }

        Ok(())
    }

    /// Render the diagnostic without colors.
    pub fn format(&self, map: Option<&SourceMap>) -> String {
        let mut painter = Painter::bytes(utility::paint::ColorChoice::Never);
        // Writing to bytes does not fail.
        let _ = self.render(map, &mut painter);
        String::from_utf8_lossy(&painter.buffer()).into_owned()
    }
}

fn render_header(diagnostic: &UnboxedUntaggedDiagnostic, p: &mut Painter) -> io::Result<()> {
    diagnostic.severity.render(p)?;

    if let Some(code) = diagnostic.code {
        p.set(diagnostic.severity.color())?;
        write!(p, "[{code}]")?;
        p.unset()?;
    }

    if let Some(message) = &diagnostic.message {
        write!(p, ": ")?;
        p.set(Effects::BOLD)?;
        write!(p, "{message}")?;
        p.unset()?;
    }

    Ok(())
}

fn resolve_highlights<'a>(
    diagnostic: &'a UnboxedUntaggedDiagnostic,
    map: Option<&'a SourceMap>,
) -> Vec<ResolvedHighlight<'a>> {
    if diagnostic.highlights.is_empty() {
        return Vec::new();
    }

    let Some(map) = map else {
        panic!("missing source map for rendering a diagnostic which references source code");
    };

    diagnostic
        .highlights
        .iter()
        .map(|highlight| ResolvedHighlight {
            line: map.line_with_highlight(highlight.span),
            role: highlight.role,
            label: highlight.label.as_deref(),
        })
        .collect()
}

struct ResolvedHighlight<'a> {
    line: LineWithHighlight<'a>,
    role: Role,
    label: Option<&'a str>,
}

struct Renderer<'a> {
    diagnostic: &'a UnboxedUntaggedDiagnostic,
    padding: String,
    p: &'a mut Painter,
}

impl Renderer<'_> {
    fn render_location(
        &mut self,
        line: &LineWithHighlight<'_>,
        needs_upward_connection: bool,
    ) -> io::Result<()> {
        let connector = if needs_upward_connection { "├" } else { "┌" };

        writeln!(self.p)?;
        self.p.set(palette::FRAME)?;
        write!(self.p, "{} {connector}─ ", self.padding)?;
        render_file_name(line.file, self.p)?;
        write!(self.p, ":{}", line.location)?;
        self.p.unset()
    }

    fn render_highlight(&mut self, highlight: &ResolvedHighlight<'_>) -> io::Result<()> {
        let line = &highlight.line;
        let color = highlight.role.color(self.diagnostic.severity.color());

        self.render_bar()?;
        writeln!(self.p)?;
        self.render_line_number(line.location.line)?;
        writeln!(self.p, " {}", line.content)?;

        self.p.set(palette::FRAME)?;
        write!(self.p, "{} │", self.padding)?;
        self.p.unset()?;

        let underline = match highlight.role {
            Role::Primary => "═",
            Role::Secondary => "─",
        };

        self.p.set(color)?;
        if line.width == 0 {
            // A zero-length highlight is rendered as a cursor between two characters.
            let padding = " ".repeat(line.prefix_width.saturating_sub(1));
            write!(self.p, " {padding}⟩⟨")?;
        } else {
            let padding = " ".repeat(line.prefix_width);
            write!(self.p, " {padding}{}", underline.repeat(line.width))?;
        }

        if let Some(label) = highlight.label {
            write!(self.p, " {label}")?;
        }
        self.p.unset()
    }

    fn render_subdiagnostic(&mut self, severity: Subseverity, message: &str) -> io::Result<()> {
        writeln!(self.p)?;
        write!(self.p, "{}", self.padding)?;
        severity.render(self.p)?;
        write!(self.p, ": ")?;

        let mut lines = message.split('\n');

        if let Some(line) = lines.next() {
            write!(self.p, "{line}")?;
        }

        let severity_spacing = " ".repeat(severity.name().width() + 1);

        for line in lines {
            writeln!(self.p)?;
            write!(self.p, "{}{severity_spacing} {line}", self.padding)?;
        }

        Ok(())
    }

    fn render_bar(&mut self) -> io::Result<()> {
        writeln!(self.p)?;

        self.p.set(palette::FRAME)?;
        write!(self.p, "{} │", self.padding)?;
        self.p.unset()
    }

    fn render_line_number(&mut self, number: u32) -> io::Result<()> {
        let padding = self.padding.len();

        self.p.set(palette::FRAME)?;
        write!(self.p, "{number:>padding$} │")?;
        self.p.unset()
    }
}

impl Severity {
    const fn name(self) -> &'static str {
        match self {
            Self::Bug => "internal compiler error",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    const fn color(self) -> AnsiColor {
        match self {
            Self::Bug | Self::Error => palette::ERROR,
            Self::Warning => palette::WARNING,
            Self::Info => palette::INFO,
        }
    }

    fn render(self, p: &mut Painter) -> io::Result<()> {
        p.set(self.color().on_default().bold())?;
        write!(p, "{}", self.name())?;
        p.unset()
    }
}

impl Subseverity {
    fn render(self, p: &mut Painter) -> io::Result<()> {
        p.set(palette::HELP.on_default().bold())?;
        write!(p, "{}", self.name())?;
        p.unset()
    }
}

impl Role {
    const fn color(self, primary: AnsiColor) -> AnsiColor {
        match self {
            Self::Primary => primary,
            Self::Secondary => palette::HELP,
        }
    }
}

fn render_file_name(name: &FileName, p: &mut Painter) -> io::Result<()> {
    match name {
        FileName::Anonymous => {
            p.set(Effects::ITALIC)?;
            write!(p, "⟨anonymous⟩")?;
            p.unset()
        }
        FileName::Path(path) => write!(p, "{}", path.display()),
        FileName::Virtual(name) => write!(p, "{name}"),
    }
}

mod palette {
    use utility::paint::AnsiColor;

    pub(super) const FRAME: AnsiColor = AnsiColor::BrightBlue;
    pub(super) const ERROR: AnsiColor = AnsiColor::BrightRed;
    pub(super) const WARNING: AnsiColor = AnsiColor::BrightYellow;
    pub(super) const HELP: AnsiColor = AnsiColor::BrightCyan;
    pub(super) const INFO: AnsiColor = AnsiColor::BrightMagenta;
}
