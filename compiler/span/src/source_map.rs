use super::{ByteIndex, LocalByteIndex, LocalSpan, Span, Spanning};
use std::{fmt, ops::Range, path::PathBuf};
use unicode_width::UnicodeWidthStr;
use utility::obtain;

#[cfg(test)]
mod test;

/// A mapping from [index](SourceFileIndex) to [source file](SourceFile).
///
/// The source files are laid out next to each other and padded on their left by one byte.
/// The padding frees up the byte index `0` which lets `Span::default()` stand for an
/// _unknown location_ and it leaves room for the _end of input_ position of the preceding
/// file.
///
/// ```text
/// | |  f0  | |  f1  | ...
///  ^ ^      ^ ^
///  | |      | source file f1
///  | |      padding
///  | source file f0
///  padding, unknown location
/// ```
#[derive(Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    fn next_offset(&self) -> ByteIndex {
        const PADDING: u32 = 1;

        self.files
            .last()
            .map(|file| file.span().end())
            .unwrap_or_default()
            + PADDING
    }

    /// Add text to the map creating a [`SourceFile`] in the process.
    ///
    /// Windows line endings are normalized to plain line feeds.
    pub fn add(&mut self, name: impl Into<FileName>, source: String) -> SourceFileIndex {
        let source = if source.contains("\r\n") {
            source.replace("\r\n", "\n")
        } else {
            source
        };

        let index = SourceFileIndex(self.files.len());
        let file = SourceFile::new(name.into(), source, self.next_offset());
        self.files.push(file);
        index
    }

    pub fn add_str(&mut self, name: impl Into<FileName>, source: &str) -> SourceFileIndex {
        self.add(name, source.to_owned())
    }

    /// The source file the given span points into.
    ///
    /// # Panics
    ///
    /// Panics if the span does not belong to any file of this map.
    pub fn file(&self, span: Span) -> &SourceFile {
        debug_assert!(span != Span::default());

        let index = self
            .files
            .partition_point(|file| file.span().end() < span.start());
        &self.files[index]
    }

    pub fn files(&self) -> impl Iterator<Item = (SourceFileIndex, &SourceFile)> {
        self.files
            .iter()
            .enumerate()
            .map(|(index, file)| (SourceFileIndex(index), file))
    }

    /// Resolve a span to the string content it points to.
    pub fn snippet(&self, span: Span) -> &str {
        let file = self.file(span);
        &file[span.local(file)]
    }

    /// The one-based line and column of the given index.
    pub fn location(&self, index: ByteIndex) -> Location {
        let file = self.file(Span::empty(index));
        file.location(index.local(file))
    }

    /// The first line touched by the given span together with the extent of the highlight.
    ///
    /// Spans reaching beyond the end of their first line are cut off there.
    pub fn line_with_highlight(&self, span: Span) -> LineWithHighlight<'_> {
        let file = self.file(span);
        let span = span.local(file);
        let line = file.line_index(span.start());
        let content = file.line(line);
        let line_start = file.lines[line];
        let line_end = line_start + u32::try_from(content.len()).unwrap_or(u32::MAX);

        let prefix = &file[LocalSpan::new(line_start, span.start())];
        let highlight = &file[LocalSpan::new(span.start(), span.end().min(line_end))];

        LineWithHighlight {
            file: &file.name,
            location: file.location(span.start()),
            content,
            prefix_width: prefix.width(),
            width: highlight.width(),
        }
    }
}

impl std::ops::Index<SourceFileIndex> for SourceMap {
    type Output = SourceFile;

    fn index(&self, index: SourceFileIndex) -> &Self::Output {
        &self.files[index.0]
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct SourceFileIndex(usize);

/// A one-based line and column.
///
/// Columns count Unicode scalar values, not bytes.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct LineWithHighlight<'a> {
    pub file: &'a FileName,
    pub location: Location,
    /// The content of the entire line without its line break.
    pub content: &'a str,
    /// The display width of the part of the line in front of the highlight.
    pub prefix_width: usize,
    /// The display width of the highlighted part of the line.
    pub width: usize,
}

/// A source file.
///
/// Obtained by and contained within a [source map](SourceMap).
pub struct SourceFile {
    name: FileName,
    content: String,
    span: Span,
    /// The local start index of each line.
    lines: Vec<LocalByteIndex>,
}

impl SourceFile {
    fn new(name: FileName, content: String, start: ByteIndex) -> Self {
        let lines = std::iter::once(LocalByteIndex::new(0))
            .chain(
                content
                    .match_indices('\n')
                    .filter_map(|(index, _)| LocalByteIndex::try_from(index + 1).ok()),
            )
            .collect();

        Self {
            span: Span::with_length(start, content.len().try_into().unwrap_or(u32::MAX)),
            name,
            content,
            lines,
        }
    }

    pub fn name(&self) -> &FileName {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn local_span(&self) -> LocalSpan {
        self.span.local(self)
    }

    /// The zero-based index of the line containing the given index.
    fn line_index(&self, index: LocalByteIndex) -> usize {
        self.lines.partition_point(|&start| start <= index) - 1
    }

    /// The content of the line with the given zero-based index excluding the line break.
    fn line(&self, line: usize) -> &str {
        let start = self.lines[line];
        let end = self
            .lines
            .get(line + 1)
            .map_or(self.local_span().end(), |&next| next - 1);

        &self[LocalSpan::new(start, end)]
    }

    pub fn location(&self, index: LocalByteIndex) -> Location {
        let line = self.line_index(index);
        let column = self[LocalSpan::new(self.lines[line], index)].chars().count() + 1;

        Location {
            line: u32::try_from(line + 1).unwrap_or(u32::MAX),
            column: u32::try_from(column).unwrap_or(u32::MAX),
        }
    }
}

impl Spanning for SourceFile {
    fn span(&self) -> Span {
        self.span
    }
}

impl std::ops::Index<LocalSpan> for SourceFile {
    type Output = str;

    fn index(&self, index: LocalSpan) -> &Self::Output {
        &self.content[Range::from(index)]
    }
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum FileName {
    Anonymous,
    Path(PathBuf),
    Virtual(&'static str),
}

impl FileName {
    pub fn path(&self) -> Option<&PathBuf> {
        obtain!(self, Self::Path(path) => path)
    }
}

impl From<PathBuf> for FileName {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&'static str> for FileName {
    fn from(name: &'static str) -> Self {
        Self::Virtual(name)
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("<anonymous>"),
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Virtual(name) => f.write_str(name),
        }
    }
}
