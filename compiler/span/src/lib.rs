//! Data structures and procedures for handling source locations.

pub use source_map::{FileName, LineWithHighlight, Location, SourceFile, SourceFileIndex, SourceMap};
pub use spanning::{PossiblySpanning, Spanning};
use std::{
    cmp::Ordering,
    fmt,
    ops::{Add, AddAssign, Range, Sub},
};

pub mod source_map;

macro_rules! byte_index {
    ($( #[$attr:meta] )* $Index:ident) => {
        $( #[$attr] )*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Default)]
        pub struct $Index(u32);

        impl $Index {
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            pub const fn value(self) -> u32 {
                self.0
            }
        }

        impl Add<u32> for $Index {
            type Output = Self;

            fn add(self, offset: u32) -> Self::Output {
                Self(self.0 + offset)
            }
        }

        impl AddAssign<u32> for $Index {
            fn add_assign(&mut self, offset: u32) {
                self.0 += offset;
            }
        }

        impl Sub<u32> for $Index {
            type Output = Self;

            fn sub(self, offset: u32) -> Self::Output {
                Self(self.0 - offset)
            }
        }

        impl TryFrom<usize> for $Index {
            type Error = std::num::TryFromIntError;

            fn try_from(index: usize) -> Result<Self, Self::Error> {
                Ok(Self(index.try_into()?))
            }
        }
    };
}

macro_rules! byte_span {
    ($( #[$attr:meta] )* $Span:ident over $Index:ident) => {
        $( #[$attr] )*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $Span {
            /// The start of the span, inclusive.
            start: $Index,
            /// The end of the span, exclusive.
            end: $Index,
        }

        impl $Span {
            #[track_caller]
            pub fn new(start: $Index, end: $Index) -> Self {
                debug_assert!(
                    start <= end,
                    "span start ({}) > span end ({})",
                    start.0,
                    end.0
                );

                Self { start, end }
            }

            /// Create an empty span at the given index.
            pub fn empty(index: $Index) -> Self {
                Self::new(index, index)
            }

            pub fn with_length(start: $Index, length: u32) -> Self {
                Self::new(start, start + length)
            }

            pub fn start(self) -> $Index {
                self.start
            }

            pub fn end(self) -> $Index {
                self.end
            }

            pub fn length(self) -> u32 {
                self.end.0 - self.start.0
            }

            pub fn is_empty(self) -> bool {
                self.start == self.end
            }

            pub fn contains(self, index: $Index) -> bool {
                self.start <= index && index <= self.end
            }

            pub fn set_end(&mut self, index: $Index) {
                self.end = index;
            }

            /// Relate the index to this span.
            ///
            /// Indices in front of the span are [less](Ordering::Less), indices behind it are
            /// [greater](Ordering::Greater) and contained ones are [equal](Ordering::Equal).
            pub fn relate(self, index: $Index) -> Ordering {
                if index < self.start {
                    Ordering::Less
                } else if self.end <= index {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            }
        }

        impl fmt::Debug for $Span {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}..{}", self.start.0, self.end.0)
            }
        }
    };
}

byte_index! {
    /// A global byte index.
    ///
    /// Here, "global" means relative to a [source map](SourceMap).
    ByteIndex
}

byte_index! {
    /// A file-local byte index.
    LocalByteIndex
}

byte_span! {
    /// A global byte span of source code.
    ///
    /// The default span (starting at the unmapped index zero) denotes an unknown location.
    Span over ByteIndex
}

byte_span! {
    /// A span inside a single source file.
    LocalSpan over LocalByteIndex
}

impl ByteIndex {
    /// Map a global byte index to a local one.
    pub fn local(self, file: &SourceFile) -> LocalByteIndex {
        LocalByteIndex::new(self.0 - file.span().start.0)
    }
}

impl LocalByteIndex {
    /// Map a local byte index to a global one.
    pub fn global(self, file: &SourceFile) -> ByteIndex {
        ByteIndex::new(file.span().start.0 + self.0)
    }
}

impl Add<char> for LocalByteIndex {
    type Output = Self;

    fn add(self, character: char) -> Self::Output {
        #![allow(clippy::cast_possible_truncation)] // always within 1..=4
        self + character.len_utf8() as u32
    }
}

impl From<LocalByteIndex> for usize {
    fn from(index: LocalByteIndex) -> Self {
        index.0 as _
    }
}

impl Span {
    pub fn local(self, file: &SourceFile) -> LocalSpan {
        LocalSpan::new(self.start.local(file), self.end.local(file))
    }

    /// Extend this span to the end of the given one if there is one.
    #[must_use]
    pub fn merge(self, other: impl PossiblySpanning) -> Self {
        match other.possible_span() {
            Some(other) => Self::new(self.start, other.end),
            None => self,
        }
    }

    /// In-place version of [`Self::merge`] passing the argument through.
    pub fn merging<S: PossiblySpanning>(&mut self, other: S) -> S {
        if let Some(other) = other.possible_span() {
            self.end = other.end;
        }
        other
    }
}

impl Spanning for Span {
    fn span(&self) -> Self {
        *self
    }
}

impl LocalSpan {
    pub fn global(self, file: &SourceFile) -> Span {
        Span::new(self.start.global(file), self.end.global(file))
    }
}

impl From<LocalSpan> for Range<usize> {
    fn from(span: LocalSpan) -> Self {
        span.start.into()..span.end.into()
    }
}

/// Convenience function for constructing a global span for test code.
pub fn span(start: u32, end: u32) -> Span {
    Span::new(ByteIndex::new(start), ByteIndex::new(end))
}

mod spanning {
    use super::Span;

    pub trait Spanning: PossiblySpanning {
        fn span(&self) -> Span;
    }

    impl<S: Spanning> Spanning for &S {
        fn span(&self) -> Span {
            (**self).span()
        }
    }

    impl<S: Spanning> Spanning for Box<S> {
        fn span(&self) -> Span {
            (**self).span()
        }
    }

    pub trait PossiblySpanning {
        fn possible_span(&self) -> Option<Span>;
    }

    impl<S: Spanning> PossiblySpanning for S {
        fn possible_span(&self) -> Option<Span> {
            Some(self.span())
        }
    }

    impl<S: Spanning> PossiblySpanning for Vec<S> {
        fn possible_span(&self) -> Option<Span> {
            self.first().map(|item| {
                let mut span = item.span();
                span.merging(self.last());
                span
            })
        }
    }

    impl<S: PossiblySpanning> PossiblySpanning for Option<S> {
        fn possible_span(&self) -> Option<Span> {
            self.as_ref().and_then(<_>::possible_span)
        }
    }

    impl<S: PossiblySpanning> PossiblySpanning for &Option<S> {
        fn possible_span(&self) -> Option<Span> {
            (**self).possible_span()
        }
    }

    impl<S: Spanning> PossiblySpanning for &Vec<S> {
        fn possible_span(&self) -> Option<Span> {
            (**self).possible_span()
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Spanned<Bare> {
    pub bare: Bare,
    pub span: Span,
}

impl<Bare> Spanned<Bare> {
    pub const fn new(span: Span, bare: Bare) -> Self {
        Self { bare, span }
    }

    pub fn map<U>(self, mapper: impl FnOnce(Bare) -> U) -> Spanned<U> {
        Spanned::new(self.span, mapper(self.bare))
    }

    pub const fn as_ref(&self) -> Spanned<&Bare> {
        Spanned::new(self.span, &self.bare)
    }
}

impl<Bare> Spanning for Spanned<Bare> {
    fn span(&self) -> Span {
        self.span
    }
}

impl<Bare: fmt::Debug> fmt::Debug for Spanned<Bare> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?}", self.bare, self.span)
    }
}

impl<Bare: fmt::Display> fmt::Display for Spanned<Bare> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.bare.fmt(f)
    }
}

#[cfg(test)]
mod test {
    use super::{span, ByteIndex, PossiblySpanning, Span};
    use std::cmp::Ordering;

    #[test]
    fn merge_extends_to_the_end() {
        assert_eq!(span(3, 5).merge(span(8, 12)), span(3, 12));
        assert_eq!(span(3, 5).merge(None::<Span>), span(3, 5));
    }

    #[test]
    fn merging_passes_the_argument_through() {
        let mut whole = span(1, 2);
        let part = whole.merging(span(4, 9));

        assert_eq!(part, span(4, 9));
        assert_eq!(whole, span(1, 9));
    }

    #[test]
    fn vector_span_covers_first_to_last() {
        assert_eq!(
            vec![span(2, 3), span(5, 6), span(9, 10)].possible_span(),
            Some(span(2, 10))
        );
        assert_eq!(Vec::<Span>::new().possible_span(), None);
    }

    #[test]
    fn relate_index_to_span() {
        let subject = span(4, 8);

        assert_eq!(subject.relate(ByteIndex::new(2)), Ordering::Less);
        assert_eq!(subject.relate(ByteIndex::new(4)), Ordering::Equal);
        assert_eq!(subject.relate(ByteIndex::new(8)), Ordering::Greater);
    }
}
