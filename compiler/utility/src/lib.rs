//! Utility functionality and definitions.

use difference::{Changeset, Difference};
use std::{ffi::OsStr, fmt, io::Write, path::Path};

pub use atom::Atom;
pub use num_bigint::BigUint as Nat;
pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

pub mod atom;
pub mod paint;

pub const FILE_EXTENSION: &str = "cad";

pub type Str = std::borrow::Cow<'static, str>;

pub type SmallVec<T, const N: usize> = smallvec::SmallVec<[T; N]>;

pub fn has_file_extension(path: &Path, required_extension: &str) -> bool {
    path.extension().and_then(OsStr::to_str) == Some(required_extension)
}

#[macro_export]
macro_rules! obtain {
    ($expr:expr, $pat:pat $( if $guard:expr )? $(,)? => $mapping:expr $(,)?) => {
        match $expr {
            $pat $( if $guard )? => Some($mapping),
            _ => None
        }
    };
}

pub fn default<T: Default>() -> T {
    T::default()
}

/// Render the line-wise difference between two texts.
///
/// Lines only present in `original` are prefixed with `-`, lines only present in
/// `edit` with `+`. Used by tests to explain mismatches of large debug representations.
pub fn difference(original: &str, edit: &str, split: &str) -> String {
    let mut buffer = Vec::new();

    // The provided Display implementation for Changesets is unreadable when whitespace differs.
    for difference in Changeset::new(original, edit, split).diffs {
        // Writing to a vector cannot fail.
        let _ = match difference {
            Difference::Same(lines) => lines
                .lines()
                .try_for_each(|line| writeln!(buffer, "  {line}")),
            Difference::Add(lines) => lines
                .lines()
                .chain(lines.is_empty().then_some(""))
                .try_for_each(|line| writeln!(buffer, "+ {line}")),
            Difference::Rem(lines) => lines
                .lines()
                .chain(lines.is_empty().then_some(""))
                .try_for_each(|line| writeln!(buffer, "- {line}")),
        };
    }

    String::from_utf8_lossy(&buffer).into_owned()
}

pub trait FormatError {
    fn format(self) -> String;
}

impl FormatError for std::io::Error {
    fn format(self) -> String {
        self.to_string()
    }
}

pub trait ListingExt {
    fn list(self, conjunction: Conjunction) -> String;
}

impl<I> ListingExt for I
where
    I: Iterator + Clone,
    I::Item: fmt::Display,
{
    fn list(self, conjunction: Conjunction) -> String {
        use std::fmt::Write;

        let mut this = self.peekable();
        let mut first = true;
        let mut result = String::new();

        while let Some(item) = this.next() {
            if !first {
                if this.peek().is_some() {
                    result += ", ";
                } else {
                    let _ = write!(result, " {conjunction} ");
                }
            }

            let _ = write!(result, "{item}");
            first = false;
        }

        result
    }
}

#[derive(Clone, Copy)]
pub enum Conjunction {
    And,
    Or,
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "and",
            Self::Or => "or",
        })
    }
}

/// Use the singular or the plural form of the given word depending on the given amount.
///
/// # Examples
///
/// ```
/// # use utility::pluralize;
/// assert_eq!(pluralize!(1, "factor"), "factor");
/// assert_eq!(pluralize!(15, "factor"), "factors");
/// assert_eq!(pluralize!(0, "person", "people"), "people");
/// ```
#[macro_export]
macro_rules! pluralize {
    ($amount:expr, $singular:expr, $plural:expr $(,)?) => {
        match $amount {
            1 => std::borrow::Cow::<'_, str>::from($singular),
            _ => $plural.into(),
        }
    };
    ($amount:expr, $singular:literal $(,)?) => {
        match $amount {
            1 => $singular,
            _ => concat!($singular, "s"),
        }
    };
}

pub trait QuoteExt {
    fn quote(self) -> String;
}

impl<D: fmt::Display> QuoteExt for D {
    fn quote(self) -> String {
        format!("‘{self}’")
    }
}

#[macro_export]
macro_rules! quoted {
    ($code:expr) => {
        concat!("‘", $code, "’")
    };
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn listing_no_elements() {
        assert_eq!(std::iter::empty::<u8>().list(Conjunction::And), "");
    }

    #[test]
    fn listing_one_element() {
        assert_eq!(std::iter::once(1).list(Conjunction::Or), "1");
    }

    #[test]
    fn listing_two_elements() {
        assert_eq!(
            [false, true].into_iter().list(Conjunction::And),
            "false and true"
        );
    }

    #[test]
    fn listing_three_elements() {
        assert_eq!([1, 2, 3].into_iter().list(Conjunction::Or), "1, 2 or 3");
    }

    #[test]
    fn difference_marks_changed_lines() {
        let rendered = difference("alpha\nbeta\ngamma", "alpha\ndelta\ngamma", "\n");
        assert!(rendered.contains("- beta"));
        assert!(rendered.contains("+ delta"));
        assert!(rendered.contains("  alpha"));
    }

    #[test]
    fn quoting() {
        assert_eq!("main".quote(), "‘main’");
        assert_eq!(quoted!("proc"), "‘proc’");
    }
}
