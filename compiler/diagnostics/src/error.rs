//! Error handling mechanisms.
//!
//! Passes report their diagnostics as soon as they find a problem and carry on. What flows
//! back to the caller is merely the knowledge that something went wrong, not the error itself.

use crate::reporter::ErasedReportedError;

pub type Result<T = (), E = ErasedReportedError> = std::result::Result<T, E>;

/// The product of a pass together with the information whether it reported errors.
///
/// In contrast to a [`Result`], the value is available even if the pass failed. This lets
/// the lexer and the parser hand out partial results for inspection.
#[derive(Debug)]
#[must_use]
pub struct Outcome<T> {
    pub bare: T,
    pub health: Health,
}

impl<T> Outcome<T> {
    pub const fn new(bare: T, health: Health) -> Self {
        Self { bare, health }
    }
}

/// Whether errors were reported while computing something.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[must_use]
pub enum Health {
    #[default]
    Untainted,
    Tainted(ErasedReportedError),
}

impl Health {
    /// Record the given error unless an earlier one was recorded already.
    pub fn taint(&mut self, error: ErasedReportedError) {
        if *self == Self::Untainted {
            *self = Self::Tainted(error);
        }
    }

    pub fn is_tainted(self) -> bool {
        matches!(self, Self::Tainted(_))
    }
}

impl From<Health> for Result {
    fn from(health: Health) -> Self {
        match health {
            Health::Untainted => Ok(()),
            Health::Tainted(error) => Err(error),
        }
    }
}
