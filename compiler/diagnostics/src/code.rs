use std::{fmt, str::FromStr};

/// An error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[forbid(missing_docs)]
pub enum ErrorCode {
    /// Unrecognized character.
    E001,
    /// Invalid digit in number literal.
    E002,
    /// Misplaced digit separator.
    E003,
    /// Unterminated literal.
    E004,
    /// Unexpected end of input.
    E005,
    /// Invalid operator.
    E006,
    /// Unexpected token.
    E010,
    /// Procedure without a name.
    E011,
    /// Incomplete procedure declaration.
    E012,
    /// Struct without a name.
    E013,
    /// Misplaced comma.
    E014,
    /// Unsupported qualified path.
    E015,
    /// Invalid assignment target.
    E016,
    /// Unclosed delimiter.
    E017,
    /// Undefined binding.
    E020,
    /// Binding is not a type.
    E021,
    /// Field access on a non-struct value.
    E022,
    /// Undefined field.
    E023,
    /// Unable to load source file.
    E030,
}

impl ErrorCode {
    pub const ELEMENTS: [Self; 19] = [
        Self::E001,
        Self::E002,
        Self::E003,
        Self::E004,
        Self::E005,
        Self::E006,
        Self::E010,
        Self::E011,
        Self::E012,
        Self::E013,
        Self::E014,
        Self::E015,
        Self::E016,
        Self::E017,
        Self::E020,
        Self::E021,
        Self::E022,
        Self::E023,
        Self::E030,
    ];

    /// A detailed explanation of the error class.
    pub const fn explanation(self) -> &'static str {
        match self {
            Self::E001 => {
                "The lexer encountered a character that cannot start any token. The character \
                 is skipped and lexing continues right after it."
            }
            Self::E002 => {
                "A number literal contains a digit that is not valid for its radix, for \
                 example ‘0b102’ or ‘0xZZ’, or a radix prefix is not followed by any digit."
            }
            Self::E003 => {
                "Underscores may separate the digits of number literals but only a single one \
                 at a time and only between two digits. Leading, trailing and consecutive \
                 separators are reported once per group."
            }
            Self::E004 => {
                "A string or character literal was not closed before the end of the line. \
                 Use a verbatim string delimited by backticks for text spanning several lines."
            }
            Self::E005 => {
                "The input ended in the middle of a construct, for example inside of a block \
                 comment or a string literal."
            }
            Self::E006 => {
                "A sequence of operator characters does not form an operator known to the \
                 language."
            }
            Self::E010 => {
                "The parser found a token that cannot continue the construct it was parsing. \
                 It skips the token and resumes with the next declaration or statement."
            }
            Self::E011 => {
                "A procedure declaration lacks a name in front of its parameter list. The \
                 declaration is still parsed as an anonymous procedure."
            }
            Self::E012 => {
                "A procedure declaration lacks its type or its body. Procedures need a \
                 parameter list and, unless declared ‘extern’, a body introduced by ‘=’ or \
                 a block."
            }
            Self::E013 => {
                "A struct declaration lacks a name in front of its field list."
            }
            Self::E014 => {
                "A comma may only trail the last element of a list. Empty elements like in \
                 ‘(,)’ or ‘(a,,)’ are not permitted."
            }
            Self::E015 => {
                "Type paths consisting of more than a single identifier are not supported \
                 yet."
            }
            Self::E016 => {
                "The left-hand side of an assignment has to denote a location: an \
                 identifier, a field access or a dereference."
            }
            Self::E017 => {
                "A block or a parenthesized list was not closed before the end of the input."
            }
            Self::E020 => {
                "A name was used that is not declared anywhere in scope. Locals are only \
                 visible after their declaration while global declarations are visible in \
                 every file of the compilation unit."
            }
            Self::E021 => {
                "A name used in type position refers to something other than a struct."
            }
            Self::E022 => {
                "Fields can only be accessed on values of struct type."
            }
            Self::E023 => {
                "The struct type of the accessed value does not declare a field of the given \
                 name."
            }
            Self::E030 => {
                "A source file could not be read, either one passed on the command line or \
                 one referenced by a ‘#load’ directive."
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for ErrorCode {
    type Err = ();

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::ELEMENTS
            .into_iter()
            .find(|code| code.to_string().eq_ignore_ascii_case(source))
            .ok_or(())
    }
}
