//! The tokens emitted by the lexer.

use span::{Span, Spanning};
use std::fmt;
use utility::{quoted, Atom, QuoteExt};
use BareToken::*;

/// A token together with its location and the source text it was lexed from.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub bare: BareToken,
    pub span: Span,
    /// The exact source text covered by the span.
    pub image: Atom,
}

impl Token {
    pub const fn new(span: Span, bare: BareToken, image: Atom) -> Self {
        Self { bare, span, image }
    }

    pub const fn name(&self) -> TokenName {
        self.bare.name()
    }

    pub fn identifier(self) -> Option<Atom> {
        utility::obtain!(self.bare, Identifier(identifier) => identifier)
    }
}

impl Spanning for Token {
    fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} {:?}", self.bare, self.span, self.image)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BareToken {
    Identifier(Atom),
    Keyword(Keyword),
    BuiltinTypeName(BuiltinType),
    /// `_`
    Wildcard,
    //
    // Delimiters
    //
    /// `...`
    Varargs,
    /// `---`
    Uninitialized,
    /// `..`
    RangeOf,
    Dot,
    Comma,
    Colon,
    Semicolon,
    OpeningRoundBracket,
    ClosingRoundBracket,
    OpeningSquareBracket,
    ClosingSquareBracket,
    OpeningCurlyBracket,
    ClosingCurlyBracket,
    //
    // Operators
    //
    Operator(Operator),
    /// `=`
    Assign,
    /// `->`
    ThinArrowRight,
    //
    // Literals
    //
    /// An integer literal.
    ///
    /// The digits exclude the radix prefix and any separators.
    Integer { digits: Atom, radix: Radix },
    /// A real literal with its separators removed.
    Real(Atom),
    /// A string literal with its escape sequences resolved.
    Text(Atom),
    Character(char),
    //
    // Other Tokens
    //
    /// A compiler directive like `#load`, excluding the hash sign.
    Directive(Atom),
    EndOfInput,
}

impl BareToken {
    pub const fn name(self) -> TokenName {
        match self {
            Identifier(_) => TokenName::Identifier,
            Keyword(keyword) => TokenName::Keyword(keyword),
            BuiltinTypeName(_) => TokenName::BuiltinTypeName,
            Wildcard => TokenName::Wildcard,
            Varargs => TokenName::Varargs,
            Uninitialized => TokenName::Uninitialized,
            RangeOf => TokenName::RangeOf,
            Dot => TokenName::Dot,
            Comma => TokenName::Comma,
            Colon => TokenName::Colon,
            Semicolon => TokenName::Semicolon,
            OpeningRoundBracket => TokenName::OpeningRoundBracket,
            ClosingRoundBracket => TokenName::ClosingRoundBracket,
            OpeningSquareBracket => TokenName::OpeningSquareBracket,
            ClosingSquareBracket => TokenName::ClosingSquareBracket,
            OpeningCurlyBracket => TokenName::OpeningCurlyBracket,
            ClosingCurlyBracket => TokenName::ClosingCurlyBracket,
            Operator(operator) => TokenName::Operator(operator),
            Assign => TokenName::Assign,
            ThinArrowRight => TokenName::ThinArrowRight,
            Integer { .. } => TokenName::Integer,
            Real(_) => TokenName::Real,
            Text(_) => TokenName::Text,
            Character(_) => TokenName::Character,
            Directive(_) => TokenName::Directive,
            EndOfInput => TokenName::EndOfInput,
        }
    }
}

/// The kind of a token without any payload.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenName {
    Identifier,
    Keyword(Keyword),
    BuiltinTypeName,
    Wildcard,
    Varargs,
    Uninitialized,
    RangeOf,
    Dot,
    Comma,
    Colon,
    Semicolon,
    OpeningRoundBracket,
    ClosingRoundBracket,
    OpeningSquareBracket,
    ClosingSquareBracket,
    OpeningCurlyBracket,
    ClosingCurlyBracket,
    Operator(Operator),
    Assign,
    ThinArrowRight,
    Integer,
    Real,
    Text,
    Character,
    Directive,
    EndOfInput,
}

impl fmt::Display for TokenName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword(keyword) => return write!(f, "keyword {}", keyword.name().quote()),
            Self::Operator(operator) => return write!(f, "operator {}", operator.name().quote()),
            _ => {}
        }

        f.write_str(match self {
            Self::Identifier => "identifier",
            Self::BuiltinTypeName => "builtin type",
            Self::Wildcard => quoted!("_"),
            Self::Varargs => quoted!("..."),
            Self::Uninitialized => quoted!("---"),
            Self::RangeOf => quoted!(".."),
            Self::Dot => quoted!("."),
            Self::Comma => quoted!(","),
            Self::Colon => quoted!(":"),
            Self::Semicolon => quoted!(";"),
            Self::OpeningRoundBracket => quoted!("("),
            Self::ClosingRoundBracket => quoted!(")"),
            Self::OpeningSquareBracket => quoted!("["),
            Self::ClosingSquareBracket => quoted!("]"),
            Self::OpeningCurlyBracket => quoted!("{"),
            Self::ClosingCurlyBracket => quoted!("}"),
            Self::Assign => quoted!("="),
            Self::ThinArrowRight => quoted!("->"),
            Self::Integer => "integer literal",
            Self::Real => "real literal",
            Self::Text => "string literal",
            Self::Character => "character literal",
            Self::Directive => "directive",
            Self::EndOfInput => "end of input",
            Self::Keyword(_) | Self::Operator(_) => unreachable!(),
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Radix {
    Binary,
    Decimal,
    Hexadecimal,
}

impl Radix {
    pub const fn value(self) -> u32 {
        match self {
            Self::Binary => 2,
            Self::Decimal => 10,
            Self::Hexadecimal => 16,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Decimal => "decimal",
            Self::Hexadecimal => "hexadecimal",
        }
    }
}

macro_rules! keywords {
    ($( $Keyword:ident => $name:literal ),* $(,)?) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        pub enum Keyword {
            $( $Keyword ),*
        }

        impl Keyword {
            pub const fn name(self) -> &'static str {
                match self {
                    $( Self::$Keyword => $name ),*
                }
            }

            pub fn parse(source: &str) -> Option<Self> {
                Some(match source {
                    $( $name => Self::$Keyword, )*
                    _ => return None,
                })
            }
        }
    };
}

keywords! {
    As => "as",
    Auto => "auto",
    Break => "break",
    Class => "class",
    Continue => "continue",
    Data => "data",
    Defer => "defer",
    Delete => "delete",
    Each => "each",
    Else => "else",
    Enum => "enum",
    Export => "export",
    Extern => "extern",
    False => "false",
    For => "for",
    Foreign => "foreign",
    Goto => "goto",
    If => "if",
    Impl => "impl",
    In => "in",
    Intern => "intern",
    Lazy => "lazy",
    Let => "let",
    Loop => "loop",
    Match => "match",
    Mod => "mod",
    New => "new",
    Partial => "partial",
    Priv => "priv",
    Proc => "proc",
    Pub => "pub",
    Resume => "resume",
    Return => "return",
    Sealed => "sealed",
    Struct => "struct",
    Trait => "trait",
    True => "true",
    Type => "type",
    Unless => "unless",
    Until => "until",
    Var => "var",
    When => "when",
    While => "while",
    Yield => "yield",
}

macro_rules! builtin_types {
    ($( $Type:ident => $name:literal ),* $(,)?) => {
        /// A type built into the language.
        ///
        /// The registry is fixed which makes builtin types trivially comparable.
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        pub enum BuiltinType {
            $( $Type ),*
        }

        impl BuiltinType {
            pub const fn name(self) -> &'static str {
                match self {
                    $( Self::$Type => $name ),*
                }
            }

            pub fn parse(source: &str) -> Option<Self> {
                Some(match source {
                    $( $name => Self::$Type, )*
                    _ => return None,
                })
            }
        }
    };
}

builtin_types! {
    Void => "void",
    Bool => "bool",
    S8 => "s8",
    S16 => "s16",
    S32 => "s32",
    S64 => "s64",
    S128 => "s128",
    U8 => "u8",
    U16 => "u16",
    U32 => "u32",
    U64 => "u64",
    U128 => "u128",
    R16 => "r16",
    R32 => "r32",
    R64 => "r64",
    R80 => "r80",
    R128 => "r128",
    Int => "int",
    Uint => "uint",
    Usize => "usize",
    Ptrdiff => "ptrdiff",
    Real => "real",
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The class of an infix operator which determines its binding power.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum OperatorClass {
    Logical = 1,
    Relational = 2,
    Shift = 3,
    Bitwise = 4,
    Additive = 5,
    Multiplicative = 6,
}

/// The precedence of the cast suffix `as`, higher than that of any infix operator.
pub const CAST_PRECEDENCE: u8 = 7;

macro_rules! operators {
    ($( $Operator:ident => $name:literal $( : $class:ident )? ),* $(,)?) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        pub enum Operator {
            $( $Operator ),*
        }

        impl Operator {
            pub const fn name(self) -> &'static str {
                match self {
                    $( Self::$Operator => $name ),*
                }
            }

            /// The class of the operator if it can be used in infix position.
            pub const fn class(self) -> Option<OperatorClass> {
                match self {
                    $( Self::$Operator => operators!(@class $( $class )?) ),*
                }
            }
        }

        /// The source representation of every operator-like token.
        pub(crate) const OPERATORS: &[(&str, BareToken)] = &[
            $( ($name, BareToken::Operator(Operator::$Operator)), )*
            ("=", BareToken::Assign),
            ("->", BareToken::ThinArrowRight),
        ];
    };
    (@class $class:ident) => { Some(OperatorClass::$class) };
    (@class) => { None };
}

operators! {
    Plus => "+": Additive,
    Minus => "-": Additive,
    Asterisk => "*": Multiplicative,
    Slash => "/": Multiplicative,
    Percent => "%": Multiplicative,
    Backslash => "\\": Multiplicative,
    Ampersand => "&": Bitwise,
    Pipe => "|": Bitwise,
    Tilde => "~": Bitwise,
    ShiftLeft => "<<": Shift,
    ShiftRight => ">>": Shift,
    Equal => "==": Relational,
    NotEqual => "!=": Relational,
    Greater => ">": Relational,
    GreaterEqual => ">=": Relational,
    Less => "<": Relational,
    LessEqual => "<=": Relational,
    LessGreater => "<>": Relational,
    LessGreaterEqual => "<>=": Relational,
    NotLessGreaterEqual => "!<>=": Relational,
    NotLessGreater => "!<>": Relational,
    NotLessEqual => "!<=": Relational,
    NotLess => "!<": Relational,
    NotGreaterEqual => "!>=": Relational,
    NotGreater => "!>": Relational,
    LogicalAnd => "&&": Logical,
    LogicalOr => "||": Logical,
    LogicalXor => "~~": Logical,
    Bang => "!",
    Caret => "^",
    PlusAssign => "+=",
    MinusAssign => "-=",
    AsteriskAssign => "*=",
    SlashAssign => "/=",
    PercentAssign => "%=",
    BackslashAssign => "\\=",
    ShiftLeftAssign => "<<=",
    ShiftRightAssign => ">>=",
    AmpersandAssign => "&=",
    PipeAssign => "|=",
    TildeAssign => "~=",
}

impl Operator {
    /// The binding power of the operator in infix position.
    pub fn precedence(self) -> Option<u8> {
        self.class().map(|class| class as u8)
    }

    /// Whether the operator can be used in prefix position.
    pub const fn is_prefix(self) -> bool {
        matches!(
            self,
            Self::Minus | Self::Tilde | Self::Bang | Self::Asterisk | Self::Caret
        )
    }

    /// The operator a compound assignment applies, if this is one.
    pub const fn assigned(self) -> Option<Self> {
        Some(match self {
            Self::PlusAssign => Self::Plus,
            Self::MinusAssign => Self::Minus,
            Self::AsteriskAssign => Self::Asterisk,
            Self::SlashAssign => Self::Slash,
            Self::PercentAssign => Self::Percent,
            Self::BackslashAssign => Self::Backslash,
            Self::ShiftLeftAssign => Self::ShiftLeft,
            Self::ShiftRightAssign => Self::ShiftRight,
            Self::AmpersandAssign => Self::Ampersand,
            Self::PipeAssign => Self::Pipe,
            Self::TildeAssign => Self::Tilde,
            _ => return None,
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) const fn is_operator_start(character: char) -> bool {
    matches!(
        character,
        '+' | '-' | '*' | '/' | '%' | '\\' | '&' | '|' | '~' | '<' | '>' | '=' | '!' | '^'
    )
}
