use ast::Identifier;
use diagnostics::{
    error::{Health, Result},
    Diagnostic, ErasedReportedError, ErrorCode, Reporter,
};
use lexer::{BareToken, Token, TokenName};
use span::{SourceFile, Span, Spanned, Spanning};
use std::fmt;
use utility::{Atom, Conjunction, ListingExt};

/// The parser.
pub(crate) struct Parser<'a> {
    tokens: Vec<Token>,
    index: usize,
    pub(crate) file: &'a SourceFile,
    reporter: &'a Reporter,
    pub(crate) health: Health,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(mut tokens: Vec<Token>, file: &'a SourceFile, reporter: &'a Reporter) -> Self {
        if !tokens
            .last()
            .is_some_and(|token| token.bare == BareToken::EndOfInput)
        {
            let end = Span::empty(file.span().end());
            tokens.push(Token::new(end, BareToken::EndOfInput, Atom::EMPTY));
        }

        Self {
            tokens,
            index: 0,
            file,
            reporter,
            health: Health::Untainted,
        }
    }

    /// Report an error and taint the health of the parse.
    pub(crate) fn error(&mut self, diagnostic: Diagnostic) -> ErasedReportedError {
        let error = diagnostic.report(self.reporter);
        self.health.taint(error);
        error
    }

    pub(crate) fn expect(&mut self, expected: TokenName) -> Result<Token> {
        let token = self.token();

        if token.name() == expected {
            Ok(token)
        } else {
            Err(self.error(Expected::Token(expected).but_actual_is(token)))
        }
    }

    /// [Expect] the current token to match the given name and [advance] on success.
    ///
    /// [Expect]: Self::expect
    /// [advance]: Self::advance
    pub(crate) fn consume(&mut self, expected: TokenName) -> Result<Token> {
        let token = self.expect(expected)?;
        self.advance();
        Ok(token)
    }

    pub(crate) fn consume_identifier(&mut self) -> Result<Identifier> {
        let token = self.token();

        match token.bare {
            BareToken::Identifier(identifier) => {
                self.advance();
                Ok(Spanned::new(token.span, identifier))
            }
            _ => Err(self.error(Expected::Token(TokenName::Identifier).but_actual_is(token))),
        }
    }

    /// Consume the current token if it matches the given name.
    ///
    /// Returns whether the token was found and skipped.
    #[must_use]
    pub(crate) fn has_consumed(&mut self, expected: TokenName) -> bool {
        self.consume_span(expected).is_some()
    }

    pub(crate) fn consume_span(&mut self, expected: TokenName) -> Option<Span> {
        let token = self.token();

        if token.name() == expected {
            self.advance();
            Some(token.span)
        } else {
            None
        }
    }

    /// Step to the next token.
    ///
    /// Doesn't advance past [`EndOfInput`](BareToken::EndOfInput).
    pub(crate) fn advance(&mut self) {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
    }

    /// Get the current token.
    pub(crate) fn token(&self) -> Token {
        self.tokens[self.index]
    }

    /// Look ahead by the given amount of tokens.
    ///
    /// Looking past the end yields [`EndOfInput`](BareToken::EndOfInput).
    pub(crate) fn look_ahead(&self, amount: usize) -> Token {
        let index = (self.index + amount).min(self.tokens.len() - 1);
        self.tokens[index]
    }

    pub(crate) fn preceeding_token(&self) -> Option<Token> {
        Some(self.tokens[self.index.checked_sub(1)?])
    }

    /// The position of the parser inside of the token stream.
    pub(crate) fn position(&self) -> usize {
        self.index
    }

    /// Whether the current token starts on the line on which the preceeding token ended.
    pub(crate) fn is_on_same_line(&self) -> bool {
        let Some(preceeding) = self.preceeding_token() else {
            return true;
        };

        let gap = Span::new(preceeding.span.end(), self.token().span.start()).local(self.file);
        !self.file[gap].contains('\n')
    }

    /// Report a delimiter that is still open at the end of the input.
    pub(crate) fn unclosed(&mut self, opening: Token) -> ErasedReportedError {
        let end = self.token();

        self.error(
            Diagnostic::error()
                .code(ErrorCode::E017)
                .message(format!("unclosed delimiter {}", opening.name()))
                .span(opening, "unclosed delimiter")
                .label(end, "end of input reached here"),
        )
    }
}

pub(crate) enum Expected {
    Token(TokenName),
    Expression,
    Type,
    Declaration,
    OneOf(Vec<Self>),
}

impl Expected {
    pub(crate) fn but_actual_is(self, actual: Token) -> Diagnostic {
        Diagnostic::error()
            .code(ErrorCode::E010)
            .message(format!("found {} but expected {self}", actual.name()))
            .span(actual, "unexpected token")
    }
}

impl From<TokenName> for Expected {
    fn from(token: TokenName) -> Self {
        Self::Token(token)
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(token) => write!(f, "{token}"),
            Self::Expression => f.write_str("expression"),
            Self::Type => f.write_str("type"),
            Self::Declaration => f.write_str("declaration"),
            Self::OneOf(expected) => write!(f, "{}", expected.iter().list(Conjunction::Or)),
        }
    }
}
