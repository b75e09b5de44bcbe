//! The lexical analyzer (lexer).
//!
//! The lexer consumes a source file once from left to right and never backtracks over
//! tokens it already emitted. Every recognizer that fails reports its own diagnostic and
//! signals the failure as _handled_ by returning an [`ErasedReportedError`]. The main
//! loop merely taints the health of the outcome in that case.

use diagnostics::{
    error::{Health, Outcome, Result},
    Diagnostic, ErasedReportedError, ErrorCode, Reporter,
};
use span::{LocalByteIndex, LocalSpan, SourceFile, Span};
use std::{iter::Peekable, str::CharIndices};
use token::{is_operator_start, OPERATORS};
use utility::{Atom, QuoteExt};
use BareToken::*;

pub use token::{
    BareToken, BuiltinType, Keyword, Operator, OperatorClass, Radix, Token, TokenName,
    CAST_PRECEDENCE,
};

pub mod token;

#[cfg(test)]
mod test;

/// Lex the given source file.
///
/// The last token is always [`BareToken::EndOfInput`].
pub fn lex(file: &SourceFile, reporter: &Reporter) -> Outcome<Vec<Token>> {
    Lexer::new(file, reporter).lex()
}

/// The state of the lexer.
struct Lexer<'a> {
    file: &'a SourceFile,
    characters: Peekable<CharIndices<'a>>,
    tokens: Vec<Token>,
    local_span: LocalSpan,
    reporter: &'a Reporter,
    health: Health,
}

impl<'a> Lexer<'a> {
    fn new(file: &'a SourceFile, reporter: &'a Reporter) -> Self {
        Self {
            characters: file.content().char_indices().peekable(),
            file,
            tokens: Vec::new(),
            local_span: LocalSpan::default(),
            reporter,
            health: Health::Untainted,
        }
    }

    fn lex(mut self) -> Outcome<Vec<Token>> {
        while let Some((index, character)) = self.peek_with_index() {
            self.local_span = LocalSpan::empty(index);

            let result = match character {
                character if character.is_whitespace() => {
                    self.advance();
                    Ok(())
                }
                '/' if matches!(self.peek_second(), Some('#')) => {
                    self.lex_line_comment();
                    Ok(())
                }
                '/' if matches!(self.peek_second(), Some('*')) => self.lex_block_comment(),
                '.' => {
                    self.lex_dots();
                    Ok(())
                }
                '-' if self.source_ahead().starts_with("---") => {
                    self.consume_many(3, Uninitialized);
                    Ok(())
                }
                '_' if self.peek_second().is_some_and(|character| character.is_ascii_digit()) => {
                    self.lex_number_literal()
                }
                character if is_identifier_start(character) => {
                    self.lex_identifier();
                    Ok(())
                }
                character if is_operator_start(character) => self.lex_operator(),
                character if character.is_ascii_digit() => self.lex_number_literal(),
                '(' => self.consume(OpeningRoundBracket),
                ')' => self.consume(ClosingRoundBracket),
                '[' => self.consume(OpeningSquareBracket),
                ']' => self.consume(ClosingSquareBracket),
                '{' => self.consume(OpeningCurlyBracket),
                '}' => self.consume(ClosingCurlyBracket),
                ',' => self.consume(Comma),
                ':' => self.consume(Colon),
                ';' => self.consume(Semicolon),
                '"' => self.lex_string_literal(),
                '`' => self.lex_verbatim_string_literal(),
                '\'' => self.lex_character_literal(),
                '#' if self.peek_second().is_some_and(is_identifier_start) => {
                    self.lex_directive();
                    Ok(())
                }
                character => {
                    self.take();
                    self.advance();

                    Err(Diagnostic::error()
                        .code(ErrorCode::E001)
                        .message(format!("failed to lex token at {}", character.quote()))
                        .unlabeled_span(self.span())
                        .report(self.reporter))
                }
            };

            if let Err(error) = result {
                self.health.taint(error);
            }
        }

        self.local_span = LocalSpan::empty(self.file.local_span().end());
        self.add(EndOfInput);

        Outcome::new(self.tokens, self.health)
    }

    fn lex_line_comment(&mut self) {
        while let Some(character) = self.peek() {
            self.advance();

            if character == '\n' {
                break;
            }
        }
    }

    /// Lex a block comment.
    ///
    /// Block comments do not nest.
    fn lex_block_comment(&mut self) -> Result {
        // the opener `/*`
        self.take();
        self.advance();
        self.take();
        self.advance();

        let mut previous = None;

        while let Some(character) = self.peek() {
            self.take();
            self.advance();

            if previous == Some('*') && character == '/' {
                return Ok(());
            }

            previous = Some(character);
        }

        Err(Diagnostic::error()
            .code(ErrorCode::E005)
            .message("unterminated block comment, found end of input")
            .span(self.span(), "the comment starts here")
            .report(self.reporter))
    }

    fn lex_dots(&mut self) {
        let source = self.source_ahead();

        if source.starts_with("...") {
            self.consume_many(3, Varargs);
        } else if source.starts_with("..") {
            self.consume_many(2, RangeOf);
        } else {
            self.consume_many(1, Dot);
        }
    }

    fn lex_identifier(&mut self) {
        self.take();
        self.advance();
        self.take_while(is_identifier_middle);

        let source = self.source();

        let token = if source == "_" {
            Wildcard
        } else if let Some(keyword) = Keyword::parse(source) {
            Keyword(keyword)
        } else if let Some(type_) = BuiltinType::parse(source) {
            BuiltinTypeName(type_)
        } else {
            Identifier(source.into())
        };

        self.add(token);
    }

    fn lex_directive(&mut self) {
        // the hash sign
        self.take();
        self.advance();
        self.take_while(is_identifier_middle);

        let name = &self.source()[1..];
        self.add(Directive(name.into()));
    }

    /// Lex an operator by filtering the operator table by the longest matching prefix.
    fn lex_operator(&mut self) -> Result {
        let mut candidates: Vec<_> = OPERATORS.to_vec();
        let mut length = 0;

        while let Some(character) = self.peek() {
            // A comment opener terminates the operator.
            if length != 0 && character == '/' && matches!(self.peek_second(), Some('#' | '*')) {
                break;
            }

            let extended: Vec<_> = candidates
                .iter()
                .copied()
                .filter(|(name, _)| name[length..].starts_with(character))
                .collect();

            if extended.is_empty() {
                break;
            }

            self.take();
            self.advance();
            length += character.len_utf8();
            candidates = extended;
        }

        let source = self.source();

        match candidates.iter().find(|&&(name, _)| name == source) {
            Some(&(_, token)) => {
                self.add(token);
                Ok(())
            }
            None => Err(Diagnostic::error()
                .code(ErrorCode::E006)
                .message(format!("invalid operator {}", source.quote()))
                .unlabeled_span(self.span())
                .report(self.reporter)),
        }
    }

    fn lex_number_literal(&mut self) -> Result {
        let mut radix = Radix::Decimal;
        let mut is_real = false;
        // Groups of characters whose digits are validated against the radix, each
        // delimiting the runs of digit separators.
        let mut groups: Vec<Vec<(LocalByteIndex, char)>> = Vec::new();

        if self.source_ahead().starts_with("0x") || self.source_ahead().starts_with("0b") {
            self.take();
            self.advance();
            radix = match self.peek() {
                Some('x') => Radix::Hexadecimal,
                _ => Radix::Binary,
            };
            self.take();
            self.advance();

            groups.push(self.take_digits(is_identifier_middle));
        } else {
            groups.push(self.take_digits(is_decimal_digit_or_separator));

            if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
                self.take();
                self.advance();
                is_real = true;
                groups.push(self.take_digits(is_decimal_digit_or_separator));
            }

            if let Some('e' | 'E') = self.peek() {
                let mut lookahead = self.characters.clone();
                lookahead.next();
                let is_exponent = match lookahead.next() {
                    Some((_, '+' | '-')) => lookahead
                        .next()
                        .is_some_and(|(_, character)| character.is_ascii_digit()),
                    Some((_, character)) => character.is_ascii_digit(),
                    None => false,
                };

                if is_exponent {
                    self.take();
                    self.advance();
                    if let Some('+' | '-') = self.peek() {
                        self.take();
                        self.advance();
                    }
                    is_real = true;
                    groups.push(self.take_digits(is_decimal_digit_or_separator));
                }
            }

            // Identifier characters directly following are part of the (invalid) literal.
            let tail = self.take_digits(is_identifier_middle);
            if let Some(last) = groups.last_mut() {
                last.extend(tail);
            }
        }

        let mut health = Health::Untainted;

        for group in &groups {
            if let Err(error) = self.check_digit_separators(group) {
                health.taint(error);
            }
        }

        for &(index, character) in groups.iter().flatten() {
            if character == NUMERIC_SEPARATOR || character.is_digit(radix.value()) {
                continue;
            }

            let error = Diagnostic::error()
                .code(ErrorCode::E002)
                .message(format!(
                    "invalid digit {} in {} literal {}",
                    character.quote(),
                    radix.name(),
                    self.source().quote(),
                ))
                .unlabeled_span(LocalSpan::new(index, index + character).global(self.file))
                .report(self.reporter);
            health.taint(error);
        }

        if radix != Radix::Decimal
            && !groups
                .iter()
                .flatten()
                .any(|&(_, character)| character != NUMERIC_SEPARATOR)
        {
            let error = Diagnostic::error()
                .code(ErrorCode::E002)
                .message(format!(
                    "missing digits after the {} prefix",
                    self.source()[..2].quote()
                ))
                .unlabeled_span(self.span())
                .report(self.reporter);
            health.taint(error);
        }

        // The literal is kept even if it is erroneous.
        let token = if is_real {
            Real(self.source().replace(NUMERIC_SEPARATOR, "").into())
        } else {
            let digits: String = groups
                .iter()
                .flatten()
                .map(|&(_, character)| character)
                .filter(|&character| character != NUMERIC_SEPARATOR)
                .collect();
            Integer {
                digits: digits.into(),
                radix,
            }
        };
        self.add(token);

        health.into()
    }

    /// Validate the placement of digit separators inside a group of digits.
    ///
    /// Each maximal run of separators that is not a single separator surrounded by digits
    /// yields exactly one diagnostic.
    fn check_digit_separators(&self, group: &[(LocalByteIndex, char)]) -> Result {
        let mut health = Health::Untainted;
        let mut index = 0;

        while index < group.len() {
            if group[index].1 != NUMERIC_SEPARATOR {
                index += 1;
                continue;
            }

            let start = index;
            while index < group.len() && group[index].1 == NUMERIC_SEPARATOR {
                index += 1;
            }

            let message = if start == 0 {
                "leading digit separator in number literal"
            } else if index == group.len() {
                "trailing digit separator in number literal"
            } else if index - start > 1 {
                "consecutive digit separators in number literal"
            } else {
                continue;
            };

            #[allow(clippy::cast_possible_truncation)]
            let span = LocalSpan::with_length(group[start].0, (index - start) as u32);
            let error = Diagnostic::error()
                .code(ErrorCode::E003)
                .message(message)
                .unlabeled_span(span.global(self.file))
                .report(self.reporter);
            health.taint(error);
        }

        health.into()
    }

    fn take_digits(&mut self, predicate: fn(char) -> bool) -> Vec<(LocalByteIndex, char)> {
        let mut digits = Vec::new();

        while let Some((index, character)) = self.peek_with_index() {
            if !predicate(character) {
                break;
            }
            self.take();
            self.advance();
            digits.push((index, character));
        }

        digits
    }

    fn lex_string_literal(&mut self) -> Result {
        // the opening quote
        self.take();
        self.advance();

        let mut content = String::new();

        loop {
            let Some(character) = self.peek() else {
                return Err(self.unexpected_end_of_input("string"));
            };

            match character {
                '"' => {
                    self.take();
                    self.advance();
                    break;
                }
                '\n' => {
                    return Err(Diagnostic::error()
                        .code(ErrorCode::E004)
                        .message("unterminated string literal")
                        .unlabeled_span(self.span())
                        .report(self.reporter));
                }
                '\\' => {
                    self.take();
                    self.advance();

                    let Some(character) = self.lex_escape_sequence() else {
                        return Err(self.unexpected_end_of_input("string"));
                    };
                    content.push(character);
                }
                character => {
                    self.take();
                    self.advance();
                    content.push(character);
                }
            }
        }

        self.add(Text(content.into()));
        Ok(())
    }

    /// Lex a verbatim string literal delimited by backticks.
    ///
    /// The content is taken literally and may span several lines. Only an escaped backtick
    /// stands for a backtick.
    fn lex_verbatim_string_literal(&mut self) -> Result {
        // the opening backtick
        self.take();
        self.advance();

        let mut content = String::new();

        loop {
            let Some(character) = self.peek() else {
                return Err(self.unexpected_end_of_input("verbatim string"));
            };
            self.take();
            self.advance();

            match character {
                '`' => break,
                '\\' if self.peek() == Some('`') => {
                    self.take();
                    self.advance();
                    content.push('`');
                }
                character => content.push(character),
            }
        }

        self.add(Text(content.into()));
        Ok(())
    }

    fn lex_character_literal(&mut self) -> Result {
        // the opening apostrophe
        self.take();
        self.advance();

        let character = match self.peek() {
            None => return Err(self.unexpected_end_of_input("character")),
            Some('\\') => {
                self.take();
                self.advance();

                match self.lex_escape_sequence() {
                    Some(character) => character,
                    None => return Err(self.unexpected_end_of_input("character")),
                }
            }
            Some(character @ ('\n' | '\'')) => {
                if character == '\'' {
                    self.take();
                    self.advance();
                }

                return Err(Diagnostic::error()
                    .code(ErrorCode::E004)
                    .message(match character {
                        '\'' => "empty character literal",
                        _ => "unterminated character literal",
                    })
                    .unlabeled_span(self.span())
                    .report(self.reporter));
            }
            Some(character) => {
                self.take();
                self.advance();
                character
            }
        };

        match self.peek() {
            Some('\'') => {
                self.take();
                self.advance();
                self.add(Character(character));
                Ok(())
            }
            None => Err(self.unexpected_end_of_input("character")),
            Some(_) => Err(Diagnostic::error()
                .code(ErrorCode::E004)
                .message("unterminated character literal")
                .unlabeled_span(self.span())
                .report(self.reporter)),
        }
    }

    /// Lex the character following a backslash.
    ///
    /// Unknown escape sequences stand for the escaped character itself.
    fn lex_escape_sequence(&mut self) -> Option<char> {
        let character = self.peek()?;
        self.take();
        self.advance();

        Some(match character {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0C}',
            'v' => '\u{0B}',
            character => character,
        })
    }

    fn unexpected_end_of_input(&self, literal: &str) -> ErasedReportedError {
        Diagnostic::error()
            .code(ErrorCode::E005)
            .message(format!(
                "unterminated {literal} literal, found end of input"
            ))
            .span(self.span(), "the literal starts here")
            .report(self.reporter)
    }

    fn span(&self) -> Span {
        self.local_span.global(self.file)
    }

    fn source(&self) -> &'a str {
        &self.file[self.local_span]
    }

    /// The remaining source text starting at the current character.
    fn source_ahead(&mut self) -> &'a str {
        let start = self.index().unwrap_or_else(|| self.file.local_span().end());
        &self.file[LocalSpan::new(start, self.file.local_span().end())]
    }

    /// Step to the next character in the input stream.
    fn advance(&mut self) {
        self.characters.next();
    }

    /// Include the span of the current character in the span of the token-to-be-added.
    ///
    /// Preparation for [`Self::add`].
    fn take(&mut self) {
        if let Some((index, character)) = self.peek_with_index() {
            self.local_span.set_end(index + character);
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.peek_with_index().map(|(_, character)| character)
    }

    fn peek_second(&self) -> Option<char> {
        let mut characters = self.characters.clone();
        characters.next();
        characters.next().map(|(_, character)| character)
    }

    fn peek_with_index(&mut self) -> Option<(LocalByteIndex, char)> {
        self.characters.peek().map(|&(index, character)| {
            (
                LocalByteIndex::try_from(index).unwrap_or_default(),
                character,
            )
        })
    }

    fn index(&mut self) -> Option<LocalByteIndex> {
        self.peek_with_index().map(|(index, _)| index)
    }

    /// [Take](Self::take) the span of all succeeding characters where the predicate holds and step.
    fn take_while(&mut self, predicate: fn(char) -> bool) {
        while let Some(character) = self.peek() {
            if !predicate(character) {
                break;
            }
            self.take();
            self.advance();
        }
    }

    /// Add a token with the given kind to the output of the lexer.
    ///
    /// The span of the token is stored in the lexer and most commonly updated using [`Self::take`].
    fn add(&mut self, token: BareToken) {
        let image = Atom::from(self.source());
        self.tokens.push(Token::new(self.span(), token, image));
    }

    fn consume(&mut self, token: BareToken) -> Result {
        self.consume_many(1, token);
        Ok(())
    }

    fn consume_many(&mut self, amount: usize, token: BareToken) {
        for _ in 0..amount {
            self.take();
            self.advance();
        }
        self.add(token);
    }
}

const NUMERIC_SEPARATOR: char = '_';

fn is_decimal_digit_or_separator(character: char) -> bool {
    character.is_ascii_digit() || character == NUMERIC_SEPARATOR
}

/// Whether the character may start an identifier.
///
/// These are the letters (the general categories Lu, Ll, Lt, Lm, Lo and Nl) and the underscore.
pub fn is_identifier_start(character: char) -> bool {
    character.is_alphabetic() || character == '_'
}

/// Whether the character may continue an identifier.
///
/// Next to the characters that may start one, these are the combining marks (Mn, Mc),
/// the decimal numbers (Nd), the connector punctuation (Pc) and the format characters (Cf).
pub fn is_identifier_middle(character: char) -> bool {
    character.is_alphanumeric()
        || is_combining_mark(character)
        || is_connector_punctuation(character)
        || is_format_character(character)
}

fn is_combining_mark(character: char) -> bool {
    matches!(
        character,
        '\u{0300}'..='\u{036F}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20FF}'
            | '\u{FE20}'..='\u{FE2F}'
    )
}

fn is_connector_punctuation(character: char) -> bool {
    matches!(
        character,
        '_' | '\u{203F}' | '\u{2040}' | '\u{2054}' | '\u{FE33}' | '\u{FE34}' | '\u{FE4D}'..='\u{FE4F}' | '\u{FF3F}'
    )
}

fn is_format_character(character: char) -> bool {
    matches!(
        character,
        '\u{00AD}' | '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}'..='\u{2064}' | '\u{FEFF}'
    )
}
