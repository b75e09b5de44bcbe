use crate::base::{Expected, Parser};
use ast::{
    Assignment, BareExpression, Block, Cast, Defer, Delete, Expression, FieldIndex, If, Infix,
    IntegerLiteral, Invocation, New, Node, Prefix, Reference, TypeInfo, While,
};
use diagnostics::{error::Result, Diagnostic, ErrorCode};
use lexer::{BareToken::*, BuiltinType, Keyword, Operator, TokenName};
use span::Spanned;
use utility::{Atom, Nat, QuoteExt};

impl Parser<'_> {
    /// Parse a statement.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Statement ::= Expression (("=" | #Assignment-Operator) Expression)?
    /// ```
    pub(crate) fn parse_statement(&mut self) -> Result<Node> {
        let target = self.parse_expression()?;

        let token = self.token();
        let operator = match token.bare {
            Assign => None,
            Operator(operator) => match operator.assigned() {
                Some(operator) => Some(Spanned::new(token.span, operator)),
                None => return Ok(target.into()),
            },
            _ => return Ok(target.into()),
        };
        self.advance();

        let value = self.parse_expression()?;

        if !target.is_place() {
            return Err(self.error(
                Diagnostic::error()
                    .code(ErrorCode::E016)
                    .message("invalid assignment target")
                    .span(&target, "cannot be assigned to")
                    .label(token, "assignment")
                    .note("only bindings, fields and dereferenced pointers can be assigned to"),
            ));
        }

        Ok(Assignment {
            span: target.span.merge(&value),
            target,
            operator,
            value,
        }
        .into())
    }

    /// Parse an expression.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Expression ::= Prefix (#Infix-Operator Prefix)*
    /// ```
    ///
    /// Infix operators are resolved by precedence climbing. An operator only continues the
    /// expression if it starts on the line on which the preceeding token ends.
    pub(crate) fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_infix(u8::MIN)
    }

    fn parse_infix(&mut self, minimum_precedence: u8) -> Result<Expression> {
        let mut left = self.parse_prefix()?;

        while let Some((operator, precedence)) = self.infix_operator() {
            if precedence < minimum_precedence {
                break;
            }
            self.advance();

            // left-associative at equal precedence
            let right = self.parse_infix(precedence + 1)?;

            left = Expression::new(
                left.span.merge(&right),
                Infix {
                    left,
                    operator,
                    right,
                }
                .into(),
            );
        }

        Ok(left)
    }

    /// The current token if it is an infix operator continuing the current line.
    fn infix_operator(&self) -> Option<(Spanned<Operator>, u8)> {
        let token = self.token();
        let Operator(operator) = token.bare else {
            return None;
        };
        let precedence = operator.precedence()?;

        self.is_on_same_line()
            .then(|| (Spanned::new(token.span, operator), precedence))
    }

    /// Parse a prefix expression.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Prefix ::= #Prefix-Operator Prefix | Primary Suffix*
    /// ```
    fn parse_prefix(&mut self) -> Result<Expression> {
        let token = self.token();

        match token.bare {
            Operator(operator) if operator.is_prefix() => {
                self.advance();
                let operand = self.parse_prefix()?;

                Ok(Expression::new(
                    token.span.merge(&operand),
                    Prefix {
                        operator: Spanned::new(token.span, operator),
                        operand,
                    }
                    .into(),
                ))
            }
            _ => {
                let primary = self.parse_primary()?;
                self.parse_suffixes(primary)
            }
        }
    }

    /// Parse the suffixes of an expression.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Suffix ::= "as" Type | "(" Comma-List(Expression) ")" | "." #Identifier
    /// ```
    fn parse_suffixes(&mut self, mut expression: Expression) -> Result<Expression> {
        loop {
            let token = self.token();

            expression = match token.bare {
                Keyword(Keyword::As) => {
                    self.advance();
                    let type_ = self.parse_type()?;
                    let result = type_.bare.clone();

                    Expression::new(
                        expression.span.merge(&type_),
                        Cast { expression, type_ }.into(),
                    )
                    .typed(result)
                }
                OpeningRoundBracket => {
                    self.advance();
                    let (arguments, closing) = self.parse_comma_separated(
                        token,
                        TokenName::ClosingRoundBracket,
                        Self::parse_expression,
                    )?;

                    Expression::new(
                        expression.span.merge(closing),
                        Invocation {
                            callee: expression,
                            arguments,
                        }
                        .into(),
                    )
                }
                Dot => {
                    self.advance();
                    let field = self.consume_identifier()?;

                    Expression::new(
                        expression.span.merge(&field),
                        FieldIndex {
                            target: expression,
                            field,
                        }
                        .into(),
                    )
                }
                _ => break Ok(expression),
            };
        }
    }

    /// Whether the current token may start an expression.
    pub(crate) fn token_begins_expression(&self) -> bool {
        match self.token().bare {
            Keyword(keyword) => matches!(
                keyword,
                Keyword::True
                    | Keyword::False
                    | Keyword::If
                    | Keyword::Unless
                    | Keyword::While
                    | Keyword::Until
                    | Keyword::New
                    | Keyword::Delete
                    | Keyword::Defer
            ),
            Operator(operator) => operator.is_prefix(),
            Directive(name) => name == Atom::CHAR,
            Identifier(_)
            | Integer { .. }
            | Real(_)
            | Text(_)
            | Character(_)
            | OpeningRoundBracket
            | OpeningCurlyBracket => true,
            _ => false,
        }
    }

    /// Parse a primary expression.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Primary ::=
    ///     | "true" | "false"
    ///     | #Integer | #Real | #String | #Character
    ///     | "#char" #String
    ///     | #Identifier
    ///     | "(" Expression ")"
    ///     | Block
    ///     | ("if" | "unless") Expression Expression ("else" Expression)?
    ///     | ("while" | "until") Expression Expression ("else" Expression)?
    ///     | "new" Type
    ///     | "delete" Expression
    ///     | "defer" Node
    /// ```
    fn parse_primary(&mut self) -> Result<Expression> {
        let token = self.token();
        let span = token.span;

        let expression = match token.bare {
            Keyword(keyword @ (Keyword::True | Keyword::False)) => {
                self.advance();
                Expression::new(span, BareExpression::Bool(keyword == Keyword::True))
                    .typed(BuiltinType::Bool.into())
            }
            Integer { digits, radix } => {
                self.advance();
                // invalid digits were already reported by the lexer
                let value = Nat::parse_bytes(digits.to_str().as_bytes(), radix.value())
                    .unwrap_or_default();

                Expression::new(span, IntegerLiteral { value, radix }.into())
                    .typed(BuiltinType::Int.into())
            }
            Real(literal) => {
                self.advance();
                Expression::new(span, BareExpression::Real(literal))
                    .typed(BuiltinType::Real.into())
            }
            Text(literal) => {
                self.advance();
                Expression::new(span, BareExpression::Text(literal))
                    .typed(TypeInfo::pointer(BuiltinType::S8.into()))
            }
            Character(literal) => {
                self.advance();
                Expression::new(span, BareExpression::Character(literal))
                    .typed(BuiltinType::U32.into())
            }
            Directive(name) if name == Atom::CHAR => self.parse_character_directive()?,
            Identifier(identifier) => {
                self.advance();
                Expression::new(
                    span,
                    Reference {
                        identifier: Spanned::new(span, identifier),
                        symbol: None,
                    }
                    .into(),
                )
            }
            OpeningRoundBracket => {
                self.advance();
                let mut expression = self.parse_expression()?;

                let closing = match self.token().bare {
                    EndOfInput => return Err(self.unclosed(token)),
                    _ => self.consume(TokenName::ClosingRoundBracket)?,
                };
                expression.span = span.merge(closing);
                expression
            }
            OpeningCurlyBracket => self.parse_block()?,
            Keyword(keyword @ (Keyword::If | Keyword::Unless)) => {
                self.advance();
                let condition = self.parse_expression()?;
                let consequent = self.parse_expression()?;
                let alternative = self.parse_alternative()?;

                Expression::new(
                    span.merge(&consequent).merge(&alternative),
                    If {
                        is_negated: keyword == Keyword::Unless,
                        condition,
                        consequent,
                        alternative,
                    }
                    .into(),
                )
            }
            Keyword(keyword @ (Keyword::While | Keyword::Until)) => {
                self.advance();
                let condition = self.parse_expression()?;
                let body = self.parse_expression()?;
                let alternative = self.parse_alternative()?;

                Expression::new(
                    span.merge(&body).merge(&alternative),
                    While {
                        is_negated: keyword == Keyword::Until,
                        condition,
                        body,
                        alternative,
                    }
                    .into(),
                )
            }
            Keyword(Keyword::New) => {
                self.advance();
                let type_ = self.parse_type()?;
                let result = TypeInfo::pointer(type_.bare.clone());

                Expression::new(span.merge(&type_), New { type_ }.into()).typed(result)
            }
            Keyword(Keyword::Delete) => {
                self.advance();
                let operand = self.parse_expression()?;

                Expression::new(span.merge(&operand), Delete { operand }.into())
            }
            Keyword(Keyword::Defer) => {
                self.advance();
                let node = self.parse_node()?;

                Expression::new(span.merge(&node), Defer { node }.into())
            }
            _ => return Err(self.error(Expected::Expression.but_actual_is(token))),
        };

        Ok(expression)
    }

    /// Parse the optional alternative of a conditional or a loop.
    fn parse_alternative(&mut self) -> Result<Option<Expression>> {
        if self.has_consumed(TokenName::Keyword(Keyword::Else)) {
            self.parse_expression().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Parse a character literal written as a string literal.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Character-Directive ::= "#char" #String
    /// ```
    fn parse_character_directive(&mut self) -> Result<Expression> {
        let directive = self.token();
        self.advance();

        let token = self.token();
        let Text(literal) = token.bare else {
            return Err(self.error(Expected::Token(TokenName::Text).but_actual_is(token)));
        };
        self.advance();

        let mut characters = literal.to_str().chars();
        let (Some(character), None) = (characters.next(), characters.next()) else {
            return Err(self.error(
                Diagnostic::error()
                    .message(format!(
                        "the string literal {} does not consist of exactly one character",
                        literal.quote()
                    ))
                    .span(token, "expected a single character")
                    .label(directive, "required by this directive"),
            ));
        };

        Ok(
            Expression::new(directive.span.merge(token), BareExpression::Character(character))
                .typed(BuiltinType::U32.into()),
        )
    }

    /// Parse a block.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Block ::= "{" (";" | Node)* "}"
    /// ```
    pub(crate) fn parse_block(&mut self) -> Result<Expression> {
        let opening = self.consume(TokenName::OpeningCurlyBracket)?;
        let mut nodes = Vec::new();

        let closing = loop {
            let token = self.token();

            match token.bare {
                ClosingCurlyBracket => {
                    self.advance();
                    break token;
                }
                Semicolon => self.advance(),
                EndOfInput => return Err(self.unclosed(opening)),
                _ => {
                    if let Some(node) = self.parse_node_recovering() {
                        nodes.push(node);
                    }
                }
            }
        };

        Ok(Expression::new(
            opening.span.merge(closing),
            Block { nodes }.into(),
        ))
    }
}
