use crate::base::{Expected, Parser};
use ast::{BareExpression, Binding, BindingKind, Declaration, Expression, Load, Procedure, Struct};
use diagnostics::{error::Result, Diagnostic, ErrorCode};
use lexer::{BareToken::*, Keyword, Token, TokenName};
use span::{Span, Spanned};
use utility::{Atom, QuoteExt};

impl Parser<'_> {
    /// Parse a procedure declaration.
    ///
    /// The keyword `extern` has already been consumed if the given token is present.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Procedure ::= "proc" (#Identifier | #Operator)? Procedure-Type ("=" Expression | Block)
    /// Extern-Procedure ::= "extern" "proc" (#Identifier | #Operator)? Procedure-Type
    /// ```
    pub(crate) fn parse_procedure(&mut self, extern_: Option<Token>) -> Result<Declaration> {
        let keyword = self.consume(TokenName::Keyword(Keyword::Proc))?;
        let mut span = extern_.map_or(keyword.span, |extern_| extern_.span.merge(keyword));

        let binder = self.parse_procedure_binder(keyword)?;

        if self.token().bare != OpeningRoundBracket {
            return Err(self.error(
                Diagnostic::error()
                    .code(ErrorCode::E012)
                    .message("the procedure is missing a type")
                    .span(keyword, "incomplete procedure")
                    .label(self.token(), "expected a parameter list here"),
            ));
        }

        let signature = self.parse_signature()?;
        span = span.merge(signature.span);

        let body = if extern_.is_some() {
            None
        } else {
            let body = match self.token().bare {
                Assign => {
                    self.advance();
                    self.parse_expression()?
                }
                OpeningCurlyBracket => self.parse_block()?,
                _ => {
                    return Err(self.error(
                        Diagnostic::error()
                            .code(ErrorCode::E012)
                            .message("the procedure is missing a body")
                            .span(keyword, "incomplete procedure")
                            .label(self.token(), "expected ‘=’ or ‘{’ here")
                            .help("prefix the declaration with ‘extern’ to declare an external procedure"),
                    ))
                }
            };
            Some(span.merging(body))
        };

        Ok(Spanned::new(
            span,
            Procedure {
                binder,
                parameters: signature.parameters,
                is_variadic: signature.is_variadic,
                result: signature.result,
                body,
                is_extern: extern_.is_some(),
                symbol: None,
            }
            .into(),
        ))
    }

    /// Parse the name of a procedure.
    ///
    /// A missing name is tolerated if the parameter list follows.
    fn parse_procedure_binder(&mut self, keyword: Token) -> Result<Option<Spanned<Atom>>> {
        let token = self.token();

        match token.bare {
            Identifier(binder) => {
                self.advance();
                Ok(Some(Spanned::new(token.span, binder)))
            }
            Operator(operator) => {
                self.advance();
                Ok(Some(Spanned::new(token.span, operator.name().into())))
            }
            OpeningRoundBracket => {
                self.error(
                    Diagnostic::error()
                        .code(ErrorCode::E011)
                        .message("the procedure declaration is missing a name")
                        .span(keyword, "unnamed procedure")
                        .label(token, "expected a name before the parameter list"),
                );
                Ok(None)
            }
            _ if self.look_ahead(1).bare == OpeningRoundBracket => {
                self.error(
                    Diagnostic::error()
                        .code(ErrorCode::E011)
                        .message(format!(
                            "invalid token {} for a procedure name",
                            token.image.quote()
                        ))
                        .span(token, "expected an identifier or an operator"),
                );
                self.advance();
                Ok(None)
            }
            _ => Err(self.error(
                Diagnostic::error()
                    .code(ErrorCode::E011)
                    .message("failed to parse a procedure declaration, is ‘proc’ a typo?")
                    .span(keyword, "expected a procedure declaration to start here")
                    .label(token, "found neither a name nor a parameter list"),
            )),
        }
    }

    /// Parse a struct declaration.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Struct ::= "struct" #Identifier? "{" (Field ("," | ";")?)* "}"
    /// Field ::= #Identifier ":" Type
    /// ```
    pub(crate) fn parse_struct(&mut self) -> Result<Declaration> {
        let keyword = self.consume(TokenName::Keyword(Keyword::Struct))?;
        let token = self.token();

        let binder = match token.bare {
            Identifier(binder) => {
                self.advance();
                Some(Spanned::new(token.span, binder))
            }
            OpeningCurlyBracket => {
                self.error(
                    Diagnostic::error()
                        .code(ErrorCode::E013)
                        .message("the struct declaration is missing a name")
                        .span(keyword, "unnamed struct")
                        .label(token, "expected a name before the fields"),
                );
                None
            }
            _ => {
                return Err(self.error(
                    Expected::Token(TokenName::Identifier)
                        .but_actual_is(token)
                        .label(keyword, "struct declaration"),
                ))
            }
        };

        let opening = self.consume(TokenName::OpeningCurlyBracket)?;
        let mut fields = Vec::new();

        let closing = loop {
            let token = self.token();

            match token.bare {
                ClosingCurlyBracket => {
                    self.advance();
                    break token;
                }
                EndOfInput => return Err(self.unclosed(opening)),
                _ => {
                    let binder = self.consume_identifier()?;
                    self.consume(TokenName::Colon)?;
                    let type_ = self.parse_type()?;

                    fields.push(Binding {
                        kind: BindingKind::Field,
                        binder,
                        type_: Some(type_),
                        initializer: None,
                        symbol: None,
                    });

                    if !self.has_consumed(TokenName::Comma) {
                        let _ = self.has_consumed(TokenName::Semicolon);
                    }
                }
            }
        };

        Ok(Spanned::new(
            keyword.span.merge(closing),
            Struct {
                binder,
                fields,
                symbol: None,
            }
            .into(),
        ))
    }

    /// Parse a binding declaration.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Binding ::= ("let" | "var") #Identifier (":" Type)? ("=" (Expression | "---"))?
    /// ```
    pub(crate) fn parse_binding(&mut self) -> Result<Declaration> {
        let keyword = self.token();
        let kind = match keyword.bare {
            Keyword(Keyword::Var) => BindingKind::Var,
            _ => BindingKind::Let,
        };
        self.advance();

        let binder = self.consume_identifier()?;
        let mut span = keyword.span.merge(&binder);

        let type_ = match self.consume_span(TokenName::Colon) {
            Some(_) => Some(span.merging(self.parse_type()?)),
            None => None,
        };

        let initializer = match self.consume_span(TokenName::Assign) {
            Some(_) => {
                let token = self.token();

                let initializer = if token.bare == Uninitialized {
                    self.advance();
                    Expression::new(token.span, BareExpression::Uninitialized)
                } else {
                    self.parse_expression()?
                };

                Some(span.merging(initializer))
            }
            None => None,
        };

        Ok(Spanned::new(
            span,
            Binding {
                kind,
                binder,
                type_,
                initializer,
                symbol: None,
            }
            .into(),
        ))
    }

    /// Parse a load directive.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Load ::= "#load" #String
    /// ```
    pub(crate) fn parse_load(&mut self) -> Result<Declaration> {
        let directive = self.token();
        self.advance();

        let token = self.token();
        let Text(path) = token.bare else {
            return Err(self.error(
                Expected::Token(TokenName::Text)
                    .but_actual_is(token)
                    .label(directive, "the path of the loaded file has to follow"),
            ));
        };
        self.advance();

        Ok(Spanned::new(
            directive.span.merge(token),
            Load {
                path: Spanned::new(token.span, path),
            }
            .into(),
        ))
    }
}

/// The parameters and the result type of a procedure.
pub(crate) struct Signature {
    pub(crate) parameters: Vec<Binding>,
    pub(crate) is_variadic: bool,
    pub(crate) result: Option<ast::Type>,
    pub(crate) span: Span,
}
