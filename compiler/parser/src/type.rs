use crate::{
    base::{Expected, Parser},
    declaration::Signature,
};
use ast::{Binding, BindingKind, ParameterType, ProcedureType, QualifiedType, Type, TypeInfo};
use diagnostics::{error::Result, Diagnostic, ErrorCode};
use lexer::{BareToken::*, Operator, Token, TokenName};
use span::{Span, Spanned};
use utility::Atom;

impl Parser<'_> {
    /// Parse a type.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Type ::=
    ///     | "*" Type
    ///     | #Builtin-Type-Name
    ///     | #Identifier ("." #Identifier)*
    ///     | Procedure-Type
    /// ```
    pub(crate) fn parse_type(&mut self) -> Result<Type> {
        let token = self.token();

        match token.bare {
            Operator(Operator::Asterisk) => {
                self.advance();
                let pointee = self.parse_type()?;

                Ok(Spanned::new(
                    token.span.merge(&pointee),
                    TypeInfo::pointer(pointee.bare),
                ))
            }
            BuiltinTypeName(type_) => {
                self.advance();
                Ok(Spanned::new(token.span, type_.into()))
            }
            Identifier(_) => self.parse_qualified_type(),
            OpeningRoundBracket => {
                let signature = self.parse_signature()?;

                Ok(Spanned::new(
                    signature.span,
                    ProcedureType {
                        parameters: signature
                            .parameters
                            .into_iter()
                            .map(|parameter| ParameterType {
                                binder: (parameter.binder.bare != Atom::UNDERSCORE)
                                    .then_some(parameter.binder.bare),
                                type_: parameter.declared_type(),
                            })
                            .collect(),
                        is_variadic: signature.is_variadic,
                        result: signature
                            .result
                            .map_or(TypeInfo::VOID, |result| result.bare),
                    }
                    .into(),
                ))
            }
            _ => Err(self.error(Expected::Type.but_actual_is(token))),
        }
    }

    /// Parse a type referenced by name.
    ///
    /// Only paths consisting of a single identifier are supported.
    fn parse_qualified_type(&mut self) -> Result<Type> {
        let path = self.consume_identifier()?;
        let mut span = path.span;

        if self.token().bare != Dot {
            return Ok(Spanned::new(
                span,
                QualifiedType { path, symbol: None }.into(),
            ));
        }

        while self.has_consumed(TokenName::Dot) {
            span = span.merge(&self.consume_identifier()?);
        }

        Err(self.error(
            Diagnostic::error()
                .code(ErrorCode::E015)
                .message("qualified paths with more than one segment are not supported yet")
                .span(span, "unsupported path"),
        ))
    }

    /// Parse the parameters and the result type of a procedure.
    ///
    /// The parenthesized list is always a procedure type. Without an arrow, the result
    /// type is `void`.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Procedure-Type ::= "(" Comma-List(Parameter) ")" ("->" Type)?
    /// Parameter ::= ((#Identifier | "_") ":")? Type | "..."
    /// ```
    pub(crate) fn parse_signature(&mut self) -> Result<Signature> {
        let opening = self.consume(TokenName::OpeningRoundBracket)?;
        let (parameters, closing) = self.parse_comma_separated(
            opening,
            TokenName::ClosingRoundBracket,
            Self::parse_parameter,
        )?;
        let mut span = opening.span.merge(closing);

        let count = parameters.len();
        let mut bindings = Vec::with_capacity(count);
        let mut is_variadic = false;

        for (index, parameter) in parameters.into_iter().enumerate() {
            match parameter {
                Parameter::Binding(binding) => bindings.push(binding),
                Parameter::Varargs(_) if index + 1 == count => is_variadic = true,
                Parameter::Varargs(varargs) => {
                    return Err(self.error(
                        Diagnostic::error()
                            .code(ErrorCode::E010)
                            .message("the variadic marker ‘...’ has to be the last parameter")
                            .span(varargs, "misplaced variadic marker"),
                    ));
                }
            }
        }

        let result = match self.consume_span(TokenName::ThinArrowRight) {
            Some(_) => Some(span.merging(self.parse_type()?)),
            None => None,
        };

        Ok(Signature {
            parameters: bindings,
            is_variadic,
            result,
            span,
        })
    }

    fn parse_parameter(&mut self) -> Result<Parameter> {
        let token = self.token();

        if token.bare == Varargs {
            self.advance();
            return Ok(Parameter::Varargs(token.span));
        }

        let binder = match token.bare {
            Identifier(binder) if self.look_ahead(1).bare == Colon => Some(binder),
            Wildcard if self.look_ahead(1).bare == Colon => Some(Atom::UNDERSCORE),
            _ => None,
        };
        let binder = binder.map(|binder| {
            self.advance();
            self.advance();
            Spanned::new(token.span, binder)
        });

        let type_ = self.parse_type()?;

        Ok(Parameter::Binding(Binding {
            kind: BindingKind::Parameter,
            binder: binder.unwrap_or(Spanned::new(type_.span, Atom::UNDERSCORE)),
            type_: Some(type_),
            initializer: None,
            symbol: None,
        }))
    }

    /// Parse the elements of a comma-separated list up to and including the closing delimiter.
    ///
    /// The opening delimiter has already been consumed.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Comma-List(Element) ::= (Element ("," Element)* ","?)?
    /// ```
    ///
    /// A trailing comma is only allowed right before the closing delimiter.
    pub(crate) fn parse_comma_separated<T>(
        &mut self,
        opening: Token,
        closing: TokenName,
        mut parse_element: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<(Vec<T>, Token)> {
        let mut elements = Vec::new();

        loop {
            let token = self.token();

            match token.bare {
                _ if token.name() == closing => {
                    self.advance();
                    break Ok((elements, token));
                }
                EndOfInput => break Err(self.unclosed(opening)),
                Comma => {
                    let diagnostic = Diagnostic::error()
                        .code(ErrorCode::E014)
                        .message("misplaced comma")
                        .span(token, "unexpected comma");

                    break Err(self.error(if elements.is_empty() {
                        diagnostic.note("the list does not contain any elements yet")
                    } else {
                        diagnostic.note(format!(
                            "a trailing comma is only allowed right before {closing}"
                        ))
                    }));
                }
                _ => {}
            }

            elements.push(parse_element(self)?);

            if self.has_consumed(TokenName::Comma) {
                continue;
            }

            let token = self.token();
            if token.name() != closing {
                break Err(match token.bare {
                    EndOfInput => self.unclosed(opening),
                    _ => self.error(
                        Expected::OneOf(vec![TokenName::Comma.into(), closing.into()])
                            .but_actual_is(token),
                    ),
                });
            }
        }
    }
}

enum Parameter {
    Binding(Binding),
    /// `...`
    Varargs(Span),
}
