//! The syntactic analyzer (parser).
//!
//! It is a handwritten top-down recursive-descent parser with bounded look-ahead and
//! look-behind and no backtracking. Infix expressions are parsed by precedence climbing.
//!
//! Every parsing function that fails reports its own diagnostic and returns an
//! [`ErasedReportedError`](diagnostics::ErasedReportedError) to signal to its callers that
//! the failure is already handled. The loops over nodes force the parser forward if a
//! failed node did not consume anything, which lets a single file surface many diagnostics.
//!
//! # Grammar Notation
//!
//! Most parsing functions in this crate are accompanied by a grammar snippet.
//! These snippets are written in an EBNF-flavor explained below:
//!
//! | Notation  | Name                                | Definition or Remark                                          |
//! |-----------|-------------------------------------|---------------------------------------------------------------|
//! | `; C`     | Comment                             | Stretches until the end of the line                           |
//! | `N ::= R` | Definition                          | Defines non-terminal `N` by rule `R`                          |
//! | `A B`     | Sequence                            | Rule `A` immediately followed by rule `B` modulo lexed tokens |
//! | `(A)`     | Grouping                            | To escape default precedence                                  |
//! | <code>A &vert; B</code>   | Ordered Alternative                 | Either `A` or `B` first trying `A` then `B`                   |
//! | `A?`      | Option                              | `A` or nothing (ε)                                            |
//! | `A*`      | Kleene Star (Multiplicity)          | Arbitrarily long sequence of `A`s                             |
//! | `A+`      | Kleene Plus (Positive Multiplicity) | Arbitrarily long non-empty sequence of `A`s                   |
//! | `"T"`     | Terminal                            | Lexed token by textual content                                |
//! | `#T`      | Named Terminal                      | Lexed token by name                                           |

use ast::{File, Node};
use base::{Expected, Parser};
use diagnostics::{error::Outcome, Diagnostic, ErrorCode, Reporter};
use lexer::{BareToken::*, Keyword, Token, TokenName};
use span::{SourceFileIndex, SourceMap};
use utility::{Atom, QuoteExt};

mod base;
mod declaration;
mod expression;
mod r#type;

#[cfg(test)]
mod test;

/// Parse the tokens of the given source file.
///
/// Nodes that could not be parsed are left out of the returned file.
pub fn parse(
    tokens: Vec<Token>,
    file: SourceFileIndex,
    map: &SourceMap,
    reporter: &Reporter,
) -> Outcome<File> {
    let mut parser = Parser::new(tokens, &map[file], reporter);
    let nodes = parser.parse_top_level();

    Outcome::new(
        File {
            index: file,
            nodes,
        },
        parser.health,
    )
}

impl Parser<'_> {
    /// Parse the nodes of a file.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Top-Level ::= (";" | Node)* #End-Of-Input
    /// ```
    fn parse_top_level(&mut self) -> Vec<Node> {
        let mut nodes = Vec::new();

        loop {
            match self.token().bare {
                EndOfInput => break nodes,
                Semicolon => self.advance(),
                _ => {
                    if let Some(node) = self.parse_node_recovering() {
                        nodes.push(node);
                    }
                }
            }
        }
    }

    /// Parse a node and make sure that the parser moves forward even if it fails.
    fn parse_node_recovering(&mut self) -> Option<Node> {
        let position = self.position();
        let node = self.parse_node().ok();

        if node.is_none() && self.position() == position {
            self.advance();
        }

        node
    }

    /// Parse a declaration or a statement.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Node ::= Declaration | Statement
    /// Declaration ::= Procedure | Extern-Procedure | Struct | Binding | Load
    /// ```
    fn parse_node(&mut self) -> diagnostics::error::Result<Node> {
        let token = self.token();

        match token.bare {
            Keyword(Keyword::Extern) => {
                self.advance();
                if self.token().name() != TokenName::Keyword(Keyword::Proc) {
                    return Err(self.error(
                        Expected::Token(TokenName::Keyword(Keyword::Proc))
                            .but_actual_is(self.token())
                            .label(token, "external declarations have to be procedures"),
                    ));
                }
                self.parse_procedure(Some(token)).map(Node::from)
            }
            Keyword(Keyword::Proc) => self.parse_procedure(None).map(Node::from),
            Keyword(Keyword::Struct) => self.parse_struct().map(Node::from),
            Keyword(Keyword::Let | Keyword::Var) => self.parse_binding().map(Node::from),
            Directive(name) if name == Atom::LOAD => self.parse_load().map(Node::from),
            _ if self.token_begins_expression() => self.parse_statement(),
            EndOfInput => Err(self.error(
                Expected::OneOf(vec![Expected::Declaration, Expected::Expression])
                    .but_actual_is(token),
            )),
            _ => Err(self.error(
                Diagnostic::error()
                    .code(ErrorCode::E010)
                    .message(format!("failed to parse at token {}", token.image.quote()))
                    .span(token, "expected a declaration or an expression"),
            )),
        }
    }
}
