//! Statement parsing
//!
//! Reserved-word dispatch and the control forms: `if`/`else`, `while`,
//! `for`, `return`, `break`, `continue`, plus statement lists and the body
//! shorthand forms (`{ ... }` blocks and `->`/bare single statements).

use std::rc::Rc;

use crate::interpreter::errors::Fault;
use crate::parser::ast::{Expr, ExprRef, StatementList};
use crate::parser::lexer::TokenKind;
use crate::parser::parser::Parser;

impl Parser {
    pub(crate) fn parse_reserved(&mut self) -> Result<Option<ExprRef>, Fault> {
        let word = self.current.text.clone();
        match word.as_str() {
            "var" | "fun" => self.parse_var_or_fun(&word, None),
            "if" => self.parse_if(),
            "while" => self.parse_while(),
            "for" => self.parse_for(),
            "struct" => self.parse_struct(),
            "return" => {
                self.next_token();
                let value = self.parse()?;
                Ok(Some(Rc::new(Expr::Return(value))))
            }
            "break" => {
                self.next_token();
                Ok(Some(Rc::new(Expr::Break)))
            }
            "continue" => {
                self.next_token();
                Ok(Some(Rc::new(Expr::Continue)))
            }
            other => Err(Fault::Parse {
                message: format!("'{}' cannot start a statement", other),
                location: self.current.location,
            }),
        }
    }

    fn parse_if(&mut self) -> Result<Option<ExprRef>, Fault> {
        self.next_token();
        self.expect(TokenKind::LParen, true)?;
        let condition = self.parse()?.ok_or(Fault::Parse {
            message: "Expected a condition after 'if ('".to_string(),
            location: self.current.location,
        })?;
        self.expect(TokenKind::RParen, true)?;

        let then_branch = self.parse_body()?;

        let mut else_branch = None;
        if self.current.kind == TokenKind::Reserved && self.current.text == "else" {
            self.next_token();
            if self.current.kind == TokenKind::Reserved && self.current.text == "if" {
                else_branch = self.parse_if()?;
            } else {
                else_branch = Some(self.parse_body()?);
            }
        }

        Ok(Some(Rc::new(Expr::If {
            condition,
            then_branch,
            else_branch,
        })))
    }

    fn parse_while(&mut self) -> Result<Option<ExprRef>, Fault> {
        self.next_token();
        self.expect(TokenKind::LParen, true)?;
        let condition = self.parse()?.ok_or(Fault::Parse {
            message: "Expected a condition after 'while ('".to_string(),
            location: self.current.location,
        })?;
        self.expect(TokenKind::RParen, true)?;

        let body = self.parse_body()?;
        Ok(Some(Rc::new(Expr::While { condition, body })))
    }

    /// `for (init; cond; step) body` — each clause may be empty. The body
    /// list is marked `no_local_scope` because `for` manages its own init
    /// scope at evaluation time.
    fn parse_for(&mut self) -> Result<Option<ExprRef>, Fault> {
        self.next_token();
        self.expect(TokenKind::LParen, true)?;

        let init = if self.current.kind == TokenKind::Semicolon {
            None
        } else {
            self.parse()?
        };
        self.expect(TokenKind::Semicolon, true)?;

        let condition = if self.current.kind == TokenKind::Semicolon {
            None
        } else {
            self.parse()?
        };
        self.expect(TokenKind::Semicolon, true)?;

        let step = if self.current.kind == TokenKind::RParen {
            None
        } else {
            self.parse()?
        };
        self.expect(TokenKind::RParen, true)?;

        let body = self.parse_body()?;
        if let Expr::Statements(list) = &*body {
            list.no_local_scope.set(true);
        }

        Ok(Some(Rc::new(Expr::For {
            init,
            condition,
            step,
            body,
        })))
    }

    /// A control-form body: a braced block, or a single statement
    /// (optionally introduced by `->`).
    pub(crate) fn parse_body(&mut self) -> Result<ExprRef, Fault> {
        if self.current.kind == TokenKind::Arrow {
            self.next_token();
        }
        self.parse_statement_list(self.current.kind != TokenKind::LBrace)
    }

    /// Parse either a braced list of statements or exactly one statement,
    /// wrapped in a [`StatementList`].
    pub(crate) fn parse_statement_list(&mut self, single: bool) -> Result<ExprRef, Fault> {
        if !single {
            self.expect(TokenKind::LBrace, true)?;
        }

        let mut statements = Vec::new();
        while self.current.kind != TokenKind::RBrace && self.current.kind != TokenKind::Eof {
            if let Some(expr) = self.parse()? {
                statements.push(expr);
            }
            if single {
                break;
            }
        }

        if !single {
            self.expect(TokenKind::RBrace, true)?;
        }
        Ok(Rc::new(Expr::Statements(Rc::new(StatementList::new(
            statements,
        )))))
    }
}
