//! Expression parsing
//!
//! Primaries, unary operators, literal materialisation, and call argument
//! lists. Reserved words dispatch to `statements`/`declarations`; anything
//! that is not handled as a primary falls through to prefix-unary parsing.

use std::rc::Rc;

use crate::interpreter::errors::Fault;
use crate::memory::value::Value;
use crate::parser::ast::{Expr, ExprRef};
use crate::parser::lexer::TokenKind;
use crate::parser::parser::Parser;

impl Parser {
    pub(crate) fn parse_primary(&mut self) -> Result<Option<ExprRef>, Fault> {
        match self.current.kind {
            TokenKind::Reserved => self.parse_reserved(),
            TokenKind::Ident => self.parse_identifier(),
            TokenKind::Number => self.parse_number(),
            TokenKind::Str => self.parse_string(),
            TokenKind::CharLit => self.parse_char(),

            TokenKind::Bool => {
                let value = self.current.text == "true";
                self.next_token();
                Ok(Some(Expr::literal(Value::Bool(value))))
            }

            // Empty statement.
            TokenKind::Semicolon => {
                self.next_token();
                Ok(None)
            }

            TokenKind::LBrace => self.parse_statement_list(false).map(Some),
            TokenKind::Arrow => {
                self.next_token();
                self.parse_statement_list(true).map(Some)
            }

            TokenKind::LParen => {
                self.next_token();
                let expr = self.parse()?;
                self.expect(TokenKind::RParen, true)?;
                Ok(expr)
            }

            TokenKind::Eof => Ok(None),

            _ => self.parse_unary(),
        }
    }

    /// Prefix unary: any token that was not handled as a primary becomes a
    /// unary operator applied to the next primary.
    fn parse_unary(&mut self) -> Result<Option<ExprRef>, Fault> {
        let op = self.current.kind;
        let location = self.current.location;
        self.next_token();

        let operand = self.parse_primary()?.ok_or(Fault::Parse {
            message: format!("Operator {} is missing its operand", op),
            location,
        })?;

        Ok(Some(Rc::new(Expr::Unary {
            op,
            operand,
            operation_first: true,
            memory: self.memory.clone(),
        })))
    }

    /// An identifier is a constructor call if a struct of that name is in
    /// the global scope, a function call if followed by `(`, and a variable
    /// reference otherwise.
    fn parse_identifier(&mut self) -> Result<Option<ExprRef>, Fault> {
        let name = self.current.text.clone();
        self.next_token();

        if self.current.kind != TokenKind::LParen {
            return Ok(Some(Rc::new(Expr::Variable(name))));
        }
        self.next_token();
        let args = self.parse_arguments()?;

        let is_struct = self
            .globals
            .borrow()
            .get(&name)
            .is_some_and(|binding| matches!(&*binding, Expr::StructDecl(_)));
        if is_struct {
            return Ok(Some(Rc::new(Expr::Constructor {
                name,
                args,
                globals: self.globals.clone(),
            })));
        }
        Ok(Some(Rc::new(Expr::Call { name, args })))
    }

    fn parse_number(&mut self) -> Result<Option<ExprRef>, Fault> {
        let text = self.current.text.clone();
        let location = self.current.location;
        self.next_token();

        let bad_literal = || Fault::Parse {
            message: format!("Invalid numeric literal '{}'", text),
            location,
        };
        let value = if let Some(stripped) = text.strip_suffix('f') {
            Value::Float32(stripped.parse().map_err(|_| bad_literal())?)
        } else if text.contains('.') {
            Value::Float64(text.parse().map_err(|_| bad_literal())?)
        } else {
            Value::Int(text.parse().map_err(|_| bad_literal())?)
        };
        Ok(Some(Expr::literal(value)))
    }

    /// A string literal is materialised into the data section at parse time;
    /// the expression evaluates to the base address.
    fn parse_string(&mut self) -> Result<Option<ExprRef>, Fault> {
        let text = self.current.text.clone();
        self.next_token();

        let address = self.memory.borrow_mut().intern_string(&text);
        Ok(Some(Expr::literal(Value::Size(address))))
    }

    fn parse_char(&mut self) -> Result<Option<ExprRef>, Fault> {
        let value = self.current.text.chars().next().unwrap_or('\0');
        self.next_token();
        Ok(Some(Expr::literal(Value::Char(value))))
    }

    /// Comma-separated call arguments up to the closing `)`.
    pub(crate) fn parse_arguments(&mut self) -> Result<Vec<ExprRef>, Fault> {
        let mut args = Vec::new();
        while self.current.kind != TokenKind::RParen && self.current.kind != TokenKind::Eof {
            if let Some(arg) = self.parse()? {
                args.push(arg);
            }
            if self.current.kind == TokenKind::Comma {
                self.next_token();
            }
        }
        self.expect(TokenKind::RParen, true)?;
        Ok(args)
    }
}
