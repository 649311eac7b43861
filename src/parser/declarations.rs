//! Declaration parsing
//!
//! `var`, `fun`, and `struct` forms. Struct declarations are entered into
//! the global scope as soon as their name is read — before the body is
//! parsed — so that the rest of the program (including the struct's own
//! methods) can already resolve the name. A `var`/`fun` whose name collides
//! with an existing global symbol is a fatal parse error.

use std::rc::Rc;

use crate::interpreter::errors::Fault;
use crate::memory::value::Value;
use crate::parser::ast::{Expr, ExprRef, StatementList, StructDecl};
use crate::parser::lexer::TokenKind;
use crate::parser::parser::Parser;

impl Parser {
    /// Parse `var NAME` or `fun NAME(params) body`. `enclosing_struct` is
    /// the name of the struct whose body is being parsed, if any; a method
    /// may share that name (it becomes the constructor).
    pub(crate) fn parse_var_or_fun(
        &mut self,
        word: &str,
        enclosing_struct: Option<&str>,
    ) -> Result<Option<ExprRef>, Fault> {
        let location = self.current.location;
        self.next_token();
        self.expect(TokenKind::Ident, false)?;
        let name = self.current.text.clone();
        self.next_token();

        if enclosing_struct != Some(name.as_str()) && self.globals.borrow().contains(&name) {
            return Err(Fault::Parse {
                message: format!("Symbol '{}' already exists", name),
                location,
            });
        }

        if word == "var" {
            return Ok(Some(Rc::new(Expr::VarDecl {
                name,
                init: Expr::literal(Value::Int(0)),
            })));
        }

        self.expect(TokenKind::LParen, true)?;
        let params = self.parse_params()?;
        let body = self.parse_body()?;

        let Expr::Statements(list) = &*body else {
            unreachable!("parse_body always yields a statement list");
        };
        let function = StatementList::function(list.statements.clone(), params);
        Ok(Some(Rc::new(Expr::FunctionDecl {
            name,
            body: Rc::new(function),
        })))
    }

    /// Declared parameter names, each held as a `VarDecl` so the body entry
    /// code can bind arguments by name.
    fn parse_params(&mut self) -> Result<Vec<ExprRef>, Fault> {
        let mut params = Vec::new();
        while self.current.kind != TokenKind::RParen && self.current.kind != TokenKind::Eof {
            self.expect(TokenKind::Ident, false)?;
            let name = self.current.text.clone();
            self.next_token();
            params.push(Rc::new(Expr::VarDecl {
                name,
                init: Expr::literal(Value::Int(0)),
            }));
            if self.current.kind == TokenKind::Comma {
                self.next_token();
            }
        }
        self.expect(TokenKind::RParen, true)?;
        Ok(params)
    }

    /// `struct NAME { var ...; fun ...; }`. The declaration is also the
    /// expression's result, so a root-level struct re-installs itself when
    /// the root list is evaluated.
    pub(crate) fn parse_struct(&mut self) -> Result<Option<ExprRef>, Fault> {
        let location = self.current.location;
        self.next_token();
        self.expect(TokenKind::Ident, false)?;
        let name = self.current.text.clone();
        self.next_token();

        if self.globals.borrow().contains(&name) {
            return Err(Fault::Parse {
                message: format!("Symbol '{}' already exists", name),
                location,
            });
        }

        let decl = Rc::new(StructDecl::new(&name));
        self.globals
            .borrow_mut()
            .declare(&name, Rc::new(Expr::StructDecl(decl.clone())));

        self.expect(TokenKind::LBrace, true)?;
        while self.current.kind != TokenKind::RBrace {
            if self.current.kind == TokenKind::Semicolon {
                self.next_token();
                continue;
            }
            if self.current.kind != TokenKind::Reserved
                || (self.current.text != "var" && self.current.text != "fun")
            {
                return Err(Fault::Parse {
                    message: format!(
                        "Unexpected token {} in struct body. Expected: 'var' or 'fun'",
                        self.current
                    ),
                    location: self.current.location,
                });
            }

            let word = self.current.text.clone();
            let member = self
                .parse_var_or_fun(&word, Some(&name))?
                .expect("member declarations always yield a node");

            match &*member {
                Expr::VarDecl { name: field, .. } => {
                    // Only value fields take part in positional construction.
                    decl.order.borrow_mut().push(field.clone());
                    decl.content.borrow_mut().insert(field.clone(), member.clone());
                }
                Expr::FunctionDecl { name: method, .. } => {
                    decl.content.borrow_mut().insert(method.clone(), member.clone());
                }
                _ => unreachable!("struct members are var or fun declarations"),
            }
        }
        self.next_token();

        Ok(Some(Rc::new(Expr::StructDecl(decl))))
    }
}
