//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and its core infrastructure:
//! token stepping, expectation checks, the precedence table, and the
//! top-level loop that wraps the whole program in a root statement list.
//!
//! # Parser Architecture
//!
//! Pratt-style precedence parser split across multiple files using
//! `impl Parser` blocks:
//! - this module: state, helpers, the entry `parse` and the binary loop
//! - `expressions`: primaries, unary operators, literals, call arguments
//! - `statements`: `if`/`while`/`for`, control words, statement lists
//! - `declarations`: `var`/`fun`/`struct` forms
//!
//! The parser works against the same live global scope the evaluator will
//! use: struct declarations are registered into it eagerly, which is how
//! `Name(args)` is classified as a constructor call rather than a function
//! call, and how duplicate top-level symbols are refused.

use std::rc::Rc;

use tracing::debug;

use crate::interpreter::errors::Fault;
use crate::memory::heap::MemoryRef;
use crate::memory::scope::ScopeRef;
use crate::parser::ast::{Expr, ExprRef, StatementList};
use crate::parser::lexer::{Lexer, Token, TokenKind};

/// Pratt parser over a token stream.
pub struct Parser {
    lexer: Lexer,
    pub(crate) current: Token,
    pub(crate) globals: ScopeRef,
    pub(crate) memory: MemoryRef,
    root: Option<ExprRef>,
}

impl Parser {
    /// Parse the whole token stream. The returned parser holds the root
    /// statement list, which runs in the scope the driver supplies
    /// (`no_local_scope`).
    pub fn new(mut lexer: Lexer, globals: ScopeRef, memory: MemoryRef) -> Result<Parser, Fault> {
        let current = lexer.next_token();
        let mut parser = Parser {
            lexer,
            current,
            globals,
            memory,
            root: None,
        };

        let mut statements = Vec::new();
        while parser.current.kind != TokenKind::Eof {
            if let Some(expr) = parser.parse()? {
                statements.push(expr);
            }
        }
        debug!(statements = statements.len(), "parsed program root");

        let list = StatementList::new(statements);
        list.no_local_scope.set(true);
        parser.root = Some(Rc::new(Expr::Statements(Rc::new(list))));
        Ok(parser)
    }

    /// Take the root node out of the parser.
    pub fn root(&mut self) -> ExprRef {
        self.root.take().expect("root already taken")
    }

    pub(crate) fn next_token(&mut self) {
        if self.current.kind != TokenKind::Eof {
            self.current = self.lexer.next_token();
        }
    }

    /// Fail unless the current token has the given kind; consume it when
    /// `skip` is set.
    pub(crate) fn expect(&mut self, kind: TokenKind, skip: bool) -> Result<(), Fault> {
        if self.current.kind != kind {
            return Err(Fault::Parse {
                message: format!("Unexpected token {}. Expected: {}", self.current, kind),
                location: self.current.location,
            });
        }
        if skip {
            self.next_token();
        }
        Ok(())
    }

    /// Binding strength of a binary operator; -1 for anything that cannot
    /// continue a binary expression.
    pub(crate) fn precedence(kind: TokenKind) -> i32 {
        use TokenKind::*;
        match kind {
            Eq | PlusEq | MinusEq | StarEq | SlashEq | PercentEq | AmpEq | PipeEq | CaretEq
            | AndAnd | OrOr => 1,
            Plus | Minus | Amp | Pipe | Caret | Lt | Gt | Le | Ge | EqEq | NotEq => 2,
            Star | Slash | Percent => 3,
            Dot => 4,
            _ => -1,
        }
    }

    /// Parse one statement or expression. `None` stands for the empty
    /// statement (`;`).
    pub(crate) fn parse(&mut self) -> Result<Option<ExprRef>, Fault> {
        let left = self.parse_operand()?;
        self.parse_binary_right(0, left)
    }

    /// A primary with its postfix operators attached: trailing `++`/`--`
    /// and any number of `[index]` accesses bind to the primary itself,
    /// tighter than every binary operator.
    fn parse_operand(&mut self) -> Result<Option<ExprRef>, Fault> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.current.kind {
                TokenKind::PlusPlus | TokenKind::MinusMinus if expr.is_some() => {
                    expr = Some(Rc::new(Expr::Unary {
                        op: self.current.kind,
                        operand: expr.take().unwrap(),
                        operation_first: false,
                        memory: self.memory.clone(),
                    }));
                    self.next_token();
                }
                TokenKind::LBracket if expr.is_some() => {
                    let location = self.current.location;
                    self.next_token();
                    let index = self.parse()?.ok_or(Fault::Parse {
                        message: "Expected an index expression inside '[]'".to_string(),
                        location,
                    })?;
                    self.expect(TokenKind::RBracket, true)?;
                    expr = Some(Rc::new(Expr::Index {
                        base: expr.take().unwrap(),
                        index,
                        memory: self.memory.clone(),
                    }));
                }
                _ => return Ok(expr),
            }
        }
    }

    /// The Pratt loop: binary operators of at least `left_prec`.
    pub(crate) fn parse_binary_right(
        &mut self,
        left_prec: i32,
        left: Option<ExprRef>,
    ) -> Result<Option<ExprRef>, Fault> {
        let mut left = left;

        loop {
            let current_prec = Self::precedence(self.current.kind);
            if current_prec < left_prec {
                return Ok(left);
            }

            let op = self.current.kind;
            let location = self.current.location;
            self.next_token();

            let mut right = self.parse_operand()?;
            let next_prec = Self::precedence(self.current.kind);
            if current_prec < next_prec {
                right = self.parse_binary_right(current_prec + 1, right)?;
            }

            let missing = |side: &str| Fault::Parse {
                message: format!("Operator {} is missing its {} operand", op, side),
                location,
            };
            left = Some(Rc::new(Expr::Binary {
                op,
                left: left.ok_or_else(|| missing("left"))?,
                right: right.ok_or_else(|| missing("right"))?,
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::heap::Memory;
    use crate::memory::scope::Scope;
    use crate::parser::ast::StructDecl;

    fn parse_source(source: &str) -> Result<(ExprRef, ScopeRef), Fault> {
        let globals = Scope::root();
        let memory = Memory::shared();
        let lexer = Lexer::from_source(source)?;
        let mut parser = Parser::new(lexer, globals.clone(), memory)?;
        Ok((parser.root(), globals))
    }

    #[test]
    fn test_root_is_a_statement_list() {
        let (root, _) = parse_source("1 + 2; 3;").unwrap();
        let Expr::Statements(list) = &*root else {
            panic!("root should be a statement list");
        };
        assert!(list.no_local_scope.get());
        assert_eq!(list.statements.len(), 2);
    }

    #[test]
    fn test_precedence_shapes_the_tree() {
        let (root, _) = parse_source("2 + 3 * 4").unwrap();
        let Expr::Statements(list) = &*root else {
            panic!();
        };
        let Expr::Binary { op, right, .. } = &*list.statements[0] else {
            panic!("expected binary root");
        };
        assert_eq!(*op, TokenKind::Plus);
        assert!(matches!(
            &**right,
            Expr::Binary {
                op: TokenKind::Star,
                ..
            }
        ));
    }

    #[test]
    fn test_struct_names_become_constructor_calls() {
        let (root, globals) = parse_source("struct Point { var x; var y; } Point(1, 2)").unwrap();
        assert!(globals.borrow().contains("Point"));

        let Expr::Statements(list) = &*root else {
            panic!();
        };
        assert!(matches!(&*list.statements[1], Expr::Constructor { .. }));
    }

    #[test]
    fn test_unknown_names_become_function_calls() {
        let (root, _) = parse_source("whatever(1)").unwrap();
        let Expr::Statements(list) = &*root else {
            panic!();
        };
        assert!(matches!(&*list.statements[0], Expr::Call { .. }));
    }

    #[test]
    fn test_duplicate_symbol_is_fatal() {
        let globals = Scope::root();
        globals
            .borrow_mut()
            .declare("print", Rc::new(Expr::Undefined));
        let lexer = Lexer::from_source("fun print() { 1; }").unwrap();
        let result = Parser::new(lexer, globals, Memory::shared());
        assert!(matches!(result, Err(Fault::Parse { .. })));
    }

    #[test]
    fn test_duplicate_struct_is_fatal() {
        let globals = Scope::root();
        globals.borrow_mut().declare(
            "Point",
            Rc::new(Expr::StructDecl(Rc::new(StructDecl::new("Point")))),
        );
        let lexer = Lexer::from_source("struct Point { var x; }").unwrap();
        assert!(matches!(
            Parser::new(lexer, globals, Memory::shared()),
            Err(Fault::Parse { .. })
        ));
    }

    #[test]
    fn test_postfix_binds_before_binary() {
        let (root, _) = parse_source("i++ + 1").unwrap();
        let Expr::Statements(list) = &*root else {
            panic!();
        };
        let Expr::Binary { left, .. } = &*list.statements[0] else {
            panic!("expected binary root");
        };
        assert!(matches!(
            &**left,
            Expr::Unary {
                op: TokenKind::PlusPlus,
                operation_first: false,
                ..
            }
        ));
    }

    #[test]
    fn test_index_binds_to_its_own_primary() {
        let (root, _) = parse_source("a[0] + b[1]").unwrap();
        let Expr::Statements(list) = &*root else {
            panic!();
        };
        let Expr::Binary { op, left, right } = &*list.statements[0] else {
            panic!("expected binary root");
        };
        assert_eq!(*op, TokenKind::Plus);
        assert!(matches!(&**left, Expr::Index { .. }));
        assert!(matches!(&**right, Expr::Index { .. }));
    }

    #[test]
    fn test_postfix_on_the_right_side_of_assignment() {
        let (root, _) = parse_source("var a = x++").unwrap();
        let Expr::Statements(list) = &*root else {
            panic!();
        };
        let Expr::Binary { op, right, .. } = &*list.statements[0] else {
            panic!("expected binary root");
        };
        assert_eq!(*op, TokenKind::Eq);
        assert!(matches!(
            &**right,
            Expr::Unary {
                op: TokenKind::PlusPlus,
                operation_first: false,
                ..
            }
        ));
    }

    #[test]
    fn test_unexpected_token_reports_location() {
        let result = parse_source("if (true { 1; }");
        let Err(Fault::Parse { message, .. }) = result else {
            panic!("expected a parse fault");
        };
        assert!(message.contains("Expected: ')'"), "{}", message);
    }
}
