//! Recursive-descent, precedence-climbing parser over a pre-lexed token
//! stream, grounded on `original_source/src/parser/parser.py`'s control flow
//! (`peek`/`consume`/`parse_logic`/`parse_comparison`/`parse_sum`/
//! `parse_term`/`parse_factor`) re-expressed with `Result`-based error
//! propagation instead of exceptions.

use crate::ast::{BinOpKind, CompoundOpKind, Expr, Program, Stmt, UnOpKind};
use crate::error::OilError;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    lines: Vec<&'a str>,
}

/// Lexes then parses `source`, producing the top-level statement sequence.
pub fn parse(source: &str) -> Result<Program, OilError> {
    let tokens = Lexer::lex_all(source)?;
    Parser::new(tokens, source).parse_program()
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, source: &'a str) -> Self {
        Parser {
            tokens,
            pos: 0,
            lines: source.lines().collect(),
        }
    }

    fn source_line(&self, line: usize) -> &'a str {
        self.lines.get(line.saturating_sub(1)).copied().unwrap_or("")
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek2(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// The line to blame when there's no current token left to point at.
    fn trailing_line(&self) -> usize {
        self.tokens.last().map(|t| t.line).unwrap_or(1)
    }

    fn unexpected_eof(&self, message: &str) -> OilError {
        let line = self.trailing_line();
        OilError::parse(message, line, self.source_line(line))
    }

    /// Consumes the current token if it has the given kind, else fails.
    fn consume(&mut self, kind: TokenKind) -> Result<Token, OilError> {
        match self.peek() {
            None => Err(self.unexpected_eof("Unexpected end of input")),
            Some(tok) if tok.is(kind) => Ok(self.advance().unwrap()),
            Some(tok) => {
                let message = format!("Expected {kind}, got {}", tok.kind);
                let source_line = self.source_line(tok.line);
                Err(OilError::unexpected(tok, message, source_line))
            }
        }
    }

    /// Consumes the current token if it is an `OP` with the exact lexeme.
    fn consume_op(&mut self, lexeme: &str) -> Result<Token, OilError> {
        match self.peek() {
            None => Err(self.unexpected_eof("Unexpected end of input")),
            Some(tok) if tok.is(TokenKind::Op) && tok.text() == lexeme => Ok(self.advance().unwrap()),
            Some(tok) => {
                let message = format!("Expected {lexeme}, got {}", tok.text());
                let source_line = self.source_line(tok.line);
                Err(OilError::unexpected(tok, message, source_line))
            }
        }
    }

    pub fn parse_program(&mut self) -> Result<Program, OilError> {
        let mut stmts = Vec::new();
        while self.peek().is_some() {
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, OilError> {
        self.consume(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !matches!(self.peek(), Some(t) if t.is(TokenKind::RBrace)) {
            if self.peek().is_none() {
                return Err(self.unexpected_eof("Unexpected end of input"));
            }
            stmts.push(self.parse_stmt()?);
        }
        self.consume(TokenKind::RBrace)?;
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, OilError> {
        let tok = match self.peek() {
            Some(t) => t.clone(),
            None => return Err(self.unexpected_eof("Unexpected end of input")),
        };

        match tok.kind {
            TokenKind::While => self.parse_while(),
            TokenKind::Print => {
                self.advance();
                let expr = self.parse_expr()?;
                self.consume(TokenKind::Semi)?;
                Ok(Stmt::Print(expr))
            }
            TokenKind::If => self.parse_if(),
            TokenKind::Id => {
                let next = self.peek2().cloned();
                match next {
                    Some(n) if n.is(TokenKind::Op) && n.text() == "=" => {
                        let name = self.advance().unwrap().text().to_string();
                        self.consume_op("=")?;
                        let expr = self.parse_expr()?;
                        self.consume(TokenKind::Semi)?;
                        Ok(Stmt::Assign { name, expr })
                    }
                    Some(n) if n.is(TokenKind::CompoundOp) => {
                        let name = self.advance().unwrap().text().to_string();
                        let op_tok = self.advance().unwrap();
                        // Every lexeme the lexer's COMPOUND_OP pattern can
                        // produce maps to a variant here; whether the
                        // compiler can lower it is the compiler's call.
                        let op = compound_op_kind(op_tok.text());
                        let expr = self.parse_expr()?;
                        self.consume(TokenKind::Semi)?;
                        Ok(Stmt::CompoundAssign { name, op, expr })
                    }
                    _ => Err(OilError::unexpected(
                        &tok,
                        format!("Unexpected identifier {}, expected assignment", tok.text()),
                        self.source_line(tok.line),
                    )),
                }
            }
            _ => Err(OilError::unexpected(
                &tok,
                format!("Unexpected token {tok}"),
                self.source_line(tok.line),
            )),
        }
    }

    fn parse_while(&mut self) -> Result<Stmt, OilError> {
        self.consume(TokenKind::While)?;
        self.consume(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.consume(TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Stmt::While { cond, body })
    }

    fn parse_if(&mut self) -> Result<Stmt, OilError> {
        self.consume(TokenKind::If)?;
        self.consume(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.consume(TokenKind::RParen)?;
        let then_block = self.parse_block()?;
        let else_block = if matches!(self.peek(), Some(t) if t.is(TokenKind::Else)) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_block,
            else_block,
        })
    }

    // ---- expression grammar, lowest to highest precedence ----

    fn parse_expr(&mut self) -> Result<Expr, OilError> {
        self.parse_logic()
    }

    fn parse_logic(&mut self) -> Result<Expr, OilError> {
        let mut node = self.parse_comparison()?;
        while let Some(tok) = self.peek() {
            if !tok.is(TokenKind::LogicalOp) {
                break;
            }
            let op = match tok.text() {
                "&&" => BinOpKind::And,
                "||" => BinOpKind::Or,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            node = Expr::BinOp {
                op,
                left: Box::new(node),
                right: Box::new(right),
            };
        }
        Ok(node)
    }

    fn parse_comparison(&mut self) -> Result<Expr, OilError> {
        let mut node = self.parse_sum()?;
        while let Some(tok) = self.peek() {
            if !tok.is(TokenKind::Op) {
                break;
            }
            let op = match tok.text() {
                "==" => BinOpKind::Eq,
                "!=" => BinOpKind::Ne,
                "<" => BinOpKind::Lt,
                "<=" => BinOpKind::Le,
                ">" => BinOpKind::Gt,
                ">=" => BinOpKind::Ge,
                _ => break,
            };
            self.advance();
            let right = self.parse_sum()?;
            node = Expr::BinOp {
                op,
                left: Box::new(node),
                right: Box::new(right),
            };
        }
        Ok(node)
    }

    fn parse_sum(&mut self) -> Result<Expr, OilError> {
        let mut node = self.parse_term()?;
        while let Some(tok) = self.peek() {
            if !tok.is(TokenKind::Op) {
                break;
            }
            let op = match tok.text() {
                "+" => BinOpKind::Add,
                "-" => BinOpKind::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            node = Expr::BinOp {
                op,
                left: Box::new(node),
                right: Box::new(right),
            };
        }
        Ok(node)
    }

    fn parse_term(&mut self) -> Result<Expr, OilError> {
        let mut node = self.parse_factor()?;
        while let Some(tok) = self.peek() {
            if !tok.is(TokenKind::Op) {
                break;
            }
            let op = match tok.text() {
                "*" => BinOpKind::Mul,
                "/" => BinOpKind::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            node = Expr::BinOp {
                op,
                left: Box::new(node),
                right: Box::new(right),
            };
        }
        Ok(node)
    }

    fn parse_factor(&mut self) -> Result<Expr, OilError> {
        let tok = match self.peek() {
            Some(t) => t.clone(),
            None => return Err(self.unexpected_eof("Unexpected end of input in factor")),
        };

        match tok.kind {
            TokenKind::Not => {
                self.advance();
                let expr = self.parse_factor()?;
                Ok(Expr::UnOp {
                    op: UnOpKind::Not,
                    expr: Box::new(expr),
                })
            }
            TokenKind::Number => {
                self.advance();
                let value = match tok.value {
                    crate::token::TokenValue::Int(v) => v,
                    _ => unreachable!("NUMBER token always carries an Int value"),
                };
                Ok(Expr::Number(value))
            }
            TokenKind::Id => {
                self.advance();
                Ok(Expr::Var(tok.text().to_string()))
            }
            TokenKind::LParen => {
                self.advance();
                let node = self.parse_expr()?;
                self.consume(TokenKind::RParen)?;
                Ok(node)
            }
            _ => Err(OilError::unexpected(
                &tok,
                format!("Unexpected token in factor: {tok}"),
                self.source_line(tok.line),
            )),
        }
    }
}

/// Maps a `COMPOUND_OP` lexeme to its AST variant. Exhaustive over every
/// lexeme the lexer's `COMPOUND_OP` pattern can produce.
fn compound_op_kind(lexeme: &str) -> CompoundOpKind {
    match lexeme {
        "+=" => CompoundOpKind::Add,
        "-=" => CompoundOpKind::Sub,
        "*=" => CompoundOpKind::Mul,
        "/=" => CompoundOpKind::Div,
        "%=" => CompoundOpKind::Mod,
        "&=" => CompoundOpKind::BitAnd,
        "|=" => CompoundOpKind::BitOr,
        "^=" => CompoundOpKind::BitXor,
        other => unreachable!("lexer never emits a COMPOUND_OP token with lexeme '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_mul_over_add() {
        let a = parse("print 2 + 3 * 4;").unwrap();
        let b = parse("print 2 + (3 * 4);").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn precedence_left_associative() {
        let a = parse("print a * b + c;").unwrap();
        let b = parse("print (a * b) + c;").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn logic_groups_comparisons() {
        let program = parse("print a < b && c < d;").unwrap();
        match &program[0] {
            Stmt::Print(Expr::BinOp { op: BinOpKind::And, left, right }) => {
                assert!(matches!(**left, Expr::BinOp { op: BinOpKind::Lt, .. }));
                assert!(matches!(**right, Expr::BinOp { op: BinOpKind::Lt, .. }));
            }
            other => panic!("expected And of two Lt comparisons, got {other:?}"),
        }
    }

    #[test]
    fn unary_not_right_associative_via_self_recursion() {
        let program = parse("print !!0;").unwrap();
        match &program[0] {
            Stmt::Print(Expr::UnOp { op: UnOpKind::Not, expr }) => {
                assert!(matches!(**expr, Expr::UnOp { op: UnOpKind::Not, .. }));
            }
            other => panic!("expected nested UnOp, got {other:?}"),
        }
    }

    #[test]
    fn assignment_vs_compound_assignment_dispatch() {
        assert!(matches!(parse("x = 1;").unwrap()[0], Stmt::Assign { .. }));
        assert!(matches!(parse("x += 1;").unwrap()[0], Stmt::CompoundAssign { .. }));
    }

    #[test]
    fn every_compound_op_lexeme_parses_into_a_compound_assign() {
        // Whether the compiler can lower each of these is a separate
        // question; the parser accepts all eight uniformly.
        for lexeme in ["+=", "-=", "*=", "/=", "%=", "&=", "|=", "^="] {
            let program = parse(&format!("x {lexeme} 2;")).unwrap();
            assert!(matches!(program[0], Stmt::CompoundAssign { .. }));
        }
    }

    #[test]
    fn missing_expression_after_assignment_is_a_parse_error() {
        let err = parse("x = ;").unwrap_err();
        assert!(matches!(err, OilError::Parse { .. }));
    }

    #[test]
    fn unary_minus_is_not_a_grammar_production() {
        let err = parse("print -3;").unwrap_err();
        assert!(matches!(err, OilError::Parse { .. }));
    }

    #[test]
    fn if_else_parses_optional_else() {
        let with_else = parse("if (1) { print 1; } else { print 2; }").unwrap();
        assert!(matches!(&with_else[0], Stmt::If { else_block: Some(_), .. }));
        let without_else = parse("if (1) { print 1; }").unwrap();
        assert!(matches!(&without_else[0], Stmt::If { else_block: None, .. }));
    }

    #[test]
    fn unterminated_while_is_a_parse_error() {
        assert!(parse("while (1) {").is_err());
        assert!(parse("while 1) { }").is_err());
    }
}
