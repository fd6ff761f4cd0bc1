//! Turns source text into an ordered sequence of tokens.
//!
//! Structurally this mirrors `aeryz-bci`'s `Lexer`: a byte cursor over the
//! source with `trim`/`read_*` helpers that each consume exactly one token's
//! worth of input. It additionally keeps a pre-split view of the source
//! lines so failures can carry the offending line's text, the way
//! `original_source/src/lexer/lexer.py` recovers `line_num`/`source_line`
//! for every token.

use crate::error::OilError;
use crate::token::{keyword, Token, TokenKind, TokenValue};

pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    cursor: usize,
    line: usize,
    lines: Vec<&'a str>,
}

type LResult = Result<Option<Token>, OilError>;

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            bytes: source.as_bytes(),
            cursor: 0,
            line: 1,
            lines: source.lines().collect(),
        }
    }

    /// The full text of the given 1-based line, or `""` if out of range.
    fn source_line(&self, line: usize) -> &'a str {
        self.lines.get(line - 1).copied().unwrap_or("")
    }

    /// Lexes the whole source into a token vector. Fails fast on the first
    /// unrecognized character, mirroring `original_source`'s `lex()`.
    pub fn lex_all(source: &'a str) -> Result<Vec<Token>, OilError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Gets the next token, consuming it.
    pub fn next_token(&mut self) -> LResult {
        self.trim();

        let line = self.line;
        match self.peek() {
            None => Ok(None),
            Some(b'(') => {
                self.advance();
                Ok(Some(Token::new(TokenKind::LParen, TokenValue::None, line)))
            }
            Some(b')') => {
                self.advance();
                Ok(Some(Token::new(TokenKind::RParen, TokenValue::None, line)))
            }
            Some(b'{') => {
                self.advance();
                Ok(Some(Token::new(TokenKind::LBrace, TokenValue::None, line)))
            }
            Some(b'}') => {
                self.advance();
                Ok(Some(Token::new(TokenKind::RBrace, TokenValue::None, line)))
            }
            Some(b';') => {
                self.advance();
                Ok(Some(Token::new(TokenKind::Semi, TokenValue::None, line)))
            }
            Some(ch) if ch.is_ascii_digit() => Ok(Some(self.read_number(line)?)),
            Some(ch) if ch.is_ascii_alphabetic() || ch == b'_' => Ok(Some(self.read_word(line))),
            Some(_) => Ok(Some(self.read_symbol(line)?)),
        }
    }

    /// Skips runs of space/tab/CR/LF, tracking line numbers across `\n`.
    fn trim(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == b' ' || ch == b'\t' || ch == b'\r' || ch == b'\n' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.cursor).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.cursor + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.cursor += 1;
        if ch == b'\n' {
            self.line += 1;
        }
        Some(ch)
    }

    /// One or more decimal digits.
    fn read_number(&mut self, line: usize) -> Result<Token, OilError> {
        let start = self.cursor;
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            self.advance();
        }
        let text = &self.source[start..self.cursor];
        let value: i64 = text.parse().map_err(|_| {
            OilError::lex(
                format!("Invalid numeric literal: '{text}'"),
                line,
                self.source_line(line),
            )
        })?;
        Ok(Token::new(TokenKind::Number, TokenValue::Int(value), line))
    }

    /// A keyword or identifier: letter/underscore then letters/digits/underscores.
    fn read_word(&mut self, line: usize) -> Token {
        let start = self.cursor;
        while matches!(self.peek(), Some(ch) if ch.is_ascii_alphanumeric() || ch == b'_') {
            self.advance();
        }
        let word = &self.source[start..self.cursor];
        match keyword(word) {
            Some(kind) => Token::new(kind, TokenValue::Text(word.to_string()), line),
            None => Token::new(TokenKind::Id, TokenValue::Text(word.to_string()), line),
        }
    }

    /// Operators and punctuation. `COMPOUND_OP` is tried before `OP` (so
    /// `+=` doesn't lex as `+` then `=`), multi-character `OP`s before
    /// single-character ones, then `LOGICAL_OP`, then `NOT`.
    fn read_symbol(&mut self, line: usize) -> Result<Token, OilError> {
        let c0 = self.peek().unwrap();
        let c1 = self.peek_at(1);

        // COMPOUND_OP: += -= *= /= %= &= |= ^=
        if c1 == Some(b'=') && matches!(c0, b'+' | b'-' | b'*' | b'/' | b'%' | b'&' | b'|' | b'^') {
            self.advance();
            self.advance();
            let lexeme = format!("{}=", c0 as char);
            return Ok(Token::new(TokenKind::CompoundOp, TokenValue::Text(lexeme), line));
        }

        // OP: == != <= >= (two-char) or one of + - * / < > = (single-char), plus =<
        if c1 == Some(b'=') && matches!(c0, b'=' | b'!' | b'<' | b'>') {
            self.advance();
            self.advance();
            let lexeme = format!("{}=", c0 as char);
            return Ok(Token::new(TokenKind::Op, TokenValue::Text(lexeme), line));
        }
        if c0 == b'=' && c1 == Some(b'<') {
            self.advance();
            self.advance();
            return Ok(Token::new(TokenKind::Op, TokenValue::Text("=<".to_string()), line));
        }
        if matches!(c0, b'+' | b'-' | b'*' | b'/' | b'<' | b'>' | b'=') {
            self.advance();
            return Ok(Token::new(TokenKind::Op, TokenValue::Text((c0 as char).to_string()), line));
        }

        // LOGICAL_OP: && ||
        if c1 == Some(c0) && matches!(c0, b'&' | b'|') {
            self.advance();
            self.advance();
            let lexeme = format!("{}{}", c0 as char, c0 as char);
            return Ok(Token::new(TokenKind::LogicalOp, TokenValue::Text(lexeme), line));
        }

        // NOT: !
        if c0 == b'!' {
            self.advance();
            return Ok(Token::new(TokenKind::Not, TokenValue::Text("!".to_string()), line));
        }

        let ch = self.source[self.cursor..].chars().next().unwrap_or('?');
        self.advance();
        Err(OilError::lex(
            format!("Unexpected character: '{ch}'"),
            line,
            self.source_line(line),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::lex_all(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn keywords_win_over_identifiers() {
        assert_eq!(kinds("while"), vec![TokenKind::While]);
        assert_eq!(kinds("whiles"), vec![TokenKind::Id]);
    }

    #[test]
    fn compound_op_wins_over_op() {
        let tokens = Lexer::lex_all("+=").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::CompoundOp);
        assert_eq!(tokens[0].text(), "+=");
    }

    #[test]
    fn multi_char_op_wins_over_single_char() {
        for (src, expected) in [("==", "=="), ("!=", "!="), ("<=", "<="), (">=", ">="), ("=<", "=<")] {
            let tokens = Lexer::lex_all(src).unwrap();
            assert_eq!(tokens.len(), 1);
            assert_eq!(tokens[0].kind, TokenKind::Op);
            assert_eq!(tokens[0].text(), expected);
        }
    }

    #[test]
    fn logical_ops() {
        let tokens = Lexer::lex_all("&& ||").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::LogicalOp);
        assert_eq!(tokens[0].text(), "&&");
        assert_eq!(tokens[1].kind, TokenKind::LogicalOp);
        assert_eq!(tokens[1].text(), "||");
    }

    #[test]
    fn number_literal() {
        let tokens = Lexer::lex_all("12345").unwrap();
        assert_eq!(tokens[0].value, TokenValue::Int(12345));
    }

    #[test]
    fn unexpected_character_reports_line_and_source() {
        let err = Lexer::lex_all("x = 1;\n@\n").unwrap_err();
        match err {
            OilError::Lex { message, line, source_line } => {
                assert_eq!(line, 2);
                assert_eq!(source_line, "@");
                assert!(message.contains('@'));
            }
            other => panic!("expected Lex error, got {other:?}"),
        }
    }

    #[test]
    fn idempotent_lexing() {
        let source = "x = 5; print x + 3;";
        assert_eq!(Lexer::lex_all(source).unwrap(), Lexer::lex_all(source).unwrap());
    }

    #[test]
    fn whitespace_is_skipped_and_not_tokenized() {
        let tokens = Lexer::lex_all("  x\t=\r\n5 ;  ").unwrap();
        assert_eq!(tokens.len(), 4);
    }
}
