//! Expression Lexer
//!
//! Tokenizes the JavaScript inside JSX expression containers so the
//! constant folder can decide whether a value is known at compile time.

use std::iter::Peekable;
use std::str::Chars;

use crate::token::{keyword_from_str, Span, Token, TokenKind};

/// Expression lexer
pub struct Lexer<'src> {
    source: &'src str,
    chars: Peekable<Chars<'src>>,
    pos: u32,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
            pos: 0,
        }
    }

    /// Lex the whole input, ending with `Eof`
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.source[self.pos as usize..].chars();
        iter.next();
        iter.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8() as u32;
        Some(c)
    }

    /// Consume `c` if it is next
    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_next() == Some('/') => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                Some('/') if self.peek_next() == Some('*') => {
                    self.advance();
                    self.advance();
                    while let Some(c) = self.advance() {
                        if c == '*' && self.eat('/') {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        let Some(c) = self.advance() else {
            return Token::new(TokenKind::Eof, Span::new(start, start));
        };

        let kind = match c {
            c if is_identifier_start(c) => self.scan_identifier(start),
            '0'..='9' => self.scan_number(start),
            '.' if matches!(self.peek(), Some('0'..='9')) => self.scan_number(start),
            '"' | '\'' => self.scan_string(c),
            '`' => self.scan_template(),

            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '~' => TokenKind::Tilde,

            '.' => {
                if self.peek() == Some('.') && self.peek_next() == Some('.') {
                    self.advance();
                    self.advance();
                    TokenKind::DotDotDot
                } else {
                    TokenKind::Dot
                }
            }
            '?' => {
                if self.eat('?') {
                    if self.eat('=') {
                        TokenKind::Assign
                    } else {
                        TokenKind::QuestionQuestion
                    }
                } else if self.peek() == Some('.') && !matches!(self.peek_next(), Some('0'..='9')) {
                    self.advance();
                    TokenKind::QuestionDot
                } else {
                    TokenKind::Question
                }
            }
            '+' | '-' => {
                if self.eat(c) || self.eat('=') {
                    TokenKind::Assign
                } else if c == '+' {
                    TokenKind::Plus
                } else {
                    TokenKind::Minus
                }
            }
            '*' => {
                if self.eat('*') {
                    if self.eat('=') { TokenKind::Assign } else { TokenKind::StarStar }
                } else if self.eat('=') {
                    TokenKind::Assign
                } else {
                    TokenKind::Star
                }
            }
            '/' => {
                if self.eat('=') { TokenKind::Assign } else { TokenKind::Slash }
            }
            '%' => {
                if self.eat('=') { TokenKind::Assign } else { TokenKind::Percent }
            }
            '<' => {
                if self.eat('<') {
                    self.eat('=');
                    TokenKind::Error("shift operators are not folded".into())
                } else if self.eat('=') {
                    TokenKind::LessThanEq
                } else {
                    TokenKind::LessThan
                }
            }
            '>' => {
                if self.eat('>') {
                    self.eat('>');
                    self.eat('=');
                    TokenKind::Error("shift operators are not folded".into())
                } else if self.eat('=') {
                    TokenKind::GreaterThanEq
                } else {
                    TokenKind::GreaterThan
                }
            }
            '=' => {
                if self.eat('=') {
                    if self.eat('=') { TokenKind::EqEqEq } else { TokenKind::EqEq }
                } else if self.eat('>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.eat('=') {
                    if self.eat('=') { TokenKind::NotEqEq } else { TokenKind::NotEq }
                } else {
                    TokenKind::Bang
                }
            }
            '&' => {
                if self.eat('&') {
                    if self.eat('=') { TokenKind::Assign } else { TokenKind::AmpersandAmpersand }
                } else if self.eat('=') {
                    TokenKind::Assign
                } else {
                    TokenKind::Ampersand
                }
            }
            '|' => {
                if self.eat('|') {
                    if self.eat('=') { TokenKind::Assign } else { TokenKind::PipePipe }
                } else if self.eat('=') {
                    TokenKind::Assign
                } else {
                    TokenKind::Pipe
                }
            }
            '^' => {
                if self.eat('=') { TokenKind::Assign } else { TokenKind::Caret }
            }
            _ => TokenKind::Error(format!("unexpected character: {}", c).into()),
        };

        Token::new(kind, Span::new(start, self.pos))
    }

    fn scan_identifier(&mut self, start: u32) -> TokenKind {
        while self.peek().is_some_and(is_identifier_part) {
            self.advance();
        }
        let text = &self.source[start as usize..self.pos as usize];
        keyword_from_str(text).unwrap_or_else(|| TokenKind::Identifier(text.into()))
    }

    fn scan_number(&mut self, start: u32) -> TokenKind {
        let first = self.source.as_bytes()[start as usize];
        if first == b'0' {
            let radix = match self.peek() {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance();
                while self.peek().is_some_and(|c| c.is_digit(radix) || c == '_') {
                    self.advance();
                }
                if self.eat('n') {
                    return TokenKind::Error("bigint literals are not folded".into());
                }
                let digits = self.source[start as usize + 2..self.pos as usize].replace('_', "");
                return match u64::from_str_radix(&digits, radix) {
                    Ok(n) => TokenKind::Number(n as f64),
                    Err(_) => TokenKind::Error("invalid number".into()),
                };
            }
        }

        while matches!(self.peek(), Some('0'..='9' | '_')) {
            self.advance();
        }
        if self.peek() == Some('.') && first != b'.' {
            self.advance();
        }
        while matches!(self.peek(), Some('0'..='9' | '_')) {
            self.advance();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            while matches!(self.peek(), Some('0'..='9' | '_')) {
                self.advance();
            }
        }
        if self.eat('n') {
            return TokenKind::Error("bigint literals are not folded".into());
        }

        let text = self.source[start as usize..self.pos as usize].replace('_', "");
        match text.parse::<f64>() {
            Ok(n) => TokenKind::Number(n),
            Err(_) => TokenKind::Error(format!("invalid number: {}", text).into()),
        }
    }

    fn scan_string(&mut self, quote: char) -> TokenKind {
        let mut value = String::new();
        while let Some(c) = self.advance() {
            match c {
                c if c == quote => return TokenKind::String(value.into()),
                '\\' => match self.scan_escape() {
                    Some(Some(c)) => value.push(c),
                    Some(None) => {}
                    None => break,
                },
                '\n' => break,
                c => value.push(c),
            }
        }
        TokenKind::Error("unterminated string".into())
    }

    /// Escape after a backslash. `Some(None)` is a line continuation.
    fn scan_escape(&mut self) -> Option<Option<char>> {
        let c = self.advance()?;
        Some(match c {
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'b' => Some('\u{8}'),
            'f' => Some('\u{c}'),
            'v' => Some('\u{b}'),
            '0' => Some('\0'),
            '\n' => None,
            'x' => self.scan_hex_escape(2).and_then(char::from_u32),
            'u' if self.eat('{') => {
                let start = self.pos as usize;
                while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                    self.advance();
                }
                let hex = &self.source[start..self.pos as usize];
                let code = u32::from_str_radix(hex, 16).ok();
                self.eat('}');
                code.and_then(char::from_u32)
            }
            'u' => self.scan_hex_escape(4).and_then(char::from_u32),
            c => Some(c),
        })
    }

    fn scan_hex_escape(&mut self, count: usize) -> Option<u32> {
        let start = self.pos as usize;
        for _ in 0..count {
            if self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.advance();
            } else {
                return None;
            }
        }
        u32::from_str_radix(&self.source[start..self.pos as usize], 16).ok()
    }

    fn scan_template(&mut self) -> TokenKind {
        let mut value = String::new();
        while let Some(c) = self.advance() {
            match c {
                '`' => return TokenKind::Template(value.into()),
                '$' if self.peek() == Some('{') => {
                    // Skip to the closing backtick; the value is dynamic anyway
                    let mut depth = 0usize;
                    while let Some(c) = self.advance() {
                        match c {
                            '{' => depth += 1,
                            '}' => depth = depth.saturating_sub(1),
                            '`' if depth == 0 => return TokenKind::TemplateWithSubstitutions,
                            _ => {}
                        }
                    }
                    break;
                }
                '\\' => match self.scan_escape() {
                    Some(Some(c)) => value.push(c),
                    Some(None) => {}
                    None => break,
                },
                '\r' => {
                    // Template literals normalize CRLF to LF
                    self.eat('\n');
                    value.push('\n');
                }
                c => value.push(c),
            }
        }
        TokenKind::Error("unterminated template literal".into())
    }
}

pub fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

pub fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
