//! JSX scanner
//!
//! Walks JavaScript source without building a JS syntax tree. Strings,
//! template literals, comments and regular expressions are skipped; a `<`
//! where an expression may start, followed by a name or `>`, opens a JSX
//! element that is parsed into [`JsxNode`]s. Expression containers are
//! scanned recursively, so JSX nested in `{...}` is found as well.

use crate::ast::{
    AttrName, AttrValue, Expr, JsxAttribute, JsxChild, JsxElement, JsxFragment, JsxName, JsxNode,
    Module, Piece,
};
use crate::error::{CompileError, CompileResult};
use crate::escape::decode_entities;
use crate::lexer::{is_identifier_part, is_identifier_start};
use crate::token::Span;

/// Keywords after which an expression (and so JSX or a regex) may start
const EXPRESSION_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await", "default", "extends",
];

/// Parse a module into code and JSX pieces
pub fn parse_module(source: &str) -> CompileResult<Module> {
    let mut parser = Parser::new(source);
    let pieces = parser.scan_code(false)?;
    tracing::trace!("scanned module into {} pieces", pieces.len());
    Ok(Module { pieces })
}

/// JSX scanner
pub struct Parser<'src> {
    source: &'src str,
    pos: usize,
    /// Whether the previous significant token lets an expression start
    expr_allowed: bool,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            expr_allowed: true,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn starts_with(&self, text: &str) -> bool {
        self.source[self.pos..].starts_with(text)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start as u32, self.pos as u32)
    }

    fn expect(&mut self, expected: char, context: &str) -> CompileResult<()> {
        if self.eat(expected) {
            return Ok(());
        }
        let found = match self.peek() {
            Some(c) => format!("`{}`", c),
            None => "end of input".to_string(),
        };
        Err(CompileError::syntax(
            format!("expected `{}` {}, found {}", expected, context, found),
            Span::new(self.pos as u32, (self.pos + 1) as u32),
        ))
    }

    // ========================================================================
    // JavaScript
    // ========================================================================

    /// Scan code until end of input, or with `until_brace` until the `}`
    /// closing the current container (consumed, not included)
    fn scan_code(&mut self, until_brace: bool) -> CompileResult<Vec<Piece>> {
        let start = self.pos;
        let mut pieces = Vec::new();
        let mut chunk = self.pos;
        let mut depth = 0usize;
        self.expr_allowed = true;

        loop {
            let Some(c) = self.peek() else {
                if until_brace {
                    return Err(CompileError::syntax(
                        "unterminated expression container",
                        self.span_from(start.saturating_sub(1)),
                    ));
                }
                break;
            };
            match c {
                '{' => {
                    self.advance();
                    depth += 1;
                    self.expr_allowed = true;
                }
                '}' => {
                    if depth == 0 && until_brace {
                        push_code(&mut pieces, &self.source[chunk..self.pos]);
                        self.advance();
                        return Ok(pieces);
                    }
                    self.advance();
                    depth = depth.saturating_sub(1);
                    self.expr_allowed = true;
                }
                '"' | '\'' => {
                    self.skip_string(c)?;
                    self.expr_allowed = false;
                }
                '`' => {
                    self.scan_template(&mut pieces, &mut chunk)?;
                    self.expr_allowed = false;
                }
                '/' if self.peek_nth(1) == Some('/') || self.peek_nth(1) == Some('*') => {
                    self.skip_comment()?;
                }
                '/' if self.expr_allowed => {
                    self.skip_regex()?;
                    self.expr_allowed = false;
                }
                '<' if self.expr_allowed && self.jsx_starts() => {
                    push_code(&mut pieces, &self.source[chunk..self.pos]);
                    let node = self.parse_element()?;
                    pieces.push(Piece::Jsx(Box::new(node)));
                    chunk = self.pos;
                    self.expr_allowed = false;
                }
                c if is_identifier_start(c) => {
                    let word_start = self.pos;
                    while self.peek().is_some_and(is_identifier_part) {
                        self.advance();
                    }
                    let word = &self.source[word_start..self.pos];
                    self.expr_allowed = EXPRESSION_KEYWORDS.contains(&word);
                }
                c if c.is_ascii_digit() => {
                    while self
                        .peek()
                        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
                    {
                        self.advance();
                    }
                    self.expr_allowed = false;
                }
                ')' | ']' => {
                    self.advance();
                    self.expr_allowed = false;
                }
                c if c.is_whitespace() => {
                    self.advance();
                }
                _ => {
                    self.advance();
                    self.expr_allowed = true;
                }
            }
        }

        push_code(&mut pieces, &self.source[chunk..self.pos]);
        Ok(pieces)
    }

    /// `<` followed by a tag name or `>` (fragment)
    fn jsx_starts(&self) -> bool {
        match self.peek_nth(1) {
            Some('>') => true,
            Some(c) => is_identifier_start(c),
            None => false,
        }
    }

    fn skip_string(&mut self, quote: char) -> CompileResult<()> {
        let start = self.pos;
        self.advance();
        loop {
            match self.advance() {
                Some('\\') => {
                    self.advance();
                }
                Some(c) if c == quote => return Ok(()),
                Some('\n') | None => {
                    return Err(CompileError::syntax(
                        "unterminated string literal",
                        self.span_from(start),
                    ));
                }
                Some(_) => {}
            }
        }
    }

    /// Template literal; substitutions are scanned as code
    fn scan_template(&mut self, pieces: &mut Vec<Piece>, chunk: &mut usize) -> CompileResult<()> {
        let start = self.pos;
        self.advance();
        loop {
            match self.peek() {
                None => {
                    return Err(CompileError::syntax(
                        "unterminated template literal",
                        self.span_from(start),
                    ));
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some('`') => {
                    self.advance();
                    return Ok(());
                }
                Some('$') if self.peek_nth(1) == Some('{') => {
                    self.pos += 2;
                    push_code(pieces, &self.source[*chunk..self.pos]);
                    let inner = self.scan_code(true)?;
                    for piece in inner {
                        match piece {
                            Piece::Code(code) => push_code(pieces, &code),
                            jsx => pieces.push(jsx),
                        }
                    }
                    // the closing brace starts the next chunk
                    *chunk = self.pos - 1;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn skip_comment(&mut self) -> CompileResult<()> {
        let start = self.pos;
        self.advance();
        if self.eat('/') {
            while self.peek().is_some_and(|c| c != '\n') {
                self.advance();
            }
            return Ok(());
        }
        self.advance();
        while !self.starts_with("*/") {
            if self.advance().is_none() {
                return Err(CompileError::syntax("unterminated comment", self.span_from(start)));
            }
        }
        self.pos += 2;
        Ok(())
    }

    fn skip_regex(&mut self) -> CompileResult<()> {
        let start = self.pos;
        self.advance();
        let mut in_class = false;
        loop {
            match self.advance() {
                Some('\\') => {
                    self.advance();
                }
                Some('[') => in_class = true,
                Some(']') => in_class = false,
                Some('/') if !in_class => break,
                Some('\n') | None => {
                    return Err(CompileError::syntax(
                        "unterminated regular expression",
                        self.span_from(start),
                    ));
                }
                Some(_) => {}
            }
        }
        while self.peek().is_some_and(is_identifier_part) {
            self.advance();
        }
        Ok(())
    }

    // ========================================================================
    // JSX
    // ========================================================================

    /// Whitespace and comments between JSX tokens
    fn skip_trivia(&mut self) -> CompileResult<()> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if matches!(self.peek_nth(1), Some('/') | Some('*')) => {
                    self.skip_comment()?;
                }
                _ => return Ok(()),
            }
        }
    }

    /// Element or fragment starting at `<`
    fn parse_element(&mut self) -> CompileResult<JsxNode> {
        let start = self.pos;
        self.expect('<', "to open a tag")?;
        self.skip_trivia()?;

        if self.eat('>') {
            let children = self.parse_children()?;
            self.parse_closing_tag(None)?;
            return Ok(JsxNode::Fragment(JsxFragment {
                children,
                span: self.span_from(start),
            }));
        }

        let name_start = self.pos;
        let name = self.parse_element_name()?;
        let name_span = self.span_from(name_start);
        let mut attributes = Vec::new();

        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some('/') => {
                    self.advance();
                    self.skip_trivia()?;
                    self.expect('>', "after `/` in a self-closing tag")?;
                    return Ok(JsxNode::Element(JsxElement {
                        name,
                        attributes,
                        children: Vec::new(),
                        self_closing: true,
                        span: self.span_from(start),
                        name_span,
                    }));
                }
                Some('>') => {
                    self.advance();
                    break;
                }
                Some('{') => attributes.push(self.parse_spread_attribute()?),
                Some(c) if is_identifier_start(c) => attributes.push(self.parse_attribute()?),
                _ => {
                    return Err(CompileError::syntax(
                        format!("unexpected character in <{}> tag", name.source()),
                        Span::new(self.pos as u32, (self.pos + 1) as u32),
                    ));
                }
            }
        }

        let children = self.parse_children()?;
        self.parse_closing_tag(Some(&name))?;
        Ok(JsxNode::Element(JsxElement {
            name,
            attributes,
            children,
            self_closing: false,
            span: self.span_from(start),
            name_span,
        }))
    }

    /// Identifier with `-` allowed
    fn parse_jsx_identifier(&mut self) -> CompileResult<String> {
        let start = self.pos;
        match self.peek() {
            Some(c) if is_identifier_start(c) => {
                self.advance();
            }
            _ => {
                return Err(CompileError::syntax(
                    "expected a JSX name",
                    Span::new(start as u32, (start + 1) as u32),
                ));
            }
        }
        while self
            .peek()
            .is_some_and(|c| is_identifier_part(c) || c == '-')
        {
            self.advance();
        }
        Ok(self.source[start..self.pos].to_string())
    }

    fn parse_element_name(&mut self) -> CompileResult<JsxName> {
        let first = self.parse_jsx_identifier()?;
        if self.eat(':') {
            let local = self.parse_jsx_identifier()?;
            return Ok(JsxName::Namespaced {
                namespace: first,
                local,
            });
        }
        if self.peek() == Some('.') {
            let mut parts = vec![first];
            while self.eat('.') {
                parts.push(self.parse_jsx_identifier()?);
            }
            return Ok(JsxName::Member(parts));
        }
        Ok(JsxName::Ident(first))
    }

    fn parse_attribute(&mut self) -> CompileResult<JsxAttribute> {
        let start = self.pos;
        let first = self.parse_jsx_identifier()?;
        let name = if self.eat(':') {
            AttrName::Namespaced {
                namespace: first,
                local: self.parse_jsx_identifier()?,
            }
        } else {
            AttrName::Plain(first)
        };

        self.skip_trivia()?;
        if !self.eat('=') {
            return Ok(JsxAttribute::Named {
                name,
                value: None,
                span: self.span_from(start),
            });
        }
        self.skip_trivia()?;

        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                let value_start = self.pos;
                self.advance();
                let text_start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.advance();
                }
                let raw = &self.source[text_start..self.pos];
                self.expect(quote, "to close the attribute value")?;
                AttrValue::String {
                    value: decode_entities(raw),
                    span: self.span_from(value_start),
                }
            }
            Some('{') => {
                let container_start = self.pos;
                self.advance();
                let expr = self.parse_expression_container(container_start)?;
                if expr.is_empty() {
                    return Err(CompileError::syntax(
                        "attribute values must not be an empty expression",
                        expr.span,
                    ));
                }
                AttrValue::Expression(expr)
            }
            Some('<') => AttrValue::Element(Box::new(self.parse_element()?)),
            _ => {
                return Err(CompileError::syntax(
                    format!("expected a value for `{}`", name.source()),
                    Span::new(self.pos as u32, (self.pos + 1) as u32),
                ));
            }
        };

        Ok(JsxAttribute::Named {
            name,
            value: Some(value),
            span: self.span_from(start),
        })
    }

    /// `{...expr}` inside a tag
    fn parse_spread_attribute(&mut self) -> CompileResult<JsxAttribute> {
        let start = self.pos;
        self.advance();
        self.skip_trivia()?;
        if !self.starts_with("...") {
            return Err(CompileError::syntax(
                "expected `...` in a spread attribute",
                Span::new(self.pos as u32, (self.pos + 1) as u32),
            ));
        }
        self.pos += 3;
        let expr = self.parse_expression_container(start)?;
        Ok(JsxAttribute::Spread {
            expr,
            span: self.span_from(start),
        })
    }

    /// Code up to the matching `}`, which is consumed
    fn parse_expression_container(&mut self, open: usize) -> CompileResult<Expr> {
        let inner_start = self.pos;
        let pieces = self.scan_code(true)?;
        let inner_end = self.pos - 1;
        let span = if inner_end > inner_start {
            Span::new(inner_start as u32, inner_end as u32)
        } else {
            Span::new(open as u32, self.pos as u32)
        };
        Ok(Expr { pieces, span })
    }

    /// Children up to (not including) the closing tag
    fn parse_children(&mut self) -> CompileResult<Vec<JsxChild>> {
        let mut children = Vec::new();
        loop {
            let start = self.pos;
            match self.peek() {
                None => {
                    return Err(CompileError::syntax(
                        "unterminated JSX element",
                        Span::new(start.saturating_sub(1) as u32, start as u32),
                    ));
                }
                Some('<') => {
                    if self.closing_tag_follows() {
                        return Ok(children);
                    }
                    children.push(JsxChild::Node(self.parse_element()?));
                }
                Some('{') => {
                    self.advance();
                    let save = self.pos;
                    self.skip_trivia()?;
                    if self.starts_with("...") {
                        self.pos += 3;
                        let expr = self.parse_expression_container(start)?;
                        children.push(JsxChild::Spread {
                            expr,
                            span: self.span_from(start),
                        });
                    } else {
                        self.pos = save;
                        children.push(JsxChild::Expression(self.parse_expression_container(start)?));
                    }
                }
                Some(_) => {
                    while self.peek().is_some_and(|c| c != '<' && c != '{') {
                        self.advance();
                    }
                    children.push(JsxChild::Text {
                        value: self.source[start..self.pos].to_string(),
                        span: self.span_from(start),
                    });
                }
            }
        }
    }

    fn closing_tag_follows(&self) -> bool {
        self.source[self.pos + 1..].trim_start().starts_with('/')
    }

    /// `</name>`, or `</>` when `name` is `None`
    fn parse_closing_tag(&mut self, name: Option<&JsxName>) -> CompileResult<()> {
        let start = self.pos;
        self.expect('<', "to open the closing tag")?;
        self.skip_trivia()?;
        self.expect('/', "in the closing tag")?;
        self.skip_trivia()?;

        let found = if self.peek() == Some('>') {
            None
        } else {
            Some(self.parse_element_name()?)
        };
        self.skip_trivia()?;
        self.expect('>', "to end the closing tag")?;

        if found.as_ref() != name {
            let expected = match name {
                Some(name) => format!("</{}>", name.source()),
                None => "</>".to_string(),
            };
            return Err(CompileError::syntax(
                format!("expected closing tag {}", expected),
                self.span_from(start),
            ));
        }
        Ok(())
    }
}

/// Append code, joining it with a preceding code piece
fn push_code(pieces: &mut Vec<Piece>, code: &str) {
    if code.is_empty() {
        return;
    }
    match pieces.last_mut() {
        Some(Piece::Code(last)) => last.push_str(code),
        _ => pieces.push(Piece::Code(code.to_string())),
    }
}
