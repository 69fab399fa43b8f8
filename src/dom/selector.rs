//! Selector engine: logos tokenizer, recursive descent parser, matching.
//!
//! Supports the subset of CSS selectors that components and the router use
//! to find nodes inside their own content:
//!
//! - type (`a`, `app-header`), universal (`*`), `#id`, `.class`
//! - attribute presence and equality (`[href]`, `meta[name="description"]`)
//! - compound selectors (`a.nav__link#home`)
//! - descendant (`nav a`) and child (`nav > a`) combinators
//! - selector lists (`h1, h2`)
//!
//! Token priority in logos is determined by longest match, then definition
//! order, so `app-content` lexes as a single [`Token::Ident`].

use logos::Logos;

use super::node::{NodeData, NodeId};
use super::tree::Dom;

/// Errors from selector parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unrecognized character at offset {0}")]
    InvalidCharacter(usize),
    #[error("unexpected token `{found}` at offset {offset}: {message}")]
    UnexpectedToken {
        found: String,
        offset: usize,
        message: String,
    },
    #[error("unexpected end of selector: {0}")]
    UnexpectedEof(String),
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Selector token produced by the lexer.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    /// Double-quoted string literal.
    #[regex(r#""[^"]*""#)]
    StringLiteral,

    /// Single-quoted string literal.
    #[regex(r"'[^']*'")]
    StringLiteralSingle,

    /// Identifier: tag names, class names, ids, attribute names.
    #[regex(r"-?[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    /// `#`
    #[token("#")]
    Hash,

    /// `.`
    #[token(".")]
    Dot,

    /// `*`
    #[token("*")]
    Star,

    /// `>`
    #[token(">")]
    GreaterThan,

    /// `,`
    #[token(",")]
    Comma,

    /// `[`
    #[token("[")]
    BracketOpen,

    /// `]`
    #[token("]")]
    BracketClose,

    /// `=`
    #[token("=")]
    Equals,
}

/// A token with its source text and byte span, for adjacency detection.
#[derive(Debug, Clone)]
struct PToken {
    token: Token,
    text: String,
    start: usize,
    end: usize,
}

fn tokenize(input: &str) -> Result<Vec<PToken>, SelectorError> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(input).spanned() {
        let token = result.map_err(|()| SelectorError::InvalidCharacter(span.start))?;
        tokens.push(PToken {
            token,
            text: input[span.clone()].to_owned(),
            start: span.start,
            end: span.end,
        });
    }
    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// A single simple selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// Type selector: matches the element tag (e.g. `a`).
    Type(String),
    /// Universal selector: `*`.
    Universal,
    /// ID selector: `#id`.
    Id(String),
    /// Class selector: `.classname`.
    Class(String),
    /// Attribute selector: `[name]` or `[name=value]`.
    Attribute { name: String, value: Option<String> },
}

/// A combinator between compound selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Descendant combinator (whitespace): `A B`.
    Descendant,
    /// Child combinator: `A > B`.
    Child,
}

/// Simple selectors that must all match the same element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    pub parts: Vec<SimpleSelector>,
}

impl CompoundSelector {
    /// Check whether this compound matches a single node's data.
    ///
    /// Only element nodes can match.
    pub fn matches(&self, node: &NodeData) -> bool {
        node.is_element()
            && self.parts.iter().all(|part| match part {
                SimpleSelector::Type(name) => node.tag == *name,
                SimpleSelector::Universal => true,
                SimpleSelector::Id(id) => node.id() == Some(id.as_str()),
                SimpleSelector::Class(class) => node.has_class(class),
                SimpleSelector::Attribute { name, value } => match (node.attribute(name), value) {
                    (Some(actual), Some(expected)) => actual == expected,
                    (Some(_), None) => true,
                    (None, _) => false,
                },
            })
    }
}

/// A chain of compound selectors joined by combinators, e.g. `nav > a.link`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The leftmost compound.
    pub first: CompoundSelector,
    /// Each following compound with the combinator that precedes it.
    pub rest: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    fn compound(&self, index: usize) -> &CompoundSelector {
        if index == 0 {
            &self.first
        } else {
            &self.rest[index - 1].1
        }
    }

    /// Check whether this selector matches `node`, walking right to left.
    pub fn matches(&self, dom: &Dom, node: NodeId) -> bool {
        self.matches_at(dom, node, self.rest.len())
    }

    fn matches_at(&self, dom: &Dom, node: NodeId, index: usize) -> bool {
        let Some(data) = dom.get(node) else {
            return false;
        };
        if !self.compound(index).matches(data) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match self.rest[index - 1].0 {
            Combinator::Child => dom
                .parent(node)
                .is_some_and(|parent| self.matches_at(dom, parent, index - 1)),
            Combinator::Descendant => dom
                .ancestors(node)
                .into_iter()
                .any(|ancestor| self.matches_at(dom, ancestor, index - 1)),
        }
    }
}

/// A comma-separated selector list. Matches if any member matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Parse a selector list.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(SelectorError::Empty);
        }
        let mut parser = Parser { tokens, cursor: 0 };
        let list = parser.parse_list()?;
        if let Some(tok) = parser.peek() {
            return Err(parser.unexpected(tok.clone(), "expected `,` or end of selector"));
        }
        Ok(list)
    }

    /// Check whether any selector in the list matches `node`.
    pub fn matches(&self, dom: &Dom, node: NodeId) -> bool {
        self.selectors.iter().any(|selector| selector.matches(dom, node))
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Recursive descent parser state.
struct Parser {
    tokens: Vec<PToken>,
    cursor: usize,
}

impl Parser {
    fn peek(&self) -> Option<&PToken> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<PToken> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn unexpected(&self, tok: PToken, message: &str) -> SelectorError {
        SelectorError::UnexpectedToken {
            found: tok.text,
            offset: tok.start,
            message: message.to_owned(),
        }
    }

    /// Returns `true` if the current token immediately follows the previous
    /// one with no whitespace between them.
    fn is_adjacent(&self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = &self.tokens[self.cursor - 1];
        self.peek().is_some_and(|curr| curr.start == prev.end)
    }

    fn parse_list(&mut self) -> Result<SelectorList, SelectorError> {
        let mut selectors = vec![self.parse_complex()?];
        while self.peek().is_some_and(|t| t.token == Token::Comma) {
            self.advance();
            selectors.push(self.parse_complex()?);
        }
        Ok(SelectorList { selectors })
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let first = self.parse_compound()?;
        let mut rest = Vec::new();

        loop {
            match self.peek().map(|t| &t.token) {
                Some(Token::GreaterThan) => {
                    self.advance();
                    rest.push((Combinator::Child, self.parse_compound()?));
                }
                // A selector-starting token that was not consumed by the
                // compound parser is separated by whitespace.
                Some(
                    Token::Ident | Token::Hash | Token::Dot | Token::Star | Token::BracketOpen,
                ) => {
                    rest.push((Combinator::Descendant, self.parse_compound()?));
                }
                _ => break,
            }
        }

        Ok(ComplexSelector { first, rest })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut parts = vec![self.parse_simple(true)?];
        while self.is_adjacent() {
            match self.peek().map(|t| &t.token) {
                Some(Token::Dot | Token::Hash | Token::BracketOpen) => {
                    parts.push(self.parse_simple(false)?);
                }
                _ => break,
            }
        }
        Ok(CompoundSelector { parts })
    }

    fn parse_simple(&mut self, leading: bool) -> Result<SimpleSelector, SelectorError> {
        let tok = self
            .advance()
            .ok_or_else(|| SelectorError::UnexpectedEof("expected selector".into()))?;
        match tok.token {
            Token::Ident if leading => Ok(SimpleSelector::Type(tok.text.to_ascii_lowercase())),
            Token::Star if leading => Ok(SimpleSelector::Universal),
            Token::Dot => Ok(SimpleSelector::Class(self.expect_name("class name after `.`")?)),
            Token::Hash => Ok(SimpleSelector::Id(self.expect_name("id after `#`")?)),
            Token::BracketOpen => self.parse_attribute(),
            _ => Err(self.unexpected(tok, "expected selector")),
        }
    }

    fn expect_name(&mut self, what: &str) -> Result<String, SelectorError> {
        if !self.is_adjacent() {
            return match self.peek().cloned() {
                Some(tok) => Err(self.unexpected(tok, &format!("expected {what}"))),
                None => Err(SelectorError::UnexpectedEof(format!("expected {what}"))),
            };
        }
        match self.advance() {
            Some(tok) if tok.token == Token::Ident => Ok(tok.text),
            Some(tok) => Err(self.unexpected(tok, &format!("expected {what}"))),
            None => Err(SelectorError::UnexpectedEof(format!("expected {what}"))),
        }
    }

    fn parse_attribute(&mut self) -> Result<SimpleSelector, SelectorError> {
        let name = match self.advance() {
            Some(tok) if tok.token == Token::Ident => tok.text.to_ascii_lowercase(),
            Some(tok) => return Err(self.unexpected(tok, "expected attribute name")),
            None => return Err(SelectorError::UnexpectedEof("expected attribute name".into())),
        };

        let value = match self.advance() {
            Some(tok) if tok.token == Token::BracketClose => {
                return Ok(SimpleSelector::Attribute { name, value: None });
            }
            Some(tok) if tok.token == Token::Equals => match self.advance() {
                Some(v) if v.token == Token::Ident => v.text,
                Some(v) if matches!(v.token, Token::StringLiteral | Token::StringLiteralSingle) => {
                    v.text[1..v.text.len() - 1].to_owned()
                }
                Some(v) => return Err(self.unexpected(v, "expected attribute value")),
                None => return Err(SelectorError::UnexpectedEof("expected attribute value".into())),
            },
            Some(tok) => return Err(self.unexpected(tok, "expected `=` or `]`")),
            None => return Err(SelectorError::UnexpectedEof("expected `]`".into())),
        };

        match self.advance() {
            Some(tok) if tok.token == Token::BracketClose => Ok(SimpleSelector::Attribute {
                name,
                value: Some(value),
            }),
            Some(tok) => Err(self.unexpected(tok, "expected `]`")),
            None => Err(SelectorError::UnexpectedEof("expected `]`".into())),
        }
    }
}
