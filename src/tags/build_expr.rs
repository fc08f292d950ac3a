//! Parser for `//go:build` expressions.
//!
//! Grammar: `or := and ("||" and)*`, `and := not ("&&" not)*`,
//! `not := "!" not | "(" or ")" | ident`. Negations are pushed down to the
//! literals so the result fits the [`TagGroup`] tree.

use super::{Mode, Tag, TagGroup};
use anyhow::{Result, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Not,
    And,
    Or,
    Open,
    Close,
}

#[derive(Debug, Clone)]
enum Expr {
    Ident(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '!' => {
                chars.next();
                tokens.push(Token::Not);
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '&' | '|' => {
                chars.next();
                if chars.next() != Some(c) {
                    bail!("expected '{c}{c}'");
                }
                tokens.push(if c == '&' { Token::And } else { Token::Or });
            }
            c if c.is_alphanumeric() || c == '_' || c == '.' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '.' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => bail!("unexpected character '{other}'"),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn or(&mut self) -> Result<Expr> {
        let mut left = self.and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            left = Expr::Or(Box::new(left), Box::new(self.and()?));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Expr> {
        let mut left = self.not()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            left = Expr::And(Box::new(left), Box::new(self.not()?));
        }
        Ok(left)
    }

    fn not(&mut self) -> Result<Expr> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        match token {
            Some(Token::Not) => Ok(Expr::Not(Box::new(self.not()?))),
            Some(Token::Open) => {
                let inner = self.or()?;
                if self.peek() != Some(&Token::Close) {
                    bail!("missing ')'");
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(Token::Ident(name)) => Ok(Expr::Ident(name)),
            Some(other) => bail!("unexpected token {other:?}"),
            None => bail!("unexpected end of expression"),
        }
    }
}

fn lower(expr: Expr, negate: bool, out: &mut TagGroup) {
    match expr {
        Expr::Ident(name) => out.tags.push(Tag {
            name,
            negated: negate,
        }),
        Expr::Not(inner) => lower(*inner, !negate, out),
        Expr::And(a, b) => combine(Mode::And, negate, *a, *b, out),
        Expr::Or(a, b) => combine(Mode::Or, negate, *a, *b, out),
    }
}

fn combine(mode: Mode, negate: bool, a: Expr, b: Expr, out: &mut TagGroup) {
    // De Morgan: a negated AND is an OR of negations and vice versa.
    let mode = match (mode, negate) {
        (Mode::And, true) => Mode::Or,
        (Mode::Or, true) => Mode::And,
        (mode, false) => mode,
    };
    if out.mode == mode {
        lower(a, negate, out);
        lower(b, negate, out);
    } else {
        let mut group = TagGroup::new(mode);
        lower(a, negate, &mut group);
        lower(b, negate, &mut group);
        out.groups.push(group);
    }
}

/// Parse a `//go:build` expression into a constraint group.
pub fn parse_go_build(input: &str) -> Result<TagGroup> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        bail!("empty expression");
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.or()?;
    if parser.pos != parser.tokens.len() {
        bail!("trailing tokens in expression");
    }

    let mut root = TagGroup::new(Mode::And);
    lower(expr, false, &mut root);
    Ok(root)
}
