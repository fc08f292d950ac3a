//! Byte cursor over Go source with just enough lexing for file headers.

use anyhow::{Result, bail};
use std::ops::Range;

pub(super) struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub(super) fn new(src: &'a str) -> Self {
        let pos = if src.starts_with('\u{feff}') { 3 } else { 0 };
        Self { src, pos }
    }

    pub(super) fn pos(&self) -> usize {
        self.pos
    }

    pub(super) fn reset(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub(super) fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub(super) fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    pub(super) fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// Skip spaces, tabs, carriage returns and newlines.
    pub(super) fn skip_space(&mut self) {
        while let Some(c) = self.peek() {
            if matches!(c, ' ' | '\t' | '\r' | '\n') {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Skip spaces and tabs only, staying on the current line.
    pub(super) fn skip_blanks(&mut self) {
        while let Some(c) = self.peek() {
            if matches!(c, ' ' | '\t') {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    pub(super) fn skip_space_and_comments(&mut self) -> Result<()> {
        loop {
            self.skip_space();
            if self.starts_with("//") {
                self.line_comment();
            } else if self.starts_with("/*") {
                self.block_comment()?;
            } else {
                return Ok(());
            }
        }
    }

    /// Consume a `//` comment up to (not including) the newline.
    pub(super) fn line_comment(&mut self) -> (&'a str, Range<usize>) {
        let start = self.pos;
        let end = match self.rest().find('\n') {
            Some(i) => self.pos + i,
            None => self.src.len(),
        };
        self.pos = end;
        let text = self.src[start..end].trim_end_matches('\r');
        (text, start..start + text.len())
    }

    pub(super) fn block_comment(&mut self) -> Result<(&'a str, Range<usize>)> {
        let start = self.pos;
        match self.rest()[2..].find("*/") {
            Some(i) => {
                let end = self.pos + 2 + i + 2;
                self.pos = end;
                Ok((&self.src[start..end], start..end))
            }
            None => bail!("unterminated block comment"),
        }
    }

    pub(super) fn ident(&mut self) -> Option<String> {
        let start = self.pos;
        let mut chars = self.rest().char_indices();
        let mut end = start;
        if let Some((_, c)) = chars.next() {
            if !(c.is_alphabetic() || c == '_') {
                return None;
            }
            end = start + c.len_utf8();
        }
        for (i, c) in chars {
            if c.is_alphanumeric() || c == '_' {
                end = start + i + c.len_utf8();
            } else {
                break;
            }
        }
        if end == start {
            return None;
        }
        self.pos = end;
        Some(self.src[start..end].to_string())
    }

    /// Consume an interpreted or raw string literal.
    pub(super) fn string_lit(&mut self) -> Result<Option<(String, Range<usize>)>> {
        let start = self.pos;
        match self.peek() {
            Some('`') => {
                let Some(i) = self.rest()[1..].find('`') else {
                    bail!("unterminated raw string");
                };
                let end = start + 1 + i + 1;
                self.pos = end;
                Ok(Some((self.src[start + 1..end - 1].to_string(), start..end)))
            }
            Some('"') => {
                let mut value = String::new();
                let mut chars = self.rest()[1..].char_indices();
                while let Some((i, c)) = chars.next() {
                    match c {
                        '"' => {
                            let end = start + 1 + i + 1;
                            self.pos = end;
                            return Ok(Some((value, start..end)));
                        }
                        '\\' => match chars.next() {
                            Some((_, escaped)) => value.push(escaped),
                            None => break,
                        },
                        '\n' => break,
                        c => value.push(c),
                    }
                }
                bail!("unterminated string literal")
            }
            _ => Ok(None),
        }
    }
}
