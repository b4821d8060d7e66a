//! Brace literals for array values: `{{1, 2}, {3, 4}}`.
//!
//! Braces nest rows, commas separate items, and double quotes protect
//! commas and braces inside an item. Items are returned verbatim (trimmed,
//! quotes kept) so the caller can tell quoted literals from references.

use crate::store::StoreError;

/// One node of a parsed literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// A leaf item, exactly as written.
    Item(String),
    /// A braced row.
    Row(Vec<Literal>),
}

impl Literal {
    /// Nesting depth: an item is 0, a row is one more than its deepest child.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Item(_) => 0,
            Self::Row(children) => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
        }
    }

    /// Whether this is a row with no children.
    #[must_use]
    pub fn is_empty_row(&self) -> bool {
        matches!(self, Self::Row(children) if children.is_empty())
    }
}

/// Whether an item is written as a quoted literal.
#[must_use]
pub fn is_quoted(item: &str) -> bool {
    item.len() >= 2 && item.starts_with('"') && item.ends_with('"')
}

/// Strip the surrounding quotes of a quoted item.
#[must_use]
pub fn unquote(item: &str) -> &str {
    if is_quoted(item) {
        &item[1..item.len() - 1]
    } else {
        item
    }
}

/// Parse a complete literal. The text must be a single braced row.
pub fn parse(text: &str) -> Result<Literal, StoreError> {
    let mut parser = Parser {
        text,
        bytes: text.as_bytes(),
        pos: 0,
    };
    parser.skip_whitespace();
    let row = parser.row()?;
    parser.skip_whitespace();
    if parser.pos != parser.bytes.len() {
        return Err(parser.malformed());
    }
    Ok(row)
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn row(&mut self) -> Result<Literal, StoreError> {
        self.expect(b'{')?;
        self.skip_whitespace();

        let mut children = Vec::new();
        match self.peek() {
            Some(b'}') => {
                self.pos += 1;
                return Ok(Literal::Row(children));
            }
            Some(b'{') => loop {
                children.push(self.row()?);
                self.skip_whitespace();
                match self.next() {
                    Some(b',') => self.skip_whitespace(),
                    Some(b'}') => break,
                    _ => return Err(self.malformed()),
                }
            },
            Some(_) => loop {
                children.push(Literal::Item(self.item()?));
                match self.next() {
                    Some(b',') => {}
                    Some(b'}') => break,
                    _ => return Err(self.malformed()),
                }
            },
            None => return Err(self.malformed()),
        }
        Ok(Literal::Row(children))
    }

    /// Scan one item up to the next unquoted `,` or `}`.
    fn item(&mut self) -> Result<String, StoreError> {
        let start = self.pos;
        let mut quoted = false;
        while let Some(byte) = self.peek() {
            match byte {
                b'"' => quoted = !quoted,
                b',' | b'}' if !quoted => break,
                b'{' if !quoted => return Err(self.malformed()),
                _ => {}
            }
            self.pos += 1;
        }
        if quoted || self.peek().is_none() {
            return Err(self.malformed());
        }

        let item = self.text[start..self.pos].trim();
        if item.is_empty() {
            return Err(StoreError::Configuration(format!(
                "the item string can not be empty in '{}'",
                self.text
            )));
        }
        Ok(item.to_string())
    }

    fn expect(&mut self, byte: u8) -> Result<(), StoreError> {
        match self.next() {
            Some(b) if b == byte => Ok(()),
            _ => Err(self.malformed()),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn malformed(&self) -> StoreError {
        StoreError::Configuration(format!("the array literal is not well-formed: '{}'", self.text))
    }
}

// =============================================================================
// TESTS
// =============================================================================
