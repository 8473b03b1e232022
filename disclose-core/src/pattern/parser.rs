//! Recursive descent parser for pattern text.
//!
//! The syntax is a byte-oriented subset of the usual regex notation. Plain
//! parentheses only group; a span is revealed only when it is a named capture
//! (`(?<name>...)` or `(?P<name>...)`).

use std::fmt;

use super::ast::Node;
use super::byte_set::ByteSet;
use crate::config::MAX_REPETITION;

/// Deepest group nesting accepted before the parser gives up.
const MAX_NESTING: usize = 64;

/// Errors that can occur while parsing pattern text. Positions are byte
/// offsets into the pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnexpectedEnd,
    UnclosedGroup(usize),
    UnmatchedParen(usize),
    UnclosedClass(usize),
    NothingToRepeat(usize),
    InvalidRepetition(usize),
    RepetitionTooLarge(u32),
    InvalidRange(u8, u8),
    InvalidEscape(usize),
    InvalidHexEscape(usize),
    NonAsciiInClass(usize),
    InvalidCaptureName(String),
    NestedCapture(String),
    NestingTooDeep,
    Unsupported(&'static str),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEnd => write!(f, "unexpected end of pattern"),
            Self::UnclosedGroup(at) => write!(f, "group opened at offset {at} is never closed"),
            Self::UnmatchedParen(at) => write!(f, "unmatched ')' at offset {at}"),
            Self::UnclosedClass(at) => write!(f, "class opened at offset {at} is never closed"),
            Self::NothingToRepeat(at) => write!(f, "repetition operator at offset {at} has nothing to repeat"),
            Self::InvalidRepetition(at) => write!(f, "malformed repetition at offset {at}"),
            Self::RepetitionTooLarge(n) => {
                write!(f, "repetition bound {n} exceeds the maximum of {MAX_REPETITION}")
            }
            Self::InvalidRange(lo, hi) => write!(f, "invalid class range {:#04x}-{:#04x}", lo, hi),
            Self::InvalidEscape(at) => write!(f, "unknown escape sequence at offset {at}"),
            Self::InvalidHexEscape(at) => write!(f, "malformed \\x escape at offset {at}"),
            Self::NonAsciiInClass(at) => {
                write!(f, "non-ASCII character in class at offset {at}; use \\xHH for raw bytes")
            }
            Self::InvalidCaptureName(name) => write!(f, "invalid capture name '{name}'"),
            Self::NestedCapture(name) => {
                write!(f, "capture '{name}' is nested inside another capture")
            }
            Self::NestingTooDeep => write!(f, "groups nested more than {MAX_NESTING} levels deep"),
            Self::Unsupported(what) => write!(f, "{what} are not supported"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse pattern text into a [`Node`].
pub fn parse(pattern: &str) -> Result<Node, ParseError> {
    let mut parser = Parser {
        input: pattern.as_bytes(),
        pos: 0,
        depth: 0,
        open_capture: None,
    };
    let node = parser.parse_alternation()?;
    match parser.peek() {
        None => Ok(node),
        Some(b')') => Err(ParseError::UnmatchedParen(parser.pos)),
        Some(_) => Err(ParseError::UnexpectedEnd),
    }
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
    open_capture: Option<String>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_alternation(&mut self) -> Result<Node, ParseError> {
        let mut branches = vec![self.parse_concat()?];
        while self.eat(b'|') {
            branches.push(self.parse_concat()?);
        }
        Ok(if branches.len() == 1 {
            branches.pop().unwrap_or(Node::Empty)
        } else {
            Node::Alternate(branches)
        })
    }

    fn parse_concat(&mut self) -> Result<Node, ParseError> {
        let mut items = Vec::new();
        while let Some(b) = self.peek() {
            if b == b'|' || b == b')' {
                break;
            }
            let atom = self.parse_atom()?;
            items.push(self.parse_quantifiers(atom)?);
        }
        Ok(match items.len() {
            0 => Node::Empty,
            1 => items.pop().unwrap_or(Node::Empty),
            _ => Node::Concat(items),
        })
    }

    fn parse_quantifiers(&mut self, atom: Node) -> Result<Node, ParseError> {
        let start = self.pos;
        let (min, max) = match self.peek() {
            Some(b'*') => {
                self.pos += 1;
                (0, None)
            }
            Some(b'+') => {
                self.pos += 1;
                (1, None)
            }
            Some(b'?') => {
                self.pos += 1;
                (0, Some(1))
            }
            Some(b'{') => self.parse_bounds()?,
            _ => return Ok(atom),
        };
        match self.peek() {
            Some(b'?') => return Err(ParseError::Unsupported("lazy quantifiers")),
            Some(b'+') => return Err(ParseError::Unsupported("possessive quantifiers")),
            Some(b'*') | Some(b'{') => return Err(ParseError::NothingToRepeat(self.pos)),
            _ => {}
        }
        if matches!(atom, Node::StartAnchor) {
            return Err(ParseError::NothingToRepeat(start));
        }
        Ok(Node::repeat(atom, min, max))
    }

    fn parse_bounds(&mut self) -> Result<(u32, Option<u32>), ParseError> {
        let open = self.pos;
        self.pos += 1;
        let min = self.parse_number().ok_or(ParseError::InvalidRepetition(open))?;
        let max = if self.eat(b',') {
            if self.peek() == Some(b'}') {
                None
            } else {
                Some(self.parse_number().ok_or(ParseError::InvalidRepetition(open))?)
            }
        } else {
            Some(min)
        };
        if !self.eat(b'}') {
            return Err(ParseError::InvalidRepetition(open));
        }
        if let Some(max) = max {
            if max < min {
                return Err(ParseError::InvalidRepetition(open));
            }
        }
        let largest = max.unwrap_or(min);
        if largest > MAX_REPETITION {
            return Err(ParseError::RepetitionTooLarge(largest));
        }
        Ok((min, max))
    }

    fn parse_number(&mut self) -> Option<u32> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        std::str::from_utf8(&self.input[start..self.pos]).ok()?.parse().ok()
    }

    fn parse_atom(&mut self) -> Result<Node, ParseError> {
        let at = self.pos;
        let b = self.bump().ok_or(ParseError::UnexpectedEnd)?;
        match b {
            b'(' => self.parse_group(at),
            b'[' => self.parse_class(at).map(Node::Class),
            b'.' => Ok(Node::Class(ByteSet::single(b'\n').complement())),
            b'^' => Ok(Node::StartAnchor),
            b'$' => Err(ParseError::Unsupported("end anchors")),
            b'\\' => self.parse_escape(at).map(Node::Class),
            b'*' | b'+' | b'?' | b'{' => Err(ParseError::NothingToRepeat(at)),
            other => Ok(Node::Class(ByteSet::single(other))),
        }
    }

    fn parse_group(&mut self, open: usize) -> Result<Node, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::NestingTooDeep);
        }
        let mut capture = None;
        if self.eat(b'?') {
            match self.bump() {
                Some(b':') => {}
                Some(b'P') if self.peek() == Some(b'<') => {
                    self.pos += 1;
                    capture = Some(self.parse_capture_name()?);
                }
                Some(b'<') if !matches!(self.peek(), Some(b'=') | Some(b'!')) => {
                    capture = Some(self.parse_capture_name()?);
                }
                Some(b'<') | Some(b'=') | Some(b'!') => {
                    return Err(ParseError::Unsupported("lookaround assertions"))
                }
                Some(_) => return Err(ParseError::Unsupported("inline flags")),
                None => return Err(ParseError::UnexpectedEnd),
            }
        }

        let outer = match &capture {
            Some(name) => {
                if self.open_capture.is_some() {
                    return Err(ParseError::NestedCapture(name.clone()));
                }
                self.open_capture.replace(name.clone())
            }
            None => None,
        };

        self.depth += 1;
        let inner = self.parse_alternation()?;
        self.depth -= 1;
        if !self.eat(b')') {
            return Err(ParseError::UnclosedGroup(open));
        }

        Ok(match capture {
            Some(name) => {
                self.open_capture = outer;
                Node::capture(name, inner)
            }
            None => inner,
        })
    }

    fn parse_capture_name(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'>' {
                break;
            }
            self.pos += 1;
        }
        let raw = &self.input[start..self.pos];
        if !self.eat(b'>') {
            return Err(ParseError::UnexpectedEnd);
        }
        let name = String::from_utf8_lossy(raw).into_owned();
        if !is_valid_capture_name(&name) {
            return Err(ParseError::InvalidCaptureName(name));
        }
        Ok(name)
    }

    fn parse_class(&mut self, open: usize) -> Result<ByteSet, ParseError> {
        let negated = self.eat(b'^');
        let mut set = ByteSet::empty();
        let mut first = true;
        loop {
            let at = self.pos;
            let b = self.bump().ok_or(ParseError::UnclosedClass(open))?;
            if b == b']' && !first {
                break;
            }
            first = false;
            let lo = match b {
                b'\\' => {
                    let item = self.parse_escape(at)?;
                    if item.len() != 1 {
                        if self.peek() == Some(b'-') && self.peek_at(1) != Some(b']') {
                            return Err(ParseError::InvalidEscape(at));
                        }
                        set = set.union(&item);
                        continue;
                    }
                    item.first().unwrap_or(0)
                }
                b if b >= 0x80 => return Err(ParseError::NonAsciiInClass(at)),
                b => b,
            };

            if self.peek() == Some(b'-') && !matches!(self.peek_at(1), Some(b']') | None) {
                self.pos += 1;
                let hi_at = self.pos;
                let hi = match self.bump().ok_or(ParseError::UnclosedClass(open))? {
                    b'\\' => {
                        let item = self.parse_escape(hi_at)?;
                        if item.len() != 1 {
                            return Err(ParseError::InvalidEscape(hi_at));
                        }
                        item.first().unwrap_or(0)
                    }
                    b if b >= 0x80 => return Err(ParseError::NonAsciiInClass(hi_at)),
                    b => b,
                };
                if hi < lo {
                    return Err(ParseError::InvalidRange(lo, hi));
                }
                set.insert_range(lo, hi);
            } else {
                set.insert(lo);
            }
        }
        Ok(if negated { set.complement() } else { set })
    }

    /// Parses the escape whose backslash sits at `at`; the cursor is just past
    /// the backslash.
    fn parse_escape(&mut self, at: usize) -> Result<ByteSet, ParseError> {
        let b = self.bump().ok_or(ParseError::UnexpectedEnd)?;
        let set = match b {
            b'd' => ByteSet::digit(),
            b'D' => ByteSet::digit().complement(),
            b'w' => ByteSet::word(),
            b'W' => ByteSet::word().complement(),
            b's' => ByteSet::space(),
            b'S' => ByteSet::space().complement(),
            b'r' => ByteSet::single(b'\r'),
            b'n' => ByteSet::single(b'\n'),
            b't' => ByteSet::single(b'\t'),
            b'f' => ByteSet::single(0x0c),
            b'v' => ByteSet::single(0x0b),
            b'0' => ByteSet::single(0),
            b'x' => ByteSet::single(self.parse_hex_byte(at)?),
            b'1'..=b'9' => return Err(ParseError::Unsupported("backreferences")),
            b'b' | b'B' | b'A' | b'z' | b'Z' => {
                return Err(ParseError::Unsupported("zero-width escapes"))
            }
            b if b.is_ascii_punctuation() || b == b' ' => ByteSet::single(b),
            _ => return Err(ParseError::InvalidEscape(at)),
        };
        Ok(set)
    }

    fn parse_hex_byte(&mut self, at: usize) -> Result<u8, ParseError> {
        let digits = self
            .input
            .get(self.pos..self.pos + 2)
            .ok_or(ParseError::InvalidHexEscape(at))?;
        let text = std::str::from_utf8(digits).map_err(|_| ParseError::InvalidHexEscape(at))?;
        let value = u8::from_str_radix(text, 16).map_err(|_| ParseError::InvalidHexEscape(at))?;
        self.pos += 2;
        Ok(value)
    }
}

/// Capture names follow identifier rules: a letter or underscore, then
/// letters, digits or underscores.
pub fn is_valid_capture_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
