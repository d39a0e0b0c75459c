//! Flat JSON token stream.
//!
//! The decoder never builds a DOM. It consumes a single array of tokens in document order,
//! where containers carry the number of direct children (keys for objects, elements for
//! arrays). Any lexer producing that shape can drive the decoder through [`Tokenize`];
//! [`JsonTokenizer`] is the built-in one.

use crate::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TokenKind {
    Object,
    Array,
    String,
    /// Number, `true`, `false` or `null`.
    Primitive,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first byte. Strings exclude the opening quote.
    pub start: usize,
    /// Byte offset one past the last byte. Strings exclude the closing quote.
    pub end: usize,
    /// Direct child count for containers, `0` otherwise.
    pub size: usize,
}

/// Lexer capability consumed by the decoder.
pub trait Tokenize {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, Error>;
}

/// Strict single-pass JSON lexer with an optional token budget.
#[derive(Clone, Debug, Default)]
pub struct JsonTokenizer {
    pub max_tokens: Option<usize>,
}

impl JsonTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_tokens(max_tokens: usize) -> Self {
        Self {
            max_tokens: Some(max_tokens),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Expect {
    KeyOrEnd,
    Key,
    Colon,
    ValueOrEnd,
    Value,
    CommaOrEnd,
}

#[derive(Clone, Debug)]
struct Frame {
    token: usize,
    kind: TokenKind,
    expect: Expect,
}

struct Lexer<'a> {
    bytes: &'a [u8],
    tokens: Vec<Token>,
    stack: Vec<Frame>,
    max_tokens: Option<usize>,
    root_done: bool,
}

fn fail(offset: usize, message: impl Into<String>) -> Error {
    Error::Tokenize {
        offset,
        message: message.into(),
    }
}

impl<'a> Lexer<'a> {
    fn push_token(&mut self, token: Token) -> Result<usize, Error> {
        if let Some(max) = self.max_tokens {
            if self.tokens.len() >= max {
                return Err(fail(
                    token.start,
                    format!("token capacity of {max} exceeded"),
                ));
            }
        }
        self.tokens.push(token);
        Ok(self.tokens.len() - 1)
    }

    /// Checks that a value may start at `offset` and counts it against its parent array.
    fn begin_value(&mut self, offset: usize) -> Result<(), Error> {
        match self.stack.last() {
            None => {
                if self.root_done {
                    return Err(fail(offset, "trailing data after root value"));
                }
                Ok(())
            }
            Some(frame) => match (frame.kind, frame.expect) {
                (TokenKind::Array, Expect::Value | Expect::ValueOrEnd) => {
                    let parent = frame.token;
                    self.tokens[parent].size += 1;
                    Ok(())
                }
                (TokenKind::Object, Expect::Value) => Ok(()),
                (TokenKind::Object, Expect::Colon) => Err(fail(offset, "expected ':'")),
                (TokenKind::Object, _) => Err(fail(offset, "expected string key")),
                _ => Err(fail(offset, "expected ',' or closing bracket")),
            },
        }
    }

    fn end_value(&mut self) {
        match self.stack.last_mut() {
            Some(frame) => frame.expect = Expect::CommaOrEnd,
            None => self.root_done = true,
        }
    }

    fn scan_string(&self, open: usize) -> Result<usize, Error> {
        let mut i = open + 1;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'"' => return Ok(i),
                b'\\' => {
                    let escaped = *self
                        .bytes
                        .get(i + 1)
                        .ok_or_else(|| fail(i, "unterminated escape"))?;
                    match escaped {
                        b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => i += 2,
                        b'u' => {
                            let hex = self
                                .bytes
                                .get(i + 2..i + 6)
                                .ok_or_else(|| fail(i, "truncated unicode escape"))?;
                            if !hex.iter().all(u8::is_ascii_hexdigit) {
                                return Err(fail(i, "invalid unicode escape"));
                            }
                            i += 6;
                        }
                        _ => return Err(fail(i, "invalid escape character")),
                    }
                }
                c if c < 0x20 => return Err(fail(i, "control character in string")),
                _ => i += 1,
            }
        }
        Err(fail(open, "unterminated string"))
    }

    fn scan_primitive(&self, start: usize) -> Result<usize, Error> {
        let first = self.bytes[start];
        if !(first == b'-' || first.is_ascii_digit() || matches!(first, b't' | b'f' | b'n')) {
            return Err(fail(start, format!("unexpected character '{}'", first as char)));
        }
        let mut i = start;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b' ' | b'\t' | b'\r' | b'\n' | b',' | b']' | b'}' | b':' => break,
                c if c < 0x20 || c >= 0x7f => {
                    return Err(fail(i, "invalid character in primitive"));
                }
                _ => i += 1,
            }
        }
        let text = &self.bytes[start..i];
        if first.is_ascii_alphabetic() && !matches!(text, b"true" | b"false" | b"null") {
            return Err(fail(start, "invalid literal"));
        }
        Ok(i)
    }

    fn run(mut self) -> Result<Vec<Token>, Error> {
        let mut i = 0usize;
        while i < self.bytes.len() {
            let c = self.bytes[i];
            match c {
                b' ' | b'\t' | b'\r' | b'\n' => i += 1,
                b'{' | b'[' => {
                    self.begin_value(i)?;
                    let kind = if c == b'{' {
                        TokenKind::Object
                    } else {
                        TokenKind::Array
                    };
                    let token = self.push_token(Token {
                        kind,
                        start: i,
                        end: i,
                        size: 0,
                    })?;
                    self.stack.push(Frame {
                        token,
                        kind,
                        expect: if kind == TokenKind::Object {
                            Expect::KeyOrEnd
                        } else {
                            Expect::ValueOrEnd
                        },
                    });
                    i += 1;
                }
                b'}' | b']' => {
                    let kind = if c == b'}' {
                        TokenKind::Object
                    } else {
                        TokenKind::Array
                    };
                    let frame = self
                        .stack
                        .pop()
                        .ok_or_else(|| fail(i, "unmatched closing bracket"))?;
                    let closable = matches!(
                        frame.expect,
                        Expect::KeyOrEnd | Expect::ValueOrEnd | Expect::CommaOrEnd
                    );
                    if frame.kind != kind || !closable {
                        return Err(fail(i, "mismatched closing bracket"));
                    }
                    self.tokens[frame.token].end = i + 1;
                    self.end_value();
                    i += 1;
                }
                b'"' => {
                    let close = self.scan_string(i)?;
                    let is_key = matches!(
                        self.stack.last(),
                        Some(Frame {
                            kind: TokenKind::Object,
                            expect: Expect::Key | Expect::KeyOrEnd,
                            ..
                        })
                    );
                    if !is_key {
                        self.begin_value(i)?;
                    }
                    self.push_token(Token {
                        kind: TokenKind::String,
                        start: i + 1,
                        end: close,
                        size: 0,
                    })?;
                    if is_key {
                        if let Some(frame) = self.stack.last_mut() {
                            frame.expect = Expect::Colon;
                            let parent = frame.token;
                            self.tokens[parent].size += 1;
                        }
                    } else {
                        self.end_value();
                    }
                    i = close + 1;
                }
                b':' => match self.stack.last_mut() {
                    Some(frame) if frame.expect == Expect::Colon => {
                        frame.expect = Expect::Value;
                        i += 1;
                    }
                    _ => return Err(fail(i, "unexpected ':'")),
                },
                b',' => match self.stack.last_mut() {
                    Some(frame) if frame.expect == Expect::CommaOrEnd => {
                        frame.expect = if frame.kind == TokenKind::Object {
                            Expect::Key
                        } else {
                            Expect::Value
                        };
                        i += 1;
                    }
                    _ => return Err(fail(i, "unexpected ','")),
                },
                _ => {
                    self.begin_value(i)?;
                    let end = self.scan_primitive(i)?;
                    self.push_token(Token {
                        kind: TokenKind::Primitive,
                        start: i,
                        end,
                        size: 0,
                    })?;
                    self.end_value();
                    i = end;
                }
            }
        }

        if let Some(frame) = self.stack.last() {
            return Err(fail(
                self.tokens[frame.token].start,
                "unterminated container",
            ));
        }
        if !self.root_done {
            return Err(fail(self.bytes.len(), "empty document"));
        }
        Ok(self.tokens)
    }
}

impl Tokenize for JsonTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, Error> {
        let lexer = Lexer {
            bytes: text.as_bytes(),
            tokens: Vec::new(),
            stack: Vec::new(),
            max_tokens: self.max_tokens,
            root_done: false,
        };
        lexer.run()
    }
}
